use super::{health, status};
use axum::extract::FromRef;
use toggles_domain::config::ApiConfig;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/health` and `/api/status`.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    ApiConfig: FromRef<S>,
{
    OpenApiRouter::<S>::new()
        .routes(routes!(health::health_handler))
        .routes(routes!(status::status_handler))
}
