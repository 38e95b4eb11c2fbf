use axum::Router;
use toggles::kernel::prelude::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub(crate) const DOCS_PATH: &str = "/api/docs";

#[derive(OpenApi)]
#[openapi(
    info(title = "Feature Toggles API"),
    tags(
        (name = "System", description = "Health and build information"),
        (name = "Features", description = "Feature toggles as seen by the caller"),
    )
)]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(toggles::server::router::system_router())
        .merge(toggles::server::router::features_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    Router::new().merge(openapi_routes).merge(Scalar::with_url(DOCS_PATH, api_doc))
}
