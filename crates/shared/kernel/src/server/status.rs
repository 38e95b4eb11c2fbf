use super::JsonApi;
use super::state::STARTED;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use toggles_domain::config::ApiConfig;
use toggles_domain::constants::SYSTEM_TAG;
use utoipa::ToSchema;

/// Build and runtime information of the running service
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct StatusResponse {
    /// Commit the binary was built from
    commit: &'static str,
    /// Build timestamp
    build_time: &'static str,
    /// Process start time
    start_time: DateTime<Utc>,
    /// Present and true only when developer mode is on
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_mode: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses((status = OK, description = "Service build and runtime status", body = StatusResponse)),
    tag = SYSTEM_TAG,
)]
#[allow(clippy::unused_async)]
pub(super) async fn status_handler(State(config): State<ApiConfig>) -> impl IntoResponse {
    JsonApi(StatusResponse {
        commit: env!("TOGGLES_BUILD_COMMIT"),
        build_time: env!("TOGGLES_BUILD_TIME"),
        start_time: STARTED.wall_clock,
        dev_mode: config.developer_mode.then_some(true),
    })
}
