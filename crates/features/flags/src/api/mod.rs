//! `/api/features` endpoints.

mod etag;
mod handlers;
pub mod model;

use crate::context::UserContext;
use toggles_identity::{Caller, UserProfile};
use toggles_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_features))
        .routes(routes!(handlers::get_feature))
}

impl From<&UserProfile> for UserContext {
    fn from(profile: &UserProfile) -> Self {
        Self {
            claimed_level: profile.feature_level.clone(),
            email: profile.email.clone(),
            email_verified: profile.email_verified,
            cohort: profile.cohort.clone(),
        }
    }
}

fn user_context(caller: &Caller) -> UserContext {
    caller.0.as_deref().map_or_else(UserContext::anonymous, UserContext::from)
}
