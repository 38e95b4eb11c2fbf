//! Feature flags slice.
//!
//! Decides, for a feature and a requesting user, whether the feature is globally
//! enabled, the minimum opt-in [`Level`] it is advertised at, and whether this user
//! meets that bar right now.
//!
//! ```rust
//! use std::sync::Arc;
//! use toggles_flags::{Feature, FeatureStore, Level, Readiness, StrategyDefinition, ToggleClient, UserContext};
//!
//! let store = FeatureStore::new([Feature::new("planner", true).with_strategy(
//!     StrategyDefinition::new("enableByLevel").with_parameter("level", "beta"),
//! )]);
//! let client = ToggleClient::new(Arc::new(store), Readiness::ready(), "@redhat.com");
//!
//! let user = UserContext { claimed_level: Some("experimental".into()), ..UserContext::default() };
//! let feature = client.get_feature("planner", &user).unwrap();
//! assert_eq!(feature.enablement_level, Some(Level::Beta));
//! assert!(feature.user_enabled);
//! ```

#[cfg(feature = "server")]
pub mod api;
pub mod backend;
mod client;
mod context;
mod enablement;
mod error;
mod feature;
mod level;
pub mod strategy;

pub use crate::backend::{
    BackendListener, FeatureStore, FlagBackend, Readiness, UnleashBackend, UnleashOptions,
};
pub use crate::client::ToggleClient;
pub use crate::context::{Context, UserContext};
pub use crate::enablement::compute_enablement_level;
pub use crate::error::{ToggleError, ToggleErrorExt};
pub use crate::feature::{Feature, Parameters, StrategyDefinition, UserFeature};
pub use crate::level::Level;
pub use crate::strategy::Strategy;

use std::sync::Arc;
use toggles_domain::config::ApiConfig;
use toggles_kernel::domain::registry::InitializedSlice;

/// Flags feature state
#[toggles_derive::toggles_slice]
pub struct Flags {
    pub client: ToggleClient,
}

/// Initialize the flags feature: starts polling the flag server.
///
/// Must run inside a tokio runtime. Features stay unavailable until the first sync succeeds.
///
/// # Errors
/// Returns an error if the flag server URL is invalid or the HTTP client cannot be built.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, ToggleError> {
    let readiness = Readiness::new();
    let backend = UnleashBackend::start(
        UnleashOptions::from(&config.toggles),
        Arc::new(readiness.clone()),
    )?;
    let client = ToggleClient::new(
        Arc::new(backend),
        readiness,
        config.identity.internal_email_suffix.as_str(),
    );
    tracing::info!("Flags slice initialized");

    Ok(InitializedSlice::new(Flags::new(FlagsInner { client })))
}
