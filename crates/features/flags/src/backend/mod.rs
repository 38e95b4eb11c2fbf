//! Where feature definitions come from.

mod readiness;
mod store;
mod unleash;

pub use readiness::Readiness;
pub use store::FeatureStore;
pub use unleash::{UnleashBackend, UnleashOptions};

use crate::context::Context;
use crate::error::ToggleError;
use crate::feature::Feature;
use crate::strategy;
use regex::Regex;
use std::fmt::Debug;
use std::sync::Arc;

/// Strategy name the flag server uses for "on for everyone".
pub const DEFAULT_STRATEGY: &str = "default";

/// Read access to feature definitions plus the backend's strategy engine.
pub trait FlagBackend: Debug + Send + Sync {
    /// Current definition of `name`, if known.
    fn feature(&self, name: &str) -> Option<Arc<Feature>>;

    /// Definitions whose name matches `pattern`, in backend order.
    fn features_matching(&self, pattern: &Regex) -> Vec<Arc<Feature>>;

    /// Whether `feature` is on for `context`.
    fn is_enabled(&self, feature: &Feature, context: &Context) -> bool {
        evaluate_feature(feature, context)
    }
}

/// Notifications emitted by a backend while it syncs.
pub trait BackendListener: Debug + Send + Sync {
    /// First successful sync. Called at most once per backend.
    fn on_ready(&self);

    fn on_error(&self, error: &ToggleError);

    fn on_warning(&self, _message: &str) {}
}

/// Globally enabled and at least one strategy matches.
///
/// `default` always matches; names outside the registry never do.
#[must_use]
pub fn evaluate_feature(feature: &Feature, context: &Context) -> bool {
    feature.enabled
        && feature.strategies.iter().any(|definition| {
            definition.name == DEFAULT_STRATEGY || strategy::evaluate(definition, context)
        })
}
