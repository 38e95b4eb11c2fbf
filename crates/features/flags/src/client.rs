use crate::backend::{FlagBackend, Readiness};
use crate::context::UserContext;
use crate::enablement::compute_enablement_level;
use crate::feature::{Feature, UserFeature};
use crate::level::Level;
use regex::Regex;
use std::sync::Arc;
use toggles_domain::constants::GROUP_SEPARATOR;
use tracing::{debug, error};

/// Per-user view over a flag backend.
///
/// Every lookup fails closed: until the backend reports its first successful
/// sync, nothing is found.
#[derive(Debug, Clone)]
pub struct ToggleClient {
    backend: Arc<dyn FlagBackend>,
    readiness: Readiness,
    internal_suffix: Arc<str>,
}

impl ToggleClient {
    /// `readiness` must be the handle the backend reports its first sync to.
    pub fn new(
        backend: Arc<dyn FlagBackend>,
        readiness: Readiness,
        internal_suffix: impl Into<Arc<str>>,
    ) -> Self {
        Self { backend, readiness, internal_suffix: internal_suffix.into() }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    #[must_use]
    pub const fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Evaluates one feature for `user`. `None` when unknown or not ready.
    #[must_use]
    pub fn get_feature(&self, name: &str, user: &UserContext) -> Option<UserFeature> {
        if !self.ensure_ready() {
            return None;
        }
        let Some(feature) = self.backend.feature(name) else {
            debug!(feature = name, "Feature not found");
            return None;
        };
        Some(self.evaluate(&feature, user))
    }

    /// Evaluates `names` in input order, silently dropping unknown ones.
    #[must_use]
    pub fn get_features_by_name<S: AsRef<str>>(&self, names: &[S], user: &UserContext) -> Vec<UserFeature> {
        if !self.ensure_ready() {
            return Vec::new();
        }
        names.iter().filter_map(|name| self.get_feature(name.as_ref(), user)).collect()
    }

    /// Evaluates `pattern` itself and every feature below it (`pattern.*`), in backend order.
    #[must_use]
    pub fn get_features_by_pattern(&self, pattern: &str, user: &UserContext) -> Vec<UserFeature> {
        if !self.ensure_ready() {
            return Vec::new();
        }
        let matcher = match group_matcher(pattern) {
            Ok(matcher) => matcher,
            Err(err) => {
                error!(pattern, error = %err, "Unusable feature group pattern");
                return Vec::new();
            }
        };
        self.backend
            .features_matching(&matcher)
            .iter()
            .map(|feature| self.evaluate(feature, user))
            .collect()
    }

    /// Combines global state, strategy matching and the advertised tier for `user`.
    #[must_use]
    pub fn evaluate(&self, feature: &Feature, user: &UserContext) -> UserFeature {
        let internal = user.is_internal(&self.internal_suffix);
        let level = compute_enablement_level(feature, internal);
        let user_enabled = feature.enabled && self.backend.is_enabled(feature, &user.to_context());

        debug!(
            feature = %feature.name,
            enabled = feature.enabled,
            level = %level,
            user_enabled,
            internal,
            "Evaluated feature"
        );

        UserFeature {
            name: feature.name.clone(),
            description: feature.description.clone(),
            enabled: feature.enabled,
            enablement_level: (level != Level::Unknown).then_some(level),
            user_enabled,
        }
    }

    fn ensure_ready(&self) -> bool {
        let ready = self.is_ready();
        if !ready {
            error!("Unable to evaluate features: flag backend is not ready yet");
        }
        ready
    }
}

/// Anchored matcher for `pattern` and its dot separated descendants.
fn group_matcher(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern);
    let separator = regex::escape(&GROUP_SEPARATOR.to_string());
    Regex::new(&format!("^{escaped}$|^{escaped}{separator}"))
}
