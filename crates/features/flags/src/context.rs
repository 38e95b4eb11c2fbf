//! Who is asking: the requesting user and the property bag strategies match against.

use crate::strategy::{EMAILS_PARAMETER, GROUP_ID_PARAMETER, LEVEL_PARAMETER};
use fxhash::FxHashMap;

/// Requesting user as known to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    /// Raw opt-in claim (`"beta"`, ...). Absent or empty means `released`.
    pub claimed_level: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    /// Cohort the user belongs to, matched by `enableByGroupID`.
    pub cohort: Option<String>,
}

impl UserContext {
    /// Anonymous caller: released tier, external.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Internal users have a verified email ending with `internal_suffix`.
    #[must_use]
    pub fn is_internal(&self, internal_suffix: &str) -> bool {
        self.email_verified
            && !internal_suffix.is_empty()
            && self.email.as_deref().is_some_and(|email| email.ends_with(internal_suffix))
    }

    /// Strategy context carrying the raw claim, email and cohort.
    #[must_use]
    pub fn to_context(&self) -> Context {
        let mut context = Context::default();
        context.insert(LEVEL_PARAMETER, self.claimed_level.as_deref().unwrap_or_default());
        if let Some(email) = &self.email {
            context.insert(EMAILS_PARAMETER, email.as_str());
        }
        if let Some(cohort) = &self.cohort {
            context.insert(GROUP_ID_PARAMETER, cohort.as_str());
        }
        context
    }
}

/// Flat property bag handed to strategy evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    properties: FxHashMap<String, String>,
}

impl Context {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, verified: bool) -> UserContext {
        UserContext { email: Some(email.to_owned()), email_verified: verified, ..UserContext::default() }
    }

    #[test]
    fn internal_requires_verified_suffix() {
        assert!(user("jane@redhat.com", true).is_internal("@redhat.com"));
        assert!(!user("jane@redhat.com", false).is_internal("@redhat.com"));
        assert!(!user("jane@example.com", true).is_internal("@redhat.com"));
        assert!(!UserContext::anonymous().is_internal("@redhat.com"));
    }

    #[test]
    fn empty_suffix_never_matches() {
        assert!(!user("jane@redhat.com", true).is_internal(""));
    }

    #[test]
    fn context_carries_raw_claim() {
        let ctx = UserContext {
            claimed_level: Some("BETA".to_owned()),
            cohort: Some("planners".to_owned()),
            ..user("jane@redhat.com", true)
        }
        .to_context();

        assert_eq!(ctx.property(LEVEL_PARAMETER), Some("BETA"));
        assert_eq!(ctx.property(EMAILS_PARAMETER), Some("jane@redhat.com"));
        assert_eq!(ctx.property(GROUP_ID_PARAMETER), Some("planners"));
    }

    #[test]
    fn anonymous_context_has_empty_claim_only() {
        let ctx = UserContext::anonymous().to_context();
        assert_eq!(ctx.property(LEVEL_PARAMETER), Some(""));
        assert_eq!(ctx.property(EMAILS_PARAMETER), None);
        assert_eq!(ctx.property(GROUP_ID_PARAMETER), None);
    }
}
