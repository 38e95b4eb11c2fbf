//! Rollout strategies understood by this service.

use crate::context::Context;
use crate::feature::StrategyDefinition;
use crate::level::Level;
use tracing::debug;

/// Strategy parameter and context key holding the opt-in tier.
pub const LEVEL_PARAMETER: &str = "level";
/// Strategy parameter (comma separated allowlist) and context key holding the user's email.
pub const EMAILS_PARAMETER: &str = "emails";
/// Strategy parameter and context key holding the cohort identifier.
pub const GROUP_ID_PARAMETER: &str = "groupID";

/// Strategies registered by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `enableByLevel`: on when the configured tier is visible at the user's claimed tier.
    ByLevel,
    /// `enableByGroupID`: on when the configured cohort equals the user's cohort.
    ByGroupId,
    /// `enableByEmails`: on when the user's email is in the configured allowlist.
    ByEmails,
}

impl Strategy {
    pub const ALL: [Self; 3] = [Self::ByLevel, Self::ByGroupId, Self::ByEmails];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ByLevel => "enableByLevel",
            Self::ByGroupId => "enableByGroupID",
            Self::ByEmails => "enableByEmails",
        }
    }

    /// Looks a strategy up by the identifier the flag server tags definitions with.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|strategy| strategy.name() == name)
    }

    /// Evaluates the strategy. Missing or non-string parameters never match.
    #[must_use]
    pub fn is_enabled(self, definition: &StrategyDefinition, context: &Context) -> bool {
        match self {
            Self::ByLevel => by_level(definition, context),
            Self::ByGroupId => by_group_id(definition, context),
            Self::ByEmails => by_emails(definition, context),
        }
    }
}

/// Evaluates a definition through the registry; unknown names never match.
#[must_use]
pub fn evaluate(definition: &StrategyDefinition, context: &Context) -> bool {
    Strategy::from_name(&definition.name).is_some_and(|strategy| strategy.is_enabled(definition, context))
}

fn by_level(definition: &StrategyDefinition, context: &Context) -> bool {
    let Some(level) = definition.parameter(LEVEL_PARAMETER) else {
        return false;
    };
    let claimed = context.property(LEVEL_PARAMETER).unwrap_or_default();
    let enabled = Level::parse_or(level, Level::Unknown).is_enabled_for(claimed);
    debug!(feature_level = level, user_level = claimed, enabled, "Checked level strategy");
    enabled
}

fn by_group_id(definition: &StrategyDefinition, context: &Context) -> bool {
    let (Some(expected), Some(actual)) =
        (definition.parameter(GROUP_ID_PARAMETER), context.property(GROUP_ID_PARAMETER))
    else {
        return false;
    };
    expected == actual
}

fn by_emails(definition: &StrategyDefinition, context: &Context) -> bool {
    let (Some(allowlist), Some(email)) =
        (definition.parameter(EMAILS_PARAMETER), context.property(EMAILS_PARAMETER))
    else {
        return false;
    };
    let enabled =
        allowlist.split(',').map(str::trim).filter(|entry| !entry.is_empty()).any(|entry| entry == email);
    debug!(enabled, "Checked email strategy");
    enabled
}
