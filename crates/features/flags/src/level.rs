//! Opt-in tiers a feature can be rolled out to.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Rollout tier, ordered from most restricted to generally available.
///
/// The declaration order is the ordering contract:
/// `Unknown < Internal < Experimental < Beta < Released`.
/// A user who opted into a tier sees every feature configured at that tier or above.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Not accessible. Only ever a computed result, never a valid opt-in claim.
    #[default]
    Unknown,
    Internal,
    Experimental,
    Beta,
    Released,
}

impl Level {
    /// Tiers a user may opt into, in ascending order.
    pub const CLAIMABLE: [Self; 4] = [Self::Internal, Self::Experimental, Self::Beta, Self::Released];

    /// Parses a claimable tier name, ignoring ASCII case.
    ///
    /// Anything else, `"unknown"` included, yields `fallback`.
    #[must_use]
    pub fn parse_or(raw: &str, fallback: Self) -> Self {
        Self::CLAIMABLE
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
            .unwrap_or(fallback)
    }

    /// Canonical wire name; `None` for [`Level::Unknown`].
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        (self != Self::Unknown).then(|| self.as_str())
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether a feature configured at `self` is visible to a user who claimed `user_level`.
    ///
    /// Missing or unrecognized claims count as [`Level::Released`].
    #[must_use]
    pub fn is_enabled_for(self, user_level: &str) -> bool {
        self >= Self::parse_or(user_level, Self::Released)
    }
}
