use crate::level::Level;
use fxhash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Strategy parameters as delivered by the flag server.
pub type Parameters = FxHashMap<String, serde_json::Value>;

/// One rollout rule attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Parameters,
}

impl StrategyDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), parameters: Parameters::default() }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// String parameter lookup; non-string values count as absent.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(serde_json::Value::as_str)
    }
}

/// A feature definition owned by the flag server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Hierarchical, dot separated identifier (`planner.board`).
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Global kill switch.
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strategies: Vec<StrategyDefinition>,
}

impl Feature {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self { name: name.into(), description: String::new(), enabled, strategies: Vec::new() }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyDefinition) -> Self {
        self.strategies.push(strategy);
        self
    }
}

/// Decodes an explicit `null` like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A feature as seen by one requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserFeature {
    pub name: String,
    pub description: String,
    /// Globally enabled.
    pub enabled: bool,
    /// Minimum tier advertised for the feature; `None` when not applicable to this user.
    pub enablement_level: Option<Level>,
    /// Enabled for this user right now. Never true when `enabled` is false.
    pub user_enabled: bool,
}
