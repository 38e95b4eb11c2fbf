use crate::feature::UserFeature;
use serde::Serialize;
use toggles_domain::constants::FEATURES_TYPE;
use utoipa::ToSchema;

/// JSON:API attributes of a feature
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureAttributes {
    /// The description of the feature
    #[schema(example = "Description of the feature")]
    pub description: String,
    /// Globally enabled, prior to applying strategies
    pub enabled: bool,
    /// Enabled for the current user
    #[serde(rename = "user-enabled")]
    pub user_enabled: bool,
    /// Minimum opt-in level; missing when the feature is not accessible to the user
    #[serde(rename = "enablement-level", skip_serializing_if = "Option::is_none")]
    #[schema(example = "beta")]
    pub enablement_level: Option<&'static str>,
}

/// JSON:API feature resource
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureResource {
    /// Feature name
    #[schema(example = "planner.board")]
    pub id: String,
    /// Always `features`
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: FeatureAttributes,
}

/// Holds a single feature
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureSingle {
    pub data: FeatureResource,
}

/// Holds a list of features
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureList {
    pub data: Vec<FeatureResource>,
}

impl From<&UserFeature> for FeatureResource {
    fn from(feature: &UserFeature) -> Self {
        Self {
            id: feature.name.clone(),
            kind: FEATURES_TYPE,
            attributes: FeatureAttributes {
                description: feature.description.clone(),
                enabled: feature.enabled,
                user_enabled: feature.user_enabled,
                enablement_level: feature.enablement_level.and_then(|level| level.name()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[test]
    fn wire_attribute_names() {
        let feature = UserFeature {
            name: "planner".to_owned(),
            description: "Planner".to_owned(),
            enabled: true,
            enablement_level: Some(Level::Beta),
            user_enabled: false,
        };
        let value = serde_json::to_value(FeatureResource::from(&feature)).unwrap();
        assert_eq!(value["id"], "planner");
        assert_eq!(value["type"], "features");
        assert_eq!(value["attributes"]["user-enabled"], false);
        assert_eq!(value["attributes"]["enablement-level"], "beta");
    }

    #[test]
    fn level_is_omitted_when_not_applicable() {
        let feature = UserFeature {
            name: "planner".to_owned(),
            description: String::new(),
            enabled: false,
            enablement_level: None,
            user_enabled: false,
        };
        let value = serde_json::to_value(FeatureResource::from(&feature)).unwrap();
        assert!(value["attributes"].get("enablement-level").is_none());
    }
}
