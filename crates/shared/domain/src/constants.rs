//! Wire-level names shared between the API layer and the feature slices.

/// `OpenAPI` tag for system endpoints (health, status).
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for feature endpoints.
pub const FEATURES_TAG: &str = "Features";

/// JSON:API resource type of a feature.
pub const FEATURES_TYPE: &str = "features";
/// JSON:API media type.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Separator between a feature group and its members (`group.feature`).
pub const GROUP_SEPARATOR: char = '.';

/// Prefix of environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "TOGGLES";
/// Environment variable naming the configuration file when `--config` is not given.
pub const CONFIG_FILE_ENV: &str = "TOGGLES_CONFIG_FILE_PATH";
