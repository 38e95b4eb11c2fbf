use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use toggles_domain::constants::ENV_PREFIX;
use tracing::debug;

/// File looked up (with any supported extension) when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "toggles";

#[toggles_derive::toggles_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file overlaid with environment variables.
///
/// 1. **File**: `path` when given (must exist), otherwise the optional `toggles.{toml,yaml,json}`
///    in the working directory.
/// 2. **Environment**: variables prefixed with `TOGGLES__`; nested keys use `__`
///    (`TOGGLES__TOGGLES__REFRESH_INTERVAL_SECONDS` maps to `toggles.refresh_interval_seconds`).
///
/// Missing keys take the target type's serde defaults.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicitly requested file is missing, a source
/// cannot be parsed, or the merged values do not fit `T`.
///
/// # Example
/// ```rust
/// use toggles_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    debug!(path = %effective_path.display(), required, "Loading configuration");

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
