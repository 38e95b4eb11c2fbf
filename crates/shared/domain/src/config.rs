use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub toggles: TogglesConfig,
    pub identity: IdentityConfig,
    pub log: LogConfig,
    /// Enables development conveniences (human readable logs, `devMode` in status).
    pub developer_mode: bool,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl ApiConfigInner {
    /// JSON logs unless explicitly configured, or unless developer mode is on.
    #[must_use]
    pub fn log_json(&self) -> bool {
        self.log.json.unwrap_or(!self.developer_mode)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Remote flag server (Unleash API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TogglesConfig {
    /// Base URL of the flag server API, e.g. `http://f8toggles/api`.
    pub url: String,
    pub app_name: String,
    /// Falls back to `$HOSTNAME` when unset.
    pub instance_id: Option<String>,
    pub refresh_interval_seconds: u64,
    pub request_timeout_seconds: u64,
}

/// Remote identity service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub url: String,
    /// Verified emails ending with this suffix belong to internal users.
    pub internal_email_suffix: String,
    pub request_timeout_seconds: u64,
    pub profile_cache_capacity: u64,
    pub profile_cache_ttl_seconds: u64,
}

/// Logging output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: Option<bool>,
    /// Directory for rolling log files; console only when unset.
    pub path: Option<PathBuf>,
    /// Extra `EnvFilter` directives, e.g. `toggles_flags=debug,hyper=info`.
    pub filter: Option<String>,
}

impl TogglesConfig {
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl IdentityConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn profile_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_cache_ttl_seconds)
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8080, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for TogglesConfig {
    fn default() -> Self {
        Self {
            url: "http://f8toggles/api".to_owned(),
            app_name: "toggles-service".to_owned(),
            instance_id: None,
            refresh_interval_seconds: 10,
            request_timeout_seconds: 5,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: "http://auth/".to_owned(),
            internal_email_suffix: "@redhat.com".to_owned(),
            request_timeout_seconds: 5,
            profile_cache_capacity: 10_000,
            profile_cache_ttl_seconds: 30,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: None, path: None, filter: None }
    }
}
