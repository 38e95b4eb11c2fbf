//! Kernel utilities shared across slices.
//! Keep this crate lightweight: layered config loading, the API state registry,
//! the JSON:API error envelope and the system endpoints (`/health`, `/api/status`).
//!
//! ## Config loading
//! ```rust,no_run
//! use toggles_kernel::config::load_config;
//! use toggles_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("config/local.toml")).unwrap();
//! ```
pub mod config;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

pub use toggles_domain as domain;
