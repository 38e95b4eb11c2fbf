//! Facade crate for the feature toggles service.
//! Re-exports domain/kernel primitives and aggregates slice initialization.
//! Keep this crate thin: it composes other crates, it does not implement business logic.
//!
//! ## Usage
//! - Add `toggles` with the `server` feature for the HTTP surface.
//! - Call `toggles::init` from inside a Tokio runtime to start the slices.

pub use toggles_domain as domain;
use toggles_domain::config::ApiConfig;
pub use toggles_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use toggles_flags::api::router as features_router;
        pub use toggles_kernel::server::router::system_router;
    }
}

/// Feature slices bundled in this build.
pub mod features {
    pub use toggles_flags as flags;
    pub use toggles_identity as identity;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "flags",
        "identity",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize every slice. Starts the flag backend poller, so it must run inside a Tokio runtime.
///
/// # Errors
/// Returns an error if any slice fails to initialize.
pub fn init(
    config: &ApiConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Identity
    slices.push(features::identity::init(&config.identity)?);

    // Flags
    slices.push(features::flags::init(config)?);

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_slices_are_always_enabled() {
        assert!(features::is_enabled("flags"));
        assert!(features::is_enabled("identity"));
        assert!(!features::is_enabled("licensing"));
    }

    #[tokio::test]
    async fn init_registers_identity_and_flags() {
        let slices = init(&ApiConfig::default()).expect("default config initializes");
        let ids: Vec<_> = slices.iter().map(|s| s.id).collect();

        assert_eq!(ids.len(), 2);
        assert!(slices[0].downcast::<features::identity::Identity>().is_some());
        assert!(slices[1].downcast::<features::flags::Flags>().is_some());
    }

    #[tokio::test]
    async fn init_rejects_invalid_flag_server_url() {
        let mut config = ApiConfig::default();
        config.toggles.url = "ftp://flags".to_owned();

        assert!(init(&config).is_err());
    }
}
