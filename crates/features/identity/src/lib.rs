//! Identity slice: who is calling.
//!
//! Bearer tokens are forwarded to the identity service (`GET {url}/api/user`) and the
//! answers cached per token. Token signatures are never verified here.

mod client;
mod error;
#[cfg(feature = "server")]
mod extract;
mod profile;

pub use crate::client::IdentityClient;
pub use crate::error::{IdentityError, IdentityErrorExt};
#[cfg(feature = "server")]
pub use crate::extract::{BearerToken, Caller};
pub use crate::profile::UserProfile;

use toggles_domain::config::IdentityConfig;
use toggles_kernel::domain::registry::InitializedSlice;

/// Identity feature state
#[toggles_derive::toggles_slice]
pub struct Identity {
    pub client: IdentityClient,
}

/// Initialize the identity feature.
///
/// # Errors
/// Returns an error if the identity client cannot be built from `config`.
pub fn init(config: &IdentityConfig) -> Result<InitializedSlice, IdentityError> {
    let client = IdentityClient::new(config)?;
    tracing::info!(endpoint = %client.endpoint(), "Identity slice initialized");

    Ok(InitializedSlice::new(Identity::new(IdentityInner { client })))
}
