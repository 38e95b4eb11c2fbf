pub use crate::config::{ConfigError, load_config};
pub use toggles_domain::config::ApiConfig;
pub use toggles_domain::registry::{FeatureSlice, InitializedSlice};

#[cfg(feature = "server")]
pub use crate::server::jsonapi::{ApiError, JsonApi};
#[cfg(feature = "server")]
pub use crate::server::state::{ApiState, ApiStateError};
