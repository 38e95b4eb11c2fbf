//! Axum building blocks shared by every slice's HTTP surface.

pub mod health;
pub mod jsonapi;
pub mod router;
pub mod state;
pub mod status;

pub use jsonapi::{ApiError, JsonApi};
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
