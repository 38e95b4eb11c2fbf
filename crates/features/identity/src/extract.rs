//! Axum extractors resolving the caller of a request.

use crate::Identity;
use crate::error::IdentityError;
use crate::profile::UserProfile;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;
use toggles_kernel::server::{ApiError, ApiState};

/// Optional `Authorization: Bearer <token>` credential. Malformed headers are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };

        let value = value
            .to_str()
            .map_err(|_| ApiError::unauthorized("Authorization header is not valid ASCII"))?;
        match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
                Ok(Self(Some(token.trim().to_owned())))
            }
            _ => Err(ApiError::unauthorized("Expected a bearer token")),
        }
    }
}

/// The requesting user's profile; `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Arc<UserProfile>>);

impl FromRequestParts<ApiState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let Some(token) = token else {
            return Ok(Self(None));
        };

        let identity =
            state.try_get_slice::<Identity>().map_err(|e| ApiError::internal(e.to_string()))?;
        let profile = identity.client.user(&token).await?;
        Ok(Self(Some(profile)))
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::Unauthorized { message, .. } if message.trim().is_empty() => {
                Self::unauthorized("Invalid or expired token")
            }
            IdentityError::Unauthorized { message, .. } => Self::unauthorized(message),
            other => {
                tracing::error!(error = %other, "Unable to resolve the caller");
                Self::bad_gateway("Unable to get the user from the identity service")
            }
        }
    }
}
