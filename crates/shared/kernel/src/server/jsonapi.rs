//! JSON:API response envelope and error documents.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;
use toggles_domain::constants::JSONAPI_MEDIA_TYPE;
use utoipa::ToSchema;

/// Serializes the wrapped document with the JSON:API media type.
#[derive(Debug, Clone)]
pub struct JsonApi<T>(pub T);

impl<T: Serialize> IntoResponse for JsonApi<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.0).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSONAPI_MEDIA_TYPE));
        response
    }
}

/// A single JSON:API error object.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorObject {
    /// HTTP status code as a string, e.g. `"404"`
    pub status: String,
    /// Short summary of the problem
    pub title: String,
    /// Occurrence-specific explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Top-level JSON:API error document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

/// An HTTP failure rendered as a JSON:API error document.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    title: Cow<'static, str>,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, title: impl Into<Cow<'static, str>>) -> Self {
        Self { status, title: title.into(), detail: None }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request").with_detail(detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found").with_detail(detail)
    }

    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "Bad Gateway").with_detail(detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").with_detail(detail)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    #[must_use]
    pub fn to_document(&self) -> ErrorDocument {
        ErrorDocument {
            errors: vec![ErrorObject {
                status: self.status.as_u16().to_string(),
                title: self.title.to_string(),
                detail: self.detail.clone(),
            }],
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} {}: {detail}", self.status.as_u16(), self.title),
            None => write!(f, "{} {}", self.status.as_u16(), self.title),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), detail = ?self.detail, "Request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), detail = ?self.detail, "Request rejected");
        }
        let status = self.status;
        (status, JsonApi(self.to_document())).into_response()
    }
}
