use crate::error::{IdentityError, IdentityErrorExt};
use crate::profile::{UserDocument, UserProfile};
use moka::sync::Cache;
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use toggles_domain::config::IdentityConfig;
use tracing::{debug, warn};

const USER_PATH: &str = "api/user";

/// Resolves bearer tokens into [`UserProfile`]s, caching answers per token.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    endpoint: Url,
    profiles: Cache<String, Arc<UserProfile>>,
}

impl IdentityClient {
    /// # Errors
    /// Returns [`IdentityError::Config`] for an unusable service URL and
    /// [`IdentityError::Http`] when the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let raw = format!("{}/{USER_PATH}", config.url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|e| IdentityError::Config {
            message: e.to_string().into(),
            context: Some(config.url.clone().into()),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Building identity HTTP client")?;

        let profiles = Cache::builder()
            .max_capacity(config.profile_cache_capacity)
            .time_to_live(config.profile_cache_ttl())
            .build();

        Ok(Self { http, endpoint, profiles })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Profile of the user owning `token`.
    ///
    /// # Errors
    /// * [`IdentityError::Unauthorized`] when the service answers 401.
    /// * [`IdentityError::Status`] for any other non-200 answer.
    /// * [`IdentityError::Http`] / [`IdentityError::Decode`] for transport or payload failures.
    pub async fn user(&self, token: &str) -> Result<Arc<UserProfile>, IdentityError> {
        if let Some(profile) = self.profiles.get(token) {
            return Ok(profile);
        }

        let response = self
            .http
            .get(self.endpoint.clone())
            .bearer_auth(token)
            .send()
            .await
            .context("Fetching user profile")?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await.context("Reading user profile")?;
                let document: UserDocument =
                    serde_json::from_slice(&body).context("Decoding user profile")?;
                let profile = Arc::new(UserProfile::from(document));
                debug!(email_verified = profile.email_verified, "User profile resolved");
                self.profiles.insert(token.to_owned(), Arc::clone(&profile));
                Ok(profile)
            }
            StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unauthorized { message: body.into(), context: None })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "Unexpected identity service response");
                Err(IdentityError::Status {
                    status: status.as_u16(),
                    message: body.into(),
                    context: Some(self.endpoint.to_string().into()),
                })
            }
        }
    }

    /// Drops every cached profile.
    pub fn invalidate_all(&self) {
        self.profiles.invalidate_all();
    }
}
