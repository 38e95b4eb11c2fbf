use super::{BackendListener, FeatureStore, FlagBackend};
use crate::error::{ToggleError, ToggleErrorExt};
use crate::feature::{Feature, null_as_default};
use regex::Regex;
use reqwest::header::{ETAG, HeaderMap, HeaderName, HeaderValue, IF_NONE_MATCH};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use toggles_domain::config::TogglesConfig;
use tracing::{debug, info, warn};

const APP_NAME_HEADER: HeaderName = HeaderName::from_static("unleash-appname");
const INSTANCE_ID_HEADER: HeaderName = HeaderName::from_static("unleash-instanceid");
const FEATURES_PATH: &str = "client/features";
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Connection settings for [`UnleashBackend`].
#[derive(Debug, Clone)]
pub struct UnleashOptions {
    /// API base, e.g. `http://f8toggles/api`.
    pub url: String,
    pub app_name: String,
    pub instance_id: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
}

impl From<&TogglesConfig> for UnleashOptions {
    fn from(config: &TogglesConfig) -> Self {
        let instance_id = config
            .instance_id
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .unwrap_or_else(|| config.app_name.clone());

        Self {
            url: config.url.clone(),
            app_name: config.app_name.clone(),
            instance_id,
            refresh_interval: config.refresh_interval(),
            request_timeout: config.request_timeout(),
        }
    }
}

/// Entries are decoded one by one so a malformed feature does not hide the others.
#[derive(Debug, Deserialize)]
struct FeaturesPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    features: Vec<serde_json::Value>,
}

fn decode_features(raw: Vec<serde_json::Value>) -> Vec<Feature> {
    raw.into_iter()
        .filter_map(|value| {
            let name = value.get("name").and_then(serde_json::Value::as_str).map(str::to_owned);
            serde_json::from_value::<Feature>(value)
                .inspect_err(|error| {
                    let feature = name.as_deref().unwrap_or("<unnamed>");
                    warn!(feature, %error, "Skipping malformed feature definition");
                })
                .ok()
        })
        .collect()
}

/// Polls an Unleash compatible flag server and serves the latest snapshot.
///
/// The first fetch starts immediately; later ones run every `refresh_interval`.
/// Failed fetches keep the previous snapshot. Polling stops when the backend is
/// closed or dropped.
#[derive(Debug)]
pub struct UnleashBackend {
    store: Arc<FeatureStore>,
    poller: JoinHandle<()>,
}

impl UnleashBackend {
    /// Validates the options and spawns the poller on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`ToggleError::InvalidUrl`] for a URL that is not absolute `http(s)`, and
    /// [`ToggleError::Http`] or [`ToggleError::Internal`] when the HTTP client cannot be built.
    pub fn start(
        options: UnleashOptions,
        listener: Arc<dyn BackendListener>,
    ) -> Result<Self, ToggleError> {
        let endpoint = features_endpoint(&options.url)?;
        let client = http_client(&options)?;

        let refresh_interval = if options.refresh_interval.is_zero() {
            listener.on_warning("refresh interval is zero, using the default");
            DEFAULT_REFRESH_INTERVAL
        } else {
            options.refresh_interval
        };

        info!(
            endpoint = %endpoint,
            app_name = %options.app_name,
            instance_id = %options.instance_id,
            refresh_secs = refresh_interval.as_secs_f64(),
            "Starting flag server poller"
        );

        let store = Arc::new(FeatureStore::default());
        let fetcher = Fetcher { client, endpoint, etag: None };
        let poller = tokio::spawn(poll(fetcher, Arc::clone(&store), listener, refresh_interval));

        Ok(Self { store, poller })
    }

    /// Stops polling. The last snapshot stays readable.
    pub fn close(&self) {
        self.poller.abort();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.poller.is_finished()
    }
}

impl Drop for UnleashBackend {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

impl FlagBackend for UnleashBackend {
    fn feature(&self, name: &str) -> Option<Arc<Feature>> {
        self.store.feature(name)
    }

    fn features_matching(&self, pattern: &Regex) -> Vec<Arc<Feature>> {
        self.store.features_matching(pattern)
    }
}

fn features_endpoint(base: &str) -> Result<Url, ToggleError> {
    let raw = format!("{}/{FEATURES_PATH}", base.trim_end_matches('/'));
    let url = Url::parse(&raw).map_err(|e| ToggleError::InvalidUrl {
        message: e.to_string().into(),
        context: Some(base.to_owned().into()),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ToggleError::InvalidUrl {
            message: format!("unsupported scheme '{}'", url.scheme()).into(),
            context: Some(base.to_owned().into()),
        });
    }
    Ok(url)
}

fn http_client(options: &UnleashOptions) -> Result<reqwest::Client, ToggleError> {
    let mut headers = HeaderMap::new();
    headers.insert(APP_NAME_HEADER, header_value(&options.app_name, "app name")?);
    headers.insert(INSTANCE_ID_HEADER, header_value(&options.instance_id, "instance id")?);

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(options.request_timeout)
        .build()
        .context("Building flag server HTTP client")
}

fn header_value(value: &str, what: &'static str) -> Result<HeaderValue, ToggleError> {
    HeaderValue::from_str(value).map_err(|e| ToggleError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Invalid {what} header").into()),
    })
}

#[derive(Debug)]
struct Fetcher {
    client: reqwest::Client,
    endpoint: Url,
    etag: Option<HeaderValue>,
}

impl Fetcher {
    /// `Ok(None)` when the server reports the definitions unchanged.
    async fn fetch(&mut self) -> Result<Option<Vec<Feature>>, ToggleError> {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(etag) = &self.etag {
            request = request.header(IF_NONE_MATCH, etag.clone());
        }

        let response = request.send().await.context("Fetching feature definitions")?;
        match response.status() {
            StatusCode::NOT_MODIFIED => Ok(None),
            status if status.is_success() => {
                let etag = response.headers().get(ETAG).cloned();
                let body = response.bytes().await.context("Reading feature definitions")?;
                let payload: FeaturesPayload =
                    serde_json::from_slice(&body).context("Decoding feature definitions")?;
                self.etag = etag;
                Ok(Some(decode_features(payload.features)))
            }
            status => Err(ToggleError::Status {
                status: status.as_u16(),
                context: Some(self.endpoint.to_string().into()),
            }),
        }
    }
}

async fn poll(
    mut fetcher: Fetcher,
    store: Arc<FeatureStore>,
    listener: Arc<dyn BackendListener>,
    refresh_interval: Duration,
) {
    let mut ticker = tokio::time::interval(refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut synced = false;

    loop {
        ticker.tick().await;
        match fetcher.fetch().await {
            Ok(Some(features)) => {
                debug!(count = features.len(), "Feature definitions refreshed");
                store.replace(features);
                if !synced {
                    synced = true;
                    listener.on_ready();
                }
            }
            Ok(None) => debug!("Feature definitions unchanged"),
            Err(error) => {
                if !synced {
                    warn!("Flag server not reachable yet, features stay unavailable");
                }
                listener.on_error(&error);
            }
        }
    }
}
