use crate::feature::UserFeature;
use axum::http::{HeaderMap, HeaderValue, header};

/// Strong validator over the evaluated features, in the order given.
pub(super) fn compute(features: &[UserFeature]) -> String {
    format!("\"{:016x}\"", fxhash::hash64(features))
}

/// Whether any `If-None-Match` entry matches `etag` (weak comparison, `*` matches all).
pub(super) fn matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value: &HeaderValue| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}
