use super::model::{FeatureList, FeatureResource, FeatureSingle};
use super::{etag, user_context};
use crate::Flags;
use crate::feature::UserFeature;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use toggles_domain::constants::FEATURES_TAG;
use toggles_identity::Caller;
use toggles_kernel::server::jsonapi::ErrorDocument;
use toggles_kernel::server::{ApiError, ApiState, JsonApi};
use tracing::warn;

const NAMES_PARAM: &str = "names";
const GROUP_PARAM: &str = "group";

fn flags(state: &ApiState) -> Result<&Flags, ApiError> {
    state.try_get_slice::<Flags>().map_err(|e| ApiError::internal(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/features/{feature_name}",
    params(("feature_name" = String, Path, description = "Feature name", example = "planner.board")),
    responses(
        (status = OK, description = "The feature as seen by the caller", body = FeatureSingle),
        (status = NOT_MODIFIED, description = "Unchanged since the given ETag"),
        (status = UNAUTHORIZED, description = "Invalid credential", body = ErrorDocument),
        (status = NOT_FOUND, description = "Unknown feature, or flags not loaded yet", body = ErrorDocument),
        (status = BAD_GATEWAY, description = "Identity service failure", body = ErrorDocument),
    ),
    tag = FEATURES_TAG,
)]
pub(super) async fn get_feature(
    State(state): State<ApiState>,
    Path(feature_name): Path<String>,
    caller: Caller,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = user_context(&caller);
    let Some(feature) = flags(&state)?.client.get_feature(&feature_name, &user) else {
        warn!(feature = %feature_name, "Feature not found");
        return Err(ApiError::not_found(format!("feature with name '{feature_name}' not found")));
    };

    let document = FeatureSingle { data: FeatureResource::from(&feature) };
    Ok(cached(&[feature], document, &headers))
}

#[utoipa::path(
    get,
    path = "/api/features",
    params(
        ("names" = Option<Vec<String>>, Query, description = "Feature names; repeat the parameter or separate with commas"),
        ("group" = Option<String>, Query, description = "Feature group: the feature itself and every `group.*` feature"),
    ),
    responses(
        (status = OK, description = "Features as seen by the caller, sorted by name", body = FeatureList),
        (status = NOT_MODIFIED, description = "Unchanged since the given ETag"),
        (status = BAD_REQUEST, description = "Neither names nor group given", body = ErrorDocument),
        (status = UNAUTHORIZED, description = "Invalid credential", body = ErrorDocument),
        (status = BAD_GATEWAY, description = "Identity service failure", body = ErrorDocument),
    ),
    tag = FEATURES_TAG,
)]
pub(super) async fn list_features(
    State(state): State<ApiState>,
    Query(query): Query<Vec<(String, String)>>,
    caller: Caller,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let selection = Selection::parse(&query)?;
    let user = user_context(&caller);
    let client = &flags(&state)?.client;

    let mut features = match selection {
        Selection::Names(names) => client.get_features_by_name(&names, &user),
        Selection::Group(group) => client.get_features_by_pattern(group, &user),
    };
    features.sort_by(|a, b| a.name.cmp(&b.name));

    let document = FeatureList { data: features.iter().map(FeatureResource::from).collect() };
    Ok(cached(&features, document, &headers))
}

/// Which features a list request asks for. Names take precedence over a group.
#[derive(Debug, PartialEq, Eq)]
enum Selection<'a> {
    Names(Vec<&'a str>),
    Group(&'a str),
}

impl<'a> Selection<'a> {
    fn parse(query: &'a [(String, String)]) -> Result<Self, ApiError> {
        let names: Vec<&str> = query
            .iter()
            .filter(|(key, _)| key == NAMES_PARAM)
            .flat_map(|(_, value)| value.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        if !names.is_empty() {
            return Ok(Self::Names(names));
        }

        query
            .iter()
            .find(|(key, value)| key == GROUP_PARAM && !value.trim().is_empty())
            .map(|(_, value)| Self::Group(value.trim()))
            .ok_or_else(|| ApiError::bad_request("either 'names' or 'group' must be provided"))
    }
}

fn cached<T: Serialize>(features: &[UserFeature], document: T, headers: &HeaderMap) -> Response {
    let tag = etag::compute(features);
    let Ok(tag_value) = HeaderValue::from_str(&tag) else {
        return JsonApi(document).into_response();
    };
    let validators = [
        (header::CACHE_CONTROL, HeaderValue::from_static("private, no-cache")),
        (header::ETAG, tag_value),
    ];

    if etag::matches(headers, &tag) {
        return (StatusCode::NOT_MODIFIED, validators).into_response();
    }
    (validators, JsonApi(document)).into_response()
}
