#![cfg(feature = "server")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use toggles_domain::config::{ApiConfig, IdentityConfig};
use toggles_identity::{BearerToken, Caller};
use toggles_kernel::server::ApiState;
use tower::ServiceExt;

async fn spawn_identity_service() -> String {
    let app = Router::new().route(
        "/api/user",
        get(|headers: axum::http::HeaderMap| async move {
            match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                Some("Bearer jane") => Json(json!({
                    "data": { "attributes": { "email": "jane@redhat.com", "emailVerified": true } }
                }))
                .into_response(),
                Some("Bearer boom") => StatusCode::SERVICE_UNAVAILABLE.into_response(),
                _ => StatusCode::UNAUTHORIZED.into_response(),
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("identity service");
    });
    format!("http://{address}")
}

async fn app() -> Router {
    let url = spawn_identity_service().await;
    let slice = toggles_identity::init(&IdentityConfig { url, ..IdentityConfig::default() })
        .expect("identity slice");
    let state =
        ApiState::builder().config(ApiConfig::default()).register_slice(slice).build().expect("state");

    Router::new()
        .route(
            "/whoami",
            get(|Caller(profile): Caller| async move {
                Json(json!({ "email": profile.and_then(|p| p.email.clone()) }))
            }),
        )
        .route("/token", get(|BearerToken(token): BearerToken| async move { Json(json!({ "token": token })) }))
        .with_state(state)
}

async fn call(app: Router, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    let response = app.oneshot(request.body(Body::empty()).expect("request")).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn anonymous_requests_have_no_profile() {
    let (status, body) = call(app().await, "/whoami", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], Value::Null);
}

#[tokio::test]
async fn bearer_tokens_resolve_to_profiles() {
    let (status, body) = call(app().await, "/whoami", Some("Bearer jane")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@redhat.com");
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let (_, body) = call(app().await, "/token", Some("bearer  abc ")).await;
    assert_eq!(body["token"], "abc");
}

#[tokio::test]
async fn malformed_authorization_is_unauthorized() {
    let (status, body) = call(app().await, "/token", Some("Basic dXNlcjpwYXNz")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["status"], "401");

    let (status, _) = call(app().await, "/token", Some("Bearer ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejected_tokens_are_unauthorized() {
    let (status, _) = call(app().await, "/whoami", Some("Bearer stale")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identity_outages_are_bad_gateway() {
    let (status, body) = call(app().await, "/whoami", Some("Bearer boom")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errors"][0]["title"], "Bad Gateway");
}
