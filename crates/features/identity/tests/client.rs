use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use toggles_domain::config::IdentityConfig;
use toggles_identity::{IdentityClient, IdentityError};

/// Serves `/api/user` like the identity service and counts the calls it receives.
async fn spawn_identity_service(hits: Arc<AtomicUsize>) -> String {
    let app = Router::new().route(
        "/api/user",
        get(move |headers: HeaderMap| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
                match auth {
                    Some("Bearer jane") => Json(json!({
                        "data": {
                            "type": "identities",
                            "attributes": {
                                "email": "jane@redhat.com",
                                "emailVerified": true,
                                "featureLevel": "experimental"
                            }
                        }
                    }))
                    .into_response(),
                    Some("Bearer broken") => (StatusCode::OK, "not json").into_response(),
                    Some("Bearer boom") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
                    _ => (StatusCode::UNAUTHORIZED, "token expired").into_response(),
                }
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

async fn client(hits: &Arc<AtomicUsize>) -> IdentityClient {
    let url = spawn_identity_service(Arc::clone(hits)).await;
    IdentityClient::new(&IdentityConfig { url, ..IdentityConfig::default() }).expect("client")
}

#[tokio::test]
async fn resolves_and_caches_profiles() {
    let hits = Arc::new(AtomicUsize::new(0));
    let client = client(&hits).await;

    let profile = client.user("jane").await.expect("profile");
    assert_eq!(profile.email.as_deref(), Some("jane@redhat.com"));
    assert!(profile.email_verified);
    assert_eq!(profile.feature_level.as_deref(), Some("experimental"));

    let again = client.user("jane").await.expect("cached profile");
    assert_eq!(again, profile);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client.invalidate_all();
    client.user("jane").await.expect("refetched profile");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_tokens_are_unauthorized() {
    let hits = Arc::new(AtomicUsize::new(0));
    let client = client(&hits).await;

    let err = client.user("stale").await.expect_err("401");
    assert!(matches!(err, IdentityError::Unauthorized { ref message, .. } if message == "token expired"));
}

#[tokio::test]
async fn failures_are_not_cached() {
    let hits = Arc::new(AtomicUsize::new(0));
    let client = client(&hits).await;

    assert!(matches!(
        client.user("boom").await,
        Err(IdentityError::Status { status: 500, .. })
    ));
    assert!(matches!(client.user("broken").await, Err(IdentityError::Decode { .. })));
    assert!(client.user("boom").await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let config = IdentityConfig { url: "http://127.0.0.1:9".to_owned(), ..IdentityConfig::default() };
    let client = IdentityClient::new(&config).expect("client");
    assert!(matches!(client.user("jane").await, Err(IdentityError::Http { .. })));
}
