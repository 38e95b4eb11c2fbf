use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use toggles_flags::{
    BackendListener, FlagBackend, Readiness, ToggleError, UnleashBackend, UnleashOptions,
};

#[derive(Debug, Default)]
struct FlagServer {
    hits: AtomicUsize,
    conditional_hits: AtomicUsize,
    failing: AtomicBool,
    headers_ok: AtomicBool,
}

async fn spawn_flag_server(server: Arc<FlagServer>) -> String {
    let app = Router::new().route(
        "/api/client/features",
        get(move |headers: HeaderMap| {
            let server = Arc::clone(&server);
            async move {
                server.hits.fetch_add(1, Ordering::SeqCst);
                let app_name = headers.get("unleash-appname").and_then(|v| v.to_str().ok());
                let instance = headers.get("unleash-instanceid").and_then(|v| v.to_str().ok());
                server
                    .headers_ok
                    .store(app_name == Some("toggles-test") && instance == Some("pod-1"), Ordering::SeqCst);

                if server.failing.load(Ordering::SeqCst) {
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
                if headers.get(header::IF_NONE_MATCH).is_some_and(|v| v == "\"v1\"") {
                    server.conditional_hits.fetch_add(1, Ordering::SeqCst);
                    return StatusCode::NOT_MODIFIED.into_response();
                }
                (
                    [(header::ETAG, "\"v1\"")],
                    axum::Json(json!({
                        "version": 1,
                        "features": [
                            {
                                "name": "planner",
                                "description": "Planner",
                                "enabled": true,
                                "strategies": [{ "name": "default", "parameters": {} }]
                            },
                            {
                                "name": "planner.board",
                                "enabled": true,
                                "strategies": [{ "name": "enableByLevel", "parameters": { "level": "beta" } }]
                            }
                        ]
                    })),
                )
                    .into_response()
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("flag server");
    });
    format!("http://{address}/api")
}

#[derive(Debug, Default)]
struct Recorder {
    readiness: Readiness,
    ready_calls: AtomicUsize,
    errors: AtomicUsize,
}

impl BackendListener for Recorder {
    fn on_ready(&self) {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        self.readiness.on_ready();
    }

    fn on_error(&self, error: &ToggleError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.readiness.on_error(error);
    }
}

fn options(url: String) -> UnleashOptions {
    UnleashOptions {
        url,
        app_name: "toggles-test".to_owned(),
        instance_id: "pod-1".to_owned(),
        refresh_interval: Duration::from_millis(50),
        request_timeout: Duration::from_secs(1),
    }
}

async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

#[tokio::test]
async fn first_sync_makes_features_available() {
    let server = Arc::new(FlagServer::default());
    let url = spawn_flag_server(Arc::clone(&server)).await;
    let recorder = Arc::new(Recorder::default());

    let backend = UnleashBackend::start(options(url), recorder.clone()).expect("backend");
    assert!(eventually(|| recorder.readiness.is_ready()).await, "backend never became ready");

    let planner = backend.feature("planner").expect("planner");
    assert_eq!(planner.description, "Planner");
    assert_eq!(planner.strategies[0].name, "default");
    assert!(server.headers_ok.load(Ordering::SeqCst));

    let pattern = regex::Regex::new(r"^planner\.").expect("regex");
    assert_eq!(backend.features_matching(&pattern).len(), 1);
}

async fn spawn_static_server(body: serde_json::Value) -> String {
    let app = Router::new().route(
        "/api/client/features",
        get(move || {
            let body = body.clone();
            async move { axum::Json(body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("flag server");
    });
    format!("http://{address}/api")
}

#[tokio::test]
async fn null_fields_and_malformed_entries_do_not_block_sync() {
    let url = spawn_static_server(json!({
        "version": 1,
        "features": [
            {
                "name": "planner",
                "description": null,
                "enabled": true,
                "strategies": [{ "name": "default", "parameters": null }]
            },
            { "name": "broken", "enabled": "yes", "strategies": [] },
            { "name": "planner.board", "enabled": true, "strategies": null }
        ]
    }))
    .await;
    let recorder = Arc::new(Recorder::default());

    let backend = UnleashBackend::start(options(url), recorder.clone()).expect("backend");
    assert!(eventually(|| recorder.readiness.is_ready()).await, "backend never became ready");

    let planner = backend.feature("planner").expect("planner");
    assert_eq!(planner.description, "");
    assert!(planner.strategies[0].parameters.is_empty());
    assert!(backend.is_enabled(&planner, &toggles_flags::Context::default()));
    assert!(backend.feature("planner.board").expect("board").strategies.is_empty());
    assert!(backend.feature("broken").is_none());
    assert_eq!(recorder.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refreshes_are_conditional_and_ready_fires_once() {
    let server = Arc::new(FlagServer::default());
    let url = spawn_flag_server(Arc::clone(&server)).await;
    let recorder = Arc::new(Recorder::default());

    let backend = UnleashBackend::start(options(url), recorder.clone()).expect("backend");
    assert!(eventually(|| server.conditional_hits.load(Ordering::SeqCst) >= 2).await);

    assert_eq!(recorder.ready_calls.load(Ordering::SeqCst), 1);
    assert!(backend.feature("planner.board").is_some());
}

#[tokio::test]
async fn failures_keep_the_last_snapshot() {
    let server = Arc::new(FlagServer::default());
    let url = spawn_flag_server(Arc::clone(&server)).await;
    let recorder = Arc::new(Recorder::default());

    let backend = UnleashBackend::start(options(url), recorder.clone()).expect("backend");
    assert!(eventually(|| recorder.readiness.is_ready()).await);

    server.failing.store(true, Ordering::SeqCst);
    assert!(eventually(|| recorder.errors.load(Ordering::SeqCst) >= 2).await);

    assert!(recorder.readiness.is_ready());
    assert!(backend.feature("planner").is_some());
}

#[tokio::test]
async fn unreachable_server_is_never_ready() {
    let recorder = Arc::new(Recorder::default());
    let _backend =
        UnleashBackend::start(options("http://127.0.0.1:9/api".to_owned()), recorder.clone()).expect("backend");

    assert!(eventually(|| recorder.errors.load(Ordering::SeqCst) >= 1).await);
    assert!(!recorder.readiness.is_ready());
}

#[tokio::test]
async fn invalid_url_fails_construction() {
    let recorder = Arc::new(Recorder::default());
    let result = UnleashBackend::start(options("f8toggles/api".to_owned()), recorder);
    assert!(matches!(result, Err(ToggleError::InvalidUrl { .. })));
}

#[tokio::test]
async fn closing_stops_polling() {
    let server = Arc::new(FlagServer::default());
    let url = spawn_flag_server(Arc::clone(&server)).await;
    let recorder = Arc::new(Recorder::default());

    let backend = UnleashBackend::start(options(url), recorder.clone()).expect("backend");
    assert!(eventually(|| recorder.readiness.is_ready()).await);

    backend.close();
    assert!(eventually(|| backend.is_closed()).await);
    let hits = server.hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.hits.load(Ordering::SeqCst), hits);
    assert!(backend.feature("planner").is_some());
}
