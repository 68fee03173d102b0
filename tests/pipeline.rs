//! End-to-end checks of the request pipeline over real HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use mindwell_client::api::{mood, profile};
use mindwell_client::{
    ApiClient, AuthTokens, ClientConfig, Error, MemoryStorage, Role, Session, UserId,
};
use serde_json::{Value as JsonValue, json};
use tracing_subscriber::EnvFilter;
use url::Url;

const FRESH_TOKEN: &str = "access-2";

#[derive(Clone, Default)]
struct Backend {
    refreshes: Arc<AtomicUsize>,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response()
}

async fn entries(headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(FRESH_TOKEN) {
        return unauthorized();
    }
    Json(json!({
        "success": true,
        "data": [{
            "id": 1,
            "userId": "u-1",
            "mood": "Calm",
            "intensity": 4,
            "recordedAt": "2025-03-01T08:00:00"
        }]
    }))
    .into_response()
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<JsonValue>) -> Response {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    if body["refreshToken"] != "refresh-1" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Refresh token revoked" })))
            .into_response();
    }
    Json(json!({
        "success": true,
        "data": { "accessToken": FRESH_TOKEN, "refreshToken": "refresh-2" }
    }))
    .into_response()
}

async fn picture(headers: HeaderMap, body: Bytes) -> Response {
    if bearer(&headers) != Some(FRESH_TOKEN) {
        return unauthorized();
    }
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&body);
    if !is_multipart || !body.contains("filename=\"me.png\"") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({
        "success": true,
        "data": { "profilePictureUrl": "https://cdn.example/u-1.png" }
    }))
    .into_response()
}

struct Running {
    client: ApiClient,
    backend: Backend,
    redirects: Arc<Mutex<Vec<String>>>,
}

async fn start(tokens: AuthTokens) -> Running {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let backend = Backend::default();
    let app = Router::new()
        .route("/api/EmotionalStates/User/u-1", get(entries))
        .route("/api/Auth/RefreshToken", post(refresh))
        .route("/api/Profiles/Patient/u-1/Picture", put(picture))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{addr}/api/")).unwrap();
    let config = ClientConfig::new(base).with_user_agent("mindwell-client-tests");
    let session = Session::new(Arc::new(MemoryStorage::new()));
    session.store_tokens(&tokens).unwrap();

    let redirects: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = redirects.clone();
    let client = ApiClient::new(config, session)
        .unwrap()
        .with_navigator(move |route: &str| sink.lock().unwrap().push(route.to_owned()));

    Running {
        client,
        backend,
        redirects,
    }
}

#[tokio::test]
async fn expired_token_is_refreshed_transparently() {
    let running = start(AuthTokens::new("access-1", "refresh-1")).await;

    let entries = mood::list(&running.client, &UserId::from("u-1")).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(running.backend.refreshes.load(Ordering::SeqCst), 1);
    let session = running.client.session();
    assert_eq!(session.access_token().unwrap().as_deref(), Some(FRESH_TOKEN));
    assert_eq!(session.refresh_token().unwrap().as_deref(), Some("refresh-2"));
    assert!(running.redirects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn revoked_refresh_token_logs_out() {
    let running = start(AuthTokens::new("access-1", "revoked")).await;

    let err = mood::list(&running.client, &UserId::from("u-1")).await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(*running.redirects.lock().unwrap(), vec!["/login".to_owned()]);
    assert_eq!(running.client.session().access_token().unwrap(), None);
}

#[tokio::test]
async fn picture_upload_is_sent_as_multipart() {
    let running = start(AuthTokens::new(FRESH_TOKEN, "refresh-1")).await;

    let url = profile::upload_picture(
        &running.client,
        Role::Patient,
        &UserId::from("u-1"),
        "me.png",
        "image/png",
        vec![0x89, b'P', b'N', b'G'],
    )
    .await
    .unwrap();

    assert_eq!(url, "https://cdn.example/u-1.png");
    assert_eq!(running.backend.refreshes.load(Ordering::SeqCst), 0);
}
