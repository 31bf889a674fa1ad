#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use user_processing::services::pipeline_service::{
    MissingPayloadPolicy, PipelineConfig, ProbePolicy,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct MockUserApi {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockUserApi {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    body: Arc<String>,
    failures_left: Arc<AtomicUsize>,
    hits: Arc<AtomicUsize>,
}

async fn serve_user(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let failing = state
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.body.as_str().to_owned(),
    )
        .into_response()
}

/// Serve `body` on `GET /api/` after answering 503 to the first `failures`
/// requests.
pub async fn spawn_user_api(body: impl Into<String>, failures: usize) -> MockUserApi {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = MockState {
        body: Arc::new(body.into()),
        failures_left: Arc::new(AtomicUsize::new(failures)),
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/api/", get(serve_user))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock api");
    let addr = listener.local_addr().expect("mock api addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock api server");
    });

    MockUserApi {
        base_url: format!("http://{}", addr),
        hits,
    }
}

pub fn user_payload(email: &str) -> JsonValue {
    json!({
        "results": [{
            "email": email,
            "name": { "first": "A", "last": "B" },
            "location": { "country": "US" },
            "login": { "username": "ab", "password": "p" }
        }]
    })
}

pub fn temp_path(ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("user-processing-{}.{}", Uuid::new_v4(), ext))
}

pub async fn test_pool() -> SqlitePool {
    let url = format!("sqlite://{}", temp_path("db").display());
    user_processing::database::pool::create_pool(&url)
        .await
        .expect("pool")
}

pub fn pipeline_config(base_url: &str, policy: MissingPayloadPolicy) -> PipelineConfig {
    PipelineConfig {
        api_base_url: base_url.to_string(),
        api_endpoint: "api/".to_string(),
        users_csv_path: temp_path("csv"),
        probe: ProbePolicy {
            interval: Duration::from_millis(10),
            max_attempts: 3,
        },
        missing_payload_policy: policy,
    }
}
