// system-tests/tests/helpers/stub.rs
// ============================================================================
// Module: Service Stubs
// Description: In-process stand-ins for the food-truck API and mock provider.
// Purpose: Exercise every contract check without Docker or a live provider.
// Dependencies: axum, serde_json, tokio
// ============================================================================

//! ## Overview
//! Each stub runs an axum server on its own thread and current-thread runtime
//! and shuts down gracefully when its handle drops. Behaviour switches let a
//! test break one contract at a time to prove the checks notice.

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use food_truck_harness::CoordinateBounds;
use food_truck_harness::models::API_KEY_HEADER;
use food_truck_harness::models::VALID_API_KEY;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tokio::time::sleep;

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for a stub server; dropping it stops the server.
pub struct StubHandle {
    base_url: String,
    hits: Arc<AtomicU32>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubHandle {
    /// Returns the stub base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests served.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn spawn_router(app: Router, hits: Arc<AtomicU32>) -> Result<StubHandle, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("stub listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("stub local addr failed: {err}"))?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(StubHandle {
        base_url: format!("http://{addr}"),
        hits,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

// ============================================================================
// SECTION: API Stub
// ============================================================================

/// Switches for the API stub.
#[derive(Debug, Clone, Copy)]
pub struct ApiStubBehavior {
    /// Delay applied before answering a search.
    pub search_delay: Duration,
    /// Answer out-of-range coordinates with 200 instead of 400.
    pub accept_out_of_range: bool,
    /// Documentation page requests answered with 503 before the first 200.
    pub docs_warmup_failures: u32,
}

impl Default for ApiStubBehavior {
    fn default() -> Self {
        Self {
            search_delay: Duration::ZERO,
            accept_out_of_range: false,
            docs_warmup_failures: 0,
        }
    }
}

#[derive(Clone)]
struct ApiState {
    behavior: ApiStubBehavior,
    hits: Arc<AtomicU32>,
    docs_requests: Arc<AtomicU32>,
    records: Arc<Vec<Value>>,
}

/// Records served by the API stub.
fn fixture_records() -> Vec<Value> {
    vec![
        json!({"applicant": "The Geez Freeze", "address": "3750 18TH ST", "latitude": 37.7617, "longitude": -122.4263}),
        json!({"applicant": "MOMO INNOVATION LLC", "address": "1 California St", "latitude": 37.7929, "longitude": -122.3971}),
        json!({"applicant": "Tacos El Flaco", "address": "2300 MISSION ST", "latitude": 37.7606, "longitude": -122.4190}),
        json!({"applicant": "Jose's Taqueria", "address": "500 18th St", "latitude": "37.7625", "longitude": "-122.3890"}),
    ]
}

/// Spawns the API stub.
pub fn spawn_api_stub(behavior: ApiStubBehavior) -> Result<StubHandle, String> {
    let hits = Arc::new(AtomicU32::new(0));
    let state = ApiState {
        behavior,
        hits: Arc::clone(&hits),
        docs_requests: Arc::new(AtomicU32::new(0)),
        records: Arc::new(fixture_records()),
    };
    let app = Router::new()
        .route("/api/food_trucks/search", get(handle_search))
        .route("/swagger/", get(handle_swagger_ui))
        .route("/swagger/v1/swagger.json", get(handle_openapi))
        .route("/swagger/swagger-ui.css", get(handle_css))
        .with_state(state);
    spawn_router(app, hits)
}

fn field_contains(record: &Value, field: &str, needle: &str) -> bool {
    record
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|value| value.to_uppercase().contains(&needle.to_uppercase()))
}

fn parse_coordinate(raw: Option<&String>) -> Result<Option<f64>, ()> {
    raw.map(|value| value.parse::<f64>().map_err(|_| ())).transpose()
}

async fn handle_search(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.search_delay.is_zero() {
        sleep(state.behavior.search_delay).await;
    }
    let (Ok(lat), Ok(lon)) =
        (parse_coordinate(params.get("lat")), parse_coordinate(params.get("lon")))
    else {
        return (StatusCode::BAD_REQUEST, "invalid coordinates").into_response();
    };
    if !state.behavior.accept_out_of_range
        && !CoordinateBounds::WGS84.contains(lat.unwrap_or(0.0), lon.unwrap_or(0.0))
    {
        return (StatusCode::BAD_REQUEST, "coordinates out of range").into_response();
    }
    let matches: Vec<Value> = state
        .records
        .iter()
        .filter(|record| params.get("name").is_none_or(|name| field_contains(record, "applicant", name)))
        .filter(|record| {
            params.get("street").is_none_or(|street| field_contains(record, "address", street))
        })
        .cloned()
        .collect();
    Json(matches).into_response()
}

async fn handle_swagger_ui(State(state): State<ApiState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let seen = state.docs_requests.fetch_add(1, Ordering::SeqCst);
    if seen < state.behavior.docs_warmup_failures {
        return (StatusCode::SERVICE_UNAVAILABLE, "starting").into_response();
    }
    Html("<!DOCTYPE html><html><head><title>Swagger UI</title></head><body></body></html>")
        .into_response()
}

async fn handle_openapi(State(state): State<ApiState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "openapi": "3.0.1",
        "info": {"title": "FoodTruckApi", "version": "1.0"},
        "paths": {"/api/food_trucks/search": {"get": {}}}
    }))
}

async fn handle_css(State(state): State<ApiState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], ".swagger-ui { color: #3b4151; }")
}

// ============================================================================
// SECTION: Mock Provider Stub
// ============================================================================

/// Switches for the mock provider stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockStubBehavior {
    /// Accept any API key, including a wrong one.
    pub accept_any_key: bool,
}

#[derive(Clone)]
struct MockState {
    behavior: MockStubBehavior,
    hits: Arc<AtomicU32>,
}

/// Spawns the mock provider stub.
pub fn spawn_mock_provider_stub(behavior: MockStubBehavior) -> Result<StubHandle, String> {
    let hits = Arc::new(AtomicU32::new(0));
    let state = MockState {
        behavior,
        hits: Arc::clone(&hits),
    };
    let app = Router::new()
        .route("/external-check/truck-permit-status", get(handle_permit_status))
        .fallback(handle_unmatched)
        .with_state(state);
    spawn_router(app, hits)
}

async fn handle_permit_status(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let key = headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok());
    match key {
        None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        Some(key) if key == VALID_API_KEY || state.behavior.accept_any_key => {
            Json(json!({"status": "ACTIVE", "permit_valid": true})).into_response()
        }
        Some(_) => (StatusCode::NOT_FOUND, "No stub mapping matched").into_response(),
    }
}

async fn handle_unmatched(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::NOT_FOUND, "No stub mapping matched").into_response()
}
