use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use flight_routes::config::ClientConfig;
use flight_routes::services::{
    Credentials, FlightStore, HttpTransport, StaticAuthenticator, Transport,
};
use flight_routes::RouteStore;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADMIN_TOKEN: &str = "admin-token";

/// In-memory stand-in for the booking backend.
#[derive(Default)]
pub struct MockBackend {
    pub routes: Mutex<Vec<Value>>,
    pub flights: Mutex<Vec<Value>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_listing: AtomicBool,
    pub list_delay: Mutex<Option<Duration>>,
    next_id: AtomicU32,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn with_routes(routes: Vec<Value>) -> Arc<Self> {
        let backend = MockBackend::default();
        *backend.routes.lock().unwrap() = routes;
        Arc::new(backend)
    }

    pub fn set_flights(&self, flights: Vec<Value>) {
        *self.flights.lock().unwrap() = flights;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", ADMIN_TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        Some(_) => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid token"})),
        )
            .into_response()),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Authentication required"})),
        )
            .into_response()),
    }
}

async fn list_routes(State(backend): State<Arc<MockBackend>>) -> Response {
    backend.record("GET /routes".to_string());

    let delay = *backend.list_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if backend.fail_listing.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Database unavailable"})),
        )
            .into_response();
    }

    let routes = backend.routes.lock().unwrap().clone();
    Json(Value::Array(routes)).into_response()
}

async fn create_route(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    backend.record("POST /routes".to_string());
    if let Err(denied) = authorize(&headers) {
        return denied;
    }

    let id = format!("route-{}", backend.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    body["_id"] = json!(id);
    backend.routes.lock().unwrap().push(body.clone());

    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_route(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    backend.record(format!("PUT /routes/{}", id));
    if let Err(denied) = authorize(&headers) {
        return denied;
    }

    let mut routes = backend.routes.lock().unwrap();
    let Some(route) = routes.iter_mut().find(|r| r["_id"] == id.as_str()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Route not found"})),
        )
            .into_response();
    };

    if let (Some(target), Some(fields)) = (route.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }

    Json(route.clone()).into_response()
}

async fn delete_route(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    backend.record(format!("DELETE /routes/{}", id));
    if let Err(denied) = authorize(&headers) {
        return denied;
    }

    let mut routes = backend.routes.lock().unwrap();
    let before = routes.len();
    routes.retain(|r| r["_id"] != id.as_str());
    if routes.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Route not found"})),
        )
            .into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}

async fn list_flights(State(backend): State<Arc<MockBackend>>) -> Json<Value> {
    backend.record("GET /flights".to_string());
    Json(Value::Array(backend.flights.lock().unwrap().clone()))
}

/// Serve the mock on an ephemeral port and return its API base URL.
pub async fn spawn_backend(backend: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/api/routes", get(list_routes).post(create_route))
        .route("/api/routes/{id}", axum::routing::put(update_route).delete(delete_route))
        .route("/api/flights", get(list_flights))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend crashed");
    });

    format!("http://{}/api", addr)
}

/// Base URL of a port nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

#[allow(dead_code)]
pub fn admin_credentials() -> Credentials {
    Credentials {
        token: ADMIN_TOKEN.to_string(),
        user_id: "admin-1".to_string(),
        is_admin: true,
    }
}

/// Route store wired to `base_url` the way an application would wire it.
#[allow(dead_code)]
pub fn build_store(base_url: &str, credentials: Option<Credentials>) -> RouteStore {
    let config = ClientConfig {
        api_base_url: base_url.to_string(),
        ..ClientConfig::default()
    };
    build_store_with_config(&config, credentials)
}

#[allow(dead_code)]
pub fn build_store_with_config(config: &ClientConfig, credentials: Option<Credentials>) -> RouteStore {
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::from_config(config).expect("Failed to build transport"));
    let auth = Arc::new(match credentials {
        Some(credentials) => StaticAuthenticator::new(credentials),
        None => StaticAuthenticator::anonymous(),
    });
    let flights = Arc::new(FlightStore::new(transport.clone()));
    RouteStore::new(transport, auth, flights)
}
