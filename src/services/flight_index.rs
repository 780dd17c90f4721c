use crate::constants::FLIGHTS_PATH;
use crate::error::Result;
use crate::models::Flight;
use crate::services::api_client::{send_json, ApiRequest, Transport};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Read-only view of the flight cache used for the route referential check.
#[async_trait]
pub trait FlightIndex: Send + Sync {
    /// Snapshot of the currently cached flights.
    fn flights(&self) -> Vec<Flight>;

    /// Reload the cache from the backend.
    async fn fetch_flights(&self) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.flights().is_empty()
    }

    fn route_in_use(&self, route_id: &str) -> bool {
        self.flights().iter().any(|f| f.uses_route(route_id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlightState {
    pub flights: Vec<Flight>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Flight cache filled from `GET /flights`.
pub struct FlightStore {
    transport: Arc<dyn Transport>,
    state: RwLock<FlightState>,
}

impl FlightStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        FlightStore {
            transport,
            state: RwLock::new(FlightState::default()),
        }
    }

    pub fn snapshot(&self) -> FlightState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut FlightState) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl FlightIndex for FlightStore {
    fn flights(&self) -> Vec<Flight> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .flights
            .clone()
    }

    async fn fetch_flights(&self) -> Result<()> {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result: Result<Vec<Flight>> =
            send_json(self.transport.as_ref(), ApiRequest::get(FLIGHTS_PATH)).await;

        match result {
            Ok(flights) => {
                tracing::info!(count = flights.len(), "Fetched {} flights", flights.len());
                self.update(|s| {
                    s.flights = flights;
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch flights: {}", e);
                self.update(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct CannedTransport {
        responses: Mutex<Vec<Result<Value>>>,
        paths: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value> {
            self.paths.lock().unwrap().push(request.path);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn store_with(responses: Vec<Result<Value>>) -> (FlightStore, Arc<CannedTransport>) {
        let transport = Arc::new(CannedTransport {
            responses: Mutex::new(responses),
            paths: Mutex::new(Vec::new()),
        });
        (FlightStore::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_fetch_replaces_flights() {
        let (store, transport) = store_with(vec![Ok(json!([
            {"_id": "f1", "route": {"_id": "r1"}},
            {"_id": "f2"}
        ]))]);

        assert!(store.is_empty());
        store.fetch_flights().await.unwrap();

        assert_eq!(store.flights().len(), 2);
        assert!(store.route_in_use("r1"));
        assert!(!store.route_in_use("r2"));
        assert_eq!(transport.paths.lock().unwrap().as_slice(), ["/flights"]);
        assert!(!store.snapshot().loading);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_flights() {
        let (store, _) = store_with(vec![
            Ok(json!([{"_id": "f1", "route": "r1"}])),
            Err(AppError::Api {
                status: 500,
                message: "Server exploded".to_string(),
            }),
        ]);

        store.fetch_flights().await.unwrap();
        assert!(store.fetch_flights().await.is_err());

        let state = store.snapshot();
        assert_eq!(state.flights.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Server exploded"));
        assert!(!state.loading);
    }
}
