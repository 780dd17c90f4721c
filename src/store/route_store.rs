use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{NewRoute, Route, RoutePatch};
use crate::services::api_client::{item_path, send_json, ApiRequest, Transport};
use crate::services::auth::Authenticator;
use crate::services::flight_index::FlightIndex;
use crate::store::notice::{Notice, NoticeBus};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Observable state of a [`RouteStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteState {
    pub routes: Vec<Route>,
    pub loading: bool,
    pub error: Option<String>,
}

enum DeleteOutcome {
    Deleted,
    InUse,
}

/// Client-side cache of the backend's route collection.
///
/// Operations never return errors: failures land in [`RouteState::error`] and
/// are published as failure notices. The state lock is never held across an
/// await, so concurrent operations interleave and the last response wins.
pub struct RouteStore {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn Authenticator>,
    flights: Arc<dyn FlightIndex>,
    notices: NoticeBus,
    state: RwLock<RouteState>,
}

impl RouteStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn Authenticator>,
        flights: Arc<dyn FlightIndex>,
    ) -> Self {
        RouteStore {
            transport,
            auth,
            flights,
            notices: NoticeBus::default(),
            state: RwLock::new(RouteState::default()),
        }
    }

    pub fn with_notices(mut self, notices: NoticeBus) -> Self {
        self.notices = notices;
        self
    }

    pub fn snapshot(&self) -> RouteState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.snapshot().routes
    }

    pub fn route(&self, id: &str) -> Option<Route> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .routes
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().unwrap_or_else(|e| e.into_inner()).loading
    }

    pub fn error(&self) -> Option<String> {
        self.snapshot().error
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Replace the local list with the backend's current collection.
    pub async fn refresh(&self) {
        self.update_state(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.fetch_routes().await {
            Ok(routes) => {
                tracing::info!(count = routes.len(), "Fetched {} routes", routes.len());
                self.update_state(|s| {
                    s.routes = routes;
                    s.loading = false;
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch routes: {}", e);
                self.update_state(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
            }
        }
    }

    /// Admin only. Appends the created record, then refreshes the whole list.
    pub async fn create(&self, new_route: NewRoute) {
        match self.try_create(&new_route).await {
            Ok(route) => {
                tracing::info!(
                    route_id = %route.id,
                    origin = %new_route.origin,
                    destination = %new_route.destination,
                    "Route created: {}",
                    route.id
                );
                self.update_state(|s| s.routes.push(route));
                self.notices.publish(Notice::success(MSG_ROUTE_ADDED));

                self.refresh().await;
            }
            Err(e) => self.record_failure("create", e, MSG_ROUTE_ADD_FAILED),
        }
    }

    /// Admin only. Refuses to delete a route that any cached flight uses.
    pub async fn delete(&self, id: &str) {
        if id.is_empty() {
            tracing::error!("Missing route ID, cannot delete");
            return;
        }

        match self.try_delete(id).await {
            Ok(DeleteOutcome::Deleted) => {
                tracing::info!(route_id = %id, "Route deleted: {}", id);
                self.update_state(|s| s.routes.retain(|r| r.id != id));
                self.notices.publish(Notice::success(MSG_ROUTE_DELETED));
            }
            Ok(DeleteOutcome::InUse) => {
                tracing::warn!(route_id = %id, "Route {} is referenced by a flight, not deleting", id);
                self.notices.publish(Notice::warning(MSG_ROUTE_IN_USE));
            }
            Err(e) => self.record_failure("delete", e, MSG_ROUTE_DELETE_FAILED),
        }
    }

    /// Admin only. Replaces the local entry with the backend's record; an id
    /// that is not in the local list is not inserted.
    pub async fn update(&self, id: &str, patch: RoutePatch) {
        if id.is_empty() {
            tracing::error!("Missing route ID, cannot update");
            return;
        }

        match self.try_update(id, &patch).await {
            Ok(mut route) => {
                route.id = id.to_string();
                let replaced = self.update_state(|s| {
                    match s.routes.iter_mut().find(|r| r.id == id) {
                        Some(slot) => {
                            *slot = route;
                            true
                        }
                        None => false,
                    }
                });

                if replaced {
                    tracing::info!(route_id = %id, "Route updated: {}", id);
                } else {
                    tracing::debug!(route_id = %id, "Updated route {} is not cached locally", id);
                }
                self.notices.publish(Notice::success(MSG_ROUTE_UPDATED));
            }
            Err(e) => self.record_failure("update", e, MSG_ROUTE_UPDATE_FAILED),
        }
    }

    async fn fetch_routes(&self) -> Result<Vec<Route>> {
        let routes: Vec<Route> =
            send_json(self.transport.as_ref(), ApiRequest::get(ROUTES_PATH)).await?;

        if let Some(pos) = routes.iter().position(|r| !r.has_id()) {
            return Err(AppError::InvalidResponse(format!(
                "Route at position {} has no identifier",
                pos
            )));
        }
        Ok(routes)
    }

    async fn try_create(&self, new_route: &NewRoute) -> Result<Route> {
        let token = self.require_admin("create")?;
        let request = ApiRequest::post(ROUTES_PATH).json(new_route)?.bearer(token);

        let route: Route = send_json(self.transport.as_ref(), request).await?;
        if !route.has_id() {
            return Err(AppError::InvalidResponse(
                "Created route has no identifier".to_string(),
            ));
        }
        Ok(route)
    }

    async fn try_delete(&self, id: &str) -> Result<DeleteOutcome> {
        let token = self.require_admin("delete")?;

        if self.flights.is_empty() {
            tracing::debug!("Flight cache empty, fetching before route delete");
            self.flights.fetch_flights().await?;
        }

        if self.flights.route_in_use(id) {
            return Ok(DeleteOutcome::InUse);
        }

        let request = ApiRequest::delete(item_path(ROUTES_PATH, id)).bearer(token);
        self.transport.send(request).await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn try_update(&self, id: &str, patch: &RoutePatch) -> Result<Route> {
        let token = self.require_admin("update")?;
        let request = ApiRequest::put(item_path(ROUTES_PATH, id))
            .json(patch)?
            .bearer(token);

        send_json(self.transport.as_ref(), request).await
    }

    fn require_admin(&self, operation: &str) -> Result<String> {
        self.auth.admin_token().ok_or_else(|| {
            tracing::warn!(operation, "Route {} denied: caller is not an admin", operation);
            AppError::PermissionDenied(MSG_ACCESS_DENIED.to_string())
        })
    }

    fn record_failure(&self, operation: &str, error: AppError, fallback: &str) {
        let message = match error.to_string() {
            m if m.is_empty() => fallback.to_string(),
            m => m,
        };

        if error.is_local() {
            tracing::warn!(operation, error = %message, "Route {} rejected: {}", operation, message);
        } else {
            tracing::error!(
                operation,
                status = ?error.status(),
                error = %message,
                "Route {} failed: {}",
                operation, message
            );
        }

        self.update_state(|s| s.error = Some(message));
        self.notices.publish(Notice::failure(fallback));
    }

    fn update_state<R>(&self, f: impl FnOnce(&mut RouteState) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(|e| e.into_inner()))
    }
}
