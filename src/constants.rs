//! Stable application-wide constants.
//!
//! Default fallbacks for env-var-based configuration, backend paths, and the
//! user-facing notice texts published by the stores.

// --- Client defaults (used when env vars are absent) ---

/// Default backend root. Overridden by `API_BASE_URL`.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Default capacity of the notice broadcast channel. Overridden by
/// `NOTICE_CHANNEL_CAPACITY`.
pub const DEFAULT_NOTICE_CHANNEL_CAPACITY: usize = 64;

// --- Backend paths ---

/// Route collection path; single routes live at `/routes/{id}`.
pub const ROUTES_PATH: &str = "/routes";
/// Flight collection path.
pub const FLIGHTS_PATH: &str = "/flights";

// --- Notice texts ---

pub const MSG_ACCESS_DENIED: &str = "Access Denied: Admins only";
pub const MSG_ROUTE_ADDED: &str = "Route added successfully!";
pub const MSG_ROUTE_ADD_FAILED: &str = "Failed to add route";
pub const MSG_ROUTE_DELETED: &str = "Route deleted successfully";
pub const MSG_ROUTE_DELETE_FAILED: &str = "Failed to delete route";
pub const MSG_ROUTE_IN_USE: &str = "Cannot delete route: It is used in one or more flights.";
pub const MSG_ROUTE_UPDATED: &str = "Route updated successfully!";
pub const MSG_ROUTE_UPDATE_FAILED: &str = "Failed to update route";
