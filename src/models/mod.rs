pub mod flight;
pub mod route;

pub use flight::{Flight, RouteRef};
pub use route::{NewRoute, Route, RoutePatch};
