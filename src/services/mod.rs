pub mod api_client;
pub mod auth;
pub mod flight_index;

pub use api_client::{ApiRequest, HttpTransport, Transport};
pub use auth::{Authenticator, Credentials, SessionAuthenticator, StaticAuthenticator};
pub use flight_index::{FlightIndex, FlightStore};
