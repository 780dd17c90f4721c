// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use store::{Notice, NoticeBus, NoticeLevel, RouteState, RouteStore};
