pub mod notice;
pub mod route_store;

pub use notice::{Notice, NoticeBus, NoticeLevel};
pub use route_store::{RouteState, RouteStore};
