//! Service layer: HTTP router assembly

pub mod http;

pub use self::http::{build_app, build_router};
