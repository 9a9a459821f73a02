//! HTTP API layer: routing, handlers, and error responses.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
