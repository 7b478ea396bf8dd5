//! HTTP surface: axum router, JSON endpoints, and the embedded front end.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::app_router;
pub use server::{start_server, ServerHandle};
pub use types::ApiContext;
