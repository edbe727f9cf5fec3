//! HTTP API for the notebook

pub mod handlers;
pub mod routes;
pub mod thing_handlers;

pub use handlers::{AppError, ServerState, SharedState};
pub use routes::create_router;
