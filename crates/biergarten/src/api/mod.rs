//! HTTP API module.
//!
//! Public account routes plus the beer and brewery catalogue behind the
//! auth gate.

mod error;
mod handlers;
mod response;
mod routes;
mod server;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use response::ApiResponse;
pub use routes::create_router;
pub use server::ServerConfig;
pub use state::AppState;
