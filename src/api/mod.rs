//! HTTP JSON surface of the simulator.

pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;

pub use error::ApiError;
pub use response::ApiResponse;
pub use routes::{AppState, AtmService, build_router};
