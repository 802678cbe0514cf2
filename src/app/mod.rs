pub mod cli;
pub mod error;
pub mod logging;
pub mod server;

// Re-export commonly used types
pub use cli::{CliApp, shutdown_signal};
pub use error::AppError;
pub use logging::init_tracing;
pub use server::run_server;
