use std::future::Future;

use tracing::{error, info};

use super::error::AppError;

/// Process runner that handles:
/// - Argument parsing into a typed value
/// - Tokio runtime construction
/// - Exit codes (0 = clean shutdown, 1 = error)
pub struct CliApp<A> {
    name: String,
    args: Result<A, AppError>,
}

impl CliApp<Vec<String>> {
    /// Create a runner over the process arguments
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Ok(std::env::args().collect()),
        }
    }
}

impl<A> CliApp<A> {
    /// Parse raw arguments; a parse failure exits with code 1 in `run`
    pub fn with_args<T, P>(self, parse: P) -> CliApp<T>
    where
        P: FnOnce(A) -> Result<T, AppError>,
    {
        CliApp {
            name: self.name,
            args: self.args.and_then(parse),
        }
    }

    /// Run `main_fn` on a multi-threaded runtime and exit the process
    ///
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let name = self.name.clone();
        match self.execute(main_fn) {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                error!(error = %e, "{name} failed");
                eprintln!("{name}: {e}");
                std::process::exit(1);
            }
        }
    }

    fn execute<F, Fut>(self, main_fn: F) -> Result<(), AppError>
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let args = self.args?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(main_fn(args))
    }
}

/// Resolves on SIGINT or SIGTERM (Ctrl+C on non-Unix targets)
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    }
}
