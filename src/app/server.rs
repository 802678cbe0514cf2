use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use super::error::AppError;
use crate::api::{AppState, AtmService, build_router};
use crate::config::AtmConfig;

/// Load accounts, bind and serve until `shutdown` resolves
pub async fn run_server<S>(config: AtmConfig, shutdown: S) -> Result<(), AppError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let atm = AtmService::bootstrap(config.persistence()).await?;
    info!(
        accounts_file = %config.accounts_file.display(),
        persist = config.persist,
        "Accounts loaded"
    );

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "ATM server listening");

    axum::serve(listener, build_router(AppState::new(atm)))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("ATM server stopped");
    Ok(())
}
