use atm::prelude::*;

fn main() {
    CliApp::new("atm-server")
        .with_args(parse_args)
        .run(serve);
}

/// Resolve configuration from the environment and an optional accounts file argument
fn parse_args(args: Vec<String>) -> Result<AtmConfig, AppError> {
    Ok(AtmConfig::from_env(&args)?)
}

async fn serve(config: AtmConfig) -> Result<(), AppError> {
    init_tracing(config.log_json);
    run_server(config, shutdown_signal()).await
}
