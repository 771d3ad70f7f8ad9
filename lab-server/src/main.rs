use lab_server::utils::logger;
use lab_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    logger::init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Starting lab member registry"
    );

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);
    server.run().await?;

    Ok(())
}
