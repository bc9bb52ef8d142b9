use journal_service::config::JournalConfig;
use journal_service::startup::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing("journal-service", "info");

    // Load configuration - fail fast if invalid
    let config = JournalConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    tracing::info!(
        port = config.common.port,
        database = %config.mongodb.database,
        "Starting journal service"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await.map_err(AppError::from)?;

    Ok(())
}
