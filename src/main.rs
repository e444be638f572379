use classboard::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting classboard");

    // Load configuration
    let config = startup::load_config().await?;

    // Run the board until a shutdown signal arrives
    startup::start_board(config).await
}
