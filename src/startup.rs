use crate::components::{feed_service, Clock, ComponentManager, Fundraisers};
use crate::config::Config;
use crate::error::other_error;
use crate::presenter::{ConsolePresenter, Presenter};
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Register the board's components
pub fn build_components(config: Arc<RwLock<Config>>) -> ComponentManager {
    let mut component_manager = ComponentManager::new(config);
    component_manager.register(Fundraisers::new());
    component_manager.register(Clock::new());
    component_manager
}

/// Start all components and run until a shutdown signal arrives
pub async fn start_board(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    // Set locale from config
    {
        let config_read = config.read().await;
        crate::utils::i18n::set_locale(&config_read.board_locale);
        info!("Setting locale to {}", config_read.board_locale);
    }

    // Spawn the feed actor
    let (feed_handle, feed_task) = feed_service::spawn();

    let component_manager = Arc::new(build_components(Arc::clone(&config)));
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter::new());

    component_manager
        .init_all(presenter, feed_handle.clone())
        .await?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    let shutdown_feed = feed_handle.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, shutdown_feed).await;
    });

    tokio::select! {
        result = feed_task => {
            info!("Feed actor ended");
            match result {
                Ok(()) => Ok(()),
                Err(e) => {
                    error!("Feed actor task error: {:?}", e);
                    Err(other_error(&format!("Feed actor task error: {}", e)).into())
                }
            }
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, board stopped");
            Ok(())
        }
    }
}
