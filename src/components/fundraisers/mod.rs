pub mod engine;
pub mod models;
pub mod render;
pub mod scheduler;
pub mod time;

pub use engine::{classify, filter_events, sort_events, EventBoard, Summary};
pub use models::{ClassifiedEvent, Event, FeedRecord, SortKey, Status, Tab, ViewQuery};

use crate::components::feed_service::FeedActorHandle;
use crate::components::RunningTask;
use crate::config::Config;
use crate::error::BoardResult;
use crate::presenter::Presenter;
use async_trait::async_trait;
use scheduler::{run_refresh_loop, BoardSettings, BoardState};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Fundraiser board component: loads the feeds and keeps the board current
#[derive(Default)]
pub struct Fundraisers {
    task: RwLock<Option<RunningTask>>,
}

impl Fundraisers {
    /// Create a new fundraisers component
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the refresh loop is running
    pub async fn is_running(&self) -> bool {
        self.task.read().await.is_some()
    }
}

#[async_trait]
impl super::Component for Fundraisers {
    fn name(&self) -> &'static str {
        "fundraisers"
    }

    async fn init(
        &self,
        presenter: Arc<dyn Presenter>,
        config: Arc<RwLock<Config>>,
        feed: FeedActorHandle,
    ) -> BoardResult<()> {
        let (settings, tz) = {
            let config_read = config.read().await;
            (BoardSettings::from_config(&config_read)?, config_read.tz()?)
        };

        let mut task_lock = self.task.write().await;
        if task_lock.is_some() {
            tracing::warn!("Fundraiser refresh loop is already running, skipping initialization");
            return Ok(());
        }

        let token = CancellationToken::new();
        let state = BoardState::new(EventBoard::new(tz));
        let handle = tokio::spawn(run_refresh_loop(
            state,
            settings,
            feed,
            presenter,
            token.clone(),
        ));
        *task_lock = Some(RunningTask::new(token, handle));

        Ok(())
    }

    async fn shutdown(&self) -> BoardResult<()> {
        if let Some(task) = self.task.write().await.take() {
            task.stop().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
