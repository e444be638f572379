use crate::components::feed_service::FeedActorHandle;
use crate::components::RunningTask;
use crate::config::Config;
use crate::error::BoardResult;
use crate::presenter::Presenter;
use crate::utils::time::{countdown, fmt_clock, Countdown, Timestamp};
use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use rust_i18n::t;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The clock ticks once per second
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Render the clock line with the countdown to `target`
pub fn render_clock(now: &Timestamp, target: &Timestamp) -> String {
    let (date, time) = fmt_clock(now);
    let remaining = match countdown(target, now) {
        Countdown::Remaining {
            days,
            hours,
            minutes,
            seconds,
        } if days == 1 => t!(
            "countdown_one_day",
            hours = format!("{:02}", hours),
            minutes = format!("{:02}", minutes),
            seconds = format!("{:02}", seconds)
        )
        .to_string(),
        Countdown::Remaining {
            days,
            hours,
            minutes,
            seconds,
        } => t!(
            "countdown",
            days = days,
            hours = format!("{:02}", hours),
            minutes = format!("{:02}", minutes),
            seconds = format!("{:02}", seconds)
        )
        .to_string(),
        Countdown::Finished => t!("schools_out").to_string(),
    };
    format!("{} {} | {}", date, time, remaining)
}

/// Render the clock every tick until `token` is cancelled
pub async fn run_clock_loop(
    tz: Tz,
    target: Timestamp,
    presenter: Arc<dyn Presenter>,
    token: CancellationToken,
) {
    let mut ticker = interval(CLOCK_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Clock loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                let now = Utc::now().with_timezone(&tz);
                presenter.clock(&render_clock(&now, &target));
            }
        }
    }
}

/// Live date/time and end-of-school countdown
#[derive(Default)]
pub struct Clock {
    task: RwLock<Option<RunningTask>>,
}

impl Clock {
    /// Create a new clock component
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::Component for Clock {
    fn name(&self) -> &'static str {
        "clock"
    }

    async fn init(
        &self,
        presenter: Arc<dyn Presenter>,
        config: Arc<RwLock<Config>>,
        _feed: FeedActorHandle,
    ) -> BoardResult<()> {
        let (tz, target) = {
            let config_read = config.read().await;
            (config_read.tz()?, config_read.countdown_target_at()?)
        };
        info!("Counting down to {}", target);

        let mut task_lock = self.task.write().await;
        if task_lock.is_none() {
            let token = CancellationToken::new();
            let handle = tokio::spawn(run_clock_loop(tz, target, presenter, token.clone()));
            *task_lock = Some(RunningTask::new(token, handle));
        }

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
