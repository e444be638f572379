use chrono::Utc;
use futures::future::join;
use lazy_static::lazy_static;
use rust_i18n::t;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::EventBoard;
use super::models::{FeedRecord, ViewQuery};
use super::render::{render_board, school_line};
use crate::components::feed_service::{feed_entries, FeedActorHandle, FeedSource};
use crate::components::school_events::{next_school_event, parse_school_events, SchoolEvent};
use crate::config::Config;
use crate::error::BoardResult;
use crate::presenter::Presenter;
use crate::utils::time::Timestamp;

lazy_static! {
    static ref REFRESH_LOOPS: AtomicU32 = AtomicU32::new(0);
}

/// Everything the refresh loop needs from the configuration
#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub fundraisers: FeedSource,
    pub school_events: FeedSource,
    pub view: ViewQuery,
    pub live_limit: usize,
    pub refresh_every: Duration,
    pub feed_refresh_every: Option<Duration>,
}

impl BoardSettings {
    pub fn from_config(config: &Config) -> BoardResult<Self> {
        Ok(Self {
            fundraisers: FeedSource::parse(&config.fundraisers_feed)?,
            school_events: FeedSource::parse(&config.school_events_feed)?,
            view: config.initial_view(),
            live_limit: config.live_limit,
            refresh_every: config.refresh_every(),
            feed_refresh_every: config.feed_refresh_every(),
        })
    }
}

/// Raw documents from one round of feed requests
#[derive(Debug)]
pub struct FetchedFeeds {
    pub fundraisers: BoardResult<Value>,
    pub school_events: BoardResult<Value>,
}

/// Request both feeds concurrently
pub async fn fetch_feeds(feed: &FeedActorHandle, settings: &BoardSettings) -> FetchedFeeds {
    let (fundraisers, school_events) = join(
        feed.fetch(&settings.fundraisers),
        feed.fetch(&settings.school_events),
    )
    .await;
    FetchedFeeds {
        fundraisers,
        school_events,
    }
}

type PendingFetch = Pin<Box<dyn Future<Output = FetchedFeeds> + Send>>;

fn start_fetch(feed: &FeedActorHandle, settings: &BoardSettings) -> PendingFetch {
    let feed = feed.clone();
    let settings = settings.clone();
    Box::pin(async move { fetch_feeds(&feed, &settings).await })
}

/// The fundraiser board plus the school calendar shown beside it
#[derive(Debug, Clone)]
pub struct BoardState {
    pub board: EventBoard,
    /// `None` until the school feed loads successfully
    pub school_events: Option<Vec<SchoolEvent>>,
}

impl BoardState {
    pub fn new(board: EventBoard) -> Self {
        Self {
            board,
            school_events: None,
        }
    }

    /// Replace the snapshots from a finished fetch.
    ///
    /// A feed that failed leaves its previous snapshot in place and sends a
    /// notice to the presenter.
    pub fn apply(&mut self, fetched: FetchedFeeds, settings: &BoardSettings, presenter: &dyn Presenter) {
        match fetched.fundraisers.and_then(|document| {
            let records = feed_entries(&document)?
                .into_iter()
                .filter_map(FeedRecord::from_value)
                .collect::<Vec<_>>();
            Ok(records)
        }) {
            Ok(records) => {
                let kept = self.board.replace(&records);
                info!(
                    "Loaded {} of {} fundraisers from {}",
                    kept,
                    records.len(),
                    settings.fundraisers
                );
            }
            Err(e) => {
                warn!("Failed to load {}: {}", settings.fundraisers, e);
                presenter.notice(&t!("feed_unavailable", source = settings.fundraisers.to_string()));
            }
        }

        match fetched
            .school_events
            .and_then(|document| parse_school_events(&document))
        {
            Ok(events) => {
                info!(
                    "Loaded {} school events from {}",
                    events.len(),
                    settings.school_events
                );
                self.school_events = Some(events);
            }
            Err(e) => {
                warn!("Failed to load {}: {}", settings.school_events, e);
                presenter.notice(&t!("feed_unavailable", source = settings.school_events.to_string()));
            }
        }
    }

    /// Reclassify at `now` and render the board
    pub fn render(&mut self, now: Timestamp, view: &ViewQuery, live_limit: usize) -> String {
        self.board.reclassify(now);
        let today = now.with_timezone(&self.board.tz()).date_naive();

        let next_school = self
            .school_events
            .as_deref()
            .and_then(|events| next_school_event(events, today));
        let school = school_line(self.school_events.as_deref(), next_school);

        render_board(
            &self.board.summary(live_limit),
            &self.board.view(view),
            view,
            school.as_deref(),
        )
    }
}

async fn tick_optional(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn wait_fetch(pending: &mut Option<PendingFetch>) -> FetchedFeeds {
    match pending {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

/// Load the feeds, then reclassify and render on every refresh tick until
/// `token` is cancelled. Feed requests run alongside the ticks, so the
/// board keeps rendering and the loop stays cancellable while one is
/// outstanding.
pub async fn run_refresh_loop(
    mut state: BoardState,
    settings: BoardSettings,
    feed: FeedActorHandle,
    presenter: Arc<dyn Presenter>,
    token: CancellationToken,
) {
    let instance = REFRESH_LOOPS.fetch_add(1, Ordering::SeqCst) + 1;
    if instance > 1 {
        warn!("Multiple refresh loops running: {}", instance);
    }
    info!(
        "Starting fundraiser refresh loop every {:?}",
        settings.refresh_every
    );

    let mut pending = Some(start_fetch(&feed, &settings));

    let mut refresh = interval(settings.refresh_every);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut refetch = settings.feed_refresh_every.map(|every| {
        let mut timer = interval_at(Instant::now() + every, every);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer
    });

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Fundraiser refresh loop cancelled");
                break;
            }
            fetched = wait_fetch(&mut pending) => {
                pending = None;
                state.apply(fetched, &settings, presenter.as_ref());
                let now = Utc::now().with_timezone(&state.board.tz());
                presenter.board(&state.render(now, &settings.view, settings.live_limit));
            }
            _ = refresh.tick() => {
                let now = Utc::now().with_timezone(&state.board.tz());
                let frame = state.render(now, &settings.view, settings.live_limit);
                debug!("Rendered board at {}", now);
                presenter.board(&frame);
            }
            _ = tick_optional(&mut refetch) => {
                if pending.is_some() {
                    debug!("Previous feed request still outstanding, skipping re-fetch");
                } else {
                    debug!("Re-fetching feeds");
                    pending = Some(start_fetch(&feed, &settings));
                }
            }
        }
    }

    REFRESH_LOOPS.fetch_sub(1, Ordering::SeqCst);
}
