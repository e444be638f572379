use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use classboard::components::feed_service::{self, FeedSource};
use classboard::components::fundraisers::scheduler::{run_refresh_loop, BoardSettings, BoardState};
use classboard::components::fundraisers::{EventBoard, ViewQuery};
use classboard::components::Fundraisers;
use classboard::config::Config;
use classboard::presenter::Presenter;
use classboard::startup::build_components;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Presenter that keeps every frame it is given
#[derive(Debug, Default)]
struct RecordingPresenter {
    boards: Mutex<Vec<String>>,
    clocks: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    fn boards(&self) -> Vec<String> {
        self.boards.lock().unwrap().clone()
    }

    fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn board(&self, frame: &str) {
        self.boards.lock().unwrap().push(frame.to_string());
    }

    fn clock(&self, frame: &str) {
        self.clocks.lock().unwrap().push(frame.to_string());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

fn stamp(offset: ChronoDuration) -> String {
    (Utc::now() + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn write_feeds(dir: &Path) {
    let fundraisers = json!([
        {
            "title": "Bake Sale",
            "location": "Main Lobby",
            "start": stamp(ChronoDuration::hours(-1)),
            "end": stamp(ChronoDuration::hours(2))
        },
        {
            "title": "Car Wash",
            "start": stamp(ChronoDuration::days(3)),
            "end": stamp(ChronoDuration::days(3) + ChronoDuration::hours(5))
        },
        {
            "title": "Fall Raffle",
            "start": stamp(ChronoDuration::days(-30))
        }
    ]);
    let today = Utc::now().date_naive();
    let school = json!([
        { "title": "Field Trip", "date": (today + ChronoDuration::days(10)).format("%Y-%m-%d").to_string() }
    ]);

    std::fs::write(dir.join("fundraisers.json"), fundraisers.to_string()).unwrap();
    std::fs::write(dir.join("events.json"), school.to_string()).unwrap();
}

fn settings(dir: &Path, view: &str) -> BoardSettings {
    BoardSettings {
        fundraisers: FeedSource::parse(dir.join("fundraisers.json").to_str().unwrap()).unwrap(),
        school_events: FeedSource::parse(dir.join("events.json").to_str().unwrap()).unwrap(),
        view: ViewQuery::from_query_string(view),
        live_limit: 3,
        refresh_every: Duration::from_secs(3600),
        feed_refresh_every: None,
    }
}

async fn wait_for_frame<F>(presenter: &RecordingPresenter, matches: F) -> String
where
    F: Fn(&str) -> bool,
{
    for _ in 0..200 {
        if let Some(frame) = presenter.boards().into_iter().find(|frame| matches(frame)) {
            return frame;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no matching board frame was rendered");
}

async fn wait_for_notice(presenter: &RecordingPresenter) -> String {
    for _ in 0..200 {
        if let Some(notice) = presenter.notices().into_iter().next() {
            return notice;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no notice was sent");
}

#[tokio::test]
async fn test_refresh_loop_renders_board() {
    let dir = tempfile::tempdir().unwrap();
    write_feeds(dir.path());

    let (feed, _feed_task) = feed_service::spawn();
    let presenter = Arc::new(RecordingPresenter::default());
    let token = CancellationToken::new();

    let handle = tokio::spawn(run_refresh_loop(
        BoardState::new(EventBoard::new(chrono_tz::UTC)),
        settings(dir.path(), "tab=all&sort=title"),
        feed.clone(),
        presenter.clone(),
        token.clone(),
    ));

    let frame = wait_for_frame(&presenter, |frame| frame.contains("Fall Raffle")).await;
    token.cancel();
    handle.await.unwrap();

    assert!(frame.contains("Happening Now\n  * Bake Sale [LIVE NOW]"));
    assert!(frame.contains("Next Up\n  * Car Wash ["));
    assert!(frame.contains("Next school event: Field Trip"));
    assert!(frame.contains("Fundraisers ?sort=title\n"));

    let listing: Vec<&str> = frame
        .lines()
        .skip_while(|line| !line.starts_with("Fundraisers"))
        .skip(1)
        .collect();
    assert_eq!(listing.len(), 3);
    assert!(listing[0].contains("Bake Sale"));
    assert!(listing[1].contains("Car Wash"));
    assert!(listing[2].contains("past"));
    assert!(listing[2].contains("Fall Raffle"));
    assert!(presenter.notices().is_empty());

    feed.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_refresh_loop_survives_missing_feed() {
    let dir = tempfile::tempdir().unwrap();
    write_feeds(dir.path());
    std::fs::remove_file(dir.path().join("events.json")).unwrap();

    let (feed, _feed_task) = feed_service::spawn();
    let presenter = Arc::new(RecordingPresenter::default());
    let token = CancellationToken::new();

    let handle = tokio::spawn(run_refresh_loop(
        BoardState::new(EventBoard::new(chrono_tz::UTC)),
        settings(dir.path(), "tab=live"),
        feed.clone(),
        presenter.clone(),
        token.clone(),
    ));

    let frame = wait_for_frame(&presenter, |frame| frame.contains("Bake Sale")).await;
    token.cancel();
    handle.await.unwrap();

    let notices = presenter.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Could not load"));
    assert!(notices[0].contains("events.json"));

    // The fundraiser board still renders without the school line
    assert!(frame.contains("Bake Sale"));
    assert!(!frame.contains("school event"));
    assert!(frame.contains("Fundraisers ?tab=live\n"));
    assert!(!frame.contains("Fall Raffle"));

    feed.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_components_start_and_stop() {
    let dir = tempfile::tempdir().unwrap();
    write_feeds(dir.path());

    let mut config = Config::default();
    config.fundraisers_feed = dir.path().join("fundraisers.json").display().to_string();
    config.school_events_feed = dir.path().join("events.json").display().to_string();
    config.refresh_interval = 3600;
    config.components.insert("clock".to_string(), false);
    let config = Arc::new(RwLock::new(config));

    let (feed, feed_task) = feed_service::spawn();
    let presenter = Arc::new(RecordingPresenter::default());
    let manager = build_components(Arc::clone(&config));

    manager.init_all(presenter.clone(), feed.clone()).await.unwrap();

    let fundraisers = manager
        .get_component_by_name("fundraisers")
        .and_then(|component| component.as_any().downcast_ref::<Fundraisers>())
        .unwrap();
    assert!(fundraisers.is_running().await);
    assert!(manager.get_component_by_name("clock").is_some());

    wait_for_frame(&presenter, |frame| frame.contains("Bake Sale")).await;
    assert!(presenter.clocks.lock().unwrap().is_empty());

    manager.shutdown_all().await.unwrap();
    assert!(!fundraisers.is_running().await);

    feed.shutdown().await.unwrap();
    feed_task.await.unwrap();
}

#[tokio::test]
async fn test_refresh_loop_keeps_rendering_while_feed_hangs() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept connections and hold them open without ever answering
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let settings = BoardSettings {
        fundraisers: FeedSource::parse(&format!("http://{}/fundraisers.json", addr)).unwrap(),
        school_events: FeedSource::parse(&format!("http://{}/events.json", addr)).unwrap(),
        view: ViewQuery::default(),
        live_limit: 3,
        refresh_every: Duration::from_millis(50),
        feed_refresh_every: Some(Duration::from_millis(50)),
    };

    let (feed, _feed_task) = feed_service::spawn();
    let presenter = Arc::new(RecordingPresenter::default());
    let token = CancellationToken::new();

    let handle = tokio::spawn(run_refresh_loop(
        BoardState::new(EventBoard::new(chrono_tz::UTC)),
        settings,
        feed.clone(),
        presenter.clone(),
        token.clone(),
    ));

    // The empty board renders while both requests are outstanding
    let frame = wait_for_frame(&presenter, |frame| frame.contains("Nothing live right this minute")).await;
    assert!(frame.contains("No upcoming fundraisers [TBD]"));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(presenter.boards().len() >= 2);
    assert!(presenter.notices().is_empty());

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("refresh loop should stop promptly once cancelled")
        .unwrap();

    feed.shutdown().await.unwrap();
    server.abort();
}

#[tokio::test]
async fn test_failed_refetch_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_feeds(dir.path());

    let mut settings = settings(dir.path(), "");
    settings.feed_refresh_every = Some(Duration::from_millis(20));

    let (feed, _feed_task) = feed_service::spawn();
    let presenter = Arc::new(RecordingPresenter::default());
    let token = CancellationToken::new();

    let handle = tokio::spawn(run_refresh_loop(
        BoardState::new(EventBoard::new(chrono_tz::UTC)),
        settings,
        feed.clone(),
        presenter.clone(),
        token.clone(),
    ));

    wait_for_frame(&presenter, |frame| frame.contains("Fall Raffle")).await;
    assert!(presenter.notices().is_empty());

    std::fs::write(dir.path().join("fundraisers.json"), "[{").unwrap();

    let notice = wait_for_notice(&presenter).await;
    assert!(notice.starts_with("Could not load"));
    assert!(notice.contains("fundraisers.json"));

    // Let a few more failed re-fetches go by
    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();
    handle.await.unwrap();

    let frames = presenter.boards();
    let last = frames.last().unwrap();
    assert!(last.contains("Bake Sale"));
    assert!(last.contains("Car Wash"));
    assert!(last.contains("Fall Raffle"));
    assert!(last.contains("Next school event: Field Trip"));
    assert!(presenter
        .notices()
        .iter()
        .all(|notice| notice.contains("fundraisers.json")));

    feed.shutdown().await.unwrap();
}
