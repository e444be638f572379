use chrono::{Duration, TimeZone};
use chrono_tz::Tz;
use classboard::components::fundraisers::{
    classify, filter_events, sort_events, EventBoard, FeedRecord, SortKey, Status, Tab,
};
use classboard::utils::time::{parse_timestamp, Timestamp};

fn tz() -> Tz {
    chrono_tz::America::Chicago
}

fn at(raw: &str) -> Timestamp {
    parse_timestamp(raw, &tz()).unwrap().at
}

fn record(title: &str, start: &str, end: Option<&str>, notes: Option<&str>) -> FeedRecord {
    FeedRecord {
        title: Some(title.to_string()),
        location: None,
        start: Some(start.to_string()),
        end: end.map(str::to_string),
        notes: notes.map(str::to_string),
    }
}

fn sample_board(now: &str) -> EventBoard {
    let mut board = EventBoard::from_records(
        tz(),
        &[
            record("Car Wash", "2026-04-18T10:00:00", Some("2026-04-18T15:00:00"), Some("Bring towels")),
            record("Bake Sale", "2026-03-01T09:00:00", Some("2026-03-01T13:00:00"), Some("Cookies")),
            record("art show", "2026-03-01T09:00:00", None, Some("Student work")),
            record("Art Show", "2026-03-01T09:00:00", None, Some("Student work")),
            record("Coat Drive", "2026-01-10", Some("2026-01-31"), None),
            record("Backwards", "2026-02-10T12:00:00", Some("2026-02-10T08:00:00"), None),
            record("Spirit Wear", "2026-09-01", None, Some("Hoodies and tees")),
        ],
    );
    board.reclassify(at(now));
    board
}

fn titles(items: &[classboard::components::fundraisers::ClassifiedEvent]) -> Vec<String> {
    items.iter().map(|item| item.event.title.clone()).collect()
}

fn rank(status: Status) -> u8 {
    match status {
        Status::Upcoming => 0,
        Status::Live => 1,
        Status::Past => 2,
    }
}

#[test]
fn classification_only_moves_forward() {
    let board = sample_board("2026-01-01T00:00:00");
    let now = at("2026-01-01T00:00:00");
    let stop = at("2026-10-01T00:00:00");

    for event in board.events() {
        let mut previous = classify(event, &now);
        let mut seen_live = previous == Status::Live;
        let mut cursor = now;
        while cursor < stop {
            cursor += Duration::hours(1);
            let status = classify(event, &cursor);
            assert!(rank(status) >= rank(previous), "{} went backwards", event.title);
            seen_live |= status == Status::Live;
            previous = status;
        }
        if event.start <= event.end {
            assert!(seen_live, "{} skipped live", event.title);
        }
    }
}

#[test]
fn boundaries_are_inclusive() {
    let board = sample_board("2026-01-01T00:00:00");
    for event in board.events() {
        if event.end >= event.start {
            assert_eq!(classify(event, &event.start), Status::Live);
            assert_eq!(classify(event, &event.end), Status::Live);
        } else {
            assert_eq!(classify(event, &event.start), Status::Past);
        }
    }
}

#[test]
fn bake_sale_scenario() {
    let board = sample_board("2026-03-01T10:00:00");
    let bake = board
        .classified()
        .iter()
        .find(|item| item.event.title == "Bake Sale")
        .unwrap();

    assert_eq!(bake.status, Status::Live);
    assert_eq!(bake.range, "Mar 1 • 9:00 AM–1:00 PM");
    assert_eq!(bake.relative, "in 3 hr");
}

#[test]
fn end_instant_is_still_live() {
    let board = sample_board("2026-03-01T13:00:00");
    let bake = board
        .classified()
        .iter()
        .find(|item| item.event.title == "Bake Sale")
        .unwrap();

    assert_eq!(bake.status, Status::Live);
    assert_eq!(bake.relative, "in 0 sec");
}

#[test]
fn equal_start_breaks_ties_by_title() {
    let board = sample_board("2026-02-01T00:00:00");
    let soonest = titles(&board.sort(SortKey::Soonest));
    let art = soonest.iter().position(|t| t == "Art Show").unwrap();
    let lower_art = soonest.iter().position(|t| t == "art show").unwrap();
    let bake = soonest.iter().position(|t| t == "Bake Sale").unwrap();
    assert!(art < lower_art);
    assert!(lower_art < bake);
}

#[test]
fn sorting_is_stable_and_idempotent() {
    let board = sample_board("2026-03-01T10:00:00");

    for key in [SortKey::Soonest, SortKey::Latest, SortKey::Title] {
        let mut once = board.sort(key);
        let snapshot = once.clone();
        sort_events(&mut once, key);
        assert_eq!(once, snapshot, "{:?}", key);
    }

    let mut items = board.sort(SortKey::Title);
    let first = items.clone();
    sort_events(&mut items, SortKey::Soonest);
    sort_events(&mut items, SortKey::Title);
    assert_eq!(items, first);
}

#[test]
fn filtering_is_idempotent_and_non_destructive() {
    let board = sample_board("2026-03-01T10:00:00");
    let before = board.classified().to_vec();

    for (tab, query) in [(Tab::All, "art"), (Tab::Upcoming, "wash towels"), (Tab::Past, ""), (Tab::Live, "COOKIES")] {
        let once = board.filter(tab, query);
        let twice = filter_events(&once, tab, query);
        assert_eq!(once, twice);
    }

    assert_eq!(board.classified(), before.as_slice());
    assert_eq!(titles(&board.filter(Tab::Live, "COOKIES")), vec!["Bake Sale"]);
}

#[test]
fn inverted_event_is_past_once_started() {
    let board = sample_board("2026-02-10T12:00:00");
    let backwards = board
        .classified()
        .iter()
        .find(|item| item.event.title == "Backwards")
        .unwrap();
    assert_eq!(backwards.status, Status::Past);
}

#[test]
fn bare_date_round_trip_is_zone_independent() {
    for zone in ["UTC", "Pacific/Kiritimati", "Pacific/Pago_Pago", "Europe/Berlin", "America/Chicago"] {
        let zone: Tz = zone.parse().unwrap();
        let parsed = parse_timestamp("2026-06-15", &zone).unwrap();
        let formatted = parsed.at.format("%Y-%m-%d").to_string();
        assert_eq!(formatted, "2026-06-15");
        let again = parse_timestamp(&formatted, &zone).unwrap();
        assert_eq!(again.at, parsed.at);
        assert_eq!(
            again.at,
            zone.with_ymd_and_hms(2026, 6, 15, 0, 0, 0).unwrap()
        );
    }
}

#[test]
fn reclassification_output_is_repeatable() {
    let mut board = sample_board("2026-03-01T10:00:00");
    let first = board.classified().to_vec();
    let second = board.reclassify(at("2026-03-01T10:00:00")).to_vec();
    assert_eq!(first, second);
    let ids: Vec<&str> = second.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["evt-0", "evt-1", "evt-2", "evt-3", "evt-4", "evt-5", "evt-6"]);
}

#[test]
fn accented_titles_sort_with_their_base_letters() {
    let mut board = EventBoard::from_records(
        tz(),
        &[
            record("Zumba Night", "2026-05-01T18:00:00", None, None),
            record("Éclair Sale", "2026-05-02T09:00:00", None, None),
            record("Apple Pie", "2026-05-03T09:00:00", None, None),
        ],
    );
    board.reclassify(at("2026-04-01T00:00:00"));

    assert_eq!(
        titles(&board.sort(SortKey::Title)),
        vec!["Apple Pie", "Éclair Sale", "Zumba Night"]
    );
}
