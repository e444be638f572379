use super::models::{ClassifiedEvent, Event, FeedRecord, SortKey, Status, Tab, ViewQuery};
use super::time::{fmt_range, relative_for};
use crate::utils::time::Timestamp;
use chrono_tz::Tz;
use std::cmp::Ordering;
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Classify an event against a reference instant.
///
/// Both ends are inclusive, so `now == start` and `now == end` are live.
pub fn classify(event: &Event, now: &Timestamp) -> Status {
    if event.start <= *now && *now <= event.end {
        Status::Live
    } else if event.start > *now {
        Status::Upcoming
    } else {
        Status::Past
    }
}

/// Keep events admitted by `tab` whose title and notes contain every
/// whitespace-separated term of `query`, ignoring case
pub fn filter_events(events: &[ClassifiedEvent], tab: Tab, query: &str) -> Vec<ClassifiedEvent> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    events
        .iter()
        .filter(|item| tab.admits(item.status))
        .filter(|item| {
            if terms.is_empty() {
                return true;
            }
            let haystack = format!("{} {}", item.event.title, item.event.notes).to_lowercase();
            terms.iter().all(|term| haystack.contains(term.as_str()))
        })
        .cloned()
        .collect()
}

/// Title with case and accents removed, e.g. `Éclair` becomes `eclair`
fn primary_key(title: &str) -> String {
    title
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Title order: letters first, ignoring case and accents; then accents;
/// then the exact text, so distinct titles never compare equal
pub fn title_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| a.cmp(b))
}

fn compare(a: &Event, b: &Event, key: SortKey) -> Ordering {
    match key {
        SortKey::Soonest => a
            .start
            .cmp(&b.start)
            .then_with(|| title_cmp(&a.title, &b.title)),
        SortKey::Latest => b
            .start
            .cmp(&a.start)
            .then_with(|| title_cmp(&a.title, &b.title)),
        SortKey::Title => title_cmp(&a.title, &b.title).then_with(|| a.start.cmp(&b.start)),
    }
}

/// Order events by `key`. The sort is stable, so events equal under the
/// key keep their relative order.
pub fn sort_events(events: &mut [ClassifiedEvent], key: SortKey) {
    events.sort_by(|a, b| compare(&a.event, &b.event, key));
}

/// Live and upcoming picks for the home page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub happening_now: Vec<ClassifiedEvent>,
    pub next_up: Option<ClassifiedEvent>,
}

/// In-memory snapshot of the fundraiser feed and its latest classification
#[derive(Debug, Clone)]
pub struct EventBoard {
    tz: Tz,
    events: Vec<Event>,
    classified: Vec<ClassifiedEvent>,
    as_of: Option<Timestamp>,
}

impl EventBoard {
    /// Create an empty board
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            events: Vec::new(),
            classified: Vec::new(),
            as_of: None,
        }
    }

    /// Create a board holding the given records
    pub fn from_records(tz: Tz, records: &[FeedRecord]) -> Self {
        let mut board = Self::new(tz);
        board.replace(records);
        board
    }

    /// Replace the snapshot. Records without a usable start are dropped.
    /// Returns the number of events kept.
    pub fn replace(&mut self, records: &[FeedRecord]) -> usize {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            match Event::from_record(record, &self.tz) {
                Some(event) => {
                    if event.end < event.start {
                        warn!(
                            "Fundraiser '{}' ends before it starts; it will show as past",
                            event.title
                        );
                    }
                    events.push(event);
                }
                None => debug!(
                    "Dropping fundraiser {:?}: missing or unparseable start {:?}",
                    record.title, record.start
                ),
            }
        }

        self.events = events;
        self.classified.clear();
        self.as_of = None;
        self.events.len()
    }

    /// Zone used for local time
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Normalized events in feed order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Instant of the latest classification pass
    pub fn as_of(&self) -> Option<Timestamp> {
        self.as_of
    }

    /// Recompute status and display strings for every event at `now`
    pub fn reclassify(&mut self, now: Timestamp) -> &[ClassifiedEvent] {
        let now = now.with_timezone(&self.tz);
        self.classified = self
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let status = classify(event, &now);
                ClassifiedEvent {
                    id: format!("evt-{}", index),
                    event: event.clone(),
                    status,
                    range: fmt_range(&event.start, &event.end, event.all_day),
                    relative: relative_for(event, status, &now),
                }
            })
            .collect();
        self.as_of = Some(now);
        &self.classified
    }

    /// Latest classification in feed order
    pub fn classified(&self) -> &[ClassifiedEvent] {
        &self.classified
    }

    /// Classified events narrowed by tab and search text
    pub fn filter(&self, tab: Tab, query: &str) -> Vec<ClassifiedEvent> {
        filter_events(&self.classified, tab, query)
    }

    /// Classified events ordered by `key`
    pub fn sort(&self, key: SortKey) -> Vec<ClassifiedEvent> {
        let mut sorted = self.classified.clone();
        sort_events(&mut sorted, key);
        sorted
    }

    /// Filter then sort, as selected by a view
    pub fn view(&self, view: &ViewQuery) -> Vec<ClassifiedEvent> {
        let mut items = self.filter(view.tab, &view.query);
        sort_events(&mut items, view.sort);
        items
    }

    /// Up to `live_limit` live events and the soonest upcoming one
    pub fn summary(&self, live_limit: usize) -> Summary {
        let mut happening_now = self.filter(Tab::Live, "");
        sort_events(&mut happening_now, SortKey::Soonest);
        happening_now.truncate(live_limit);

        let mut upcoming = self.filter(Tab::Upcoming, "");
        sort_events(&mut upcoming, SortKey::Soonest);

        Summary {
            happening_now,
            next_up: upcoming.into_iter().next(),
        }
    }
}
