pub mod models;

pub use models::SchoolEvent;

use crate::components::feed_service::feed_entries;
use crate::error::BoardResult;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

/// Read school events from a feed document, skipping undated entries
pub fn parse_school_events(document: &Value) -> BoardResult<Vec<SchoolEvent>> {
    let entries = feed_entries(document)?;
    let mut events = Vec::with_capacity(entries.len());
    for entry in entries {
        match SchoolEvent::from_value(entry) {
            Some(event) => events.push(event),
            None => debug!("Dropping school event without a valid date: {}", entry),
        }
    }
    Ok(events)
}

/// The earliest event on or after `today`
pub fn next_school_event(events: &[SchoolEvent], today: NaiveDate) -> Option<&SchoolEvent> {
    events
        .iter()
        .filter(|event| event.date >= today)
        .min_by_key(|event| event.date)
}

/// Format a date as `Fri, Oct 23`
pub fn fmt_date_only(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}
