use super::models::{Event, Status};
use crate::utils::time::Timestamp;
use chrono::Datelike;

const DAY: u64 = 86_400;
const HOUR: u64 = 3_600;
const MINUTE: u64 = 60;

/// Format an event's time span.
///
/// Same-day spans share one date (`Mar 1 • 9:00 AM–1:00 PM`), spans crossing
/// midnight spell out both sides (`Mar 1, 9:00 PM → Mar 2, 1:00 AM`).
pub fn fmt_range(start: &Timestamp, end: &Timestamp, all_day: bool) -> String {
    let same_day = start.date_naive() == end.date_naive();
    let same_year = start.year() == end.year();

    if all_day {
        if same_day {
            return start.format("%b %-d").to_string();
        }
        let date_format = if same_year { "%b %-d" } else { "%b %-d, %Y" };
        return format!(
            "{} → {}",
            start.format(date_format),
            end.format(date_format)
        );
    }

    if same_day {
        let date_part = start.format("%b %-d");
        if start == end {
            return format!("{} • {}", date_part, start.format("%-I:%M %p"));
        }
        return format!(
            "{} • {}–{}",
            date_part,
            start.format("%-I:%M %p"),
            end.format("%-I:%M %p")
        );
    }

    let format = if same_year {
        "%b %-d, %-I:%M %p"
    } else {
        "%b %-d, %Y, %-I:%M %p"
    };
    format!("{} → {}", start.format(format), end.format(format))
}

/// Format the distance from `now` to `target` in its coarsest unit.
///
/// Magnitudes are truncated whole units. The sign is taken from the whole
/// second difference, so the boundary instant reads `in 0 sec`.
pub fn fmt_relative(target: &Timestamp, now: &Timestamp) -> String {
    let seconds = target.signed_duration_since(*now).num_seconds();
    let magnitude = seconds.unsigned_abs();

    let amount = if magnitude >= DAY {
        let days = magnitude / DAY;
        format!("{} {}", days, if days == 1 { "day" } else { "days" })
    } else if magnitude >= HOUR {
        format!("{} hr", magnitude / HOUR)
    } else if magnitude >= MINUTE {
        format!("{} min", magnitude / MINUTE)
    } else {
        format!("{} sec", magnitude)
    };

    if seconds >= 0 {
        format!("in {}", amount)
    } else {
        format!("{} ago", amount)
    }
}

/// The relative string shown for an event: its end while live or past,
/// its start while upcoming
pub fn relative_for(event: &Event, status: Status, now: &Timestamp) -> String {
    match status {
        Status::Upcoming => fmt_relative(&event.start, now),
        Status::Live | Status::Past => fmt_relative(&event.end, now),
    }
}
