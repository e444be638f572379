use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// A point in time expressed in the board's time zone
pub type Timestamp = DateTime<Tz>;

/// Wall-clock formats accepted for feed values without an offset
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Result of normalizing a raw feed timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTime {
    pub at: Timestamp,
    /// The raw value was a bare `YYYY-MM-DD` date
    pub date_only: bool,
}

/// Parse a bare date in YYYY-MM-DD format
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Map a wall-clock time onto the zone.
///
/// Times skipped by a DST transition do not exist and yield `None`; times
/// repeated by a transition resolve to the earlier instant.
pub fn resolve_local(naive: &NaiveDateTime, tz: &Tz) -> Option<Timestamp> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Local midnight of a calendar day
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> Option<Timestamp> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    // Some zones start DST at midnight; the day then begins an hour later
    resolve_local(&midnight, tz).or_else(|| resolve_local(&(midnight + Duration::hours(1)), tz))
}

/// Normalize a raw feed timestamp.
///
/// Bare dates become local midnight, values with an explicit offset keep
/// their instant, and offset-less date-times are read as local wall-clock
/// time. Anything else is `None`.
pub fn parse_timestamp(raw: &str, tz: &Tz) -> Option<ParsedTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = parse_date(trimmed) {
        return local_midnight(date, tz).map(|at| ParsedTime {
            at,
            date_only: true,
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ParsedTime {
            at: dt.with_timezone(tz),
            date_only: false,
        });
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .and_then(|naive| resolve_local(&naive, tz))
        .map(|at| ParsedTime {
            at,
            date_only: false,
        })
}

/// Time left until a target instant, split into display units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining {
        days: i64,
        hours: u32,
        minutes: u32,
        seconds: u32,
    },
    Finished,
}

/// Calculate the countdown from `now` to `target`
pub fn countdown(target: &Timestamp, now: &Timestamp) -> Countdown {
    let diff = target.signed_duration_since(*now);
    if diff.num_milliseconds() <= 0 {
        return Countdown::Finished;
    }

    let total_seconds = diff.num_seconds();
    Countdown::Remaining {
        days: total_seconds / 86_400,
        hours: ((total_seconds % 86_400) / 3_600) as u32,
        minutes: ((total_seconds % 3_600) / 60) as u32,
        seconds: (total_seconds % 60) as u32,
    }
}

/// Format the live clock as (date, time)
pub fn fmt_clock(now: &Timestamp) -> (String, String) {
    (
        now.format("%A, %B %-d, %Y").to_string(),
        now.format("%I:%M:%S %p").to_string(),
    )
}
