use crate::components::feed_service::string_field;
use crate::error::{config_error, Error};
use crate::utils::time::{parse_timestamp, Timestamp};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// Shown when a record has no title
pub const UNTITLED: &str = "Untitled";
/// Shown when a record has no location
pub const LOCATION_TBA: &str = "TBA";

/// A fundraiser record as it appears in the feed
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FeedRecord {
    pub title: Option<String>,
    pub location: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub notes: Option<String>,
}

impl FeedRecord {
    /// Read a record from a feed entry; non-string fields count as absent
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            title: string_field(value, "title"),
            location: string_field(value, "location"),
            start: string_field(value, "start"),
            end: string_field(value, "end"),
            notes: string_field(value, "notes"),
        })
    }
}

/// A normalized, time-bounded fundraiser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    pub location: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub notes: String,
    /// Start was given as a bare date
    pub all_day: bool,
}

impl Event {
    /// Normalize a feed record. Records without a usable start are `None`;
    /// a missing or invalid end collapses to the start.
    pub fn from_record(record: &FeedRecord, tz: &Tz) -> Option<Self> {
        let start = parse_timestamp(record.start.as_deref()?, tz)?;
        let end = record
            .end
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, tz))
            .map(|parsed| parsed.at)
            .unwrap_or(start.at);

        Some(Self {
            title: record.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            location: record
                .location
                .clone()
                .unwrap_or_else(|| LOCATION_TBA.to_string()),
            start: start.at,
            end,
            notes: record.notes.clone().unwrap_or_default(),
            all_day: start.date_only,
        })
    }
}

/// Where an event stands relative to a reference instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Live,
    Upcoming,
    Past,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Live => "live",
            Status::Upcoming => "upcoming",
            Status::Past => "past",
        };
        f.pad(label)
    }
}

/// Status filter selected by the viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    Live,
    Upcoming,
    Past,
}

impl Tab {
    /// Whether a status passes this tab
    pub fn admits(self, status: Status) -> bool {
        match self {
            Tab::All => true,
            Tab::Live => status == Status::Live,
            Tab::Upcoming => status == Status::Upcoming,
            Tab::Past => status == Status::Past,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::All => "all",
            Tab::Live => "live",
            Tab::Upcoming => "upcoming",
            Tab::Past => "past",
        }
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Tab::All),
            "live" | "now" => Ok(Tab::Live),
            "upcoming" => Ok(Tab::Upcoming),
            "past" => Ok(Tab::Past),
            other => Err(config_error(&format!("Unknown tab: {}", other))),
        }
    }
}

/// Ordering applied to the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending start, ties by title
    #[default]
    Soonest,
    /// Descending start, ties by title
    Latest,
    /// Title, ties by ascending start
    Title,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Soonest => "soonest",
            SortKey::Latest => "latest",
            SortKey::Title => "title",
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "soonest" => Ok(SortKey::Soonest),
            "latest" => Ok(SortKey::Latest),
            "title" => Ok(SortKey::Title),
            other => Err(config_error(&format!("Unknown sort key: {}", other))),
        }
    }
}

/// An event with everything the presentation layer needs at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    /// Position in the current snapshot; only stable within one pass
    pub id: String,
    pub event: Event,
    pub status: Status,
    pub range: String,
    pub relative: String,
}

/// The tab/search/sort triple, round-trippable through a URL query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub tab: Tab,
    pub query: String,
    pub sort: SortKey,
}

impl ViewQuery {
    /// Read `tab`, `q` and `sort` from a query string. A leading `?` is
    /// ignored and unknown values fall back to the defaults.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut view = ViewQuery::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "tab" | "filter" => view.tab = value.parse().unwrap_or_default(),
                "q" | "search" => view.query = value.trim().to_string(),
                "sort" => view.sort = value.parse().unwrap_or_default(),
                _ => {}
            }
        }

        view
    }

    /// Encode the view, leaving out values that are at their defaults
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if self.tab != Tab::All {
            serializer.append_pair("tab", self.tab.as_str());
        }
        if !self.query.is_empty() {
            serializer.append_pair("q", &self.query);
        }
        if self.sort != SortKey::Soonest {
            serializer.append_pair("sort", self.sort.as_str());
        }
        serializer.finish()
    }
}
