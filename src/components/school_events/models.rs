use crate::components::feed_service::string_field;
use crate::components::fundraisers::models::UNTITLED;
use crate::utils::time::parse_date;
use chrono::NaiveDate;
use serde_json::Value;

/// A date-only school calendar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolEvent {
    pub title: String,
    pub date: NaiveDate,
}

impl SchoolEvent {
    /// Read an entry from a feed record; entries without a valid date are `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        let date = parse_date(&string_field(value, "date")?)?;
        Some(Self {
            title: string_field(value, "title").unwrap_or_else(|| UNTITLED.to_string()),
            date,
        })
    }
}
