use crate::components::fundraisers::models::ViewQuery;
use crate::error::{config_error, env_error, BoardResult};
use crate::utils::time::{parse_timestamp, Timestamp};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::time::Duration;

/// Default fundraiser feed location
pub const DEFAULT_FUNDRAISERS_FEED: &str = "data/fundraisers.json";
/// Default school events feed location
pub const DEFAULT_SCHOOL_EVENTS_FEED: &str = "data/events.json";
/// Default countdown target (end of school)
pub const DEFAULT_COUNTDOWN_TARGET: &str = "2026-06-15T23:59:59";
/// Default reclassification interval in seconds
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
/// Default number of items shown under "Happening Now"
pub const DEFAULT_LIVE_LIMIT: usize = 3;

/// Main configuration structure for the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fundraiser feed URL or file path
    pub fundraisers_feed: String,
    /// School events feed URL or file path
    pub school_events_feed: String,
    /// Time zone treated as local time
    pub timezone: String,
    /// Countdown target, parsed in `timezone`
    pub countdown_target: String,
    /// Seconds between reclassification passes
    pub refresh_interval: u64,
    /// Seconds between feed re-fetches, 0 disables re-fetching
    pub feed_refresh_interval: u64,
    /// Maximum number of items under "Happening Now"
    pub live_limit: usize,
    /// Initial view as a query string (`tab=live&q=bake&sort=title`)
    pub board_view: String,
    /// Message locale
    pub board_locale: String,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fundraisers_feed: DEFAULT_FUNDRAISERS_FEED.to_string(),
            school_events_feed: DEFAULT_SCHOOL_EVENTS_FEED.to_string(),
            timezone: "UTC".to_string(),
            countdown_target: DEFAULT_COUNTDOWN_TARGET.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL_SECS,
            feed_refresh_interval: 0,
            live_limit: DEFAULT_LIVE_LIMIT,
            board_view: String::new(),
            board_locale: "en".to_string(),
            components: default_components(),
        }
    }
}

fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert("fundraisers".to_string(), true);
    components.insert("clock".to_string(), true);
    components
}

fn parse_number<T: std::str::FromStr>(var: &str, value: Option<String>, default: T) -> BoardResult<T> {
    match value {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| env_error(var)),
        _ => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BoardResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_vars(|key| env::var(key).ok())?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/components.toml") {
            config.merge_components(&content)?;
        }

        Ok(config)
    }

    /// Build configuration from a variable lookup
    pub fn from_vars<F>(get: F) -> BoardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            get(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };

        let config = Config {
            fundraisers_feed: text("FUNDRAISERS_FEED", defaults.fundraisers_feed),
            school_events_feed: text("SCHOOL_EVENTS_FEED", defaults.school_events_feed),
            timezone: text("TIMEZONE", defaults.timezone),
            countdown_target: text("COUNTDOWN_TARGET", defaults.countdown_target),
            refresh_interval: parse_number(
                "REFRESH_INTERVAL_SECS",
                get("REFRESH_INTERVAL_SECS"),
                defaults.refresh_interval,
            )?,
            feed_refresh_interval: parse_number(
                "FEED_REFRESH_SECS",
                get("FEED_REFRESH_SECS"),
                defaults.feed_refresh_interval,
            )?,
            live_limit: parse_number("LIVE_LIMIT", get("LIVE_LIMIT"), defaults.live_limit)?,
            board_view: get("BOARD_VIEW").unwrap_or(defaults.board_view),
            board_locale: text("BOARD_LOCALE", defaults.board_locale),
            components: defaults.components,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that can only be judged after parsing
    pub fn validate(&self) -> BoardResult<()> {
        self.tz()?;
        self.countdown_target_at()?;
        if self.refresh_interval == 0 {
            return Err(config_error("REFRESH_INTERVAL_SECS must be greater than zero"));
        }
        Ok(())
    }

    /// Merge a TOML map of component names into the defaults
    pub fn merge_components(&mut self, content: &str) -> BoardResult<()> {
        let file_components = toml::from_str::<HashMap<String, bool>>(content)?;
        for (key, value) in file_components {
            self.components.insert(key, value);
        }
        Ok(())
    }

    /// The configured zone
    pub fn tz(&self) -> BoardResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// The countdown target as an instant in the configured zone
    pub fn countdown_target_at(&self) -> BoardResult<Timestamp> {
        let tz = self.tz()?;
        parse_timestamp(&self.countdown_target, &tz)
            .map(|parsed| parsed.at)
            .ok_or_else(|| {
                config_error(&format!(
                    "Invalid countdown target: {}",
                    self.countdown_target
                ))
            })
    }

    /// Reclassification interval
    pub fn refresh_every(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Feed re-fetch interval, if enabled
    pub fn feed_refresh_every(&self) -> Option<Duration> {
        (self.feed_refresh_interval > 0).then(|| Duration::from_secs(self.feed_refresh_interval))
    }

    /// Initial board view
    pub fn initial_view(&self) -> ViewQuery {
        ViewQuery::from_query_string(&self.board_view)
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}
