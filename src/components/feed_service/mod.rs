mod actor;

pub use actor::{FeedActor, FeedActorHandle, FeedCommand, DEFAULT_FEED_TIMEOUT};

use crate::error::{feed_error, BoardResult};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Where a feed document is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Http(Url),
    File(PathBuf),
}

impl FeedSource {
    /// Parse a configured feed location.
    ///
    /// `http://` and `https://` locations are fetched over the network,
    /// `file://` URLs and plain paths are read from disk.
    pub fn parse(location: &str) -> BoardResult<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(feed_error("Empty feed location"));
        }

        if let Ok(url) = Url::parse(location) {
            match url.scheme() {
                "http" | "https" => return Ok(FeedSource::Http(url)),
                "file" => {
                    return url
                        .to_file_path()
                        .map(FeedSource::File)
                        .map_err(|_| feed_error(&format!("Invalid file URL: {}", location)));
                }
                // Windows drive letters parse as a one-letter scheme
                scheme if scheme.len() > 1 => {
                    return Err(feed_error(&format!("Unsupported feed scheme: {}", scheme)));
                }
                _ => {}
            }
        }

        Ok(FeedSource::File(PathBuf::from(location)))
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Http(url) => write!(f, "{}", url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Spawn the feed actor and return its handle
pub fn spawn() -> (FeedActorHandle, JoinHandle<()>) {
    spawn_with_timeout(DEFAULT_FEED_TIMEOUT)
}

/// Spawn the feed actor with a custom per-load timeout
pub fn spawn_with_timeout(load_timeout: Duration) -> (FeedActorHandle, JoinHandle<()>) {
    let (mut actor, handle) = FeedActor::with_timeout(load_timeout);
    let task = tokio::spawn(async move {
        actor.run().await;
    });
    (handle, task)
}

/// Entries of a feed document.
///
/// Feeds are either an ordered array of records or an object mapping a
/// fingerprint to each record; the latter is read in key order.
pub fn feed_entries(document: &Value) -> BoardResult<Vec<&Value>> {
    match document {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(map) => Ok(map.values().collect()),
        _ => Err(feed_error("Feed document is neither a list nor a keyed object")),
    }
}

/// Read an optional string field from a feed record
pub fn string_field(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(|value| value.as_str())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
