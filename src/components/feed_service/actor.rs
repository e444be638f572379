use super::FeedSource;
use crate::error::{feed_error, BoardResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How long a single feed load may take before it is abandoned
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// The feed actor that loads feed documents on request
pub struct FeedActor {
    client: Client,
    command_rx: mpsc::Receiver<FeedCommand>,
    load_timeout: Duration,
}

/// Commands that can be sent to the feed actor
pub enum FeedCommand {
    Fetch(FeedSource, mpsc::Sender<BoardResult<Value>>),
    Shutdown,
}

/// Handle for communicating with the feed actor
#[derive(Clone)]
pub struct FeedActorHandle {
    command_tx: mpsc::Sender<FeedCommand>,
}

impl FeedActorHandle {
    /// Create a handle with no actor behind it; every fetch fails
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    /// Load a feed document
    pub async fn fetch(&self, source: &FeedSource) -> BoardResult<Value> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedCommand::Fetch(source.clone(), response_tx))
            .await
            .map_err(|e| feed_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| feed_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        // A closed mailbox means the actor is already gone
        let _ = self.command_tx.send(FeedCommand::Shutdown).await;
        Ok(())
    }
}

impl FeedActor {
    /// Create a new actor and return its handle
    pub fn new() -> (Self, FeedActorHandle) {
        Self::with_timeout(DEFAULT_FEED_TIMEOUT)
    }

    /// Create an actor whose loads give up after `load_timeout`
    pub fn with_timeout(load_timeout: Duration) -> (Self, FeedActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let client = Client::builder()
            .timeout(load_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                Client::new()
            });

        let actor = Self {
            client,
            command_rx,
            load_timeout,
        };

        (actor, FeedActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Feed actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                FeedCommand::Fetch(source, response_tx) => {
                    // Each request runs on its own task so feeds load concurrently
                    let client = self.client.clone();
                    let load_timeout = self.load_timeout;
                    tokio::spawn(async move {
                        let result = match timeout(load_timeout, Self::load(&client, &source)).await {
                            Ok(result) => result,
                            Err(_) => Err(feed_error(&format!(
                                "Timed out after {:?} loading {}",
                                load_timeout, source
                            ))),
                        };
                        let _ = response_tx.send(result).await;
                    });
                }
                FeedCommand::Shutdown => {
                    info!("Feed actor shutting down");
                    break;
                }
            }
        }

        info!("Feed actor shut down");
    }

    /// Load and parse one feed document
    pub async fn load(client: &Client, source: &FeedSource) -> BoardResult<Value> {
        debug!("Loading feed from {}", source);
        match source {
            FeedSource::Http(url) => Self::fetch_http(client, url.clone()).await,
            FeedSource::File(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                Ok(serde_json::from_str(&content)?)
            }
        }
    }

    async fn fetch_http(client: &Client, mut url: url::Url) -> BoardResult<Value> {
        // Cache-bust so static hosts serve the latest document
        url.query_pairs_mut()
            .append_pair("v", &Utc::now().timestamp_millis().to_string());

        let response = client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(feed_error(&format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let document = response.json::<Value>().await?;
        Ok(document)
    }
}
