// src/feed.rs
// HTTP access to the realtime store that owns the game.
//
// The store exposes every node as JSON under `<database_url>/<path>.json`.
// A poll reads the whole game node and hands it on as a complete
// replacement snapshot, never as a delta.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::AnnouncerConfig;
use crate::snapshot::GameState;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP request failed with status: {0}")]
    Status(reqwest::StatusCode),

    #[error("game '{0}' not found")]
    GameNotFound(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout
        } else {
            FeedError::Request(e.to_string())
        }
    }
}

/// Simple HTTP GET request wrapper
async fn get_json<T>(client: &reqwest::Client, url: &str) -> Result<T, FeedError>
where
    T: for<'de> Deserialize<'de>,
{
    let response = client.get(url).send().await?;

    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(FeedError::Status(response.status()))
    }
}

/// Game ids below the `games` node, sorted
pub fn game_ids_from_value(value: &Value) -> Vec<String> {
    let mut ids: Vec<String> = match value {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    ids.sort();
    ids
}

pub struct GameFeed {
    http_client: reqwest::Client,
    database_url: String,
}

impl GameFeed {
    pub fn new(config: &AnnouncerConfig) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(GameFeed {
            http_client,
            database_url: config.database_url.clone(),
        })
    }

    pub fn game_url(&self, game_id: &str) -> String {
        format!("{}/games/{}.json", self.database_url, game_id)
    }

    /// Read the complete game node
    pub async fn fetch_state(&self, game_id: &str) -> Result<GameState, FeedError> {
        let value: Value = get_json(&self.http_client, &self.game_url(game_id)).await?;
        if value.is_null() {
            return Err(FeedError::GameNotFound(game_id.to_string()));
        }
        Ok(GameState::from_value(&value))
    }

    /// List the games known to the store
    pub async fn list_games(&self) -> Result<Vec<String>, FeedError> {
        let url = format!("{}/games.json?shallow=true", self.database_url);
        let value: Value = get_json(&self.http_client, &url).await?;
        Ok(game_ids_from_value(&value))
    }

    /// Test server connection
    pub async fn test_connection(&self) -> Result<(), FeedError> {
        let url = format!("{}/.json?shallow=true", self.database_url);
        let response = self.http_client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FeedError::Status(response.status()))
        }
    }
}
