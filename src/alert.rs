//! Subscription alerts: payload shape, subscription config, and the fetcher
//! contract.
//!
//! Delivery is at-least-once: an alert straddling the fetch watermark may be
//! returned twice, and the handler author deduplicates by alert hash.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// One subscription: which bot's alerts to receive, optionally narrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSubscription {
    pub bot_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alert_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alert_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chain_id: Option<u64>,
}

impl AlertSubscription {
    pub fn bot(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            alert_id: None,
            alert_ids: Vec::new(),
            chain_id: None,
        }
    }
}

/// Alert subscription configuration carried by a resolved handler set; only
/// consulted when an alert handler exists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertConfig {
    pub subscriptions: Vec<AlertSubscription>,
}

/// Where an alert originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSource {
    pub bot_id: Option<String>,
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
}

/// An alert as returned by the alerts API. `hash` is the globally unique
/// identifier; `alert_id` is the emitting bot's own classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    pub hash: String,
    pub alert_id: String,
    pub name: String,
    pub description: String,
    pub severity: Option<String>,
    pub created_at: String,
    pub source: Option<AlertSource>,
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("alerts API error: {0}")]
    Api(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Fetches alerts for a set of subscriptions created since a timestamp.
#[async_trait]
pub trait AlertClient: Send + Sync {
    async fn alerts_since(
        &self,
        subscriptions: &[AlertSubscription],
        since: SystemTime,
    ) -> Result<Vec<Alert>, AlertError>;
}

/// Alert fetcher over a JSON alerts API. Posts the subscription list with a
/// `createdSince` unix-millis lower bound and decodes `{ "alerts": [...] }`.
pub struct HttpAlertClient {
    client: reqwest::Client,
    api_url: String,
}

impl HttpAlertClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl AlertClient for HttpAlertClient {
    async fn alerts_since(
        &self,
        subscriptions: &[AlertSubscription],
        since: SystemTime,
    ) -> Result<Vec<Alert>, AlertError> {
        let body = json!({
            "subscriptions": subscriptions,
            "createdSince": unix_millis(since),
        });
        let resp = self.client.post(&self.api_url).json(&body).send().await?;
        let v: Value = resp.json().await?;
        if let Some(err) = v.get("error") {
            return Err(AlertError::Api(err.to_string()));
        }
        let alerts = v
            .get("alerts")
            .cloned()
            .ok_or_else(|| AlertError::Decode("Missing alerts".into()))?;
        serde_json::from_value(alerts).map_err(|e| AlertError::Decode(e.to_string()))
    }
}

/// Milliseconds since the unix epoch; a pre-epoch time clamps to 0.
pub fn unix_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
