use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// `{ result, debug? }` as returned by the proxy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiReply {
    pub result: Value,
    #[serde(default)]
    pub debug: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(String),

    /// Non-2xx reply; `message` is the body's `error` or a generic fallback.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Malformed proxy reply: {0}")]
    Decode(String),
}

/// The two calls the dashboard makes.
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn scan(&self, asset: &str, category: &str) -> Result<ApiReply, ClientError>;

    async fn compare(&self, a1: &str, a2: &str, category: &str) -> Result<ApiReply, ClientError>;
}

/// Talks to the report proxy over HTTP.
pub struct HttpReportApi {
    client: Client,
    base_url: String,
}

impl HttpReportApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, path: &str, body: Value, fallback: &str) -> Result<ApiReply, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        decode_reply(status.as_u16(), &text, fallback)
    }
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn scan(&self, asset: &str, category: &str) -> Result<ApiReply, ClientError> {
        self.post(
            "/api/scan",
            json!({ "asset": asset, "category": category }),
            "Scan failed",
        )
        .await
    }

    async fn compare(&self, a1: &str, a2: &str, category: &str) -> Result<ApiReply, ClientError> {
        self.post(
            "/api/compare",
            json!({ "a1": a1, "a2": a2, "category": category }),
            "Compare failed",
        )
        .await
    }
}

fn decode_reply(status: u16, text: &str, fallback: &str) -> Result<ApiReply, ClientError> {
    let body: Option<Value> = serde_json::from_str(text).ok();

    if !(200..300).contains(&status) {
        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string();
        return Err(ClientError::Api { status, message });
    }

    let body = body.ok_or_else(|| ClientError::Decode("body is not JSON".to_string()))?;
    serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}
