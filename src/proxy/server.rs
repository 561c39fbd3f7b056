use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extract::extract_first_json_object;
use super::prompt::PromptBuilder;
use super::types::{CompareBody, DebugInfo, ProxyError, ReportEnvelope, ScanBody};
use super::upstream::TextGenerator;

#[derive(Clone)]
pub struct ProxyState {
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptBuilder>,
}

impl ProxyState {
    pub fn new(generator: Arc<dyn TextGenerator>, prompts: PromptBuilder) -> Self {
        Self {
            generator,
            prompts: Arc::new(prompts),
        }
    }

    /// Prompt in, parsed report out. One upstream call, no retries.
    pub async fn run_report(&self, prompt: &str) -> Result<ReportEnvelope, ProxyError> {
        let text = self.generator.generate(prompt).await.map_err(|e| {
            error!("Upstream generation failed: {}", e);
            ProxyError::Upstream(e)
        })?;

        let result = extract_first_json_object(&text).map_err(|e| {
            warn!("Could not extract report from model output: {}", e);
            ProxyError::from_extraction(e, &text)
        })?;

        Ok(ReportEnvelope {
            result,
            debug: Some(DebugInfo {
                api: "openai".to_string(),
                model: self.generator.model().to_string(),
            }),
        })
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/scan", post(scan_handler).fallback(method_not_allowed))
        .route("/api/compare", post(compare_handler).fallback(method_not_allowed))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

pub async fn serve(bind: &str, state: ProxyState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Report proxy listening on http://{}", bind);

    axum::serve(listener, router(state))
        .await
        .context("Report proxy server failed")
}

// A body that is missing or not JSON reads as empty, so it fails as a missing prompt.
fn parse_body<T: serde::de::DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

pub async fn scan_handler(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<ReportEnvelope>, ProxyError> {
    let request: ScanBody = parse_body(&body);
    let prompt = request.resolve_prompt(&state.prompts)?;
    info!(asset = ?request.asset, "scan requested");

    state.run_report(&prompt).await.map(Json)
}

pub async fn compare_handler(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<ReportEnvelope>, ProxyError> {
    let request: CompareBody = parse_body(&body);
    let prompt = request.resolve_prompt(&state.prompts)?;
    info!(a1 = ?request.a1, a2 = ?request.a2, "compare requested");

    state.run_report(&prompt).await.map(Json)
}

async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::proxy::upstream::UpstreamError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with canned text and records every prompt it saw.
    pub(crate) struct CannedGenerator {
        reply: Result<String, UpstreamError>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        pub(crate) fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(err: UpstreamError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn state(generator: Arc<CannedGenerator>) -> ProxyState {
        ProxyState::new(generator, PromptBuilder::default())
    }

    fn body(value: serde_json::Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    #[tokio::test]
    async fn test_scan_returns_parsed_report_and_debug() {
        let generator = CannedGenerator::replying(
            "Sure! {\"asset\":\"BTC\",\"heat_index\":91,\"heat_label\":\"EUPHORIC\"} Hope that helps.",
        );
        let Json(envelope) = scan_handler(
            State(state(generator.clone())),
            body(json!({"prompt": "scan BTC"})),
        )
        .await
        .unwrap();

        assert_eq!(
            envelope.result,
            json!({"asset": "BTC", "heat_index": 91, "heat_label": "EUPHORIC"})
        );
        assert_eq!(
            envelope.debug,
            Some(DebugInfo { api: "openai".into(), model: "test-model".into() })
        );
        assert_eq!(generator.prompts.lock().unwrap().as_slice(), ["scan BTC"]);
    }

    #[tokio::test]
    async fn test_scan_fields_are_templated() {
        let generator = CannedGenerator::replying("{}");
        let _ = scan_handler(
            State(state(generator.clone())),
            body(json!({"asset": "NVDA", "category": "stocks"})),
        )
        .await
        .unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"NVDA\""));
        assert!(prompts[0].contains("stocks"));
    }

    #[tokio::test]
    async fn test_missing_prompt_never_calls_upstream() {
        let generator = CannedGenerator::replying("{}");

        let err = scan_handler(State(state(generator.clone())), body(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::MissingPrompt));

        let err = scan_handler(State(state(generator.clone())), Bytes::from_static(b"not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::MissingPrompt));

        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prose_reply_is_invalid_model_output() {
        let generator = CannedGenerator::replying("I am unable to score that asset.");
        let err = scan_handler(State(state(generator)), body(json!({"prompt": "x"})))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body().error, "Model did not return valid JSON");
        assert_eq!(err.body().raw.as_deref(), Some("I am unable to score that asset."));
    }

    #[tokio::test]
    async fn test_upstream_failure_passes_message_through() {
        let generator = CannedGenerator::failing(UpstreamError::Status {
            status: 401,
            message: "Incorrect API key provided".into(),
        });
        let err = compare_handler(
            State(state(generator)),
            body(json!({"a1": "NVDA", "a2": "TSLA", "category": "stocks"})),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body().error, "401 Incorrect API key provided");
    }

    #[tokio::test]
    async fn test_router_rejects_wrong_verb() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state(CannedGenerator::replying("{}")));
        tokio::spawn(async move { axum::serve(listener, app).await });

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/api/scan", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 405);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Use POST"}));

        let response = client
            .post(format!("http://{}/api/compare", addr))
            .json(&json!({"a1": "BTC"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Missing prompt"}));

        let health = client.get(format!("http://{}/health", addr)).send().await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");
    }
}
