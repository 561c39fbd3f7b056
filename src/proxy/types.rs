use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::{excerpt, ExtractError};
use super::prompt::PromptBuilder;
use super::upstream::UpstreamError;

/// Body of `POST /api/scan`. Either field set may be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Body of `POST /api/compare`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub a1: Option<String>,
    #[serde(default)]
    pub a2: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ScanBody {
    /// An explicit prompt wins; otherwise one is built from the asset.
    pub fn resolve_prompt(&self, prompts: &PromptBuilder) -> Result<String, ProxyError> {
        if let Some(prompt) = non_empty(&self.prompt) {
            return Ok(prompt.to_string());
        }
        let asset = non_empty(&self.asset).ok_or(ProxyError::MissingPrompt)?;
        Ok(prompts.scan(asset, non_empty(&self.category).unwrap_or("general")))
    }
}

impl CompareBody {
    pub fn resolve_prompt(&self, prompts: &PromptBuilder) -> Result<String, ProxyError> {
        if let Some(prompt) = non_empty(&self.prompt) {
            return Ok(prompt.to_string());
        }
        match (non_empty(&self.a1), non_empty(&self.a2)) {
            (Some(a1), Some(a2)) => Ok(prompts.compare(
                a1,
                a2,
                non_empty(&self.category).unwrap_or("general"),
            )),
            _ => Err(ProxyError::MissingPrompt),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEnvelope {
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugInfo {
    pub api: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Use POST")]
    MethodNotAllowed,

    #[error("Missing prompt")]
    MissingPrompt,

    /// Both extraction failures surface alike; `raw` is the bounded excerpt.
    #[error("Model did not return valid JSON")]
    InvalidModelOutput { raw: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub fn from_extraction(err: ExtractError, text: &str) -> Self {
        match err {
            ExtractError::InvalidJson { raw } => ProxyError::InvalidModelOutput { raw },
            ExtractError::NotFound => ProxyError::InvalidModelOutput { raw: excerpt(text) },
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::MethodNotAllowed => 405,
            ProxyError::MissingPrompt => 400,
            ProxyError::InvalidModelOutput { .. } | ProxyError::Upstream(_) => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            raw: match self {
                ProxyError::InvalidModelOutput { raw } => Some(raw.clone()),
                _ => None,
            },
        }
    }
}
