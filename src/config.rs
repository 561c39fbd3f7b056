use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

/// Templates used when a request carries scan fields instead of a prompt.
/// Placeholders: `{asset}`, `{a1}`, `{a2}`, `{category}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_scan_template")]
    pub scan_template: String,
    #[serde(default = "default_compare_template")]
    pub compare_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_scan_phase_ms")]
    pub scan_phase_ms: u64,
    #[serde(default = "default_compare_phase_ms")]
    pub compare_phase_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            scan_template: default_scan_template(),
            compare_template: default_compare_template(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            timeout_secs: default_client_timeout(),
            scan_phase_ms: default_scan_phase_ms(),
            compare_phase_ms: default_compare_phase_ms(),
        }
    }
}

fn default_bind() -> String { "0.0.0.0:3000".to_string() }
fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_upstream_timeout() -> u64 { 120 }
fn default_proxy_url() -> String { "http://127.0.0.1:3000".to_string() }
fn default_client_timeout() -> u64 { 180 }
fn default_scan_phase_ms() -> u64 { 2000 }
fn default_compare_phase_ms() -> u64 { 1500 }

fn default_scan_template() -> String {
    r#"You are a narrative intelligence analyst. Assess the current narrative heat around "{asset}" (category: {category}).
Reply with a single JSON object and nothing else, using these keys:
asset, category, heat_index (0-100), heat_label, sentiment (EUPHORIC|BULLISH|SURGING|NEUTRAL|MIXED|BEARISH|FADING),
trend_direction, one_liner, narrative_summary, confidence {score_0_100, reasoning}, regime {trend (up|down|sideways), volatility},
primary_driver, supporting_signals [{signal, evidence}], contradictions [{signal, evidence}],
price_lag {avg_lag_hours, confidence, pattern, current_signal}, timeline [{period, heat}],
narrative_arc [{date, heat_shift, source, event}], signals {social, search, influence, news, flow, momentum} (each 0-100),
twitter_intel {volume_level, estimated_mentions_24h, platform_sentiment}, betting_edge {edge_rating, reasoning}."#
        .to_string()
}

fn default_compare_template() -> String {
    r#"You are a narrative intelligence analyst. Compare the narrative heat of "{a1}" and "{a2}" (category: {category}).
Reply with a single JSON object and nothing else, using these keys:
asset_a and asset_b, each {name, heat_index (0-100), sentiment, key_narrative, signals {social, search, influence, news, flow, momentum}},
narrative_flow (how attention moves between the two), alpha_signal (the actionable takeaway)."#
        .to_string()
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub config_path: String,
}

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::warn!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: model_or_default(std::env::var("OPENAI_MODEL").ok()),
            config_path: config_path(),
        })
    }
}

/// Path of the TOML config, shared by both binaries.
pub fn config_path() -> String {
    std::env::var("NARRIV_CONFIG").unwrap_or_else(|_| "config.toml".to_string())
}

fn model_or_default(model: Option<String>) -> String {
    model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.upstream.base_url, "https://api.openai.com/v1");
        assert_eq!(config.client.scan_phase_ms, 2000);
        assert_eq!(config.client.compare_phase_ms, 1500);
        assert!(config.prompts.scan_template.contains("{asset}"));
        assert!(config.prompts.compare_template.contains("{a2}"));
    }

    #[test]
    fn test_partial_sections_override() {
        let config = Config::parse(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [client]
            proxy_url = "http://localhost:8080"
            scan_phase_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.client.proxy_url, "http://localhost:8080");
        assert_eq!(config.client.scan_phase_ms, 500);
        assert_eq!(config.client.compare_phase_ms, 1500);
        assert_eq!(config.upstream.timeout_secs, 120);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("[server\nbind = ").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("/nonexistent/narriv/config.toml").unwrap();
        assert_eq!(config.client.proxy_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_model_defaults_when_unset_or_blank() {
        assert_eq!(model_or_default(None), "gpt-4o-mini");
        assert_eq!(model_or_default(Some("  ".into())), "gpt-4o-mini");
        assert_eq!(model_or_default(Some("gpt-4.1".into())), "gpt-4.1");
    }
}
