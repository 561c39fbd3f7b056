use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use narriv::config::{config_path, Config, EnvConfig};
use narriv::proxy::{serve, OpenAiClient, PromptBuilder, ProxyState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("🔥 Narriv report proxy starting...");

    let config = Config::load_or_default(&config_path())?;
    let env_config = EnvConfig::load()?;

    tracing::info!("Upstream: {}", config.upstream.base_url);
    tracing::info!("Model: {}", env_config.openai_model);

    let generator = OpenAiClient::new(
        config.upstream.base_url.clone(),
        env_config.openai_api_key.clone(),
        env_config.openai_model.clone(),
        Duration::from_secs(config.upstream.timeout_secs),
    )?;
    let state = ProxyState::new(Arc::new(generator), PromptBuilder::new(&config.prompts));

    tokio::select! {
        result = serve(&config.server.bind, state) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down..."),
    }

    Ok(())
}
