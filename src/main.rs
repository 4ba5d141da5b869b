mod app;
mod config;
mod error;
mod nutrition;
mod providers;
mod state;

use crate::config::{AppConfig, LogConfig};
use crate::state::AppState;

fn init_tracing(log: &LogConfig) {
    let builder = tracing_subscriber::fmt().with_env_filter(log.filter.as_str());
    if log.json {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.log);

    if config.anthropic.api_key.is_empty() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; analysis calls will be rejected upstream");
    }
    if config.transcription.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; transcription calls will be rejected upstream");
    }
    tracing::info!(
        text_model = %config.anthropic.text_model,
        vision_model = %config.anthropic.vision_model,
        language = %config.transcription.language,
        "providers configured"
    );

    let addr = config.listen_addr;
    let state = AppState::init(config)?;
    app::serve(app::build_app(state), addr).await
}
