use crate::config::AppConfig;
use crate::providers::{
    AnthropicClient, LanguageModel, OpenFoodFactsClient, ProductDatabase, Transcriber,
    WhisperClient,
};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn LanguageModel>,
    pub transcriber: Arc<dyn Transcriber>,
    pub products: Arc<dyn ProductDatabase>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let http = reqwest::Client::builder()
            .build()
            .context("build http client")?;

        let llm = Arc::new(AnthropicClient::new(http.clone(), &config.anthropic))
            as Arc<dyn LanguageModel>;
        let transcriber = Arc::new(WhisperClient::new(http.clone(), &config.transcription))
            as Arc<dyn Transcriber>;
        let products = Arc::new(OpenFoodFactsClient::new(http, &config.openfoodfacts_base_url))
            as Arc<dyn ProductDatabase>;

        Ok(Self {
            config,
            llm,
            transcriber,
            products,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        llm: Arc<dyn LanguageModel>,
        transcriber: Arc<dyn Transcriber>,
        products: Arc<dyn ProductDatabase>,
    ) -> Self {
        Self {
            config,
            llm,
            transcriber,
            products,
        }
    }
}

#[cfg(test)]
pub fn test_config() -> Arc<AppConfig> {
    use crate::config::{AnthropicConfig, LogConfig, TranscriptionConfig};

    Arc::new(AppConfig {
        listen_addr: ([127, 0, 0, 1], 0).into(),
        log: LogConfig {
            filter: "nutrilog=debug".into(),
            json: false,
        },
        anthropic: AnthropicConfig {
            api_key: "test".into(),
            base_url: "http://anthropic.invalid".into(),
            text_model: "text-model".into(),
            vision_model: "vision-model".into(),
            max_tokens: 800,
        },
        transcription: TranscriptionConfig {
            api_key: "test".into(),
            base_url: "http://openai.invalid".into(),
            model: "whisper-1".into(),
            language: "sv".into(),
        },
        openfoodfacts_base_url: "http://off.invalid".into(),
    })
}
