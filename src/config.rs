use anyhow::Context;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub log: LogConfig,
    pub anthropic: AnthropicConfig,
    pub transcription: TranscriptionConfig,
    pub openfoodfacts_base_url: String,
}

impl AppConfig {
    /// Missing credentials are not rejected here: the providers answer with
    /// their own authentication errors.
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_or("APP_HOST", "0.0.0.0");
        let port = env_or("APP_PORT", "8080");
        let listen_addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid APP_HOST/APP_PORT {}:{}", host, port))?;

        let log = LogConfig {
            filter: env_or("RUST_LOG", "nutrilog=debug,axum=info,tower_http=info"),
            json: std::env::var("LOG_FORMAT")
                .map(|v| v == "json")
                .unwrap_or(false),
        };
        let anthropic = AnthropicConfig {
            api_key: env_or("ANTHROPIC_API_KEY", ""),
            base_url: env_or("ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
            text_model: env_or("TEXT_MODEL", "claude-haiku-4-5-20251001"),
            vision_model: env_or("VISION_MODEL", "claude-sonnet-4-5"),
            max_tokens: std::env::var("MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(800),
        };
        let transcription = TranscriptionConfig {
            api_key: env_or("OPENAI_API_KEY", ""),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
            model: env_or("TRANSCRIPTION_MODEL", "whisper-1"),
            language: env_or("TRANSCRIPTION_LANGUAGE", "sv"),
        };
        Ok(Self {
            listen_addr,
            log,
            anthropic,
            transcription,
            openfoodfacts_base_url: env_or(
                "OPENFOODFACTS_BASE_URL",
                "https://world.openfoodfacts.org",
            ),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
