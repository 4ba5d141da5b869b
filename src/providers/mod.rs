pub mod anthropic;
pub mod openfoodfacts;
pub mod whisper;

use async_trait::async_trait;
use bytes::Bytes;

pub use anthropic::AnthropicClient;
pub use openfoodfacts::{OpenFoodFactsClient, Product, ProductResponse};
pub use whisper::WhisperClient;

/// User turn sent to the analysis model.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    /// Base64 image followed by a text instruction in the same turn.
    Image {
        media_type: String,
        data_b64: String,
        instruction: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub model: String,
    pub system: &'static str,
    pub content: UserContent,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the concatenated text of the model's reply.
    async fn complete(&self, req: AnalysisRequest) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub body: Bytes,
    pub filename: String,
    pub content_type: String,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the provider's JSON body as-is, success or not. Only transport
    /// failures and non-JSON bodies are errors.
    async fn transcribe(&self, audio: AudioUpload) -> anyhow::Result<serde_json::Value>;
}

#[async_trait]
pub trait ProductDatabase: Send + Sync {
    async fn lookup(&self, barcode: &str) -> anyhow::Result<ProductResponse>;
}
