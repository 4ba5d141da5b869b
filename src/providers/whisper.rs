use anyhow::Context;
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use tracing::debug;

use super::{AudioUpload, Transcriber};
use crate::config::TranscriptionConfig;

/// OpenAI audio transcription client.
#[derive(Clone)]
pub struct WhisperClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    language: String,
}

impl WhisperClient {
    pub fn new(client: Client, cfg: &TranscriptionConfig) -> Self {
        Self {
            client,
            api_key: cfg.api_key.clone(),
            endpoint: format!(
                "{}/v1/audio/transcriptions",
                cfg.base_url.trim_end_matches('/')
            ),
            model: cfg.model.clone(),
            language: cfg.language.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: AudioUpload) -> anyhow::Result<serde_json::Value> {
        let size = audio.body.len();
        let file = Part::bytes(audio.body.to_vec())
            .file_name(audio.filename)
            .mime_str(&audio.content_type)
            .context("audio content type")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("transcription request")?;

        // Error bodies are returned too; the caller decides what a miss is.
        let status = response.status();
        debug!(%status, bytes = size, "transcription responded");
        response
            .json::<serde_json::Value>()
            .await
            .context("decode transcription response")
    }
}
