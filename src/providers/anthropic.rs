use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnalysisRequest, LanguageModel, UserContent};
use crate::config::AnthropicConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageBody<'a> {
    Text(&'a str),
    Blocks(Vec<ContentBlock<'a>>),
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageBody<'a>,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Anthropic Messages API client.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(client: Client, cfg: &AnthropicConfig) -> Self {
        Self {
            client,
            api_key: cfg.api_key.clone(),
            endpoint: format!("{}/v1/messages", cfg.base_url.trim_end_matches('/')),
            max_tokens: cfg.max_tokens,
        }
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, req: AnalysisRequest) -> anyhow::Result<String> {
        let content = match &req.content {
            UserContent::Text(text) => MessageBody::Text(text),
            UserContent::Image {
                media_type,
                data_b64,
                instruction,
            } => MessageBody::Blocks(vec![
                ContentBlock::Image {
                    source: ImageSource {
                        kind: "base64",
                        media_type,
                        data: data_b64,
                    },
                },
                ContentBlock::Text { text: instruction },
            ]),
        };
        let body = ApiRequest {
            model: &req.model,
            max_tokens: self.max_tokens,
            system: req.system,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("anthropic messages request")?;

        let status = response.status();
        debug!(model = %req.model, %status, "anthropic responded");
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                anyhow::bail!("anthropic error ({}): {}", status, api_error.error.message);
            }
            anyhow::bail!("anthropic error ({}): {}", status, error_text);
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .context("decode anthropic response")?;

        Ok(parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AnthropicClient {
        let cfg = AnthropicConfig {
            api_key: "sk-test".into(),
            base_url: server.uri(),
            text_model: "text-model".into(),
            vision_model: "vision-model".into(),
            max_tokens: 800,
        };
        AnthropicClient::new(Client::new(), &cfg)
    }

    #[tokio::test]
    async fn sends_text_turn_with_system_prompt_and_joins_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "text-model",
                "max_tokens": 800,
                "system": "be terse",
                "messages": [{"role": "user", "content": "en banan"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "{\"items\":"},
                    {"type": "text", "text": "[]}"}
                ],
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(AnalysisRequest {
                model: "text-model".into(),
                system: "be terse",
                content: UserContent::Text("en banan".into()),
            })
            .await
            .unwrap();
        assert_eq!(reply, "{\"items\":[]}");
    }

    #[tokio::test]
    async fn sends_image_block_before_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({
                "model": "vision-model",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "image", "source": {"type": "base64", "media_type": "image/jpeg", "data": "AAEC"}},
                        {"type": "text", "text": "look"}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(AnalysisRequest {
                model: "vision-model".into(),
                system: "sys",
                content: UserContent::Image {
                    media_type: "image/jpeg".into(),
                    data_b64: "AAEC".into(),
                    instruction: "look".into(),
                },
            })
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn surfaces_authentication_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(AnalysisRequest {
                model: "text-model".into(),
                system: "sys",
                content: UserContent::Text("hej".into()),
            })
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid x-api-key"));
    }
}
