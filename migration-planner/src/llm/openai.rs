//! OpenAI-compatible chat completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use super::{GenerationError, GenerationRequest, Generator};
use crate::config::OpenAiConfig;

/// Chat completions client for OpenAI or any API speaking the same protocol
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = build_request_body(&self.model, self.temperature, request);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        tracing::debug!(
            template = %request.template,
            prompt_tokens = completion.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = completion.usage.as_ref().map(|u| u.completion_tokens),
            "Chat completion received"
        );
        extract_content(completion)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Request payload for one chat completion.
pub fn build_request_body(
    model: &str,
    temperature: f32,
    request: &GenerationRequest,
) -> serde_json::Value {
    let mut body = json!({
        "model": model,
        "temperature": temperature,
        "messages": [
            { "role": "user", "content": request.prompt }
        ],
    });

    if let Some(format) = &request.response_format {
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": format.name,
                "schema": format.schema,
            }
        });
    }

    body
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Pull the assistant text out of a completion.
pub fn extract_content(completion: ChatCompletion) -> Result<String, GenerationError> {
    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(GenerationError::EmptyResponse)?;

    if let Some(refusal) = message.refusal {
        return Err(GenerationError::Refusal(refusal));
    }

    match message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(GenerationError::EmptyResponse),
    }
}
