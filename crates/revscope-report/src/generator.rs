//! Text-generation capability and an OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use revscope_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

/// Produces free text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ReportError>;
}

/// Client for a `POST {base}/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Builds a client against `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Builds a client from configuration, or `None` when no API key is set.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, ReportError> {
        let Some(api_key) = config
            .summary_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        else {
            return Ok(None);
        };
        Self::new(
            &config.summary_api_url,
            api_key,
            &config.summary_model,
            config.request_timeout_secs.max(30),
        )
        .map(Some)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, ReportError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Generation(format!(
                "endpoint returned status {status}"
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ReportError::Generation("response contained no completion".to_string()))
    }
}
