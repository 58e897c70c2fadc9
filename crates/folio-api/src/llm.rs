//! Chat-completions client for the hosted model behind the AI assist
//! procedures.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;

pub const DEFAULT_LLM_BASE_URL: &str = "https://forge.manus.im";
const MODEL: &str = "gemini-2.5-flash";
const MAX_TOKENS: u32 = 32768;
const THINKING_BUDGET_TOKENS: u32 = 128;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM API key is not configured")]
    NotConfigured,

    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM invoke failed: {status} {body}")]
    Status { status: u16, body: String },
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => ApiError::Internal(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchema },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchema {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(name: &str, schema: Value) -> Self {
        Self::JsonSchema {
            json_schema: JsonSchema { name: name.to_string(), strict: true, schema },
        }
    }
}

#[derive(Debug, Serialize)]
struct Thinking {
    budget_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    thinking: Thinking,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Value,
}

impl ChatCompletion {
    /// Text of the first choice. Content may come back as a plain string or
    /// as an array of typed parts; text parts are concatenated.
    pub fn text(&self) -> Option<String> {
        let content = &self.choices.first()?.message.content;
        match content {
            Value::String(s) => Some(s.clone()),
            Value::Array(parts) => {
                let joined: String = parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect();
                Some(joined)
            }
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        let base_url = base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_key = api_key.filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("BUILT_IN_FORGE_API_KEY is not set; AI assist is unavailable");
        }
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    pub async fn invoke(
        &self,
        messages: &[ChatMessage],
        response_format: Option<&ResponseFormat>,
    ) -> Result<ChatCompletion, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::NotConfigured)?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: MODEL,
            messages,
            max_tokens: MAX_TOKENS,
            thinking: Thinking { budget_tokens: THINKING_BUDGET_TOKENS },
            response_format,
        };

        debug!("Invoking LLM with {} messages", messages.len());
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        Ok(response.json::<ChatCompletion>().await?)
    }

    /// Convenience for free-text prompts: system + user message, first
    /// choice's text (empty when the model returned none).
    pub async fn complete(&self, system: &str, prompt: String) -> Result<String, LlmError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        let completion = self.invoke(&messages, None).await?;
        Ok(completion.text().unwrap_or_default())
    }
}
