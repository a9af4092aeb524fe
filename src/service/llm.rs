//! Chat-completion client for contract analysis
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint with the
//! response format constrained to a JSON object. The raw reply text is
//! returned untouched; parsing belongs to the normalizer.
//!
//! There is no retry and no client-side timeout: a slow provider is bounded
//! only by the lifetime of the HTTP request that triggered the analysis.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::AnalysisRequest;
use crate::model::config::LlmConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("Could not reach the analysis service: {0}")]
    Transport(String),

    #[error("Analysis service returned an error ({status}): {message}")]
    Service { status: u16, message: String },
}

/// Backend able to turn an analysis request into raw JSON text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete_json(
        &self,
        request: &AnalysisRequest,
        model: &str,
    ) -> Result<String, InvocationError>;
}

/// OpenAI-compatible chat-completions client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a new client with the provided API key
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, String> {
        if api_key.trim().is_empty() {
            return Err("API key is empty".to_string());
        }

        let client = Client::builder()
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, String> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| "OPENAI_API_KEY is not set".to_string())?;
        Self::new(api_key, &config.base_url)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete_json(
        &self,
        request: &AnalysisRequest,
        model: &str,
    ) -> Result<String, InvocationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(url = %url, model = %model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InvocationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InvocationError::Service {
                status: status.as_u16(),
                message: provider_message(&text),
            });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            InvocationError::Service {
                status: status.as_u16(),
                message: format!("Unreadable completion body: {}", e),
            }
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| InvocationError::Service {
                status: status.as_u16(),
                message: "Completion contained no message content".to_string(),
            })
    }
}

/// Pull `error.message` out of a provider error body, falling back to the raw text
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                "empty response body".to_string()
            } else {
                body.chars().take(500).collect()
            }
        })
}

// API request/response types

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
