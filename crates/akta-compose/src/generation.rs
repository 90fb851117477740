//! Generation service seam and the OpenAI-compatible HTTP client.
//!
//! The language model is a black box behind [`GenerationService`]. The
//! default backend talks to any server exposing `/chat/completions` in the
//! OpenAI wire format (llama.cpp, Ollama, vLLM).

use std::time::Duration;

use akta_config::GenerationConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::GenerationError;

/// External generation service: `generate(prompt, max_tokens) -> text`.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Complete `prompt`, producing at most `max_tokens` tokens.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// OpenAiCompatible
// ---------------------------------------------------------------------------

const SYSTEM_PROMPT: &str = "You answer questions about Malaysian employment law. \
Use only the passages and computed figures you are given. \
Quote computed figures exactly. If the passages do not cover the question, say so.";

/// Chat-completions client for OpenAI-compatible servers.
pub struct OpenAiCompatible {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiCompatible {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent("akta/0.1")
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("reqwest client should build"),
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        }
    }

    fn request_body(&self, prompt: &str, max_tokens: u32) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": max_tokens,
            "temperature": self.temperature,
            "stream": false,
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout {
                secs: self.timeout_secs,
            }
        } else if error.is_connect() {
            GenerationError::ServiceUnavailable(error.to_string())
        } else {
            GenerationError::Http(error)
        }
    }
}

#[async_trait]
impl GenerationService for OpenAiCompatible {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let mut request = self.http.post(&self.url).json(&self.request_body(prompt, max_tokens));
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let response = check_response(response).await?;
        let body: ChatResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        completion_text(body)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn completion_text(body: ChatResponse) -> Result<String, GenerationError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(GenerationError::EmptyCompletion)
}

/// Map non-success statuses: overload and server errors are transient,
/// anything else is a rejected request.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    if status.as_u16() == 429 || status.is_server_error() {
        return Err(GenerationError::ServiceUnavailable(format!(
            "status {}: {message}",
            status.as_u16()
        )));
    }
    Err(GenerationError::Api {
        status: status.as_u16(),
        message,
    })
}
