use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, ChatMessage, ChatRequest, ChatResponse};
use crate::config::LlmConfig;

/// Timeline synthesis takes the model a while; substantially longer than the
/// search timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API endpoint not configured. Set API_ENDPOINT, the settings file, or --endpoint.")]
    EndpointNotSet,

    #[error("API key not configured. Set API_KEY, the settings file, or --api-key.")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("model returned no completion")]
    EmptyCompletion,
}

/// Abstraction over the chat-completion backend. Implemented by `LlmClient`
/// for production; mock implementations used in tests.
pub trait ChatClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    endpoint: String,
    api_key: ApiKey,
    model: String,
    temperature: f64,
}

impl LlmClient {
    pub fn new(http: Client, config: &LlmConfig) -> Result<Self, LlmError> {
        if config.endpoint.trim().is_empty() {
            return Err(LlmError::EndpointNotSet);
        }
        if config.api_key.trim().is_empty() {
            return Err(LlmError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            endpoint: config.endpoint.trim().to_string(),
            api_key: ApiKey(config.api_key.trim().to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("chat API rate limited");
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<ChatResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(status.as_u16(), err);
                warn!(error = %classified, "chat API error");
                return Err(classified);
            }
            let snippet: String = text.chars().take(200).collect();
            warn!(%status, "chat API error (no structured body)");
            return Err(LlmError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {snippet}"),
            });
        }

        let body: ChatResponse = response.json().await?;
        if let Some(err) = &body.error {
            let classified = classify_api_error(status.as_u16(), err);
            warn!(error = %classified, "chat API error in 200 response");
            return Err(classified);
        }

        debug!(model = %self.model, "chat completion received");
        extract_content(body).ok_or(LlmError::EmptyCompletion)
    }
}

impl ChatClient for LlmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match self.chat_once(&messages).await {
                Ok(content) => return Ok(content),
                Err(e) if is_retriable(&e) => {
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        let delay_ms = jittered_backoff(attempt);
                        debug!(attempt = attempt + 1, delay_ms, "retrying after transient error");
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(LlmError::RateLimited))
    }
}

fn extract_content(body: ChatResponse) -> Option<String> {
    body.choices?
        .into_iter()
        .next()?
        .message?
        .content
        .filter(|c| !c.is_empty())
}

fn is_retriable(e: &LlmError) -> bool {
    matches!(e, LlmError::RateLimited | LlmError::Api { code: 500..=599, .. })
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

fn classify_api_error(status: u16, err: &ApiError) -> LlmError {
    let message = err.message.clone().unwrap_or_else(|| "Unknown error".to_string());
    if err.kind.as_deref() == Some("insufficient_quota") {
        return LlmError::QuotaExhausted(message);
    }
    match status {
        429 => LlmError::RateLimited,
        code => LlmError::Api { code, message },
    }
}
