//! OpenAI-compatible REST client, generalized from a vendor-specific
//! client into a gateway client addressed by `OPENAI_API_BASE` and a
//! logical model alias (`OPENAI_MODEL`); it never hard-codes a vendor
//! name, per the wire contract in spec §4.3/§6.

pub mod error;
pub mod types;

pub use error::{GatewayError, Result};
pub use types::{ChatRequest, ChatResponse, Message, Usage};

use newsdesk_core::config::LlmGatewayConfig;
use newsdesk_core::retry::{retry_with_backoff, BackoffPolicy};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;
use types::{ChatResponseRaw, EmbeddingRequest, EmbeddingResponse};

/// Per-call deadline (spec §5: LLM call budget 60s).
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
    embedding_model: String,
    max_tokens: u32,
}

impl GatewayClient {
    pub fn new(cfg: &LlmGatewayConfig) -> Self {
        let http = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("reqwest client builds");

        Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            embedding_model: cfg.embedding_model.clone(),
            max_tokens: cfg.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// A single chat completion, with no retry. Callers that need the
    /// spec §4.3 backoff/429 envelope should use
    /// [`GatewayClient::chat_completion_with_retry`].
    pub async fn chat_completion(&self, messages: Vec<Message>) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(0.3),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(GatewayError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::Api {
                status: status.as_u16(),
                body: "no choices in response".into(),
            })?;

        Ok(ChatResponse {
            content,
            usage: raw.usage,
        })
    }

    /// Wraps [`GatewayClient::chat_completion`] in the spec §4.3 retry
    /// envelope: exponential backoff base 2s/cap 30s/max 3 attempts,
    /// honoring a server `Retry-After` on 429.
    pub async fn chat_completion_with_retry(&self, messages: Vec<Message>) -> Result<ChatResponse> {
        let policy = BackoffPolicy::llm();
        retry_with_backoff(
            policy,
            || {
                let messages = messages.clone();
                async move { self.chat_completion(messages).await }
            },
            GatewayError::is_retryable,
            |e| match e {
                GatewayError::RateLimited {
                    retry_after_secs: Some(secs),
                } => Some(Duration::from_secs(*secs)),
                _ => None,
            },
        )
        .await
    }

    pub async fn create_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response = self
            .http
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let embed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        embed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| GatewayError::Api {
                status: status.as_u16(),
                body: "no embedding in response".into(),
            })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        warn!("llm-client call timed out");
        GatewayError::Timeout
    } else {
        GatewayError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base() {
        let cfg = LlmGatewayConfig {
            api_base: "https://gateway.internal/v1/".to_string(),
            api_key: "test".into(),
            model: "active".into(),
            embedding_model: "active-embedding".into(),
            max_tokens: 512,
        };
        let client = GatewayClient::new(&cfg);
        assert_eq!(client.api_base, "https://gateway.internal/v1");
    }
}
