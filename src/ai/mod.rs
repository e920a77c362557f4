//! AI provider integration for prompt expansion
//!
//! Provides interchangeable clients for OpenAI's Chat Completions API and
//! Gemini's `generateContent` API behind one [`PromptProvider`] trait.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiChatClient;
pub use mock::{MockPromptProvider, MockReply};
pub use openai::OpenAiChatClient;

use crate::models::{AiProvider, Config, Instruction};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.8;

/// Output length cap sent with every request.
pub const MAX_OUTPUT_TOKENS: u32 = 350;

#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Which upstream this client talks to.
    fn provider(&self) -> AiProvider;

    /// Perform exactly one upstream call and return the raw generated text.
    ///
    /// An empty string means the provider answered successfully without text.
    async fn generate_text(&self, instruction: &Instruction) -> Result<String>;
}

/// Build the client for the provider selected in `config`.
pub fn provider_from_config(config: &Config, client: reqwest::Client) -> Arc<dyn PromptProvider> {
    let api_key = config.api_key().to_string();
    let model = config.model().to_string();

    match config.provider {
        AiProvider::OpenAi => {
            info!("Prompt provider: OpenAI (model: {})", model);
            Arc::new(OpenAiChatClient::new_with_client(
                api_key,
                model,
                config.request_timeout,
                client,
            ))
        }
        AiProvider::Gemini => {
            info!("Prompt provider: Gemini (model: {})", model);
            Arc::new(GeminiChatClient::new_with_client(
                api_key,
                model,
                config.request_timeout,
                client,
            ))
        }
    }
}

/// Error envelope shared by OpenAI and Gemini: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Pull the provider's own error description out of a failure body, falling
/// back to the status reason phrase.
pub(crate) fn upstream_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown Error").to_string())
}

/// Strip the request URL from transport errors; Gemini carries the key in it.
pub(crate) fn transport_error(provider: AiProvider, e: reqwest::Error) -> Error {
    let e = e.without_url();
    tracing::error!("Failed to send request to {}: {}", provider, e);
    Error::Http(e)
}

/// Check the status and decode a provider response body.
pub(crate) async fn read_json<Resp: DeserializeOwned>(
    provider: AiProvider,
    response: reqwest::Response,
) -> Result<Resp> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        tracing::error!("{} API error (status {}): {}", provider, status, body);
        return Err(Error::Upstream {
            provider,
            status,
            message: upstream_error_message(status, &body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse {} response: {}\nBody: {}", provider, e, body);
        Error::MalformedResponse(format!("failed to parse {} response: {}", provider, e))
    })
}
