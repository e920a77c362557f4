use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::ai::{PromptProvider, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::models::{AiProvider, Instruction};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, Duration::from_secs(30), reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, timeout, client),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn build_request(&self, instruction: &Instruction) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", &instruction.system),
                ChatMessage::new("user", &instruction.user),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }

    /// Text of the first choice. A choice with `null` content counts as empty.
    pub fn extract_text(response: ChatCompletionResponse) -> Result<String> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("no choices in OpenAI response".to_string()))?;

        let message = choice.message.ok_or_else(|| {
            Error::MalformedResponse("OpenAI choice is missing its message".to_string())
        })?;

        if message.content.is_none() {
            tracing::warn!(
                "OpenAI returned no content (finish_reason: {:?})",
                choice.finish_reason
            );
        }

        Ok(message.content.unwrap_or_default())
    }
}

#[async_trait]
impl PromptProvider for OpenAiChatClient {
    fn provider(&self) -> AiProvider {
        AiProvider::OpenAi
    }

    async fn generate_text(&self, instruction: &Instruction) -> Result<String> {
        let request = self.build_request(instruction);
        let response = self.http.chat_completion(&request).await?;
        Self::extract_text(response)
    }
}
