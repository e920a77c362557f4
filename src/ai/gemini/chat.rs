use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::ai::{PromptProvider, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::models::{AiProvider, Instruction};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
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
            http: GeminiHttpClient::new(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// One user turn carrying both the system guidance and the brief.
    pub fn build_request(&self, instruction: &Instruction) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(format!("{}\n\n{}", instruction.system, instruction.user)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    /// Text of the first candidate's first part. A candidate without content
    /// (for example one stopped by safety filters) counts as empty.
    pub fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            Error::MalformedResponse("no candidates in Gemini response".to_string())
        })?;

        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text);

        if text.is_none() {
            tracing::warn!(
                "Gemini returned no text (finish_reason: {:?})",
                candidate.finish_reason
            );
        }

        Ok(text.unwrap_or_default())
    }
}

#[async_trait]
impl PromptProvider for GeminiChatClient {
    fn provider(&self) -> AiProvider {
        AiProvider::Gemini
    }

    async fn generate_text(&self, instruction: &Instruction) -> Result<String> {
        let request = self.build_request(instruction);
        let response = self.http.generate_content(&request).await?;
        Self::extract_text(response)
    }
}
