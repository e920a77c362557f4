//! Prompt expansion request handling
//!
//! Turns one inbound request (method + raw body) into exactly one [`Outcome`],
//! calling the configured provider at most once.

use crate::ai::PromptProvider;
use crate::models::{PromptBrief, PromptResponse};
use crate::{prompts, Error, Result};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const MISSING_IDEA: &str = "Missing 'idea' in request body";

/// Every way a request can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Preflight,
    MethodNotAllowed,
    MissingIdea,
    UpstreamFailure(String),
    Internal(String),
    Generated(String),
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Preflight | Outcome::Generated(_) => StatusCode::OK,
            Outcome::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Outcome::MissingIdea => StatusCode::BAD_REQUEST,
            Outcome::UpstreamFailure(_) | Outcome::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body, or `None` for the empty pre-flight acknowledgment.
    pub fn body(&self) -> Option<PromptResponse> {
        let prompt = match self {
            Outcome::Preflight => return None,
            Outcome::MethodNotAllowed => METHOD_NOT_ALLOWED.to_string(),
            Outcome::MissingIdea => MISSING_IDEA.to_string(),
            Outcome::UpstreamFailure(text) | Outcome::Internal(text) | Outcome::Generated(text) => {
                text.clone()
            }
        };
        Some(PromptResponse { prompt })
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.body() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

pub struct PromptHandler {
    provider: Arc<dyn PromptProvider>,
}

impl PromptHandler {
    pub fn new(provider: Arc<dyn PromptProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> Outcome {
        if method == Method::OPTIONS {
            return Outcome::Preflight;
        }
        if method != Method::POST {
            debug!("Rejecting {} request", method);
            return Outcome::MethodNotAllowed;
        }

        match self.expand(body).await {
            Ok(outcome) => outcome,
            Err(Error::Upstream {
                provider,
                status,
                message,
            }) => {
                error!("{} API error (status {}): {}", provider, status, message);
                Outcome::UpstreamFailure(format!(
                    "{} API Error: Check key or billing: {}",
                    provider, message
                ))
            }
            Err(e) => {
                error!("Prompt expansion failed: {}", e);
                Outcome::Internal(format!("Internal Server Error. Details: {}", e))
            }
        }
    }

    async fn expand(&self, body: &[u8]) -> Result<Outcome> {
        let Some(brief) = PromptBrief::from_body(body)? else {
            return Ok(Outcome::MissingIdea);
        };

        let instruction = prompts::instruction_for(&brief);
        info!(
            "Expanding idea ({} chars) with {}",
            brief.idea.len(),
            self.provider.provider()
        );

        let text = self.provider.generate_text(&instruction).await?;
        let prompt = text.trim();

        if prompt.is_empty() {
            info!("{} returned no text, using fallback", self.provider.provider());
            return Ok(Outcome::Generated(prompts::FALLBACK_PROMPT.to_string()));
        }

        info!("Generated prompt ({} chars)", prompt.len());
        Ok(Outcome::Generated(prompt.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockPromptProvider, MockReply};
    use crate::models::AiProvider;
    use pretty_assertions::assert_eq;

    const BRIEF: &[u8] = br#"{"idea": "a cat", "style": "ukiyo-e", "lighting": "dawn"}"#;

    fn handler_with(provider: MockPromptProvider) -> (PromptHandler, Arc<MockPromptProvider>) {
        let provider = Arc::new(provider);
        (PromptHandler::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_preflight_is_empty_ok() {
        let (handler, provider) = handler_with(MockPromptProvider::new());

        let outcome = handler.handle(&Method::OPTIONS, BRIEF).await;
        assert_eq!(outcome, Outcome::Preflight);
        assert_eq!(outcome.status(), StatusCode::OK);
        assert_eq!(outcome.body(), None);
        assert_eq!(provider.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_other_methods_are_not_allowed() {
        let (handler, provider) = handler_with(MockPromptProvider::new());

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let outcome = handler.handle(&method, BRIEF).await;
            assert_eq!(outcome.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(
                outcome.body(),
                Some(PromptResponse {
                    prompt: "Method Not Allowed".to_string()
                })
            );
        }
        assert_eq!(provider.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_idea_never_calls_provider() {
        let (handler, provider) = handler_with(MockPromptProvider::new());

        let bodies: [&[u8]; 4] = [
            br#"{"style": "noir"}"#,
            br#"{"idea": ""}"#,
            br#"{"idea": null, "lighting": "dusk"}"#,
            b"",
        ];
        for body in bodies {
            let outcome = handler.handle(&Method::POST, body).await;
            assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                outcome.body().unwrap().prompt,
                "Missing 'idea' in request body"
            );
        }
        assert_eq!(provider.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_success_trims_generated_text() {
        let (handler, provider) =
            handler_with(MockPromptProvider::new().with_text_response("  A cat.  "));

        let outcome = handler.handle(&Method::POST, BRIEF).await;
        assert_eq!(outcome, Outcome::Generated("A cat.".to_string()));
        assert_eq!(outcome.status(), StatusCode::OK);
        assert_eq!(provider.get_call_count(), 1);

        let instructions = provider.received_instructions();
        assert_eq!(
            instructions[0].user,
            "Idea: a cat, Style: ukiyo-e, Lighting: dawn"
        );
    }

    #[tokio::test]
    async fn test_empty_text_uses_fallback() {
        let (handler, _) = handler_with(MockPromptProvider::new().with_text_response(" \n "));

        let outcome = handler.handle(&Method::POST, BRIEF).await;
        assert_eq!(
            outcome.body().unwrap().prompt,
            "Sorry, the AI could not generate a prompt."
        );
        assert_eq!(outcome.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upstream_error_surfaces_provider_message() {
        let (handler, _) = handler_with(
            MockPromptProvider::new()
                .with_provider(AiProvider::OpenAi)
                .with_reply(MockReply::Upstream {
                    status: StatusCode::UNAUTHORIZED,
                    message: "invalid key".to_string(),
                }),
        );

        let outcome = handler.handle(&Method::POST, BRIEF).await;
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            outcome.body().unwrap().prompt,
            "OpenAI API Error: Check key or billing: invalid key"
        );
    }

    #[tokio::test]
    async fn test_upstream_error_names_gemini() {
        let (handler, _) = handler_with(
            MockPromptProvider::new()
                .with_provider(AiProvider::Gemini)
                .with_reply(MockReply::Upstream {
                    status: StatusCode::TOO_MANY_REQUESTS,
                    message: "quota exceeded".to_string(),
                }),
        );

        let outcome = handler.handle(&Method::POST, BRIEF).await;
        assert_eq!(
            outcome.body().unwrap().prompt,
            "Gemini API Error: Check key or billing: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_malformed_response_is_internal_error() {
        let (handler, _) = handler_with(
            MockPromptProvider::new().with_reply(MockReply::Malformed("no choices".to_string())),
        );

        let outcome = handler.handle(&Method::POST, BRIEF).await;
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let prompt = outcome.body().unwrap().prompt;
        assert!(prompt.starts_with("Internal Server Error. Details: "));
        assert!(prompt.contains("no choices"));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_internal_error() {
        let (handler, provider) = handler_with(MockPromptProvider::new());

        let outcome = handler.handle(&Method::POST, b"{not json").await;
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(outcome
            .body()
            .unwrap()
            .prompt
            .starts_with("Internal Server Error. Details: "));
        assert_eq!(provider.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_requests_keep_response_shape() {
        let (handler, provider) =
            handler_with(MockPromptProvider::new().with_text_response("A cat."));

        let first = handler.handle(&Method::POST, BRIEF).await;
        let second = handler.handle(&Method::POST, BRIEF).await;
        assert_eq!(first, second);
        assert_eq!(provider.get_call_count(), 2);
    }
}
