use super::PromptProvider;
use crate::models::{AiProvider, Instruction};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, PoisonError};

/// Scripted outcome for one mock call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Upstream { status: StatusCode, message: String },
    Malformed(String),
}

pub struct MockPromptProvider {
    provider: AiProvider,
    replies: Arc<Mutex<Vec<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    instructions: Arc<Mutex<Vec<Instruction>>>,
}

impl MockPromptProvider {
    pub fn new() -> Self {
        Self {
            provider: AiProvider::OpenAi,
            replies: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            instructions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_provider(mut self, provider: AiProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reply);
        self
    }

    pub fn with_text_response(self, text: &str) -> Self {
        self.with_reply(MockReply::Text(text.to_string()))
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Instructions received so far, in call order.
    pub fn received_instructions(&self) -> Vec<Instruction> {
        self.instructions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockPromptProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptProvider for MockPromptProvider {
    fn provider(&self) -> AiProvider {
        self.provider
    }

    async fn generate_text(&self, instruction: &Instruction) -> Result<String> {
        let count = {
            let mut count = self.call_count.lock().unwrap_or_else(PoisonError::into_inner);
            *count += 1;
            *count
        };
        self.instructions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(instruction.clone());

        let reply = {
            let replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
            if replies.is_empty() {
                None
            } else {
                Some(replies[(count - 1) % replies.len()].clone())
            }
        };

        match reply {
            None => Ok(format!("A vivid scene based on {}", instruction.user)),
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Upstream { status, message }) => Err(Error::Upstream {
                provider: self.provider,
                status,
                message,
            }),
            Some(MockReply::Malformed(detail)) => Err(Error::MalformedResponse(detail)),
        }
    }
}
