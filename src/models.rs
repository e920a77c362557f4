//! Data models and configuration
//!
//! Defines the request/response payloads exchanged with callers, the
//! provider-neutral instruction sent upstream, and the process configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Upstream generative-text provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    /// Environment variable holding the credential for this provider.
    pub fn api_key_var(self) -> &'static str {
        match self {
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiProvider::OpenAi => write!(f, "OpenAI"),
            AiProvider::Gemini => write!(f, "Gemini"),
        }
    }
}

impl FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(Error::Config(format!(
                "Unknown provider '{}'. Expected 'openai' or 'gemini'",
                other
            ))),
        }
    }
}

/// Creative brief submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBrief {
    pub idea: String,
    pub style: Option<String>,
    pub lighting: Option<String>,
}

impl PromptBrief {
    /// Decode a request body.
    ///
    /// Returns `Ok(None)` when the body carries no usable `idea` (empty body,
    /// non-object JSON, absent or blank field). Bodies that are not JSON at all
    /// are an error.
    pub fn from_body(body: &[u8]) -> Result<Option<Self>> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(body)?;
        let Value::Object(fields) = value else {
            return Ok(None);
        };

        let Some(idea) = text_field(&fields, "idea").filter(|idea| !idea.trim().is_empty()) else {
            return Ok(None);
        };

        Ok(Some(Self {
            idea,
            style: text_field(&fields, "style"),
            lighting: text_field(&fields, "lighting"),
        }))
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Body of every JSON response returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
}

/// Provider-neutral instruction for one upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub system: String,
    pub user: String,
}

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-0125";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: AiProvider,
    pub openai_api_key: String,
    pub gemini_api_key: String,
    pub openai_model: String,
    pub gemini_model: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Credentials are not validated here; a missing key surfaces as an
    /// upstream authentication error on the first request.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("PROMPT_PROVIDER") {
            Some(name) => name.parse()?,
            None => AiProvider::OpenAi,
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e| Error::Config(format!("Invalid BIND_ADDR: {}", e)))?;

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", e)))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            provider,
            openai_api_key: lookup(AiProvider::OpenAi.api_key_var()).unwrap_or_default(),
            gemini_api_key: lookup(AiProvider::Gemini.api_key_var()).unwrap_or_default(),
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Credential for the selected provider.
    pub fn api_key(&self) -> &str {
        match self.provider {
            AiProvider::OpenAi => &self.openai_api_key,
            AiProvider::Gemini => &self.gemini_api_key,
        }
    }

    /// Model id for the selected provider.
    pub fn model(&self) -> &str {
        match self.provider {
            AiProvider::OpenAi => &self.openai_model,
            AiProvider::Gemini => &self.gemini_model,
        }
    }
}
