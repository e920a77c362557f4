//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror.

use crate::models::AiProvider;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} API error (status {status}): {message}")]
    Upstream {
        provider: AiProvider,
        status: StatusCode,
        message: String,
    },

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
