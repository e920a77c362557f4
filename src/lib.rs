//! Prompt expansion service
//!
//! Accepts a short creative brief over HTTP, asks a generative-AI provider to
//! expand it into one detailed image-generation prompt, and returns the text.

pub mod ai;
pub mod error;
pub mod handler;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
