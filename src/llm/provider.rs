//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. This keeps the query stage decoupled
//! from any particular LLM vendor.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::EngineError;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls) for a
/// specific provider while presenting a uniform interface to the engine.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request with the given bound tools.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ModelUnavailable`] on API failures,
    /// timeouts, or parse errors.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, EngineError>;
}
