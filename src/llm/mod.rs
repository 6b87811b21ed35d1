//! LLM service interface.
//!
//! Provider-agnostic chat types, the [`LlmProvider`] trait, and the
//! OpenAI-compatible implementation used in production.

pub mod message;
pub mod openai;
pub mod provider;

pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use openai::OpenAiChat;
pub use provider::LlmProvider;
