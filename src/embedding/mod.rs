//! Embedding provider interface.
//!
//! Maps text to fixed-length numeric vectors for similarity search.
//! Vectors are purely derived data: recomputable at any time from their
//! source text, persisted only as vector-index key material.

pub mod openai;

use async_trait::async_trait;

use crate::error::EngineError;

pub use openai::OpenAiEmbeddings;

/// Trait for embedding backends.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single query string.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmbeddingFailed`] on provider failures.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EngineError>;

    /// Embeds a batch of document chunks, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmbeddingFailed`] on provider failures;
    /// a batch either embeds completely or not at all.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError>;
}
