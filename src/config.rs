//! Engine configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use crate::chunking::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::error::EngineError;

/// Default chat model for the query stage.
const DEFAULT_CHAT_MODEL: &str = "gpt-5-mini-2025-08-07";
/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Default nearest-neighbor count for retrieval.
const DEFAULT_TOP_K: usize = 5;
/// Default concurrent embedding/upsert operations during ingestion.
const DEFAULT_INGEST_CONCURRENCY: usize = 5;
/// Default maximum tokens for a model response.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Configuration for the query engine and its service clients.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// API key for the OpenAI-compatible chat/embedding endpoint.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model used by the tool-orchestrating query stage.
    pub chat_model: String,
    /// Model used to embed chunks and questions.
    pub embedding_model: String,
    /// Nearest-neighbor count requested from the vector index.
    pub top_k: usize,
    /// Chunk window length in grapheme clusters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunk windows.
    pub chunk_overlap: usize,
    /// Bounded fan-out for ingestion embedding/upsert calls.
    pub ingest_concurrency: usize,
    /// Maximum tokens for a model response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f32,
}

impl EngineConfig {
    /// Creates a new builder for `EngineConfig`.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, EngineError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    chat_model: Option<String>,
    embedding_model: Option<String>,
    top_k: Option<usize>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    ingest_concurrency: Option<usize>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl EngineConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("RAGSERVE_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("RAGSERVE_BASE_URL"))
                .ok();
        }
        if self.chat_model.is_none() {
            self.chat_model = std::env::var("RAGSERVE_CHAT_MODEL").ok();
        }
        if self.embedding_model.is_none() {
            self.embedding_model = std::env::var("RAGSERVE_EMBEDDING_MODEL").ok();
        }
        if self.top_k.is_none() {
            self.top_k = std::env::var("RAGSERVE_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.ingest_concurrency.is_none() {
            self.ingest_concurrency = std::env::var("RAGSERVE_INGEST_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat model.
    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Sets the retrieval nearest-neighbor count.
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Sets the chunk window length.
    #[must_use]
    pub const fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = Some(n);
        self
    }

    /// Sets the chunk overlap.
    #[must_use]
    pub const fn chunk_overlap(mut self, n: usize) -> Self {
        self.chunk_overlap = Some(n);
        self
    }

    /// Sets the ingestion fan-out.
    #[must_use]
    pub const fn ingest_concurrency(mut self, n: usize) -> Self {
        self.ingest_concurrency = Some(n);
        self
    }

    /// Sets the maximum response tokens.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Builds the [`EngineConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] if no API key was set.
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        let api_key = self
            .api_key
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: "OPENAI_API_KEY".to_string(),
            })?;

        Ok(EngineConfig {
            api_key,
            base_url: self.base_url,
            chat_model: self
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            ingest_concurrency: self
                .ingest_concurrency
                .unwrap_or(DEFAULT_INGEST_CONCURRENCY),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: self.temperature.unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.ingest_concurrency, 5);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = EngineConfig::builder().build();
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationMissing { .. })
        ));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = EngineConfig::builder()
            .api_key("key")
            .chat_model("gpt-4.1")
            .top_k(10)
            .chunk_size(500)
            .chunk_overlap(50)
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.chat_model, "gpt-4.1");
        assert_eq!(config.top_k, 10);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
    }
}
