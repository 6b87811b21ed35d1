//! OpenAI-compatible embedding provider via `async-openai`.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Embedding client for OpenAI-compatible APIs.
pub struct OpenAiEmbeddings {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbeddings {
    /// Creates a new embedding client from engine configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.embedding_model.clone(),
        }
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<Vec<Vec<f32>>, EngineError> {
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input,
            ..Default::default()
        };

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EngineError::EmbeddingFailed {
                message: e.to_string(),
            })?;

        // The API may return entries out of order; restore input order.
        let mut data = response.data;
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

impl std::fmt::Debug for OpenAiEmbeddings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddings")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let mut vectors = self.embed(EmbeddingInput::String(text.to_string())).await?;
        vectors.pop().ok_or_else(|| EngineError::EmbeddingFailed {
            message: "provider returned no embedding".to_string(),
        })
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .embed(EmbeddingInput::StringArray(texts.to_vec()))
            .await?;
        if vectors.len() != texts.len() {
            return Err(EngineError::EmbeddingFailed {
                message: format!(
                    "provider returned {} embeddings for {} inputs",
                    vectors.len(),
                    texts.len()
                ),
            });
        }
        Ok(vectors)
    }
}
