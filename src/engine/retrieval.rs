//! Retrieval stage: question → ranked context.
//!
//! Embeds the question and queries the vector index within the caller's
//! namespace. Retrieval never invents results: an empty or unknown
//! namespace yields an empty match list, not an error.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::EngineError;
use crate::index::VectorIndex;
use crate::types::RetrievalMatch;

/// Delimiter between chunk texts in the context blob.
pub const CONTEXT_DELIMITER: &str = "\n\n -- \n\n";

/// Namespace-scoped retrieval over the vector index.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    /// Creates a retriever over the given service handles.
    #[must_use]
    pub const fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Retrieves the top-ranked matches for `question` within `namespace`.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::EmbeddingFailed`] and
    /// [`EngineError::IndexUnavailable`] unchanged; no retries at this
    /// layer.
    pub async fn retrieve(
        &self,
        namespace: &str,
        question: &str,
    ) -> Result<Vec<RetrievalMatch>, EngineError> {
        let query_vector = self.embedder.embed_query(question).await?;
        let matches = self
            .index
            .query(namespace, &query_vector, self.top_k)
            .await?;
        debug!(namespace, count = matches.len(), "retrieval complete");
        Ok(matches)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

/// Concatenates match texts in ranked order into the context blob consumed
/// by the prompt builder. Matches without a `text` metadata field
/// contribute an empty string.
#[must_use]
pub fn context_blob(matches: &[RetrievalMatch]) -> String {
    matches
        .iter()
        .map(RetrievalMatch::text)
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}
