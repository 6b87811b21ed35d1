//! Vector index interface.
//!
//! A namespace-partitioned nearest-neighbor store over embedded chunks.
//! The partition invariant is the engine's tenant boundary: a query in
//! namespace N only ever sees records upserted into N.

pub mod memory;
pub mod pinecone;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::types::RetrievalMatch;

pub use memory::MemoryIndex;
pub use pinecone::{PineconeConfig, PineconeIndex};

/// One embedded chunk ready for storage.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Stable record ID; re-upserting the same ID overwrites in place.
    pub id: String,
    /// Embedding vector (key material for similarity search).
    pub values: Vec<f32>,
    /// Chunk metadata, returned verbatim with retrieval matches.
    pub metadata: serde_json::Value,
}

/// Trait for vector index backends.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upserts records into the given namespace.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IndexUnavailable`] on service failures.
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>)
    -> Result<(), EngineError>;

    /// Queries the `top_k` nearest neighbors within a namespace, metadata
    /// included, ranked descending by similarity score.
    ///
    /// An empty or unknown namespace yields an empty result, not an error.
    /// May return fewer than `top_k` matches.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IndexUnavailable`] on service failures.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>, EngineError>;
}
