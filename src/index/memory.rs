//! In-process vector index.
//!
//! Cosine-similarity store over per-namespace record lists. Used for
//! local development and tests; the namespace partition invariant is
//! structural (one list per namespace), and equal-score matches keep
//! insertion order because ranking uses a stable sort.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{VectorIndex, VectorRecord};
use crate::error::EngineError;
use crate::types::RetrievalMatch;

/// Namespace-partitioned in-memory vector index.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    namespaces: RwLock<HashMap<String, Vec<VectorRecord>>>,
}

impl MemoryIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored in a namespace.
    pub async fn namespace_len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, Vec::len)
    }
}

/// Cosine similarity between two vectors; 0.0 when either norm is zero
/// or the dimensions disagree.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<(), EngineError> {
        let mut namespaces = self.namespaces.write().await;
        let stored = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            // Same ID overwrites in place, keeping its original position.
            if let Some(existing) = stored.iter_mut().find(|r| r.id == record.id) {
                *existing = record;
            } else {
                stored.push(record);
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>, EngineError> {
        let namespaces = self.namespaces.read().await;
        let Some(stored) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<RetrievalMatch> = stored
            .iter()
            .map(|r| RetrievalMatch {
                score: cosine_similarity(&r.values, vector),
                metadata: r.metadata.clone(),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}
