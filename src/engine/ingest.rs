//! Ingestion pipeline: source document → chunks → vectors → index.
//!
//! The only stage with intentional concurrency: index writes for distinct
//! chunks are independent commutative upserts, so they run with a small
//! bounded fan-out. Embedding happens before any write: an embedding
//! failure aborts the whole document rather than leaving a partially
//! populated namespace, since a re-ingest is idempotent and cheap.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use futures_util::TryStreamExt;
use futures_util::stream::{self, StreamExt};
use serde_json::json;
use tracing::{info, warn};

use crate::chunking::TextChunker;
use crate::embedding::EmbeddingProvider;
use crate::error::EngineError;
use crate::index::{VectorIndex, VectorRecord};
use crate::types::IngestOutcome;

/// Records per upsert request.
const UPSERT_BATCH_SIZE: usize = 100;

/// Populates a namespace from a source document.
pub struct IngestionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: TextChunker,
    concurrency: usize,
    http: reqwest::Client,
}

impl IngestionPipeline {
    /// Creates a pipeline over the given service handles.
    #[must_use]
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chunker: TextChunker,
        concurrency: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker,
            concurrency: concurrency.max(1),
            http: reqwest::Client::new(),
        }
    }

    /// Ingests `source` (an `http(s)` URL or a local file path) into
    /// `namespace`.
    ///
    /// All errors are converted into the outcome envelope; nothing
    /// escapes this entry point. The vector-index write is the only side
    /// effect.
    pub async fn ingest(&self, namespace: &str, source: &str) -> IngestOutcome {
        match self.run(namespace, source).await {
            Ok(message) => IngestOutcome::stored(message),
            Err(e) => {
                warn!(namespace, source, error = %e, "ingestion failed");
                IngestOutcome::failed(&e)
            }
        }
    }

    async fn run(&self, namespace: &str, source: &str) -> Result<String, EngineError> {
        let text = self.fetch_source(source).await?;
        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Ok("source contained no text; nothing stored".to_string());
        }

        // Embed every chunk before writing anything: an embedding failure
        // must not leave a partially populated namespace.
        let vectors = self.embedder.embed_documents(&chunks).await?;

        let source_tag = source_tag(source);
        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (chunk_text, values))| VectorRecord {
                id: format!("{source_tag}-{i}"),
                values,
                metadata: json!({
                    "text": chunk_text,
                    "source": source,
                    "chunk_index": i,
                }),
            })
            .collect();
        let stored = records.len();

        // Bounded fan-out across upsert batches; chunk writes are
        // commutative, so completion order does not matter.
        let batches: Vec<Vec<VectorRecord>> = records
            .chunks(UPSERT_BATCH_SIZE)
            .map(<[VectorRecord]>::to_vec)
            .collect();
        stream::iter(batches.into_iter().map(|batch| {
            let index = Arc::clone(&self.index);
            let namespace = namespace.to_string();
            async move { index.upsert(&namespace, batch).await }
        }))
        .buffer_unordered(self.concurrency)
        .try_collect::<Vec<()>>()
        .await?;

        info!(namespace, chunks = stored, "document ingested");
        Ok(format!("data loaded and stored successfully ({stored} chunks)"))
    }

    /// Reads the raw source document as UTF-8 text.
    async fn fetch_source(&self, source: &str) -> Result<String, EngineError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let response =
                self.http
                    .get(source)
                    .send()
                    .await
                    .map_err(|e| EngineError::SourceUnavailable {
                        message: e.to_string(),
                    })?;
            let status = response.status();
            if !status.is_success() {
                return Err(EngineError::SourceUnavailable {
                    message: format!("{source} returned {status}"),
                });
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| EngineError::SourceUnavailable {
                    message: e.to_string(),
                })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            tokio::fs::read(source)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| EngineError::SourceUnavailable {
                    message: format!("{source}: {e}"),
                })
        }
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("chunker", &self.chunker)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

/// Stable per-source tag; re-ingesting the same source overwrites the same
/// record IDs instead of duplicating them.
fn source_tag(source: &str) -> String {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
