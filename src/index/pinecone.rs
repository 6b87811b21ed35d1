//! Pinecone-compatible vector index client.
//!
//! Talks JSON over HTTPS to a serverless index host: `POST /vectors/upsert`
//! and `POST /query`, both namespace-scoped. The index service owns its
//! own consistency; this client is a narrow adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{VectorIndex, VectorRecord};
use crate::error::EngineError;
use crate::types::RetrievalMatch;

/// Connection settings for a Pinecone-compatible index.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// Index API key.
    pub api_key: String,
    /// Index host URL (e.g. `https://my-index-abc123.svc.pinecone.io`).
    pub index_host: String,
}

impl PineconeConfig {
    /// Loads index settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] when `PINECONE_API_KEY`
    /// or `PINECONE_INDEX_HOST` is unset.
    pub fn from_env() -> Result<Self, EngineError> {
        let api_key = require_env("PINECONE_API_KEY")?;
        let index_host = require_env("PINECONE_INDEX_HOST")?;
        Ok(Self {
            api_key,
            index_host,
        })
    }
}

fn require_env(name: &str) -> Result<String, EngineError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| EngineError::ConfigurationMissing {
            name: name.to_string(),
        })
}

/// HTTP client for a Pinecone-compatible vector index.
pub struct PineconeIndex {
    client: reqwest::Client,
    config: PineconeConfig,
}

impl PineconeIndex {
    /// Creates a client for the configured index host.
    #[must_use]
    pub fn new(config: PineconeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.index_host)
    }
}

impl std::fmt::Debug for PineconeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeIndex")
            .field("index_host", &self.config.index_host)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a serde_json::Value,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    namespace: &'a str,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    score: f32,
    #[serde(default)]
    metadata: serde_json::Value,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<(), EngineError> {
        let vectors: Vec<UpsertVector<'_>> = records
            .iter()
            .map(|r| UpsertVector {
                id: &r.id,
                values: &r.values,
                metadata: &r.metadata,
            })
            .collect();
        let body = UpsertRequest { vectors, namespace };

        let response = self
            .client
            .post(self.url("/vectors/upsert"))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::IndexUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::IndexUnavailable {
                message: format!("upsert returned {status}: {detail}"),
            });
        }

        debug!(namespace, count = records.len(), "vectors upserted");
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>, EngineError> {
        let body = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
        };

        let response = self
            .client
            .post(self.url("/query"))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::IndexUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::IndexUnavailable {
                message: format!("query returned {status}: {detail}"),
            });
        }

        let parsed: QueryResponse =
            response
                .json()
                .await
                .map_err(|e| EngineError::IndexUnavailable {
                    message: format!("invalid query response: {e}"),
                })?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| RetrievalMatch {
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}
