//! # ragserve-rs
//!
//! Tenant-scoped retrieval-augmented query engine with LLM tool
//! orchestration.
//!
//! Documents are chunked, embedded, and upserted into a namespace-
//! partitioned vector index. At query time the engine embeds the
//! question, retrieves ranked context from the caller's namespace, and
//! invokes an LLM bound to a registry of callable tools (arithmetic,
//! social-platform actions). Tool-call requests resolve in a single
//! round: results are aggregated directly into the final answer.
//!
//! External services (embedding provider, vector index, LLM, social
//! platform) sit behind narrow traits and are injected as `Arc<dyn …>`
//! handles constructed once at process start.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ragserve_rs::config::EngineConfig;
//! use ragserve_rs::embedding::{EmbeddingProvider, OpenAiEmbeddings};
//! use ragserve_rs::engine::{QueryEngine, Retriever};
//! use ragserve_rs::index::{MemoryIndex, VectorIndex};
//! use ragserve_rs::llm::OpenAiChat;
//! use ragserve_rs::tools::ToolRegistry;
//! use ragserve_rs::tools::social::{SocialConfig, XApiClient};
//!
//! # async fn run() -> Result<(), ragserve_rs::error::EngineError> {
//! let config = EngineConfig::from_env()?;
//! let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddings::new(&config));
//! let index: Arc<dyn VectorIndex> = Arc::new(MemoryIndex::new());
//! let social = Arc::new(XApiClient::new(SocialConfig::from_env()?)?);
//! let tools = Arc::new(ToolRegistry::builtin(social)?);
//!
//! let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&index), config.top_k);
//! let engine = QueryEngine::new(retriever, Arc::new(OpenAiChat::new(&config)), tools, config);
//!
//! let outcome = engine.query("tenant-a", "What does the setup guide say?", &[]).await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod llm;
pub mod server;
pub mod tools;
pub mod types;

// Re-export key types
pub use config::EngineConfig;
pub use engine::{IngestionPipeline, QueryEngine, Retriever};
pub use error::{EngineError, Result};
pub use types::{ChatTurn, IngestOutcome, QueryOutcome, RetrievalMatch, TurnRole};
