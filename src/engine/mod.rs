//! Retrieval-augmented tool-orchestration query engine.
//!
//! Combines namespace-scoped retrieval with an LLM bound to the tool
//! registry, resolving tool-call requests in a single round.
//!
//! # Architecture
//!
//! ```text
//! ingest(namespace, source)             query(namespace, question, history)
//!   │                                     │
//!   ├── fetch source                      ├── Retriever (embed + index query)
//!   ├── TextChunker                       ├── prompt builder (context + history)
//!   ├── EmbeddingProvider (all chunks)    ├── LlmProvider ⇄ bound ToolRegistry
//!   └── VectorIndex upserts (fan-out 5)   ├── sequential tool dispatch
//!                                         └── aggregate → QueryOutcome
//! ```
//!
//! Every external collaborator is an injected `Arc<dyn …>` handle,
//! constructed once at process start and shared read-only thereafter.

pub mod ingest;
pub mod prompt;
pub mod query;
pub mod retrieval;

pub use ingest::IngestionPipeline;
pub use prompt::{SYSTEM_PROMPT, build_user_prompt};
pub use query::QueryEngine;
pub use retrieval::{CONTEXT_DELIMITER, Retriever, context_blob};
