//! ragserve-rs binary: HTTP server and CLI for the query engine.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragserve_rs::chunking::TextChunker;
use ragserve_rs::config::EngineConfig;
use ragserve_rs::embedding::{EmbeddingProvider, OpenAiEmbeddings};
use ragserve_rs::engine::{IngestionPipeline, QueryEngine, Retriever};
use ragserve_rs::index::{PineconeConfig, PineconeIndex, VectorIndex};
use ragserve_rs::llm::{LlmProvider, OpenAiChat};
use ragserve_rs::server::{AppState, router};
use ragserve_rs::tools::ToolRegistry;
use ragserve_rs::tools::social::{SocialConfig, XApiClient};

/// Tenant-scoped retrieval-augmented query engine with LLM tool
/// orchestration.
#[derive(Parser, Debug)]
#[command(name = "ragserve-rs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000", env = "PORT")]
        port: u16,
    },

    /// Ingest a document into a namespace.
    #[command(after_help = r"Examples:
  ragserve-rs ingest tenant-a https://example.com/guide.txt
  ragserve-rs ingest tenant-a ./docs/handbook.md
")]
    Ingest {
        /// Target namespace (tenant/session partition).
        namespace: String,
        /// Document source: an http(s) URL or a file path.
        source: String,
    },

    /// Ask a question against a namespace.
    #[command(after_help = r#"Examples:
  ragserve-rs query tenant-a "How do I configure exports?"
"#)]
    Query {
        /// Namespace to retrieve from.
        namespace: String,
        /// The question to answer.
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let services = Services::from_env().context("service initialization failed")?;

    match cli.command {
        Commands::Serve { port } => {
            let state = AppState {
                engine: services.engine,
                ingestion: services.ingestion,
            };
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
                .await
                .with_context(|| format!("failed to bind port {port}"))?;
            info!(port, "server listening");
            axum::serve(listener, router(state)).await?;
        }
        Commands::Ingest { namespace, source } => {
            let outcome = services.ingestion.ingest(&namespace, &source).await;
            let ok = outcome.success;
            print_json(&outcome)?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Query {
            namespace,
            question,
        } => {
            let outcome = services.engine.query(&namespace, &question, &[]).await;
            let ok = outcome.success;
            print_json(&outcome)?;
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Fully wired engine and pipeline handles.
struct Services {
    engine: Arc<QueryEngine>,
    ingestion: Arc<IngestionPipeline>,
}

impl Services {
    /// Constructs every service client from the environment, failing fast
    /// on missing configuration.
    fn from_env() -> anyhow::Result<Self> {
        let config = EngineConfig::from_env().context("engine configuration")?;

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddings::new(&config));
        let index: Arc<dyn VectorIndex> = Arc::new(PineconeIndex::new(
            PineconeConfig::from_env().context("vector index configuration")?,
        ));
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiChat::new(&config));
        let social = Arc::new(
            XApiClient::new(SocialConfig::from_env().context("social platform configuration")?)
                .context("social platform client")?,
        );
        let tools = Arc::new(ToolRegistry::builtin(social).context("tool registry")?);

        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&index), config.top_k);
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap);
        let ingestion = Arc::new(IngestionPipeline::new(
            embedder,
            index,
            chunker,
            config.ingest_concurrency,
        ));
        let engine = Arc::new(QueryEngine::new(retriever, llm, tools, config));

        Ok(Self { engine, ingestion })
    }
}

/// Writes a value as pretty JSON to stdout.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}
