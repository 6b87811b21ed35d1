//! Tool-orchestrating query stage.
//!
//! Drives one query through its state machine: retrieve → prompt →
//! invoke → dispatch → aggregate. The model is bound to the full tool
//! registry; its response is either a final answer or a batch of tool
//! calls. Tool resolution is single-round: results are aggregated
//! directly into the answer with no second model round-trip.

use std::sync::Arc;

use tracing::{debug, warn};

use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::retrieval::{Retriever, context_blob};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::llm::message::{ChatRequest, system_message, user_message};
use crate::llm::provider::LlmProvider;
use crate::tools::{ToolCallRequest, ToolRegistry};
use crate::types::{ChatTurn, QueryOutcome};

/// Maximum accepted question length in bytes.
const MAX_QUESTION_LEN: usize = 10_000;

/// The engine: retrieval, prompting, LLM invocation, and tool dispatch
/// behind one entry point.
///
/// Constructed once at process start from injected service handles; all
/// state is read-only afterwards, so one engine serves concurrent queries
/// across namespaces.
pub struct QueryEngine {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: EngineConfig,
}

impl QueryEngine {
    /// Creates an engine over the given service handles.
    #[must_use]
    pub const fn new(
        retriever: Retriever,
        llm: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            retriever,
            llm,
            tools,
            config,
        }
    }

    /// Answers `question` against the corpus in `namespace`.
    ///
    /// Every failure is converted into the outcome envelope; no error
    /// escapes this entry point, and nothing is retried.
    pub async fn query(
        &self,
        namespace: &str,
        question: &str,
        history: &[ChatTurn],
    ) -> QueryOutcome {
        match self.run(namespace, question, history).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(namespace, error = %e, "query failed");
                QueryOutcome::failed(&e)
            }
        }
    }

    async fn run(
        &self,
        namespace: &str,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<QueryOutcome, EngineError> {
        if question.trim().is_empty() {
            return Err(EngineError::InvalidRequest {
                message: "question cannot be empty".to_string(),
            });
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(EngineError::InvalidRequest {
                message: format!(
                    "question exceeds maximum length ({} bytes, max {MAX_QUESTION_LEN})",
                    question.len()
                ),
            });
        }

        // Retrieve: embedding or index failure is terminal.
        let matches = self.retriever.retrieve(namespace, question).await?;
        let context = context_blob(&matches);

        // Prompt + invoke, bound to the full tool registry.
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![
                system_message(SYSTEM_PROMPT),
                user_message(&build_user_prompt(&context, question, history)),
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            tools: self.tools.definitions(),
        };
        let response = self.llm.chat(&request).await?;
        debug!(
            tool_calls = response.tool_calls.len(),
            total_tokens = response.usage.total_tokens,
            "model response received"
        );

        if response.tool_calls.is_empty() {
            return Ok(QueryOutcome::answered(response.content, matches));
        }

        let answer = self.dispatch(&response.tool_calls).await?;
        Ok(QueryOutcome::answered(answer, matches))
    }

    /// Resolves and executes a batch of tool calls.
    ///
    /// All names are resolved before anything runs: one unknown tool
    /// fails the whole batch with nothing executed. Calls then run
    /// sequentially in the model's emission order (ordering is
    /// load-bearing for side-effecting tools), and the first failure
    /// aborts the remainder.
    async fn dispatch(&self, calls: &[ToolCallRequest]) -> Result<String, EngineError> {
        for call in calls {
            if self.tools.resolve(&call.name).is_none() {
                return Err(EngineError::ToolNotFound {
                    name: call.name.clone(),
                });
            }
        }

        let mut lines = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.tools.invoke(&call.name, &call.arguments).await?;
            debug!(tool = %call.name, "tool dispatched");
            lines.push(format!("{}: {result}", call.name));
        }

        Ok(lines.join("\n\n"))
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("provider", &self.llm.name())
            .field("retriever", &self.retriever)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingProvider;
    use crate::index::{MemoryIndex, VectorIndex, VectorRecord};
    use crate::llm::message::{ChatResponse, TokenUsage};
    use crate::tools::ToolCallRequest;
    use crate::tools::social::{PostLookup, SocialPlatform};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic stub embedder.
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, EngineError> {
            Ok(vec![1.0, 0.0])
        }
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// Mock provider returning a canned response.
    struct MockProvider {
        response: ChatResponse,
    }

    impl MockProvider {
        fn text(content: &str) -> Self {
            Self {
                response: ChatResponse {
                    content: content.to_string(),
                    tool_calls: Vec::new(),
                    usage: TokenUsage::default(),
                },
            }
        }

        fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
            Self {
                response: ChatResponse {
                    content: String::new(),
                    tool_calls: calls,
                    usage: TokenUsage::default(),
                },
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }
        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, EngineError> {
            Ok(self.response.clone())
        }
    }

    /// Mock platform counting invocations.
    #[derive(Default)]
    struct CountingPlatform {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPlatform {
        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
        fn record(&self) -> Result<Value, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EngineError::PlatformRequest {
                    message: "simulated outage".to_string(),
                })
            } else {
                Ok(json!({ "ok": true }))
            }
        }
    }

    #[async_trait]
    impl SocialPlatform for CountingPlatform {
        async fn post(&self, _text: &str, _reply_to: Option<&str>) -> Result<Value, EngineError> {
            self.record()
        }
        async fn get_posts(&self, _lookup: &PostLookup) -> Result<Value, EngineError> {
            self.record()
        }
        async fn like(&self, _post_id: &str) -> Result<Value, EngineError> {
            self.record()
        }
        async fn repost(&self, _post_id: &str) -> Result<Value, EngineError> {
            self.record()
        }
        async fn delete(&self, _post_id: &str) -> Result<Value, EngineError> {
            self.record()
        }
        async fn trending(&self) -> Result<Value, EngineError> {
            self.record()
        }
    }

    fn calc_call(op: &str, a: i64, b: i64) -> ToolCallRequest {
        ToolCallRequest {
            name: "calculator".to_string(),
            arguments: format!(r#"{{"operation":"{op}","number1":{a},"number2":{b}}}"#),
        }
    }

    async fn engine_with(
        provider: MockProvider,
        platform: Arc<CountingPlatform>,
    ) -> (QueryEngine, Arc<MemoryIndex>) {
        let index = Arc::new(MemoryIndex::new());
        index
            .upsert(
                "tenant-a",
                vec![VectorRecord {
                    id: "c0".to_string(),
                    values: vec![1.0, 0.0],
                    metadata: json!({ "text": "the relevant chunk" }),
                }],
            )
            .await
            .unwrap_or_else(|e| panic!("upsert failed: {e}"));

        let config = EngineConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let retriever = Retriever::new(
            Arc::new(StubEmbedder),
            Arc::clone(&index) as Arc<dyn VectorIndex>,
            config.top_k,
        );
        let tools = Arc::new(
            ToolRegistry::builtin(platform)
                .unwrap_or_else(|e| panic!("registry construction failed: {e}")),
        );
        let engine = QueryEngine::new(retriever, Arc::new(provider), tools, config);
        (engine, index)
    }

    #[tokio::test]
    async fn test_text_answer_path() {
        let (engine, _index) =
            engine_with(MockProvider::text("Plain answer."), Arc::default()).await;

        let outcome = engine.query("tenant-a", "what is X?", &[]).await;
        assert!(outcome.success);
        assert_eq!(outcome.answer, "Plain answer.");
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].text(), "the relevant chunk");
    }

    #[tokio::test]
    async fn test_tool_results_aggregate_in_dispatch_order() {
        let provider = MockProvider::tool_calls(vec![
            calc_call("add", 2, 3),
            calc_call("multiply", 4, 5),
        ]);
        let (engine, _index) = engine_with(provider, Arc::default()).await;

        let outcome = engine.query("tenant-a", "compute things", &[]).await;
        assert!(outcome.success, "unexpected failure: {:?}", outcome.error);

        let first = outcome.answer.find("calculator: 5").unwrap_or(usize::MAX);
        let second = outcome.answer.find("calculator: 20").unwrap_or(0);
        assert!(first < second, "order not preserved: {}", outcome.answer);
        assert!(outcome.answer.contains("\n\n"));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails_whole_batch_nothing_executes() {
        let platform = Arc::new(CountingPlatform::default());
        // A valid side-effecting call first, then an unknown tool.
        let provider = MockProvider::tool_calls(vec![
            ToolCallRequest {
                name: "post_update".to_string(),
                arguments: r#"{"text":"hello"}"#.to_string(),
            },
            ToolCallRequest {
                name: "nonexistent_tool".to_string(),
                arguments: "{}".to_string(),
            },
        ]);
        let (engine, _index) = engine_with(provider, Arc::clone(&platform)).await;

        let outcome = engine.query("tenant-a", "do things", &[]).await;
        assert!(!outcome.success);
        let error = outcome.error.unwrap_or_default();
        assert!(error.contains("ToolNotFound"), "got: {error}");
        assert!(error.contains("nonexistent_tool"));
        // The registered tool earlier in the batch must not have run.
        assert_eq!(platform.count(), 0);
    }

    #[tokio::test]
    async fn test_tool_failure_aborts_remaining_calls() {
        let platform = Arc::new(CountingPlatform {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let provider = MockProvider::tool_calls(vec![
            ToolCallRequest {
                name: "like_post".to_string(),
                arguments: r#"{"post_id":"1"}"#.to_string(),
            },
            ToolCallRequest {
                name: "repost".to_string(),
                arguments: r#"{"post_id":"2"}"#.to_string(),
            },
        ]);
        let (engine, _index) = engine_with(provider, Arc::clone(&platform)).await;

        let outcome = engine.query("tenant-a", "do things", &[]).await;
        assert!(!outcome.success);
        let error = outcome.error.unwrap_or_default();
        assert!(error.contains("ExecutionFailed"), "got: {error}");
        // Only the first call ran; the failure aborted the second.
        assert_eq!(platform.count(), 1);
    }

    #[tokio::test]
    async fn test_empty_question_is_invalid_request() {
        let (engine, _index) = engine_with(MockProvider::text("unused"), Arc::default()).await;

        let outcome = engine.query("tenant-a", "   ", &[]).await;
        assert!(!outcome.success);
        let error = outcome.error.unwrap_or_default();
        assert!(error.contains("InvalidRequest"));
    }

    #[tokio::test]
    async fn test_empty_namespace_still_answers() {
        let (engine, _index) = engine_with(MockProvider::text("no context answer"), Arc::default())
            .await;

        // Namespace with no ingested chunks: retrieval returns empty, the
        // query still reaches the model.
        let outcome = engine.query("tenant-unknown", "anything?", &[]).await;
        assert!(outcome.success);
        assert_eq!(outcome.answer, "no context answer");
        assert!(outcome.matches.is_empty());
    }
}
