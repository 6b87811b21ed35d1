//! Tool registry and dispatch.
//!
//! Tools are named, schema-validated capabilities the model may request
//! during a query. The registry is assembled once at process start and is
//! read-only thereafter; dispatch goes through a closed [`BuiltinTool`]
//! enum rather than dynamic invocation, so an unknown name is an explicit
//! not-found result, never a dynamic call.

pub mod calculator;
pub mod social;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::EngineError;
use self::calculator::CalculatorArgs;
use self::social::{PostLookup, SocialPlatform};

/// Maximum raw byte length of tool argument JSON from the model.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the registry's dispatch table).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: Value,
}

/// A tool call requested by the model.
///
/// Not guaranteed to reference a registered tool; names and arguments are
/// validated before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// Closed set of built-in capabilities behind the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinTool {
    Calculator,
    PostUpdate,
    GetPosts,
    LikePost,
    Repost,
    DeletePost,
    TrendingTopics,
}

/// A registered tool: its model-facing definition plus the typed
/// invocation path selected at dispatch time.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    definition: ToolDefinition,
    kind: BuiltinTool,
}

impl ToolDescriptor {
    /// The tool's unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// The model-facing definition.
    #[must_use]
    pub const fn definition(&self) -> &ToolDefinition {
        &self.definition
    }
}

/// Process-wide tool registry, read-only after construction.
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    social: Arc<dyn SocialPlatform>,
}

impl ToolRegistry {
    /// Builds the registry with all built-in tools: the calculator plus
    /// the social platform actions backed by `social`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ToolConfiguration`] on a duplicate tool
    /// name, a startup-time fatal configuration error.
    pub fn builtin(social: Arc<dyn SocialPlatform>) -> Result<Self, EngineError> {
        let mut registry = Self {
            descriptors: Vec::new(),
            social,
        };
        registry.register(calculator::definition(), BuiltinTool::Calculator)?;
        registry.register(def_post_update(), BuiltinTool::PostUpdate)?;
        registry.register(def_get_posts(), BuiltinTool::GetPosts)?;
        registry.register(def_like_post(), BuiltinTool::LikePost)?;
        registry.register(def_repost(), BuiltinTool::Repost)?;
        registry.register(def_delete_post(), BuiltinTool::DeletePost)?;
        registry.register(def_trending_topics(), BuiltinTool::TrendingTopics)?;
        Ok(registry)
    }

    fn register(
        &mut self,
        definition: ToolDefinition,
        kind: BuiltinTool,
    ) -> Result<(), EngineError> {
        if self.resolve(&definition.name).is_some() {
            return Err(EngineError::ToolConfiguration {
                message: format!("duplicate tool name: {}", definition.name),
            });
        }
        self.descriptors.push(ToolDescriptor { definition, kind });
        Ok(())
    }

    /// Returns the model-facing definitions for all registered tools.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.descriptors
            .iter()
            .map(|d| d.definition.clone())
            .collect()
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validates `arguments` against the named tool's schema and invokes
    /// the underlying capability.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ToolNotFound`] for an unregistered name.
    /// - [`EngineError::ArgumentInvalid`] when arguments fail validation;
    ///   the capability is never executed.
    /// - [`EngineError::ExecutionFailed`] wrapping the underlying cause
    ///   when the capability itself fails.
    pub async fn invoke(&self, name: &str, arguments: &str) -> Result<Value, EngineError> {
        let descriptor = self
            .resolve(name)
            .ok_or_else(|| EngineError::ToolNotFound {
                name: name.to_string(),
            })?;

        if arguments.len() > MAX_TOOL_ARGS_LEN {
            return Err(EngineError::ArgumentInvalid {
                tool: name.to_string(),
                message: format!(
                    "arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    arguments.len()
                ),
            });
        }

        match descriptor.kind {
            BuiltinTool::Calculator => {
                let args: CalculatorArgs = parse_args(name, arguments)?;
                Ok(calculator::invoke(&args))
            }
            BuiltinTool::PostUpdate => {
                #[derive(Deserialize)]
                struct Args {
                    text: String,
                    #[serde(default)]
                    reply_to: Option<String>,
                }
                let args: Args = parse_args(name, arguments)?;
                self.social
                    .post(&args.text, args.reply_to.as_deref())
                    .await
                    .map_err(|e| execution_failed(name, &e))
            }
            BuiltinTool::GetPosts => {
                #[derive(Deserialize)]
                struct Args {
                    #[serde(default)]
                    post_id: Option<String>,
                    #[serde(default)]
                    username: Option<String>,
                    #[serde(default)]
                    limit: Option<u32>,
                    #[serde(default)]
                    search_query: Option<String>,
                }
                let args: Args = parse_args(name, arguments)?;
                let lookup = PostLookup {
                    post_id: args.post_id,
                    username: args.username,
                    limit: args.limit,
                    search_query: args.search_query,
                };
                self.social
                    .get_posts(&lookup)
                    .await
                    .map_err(|e| execution_failed(name, &e))
            }
            BuiltinTool::LikePost => {
                let args: PostIdArgs = parse_args(name, arguments)?;
                self.social
                    .like(&args.post_id)
                    .await
                    .map_err(|e| execution_failed(name, &e))
            }
            BuiltinTool::Repost => {
                let args: PostIdArgs = parse_args(name, arguments)?;
                self.social
                    .repost(&args.post_id)
                    .await
                    .map_err(|e| execution_failed(name, &e))
            }
            BuiltinTool::DeletePost => {
                let args: PostIdArgs = parse_args(name, arguments)?;
                self.social
                    .delete(&args.post_id)
                    .await
                    .map_err(|e| execution_failed(name, &e))
            }
            BuiltinTool::TrendingTopics => {
                // No parameters; arguments are ignored.
                self.social
                    .trending()
                    .await
                    .map_err(|e| execution_failed(name, &e))
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.descriptors.iter().map(ToolDescriptor::name).collect();
        f.debug_struct("ToolRegistry")
            .field("tools", &names)
            .finish_non_exhaustive()
    }
}

/// Arguments for tools addressing a single post.
#[derive(Debug, Deserialize)]
struct PostIdArgs {
    post_id: String,
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, raw: &str) -> Result<T, EngineError> {
    serde_json::from_str(raw).map_err(|e| EngineError::ArgumentInvalid {
        tool: tool.to_string(),
        message: format!("invalid arguments: {e}"),
    })
}

fn execution_failed(tool: &str, cause: &EngineError) -> EngineError {
    EngineError::ExecutionFailed {
        tool: tool.to_string(),
        cause: cause.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tool schema definitions
// ---------------------------------------------------------------------------

/// Defines the `post_update` tool.
fn def_post_update() -> ToolDefinition {
    ToolDefinition {
        name: "post_update".to_string(),
        description: "Publish a new post to the social platform. The post text must be \
                       280 characters or less."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text content of the post to publish."
                },
                "reply_to": {
                    "type": "string",
                    "description": "Post ID to reply to (optional)."
                }
            },
            "required": ["text"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `get_posts` tool.
fn def_get_posts() -> ToolDefinition {
    ToolDefinition {
        name: "get_posts".to_string(),
        description: "Retrieve posts from the social platform by ID, username, or search \
                       query, or get recent posts from the authenticated account."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "Specific post ID to retrieve."
                },
                "username": {
                    "type": "string",
                    "description": "Username to get posts from."
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of posts to retrieve. Defaults to 10."
                },
                "search_query": {
                    "type": "string",
                    "description": "Search query to filter posts."
                }
            },
            "additionalProperties": false
        }),
    }
}

/// Defines the `like_post` tool.
fn def_like_post() -> ToolDefinition {
    ToolDefinition {
        name: "like_post".to_string(),
        description: "Like a specific post on the social platform using its post ID.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "The ID of the post to like."
                }
            },
            "required": ["post_id"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `repost` tool.
fn def_repost() -> ToolDefinition {
    ToolDefinition {
        name: "repost".to_string(),
        description: "Reshare a specific post on the social platform using its post ID."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "The ID of the post to reshare."
                }
            },
            "required": ["post_id"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `delete_post` tool.
fn def_delete_post() -> ToolDefinition {
    ToolDefinition {
        name: "delete_post".to_string(),
        description: "Delete a specific post from the social platform using its post ID."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "The ID of the post to delete."
                }
            },
            "required": ["post_id"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `trending_topics` tool.
fn def_trending_topics() -> ToolDefinition {
    ToolDefinition {
        name: "trending_topics".to_string(),
        description: "Get trending topics on the social platform. Currently returns a \
                       static list."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock platform that records call counts and returns canned values.
    #[derive(Default)]
    struct MockPlatform {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockPlatform {
        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

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

    #[async_trait::async_trait]
    impl SocialPlatform for MockPlatform {
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

    fn registry() -> ToolRegistry {
        ToolRegistry::builtin(Arc::new(MockPlatform::default()))
            .unwrap_or_else(|e| panic!("registry construction failed: {e}"))
    }

    #[test]
    fn test_builtin_registers_all_tools() {
        let registry = registry();
        assert_eq!(registry.len(), 7);
        assert!(registry.resolve("calculator").is_some());
        assert!(registry.resolve("post_update").is_some());
        assert!(registry.resolve("trending_topics").is_some());
        assert!(registry.resolve("frobnicate").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry();
        let result = registry.register(calculator::definition(), BuiltinTool::Calculator);
        assert!(matches!(
            result,
            Err(EngineError::ToolConfiguration { .. })
        ));
    }

    #[test]
    fn test_all_definitions_have_valid_schemas() {
        let registry = registry();
        for def in registry.definitions() {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert!(def.parameters.is_object());
            assert_eq!(def.parameters["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = registry();
        let result = registry.invoke("frobnicate", "{}").await;
        assert!(matches!(result, Err(EngineError::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn test_invoke_calculator() {
        let registry = registry();
        let value = registry
            .invoke(
                "calculator",
                r#"{"operation":"add","number1":2,"number2":3}"#,
            )
            .await
            .unwrap_or_else(|e| panic!("invoke failed: {e}"));
        assert_eq!(value, json!(5));
    }

    #[tokio::test]
    async fn test_invoke_calculator_divide_by_zero_not_an_error() {
        let registry = registry();
        let value = registry
            .invoke(
                "calculator",
                r#"{"operation":"divide","number1":5,"number2":0}"#,
            )
            .await
            .unwrap_or_else(|e| panic!("invoke failed: {e}"));
        // Non-finite result serializes as null; the call itself succeeds.
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_execute() {
        let platform = Arc::new(MockPlatform::default());
        let registry = ToolRegistry::builtin(platform.clone() as Arc<dyn SocialPlatform>)
            .unwrap_or_else(|e| panic!("registry construction failed: {e}"));

        let result = registry.invoke("like_post", r#"{"wrong":"shape"}"#).await;
        assert!(matches!(result, Err(EngineError::ArgumentInvalid { .. })));
        assert_eq!(platform.count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_arguments_rejected() {
        let registry = registry();
        let huge = format!(r#"{{"post_id":"{}"}}"#, "x".repeat(MAX_TOOL_ARGS_LEN));
        let result = registry.invoke("like_post", &huge).await;
        assert!(matches!(result, Err(EngineError::ArgumentInvalid { .. })));
    }

    #[tokio::test]
    async fn test_platform_failure_wrapped_as_execution_failed() {
        let platform = Arc::new(MockPlatform::failing());
        let registry = ToolRegistry::builtin(platform.clone() as Arc<dyn SocialPlatform>)
            .unwrap_or_else(|e| panic!("registry construction failed: {e}"));

        let result = registry.invoke("like_post", r#"{"post_id":"42"}"#).await;
        match result {
            Err(EngineError::ExecutionFailed { tool, cause }) => {
                assert_eq!(tool, "like_post");
                assert!(cause.contains("simulated outage"));
            }
            other => panic!("expected ExecutionFailed, got: {other:?}"),
        }
        assert_eq!(platform.count(), 1);
    }

    #[tokio::test]
    async fn test_social_tool_dispatches_to_platform() {
        let platform = Arc::new(MockPlatform::default());
        let registry = ToolRegistry::builtin(platform.clone() as Arc<dyn SocialPlatform>)
            .unwrap_or_else(|e| panic!("registry construction failed: {e}"));

        let value = registry
            .invoke("post_update", r#"{"text":"hello world"}"#)
            .await
            .unwrap_or_else(|e| panic!("invoke failed: {e}"));
        assert_eq!(value, json!({ "ok": true }));
        assert_eq!(platform.count(), 1);
    }
}
