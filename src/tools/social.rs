//! Social platform client backing the social-media tools.
//!
//! Wraps the X API v2 behind the [`SocialPlatform`] trait so the tool
//! registry (and tests) stay decoupled from the concrete HTTP client.
//! Each trait method performs exactly one platform operation and surfaces
//! the platform's result or failure verbatim.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::EngineError;

/// Maximum post length accepted by the platform.
const MAX_POST_LEN: usize = 280;
/// Default number of posts returned by timeline/search lookups.
const DEFAULT_LOOKUP_LIMIT: u32 = 10;
/// Fields requested with every post lookup.
const POST_FIELDS: &str = "created_at,public_metrics,author_id";

/// Credential bundle and endpoint for the social platform.
///
/// Constructed once at process start; absence of the credential is a fatal
/// configuration error, never a lazy first-use failure.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// OAuth 2.0 user-context bearer token.
    pub bearer_token: String,
    /// API base URL (overridable for compatible endpoints).
    pub api_base: String,
}

impl SocialConfig {
    /// Loads the credential bundle from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] when `X_BEARER_TOKEN`
    /// is unset or empty.
    pub fn from_env() -> Result<Self, EngineError> {
        let bearer_token = std::env::var("X_BEARER_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: "X_BEARER_TOKEN".to_string(),
            })?;
        let api_base =
            std::env::var("X_API_BASE").unwrap_or_else(|_| "https://api.x.com".to_string());
        Ok(Self {
            bearer_token,
            api_base,
        })
    }
}

/// Criteria for retrieving posts; at most one selector applies, checked in
/// order: `post_id`, `username`, `search_query`, then the authenticated
/// user's own timeline.
#[derive(Debug, Clone, Default)]
pub struct PostLookup {
    /// Specific post ID to retrieve.
    pub post_id: Option<String>,
    /// Username whose timeline to retrieve.
    pub username: Option<String>,
    /// Maximum number of posts to retrieve.
    pub limit: Option<u32>,
    /// Free-text search query.
    pub search_query: Option<String>,
}

/// One remote call per method; results and failures surface verbatim.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Publishes a post, optionally as a reply.
    async fn post(&self, text: &str, reply_to: Option<&str>) -> Result<Value, EngineError>;

    /// Retrieves posts by ID, username, search query, or own timeline.
    async fn get_posts(&self, lookup: &PostLookup) -> Result<Value, EngineError>;

    /// Likes a post by ID.
    async fn like(&self, post_id: &str) -> Result<Value, EngineError>;

    /// Reshares a post by ID.
    async fn repost(&self, post_id: &str) -> Result<Value, EngineError>;

    /// Deletes a post by ID.
    async fn delete(&self, post_id: &str) -> Result<Value, EngineError>;

    /// Returns trending topics. Static stub; no remote call.
    async fn trending(&self) -> Result<Value, EngineError>;
}

/// X API v2 client.
pub struct XApiClient {
    client: reqwest::Client,
    config: SocialConfig,
}

impl XApiClient {
    /// Creates a client from a validated credential bundle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] for an empty token,
    /// so a misconfigured process fails at startup rather than on the
    /// first tool call.
    pub fn new(config: SocialConfig) -> Result<Self, EngineError> {
        if config.bearer_token.trim().is_empty() {
            return Err(EngineError::ConfigurationMissing {
                name: "X_BEARER_TOKEN".to_string(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    /// Checks the response status and parses the JSON body.
    async fn into_json(response: reqwest::Response) -> Result<Value, EngineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::PlatformRequest {
                message: format!("{status}: {body}"),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: format!("invalid response body: {e}"),
            })
    }

    /// Resolves the authenticated user's ID (`GET /2/users/me`).
    async fn me_id(&self) -> Result<String, EngineError> {
        let response = self
            .client
            .get(self.url("/2/users/me"))
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: e.to_string(),
            })?;
        let body = Self::into_json(response).await?;
        body["data"]["id"]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| EngineError::PlatformRequest {
                message: "authenticated user lookup returned no ID".to_string(),
            })
    }

    /// Fetches a user's recent posts by user ID.
    async fn user_timeline(&self, user_id: &str, limit: u32) -> Result<Vec<Value>, EngineError> {
        let max_results = limit.to_string();
        let response = self
            .client
            .get(self.url(&format!("/2/users/{user_id}/tweets")))
            .bearer_auth(&self.config.bearer_token)
            .query(&[
                ("tweet.fields", POST_FIELDS),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: e.to_string(),
            })?;
        let body = Self::into_json(response).await?;
        Ok(body["data"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(post_view)
            .collect())
    }

    fn lookup_limit(lookup: &PostLookup) -> u32 {
        lookup.limit.unwrap_or(DEFAULT_LOOKUP_LIMIT)
    }
}

/// Normalizes a raw platform post object into the view returned by tools.
fn post_view(raw: &Value) -> Value {
    let metrics = &raw["public_metrics"];
    json!({
        "id": raw["id"].as_str().unwrap_or_default(),
        "text": raw["text"].as_str().unwrap_or_default(),
        "author": raw["author_id"].as_str().unwrap_or("unknown"),
        "created_at": raw["created_at"].as_str().unwrap_or_default(),
        "likes": metrics["like_count"].as_u64().unwrap_or(0),
        "reposts": metrics["retweet_count"].as_u64().unwrap_or(0),
        "replies": metrics["reply_count"].as_u64().unwrap_or(0),
    })
}

#[async_trait]
impl SocialPlatform for XApiClient {
    async fn post(&self, text: &str, reply_to: Option<&str>) -> Result<Value, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::PlatformRequest {
                message: "post text cannot be empty".to_string(),
            });
        }
        if text.chars().count() > MAX_POST_LEN {
            return Err(EngineError::PlatformRequest {
                message: format!("post text cannot exceed {MAX_POST_LEN} characters"),
            });
        }

        let mut payload = json!({ "text": text });
        if let Some(reply_id) = reply_to {
            payload["reply"] = json!({ "in_reply_to_tweet_id": reply_id });
        }

        let response = self
            .client
            .post(self.url("/2/tweets"))
            .bearer_auth(&self.config.bearer_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: e.to_string(),
            })?;
        let body = Self::into_json(response).await?;

        let post_id = body["data"]["id"].as_str().unwrap_or_default();
        debug!(post_id, "post published");
        Ok(json!({
            "success": true,
            "post_id": post_id,
            "text": text,
            "message": "post published successfully",
        }))
    }

    async fn get_posts(&self, lookup: &PostLookup) -> Result<Value, EngineError> {
        let posts: Vec<Value> = if let Some(ref post_id) = lookup.post_id {
            let response = self
                .client
                .get(self.url(&format!("/2/tweets/{post_id}")))
                .bearer_auth(&self.config.bearer_token)
                .query(&[("tweet.fields", POST_FIELDS)])
                .send()
                .await
                .map_err(|e| EngineError::PlatformRequest {
                    message: e.to_string(),
                })?;
            let body = Self::into_json(response).await?;
            if body["data"].is_object() {
                vec![post_view(&body["data"])]
            } else {
                Vec::new()
            }
        } else if let Some(ref username) = lookup.username {
            let response = self
                .client
                .get(self.url(&format!("/2/users/by/username/{username}")))
                .bearer_auth(&self.config.bearer_token)
                .send()
                .await
                .map_err(|e| EngineError::PlatformRequest {
                    message: e.to_string(),
                })?;
            let body = Self::into_json(response).await?;
            match body["data"]["id"].as_str() {
                Some(user_id) => {
                    let user_id = user_id.to_string();
                    self.user_timeline(&user_id, Self::lookup_limit(lookup))
                        .await?
                }
                None => Vec::new(),
            }
        } else if let Some(ref query) = lookup.search_query {
            let max_results = Self::lookup_limit(lookup).to_string();
            let response = self
                .client
                .get(self.url("/2/tweets/search/recent"))
                .bearer_auth(&self.config.bearer_token)
                .query(&[
                    ("query", query.as_str()),
                    ("tweet.fields", POST_FIELDS),
                    ("max_results", max_results.as_str()),
                ])
                .send()
                .await
                .map_err(|e| EngineError::PlatformRequest {
                    message: e.to_string(),
                })?;
            let body = Self::into_json(response).await?;
            body["data"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .iter()
                .map(post_view)
                .collect()
        } else {
            let me = self.me_id().await?;
            self.user_timeline(&me, Self::lookup_limit(lookup)).await?
        };

        let count = posts.len();
        Ok(json!({
            "posts": posts,
            "count": count,
            "message": format!("retrieved {count} post(s)"),
        }))
    }

    async fn like(&self, post_id: &str) -> Result<Value, EngineError> {
        let me = self.me_id().await?;
        let response = self
            .client
            .post(self.url(&format!("/2/users/{me}/likes")))
            .bearer_auth(&self.config.bearer_token)
            .json(&json!({ "tweet_id": post_id }))
            .send()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: e.to_string(),
            })?;
        Self::into_json(response).await?;
        Ok(json!({
            "success": true,
            "message": format!("post {post_id} liked successfully"),
        }))
    }

    async fn repost(&self, post_id: &str) -> Result<Value, EngineError> {
        let me = self.me_id().await?;
        let response = self
            .client
            .post(self.url(&format!("/2/users/{me}/retweets")))
            .bearer_auth(&self.config.bearer_token)
            .json(&json!({ "tweet_id": post_id }))
            .send()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: e.to_string(),
            })?;
        Self::into_json(response).await?;
        Ok(json!({
            "success": true,
            "message": format!("post {post_id} reposted successfully"),
        }))
    }

    async fn delete(&self, post_id: &str) -> Result<Value, EngineError> {
        let response = self
            .client
            .delete(self.url(&format!("/2/tweets/{post_id}")))
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(|e| EngineError::PlatformRequest {
                message: e.to_string(),
            })?;
        Self::into_json(response).await?;
        Ok(json!({
            "success": true,
            "message": format!("post {post_id} deleted successfully"),
        }))
    }

    async fn trending(&self) -> Result<Value, EngineError> {
        // Static stub, mirrored from the platform this engine replaces.
        Ok(json!({
            "topics": ["#AI", "#Technology", "#Programming", "#WebDevelopment", "#MachineLearning"],
            "message": "retrieved trending topics",
        }))
    }
}

impl std::fmt::Debug for XApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XApiClient")
            .field("api_base", &self.config.api_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn test_client() -> XApiClient {
        XApiClient::new(SocialConfig {
            bearer_token: "test-token".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
        })
        .unwrap_or_else(|e| panic!("client construction failed: {e}"))
    }

    #[test]
    fn test_empty_token_fails_fast() {
        let result = XApiClient::new(SocialConfig {
            bearer_token: "   ".to_string(),
            api_base: "https://api.x.com".to_string(),
        });
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_post_rejects_empty_text_before_any_call() {
        // api_base points at a closed port; validation must fail first.
        let client = test_client();
        let result = client.post("   ", None).await;
        match result {
            Err(EngineError::PlatformRequest { message }) => {
                assert!(message.contains("cannot be empty"));
            }
            other => panic!("expected PlatformRequest, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_rejects_overlong_text_before_any_call() {
        let client = test_client();
        let long = "x".repeat(MAX_POST_LEN + 1);
        let result = client.post(&long, None).await;
        match result {
            Err(EngineError::PlatformRequest { message }) => {
                assert!(message.contains("280"));
            }
            other => panic!("expected PlatformRequest, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_trending_is_static() {
        let client = test_client();
        let value = client
            .trending()
            .await
            .unwrap_or_else(|e| panic!("trending failed: {e}"));
        let topics = value["topics"].as_array().map_or(0, Vec::len);
        assert_eq!(topics, 5);
    }

    #[test]
    fn test_post_view_defaults() {
        let view = post_view(&json!({ "id": "1", "text": "hi" }));
        assert_eq!(view["author"], "unknown");
        assert_eq!(view["likes"], 0);
    }
}
