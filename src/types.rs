//! Shared data types: conversation turns, retrieval matches, and the
//! outcome envelopes returned by the engine's public entry points.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Role of a conversation-history participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The end user asking questions.
    User,
    /// The assistant's prior answers.
    Assistant,
}

impl TurnRole {
    /// Label used when rendering a transcript line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of caller-supplied conversation history.
///
/// History is read-only input to the prompt builder; insertion order is
/// chronological and semantically meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who spoke.
    pub role: TurnRole,
    /// What was said.
    pub content: String,
}

impl ChatTurn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// One ranked result of a similarity query against the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMatch {
    /// Similarity score; matches are ordered descending by this value.
    pub score: f32,
    /// Chunk metadata as stored at ingestion time (includes `text`).
    pub metadata: serde_json::Value,
}

impl RetrievalMatch {
    /// The chunk text carried in metadata, or the empty string when the
    /// `text` field is missing (missing text is not an error).
    #[must_use]
    pub fn text(&self) -> &str {
        self.metadata
            .get("text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }
}

/// Terminal artifact of one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Whether the query completed.
    pub success: bool,
    /// Final answer text (empty on failure).
    pub answer: String,
    /// Retrieval matches that formed the context, ranked descending.
    pub matches: Vec<RetrievalMatch>,
    /// Error kind and cause when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryOutcome {
    /// Successful outcome with the given answer and context matches.
    #[must_use]
    pub const fn answered(answer: String, matches: Vec<RetrievalMatch>) -> Self {
        Self {
            success: true,
            answer,
            matches,
            error: None,
        }
    }

    /// Failed outcome carrying the error kind plus the raw cause string.
    #[must_use]
    pub fn failed(err: &EngineError) -> Self {
        Self {
            success: false,
            answer: String::new(),
            matches: Vec::new(),
            error: Some(format!("{}: {err}", err.kind())),
        }
    }
}

/// Terminal artifact of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Whether the document was fully ingested.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// Error kind and cause when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestOutcome {
    /// Successful outcome with the given status message.
    #[must_use]
    pub const fn stored(message: String) -> Self {
        Self {
            success: true,
            message,
            error: None,
        }
    }

    /// Failed outcome carrying the error kind plus the raw cause string.
    #[must_use]
    pub fn failed(err: &EngineError) -> Self {
        Self {
            success: false,
            message: "error ingesting document".to_string(),
            error: Some(format!("{}: {err}", err.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_serialization() {
        let json = serde_json::to_string(&TurnRole::User).unwrap_or_default();
        assert_eq!(json, "\"user\"");
        let json = serde_json::to_string(&TurnRole::Assistant).unwrap_or_default();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_match_text_missing_field() {
        let m = RetrievalMatch {
            score: 0.5,
            metadata: serde_json::json!({"source": "doc.txt"}),
        };
        assert_eq!(m.text(), "");
    }

    #[test]
    fn test_match_text_present() {
        let m = RetrievalMatch {
            score: 0.5,
            metadata: serde_json::json!({"text": "hello"}),
        };
        assert_eq!(m.text(), "hello");
    }

    #[test]
    fn test_failed_outcome_carries_kind_and_cause() {
        let err = EngineError::ToolNotFound {
            name: "weather".to_string(),
        };
        let outcome = QueryOutcome::failed(&err);
        assert!(!outcome.success);
        assert!(outcome.answer.is_empty());
        let error = outcome.error.unwrap_or_default();
        assert!(error.contains("ToolNotFound"));
        assert!(error.contains("weather"));
    }

    #[test]
    fn test_error_omitted_on_success() {
        let outcome = QueryOutcome::answered("42".to_string(), Vec::new());
        let json = serde_json::to_string(&outcome).unwrap_or_default();
        assert!(!json.contains("error"));
        assert!(json.contains("\"success\":true"));
    }
}
