//! System prompt and user-prompt builder for the query stage.
//!
//! The system prompt fixes the behavior contract, including the strict
//! output-format rule for structured content: tabular answers must be the
//! JSON `table_response` envelope, never markdown tables. The rule is
//! enforced by prompting only; the engine does not re-validate model
//! output against it.

use std::fmt::Write;

use crate::types::ChatTurn;

/// System prompt for the query stage.
pub const SYSTEM_PROMPT: &str = r#"You are a helpful assistant for a tenant's document corpus. You have access to the tenant's documentation and can provide accurate, detailed answers based on this information.

When answering questions:
1. Use the provided documentation context to give accurate answers
2. If the context doesn't contain enough information, say so clearly
3. Provide step-by-step instructions when appropriate
4. Include relevant details about features, processes, and workflows
5. Be helpful and professional in tone
6. If you need to reference specific documents, mention them by name
7. Structure your responses with clear headings, bullet points, and numbered lists
8. Use tables when presenting structured data, comparisons, or step-by-step procedures
9. Always base your responses on the provided documentation context

CRITICAL: When presenting ANY structured data, comparisons, or tables, you MUST return ONLY JSON format. NEVER use markdown tables.

JSON TABLE FORMAT (REQUIRED):
{
  "type": "table_response",
  "title": "Table Title",
  "description": "Description of the table content",
  "table": {
    "headers": ["Column 1", "Column 2", "Column 3"],
    "rows": [
      ["Data 1", "Data 2", "Data 3"],
      ["Data 4", "Data 5", "Data 6"]
    ]
  },
  "additional_info": "Any additional information or notes"
}

FORBIDDEN: Never use markdown table format like | Column | Data | or box-drawing characters.

ALLOWED: Only use JSON format for tables and normal text for regular responses."#;

/// Builds the user message from retrieved context, the question, and
/// conversation history.
///
/// When `history` is empty, no history section is emitted at all. When
/// non-empty, prior turns render chronologically as `role: content` lines
/// between the context and the closing instruction.
///
/// Pure function: identical inputs always yield identical output.
#[must_use]
pub fn build_user_prompt(context: &str, question: &str, history: &[ChatTurn]) -> String {
    let mut history_text = String::new();
    if !history.is_empty() {
        history_text.push_str("\n\nPREVIOUS CONVERSATION HISTORY:\n");
        for turn in history {
            let _ = writeln!(history_text, "{}: {}", turn.role.label(), turn.content);
        }
    }

    format!(
        "Based on the following documentation context and conversation history, \
         please answer this question: {question}\n\n\
         DOCUMENTATION CONTEXT:\n{context}{history_text}\n\n\
         Please provide a comprehensive answer based on the documentation above and \
         the conversation history or the given tool you are using. If the context \
         doesn't contain enough information to fully answer the question, please \
         state what additional information would be needed.\n\n\
         CRITICAL: If your response includes ANY tables, comparisons, or structured \
         data, you MUST return ONLY JSON format. NEVER use markdown tables."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_emits_no_history_section() {
        let prompt = build_user_prompt("ctx", "what is X?", &[]);
        assert!(!prompt.contains("PREVIOUS CONVERSATION HISTORY"));
        assert!(prompt.contains("what is X?"));
        assert!(prompt.contains("DOCUMENTATION CONTEXT:\nctx"));
    }

    #[test]
    fn test_history_renders_chronologically_before_closing_instruction() {
        let history = vec![
            ChatTurn::user("first question"),
            ChatTurn::assistant("first answer"),
            ChatTurn::user("second question"),
        ];
        let prompt = build_user_prompt("ctx", "third question", &history);

        let header = prompt
            .find("PREVIOUS CONVERSATION HISTORY")
            .unwrap_or(usize::MAX);
        let first = prompt.find("user: first question").unwrap_or(usize::MAX);
        let second = prompt.find("assistant: first answer").unwrap_or(usize::MAX);
        let third = prompt.find("user: second question").unwrap_or(usize::MAX);
        let closing = prompt
            .find("Please provide a comprehensive answer")
            .unwrap_or(0);

        assert!(header < first);
        assert!(first < second);
        assert!(second < third);
        assert!(third < closing);
    }

    #[test]
    fn test_builder_is_deterministic() {
        let history = vec![ChatTurn::user("q")];
        let a = build_user_prompt("ctx", "question", &history);
        let b = build_user_prompt("ctx", "question", &history);
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_prompt_fixes_table_contract() {
        assert!(SYSTEM_PROMPT.contains("table_response"));
        assert!(SYSTEM_PROMPT.contains("NEVER use markdown tables"));
        assert!(SYSTEM_PROMPT.contains("headers"));
    }
}
