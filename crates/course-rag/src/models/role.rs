use serde::{Deserialize, Serialize};

/// Conversation roles. The system prompt travels beside the conversation and
/// tool results travel as content of a user message, so two roles suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}
