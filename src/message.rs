use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A turn's redaction annotation. Starts Pending when the turn is created
/// optimistically at submit time and resolves exactly once when the backend
/// answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redaction {
    Pending,
    Resolved(String),
}

/// One rendered unit of the chat list: a message plus its redaction
/// annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub message: ChatMessage,
    pub redaction: Redaction,
}

/// Server-authoritative history record: an already-resolved message paired
/// with its final redacted text. Serializes as the 2-element JSON array the
/// backend round-trips; never pending by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry(pub ChatMessage, pub String);
