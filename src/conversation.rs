use crate::message::{ChatMessage, ConversationTurn, HistoryEntry, Redaction, Role};

/// The ordered chat history plus the server-owned `previous` blob.
///
/// Turns are append-only from the UI's point of view; the only mutation of an
/// existing turn is resolving the most recent redaction annotation. The
/// `previous` blob is held verbatim for the next request and replaced
/// wholesale whenever the backend answers.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    previous: Vec<HistoryEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Server-owned history, replayed unmodified on the next request. Nothing
    /// in the client reads its contents.
    pub fn previous(&self) -> &[HistoryEntry] {
        &self.previous
    }

    pub fn push_pending_user(&mut self, content: String) {
        self.turns.push(ConversationTurn {
            message: ChatMessage {
                role: Role::User,
                content,
            },
            redaction: Redaction::Pending,
        });
    }

    /// Resolve the most recently appended turn, whatever its role. With a
    /// single request in flight that is always the turn left pending. On an
    /// empty list this does nothing rather than erroring, so an out-of-order
    /// response cannot corrupt the history.
    pub fn resolve_last(&mut self, redacted: String) {
        if let Some(turn) = self.turns.last_mut() {
            turn.redaction = Redaction::Resolved(redacted);
        }
    }

    pub fn push_assistant(&mut self, message: ChatMessage, redacted: String) {
        self.turns.push(ConversationTurn {
            message,
            redaction: Redaction::Resolved(redacted),
        });
    }

    pub fn replace_previous(&mut self, entries: Vec<HistoryEntry>) {
        self.previous = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_user_is_single_and_last() {
        let mut conversation = Conversation::new();
        conversation.push_pending_user("hello".to_string());

        let pending: Vec<usize> = conversation
            .turns()
            .iter()
            .enumerate()
            .filter(|(_, turn)| turn.redaction == Redaction::Pending)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(pending, vec![0]);
        assert_eq!(conversation.turns().len(), 1);
        assert_eq!(conversation.turns()[0].message.role, Role::User);
        assert_eq!(conversation.turns()[0].message.content, "hello");
    }

    #[test]
    fn test_resolve_last_on_empty_is_noop() {
        let mut conversation = Conversation::new();
        conversation.resolve_last("whatever".to_string());
        assert!(conversation.turns().is_empty());
    }

    #[test]
    fn test_resolve_last_targets_the_tail() {
        let mut conversation = Conversation::new();
        conversation.push_pending_user("first".to_string());
        conversation.resolve_last("first".to_string());
        conversation.push_assistant(
            ChatMessage {
                role: Role::Assistant,
                content: "reply".to_string(),
            },
            "reply".to_string(),
        );
        conversation.push_pending_user("My SSN is 457-55-5462".to_string());

        conversation.resolve_last("My SSN is <US_SSN>".to_string());

        assert!(conversation
            .turns()
            .iter()
            .all(|turn| turn.redaction != Redaction::Pending));
        let last = conversation.turns().last().unwrap();
        assert_eq!(last.message.content, "My SSN is 457-55-5462");
        assert_eq!(
            last.redaction,
            Redaction::Resolved("My SSN is <US_SSN>".to_string())
        );
        // Earlier turns are untouched.
        assert_eq!(
            conversation.turns()[0].redaction,
            Redaction::Resolved("first".to_string())
        );
    }

    #[test]
    fn test_replace_previous_is_wholesale() {
        let mut conversation = Conversation::new();
        conversation.replace_previous(vec![HistoryEntry(
            ChatMessage {
                role: Role::User,
                content: "old".to_string(),
            },
            "old".to_string(),
        )]);

        let fresh = vec![
            HistoryEntry(
                ChatMessage {
                    role: Role::User,
                    content: "a".to_string(),
                },
                "a".to_string(),
            ),
            HistoryEntry(
                ChatMessage {
                    role: Role::Assistant,
                    content: "b".to_string(),
                },
                "b".to_string(),
            ),
        ];
        conversation.replace_previous(fresh.clone());
        assert_eq!(conversation.previous(), fresh.as_slice());
    }
}
