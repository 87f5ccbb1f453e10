use tokio::task::JoinHandle;

use crate::client::{ChatClient, ChatError, ChatResponse};
use crate::conversation::Conversation;
use crate::message::{HistoryEntry, Redaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Conversation state
    pub conversation: Conversation,
    pub loading: bool,
    pub chat_task: Option<JoinHandle<Result<ChatResponse, ChatError>>>,

    // Request failures, most recent first
    pub errors: Vec<String>,

    // Raw redaction payloads from the last successful turn
    pub user_payload: String,
    pub assistant_payload: String,
    pub show_payload_panel: bool,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: ChatClient,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            input: String::new(),
            cursor: 0,

            conversation: Conversation::new(),
            loading: false,
            chat_task: None,

            errors: Vec::new(),

            user_payload: String::new(),
            assistant_payload: String::new(),
            show_payload_panel: false,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            client,
        }
    }

    /// Submit the current input buffer. Ignored while a request is already in
    /// flight; the input is sent exactly as typed, even when empty.
    pub fn submit(&mut self) {
        let Some((previous, message)) = self.begin_submit() else {
            return;
        };

        let client = self.client.clone();
        self.chat_task = Some(tokio::spawn(async move {
            client.send(&previous, &message).await
        }));
    }

    /// The state half of submission: append the optimistic pending turn,
    /// clear the input and payload displays, and hand back what the request
    /// needs. Returns None while a request is in flight.
    fn begin_submit(&mut self) -> Option<(Vec<HistoryEntry>, String)> {
        if self.loading {
            return None;
        }

        let message = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.conversation.push_pending_user(message.clone());
        self.user_payload.clear();
        self.assistant_payload.clear();
        self.loading = true;
        self.scroll_chat_to_bottom();

        Some((self.conversation.previous().to_vec(), message))
    }

    /// Check the in-flight request without blocking and apply its outcome.
    /// Called from the event loop between events.
    pub async fn poll_chat_task(&mut self) {
        let finished = self
            .chat_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.chat_task.take() else {
            return;
        };

        match task.await {
            Ok(Ok(response)) => self.apply_response(response),
            Ok(Err(err)) => self.record_failure(err.to_string()),
            Err(err) => self.record_failure(format!("request task failed: {err}")),
        }
    }

    /// Merge a successful response: resolve the pending user turn, append the
    /// already-resolved assistant turn, and adopt the backend's history blob.
    fn apply_response(&mut self, response: ChatResponse) {
        self.conversation.resolve_last(response.user_redacted);
        self.conversation
            .push_assistant(response.message, response.assistant_redacted);
        self.conversation.replace_previous(response.previous);
        self.user_payload = response.raw_user_payload;
        self.assistant_payload = response.raw_assistant_payload;
        self.loading = false;
        self.scroll_chat_to_bottom();
    }

    /// A failed request leaves the pending turn pending and the store
    /// untouched; the failure only lands on the error list.
    fn record_failure(&mut self, detail: String) {
        self.errors.insert(0, format!("request failed: {detail}"));
        self.loading = false;
    }

    pub fn dismiss_errors(&mut self) {
        self.errors.clear();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Scroll the chat so the latest turn (or the in-flight indicator) is
    /// visible. Best effort: before the first render the area dimensions are
    /// unknown and defaults are used instead.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    /// Estimate of the rendered chat height, mirroring the wrapping the chat
    /// pane applies.
    fn chat_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for turn in self.conversation.turns() {
            total_lines += 1; // Role label line
            for line in turn.message.content.lines() {
                total_lines += wrapped_lines(line, wrap_width);
            }
            match &turn.redaction {
                Redaction::Pending => total_lines += 1,
                Redaction::Resolved(text) => {
                    total_lines += wrapped_lines(&format!("redacted: {text}"), wrap_width);
                }
            }
            total_lines += 1; // Blank line after turn
        }

        if self.loading {
            total_lines += 2; // Reply label + progress line
        }

        total_lines
    }
}

fn wrapped_lines(line: &str, wrap_width: usize) -> u16 {
    // Character count, not byte length, for proper UTF-8 handling
    let char_count = line.chars().count();
    if char_count == 0 {
        1
    } else {
        ((char_count / wrap_width) + 1) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ChatMessage, HistoryEntry, Role};

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:8000/chat"))
    }

    fn response(user_redacted: &str, reply: &str, reply_redacted: &str) -> ChatResponse {
        ChatResponse {
            previous: vec![
                HistoryEntry(
                    ChatMessage {
                        role: Role::User,
                        content: user_redacted.to_string(),
                    },
                    user_redacted.to_string(),
                ),
                HistoryEntry(
                    ChatMessage {
                        role: Role::Assistant,
                        content: reply.to_string(),
                    },
                    reply_redacted.to_string(),
                ),
            ],
            message: ChatMessage {
                role: Role::Assistant,
                content: reply.to_string(),
            },
            assistant_redacted: reply_redacted.to_string(),
            user_redacted: user_redacted.to_string(),
            raw_user_payload: "{\"user\": true}".to_string(),
            raw_assistant_payload: "{\"assistant\": true}".to_string(),
        }
    }

    #[test]
    fn test_submit_appends_pending_turn_and_clears_input() {
        let mut app = app();
        app.input = "hello".to_string();
        app.cursor = 5;
        app.user_payload = "stale".to_string();
        app.assistant_payload = "stale".to_string();

        let (previous, message) = app.begin_submit().unwrap();

        assert_eq!(message, "hello");
        assert!(previous.is_empty());
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.loading);
        assert!(app.user_payload.is_empty());
        assert!(app.assistant_payload.is_empty());
        assert_eq!(app.conversation.turns().len(), 1);
        assert_eq!(app.conversation.turns()[0].redaction, Redaction::Pending);
    }

    #[test]
    fn test_second_submit_while_loading_is_rejected() {
        let mut app = app();
        app.input = "first".to_string();
        assert!(app.begin_submit().is_some());

        app.input = "second".to_string();
        assert!(app.begin_submit().is_none());

        // The second attempt appended nothing and kept its input
        assert_eq!(app.conversation.turns().len(), 1);
        assert_eq!(app.input, "second");
    }

    #[test]
    fn test_success_resolves_pending_and_appends_reply() {
        let mut app = app();
        app.input = "hello".to_string();
        app.begin_submit().unwrap();

        app.apply_response(response("hello", "hi", "hi"));

        assert!(!app.loading);
        let turns = app.conversation.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].message.content, "hello");
        assert_eq!(turns[0].redaction, Redaction::Resolved("hello".to_string()));
        assert_eq!(turns[1].message.role, Role::Assistant);
        assert_eq!(turns[1].message.content, "hi");
        assert_eq!(turns[1].redaction, Redaction::Resolved("hi".to_string()));
        assert_eq!(app.conversation.previous().len(), 2);
        assert_eq!(app.user_payload, "{\"user\": true}");
        assert_eq!(app.assistant_payload, "{\"assistant\": true}");
    }

    #[test]
    fn test_redaction_resolves_annotation_not_content() {
        let mut app = app();
        app.input = "My SSN is 457-55-5462".to_string();
        app.begin_submit().unwrap();

        app.apply_response(response("My SSN is <US_SSN>", "noted", "noted"));

        let user_turn = &app.conversation.turns()[0];
        assert_eq!(user_turn.message.content, "My SSN is 457-55-5462");
        assert_eq!(
            user_turn.redaction,
            Redaction::Resolved("My SSN is <US_SSN>".to_string())
        );
    }

    #[test]
    fn test_failure_keeps_turn_pending_and_records_one_error() {
        let mut app = app();
        app.input = "hello".to_string();
        app.begin_submit().unwrap();

        app.record_failure(ChatError::BadStatus(500).to_string());

        assert!(!app.loading);
        assert_eq!(app.errors.len(), 1);
        assert!(app.errors[0].contains("500"));
        assert_eq!(app.conversation.turns().len(), 1);
        assert_eq!(app.conversation.turns()[0].redaction, Redaction::Pending);
        assert!(app.conversation.previous().is_empty());
    }

    #[test]
    fn test_errors_accumulate_most_recent_first() {
        let mut app = app();
        app.record_failure("older".to_string());
        app.record_failure("newer".to_string());
        assert!(app.errors[0].contains("newer"));
        assert!(app.errors[1].contains("older"));
    }

    #[test]
    fn test_scroll_to_bottom_tracks_history_growth() {
        let mut app = app();
        app.chat_height = 10;
        app.chat_width = 40;

        for i in 0..10 {
            app.input = format!("message number {i}");
            app.begin_submit().unwrap();
            app.apply_response(response("redacted", "a reply", "a reply"));
        }

        app.scroll_chat_to_bottom();
        // 10 exchanges at 4 lines per turn do not fit in 10 rows, so the
        // view must be scrolled down.
        assert!(app.chat_scroll > 0);
        assert_eq!(app.chat_scroll, app.chat_line_count() - 10);
    }

    #[test]
    fn test_scroll_to_bottom_before_first_render_is_harmless() {
        let mut app = app();
        app.input = "hello".to_string();
        app.begin_submit().unwrap();
        assert_eq!(app.chat_scroll, 0);
    }
}
