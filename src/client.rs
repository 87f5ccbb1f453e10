use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{ChatMessage, HistoryEntry};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to the redaction backend timed out")]
    Timeout,
    #[error("could not reach the redaction backend: {0}")]
    Unreachable(String),
    #[error("redaction backend returned status {0}")]
    BadStatus(u16),
    #[error("could not read the backend response body: {0}")]
    BadBody(String),
    #[error("bad response from the redaction backend: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ChatError {
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::Unreachable(err.to_string())
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    previous: &'a [HistoryEntry],
    message: &'a str,
}

/// The backend's aggregated answer for one turn: the authoritative history,
/// the completion, both redacted texts, and the two raw redaction payloads
/// for the diagnostics panel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub previous: Vec<HistoryEntry>,
    #[serde(rename = "chat_gpt_message")]
    pub message: ChatMessage,
    #[serde(rename = "chat_gpt_redacted")]
    pub assistant_redacted: String,
    pub user_redacted: String,
    #[serde(rename = "raw_redact_user_text")]
    pub raw_user_payload: String,
    #[serde(rename = "raw_redact_gpt_text")]
    pub raw_assistant_payload: String,
}

/// Decode a response body. Any missing field, mistyped field, bad role token,
/// or `previous` entry that is not a `[message, redacted]` pair fails the
/// whole decode.
pub fn decode_response(body: &str) -> Result<ChatResponse, ChatError> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the raw user text plus the last-known history blob and decode the
    /// backend's answer. Redaction happens entirely server-side.
    pub async fn send(
        &self,
        previous: &[HistoryEntry],
        message: &str,
    ) -> Result<ChatResponse, ChatError> {
        let request = ChatRequest { previous, message };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::BadStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| ChatError::BadBody(err.to_string()))?;

        decode_response(&body)
    }
}
