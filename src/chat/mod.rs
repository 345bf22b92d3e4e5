use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";
const SYSTEM_PROMPT: &str = "You are a helpful assistant for compressor research data analysis.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
    #[error("stream error: {0}")]
    Stream(String),
}

// ---------------------------------------------------------------------------
// Conversation history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// Ordered conversation turns, seeded with one system turn.  Owned by the
/// session; the worker thread only ever receives a snapshot, so a failed
/// or cancelled request cannot corrupt it.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl Default for ChatHistory {
    fn default() -> Self {
        ChatHistory {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
        }
    }
}

impl ChatHistory {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Turns shown in the transcript (the system prompt stays hidden).
    pub fn visible(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != "system")
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Roll back the turn that triggered a failed request so a retry does
    /// not duplicate it.  Only a trailing user turn is removed.
    pub fn rollback_user_turn(&mut self) {
        if self.messages.last().map(|m| m.role.as_str()) == Some("user") {
            self.messages.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format (OpenAI-style chat completions, SSE streaming)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Streaming client
// ---------------------------------------------------------------------------

/// Events crossing from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// One streamed content delta.
    Delta(String),
    /// End of stream; the assistant turn is complete.
    Done,
    /// The stream was cancelled; partial content already delivered stands.
    Cancelled,
    /// Transport or API failure (the caller rolls back the user turn).
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ChatConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ChatConfig {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Read the key from the environment, if present.
    pub fn from_env() -> Option<Self> {
        std::env::var("DEEPSEEK_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Self::new)
    }
}

/// Blocking streaming client for an OpenAI-style chat completion endpoint.
/// Runs on a worker thread; the UI polls the channel each frame.
#[derive(Debug)]
pub struct ChatClient {
    config: ChatConfig,
    http: reqwest::blocking::Client,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::MissingApiKey);
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(ChatClient { config, http })
    }

    /// Send the conversation and stream deltas into `events` until the
    /// server signals `[DONE]`, an error occurs, or `cancel` is raised.
    /// Blocking; call from a spawned thread.
    pub fn stream_completion(
        &self,
        messages: &[ChatMessage],
        events: &Sender<ChatEvent>,
        cancel: &AtomicBool,
    ) {
        let result = self.run_stream(messages, events, cancel);
        let terminal = match result {
            Ok(true) => ChatEvent::Done,
            Ok(false) => ChatEvent::Cancelled,
            Err(e) => ChatEvent::Error(e.to_string()),
        };
        // The UI side may have gone away; nothing to do then.
        let _ = events.send(terminal);
    }

    /// Returns Ok(true) on a completed stream, Ok(false) when cancelled.
    fn run_stream(
        &self,
        messages: &[ChatMessage],
        events: &Sender<ChatEvent>,
        cancel: &AtomicBool,
    ) -> Result<bool, ChatError> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages,
            stream: true,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ChatError::Api(format!("{status}: {body}")));
        }

        let reader = BufReader::new(response);
        for line in reader.lines() {
            if cancel.load(Ordering::Relaxed) {
                return Ok(false);
            }
            let line = line.map_err(|e| ChatError::Stream(e.to_string()))?;
            match parse_sse_line(&line) {
                SseLine::Delta(text) => {
                    if events.send(ChatEvent::Delta(text)).is_err() {
                        // Receiver dropped; treat like cancellation.
                        return Ok(false);
                    }
                }
                SseLine::Done => return Ok(true),
                SseLine::Skip => {}
            }
        }
        // Stream ended without the terminator; accept what we got.
        Ok(true)
    }
}

enum SseLine {
    Delta(String),
    Done,
    Skip,
}

/// Parse one server-sent-events line: `data: {json}` or `data: [DONE]`.
/// Blank lines and other fields are skipped.
fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:").map(str::trim) else {
        return SseLine::Skip;
    };
    if payload == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => {
            let text: String = chunk
                .choices
                .into_iter()
                .filter_map(|c| c.delta.content)
                .collect();
            if text.is_empty() {
                SseLine::Skip
            } else {
                SseLine::Delta(text)
            }
        }
        Err(_) => SseLine::Skip,
    }
}

// ---------------------------------------------------------------------------
// Worker-thread handle used by the UI
// ---------------------------------------------------------------------------

/// An in-flight streamed response.  Dropping the handle does not abort the
/// request; raise `cancel` for that.
pub struct StreamingReply {
    pub events: Receiver<ChatEvent>,
    pub cancel: Arc<AtomicBool>,
    /// Partial assistant content accumulated so far.
    pub partial: String,
}

/// Spawn a worker thread streaming one completion for `history`.
pub fn spawn_completion(config: ChatConfig, history: &ChatHistory) -> Result<StreamingReply, ChatError> {
    let client = ChatClient::new(config)?;
    let messages: Vec<ChatMessage> = history.messages().to_vec();
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = std::sync::mpsc::channel();

    let cancel_flag = Arc::clone(&cancel);
    std::thread::spawn(move || {
        client.stream_completion(&messages, &tx, &cancel_flag);
    });

    Ok(StreamingReply {
        events: rx,
        cancel,
        partial: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_starts_with_hidden_system_turn() {
        let history = ChatHistory::default();
        assert_eq!(history.messages().len(), 1);
        assert_eq!(history.visible().count(), 0);
    }

    #[test]
    fn rollback_removes_exactly_the_trailing_user_turn() {
        let mut history = ChatHistory::default();
        history.push_user("question");
        history.rollback_user_turn();
        assert_eq!(history.visible().count(), 0);

        // A completed exchange is never rolled back.
        history.push_user("question");
        history.push_assistant("answer");
        history.rollback_user_turn();
        assert_eq!(history.visible().count(), 2);
    }

    #[test]
    fn cancelled_partial_content_is_kept_once() {
        let mut history = ChatHistory::default();
        history.push_user("question");
        history.push_assistant("partial ans");
        // Retry after cancellation starts a fresh user turn; the partial
        // assistant turn stays verbatim and is not duplicated.
        history.push_user("follow-up");
        let contents: Vec<&str> = history.visible().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["question", "partial ans", "follow-up"]);
    }

    #[test]
    fn sse_lines_parse_deltas_and_done() {
        let json = r#"data: {"choices":[{"delta":{"content":"hi"}}]}"#;
        assert!(matches!(parse_sse_line(json), SseLine::Delta(ref s) if s == "hi"));
        assert!(matches!(parse_sse_line("data: [DONE]"), SseLine::Done));
        assert!(matches!(parse_sse_line(""), SseLine::Skip));
        assert!(matches!(parse_sse_line(": keep-alive"), SseLine::Skip));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = ChatClient::new(ChatConfig::new("  ")).unwrap_err();
        assert!(matches!(err, ChatError::MissingApiKey));
    }
}
