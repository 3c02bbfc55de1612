//! Chat widget: transcript rendering and the send loop.
//!
//! The widget is written against three small seams so the same logic runs in
//! the browser and in native tests:
//!
//! - [`TranscriptView`]: the scrolling message log (`#chatHistory`)
//! - [`InputField`]: the text entry (`#userInput`)
//! - [`QueryTransport`]: one request/response exchange with the server
//!
//! [`ChatWidget`] owns one of each. Browser implementations live in `dom`
//! (feature `csr`); [`MemoryTranscript`] and [`MemoryInput`] are headless
//! implementations.

mod memory;
mod transport;

#[cfg(feature = "csr")]
pub mod dom;

pub use memory::{MemoryInput, MemoryTranscript};
pub use transport::{HttpTransport, TransportError};

use serde::{Deserialize, Serialize};

/// Delimiter splitting a message into sections.
pub const SECTION_DELIMITER: &str = "\n\n";

/// Message shown when a request fails for any reason.
pub const ERROR_MESSAGE: &str = "Sorry, there was an error processing your request.";

/// Key that submits the current input.
pub const SUBMIT_KEY: &str = "Enter";

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user.
    User,
    /// Reply from the server.
    Ai,
}

impl Role {
    /// Lowercase role tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }

    /// CSS classes for the message container, e.g. `message ai-message`.
    #[must_use]
    pub fn container_class(self) -> String {
        format!("message {}-message", self.as_str())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split `text` on [`SECTION_DELIMITER`], dropping empty and whitespace-only
/// sections. Surviving sections keep their whitespace.
#[must_use]
pub fn split_sections(text: &str) -> Vec<&str> {
    text.split(SECTION_DELIMITER)
        .filter(|section| !section.trim().is_empty())
        .collect()
}

/// A message as it is handed to a [`TranscriptView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Author of the message.
    pub role: Role,
    /// Section blocks, in order. May be empty.
    pub sections: Vec<String>,
}

impl RenderedMessage {
    /// Split `text` into sections for `role`.
    #[must_use]
    pub fn new(role: Role, text: &str) -> Self {
        Self {
            role,
            sections: split_sections(text).into_iter().map(str::to_owned).collect(),
        }
    }

    /// Visible text: the sections joined by the delimiter.
    #[must_use]
    pub fn text(&self) -> String {
        self.sections.join(SECTION_DELIMITER)
    }
}

/// Append-only message log.
///
/// Methods take `&self`: like the DOM, a view is a shared handle that is
/// mutated from the UI event loop.
pub trait TranscriptView {
    /// Append one message container.
    fn append(&self, message: &RenderedMessage);

    /// Scroll so the most recent message is visible.
    fn scroll_to_bottom(&self);
}

/// Single-line text entry.
pub trait InputField {
    /// Current raw value.
    fn value(&self) -> String;

    /// Reset the value to the empty string.
    fn clear(&self);
}

/// One request/response exchange with the query endpoint.
///
/// Any response whose body is JSON is `Ok`, whatever its shape or status.
#[async_trait::async_trait(?Send)]
pub trait QueryTransport {
    /// Send `query` and return the decoded JSON body.
    async fn query(&self, query: &str) -> Result<serde_json::Value, TransportError>;
}

/// Result of one [`ChatWidget::send_message`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was blank; nothing happened.
    Skipped,
    /// The server replied and the reply was appended.
    Answered,
    /// The request failed and [`ERROR_MESSAGE`] was appended.
    Failed,
}

/// Text to display for a decoded reply body.
///
/// A string `response` is shown as-is. A missing or `null` `response` is not
/// an error and yields a blank message. Other JSON values are shown in their
/// JSON form.
#[must_use]
pub fn reply_text(body: &serde_json::Value) -> String {
    match body.get("response") {
        Some(serde_json::Value::String(text)) => text.clone(),
        None | Some(serde_json::Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// The chat widget.
#[derive(Debug)]
pub struct ChatWidget<V, I, T> {
    transcript: V,
    input: I,
    transport: T,
}

impl<V, I, T> ChatWidget<V, I, T>
where
    V: TranscriptView,
    I: InputField,
    T: QueryTransport,
{
    /// Assemble a widget from its view, input, and transport.
    pub fn new(transcript: V, input: I, transport: T) -> Self {
        Self {
            transcript,
            input,
            transport,
        }
    }

    /// The transcript view.
    pub fn transcript(&self) -> &V {
        &self.transcript
    }

    /// The input field.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// The query transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Render `text` as one message for `role`, then scroll to the bottom.
    pub fn append_message(&self, role: Role, text: &str) {
        let message = RenderedMessage::new(role, text);
        tracing::trace!(
            role = %role,
            sections = message.sections.len(),
            "Appending message"
        );
        self.transcript.append(&message);
        self.transcript.scroll_to_bottom();
    }

    /// Send the current input to the server and append the exchange.
    ///
    /// Nothing is sent for blank input. All failures end in
    /// [`ERROR_MESSAGE`]; no error escapes this call.
    pub async fn send_message(&self) -> SendOutcome {
        let raw = self.input.value();
        let query = raw.trim();
        if query.is_empty() {
            return SendOutcome::Skipped;
        }

        self.append_message(Role::User, query);
        self.input.clear();

        match self.transport.query(query).await {
            Ok(body) => {
                self.append_message(Role::Ai, &reply_text(&body));
                SendOutcome::Answered
            }
            Err(e) => {
                tracing::error!(error = %e, "Query request failed");
                self.append_message(Role::Ai, ERROR_MESSAGE);
                SendOutcome::Failed
            }
        }
    }

    /// Key-press binding: [`SUBMIT_KEY`] sends, every other key is ignored.
    pub async fn handle_key(&self, key: &str) -> Option<SendOutcome> {
        if key == SUBMIT_KEY {
            Some(self.send_message().await)
        } else {
            None
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Transport that replays scripted results and records what the
    /// transcript looked like when each request went out.
    struct ScriptedTransport {
        transcript: MemoryTranscript,
        replies: RefCell<VecDeque<Result<serde_json::Value, TransportError>>>,
        sent: RefCell<Vec<(String, usize)>>,
    }

    impl ScriptedTransport {
        fn new(
            transcript: &MemoryTranscript,
            replies: Vec<Result<serde_json::Value, TransportError>>,
        ) -> Self {
            Self {
                transcript: transcript.clone(),
                replies: RefCell::new(replies.into()),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl QueryTransport for ScriptedTransport {
        async fn query(&self, query: &str) -> Result<serde_json::Value, TransportError> {
            self.sent
                .borrow_mut()
                .push((query.to_string(), self.transcript.len()));
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(malformed_body()))
        }
    }

    fn malformed_body() -> TransportError {
        TransportError::Json(
            serde_json::from_str::<serde_json::Value>("<html>502 Bad Gateway</html>")
                .expect_err("html is not json"),
        )
    }

    fn widget(
        replies: Vec<Result<serde_json::Value, TransportError>>,
    ) -> ChatWidget<MemoryTranscript, MemoryInput, ScriptedTransport> {
        let transcript = MemoryTranscript::new();
        let transport = ScriptedTransport::new(&transcript, replies);
        ChatWidget::new(transcript, MemoryInput::new(), transport)
    }

    #[test]
    fn test_split_sections_drops_blank_parts() {
        assert_eq!(split_sections("A\n\nB"), vec!["A", "B"]);
        assert_eq!(split_sections("A\n\n   \n\nB"), vec!["A", "B"]);
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n\n\n").is_empty());
    }

    #[test]
    fn test_split_sections_preserves_whitespace() {
        assert_eq!(
            split_sections("  indented\n  block\n\nnext "),
            vec!["  indented\n  block", "next "]
        );
    }

    #[test]
    fn test_append_splits_into_one_container() {
        let w = widget(vec![]);
        w.append_message(Role::User, "A\n\nB");

        let messages = w.transcript().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].sections, vec!["A", "B"]);
    }

    #[test]
    fn test_append_empty_text_yields_empty_container() {
        let w = widget(vec![]);
        w.append_message(Role::Ai, "");

        let messages = w.transcript().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Ai);
        assert!(messages[0].sections.is_empty());
    }

    #[test]
    fn test_append_scrolls_to_bottom() {
        let w = widget(vec![]);
        for text in ["first", "second\n\nthird", "", "SQL Query:\n\nSELECT 1;"] {
            w.append_message(Role::Ai, text);
            assert!(w.transcript().is_scrolled_to_bottom());
        }
        assert!(w.transcript().scroll_height() > 0);
    }

    #[tokio::test]
    async fn test_blank_input_sends_nothing() {
        for blank in ["", "   ", "\t\n"] {
            let w = widget(vec![Ok(serde_json::json!({"response": "x"}))]);
            w.input().set(blank);

            assert_eq!(w.send_message().await, SendOutcome::Skipped);
            assert!(w.transcript().is_empty());
            assert!(w.transport().sent.borrow().is_empty());
        }
    }

    #[tokio::test]
    async fn test_user_message_appended_before_request() {
        let w = widget(vec![Ok(serde_json::json!({"response": "42"}))]);
        w.input().set("  what is six times seven?  ");

        assert_eq!(w.send_message().await, SendOutcome::Answered);

        let sent = w.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "what is six times seven?");
        // Exactly the user message was on screen when the request went out.
        assert_eq!(sent[0].1, 1);

        let messages = w.transcript().messages();
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text(), "what is six times seven?");
        assert_eq!(w.input().value(), "");
    }

    #[tokio::test]
    async fn test_reply_appended_as_ai_message() {
        let w = widget(vec![Ok(serde_json::json!({"response": "42"}))]);
        w.input().set("question");
        w.send_message().await;

        let last = w.transcript().last().expect("reply appended");
        assert_eq!(last.role, Role::Ai);
        assert_eq!(last.text(), "42");
    }

    #[tokio::test]
    async fn test_failure_appends_error_message() {
        let w = widget(vec![Err(malformed_body())]);
        w.input().set("question");

        assert_eq!(w.send_message().await, SendOutcome::Failed);

        let messages = w.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Ai);
        assert_eq!(messages[1].text(), ERROR_MESSAGE);
        assert!(w.transcript().is_scrolled_to_bottom());
    }

    #[tokio::test]
    async fn test_reply_without_response_field_is_blank() {
        let w = widget(vec![Ok(serde_json::json!({"error": "No query provided"}))]);
        w.input().set("question");

        assert_eq!(w.send_message().await, SendOutcome::Answered);
        let last = w.transcript().last().expect("reply appended");
        assert_eq!(last.role, Role::Ai);
        assert!(last.sections.is_empty());
    }

    #[tokio::test]
    async fn test_enter_key_sends_other_keys_ignored() {
        let w = widget(vec![Ok(serde_json::json!({"response": "ok"}))]);
        w.input().set("hello");

        assert_eq!(w.handle_key("a").await, None);
        assert_eq!(w.handle_key("Shift").await, None);
        assert!(w.transcript().is_empty());

        assert_eq!(w.handle_key("Enter").await, Some(SendOutcome::Answered));
        assert_eq!(w.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_multi_section_reply() {
        let body = serde_json::json!({
            "response": "SQL Query:\n\nSELECT name \nFROM t;\n\nResult:\n{\"name\":\"a\"}"
        });
        let w = widget(vec![Ok(body)]);
        w.input().set("names?");
        w.send_message().await;

        let last = w.transcript().last().expect("reply appended");
        assert_eq!(
            last.sections,
            vec![
                "SQL Query:",
                "SELECT name \nFROM t;",
                "Result:\n{\"name\":\"a\"}"
            ]
        );
    }

    #[test]
    fn test_reply_text_shapes() {
        assert_eq!(reply_text(&serde_json::json!({"response": "hi"})), "hi");
        assert_eq!(reply_text(&serde_json::json!({"response": null})), "");
        assert_eq!(reply_text(&serde_json::json!({})), "");
        assert_eq!(reply_text(&serde_json::json!({"response": 42})), "42");
        assert_eq!(reply_text(&serde_json::json!([1, 2])), "");
    }

    #[test]
    fn test_role_classes() {
        assert_eq!(Role::User.container_class(), "message user-message");
        assert_eq!(Role::Ai.container_class(), "message ai-message");
        assert_eq!(
            serde_json::to_string(&Role::Ai).expect("serialize role"),
            "\"ai\""
        );
    }
}
