//! Chat panel state: an append-only transcript plus the message input.

use tracing::warn;

use crate::config::DEFAULT_FALLBACK_REPLY;
use crate::error::BackendResult;
use crate::input::InputField;
use crate::state::ChatMessage;

/// A message that has been added to the transcript and is awaiting a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug)]
pub struct ChatPanel {
    transcript: Vec<ChatMessage>,
    input: InputField,
    fallback_reply: String,
    sent: u64,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_REPLY)
    }
}

impl ChatPanel {
    pub fn new(fallback_reply: &str) -> Self {
        Self {
            transcript: Vec::new(),
            input: InputField::new(),
            fallback_reply: fallback_reply.to_string(),
            sent: 0,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    /// Appends the user's message and returns what to post, or `None` for blank input.
    pub fn begin_send(&mut self) -> Option<Outgoing> {
        if self.input.is_blank() {
            return None;
        }

        let text = self.input.text().to_string();
        self.transcript.push(ChatMessage::user(text.clone()));
        self.sent += 1;
        Some(Outgoing {
            seq: self.sent,
            text,
        })
    }

    pub fn finish_send(&mut self, outgoing: &Outgoing, outcome: BackendResult<String>) {
        let reply = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, seq = outgoing.seq, "Error getting chatbot response");
                self.fallback_reply.clone()
            }
        };
        self.transcript.push(ChatMessage::bot(reply));
        self.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::state::Sender;
    use reqwest::StatusCode;

    fn not_found() -> BackendError {
        BackendError::Status {
            url: "http://test/chat".to_string(),
            status: StatusCode::NOT_FOUND,
            body: r#"{"detail":"No relevant answer found"}"#.to_string(),
        }
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let mut panel = ChatPanel::default();
        panel.input_mut().set(" \t");
        assert!(panel.begin_send().is_none());
        assert!(panel.transcript().is_empty());
    }

    #[test]
    fn test_user_message_shown_before_reply() {
        let mut panel = ChatPanel::default();
        panel.input_mut().set("Hello");
        let outgoing = panel.begin_send().unwrap();

        assert_eq!(outgoing.text, "Hello");
        assert_eq!(panel.transcript(), &[ChatMessage::user("Hello")]);
        // input stays until the call resolves
        assert_eq!(panel.input().text(), "Hello");
    }

    #[test]
    fn test_reply_appended_once_after_user_message() {
        let mut panel = ChatPanel::default();
        panel.input_mut().set("Hello");
        let outgoing = panel.begin_send().unwrap();
        panel.finish_send(&outgoing, Ok("Hi there".to_string()));

        assert_eq!(
            panel.transcript(),
            &[ChatMessage::user("Hello"), ChatMessage::bot("Hi there")]
        );
        assert_eq!(panel.input().text(), "");
    }

    #[test]
    fn test_failure_uses_fallback_reply() {
        let mut panel = ChatPanel::new("Nothing found.");
        panel.input_mut().set("What?");
        let outgoing = panel.begin_send().unwrap();
        panel.finish_send(&outgoing, Err(not_found()));

        let last = panel.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "Nothing found.");
        assert_eq!(panel.input().text(), "");
    }

    #[test]
    fn test_input_cleared_even_if_edited_while_in_flight() {
        let mut panel = ChatPanel::default();
        panel.input_mut().set("Hello");
        let outgoing = panel.begin_send().unwrap();
        panel.input_mut().insert('!');
        panel.finish_send(&outgoing, Err(not_found()));

        assert_eq!(panel.input().text(), "");
        assert_eq!(panel.input().cursor(), 0);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut panel = ChatPanel::default();
        panel.input_mut().set("one");
        let first = panel.begin_send().unwrap();
        panel.input_mut().set("two");
        let second = panel.begin_send().unwrap();
        assert!(second.seq > first.seq);
    }

    #[test]
    fn test_replies_land_in_arrival_order() {
        let mut panel = ChatPanel::default();
        panel.input_mut().set("one");
        let first = panel.begin_send().unwrap();
        panel.input_mut().set("two");
        let second = panel.begin_send().unwrap();

        panel.finish_send(&second, Ok("reply two".to_string()));
        panel.finish_send(&first, Ok("reply one".to_string()));

        let texts: Vec<_> = panel.transcript().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "reply two", "reply one"]);
    }
}
