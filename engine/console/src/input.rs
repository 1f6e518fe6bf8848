//! Console Input Parsing
//!
//! Each stdin line is one inbound event:
//!
//! ```text
//! text  <chat> <user> <message...>    plain text message
//! press <chat> <user> <token>         button press
//! { "type": "callback", ... }         raw InboundEvent as JSON
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use chatscreen_core::{
    CallbackEvent, CallbackId, ChatId, InboundEvent, MessageId, Sender, TextMessageEvent,
};
use thiserror::Error;

/// A line that could not be turned into an event
#[derive(Debug, Error)]
pub enum InputError {
    /// The first word is not a known command
    #[error("unknown command '{0}' (expected 'text' or 'press')")]
    UnknownCommand(String),

    /// A required argument is missing
    #[error("missing {0}")]
    Missing(&'static str),

    /// A chat or user id is not an integer
    #[error("invalid {what} '{value}'")]
    InvalidId {
        /// Which id
        what: &'static str,
        /// Offending text
        value: String,
    },

    /// A JSON line did not decode
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stateful parser handing out message and callback ids
#[derive(Debug, Default)]
pub struct LineParser {
    next_message: i64,
    next_callback: u64,
}

impl LineParser {
    /// Create a parser; ids start at 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line; `Ok(None)` for blanks and comments
    pub fn parse(&mut self, line: &str) -> Result<Option<InboundEvent>, InputError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        if line.starts_with('{') {
            return Ok(Some(InboundEvent::from_json(line)?));
        }

        let (command, rest) = split_word(line);
        let (chat, rest) = split_word(rest);
        let (user, rest) = split_word(rest);
        let chat_id = ChatId(parse_id("chat id", chat)?);
        let sender = Sender::new(parse_id("user id", user)?, format!("user{user}"));

        match command {
            "text" => {
                if rest.is_empty() {
                    return Err(InputError::Missing("message text"));
                }
                self.next_message += 1;
                Ok(Some(InboundEvent::Message(TextMessageEvent {
                    chat_id,
                    sender,
                    message_id: MessageId(self.next_message),
                    text: rest.to_string(),
                })))
            }
            "press" => {
                if rest.is_empty() {
                    return Err(InputError::Missing("callback token"));
                }
                self.next_callback += 1;
                Ok(Some(InboundEvent::Callback(CallbackEvent {
                    callback_id: CallbackId(format!("console-{}", self.next_callback)),
                    token: rest.to_string(),
                    chat_id,
                    message_id: MessageId(0),
                    sender,
                })))
            }
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse_id(what: &'static str, value: &str) -> Result<i64, InputError> {
    if value.is_empty() {
        return Err(InputError::Missing(what));
    }
    value.parse().map_err(|_| InputError::InvalidId {
        what,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_keeps_spaces() {
        let mut parser = LineParser::new();
        let event = parser.parse("text 42 7 Grace  Hopper").unwrap().unwrap();
        let InboundEvent::Message(message) = event else {
            panic!("expected a message");
        };
        assert_eq!(message.chat_id, ChatId(42));
        assert_eq!(message.sender.id.0, 7);
        assert_eq!(message.text, "Grace  Hopper");
        assert_eq!(message.message_id, MessageId(1));
    }

    #[test]
    fn test_press_assigns_callback_ids() {
        let mut parser = LineParser::new();
        let first = parser.parse("press 1 1 screen:settings").unwrap().unwrap();
        let second = parser.parse("press 1 1 nav:back").unwrap().unwrap();
        let (InboundEvent::Callback(first), InboundEvent::Callback(second)) = (first, second) else {
            panic!("expected callbacks");
        };
        assert_eq!(first.token, "screen:settings");
        assert_eq!(first.callback_id, CallbackId("console-1".into()));
        assert_eq!(second.callback_id, CallbackId("console-2".into()));
    }

    #[test]
    fn test_skips_blank_and_comments() {
        let mut parser = LineParser::new();
        assert!(parser.parse("   ").unwrap().is_none());
        assert!(parser.parse("# navigate around").unwrap().is_none());
    }

    #[test]
    fn test_errors() {
        let mut parser = LineParser::new();
        assert!(matches!(
            parser.parse("shout 1 1 hi"),
            Err(InputError::UnknownCommand(_))
        ));
        assert!(matches!(
            parser.parse("text one 1 hi"),
            Err(InputError::InvalidId { what: "chat id", .. })
        ));
        assert!(matches!(
            parser.parse("press 1 1"),
            Err(InputError::Missing("callback token"))
        ));
        assert!(matches!(parser.parse("{ not json"), Err(InputError::Json(_))));
    }
}
