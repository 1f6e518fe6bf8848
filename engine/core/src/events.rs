//! Inbound Events
//!
//! Events delivered by the external update source: plain text messages and
//! callback queries produced by button presses. The engine never polls for
//! these itself; an update loop hands them to `ScreenManager` (directly or
//! through `UpdateDispatcher`).
//!
//! Every handler invocation receives a `HandlerContext` built from the event:
//! the sender/chat metadata plus the raw event itself.

use serde::{Deserialize, Serialize};

use crate::ids::{CallbackId, ChatId, MessageId, ScreenId, UserId};

/// Who sent an event
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Platform user id
    pub id: UserId,
    /// Username (without `@`), if the user has one
    #[serde(default)]
    pub username: Option<String>,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Sender {
    /// Sender with only an id and first name
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            username: None,
            first_name: first_name.into(),
            last_name: None,
        }
    }

    /// Set the username
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// A plain text message typed by the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessageEvent {
    /// Chat the message was sent in
    pub chat_id: ChatId,
    /// Message author
    pub sender: Sender,
    /// Id of the user's message
    pub message_id: MessageId,
    /// Message text
    pub text: String,
}

/// A button press
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEvent {
    /// Id used to acknowledge the query
    pub callback_id: CallbackId,
    /// Token carried by the pressed button
    pub token: String,
    /// Chat holding the pressed message
    pub chat_id: ChatId,
    /// Message carrying the pressed button
    pub message_id: MessageId,
    /// Who pressed
    pub sender: Sender,
}

/// Any inbound event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Text message
    Message(TextMessageEvent),
    /// Button press
    Callback(CallbackEvent),
}

impl InboundEvent {
    /// Chat the event belongs to
    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Message(msg) => msg.chat_id,
            Self::Callback(cb) => cb.chat_id,
        }
    }

    /// Sender of the event
    #[must_use]
    pub fn sender(&self) -> &Sender {
        match self {
            Self::Message(msg) => &msg.sender,
            Self::Callback(cb) => &cb.sender,
        }
    }

    /// Message id the event refers to
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Message(msg) => msg.message_id,
            Self::Callback(cb) => cb.message_id,
        }
    }

    /// Parse an event from one line of JSON
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl From<TextMessageEvent> for InboundEvent {
    fn from(value: TextMessageEvent) -> Self {
        Self::Message(value)
    }
}

impl From<CallbackEvent> for InboundEvent {
    fn from(value: CallbackEvent) -> Self {
        Self::Callback(value)
    }
}

/// Metadata passed to every handler invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerContext {
    /// Chat the event came from
    pub chat_id: ChatId,
    /// Sender id
    pub user_id: UserId,
    /// Sender username
    pub username: Option<String>,
    /// Sender first name
    pub first_name: String,
    /// Sender last name
    pub last_name: Option<String>,
    /// Originating message id
    pub message_id: MessageId,
    /// Screen whose handler is running
    pub screen_id: ScreenId,
    /// The raw inbound event
    pub event: InboundEvent,
}

impl HandlerContext {
    /// Build the context for an event handled on `screen_id`
    #[must_use]
    pub fn new(event: InboundEvent, screen_id: ScreenId) -> Self {
        let sender = event.sender();
        Self {
            chat_id: event.chat_id(),
            user_id: sender.id,
            username: sender.username.clone(),
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
            message_id: event.message_id(),
            screen_id,
            event,
        }
    }

    /// The raw callback query, if this context came from a button press
    #[must_use]
    pub fn callback_query(&self) -> Option<&CallbackEvent> {
        match &self.event {
            InboundEvent::Callback(cb) => Some(cb),
            InboundEvent::Message(_) => None,
        }
    }

    /// The raw message, if this context came from a text message
    #[must_use]
    pub fn message(&self) -> Option<&TextMessageEvent> {
        match &self.event {
            InboundEvent::Message(msg) => Some(msg),
            InboundEvent::Callback(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_callback() {
        let event = InboundEvent::Callback(CallbackEvent {
            callback_id: CallbackId("cb1".into()),
            token: "buy".into(),
            chat_id: ChatId(10),
            message_id: MessageId(99),
            sender: Sender::new(5, "Ada").with_username("ada"),
        });
        let ctx = HandlerContext::new(event, ScreenId::new("shop"));

        assert_eq!(ctx.chat_id, ChatId(10));
        assert_eq!(ctx.user_id, UserId(5));
        assert_eq!(ctx.username.as_deref(), Some("ada"));
        assert_eq!(ctx.first_name, "Ada");
        assert_eq!(ctx.message_id, MessageId(99));
        assert_eq!(ctx.callback_query().map(|cb| cb.token.as_str()), Some("buy"));
        assert!(ctx.message().is_none());
    }

    #[test]
    fn test_event_from_json() {
        let line = r#"{"type":"message","chat_id":1,"sender":{"id":2,"first_name":"Bo"},"message_id":3,"text":"hi"}"#;
        let event = InboundEvent::from_json(line).unwrap();
        assert_eq!(event.chat_id(), ChatId(1));
        assert_eq!(event.sender().first_name, "Bo");
        assert!(matches!(event, InboundEvent::Message(ref m) if m.text == "hi"));
    }
}
