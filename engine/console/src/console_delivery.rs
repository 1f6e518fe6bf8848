//! Console Delivery
//!
//! A `DeliveryClient` that prints what a chat platform would show. Each
//! rendered screen becomes a framed block of text followed by its button grid,
//! one keyboard row per line:
//!
//! ```text
//! ── chat 42 · message 3 ──
//! *Settings*
//!
//! Options
//! [🔕 Off|notify]
//! [⬅️ Back|nav:back]
//! ```

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chatscreen_core::{
    ButtonAction, CallbackId, ChatId, DeliveryClient, DeliveryError, MessageId, OutboundMessage,
};

/// Prints screens to stdout and hands out sequential message ids
#[derive(Debug, Default)]
pub struct ConsoleDelivery {
    last_id: AtomicI64,
}

impl ConsoleDelivery {
    /// Create a client; the first message gets id 1
    pub fn new() -> Self {
        Self::default()
    }
}

/// Render a message the way the console shows it
pub fn format_message(chat_id: ChatId, message_id: MessageId, message: &OutboundMessage) -> String {
    let mut out = format!("── chat {chat_id} · message {message_id} ──\n");
    if !message.text.is_empty() {
        out.push_str(&message.text);
        out.push('\n');
    }
    if let Some(image) = &message.image {
        out.push_str(&format!("(image: {image})\n"));
    }
    for row in &message.keyboard {
        let cells: Vec<String> = row
            .iter()
            .map(|button| match &button.action {
                ButtonAction::Callback(token) => format!("[{}|{token}]", button.text),
                ButtonAction::Url(url) => format!("[{}|{url}]", button.text),
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

#[async_trait]
impl DeliveryClient for ConsoleDelivery {
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageId, DeliveryError> {
        let message_id = MessageId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        print!("{}", format_message(chat_id, message_id, message));
        Ok(message_id)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError> {
        println!("── chat {chat_id} · message {message_id} deleted ──");
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &CallbackId) -> Result<(), DeliveryError> {
        tracing::debug!(callback_id = %callback_id, "Callback answered");
        println!("(answered {callback_id})");
        Ok(())
    }
}
