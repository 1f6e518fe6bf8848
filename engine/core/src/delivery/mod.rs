//! Outbound Delivery
//!
//! Abstraction over the remote chat platform's send/delete/answer API. The
//! engine renders screens into `OutboundMessage`s and hands them to a
//! `DeliveryClient`; it never talks to the network itself.
//!
//! # Design Philosophy
//!
//! The client surface is deliberately narrow: three async operations, all of
//! which may fail. The router treats delete and answer failures as warnings
//! and keeps going. A failed send is reported to the caller because there is
//! no message id to record.
//!
//! `MemoryDelivery` is an in-process implementation that records everything
//! it is asked to do, for tests and local demos.

pub mod memory;

use async_trait::async_trait;

use crate::content::OutboundMessage;
use crate::error::DeliveryError;
use crate::ids::{CallbackId, ChatId, MessageId};

pub use memory::{DeliveryRecord, MemoryDelivery};

/// Outbound delivery client trait
///
/// Implement this to connect the engine to a chat platform.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Send a rendered message, returning the platform message id
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageId, DeliveryError>;

    /// Delete a previously sent message
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError>;

    /// Acknowledge a callback query (clears the client-side spinner)
    async fn answer_callback(&self, callback_id: &CallbackId) -> Result<(), DeliveryError>;
}
