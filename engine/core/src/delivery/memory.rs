//! In-Memory Delivery
//!
//! A `DeliveryClient` that keeps every request in memory. Message ids are
//! handed out from a counter, deleted messages are tracked, and each
//! operation can be told to fail so error paths can be exercised.
//!
//! # Usage
//!
//! ```ignore
//! let delivery = Arc::new(MemoryDelivery::new());
//! let manager = ScreenManager::new(delivery.clone(), EngineConfig::default());
//! // ... drive the manager ...
//! assert_eq!(delivery.send_count(), 1);
//! ```

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::DeliveryClient;
use crate::content::OutboundMessage;
use crate::error::DeliveryError;
use crate::ids::{CallbackId, ChatId, MessageId};

/// One recorded delivery request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryRecord {
    /// A message was sent
    Sent {
        /// Target chat
        chat_id: ChatId,
        /// Id assigned to the message
        message_id: MessageId,
        /// Message contents
        message: OutboundMessage,
    },
    /// A message was deleted
    Deleted {
        /// Target chat
        chat_id: ChatId,
        /// Deleted message
        message_id: MessageId,
    },
    /// A callback query was acknowledged
    Answered {
        /// Acknowledged query
        callback_id: CallbackId,
    },
}

/// Recording delivery client
#[derive(Debug)]
pub struct MemoryDelivery {
    /// Everything that succeeded, in order
    log: Mutex<Vec<DeliveryRecord>>,
    /// Last assigned message id
    next_id: AtomicI64,
    /// Fail every send
    fail_sends: AtomicBool,
    /// Fail every delete
    fail_deletes: AtomicBool,
    /// Fail every answer
    fail_answers: AtomicBool,
}

impl Default for MemoryDelivery {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDelivery {
    /// Create an empty recorder; the first message gets id 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(0),
            fail_sends: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_answers: AtomicBool::new(false),
        }
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent deletes fail (or succeed again)
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent callback answers fail (or succeed again)
    pub fn set_fail_answers(&self, fail: bool) {
        self.fail_answers.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all recorded requests
    #[must_use]
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.log.lock().clone()
    }

    /// Sent messages in order
    #[must_use]
    pub fn sent(&self) -> Vec<(ChatId, MessageId, OutboundMessage)> {
        self.log
            .lock()
            .iter()
            .filter_map(|record| match record {
                DeliveryRecord::Sent {
                    chat_id,
                    message_id,
                    message,
                } => Some((*chat_id, *message_id, message.clone())),
                _ => None,
            })
            .collect()
    }

    /// Most recently sent message
    #[must_use]
    pub fn last_sent(&self) -> Option<OutboundMessage> {
        self.sent().pop().map(|(_, _, message)| message)
    }

    /// Number of successful sends
    #[must_use]
    pub fn send_count(&self) -> usize {
        self.count(|r| matches!(r, DeliveryRecord::Sent { .. }))
    }

    /// Number of successful deletes
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.count(|r| matches!(r, DeliveryRecord::Deleted { .. }))
    }

    /// Number of successful callback answers
    #[must_use]
    pub fn answer_count(&self) -> usize {
        self.count(|r| matches!(r, DeliveryRecord::Answered { .. }))
    }

    /// Forget all records (ids keep counting)
    pub fn clear(&self) {
        self.log.lock().clear();
    }

    fn count(&self, pred: impl Fn(&DeliveryRecord) -> bool) -> usize {
        self.log.lock().iter().filter(|r| pred(r)).count()
    }
}

#[async_trait]
impl DeliveryClient for MemoryDelivery {
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<MessageId, DeliveryError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DeliveryError::Transport("send disabled".to_string()));
        }
        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.log.lock().push(DeliveryRecord::Sent {
            chat_id,
            message_id,
            message: message.clone(),
        });
        Ok(message_id)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), DeliveryError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DeliveryError::NotFound {
                chat_id,
                message_id,
            });
        }
        self.log.lock().push(DeliveryRecord::Deleted {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &CallbackId) -> Result<(), DeliveryError> {
        if self.fail_answers.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected("query too old".to_string()));
        }
        self.log.lock().push(DeliveryRecord::Answered {
            callback_id: callback_id.clone(),
        });
        Ok(())
    }
}
