//! Event Handlers
//!
//! Application code reacts to button presses and free-text input through
//! `EventHandler`. A handler receives the callback token (or the typed text)
//! and a `HandlerContext`, and returns whether the current screen should be
//! re-rendered.
//!
//! Any async closure `Fn(String, HandlerContext) -> impl Future<Output =
//! anyhow::Result<bool>>` is a handler:
//!
//! ```ignore
//! screen.on_callback("buy", |_token, ctx: HandlerContext| async move {
//!     tracing::info!(chat_id = %ctx.chat_id, "Buy pressed");
//!     Ok(true)
//! });
//! ```
//!
//! An `Err` from a handler is logged by the router and treated as "no
//! refresh"; it never reaches the chat.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::HandlerContext;

/// Handler for callback tokens and text input
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle `input` (callback token or message text)
    ///
    /// Returns `Ok(true)` to request a refresh of the current screen.
    async fn handle(&self, input: &str, ctx: HandlerContext) -> anyhow::Result<bool>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(String, HandlerContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send,
{
    async fn handle(&self, input: &str, ctx: HandlerContext) -> anyhow::Result<bool> {
        (self)(input.to_string(), ctx).await
    }
}

/// Shared, type-erased handler as stored in a screen's handler table
pub type SharedHandler = Arc<dyn EventHandler>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CallbackEvent, InboundEvent, Sender};
    use crate::ids::{CallbackId, ChatId, MessageId, ScreenId};

    fn ctx() -> HandlerContext {
        HandlerContext::new(
            InboundEvent::Callback(CallbackEvent {
                callback_id: CallbackId("1".into()),
                token: "t".into(),
                chat_id: ChatId(1),
                message_id: MessageId(1),
                sender: Sender::new(1, "A"),
            }),
            ScreenId::new("s"),
        )
    }

    #[tokio::test]
    async fn test_closure_is_handler() {
        let handler: SharedHandler =
            Arc::new(|token: String, _ctx: HandlerContext| async move {
                Ok::<_, anyhow::Error>(token == "t")
            });
        assert!(handler.handle("t", ctx()).await.unwrap());
        assert!(!handler.handle("x", ctx()).await.unwrap());
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let handler: SharedHandler = Arc::new(|_token: String, _ctx: HandlerContext| async move {
            Err::<bool, _>(anyhow::anyhow!("boom"))
        });
        let err = handler.handle("t", ctx()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
