//! Screen Manager - Registry, Navigation and Event Routing
//!
//! The `ScreenManager` is the engine's entry point. It owns:
//! - the screen registry (`ScreenId` → `SharedScreen`) and the main-screen pointer
//! - per-chat `NavigationState` (the last rendered message)
//! - the per-chat `StateMachine` (named state, values, current screen)
//!
//! and routes inbound events to screen handlers.
//!
//! # Navigation
//!
//! ```text
//!   navigate_to_screen(chat, id)
//!        │
//!        ├─ unknown id ──────────────► warn, nothing changes
//!        │
//!        ├─ set current screen (StateMachine)
//!        ├─ delete previous render   (best effort, warn on failure)
//!        ├─ compose + send           (failure -> EngineError::Delivery)
//!        └─ remember new message id
//! ```
//!
//! The chat's current screen lives only in the `StateMachine` screen slot;
//! `NavigationState` tracks nothing but the rendered message.
//!
//! # Callback routing
//!
//! Matchers run in a fixed order: navigation token, back sentinel, then the
//! screen's own controls followed by the exact application handler. Every
//! routed callback is acknowledged, matched or not. A handler error (or panic) is logged and
//! treated as "no refresh".
//!
//! # Concurrency
//!
//! The manager is `Send + Sync` and meant to be shared behind an `Arc`. It
//! holds no lock across an `.await`, so handlers may call back into it (for
//! example to navigate). It does not order concurrent events of the same chat:
//! two interleaved navigations can race on the last rendered message. Feed
//! events through `UpdateDispatcher` to process each chat sequentially.
//!
//! Dropping an in-flight future cancels the operation; the chat may then point
//! at a screen whose message was never delivered. Navigation is best effort.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::content::{layout_buttons, Button, ContentFragment, OutboundMessage};
use crate::delivery::DeliveryClient;
use crate::error::EngineError;
use crate::events::{CallbackEvent, HandlerContext, InboundEvent, TextMessageEvent};
use crate::handler::SharedHandler;
use crate::ids::{ChatId, MessageId, ScreenId};
use crate::routing::{classify, Route, BACK_TOKEN};
use crate::screen::{text_input_key, Screen, SharedScreen};
use crate::state::StateMachine;

/// Per-chat navigation bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Message currently showing the chat's screen (`None` = nothing yet)
    pub last_rendered: Option<MessageId>,
}

/// What `handle_callback` did with a token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The chat has no current screen; nothing was acknowledged
    NoCurrentScreen,
    /// A navigation token was followed
    Navigated(ScreenId),
    /// The back sentinel was followed to the parent
    WentBack(ScreenId),
    /// The navigation target (or parent) is not registered; acknowledged only
    NavigationMissed(ScreenId),
    /// An application handler ran
    Handled {
        /// Whether the screen was re-rendered
        refreshed: bool,
    },
    /// A control on the screen consumed the token and the screen was re-rendered
    ControlUpdated,
    /// Nothing matched; acknowledged only
    Unmatched,
}

/// What `handle_text_message` did with a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextOutcome {
    /// The start command reset the chat to the main screen
    Started,
    /// A text-input handler ran
    Handled {
        /// Whether the screen was re-rendered
        refreshed: bool,
    },
    /// No handler for this chat's state and screen
    Ignored,
}

/// Screen registry, navigation and event router
pub struct ScreenManager<D: DeliveryClient> {
    /// Engine configuration
    config: EngineConfig,
    /// Outbound delivery client
    delivery: Arc<D>,
    /// Registered screens
    screens: RwLock<HashMap<ScreenId, SharedScreen>>,
    /// Main screen pointer
    main_screen: RwLock<Option<ScreenId>>,
    /// Per-chat rendered message tracking
    navigation: DashMap<ChatId, NavigationState>,
    /// Per-chat state and current screen
    state: StateMachine,
}

impl<D: DeliveryClient> ScreenManager<D> {
    /// Create a manager with an empty registry
    pub fn new(delivery: Arc<D>, config: EngineConfig) -> Self {
        Self {
            config,
            delivery,
            screens: RwLock::new(HashMap::new()),
            main_screen: RwLock::new(None),
            navigation: DashMap::new(),
            state: StateMachine::new(),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Per-chat state store
    pub fn state(&self) -> &StateMachine {
        &self.state
    }

    /// Delivery client
    pub fn delivery(&self) -> &Arc<D> {
        &self.delivery
    }

    /// New screen whose content uses the configured default row width
    pub fn build_screen(
        &self,
        id: impl Into<ScreenId>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Screen {
        let content =
            ContentFragment::text(text).with_buttons_per_row(self.config.default_buttons_per_row);
        Screen::with_id(id, title, content)
    }

    // ============================================
    // Registry
    // ============================================

    /// Register a screen, optionally as the main screen
    ///
    /// A screen already registered under the same id is replaced.
    pub fn register_screen(&self, screen: Screen, is_main: bool) -> SharedScreen {
        self.register_shared(screen.into_shared(), is_main)
    }

    /// Register an already shared screen
    pub fn register_shared(&self, screen: SharedScreen, is_main: bool) -> SharedScreen {
        let id = {
            let mut guard = screen.write();
            if is_main {
                guard.is_main_screen = true;
            }
            guard.id().clone()
        };

        let replaced = self
            .screens
            .write()
            .insert(id.clone(), Arc::clone(&screen))
            .is_some();
        if replaced {
            tracing::warn!(screen_id = %id, "Screen id already registered, replacing");
        } else {
            tracing::debug!(screen_id = %id, "Screen registered");
        }

        if is_main {
            self.point_main_at(id);
        }
        screen
    }

    /// Make `screen` the main screen, registering it if its id is unknown
    ///
    /// When a screen with the same id is already registered, that instance is
    /// kept and becomes the main screen.
    pub fn set_main_screen(&self, screen: Screen) -> SharedScreen {
        let existing = self.lookup_screen(screen.id());
        match existing {
            Some(registered) => {
                let id = {
                    let mut guard = registered.write();
                    guard.is_main_screen = true;
                    guard.id().clone()
                };
                self.point_main_at(id);
                registered
            }
            None => self.register_screen(screen, true),
        }
    }

    /// Point the main screen at an already registered id
    pub fn set_main_screen_id(&self, id: &ScreenId) -> Result<(), EngineError> {
        let screen = self
            .lookup_screen(id)
            .ok_or_else(|| EngineError::UnknownScreen(id.clone()))?;
        screen.write().is_main_screen = true;
        self.point_main_at(id.clone());
        Ok(())
    }

    fn point_main_at(&self, id: ScreenId) {
        let previous = self.main_screen.write().replace(id.clone());
        if let Some(previous) = previous.filter(|prev| prev != &id) {
            if let Some(old) = self.lookup_screen(&previous) {
                old.write().is_main_screen = false;
            }
        }
        tracing::info!(screen_id = %id, "Main screen set");
    }

    /// Remove a screen from the registry
    ///
    /// Screens naming it as parent keep the id; back navigation to it becomes
    /// a registry miss.
    pub fn unregister_screen(&self, id: &ScreenId) -> Option<SharedScreen> {
        let removed = self.screens.write().remove(id);
        if removed.is_some() {
            let mut main = self.main_screen.write();
            if main.as_ref() == Some(id) {
                *main = None;
            }
            tracing::debug!(screen_id = %id, "Screen unregistered");
        }
        removed
    }

    /// Look up a registered screen
    pub fn lookup_screen(&self, id: &ScreenId) -> Option<SharedScreen> {
        self.screens.read().get(id).cloned()
    }

    /// Main screen id, if set
    pub fn main_screen_id(&self) -> Option<ScreenId> {
        self.main_screen.read().clone()
    }

    /// The main screen, or `EngineError::NoMainScreen`
    pub fn main_screen(&self) -> Result<SharedScreen, EngineError> {
        self.main_screen_id()
            .and_then(|id| self.lookup_screen(&id))
            .ok_or(EngineError::NoMainScreen)
    }

    /// Number of registered screens
    pub fn screen_count(&self) -> usize {
        self.screens.read().len()
    }

    /// The chat's current screen
    pub fn current_screen(&self, chat_id: ChatId) -> Option<ScreenId> {
        self.state.get_current_screen(chat_id)
    }

    /// The chat's navigation bookkeeping, if the chat was ever rendered to
    pub fn navigation_state(&self, chat_id: ChatId) -> Option<NavigationState> {
        self.navigation.get(&chat_id).map(|nav| *nav)
    }

    // ============================================
    // Rendering
    // ============================================

    /// Compose a screen into one outbound message
    ///
    /// The content text is primary; if it is empty, the first non-empty
    /// control text is adopted. Buttons are the content's, then each
    /// control's in order, then the back button. All buttons are laid out
    /// with the content's `buttons_per_row`.
    ///
    /// The title is prefixed as `*title*` only for markdown content with
    /// `bold_titles` on; plain-text screens get the title unbolded.
    pub fn compose(&self, screen: &Screen) -> OutboundMessage {
        let mut text = screen.content.text.clone();
        let mut buttons = screen.content.buttons.clone();
        let mut image = screen.content.image.clone();

        for control in &screen.controls {
            let fragment = control.render();
            if text.is_empty() && !fragment.text.is_empty() {
                text = fragment.text;
            }
            if image.is_none() {
                image = fragment.image;
            }
            buttons.extend(fragment.buttons);
        }

        if screen.parent.is_some() && screen.allow_back_navigation {
            let caption = screen
                .back_button_text
                .as_deref()
                .unwrap_or(&self.config.back_button_text);
            buttons.push(Button::callback(caption, BACK_TOKEN));
        }

        let markdown = screen.content.markdown;
        if !screen.title.is_empty() {
            let title = if markdown && self.config.bold_titles {
                format!("*{}*", screen.title)
            } else {
                screen.title.clone()
            };
            text = if text.is_empty() {
                title
            } else {
                format!("{title}\n\n{text}")
            };
        }

        OutboundMessage {
            text,
            markdown,
            keyboard: layout_buttons(buttons, screen.content.buttons_per_row()),
            image,
        }
    }

    /// Compose a registered screen without sending it
    pub fn render_screen(&self, id: &ScreenId) -> Option<OutboundMessage> {
        let screen = self.lookup_screen(id)?;
        let guard = screen.read();
        Some(self.compose(&guard))
    }

    /// Replace the chat's rendered message with a fresh render of `screen`
    async fn render_and_replace(
        &self,
        chat_id: ChatId,
        screen: &SharedScreen,
    ) -> Result<MessageId, EngineError> {
        let message = {
            let guard = screen.read();
            self.compose(&guard)
        };

        let previous = self
            .navigation
            .get_mut(&chat_id)
            .and_then(|mut nav| nav.last_rendered.take());
        if let Some(previous) = previous {
            if let Err(e) = self.delivery.delete_message(chat_id, previous).await {
                tracing::warn!(
                    chat_id = %chat_id,
                    message_id = %previous,
                    error = %e,
                    "Failed to delete previous screen message"
                );
            }
        }

        let message_id = self.delivery.send_message(chat_id, &message).await?;
        self.navigation.entry(chat_id).or_default().last_rendered = Some(message_id);
        Ok(message_id)
    }

    // ============================================
    // Navigation
    // ============================================

    /// Navigate a chat to a registered screen
    ///
    /// An unknown id is logged and ignored. A failed send is returned.
    pub async fn navigate_to_screen(
        &self,
        chat_id: ChatId,
        screen_id: &ScreenId,
    ) -> Result<(), EngineError> {
        self.try_navigate(chat_id, screen_id).await.map(|_| ())
    }

    /// Navigate and report whether the target was registered
    ///
    /// `Ok(false)` means the id was unknown and nothing changed. On a send
    /// error the chat already points at the target.
    async fn try_navigate(&self, chat_id: ChatId, screen_id: &ScreenId) -> Result<bool, EngineError> {
        let Some(screen) = self.lookup_screen(screen_id) else {
            tracing::warn!(chat_id = %chat_id, screen_id = %screen_id, "Navigation to unknown screen");
            return Ok(false);
        };

        self.state.set_current_screen(chat_id, screen_id.clone());
        let input_state = screen.read().input_state();
        if let Some(input_state) = input_state {
            self.state.set_named_state(chat_id, input_state);
        }

        let message_id = self.render_and_replace(chat_id, &screen).await?;
        tracing::info!(
            chat_id = %chat_id,
            screen_id = %screen_id,
            message_id = %message_id,
            "Navigated"
        );
        Ok(true)
    }

    /// Navigate a chat to the main screen
    pub async fn navigate_to_main_screen(&self, chat_id: ChatId) -> Result<(), EngineError> {
        let Some(main) = self.main_screen_id() else {
            tracing::warn!(chat_id = %chat_id, "No main screen set");
            return Ok(());
        };
        self.navigate_to_screen(chat_id, &main).await
    }

    /// Re-render the chat's current screen, replacing the previous message
    pub async fn refresh(&self, chat_id: ChatId) -> Result<(), EngineError> {
        let Some(screen_id) = self.current_screen(chat_id) else {
            tracing::debug!(chat_id = %chat_id, "Refresh without current screen");
            return Ok(());
        };
        let Some(screen) = self.lookup_screen(&screen_id) else {
            tracing::warn!(chat_id = %chat_id, screen_id = %screen_id, "Current screen no longer registered");
            return Ok(());
        };
        let message_id = self.render_and_replace(chat_id, &screen).await?;
        tracing::debug!(chat_id = %chat_id, screen_id = %screen_id, message_id = %message_id, "Screen refreshed");
        Ok(())
    }

    async fn refresh_logged(&self, chat_id: ChatId) {
        if let Err(e) = self.refresh(chat_id).await {
            tracing::error!(chat_id = %chat_id, error = %e, "Failed to refresh screen");
        }
    }

    /// Navigate, logging a failed send; false when the target is unknown
    async fn navigate_logged(&self, chat_id: ChatId, screen_id: &ScreenId) -> bool {
        match self.try_navigate(chat_id, screen_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(chat_id = %chat_id, screen_id = %screen_id, error = %e, "Navigation failed");
                true
            }
        }
    }

    // ============================================
    // Event routing
    // ============================================

    /// Route any inbound event
    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::Callback(callback) => {
                self.handle_callback(callback).await;
            }
            InboundEvent::Message(message) => {
                self.handle_text_message(message).await;
            }
        }
    }

    /// Route a button press
    pub async fn handle_callback(&self, event: CallbackEvent) -> CallbackOutcome {
        let chat_id = event.chat_id;
        let current = self
            .current_screen(chat_id)
            .and_then(|id| self.lookup_screen(&id).map(|screen| (id, screen)));
        let Some((screen_id, screen)) = current else {
            tracing::warn!(chat_id = %chat_id, token = %event.token, "Callback for chat without current screen");
            return CallbackOutcome::NoCurrentScreen;
        };

        tracing::debug!(chat_id = %chat_id, screen_id = %screen_id, token = %event.token, "Routing callback");

        let outcome = match classify(&event.token) {
            Route::Navigate(target) => {
                let target = ScreenId::new(target);
                if self.navigate_logged(chat_id, &target).await {
                    CallbackOutcome::Navigated(target)
                } else {
                    CallbackOutcome::NavigationMissed(target)
                }
            }
            Route::Back => {
                let parent = screen.read().parent.clone();
                match parent {
                    Some(parent) => {
                        if self.navigate_logged(chat_id, &parent).await {
                            CallbackOutcome::WentBack(parent)
                        } else {
                            CallbackOutcome::NavigationMissed(parent)
                        }
                    }
                    None => self.dispatch_callback(&event, &screen_id, &screen).await,
                }
            }
            Route::Application(_) => self.dispatch_callback(&event, &screen_id, &screen).await,
        };

        if let Err(e) = self.delivery.answer_callback(&event.callback_id).await {
            tracing::warn!(chat_id = %chat_id, callback_id = %event.callback_id, error = %e, "Failed to answer callback");
        }

        if matches!(
            outcome,
            CallbackOutcome::Handled { refreshed: true } | CallbackOutcome::ControlUpdated
        ) {
            self.refresh_logged(chat_id).await;
        }

        outcome
    }

    /// Screen controls first, then the application handler
    ///
    /// A control that owns the token updates its state before the handler
    /// runs, so a handler registered under a toggle's token sees the new
    /// state. The screen is refreshed if either side asks for it.
    async fn dispatch_callback(
        &self,
        event: &CallbackEvent,
        screen_id: &ScreenId,
        screen: &SharedScreen,
    ) -> CallbackOutcome {
        let (control_changed, handler) = {
            let mut guard = screen.write();
            (guard.apply_to_controls(&event.token), guard.handler(&event.token))
        };
        if control_changed {
            tracing::debug!(chat_id = %event.chat_id, token = %event.token, "Control consumed callback");
        }

        if let Some(handler) = handler {
            let ctx = HandlerContext::new(InboundEvent::Callback(event.clone()), screen_id.clone());
            let requested = invoke_handler(&handler, &event.token, ctx).await;
            return CallbackOutcome::Handled {
                refreshed: requested || control_changed,
            };
        }

        if control_changed {
            return CallbackOutcome::ControlUpdated;
        }

        tracing::debug!(chat_id = %event.chat_id, token = %event.token, "Unmatched callback");
        CallbackOutcome::Unmatched
    }

    /// Route a plain text message
    pub async fn handle_text_message(&self, event: TextMessageEvent) -> TextOutcome {
        let chat_id = event.chat_id;

        if self.config.is_start_command(&event.text) {
            self.state.clear_state(chat_id);
            if let Err(e) = self.navigate_to_main_screen(chat_id).await {
                tracing::error!(chat_id = %chat_id, error = %e, "Failed to show main screen");
            }
            return TextOutcome::Started;
        }

        let Some(state_name) = self.state.named_state(chat_id) else {
            tracing::debug!(chat_id = %chat_id, "Text without named state ignored");
            return TextOutcome::Ignored;
        };
        let Some(screen_id) = self.current_screen(chat_id) else {
            tracing::debug!(chat_id = %chat_id, "Text without current screen ignored");
            return TextOutcome::Ignored;
        };
        let key = text_input_key(&state_name);
        let handler = self.lookup_screen(&screen_id).and_then(|screen| {
            let guard = screen.read();
            guard.handler(&key)
        });
        let Some(handler) = handler else {
            tracing::debug!(
                chat_id = %chat_id,
                screen_id = %screen_id,
                state = %state_name,
                "No text handler for state"
            );
            return TextOutcome::Ignored;
        };

        let text = event.text.clone();
        let ctx = HandlerContext::new(InboundEvent::Message(event), screen_id);
        let refreshed = invoke_handler(&handler, &text, ctx).await;
        if refreshed {
            self.refresh_logged(chat_id).await;
        }
        TextOutcome::Handled { refreshed }
    }
}

/// Run a handler, turning errors and panics into "no refresh"
async fn invoke_handler(handler: &SharedHandler, input: &str, ctx: HandlerContext) -> bool {
    let chat_id = ctx.chat_id;
    let screen_id = ctx.screen_id.clone();
    match AssertUnwindSafe(handler.handle(input, ctx)).catch_unwind().await {
        Ok(Ok(refresh)) => refresh,
        Ok(Err(e)) => {
            tracing::error!(
                chat_id = %chat_id,
                screen_id = %screen_id,
                input = %input,
                error = %e,
                "Handler failed"
            );
            false
        }
        Err(_) => {
            tracing::error!(
                chat_id = %chat_id,
                screen_id = %screen_id,
                input = %input,
                "Handler panicked"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{RichText, Toggle};
    use crate::delivery::MemoryDelivery;
    use crate::events::Sender;
    use crate::ids::CallbackId;
    use pretty_assertions::assert_eq;

    fn manager() -> (Arc<MemoryDelivery>, ScreenManager<MemoryDelivery>) {
        let delivery = Arc::new(MemoryDelivery::new());
        let manager = ScreenManager::new(Arc::clone(&delivery), EngineConfig::default());
        (delivery, manager)
    }

    fn press(chat: i64, token: &str) -> CallbackEvent {
        CallbackEvent {
            callback_id: CallbackId(format!("cb-{token}")),
            token: token.to_string(),
            chat_id: ChatId(chat),
            message_id: MessageId(0),
            sender: Sender::new(chat, "Tester"),
        }
    }

    #[test]
    fn test_register_lookup_round_trip() {
        let (_, manager) = manager();
        let screen = Screen::new("A", ContentFragment::text("a"));
        let id = screen.id().clone();
        let shared = manager.register_screen(screen, false);

        let found = manager.lookup_screen(&id).unwrap();
        assert!(Arc::ptr_eq(&found, &shared));
        assert!(manager.lookup_screen(&ScreenId::new("nope")).is_none());
    }

    #[test]
    fn test_register_replaces_on_collision() {
        let (_, manager) = manager();
        manager.register_screen(Screen::with_id("x", "first", ContentFragment::default()), false);
        manager.register_screen(Screen::with_id("x", "second", ContentFragment::default()), false);
        assert_eq!(manager.screen_count(), 1);
        let screen = manager.lookup_screen(&ScreenId::new("x")).unwrap();
        assert_eq!(screen.read().title, "second");
    }

    #[test]
    fn test_set_main_screen_registers_if_absent() {
        let (_, manager) = manager();
        manager.set_main_screen(Screen::with_id("home", "Home", ContentFragment::default()));
        assert_eq!(manager.main_screen_id(), Some(ScreenId::new("home")));
        assert!(manager.lookup_screen(&ScreenId::new("home")).is_some());

        manager.register_screen(Screen::with_id("other", "", ContentFragment::default()), true);
        assert_eq!(manager.main_screen_id(), Some(ScreenId::new("other")));
        let home = manager.lookup_screen(&ScreenId::new("home")).unwrap();
        assert!(!home.read().is_main_screen);
    }

    #[test]
    fn test_set_main_screen_id_unknown() {
        let (_, manager) = manager();
        let err = manager.set_main_screen_id(&ScreenId::new("ghost")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownScreen(_)));
    }

    #[test]
    fn test_unregister_clears_main() {
        let (_, manager) = manager();
        assert!(matches!(manager.main_screen(), Err(EngineError::NoMainScreen)));
        manager.register_screen(Screen::with_id("home", "", ContentFragment::default()), true);
        assert!(manager.main_screen().is_ok());
        assert!(manager.unregister_screen(&ScreenId::new("home")).is_some());
        assert!(manager.main_screen_id().is_none());
    }

    #[test]
    fn test_compose_first_non_empty_text_wins() {
        let (_, manager) = manager();
        let mut screen = Screen::with_id("s", "", ContentFragment::default());
        screen.add_control(Toggle::new("a", false, "A on", "A off"));
        screen.add_control(RichText::plain("X"));
        screen.add_control(Button::callback("x", "x"));
        screen.add_control(RichText::plain("Y"));

        let message = manager.compose(&screen);
        assert_eq!(message.text, "X");
        assert_eq!(message.tokens(), vec!["a", "x"]);
    }

    #[test]
    fn test_compose_title_and_back_button() {
        let (_, manager) = manager();
        let screen = Screen::with_id("s", "Settings", ContentFragment::markdown("Pick one"))
            .with_parent("main");
        let message = manager.compose(&screen);
        assert_eq!(message.text, "*Settings*\n\nPick one");
        assert_eq!(message.tokens(), vec![BACK_TOKEN]);
        assert_eq!(message.keyboard[0][0].text, "⬅️ Back");

        let plain = Screen::with_id("p", "Plain", ContentFragment::text("Body"))
            .with_parent("main")
            .without_back_navigation();
        let message = manager.compose(&plain);
        assert_eq!(message.text, "Plain\n\nBody");
        assert!(message.keyboard.is_empty());
    }

    #[test]
    fn test_compose_layout_uses_screen_row_width() {
        let (_, manager) = manager();
        let content = ContentFragment::text("t")
            .with_buttons_per_row(2)
            .with_button(Button::callback("1", "1"))
            .with_button(Button::callback("2", "2"))
            .with_button(Button::callback("3", "3"));
        let screen = Screen::with_id("s", "", content);
        let message = manager.compose(&screen);
        assert_eq!(message.keyboard.len(), 2);
        assert_eq!(message.keyboard[1].len(), 1);
    }

    #[tokio::test]
    async fn test_navigate_unknown_is_noop() {
        let (delivery, manager) = manager();
        manager
            .navigate_to_screen(ChatId(1), &ScreenId::new("ghost"))
            .await
            .unwrap();
        assert_eq!(manager.current_screen(ChatId(1)), None);
        assert!(manager.navigation_state(ChatId(1)).is_none());
        assert_eq!(delivery.send_count(), 0);
    }

    #[tokio::test]
    async fn test_navigate_sends_once_and_tracks() {
        let (delivery, manager) = manager();
        manager.register_screen(Screen::with_id("a", "", ContentFragment::text("A")), false);

        manager.navigate_to_screen(ChatId(1), &ScreenId::new("a")).await.unwrap();

        assert_eq!(manager.state().get_current_screen(ChatId(1)), Some(ScreenId::new("a")));
        assert_eq!(delivery.send_count(), 1);
        assert_eq!(delivery.delete_count(), 0);
        assert_eq!(
            manager.navigation_state(ChatId(1)).unwrap().last_rendered,
            Some(MessageId(1))
        );
    }

    #[tokio::test]
    async fn test_navigate_main_without_main_is_noop() {
        let (delivery, manager) = manager();
        manager.navigate_to_main_screen(ChatId(1)).await.unwrap();
        assert_eq!(delivery.send_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_failure_does_not_stop_navigation() {
        let (delivery, manager) = manager();
        manager.register_screen(Screen::with_id("a", "", ContentFragment::text("A")), false);
        manager.register_screen(Screen::with_id("b", "", ContentFragment::text("B")), false);

        manager.navigate_to_screen(ChatId(1), &ScreenId::new("a")).await.unwrap();
        delivery.set_fail_deletes(true);
        manager.navigate_to_screen(ChatId(1), &ScreenId::new("b")).await.unwrap();

        assert_eq!(delivery.send_count(), 2);
        assert_eq!(manager.current_screen(ChatId(1)), Some(ScreenId::new("b")));
        assert_eq!(delivery.last_sent().unwrap().text, "B");
    }

    #[tokio::test]
    async fn test_send_failure_propagates() {
        let (delivery, manager) = manager();
        manager.register_screen(Screen::with_id("a", "", ContentFragment::text("A")), false);
        delivery.set_fail_sends(true);

        let err = manager
            .navigate_to_screen(ChatId(1), &ScreenId::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Delivery(_)));
        // Best effort: the chat already points at the target
        assert_eq!(manager.current_screen(ChatId(1)), Some(ScreenId::new("a")));
    }

    #[tokio::test]
    async fn test_callback_without_screen_not_acknowledged() {
        let (delivery, manager) = manager();
        let outcome = manager.handle_callback(press(1, "x")).await;
        assert_eq!(outcome, CallbackOutcome::NoCurrentScreen);
        assert_eq!(delivery.answer_count(), 0);
    }

    #[tokio::test]
    async fn test_control_consumes_token_and_refreshes() {
        let (delivery, manager) = manager();
        let screen = Screen::with_id("s", "", ContentFragment::default())
            .with_control(Toggle::new("notify", false, "on", "off"));
        manager.register_screen(screen, false);
        manager.navigate_to_screen(ChatId(1), &ScreenId::new("s")).await.unwrap();

        let outcome = manager.handle_callback(press(1, "notify")).await;
        assert_eq!(outcome, CallbackOutcome::ControlUpdated);
        assert_eq!(delivery.send_count(), 2);
        assert_eq!(delivery.last_sent().unwrap().keyboard[0][0].text, "on");
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let (delivery, manager) = manager();
        let mut screen = Screen::with_id("s", "", ContentFragment::text("S"));
        screen.on_callback("boom", |_t: String, _c: HandlerContext| async move {
            if true {
                panic!("handler exploded");
            }
            Ok(true)
        });
        manager.register_screen(screen, false);
        manager.navigate_to_screen(ChatId(1), &ScreenId::new("s")).await.unwrap();

        let outcome = manager.handle_callback(press(1, "boom")).await;
        assert_eq!(outcome, CallbackOutcome::Handled { refreshed: false });
        assert_eq!(delivery.answer_count(), 1);
        assert_eq!(delivery.send_count(), 1);
    }

    #[tokio::test]
    async fn test_answer_failure_is_not_fatal() {
        let (delivery, manager) = manager();
        let mut screen = Screen::with_id("s", "", ContentFragment::text("S"));
        screen.on_callback("go", |_t: String, _c: HandlerContext| async { Ok(true) });
        manager.register_screen(screen, false);
        manager.navigate_to_screen(ChatId(1), &ScreenId::new("s")).await.unwrap();
        delivery.set_fail_answers(true);

        let outcome = manager.handle_callback(press(1, "go")).await;
        assert_eq!(outcome, CallbackOutcome::Handled { refreshed: true });
        assert_eq!(delivery.send_count(), 2);
    }
}
