//! Screens
//!
//! A `Screen` is an addressable unit of UI: a title, a primary content
//! fragment, an ordered list of controls, a handler table and a
//! back-navigation policy.
//!
//! # Parents
//!
//! `parent` is a back-reference by id into the manager's registry. A screen
//! never owns its parent; if the parent is later unregistered, back navigation
//! simply finds nothing to go to.
//!
//! # Handler keys
//!
//! Callback handlers are keyed by the exact callback token. Text-input
//! handlers are keyed by `text_input:<state>` (see `text_input_key`).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::content::ContentFragment;
use crate::controls::UiControl;
use crate::events::HandlerContext;
use crate::handler::{EventHandler, SharedHandler};
use crate::ids::{ControlId, ScreenId};

/// Prefix of text-input handler keys
pub const TEXT_INPUT_PREFIX: &str = "text_input:";

/// Handler table key for text input received in named state `state`
#[must_use]
pub fn text_input_key(state: &str) -> String {
    format!("{TEXT_INPUT_PREFIX}{state}")
}

/// A screen shared between the registry and application handlers
pub type SharedScreen = Arc<RwLock<Screen>>;

/// An addressable unit of UI
pub struct Screen {
    id: ScreenId,
    /// Title shown in bold above the content (empty = none)
    pub title: String,
    /// Primary content
    pub content: ContentFragment,
    /// Controls in render order
    pub controls: Vec<UiControl>,
    handlers: HashMap<String, SharedHandler>,
    /// Screen to return to on "back"
    pub parent: Option<ScreenId>,
    /// Whether a back button is rendered when a parent is set
    pub allow_back_navigation: bool,
    /// Caption of the back button (engine default when `None`)
    pub back_button_text: Option<String>,
    /// Whether this screen is the manager's main screen
    pub is_main_screen: bool,
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("Screen")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("content", &self.content)
            .field("controls", &self.controls.len())
            .field("handlers", &keys)
            .field("parent", &self.parent)
            .field("allow_back_navigation", &self.allow_back_navigation)
            .field("is_main_screen", &self.is_main_screen)
            .finish()
    }
}

impl Screen {
    /// Create a screen with a generated id
    pub fn new(title: impl Into<String>, content: ContentFragment) -> Self {
        Self::with_id(ScreenId::generate(), title, content)
    }

    /// Create a screen with an explicit id
    pub fn with_id(id: impl Into<ScreenId>, title: impl Into<String>, content: ContentFragment) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content,
            controls: Vec::new(),
            handlers: HashMap::new(),
            parent: None,
            allow_back_navigation: true,
            back_button_text: None,
            is_main_screen: false,
        }
    }

    /// Screen id (immutable)
    #[must_use]
    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    /// Set the parent screen
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<ScreenId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append a control
    #[must_use]
    pub fn with_control(mut self, control: impl Into<UiControl>) -> Self {
        self.controls.push(control.into());
        self
    }

    /// Disable the synthetic back button
    #[must_use]
    pub fn without_back_navigation(mut self) -> Self {
        self.allow_back_navigation = false;
        self
    }

    /// Set the back button caption
    #[must_use]
    pub fn with_back_button_text(mut self, text: impl Into<String>) -> Self {
        self.back_button_text = Some(text.into());
        self
    }

    /// Wrap into the shared form stored by the registry
    #[must_use]
    pub fn into_shared(self) -> SharedScreen {
        Arc::new(RwLock::new(self))
    }

    /// Append a control, returning its id
    pub fn add_control(&mut self, control: impl Into<UiControl>) -> ControlId {
        let control = control.into();
        let id = control.id.clone();
        self.controls.push(control);
        id
    }

    /// Find a control by id
    #[must_use]
    pub fn control(&self, id: &ControlId) -> Option<&UiControl> {
        self.controls.iter().find(|c| &c.id == id)
    }

    /// Find a control by id, mutably
    pub fn control_mut(&mut self, id: &ControlId) -> Option<&mut UiControl> {
        self.controls.iter_mut().find(|c| &c.id == id)
    }

    /// Replace the primary content
    pub fn set_content(&mut self, content: ContentFragment) {
        self.content = content;
    }

    /// Set or clear the parent screen
    pub fn set_parent(&mut self, parent: Option<ScreenId>) {
        self.parent = parent;
    }

    /// Register a callback handler from an async closure
    pub fn on_callback<F, Fut>(&mut self, token: impl Into<String>, handler: F)
    where
        F: Fn(String, HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.handlers.insert(token.into(), Arc::new(handler));
    }

    /// Register a text-input handler for named state `state`
    pub fn on_text_input<F, Fut>(&mut self, state: &str, handler: F)
    where
        F: Fn(String, HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.handlers.insert(text_input_key(state), Arc::new(handler));
    }

    /// Register any `EventHandler` under a raw key
    pub fn set_handler(&mut self, key: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(key.into(), handler);
    }

    /// Remove a handler; returns true if one was registered
    pub fn remove_handler(&mut self, key: &str) -> bool {
        self.handlers.remove(key).is_some()
    }

    /// Look up a handler by exact key
    #[must_use]
    pub fn handler(&self, key: &str) -> Option<SharedHandler> {
        self.handlers.get(key).cloned()
    }

    /// Whether a handler exists for `key`
    #[must_use]
    pub fn has_handler(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Offer a callback token to the controls in order
    ///
    /// Returns true if one of them consumed it and changed state.
    pub fn apply_to_controls(&mut self, token: &str) -> bool {
        self.controls.iter_mut().any(|control| control.apply(token))
    }

    /// Named state armed by the first text-input control, if any
    #[must_use]
    pub fn input_state(&self) -> Option<String> {
        self.controls
            .iter()
            .find_map(UiControl::input_state)
            .map(str::to_string)
    }
}
