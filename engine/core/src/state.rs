//! Per-Chat State
//!
//! `StateMachine` is a keyed value store per chat, plus a dedicated slot for
//! the chat's current screen. The reserved key `"state"` holds the chat's
//! named workflow state, which routes free-text input to a screen handler.
//!
//! # Typing
//!
//! Values are stored type-erased. `get_state::<T>` returns the caller's
//! default when the key is absent *or* holds a value of another type; it never
//! panics.
//!
//! # Thread Safety
//!
//! Both maps are `DashMap`s keyed by chat id. Operations touch a single chat
//! and never depend on another chat's entries.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::ids::{ChatId, ScreenId};

/// Reserved key for the named workflow state
pub const STATE_KEY: &str = "state";

type StoredValue = Arc<dyn Any + Send + Sync>;

/// Per-chat key/value store with a current-screen slot
#[derive(Default)]
pub struct StateMachine {
    /// Generic per-chat values
    values: DashMap<ChatId, HashMap<String, StoredValue>>,
    /// Current screen per chat
    screens: DashMap<ChatId, ScreenId>,
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("chats", &self.values.len())
            .field("screens", &self.screens.len())
            .finish()
    }
}

impl StateMachine {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key` for `chat_id`
    pub fn set_state<T>(&self, chat_id: ChatId, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values
            .entry(chat_id)
            .or_default()
            .insert(key.into(), Arc::new(value));
    }

    /// Read a value, falling back to `default` when absent or of another type
    pub fn get_state<T>(&self, chat_id: ChatId, key: &str, default: T) -> T
    where
        T: Any + Clone,
    {
        self.get_state_opt(chat_id, key).unwrap_or(default)
    }

    /// Read a value if present and of type `T`
    #[must_use]
    pub fn get_state_opt<T>(&self, chat_id: ChatId, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        let chat = self.values.get(&chat_id)?;
        chat.get(key)?.downcast_ref::<T>().cloned()
    }

    /// Whether any value is stored under `key`
    #[must_use]
    pub fn has_state(&self, chat_id: ChatId, key: &str) -> bool {
        self.values
            .get(&chat_id)
            .is_some_and(|chat| chat.contains_key(key))
    }

    /// Remove one key; returns true if it existed
    pub fn remove_state(&self, chat_id: ChatId, key: &str) -> bool {
        self.values
            .get_mut(&chat_id)
            .is_some_and(|mut chat| chat.remove(key).is_some())
    }

    /// Drop every value stored for `chat_id`
    ///
    /// The current-screen slot is independent and left untouched.
    pub fn clear_state(&self, chat_id: ChatId) {
        if self.values.remove(&chat_id).is_some() {
            tracing::debug!(chat_id = %chat_id, "Chat state cleared");
        }
    }

    /// Set the named workflow state
    pub fn set_named_state(&self, chat_id: ChatId, name: impl Into<String>) {
        self.set_state(chat_id, STATE_KEY, name.into());
    }

    /// Current named workflow state
    #[must_use]
    pub fn named_state(&self, chat_id: ChatId) -> Option<String> {
        self.get_state_opt::<String>(chat_id, STATE_KEY)
    }

    /// Whether the chat's named state equals `name`
    #[must_use]
    pub fn is_in_state(&self, chat_id: ChatId, name: &str) -> bool {
        self.named_state(chat_id).as_deref() == Some(name)
    }

    /// Record the chat's current screen
    pub fn set_current_screen(&self, chat_id: ChatId, screen_id: ScreenId) {
        self.screens.insert(chat_id, screen_id);
    }

    /// The chat's current screen
    #[must_use]
    pub fn get_current_screen(&self, chat_id: ChatId) -> Option<ScreenId> {
        self.screens.get(&chat_id).map(|id| id.clone())
    }

    /// Number of chats with stored values
    #[must_use]
    pub fn chat_count(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Cart {
        items: Vec<String>,
    }

    #[test]
    fn test_default_for_unset_key() {
        let sm = StateMachine::new();
        assert_eq!(sm.get_state(ChatId(1), "count", 7_i32), 7);
        assert_eq!(sm.get_state_opt::<i32>(ChatId(1), "count"), None);
    }

    #[test]
    fn test_exact_value_after_set() {
        let sm = StateMachine::new();
        let cart = Cart {
            items: vec!["tea".into()],
        };
        sm.set_state(ChatId(1), "cart", cart.clone());
        sm.set_state(ChatId(1), "count", 3_u64);

        assert_eq!(
            sm.get_state(ChatId(1), "cart", Cart { items: vec![] }),
            cart
        );
        assert_eq!(sm.get_state(ChatId(1), "count", 0_u64), 3);
    }

    #[test]
    fn test_type_mismatch_returns_default() {
        let sm = StateMachine::new();
        sm.set_state(ChatId(1), "count", 3_u64);
        // Stored as u64, asked as i32
        assert_eq!(sm.get_state(ChatId(1), "count", -1_i32), -1);
    }

    #[test]
    fn test_clear_state_resets_all_keys() {
        let sm = StateMachine::new();
        sm.set_state(ChatId(1), "a", 1_i32);
        sm.set_state(ChatId(1), "b", "x".to_string());
        sm.set_named_state(ChatId(1), "awaiting_name");
        sm.set_state(ChatId(2), "a", 5_i32);

        sm.clear_state(ChatId(1));

        assert_eq!(sm.get_state(ChatId(1), "a", 0_i32), 0);
        assert_eq!(sm.get_state(ChatId(1), "b", String::new()), "");
        assert!(sm.named_state(ChatId(1)).is_none());
        // Other chats untouched
        assert_eq!(sm.get_state(ChatId(2), "a", 0_i32), 5);
    }

    #[test]
    fn test_remove_state() {
        let sm = StateMachine::new();
        sm.set_state(ChatId(1), "a", 1_i32);
        assert!(sm.has_state(ChatId(1), "a"));
        assert!(sm.remove_state(ChatId(1), "a"));
        assert!(!sm.remove_state(ChatId(1), "a"));
        assert!(!sm.has_state(ChatId(1), "a"));
    }

    #[test]
    fn test_named_state() {
        let sm = StateMachine::new();
        assert!(!sm.is_in_state(ChatId(1), "awaiting_name"));
        sm.set_named_state(ChatId(1), "awaiting_name");
        assert!(sm.is_in_state(ChatId(1), "awaiting_name"));
        assert!(!sm.is_in_state(ChatId(1), "other"));
        assert_eq!(
            sm.get_state(ChatId(1), STATE_KEY, String::new()),
            "awaiting_name"
        );
    }

    #[test]
    fn test_current_screen_slot_independent() {
        let sm = StateMachine::new();
        sm.set_current_screen(ChatId(1), ScreenId::new("main"));
        sm.clear_state(ChatId(1));
        assert_eq!(sm.get_current_screen(ChatId(1)), Some(ScreenId::new("main")));
        assert_eq!(sm.get_current_screen(ChatId(2)), None);
    }
}
