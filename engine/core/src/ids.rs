//! Identifiers
//!
//! Newtype identifiers for chats, users, rendered messages, screens and
//! controls. Chat-side ids come from the remote platform and are numeric;
//! screen and control ids are short generated strings.

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated screen and control identifiers
pub const SHORT_ID_LEN: usize = 7;

/// Generate a short lowercase alphanumeric identifier
fn short_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Chat identifier assigned by the remote chat platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier assigned by the remote chat platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message inside a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an inbound callback query (used for acknowledgment)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(pub String);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Screen identifier
///
/// Unique within one `ScreenManager` registry. Either generated at screen
/// creation or chosen by the application (e.g. `"main"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(String);

impl ScreenId {
    /// Create a screen id from an explicit value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh short screen id
    #[must_use]
    pub fn generate() -> Self {
        Self(short_id())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScreenId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ScreenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Control identifier, generated once per control instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId(String);

impl ControlId {
    /// Generate a fresh short control id
    #[must_use]
    pub fn generate() -> Self {
        Self(short_id())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ControlId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_short() {
        let id = ScreenId::generate();
        assert_eq!(id.as_str().len(), SHORT_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));

        let control = ControlId::generate();
        assert!(control.as_str().len() <= SHORT_ID_LEN);
    }

    #[test]
    fn test_generated_ids_unique() {
        let ids: std::collections::HashSet<_> = (0..200).map(|_| ControlId::generate()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_screen_id_display() {
        assert_eq!(ScreenId::new("main").to_string(), "main");
        assert_eq!(ChatId(42).to_string(), "42");
    }
}
