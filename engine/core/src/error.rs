//! Error Types
//!
//! Errors surfaced by the engine. Most failures inside event routing are
//! logged and swallowed; these types cover what does reach callers: failed
//! renders, registry misses on explicit lookups and configuration problems.

use std::path::PathBuf;

use thiserror::Error;

use crate::ids::{ChatId, MessageId, ScreenId};

/// Failure reported by a `DeliveryClient`
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The platform refused the request (bad markup, blocked bot, ...)
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The target message no longer exists
    #[error("message {message_id} not found in chat {chat_id}")]
    NotFound {
        /// Chat that was addressed
        chat_id: ChatId,
        /// Missing message
        message_id: MessageId,
    },

    /// Network or transport failure
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config {path:?}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `EngineConfig`
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// Engine-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// No screen is registered under this id
    #[error("unknown screen: {0}")]
    UnknownScreen(ScreenId),

    /// No main screen has been set
    #[error("no main screen registered")]
    NoMainScreen,

    /// The delivery client failed to send a rendered screen
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dispatcher is shutting down and accepts no more events
    #[error("dispatcher is shutting down")]
    ShuttingDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::NotFound {
            chat_id: ChatId(7),
            message_id: MessageId(3),
        };
        assert_eq!(err.to_string(), "message 3 not found in chat 7");
    }

    #[test]
    fn test_engine_error_from_delivery() {
        let err: EngineError = DeliveryError::Transport("timeout".into()).into();
        assert!(matches!(err, EngineError::Delivery(_)));
        assert_eq!(err.to_string(), "transport failure: timeout");
    }
}
