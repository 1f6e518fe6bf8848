//! Engine Configuration
//!
//! Settings that shape rendering and routing but not application semantics:
//! the back button caption, the start command, default layout and the
//! dispatcher's per-chat queue size.
//!
//! # Sources
//!
//! Configuration is layered. Defaults are overridden by a TOML file (if one
//! exists), which is in turn overridden by environment variables:
//!
//! - `CHATSCREEN_BACK_TEXT`: back button caption
//! - `CHATSCREEN_START_COMMAND`: command that resets a chat (default `/start`)
//! - `CHATSCREEN_BUTTONS_PER_ROW`: default buttons per row for new screens
//! - `CHATSCREEN_CHAT_QUEUE`: per-chat event queue capacity
//! - `CHATSCREEN_BOLD_TITLES`: `0`/`false` to render titles without bold
//!
//! The default file is `$XDG_CONFIG_HOME/chatscreen/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Caption of the synthetic back button
    pub back_button_text: String,
    /// Command that resets a chat to the main screen
    pub start_command: String,
    /// Buttons per row applied to screens created by the engine's helpers
    pub default_buttons_per_row: usize,
    /// Capacity of each chat's event queue in `UpdateDispatcher`
    pub chat_queue_capacity: usize,
    /// Whether screen titles are rendered bold (markdown only)
    pub bold_titles: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            back_button_text: "⬅️ Back".to_string(),
            start_command: "/start".to_string(),
            default_buttons_per_row: 1,
            chat_queue_capacity: 32,
            bold_titles: true,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of `self`
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(text) = var("CHATSCREEN_BACK_TEXT") {
            self.back_button_text = text;
        }
        if let Some(command) = var("CHATSCREEN_START_COMMAND") {
            self.start_command = command;
        }
        if let Some(per_row) = var("CHATSCREEN_BUTTONS_PER_ROW").and_then(|v| v.parse().ok()) {
            self.default_buttons_per_row = usize::max(per_row, 1);
        }
        if let Some(capacity) = var("CHATSCREEN_CHAT_QUEUE").and_then(|v| v.parse().ok()) {
            self.chat_queue_capacity = usize::max(capacity, 1);
        }
        if let Some(bold) = var("CHATSCREEN_BOLD_TITLES") {
            self.bold_titles = bold != "0" && bold.to_lowercase() != "false";
        }
        self
    }

    /// Whether `text` invokes the start command
    ///
    /// Accepts `/start`, `/start@botname` and `/start <payload>`.
    #[must_use]
    pub fn is_start_command(&self, text: &str) -> bool {
        let Some(first) = text.split_whitespace().next() else {
            return false;
        };
        let command = first.split('@').next().unwrap_or(first);
        command == self.start_command
    }
}

/// Default config file location
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatscreen").join("config.toml"))
}

/// Parse a config file (no environment overrides)
pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration: explicit file or default file (if present), then env
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let file_config = match path {
        Some(path) => Some(load_config_from_path(path)?),
        None => match default_config_path() {
            Some(default) if default.exists() => Some(load_config_from_path(&default)?),
            _ => None,
        },
    };

    let config = file_config.unwrap_or_default().with_env_overrides();
    tracing::debug!(?config, "Engine configuration loaded");
    Ok(config)
}
