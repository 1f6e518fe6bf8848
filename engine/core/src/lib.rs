//! Chatscreen Core - Screens, Navigation and Event Routing for Chat Bots
//!
//! This crate turns a chat platform's "send a message with buttons" primitive
//! into navigable screens. Application code declares screens (title, content,
//! controls, handlers, parent); the engine renders them into outbound
//! messages, keeps exactly one live screen message per chat and routes button
//! presses and free text back to the right handler.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Chat platform adapter                        │
//! │        inbound updates                 outbound requests         │
//! │   (TextMessageEvent / CallbackEvent)  (send / delete / answer)   │
//! └───────────────┬───────────────────────────────▲──────────────────┘
//!                 │                               │
//! ┌───────────────┼───────────────────────────────┼──────────────────┐
//! │               ▼          CHATSCREEN CORE      │                  │
//! │  ┌─────────────────────┐                      │                  │
//! │  │  UpdateDispatcher   │  one worker per chat │                  │
//! │  └──────────┬──────────┘                      │                  │
//! │             ▼                                 │                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                     ScreenManager                         │   │
//! │  │  ┌──────────┐  ┌────────────┐  ┌──────────┐  ┌─────────┐ │   │
//! │  │  │ Registry │  │ Navigation │  │  State   │  │ Routing │ │   │
//! │  │  │ (Screen) │  │   State    │  │ Machine  │  │         │ │   │
//! │  │  └──────────┘  └────────────┘  └──────────┘  └─────────┘ │   │
//! │  └──────────────────────────────────┬───────────────────────┘   │
//! │                                     ▼                           │
//! │                            DeliveryClient                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ScreenManager`]: registry, navigation and event router
//! - [`Screen`]: title, content, controls, handlers and back policy
//! - [`UiControl`]: closed set of interactive widgets
//! - [`StateMachine`]: per-chat key/value store and named state
//! - [`DeliveryClient`]: outbound send/delete/answer abstraction
//! - [`UpdateDispatcher`]: per-chat sequential processing
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatscreen_core::{
//!     Button, ChatId, ContentFragment, EngineConfig, MemoryDelivery, Screen, ScreenManager,
//!     Toggle,
//! };
//!
//! let delivery = Arc::new(MemoryDelivery::new());
//! let manager = ScreenManager::new(delivery, EngineConfig::from_env());
//!
//! let settings = Screen::with_id("settings", "Settings", ContentFragment::text("Options"))
//!     .with_parent("main")
//!     .with_control(Toggle::new("notify", true, "🔔 On", "🔕 Off"));
//! manager.register_screen(settings, false);
//!
//! let main = Screen::with_id(
//!     "main",
//!     "Menu",
//!     ContentFragment::text("Hello").with_button(Button::callback("Settings", "screen:settings")),
//! );
//! manager.register_screen(main, true);
//!
//! manager.navigate_to_main_screen(ChatId(42)).await?;
//! ```
//!
//! # Module Overview
//!
//! - [`ids`]: chat, user, message and screen identifiers
//! - [`content`]: content fragments, buttons and layout
//! - [`controls`]: the `UiControl` variants
//! - [`screen`]: screens and their handler tables
//! - [`routing`]: the callback token grammar
//! - [`state`]: per-chat state store
//! - [`manager`]: `ScreenManager`
//! - [`dispatcher`]: per-chat event ordering
//! - [`delivery`]: outbound client trait and in-memory recorder
//! - [`events`]: inbound events and handler context
//! - [`handler`]: the `EventHandler` trait
//! - [`config`]: engine configuration
//! - [`error`]: error types
//!
//! # No Platform Dependencies
//!
//! The core never talks to a network. Platform adapters implement
//! `DeliveryClient` and convert their updates into `InboundEvent`s.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod content;
pub mod controls;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handler;
pub mod ids;
pub mod manager;
pub mod routing;
pub mod screen;
pub mod state;

// Re-exports for convenience
pub use config::{default_config_path, load_config, load_config_from_path, EngineConfig};
pub use content::{layout_buttons, Button, ButtonAction, ButtonGrid, ContentFragment, OutboundMessage};
pub use controls::{
    Accordion, AccordionSection, ButtonGroup, Carousel, ControlKind, ControlStyle, ProgressBar,
    Rating, RichText, TextInput, Toggle, UiControl, MAX_RATING,
};
pub use delivery::{DeliveryClient, DeliveryRecord, MemoryDelivery};
pub use dispatcher::{UpdateDispatcher, WorkerStats};
pub use error::{ConfigError, DeliveryError, EngineError};
pub use events::{CallbackEvent, HandlerContext, InboundEvent, Sender, TextMessageEvent};
pub use handler::{EventHandler, SharedHandler};
pub use ids::{CallbackId, ChatId, ControlId, MessageId, ScreenId, UserId};
pub use manager::{CallbackOutcome, NavigationState, ScreenManager, TextOutcome};
pub use routing::{classify, navigate_token, Route, BACK_TOKEN, NAVIGATE_PREFIX};
pub use screen::{text_input_key, Screen, SharedScreen, TEXT_INPUT_PREFIX};
pub use state::{StateMachine, STATE_KEY};
