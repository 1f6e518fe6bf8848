//! Content Fragments
//!
//! The renderable unit shared by screens and controls: a text body, a markdown
//! flag, an ordered list of buttons and an optional image. Controls render into
//! fragments, screens compose fragments into one `OutboundMessage`.
//!
//! # Buttons
//!
//! A button carries exactly one action: either a callback token routed back to
//! the engine, or an external link opened by the chat client. `ButtonAction`
//! makes "both" and "neither" unrepresentable.

use serde::{Deserialize, Serialize};

/// What pressing a button does
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    /// Send this callback token back to the bot
    Callback(String),
    /// Open an external URL
    Url(String),
}

/// An interactive button
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Display text
    pub text: String,
    /// Action on press
    pub action: ButtonAction,
}

impl Button {
    /// Button that sends a callback token
    pub fn callback(text: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(token.into()),
        }
    }

    /// Button that opens an external link
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    /// Callback token, if this is a callback button
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match &self.action {
            ButtonAction::Callback(token) => Some(token),
            ButtonAction::Url(_) => None,
        }
    }
}

/// Rows of buttons as delivered to the chat client
pub type ButtonGrid = Vec<Vec<Button>>;

/// Lay buttons out row-major, `per_row` buttons per row
///
/// The last row may be short. A `per_row` of zero is treated as one.
#[must_use]
pub fn layout_buttons(buttons: Vec<Button>, per_row: usize) -> ButtonGrid {
    let per_row = per_row.max(1);
    let mut grid: ButtonGrid = Vec::with_capacity(buttons.len().div_ceil(per_row));
    for button in buttons {
        match grid.last_mut() {
            Some(row) if row.len() < per_row => row.push(button),
            _ => grid.push(vec![button]),
        }
    }
    grid
}

/// A renderable fragment: text, buttons and an optional image
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFragment {
    /// Body text
    pub text: String,
    /// Whether `text` should be parsed as markdown by the client
    pub markdown: bool,
    /// Ordered buttons
    pub buttons: Vec<Button>,
    /// Buttons per row when laid out (always >= 1)
    buttons_per_row: usize,
    /// Optional image reference (URL or platform file id)
    pub image: Option<String>,
}

impl Default for ContentFragment {
    fn default() -> Self {
        Self {
            text: String::new(),
            markdown: false,
            buttons: Vec::new(),
            buttons_per_row: 1,
            image: None,
        }
    }
}

impl ContentFragment {
    /// Plain text fragment
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Markdown fragment
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
            ..Default::default()
        }
    }

    /// Set whether the text is markdown
    #[must_use]
    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Append a button
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    /// Replace the button list
    #[must_use]
    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = buttons;
        self
    }

    /// Set buttons per row (clamped to at least one)
    #[must_use]
    pub fn with_buttons_per_row(mut self, per_row: usize) -> Self {
        self.set_buttons_per_row(per_row);
        self
    }

    /// Attach an image
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Buttons per row used at layout time
    #[must_use]
    pub fn buttons_per_row(&self) -> usize {
        self.buttons_per_row
    }

    /// Set buttons per row (clamped to at least one)
    pub fn set_buttons_per_row(&mut self, per_row: usize) {
        self.buttons_per_row = per_row.max(1);
    }

    /// Whether the fragment carries no text, buttons or image
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.buttons.is_empty() && self.image.is_none()
    }
}

/// A fully composed message ready for the delivery client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Final text (title prefix included)
    pub text: String,
    /// Markdown parse flag
    pub markdown: bool,
    /// Button grid
    pub keyboard: ButtonGrid,
    /// Optional image reference
    pub image: Option<String>,
}

impl OutboundMessage {
    /// All buttons in row-major order
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.keyboard.iter().flatten()
    }

    /// Callback tokens in row-major order (links are skipped)
    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        self.buttons().filter_map(Button::token).collect()
    }
}
