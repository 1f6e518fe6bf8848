use serde::{Deserialize, Serialize};

use crate::content::ContentFragment;

/// Static block of text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    /// Text body
    pub text: String,
    /// Whether the body is markdown
    pub markdown: bool,
}

impl RichText {
    /// Plain text block
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    /// Markdown text block
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }

    pub(super) fn render(&self) -> ContentFragment {
        ContentFragment::text(self.text.clone()).with_markdown(self.markdown)
    }
}

/// Free-text prompt
///
/// Entering a screen that holds a text input sets the chat's named state to
/// `state_name`; the next plain message is routed to the screen handler
/// registered under `text_input:<state_name>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInput {
    /// Prompt shown to the user
    pub prompt: String,
    /// Named state armed while the prompt is visible
    pub state_name: String,
    /// Hint about the expected input
    pub placeholder: Option<String>,
}

impl TextInput {
    /// Create a prompt bound to a named state
    pub fn new(prompt: impl Into<String>, state_name: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            state_name: state_name.into(),
            placeholder: None,
        }
    }

    /// Set the placeholder hint
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub(super) fn render(&self) -> ContentFragment {
        match &self.placeholder {
            Some(hint) => ContentFragment::text(format!("{}\n({hint})", self.prompt)),
            None => ContentFragment::text(self.prompt.clone()),
        }
    }
}
