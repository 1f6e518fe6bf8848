use serde::{Deserialize, Serialize};

use crate::content::{Button, ContentFragment};

/// On/off switch rendered as a single button
///
/// The button sends `callback_base` verbatim. The toggle flips before any
/// handler registered under the same key runs, so that handler sees the new
/// state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    /// Current state
    pub state: bool,
    /// Callback token sent on press
    pub callback_base: String,
    /// Caption when on
    pub on_text: String,
    /// Caption when off
    pub off_text: String,
}

impl Toggle {
    /// Create a toggle with the given initial state and captions
    pub fn new(
        callback_base: impl Into<String>,
        state: bool,
        on_text: impl Into<String>,
        off_text: impl Into<String>,
    ) -> Self {
        Self {
            state,
            callback_base: callback_base.into(),
            on_text: on_text.into(),
            off_text: off_text.into(),
        }
    }

    /// Caption for the current state
    #[must_use]
    pub fn caption(&self) -> &str {
        if self.state {
            &self.on_text
        } else {
            &self.off_text
        }
    }

    pub(super) fn render(&self) -> ContentFragment {
        ContentFragment::default().with_button(Button::callback(self.caption(), &self.callback_base))
    }

    pub(super) fn apply(&mut self, token: &str) -> bool {
        if token != self.callback_base {
            return false;
        }
        self.state = !self.state;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_caption_follows_state() {
        let mut toggle = Toggle::new("notify", false, "🔔 On", "🔕 Off");
        assert_eq!(toggle.render().buttons[0].text, "🔕 Off");

        assert!(toggle.apply("notify"));
        assert!(toggle.state);
        assert_eq!(toggle.render().buttons[0].text, "🔔 On");
        assert_eq!(toggle.render().buttons[0].token(), Some("notify"));
    }

    #[test]
    fn test_toggle_ignores_foreign_token() {
        let mut toggle = Toggle::new("notify", true, "on", "off");
        assert!(!toggle.apply("notify:x"));
        assert!(toggle.state);
    }
}
