use serde::{Deserialize, Serialize};

use crate::content::{Button, ContentFragment};

/// Group of buttons with its own row hint
///
/// The hint survives on the rendered fragment but screen composition lays all
/// buttons out with the screen's own `buttons_per_row`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonGroup {
    /// Buttons in order
    pub buttons: Vec<Button>,
    /// Preferred buttons per row
    pub buttons_per_row: usize,
}

impl ButtonGroup {
    /// Create a group laid out one button per row
    #[must_use]
    pub fn new(buttons: Vec<Button>) -> Self {
        Self {
            buttons,
            buttons_per_row: 1,
        }
    }

    /// Set the row hint
    #[must_use]
    pub fn with_buttons_per_row(mut self, per_row: usize) -> Self {
        self.buttons_per_row = per_row.max(1);
        self
    }

    pub(super) fn render(&self) -> ContentFragment {
        ContentFragment::default()
            .with_buttons(self.buttons.clone())
            .with_buttons_per_row(self.buttons_per_row)
    }
}
