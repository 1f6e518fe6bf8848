use serde::{Deserialize, Serialize};

use crate::content::{Button, ContentFragment};

/// Highest rating value
pub const MAX_RATING: u8 = 5;

/// Star rating, value always within `0..=MAX_RATING`
///
/// Buttons `1`..`5` send `<callback_prefix>:<n>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    value: u8,
    /// Prefix for the star buttons' callback tokens
    pub callback_prefix: String,
}

impl Rating {
    /// Create a rating, clamping the value
    pub fn new(value: u8, callback_prefix: impl Into<String>) -> Self {
        Self {
            value: value.min(MAX_RATING),
            callback_prefix: callback_prefix.into(),
        }
    }

    /// Current value
    #[must_use]
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Set the value, clamping to `MAX_RATING`
    pub fn set_value(&mut self, value: u8) {
        self.value = value.min(MAX_RATING);
    }

    /// Parse `<prefix>:<n>` into a star count
    #[must_use]
    pub fn parse_token(&self, token: &str) -> Option<u8> {
        token
            .strip_prefix(self.callback_prefix.as_str())?
            .strip_prefix(':')?
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=MAX_RATING).contains(n))
    }

    pub(super) fn render(&self) -> ContentFragment {
        let stars: String = (1..=MAX_RATING)
            .map(|n| if n <= self.value { '★' } else { '☆' })
            .collect();
        let buttons = (1..=MAX_RATING)
            .map(|n| Button::callback(n.to_string(), format!("{}:{n}", self.callback_prefix)))
            .collect();
        ContentFragment::text(stars)
            .with_buttons(buttons)
            .with_buttons_per_row(usize::from(MAX_RATING))
    }

    pub(super) fn apply(&mut self, token: &str) -> bool {
        match self.parse_token(token) {
            Some(n) if n != self.value => {
                self.value = n;
                true
            }
            _ => false,
        }
    }
}
