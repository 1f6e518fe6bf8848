use serde::{Deserialize, Serialize};

use crate::content::{Button, ContentFragment};
use crate::ids::ControlId;

/// Paged gallery of media items with parallel captions
///
/// Paging tokens are `carousel:<id>:prev`, `carousel:<id>:next` and
/// `carousel:<id>:noop` (the position indicator). Paging wraps around.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carousel {
    /// Media URLs in display order
    pub items: Vec<String>,
    /// Captions parallel to `items` (may be shorter)
    pub captions: Vec<String>,
    /// Index of the visible item
    pub index: usize,
}

impl Carousel {
    /// Create a carousel starting at the first item
    #[must_use]
    pub fn new(items: Vec<String>, captions: Vec<String>) -> Self {
        Self {
            items,
            captions,
            index: 0,
        }
    }

    /// Currently visible media URL
    #[must_use]
    pub fn current_item(&self) -> Option<&str> {
        self.items.get(self.index).map(String::as_str)
    }

    /// Caption of the visible item (empty when missing)
    #[must_use]
    pub fn current_caption(&self) -> &str {
        self.captions.get(self.index).map_or("", String::as_str)
    }

    /// Move to the next item, wrapping
    pub fn next_item(&mut self) {
        let len = self.items.len();
        if len > 0 {
            self.index = (self.index.min(len - 1) + 1) % len;
        }
    }

    /// Move to the previous item, wrapping
    pub fn prev_item(&mut self) {
        let len = self.items.len();
        if len > 0 {
            self.index = self.index.min(len - 1).checked_sub(1).unwrap_or(len - 1);
        }
    }

    fn token(id: &ControlId, action: &str) -> String {
        format!("carousel:{id}:{action}")
    }

    pub(super) fn render(&self, id: &ControlId) -> ContentFragment {
        let mut fragment = ContentFragment::text(self.current_caption());
        fragment.image = self.current_item().map(str::to_string);

        if self.items.len() > 1 {
            fragment.buttons = vec![
                Button::callback("◀", Self::token(id, "prev")),
                Button::callback(
                    format!("{}/{}", self.index + 1, self.items.len()),
                    Self::token(id, "noop"),
                ),
                Button::callback("▶", Self::token(id, "next")),
            ];
        }
        fragment
    }

    pub(super) fn apply(&mut self, id: &ControlId, token: &str) -> bool {
        let Some(action) = token
            .strip_prefix("carousel:")
            .and_then(|rest| rest.strip_prefix(id.as_str()))
            .and_then(|rest| rest.strip_prefix(':'))
        else {
            return false;
        };

        match action {
            "next" => {
                self.next_item();
                true
            }
            "prev" => {
                self.prev_item();
                true
            }
            _ => false,
        }
    }
}
