use serde::{Deserialize, Serialize};

use crate::content::ContentFragment;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Text progress bar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressBar {
    /// Current value (clamped to `max` when rendered)
    pub value: u32,
    /// Value that represents 100%
    pub max: u32,
    /// Number of cells in the bar
    pub width: usize,
    /// Optional label shown above the bar
    pub label: String,
}

impl ProgressBar {
    /// Create a bar of ten cells
    pub fn new(value: u32, max: u32, label: impl Into<String>) -> Self {
        Self {
            value,
            max,
            width: 10,
            label: label.into(),
        }
    }

    /// Set the number of cells
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    /// Completion percentage (0-100)
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.max == 0 {
            return 100;
        }
        let value = u64::from(self.value.min(self.max));
        u32::try_from(value * 100 / u64::from(self.max)).unwrap_or(100)
    }

    pub(super) fn render(&self) -> ContentFragment {
        let width = self.width.max(1);
        let percent = self.percent() as usize;
        let filled = (width * percent) / 100;
        let bar: String = std::iter::repeat(FILLED)
            .take(filled)
            .chain(std::iter::repeat(EMPTY).take(width - filled))
            .collect();

        let text = if self.label.is_empty() {
            format!("{bar} {percent}%")
        } else {
            format!("{}\n{bar} {percent}%", self.label)
        };
        ContentFragment::text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_half() {
        let bar = ProgressBar::new(5, 10, "Upload");
        assert_eq!(bar.render().text, "Upload\n█████░░░░░ 50%");
        assert!(bar.render().buttons.is_empty());
    }

    #[test]
    fn test_progress_clamps_overflow() {
        let bar = ProgressBar::new(30, 10, "").with_width(4);
        assert_eq!(bar.percent(), 100);
        assert_eq!(bar.render().text, "████ 100%");
    }

    #[test]
    fn test_progress_zero_max_is_complete() {
        assert_eq!(ProgressBar::new(0, 0, "").percent(), 100);
    }
}
