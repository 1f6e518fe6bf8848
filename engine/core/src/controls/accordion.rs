use serde::{Deserialize, Serialize};

use crate::content::{Button, ContentFragment};
use crate::ids::ControlId;

/// A titled section of an accordion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccordionSection {
    /// Section heading
    pub title: String,
    /// Section body, shown only while expanded
    pub body: String,
}

/// List of sections with at most one expanded
///
/// Each section gets a button with token `accordion:<id>:<index>`; pressing
/// the expanded section collapses it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accordion {
    /// Sections in display order
    pub sections: Vec<AccordionSection>,
    /// Index of the expanded section
    pub expanded: Option<usize>,
}

impl Accordion {
    /// Create a fully collapsed accordion
    #[must_use]
    pub fn new(sections: Vec<(String, String)>) -> Self {
        Self {
            sections: sections
                .into_iter()
                .map(|(title, body)| AccordionSection { title, body })
                .collect(),
            expanded: None,
        }
    }

    pub(super) fn render(&self, id: &ControlId) -> ContentFragment {
        let mut lines = Vec::with_capacity(self.sections.len() * 2);
        let mut buttons = Vec::with_capacity(self.sections.len());

        for (index, section) in self.sections.iter().enumerate() {
            let open = self.expanded == Some(index);
            let marker = if open { "▼" } else { "▶" };
            lines.push(format!("{marker} {}", section.title));
            if open {
                lines.push(section.body.clone());
            }
            buttons.push(Button::callback(
                format!("{marker} {}", section.title),
                format!("accordion:{id}:{index}"),
            ));
        }

        ContentFragment::text(lines.join("\n")).with_buttons(buttons)
    }

    pub(super) fn apply(&mut self, id: &ControlId, token: &str) -> bool {
        let Some(index) = token
            .strip_prefix("accordion:")
            .and_then(|rest| rest.strip_prefix(id.as_str()))
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(|rest| rest.parse::<usize>().ok())
        else {
            return false;
        };

        if index >= self.sections.len() {
            return false;
        }
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn faq() -> Accordion {
        Accordion::new(vec![
            ("Pricing".into(), "Free".into()),
            ("Support".into(), "Email us".into()),
        ])
    }

    #[test]
    fn test_collapsed_render() {
        let id = ControlId::generate();
        let fragment = faq().render(&id);
        assert_eq!(fragment.text, "▶ Pricing\n▶ Support");
        assert_eq!(fragment.buttons.len(), 2);
        assert_eq!(
            fragment.buttons[1].token(),
            Some(format!("accordion:{id}:1").as_str())
        );
    }

    #[test]
    fn test_expand_and_collapse() {
        let id = ControlId::generate();
        let mut accordion = faq();

        assert!(accordion.apply(&id, &format!("accordion:{id}:1")));
        assert_eq!(accordion.render(&id).text, "▶ Pricing\n▼ Support\nEmail us");

        assert!(accordion.apply(&id, &format!("accordion:{id}:1")));
        assert_eq!(accordion.expanded, None);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let id = ControlId::generate();
        let mut accordion = faq();
        assert!(!accordion.apply(&id, &format!("accordion:{id}:9")));
        assert!(!accordion.apply(&id, &format!("accordion:{id}:x")));
    }
}
