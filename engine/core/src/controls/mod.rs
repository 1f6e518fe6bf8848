//! UI Controls
//!
//! Self-rendering UI primitives owned by a `Screen`. A control is a closed
//! tagged union: common fields (`id`, `style`) plus one `ControlKind` variant.
//! Rendering dispatches by `match`; new kinds are added by extending the enum.
//!
//! # Rendering
//!
//! `UiControl::render` is a pure function of the control's fields and produces
//! a `ContentFragment`. The screen composer merges fragments in control order.
//!
//! # Interaction
//!
//! Some controls own callback tokens (carousel paging, accordion sections,
//! toggles, ratings). `UiControl::apply` lets the control consume such a token
//! and update its own state; the router offers every application token to the
//! controls before running the screen handler registered under it.

mod accordion;
mod buttons;
mod carousel;
mod progress;
mod rating;
mod text;
mod toggle;

use serde::{Deserialize, Serialize};

use crate::content::{Button, ContentFragment};
use crate::ids::ControlId;

pub use accordion::{Accordion, AccordionSection};
pub use buttons::ButtonGroup;
pub use carousel::Carousel;
pub use progress::ProgressBar;
pub use rating::{Rating, MAX_RATING};
pub use text::{RichText, TextInput};
pub use toggle::Toggle;

/// Cosmetic style hint (no behavioural effect)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlStyle {
    /// No particular emphasis
    #[default]
    Default,
    /// Main action
    Primary,
    /// Secondary action
    Secondary,
    /// Positive outcome
    Success,
    /// Destructive action
    Danger,
}

/// Variant-specific control data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ControlKind {
    /// On/off switch
    Toggle(Toggle),
    /// Paged image gallery
    Carousel(Carousel),
    /// Progress indicator
    ProgressBar(ProgressBar),
    /// Expandable sections
    Accordion(Accordion),
    /// Static text block
    RichText(RichText),
    /// Zero to five stars
    Rating(Rating),
    /// Single plain button
    Button(Button),
    /// Several buttons
    ButtonGroup(ButtonGroup),
    /// Free-text prompt bound to a named state
    TextInput(TextInput),
}

/// A UI control: common fields plus variant data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiControl {
    /// Stable per-instance identifier
    pub id: ControlId,
    /// Cosmetic style
    pub style: ControlStyle,
    /// Variant data
    pub kind: ControlKind,
}

impl UiControl {
    /// Wrap variant data in a control with a fresh id
    #[must_use]
    pub fn new(kind: ControlKind) -> Self {
        Self {
            id: ControlId::generate(),
            style: ControlStyle::Default,
            kind,
        }
    }

    /// Set the style
    #[must_use]
    pub fn with_style(mut self, style: ControlStyle) -> Self {
        self.style = style;
        self
    }

    /// Render the control into a content fragment
    #[must_use]
    pub fn render(&self) -> ContentFragment {
        match &self.kind {
            ControlKind::Toggle(toggle) => toggle.render(),
            ControlKind::Carousel(carousel) => carousel.render(&self.id),
            ControlKind::ProgressBar(bar) => bar.render(),
            ControlKind::Accordion(accordion) => accordion.render(&self.id),
            ControlKind::RichText(text) => text.render(),
            ControlKind::Rating(rating) => rating.render(),
            ControlKind::Button(button) => ContentFragment::default().with_button(button.clone()),
            ControlKind::ButtonGroup(group) => group.render(),
            ControlKind::TextInput(input) => input.render(),
        }
    }

    /// Offer a callback token to the control
    ///
    /// Returns true if the control owns the token and its state changed
    /// (the screen should be re-rendered).
    pub fn apply(&mut self, token: &str) -> bool {
        match &mut self.kind {
            ControlKind::Toggle(toggle) => toggle.apply(token),
            ControlKind::Carousel(carousel) => carousel.apply(&self.id, token),
            ControlKind::Accordion(accordion) => accordion.apply(&self.id, token),
            ControlKind::Rating(rating) => rating.apply(token),
            ControlKind::ProgressBar(_)
            | ControlKind::RichText(_)
            | ControlKind::Button(_)
            | ControlKind::ButtonGroup(_)
            | ControlKind::TextInput(_) => false,
        }
    }

    /// Named state armed by this control when its screen is entered
    #[must_use]
    pub fn input_state(&self) -> Option<&str> {
        match &self.kind {
            ControlKind::TextInput(input) => Some(&input.state_name),
            _ => None,
        }
    }

    /// Short name of the variant (for logs)
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ControlKind::Toggle(_) => "toggle",
            ControlKind::Carousel(_) => "carousel",
            ControlKind::ProgressBar(_) => "progress_bar",
            ControlKind::Accordion(_) => "accordion",
            ControlKind::RichText(_) => "rich_text",
            ControlKind::Rating(_) => "rating",
            ControlKind::Button(_) => "button",
            ControlKind::ButtonGroup(_) => "button_group",
            ControlKind::TextInput(_) => "text_input",
        }
    }

    /// Borrow the toggle data, if this is a toggle
    #[must_use]
    pub fn as_toggle(&self) -> Option<&Toggle> {
        match &self.kind {
            ControlKind::Toggle(toggle) => Some(toggle),
            _ => None,
        }
    }

    /// Mutably borrow the toggle data, if this is a toggle
    pub fn as_toggle_mut(&mut self) -> Option<&mut Toggle> {
        match &mut self.kind {
            ControlKind::Toggle(toggle) => Some(toggle),
            _ => None,
        }
    }

    /// Borrow the rating data, if this is a rating
    #[must_use]
    pub fn as_rating(&self) -> Option<&Rating> {
        match &self.kind {
            ControlKind::Rating(rating) => Some(rating),
            _ => None,
        }
    }

    /// Mutably borrow the rating data, if this is a rating
    pub fn as_rating_mut(&mut self) -> Option<&mut Rating> {
        match &mut self.kind {
            ControlKind::Rating(rating) => Some(rating),
            _ => None,
        }
    }

    /// Mutably borrow the progress bar data, if this is a progress bar
    pub fn as_progress_mut(&mut self) -> Option<&mut ProgressBar> {
        match &mut self.kind {
            ControlKind::ProgressBar(bar) => Some(bar),
            _ => None,
        }
    }

    /// Borrow the carousel data, if this is a carousel
    #[must_use]
    pub fn as_carousel(&self) -> Option<&Carousel> {
        match &self.kind {
            ControlKind::Carousel(carousel) => Some(carousel),
            _ => None,
        }
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for UiControl {
                fn from(value: $ty) -> Self {
                    Self::new(ControlKind::$variant(value))
                }
            }
        )*
    };
}

impl_from_kind! {
    Toggle => Toggle,
    Carousel => Carousel,
    ProgressBar => ProgressBar,
    Accordion => Accordion,
    RichText => RichText,
    Rating => Rating,
    Button => Button,
    ButtonGroup => ButtonGroup,
    TextInput => TextInput,
}
