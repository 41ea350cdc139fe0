#![forbid(unsafe_code)]

//! Modal construction options.
//!
//! `ModalOptions` starts from [`Default`] (the stock "are you sure?" confirm
//! dialog) and is refined with builder methods, so caller input is merged
//! over the defaults without mutating either side. Options are immutable once
//! handed to [`Modal::open`](crate::Modal::open).

use std::time::Duration;

use modalkit_core::{ButtonSpec, KEY_ESCAPE, Markup};

/// Body content of a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalContent {
    /// Plain text, wrapped in a `<p>` element on insertion.
    Text(String),
    /// A pre-built fragment, inserted into the content slot as-is.
    Fragment(Markup),
}

/// How the mounted element is taken out of the document on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveMethod {
    /// Destroy the element and every handler bound inside it.
    #[default]
    Remove,
    /// Detach only, preserving the element and its bound handlers so the
    /// caller can append the contents to the document again later.
    Detach,
}

/// Options for a modal instance.
#[derive(Debug, Clone)]
pub struct ModalOptions {
    /// Title shown in the heading; `None` renders no heading.
    pub title: Option<String>,
    /// Body content.
    pub content: ModalContent,
    /// Action buttons, in rendering and shortcut-lookup order.
    pub buttons: Vec<ButtonSpec>,
    /// Whether a click on the overlay itself closes the modal.
    pub click_outside_to_close: bool,
    /// Event emitted on a click on the overlay itself.
    pub click_outside_event: String,
    /// Extra class applied to the modal panel.
    pub class_name: String,
    /// How the element is detached on close.
    pub remove_method: RemoveMethod,
    /// When `false`, every transition duration collapses to zero and the
    /// lifecycle becomes synchronous. Useful for deterministic tests.
    pub fx: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            title: Some("Are you sure?".to_owned()),
            content: ModalContent::Text("Please confirm this action.".to_owned()),
            buttons: vec![
                ButtonSpec::new("Cancel", "cancel").key_codes([KEY_ESCAPE]),
                ButtonSpec::new("Confirm", "confirm"),
            ],
            click_outside_to_close: true,
            click_outside_event: "cancel".to_owned(),
            class_name: String::new(),
            remove_method: RemoveMethod::Remove,
            fx: true,
        }
    }
}

impl ModalOptions {
    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render no heading.
    pub fn no_title(mut self) -> Self {
        self.title = None;
        self
    }

    /// Set plain-text content.
    pub fn content_text(mut self, text: impl Into<String>) -> Self {
        self.content = ModalContent::Text(text.into());
        self
    }

    /// Set pre-built fragment content.
    pub fn content_fragment(mut self, fragment: Markup) -> Self {
        self.content = ModalContent::Fragment(fragment);
        self
    }

    /// Replace the button list.
    pub fn buttons(mut self, buttons: Vec<ButtonSpec>) -> Self {
        self.buttons = buttons;
        self
    }

    /// Set whether an overlay click closes the modal.
    pub fn click_outside_to_close(mut self, close: bool) -> Self {
        self.click_outside_to_close = close;
        self
    }

    /// Set the event emitted on an overlay click.
    pub fn click_outside_event(mut self, event: impl Into<String>) -> Self {
        self.click_outside_event = event.into();
        self
    }

    /// Set the extra panel class.
    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.class_name = class.into();
        self
    }

    /// Set the removal method.
    pub fn remove_method(mut self, method: RemoveMethod) -> Self {
        self.remove_method = method;
        self
    }

    /// Enable or disable transitions.
    pub fn fx(mut self, fx: bool) -> Self {
        self.fx = fx;
        self
    }

    /// Transition duration for a nominal length, honoring `fx`.
    pub(crate) fn duration(&self, millis: u64) -> Duration {
        if self.fx {
            Duration::from_millis(millis)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_stock_confirm_dialog() {
        let options = ModalOptions::default();
        assert_eq!(options.title.as_deref(), Some("Are you sure?"));
        assert_eq!(
            options.content,
            ModalContent::Text("Please confirm this action.".to_owned())
        );
        assert_eq!(options.buttons.len(), 2);
        assert_eq!(options.buttons[0].text, "Cancel");
        assert_eq!(options.buttons[0].event, "cancel");
        assert_eq!(options.buttons[0].key_codes, vec![KEY_ESCAPE]);
        assert_eq!(options.buttons[1].text, "Confirm");
        assert!(options.buttons[1].key_codes.is_empty());
        assert!(options.click_outside_to_close);
        assert_eq!(options.click_outside_event, "cancel");
        assert_eq!(options.remove_method, RemoveMethod::Remove);
        assert!(options.fx);
    }

    #[test]
    fn fx_false_collapses_durations() {
        let options = ModalOptions::default().fx(false);
        assert_eq!(options.duration(200), Duration::ZERO);
        assert_eq!(
            ModalOptions::default().duration(200),
            Duration::from_millis(200)
        );
    }
}
