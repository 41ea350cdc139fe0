#![forbid(unsafe_code)]

//! Action button specification.

/// Key code for the Enter key.
pub const KEY_ENTER: u32 = 13;
/// Key code for the Escape key.
pub const KEY_ESCAPE: u32 = 27;

/// One action button in a modal.
///
/// Buttons render in input order; the same order is used for shortcut lookup,
/// so when two buttons declare the same key code the later one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    /// Button label.
    pub text: String,
    /// Event name emitted when the button is activated.
    pub event: String,
    /// Extra class appended after the `js-button` marker class.
    pub class_name: Option<String>,
    /// When set, an `<i>` element with this class precedes the label.
    pub icon_class_name: Option<String>,
    /// Keyboard shortcut codes that activate this button.
    pub key_codes: Vec<u32>,
}

impl ButtonSpec {
    /// Create a button with a label and the event it emits.
    pub fn new(text: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            event: event.into(),
            class_name: None,
            icon_class_name: None,
            key_codes: Vec::new(),
        }
    }

    /// Set the extra button class.
    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }

    /// Set the leading icon class.
    pub fn icon_class_name(mut self, class: impl Into<String>) -> Self {
        self.icon_class_name = Some(class.into());
        self
    }

    /// Set the shortcut key codes.
    pub fn key_codes(mut self, codes: impl IntoIterator<Item = u32>) -> Self {
        self.key_codes = codes.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_to_absent() {
        let button = ButtonSpec::new("OK", "ok");
        assert_eq!(button.text, "OK");
        assert_eq!(button.event, "ok");
        assert!(button.class_name.is_none());
        assert!(button.icon_class_name.is_none());
        assert!(button.key_codes.is_empty());
    }

    #[test]
    fn key_codes_preserve_order() {
        let button = ButtonSpec::new("OK", "ok").key_codes([KEY_ENTER, 32]);
        assert_eq!(button.key_codes, vec![13, 32]);
    }
}
