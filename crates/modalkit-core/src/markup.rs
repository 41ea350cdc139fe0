#![forbid(unsafe_code)]

//! A minimal element tree used as the renderer's output and as caller-supplied
//! raw content.
//!
//! `Markup` deliberately models only what the modal template needs: a tag
//! name, a class list, child elements, and a text payload. Serialization to an
//! HTML string lives in `modalkit-render`; a child precedes its parent's text
//! when both are present.

/// A markup fragment: one element and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup {
    /// Element tag name (`div`, `h1`, `button`, ...).
    pub tag: String,
    /// CSS classes, in application order.
    pub classes: Vec<String>,
    /// Text content, rendered after any children.
    pub text: String,
    /// Child elements, in document order.
    pub children: Vec<Markup>,
}

impl Markup {
    /// Create an element with the given tag and nothing else.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Append a CSS class.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: Markup) -> Self {
        self.children.push(child);
        self
    }

    /// Whether this element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_classes_in_order() {
        let el = Markup::new("button").class("js-button").class("primary");
        assert_eq!(el.classes, vec!["js-button", "primary"]);
        assert!(el.has_class("primary"));
        assert!(!el.has_class("secondary"));
    }

    #[test]
    fn children_preserve_insertion_order() {
        let el = Markup::new("div")
            .child(Markup::new("h1"))
            .child(Markup::new("p"));
        assert_eq!(el.children[0].tag, "h1");
        assert_eq!(el.children[1].tag, "p");
    }
}
