#![forbid(unsafe_code)]

//! Pure markup renderer for the modal overlay.
//!
//! [`render`] maps a title and button list to a fixed [`Markup`] shape:
//!
//! ```text
//! div.modal-overlay
//!   div.modal-content.js-modal
//!     h1.modal-title {title}          -- only when a title is present
//!     div.js-content                  -- content slot, filled by the controller
//!     div.modal-controls              -- only when buttons is non-empty
//!       button.js-button[.extra]
//!         i.{icon}                    -- only when icon_class_name is set
//!         {text}
//! ```
//!
//! The `js-` marker classes are the controller's query surface; the remaining
//! classes exist for caller styling only.
//!
//! # Invariants
//!
//! - `render` is pure and side-effect-free; it never touches a document.
//! - [`to_html`] escapes all interpolated text (`&`, `<`, `>`, `"`); class
//!   lists are caller-trusted and rendered verbatim.
//! - An absent or empty title produces no heading; an empty button list
//!   produces no controls container.

use std::borrow::Cow;
use std::fmt::Write as _;

use modalkit_core::{ButtonSpec, Markup};

/// Class of the full-screen overlay element.
pub const CLASS_OVERLAY: &str = "modal-overlay";
/// Styling class of the modal panel.
pub const CLASS_PANEL: &str = "modal-content";
/// Styling class of the title heading.
pub const CLASS_TITLE: &str = "modal-title";
/// Styling class of the button row.
pub const CLASS_CONTROLS: &str = "modal-controls";
/// Marker class of the modal panel.
pub const MARKER_PANEL: &str = "js-modal";
/// Marker class of the content slot.
pub const MARKER_CONTENT: &str = "js-content";
/// Marker class carried by every button.
pub const MARKER_BUTTON: &str = "js-button";

/// Render the modal structure for the given title and buttons.
pub fn render(title: Option<&str>, buttons: &[ButtonSpec]) -> Markup {
    let mut panel = Markup::new("div").class(CLASS_PANEL).class(MARKER_PANEL);

    // An empty title string renders no heading, same as an absent one.
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        panel = panel.child(Markup::new("h1").class(CLASS_TITLE).text(title));
    }

    panel = panel.child(Markup::new("div").class(MARKER_CONTENT));

    if !buttons.is_empty() {
        let mut controls = Markup::new("div").class(CLASS_CONTROLS);
        for button in buttons {
            let mut el = Markup::new("button").class(MARKER_BUTTON);
            if let Some(class) = &button.class_name {
                el = el.class(class);
            }
            if let Some(icon) = &button.icon_class_name {
                el = el.child(Markup::new("i").class(icon));
            }
            controls = controls.child(el.text(button.text.as_str()));
        }
        panel = panel.child(controls);
    }

    Markup::new("div").class(CLASS_OVERLAY).child(panel)
}

/// Escape markup-significant characters in interpolated text.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Serialize a fragment to an HTML string. Children precede the element's
/// own text; text is escaped, class lists are not.
pub fn to_html(fragment: &Markup) -> String {
    let mut out = String::new();
    write_element(fragment, &mut out);
    out
}

fn write_element(el: &Markup, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    if !el.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", el.classes.join(" "));
    }
    out.push('>');
    for child in &el.children {
        write_element(child, out);
    }
    out.push_str(&escape(&el.text));
    let _ = write!(out, "</{}>", el.tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn buttons(specs: &[(&str, &str)]) -> Vec<ButtonSpec> {
        specs
            .iter()
            .map(|(text, event)| ButtonSpec::new(*text, *event))
            .collect()
    }

    #[test]
    fn full_structure_with_title_and_buttons() {
        let fragment = render(Some("Are you sure?"), &buttons(&[("Cancel", "cancel")]));
        assert!(fragment.has_class(CLASS_OVERLAY));

        let panel = &fragment.children[0];
        assert!(panel.has_class(CLASS_PANEL));
        assert!(panel.has_class(MARKER_PANEL));

        let heading = &panel.children[0];
        assert_eq!(heading.tag, "h1");
        assert_eq!(heading.text, "Are you sure?");

        let slot = &panel.children[1];
        assert!(slot.has_class(MARKER_CONTENT));
        assert!(slot.children.is_empty());

        let controls = &panel.children[2];
        assert!(controls.has_class(CLASS_CONTROLS));
        assert_eq!(controls.children.len(), 1);
        assert!(controls.children[0].has_class(MARKER_BUTTON));
        assert_eq!(controls.children[0].text, "Cancel");
    }

    #[test]
    fn no_title_renders_no_heading() {
        let fragment = render(None, &[]);
        let panel = &fragment.children[0];
        assert_eq!(panel.children.len(), 1);
        assert!(panel.children[0].has_class(MARKER_CONTENT));
    }

    #[test]
    fn empty_title_treated_as_absent() {
        let fragment = render(Some(""), &[]);
        assert_eq!(fragment.children[0].children.len(), 1);
    }

    #[test]
    fn empty_buttons_render_no_controls() {
        let fragment = render(Some("Title"), &[]);
        let panel = &fragment.children[0];
        assert!(panel.children.iter().all(|c| !c.has_class(CLASS_CONTROLS)));
    }

    #[test]
    fn button_extra_class_appends_after_marker() {
        let button = ButtonSpec::new("Go", "go").class_name("primary");
        let fragment = render(None, &[button]);
        let controls = fragment.children[0].children.last().unwrap();
        assert_eq!(controls.children[0].classes, vec![MARKER_BUTTON, "primary"]);
    }

    #[test]
    fn icon_element_precedes_button_text() {
        let button = ButtonSpec::new("Save", "save").icon_class_name("icon-disk");
        let fragment = render(None, &[button]);
        let el = &fragment.children[0].children.last().unwrap().children[0];
        assert_eq!(el.children[0].tag, "i");
        assert!(el.children[0].has_class("icon-disk"));
        assert_eq!(el.text, "Save");

        let html = to_html(&fragment);
        assert!(html.contains("<i class=\"icon-disk\"></i>Save"));
    }

    #[test]
    fn buttons_render_in_input_order() {
        let fragment = render(None, &buttons(&[("A", "a"), ("B", "b"), ("C", "c")]));
        let controls = fragment.children[0].children.last().unwrap();
        let texts: Vec<&str> = controls.children.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn title_markup_is_escaped() {
        let fragment = render(Some("<script>\"&\"</script>"), &[]);
        let html = to_html(&fragment);
        assert!(html.contains("&lt;script&gt;&quot;&amp;&quot;&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn button_text_is_escaped() {
        let fragment = render(None, &buttons(&[("<b>bold</b>", "x")]));
        let html = to_html(&fragment);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn escape_borrows_when_clean() {
        assert!(matches!(escape("plain text"), Cow::Borrowed(_)));
    }

    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    proptest! {
        #[test]
        fn escape_round_trips(s in "\\PC*") {
            let escaped = escape(&s);
            prop_assert_eq!(unescape(&escaped), s.clone());
        }

        #[test]
        fn escaped_text_has_no_raw_markup(s in "\\PC*") {
            let escaped = escape(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }
    }
}
