#![forbid(unsafe_code)]

//! Document capability consumed by the modal controller.
//!
//! The controller never touches a real document; everything it needs from the
//! host — element creation, marker-class lookup, inline styles, class lists,
//! style animation, measurement, global key-up/resize handlers, and deferred
//! timers — goes through [`Dom`]. Backends implement it with interior
//! mutability; the whole model is single-threaded and event-loop driven, so
//! no method takes `&mut self`.
//!
//! # Invariants
//!
//! - Handler and node ids are unique per backend instance and never reused.
//! - Deregistering a handler from inside any callback is safe; the removed
//!   handler fires for no later dispatch.
//! - A zero [`Duration`] means "no transition": [`Dom::animate`] must apply
//!   the final value and run the completion callback before returning, and
//!   [`Dom::set_timeout`] must run the callback before returning. Nonzero
//!   durations complete later, driven by the backend's clock.

use std::time::Duration;

use crate::markup::Markup;

/// Opaque handle to an element owned by a [`Dom`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node id from a raw value. Backends assign these.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a registered event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Create a handler id from a raw value. Backends assign these.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Inline style properties the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProp {
    /// Element opacity in `[0.0, 1.0]`.
    Opacity,
    /// Vertical offset from the top of the viewport, in pixels.
    Top,
}

/// Host document capability.
pub trait Dom {
    /// Materialize a markup fragment as a detached element tree.
    fn create(&self, fragment: &Markup) -> NodeId;

    /// Attach a detached element to the document body.
    fn append_to_body(&self, node: NodeId);

    /// First descendant of `root` carrying `class`, in document order.
    /// `root` itself is not considered.
    fn find(&self, root: NodeId, class: &str) -> Option<NodeId>;

    /// All descendants of `root` carrying `class`, in document order.
    fn find_all(&self, root: NodeId, class: &str) -> Vec<NodeId>;

    /// Materialize a fragment and append it as the last child of `parent`.
    fn append_markup(&self, parent: NodeId, fragment: &Markup);

    /// Add a CSS class to an element.
    fn add_class(&self, node: NodeId, class: &str);

    /// Set an inline style property immediately.
    fn set_style(&self, node: NodeId, prop: StyleProp, value: f64);

    /// Animate a style property toward `target` over `duration`, then run
    /// `done` if supplied. See the module docs for zero-duration semantics.
    fn animate(
        &self,
        node: NodeId,
        prop: StyleProp,
        target: f64,
        duration: Duration,
        done: Option<Box<dyn FnOnce()>>,
    );

    /// Rendered outer height of an element, margins included, in pixels.
    fn outer_height(&self, node: NodeId) -> f64;

    /// Current viewport height in pixels.
    fn viewport_height(&self) -> f64;

    /// Detach an element and destroy it together with its subtree and any
    /// handlers bound inside it.
    fn remove(&self, node: NodeId);

    /// Detach an element from the document, preserving the subtree and its
    /// bound handlers for later reuse.
    fn detach(&self, node: NodeId);

    /// Register a click handler on an element. Clicks bubble: the handler
    /// fires for clicks on the element or any descendant, and receives the
    /// original target.
    fn on_click(&self, node: NodeId, handler: Box<dyn FnMut(NodeId)>) -> HandlerId;

    /// Register a document-level key-up handler receiving the key code.
    fn on_document_keyup(&self, handler: Box<dyn FnMut(u32)>) -> HandlerId;

    /// Register a window resize handler.
    fn on_window_resize(&self, handler: Box<dyn FnMut()>) -> HandlerId;

    /// Deregister a handler. Returns `false` when the id is unknown (already
    /// removed, or destroyed together with its element).
    fn off(&self, handler: HandlerId) -> bool;

    /// Run `callback` after `delay`. Zero delays run before returning.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>);
}
