#![forbid(unsafe_code)]

//! The modal controller: construction, event wiring, centring, and the
//! observer-gated close protocol.
//!
//! # Invariants
//!
//! - A trigger's own event (button, shortcut, outside click) is emitted
//!   strictly before `"beforeClose"`; `"beforeClose"` strictly before
//!   `"close"`; nothing is emitted after `"close"`.
//! - At most one close protocol runs per instance: repeated close requests
//!   while one is pending are no-ops, and finalization runs at most once.
//! - Exactly two global handlers (document key-up, window resize) exist per
//!   live instance and are deregistered exactly once during finalization.
//! - Centring is recomputed from live measurements on mount and on every
//!   resize, never cached.
//!
//! # Failure modes
//!
//! - A gated `"beforeClose"` observer that never releases its [`CloseGate`]
//!   keeps the element mounted and its handlers registered indefinitely.
//! - A panicking observer propagates to the dispatching caller; observers are
//!   not isolated from one another.
//!
//! # Lifetime
//!
//! All state lives in a shared core; handlers registered with the DOM hold
//! strong references to it, so a mounted modal stays live even when the
//! caller drops its [`Modal`] handle. Finalizing with
//! [`RemoveMethod::Remove`] drops those registrations and with them the core.

use std::cell::Cell;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, trace};

use modalkit_core::{Dom, HandlerId, Markup, NodeId, StyleProp};
use modalkit_render::{MARKER_BUTTON, MARKER_CONTENT, MARKER_PANEL};

use crate::emitter::{Emitter, ListenerId};
use crate::error::ModalError;
use crate::gate::CloseGate;
use crate::options::{ModalContent, ModalOptions, RemoveMethod};

/// Lifecycle event emitted once per close request, before finalization.
pub const BEFORE_CLOSE_EVENT: &str = "beforeClose";
/// Lifecycle event emitted after the element leaves the document. Always the
/// last event an instance emits.
pub const CLOSE_EVENT: &str = "close";

const ENTRANCE_FADE_MS: u64 = 100;
const CENTRE_OVERSHOOT_MS: u64 = 200;
const CENTRE_SETTLE_MS: u64 = 150;
const EXIT_MS: u64 = 200;
const CENTRE_OVERSHOOT_PX: f64 = 10.0;

/// A live modal instance.
pub struct Modal<D: Dom> {
    core: Rc<ModalCore<D>>,
}

struct ModalCore<D: Dom> {
    dom: Rc<D>,
    options: ModalOptions,
    overlay: NodeId,
    panel: NodeId,
    shortcuts: AHashMap<u32, usize>,
    emitter: Emitter,
    closing: Cell<bool>,
    finalized: Cell<bool>,
    keyup: Cell<Option<HandlerId>>,
    resize: Cell<Option<HandlerId>>,
}

impl<D: Dom + 'static> Modal<D> {
    /// Render, mount, and wire a modal from the given options.
    pub fn open(dom: Rc<D>, options: ModalOptions) -> Result<Self, ModalError> {
        let fragment = modalkit_render::render(options.title.as_deref(), &options.buttons);
        let overlay = dom.create(&fragment);
        let panel = dom
            .find(overlay, MARKER_PANEL)
            .ok_or(ModalError::MissingMarker(MARKER_PANEL))?;
        let slot = dom
            .find(overlay, MARKER_CONTENT)
            .ok_or(ModalError::MissingMarker(MARKER_CONTENT))?;
        let button_nodes = dom.find_all(overlay, MARKER_BUTTON);
        if button_nodes.len() != options.buttons.len() {
            return Err(ModalError::MissingMarker(MARKER_BUTTON));
        }

        match &options.content {
            ModalContent::Text(text) => {
                dom.append_markup(slot, &Markup::new("p").text(text.as_str()));
            }
            ModalContent::Fragment(content) => dom.append_markup(slot, content),
        }

        if !options.class_name.is_empty() {
            dom.add_class(panel, &options.class_name);
        }

        // Later buttons overwrite earlier ones on a shared code.
        let mut shortcuts = AHashMap::new();
        for (index, button) in options.buttons.iter().enumerate() {
            for &code in &button.key_codes {
                shortcuts.insert(code, index);
            }
        }

        let core = Rc::new(ModalCore {
            dom: Rc::clone(&dom),
            options,
            overlay,
            panel,
            shortcuts,
            emitter: Emitter::default(),
            closing: Cell::new(false),
            finalized: Cell::new(false),
            keyup: Cell::new(None),
            resize: Cell::new(None),
        });

        for (index, &node) in button_nodes.iter().enumerate() {
            let handler = Rc::clone(&core);
            dom.on_click(node, Box::new(move |_target| ModalCore::activate(&handler, index)));
        }

        let handler = Rc::clone(&core);
        let keyup = dom.on_document_keyup(Box::new(move |code| {
            if let Some(&index) = handler.shortcuts.get(&code) {
                ModalCore::activate(&handler, index);
            }
        }));
        core.keyup.set(Some(keyup));

        // Only clicks landing on the overlay itself count as outside clicks;
        // descendants never reach this path.
        let handler = Rc::clone(&core);
        dom.on_click(
            overlay,
            Box::new(move |target| {
                if target == handler.overlay {
                    handler.emitter.emit(&handler.options.click_outside_event);
                    if handler.options.click_outside_to_close {
                        ModalCore::request_close(&handler);
                    }
                }
            }),
        );

        dom.set_style(overlay, StyleProp::Opacity, 0.0);
        dom.set_style(panel, StyleProp::Top, 0.0);
        dom.append_to_body(overlay);
        dom.animate(
            overlay,
            StyleProp::Opacity,
            1.0,
            core.options.duration(ENTRANCE_FADE_MS),
            None,
        );

        core.animate_centre();

        let handler = Rc::clone(&core);
        let resize = dom.on_window_resize(Box::new(move || handler.centre()));
        core.resize.set(Some(resize));

        debug!(buttons = core.options.buttons.len(), "modal mounted");
        Ok(Self { core })
    }

    /// Begin the close protocol. Idempotent: calling again while closing or
    /// after finalization is a no-op.
    pub fn close(&self) {
        ModalCore::request_close(&self.core);
    }

    /// Recompute and apply vertical centring immediately.
    pub fn centre(&self) {
        self.core.centre();
    }

    /// Register a fire-and-forget observer for `event` — a button event, the
    /// outside-click event, [`BEFORE_CLOSE_EVENT`], or [`CLOSE_EVENT`].
    pub fn on(&self, event: &str, listener: impl FnMut() + 'static) -> ListenerId {
        self.core.emitter.on(event, listener)
    }

    /// Register a continuation-expecting observer. On a close request it
    /// receives a shared [`CloseGate`]; finalization waits until the gate has
    /// been released once per gated observer.
    pub fn on_gated(&self, event: &str, listener: impl FnMut(CloseGate) + 'static) -> ListenerId {
        self.core.emitter.on_gated(event, listener)
    }

    /// Remove an observer. Returns `false` when the id is unknown.
    pub fn off(&self, id: ListenerId) -> bool {
        self.core.emitter.off(id)
    }

    /// Whether finalization has not happened yet.
    pub fn is_open(&self) -> bool {
        !self.core.finalized.get()
    }

    /// The overlay element.
    pub fn overlay(&self) -> NodeId {
        self.core.overlay
    }

    /// The panel element (the `js-modal` node).
    pub fn panel(&self) -> NodeId {
        self.core.panel
    }
}

impl<D: Dom + 'static> ModalCore<D> {
    /// Emit a button's event, then request close. Shared by click and
    /// shortcut paths.
    fn activate(core: &Rc<Self>, index: usize) {
        let Some(button) = core.options.buttons.get(index) else {
            return;
        };
        trace!(event = %button.event, "button activated");
        core.emitter.emit(&button.event);
        Self::request_close(core);
    }

    fn request_close(core: &Rc<Self>) {
        if core.closing.replace(true) {
            return;
        }
        let gated = core.emitter.gated_count(BEFORE_CLOSE_EVENT);
        if gated == 0 {
            core.emitter.emit(BEFORE_CLOSE_EVENT);
            Self::finalize(core);
        } else {
            debug!(observers = gated, "close deferred until gate opens");
            let pending = Rc::clone(core);
            let gate = CloseGate::new(gated, move || Self::finalize(&pending));
            core.emitter.emit_with_gate(BEFORE_CLOSE_EVENT, &gate);
        }
    }

    fn finalize(core: &Rc<Self>) {
        if core.finalized.replace(true) {
            return;
        }
        let duration = core.options.duration(EXIT_MS);
        core.dom
            .animate(core.overlay, StyleProp::Opacity, 0.0, duration, None);
        core.dom.animate(
            core.panel,
            StyleProp::Top,
            core.dom.viewport_height(),
            duration,
            None,
        );

        // Teardown waits on a plain timer sized to the animation rather than
        // the animation's completion callback, which is unreliable in some
        // hosts. Zero durations tear down on the same turn.
        let pending = Rc::clone(core);
        let teardown = move || {
            match pending.options.remove_method {
                RemoveMethod::Remove => pending.dom.remove(pending.overlay),
                RemoveMethod::Detach => pending.dom.detach(pending.overlay),
            }
            pending.emitter.emit(CLOSE_EVENT);
            pending.emitter.clear();
            if let Some(id) = pending.keyup.take() {
                pending.dom.off(id);
            }
            if let Some(id) = pending.resize.take() {
                pending.dom.off(id);
            }
            debug!("modal finalized");
        };
        if duration.is_zero() {
            teardown();
        } else {
            core.dom.set_timeout(duration, Box::new(teardown));
        }
    }

    /// Instant reposition; used on resize and via [`Modal::centre`].
    fn centre(&self) {
        let viewport = self.dom.viewport_height();
        let height = self.dom.outer_height(self.panel);
        if height < viewport {
            self.dom
                .set_style(self.panel, StyleProp::Top, (viewport - height) / 2.0);
        }
    }

    /// Entrance centring: overshoot slightly past centre, then settle. Both
    /// stages collapse to instantaneous when `fx` is off. Skipped entirely
    /// when the panel overflows the viewport.
    fn animate_centre(&self) {
        let viewport = self.dom.viewport_height();
        let height = self.dom.outer_height(self.panel);
        if height >= viewport {
            return;
        }
        let rest = (viewport - height) / 2.0;
        let dom = Rc::clone(&self.dom);
        let panel = self.panel;
        let settle = self.options.duration(CENTRE_SETTLE_MS);
        self.dom.animate(
            panel,
            StyleProp::Top,
            rest + CENTRE_OVERSHOOT_PX,
            self.options.duration(CENTRE_OVERSHOOT_MS),
            Some(Box::new(move || {
                dom.animate(panel, StyleProp::Top, rest, settle, None);
            })),
        );
    }
}
