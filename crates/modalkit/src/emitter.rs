#![forbid(unsafe_code)]

//! String-keyed observer registry.
//!
//! Listeners come in two kinds. Plain listeners (registered with
//! [`Emitter::on`]) are fire-and-forget. Gated listeners (registered with
//! [`Emitter::on_gated`]) declare that they expect a continuation; they only
//! fire on the close-request path, via [`Emitter::emit_with_gate`], where
//! each receives a clone of the shared [`CloseGate`]. Plain emission skips
//! them.
//!
//! # Invariants
//!
//! - Listeners for one event fire in registration order, plain and gated
//!   interleaved as registered.
//! - The registry borrow is never held while a listener runs, so listeners
//!   may re-enter the emitter (subscribe, unsubscribe, emit, clear).
//! - A listener removed during an emission of the same event still receives
//!   that emission (the dispatch list is snapshotted up front).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::gate::CloseGate;

/// Handle for unsubscribing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
enum Listener {
    Plain(Rc<RefCell<dyn FnMut()>>),
    Gated(Rc<RefCell<dyn FnMut(CloseGate)>>),
}

struct Entry {
    id: ListenerId,
    event: String,
    listener: Listener,
}

/// Single-threaded observer registry.
#[derive(Default)]
pub struct Emitter {
    entries: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
}

impl Emitter {
    /// Register a fire-and-forget listener. Returns its unsubscribe handle.
    pub fn on(&self, event: &str, listener: impl FnMut() + 'static) -> ListenerId {
        self.insert(event, Listener::Plain(Rc::new(RefCell::new(listener))))
    }

    /// Register a continuation-expecting listener. Only fires on the
    /// close-request path.
    pub fn on_gated(&self, event: &str, listener: impl FnMut(CloseGate) + 'static) -> ListenerId {
        self.insert(event, Listener::Gated(Rc::new(RefCell::new(listener))))
    }

    /// Remove a listener. Returns `false` when the id is unknown.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Number of gated listeners currently registered for `event`.
    pub fn gated_count(&self, event: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.event == event && matches!(entry.listener, Listener::Gated(_)))
            .count()
    }

    /// Invoke the plain listeners for `event`, in registration order.
    pub fn emit(&self, event: &str) {
        for listener in self.snapshot(event) {
            if let Listener::Plain(callback) = listener {
                (callback.borrow_mut())();
            }
        }
    }

    /// Invoke every listener for `event`; gated listeners receive a clone of
    /// `gate`.
    pub fn emit_with_gate(&self, event: &str, gate: &CloseGate) {
        for listener in self.snapshot(event) {
            match listener {
                Listener::Plain(callback) => (callback.borrow_mut())(),
                Listener::Gated(callback) => (callback.borrow_mut())(gate.clone()),
            }
        }
    }

    /// Drop every listener. The emitter emits nothing afterwards.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn insert(&self, event: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(Entry {
            id,
            event: event.to_owned(),
            listener,
        });
        id
    }

    fn snapshot(&self, event: &str) -> Vec<Listener> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .map(|entry| entry.listener.clone())
            .collect()
    }
}
