#![forbid(unsafe_code)]

//! Shared continuation handed to close observers.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// Continuation shared by every gated `"beforeClose"` observer of one close
/// request.
///
/// The gate opens when [`release`](CloseGate::release) has been invoked as
/// many times as there were gated observers at emission — a raw invocation
/// count, not per-observer tracking, so one observer releasing twice counts
/// twice. Releases past the threshold are no-ops. An observer that never
/// releases holds the modal open indefinitely; there is no timeout.
#[derive(Clone)]
pub struct CloseGate {
    remaining: Rc<Cell<usize>>,
    open: Rc<dyn Fn()>,
}

impl CloseGate {
    pub(crate) fn new(observers: usize, open: impl Fn() + 'static) -> Self {
        Self {
            remaining: Rc::new(Cell::new(observers)),
            open: Rc::new(open),
        }
    }

    /// Acknowledge one release. Opens the gate on the final one.
    pub fn release(&self) {
        let left = self.remaining.get();
        if left == 0 {
            return;
        }
        self.remaining.set(left - 1);
        trace!(remaining = left - 1, "close gate released");
        if left == 1 {
            (self.open)();
        }
    }

    /// Releases still required before the gate opens.
    pub fn pending(&self) -> usize {
        self.remaining.get()
    }
}

impl fmt::Debug for CloseGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseGate")
            .field("remaining", &self.remaining.get())
            .finish()
    }
}
