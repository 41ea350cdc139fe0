#![forbid(unsafe_code)]

//! Confirmation/dialog overlay with an observer-gated close protocol.
//!
//! A [`Modal`] renders an overlay with a title, body content, and a row of
//! action buttons, wires up clicks, keyboard shortcuts, outside-click
//! detection, and window resizes, and manages its own lifecycle: mount,
//! centre, transition in, and — through the gated close protocol — transition
//! out and unmount.
//!
//! The host document is abstracted behind the [`Dom`] capability trait from
//! `modalkit-core`; the `modalkit-harness` crate provides a deterministic
//! in-memory backend for tests.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use modalkit::{ButtonSpec, Modal, ModalOptions, KEY_ENTER};
//!
//! let modal = Modal::open(
//!     Rc::new(dom),
//!     ModalOptions::default()
//!         .title("Delete file?")
//!         .content_text("This cannot be undone.")
//!         .buttons(vec![
//!             ButtonSpec::new("Cancel", "cancel"),
//!             ButtonSpec::new("Delete", "delete").key_codes([KEY_ENTER]),
//!         ]),
//! )?;
//!
//! modal.on("delete", || println!("deleting"));
//!
//! // Delay the close until some async work acknowledges it.
//! modal.on_gated(modalkit::BEFORE_CLOSE_EVENT, |gate| {
//!     save_draft_then(move || gate.release());
//! });
//! ```

pub mod emitter;
pub mod error;
pub mod gate;
pub mod modal;
pub mod options;

pub use emitter::{Emitter, ListenerId};
pub use error::ModalError;
pub use gate::CloseGate;
pub use modal::{BEFORE_CLOSE_EVENT, CLOSE_EVENT, Modal};
pub use options::{ModalContent, ModalOptions, RemoveMethod};

pub use modalkit_core::{ButtonSpec, Dom, HandlerId, KEY_ENTER, KEY_ESCAPE, Markup, NodeId, StyleProp};
