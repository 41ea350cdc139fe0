#![forbid(unsafe_code)]

//! Shared primitives for modalkit: the [`Dom`] capability trait consumed by
//! the modal controller, the [`Markup`] fragment tree produced by the
//! renderer, and the [`ButtonSpec`] data model.
//!
//! This crate is pure data and trait definitions; it never touches a real
//! document. Backends (a browser binding, or the in-memory harness) implement
//! [`Dom`].

pub mod button;
pub mod dom;
pub mod markup;

pub use button::{ButtonSpec, KEY_ENTER, KEY_ESCAPE};
pub use dom::{Dom, HandlerId, NodeId, StyleProp};
pub use markup::Markup;
