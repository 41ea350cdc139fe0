#![forbid(unsafe_code)]

//! Error type for modal construction.

use thiserror::Error;

/// Errors surfaced while opening a modal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModalError {
    /// The DOM backend failed to materialize a renderer marker node.
    #[error("rendered markup has no `{0}` marker node")]
    MissingMarker(&'static str),
}
