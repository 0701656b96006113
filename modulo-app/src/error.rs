use modulo_core::ModuleKind;
use modulo_layout::LayoutMode;
use modulo_sync::{PrefsError, RemoteError};
use thiserror::Error;

/// Rejected edits and gestures. Nothing is mutated or persisted when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("No module with id {0}")]
    UnknownModule(String),
    #[error("No item {item} in module {module}")]
    UnknownItem { module: String, item: String },
    #[error("Module {module} is a {actual:?} module, not {expected:?}")]
    WrongKind {
        module: String,
        expected: ModuleKind,
        actual: ModuleKind,
    },
    #[error("Text must not be empty")]
    EmptyText,
    #[error("Not a calendar date: {0:?}")]
    InvalidDate(String),
    #[error("Index {index} out of range for {len} module(s)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Only available in {0:?} layout mode")]
    WrongMode(LayoutMode),
    #[error("A gesture is already in progress on module {0}")]
    GestureInProgress(String),
    #[error("No gesture in progress on module {0}")]
    NoGesture(String),
    #[error("Module {0} is already being reordered")]
    ReorderInProgress(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Preferences error: {0}")]
    Prefs(#[from] PrefsError),
}
