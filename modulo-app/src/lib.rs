//! # modulo-app: the client-side workspace engine
//!
//! Ties the model, layout and sync crates into a session:
//!
//! ```text
//!  pointer / edit events
//!          │
//!          ▼
//! ┌──────────────────────┐  mutate   ┌────────────────┐  submit  ┌───────────┐
//! │ InteractionController│ ────────► │ WorkspaceStore │ ───────► │ Persister │
//! │  (per-module guard)  │ ◄──────── │ normalize+pack │          └───────────┘
//! └──────────────────────┘   Frame   └────────────────┘
//!                                           │ LayoutEngine + calendar view model
//!                                           ▼
//!                                         Frame
//! ```
//!
//! [`Session`] owns authentication, client-local preferences and the store.

pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod store;
pub mod view;

pub use config::WorkspaceConfig;
pub use controller::{GestureKind, InteractionController};
pub use error::{InteractionError, SessionError};
pub use session::{sample_modules, Session};
pub use store::{StatusLevel, StatusMessage, WorkspaceStore};
pub use view::{CalendarContent, DayView, Frame, ModuleContent, RenderedModule};
