//! # modulo-sync: persistence boundary for the Modulo workspace
//!
//! The workspace lives on the client; the remote service only stores an
//! opaque snapshot per account and overwrites it on every save.
//!
//! ```text
//! ┌────────────────┐  submit(modules)   ┌─────────────┐  replace(rev, snapshot)  ┌──────────────────┐
//! │ WorkspaceStore │ ─────────────────► │  Persister  │ ───────────────────────► │ RemoteWorkspace  │
//! │   (app crate)  │ ◄───────────────── │ (rev clock) │ ◄─────── outcome ─────── │ (one task/call)  │
//! └────────────────┘   drain() events   └─────────────┘                          └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`remote`]: the four-operation remote interface and its error type
//! - [`memory`]: in-process remote used by tests and the headless binary
//! - [`persist`]: fire-and-forget saves with revision-ordered acks
//! - [`prefs`]: client-local key-value storage (token, layout mode)

pub mod memory;
pub mod persist;
pub mod prefs;
pub mod remote;

pub use memory::MemoryRemote;
pub use persist::{Persister, SyncEvent};
pub use prefs::{LocalPrefs, PrefsError, LAYOUT_MODE_KEY, TOKEN_KEY};
pub use remote::{Credential, Registration, RemoteError, RemoteWorkspace, Snapshot};
