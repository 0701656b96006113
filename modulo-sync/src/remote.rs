//! Interface of the remote workspace service.
//!
//! Exactly four operations: create an account, authenticate, fetch the
//! stored snapshot, replace it. Data calls need the bearer credential issued
//! by the first two. There is no partial update; the last write wins.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Full module list as stored remotely. The service never looks inside
/// `modules`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Logical revision assigned by the client that wrote it.
    pub revision: u64,
    pub modules: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Missing, invalid or expired credential, or bad login.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: {0}")]
    Server(String),
}

impl RemoteError {
    /// Authorization failures call for re-authentication, never a retry.
    pub fn is_authorization(&self) -> bool {
        matches!(self, RemoteError::Unauthorized(_))
    }
}

/// The remote workspace collaborator.
pub trait RemoteWorkspace: Send + Sync {
    fn register<'a>(&'a self, registration: &'a Registration) -> BoxFuture<'a, Result<Credential, RemoteError>>;

    fn login<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, Result<Credential, RemoteError>>;

    /// Most recent snapshot for the credential's identity; empty if none.
    fn fetch<'a>(&'a self, credential: &'a Credential) -> BoxFuture<'a, Result<Snapshot, RemoteError>>;

    /// Overwrite the stored snapshot for the credential's identity.
    fn replace<'a>(&'a self, credential: &'a Credential, snapshot: Snapshot) -> BoxFuture<'a, Result<(), RemoteError>>;
}
