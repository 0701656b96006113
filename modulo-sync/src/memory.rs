//! In-process [`RemoteWorkspace`] with the service's observable behavior:
//! lowercased emails, 409 on duplicate registration, 401 on bad login or
//! unknown token, and a stored snapshot per account.
//!
//! Test hooks: [`MemoryRemote::set_offline`] fails every call with a network
//! error, [`MemoryRemote::push_latency`] delays the next call, and
//! [`MemoryRemote::revoke_all`] expires every issued credential.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex as StdMutex, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::remote::{Credential, Registration, RemoteError, RemoteWorkspace, Snapshot};

#[derive(Debug)]
struct Account {
    user_id: Uuid,
    password: String,
    #[allow(dead_code)]
    first_name: String,
    #[allow(dead_code)]
    last_name: String,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, Uuid>,
    snapshots: HashMap<Uuid, Snapshot>,
}

impl State {
    fn user_for(&self, credential: &Credential) -> Result<Uuid, RemoteError> {
        self.tokens
            .get(credential.as_str())
            .copied()
            .ok_or_else(|| RemoteError::Unauthorized("Invalid or expired token".into()))
    }

    fn issue(&mut self, user_id: Uuid) -> Credential {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id);
        Credential::new(token)
    }
}

#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
    offline: AtomicBool,
    latencies: StdMutex<VecDeque<Duration>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay applied to the next call, in call order.
    pub fn push_latency(&self, delay: Duration) {
        self.latencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(delay);
    }

    pub async fn revoke_all(&self) {
        self.state.lock().await.tokens.clear();
    }

    /// Snapshot currently stored for `email`, if the account exists.
    pub async fn stored(&self, email: &str) -> Option<Snapshot> {
        let state = self.state.lock().await;
        let account = state.accounts.get(&email.trim().to_lowercase())?;
        Some(state.snapshots.get(&account.user_id).cloned().unwrap_or_default())
    }

    /// Captured when the call is made, so delays follow issue order.
    fn admission(&self) -> (bool, Option<Duration>) {
        let offline = self.offline.load(Ordering::SeqCst);
        let delay = self
            .latencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        (offline, delay)
    }
}

async fn admit((offline, delay): (bool, Option<Duration>)) -> Result<(), RemoteError> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if offline {
        return Err(RemoteError::Network("remote unreachable".into()));
    }
    Ok(())
}

impl RemoteWorkspace for MemoryRemote {
    fn register<'a>(&'a self, registration: &'a Registration) -> BoxFuture<'a, Result<Credential, RemoteError>> {
        let admission = self.admission();
        Box::pin(async move {
            admit(admission).await?;
            let email = registration.email.trim().to_lowercase();
            if email.is_empty() || registration.password.is_empty() {
                return Err(RemoteError::Invalid("Email and password are required".into()));
            }
            let mut state = self.state.lock().await;
            if state.accounts.contains_key(&email) {
                return Err(RemoteError::Conflict("User already exists".into()));
            }
            let user_id = Uuid::new_v4();
            state.accounts.insert(
                email.clone(),
                Account {
                    user_id,
                    password: registration.password.clone(),
                    first_name: registration.first_name.trim().to_string(),
                    last_name: registration.last_name.trim().to_string(),
                },
            );
            log::info!("Registered account {email}");
            Ok(state.issue(user_id))
        })
    }

    fn login<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, Result<Credential, RemoteError>> {
        let admission = self.admission();
        Box::pin(async move {
            admit(admission).await?;
            let email = email.trim().to_lowercase();
            let mut state = self.state.lock().await;
            let user_id = match state.accounts.get(&email) {
                Some(account) if account.password == password => account.user_id,
                _ => return Err(RemoteError::Unauthorized("Invalid credentials".into())),
            };
            Ok(state.issue(user_id))
        })
    }

    fn fetch<'a>(&'a self, credential: &'a Credential) -> BoxFuture<'a, Result<Snapshot, RemoteError>> {
        let admission = self.admission();
        Box::pin(async move {
            admit(admission).await?;
            let state = self.state.lock().await;
            let user_id = state.user_for(credential)?;
            Ok(state.snapshots.get(&user_id).cloned().unwrap_or_default())
        })
    }

    fn replace<'a>(&'a self, credential: &'a Credential, snapshot: Snapshot) -> BoxFuture<'a, Result<(), RemoteError>> {
        let admission = self.admission();
        Box::pin(async move {
            admit(admission).await?;
            let mut state = self.state.lock().await;
            let user_id = state.user_for(credential)?;
            log::debug!("Replacing workspace at revision {}", snapshot.revision);
            state.snapshots.insert(user_id, snapshot);
            Ok(())
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
