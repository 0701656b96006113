//! Session lifecycle: authentication, client-local preferences and loading
//! the workspace into a [`WorkspaceStore`].

use std::sync::Arc;

use modulo_layout::LayoutMode;
use modulo_sync::{Credential, LocalPrefs, Persister, Registration, RemoteWorkspace, LAYOUT_MODE_KEY};
use serde_json::{json, Value};

use crate::config::WorkspaceConfig;
use crate::error::SessionError;
use crate::store::{StatusLevel, StatusMessage, WorkspaceStore};

pub const SIGN_IN_PROMPT: &str = "Sign in to load your modules.";
pub const SAMPLE_FALLBACK: &str = "Showing sample modules. Connect to the API to load yours.";
pub const REGISTER_FIELDS_REQUIRED: &str = "All fields are required to create an account.";
pub const LOGIN_FIELDS_REQUIRED: &str = "Please enter your email and password.";

/// Placeholder workspace shown when nothing could be loaded.
pub fn sample_modules() -> Vec<Value> {
    vec![
        json!({ "type": "calendar", "title": "Team calendar", "size": "large" }),
        json!({
            "type": "note",
            "title": "Notes",
            "items": ["Welcome to your workspace", "Connect the API to load your data"],
            "size": "small",
        }),
        json!({ "type": "task-list", "title": "Tasks", "size": "medium" }),
    ]
}

pub struct Session {
    remote: Arc<dyn RemoteWorkspace>,
    prefs: LocalPrefs,
    store: WorkspaceStore,
}

impl Session {
    /// Opens the preferences file named by the config, if any.
    pub fn open(remote: Arc<dyn RemoteWorkspace>, config: &WorkspaceConfig) -> Result<Self, SessionError> {
        let prefs = match &config.prefs_path {
            Some(path) => LocalPrefs::open(path)?,
            None => LocalPrefs::in_memory(),
        };
        Ok(Self::new(remote, prefs, config))
    }

    pub fn new(remote: Arc<dyn RemoteWorkspace>, prefs: LocalPrefs, config: &WorkspaceConfig) -> Self {
        let mut store = WorkspaceStore::new(config);
        match prefs.get(LAYOUT_MODE_KEY).map(LayoutMode::parse) {
            Some(Some(mode)) => store.set_mode(mode),
            Some(None) => log::warn!("Ignoring unknown stored layout mode"),
            None => {}
        }
        Self { remote, prefs, store }
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkspaceStore {
        &mut self.store
    }

    pub fn prefs(&self) -> &LocalPrefs {
        &self.prefs
    }

    pub fn credential(&self) -> Option<Credential> {
        self.prefs.token()
    }

    pub fn is_signed_in(&self) -> bool {
        self.credential().is_some()
    }

    pub async fn register(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Credential, SessionError> {
        let fields = [first_name, last_name, email, password];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(SessionError::Validation(REGISTER_FIELDS_REQUIRED.into()));
        }
        let registration = Registration {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let credential = self.remote.register(&registration).await?;
        self.prefs.set_token(&credential)?;
        log::info!("Account created for {}", registration.email);
        Ok(credential)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Credential, SessionError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SessionError::Validation(LOGIN_FIELDS_REQUIRED.into()));
        }
        let credential = self.remote.login(email.trim(), password).await?;
        self.prefs.set_token(&credential)?;
        log::info!("Signed in as {}", email.trim());
        Ok(credential)
    }

    /// Forget the credential and stop saving. In-flight saves still finish.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.prefs.clear_token()?;
        self.store.detach_persister();
        self.store.set_status(Some(StatusMessage::new(SIGN_IN_PROMPT, StatusLevel::Neutral)));
        log::info!("Signed out");
        Ok(())
    }

    /// Fetch the stored workspace into the store. Falls back to sample
    /// modules when signed out, when the fetch fails, or when nothing has
    /// been saved yet. A rejected credential is forgotten and the store is
    /// flagged for re-authentication.
    pub async fn open_workspace(&mut self) {
        let Some(credential) = self.credential() else {
            self.store.load(&sample_modules(), None);
            self.store.set_status(Some(StatusMessage::error(SIGN_IN_PROMPT)));
            return;
        };

        match self.remote.fetch(&credential).await {
            Ok(snapshot) => {
                let persister = Persister::new(Arc::clone(&self.remote), credential, snapshot.revision);
                if snapshot.modules.is_empty() {
                    self.store.load(&sample_modules(), Some(persister));
                } else {
                    self.store.load(&snapshot.modules, Some(persister));
                }
                self.store.set_status(None);
            }
            Err(e) if e.is_authorization() => {
                log::warn!("Stored credential rejected: {e}");
                self.store.load(&sample_modules(), None);
                self.store.require_reauth();
                if let Err(e) = self.prefs.clear_token() {
                    log::warn!("Could not clear stored token: {e}");
                }
            }
            Err(e) => {
                log::warn!("Could not load workspace: {e}");
                self.store.load(&sample_modules(), None);
                self.store.set_status(Some(StatusMessage::error(SAMPLE_FALLBACK)));
            }
        }
    }

    /// Switch layout mode and remember the choice on this device.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) -> Result<(), SessionError> {
        self.prefs.set(LAYOUT_MODE_KEY, mode.as_str())?;
        self.store.set_mode(mode);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modulo_core::{ModuleBody, ModuleKind, ModuleSize};
    use crate::store::SESSION_EXPIRED_MESSAGE;
    use modulo_sync::MemoryRemote;

    fn session(remote: Arc<MemoryRemote>) -> Session {
        Session::new(remote, LocalPrefs::in_memory(), &WorkspaceConfig::default())
    }

    #[test]
    fn test_sample_modules_normalize() {
        let modules: Vec<_> = sample_modules()
            .iter()
            .map(modulo_core::normalize)
            .collect();
        assert_eq!(modules[0].kind(), ModuleKind::Calendar);
        assert_eq!(modules[0].size, ModuleSize::Large);
        assert_eq!(modules[1].title, "Notes");
        let ModuleBody::Note { items } = &modules[1].body else {
            panic!("expected a note");
        };
        assert_eq!(items[0].text, "Welcome to your workspace");
        assert_eq!(modules[2].kind(), ModuleKind::TaskList);
    }

    #[tokio::test]
    async fn test_signed_out_shows_samples() {
        let mut session = session(Arc::new(MemoryRemote::new()));
        session.open_workspace().await;
        let store = session.store();
        assert_eq!(store.modules().len(), 3);
        assert_eq!(store.status().unwrap().text, SIGN_IN_PROMPT);
        assert!(!store.is_persisting());
    }

    #[tokio::test]
    async fn test_register_validates_locally() {
        let mut session = session(Arc::new(MemoryRemote::new()));
        let err = session.register("Ada", "", "ada@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(msg) if msg == REGISTER_FIELDS_REQUIRED));
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn test_register_then_open_empty_workspace() {
        let mut session = session(Arc::new(MemoryRemote::new()));
        session.register("Ada", "Lovelace", "ada@example.com", "pw").await.unwrap();
        session.open_workspace().await;
        assert!(session.store().is_persisting());
        assert!(session.store().status().is_none());
        assert_eq!(session.store().modules().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_login_surfaces_remote_error() {
        let mut session = session(Arc::new(MemoryRemote::new()));
        let err = session.sign_in("nobody@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::Remote(e) if e.is_authorization()));
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_samples() {
        let remote = Arc::new(MemoryRemote::new());
        let mut session = session(remote.clone());
        session.register("Ada", "Lovelace", "ada@example.com", "pw").await.unwrap();
        remote.set_offline(true);
        session.open_workspace().await;
        assert_eq!(session.store().status().unwrap().text, SAMPLE_FALLBACK);
        assert!(!session.store().needs_reauth());
        assert!(!session.store().is_persisting());
        assert!(session.is_signed_in());
    }

    #[tokio::test]
    async fn test_rejected_credential_prompts_sign_in() {
        let remote = Arc::new(MemoryRemote::new());
        let mut session = session(remote.clone());
        session.register("Ada", "Lovelace", "ada@example.com", "pw").await.unwrap();
        remote.revoke_all().await;
        session.open_workspace().await;

        let store = session.store();
        assert!(store.needs_reauth());
        assert_eq!(store.status().unwrap().text, SESSION_EXPIRED_MESSAGE);
        assert_eq!(store.modules().len(), 3);
        assert!(!store.is_persisting());
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out_stops_saving() {
        let mut session = session(Arc::new(MemoryRemote::new()));
        session.register("Ada", "Lovelace", "ada@example.com", "pw").await.unwrap();
        session.open_workspace().await;
        session.sign_out().unwrap();
        assert!(!session.is_signed_in());
        assert!(!session.store().is_persisting());
    }

    #[test]
    fn test_layout_mode_restored_from_prefs() {
        let mut prefs = LocalPrefs::in_memory();
        prefs.set(LAYOUT_MODE_KEY, "free").unwrap();
        let session = Session::new(Arc::new(MemoryRemote::new()), prefs, &WorkspaceConfig::default());
        assert_eq!(session.store().mode(), LayoutMode::Free);
    }
}
