//! Client-local preferences: the bearer token and the layout mode.
//!
//! Stored as a flat JSON object of string values. A missing file is an empty
//! store; writes go through a temp file and rename.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::remote::Credential;

pub const TOKEN_KEY: &str = "moduloToken";
pub const LAYOUT_MODE_KEY: &str = "moduloLayoutMode";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed preferences file: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct LocalPrefs {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl LocalPrefs {
    /// Preferences that live only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!("Loaded {} preference(s) from {}", values.len(), path.display());
        Ok(Self { path: Some(path), values })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), PrefsError> {
        if self.values.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<Credential> {
        self.get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(Credential::new)
    }

    pub fn set_token(&mut self, credential: &Credential) -> Result<(), PrefsError> {
        self.set(TOKEN_KEY, credential.as_str())
    }

    pub fn clear_token(&mut self) -> Result<(), PrefsError> {
        self.remove(TOKEN_KEY)
    }

    fn save(&self) -> Result<(), PrefsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.values)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
