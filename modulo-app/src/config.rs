//! Workspace configuration: layout metrics, the preferences file and the
//! monthly calendar display cap. Every field can be overridden from the
//! environment.

use std::path::PathBuf;
use std::str::FromStr;

use modulo_layout::LayoutConfig;

pub const PREFS_PATH_VAR: &str = "MODULO_PREFS_PATH";
pub const CANVAS_WIDTH_VAR: &str = "MODULO_CANVAS_WIDTH";
pub const COLUMN_WIDTH_VAR: &str = "MODULO_COLUMN_WIDTH";
pub const MONTHLY_EVENT_CAP_VAR: &str = "MODULO_MONTHLY_EVENT_CAP";

#[derive(Clone, Debug, PartialEq)]
pub struct WorkspaceConfig {
    pub layout: LayoutConfig,
    /// `None` keeps preferences in memory only.
    pub prefs_path: Option<PathBuf>,
    /// Events shown per month cell before collapsing into "+N more".
    pub monthly_event_cap: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            prefs_path: None,
            monthly_event_cap: 3,
        }
    }
}

impl WorkspaceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(PREFS_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.prefs_path = Some(PathBuf::from(path));
        }
        override_with(&lookup, CANVAS_WIDTH_VAR, &mut config.layout.canvas_width);
        override_with(&lookup, COLUMN_WIDTH_VAR, &mut config.layout.column_width);
        override_with(&lookup, MONTHLY_EVENT_CAP_VAR, &mut config.monthly_event_cap);
        if config.layout.column_width == 0 {
            log::warn!("{COLUMN_WIDTH_VAR} must be positive; using default");
            config.layout.column_width = LayoutConfig::default().column_width;
        }
        config
    }
}

fn override_with<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => log::warn!("Ignoring unparsable {key}={raw:?}"),
    }
}
