//! Opaque identifiers for modules and items.
//!
//! Ids are assigned once at creation and never rewritten, except when a
//! loaded snapshot carries a duplicate: the later copy gets a fresh id.

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

/// Generate a fresh identifier (v4 UUID, simple hex form).
///
/// Collisions are not checked; 122 random bits make them negligible.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Read an id from a raw record field. Non-empty strings and numbers count.
pub(crate) fn id_from_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Set of ids already claimed within one scope (a workspace, or one
/// module's items).
#[derive(Debug, Default)]
pub(crate) struct IdScope {
    seen: HashSet<String>,
}

impl IdScope {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, replacing it with a fresh one if it was already taken.
    /// Returns `true` when the id had to be regenerated.
    pub(crate) fn claim(&mut self, id: &mut String) -> bool {
        if self.seen.insert(id.clone()) {
            return false;
        }
        let mut fresh = generate_id();
        while !self.seen.insert(fresh.clone()) {
            fresh = generate_id();
        }
        log::debug!("duplicate id {id} replaced with {fresh}");
        *id = fresh;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_wide() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_id_from_value() {
        assert_eq!(id_from_value(Some(&Value::from("abc"))), Some("abc".to_string()));
        assert_eq!(id_from_value(Some(&Value::from(42))), Some("42".to_string()));
        assert_eq!(id_from_value(Some(&Value::from("  "))), None);
        assert_eq!(id_from_value(Some(&Value::Null)), None);
        assert_eq!(id_from_value(None), None);
    }

    #[test]
    fn test_scope_regenerates_duplicates_only() {
        let mut scope = IdScope::new();
        let mut first = "x".to_string();
        let mut second = "x".to_string();
        assert!(!scope.claim(&mut first));
        assert!(scope.claim(&mut second));
        assert_eq!(first, "x");
        assert_ne!(second, "x");
    }
}
