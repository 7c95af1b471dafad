//! In-process key-value store with per-entry expiry
//!
//! Backs the session's credential cache and document cache. A miss on the
//! exact key retries with the lowercased key, so callers that normalize
//! keys differently still find each other's entries.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// String key-value store with optional time-to-live per entry
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value. Expired entries are dropped and count as a miss;
    /// a miss on the exact key falls back to the lowercased key.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        if let Some(value) = Self::live_value(&mut entries, key) {
            return Some(value);
        }
        let lowered = key.to_lowercase();
        if lowered == key {
            return None;
        }
        Self::live_value(&mut entries, &lowered)
    }

    /// Store a value, replacing any previous entry. `ttl` of `None` keeps
    /// the entry for the lifetime of the store.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Option<Duration>) {
        let entry = Entry {
            value: value.into(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.lock().insert(key.into(), entry);
    }

    /// Drop an entry if present
    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    fn live_value(entries: &mut HashMap<String, Entry>, key: &str) -> Option<String> {
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().expect("store mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_value() {
        let store = MemoryStore::new();
        store.set("auth_token", "tok", None);
        assert_eq!(store.get("auth_token").as_deref(), Some("tok"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent"), None);
    }

    #[test]
    fn test_expired_entry_counts_as_miss() {
        let store = MemoryStore::new();
        store.set("auth_token", "tok", Some(Duration::ZERO));
        assert_eq!(store.get("auth_token"), None);
    }

    #[test]
    fn test_unexpired_ttl_entry_is_returned() {
        let store = MemoryStore::new();
        store.set("auth_token", "tok", Some(Duration::from_secs(3600)));
        assert_eq!(store.get("auth_token").as_deref(), Some("tok"));
    }

    #[test]
    fn test_miss_falls_back_to_lowercased_key() {
        let store = MemoryStore::new();
        store.set("/contentlibrary/modules/generic.htm", "<html></html>", None);
        assert_eq!(
            store.get("/CONTENTLIBRARY/MODULES/GENERIC.htm").as_deref(),
            Some("<html></html>")
        );
    }

    #[test]
    fn test_remove_drops_entry() {
        let store = MemoryStore::new();
        store.set("auth_token", "tok", None);
        store.remove("auth_token");
        assert_eq!(store.get("auth_token"), None);
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let store = MemoryStore::new();
        store.set("auth_token", "old", None);
        store.set("auth_token", "new", None);
        assert_eq!(store.get("auth_token").as_deref(), Some("new"));
    }
}
