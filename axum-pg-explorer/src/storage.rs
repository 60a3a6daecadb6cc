//! Client-side persistent state
//!
//! Starred tables, the last-used connection string, and per-table query
//! history all go through an injected key-value abstraction so the grid
//! logic never touches the storage medium directly. The browser client
//! backs it with `localStorage`; tests and the controller default use the
//! in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Namespaced keys, one per concern
pub mod keys {
    /// JSON array of starred table names
    pub const STARRED_TABLES: &str = "starred_tables";

    /// Last connection string that produced a successful table listing
    pub const LAST_CONNECTION: &str = "last_connection";

    /// Per-table bounded query history
    pub fn query_history(table: &str) -> String {
        format!("query_history:{table}")
    }
}

/// Opaque string-to-string store with get/set/remove
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store used in tests and headless sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .remove(key);
    }
}
