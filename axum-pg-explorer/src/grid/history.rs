//! Per-table query history
//!
//! An append-to-front, bounded log of compiled queries, persisted through
//! the key-value boundary. Re-running a query whose display SQL is already
//! present moves the existing entry to the front instead of duplicating it.

use serde::{Deserialize, Serialize};

use crate::sql::compile::SortSpec;
use crate::sql::filter::FilterCondition;
use crate::storage::{keys, KeyValueStore};

/// Entries kept per table; the oldest is evicted past this
pub const HISTORY_LIMIT: usize = 50;

/// One remembered query with the state needed to replay it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHistoryEntry {
    /// Literal display form; also the deduplication key
    pub display_sql: String,

    /// Filter chain snapshot at compilation time
    pub filters: Vec<FilterCondition>,

    /// Sort snapshot at compilation time
    pub sort: SortSpec,

    /// Epoch milliseconds
    pub timestamp: i64,
}

impl QueryHistoryEntry {
    pub fn new(display_sql: String, filters: Vec<FilterCondition>, sort: SortSpec) -> Self {
        Self {
            display_sql,
            filters,
            sort,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// History for a table, most recent first
///
/// A missing or unreadable payload yields an empty history.
pub fn list(store: &dyn KeyValueStore, table: &str) -> Vec<QueryHistoryEntry> {
    store
        .get(&keys::query_history(table))
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

/// Record a compiled query for a table
///
/// Deduplicates by exact display SQL (the match moves to the front), caps
/// the log at [`HISTORY_LIMIT`], and persists the result.
pub fn append(store: &dyn KeyValueStore, table: &str, entry: QueryHistoryEntry) {
    let mut entries = list(store, table);
    entries.retain(|existing| existing.display_sql != entry.display_sql);
    entries.insert(0, entry);
    entries.truncate(HISTORY_LIMIT);

    match serde_json::to_string(&entries) {
        Ok(payload) => store.set(&keys::query_history(table), &payload),
        Err(error) => tracing::warn!(%error, table, "failed to persist query history"),
    }
}

/// Drop a table's history
pub fn clear(store: &dyn KeyValueStore, table: &str) {
    store.remove(&keys::query_history(table));
}
