//! # axum-pg-explorer
//!
//! A browser-based PostgreSQL table explorer, easily integrable as an Axum
//! layer.
//!
//! ## Features
//!
//! - Browse any database reachable by connection string; the string is
//!   supplied per request and never stored server-side
//! - Paginated, sortable data grid with structured column filters
//!   (AND/OR chains) compiled to a single parameterized query
//! - Literal display form of every executed query, with per-table history
//!   and replay
//! - Reorderable, hideable, color-taggable columns
//! - In-place cell editing
//!
//! ## Security Warning
//!
//! **This is a development tool only!**
//!
//! - No authentication/authorization built-in
//! - The connection string travels with every request
//! - Filter clauses are trusted raw SQL; any connected user has the full
//!   power of the supplied connection
//! - Should never be exposed in production or public networks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use axum_pg_explorer::ExplorerLayer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/", get(|| async { "Hello, World!" }))
//!         .merge(ExplorerLayer::postgres("/explorer").into_router());
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod api;
pub mod database;
pub mod frontend;
pub mod grid;
pub mod layer;
pub mod schema;
pub mod sql;
pub mod storage;

// Public exports
pub use grid::{ColumnViewState, EditState, GridController, NavState, QueryHistoryEntry};
pub use layer::ExplorerLayer;
pub use schema::TableData;
pub use sql::{FilterCondition, FilterOperator, LogicalOp, Pagination, SortDirection, SortSpec};
pub use storage::{KeyValueStore, MemoryStore};

// Re-export database boundary
pub use database::postgres::PostgresSource;
pub use database::traits::{CellUpdate, PageRequest, TableSource};

// Error type
use thiserror::Error;

/// Crate-wide error taxonomy
///
/// Connection and query failures carry the driver message verbatim so the
/// client can show it unchanged. Validation failures are caught before any
/// network call; a stale row means the edit target vanished between render
/// and save.
#[derive(Debug, Error)]
pub enum Error {
    /// Cannot reach or authenticate to the database
    #[error("{0}")]
    Connection(String),

    /// The database rejected a statement (bad identifier, bad filter
    /// syntax, permission denied)
    #[error("{0}")]
    Query(String),

    /// A required field is missing or malformed; no network call was made
    #[error("{0}")]
    Validation(String),

    /// The edit target row is no longer on the re-derived page
    #[error("Invalid row index: row {row_index} is not among the {rows_on_page} rows on the current page")]
    StaleRow {
        row_index: usize,
        rows_on_page: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
