//! Fetch boundary trait
//!
//! The interface the grid logic consumes for everything that touches the
//! database. Implementations open a fresh connection from the supplied
//! connection string for every call and release it on every exit path;
//! concurrent calls are independent and never share a connection.

use async_trait::async_trait;

use crate::schema::TableData;
use crate::sql::compile::SortSpec;
use crate::Result;

/// Parameters of one page fetch
///
/// Doubles as the staleness tag for in-flight requests: a response is only
/// applied while the grid state still matches the request it was issued
/// for.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub table: String,

    /// 1-based page number
    pub page: u64,

    pub limit: u64,

    pub sort: SortSpec,

    /// Compiled filter clause; empty means unfiltered. Travels to the
    /// executor as trusted raw text.
    pub where_clause: String,
}

/// Parameters of one cell update
///
/// The target row is re-derived server-side from (table, page, limit) and
/// matched by whole-row value equality.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub table: String,

    pub column: String,

    /// 0-based index of the row within its page
    pub row_index: usize,

    pub page: u64,

    pub limit: u64,

    /// `None` writes SQL NULL
    pub new_value: Option<String>,
}

/// Source of table listings, row pages, and cell updates
#[async_trait]
pub trait TableSource: Send + Sync + 'static {
    /// Names of the base tables reachable through the connection string
    async fn list_tables(&self, postgres_url: &str) -> Result<Vec<String>>;

    /// One page of rows plus the total row count under the same predicate
    ///
    /// Count and data are always computed together; if either fails the
    /// whole fetch fails and no partial page is surfaced.
    async fn fetch_page(&self, postgres_url: &str, request: &PageRequest) -> Result<TableData>;

    /// Update a single cell, identifying the row by whole-row equality
    ///
    /// Fails with [`Error::StaleRow`](crate::Error::StaleRow) when the row
    /// index no longer falls inside the re-derived page.
    async fn update_cell(&self, postgres_url: &str, update: &CellUpdate) -> Result<()>;
}
