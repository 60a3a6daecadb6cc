//! Wire types of the REST protocol
//!
//! Field names follow the JSON protocol the browser client speaks:
//! snake_case keys, POST bodies carrying the connection string on every
//! request.

use serde::{Deserialize, Serialize};

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

/// One table in the listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
}

/// Request to list the tables reachable through a connection string
#[derive(Debug, Clone, Deserialize)]
pub struct TablesRequest {
    pub postgres_url: String,
}

/// Response from listing tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<TableInfo>,
}

/// Request for one page of table rows
#[derive(Debug, Clone, Deserialize)]
pub struct TableDataRequest {
    pub postgres_url: String,

    pub table_name: String,

    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Column to sort by; absent means no ORDER BY
    #[serde(default)]
    pub sort_column: Option<String>,

    /// Anything other than exactly "desc" sorts ascending
    #[serde(default)]
    pub sort_direction: Option<String>,

    /// Compiled filter clause, accepted as trusted raw SQL text
    #[serde(default)]
    pub where_clause: Option<String>,
}

/// One fetched page of a table
///
/// Every row has exactly `columns.len()` cells, position-aligned to
/// `columns`; `columns` keeps the source order and is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,

    pub rows: Vec<Vec<serde_json::Value>>,

    pub total_rows: u64,

    /// Literal-interpolated display form of the statement that produced
    /// this page
    pub query: String,
}

/// Request to update a single cell
///
/// The target row is identified positionally: the server re-derives the
/// page at (table, page, limit) and matches the whole row by value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCellRequest {
    pub postgres_url: String,

    pub table_name: String,

    pub column_name: String,

    /// 0-based index of the row within its page
    pub row_index: usize,

    pub page: u64,

    #[serde(default = "default_limit")]
    pub limit: u64,

    /// `None` writes SQL NULL
    pub new_value: Option<String>,
}

/// Response from a successful cell update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCellResponse {
    pub success: bool,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
