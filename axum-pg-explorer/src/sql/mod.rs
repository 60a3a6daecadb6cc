//! Query construction
//!
//! Everything that turns grid state (filters, sort, pagination) into SQL
//! text: identifier and literal quoting, the filter condition model, the
//! query compiler, and the display-only token highlighter.

pub mod compile;
pub mod escape;
pub mod filter;
pub mod highlight;

pub use compile::{compile, count_query, CompiledQuery, Pagination, SortDirection, SortSpec};
pub use escape::{quote_identifier, quote_literal};
pub use filter::{compile_where, FilterCondition, FilterOperator, LogicalOp};
