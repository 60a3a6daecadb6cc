//! Database boundary
//!
//! The trait the grid consumes, and its PostgreSQL implementation.

pub mod postgres;
pub mod traits;

pub use postgres::PostgresSource;
pub use traits::{CellUpdate, PageRequest, TableSource};
