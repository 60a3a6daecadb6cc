//! Grid state
//!
//! The client-side half of the explorer: column view state, the
//! interaction controller, per-table query history, and the durable
//! address state.

pub mod controller;
pub mod history;
pub mod nav;
pub mod view;

pub use controller::{EditState, GridController, PAGE_LIMIT};
pub use history::{QueryHistoryEntry, HISTORY_LIMIT};
pub use nav::NavState;
pub use view::ColumnViewState;
