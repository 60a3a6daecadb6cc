//! Column view state
//!
//! A client-local projection over a table's physical columns: display
//! order, visibility, and a color tag per column. Entirely independent of
//! the fetched data; it survives page, sort, and filter changes and is
//! discarded only when a different table is selected.

use std::collections::HashMap;

/// Alpha suffix appended to a column color for the cell background;
/// 8-digit hex with ~20% opacity.
const BACKGROUND_ALPHA_SUFFIX: &str = "33";

/// Per-table ordering, visibility, and color mapping over column indices
#[derive(Debug, Clone, Default)]
pub struct ColumnViewState {
    order: Vec<usize>,
    visibility: HashMap<usize, bool>,
    colors: HashMap<usize, String>,
}

impl ColumnViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first initialization for a selected table
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Guarded initializer, invoked once per table-selection lifecycle
    ///
    /// Sets identity order, all columns visible, no colors, but only when
    /// the view is still empty. A data refresh for the same table arrives
    /// with the view already populated and must not reset it.
    pub fn ensure_initialized(&mut self, column_count: usize) {
        if !self.is_empty() || column_count == 0 {
            return;
        }

        self.order = (0..column_count).collect();
        for index in 0..column_count {
            self.visibility.insert(index, true);
        }
        self.colors.clear();
    }

    /// Discard everything; used when the selected table changes
    pub fn reset(&mut self) {
        self.order.clear();
        self.visibility.clear();
        self.colors.clear();
    }

    /// Current display order over physical column indices
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visibility.get(&index).copied().unwrap_or(true)
    }

    pub fn toggle_visible(&mut self, index: usize) {
        let visible = self.is_visible(index);
        self.visibility.insert(index, !visible);
    }

    /// Color tag for a column; `None` clears it
    pub fn set_color(&mut self, index: usize, color: Option<String>) {
        match color {
            Some(color) if !color.is_empty() => {
                self.colors.insert(index, color);
            }
            _ => {
                self.colors.remove(&index);
            }
        }
    }

    pub fn color(&self, index: usize) -> Option<&str> {
        self.colors.get(&index).map(String::as_str)
    }

    /// Configured color blended with fixed partial opacity for the cell
    /// background
    pub fn display_color(&self, index: usize) -> Option<String> {
        self.colors
            .get(&index)
            .map(|color| format!("{color}{BACKGROUND_ALPHA_SUFFIX}"))
    }

    /// Move `dragged` so it sits immediately before `target`'s prior
    /// position
    ///
    /// Both arguments are physical column indices. The order stays a pure
    /// permutation: unknown indices are ignored, nothing is duplicated or
    /// dropped.
    pub fn reorder(&mut self, dragged: usize, target: usize) {
        if dragged == target {
            return;
        }
        let Some(from) = self.order.iter().position(|&i| i == dragged) else {
            return;
        };
        let Some(to) = self.order.iter().position(|&i| i == target) else {
            return;
        };

        self.order.remove(from);
        self.order.insert(to.min(self.order.len()), dragged);
    }

    /// Display projection: ordered indices that are visible and whose
    /// column name is non-blank
    ///
    /// Blank-named columns (unnamed computed expressions) never display,
    /// independent of their visibility flag.
    pub fn visible_ordered_columns(&self, column_names: &[String]) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&index| {
                self.is_visible(index)
                    && column_names
                        .get(index)
                        .is_some_and(|name| !name.trim().is_empty())
            })
            .collect()
    }
}
