//! Grid interaction controller
//!
//! Reconciles pagination, sort toggling, filter application, table
//! switching, cell editing, and query history against the fetch boundary.
//! All state transitions happen on one logical thread of control; network
//! fetches are tagged with the request they were issued for and a response
//! is discarded when the grid state has moved on (last write wins, stale
//! responses never overwrite newer state).

use std::collections::BTreeSet;

use crate::database::traits::{CellUpdate, PageRequest, TableSource};
use crate::grid::history::{self, QueryHistoryEntry};
use crate::grid::nav::NavState;
use crate::grid::view::ColumnViewState;
use crate::schema::TableData;
use crate::sql::compile::{compile, Pagination, SortDirection, SortSpec};
use crate::sql::filter::{compile_where, FilterCondition};
use crate::storage::{keys, KeyValueStore};
use crate::{Error, Result};

/// Page size used by the grid
pub const PAGE_LIMIT: u64 = 20;

/// Cell edit lifecycle; at most one cell is ever editing or saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Editing {
        row: usize,
        display_col: usize,
        value: String,
    },
    Saving {
        row: usize,
        display_col: usize,
        value: String,
    },
}

/// Drives the data grid against a [`TableSource`] and a [`KeyValueStore`]
pub struct GridController<S, K> {
    source: S,
    store: K,
    connection_string: String,
    tables: Vec<String>,
    starred: BTreeSet<String>,
    selected_table: Option<String>,
    page: u64,
    limit: u64,
    sort: SortSpec,
    filters: Vec<FilterCondition>,
    data: Option<TableData>,
    view: ColumnViewState,
    edit: EditState,
}

impl<S: TableSource, K: KeyValueStore> GridController<S, K> {
    pub fn new(source: S, store: K) -> Self {
        let starred = store
            .get(keys::STARRED_TABLES)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        Self {
            source,
            store,
            connection_string: String::new(),
            tables: Vec::new(),
            starred,
            selected_table: None,
            page: 1,
            limit: PAGE_LIMIT,
            sort: SortSpec::default(),
            filters: Vec::new(),
            data: None,
            view: ColumnViewState::new(),
            edit: EditState::Idle,
        }
    }

    /// Connection string of the last successful connect, if persisted
    pub fn last_connection(&self) -> Option<String> {
        self.store.get(keys::LAST_CONNECTION)
    }

    /// Connect and list tables
    ///
    /// Validates the connection string before any network call; on success
    /// the grid resets to its unselected state and the connection string is
    /// persisted as the last-used one.
    pub async fn connect(&mut self, postgres_url: &str) -> Result<&[String]> {
        if postgres_url.trim().is_empty() {
            return Err(Error::Validation(
                "PostgreSQL URL is required".to_string(),
            ));
        }

        let tables = self.source.list_tables(postgres_url).await?;
        tracing::debug!(count = tables.len(), "connected and listed tables");

        self.connection_string = postgres_url.to_string();
        self.tables = tables;
        self.selected_table = None;
        self.data = None;
        self.page = 1;
        self.sort = SortSpec::default();
        self.filters.clear();
        self.view.reset();
        self.edit = EditState::Idle;
        self.store.set(keys::LAST_CONNECTION, postgres_url);

        Ok(&self.tables)
    }

    pub fn is_connected(&self) -> bool {
        !self.connection_string.is_empty()
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Case-insensitive substring search over the table list, starred
    /// tables first, then alphabetical
    pub fn search_tables(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        let mut matches: Vec<&str> = self
            .tables
            .iter()
            .map(String::as_str)
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by_key(|name| (!self.starred.contains(*name), name.to_string()));
        matches
    }

    pub fn is_starred(&self, table: &str) -> bool {
        self.starred.contains(table)
    }

    /// Toggle a table's starred flag and persist the set
    pub fn toggle_star(&mut self, table: &str) {
        if !self.starred.remove(table) {
            self.starred.insert(table.to_string());
        }
        let names: Vec<&str> = self.starred.iter().map(String::as_str).collect();
        match serde_json::to_string(&names) {
            Ok(payload) => self.store.set(keys::STARRED_TABLES, &payload),
            Err(error) => tracing::warn!(%error, "failed to persist starred tables"),
        }
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    pub fn data(&self) -> Option<&TableData> {
        self.data.as_ref()
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn filters(&self) -> &[FilterCondition] {
        &self.filters
    }

    pub fn view(&self) -> &ColumnViewState {
        &self.view
    }

    /// View mutations (reorder, show/hide, recolor) are pure state changes
    /// with no network effect
    pub fn view_mut(&mut self) -> &mut ColumnViewState {
        &mut self.view
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    /// 1-based index of the first row on the current page
    pub fn start_row(&self) -> u64 {
        self.pagination().start_row()
    }

    /// 1-based index of the last row on the current page, clamped to the
    /// total
    pub fn end_row(&self) -> u64 {
        let total = self.data.as_ref().map_or(0, |data| data.total_rows);
        self.pagination().end_row(total)
    }

    pub fn total_pages(&self) -> u64 {
        let total = self.data.as_ref().map_or(0, |data| data.total_rows);
        self.pagination().total_pages(total)
    }

    /// Durable address state: selected table and page
    pub fn nav_state(&self) -> NavState {
        NavState::new(self.selected_table.clone(), self.page)
    }

    /// Select a table: page 1, no sort, no filters, fresh view, then an
    /// unconditional fetch
    pub async fn select_table(&mut self, table: &str) -> Result<()> {
        self.selected_table = Some(table.to_string());
        self.page = 1;
        self.sort = SortSpec::default();
        self.filters.clear();
        self.view.reset();
        self.data = None;
        self.edit = EditState::Idle;
        self.refresh().await
    }

    /// Jump to a page, preserving sort and filters
    pub async fn set_page(&mut self, page: u64) -> Result<()> {
        self.page = page.max(1);
        self.refresh().await
    }

    /// Sort by a column, or flip the direction when it is already the
    /// active sort column; refetches at the current page
    pub async fn toggle_sort(&mut self, column: &str, direction: SortDirection) -> Result<()> {
        self.sort = if self.sort.column.as_deref() == Some(column) {
            self.sort.flipped()
        } else {
            SortSpec::by(column, direction)
        };
        self.refresh().await
    }

    /// Edit the filter chain without fetching; takes effect on
    /// [`apply_filters`](Self::apply_filters)
    pub fn set_filters(&mut self, filters: Vec<FilterCondition>) {
        self.filters = filters;
    }

    pub fn add_filter(&mut self, condition: FilterCondition) {
        self.filters.push(condition);
    }

    pub fn remove_filter(&mut self, id: &str) {
        self.filters.retain(|condition| condition.id != id);
    }

    /// Compile the current filter chain, reset to page 1, and fetch
    pub async fn apply_filters(&mut self) -> Result<()> {
        self.page = 1;
        self.refresh().await
    }

    /// Query history of the selected table, most recent first
    pub fn history(&self) -> Vec<QueryHistoryEntry> {
        match &self.selected_table {
            Some(table) => history::list(&self.store, table),
            None => Vec::new(),
        }
    }

    /// Restore a history entry's sort and filters, reset to page 1, fetch
    pub async fn replay(&mut self, entry: &QueryHistoryEntry) -> Result<()> {
        self.filters = entry.filters.clone();
        self.sort = entry.sort.clone();
        self.page = 1;
        self.refresh().await
    }

    /// Restore table and page from a parsed address
    pub async fn restore_nav(&mut self, nav: &NavState) -> Result<()> {
        let Some(table) = &nav.table else {
            return Ok(());
        };
        self.select_table(table).await?;
        if nav.page > 1 {
            self.set_page(nav.page).await?;
        }
        Ok(())
    }

    /// Build the boundary request for the current grid state
    pub fn fetch_request(&self) -> Result<PageRequest> {
        let table = self
            .selected_table
            .clone()
            .ok_or_else(|| Error::Validation("No table selected".to_string()))?;

        Ok(PageRequest {
            table,
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
            where_clause: compile_where(&self.filters),
        })
    }

    fn request_matches_state(&self, request: &PageRequest) -> bool {
        self.selected_table.as_deref() == Some(request.table.as_str())
            && self.page == request.page
            && self.limit == request.limit
            && self.sort == request.sort
            && compile_where(&self.filters) == request.where_clause
    }

    /// Install a fetched page, unless the grid state has moved on since the
    /// request was issued
    ///
    /// Returns false when the response was discarded as stale. On success
    /// the view is initialized for a freshly selected table and the
    /// compiled query is recorded in the table's history.
    pub fn apply_page(&mut self, request: &PageRequest, data: TableData) -> bool {
        if !self.request_matches_state(request) {
            tracing::debug!(table = %request.table, "discarding stale page response");
            return false;
        }

        let pagination = Pagination::new(request.page, request.limit);
        let display_sql = compile(
            &request.table,
            &request.where_clause,
            &request.sort,
            &pagination,
        )
        .display_sql;

        self.view.ensure_initialized(data.columns.len());
        self.data = Some(data);
        history::append(
            &self.store,
            &request.table,
            QueryHistoryEntry::new(display_sql, self.filters.clone(), self.sort.clone()),
        );
        true
    }

    /// Fetch the current page and apply it
    pub async fn refresh(&mut self) -> Result<()> {
        let request = self.fetch_request()?;
        let data = self
            .source
            .fetch_page(&self.connection_string, &request)
            .await?;
        self.apply_page(&request, data);
        Ok(())
    }

    /// Enter edit mode on a cell, snapshotting its current value as text
    ///
    /// `display_col` addresses the visible, reordered projection; NULL
    /// renders as the literal text `null`.
    pub fn begin_edit(&mut self, row: usize, display_col: usize) -> Result<()> {
        if self.edit != EditState::Idle {
            return Err(Error::Validation(
                "Another cell edit is already in progress".to_string(),
            ));
        }

        let data = self
            .data
            .as_ref()
            .ok_or_else(|| Error::Validation("No table data loaded".to_string()))?;
        let visible = self.view.visible_ordered_columns(&data.columns);
        let physical = *visible
            .get(display_col)
            .ok_or_else(|| Error::Validation("Column is not visible".to_string()))?;
        let cell = data
            .rows
            .get(row)
            .and_then(|cells| cells.get(physical))
            .ok_or_else(|| Error::Validation("Cell is out of bounds".to_string()))?;

        self.edit = EditState::Editing {
            row,
            display_col,
            value: cell_text(cell),
        };
        Ok(())
    }

    /// Current edit buffer, when a cell is being edited
    pub fn edit_value(&self) -> Option<&str> {
        match &self.edit {
            EditState::Editing { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn set_edit_value(&mut self, text: impl Into<String>) {
        if let EditState::Editing { value, .. } = &mut self.edit {
            *value = text.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.edit, EditState::Editing { .. }) {
            self.edit = EditState::Idle;
        }
    }

    /// Commit the edited cell
    ///
    /// The literal input `null` or an empty string writes SQL NULL;
    /// anything else is the literal text typed. On success the edit returns
    /// to idle and the current page is refetched; on failure the cell stays
    /// in edit mode and the error is surfaced.
    pub async fn save_edit(&mut self) -> Result<()> {
        let EditState::Editing {
            row,
            display_col,
            value,
        } = self.edit.clone()
        else {
            return Err(Error::Validation("No cell is being edited".to_string()));
        };

        let (table, update) = {
            let data = self
                .data
                .as_ref()
                .ok_or_else(|| Error::Validation("No table data loaded".to_string()))?;
            let table = self
                .selected_table
                .clone()
                .ok_or_else(|| Error::Validation("No table selected".to_string()))?;
            let visible = self.view.visible_ordered_columns(&data.columns);
            let physical = *visible
                .get(display_col)
                .ok_or_else(|| Error::Validation("Column is not visible".to_string()))?;
            let column = data.columns[physical].clone();

            let trimmed = value.trim();
            let new_value = if trimmed == "null" || trimmed.is_empty() {
                None
            } else {
                Some(value.clone())
            };

            (
                table.clone(),
                CellUpdate {
                    table,
                    column,
                    row_index: row,
                    page: self.page,
                    limit: self.limit,
                    new_value,
                },
            )
        };

        self.edit = EditState::Saving {
            row,
            display_col,
            value: value.clone(),
        };

        match self
            .source
            .update_cell(&self.connection_string, &update)
            .await
        {
            Ok(()) => {
                tracing::debug!(table = %table, column = %update.column, row, "cell updated");
                self.edit = EditState::Idle;
                self.refresh().await
            }
            Err(error) => {
                self.edit = EditState::Editing {
                    row,
                    display_col,
                    value,
                };
                Err(error)
            }
        }
    }
}

/// Text snapshot of a cell value; NULL renders as the literal `null`
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// In-memory table source backed by one dataset, recording every page
    /// request it serves
    #[derive(Clone)]
    struct MockSource {
        state: Arc<Mutex<MockState>>,
    }

    struct MockState {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        requests: Vec<PageRequest>,
        fail_update: bool,
    }

    impl MockSource {
        fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
            Self {
                state: Arc::new(Mutex::new(MockState {
                    columns: columns.iter().map(|c| c.to_string()).collect(),
                    rows,
                    requests: Vec::new(),
                    fail_update: false,
                })),
            }
        }

        fn last_request(&self) -> PageRequest {
            self.state.lock().unwrap().requests.last().cloned().unwrap()
        }

        fn set_rows(&self, rows: Vec<Vec<Value>>) {
            self.state.lock().unwrap().rows = rows;
        }

        fn cell(&self, row: usize, col: usize) -> Value {
            self.state.lock().unwrap().rows[row][col].clone()
        }
    }

    #[async_trait]
    impl TableSource for MockSource {
        async fn list_tables(&self, _postgres_url: &str) -> crate::Result<Vec<String>> {
            Ok(vec!["orders".to_string(), "users".to_string()])
        }

        async fn fetch_page(
            &self,
            _postgres_url: &str,
            request: &PageRequest,
        ) -> crate::Result<TableData> {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());

            let pagination = Pagination::new(request.page, request.limit);
            let start = pagination.offset() as usize;
            let window = state
                .rows
                .iter()
                .skip(start)
                .take(request.limit as usize)
                .cloned()
                .collect();

            Ok(TableData {
                columns: state.columns.clone(),
                rows: window,
                total_rows: state.rows.len() as u64,
                query: String::new(),
            })
        }

        async fn update_cell(
            &self,
            _postgres_url: &str,
            update: &CellUpdate,
        ) -> crate::Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.fail_update {
                return Err(Error::Query("permission denied".to_string()));
            }

            let pagination = Pagination::new(update.page, update.limit);
            let start = pagination.offset() as usize;
            let on_page = state.rows.len().saturating_sub(start).min(update.limit as usize);
            if update.row_index >= on_page {
                return Err(Error::StaleRow {
                    row_index: update.row_index,
                    rows_on_page: on_page,
                });
            }

            let column = state
                .columns
                .iter()
                .position(|name| name == &update.column)
                .expect("unknown column in update");
            let absolute = start + update.row_index;
            state.rows[absolute][column] = match &update.new_value {
                Some(text) => json!(text),
                None => Value::Null,
            };
            Ok(())
        }
    }

    fn dataset(count: usize) -> Vec<Vec<Value>> {
        (0..count)
            .map(|i| vec![json!(i as i64), json!(format!("user{i}@example.com"))])
            .collect()
    }

    fn controller(
        source: &MockSource,
        store: Arc<MemoryStore>,
    ) -> GridController<MockSource, Arc<MemoryStore>> {
        GridController::new(source.clone(), store)
    }

    async fn connected(
        source: &MockSource,
    ) -> GridController<MockSource, Arc<MemoryStore>> {
        let mut grid = controller(source, Arc::new(MemoryStore::new()));
        grid.connect("postgresql://localhost/demo").await.unwrap();
        grid
    }

    #[tokio::test]
    async fn test_connect_requires_url() {
        let source = MockSource::new(&["id"], dataset(1));
        let mut grid = controller(&source, Arc::new(MemoryStore::new()));
        let error = grid.connect("   ").await.unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        assert!(!grid.is_connected());
    }

    #[tokio::test]
    async fn test_connect_persists_last_connection() {
        let source = MockSource::new(&["id"], dataset(1));
        let grid = connected(&source).await;
        assert_eq!(
            grid.last_connection().as_deref(),
            Some("postgresql://localhost/demo")
        );
        assert_eq!(grid.tables(), &["orders", "users"]);
    }

    #[tokio::test]
    async fn test_select_table_fetches_first_page() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        assert_eq!(grid.page(), 1);
        let data = grid.data().unwrap();
        assert_eq!(data.rows.len(), 20);
        assert_eq!(data.total_rows, 45);
        assert_eq!(grid.view().order(), &[0, 1]);
        assert_eq!(grid.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_pagination_preserves_sort_and_filters() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.toggle_sort("id", SortDirection::Desc).await.unwrap();
        grid.add_filter(FilterCondition::new(
            "email",
            crate::sql::filter::FilterOperator::Contains,
            "ann",
        ));
        grid.apply_filters().await.unwrap();

        grid.set_page(2).await.unwrap();
        let request = source.last_request();
        assert_eq!(request.page, 2);
        assert_eq!(request.sort, SortSpec::by("id", SortDirection::Desc));
        assert_eq!(request.where_clause, "\"email\" LIKE '%ann%'");
    }

    #[tokio::test]
    async fn test_sort_toggle_flips_and_keeps_page() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.set_page(2).await.unwrap();

        grid.toggle_sort("id", SortDirection::Asc).await.unwrap();
        assert_eq!(grid.sort().direction, SortDirection::Asc);
        assert_eq!(source.last_request().page, 2);

        grid.toggle_sort("id", SortDirection::Asc).await.unwrap();
        assert_eq!(grid.sort().direction, SortDirection::Desc);

        grid.toggle_sort("email", SortDirection::Asc).await.unwrap();
        assert_eq!(grid.sort().column.as_deref(), Some("email"));
        assert_eq!(grid.sort().direction, SortDirection::Asc);
    }

    #[tokio::test]
    async fn test_apply_filters_resets_to_first_page() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.set_page(3).await.unwrap();

        grid.add_filter(FilterCondition::new(
            "id",
            crate::sql::filter::FilterOperator::Gt,
            "10",
        ));
        assert_eq!(grid.page(), 3, "editing filters alone must not fetch");

        grid.apply_filters().await.unwrap();
        assert_eq!(grid.page(), 1);
    }

    #[tokio::test]
    async fn test_table_switch_clears_sort_filters_and_view() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.toggle_sort("id", SortDirection::Desc).await.unwrap();
        grid.add_filter(FilterCondition::new(
            "id",
            crate::sql::filter::FilterOperator::Gt,
            "1",
        ));
        grid.apply_filters().await.unwrap();
        grid.view_mut().reorder(1, 0);

        grid.select_table("orders").await.unwrap();
        assert_eq!(grid.page(), 1);
        assert_eq!(grid.sort(), &SortSpec::default());
        assert!(grid.filters().is_empty());
        assert_eq!(grid.view().order(), &[0, 1], "view resets on table switch");
        assert!(source.last_request().where_clause.is_empty());
    }

    #[tokio::test]
    async fn test_view_survives_page_and_sort_changes() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.view_mut().reorder(1, 0);
        grid.view_mut().toggle_visible(0);

        grid.set_page(2).await.unwrap();
        grid.toggle_sort("email", SortDirection::Asc).await.unwrap();

        assert_eq!(grid.view().order(), &[1, 0]);
        assert!(!grid.view().is_visible(0));
    }

    #[tokio::test]
    async fn test_stale_page_response_is_discarded() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        let request = grid.fetch_request().unwrap();
        let stale = TableData {
            columns: vec!["id".to_string(), "email".to_string()],
            rows: vec![vec![json!(999), json!("stale@example.com")]],
            total_rows: 1,
            query: String::new(),
        };

        grid.page = 2;
        assert!(!grid.apply_page(&request, stale));
        assert_ne!(grid.data().unwrap().total_rows, 1);
    }

    #[tokio::test]
    async fn test_history_records_and_replays() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.add_filter(FilterCondition::new(
            "email",
            crate::sql::filter::FilterOperator::Contains,
            "ann",
        ));
        grid.apply_filters().await.unwrap();

        let entry = grid.history().into_iter().next().unwrap();
        assert!(entry.display_sql.contains("'%ann%'"));
        assert!(!entry.display_sql.contains('$'));

        // Diverge, then replay; recompilation reproduces the stored text
        // and the dedupe moves the entry back to the front.
        grid.set_filters(Vec::new());
        grid.apply_filters().await.unwrap();
        grid.replay(&entry).await.unwrap();

        let replayed = grid.history().into_iter().next().unwrap();
        assert_eq!(replayed.display_sql, entry.display_sql);
        assert_eq!(grid.page(), 1);
        let duplicates = grid
            .history()
            .iter()
            .filter(|e| e.display_sql == entry.display_sql)
            .count();
        assert_eq!(duplicates, 1);
    }

    #[tokio::test]
    async fn test_edit_snapshots_null_as_text() {
        let mut rows = dataset(3);
        rows[1][1] = Value::Null;
        let source = MockSource::new(&["id", "email"], rows);
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        grid.begin_edit(1, 1).unwrap();
        assert_eq!(grid.edit_value(), Some("null"));
        grid.cancel_edit();
        assert_eq!(grid.edit_state(), &EditState::Idle);
    }

    #[tokio::test]
    async fn test_only_one_edit_at_a_time() {
        let source = MockSource::new(&["id", "email"], dataset(3));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        grid.begin_edit(0, 0).unwrap();
        let error = grid.begin_edit(1, 1).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_edit_writes_and_refetches() {
        let source = MockSource::new(&["id", "email"], dataset(3));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        grid.begin_edit(2, 1).unwrap();
        grid.set_edit_value("new@example.com");
        grid.save_edit().await.unwrap();

        assert_eq!(grid.edit_state(), &EditState::Idle);
        assert_eq!(source.cell(2, 1), json!("new@example.com"));
        assert_eq!(
            grid.data().unwrap().rows[2][1],
            json!("new@example.com"),
            "grid reflects the committed value after the refetch"
        );
    }

    #[tokio::test]
    async fn test_save_edit_null_keyword_writes_sql_null() {
        let source = MockSource::new(&["id", "email"], dataset(3));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        grid.begin_edit(0, 1).unwrap();
        grid.set_edit_value("null");
        grid.save_edit().await.unwrap();
        assert_eq!(source.cell(0, 1), Value::Null);
    }

    #[tokio::test]
    async fn test_save_edit_resolves_reordered_columns() {
        let source = MockSource::new(&["id", "email"], dataset(3));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        grid.view_mut().reorder(1, 0);

        // Display column 0 is now the physical email column.
        grid.begin_edit(0, 0).unwrap();
        grid.set_edit_value("moved@example.com");
        grid.save_edit().await.unwrap();
        assert_eq!(source.cell(0, 1), json!("moved@example.com"));
    }

    #[tokio::test]
    async fn test_stale_row_save_surfaces_error_without_corruption() {
        let source = MockSource::new(&["id", "email"], dataset(3));
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();
        let before = grid.data().unwrap().clone();

        grid.begin_edit(2, 1).unwrap();
        grid.set_edit_value("too-late@example.com");

        // A concurrent delete shrinks the table between render and save.
        source.set_rows(dataset(1));

        let error = grid.save_edit().await.unwrap_err();
        assert!(matches!(error, Error::StaleRow { .. }));
        assert_eq!(grid.data().unwrap(), &before, "grid is not silently corrupted");
        assert!(
            matches!(grid.edit_state(), EditState::Editing { .. }),
            "failed save returns to editing so the user can retry or cancel"
        );
    }

    #[tokio::test]
    async fn test_failed_update_surfaces_message_verbatim() {
        let source = MockSource::new(&["id", "email"], dataset(3));
        source.state.lock().unwrap().fail_update = true;
        let mut grid = connected(&source).await;
        grid.select_table("users").await.unwrap();

        grid.begin_edit(0, 0).unwrap();
        grid.set_edit_value("7");
        let error = grid.save_edit().await.unwrap_err();
        assert_eq!(error.to_string(), "permission denied");
    }

    #[tokio::test]
    async fn test_starred_tables_persist_across_sessions() {
        let source = MockSource::new(&["id"], dataset(1));
        let store = Arc::new(MemoryStore::new());

        let mut grid = controller(&source, store.clone());
        grid.connect("postgresql://localhost/demo").await.unwrap();
        grid.toggle_star("users");
        assert!(grid.is_starred("users"));
        assert_eq!(grid.search_tables(""), vec!["users", "orders"]);

        let revived = controller(&source, store);
        assert!(revived.is_starred("users"));
    }

    #[tokio::test]
    async fn test_search_tables_is_case_insensitive() {
        let source = MockSource::new(&["id"], dataset(1));
        let grid = connected(&source).await;
        assert_eq!(grid.search_tables("USE"), vec!["users"]);
        assert!(grid.search_tables("nothing").is_empty());
    }

    #[tokio::test]
    async fn test_restore_nav_selects_table_and_page() {
        let source = MockSource::new(&["id", "email"], dataset(45));
        let mut grid = connected(&source).await;
        grid.restore_nav(&NavState::parse("table=users&page=2"))
            .await
            .unwrap();
        assert_eq!(grid.selected_table(), Some("users"));
        assert_eq!(grid.page(), 2);
        assert_eq!(grid.nav_state().to_query_string(), "table=users&page=2");
    }
}
