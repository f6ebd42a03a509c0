//! Listing building blocks shared by every table screen
//!
//! A `Listing` ties together the validated column set, the query-parameter
//! state, the visible table and the debounced search task of one screen.

pub mod columns;
pub mod query;
pub mod route;
pub mod search;
pub mod table;

use crate::error::{ConfigurationError, QueryParamError};
use crate::model::Record;
use crate::services::store::{Collection, PageMeta};
use columns::{ColumnDescriptor, ColumnSet};
use query::{FilterValue, QueryState, SortParam};
use search::{SearchStep, SearchTask};
use std::time::{Duration, Instant};
use table::TableViewState;

pub use route::{Route, Router};

#[derive(Debug, Clone)]
pub struct Listing<R> {
    columns: ColumnSet,
    query: QueryState,
    table: TableViewState<R>,
    search: SearchTask,
    /// Text currently in the search field
    search_input: String,
    meta: PageMeta,
    /// Explicit refresh request, on top of query-driven ones
    refresh_requested: bool,
}

impl<R: Record> Listing<R> {
    /// Fails when a column filters on a parameter the query state does not declare
    pub fn new(
        columns: ColumnSet,
        query: QueryState,
        search_debounce: Duration,
    ) -> Result<Self, ConfigurationError> {
        columns.check_filter_params(query.spec())?;
        let search_input = query.query().unwrap_or_default().to_string();
        Ok(Self {
            columns,
            query,
            table: TableViewState::new(),
            search: SearchTask::new(search_debounce),
            search_input,
            meta: PageMeta::default(),
            refresh_requested: false,
        })
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn table(&self) -> &TableViewState<R> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableViewState<R> {
        &mut self.table
    }

    pub fn meta(&self) -> PageMeta {
        self.meta
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// Hand a fetched page to the table
    pub fn set_model(&mut self, collection: Collection<R>) {
        self.table.set_rows(collection.records);
        self.meta = collection.meta;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Feed the search field's new text into the debounced search task
    pub fn search(&mut self, value: &str, now: Instant) -> SearchStep {
        self.search_input = value.to_string();
        self.search.perform(value, now, &mut self.query)
    }

    /// Commit a due search, returning the committed value
    pub fn poll_search(&mut self, now: Instant) -> Option<String> {
        self.search.poll(now, &mut self.query)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting, Paging, Filtering
    // ─────────────────────────────────────────────────────────────────────────

    /// Column under the column cursor, among visible columns
    pub fn focused_column(&self) -> Option<&ColumnDescriptor> {
        let visible = self.columns.visible();
        let index = self.table.column_cursor().min(visible.len().saturating_sub(1));
        visible.get(index).copied()
    }

    pub fn move_column(&mut self, delta: isize) {
        let count = self.columns.visible().len();
        self.table.move_column(delta, count);
    }

    pub fn focus_column(&mut self, index: usize) {
        let count = self.columns.visible().len();
        self.table.focus_column(index, count);
    }

    /// Cycle the focused column's sort: ascending, descending, none
    ///
    /// Returns false when the focused column is not sortable.
    pub fn toggle_sort(&mut self) -> bool {
        let Some(key) = self
            .focused_column()
            .and_then(ColumnDescriptor::sort_key)
            .map(str::to_string)
        else {
            return false;
        };

        let next = match self.query.sort() {
            Some(current) if current.key == key && !current.descending => {
                Some(SortParam::descending(&key))
            }
            Some(current) if current.key == key => None,
            _ => Some(SortParam::ascending(&key)),
        };
        self.query.set_sort(next);
        true
    }

    pub fn next_page(&mut self) -> bool {
        let page = self.query.page();
        page < self.meta.last_page && self.query.set_page(page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        let page = self.query.page();
        page > 1 && self.query.set_page(page - 1)
    }

    /// Apply filter values, returning whether any parameter changed
    ///
    /// A change starts the listing over from the first page.
    pub fn apply_filters(
        &mut self,
        values: Vec<(String, Option<FilterValue>)>,
    ) -> Result<bool, QueryParamError> {
        let mut changed = false;
        for (param, value) in values {
            changed |= self.query.set_filter(&param, value)?;
        }
        if changed {
            self.query.set_page(1);
        }
        Ok(changed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Refresh
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask the route to fetch the model again
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Consume every waiting refresh request
    pub fn take_refresh(&mut self) -> bool {
        let explicit = std::mem::take(&mut self.refresh_requested);
        let from_query = self.query.take_refresh();
        explicit || from_query
    }
}
