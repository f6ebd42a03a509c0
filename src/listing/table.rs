//! Table view state
//!
//! Visible rows, row selection, the "all selected" toggle and the focused
//! cell. Rows only change through explicit calls made after a remote
//! operation has resolved.

use crate::model::record::{display_value, lookup};
use crate::model::Record;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct TableViewState<R> {
    rows: Vec<R>,
    /// JSON form of each row, kept in step with `rows` for cell lookups
    values: Vec<Value>,
    /// Selected rows by record id
    selected: HashSet<String>,
    all_toggled: bool,
    cursor: usize,
    column_cursor: usize,
}

impl<R: Record> Default for TableViewState<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> TableViewState<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            values: Vec::new(),
            selected: HashSet::new(),
            all_toggled: false,
            cursor: 0,
            column_cursor: 0,
        }
    }

    /// Replace the rows with a freshly fetched page
    ///
    /// Selection survives for rows still present.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        {
            let ids: HashSet<&str> = rows.iter().filter_map(Record::id).collect();
            self.selected.retain(|id| ids.contains(id.as_str()));
        }
        self.values = rows.iter().map(snapshot).collect();
        self.rows = rows;
        if self.selected.is_empty() {
            self.all_toggled = false;
        }
        self.clamp_cursor();
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display value at `path` in the row at `index`
    pub fn cell_value(&self, index: usize, path: &str) -> Option<String> {
        lookup(self.values.get(index)?, path).and_then(display_value)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_row(&mut self, record: R) {
        self.values.push(snapshot(&record));
        self.rows.push(record);
    }

    /// Remove the row for `record`, returning whether one was removed
    pub fn remove_row(&mut self, record: &R) -> bool {
        let Some(index) = self.position(record) else {
            return false;
        };
        self.rows.remove(index);
        self.values.remove(index);
        if let Some(id) = record.id() {
            self.selected.remove(id);
        }
        self.clamp_cursor();
        true
    }

    /// Replace the row with the same id, returning whether one was found
    pub fn update_row(&mut self, record: R) -> bool {
        let Some(index) = self.position(&record) else {
            return false;
        };
        self.values[index] = snapshot(&record);
        self.rows[index] = record;
        true
    }

    fn position(&self, record: &R) -> Option<usize> {
        match record.id() {
            Some(id) => self.rows.iter().position(|r| r.id() == Some(id)),
            None => self.rows.iter().position(|r| r == record),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Toggle selection of the focused row
    pub fn toggle_focused(&mut self) {
        let Some(id) = self.focused().and_then(|r| r.id()).map(str::to_string) else {
            return;
        };
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Flip the "all selected" toggle, selecting or clearing every row
    pub fn toggle_all(&mut self) {
        self.set_all_toggled(!self.all_toggled);
    }

    pub fn set_all_toggled(&mut self, toggled: bool) {
        self.all_toggled = toggled;
        if toggled {
            self.selected = self
                .rows
                .iter()
                .filter_map(Record::id)
                .map(str::to_string)
                .collect();
        } else {
            self.selected.clear();
        }
    }

    pub fn all_toggled(&self) -> bool {
        self.all_toggled
    }

    pub fn is_selected(&self, record: &R) -> bool {
        record.id().is_some_and(|id| self.selected.contains(id))
    }

    /// Selected rows in table order
    pub fn selected_rows(&self) -> Vec<R> {
        self.rows
            .iter()
            .filter(|r| self.is_selected(r))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Focus
    // ─────────────────────────────────────────────────────────────────────────

    pub fn focused(&self) -> Option<&R> {
        self.rows.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next(&mut self) {
        if !self.rows.is_empty() {
            self.cursor = (self.cursor + 1) % self.rows.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.rows.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.rows.len() - 1);
        }
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    /// Focus the row at `index`; out of range leaves the cursor alone
    pub fn focus(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        self.cursor = index;
        true
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    pub fn column_cursor(&self) -> usize {
        self.column_cursor
    }

    /// Move the focused column within `[0, columns)`
    pub fn move_column(&mut self, delta: isize, columns: usize) {
        if columns == 0 {
            return;
        }
        let current = self.column_cursor.min(columns - 1) as isize;
        self.column_cursor = (current + delta).clamp(0, columns as isize - 1) as usize;
    }

    pub fn focus_column(&mut self, index: usize, columns: usize) {
        self.column_cursor = index.min(columns.saturating_sub(1));
    }
}

fn snapshot<R: Record>(record: &R) -> Value {
    serde_json::to_value(record).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FuelReport;

    fn report(id: &str, name: &str) -> FuelReport {
        FuelReport {
            id: Some(id.to_string()),
            name: name.to_string(),
            ..FuelReport::default()
        }
    }

    fn table() -> TableViewState<FuelReport> {
        let mut table = TableViewState::new();
        table.set_rows(vec![report("1", "a"), report("2", "b"), report("3", "c")]);
        table
    }

    #[test]
    fn test_add_and_remove_rows() {
        let mut table = table();
        table.add_row(report("4", "d"));
        assert_eq!(table.len(), 4);

        assert!(table.remove_row(&report("2", "renamed elsewhere")));
        assert_eq!(
            table.rows().iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "c", "d"]
        );
        assert!(!table.remove_row(&report("2", "b")));
    }

    #[test]
    fn test_update_row_replaces_by_id() {
        let mut table = table();
        assert!(table.update_row(report("3", "Renamed")));
        assert_eq!(table.rows()[2].name, "Renamed");
        assert_eq!(table.cell_value(2, "name").as_deref(), Some("Renamed"));
        assert!(!table.update_row(report("9", "Missing")));
    }

    #[test]
    fn test_toggle_all_selects_every_row() {
        let mut table = table();
        table.toggle_all();
        assert!(table.all_toggled());
        assert_eq!(table.selected_rows().len(), 3);

        table.toggle_all();
        assert!(!table.all_toggled());
        assert!(table.selected_rows().is_empty());
    }

    #[test]
    fn test_toggle_focused_row() {
        let mut table = table();
        table.next();
        table.toggle_focused();
        assert_eq!(table.selected_rows(), vec![report("2", "b")]);
        table.toggle_focused();
        assert!(table.selected_rows().is_empty());
    }

    #[test]
    fn test_removing_selected_row_drops_selection() {
        let mut table = table();
        table.toggle_all();
        table.remove_row(&report("1", "a"));
        assert_eq!(table.selected_count(), 2);
    }

    #[test]
    fn test_set_rows_keeps_surviving_selection() {
        let mut table = table();
        table.last();
        table.toggle_focused();
        table.set_rows(vec![report("3", "c"), report("5", "e")]);
        assert_eq!(table.selected_rows(), vec![report("3", "c")]);
        assert_eq!(table.cursor(), 1);
    }

    #[test]
    fn test_cell_values_follow_row_changes() {
        let mut table = table();
        table.add_row(report("4", "d"));
        table.remove_row(&report("1", "a"));
        let names: Vec<Option<String>> = (0..table.len()).map(|i| table.cell_value(i, "name")).collect();
        assert_eq!(
            names,
            vec![Some("b".to_string()), Some("c".to_string()), Some("d".to_string())]
        );
        assert_eq!(table.cell_value(0, "place.address"), None);
        assert_eq!(table.cell_value(9, "name"), None);
    }

    #[test]
    fn test_focus_ignores_out_of_range() {
        let mut table = table();
        assert!(table.focus(2));
        assert_eq!(table.cursor(), 2);
        assert!(!table.focus(3));
        assert_eq!(table.cursor(), 2);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut table = table();
        table.previous();
        assert_eq!(table.cursor(), 2);
        table.next();
        assert_eq!(table.cursor(), 0);
    }

    #[test]
    fn test_move_column_clamps() {
        let mut table = table();
        table.move_column(-1, 5);
        assert_eq!(table.column_cursor(), 0);
        table.move_column(10, 5);
        assert_eq!(table.column_cursor(), 4);
    }
}
