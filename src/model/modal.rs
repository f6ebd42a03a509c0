//! Modal stack for managing overlays
//!
//! Every overlay the console shows is a variant of `Modal`. Controllers push
//! modals and read them back when the user confirms, so a modal carries all
//! the context its confirmation needs: the record payload, button labels and
//! what should happen after a successful save.

use crate::error::{FormError, QueryParamError};
use crate::listing::columns::{ColumnSet, DropdownMenu, FilterKind, MenuItem, RowAction};
use crate::listing::query::{DateRange, FilterValue, QueryState};
use crate::model::record::{with_field_value, FieldKind, FormField, Record, RecordPayload};
use std::collections::BTreeSet;

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Help dialog showing all keyboard shortcuts
    Help { scroll_offset: usize },
    /// Read-only record details
    Details(DetailsModal),
    /// Editable record form
    Form(FormModal),
    /// Confirmation prompt for a delete, bulk delete or export
    Confirm(ConfirmPrompt),
    /// Row-action dropdown for one record
    RowActions(RowActionsMenu),
    /// Column filters
    Filter(FilterDialog),
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Show a modal on top of the stack
    pub fn show(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Modal> {
        self.stack.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// The top modal when it is a record form
    pub fn form_mut(&mut self) -> Option<&mut FormModal> {
        match self.stack.last_mut() {
            Some(Modal::Form(form)) => Some(form),
            _ => None,
        }
    }

    /// The top modal when it is a confirmation prompt
    pub fn prompt_mut(&mut self) -> Option<&mut ConfirmPrompt> {
        match self.stack.last_mut() {
            Some(Modal::Confirm(prompt)) => Some(prompt),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Details
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsModal {
    pub title: String,
    /// (label, value) pairs in column order
    pub rows: Vec<(String, String)>,
    pub scroll_offset: usize,
}

impl DetailsModal {
    /// Details for a record, one row per data column including hidden ones
    pub fn for_record<R: Record>(title: &str, record: &R, columns: &ColumnSet) -> Self {
        let rows = columns
            .data_columns()
            .into_iter()
            .map(|column| {
                let value = column
                    .value_path
                    .as_deref()
                    .and_then(|path| record.value_at(path))
                    .unwrap_or_else(|| "-".to_string());
                (column.label.clone(), value)
            })
            .collect();
        Self {
            title: title.to_string(),
            rows,
            scroll_offset: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Record Form
// ═══════════════════════════════════════════════════════════════════════════════

/// What the table does with a record once its form saved successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    /// Replace the existing row
    UpdateRow,
    /// Append the row, provided the record is no longer new
    AddRow,
}

/// Presentation and follow-up options for a record form
#[derive(Debug, Clone, PartialEq)]
pub struct EditOptions {
    pub title: String,
    pub accept_button_text: String,
    pub accept_button_icon: Option<String>,
    /// Success notification; a default naming the record is used when absent
    pub success_message: Option<String>,
    pub after_save: AfterSave,
}

impl EditOptions {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            accept_button_text: "Save Changes".to_string(),
            accept_button_icon: Some("save".to_string()),
            success_message: None,
            after_save: AfterSave::UpdateRow,
        }
    }

    pub fn accept_button(mut self, text: &str, icon: &str) -> Self {
        self.accept_button_text = text.to_string();
        self.accept_button_icon = Some(icon.to_string());
        self
    }

    pub fn success_message(mut self, message: &str) -> Self {
        self.success_message = Some(message.to_string());
        self
    }

    pub fn after_save(mut self, after_save: AfterSave) -> Self {
        self.after_save = after_save;
        self
    }
}

/// One editable input of a form
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub field: FormField,
    pub value: String,
    initial: String,
}

impl FormInput {
    pub fn is_dirty(&self) -> bool {
        self.value != self.initial
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormModal {
    pub payload: RecordPayload,
    pub options: EditOptions,
    pub inputs: Vec<FormInput>,
    pub focus: usize,
    /// Last validation or server error shown inside the form
    pub error: Option<String>,
    loading: bool,
}

impl FormModal {
    pub fn new<R: Record>(record: &R, options: EditOptions) -> Result<Self, serde_json::Error> {
        let inputs = R::form_fields()
            .iter()
            .map(|field| {
                let value = record.value_at(field.path).unwrap_or_default();
                FormInput {
                    field: *field,
                    initial: value.clone(),
                    value,
                }
            })
            .collect();
        Ok(Self {
            payload: RecordPayload::new(record)?,
            options,
            inputs,
            focus: 0,
            error: None,
            loading: false,
        })
    }

    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    pub fn stop_loading(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn focused(&self) -> Option<&FormInput> {
        self.inputs.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.inputs.is_empty() {
            self.focus = (self.focus + 1) % self.inputs.len();
        }
    }

    pub fn focus_previous(&mut self) {
        if !self.inputs.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.inputs.len() - 1);
        }
    }

    /// Type into the focused input; choice inputs ignore free text
    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            if !matches!(input.field.kind, FieldKind::Choice(_)) {
                input.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            if !matches!(input.field.kind, FieldKind::Choice(_)) {
                input.value.pop();
            }
        }
    }

    pub fn clear_focused(&mut self) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            if !matches!(input.field.kind, FieldKind::Choice(_)) {
                input.value.clear();
            }
        }
    }

    /// Step the focused choice input through its options
    pub fn cycle_choice(&mut self, delta: isize) {
        let Some(input) = self.inputs.get_mut(self.focus) else {
            return;
        };
        let FieldKind::Choice(options) = input.field.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let len = options.len() as isize;
        let current = options
            .iter()
            .position(|o| *o == input.value)
            .map(|i| i as isize)
            .unwrap_or(-1);
        let next = (current + delta).rem_euclid(len) as usize;
        input.value = options[next].to_string();
    }

    /// The payload record with every edited input applied
    pub fn record<R: Record>(&self) -> Result<R, FormError> {
        let mut record = self.payload.decode::<R>().ok_or_else(|| FormError::InvalidValue {
            field: "record".to_string(),
            reason: format!("form does not hold a {}", R::ENTITY.label()),
        })?;
        for input in self.inputs.iter().filter(|i| i.is_dirty()) {
            record = with_field_value(&record, &input.field, &input.value)?;
        }
        Ok(record)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Confirmation Prompt
// ═══════════════════════════════════════════════════════════════════════════════

/// The remote operation a confirmation prompt performs
#[derive(Debug, Clone, PartialEq)]
pub enum CrudOperation {
    Delete(RecordPayload),
    BulkDelete(Vec<RecordPayload>),
    Export,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub body: Vec<String>,
    pub accept_button_text: String,
    pub operation: CrudOperation,
    pub error: Option<String>,
    loading: bool,
}

impl ConfirmPrompt {
    pub fn new(title: &str, accept_button_text: &str, operation: CrudOperation) -> Self {
        Self {
            title: title.to_string(),
            body: Vec::new(),
            accept_button_text: accept_button_text.to_string(),
            operation,
            error: None,
            loading: false,
        }
    }

    pub fn with_body(mut self, body: Vec<String>) -> Self {
        self.body = body;
        self
    }

    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    pub fn stop_loading(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Row Actions
// ═══════════════════════════════════════════════════════════════════════════════

/// Open row-action dropdown; separators are never focused
#[derive(Debug, Clone, PartialEq)]
pub struct RowActionsMenu {
    pub menu: DropdownMenu,
    pub record_id: String,
    pub record_name: String,
    /// Index into `menu.items`
    pub cursor: usize,
}

impl RowActionsMenu {
    pub fn new(menu: DropdownMenu, record_id: &str, record_name: &str) -> Self {
        let cursor = menu.selectable_indices().first().copied().unwrap_or(0);
        Self {
            menu,
            record_id: record_id.to_string(),
            record_name: record_name.to_string(),
            cursor,
        }
    }

    pub fn next(&mut self) {
        let selectable = self.menu.selectable_indices();
        if let Some(&index) = selectable.iter().find(|&&i| i > self.cursor) {
            self.cursor = index;
        } else if let Some(&first) = selectable.first() {
            self.cursor = first;
        }
    }

    pub fn previous(&mut self) {
        let selectable = self.menu.selectable_indices();
        if let Some(&index) = selectable.iter().rev().find(|&&i| i < self.cursor) {
            self.cursor = index;
        } else if let Some(&last) = selectable.last() {
            self.cursor = last;
        }
    }

    pub fn selected(&self) -> Option<RowAction> {
        self.menu.action_at(self.cursor)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.menu.items
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Filter Dialog
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    pub label: String,
    pub param: String,
    pub kind: FilterKind,
    /// Free input for text and date-range filters
    pub input: String,
    /// Chosen options for multi-option filters
    pub selected: BTreeSet<String>,
    pub option_cursor: usize,
}

impl FilterEntry {
    /// Parse the entry into a filter value; `None` clears the filter
    pub fn value(&self) -> Result<Option<FilterValue>, QueryParamError> {
        let input = self.input.trim();
        match &self.kind {
            FilterKind::Text if input.is_empty() => Ok(None),
            FilterKind::Text => Ok(Some(FilterValue::Text(input.to_string()))),
            FilterKind::MultiOption(_) if self.selected.is_empty() => Ok(None),
            FilterKind::MultiOption(_) => Ok(Some(FilterValue::Set(self.selected.clone()))),
            FilterKind::DateRange if input.is_empty() => Ok(None),
            FilterKind::DateRange => DateRange::parse(input)
                .map(|range| Some(FilterValue::DateRange(range)))
                .ok_or_else(|| QueryParamError::InvalidDateRange {
                    param: self.param.clone(),
                    value: input.to_string(),
                }),
        }
    }

    pub fn options(&self) -> &[String] {
        match &self.kind {
            FilterKind::MultiOption(options) => options,
            _ => &[],
        }
    }

    fn toggle_option(&mut self) {
        let Some(option) = self.options().get(self.option_cursor).cloned() else {
            return;
        };
        if !self.selected.remove(&option) {
            self.selected.insert(option);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterDialog {
    pub entries: Vec<FilterEntry>,
    pub cursor: usize,
    pub error: Option<String>,
}

impl FilterDialog {
    /// One entry per filterable column, prefilled from the current query
    pub fn from_columns(columns: &ColumnSet, query: &QueryState) -> Self {
        let entries = columns
            .filterable()
            .into_iter()
            .filter_map(|column| {
                let filter = column.filter.as_ref()?;
                let current = query.filter(&filter.param);
                let (input, selected) = match current {
                    Some(FilterValue::Text(text)) => (text.clone(), BTreeSet::new()),
                    Some(FilterValue::DateRange(range)) => (range.to_string(), BTreeSet::new()),
                    Some(FilterValue::Set(set)) => (String::new(), set.clone()),
                    None => (String::new(), BTreeSet::new()),
                };
                Some(FilterEntry {
                    label: column.label.clone(),
                    param: filter.param.clone(),
                    kind: filter.kind.clone(),
                    input,
                    selected,
                    option_cursor: 0,
                })
            })
            .collect();
        Self {
            entries,
            cursor: 0,
            error: None,
        }
    }

    pub fn focused(&self) -> Option<&FilterEntry> {
        self.entries.get(self.cursor)
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.entries.len() - 1);
        }
    }

    /// Move between the options of a multi-option entry
    pub fn move_option(&mut self, delta: isize) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            let len = entry.options().len();
            if len > 0 {
                entry.option_cursor =
                    (entry.option_cursor as isize + delta).rem_euclid(len as isize) as usize;
            }
        }
    }

    pub fn toggle_option(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.toggle_option();
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            if !matches!(entry.kind, FilterKind::MultiOption(_)) {
                entry.input.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.input.pop();
        }
    }

    /// Clear the focused entry
    pub fn clear_focused(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.input.clear();
            entry.selected.clear();
        }
    }

    /// Every entry as (param, value) ready to apply to the query state
    pub fn values(&self) -> Result<Vec<(String, Option<FilterValue>)>, QueryParamError> {
        self.entries
            .iter()
            .map(|entry| Ok((entry.param.clone(), entry.value()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::columns::{ColumnBuilder, ColumnWidth};
    use crate::listing::query::QueryParamSpec;
    use crate::model::FuelReport;

    fn menu() -> DropdownMenu {
        DropdownMenu::new(
            "Fuel Report Actions",
            vec![
                MenuItem::action("View Details", RowAction::View),
                MenuItem::action("Edit Fuel Report", RowAction::Edit),
                MenuItem::Separator,
                MenuItem::action("Delete Fuel Report", RowAction::Delete),
            ],
        )
    }

    #[test]
    fn test_modal_stack_show_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.top().is_none());

        stack.show(Modal::QuitConfirm);
        stack.show(Modal::Help { scroll_offset: 0 });
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.pop(), Some(Modal::Help { scroll_offset: 0 }));
        assert_eq!(stack.pop(), Some(Modal::QuitConfirm));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_modal_stack_top_mut() {
        let mut stack = ModalStack::new();
        stack.show(Modal::Help { scroll_offset: 0 });

        if let Some(Modal::Help { scroll_offset }) = stack.top_mut() {
            *scroll_offset = 2;
        }

        assert_eq!(stack.top(), Some(&Modal::Help { scroll_offset: 2 }));
        assert!(stack.form_mut().is_none());
    }

    #[test]
    fn test_row_actions_skip_separator() {
        let mut menu = RowActionsMenu::new(menu(), "fr_1", "Refuel");
        assert_eq!(menu.selected(), Some(RowAction::View));

        menu.next();
        assert_eq!(menu.selected(), Some(RowAction::Edit));
        menu.next();
        assert_eq!(menu.cursor, 3);
        assert_eq!(menu.selected(), Some(RowAction::Delete));
        menu.next();
        assert_eq!(menu.selected(), Some(RowAction::View));

        menu.previous();
        assert_eq!(menu.selected(), Some(RowAction::Delete));
        menu.previous();
        assert_eq!(menu.selected(), Some(RowAction::Edit));
    }

    #[test]
    fn test_form_applies_only_edited_inputs() {
        let report = FuelReport {
            id: Some("fr_1".to_string()),
            name: "Refuel".to_string(),
            volume: Some(40.0),
            ..FuelReport::default()
        };
        let mut form = FormModal::new(&report, EditOptions::new("Edit Fuel Report")).unwrap();

        assert_eq!(form.focused().map(|i| i.field.path), Some("name"));
        form.input_char('!');
        let edited: FuelReport = form.record().unwrap();
        assert_eq!(edited.name, "Refuel!");
        assert_eq!(edited.volume, Some(40.0));
        assert_eq!(edited.id.as_deref(), Some("fr_1"));
    }

    #[test]
    fn test_form_choice_cycles() {
        let mut form = FormModal::new(&FuelReport::default(), EditOptions::new("New")).unwrap();
        while form.focused().map(|i| i.field.path) != Some("status") {
            form.focus_next();
        }
        form.input_char('x');
        assert_eq!(form.focused().map(|i| i.value.as_str()), Some("draft"));
        form.cycle_choice(1);
        assert_eq!(form.focused().map(|i| i.value.as_str()), Some("pending"));
        form.cycle_choice(-2);
        assert_eq!(form.focused().map(|i| i.value.as_str()), Some("rejected"));
    }

    #[test]
    fn test_form_loading_flags() {
        let mut form = FormModal::new(&FuelReport::default(), EditOptions::new("New")).unwrap();
        assert!(!form.is_loading());
        form.start_loading();
        assert!(form.is_loading());
        form.stop_loading();
        assert!(!form.is_loading());
    }

    #[test]
    fn test_filter_dialog_values() {
        let columns = ColumnSet::new(vec![
            ColumnBuilder::new("Country", "country")
                .width(ColumnWidth::Px(120))
                .filterable(true)
                .filter(FilterKind::Text),
            ColumnBuilder::new("Status", "status")
                .filterable(true)
                .filter(FilterKind::MultiOption(vec![
                    "draft".to_string(),
                    "approved".to_string(),
                ])),
            ColumnBuilder::new("Created At", "created_at")
                .filterable(true)
                .filter(FilterKind::DateRange),
            ColumnBuilder::actions(menu()),
        ])
        .unwrap();
        let spec = QueryParamSpec::listing()
            .text("country")
            .set("status")
            .date_range("created_at");
        let query = QueryState::new(spec);
        let mut dialog = FilterDialog::from_columns(&columns, &query);
        assert_eq!(dialog.entries.len(), 3);

        dialog.input_char('N');
        dialog.input_char('Z');
        dialog.next();
        dialog.move_option(1);
        dialog.toggle_option();
        dialog.next();
        for c in "2024-01-01..2024-01-31".chars() {
            dialog.input_char(c);
        }

        let values = dialog.values().unwrap();
        assert_eq!(values[0], ("country".to_string(), Some(FilterValue::Text("NZ".to_string()))));
        assert_eq!(
            values[1].1,
            Some(FilterValue::Set(["approved".to_string()].into_iter().collect()))
        );
        assert!(matches!(values[2].1, Some(FilterValue::DateRange(_))));

        dialog.clear_focused();
        dialog.input_char('x');
        assert!(matches!(
            dialog.values(),
            Err(QueryParamError::InvalidDateRange { .. })
        ));
    }
}
