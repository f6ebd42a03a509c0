//! Fuel reports listing
//!
//! Columns, query parameters and row actions for the fuel reports table.
//! Every mutating action follows the same contract: the table changes only
//! after the store accepted the operation, and a refused operation leaves
//! its modal open for the user to retry or cancel.

use super::ActionContext;
use crate::error::{ConfigurationError, StoreError};
use crate::listing::columns::{
    ColumnBuilder, ColumnSet, ColumnWidth, DropdownMenu, FilterKind, MenuItem, RowAction,
};
use crate::listing::query::{QueryParamSpec, QueryState};
use crate::listing::{Listing, Route};
use crate::model::modal::{
    AfterSave, CrudOperation, DetailsModal, EditOptions, FormModal, Modal,
    RowActionsMenu,
};
use crate::model::{FuelReport, Record, RecordPayload};
use crate::services::crud::{BulkDeleteOptions, CrudOutcome};
use crate::services::loader::{LoadingIndicator, Transition, MAIN_CONTENT};
use crate::services::notifications::Notifier;
use crate::services::store::RecordStore;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Route
// ═══════════════════════════════════════════════════════════════════════════════

/// Query parameters of the fuel reports listing
///
/// Besides paging, sorting and search, every filter a column declares is
/// recognized so no filter is silently dropped.
pub fn fuel_report_query_params() -> QueryParamSpec {
    QueryParamSpec::listing()
        .text("public_id")
        .text("internal_id")
        .text("created_by")
        .text("updated_by")
        .set("status")
        .text("name")
        .text("email")
        .text("phone")
        .text("country")
        .text("address")
        .date_range("created_at")
        .date_range("updated_at")
}

#[derive(Debug, Default)]
pub struct FuelReportsRoute;

impl Route for FuelReportsRoute {
    type Record = FuelReport;

    fn name(&self) -> &'static str {
        "fuel-reports"
    }

    fn query_params(&self) -> QueryParamSpec {
        fuel_report_query_params()
    }

    fn loading(&self, transition: Transition, loader: &mut LoadingIndicator) {
        loader.show_on_initial_transition(transition, MAIN_CONTENT, "Loading fuel reports...");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Columns
// ═══════════════════════════════════════════════════════════════════════════════

fn row_actions_menu() -> DropdownMenu {
    DropdownMenu::new(
        "Fuel Report Actions",
        vec![
            MenuItem::action("View Details", RowAction::View),
            MenuItem::action("Edit Fuel Report", RowAction::Edit),
            MenuItem::Separator,
            MenuItem::action("Delete Fuel Report", RowAction::Delete),
        ],
    )
    .with_icon("ellipsis-h")
}

/// Text column that sorts, filters with free text and can be resized
fn text_column(label: &str, path: &str, width: ColumnWidth) -> ColumnBuilder {
    ColumnBuilder::new(label, path)
        .width(width)
        .resizable(true)
        .sortable(true)
        .filterable(true)
        .filter(FilterKind::Text)
}

fn date_column(label: &str, path: &str) -> ColumnBuilder {
    ColumnBuilder::new(label, path)
        .sort_param(path)
        .width(ColumnWidth::Percent(10))
        .resizable(true)
        .sortable(true)
        .filterable(true)
        .filter(FilterKind::DateRange)
}

/// The fuel reports table; `status_options` feeds the status filter
pub fn fuel_report_columns(status_options: Vec<String>) -> Result<ColumnSet, ConfigurationError> {
    ColumnSet::new(vec![
        text_column("Name", "name", ColumnWidth::Px(200)).anchor(RowAction::View),
        text_column("ID", "public_id", ColumnWidth::Px(120)).anchor(RowAction::View),
        text_column("Internal ID", "internal_id", ColumnWidth::Px(120)).anchor(RowAction::View),
        text_column("Email", "email", ColumnWidth::Px(80)).hidden(),
        text_column("Phone", "phone", ColumnWidth::Px(80)).hidden(),
        text_column("Country", "country", ColumnWidth::Px(80)).hidden(),
        text_column("Address", "place.address", ColumnWidth::Px(80))
            .filter_param("address")
            .hidden(),
        ColumnBuilder::new("Status", "status")
            .status()
            .width(ColumnWidth::Percent(10))
            .resizable(true)
            .sortable(true)
            .filterable(true)
            .filter(FilterKind::MultiOption(status_options)),
        date_column("Created At", "created_at"),
        date_column("Updated At", "updated_at").hidden(),
        ColumnBuilder::actions(row_actions_menu()).width(ColumnWidth::Px(150)),
    ])
}

// ═══════════════════════════════════════════════════════════════════════════════
// Controller
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct FuelReportsController {
    listing: Listing<FuelReport>,
}

impl FuelReportsController {
    pub fn new(
        query: QueryState,
        status_options: Vec<String>,
        search_debounce: Duration,
    ) -> Result<Self, ConfigurationError> {
        let columns = fuel_report_columns(status_options)?;
        Ok(Self {
            listing: Listing::new(columns, query, search_debounce)?,
        })
    }

    pub fn listing(&self) -> &Listing<FuelReport> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<FuelReport> {
        &mut self.listing
    }

    fn find(&self, record_id: &str) -> Option<FuelReport> {
        self.listing
            .table()
            .rows()
            .iter()
            .find(|r| r.id() == Some(record_id))
            .cloned()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row Actions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn view_fuel_report<S: RecordStore, N: Notifier>(
        &self,
        fuel_report: &FuelReport,
        ctx: &mut ActionContext<'_, S, N>,
    ) {
        let details = DetailsModal::for_record(&fuel_report.name, fuel_report, self.listing.columns());
        ctx.modals.show(Modal::Details(details));
    }

    /// Open the form for a fresh record; it joins the table only once saved
    pub fn create_fuel_report<S: RecordStore, N: Notifier>(
        &self,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Result<(), StoreError> {
        let fuel_report: FuelReport = ctx.store.create_record();
        let options = EditOptions::new("New Fuel Report")
            .accept_button("Confirm & Create", "check")
            .success_message("New fuel report ({name}) created.")
            .after_save(AfterSave::AddRow);
        self.edit_fuel_report(&fuel_report, options, ctx)
    }

    pub fn edit_fuel_report<S: RecordStore, N: Notifier>(
        &self,
        fuel_report: &FuelReport,
        options: EditOptions,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Result<(), StoreError> {
        let form = FormModal::new(fuel_report, options)?;
        ctx.modals.show(Modal::Form(form));
        Ok(())
    }

    pub fn delete_fuel_report<S: RecordStore, N: Notifier>(
        &self,
        fuel_report: &FuelReport,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Result<(), StoreError> {
        ctx.crud.delete(fuel_report, ctx.modals)
    }

    /// Ask to delete the selected rows; returns false when nothing is selected
    pub fn bulk_delete_fuel_reports<S: RecordStore, N: Notifier>(
        &self,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Result<bool, StoreError> {
        let selected = self.listing.table().selected_rows();
        if selected.is_empty() {
            return Ok(false);
        }
        let options = BulkDeleteOptions {
            model_name_path: "name".to_string(),
            accept_button_text: "Delete Fuel Reports".to_string(),
        };
        ctx.crud.bulk_delete(&selected, &options, ctx.modals)?;
        Ok(true)
    }

    pub fn export_fuel_reports<S: RecordStore, N: Notifier>(&self, ctx: &mut ActionContext<'_, S, N>) {
        ctx.crud.export::<FuelReport>(ctx.modals);
    }

    /// Open the row-action dropdown for the focused row
    pub fn open_row_actions<S: RecordStore, N: Notifier>(&self, ctx: &mut ActionContext<'_, S, N>) {
        let Some(menu) = self.listing.columns().row_actions() else {
            return;
        };
        let Some(focused) = self.listing.table().focused() else {
            return;
        };
        let Some(id) = focused.id() else {
            return;
        };
        ctx.modals
            .show(Modal::RowActions(RowActionsMenu::new(menu.clone(), id, &focused.name)));
    }

    /// Dispatch a row action against the row with `record_id`
    pub fn run_row_action<S: RecordStore, N: Notifier>(
        &self,
        action: RowAction,
        record_id: &str,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Result<(), StoreError> {
        let Some(fuel_report) = self.find(record_id) else {
            tracing::debug!(record_id, "row action on a row no longer in the table");
            return Ok(());
        };
        match action {
            RowAction::View => {
                self.view_fuel_report(&fuel_report, ctx);
                Ok(())
            }
            RowAction::Edit => {
                let options = EditOptions::new("Edit Fuel Report");
                self.edit_fuel_report(&fuel_report, options, ctx)
            }
            RowAction::Delete => self.delete_fuel_report(&fuel_report, ctx),
        }
    }

    /// Activate the focused row's anchor
    pub fn activate_focused<S: RecordStore, N: Notifier>(
        &self,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Result<(), StoreError> {
        let action = self.listing.columns().primary_action();
        let id = self.listing.table().focused().and_then(|r| r.id()).map(str::to_string);
        match (action, id) {
            (Some(action), Some(id)) => self.run_row_action(action, &id, ctx),
            _ => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Confirmations
    // ─────────────────────────────────────────────────────────────────────────

    /// Confirm the open record form: save, then reflect the outcome
    ///
    /// On success the form closes and the saved record is returned. On
    /// failure the error is surfaced and the form stays open, interactive.
    pub fn confirm_form<S: RecordStore, N: Notifier>(
        &mut self,
        ctx: &mut ActionContext<'_, S, N>,
    ) -> Option<FuelReport> {
        let (fuel_report, options) = {
            let form = ctx.modals.form_mut()?;
            if form.is_loading() {
                return None;
            }
            form.start_loading();
            form.error = None;
            match form.record::<FuelReport>() {
                Ok(record) => (record, form.options.clone()),
                Err(e) => {
                    form.error = Some(e.to_string());
                    form.stop_loading();
                    return None;
                }
            }
        };

        match ctx.store.save(&fuel_report) {
            Ok(saved) => {
                let message = match &options.success_message {
                    Some(template) => template.replace("{name}", &saved.name),
                    None => format!("{} details updated.", saved.name),
                };
                ctx.notifier.success(&message);
                ctx.modals.pop();

                let table = self.listing.table_mut();
                match options.after_save {
                    AfterSave::UpdateRow => {
                        table.update_row(saved.clone());
                    }
                    AfterSave::AddRow if !saved.is_new() => table.add_row(saved.clone()),
                    AfterSave::AddRow => {}
                }
                Some(saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "fuel report save failed");
                ctx.notifier.server_error(&e);
                if let Some(form) = ctx.modals.form_mut() {
                    form.error = Some(e.to_string());
                    form.stop_loading();
                }
                None
            }
        }
    }

    /// Confirm the open delete, bulk delete or export prompt
    pub fn confirm_prompt<S: RecordStore, N: Notifier>(&mut self, ctx: &mut ActionContext<'_, S, N>) {
        let prompt = {
            let Some(prompt) = ctx.modals.prompt_mut() else {
                return;
            };
            if prompt.is_loading() {
                return;
            }
            prompt.start_loading();
            prompt.error = None;
            prompt.clone()
        };

        let outcome = ctx
            .crud
            .confirm::<FuelReport, S>(&prompt, ctx.store, self.listing.columns());

        match outcome {
            Ok(CrudOutcome::Deleted(fuel_report)) => {
                ctx.modals.pop();
                ctx.notifier
                    .success(&format!("Fuel report ({}) deleted.", fuel_report.name));
                self.listing.table_mut().remove_row(&fuel_report);
            }
            Ok(CrudOutcome::BulkDeleted { deleted, failures }) => {
                self.reflect_bulk_delete(&deleted);
                if !deleted.is_empty() {
                    ctx.notifier
                        .success(&format!("{} fuel reports deleted.", deleted.len()));
                }
                if failures.is_empty() {
                    ctx.modals.pop();
                    return;
                }

                for (_, error) in &failures {
                    ctx.notifier.server_error(error);
                }
                // Keep the prompt open with only the records still to delete
                let remaining: Vec<RecordPayload> = failures
                    .iter()
                    .filter_map(|(record, _)| RecordPayload::new(record).ok())
                    .collect();
                if let Some(open) = ctx.modals.prompt_mut() {
                    open.body = remaining.iter().map(|p| p.name().to_string()).collect();
                    open.operation = CrudOperation::BulkDelete(remaining);
                    open.error = failures.first().map(|(_, e)| e.to_string());
                    open.stop_loading();
                }
            }
            Ok(CrudOutcome::Exported { path, rows }) => {
                ctx.modals.pop();
                ctx.notifier.success(&format!(
                    "Exported {} fuel reports to {}",
                    rows,
                    path.display()
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "fuel report prompt failed");
                ctx.notifier.server_error(&e);
                if let Some(open) = ctx.modals.prompt_mut() {
                    open.error = Some(e.to_string());
                    open.stop_loading();
                }
            }
        }
    }

    /// Table changes after a confirmed bulk delete
    fn reflect_bulk_delete(&mut self, deleted: &[FuelReport]) {
        if deleted.is_empty() {
            return;
        }
        let table = self.listing.table_mut();
        table.set_all_toggled(false);
        for fuel_report in deleted {
            table.remove_row(fuel_report);
        }
        // Server-side counts changed; fetch the page again
        self.listing.request_refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::testing::{unwritable_store, FailingStore, RecordingNotifier};
    use crate::model::modal::ModalStack;
    use crate::listing::columns::status_options;
    use crate::model::FUEL_REPORT_STATUSES;
    use crate::services::crud::CrudHelper;
    use crate::services::store::{Collection, MemoryStore, PageMeta};
    use std::time::Instant;

    fn report(id: &str, name: &str) -> FuelReport {
        FuelReport {
            id: Some(id.to_string()),
            name: name.to_string(),
            ..FuelReport::default()
        }
    }

    fn controller(rows: Vec<FuelReport>) -> FuelReportsController {
        let query = QueryState::new(fuel_report_query_params());
        let mut controller = FuelReportsController::new(
            query,
            status_options(FUEL_REPORT_STATUSES),
            Duration::from_millis(250),
        )
        .unwrap();
        let total = rows.len();
        controller.listing_mut().set_model(Collection {
            records: rows,
            meta: PageMeta {
                total,
                ..PageMeta::default()
            },
        });
        controller
    }

    struct Harness<S> {
        store: S,
        modals: ModalStack,
        notifier: RecordingNotifier,
        crud: CrudHelper,
    }

    impl<S: RecordStore> Harness<S> {
        fn new(store: S) -> Self {
            Self {
                store,
                modals: ModalStack::new(),
                notifier: RecordingNotifier::default(),
                crud: CrudHelper::new(std::env::temp_dir().join("fleet-console-tests")),
            }
        }

        fn ctx(&mut self) -> ActionContext<'_, S, RecordingNotifier> {
            ActionContext::new(&mut self.store, &mut self.modals, &mut self.notifier, &self.crud)
        }
    }

    fn type_into_name(modals: &mut ModalStack, text: &str) {
        let form = modals.form_mut().unwrap();
        form.focus = 0;
        while form.focused().is_some_and(|i| !i.value.is_empty()) {
            form.backspace();
        }
        for c in text.chars() {
            form.input_char(c);
        }
    }

    #[test]
    fn test_columns_validate() {
        let columns = fuel_report_columns(status_options(FUEL_REPORT_STATUSES)).unwrap();
        assert_eq!(columns.data_columns().len(), 10);
        columns.check_filter_params(&fuel_report_query_params()).unwrap();

        let actions: Vec<&str> = columns
            .row_actions()
            .unwrap()
            .actions()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(actions, vec!["View Details", "Edit Fuel Report", "Delete Fuel Report"]);

        let address = columns
            .data_columns()
            .into_iter()
            .find(|c| c.label == "Address")
            .unwrap();
        assert_eq!(address.filter.as_ref().unwrap().param, "address");
        assert!(address.hidden);
    }

    #[test]
    fn test_successful_edit_updates_row() {
        let original = report("1", "Morning refuel");
        let store = MemoryStore::new(25).with_records(&[original.clone()]).unwrap();
        let mut harness = Harness::new(store);
        let mut controller = controller(vec![original]);

        controller
            .run_row_action(RowAction::Edit, "1", &mut harness.ctx())
            .unwrap();
        type_into_name(&mut harness.modals, "Evening refuel");

        let saved = controller.confirm_form(&mut harness.ctx()).unwrap();
        assert_eq!(saved.name, "Evening refuel");
        assert_eq!(controller.listing().table().rows()[0].name, "Evening refuel");
        assert!(harness.modals.is_empty());
        assert_eq!(harness.notifier.successes, vec!["Evening refuel details updated."]);
    }

    #[test]
    fn test_failed_edit_keeps_row_and_modal() {
        let original = report("1", "Morning refuel");
        let mut harness = Harness::new(FailingStore::default());
        let mut controller = controller(vec![original.clone()]);

        controller
            .run_row_action(RowAction::Edit, "1", &mut harness.ctx())
            .unwrap();
        type_into_name(&mut harness.modals, "Evening refuel");

        assert!(controller.confirm_form(&mut harness.ctx()).is_none());
        assert_eq!(harness.store.save_attempts, 1);
        assert_eq!(controller.listing().table().rows(), &[original]);
        assert_eq!(harness.notifier.errors.len(), 1);

        // Still open, interactive, with the edit intact for a retry
        let form = harness.modals.form_mut().unwrap();
        assert!(!form.is_loading());
        assert!(form.error.is_some());
        assert_eq!(form.inputs[0].value, "Evening refuel");
    }

    #[test]
    fn test_edit_write_failure_keeps_store_and_row() {
        let original = report("1", "Morning refuel");
        let (store, dir) = unwritable_store(&[original.clone()]);
        let mut harness = Harness::new(store);
        let mut controller = controller(vec![original.clone()]);

        controller
            .run_row_action(RowAction::Edit, "1", &mut harness.ctx())
            .unwrap();
        type_into_name(&mut harness.modals, "Evening refuel");

        for _ in 0..2 {
            assert!(controller.confirm_form(&mut harness.ctx()).is_none());
            assert_eq!(controller.listing().table().rows(), &[original.clone()]);
            assert_eq!(harness.store.all::<FuelReport>().unwrap(), vec![original.clone()]);
            assert!(!harness.modals.form_mut().unwrap().is_loading());
        }
        assert_eq!(harness.notifier.errors.len(), 2);
        assert!(harness.notifier.errors[1].starts_with("dataset I/O failed"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_create_write_failure_adds_nothing() {
        let (store, dir) = unwritable_store::<FuelReport>(&[]);
        let mut harness = Harness::new(store);
        let mut controller = controller(vec![report("1", "Morning refuel")]);

        controller.create_fuel_report(&mut harness.ctx()).unwrap();
        type_into_name(&mut harness.modals, "Depot top-up");

        // Retrying must not pile up copies under fresh ids
        for _ in 0..2 {
            assert!(controller.confirm_form(&mut harness.ctx()).is_none());
        }
        assert!(harness.store.all::<FuelReport>().unwrap().is_empty());
        assert_eq!(controller.listing().table().len(), 1);
        let form = harness.modals.form_mut().unwrap();
        assert_eq!(form.inputs[0].value, "Depot top-up");
        assert!(form.record::<FuelReport>().unwrap().is_new());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_delete_write_failure_keeps_record_for_retry() {
        let rows = vec![report("1", "A"), report("2", "B")];
        let (store, dir) = unwritable_store(&rows);
        let mut harness = Harness::new(store);
        let mut controller = controller(rows.clone());

        controller
            .run_row_action(RowAction::Delete, "2", &mut harness.ctx())
            .unwrap();
        controller.confirm_prompt(&mut harness.ctx());
        controller.confirm_prompt(&mut harness.ctx());

        assert_eq!(controller.listing().table().rows(), rows.as_slice());
        assert_eq!(harness.store.all::<FuelReport>().unwrap().len(), 2);
        // The retry hits the same write failure, not a missing record
        assert_eq!(harness.notifier.errors.len(), 2);
        assert!(harness
            .notifier
            .errors
            .iter()
            .all(|e| e.starts_with("dataset I/O failed")));
        assert!(harness.modals.prompt_mut().unwrap().error.is_some());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_bulk_delete_write_failure_keeps_every_record() {
        let rows = vec![report("1", "A"), report("2", "B")];
        let (store, dir) = unwritable_store(&rows);
        let mut harness = Harness::new(store);
        let mut controller = controller(rows.clone());

        controller.listing_mut().table_mut().toggle_all();
        controller.bulk_delete_fuel_reports(&mut harness.ctx()).unwrap();
        controller.confirm_prompt(&mut harness.ctx());

        assert_eq!(controller.listing().table().rows(), rows.as_slice());
        assert_eq!(harness.store.all::<FuelReport>().unwrap().len(), 2);
        let prompt = harness.modals.prompt_mut().unwrap();
        assert_eq!(prompt.body, vec!["A".to_string(), "B".to_string()]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_rejected_save_surfaces_in_form() {
        let mut harness = Harness::new(MemoryStore::new(25));
        let mut controller = controller(vec![report("1", "Morning refuel")]);

        controller
            .run_row_action(RowAction::Edit, "1", &mut harness.ctx())
            .unwrap();
        type_into_name(&mut harness.modals, "");

        assert!(controller.confirm_form(&mut harness.ctx()).is_none());
        assert!(harness.modals.form_mut().is_some());
        assert_eq!(harness.notifier.errors, vec!["fuel report rejected: name is required"]);
    }

    #[test]
    fn test_create_then_save_adds_row() {
        let mut harness = Harness::new(MemoryStore::new(25));
        let mut controller = controller(vec![report("1", "Morning refuel")]);

        controller.create_fuel_report(&mut harness.ctx()).unwrap();
        type_into_name(&mut harness.modals, "Depot top-up");
        let saved = controller.confirm_form(&mut harness.ctx()).unwrap();

        assert!(!saved.is_new());
        assert_eq!(controller.listing().table().len(), 2);
        assert_eq!(controller.listing().table().rows()[1], saved);
        assert_eq!(
            harness.notifier.successes,
            vec!["New fuel report (Depot top-up) created."]
        );
    }

    #[test]
    fn test_create_then_dismiss_leaves_table_unchanged() {
        let mut harness = Harness::new(MemoryStore::new(25));
        let mut controller = controller(vec![report("1", "Morning refuel")]);

        controller.create_fuel_report(&mut harness.ctx()).unwrap();
        type_into_name(&mut harness.modals, "Never saved");
        let Some(Modal::Form(form)) = harness.modals.pop() else {
            panic!("expected the record form");
        };

        let record: FuelReport = form.record().unwrap();
        assert!(record.is_new());
        assert_eq!(controller.listing().table().len(), 1);
        assert!(harness.store.all::<FuelReport>().unwrap().is_empty());
    }

    #[test]
    fn test_bulk_delete_removes_rows_and_refreshes_once() {
        let rows = vec![
            report("1", "A"),
            report("2", "B"),
            report("3", "C"),
            report("4", "D"),
        ];
        let store = MemoryStore::new(25).with_records(&rows).unwrap();
        let mut harness = Harness::new(store);
        let mut controller = controller(rows);

        let table = controller.listing_mut().table_mut();
        table.first();
        for _ in 0..3 {
            table.toggle_focused();
            table.next();
        }
        controller.listing_mut().take_refresh();

        assert!(controller.bulk_delete_fuel_reports(&mut harness.ctx()).unwrap());
        controller.confirm_prompt(&mut harness.ctx());

        let table = controller.listing().table();
        assert_eq!(table.rows(), &[report("4", "D")]);
        assert!(!table.all_toggled());
        assert!(harness.modals.is_empty());
        assert!(controller.listing_mut().take_refresh());
        assert!(!controller.listing_mut().take_refresh());
        assert_eq!(harness.store.all::<FuelReport>().unwrap().len(), 1);
    }

    #[test]
    fn test_bulk_delete_all_toggled() {
        let rows = vec![report("1", "A"), report("2", "B")];
        let store = MemoryStore::new(25).with_records(&rows).unwrap();
        let mut harness = Harness::new(store);
        let mut controller = controller(rows);

        controller.listing_mut().table_mut().toggle_all();
        controller.bulk_delete_fuel_reports(&mut harness.ctx()).unwrap();
        controller.confirm_prompt(&mut harness.ctx());

        assert!(controller.listing().table().is_empty());
        assert!(!controller.listing().table().all_toggled());
    }

    #[test]
    fn test_bulk_delete_with_nothing_selected() {
        let mut harness = Harness::new(MemoryStore::new(25));
        let controller = controller(vec![report("1", "A")]);
        assert!(!controller.bulk_delete_fuel_reports(&mut harness.ctx()).unwrap());
        assert!(harness.modals.is_empty());
    }

    #[test]
    fn test_failed_delete_keeps_prompt_open() {
        let mut harness = Harness::new(FailingStore::default());
        let mut controller = controller(vec![report("1", "A")]);

        controller
            .run_row_action(RowAction::Delete, "1", &mut harness.ctx())
            .unwrap();
        controller.confirm_prompt(&mut harness.ctx());

        assert_eq!(controller.listing().table().len(), 1);
        let prompt = harness.modals.prompt_mut().unwrap();
        assert!(!prompt.is_loading());
        assert!(prompt.error.is_some());
        assert_eq!(harness.notifier.errors.len(), 1);
    }

    #[test]
    fn test_single_delete_removes_row() {
        let rows = vec![report("1", "A"), report("2", "B")];
        let store = MemoryStore::new(25).with_records(&rows).unwrap();
        let mut harness = Harness::new(store);
        let mut controller = controller(rows);

        controller
            .run_row_action(RowAction::Delete, "2", &mut harness.ctx())
            .unwrap();
        controller.confirm_prompt(&mut harness.ctx());

        assert_eq!(controller.listing().table().rows(), &[report("1", "A")]);
        assert!(!controller.listing_mut().take_refresh());
    }

    #[test]
    fn test_view_opens_details() {
        let mut harness = Harness::new(MemoryStore::new(25));
        let controller = controller(vec![report("1", "Morning refuel")]);

        controller.activate_focused(&mut harness.ctx()).unwrap();
        let Some(Modal::Details(details)) = harness.modals.top() else {
            panic!("expected details modal");
        };
        assert_eq!(details.title, "Morning refuel");
        assert!(details
            .rows
            .contains(&("Name".to_string(), "Morning refuel".to_string())));
    }

    #[test]
    fn test_search_resets_page_on_commit() {
        let query = QueryState::from_query_string(fuel_report_query_params(), "page=3").unwrap();
        let mut controller = FuelReportsController::new(
            query,
            status_options(FUEL_REPORT_STATUSES),
            Duration::from_millis(250),
        )
        .unwrap();
        let t0 = Instant::now();

        controller.listing_mut().search("al", t0);
        controller
            .listing_mut()
            .search("ale", t0 + Duration::from_millis(100));
        assert_eq!(controller.listing().query().query(), None);

        let committed = controller
            .listing_mut()
            .poll_search(t0 + Duration::from_millis(350));
        assert_eq!(committed.as_deref(), Some("ale"));
        assert_eq!(controller.listing().query().page(), 1);
    }
}
