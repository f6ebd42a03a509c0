//! Generic CRUD helper
//!
//! `delete`, `bulk_delete` and `export` each show their own confirmation
//! prompt. When the user confirms, the listing hands the prompt back to
//! `confirm`, which performs the remote operation and returns the outcome for
//! the listing to reflect into its table.

use crate::error::StoreError;
use crate::listing::columns::ColumnSet;
use crate::model::modal::{ConfirmPrompt, CrudOperation, Modal, ModalStack};
use crate::model::{Record, RecordPayload};
use crate::services::store::RecordStore;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a bulk delete prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDeleteOptions {
    /// Value path naming each record in the prompt body
    pub model_name_path: String,
    pub accept_button_text: String,
}

impl Default for BulkDeleteOptions {
    fn default() -> Self {
        Self {
            model_name_path: "name".to_string(),
            accept_button_text: "Delete".to_string(),
        }
    }
}

/// Result of a confirmed prompt
#[derive(Debug)]
pub enum CrudOutcome<R> {
    Deleted(R),
    /// Every record in the prompt was attempted; `failures` lists those the store refused
    BulkDeleted {
        deleted: Vec<R>,
        failures: Vec<(R, StoreError)>,
    },
    Exported { path: PathBuf, rows: usize },
}

#[derive(Debug, Clone)]
pub struct CrudHelper {
    export_dir: PathBuf,
}

impl CrudHelper {
    pub fn new<P: AsRef<Path>>(export_dir: P) -> Self {
        Self {
            export_dir: export_dir.as_ref().to_path_buf(),
        }
    }

    /// Ask before deleting one record
    pub fn delete<R: Record>(&self, record: &R, modals: &mut ModalStack) -> Result<(), StoreError> {
        let payload = RecordPayload::new(record)?;
        let prompt = ConfirmPrompt::new(
            &format!("Delete {}?", payload.name()),
            "Delete",
            CrudOperation::Delete(payload),
        )
        .with_body(vec![format!(
            "This {} will be permanently removed.",
            R::ENTITY.label()
        )]);
        modals.show(Modal::Confirm(prompt));
        Ok(())
    }

    /// Ask before deleting every record in `records`
    pub fn bulk_delete<R: Record>(
        &self,
        records: &[R],
        options: &BulkDeleteOptions,
        modals: &mut ModalStack,
    ) -> Result<(), StoreError> {
        let payloads = records
            .iter()
            .map(RecordPayload::new)
            .collect::<Result<Vec<_>, _>>()?;
        let body = payloads
            .iter()
            .map(|p| {
                p.value_at(&options.model_name_path)
                    .unwrap_or_else(|| p.name().to_string())
            })
            .collect();
        let prompt = ConfirmPrompt::new(
            &format!(
                "Delete {} {}?",
                payloads.len(),
                R::ENTITY.plural_label()
            ),
            &options.accept_button_text,
            CrudOperation::BulkDelete(payloads),
        )
        .with_body(body);
        modals.show(Modal::Confirm(prompt));
        Ok(())
    }

    /// Ask before exporting every record of `R`
    pub fn export<R: Record>(&self, modals: &mut ModalStack) {
        let prompt = ConfirmPrompt::new(
            &format!("Export {}", R::ENTITY.plural_label()),
            "Export",
            CrudOperation::Export,
        )
        .with_body(vec![format!("CSV file will be written to {}", self.export_dir.display())]);
        modals.show(Modal::Confirm(prompt));
    }

    /// Perform the operation of a confirmed prompt
    pub fn confirm<R: Record, S: RecordStore>(
        &self,
        prompt: &ConfirmPrompt,
        store: &mut S,
        columns: &ColumnSet,
    ) -> Result<CrudOutcome<R>, StoreError> {
        match &prompt.operation {
            CrudOperation::Delete(payload) => {
                let record = decode::<R>(payload)?;
                store.delete(&record)?;
                Ok(CrudOutcome::Deleted(record))
            }
            CrudOperation::BulkDelete(payloads) => {
                let mut deleted = Vec::new();
                let mut failures = Vec::new();
                for payload in payloads {
                    let record = decode::<R>(payload)?;
                    match store.delete(&record) {
                        Ok(()) => deleted.push(record),
                        Err(e) => failures.push((record, e)),
                    }
                }
                tracing::info!(
                    entity = %R::ENTITY,
                    deleted = deleted.len(),
                    failed = failures.len(),
                    "bulk delete"
                );
                Ok(CrudOutcome::BulkDeleted { deleted, failures })
            }
            CrudOperation::Export => {
                let records = store.all::<R>()?;
                let path = self.export_path::<R>();
                let rows = write_csv(&path, &records, columns)?;
                tracing::info!(entity = %R::ENTITY, rows, path = %path.display(), "export written");
                Ok(CrudOutcome::Exported { path, rows })
            }
        }
    }

    fn export_path<R: Record>(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        self.export_dir
            .join(format!("{}-{}.csv", R::ENTITY.model_name(), stamp))
    }
}

fn decode<R: Record>(payload: &RecordPayload) -> Result<R, StoreError> {
    payload
        .decode()
        .ok_or_else(|| StoreError::rejected(R::ENTITY.label(), "prompt holds another entity"))
}

/// Write `records` as CSV, one column per data column, returning the row count
pub fn write_csv<R: Record>(path: &Path, records: &[R], columns: &ColumnSet) -> Result<usize, StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let data_columns = columns.data_columns();
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(data_columns.iter().map(|c| c.label.as_str()))?;
    for record in records {
        writer.write_record(data_columns.iter().map(|c| {
            c.value_path
                .as_deref()
                .and_then(|p| record.value_at(p))
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::columns::{ColumnBuilder, DropdownMenu, MenuItem, RowAction};
    use crate::model::FuelReport;
    use crate::services::store::MemoryStore;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnBuilder::new("Name", "name"),
            ColumnBuilder::new("Address", "place.address"),
            ColumnBuilder::actions(DropdownMenu::new(
                "Actions",
                vec![MenuItem::action("Delete", RowAction::Delete)],
            )),
        ])
        .unwrap()
    }

    fn report(id: &str, name: &str) -> FuelReport {
        FuelReport {
            id: Some(id.to_string()),
            name: name.to_string(),
            ..FuelReport::default()
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("fleet-console-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_delete_shows_prompt_then_deletes() {
        let crud = CrudHelper::new(temp_dir());
        let mut store = MemoryStore::new(10)
            .with_records(&[report("1", "Refuel A"), report("2", "Refuel B")])
            .unwrap();
        let mut modals = ModalStack::new();

        crud.delete(&report("1", "Refuel A"), &mut modals).unwrap();
        let Some(Modal::Confirm(prompt)) = modals.top().cloned() else {
            panic!("expected confirmation prompt");
        };
        assert_eq!(prompt.title, "Delete Refuel A?");

        let outcome: CrudOutcome<FuelReport> = crud.confirm(&prompt, &mut store, &columns()).unwrap();
        assert!(matches!(outcome, CrudOutcome::Deleted(r) if r.name == "Refuel A"));
        assert_eq!(store.all::<FuelReport>().unwrap().len(), 1);
    }

    #[test]
    fn test_bulk_delete_reports_failures() {
        let crud = CrudHelper::new(temp_dir());
        let mut store = MemoryStore::new(10)
            .with_records(&[report("1", "A"), report("2", "B")])
            .unwrap();
        let mut modals = ModalStack::new();

        let selected = vec![report("1", "A"), report("9", "Gone")];
        crud.bulk_delete(&selected, &BulkDeleteOptions::default(), &mut modals)
            .unwrap();
        let Some(Modal::Confirm(prompt)) = modals.top().cloned() else {
            panic!("expected confirmation prompt");
        };
        assert_eq!(prompt.body, vec!["A".to_string(), "Gone".to_string()]);

        let outcome: CrudOutcome<FuelReport> = crud.confirm(&prompt, &mut store, &columns()).unwrap();
        let CrudOutcome::BulkDeleted { deleted, failures } = outcome else {
            panic!("expected bulk outcome");
        };
        assert_eq!(deleted, vec![report("1", "A")]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].1, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_export_writes_csv() {
        let dir = temp_dir();
        let crud = CrudHelper::new(&dir);
        let mut report = report("1", "Harbour refuel");
        report.place.address = Some("1 Quay St, Auckland".to_string());
        let mut store = MemoryStore::new(10).with_records(&[report]).unwrap();
        let mut modals = ModalStack::new();

        crud.export::<FuelReport>(&mut modals);
        let Some(Modal::Confirm(prompt)) = modals.top().cloned() else {
            panic!("expected confirmation prompt");
        };
        let outcome: CrudOutcome<FuelReport> = crud.confirm(&prompt, &mut store, &columns()).unwrap();
        let CrudOutcome::Exported { path, rows } = outcome else {
            panic!("expected export outcome");
        };
        assert_eq!(rows, 1);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Name,Address\nHarbour refuel,\"1 Quay St, Auckland\"\n"
        );
        fs::remove_dir_all(dir).unwrap();
    }
}
