//! Management screens: one route and controller pair per listing
//!
//! Controller actions never reach for global services. Everything an action
//! touches arrives through `ActionContext`.

pub mod fuel_reports;
pub mod vendors;

use crate::model::modal::ModalStack;
use crate::services::crud::CrudHelper;

pub use fuel_reports::{FuelReportsController, FuelReportsRoute};
pub use vendors::{VendorsController, VendorsRoute};

/// Collaborators handed to controller actions
pub struct ActionContext<'a, S, N> {
    pub store: &'a mut S,
    pub modals: &'a mut ModalStack,
    pub notifier: &'a mut N,
    pub crud: &'a CrudHelper,
}

impl<'a, S, N> ActionContext<'a, S, N> {
    pub fn new(
        store: &'a mut S,
        modals: &'a mut ModalStack,
        notifier: &'a mut N,
        crud: &'a CrudHelper,
    ) -> Self {
        Self {
            store,
            modals,
            notifier,
            crud,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Collaborator doubles shared by controller tests

    use crate::error::StoreError;
    use crate::listing::query::QueryState;
    use crate::model::Record;
    use crate::services::notifications::Notifier;
    use crate::services::store::{Collection, MemoryStore, RecordStore};
    use std::fmt;
    use std::fs;
    use std::path::PathBuf;

    /// Notifier that keeps every message
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub successes: Vec<String>,
        pub errors: Vec<String>,
    }

    impl Notifier for RecordingNotifier {
        fn success(&mut self, message: &str) {
            self.successes.push(message.to_string());
        }

        fn server_error(&mut self, error: &dyn fmt::Display) {
            self.errors.push(error.to_string());
        }
    }

    /// Store whose writes are always refused
    #[derive(Debug, Default)]
    pub struct FailingStore {
        pub save_attempts: usize,
    }

    impl RecordStore for FailingStore {
        fn query<R: Record>(&self, _params: &QueryState) -> Result<Collection<R>, StoreError> {
            Ok(Collection::default())
        }

        fn all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
            Ok(Vec::new())
        }

        fn save<R: Record>(&mut self, _record: &R) -> Result<R, StoreError> {
            self.save_attempts += 1;
            Err(StoreError::rejected(R::ENTITY.label(), "service unavailable"))
        }

        fn delete<R: Record>(&mut self, _record: &R) -> Result<(), StoreError> {
            Err(StoreError::rejected(R::ENTITY.label(), "service unavailable"))
        }
    }

    /// A `MemoryStore` whose dataset file can never be written
    ///
    /// The dataset path sits below a regular file, so every persist fails
    /// with an I/O error. Returns the scratch directory for cleanup.
    pub fn unwritable_store<R: Record>(records: &[R]) -> (MemoryStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("fleet-console-ro-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let store = MemoryStore::load(blocker.join("fleet.yaml"), 25)
            .unwrap()
            .with_records(records)
            .unwrap();
        (store, dir)
    }
}
