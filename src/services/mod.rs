//! Collaborators the listings call but do not implement
//!
//! - Record storage and querying
//! - Delete, bulk delete and export with confirmation
//! - Notifications
//! - Loading indicator

pub mod crud;
pub mod loader;
pub mod notifications;
pub mod store;

pub use crud::CrudHelper;
pub use loader::{LoadingIndicator, LoadingState};
pub use notifications::{Notification, NotificationCenter, NotificationLevel, Notifier};
pub use store::{MemoryStore, RecordStore};
