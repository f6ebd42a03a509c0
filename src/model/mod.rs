//! Model layer - records and presentation state
//!
//! - `Record` - the trait every listed entity implements
//! - `FuelReport`, `Vendor` - the entities
//! - `ModalStack` - Modal overlay management
//! - `Tab` - which listing is on screen

pub mod fuel_report;
pub mod modal;
pub mod record;
pub mod ui;
pub mod vendor;

// Re-export commonly used types
pub use fuel_report::{FuelReport, FUEL_REPORT_STATUSES};
pub use record::{EntityType, FieldKind, Record, RecordPayload};
pub use vendor::{Vendor, VENDOR_STATUSES};
