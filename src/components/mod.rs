//! UI Components
//!
//! Each component encapsulates its own event handling and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod confirm_dialog;
pub mod console;
pub mod details_dialog;
pub mod filter_dialog;
pub mod help_dialog;
pub mod layout;
pub mod listing_table;
pub mod record_form_dialog;
pub mod row_actions_menu;

pub use confirm_dialog::ConfirmDialog;
pub use console::{draw_console_screen, ConsoleComponent, ConsoleRenderContext};
pub use details_dialog::DetailsDialog;
pub use filter_dialog::FilterDialogComponent;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_console_layout, centered_popup};
pub use listing_table::{hit_test, TableHit};
pub use record_form_dialog::RecordFormDialog;
pub use row_actions_menu::RowActionsDialog;
