//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::components::TableHit;
use crate::listing::columns::RowAction;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for debounce, transitions and toast expiry
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    NextItem,
    PrevItem,
    FirstItem,
    LastItem,
    NextTab,
    PrevTab,
    /// Move the column cursor left
    PrevColumn,
    /// Move the column cursor right
    NextColumn,
    NextPage,
    PrevPage,
    /// Left click on the listing table
    ClickTable(TableHit),

    // ─────────────────────────────────────────────────────────────────────────
    // Listing
    // ─────────────────────────────────────────────────────────────────────────
    /// Cycle the focused column's sort
    ToggleSort,
    OpenFilters,
    /// Re-fetch the current route's model
    Refresh,

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────
    EnterSearchMode,
    ExitSearchMode,
    /// Add character to search query
    SearchInput(char),
    /// Remove last character from search query
    SearchBackspace,
    /// Clear the search field
    ClearSearch,

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────
    ToggleRowSelection,
    /// Flip the "all selected" toggle
    ToggleAllRows,

    // ─────────────────────────────────────────────────────────────────────────
    // Row Actions
    // ─────────────────────────────────────────────────────────────────────────
    /// Activate the focused row's anchor
    ActivateRow,
    OpenRowActions,
    /// Run a row action against the record with this id
    RunRowAction(RowAction, String),
    CreateRecord,
    EditRecord,
    DeleteRecord,
    BulkDelete,
    Export,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,
    /// Navigate up in modal (e.g., previous field)
    ModalUp,
    /// Navigate down in modal (e.g., next field)
    ModalDown,
    /// Step left in modal (e.g., previous choice)
    ModalLeft,
    /// Step right in modal (e.g., next choice)
    ModalRight,
    /// Type into the focused modal input
    ModalInput(char),
    ModalBackspace,
    /// Clear the focused modal input
    ModalClear,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::NextTab => write!(f, "NextTab"),
            Action::PrevTab => write!(f, "PrevTab"),
            Action::PrevColumn => write!(f, "PrevColumn"),
            Action::NextColumn => write!(f, "NextColumn"),
            Action::NextPage => write!(f, "NextPage"),
            Action::PrevPage => write!(f, "PrevPage"),
            Action::ClickTable(hit) => write!(f, "ClickTable({:?})", hit),
            Action::ToggleSort => write!(f, "ToggleSort"),
            Action::OpenFilters => write!(f, "OpenFilters"),
            Action::Refresh => write!(f, "Refresh"),
            Action::EnterSearchMode => write!(f, "EnterSearchMode"),
            Action::ExitSearchMode => write!(f, "ExitSearchMode"),
            Action::SearchInput(c) => write!(f, "SearchInput('{}')", c),
            Action::SearchBackspace => write!(f, "SearchBackspace"),
            Action::ClearSearch => write!(f, "ClearSearch"),
            Action::ToggleRowSelection => write!(f, "ToggleRowSelection"),
            Action::ToggleAllRows => write!(f, "ToggleAllRows"),
            Action::ActivateRow => write!(f, "ActivateRow"),
            Action::OpenRowActions => write!(f, "OpenRowActions"),
            Action::RunRowAction(action, id) => write!(f, "RunRowAction({:?}, {})", action, id),
            Action::CreateRecord => write!(f, "CreateRecord"),
            Action::EditRecord => write!(f, "EditRecord"),
            Action::DeleteRecord => write!(f, "DeleteRecord"),
            Action::BulkDelete => write!(f, "BulkDelete"),
            Action::Export => write!(f, "Export"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::ModalUp => write!(f, "ModalUp"),
            Action::ModalDown => write!(f, "ModalDown"),
            Action::ModalLeft => write!(f, "ModalLeft"),
            Action::ModalRight => write!(f, "ModalRight"),
            Action::ModalInput(c) => write!(f, "ModalInput('{}')", c),
            Action::ModalBackspace => write!(f, "ModalBackspace"),
            Action::ModalClear => write!(f, "ModalClear"),
        }
    }
}
