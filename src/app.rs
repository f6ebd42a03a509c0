//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! Listing behaviour lives in the controllers and routes under `management`;
//! App routes actions to them and owns the shared collaborators.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_console_layout, draw_console_screen, hit_test, ConfirmDialog, ConsoleComponent,
    ConsoleRenderContext, DetailsDialog, FilterDialogComponent, HelpDialog, RecordFormDialog,
    RowActionsDialog, TableHit,
};
use crate::config::Config;
use crate::listing::columns::{status_options, CellKind, FilterKind, RowAction};
use crate::listing::query::QueryState;
use crate::listing::search::SearchStep;
use crate::listing::{Listing, Route, Router};
use crate::management::{
    ActionContext, FuelReportsController, FuelReportsRoute, VendorsController, VendorsRoute,
};
use crate::model::modal::{FilterDialog, Modal, ModalStack};
use crate::model::ui::Tab;
use crate::model::{FuelReport, Record, Vendor, FUEL_REPORT_STATUSES, VENDOR_STATUSES};
use crate::services::{
    CrudHelper, LoadingIndicator, MemoryStore, NotificationCenter, Notifier, RecordStore,
};
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, Frame};
use std::time::Instant;

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Dataset every listing reads from and writes to
    pub store: MemoryStore,

    /// Modal overlay stack
    pub modals: ModalStack,

    pub notifications: NotificationCenter,
    pub loader: LoadingIndicator,
    pub crud: CrudHelper,

    pub fuel_reports: FuelReportsController,
    fuel_reports_router: Router<FuelReportsRoute>,
    pub vendors: VendorsController,
    vendors_router: Router<VendorsRoute>,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Error from the last failed model fetch; blocks automatic retries
    pub error: Option<String>,

    /// Area of the last drawn frame
    area: Rect,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub console: ConsoleComponent,
    pub help_dialog: HelpDialog,
    pub confirm_dialog: ConfirmDialog,
    pub form_dialog: RecordFormDialog,
    pub details_dialog: DetailsDialog,
    pub row_actions_dialog: RowActionsDialog,
    pub filter_dialog: FilterDialogComponent,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Build the app on `tab`, with `query` as that tab's initial query string
    pub fn new(config: Config, store: MemoryStore, tab: Tab, query: Option<&str>) -> Result<App> {
        let initial_query = |for_tab: Tab, spec| match query {
            Some(q) if for_tab == tab => QueryState::from_query_string(spec, q),
            _ => Ok(QueryState::new(spec)),
        };

        let fuel_statuses = status_options(
            FUEL_REPORT_STATUSES
                .iter()
                .map(|s| s.to_string())
                .chain(store.all::<FuelReport>()?.into_iter().map(|r| r.status)),
        );
        let vendor_statuses = status_options(
            VENDOR_STATUSES
                .iter()
                .map(|s| s.to_string())
                .chain(store.all::<Vendor>()?.into_iter().filter_map(|v| v.status)),
        );

        // Each listing recognizes exactly the parameters its route declares
        let fuel_reports_router = Router::new(FuelReportsRoute);
        let vendors_router = Router::new(VendorsRoute);

        let debounce = config.search_debounce();
        let fuel_reports = FuelReportsController::new(
            initial_query(Tab::FuelReports, fuel_reports_router.route().query_params())?,
            fuel_statuses,
            debounce,
        )?;
        let vendors = VendorsController::new(
            initial_query(Tab::Vendors, vendors_router.route().query_params())?,
            vendor_statuses,
            debounce,
        )?;

        Ok(App {
            notifications: NotificationCenter::new(config.notification_ttl()),
            crud: CrudHelper::new(&config.export_dir),
            store,
            modals: ModalStack::new(),
            loader: LoadingIndicator::new(),
            fuel_reports,
            fuel_reports_router,
            vendors,
            vendors_router,
            should_quit: false,
            error: None,
            area: Rect::default(),
            console: ConsoleComponent::new(tab),
            help_dialog: HelpDialog,
            confirm_dialog: ConfirmDialog,
            form_dialog: RecordFormDialog,
            details_dialog: DetailsDialog,
            row_actions_dialog: RowActionsDialog,
            filter_dialog: FilterDialogComponent,
        })
    }

    /// URL of the route on screen
    pub fn url(&self) -> String {
        match self.console.active_tab {
            Tab::FuelReports => self
                .fuel_reports_router
                .url(self.fuel_reports.listing().query()),
            Tab::Vendors => self.vendors_router.url(self.vendors.listing().query()),
        }
    }

    /// Move both routes one step: resolve pending transitions, begin new ones
    fn advance_routes(&mut self) {
        let active = self.console.active_tab;
        let retry = self.error.is_none();
        let results = [
            advance_route(
                &mut self.fuel_reports_router,
                self.fuel_reports.listing_mut(),
                active == Tab::FuelReports,
                retry,
                &self.store,
                &mut self.loader,
            ),
            advance_route(
                &mut self.vendors_router,
                self.vendors.listing_mut(),
                active == Tab::Vendors,
                retry,
                &self.store,
                &mut self.loader,
            ),
        ];
        for result in results {
            if let Err(e) = result {
                tracing::warn!(error = %e, "model fetch failed");
                self.notifications.server_error(&e);
                self.error = Some(e.to_string());
            }
        }
    }

    fn focused_fuel_report_id(&self) -> Option<String> {
        self.fuel_reports
            .listing()
            .table()
            .focused()
            .and_then(|r| r.id())
            .map(str::to_string)
    }
}

/// One routing step for a listing
///
/// A pending transition resolves first. Otherwise the active listing begins
/// a transition when it has never been entered or a refresh is waiting; an
/// inactive listing keeps its refresh until it is shown again.
fn advance_route<Rt: Route, S: RecordStore>(
    router: &mut Router<Rt>,
    listing: &mut Listing<Rt::Record>,
    active: bool,
    retry: bool,
    store: &S,
    loader: &mut LoadingIndicator,
) -> Result<(), crate::error::StoreError> {
    if router.is_pending() {
        router.resolve(store, listing, loader)?;
        return Ok(());
    }
    if !active {
        return Ok(());
    }
    let refresh = listing.take_refresh();
    if refresh || (!router.is_entered() && retry) {
        router.begin(loader);
    }
    Ok(())
}

/// Listing-level actions shared by every tab
fn apply_listing_action<R: Record>(listing: &mut Listing<R>, action: &Action, now: Instant) {
    match action {
        Action::NextItem => listing.table_mut().next(),
        Action::PrevItem => listing.table_mut().previous(),
        Action::FirstItem => listing.table_mut().first(),
        Action::LastItem => listing.table_mut().last(),
        Action::PrevColumn => listing.move_column(-1),
        Action::NextColumn => listing.move_column(1),
        Action::NextPage => {
            listing.next_page();
        }
        Action::PrevPage => {
            listing.previous_page();
        }
        Action::ToggleSort => {
            if !listing.toggle_sort() {
                tracing::debug!("focused column is not sortable");
            }
        }
        Action::Refresh => listing.request_refresh(),
        Action::SearchInput(c) => {
            let mut value = listing.search_input().to_string();
            value.push(*c);
            search(listing, &value, now);
        }
        Action::SearchBackspace => {
            let mut value = listing.search_input().to_string();
            value.pop();
            search(listing, &value, now);
        }
        Action::ClearSearch => search(listing, "", now),
        Action::ToggleRowSelection => listing.table_mut().toggle_focused(),
        Action::ToggleAllRows => listing.table_mut().toggle_all(),
        _ => {}
    }
}

/// Apply a click on the table; clicking an anchor or the dropdown cell chains into its action
fn click_listing<R: Record>(listing: &mut Listing<R>, hit: TableHit) -> Option<Action> {
    match hit {
        TableHit::SelectAll => listing.table_mut().toggle_all(),
        TableHit::Header(column) => {
            listing.focus_column(column);
            if !listing.toggle_sort() {
                tracing::debug!(column, "clicked column is not sortable");
            }
        }
        TableHit::SelectRow(row) => {
            if listing.table_mut().focus(row) {
                listing.table_mut().toggle_focused();
            }
        }
        TableHit::Cell { row, column } => {
            if !listing.table_mut().focus(row) {
                return None;
            }
            listing.focus_column(column);
            let id = listing.table().focused()?.id()?.to_string();
            return match &listing.focused_column()?.cell {
                CellKind::Anchor { action } => Some(Action::RunRowAction(*action, id)),
                CellKind::Dropdown(_) => Some(Action::OpenRowActions),
                _ => None,
            };
        }
    }
    None
}

fn search<R: Record>(listing: &mut Listing<R>, value: &str, now: Instant) {
    if let SearchStep::Scheduled {
        generation,
        deadline,
    } = listing.search(value, now)
    {
        let wait = deadline.saturating_duration_since(now);
        tracing::trace!(generation, wait_ms = wait.as_millis() as u64, "search scheduled");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(modal) = self.modals.top().cloned() {
            self.handle_modal_key_event(&modal, key)
        } else {
            self.console.handle_key_event(key)
        }
    }

    /// Clicks and wheel scrolls on the table; ignored under a modal or while loading
    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.modals.is_empty() || self.loader.state().is_some() {
            return Ok(None);
        }
        let action = match mouse.kind {
            MouseEventKind::ScrollDown => Some(Action::NextItem),
            MouseEventKind::ScrollUp => Some(Action::PrevItem),
            MouseEventKind::Down(MouseButton::Left) => {
                let table = calculate_console_layout(self.area).table;
                let (x, y) = (mouse.column, mouse.row);
                let hit = match self.console.active_tab {
                    Tab::FuelReports => hit_test(self.fuel_reports.listing(), table, x, y),
                    Tab::Vendors => hit_test(self.vendors.listing(), table, x, y),
                };
                hit.map(Action::ClickTable)
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let now = Instant::now();
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.notifications.prune(now);
                self.fuel_reports.listing_mut().poll_search(now);
                self.vendors.listing_mut().poll_search(now);
                self.advance_routes();
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Tabs
            // ─────────────────────────────────────────────────────────────────
            Action::NextTab => self.console.next_tab(),
            Action::PrevTab => self.console.previous_tab(),

            // ─────────────────────────────────────────────────────────────────
            // Search Mode
            // ─────────────────────────────────────────────────────────────────
            Action::EnterSearchMode => self.console.search_mode = true,
            Action::ExitSearchMode => self.console.search_mode = false,

            // ─────────────────────────────────────────────────────────────────
            // Listing (delegate to the active listing)
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem
            | Action::PrevItem
            | Action::FirstItem
            | Action::LastItem
            | Action::PrevColumn
            | Action::NextColumn
            | Action::NextPage
            | Action::PrevPage
            | Action::ToggleSort
            | Action::Refresh
            | Action::SearchInput(_)
            | Action::SearchBackspace
            | Action::ClearSearch
            | Action::ToggleRowSelection
            | Action::ToggleAllRows => {
                if action == Action::Refresh {
                    self.error = None;
                }
                match self.console.active_tab {
                    Tab::FuelReports => {
                        apply_listing_action(self.fuel_reports.listing_mut(), &action, now)
                    }
                    Tab::Vendors => apply_listing_action(self.vendors.listing_mut(), &action, now),
                }
            }
            Action::OpenFilters => {
                let dialog = match self.console.active_tab {
                    Tab::FuelReports => {
                        let listing = self.fuel_reports.listing();
                        FilterDialog::from_columns(listing.columns(), listing.query())
                    }
                    Tab::Vendors => {
                        let listing = self.vendors.listing();
                        FilterDialog::from_columns(listing.columns(), listing.query())
                    }
                };
                if !dialog.entries.is_empty() {
                    self.modals.show(Modal::Filter(dialog));
                }
            }
            Action::ClickTable(hit) => {
                return Ok(match self.console.active_tab {
                    Tab::FuelReports => click_listing(self.fuel_reports.listing_mut(), hit),
                    Tab::Vendors => click_listing(self.vendors.listing_mut(), hit),
                });
            }

            // ─────────────────────────────────────────────────────────────────
            // Row Actions
            // ─────────────────────────────────────────────────────────────────
            Action::ActivateRow | Action::OpenRowActions | Action::RunRowAction(_, _) => {
                let mut ctx = ActionContext::new(
                    &mut self.store,
                    &mut self.modals,
                    &mut self.notifications,
                    &self.crud,
                );
                match (self.console.active_tab, action) {
                    (Tab::FuelReports, Action::ActivateRow) => {
                        if let Err(e) = self.fuel_reports.activate_focused(&mut ctx) {
                            ctx.notifier.server_error(&e);
                        }
                    }
                    (Tab::FuelReports, Action::OpenRowActions) => {
                        self.fuel_reports.open_row_actions(&mut ctx)
                    }
                    (Tab::FuelReports, Action::RunRowAction(row_action, id)) => {
                        if let Err(e) = self.fuel_reports.run_row_action(row_action, &id, &mut ctx) {
                            ctx.notifier.server_error(&e);
                        }
                    }
                    (Tab::Vendors, Action::ActivateRow) => self.vendors.activate_focused(&mut ctx),
                    (Tab::Vendors, Action::OpenRowActions) => self.vendors.open_row_actions(&mut ctx),
                    (Tab::Vendors, Action::RunRowAction(row_action, id)) => {
                        self.vendors.run_row_action(row_action, &id, &mut ctx)
                    }
                    _ => {}
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Fuel Report Management
            // ─────────────────────────────────────────────────────────────────
            Action::EditRecord | Action::DeleteRecord => {
                if self.console.active_tab != Tab::FuelReports {
                    return Ok(None);
                }
                let Some(id) = self.focused_fuel_report_id() else {
                    return Ok(None);
                };
                let row_action = if action == Action::EditRecord {
                    RowAction::Edit
                } else {
                    RowAction::Delete
                };
                return Ok(Some(Action::RunRowAction(row_action, id)));
            }
            Action::CreateRecord | Action::BulkDelete | Action::Export => {
                if self.console.active_tab != Tab::FuelReports {
                    return Ok(None);
                }
                let mut ctx = ActionContext::new(
                    &mut self.store,
                    &mut self.modals,
                    &mut self.notifications,
                    &self.crud,
                );
                let result = match action {
                    Action::CreateRecord => self.fuel_reports.create_fuel_report(&mut ctx),
                    Action::BulkDelete => {
                        self.fuel_reports.bulk_delete_fuel_reports(&mut ctx).map(|opened| {
                            if !opened {
                                tracing::debug!("bulk delete with no rows selected");
                            }
                        })
                    }
                    _ => {
                        self.fuel_reports.export_fuel_reports(&mut ctx);
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    ctx.notifier.server_error(&e);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Modal Management
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.modals.show(Modal::QuitConfirm),
            Action::OpenHelp => self.modals.show(Modal::Help { scroll_offset: 0 }),
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => return self.confirm_modal(),
            Action::ModalUp
            | Action::ModalDown
            | Action::ModalLeft
            | Action::ModalRight
            | Action::ModalInput(_)
            | Action::ModalBackspace
            | Action::ModalClear => self.edit_modal(action),
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.area = area;
        let ctx = ConsoleRenderContext {
            fuel_reports: self.fuel_reports.listing(),
            vendors: self.vendors.listing(),
            url: self.url(),
            notification: self.notifications.latest(),
            loading: self.loader.state(),
            error: self.error.as_deref(),
        };
        draw_console_screen(frame, area, &self.console, &ctx)?;

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm | Modal::Confirm(_) => self.confirm_dialog.handle_key_event(key),
            Modal::Help { .. } => self.help_dialog.handle_key_event(key),
            Modal::Details(_) => self.details_dialog.handle_key_event(key),
            Modal::Form(_) => self.form_dialog.handle_key_event(key),
            Modal::RowActions(_) => self.row_actions_dialog.handle_key_event(key),
            Modal::Filter(_) => self.filter_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.confirm_dialog.draw_quit(frame, area)?,
            Modal::Confirm(prompt) => self.confirm_dialog.draw_prompt(frame, area, prompt)?,
            Modal::Help { scroll_offset } => {
                self.help_dialog.draw_with_offset(frame, area, *scroll_offset)?
            }
            Modal::Details(details) => self.details_dialog.draw_with_details(frame, area, details)?,
            Modal::Form(form) => self.form_dialog.draw_with_form(frame, area, form)?,
            Modal::RowActions(menu) => self.row_actions_dialog.draw_with_menu(frame, area, menu)?,
            Modal::Filter(dialog) => self.filter_dialog.draw_with_dialog(frame, area, dialog)?,
        }
        Ok(())
    }

    /// Accept whatever the top modal offers
    fn confirm_modal(&mut self) -> Result<Option<Action>> {
        let Some(modal) = self.modals.top().cloned() else {
            return Ok(None);
        };
        match modal {
            Modal::QuitConfirm => self.should_quit = true,
            Modal::Help { .. } | Modal::Details(_) => {
                self.modals.pop();
            }
            Modal::RowActions(menu) => {
                self.modals.pop();
                if let Some(row_action) = menu.selected() {
                    return Ok(Some(Action::RunRowAction(row_action, menu.record_id)));
                }
            }
            Modal::Form(_) | Modal::Confirm(_) => {
                let mut ctx = ActionContext::new(
                    &mut self.store,
                    &mut self.modals,
                    &mut self.notifications,
                    &self.crud,
                );
                if matches!(modal, Modal::Form(_)) {
                    if let Some(saved) = self.fuel_reports.confirm_form(&mut ctx) {
                        tracing::info!(name = %saved.name, "fuel report saved");
                    }
                } else {
                    self.fuel_reports.confirm_prompt(&mut ctx);
                }
            }
            Modal::Filter(dialog) => {
                let applied = dialog.values().and_then(|values| match self.console.active_tab {
                    Tab::FuelReports => self.fuel_reports.listing_mut().apply_filters(values),
                    Tab::Vendors => self.vendors.listing_mut().apply_filters(values),
                });
                match applied {
                    Ok(changed) => {
                        tracing::debug!(changed, "filters applied");
                        self.modals.pop();
                    }
                    Err(e) => {
                        if let Some(Modal::Filter(open)) = self.modals.top_mut() {
                            open.error = Some(e.to_string());
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    /// Navigation and input inside the top modal
    fn edit_modal(&mut self, action: Action) {
        let max_help_scroll = HelpDialog::max_scroll(self.area);
        let Some(modal) = self.modals.top_mut() else {
            return;
        };
        match (modal, action) {
            (Modal::Help { scroll_offset }, Action::ModalDown) => {
                *scroll_offset = (*scroll_offset + 1).min(max_help_scroll);
            }
            (Modal::Help { scroll_offset }, Action::ModalUp) => {
                *scroll_offset = scroll_offset.saturating_sub(1);
            }
            (Modal::Details(details), Action::ModalDown) => {
                details.scroll_offset = (details.scroll_offset + 1).min(details.rows.len());
            }
            (Modal::Details(details), Action::ModalUp) => {
                details.scroll_offset = details.scroll_offset.saturating_sub(1);
            }
            (Modal::RowActions(menu), Action::ModalDown) => menu.next(),
            (Modal::RowActions(menu), Action::ModalUp) => menu.previous(),
            (Modal::Form(form), action) if !form.is_loading() => match action {
                Action::ModalDown => form.focus_next(),
                Action::ModalUp => form.focus_previous(),
                Action::ModalLeft => form.cycle_choice(-1),
                Action::ModalRight => form.cycle_choice(1),
                Action::ModalInput(c) => form.input_char(c),
                Action::ModalBackspace => form.backspace(),
                Action::ModalClear => form.clear_focused(),
                _ => {}
            },
            (Modal::Filter(dialog), action) => match action {
                Action::ModalDown => dialog.next(),
                Action::ModalUp => dialog.previous(),
                Action::ModalLeft => dialog.move_option(-1),
                Action::ModalRight => dialog.move_option(1),
                Action::ModalInput(' ')
                    if matches!(
                        dialog.focused().map(|e| &e.kind),
                        Some(FilterKind::MultiOption(_))
                    ) =>
                {
                    dialog.toggle_option()
                }
                Action::ModalInput(c) => dialog.input_char(c),
                Action::ModalBackspace => dialog.backspace(),
                Action::ModalClear => dialog.clear_focused(),
                _ => {}
            },
            _ => {}
        }
    }
}
