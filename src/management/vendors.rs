//! Vendors listing
//!
//! Read-only: vendors can be browsed, searched, filtered and inspected.

use super::ActionContext;
use crate::error::ConfigurationError;
use crate::listing::columns::{
    ColumnBuilder, ColumnSet, ColumnWidth, DropdownMenu, FilterKind, MenuItem, RowAction,
};
use crate::listing::query::{QueryParamSpec, QueryState};
use crate::listing::{Listing, Route};
use crate::model::modal::{DetailsModal, Modal, RowActionsMenu};
use crate::model::{Record, Vendor};
use crate::services::loader::{LoadingIndicator, Transition, MAIN_CONTENT};
use crate::services::notifications::Notifier;
use crate::services::store::RecordStore;
use std::time::Duration;

pub fn vendor_query_params() -> QueryParamSpec {
    QueryParamSpec::listing().text("country").set("status")
}

#[derive(Debug, Default)]
pub struct VendorsRoute;

impl Route for VendorsRoute {
    type Record = Vendor;

    fn name(&self) -> &'static str {
        "vendors"
    }

    fn query_params(&self) -> QueryParamSpec {
        vendor_query_params()
    }

    fn loading(&self, transition: Transition, loader: &mut LoadingIndicator) {
        loader.show_on_initial_transition(transition, MAIN_CONTENT, "Loading vendors...");
    }
}

pub fn vendor_columns(status_options: Vec<String>) -> Result<ColumnSet, ConfigurationError> {
    ColumnSet::new(vec![
        ColumnBuilder::new("Name", "name")
            .width(ColumnWidth::Px(200))
            .anchor(RowAction::View)
            .sortable(true)
            .resizable(true),
        ColumnBuilder::new("ID", "public_id")
            .width(ColumnWidth::Px(120))
            .anchor(RowAction::View)
            .sortable(true),
        ColumnBuilder::new("Type", "type")
            .width(ColumnWidth::Px(100))
            .sortable(true),
        ColumnBuilder::new("Email", "email").width(ColumnWidth::Px(80)).hidden(),
        ColumnBuilder::new("Phone", "phone").width(ColumnWidth::Px(80)).hidden(),
        ColumnBuilder::new("Address", "address").width(ColumnWidth::Px(80)).hidden(),
        ColumnBuilder::new("Country", "country")
            .width(ColumnWidth::Px(80))
            .sortable(true)
            .filterable(true)
            .filter(FilterKind::Text),
        ColumnBuilder::new("Status", "status")
            .status()
            .width(ColumnWidth::Percent(10))
            .sortable(true)
            .filterable(true)
            .filter(FilterKind::MultiOption(status_options)),
        ColumnBuilder::new("Created At", "created_at")
            .width(ColumnWidth::Percent(10))
            .sortable(true),
        ColumnBuilder::actions(
            DropdownMenu::new(
                "Vendor Actions",
                vec![MenuItem::action("View Details", RowAction::View)],
            )
            .with_icon("ellipsis-h"),
        )
        .width(ColumnWidth::Px(150)),
    ])
}

#[derive(Debug, Clone)]
pub struct VendorsController {
    listing: Listing<Vendor>,
}

impl VendorsController {
    pub fn new(
        query: QueryState,
        status_options: Vec<String>,
        search_debounce: Duration,
    ) -> Result<Self, ConfigurationError> {
        let columns = vendor_columns(status_options)?;
        Ok(Self {
            listing: Listing::new(columns, query, search_debounce)?,
        })
    }

    pub fn listing(&self) -> &Listing<Vendor> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<Vendor> {
        &mut self.listing
    }

    pub fn view_vendor<S: RecordStore, N: Notifier>(
        &self,
        vendor: &Vendor,
        ctx: &mut ActionContext<'_, S, N>,
    ) {
        let details = DetailsModal::for_record(&vendor.name, vendor, self.listing.columns());
        ctx.modals.show(Modal::Details(details));
    }

    pub fn open_row_actions<S: RecordStore, N: Notifier>(&self, ctx: &mut ActionContext<'_, S, N>) {
        let (Some(menu), Some(focused)) = (
            self.listing.columns().row_actions(),
            self.listing.table().focused(),
        ) else {
            return;
        };
        if let Some(id) = focused.id() {
            ctx.modals
                .show(Modal::RowActions(RowActionsMenu::new(menu.clone(), id, &focused.name)));
        }
    }

    /// Vendors only support viewing; other actions are logged and ignored
    pub fn run_row_action<S: RecordStore, N: Notifier>(
        &self,
        action: RowAction,
        record_id: &str,
        ctx: &mut ActionContext<'_, S, N>,
    ) {
        let vendor = self
            .listing
            .table()
            .rows()
            .iter()
            .find(|v| v.id() == Some(record_id));
        match (action, vendor) {
            (RowAction::View, Some(vendor)) => self.view_vendor(vendor, ctx),
            (action, _) => tracing::debug!(?action, record_id, "vendor action ignored"),
        }
    }

    pub fn activate_focused<S: RecordStore, N: Notifier>(&self, ctx: &mut ActionContext<'_, S, N>) {
        let action = self.listing.columns().primary_action();
        let id = self.listing.table().focused().and_then(|v| v.id());
        if let (Some(action), Some(id)) = (action, id) {
            self.run_row_action(action, id, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::columns::status_options;
    use crate::listing::query::FilterValue;
    use crate::listing::Router;
    use crate::management::testing::RecordingNotifier;
    use crate::model::modal::ModalStack;
    use crate::model::VENDOR_STATUSES;
    use crate::services::crud::CrudHelper;
    use crate::services::store::{Collection, MemoryStore, PageMeta};

    fn vendor(id: &str, name: &str, country: &str) -> Vendor {
        Vendor {
            id: Some(id.to_string()),
            name: name.to_string(),
            country: Some(country.to_string()),
            status: Some("active".to_string()),
            ..Vendor::default()
        }
    }

    fn controller() -> VendorsController {
        VendorsController::new(
            QueryState::new(vendor_query_params()),
            status_options(VENDOR_STATUSES),
            Duration::from_millis(250),
        )
        .unwrap()
    }

    #[test]
    fn test_every_param_refreshes() {
        let spec = vendor_query_params();
        for name in ["page", "limit", "sort", "query", "country", "status"] {
            assert!(spec.refreshes(name), "{name} should refresh the model");
        }
        assert_eq!(spec.iter().count(), 6);
    }

    #[test]
    fn test_loader_only_on_initial_transition() {
        let store = MemoryStore::new(25)
            .with_records(&[vendor("1", "Harbour Fuels", "NZ")])
            .unwrap();
        let mut controller = controller();
        let mut router = Router::new(VendorsRoute);
        let mut loader = LoadingIndicator::new();

        assert_eq!(router.begin(&mut loader), Transition::Initial);
        assert_eq!(loader.state().unwrap().message, "Loading vendors...");
        let resolved = router
            .resolve(&store, controller.listing_mut(), &mut loader)
            .unwrap();
        assert_eq!(resolved, Some(Transition::Initial));
        assert!(!loader.state().is_some());
        assert_eq!(controller.listing().table().len(), 1);

        controller
            .listing_mut()
            .apply_filters(vec![(
                "country".to_string(),
                Some(FilterValue::Text("AU".to_string())),
            )])
            .unwrap();
        assert!(controller.listing_mut().take_refresh());
        assert_eq!(router.begin(&mut loader), Transition::Refresh);
        assert!(!loader.state().is_some());
        router
            .resolve(&store, controller.listing_mut(), &mut loader)
            .unwrap();
        assert!(controller.listing().table().is_empty());
    }

    #[test]
    fn test_router_url() {
        let mut controller = controller();
        let router = Router::new(VendorsRoute);
        assert_eq!(router.url(controller.listing().query()), "/vendors");

        controller.listing_mut().set_model(Collection {
            records: Vec::new(),
            meta: PageMeta {
                total: 40,
                page: 1,
                limit: 25,
                last_page: 2,
            },
        });
        assert!(controller.listing_mut().next_page());
        assert_eq!(router.url(controller.listing().query()), "/vendors?page=2");
    }

    #[test]
    fn test_only_view_is_offered() {
        let columns = vendor_columns(status_options(VENDOR_STATUSES)).unwrap();
        let actions = columns.row_actions().unwrap().actions();
        assert_eq!(actions, vec![("View Details", RowAction::View)]);
    }

    #[test]
    fn test_activate_opens_details() {
        let mut store = MemoryStore::new(25)
            .with_records(&[vendor("1", "Harbour Fuels", "NZ")])
            .unwrap();
        let mut controller = controller();
        let model = store.query(controller.listing().query()).unwrap();
        controller.listing_mut().set_model(model);

        let mut modals = ModalStack::new();
        let mut notifier = RecordingNotifier::default();
        let crud = CrudHelper::new(std::env::temp_dir());
        let mut ctx = ActionContext::new(&mut store, &mut modals, &mut notifier, &crud);

        controller.run_row_action(RowAction::Delete, "1", &mut ctx);
        assert!(ctx.modals.is_empty());

        controller.activate_focused(&mut ctx);
        let Some(Modal::Details(details)) = ctx.modals.top() else {
            panic!("expected details modal");
        };
        assert_eq!(details.title, "Harbour Fuels");
    }
}
