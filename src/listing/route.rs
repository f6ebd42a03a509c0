//! Routes and transitions
//!
//! A route declares the query parameters it recognizes, registers its
//! loading indicator, fetches its model and hands it to the listing. The
//! `Router` performs transitions in two steps so the loading indicator is on
//! screen for at least one frame: `begin` on one tick, `resolve` on the next.

use super::query::{QueryParamSpec, QueryState};
use super::Listing;
use crate::error::StoreError;
use crate::model::Record;
use crate::services::loader::{LoadingIndicator, Transition};
use crate::services::store::{Collection, RecordStore};

pub trait Route {
    type Record: Record;

    /// Route name as it appears in the URL
    fn name(&self) -> &'static str;

    /// Recognized query parameters and which of them refresh the model
    fn query_params(&self) -> QueryParamSpec;

    /// Register the loading indicator for a transition
    fn loading(&self, transition: Transition, loader: &mut LoadingIndicator) {
        let _ = (transition, loader);
    }

    /// Fetch the model for the current parameters
    fn model<S: RecordStore>(
        &self,
        store: &S,
        params: &QueryState,
    ) -> Result<Collection<Self::Record>, StoreError> {
        store.query(params)
    }

    fn setup_controller(&self, listing: &mut Listing<Self::Record>, model: Collection<Self::Record>) {
        listing.set_model(model);
    }
}

#[derive(Debug)]
pub struct Router<Rt> {
    route: Rt,
    entered: bool,
    pending: Option<Transition>,
}

impl<Rt: Route> Router<Rt> {
    pub fn new(route: Rt) -> Self {
        Self {
            route,
            entered: false,
            pending: None,
        }
    }

    pub fn route(&self) -> &Rt {
        &self.route
    }

    /// Whether the route's model has been fetched at least once
    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a transition: initial until the route has been entered, a refresh afterwards
    pub fn begin(&mut self, loader: &mut LoadingIndicator) -> Transition {
        let transition = if self.entered {
            Transition::Refresh
        } else {
            Transition::Initial
        };
        self.pending = Some(transition);
        self.route.loading(transition, loader);
        tracing::debug!(route = self.route.name(), ?transition, "transition started");
        transition
    }

    /// Finish the pending transition, if any, by fetching the model
    ///
    /// The loading indicator is hidden whatever the outcome.
    pub fn resolve<S: RecordStore>(
        &mut self,
        store: &S,
        listing: &mut Listing<Rt::Record>,
        loader: &mut LoadingIndicator,
    ) -> Result<Option<Transition>, StoreError> {
        let Some(transition) = self.pending.take() else {
            return Ok(None);
        };

        let result = self.route.model(store, listing.query());
        loader.hide();
        let model = result?;

        tracing::info!(
            route = self.route.name(),
            ?transition,
            total = model.meta.total,
            page = model.meta.page,
            "model loaded"
        );
        self.route.setup_controller(listing, model);
        self.entered = true;
        Ok(Some(transition))
    }

    /// Current URL of the route for the given parameters
    pub fn url(&self, params: &QueryState) -> String {
        let query = params.to_query_string();
        if query.is_empty() {
            format!("/{}", self.route.name())
        } else {
            format!("/{}?{}", self.route.name(), query)
        }
    }
}
