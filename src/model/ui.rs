//! UI state - presentation state separate from domain data

/// Tab selection in the main UI, one per listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    FuelReports,
    Vendors,
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        vec![Tab::FuelReports, Tab::Vendors]
    }

    pub fn name(&self) -> &str {
        match self {
            Tab::FuelReports => "Fuel Reports",
            Tab::Vendors => "Vendors",
        }
    }

    /// Route name used in URLs and on the command line
    pub fn route_name(&self) -> &'static str {
        match self {
            Tab::FuelReports => "fuel-reports",
            Tab::Vendors => "vendors",
        }
    }

    pub fn from_route_name(name: &str) -> Option<Tab> {
        Tab::all().into_iter().find(|tab| tab.route_name() == name)
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::FuelReports => Tab::Vendors,
            Tab::Vendors => Tab::FuelReports,
        }
    }

    pub fn previous(&self) -> Tab {
        // Two tabs: stepping back is stepping forward
        self.next()
    }
}
