//! Column descriptors
//!
//! A listing declares its columns once, through `ColumnBuilder`, and the
//! resulting `ColumnSet` is validated as a whole. Sortable, filterable and
//! resizable are independent flags; none implies another.

use super::query::QueryParamSpec;
use crate::error::ConfigurationError;
use std::collections::HashSet;

// ═══════════════════════════════════════════════════════════════════════════════
// Row Actions
// ═══════════════════════════════════════════════════════════════════════════════

/// Handler a row action dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    View,
    Edit,
    Delete,
}

/// One entry of a row-action dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Action { label: String, action: RowAction },
    /// Non-interactive divider
    Separator,
}

impl MenuItem {
    pub fn action(label: &str, action: RowAction) -> Self {
        MenuItem::Action {
            label: label.to_string(),
            action,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, MenuItem::Separator)
    }
}

/// Row-action dropdown carried by the trailing action column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownMenu {
    pub menu_label: String,
    pub button_text: Option<String>,
    pub button_icon: Option<String>,
    pub items: Vec<MenuItem>,
}

impl DropdownMenu {
    pub fn new(menu_label: &str, items: Vec<MenuItem>) -> Self {
        Self {
            menu_label: menu_label.to_string(),
            button_text: None,
            button_icon: None,
            items,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.button_icon = Some(icon.to_string());
        self
    }

    /// Actions in menu order; separators are never part of this list
    pub fn actions(&self) -> Vec<(&str, RowAction)> {
        self.items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Action { label, action } => Some((label.as_str(), *action)),
                MenuItem::Separator => None,
            })
            .collect()
    }

    /// Indices into `items` that can be focused
    pub fn selectable_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_separator())
            .map(|(i, _)| i)
            .collect()
    }

    /// Action at an item index, `None` for separators
    pub fn action_at(&self, index: usize) -> Option<RowAction> {
        match self.items.get(index)? {
            MenuItem::Action { action, .. } => Some(*action),
            MenuItem::Separator => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Column Descriptor
// ═══════════════════════════════════════════════════════════════════════════════

/// How a cell renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    Text,
    /// Link that triggers a row action when activated
    Anchor { action: RowAction },
    Status,
    Dropdown(DropdownMenu),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    Px(u16),
    Percent(u16),
}

impl ColumnWidth {
    /// Terminal cells for this width inside a table `total` cells wide
    pub fn cells(&self, total: u16) -> u16 {
        match self {
            // A terminal cell is roughly ten CSS pixels wide
            ColumnWidth::Px(px) => (px / 10).max(4),
            ColumnWidth::Percent(pct) => (total.saturating_mul(*pct) / 100).max(4),
        }
    }
}

/// Filter UI a column offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    MultiOption(Vec<String>),
    DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub kind: FilterKind,
    /// Query parameter the filter writes to
    pub param: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub label: String,
    pub value_path: Option<String>,
    pub sort_param: Option<String>,
    pub width: ColumnWidth,
    pub cell: CellKind,
    pub hidden: bool,
    pub sortable: bool,
    pub resizable: bool,
    pub filter: Option<ColumnFilter>,
}

impl ColumnDescriptor {
    /// Key sent as `sort`; the sort param if declared, else the value path
    pub fn sort_key(&self) -> Option<&str> {
        if !self.sortable {
            return None;
        }
        self.sort_param.as_deref().or(self.value_path.as_deref())
    }

    pub fn is_filterable(&self) -> bool {
        self.filter.is_some()
    }

    pub fn row_actions(&self) -> Option<&DropdownMenu> {
        match &self.cell {
            CellKind::Dropdown(menu) => Some(menu),
            _ => None,
        }
    }
}

/// Builder for one column; `build` rejects inconsistent filter declarations
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    label: String,
    value_path: Option<String>,
    sort_param: Option<String>,
    width: ColumnWidth,
    cell: CellKind,
    hidden: bool,
    sortable: bool,
    resizable: bool,
    filterable: bool,
    filter_kind: Option<FilterKind>,
    filter_param: Option<String>,
}

impl ColumnBuilder {
    /// A plain-text column reading `value_path`
    pub fn new(label: &str, value_path: &str) -> Self {
        Self {
            label: label.to_string(),
            value_path: Some(value_path.to_string()),
            sort_param: None,
            width: ColumnWidth::Px(100),
            cell: CellKind::Text,
            hidden: false,
            sortable: false,
            resizable: false,
            filterable: false,
            filter_kind: None,
            filter_param: None,
        }
    }

    /// The trailing row-action column
    pub fn actions(menu: DropdownMenu) -> Self {
        Self {
            label: String::new(),
            value_path: None,
            cell: CellKind::Dropdown(menu),
            ..Self::new("", "")
        }
    }

    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    pub fn anchor(mut self, action: RowAction) -> Self {
        self.cell = CellKind::Anchor { action };
        self
    }

    pub fn status(mut self) -> Self {
        self.cell = CellKind::Status;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.filter_kind = Some(kind);
        self
    }

    pub fn filter_param(mut self, param: &str) -> Self {
        self.filter_param = Some(param.to_string());
        self
    }

    pub fn sort_param(mut self, param: &str) -> Self {
        self.sort_param = Some(param.to_string());
        self
    }

    pub fn build(self) -> Result<ColumnDescriptor, ConfigurationError> {
        let filter = match (self.filterable, self.filter_kind) {
            (true, Some(kind)) => {
                let param = self
                    .filter_param
                    .or_else(|| self.value_path.clone())
                    .ok_or_else(|| ConfigurationError::MissingValuePath {
                        column: self.label.clone(),
                    })?;
                Some(ColumnFilter { kind, param })
            }
            (true, None) => {
                return Err(ConfigurationError::FilterWithoutKind { column: self.label })
            }
            (false, Some(_)) => {
                return Err(ConfigurationError::FilterKindWithoutFilterable {
                    column: self.label,
                })
            }
            (false, None) => None,
        };

        Ok(ColumnDescriptor {
            label: self.label,
            value_path: self.value_path,
            sort_param: self.sort_param,
            width: self.width,
            cell: self.cell,
            hidden: self.hidden,
            sortable: self.sortable,
            resizable: self.resizable,
            filter,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Column Set
// ═══════════════════════════════════════════════════════════════════════════════

/// Validated, immutable column configuration of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    /// Build every column and check the table as a whole
    ///
    /// - every data column has a unique value path
    /// - exactly one column carries the row-action dropdown
    /// - the action column has no value path and is neither sortable,
    ///   filterable nor resizable
    pub fn new(builders: Vec<ColumnBuilder>) -> Result<Self, ConfigurationError> {
        let columns = builders
            .into_iter()
            .map(ColumnBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        let action_columns = Self::check_columns(&columns)?;
        if action_columns != 1 {
            return Err(ConfigurationError::ActionColumnCount {
                count: action_columns,
            });
        }

        Ok(Self { columns })
    }

    /// Validate each column, returning the number of action columns
    fn check_columns(columns: &[ColumnDescriptor]) -> Result<usize, ConfigurationError> {
        let mut paths = HashSet::new();
        let mut action_columns = 0;

        for column in columns {
            if let Some(menu) = column.row_actions() {
                action_columns += 1;
                if column.value_path.is_some() {
                    return Err(ConfigurationError::ActionColumnWithValuePath);
                }
                if column.sortable {
                    return Err(ConfigurationError::ActionColumnFlag { flag: "sortable" });
                }
                if column.is_filterable() {
                    return Err(ConfigurationError::ActionColumnFlag { flag: "filterable" });
                }
                if column.resizable {
                    return Err(ConfigurationError::ActionColumnFlag { flag: "resizable" });
                }
                if menu.actions().is_empty() {
                    return Err(ConfigurationError::EmptyActionMenu);
                }
                continue;
            }

            let path = column
                .value_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ConfigurationError::MissingValuePath {
                    column: column.label.clone(),
                })?;
            if !paths.insert(path) {
                return Err(ConfigurationError::DuplicateValuePath {
                    path: path.to_string(),
                });
            }
        }

        Ok(action_columns)
    }

    /// Check that every filter writes to a parameter the listing recognizes
    pub fn check_filter_params(&self, spec: &QueryParamSpec) -> Result<(), ConfigurationError> {
        for column in &self.columns {
            if let Some(filter) = &column.filter {
                if !spec.contains(&filter.param) {
                    return Err(ConfigurationError::UnknownFilterParam {
                        column: column.label.clone(),
                        param: filter.param.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Columns shown by default, in declaration order
    pub fn visible(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.hidden).collect()
    }

    /// Data columns (everything but the action column)
    pub fn data_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| c.row_actions().is_none())
            .collect()
    }

    pub fn filterable(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_filterable()).collect()
    }

    /// The row-action dropdown
    pub fn row_actions(&self) -> Option<&DropdownMenu> {
        self.columns.iter().find_map(ColumnDescriptor::row_actions)
    }

    /// Action triggered by activating a row: the first anchor column's action
    pub fn primary_action(&self) -> Option<RowAction> {
        self.columns.iter().find_map(|c| match c.cell {
            CellKind::Anchor { action } => Some(action),
            _ => None,
        })
    }
}

/// Filter options from a status enumeration, first occurrence kept
pub fn status_options<I, S>(statuses: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    statuses
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> DropdownMenu {
        DropdownMenu::new(
            "Actions",
            vec![
                MenuItem::action("View", RowAction::View),
                MenuItem::Separator,
                MenuItem::action("Delete", RowAction::Delete),
            ],
        )
    }

    #[test]
    fn test_filterable_without_kind_is_rejected() {
        let err = ColumnBuilder::new("Name", "name")
            .filterable(true)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::FilterWithoutKind {
                column: "Name".to_string()
            }
        );
    }

    #[test]
    fn test_kind_without_filterable_is_rejected() {
        let err = ColumnBuilder::new("Name", "name")
            .filter(FilterKind::Text)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::FilterKindWithoutFilterable { .. }));
    }

    #[test]
    fn test_flags_are_independent() {
        let column = ColumnBuilder::new("Phone", "phone")
            .filterable(true)
            .filter(FilterKind::Text)
            .build()
            .unwrap();
        assert!(column.is_filterable());
        assert!(!column.sortable);
        assert!(!column.resizable);
        assert_eq!(column.sort_key(), None);
    }

    #[test]
    fn test_sort_key_defaults_to_value_path() {
        let column = ColumnBuilder::new("Address", "place.address")
            .sortable(true)
            .build()
            .unwrap();
        assert_eq!(column.sort_key(), Some("place.address"));

        let column = ColumnBuilder::new("Created At", "createdAt")
            .sortable(true)
            .sort_param("created_at")
            .build()
            .unwrap();
        assert_eq!(column.sort_key(), Some("created_at"));
    }

    #[test]
    fn test_filter_param_defaults_to_value_path() {
        let column = ColumnBuilder::new("Address", "place.address")
            .filterable(true)
            .filter(FilterKind::Text)
            .filter_param("address")
            .build()
            .unwrap();
        assert_eq!(column.filter.unwrap().param, "address");

        let column = ColumnBuilder::new("Country", "country")
            .filterable(true)
            .filter(FilterKind::Text)
            .build()
            .unwrap();
        assert_eq!(column.filter.unwrap().param, "country");
    }

    #[test]
    fn test_separators_are_not_dispatchable() {
        let menu = menu();
        assert_eq!(
            menu.actions(),
            vec![("View", RowAction::View), ("Delete", RowAction::Delete)]
        );
        assert_eq!(menu.selectable_indices(), vec![0, 2]);
        assert_eq!(menu.action_at(1), None);
        assert_eq!(menu.action_at(2), Some(RowAction::Delete));
    }

    #[test]
    fn test_column_set_requires_exactly_one_action_column() {
        let err = ColumnSet::new(vec![ColumnBuilder::new("Name", "name")]).unwrap_err();
        assert_eq!(err, ConfigurationError::ActionColumnCount { count: 0 });

        let err = ColumnSet::new(vec![
            ColumnBuilder::new("Name", "name"),
            ColumnBuilder::actions(menu()),
            ColumnBuilder::actions(menu()),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::ActionColumnCount { count: 2 });
    }

    #[test]
    fn test_action_column_cannot_sort() {
        let err = ColumnSet::new(vec![
            ColumnBuilder::new("Name", "name"),
            ColumnBuilder::actions(menu()).sortable(true),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::ActionColumnFlag { flag: "sortable" });
    }

    #[test]
    fn test_duplicate_value_paths_are_rejected() {
        let err = ColumnSet::new(vec![
            ColumnBuilder::new("Name", "name"),
            ColumnBuilder::new("Title", "name"),
            ColumnBuilder::actions(menu()),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateValuePath { .. }));
    }

    #[test]
    fn test_check_filter_params() {
        let columns = ColumnSet::new(vec![
            ColumnBuilder::new("Country", "country")
                .filterable(true)
                .filter(FilterKind::Text),
            ColumnBuilder::actions(menu()),
        ])
        .unwrap();

        assert!(columns.check_filter_params(&QueryParamSpec::listing()).is_err());
        assert!(columns
            .check_filter_params(&QueryParamSpec::listing().text("country"))
            .is_ok());
    }

    #[test]
    fn test_width_cells() {
        assert_eq!(ColumnWidth::Px(200).cells(100), 20);
        assert_eq!(ColumnWidth::Percent(10).cells(120), 12);
        assert_eq!(ColumnWidth::Px(10).cells(100), 4);
    }

    #[test]
    fn test_status_options_are_deduplicated() {
        let options = status_options(["draft", "approved", "draft", " ", "approved ", "rejected"]);
        assert_eq!(options, vec!["draft", "approved", "rejected"]);
    }
}
