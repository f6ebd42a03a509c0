//! Error taxonomy for the console
//!
//! - `ConfigurationError` - inconsistent column descriptor tables, raised when
//!   a controller builds its columns
//! - `StoreError` - persistence failures reported by the record store
//! - `QueryParamError` - malformed query-parameter values
//! - `FormError` - field-level validation failures inside a record form

use thiserror::Error;

/// A column descriptor table that cannot be rendered as declared
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("column '{column}' is filterable but declares no filter kind")]
    FilterWithoutKind { column: String },

    #[error("column '{column}' declares a filter kind but is not filterable")]
    FilterKindWithoutFilterable { column: String },

    #[error("column '{column}' has no value path")]
    MissingValuePath { column: String },

    #[error("value path '{path}' is used by more than one column")]
    DuplicateValuePath { path: String },

    #[error("expected exactly one row-action column, found {count}")]
    ActionColumnCount { count: usize },

    #[error("row-action column must not have a value path")]
    ActionColumnWithValuePath,

    #[error("row-action column must not be {flag}")]
    ActionColumnFlag { flag: &'static str },

    #[error("row-action menu has no actions")]
    EmptyActionMenu,

    #[error("column '{column}' filters on '{param}', which is not a recognized query parameter")]
    UnknownFilterParam { column: String, param: String },
}

/// A save, delete, query or export rejected by the data layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} rejected: {reason}")]
    Rejected { entity: String, reason: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    #[error("dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset could not be parsed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("record could not be converted: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub fn rejected(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Rejected {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}

/// A query-parameter value that cannot be parsed for its declared kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamError {
    #[error("'{param}' must be a positive integer, got '{value}'")]
    InvalidInteger { param: String, value: String },

    #[error("'{value}' is not a valid sort key")]
    InvalidSort { value: String },

    #[error("'{param}' must be a date range (YYYY-MM-DD..YYYY-MM-DD), got '{value}'")]
    InvalidDateRange { param: String, value: String },

    #[error("'{param}' must be a list of values, got '{value}'")]
    InvalidSet { param: String, value: String },

    #[error("'{param}' is not a recognized query parameter")]
    UnknownParam { param: String },

    #[error("'{param}' expects a {expected} value")]
    KindMismatch {
        param: String,
        expected: &'static str,
    },
}

/// A form field value that does not fit the record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("'{field}' is not an editable field")]
    UnknownField { field: String },

    #[error("'{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
