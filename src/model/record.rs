//! Records owned by the data layer
//!
//! A record is addressed by dotted value paths (`name`, `place.address`) the
//! same way column descriptors and filters address it. Paths are resolved
//! against the record's serde representation so every entity gets lookup,
//! editing and export for free.

use crate::error::FormError;
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Entity types the console lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    FuelReport,
    Vendor,
}

impl EntityType {
    /// Model name used by the data layer and in export file names
    pub fn model_name(&self) -> &'static str {
        match self {
            EntityType::FuelReport => "fuel-report",
            EntityType::Vendor => "vendor",
        }
    }

    /// Prefix of generated public ids
    pub fn public_id_prefix(&self) -> &'static str {
        match self {
            EntityType::FuelReport => "fuel_report",
            EntityType::Vendor => "vendor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityType::FuelReport => "fuel report",
            EntityType::Vendor => "vendor",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            EntityType::FuelReport => "fuel reports",
            EntityType::Vendor => "vendors",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_name())
    }
}

/// Input kind of an editable form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Choice(&'static [&'static str]),
}

/// One editable field of a record form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub path: &'static str,
    pub kind: FieldKind,
    /// Required fields hold an empty string rather than null when cleared
    pub required: bool,
}

impl FormField {
    pub const fn text(label: &'static str, path: &'static str) -> Self {
        Self {
            label,
            path,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn number(label: &'static str, path: &'static str) -> Self {
        Self {
            label,
            path,
            kind: FieldKind::Number,
            required: false,
        }
    }

    pub const fn choice(
        label: &'static str,
        path: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            label,
            path,
            kind: FieldKind::Choice(options),
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

/// A persisted (or not yet persisted) domain entity
pub trait Record: Clone + Default + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    const ENTITY: EntityType;

    /// Store identifier; `None` until the record has been saved
    fn id(&self) -> Option<&str>;

    fn name(&self) -> &str;

    /// Assign the identifiers handed out by the store on first save
    fn assign_identity(&mut self, id: String, public_id: String);

    /// Stamp creation/update times on save
    fn touch(&mut self, now: DateTime<Utc>);

    /// Whether the record has never been saved
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Map a query parameter name onto the value path it filters
    fn param_path(param: &str) -> &str {
        param
    }

    /// Value paths matched by free-text search
    fn search_paths() -> &'static [&'static str] {
        &["name", "public_id", "internal_id"]
    }

    /// Fields offered by the edit form
    fn form_fields() -> &'static [FormField] {
        &[]
    }

    /// Display value at a dotted path, `None` when the path is absent or null
    fn value_at(&self, path: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        lookup(&value, path).and_then(display_value)
    }
}

/// A record carried by a modal, independent of its concrete type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayload {
    entity: EntityType,
    value: Value,
}

impl RecordPayload {
    pub fn new<R: Record>(record: &R) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entity: R::ENTITY,
            value: serde_json::to_value(record)?,
        })
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn id(&self) -> Option<&str> {
        self.value.get("id").and_then(Value::as_str)
    }

    /// Display name, falling back to the public id for unnamed records
    pub fn name(&self) -> &str {
        ["name", "public_id"]
            .iter()
            .filter_map(|key| self.value.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or("untitled")
    }

    /// Value at a dotted path, rendered for display
    pub fn value_at(&self, path: &str) -> Option<String> {
        lookup(&self.value, path).and_then(display_value)
    }

    /// Recover the concrete record; `None` when the payload holds another entity
    pub fn decode<R: Record>(&self) -> Option<R> {
        if self.entity != R::ENTITY {
            return None;
        }
        serde_json::from_value(self.value.clone()).ok()
    }
}

/// Resolve a dotted path inside a JSON value
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Render a JSON scalar for display; timestamps are shortened to minutes
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => match DateTime::<FixedOffset>::parse_from_rfc3339(s) {
            Ok(ts) => Some(ts.format("%Y-%m-%d %H:%M").to_string()),
            Err(_) => Some(s.clone()),
        },
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            Some(parts.join(", "))
        }
        Value::Object(_) => None,
    }
}

/// Return a copy of `record` with the form field at `field.path` set from raw input
///
/// Empty input clears optional values. Numbers are parsed, choices are checked
/// against their options. A value the record cannot hold is a `FormError`.
pub fn with_field_value<R: Record>(record: &R, field: &FormField, raw: &str) -> Result<R, FormError> {
    let invalid = |reason: String| FormError::InvalidValue {
        field: field.label.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    let new_value = match field.kind {
        _ if trimmed.is_empty() && field.required => Value::String(String::new()),
        _ if trimmed.is_empty() => Value::Null,
        FieldKind::Text => Value::String(raw.to_string()),
        FieldKind::Number => {
            let number: f64 = trimmed
                .parse()
                .map_err(|_| invalid(format!("'{}' is not a number", trimmed)))?;
            serde_json::Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(|| invalid(format!("'{}' is not a finite number", trimmed)))?
        }
        FieldKind::Choice(options) => {
            if !options.contains(&trimmed) {
                return Err(invalid(format!(
                    "must be one of: {}",
                    options.join(", ")
                )));
            }
            Value::String(trimmed.to_string())
        }
    };

    let mut value = serde_json::to_value(record).map_err(|e| invalid(e.to_string()))?;
    set_path(&mut value, field.path, new_value).ok_or_else(|| FormError::UnknownField {
        field: field.path.to_string(),
    })?;

    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

fn set_path(root: &mut Value, path: &str, new_value: Value) -> Option<()> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop()?;

    let mut current = root;
    for segment in segments {
        let object = current.as_object_mut()?;
        let entry = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        current = entry;
    }

    current.as_object_mut()?.insert(last.to_string(), new_value);
    Some(())
}
