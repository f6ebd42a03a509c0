//! Record store service
//!
//! `RecordStore` is the data-access seam listings talk to. `MemoryStore`
//! keeps every entity in memory, loads its dataset from a YAML file and
//! writes it back after each save or delete.

use crate::error::StoreError;
use crate::listing::query::{FilterValue, QueryState};
use crate::model::record::lookup;
use crate::model::{EntityType, Record};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Page size used when the query state carries no `limit`
pub const DEFAULT_LIMIT: u32 = 25;

/// Pagination metadata returned with a page of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub last_page: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: DEFAULT_LIMIT,
            last_page: 1,
        }
    }
}

/// One page of records
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<R> {
    pub records: Vec<R>,
    pub meta: PageMeta,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            meta: PageMeta::default(),
        }
    }
}

/// Data-access collaborator
pub trait RecordStore {
    /// Fetch the page of `R` described by the query state
    fn query<R: Record>(&self, params: &QueryState) -> Result<Collection<R>, StoreError>;

    /// Every stored `R`, unpaginated
    fn all<R: Record>(&self) -> Result<Vec<R>, StoreError>;

    /// A new, unsaved record
    fn create_record<R: Record>(&self) -> R {
        R::default()
    }

    /// Persist a record, returning it as stored
    fn save<R: Record>(&mut self, record: &R) -> Result<R, StoreError>;

    fn delete<R: Record>(&mut self, record: &R) -> Result<(), StoreError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Memory Store
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory store backed by a YAML dataset file
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: BTreeMap<EntityType, Vec<Value>>,
    path: Option<PathBuf>,
    default_limit: u32,
}

impl MemoryStore {
    /// An empty store that never touches disk
    pub fn new(default_limit: u32) -> Self {
        Self {
            entities: BTreeMap::new(),
            path: None,
            default_limit: default_limit.max(1),
        }
    }

    /// Load the dataset at `path`; a missing file starts an empty dataset there
    pub fn load<P: AsRef<Path>>(path: P, default_limit: u32) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entities = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_yaml::from_str::<BTreeMap<EntityType, Vec<Value>>>(&contents)?
        } else {
            tracing::warn!(path = %path.display(), "dataset not found, starting empty");
            BTreeMap::new()
        };

        let counts: Vec<String> = entities
            .iter()
            .map(|(entity, rows)| format!("{}={}", entity, rows.len()))
            .collect();
        tracing::info!(path = %path.display(), records = %counts.join(" "), "dataset loaded");

        Ok(Self {
            entities,
            path: Some(path),
            default_limit: default_limit.max(1),
        })
    }

    /// Seed records, replacing any stored for the same entity
    #[cfg(test)]
    pub fn with_records<R: Record>(mut self, records: &[R]) -> Result<Self, StoreError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.entities.insert(R::ENTITY, values);
        Ok(self)
    }

    fn rows(&self, entity: EntityType) -> &[Value] {
        self.entities.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Write `entities` to disk, then adopt them; on failure the store is untouched
    fn commit(&mut self, entities: BTreeMap<EntityType, Vec<Value>>) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, serde_yaml::to_string(&entities)?)?;
        }
        self.entities = entities;
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn query<R: Record>(&self, params: &QueryState) -> Result<Collection<R>, StoreError> {
        let mut rows: Vec<&Value> = self
            .rows(R::ENTITY)
            .iter()
            .filter(|row| matches_query::<R>(row, params.query()))
            .filter(|row| {
                params
                    .filters()
                    .all(|(param, value)| matches_filter(row, R::param_path(param), value))
            })
            .collect();

        if let Some(sort) = params.sort() {
            rows.sort_by(|a, b| {
                compare_values(lookup(a, &sort.key), lookup(b, &sort.key), sort.descending)
            });
        }

        let limit = params.limit().unwrap_or(self.default_limit).max(1);
        let total = rows.len();
        let last_page = (total as u32).div_ceil(limit).max(1);
        let page = params.page();
        let start = (page as usize - 1).saturating_mul(limit as usize);

        let records = rows
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .map(|row| serde_json::from_value::<R>(row.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            entity = %R::ENTITY,
            total,
            page,
            limit,
            returned = records.len(),
            "query"
        );

        Ok(Collection {
            records,
            meta: PageMeta {
                total,
                page,
                limit,
                last_page,
            },
        })
    }

    fn all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.rows(R::ENTITY)
            .iter()
            .map(|row| serde_json::from_value::<R>(row.clone()).map_err(StoreError::from))
            .collect()
    }

    fn save<R: Record>(&mut self, record: &R) -> Result<R, StoreError> {
        if record.name().trim().is_empty() {
            return Err(StoreError::rejected(R::ENTITY.label(), "name is required"));
        }

        let mut saved = record.clone();
        if saved.is_new() {
            let id = Uuid::new_v4().simple().to_string();
            let public_id = format!(
                "{}_{}",
                R::ENTITY.public_id_prefix(),
                id.chars().take(7).collect::<String>()
            );
            saved.assign_identity(id, public_id);
        }
        saved.touch(Utc::now());

        let value = serde_json::to_value(&saved)?;
        let mut entities = self.entities.clone();
        let rows = entities.entry(R::ENTITY).or_default();
        match rows.iter().position(|row| row_id(row) == saved.id()) {
            Some(index) => rows[index] = value,
            None => rows.push(value),
        }

        self.commit(entities)?;
        tracing::info!(entity = %R::ENTITY, id = saved.id().unwrap_or_default(), "record saved");
        Ok(saved)
    }

    fn delete<R: Record>(&mut self, record: &R) -> Result<(), StoreError> {
        let Some(id) = record.id() else {
            return Err(StoreError::rejected(
                R::ENTITY.label(),
                "record has not been saved",
            ));
        };

        let mut entities = self.entities.clone();
        let rows = entities.entry(R::ENTITY).or_default();
        let index = rows
            .iter()
            .position(|row| row_id(row) == Some(id))
            .ok_or_else(|| StoreError::NotFound {
                entity: R::ENTITY.label().to_string(),
                id: id.to_string(),
            })?;
        rows.remove(index);

        self.commit(entities)?;
        tracing::info!(entity = %R::ENTITY, id, "record deleted");
        Ok(())
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn matches_query<R: Record>(row: &Value, query: Option<&str>) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = query.to_lowercase();
    R::search_paths().iter().any(|path| {
        lookup(row, path)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&needle))
    })
}

fn matches_filter(row: &Value, path: &str, filter: &FilterValue) -> bool {
    let value = lookup(row, path);
    match filter {
        FilterValue::Text(text) => {
            let needle = text.trim().to_lowercase();
            value
                .and_then(scalar_text)
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        }
        FilterValue::Set(options) => value
            .and_then(scalar_text)
            .is_some_and(|s| options.contains(&s)),
        FilterValue::DateRange(range) => value
            .and_then(Value::as_str)
            .and_then(|s| DateTime::<FixedOffset>::parse_from_rfc3339(s).ok())
            .is_some_and(|ts| range.contains(ts.date_naive())),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Order JSON scalars: numbers numerically, strings case-insensitively.
/// Nulls sort last in either direction.
fn compare_values(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => {
                    let x = scalar_text(a).unwrap_or_default().to_lowercase();
                    let y = scalar_text(b).unwrap_or_default().to_lowercase();
                    x.cmp(&y)
                }
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}
