//! Query-parameter state for a listing
//!
//! `QueryParamSpec` declares which parameters a route/controller pair
//! recognizes and which of them force a model refetch when they change.
//! `QueryState` holds the current values, records refresh requests, and
//! round-trips to and from the URL query string.

use crate::error::QueryParamError;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::form_urlencoded;

static SORT_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").unwrap());

static DATE_RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})\s*(?:\.\.|,)\s*(\d{4}-\d{2}-\d{2})\s*$").unwrap()
});

// ═══════════════════════════════════════════════════════════════════════════════
// Parameter Declarations
// ═══════════════════════════════════════════════════════════════════════════════

/// How a parameter's value is parsed and serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Page,
    Limit,
    Sort,
    Query,
    Text,
    Set,
    DateRange,
}

impl ParamKind {
    fn expected(&self) -> &'static str {
        match self {
            ParamKind::Page | ParamKind::Limit => "positive integer",
            ParamKind::Sort => "sort key",
            ParamKind::Query | ParamKind::Text => "text",
            ParamKind::Set => "set",
            ParamKind::DateRange => "date range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: String,
    pub kind: ParamKind,
    pub refresh_model: bool,
}

/// The recognized query parameters of one listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamSpec {
    params: Vec<ParamDef>,
}

impl QueryParamSpec {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// `page`, `limit`, `sort` and `query`, all refreshing the model
    pub fn listing() -> Self {
        Self::new()
            .param("page", ParamKind::Page, true)
            .param("limit", ParamKind::Limit, true)
            .param("sort", ParamKind::Sort, true)
            .param("query", ParamKind::Query, true)
    }

    /// Declare a parameter; redeclaring a name replaces the earlier entry
    pub fn param(mut self, name: &str, kind: ParamKind, refresh_model: bool) -> Self {
        self.params.retain(|p| p.name != name);
        self.params.push(ParamDef {
            name: name.to_string(),
            kind,
            refresh_model,
        });
        self
    }

    pub fn text(self, name: &str) -> Self {
        self.param(name, ParamKind::Text, true)
    }

    pub fn set(self, name: &str) -> Self {
        self.param(name, ParamKind::Set, true)
    }

    pub fn date_range(self, name: &str) -> Self {
        self.param(name, ParamKind::DateRange, true)
    }

    pub fn get(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn refreshes(&self, name: &str) -> bool {
        self.get(name).is_some_and(|p| p.refresh_model)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════════

/// Sort key, descending when written with a leading `-`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParam {
    pub key: String,
    pub descending: bool,
}

impl SortParam {
    pub fn ascending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            descending: false,
        }
    }

    pub fn descending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            descending: true,
        }
    }
}

impl FromStr for SortParam {
    type Err = QueryParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, descending) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if !SORT_KEY_REGEX.is_match(key) {
            return Err(QueryParamError::InvalidSort {
                value: s.to_string(),
            });
        }
        Ok(Self {
            key: key.to_string(),
            descending,
        })
    }
}

impl fmt::Display for SortParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Parse `YYYY-MM-DD..YYYY-MM-DD` (or comma separated); bounds are reordered if reversed
    pub fn parse(input: &str) -> Option<Self> {
        let caps = DATE_RANGE_REGEX.captures(input)?;
        let a = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
        let b = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d").ok()?;
        Some(Self {
            from: a.min(b),
            to: a.max(b),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.from.format("%Y-%m-%d"), self.to.format("%Y-%m-%d"))
    }
}

/// Value of a filterable field parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Set(BTreeSet<String>),
    DateRange(DateRange),
}

impl FilterValue {
    fn kind(&self) -> ParamKind {
        match self {
            FilterValue::Text(_) => ParamKind::Text,
            FilterValue::Set(_) => ParamKind::Set,
            FilterValue::DateRange(_) => ParamKind::DateRange,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::Set(values) => values.is_empty(),
            FilterValue::DateRange(_) => false,
        }
    }

    fn serialize(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            // Multi-value params travel as a JSON array
            FilterValue::Set(values) => {
                serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
            }
            FilterValue::DateRange(range) => range.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query State
// ═══════════════════════════════════════════════════════════════════════════════

/// Current query-parameter values of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    spec: QueryParamSpec,
    page: u32,
    limit: Option<u32>,
    sort: Option<SortParam>,
    query: Option<String>,
    filters: BTreeMap<String, FilterValue>,
    refresh_requested: bool,
}

impl QueryState {
    pub fn new(spec: QueryParamSpec) -> Self {
        Self {
            spec,
            page: 1,
            limit: None,
            sort: None,
            query: None,
            filters: BTreeMap::new(),
            refresh_requested: false,
        }
    }

    /// Build state from a URL query string (with or without the leading `?`)
    ///
    /// Undeclared parameters are ignored.
    pub fn from_query_string(spec: QueryParamSpec, input: &str) -> Result<Self, QueryParamError> {
        let mut state = Self::new(spec);
        let input = input.trim_start_matches('?');

        for (name, value) in form_urlencoded::parse(input.as_bytes()) {
            let Some(def) = state.spec.get(&name).cloned() else {
                tracing::debug!(param = %name, "ignoring unrecognized query parameter");
                continue;
            };
            if value.is_empty() {
                continue;
            }
            state.apply_raw(&def, &value)?;
        }

        state.refresh_requested = false;
        Ok(state)
    }

    fn apply_raw(&mut self, def: &ParamDef, raw: &str) -> Result<(), QueryParamError> {
        match def.kind {
            ParamKind::Page => {
                let page = parse_positive(&def.name, raw)?;
                self.set_page(page);
            }
            ParamKind::Limit => {
                let limit = parse_positive(&def.name, raw)?;
                self.set_limit(Some(limit));
            }
            ParamKind::Sort => {
                self.set_sort(Some(raw.parse()?));
            }
            ParamKind::Query => {
                self.set_query(Some(raw.to_string()));
            }
            ParamKind::Text => {
                self.set_filter(&def.name, Some(FilterValue::Text(raw.to_string())))?;
            }
            ParamKind::Set => {
                let values = parse_set(&def.name, raw)?;
                self.set_filter(&def.name, Some(FilterValue::Set(values)))?;
            }
            ParamKind::DateRange => {
                let range =
                    DateRange::parse(raw).ok_or_else(|| QueryParamError::InvalidDateRange {
                        param: def.name.clone(),
                        value: raw.to_string(),
                    })?;
                self.set_filter(&def.name, Some(FilterValue::DateRange(range)))?;
            }
        }
        Ok(())
    }

    /// Serialize non-default values in declaration order
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for def in self.spec.iter() {
            let value = match def.kind {
                ParamKind::Page => (self.page > 1).then(|| self.page.to_string()),
                ParamKind::Limit => self.limit.map(|l| l.to_string()),
                ParamKind::Sort => self.sort.as_ref().map(|s| s.to_string()),
                ParamKind::Query => self.query.clone(),
                ParamKind::Text | ParamKind::Set | ParamKind::DateRange => {
                    self.filters.get(&def.name).map(FilterValue::serialize)
                }
            };
            if let Some(value) = value {
                serializer.append_pair(&def.name, &value);
            }
        }
        serializer.finish()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn spec(&self) -> &QueryParamSpec {
        &self.spec
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn sort(&self) -> Option<&SortParam> {
        self.sort.as_ref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn filter(&self, name: &str) -> Option<&FilterValue> {
        self.filters.get(name)
    }

    pub fn filters(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Setters
    //
    // Each setter returns whether the value changed. A change to a parameter
    // flagged `refresh_model` leaves a refresh request behind.
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the page; zero is treated as the first page
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        let changed = self.page != page;
        self.page = page;
        self.mark("page", changed)
    }

    pub fn set_limit(&mut self, limit: Option<u32>) -> bool {
        let limit = limit.filter(|l| *l > 0);
        let changed = self.limit != limit;
        self.limit = limit;
        self.mark("limit", changed)
    }

    pub fn set_sort(&mut self, sort: Option<SortParam>) -> bool {
        let changed = self.sort != sort;
        self.sort = sort;
        self.mark("sort", changed)
    }

    /// Set the free-text query; an empty string clears it
    pub fn set_query(&mut self, query: Option<String>) -> bool {
        let query = query.filter(|q| !q.is_empty());
        let changed = self.query != query;
        self.query = query;
        self.mark("query", changed)
    }

    /// Set or clear (`None` or empty value) a filterable field parameter
    pub fn set_filter(
        &mut self,
        name: &str,
        value: Option<FilterValue>,
    ) -> Result<bool, QueryParamError> {
        let def = self
            .spec
            .get(name)
            .ok_or_else(|| QueryParamError::UnknownParam {
                param: name.to_string(),
            })?;

        let value = value.filter(|v| !v.is_empty());
        if let Some(ref v) = value {
            if v.kind() != def.kind {
                return Err(QueryParamError::KindMismatch {
                    param: name.to_string(),
                    expected: def.kind.expected(),
                });
            }
        }

        let changed = self.filters.get(name) != value.as_ref();
        match value {
            Some(v) => {
                self.filters.insert(name.to_string(), v);
            }
            None => {
                self.filters.remove(name);
            }
        }
        Ok(self.mark(name, changed))
    }

    fn mark(&mut self, name: &str, changed: bool) -> bool {
        if changed && self.spec.refreshes(name) {
            self.refresh_requested = true;
        }
        changed
    }

    /// Consume the pending refresh request
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }
}

fn parse_positive(param: &str, raw: &str) -> Result<u32, QueryParamError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| QueryParamError::InvalidInteger {
            param: param.to_string(),
            value: raw.to_string(),
        })
}

fn parse_set(param: &str, raw: &str) -> Result<BTreeSet<String>, QueryParamError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<BTreeSet<String>>(trimmed).map_err(|_| {
            QueryParamError::InvalidSet {
                param: param.to_string(),
                value: raw.to_string(),
            }
        });
    }
    // Also accept a bare comma-separated list
    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vendor_spec() -> QueryParamSpec {
        QueryParamSpec::listing().text("country").set("status")
    }

    #[test]
    fn test_defaults() {
        let state = QueryState::new(vendor_spec());
        assert_eq!(state.page(), 1);
        assert_eq!(state.limit(), None);
        assert!(state.sort().is_none());
        assert!(state.query().is_none());
        assert_eq!(state.to_query_string(), "");
        assert!(!state.clone().take_refresh());
    }

    #[test]
    fn test_sort_param_parsing() {
        let sort: SortParam = "-created_at".parse().unwrap();
        assert_eq!(sort, SortParam::descending("created_at"));
        assert_eq!(sort.to_string(), "-created_at");

        let sort: SortParam = "place.address".parse().unwrap();
        assert!(!sort.descending);

        assert!("".parse::<SortParam>().is_err());
        assert!("--name".parse::<SortParam>().is_err());
        assert!("name;drop".parse::<SortParam>().is_err());
    }

    #[test]
    fn test_from_query_string() {
        let state = QueryState::from_query_string(
            vendor_spec(),
            "?page=3&limit=50&sort=-name&query=acme&country=NZ&status=%5B%22active%22%2C%22pending%22%5D&bogus=1",
        )
        .unwrap();

        assert_eq!(state.page(), 3);
        assert_eq!(state.limit(), Some(50));
        assert_eq!(state.sort(), Some(&SortParam::descending("name")));
        assert_eq!(state.query(), Some("acme"));
        assert_eq!(state.filter("country"), Some(&FilterValue::Text("NZ".to_string())));
        let statuses: BTreeSet<String> = ["active", "pending"].iter().map(|s| s.to_string()).collect();
        assert_eq!(state.filter("status"), Some(&FilterValue::Set(statuses)));
        assert!(!state.clone().take_refresh());
    }

    #[test]
    fn test_from_query_string_rejects_bad_integers() {
        let err = QueryState::from_query_string(vendor_spec(), "page=0").unwrap_err();
        assert!(matches!(err, QueryParamError::InvalidInteger { .. }));

        let err = QueryState::from_query_string(vendor_spec(), "limit=ten").unwrap_err();
        assert!(matches!(err, QueryParamError::InvalidInteger { .. }));
    }

    #[test]
    fn test_set_accepts_comma_list() {
        let state = QueryState::from_query_string(vendor_spec(), "status=active,inactive").unwrap();
        match state.filter("status") {
            Some(FilterValue::Set(values)) => assert_eq!(values.len(), 2),
            other => panic!("unexpected filter: {:?}", other),
        }
    }

    #[test]
    fn test_refresh_flags() {
        let spec = QueryParamSpec::listing()
            .param("country", ParamKind::Text, false)
            .set("status");
        let mut state = QueryState::new(spec);

        assert!(state
            .set_filter("country", Some(FilterValue::Text("AU".to_string())))
            .unwrap());
        assert!(!state.take_refresh());

        assert!(state.set_page(2));
        assert!(state.take_refresh());
        assert!(!state.take_refresh());

        // Unchanged values do not request a refresh
        assert!(!state.set_page(2));
        assert!(!state.clone().take_refresh());
    }

    #[test]
    fn test_set_filter_validation() {
        let mut state = QueryState::new(vendor_spec());
        let err = state
            .set_filter("colour", Some(FilterValue::Text("red".to_string())))
            .unwrap_err();
        assert!(matches!(err, QueryParamError::UnknownParam { .. }));

        let err = state
            .set_filter("status", Some(FilterValue::Text("active".to_string())))
            .unwrap_err();
        assert!(matches!(err, QueryParamError::KindMismatch { .. }));

        // Empty values clear the filter
        state
            .set_filter("country", Some(FilterValue::Text("NZ".to_string())))
            .unwrap();
        state
            .set_filter("country", Some(FilterValue::Text("  ".to_string())))
            .unwrap();
        assert!(state.filter("country").is_none());
    }

    #[test]
    fn test_date_range_parse() {
        let range = DateRange::parse("2024-03-31..2024-03-01").unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));

        assert!(DateRange::parse("2024-02-30..2024-03-01").is_none());
        assert!(DateRange::parse("last week").is_none());
    }

    #[test]
    fn test_page_zero_clamps() {
        let mut state = QueryState::new(vendor_spec());
        state.set_page(4);
        state.set_page(0);
        assert_eq!(state.page(), 1);
    }

    proptest! {
        #[test]
        fn test_query_string_round_trip(
            page in 1u32..500,
            limit in proptest::option::of(1u32..200),
            sort in proptest::option::of(("[a-z_]{1,12}", any::<bool>())),
            query in proptest::option::of("[a-zA-Z0-9 &=%+#-]{1,20}"),
            statuses in proptest::collection::btree_set("[a-z]{1,8}", 0..4),
        ) {
            let spec = vendor_spec();
            let mut state = QueryState::new(spec.clone());
            state.set_page(page);
            state.set_limit(limit);
            state.set_sort(sort.map(|(key, descending)| SortParam { key, descending }));
            state.set_query(query);
            state.set_filter("status", Some(FilterValue::Set(statuses))).unwrap();

            let parsed = QueryState::from_query_string(spec, &state.to_query_string()).unwrap();
            prop_assert_eq!(parsed.page(), state.page());
            prop_assert_eq!(parsed.limit(), state.limit());
            prop_assert_eq!(parsed.sort(), state.sort());
            prop_assert_eq!(parsed.query(), state.query());
            prop_assert_eq!(parsed.filter("status"), state.filter("status"));
        }
    }
}
