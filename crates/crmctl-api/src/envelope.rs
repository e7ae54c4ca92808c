// Wire shapes shared by every endpoint.
//
// All responses arrive as `{ success, message, data }`. Collection
// endpoints put `{ items, total, currentPage }` inside `data`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Default page requested when the caller leaves it unset.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size requested when the caller leaves it unset.
pub const DEFAULT_LIMIT: u32 = 10;

/// The `{ success, message, data }` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Error bodies carry at least a message; everything else is optional.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

// ── Pagination ───────────────────────────────────────────────────────

/// One page of a collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Full filtered count server-side, independent of page size.
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub current_page: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            current_page: DEFAULT_PAGE,
        }
    }
}

/// Page size: a concrete count or the server's `all` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Limit {
    Count(u32),
    All,
}

impl Default for Limit {
    fn default() -> Self {
        Self::Count(DEFAULT_LIMIT)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::All => f.write_str("all"),
        }
    }
}

impl FromStr for Limit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<u32>() {
            Ok(0) => Err("limit must be at least 1".into()),
            Ok(n) => Ok(Self::Count(n)),
            Err(_) => Err(format!("expected a number or 'all', got '{s}'")),
        }
    }
}

/// Parameters for a collection request: `page`, `limit`, arbitrary filters.
///
/// Filters live in a `BTreeMap` so two queries with the same parameters
/// always serialize identically (the cache keys on that form).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<Limit>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Shorthand for `limit(Limit::All)`, used for lookup tables.
    pub fn all() -> Self {
        Self::default().limit(Limit::All)
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn effective_limit(&self) -> Limit {
        self.limit.unwrap_or_default()
    }

    /// Query-string pairs with defaults applied. `page` and `limit` keys
    /// inside `filters` are ignored in favor of the typed fields.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), self.effective_page().to_string()),
            ("limit".to_owned(), self.effective_limit().to_string()),
        ];
        params.extend(
            self.filters
                .iter()
                .filter(|(k, _)| k.as_str() != "page" && k.as_str() != "limit")
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        params
    }

    /// Canonical `k=v&k=v` form of [`to_params`](Self::to_params).
    pub fn canonical(&self) -> String {
        self.to_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ── Identifier helpers ───────────────────────────────────────────────

/// Serde helpers for ids the backend sends as either strings or numbers.
pub mod de {
    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Str(s) => s,
                RawId::Int(n) => n.to_string(),
                RawId::Uint(n) => n.to_string(),
            }
        }
    }

    /// Deserialize a required id as `String`.
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        RawId::deserialize(d).map(String::from)
    }

    /// Deserialize an optional id as `Option<String>`; empty strings become `None`.
    pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<RawId>::deserialize(d)?;
        Ok(raw.map(String::from).filter(|s| !s.is_empty()))
    }
}

/// Extract an item's id from a JSON object, accepting string or numeric ids.
pub fn value_id(item: &serde_json::Value) -> Option<String> {
    match item.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_apply_to_params() {
        let q = ListQuery::new();
        assert_eq!(q.canonical(), "page=1&limit=10");
    }

    #[test]
    fn filters_are_sorted_and_cannot_shadow_paging() {
        let q = ListQuery::new()
            .page(2)
            .filter("stage", "s1")
            .filter("pipeline", "p1")
            .filter("limit", "999");
        assert_eq!(q.canonical(), "page=2&limit=10&pipeline=p1&stage=s1");
    }

    #[test]
    fn identical_queries_share_canonical_form() {
        let a = ListQuery::new().filter("a", "1").filter("b", "2");
        let b = ListQuery::new().filter("b", "2").filter("a", "1");
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a, b);
    }

    #[test]
    fn limit_parses_all_and_numbers() {
        assert_eq!("all".parse::<Limit>().unwrap(), Limit::All);
        assert_eq!("25".parse::<Limit>().unwrap(), Limit::Count(25));
        assert!("0".parse::<Limit>().is_err());
        assert!("many".parse::<Limit>().is_err());
    }

    #[test]
    fn page_decodes_camel_case() {
        let page: Page<serde_json::Value> = serde_json::from_value(json!({
            "items": [{ "id": 1 }],
            "total": 31,
            "currentPage": 4
        }))
        .unwrap();
        assert_eq!(page.total, 31);
        assert_eq!(page.current_page, 4);
        assert_eq!(value_id(&page.items[0]).as_deref(), Some("1"));
    }

    #[test]
    fn envelope_defaults_to_success() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({ "data": { "id": "x" } })).unwrap();
        assert!(env.success);
        assert!(env.message.is_none());
    }

    #[test]
    fn envelope_without_data_decodes_for_any_payload() {
        #[derive(Debug, Deserialize)]
        struct Removed {
            id: String,
        }

        let env: Envelope<Removed> =
            serde_json::from_value(json!({ "success": true, "message": "Lead deleted" })).unwrap();
        assert_eq!(env.message.as_deref(), Some("Lead deleted"));
        assert!(env.data.map(|r| r.id).is_none());
    }
}
