// ── Cache tags and query keys ──

use std::fmt;

use serde_json::Value;

use crmctl_api::{ListQuery, value_id};

/// Identifier half of a tag: one entity, or the collection as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagId {
    List,
    Id(String),
}

/// A logical invalidation unit attached to cached results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub tag_type: String,
    pub id: TagId,
}

impl Tag {
    pub fn list(tag_type: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            id: TagId::List,
        }
    }

    pub fn id(tag_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            id: TagId::Id(id.into()),
        }
    }

    /// Tags provided by a list response: one per item plus `LIST`.
    pub fn for_page(tag_type: &str, page: &Value) -> Vec<Self> {
        let mut tags: Vec<Self> = page
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(value_id)
                    .map(|id| Self::id(tag_type, id))
                    .collect()
            })
            .unwrap_or_default();
        tags.push(Self::list(tag_type));
        tags
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            TagId::List => write!(f, "{}:LIST", self.tag_type),
            TagId::Id(id) => write!(f, "{}:{id}", self.tag_type),
        }
    }
}

/// What a cached entry answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A collection request, keyed by its canonical query string.
    List(String),
    /// A single entity by id.
    Get(String),
}

/// Cache key: resource plus the request that produced the entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: String,
    pub kind: QueryKind,
}

impl QueryKey {
    pub fn list(resource: impl Into<String>, query: &ListQuery) -> Self {
        Self {
            resource: resource.into(),
            kind: QueryKind::List(query.canonical()),
        }
    }

    pub fn get(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            kind: QueryKind::Get(id.into()),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, QueryKind::List(_))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            QueryKind::List(params) => write!(f, "{}?{params}", self.resource),
            QueryKind::Get(id) => write!(f, "{}/{id}", self.resource),
        }
    }
}
