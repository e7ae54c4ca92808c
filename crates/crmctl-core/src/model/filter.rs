// ── Filter domain type ──
//
// Filters are the configurable lookup values leads reference: sources,
// categories, statuses, tags, and labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::common::{Entity, SYSTEM_CREATOR, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FilterType {
    Tag,
    Status,
    Label,
    Source,
    Category,
}

impl FilterType {
    /// Wire names, in declaration order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|v| v.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub filter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(
        default,
        rename = "createdAt",
        deserialize_with = "de::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "updatedAt",
        deserialize_with = "de::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Filter {
    pub fn kind(&self) -> Option<FilterType> {
        self.filter_type.parse().ok()
    }

    pub fn is_system(&self) -> bool {
        self.created_by.as_deref() == Some(SYSTEM_CREATOR)
    }
}

impl Entity for Filter {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
