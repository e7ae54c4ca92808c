// ── Role domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{Entity, de};

/// Name of the built-in role whose record cannot be deleted.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub role_name: String,
    /// Per-module CRUD flags, either as an object or a JSON-encoded string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Value>,
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

impl Role {
    pub fn is_admin(&self) -> bool {
        self.role_name == ADMIN_ROLE
    }
}

impl Entity for Role {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.role_name
    }
}
