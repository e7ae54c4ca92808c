// ── Stage domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::common::{Entity, SYSTEM_CREATOR, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StageType {
    Lead,
    Proposal,
}

impl StageType {
    /// Wire names, in declaration order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|v| v.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Owning pipeline. Forms submit it as `pipeline_id`; see [`Stage::pipeline_id`].
    #[serde(default, deserialize_with = "de::opt_id")]
    pub pipeline: Option<String>,
    #[serde(default, rename = "type")]
    pub stage_type: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_default: bool,
    #[serde(default, deserialize_with = "de::opt_int", skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
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

impl Stage {
    pub fn kind(&self) -> Option<StageType> {
        self.stage_type.parse().ok()
    }

    pub fn is_lead_stage(&self) -> bool {
        self.kind() == Some(StageType::Lead)
    }

    /// Owning pipeline id from either wire spelling.
    pub fn pipeline_id(&self) -> Option<&str> {
        self.pipeline
            .as_deref()
            .or_else(|| self.extra.get("pipeline_id").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
    }

    pub fn belongs_to(&self, pipeline_id: &str) -> bool {
        self.pipeline_id() == Some(pipeline_id)
    }

    pub fn is_system(&self) -> bool {
        self.created_by.as_deref() == Some(SYSTEM_CREATOR)
    }
}

impl Entity for Stage {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
