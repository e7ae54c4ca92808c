// ── Lead domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::common::{Entity, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Wire names, in declaration order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|v| v.to_string()).collect()
    }
}

/// The open/closed switch shown in the lead list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeadStatus {
    Open,
    Closed,
}

impl LeadStatus {
    pub fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, rename = "leadTitle")]
    pub lead_title: String,
    #[serde(default, rename = "leadValue", deserialize_with = "de::number")]
    pub lead_value: f64,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub pipeline: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
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

impl Lead {
    pub fn priority(&self) -> Option<Priority> {
        self.priority.as_deref()?.parse().ok()
    }

    pub fn is_open(&self) -> bool {
        self.status.as_deref() == Some("open")
    }
}

impl Entity for Lead {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.lead_title
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lenient_wire_shapes() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 12,
            "leadTitle": "Acme renewal",
            "leadValue": "2500.50",
            "pipeline": "p1",
            "stage": "",
            "priority": "High",
            "status": "open",
            "createdAt": "2024-03-05T10:00:00.000Z",
            "client_id": "x9"
        }))
        .unwrap();

        assert_eq!(lead.id, "12");
        assert!((lead.lead_value - 2500.5).abs() < f64::EPSILON);
        assert_eq!(lead.stage, None);
        assert_eq!(lead.priority(), Some(Priority::High));
        assert!(lead.is_open());
        assert_eq!(lead.extra["client_id"], "x9");
    }

    #[test]
    fn round_trip_keeps_unknown_fields() {
        let raw = json!({ "id": "l1", "leadTitle": "A", "leadValue": 1, "client_id": "x9" });
        let lead: Lead = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&lead).unwrap();
        assert_eq!(back["leadTitle"], "A");
        assert_eq!(back["client_id"], "x9");
    }
}
