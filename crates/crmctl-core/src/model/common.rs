// ── Shared model building blocks ──

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// `created_by` value marking records seeded by the backend.
pub const SYSTEM_CREATOR: &str = "SYSTEM";

/// A CRUD-able record with a server-assigned id.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Human label for prompts and messages.
    fn label(&self) -> &str;
}

/// Parse the timestamp shapes the backend emits: RFC 3339, SQL-style
/// `YYYY-MM-DD HH:MM:SS`, plain dates, and epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lenient serde helpers for backend payloads.
pub(crate) mod de {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(crate) use crmctl_api::envelope::de::{id, opt_id};

    /// Timestamps in any shape `parse_timestamp` accepts; garbage becomes `None`.
    pub(crate) fn opt_timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(raw.as_ref().and_then(super::parse_timestamp))
    }

    /// Numbers that may arrive as JSON numbers or numeric strings.
    pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(match raw {
            Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    /// Booleans that may arrive as `true`, `1`, or `"true"`.
    pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(match raw {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "1"),
            _ => false,
        })
    }

    /// Integers that may arrive as numbers or numeric strings.
    pub(crate) fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(match raw {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// Decode a record into a typed entity.
pub fn from_record<T: Entity>(record: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(record)
}

/// Encode an entity back into the wire shape, unknown fields included.
pub fn to_record<T: Entity>(entity: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(entity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Datelike;
    use serde_json::json;

    use super::*;

    #[test]
    fn timestamps_in_every_shape() {
        let iso = parse_timestamp(&json!("2024-03-05T10:30:00.000Z")).unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2024, 3, 5));

        let sql = parse_timestamp(&json!("2024-03-05 23:59:59")).unwrap();
        assert_eq!(sql.day(), 5);

        let plain = parse_timestamp(&json!("2025-01-12")).unwrap();
        assert_eq!(plain.month(), 1);

        let millis = parse_timestamp(&json!(0)).unwrap();
        assert_eq!(millis.year(), 1970);

        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&Value::Null).is_none());
    }
}
