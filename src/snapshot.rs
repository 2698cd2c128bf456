use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Numeric view of the value, `None` for text, booleans and timestamps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Number(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// Latest known device state, keyed by field name.
///
/// Keys are only ever added or overwritten, never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub fields: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn extend<K: Into<String>>(&mut self, fields: impl IntoIterator<Item = (K, Value)>) {
        for (key, value) in fields {
            self.insert(key, value);
        }
    }

    /// Numeric value of `key`, 0 when missing or not numeric.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_textual_fields_read_as_zero() {
        let mut snapshot = Snapshot::default();
        snapshot.insert("power_pv1", Value::Integer(1200));
        snapshot.insert("voltage_pv1", Value::Number(301.5));
        snapshot.insert("fault_code", Value::Text("No Faults".into()));

        assert_eq!(snapshot.number("power_pv1"), 1200.0);
        assert_eq!(snapshot.number("voltage_pv1"), 301.5);
        assert_eq!(snapshot.number("fault_code"), 0.0);
        assert_eq!(snapshot.number("power_pv2"), 0.0);
    }

    #[test]
    fn extend_overwrites_existing_keys() {
        let mut snapshot = Snapshot::default();
        snapshot.insert("battery_soc", Value::Integer(50));
        snapshot.extend([("battery_soc", Value::Integer(51)), ("battery_soh", Value::Integer(99))]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("battery_soc"), Some(&Value::Integer(51)));
    }

    #[test]
    fn serializes_values_untagged() {
        let mut snapshot = Snapshot::default();
        snapshot.insert("afci_alarm_ch1", Value::Bool(false));
        snapshot.insert("frequency_grid", Value::Number(60.01));
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["fields"]["afci_alarm_ch1"], serde_json::json!(false));
        assert_eq!(json["fields"]["frequency_grid"], serde_json::json!(60.01));
        assert_eq!(json["generation"], serde_json::json!(0));
    }
}
