// common/src/models/certificate.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One certificate as returned by the API.
///
/// The record is passed to the view untouched. Only the identifier is read,
/// to build the download link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateRecord(Map<String, Value>);

impl CertificateRecord {
    /// `id`, falling back to `_id`; numeric ids are rendered as strings
    pub fn id(&self) -> Option<String> {
        ["id", "_id"].iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> CertificateRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_id_lookup() {
        assert_eq!(record(json!({"id": "abc"})).id().as_deref(), Some("abc"));
        assert_eq!(record(json!({"_id": "65f0"})).id().as_deref(), Some("65f0"));
        assert_eq!(record(json!({"id": 42})).id().as_deref(), Some("42"));
        assert_eq!(record(json!({"name": "x"})).id(), None);
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let rec = record(json!({"id": 1, "activityName": "Hackathon", "nested": {"a": true}}));
        assert_eq!(rec.fields().get("activityName"), Some(&json!("Hackathon")));
        let back = serde_json::to_value(&rec).unwrap();
        assert_eq!(back["nested"]["a"], json!(true));
    }
}
