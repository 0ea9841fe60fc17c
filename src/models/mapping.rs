use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Item metadata exactly as upstream supplies it (name, limit, value, ...).
///
/// Only `id` is interpreted; every other field passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingEntry(Map<String, Value>);

impl MappingEntry {
    /// Stringified item id, accepting either a JSON integer or string
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Number(n) => n.as_i64().map(|id| id.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

/// ItemId (as string) -> metadata
pub type MappingSnapshot = BTreeMap<String, MappingEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_number_and_string() {
        let numeric: MappingEntry =
            serde_json::from_str(r#"{"id": 561, "name": "Nature rune", "limit": 18000}"#).unwrap();
        assert_eq!(numeric.id().as_deref(), Some("561"));
        assert_eq!(numeric.name(), Some("Nature rune"));

        let text: MappingEntry = serde_json::from_str(r#"{"id": "4151"}"#).unwrap();
        assert_eq!(text.id().as_deref(), Some("4151"));

        let missing: MappingEntry = serde_json::from_str(r#"{"name": "???"}"#).unwrap();
        assert_eq!(missing.id(), None);
    }

    #[test]
    fn test_entry_serializes_verbatim() {
        let raw = r#"{"examine":"Fabulously ancient.","id":2,"members":true}"#;
        let entry: MappingEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&entry).unwrap(), raw);
    }
}
