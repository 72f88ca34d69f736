//! Raw JSON:API wire shapes.
//!
//! Records are read out of a borrowed `serde_json::Value` one at a time so a
//! malformed record can be dropped without failing its neighbours.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::types::kind::EntityKind;

/// Pagination links of a response document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Links {
    /// Decode the top-level `links` member. Malformed links count as absent.
    pub fn from_document(document: &Map<String, Value>) -> Option<Self> {
        let value = document.get("links")?;
        match serde_json::from_value(value.clone()) {
            Ok(links) => Some(links),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed links member");
                None
            }
        }
    }
}

/// The records of one section (`data` or `included`).
///
/// A single object is a one-element section; a missing or null member is
/// empty.
pub fn section_records<'a>(document: &'a Map<String, Value>, name: &str) -> Vec<&'a Value> {
    match document.get(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// A reference to another record: `{ "type": ..., "id": ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    /// Raw `type` member, if any
    pub kind: Option<String>,
    pub id: String,
}

impl ResourceIdentifier {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id").and_then(id_string)?;
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self { kind, id })
    }
}

/// The `data` member of one declared relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// `data: null`, or a single reference without a usable id
    Empty,
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => Linkage::Many(
                items
                    .iter()
                    .filter_map(ResourceIdentifier::from_value)
                    .collect(),
            ),
            other => match ResourceIdentifier::from_value(other) {
                Some(identifier) => Linkage::One(identifier),
                None => Linkage::Empty,
            },
        }
    }

    /// The single referenced id, if this is a to-one linkage.
    pub fn single(&self) -> Option<&ResourceIdentifier> {
        match self {
            Linkage::One(identifier) => Some(identifier),
            _ => None,
        }
    }

    /// Referenced ids in wire order. A to-one linkage yields one id.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Linkage::Empty => Vec::new(),
            Linkage::One(identifier) => vec![identifier.id.as_str()],
            Linkage::Many(identifiers) => identifiers.iter().map(|i| i.id.as_str()).collect(),
        }
    }
}

/// One well-shaped wire record.
#[derive(Debug, Clone)]
pub struct RawRecord<'a> {
    pub kind: EntityKind,
    pub id: String,
    /// `Value::Null` when the record carries no attributes
    pub attributes: &'a Value,
    relationships: Option<&'a Map<String, Value>>,
}

static NULL: Value = Value::Null;

impl<'a> RawRecord<'a> {
    /// Check the record's shape: an object with a known `type` and an `id`.
    pub fn from_value(value: &'a Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;

        let type_name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingType)?;
        let kind = EntityKind::from_wire(type_name)
            .ok_or_else(|| RecordError::UnknownType(type_name.to_string()))?;

        let id = object
            .get("id")
            .and_then(id_string)
            .ok_or(RecordError::MissingId)?;

        Ok(Self {
            kind,
            id,
            attributes: object.get("attributes").unwrap_or(&NULL),
            relationships: object.get("relationships").and_then(Value::as_object),
        })
    }

    /// The linkage declared under `name`.
    ///
    /// Returns `None` when the relationship is not declared or declares no
    /// `data` member, so callers can tell "not declared" from "declared
    /// empty".
    pub fn relationship(&self, name: &str) -> Option<Linkage> {
        let declared = self.relationships?.get(name)?.as_object()?;
        declared.get("data").map(Linkage::from_value)
    }
}

/// Record and reference ids are strings on the wire; integers are accepted.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Text(String),
    Integer(i64),
}

impl From<LenientId> for String {
    fn from(id: LenientId) -> Self {
        match id {
            LenientId::Text(s) => s,
            LenientId::Integer(n) => n.to_string(),
        }
    }
}

/// Deserialize an id that may be sent as a string or an integer.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    LenientId::deserialize(deserializer).map(String::from)
}

/// Optional variant of [`deserialize_id`].
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LenientId>::deserialize(deserializer).map(|id| id.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_shape_errors() {
        assert_eq!(
            RawRecord::from_value(&json!([1, 2])).unwrap_err(),
            RecordError::NotAnObject
        );
        assert_eq!(
            RawRecord::from_value(&json!({"id": "1"})).unwrap_err(),
            RecordError::MissingType
        );
        assert_eq!(
            RawRecord::from_value(&json!({"type": "widgets", "id": "1"})).unwrap_err(),
            RecordError::UnknownType("widgets".into())
        );
        assert_eq!(
            RawRecord::from_value(&json!({"type": "tags"})).unwrap_err(),
            RecordError::MissingId
        );
    }

    #[test]
    fn test_relationship_declared_vs_missing() {
        let value = json!({
            "type": "discussions",
            "id": "1",
            "relationships": {
                "user": {"data": {"type": "users", "id": "7"}},
                "lastPost": {"data": null},
                "tags": {"data": [{"type": "tags", "id": "2"}, {"type": "tags"}, {"type": "tags", "id": 3}]},
                "posts": {"links": {"related": "/api/posts"}}
            }
        });
        let record = RawRecord::from_value(&value).unwrap();

        assert_eq!(record.relationship("user").unwrap().ids(), vec!["7"]);
        assert_eq!(record.relationship("lastPost"), Some(Linkage::Empty));
        assert_eq!(record.relationship("tags").unwrap().ids(), vec!["2", "3"]);
        assert_eq!(record.relationship("posts"), None);
        assert_eq!(record.relationship("firstPost"), None);
    }

    #[test]
    fn test_section_records_accepts_single_object() {
        let document = json!({"data": {"type": "users", "id": "1"}, "included": null});
        let document = document.as_object().unwrap();

        assert_eq!(section_records(document, "data").len(), 1);
        assert!(section_records(document, "included").is_empty());
        assert!(section_records(document, "missing").is_empty());
    }

    #[test]
    fn test_malformed_links_are_absent() {
        let document = json!({"links": {"next": 5}});
        assert_eq!(Links::from_document(document.as_object().unwrap()), None);

        let document = json!({"links": {"next": "/api/discussions?page[offset]=20"}});
        let links = Links::from_document(document.as_object().unwrap()).unwrap();
        assert_eq!(links.next.as_deref(), Some("/api/discussions?page[offset]=20"));
        assert_eq!(links.prev, None);
    }
}
