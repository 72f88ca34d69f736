//! Reaction catalog: the externally owned registry of reaction definitions.
//!
//! The resolver only reads from it. Populating it (usually from the forum's
//! `/api/reactions` endpoint) is the caller's job and must happen before
//! responses containing reactions are parsed; lookups that miss simply drop
//! the affected reaction.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{ResponseError, Result};
use crate::types::wire::{deserialize_id, section_records};

/// A reaction definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub identifier: String,
    #[serde(default)]
    pub display: Option<String>,
    /// `"emoji"` or `"icon"`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub enabled: bool,
}

impl Reaction {
    pub fn new(id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            display: None,
            kind: Some("emoji".to_string()),
            enabled: true,
        }
    }

    /// Set the display override.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Booleans that the server may send as `0`/`1`.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

/// Read-only lookup of reaction definitions by id.
pub trait ReactionCatalog: Send + Sync {
    fn reaction_by_id(&self, id: &str) -> Option<Reaction>;
}

impl<C: ReactionCatalog + ?Sized> ReactionCatalog for &C {
    fn reaction_by_id(&self, id: &str) -> Option<Reaction> {
        (**self).reaction_by_id(id)
    }
}

impl<C: ReactionCatalog + ?Sized> ReactionCatalog for Arc<C> {
    fn reaction_by_id(&self, id: &str) -> Option<Reaction> {
        (**self).reaction_by_id(id)
    }
}

/// In-memory catalog, safe to share between concurrent parses.
///
/// Reads take a shared lock; replacing the catalog takes the write lock
/// once for the whole batch.
#[derive(Debug, Default)]
pub struct InMemoryReactionCatalog {
    reactions: RwLock<HashMap<String, Reaction>>,
}

impl InMemoryReactionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `reactions`.
    pub fn with_reactions(reactions: impl IntoIterator<Item = Reaction>) -> Self {
        let catalog = Self::new();
        catalog.replace_all(reactions);
        catalog
    }

    /// Load a catalog from a JSON:API document of `reactions` records.
    ///
    /// Records of other types or with undecodable attributes are skipped.
    pub fn load_document(bytes: &[u8]) -> Result<Self> {
        let document: Value = serde_json::from_slice(bytes)?;
        let document = document.as_object().ok_or(ResponseError::NotAnObject {
            found: json_type_name(&document),
        })?;

        let mut reactions = Vec::new();
        for record in section_records(document, "data") {
            if record.get("type").and_then(Value::as_str) != Some("reactions") {
                continue;
            }
            let mut flattened = record
                .get("attributes")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            if let Some(id) = record.get("id") {
                flattened.insert("id".to_string(), id.clone());
            }
            match serde_json::from_value::<Reaction>(Value::Object(flattened)) {
                Ok(reaction) => reactions.push(reaction),
                Err(e) => tracing::debug!(error = %e, "Skipping undecodable reaction"),
            }
        }

        tracing::debug!(count = reactions.len(), "Loaded reaction catalog");
        Ok(Self::with_reactions(reactions))
    }

    /// Replace the whole catalog.
    pub fn replace_all(&self, reactions: impl IntoIterator<Item = Reaction>) {
        let fresh: HashMap<String, Reaction> =
            reactions.into_iter().map(|r| (r.id.clone(), r)).collect();
        *self.reactions.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    /// Add or replace a single reaction.
    pub fn insert(&self, reaction: Reaction) {
        self.reactions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reaction.id.clone(), reaction);
    }

    /// Number of reactions in the catalog.
    pub fn len(&self) -> usize {
        self.reactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReactionCatalog for InMemoryReactionCatalog {
    fn reaction_by_id(&self, id: &str) -> Option<Reaction> {
        self.reactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_lookup_and_miss() {
        let catalog = InMemoryReactionCatalog::with_reactions([Reaction::new("3", "thumbsup")]);

        assert_eq!(catalog.reaction_by_id("3").unwrap().identifier, "thumbsup");
        assert!(catalog.reaction_by_id("4").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_replace_all_drops_old_entries() {
        let catalog = InMemoryReactionCatalog::with_reactions([Reaction::new("1", "heart")]);
        catalog.replace_all([Reaction::new("2", "laughing")]);

        assert!(catalog.reaction_by_id("1").is_none());
        assert!(catalog.reaction_by_id("2").is_some());
    }

    #[test]
    fn test_load_document() {
        let bytes = br#"{
            "data": [
                {"type": "reactions", "id": "1", "attributes": {"identifier": "thumbsup", "display": null, "type": "emoji", "enabled": 1}},
                {"type": "reactions", "id": "2", "attributes": {"identifier": "confused", "type": "emoji", "enabled": false}},
                {"type": "reactions", "id": "3", "attributes": {"display": "no identifier"}},
                {"type": "tags", "id": "9", "attributes": {"identifier": "not a reaction", "enabled": true}}
            ]
        }"#;
        let catalog = InMemoryReactionCatalog::load_document(bytes).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.reaction_by_id("1").unwrap().enabled);
        assert!(!catalog.reaction_by_id("2").unwrap().enabled);
    }

    #[test]
    fn test_load_document_rejects_non_object() {
        let err = InMemoryReactionCatalog::load_document(b"[]").unwrap_err();
        assert!(matches!(err, ResponseError::NotAnObject { found: "array" }));
    }

    #[test]
    fn test_concurrent_reads() {
        let catalog = Arc::new(InMemoryReactionCatalog::with_reactions([Reaction::new(
            "1", "heart",
        )]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || catalog.reaction_by_id("1").is_some())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
