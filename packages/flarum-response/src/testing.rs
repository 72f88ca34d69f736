//! Testing utilities: JSON:API fixture builders and a fixture catalog.
//!
//! These build response documents the way a Flarum server shapes them, so
//! tests of applications using this library do not need saved payloads.

use serde_json::{json, Map, Value};

use crate::catalog::{InMemoryReactionCatalog, Reaction};
use crate::types::kind::EntityKind;

/// Fixed timestamp used by the fixture constructors.
pub const FIXTURE_TIME: &str = "2022-04-23T10:00:00+00:00";

/// Builder for one wire record.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Map<String, Value>,
    attributes: Map<String, Value>,
    relationships: Map<String, Value>,
}

impl RecordBuilder {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::raw(kind.wire_name(), Value::String(id.into()))
    }

    /// A record with an arbitrary `type` and `id`, for malformed input.
    pub fn raw(type_name: &str, id: Value) -> Self {
        let mut record = Map::new();
        record.insert("type".to_string(), Value::String(type_name.to_string()));
        record.insert("id".to_string(), id);
        Self {
            record,
            attributes: Map::new(),
            relationships: Map::new(),
        }
    }

    /// Set one attribute.
    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Remove an attribute set earlier.
    pub fn without_attr(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self
    }

    /// Declare a to-one relationship.
    pub fn to_one(self, name: &str, kind: EntityKind, id: &str) -> Self {
        self.relationship(name, reference(kind, id))
    }

    /// Declare a relationship with `data: null`.
    pub fn to_none(self, name: &str) -> Self {
        self.relationship(name, Value::Null)
    }

    /// Declare a to-many relationship.
    pub fn to_many(self, name: &str, kind: EntityKind, ids: &[&str]) -> Self {
        let references = ids.iter().map(|id| reference(kind, id)).collect();
        self.relationship(name, Value::Array(references))
    }

    fn relationship(mut self, name: &str, data: Value) -> Self {
        self.relationships
            .insert(name.to_string(), json!({ "data": data }));
        self
    }

    pub fn build(self) -> Value {
        let mut record = self.record;
        record.insert("attributes".to_string(), Value::Object(self.attributes));
        if !self.relationships.is_empty() {
            record.insert(
                "relationships".to_string(),
                Value::Object(self.relationships),
            );
        }
        Value::Object(record)
    }
}

/// A `{type, id}` resource identifier.
pub fn reference(kind: EntityKind, id: &str) -> Value {
    json!({ "type": kind.wire_name(), "id": id })
}

/// Builder for a whole response document.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    data: Vec<Value>,
    single: bool,
    included: Vec<Value>,
    links: Option<Value>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primary record; `data` is emitted as an array.
    pub fn data(mut self, record: impl Into<Value>) -> Self {
        self.data.push(record.into());
        self
    }

    /// Use `record` as the single-object `data` member.
    pub fn single(mut self, record: impl Into<Value>) -> Self {
        self.data = vec![record.into()];
        self.single = true;
        self
    }

    pub fn include(mut self, record: impl Into<Value>) -> Self {
        self.included.push(record.into());
        self
    }

    pub fn links(mut self, links: Value) -> Self {
        self.links = Some(links);
        self
    }

    pub fn build(self) -> Value {
        let mut document = Map::new();
        if let Some(links) = self.links {
            document.insert("links".to_string(), links);
        }
        let data = match (self.single, self.data) {
            (true, mut data) => data.pop().unwrap_or(Value::Null),
            (false, data) => Value::Array(data),
        };
        document.insert("data".to_string(), data);
        document.insert("included".to_string(), Value::Array(self.included));
        Value::Object(document)
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.build().to_string().into_bytes()
    }
}

impl From<RecordBuilder> for Value {
    fn from(builder: RecordBuilder) -> Self {
        builder.build()
    }
}

pub fn discussion(id: &str, title: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::Discussion, id)
        .attr("title", title)
        .attr("slug", title.to_lowercase().replace(' ', "-"))
        .attr("createdAt", FIXTURE_TIME)
}

/// A comment post.
pub fn post(id: &str, number: u32, text: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::Post, id)
        .attr("number", number)
        .attr("createdAt", FIXTURE_TIME)
        .attr("contentType", "comment")
        .attr("content", text)
        .attr("contentHtml", format!("<p>{text}</p>"))
}

pub fn user(id: &str, username: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::User, id)
        .attr("username", username)
        .attr("displayName", username)
        .attr("slug", username)
}

pub fn tag(id: &str, name: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::Tag, id)
        .attr("name", name)
        .attr("slug", name.to_lowercase())
}

pub fn post_reaction(id: &str, user_id: &str, post_id: &str, reaction_id: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::PostReaction, id)
        .attr("userId", user_id)
        .attr("postId", post_id)
        .attr("reactionId", reaction_id)
}

pub fn notification(id: &str, content_type: &str, content: Value) -> RecordBuilder {
    RecordBuilder::new(EntityKind::Notification, id)
        .attr("contentType", content_type)
        .attr("content", content)
        .attr("createdAt", FIXTURE_TIME)
        .attr("isRead", false)
}

pub fn badge(id: &str, name: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::Badge, id)
        .attr("name", name)
        .attr("icon", "fas fa-award")
}

pub fn badge_category(id: &str, name: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::BadgeCategory, id)
        .attr("name", name)
        .attr("order", 0)
        .attr("isEnabled", true)
        .attr("isTable", false)
        .attr("createdAt", FIXTURE_TIME)
}

pub fn user_badge(id: &str, primary: bool) -> RecordBuilder {
    RecordBuilder::new(EntityKind::UserBadge, id)
        .attr("isPrimary", i64::from(primary))
        .attr("assignedAt", FIXTURE_TIME)
}

pub fn profile_answer(id: &str, content: &str) -> RecordBuilder {
    RecordBuilder::new(EntityKind::ProfileAnswer, id).attr("content", content)
}

/// Catalog with `1 => thumbsup`, `2 => heart`, and a disabled `3 => laughing`.
pub fn fixture_catalog() -> InMemoryReactionCatalog {
    InMemoryReactionCatalog::with_reactions([
        Reaction::new("1", "thumbsup"),
        Reaction::new("2", "heart"),
        Reaction::new("3", "laughing").with_enabled(false),
    ])
}
