//! Content variant normalizer.
//!
//! Posts and notifications carry a `contentType` discriminator next to a
//! `content` payload whose shape depends on it. This module reshapes the
//! pair into the externally tagged form that [`PostContent`] and
//! [`NotificationContent`] decode from. The reshaping functions are pure;
//! [`prepare_attributes`] applies them to a raw attribute object and
//! enforces the whitelist policy.
//!
//! [`PostContent`]: crate::types::content::PostContent
//! [`NotificationContent`]: crate::types::content::NotificationContent

use serde_json::{json, Map, Value};

use crate::catalog::ReactionCatalog;
use crate::config::ResolverConfig;
use crate::diagnostics::Diagnostics;
use crate::types::wire::id_string;

/// Result of reshaping one `content` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedContent {
    /// Payload in externally tagged form
    Shaped(Value),
    /// Known discriminator without a usable payload
    Absent,
    /// Discriminator outside the whitelist
    Unknown,
}

/// Which attribute record the content belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOwner {
    Post,
    Notification,
}

impl ContentOwner {
    fn is_known_empty(self, config: &ResolverConfig, content_type: &str) -> bool {
        match self {
            ContentOwner::Post => config.is_post_known_empty(content_type),
            ContentOwner::Notification => config.is_notification_known_empty(content_type),
        }
    }
}

/// Reshape a post's `content` for its `contentType`.
pub fn normalize_post_content(content_type: &str, raw: &Value) -> NormalizedContent {
    let shaped = match content_type {
        "comment" => raw.as_str().map(|text| json!({ "comment": text })),
        "discussionRenamed" => renamed_payload(raw).map(|p| json!({ "discussionRenamed": p })),
        "discussionTagged" => tagged_payload(raw).map(|p| json!({ "discussionTagged": p })),
        "discussionLocked" => raw
            .get("locked")
            .and_then(Value::as_bool)
            .map(|locked| json!({ "discussionLocked": locked })),
        _ => return NormalizedContent::Unknown,
    };
    shaped.map_or(NormalizedContent::Absent, NormalizedContent::Shaped)
}

/// Reshape a notification's `content` for its `contentType`.
///
/// `postReacted` needs the reaction catalog; a reaction the catalog does not
/// know yields [`NormalizedContent::Absent`].
pub fn normalize_notification_content(
    content_type: &str,
    raw: &Value,
    catalog: &dyn ReactionCatalog,
) -> NormalizedContent {
    let shaped = match content_type {
        "postLiked"
        | "userMentioned"
        | "badgeReceived"
        | "privateDiscussionCreated"
        | "privateDiscussionAdded" => Some(Value::String(content_type.to_string())),
        "postMentioned" => Some(json!({
            "postMentioned": number_payload(raw, "replyNumber"),
        })),
        "newPost" | "privateDiscussionReplied" => {
            let mut wrapped = Map::new();
            wrapped.insert(content_type.to_string(), number_payload(raw, "postNumber"));
            Some(Value::Object(wrapped))
        }
        "postReacted" => reacted_payload(raw, catalog).map(|p| json!({ "postReacted": p })),
        _ => return NormalizedContent::Unknown,
    };
    shaped.map_or(NormalizedContent::Absent, NormalizedContent::Shaped)
}

/// `[old, new]` titles.
fn renamed_payload(raw: &Value) -> Option<Value> {
    match raw.as_array()?.as_slice() {
        [Value::String(old), Value::String(new)] => Some(json!({ "old": old, "new": new })),
        _ => None,
    }
}

/// `[[old ids], [new ids]]`, ids as integers or strings.
fn tagged_payload(raw: &Value) -> Option<Value> {
    let [old, new] = raw.as_array()?.as_slice() else {
        return None;
    };
    Some(json!({
        "oldTagIds": id_list(old)?,
        "newTagIds": id_list(new)?,
    }))
}

fn id_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// Keep only `field` when it is an integer in `u32` range.
fn number_payload(raw: &Value, field: &str) -> Value {
    let mut payload = Map::new();
    let number = raw
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());
    if let Some(number) = number {
        payload.insert(field.to_string(), Value::from(number));
    }
    Value::Object(payload)
}

/// The payload is a string holding a JSON reaction. Only its `id` (integer
/// or string) is read; the variant carries the catalog's definition, so the
/// embedded `enabled` flag and other fields are not required.
fn reacted_payload(raw: &Value, catalog: &dyn ReactionCatalog) -> Option<Value> {
    let embedded = match raw {
        Value::String(document) => match serde_json::from_str::<Value>(document) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "postReacted content is not embedded JSON");
                return None;
            }
        },
        Value::Object(_) => raw.clone(),
        _ => return None,
    };

    let Some(id) = embedded.get("id").and_then(id_string) else {
        tracing::debug!("postReacted content has no reaction id");
        return None;
    };
    let Some(reaction) = catalog.reaction_by_id(&id) else {
        tracing::debug!(reaction_id = %id, "Reaction not in catalog");
        return None;
    };
    serde_json::to_value(reaction)
        .ok()
        .map(|reaction| json!({ "reaction": reaction }))
}

/// Apply the normalizer to a raw attribute object.
///
/// Returns the attributes with `content` in tagged form. Absent content
/// removes `content` and keeps `contentType`; an unknown discriminator
/// removes both so the rest of the record still decodes. Non-object
/// attributes come back unchanged and fail decoding downstream.
pub(crate) fn prepare_attributes(
    owner: ContentOwner,
    attributes: &Value,
    catalog: &dyn ReactionCatalog,
    config: &ResolverConfig,
    diagnostics: &mut Diagnostics,
) -> Value {
    let Some(object) = attributes.as_object() else {
        return attributes.clone();
    };
    let mut object = object.clone();

    let content_type = object
        .get("contentType")
        .and_then(Value::as_str)
        .map(str::to_string);
    let Some(content_type) = content_type else {
        object.remove("content");
        return Value::Object(object);
    };

    let raw = object.remove("content").unwrap_or(Value::Null);
    let normalized = match owner {
        ContentOwner::Post => normalize_post_content(&content_type, &raw),
        ContentOwner::Notification => {
            normalize_notification_content(&content_type, &raw, catalog)
        }
    };

    match normalized {
        NormalizedContent::Shaped(content) => {
            object.insert("content".to_string(), content);
        }
        NormalizedContent::Absent => {}
        NormalizedContent::Unknown => {
            object.remove("contentType");
            if !owner.is_known_empty(config, &content_type) {
                report_schema_drift(config, diagnostics, "contentType", &content_type);
            }
        }
    }
    Value::Object(object)
}

/// Record a discriminator the resolver does not understand.
///
/// Panics when [`ResolverConfig::panic_on_unknown_content`] is set.
pub(crate) fn report_schema_drift(
    config: &ResolverConfig,
    diagnostics: &mut Diagnostics,
    field: &str,
    value: &str,
) {
    tracing::warn!(field, value, "Unrecognized discriminator, dropping payload");
    diagnostics.unknown_discriminators.push(value.to_string());
    if config.panic_on_unknown_content {
        panic!("{field} {value:?} is not in the whitelist");
    }
}
