//! Entity kinds and identity keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of record types the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "discussions")]
    Discussion,
    #[serde(rename = "posts")]
    Post,
    #[serde(rename = "users")]
    User,
    #[serde(rename = "tags")]
    Tag,
    #[serde(rename = "post_reactions")]
    PostReaction,
    #[serde(rename = "notifications")]
    Notification,
    #[serde(rename = "badges")]
    Badge,
    #[serde(rename = "badgeCategories")]
    BadgeCategory,
    #[serde(rename = "userBadges")]
    UserBadge,
    #[serde(rename = "masquerade-answer")]
    ProfileAnswer,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Discussion,
        EntityKind::Post,
        EntityKind::User,
        EntityKind::Tag,
        EntityKind::PostReaction,
        EntityKind::Notification,
        EntityKind::Badge,
        EntityKind::BadgeCategory,
        EntityKind::UserBadge,
        EntityKind::ProfileAnswer,
    ];

    /// The JSON:API `type` string for this kind.
    pub fn wire_name(self) -> &'static str {
        match self {
            EntityKind::Discussion => "discussions",
            EntityKind::Post => "posts",
            EntityKind::User => "users",
            EntityKind::Tag => "tags",
            EntityKind::PostReaction => "post_reactions",
            EntityKind::Notification => "notifications",
            EntityKind::Badge => "badges",
            EntityKind::BadgeCategory => "badgeCategories",
            EntityKind::UserBadge => "userBadges",
            EntityKind::ProfileAnswer => "masquerade-answer",
        }
    }

    /// Parse a JSON:API `type` string.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Identity of an entity within one parse: `(kind, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
