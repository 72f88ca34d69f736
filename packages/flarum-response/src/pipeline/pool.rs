//! Entity pool: the per-parse arena of mutable, shared-identity nodes.
//!
//! Each `(kind, id)` maps to exactly one node. Relationships between nodes
//! are [`NodeId`]s into the same arena, so resolving a relationship once
//! makes the target's own relationships reachable through it.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::catalog::{Reaction, ReactionCatalog};
use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostics, Section};
use crate::error::RecordError;
use crate::pipeline::normalize::{prepare_attributes, ContentOwner};
use crate::pipeline::reactions::link_reaction;
use crate::types::attributes::{
    BadgeAttributes, BadgeCategoryAttributes, DiscussionAttributes, NotificationAttributes,
    PostAttributes, PostReactionAttributes, ProfileAnswerAttributes, TagAttributes,
    UserAttributes, UserBadgeAttributes,
};
use crate::types::kind::{EntityKey, EntityKind};
use crate::types::wire::{id_string, RawRecord};

/// Index of a node in an [`EntityPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

/// A post reaction joined to its user, post, and catalog definition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinkedReaction {
    pub user: NodeId,
    pub post: NodeId,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PooledAttributes {
    Discussion(DiscussionAttributes),
    Post(PostAttributes),
    User(UserAttributes),
    Tag(TagAttributes),
    PostReaction(LinkedReaction),
    Notification(NotificationAttributes),
    Badge(BadgeAttributes),
    BadgeCategory(BadgeCategoryAttributes),
    UserBadge(UserBadgeAttributes),
    ProfileAnswer(ProfileAnswerAttributes),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DiscussionLinks {
    pub user: Option<NodeId>,
    pub last_posted_user: Option<NodeId>,
    pub first_post: Option<NodeId>,
    pub last_post: Option<NodeId>,
    pub most_relevant_post: Option<NodeId>,
    pub tags: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PostLinks {
    pub discussion: Option<NodeId>,
    pub user: Option<NodeId>,
    pub reactions: Vec<NodeId>,
    pub likes: Vec<NodeId>,
    pub mentioned_by: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct UserLinks {
    pub user_badges: Vec<NodeId>,
    pub profile_answers: Vec<NodeId>,
    pub ignored_users: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TagLinks {
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PooledSubject {
    Post(NodeId),
    Discussion(NodeId),
    UserBadge(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NotificationLinks {
    pub from_user: Option<NodeId>,
    pub subject: Option<PooledSubject>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BadgeLinks {
    pub category: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BadgeCategoryLinks {
    pub badges: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct UserBadgeLinks {
    pub badge: Option<NodeId>,
}

/// Declared relationships of a node, resolved to pool nodes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PooledLinks {
    Discussion(DiscussionLinks),
    Post(PostLinks),
    User(UserLinks),
    Tag(TagLinks),
    Notification(NotificationLinks),
    Badge(BadgeLinks),
    BadgeCategory(BadgeCategoryLinks),
    UserBadge(UserBadgeLinks),
    /// Kinds without declared relationships
    None,
}

impl PooledLinks {
    fn empty_for(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Discussion => PooledLinks::Discussion(DiscussionLinks::default()),
            EntityKind::Post => PooledLinks::Post(PostLinks::default()),
            EntityKind::User => PooledLinks::User(UserLinks::default()),
            EntityKind::Tag => PooledLinks::Tag(TagLinks::default()),
            EntityKind::Notification => PooledLinks::Notification(NotificationLinks::default()),
            EntityKind::Badge => PooledLinks::Badge(BadgeLinks::default()),
            EntityKind::BadgeCategory => PooledLinks::BadgeCategory(BadgeCategoryLinks::default()),
            EntityKind::UserBadge => PooledLinks::UserBadge(UserBadgeLinks::default()),
            EntityKind::PostReaction | EntityKind::ProfileAnswer => PooledLinks::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub key: EntityKey,
    pub attributes: PooledAttributes,
    pub links: PooledLinks,
}

impl Node {
    /// Every node this node points at, in declaration order.
    pub fn targets(&self) -> Vec<NodeId> {
        let mut targets = Vec::new();
        if let PooledAttributes::PostReaction(linked) = &self.attributes {
            targets.extend([linked.user, linked.post]);
        }
        match &self.links {
            PooledLinks::Discussion(l) => {
                targets.extend(
                    [
                        l.user,
                        l.last_posted_user,
                        l.first_post,
                        l.last_post,
                        l.most_relevant_post,
                    ]
                    .into_iter()
                    .flatten(),
                );
                targets.extend(&l.tags);
            }
            PooledLinks::Post(l) => {
                targets.extend([l.discussion, l.user].into_iter().flatten());
                targets.extend(&l.reactions);
                targets.extend(&l.likes);
                targets.extend(&l.mentioned_by);
            }
            PooledLinks::User(l) => {
                targets.extend(&l.user_badges);
                targets.extend(&l.profile_answers);
                targets.extend(&l.ignored_users);
            }
            PooledLinks::Tag(l) => targets.extend(l.parent),
            PooledLinks::Notification(l) => {
                targets.extend(l.from_user);
                match &l.subject {
                    Some(PooledSubject::Post(id)) | Some(PooledSubject::Discussion(id)) => {
                        targets.push(*id)
                    }
                    Some(PooledSubject::UserBadge(_)) | None => {}
                }
            }
            PooledLinks::Badge(l) => targets.extend(l.category),
            PooledLinks::BadgeCategory(l) => targets.extend(&l.badges),
            PooledLinks::UserBadge(l) => targets.extend(l.badge),
            PooledLinks::None => {}
        }
        targets
    }
}

/// Per-parse arena keyed by `(kind, id)`, in first-insertion order.
///
/// Nodes are never removed, so a [`NodeId`] stays valid for the pool's
/// whole life.
#[derive(Debug, Default)]
pub(crate) struct EntityPool {
    nodes: IndexMap<EntityKey, Node>,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn find(&self, kind: EntityKind, id: &str) -> Option<NodeId> {
        // Borrowed lookups would need a custom Equivalent impl; keys are short.
        self.nodes
            .get_index_of(&EntityKey::new(kind, id))
            .map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn links_mut(&mut self, id: NodeId) -> &mut PooledLinks {
        &mut self.nodes[id.0].links
    }

    /// Insert a node with empty links, or return the existing one untouched.
    fn insert_first(&mut self, key: EntityKey, attributes: PooledAttributes) -> NodeId {
        if let Some(index) = self.nodes.get_index_of(&key) {
            return NodeId(index);
        }
        let node = Node {
            key: key.clone(),
            attributes,
            links: PooledLinks::empty_for(key.kind),
        };
        let (index, _) = self.nodes.insert_full(key, node);
        NodeId(index)
    }

    /// Insert a node, or replace the attributes of the existing one while
    /// keeping its links.
    fn insert_or_refresh(&mut self, key: EntityKey, attributes: PooledAttributes) -> NodeId {
        match self.nodes.get_index_of(&key) {
            Some(index) => {
                self.nodes[index].attributes = attributes;
                NodeId(index)
            }
            None => self.insert_first(key, attributes),
        }
    }
}

/// How a section's records land in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PoolMode {
    /// `included`: the first occurrence of an identity wins
    FirstWins,
    /// `data`: the record's attributes replace any pooled ones
    Refresh,
}

/// The well-shaped records of one section and the nodes they landed in.
#[derive(Debug)]
pub(crate) struct SectionRecords<'a> {
    pub section: Section,
    pub records: Vec<RawRecord<'a>>,
    /// Parallel to `records`; `None` when the record was dropped
    pub nodes: Vec<Option<NodeId>>,
}

impl<'a> SectionRecords<'a> {
    /// Shape-check raw section values, dropping the malformed ones.
    pub fn from_values(
        section: Section,
        values: Vec<&'a Value>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match RawRecord::from_value(value) {
                Ok(record) => records.push(record),
                Err(reason) => diagnostics.drop_record(
                    section,
                    value.get("type").and_then(Value::as_str).map(str::to_string),
                    value.get("id").and_then(id_string),
                    reason,
                ),
            }
        }
        let nodes = vec![None; records.len()];
        Self {
            section,
            records,
            nodes,
        }
    }

    /// Pooled records paired with their node. Repeats of an identity already
    /// seen in this section are skipped.
    pub fn first_occurrences(&self) -> Vec<(&RawRecord<'a>, NodeId)> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .zip(&self.nodes)
            .filter_map(|(record, node)| node.map(|node| (record, node)))
            .filter(|(_, node)| seen.insert(*node))
            .collect()
    }

    /// Pooled nodes in wire order, each listed once.
    pub fn distinct_nodes(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .flatten()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Pass 1: decode attributes into the pool, without relationships.
pub(crate) struct PoolBuilder<'a> {
    pub catalog: &'a dyn ReactionCatalog,
    pub config: &'a ResolverConfig,
}

impl PoolBuilder<'_> {
    /// Pool every record of `section`.
    ///
    /// Within one section the first pooled occurrence of an identity wins in
    /// either mode. Post reactions are joined after the section's other
    /// records, so their user and post can come from the same section.
    pub fn pool_section(
        &self,
        pool: &mut EntityPool,
        section: &mut SectionRecords<'_>,
        mode: PoolMode,
        diagnostics: &mut Diagnostics,
    ) {
        let mut reactions = Vec::new();
        let mut pooled_here: HashMap<(EntityKind, &str), NodeId> = HashMap::new();

        for (index, record) in section.records.iter().enumerate() {
            if let Some(&existing) = pooled_here.get(&(record.kind, record.id.as_str())) {
                section.nodes[index] = Some(existing);
                continue;
            }
            if mode == PoolMode::FirstWins {
                if let Some(existing) = pool.find(record.kind, &record.id) {
                    section.nodes[index] = Some(existing);
                    continue;
                }
            }
            if record.kind == EntityKind::PostReaction {
                reactions.push(index);
                continue;
            }

            match self.decode(record, diagnostics) {
                Ok(attributes) => {
                    let key = EntityKey::new(record.kind, record.id.clone());
                    let node = match mode {
                        PoolMode::FirstWins => pool.insert_first(key, attributes),
                        PoolMode::Refresh => pool.insert_or_refresh(key, attributes),
                    };
                    section.nodes[index] = Some(node);
                    pooled_here.insert((record.kind, record.id.as_str()), node);
                }
                Err(reason) => self.reject(section.section, record, reason, diagnostics),
            }
        }

        for index in reactions {
            let record = &section.records[index];
            if let Some(&existing) = pooled_here.get(&(record.kind, record.id.as_str())) {
                section.nodes[index] = Some(existing);
                continue;
            }
            let linked = decode_attributes::<PostReactionAttributes>(record.attributes)
                .and_then(|raw| link_reaction(pool, &raw, self.catalog));
            match linked {
                Ok(linked) => {
                    let key = EntityKey::new(record.kind, record.id.clone());
                    let attributes = PooledAttributes::PostReaction(linked);
                    let node = match mode {
                        PoolMode::FirstWins => pool.insert_first(key, attributes),
                        PoolMode::Refresh => pool.insert_or_refresh(key, attributes),
                    };
                    section.nodes[index] = Some(node);
                    pooled_here.insert((record.kind, record.id.as_str()), node);
                }
                Err(reason) => self.reject(section.section, record, reason, diagnostics),
            }
        }
    }

    fn reject(
        &self,
        section: Section,
        record: &RawRecord<'_>,
        reason: RecordError,
        diagnostics: &mut Diagnostics,
    ) {
        diagnostics.drop_record(
            section,
            Some(record.kind.wire_name().to_string()),
            Some(record.id.clone()),
            reason,
        );
    }

    fn decode(
        &self,
        record: &RawRecord<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PooledAttributes, RecordError> {
        let attributes = record.attributes;
        Ok(match record.kind {
            EntityKind::Discussion => PooledAttributes::Discussion(decode_attributes(attributes)?),
            EntityKind::Post => {
                let prepared = prepare_attributes(
                    ContentOwner::Post,
                    attributes,
                    self.catalog,
                    self.config,
                    diagnostics,
                );
                PooledAttributes::Post(decode_attributes(&prepared)?)
            }
            EntityKind::User => PooledAttributes::User(decode_attributes(attributes)?),
            EntityKind::Tag => PooledAttributes::Tag(decode_attributes(attributes)?),
            EntityKind::Notification => {
                let prepared = prepare_attributes(
                    ContentOwner::Notification,
                    attributes,
                    self.catalog,
                    self.config,
                    diagnostics,
                );
                PooledAttributes::Notification(decode_attributes(&prepared)?)
            }
            EntityKind::Badge => PooledAttributes::Badge(decode_attributes(attributes)?),
            EntityKind::BadgeCategory => {
                PooledAttributes::BadgeCategory(decode_attributes(attributes)?)
            }
            EntityKind::UserBadge => PooledAttributes::UserBadge(decode_attributes(attributes)?),
            EntityKind::ProfileAnswer => {
                PooledAttributes::ProfileAnswer(decode_attributes(attributes)?)
            }
            EntityKind::PostReaction => {
                unreachable!("post reactions are linked after the section is pooled")
            }
        })
    }
}

/// Decode an attribute object. A record without attributes decodes as `{}`.
fn decode_attributes<T: serde::de::DeserializeOwned>(attributes: &Value) -> Result<T, RecordError> {
    let result = match attributes {
        Value::Null => serde_json::from_value(Value::Object(Default::default())),
        other => T::deserialize(other),
    };
    result.map_err(|e| RecordError::Attributes(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryReactionCatalog;
    use serde_json::json;

    fn build(
        included: &Value,
        catalog: &InMemoryReactionCatalog,
    ) -> (EntityPool, Vec<Option<NodeId>>, Diagnostics) {
        let config = ResolverConfig::lenient();
        let mut diagnostics = Diagnostics::default();
        let values: Vec<&Value> = included.as_array().unwrap().iter().collect();
        let mut section = SectionRecords::from_values(Section::Included, values, &mut diagnostics);
        let mut pool = EntityPool::new();
        PoolBuilder { catalog, config: &config }.pool_section(
            &mut pool,
            &mut section,
            PoolMode::FirstWins,
            &mut diagnostics,
        );
        (pool, section.nodes, diagnostics)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let included = json!([
            {"type": "tags", "id": "1", "attributes": {"name": "First"}},
            {"type": "tags", "id": "1", "attributes": {"name": "Second"}}
        ]);
        let (pool, nodes, _) = build(&included, &InMemoryReactionCatalog::new());

        assert_eq!(pool.len(), 1);
        assert_eq!(nodes[0], nodes[1]);
        match &pool.node(nodes[0].unwrap()).attributes {
            PooledAttributes::Tag(tag) => assert_eq!(tag.name, "First"),
            other => panic!("unexpected attributes: {other:?}"),
        }
    }

    #[test]
    fn test_refresh_keeps_links() {
        let mut pool = EntityPool::new();
        let key = EntityKey::new(EntityKind::Tag, "1");
        let tag = |name: &str| {
            PooledAttributes::Tag(serde_json::from_value(json!({"name": name})).unwrap())
        };

        let id = pool.insert_first(key.clone(), tag("Old"));
        *pool.links_mut(id) = PooledLinks::Tag(TagLinks { parent: Some(id) });
        let refreshed = pool.insert_or_refresh(key, tag("New"));

        assert_eq!(id, refreshed);
        assert_eq!(pool.node(id).links, PooledLinks::Tag(TagLinks { parent: Some(id) }));
        assert!(matches!(&pool.node(id).attributes, PooledAttributes::Tag(t) if t.name == "New"));
    }

    #[test]
    fn test_drops_are_recorded() {
        let included = json!([
            {"type": "users", "id": "1", "attributes": {"username": "a"}},
            {"type": "users", "attributes": {"username": "b", "displayName": "B"}},
            "garbage",
            {"type": "users", "id": "2", "attributes": {"username": "c", "displayName": "C"}}
        ]);
        let (pool, nodes, diagnostics) = build(&included, &InMemoryReactionCatalog::new());

        assert_eq!(pool.len(), 1);
        assert_eq!(nodes, vec![None, Some(NodeId(0))]);
        assert_eq!(diagnostics.dropped.len(), 3);
        // Shape checks run before attribute decoding.
        assert_eq!(diagnostics.dropped[0].reason, RecordError::MissingId);
        assert_eq!(diagnostics.dropped[1].reason, RecordError::NotAnObject);
        assert!(matches!(diagnostics.dropped[2].reason, RecordError::Attributes(_)));
    }

    #[test]
    fn test_dropped_integer_id_is_kept() {
        let included = json!([
            {"type": "widgets", "id": 42},
            {"type": "tags", "id": 7, "attributes": {"name": "Seven"}},
            {"type": "tags", "id": 7, "attributes": {"name": "Seven again"}}
        ]);
        let (pool, nodes, diagnostics) = build(&included, &InMemoryReactionCatalog::new());

        assert_eq!(diagnostics.dropped.len(), 1);
        assert_eq!(diagnostics.dropped[0].kind.as_deref(), Some("widgets"));
        assert_eq!(diagnostics.dropped[0].id.as_deref(), Some("42"));
        assert_eq!(pool.len(), 1);
        assert_eq!(nodes[0], nodes[1]);
    }

    #[test]
    fn test_refresh_mode_keeps_first_in_section() {
        let config = ResolverConfig::lenient();
        let catalog = InMemoryReactionCatalog::new();
        let mut diagnostics = Diagnostics::default();
        let data = json!([
            {"type": "tags", "id": "1", "attributes": {"name": "First"}},
            {"type": "tags", "id": "1", "attributes": {"name": "Second"}}
        ]);
        let values: Vec<&Value> = data.as_array().unwrap().iter().collect();
        let mut section = SectionRecords::from_values(Section::Data, values, &mut diagnostics);
        let mut pool = EntityPool::new();
        PoolBuilder { catalog: &catalog, config: &config }.pool_section(
            &mut pool,
            &mut section,
            PoolMode::Refresh,
            &mut diagnostics,
        );

        assert_eq!(section.nodes[0], section.nodes[1]);
        assert_eq!(section.first_occurrences().len(), 1);
        assert!(matches!(
            &pool.node(section.nodes[0].unwrap()).attributes,
            PooledAttributes::Tag(t) if t.name == "First"
        ));
    }

    #[test]
    fn test_reaction_linked_after_its_post() {
        let included = json!([
            {"type": "post_reactions", "id": "9", "attributes": {"userId": "1", "postId": "5", "reactionId": "3"}},
            {"type": "users", "id": "1", "attributes": {"username": "a", "displayName": "A"}},
            {"type": "posts", "id": "5", "attributes": {"number": 1, "createdAt": "2022-04-23T10:00:00+00:00"}}
        ]);
        let catalog = InMemoryReactionCatalog::with_reactions([Reaction::new("3", "thumbsup")]);
        let (pool, nodes, diagnostics) = build(&included, &catalog);

        assert!(diagnostics.dropped.is_empty());
        let reaction = pool.node(nodes[0].unwrap());
        assert_eq!(reaction.key, EntityKey::new(EntityKind::PostReaction, "9"));
        assert_eq!(reaction.targets(), vec![nodes[1].unwrap(), nodes[2].unwrap()]);
    }
}
