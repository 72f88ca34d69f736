//! Relationship resolution over the pool.
//!
//! The wire format only declares an entity's relationships where the entity
//! itself is described. Resolving every described record against the
//! shared pool turns those shallow declarations into a graph of unbounded
//! depth. Each record's declared relationship names are overlaid onto the
//! node's current links: a declared name replaces the base value, an
//! undeclared one keeps it.

use std::collections::HashSet;

use crate::config::ResolverConfig;
use crate::diagnostics::Diagnostics;
use crate::pipeline::normalize::report_schema_drift;
use crate::pipeline::pool::{EntityPool, NodeId, PooledLinks, PooledSubject, SectionRecords};
use crate::types::kind::EntityKind;
use crate::types::wire::RawRecord;

/// Overlay the declared relationships of every pooled record in `section`.
///
/// Only an identity's first occurrence in the section is read.
pub(crate) fn resolve_section(
    pool: &mut EntityPool,
    section: &SectionRecords<'_>,
    config: &ResolverConfig,
    diagnostics: &mut Diagnostics,
) {
    for (record, node) in section.first_occurrences() {
        let mut links = pool.node(node).links.clone();
        Overlay {
            pool,
            record,
            config,
        }
        .apply(&mut links, diagnostics);
        *pool.links_mut(node) = links;
    }
}

struct Overlay<'p, 'r> {
    pool: &'p EntityPool,
    record: &'p RawRecord<'r>,
    config: &'p ResolverConfig,
}

impl Overlay<'_, '_> {
    fn apply(&self, links: &mut PooledLinks, diagnostics: &mut Diagnostics) {
        use EntityKind::*;

        match links {
            PooledLinks::Discussion(l) => {
                self.one("user", User, &mut l.user);
                self.one("lastPostedUser", User, &mut l.last_posted_user);
                self.one("firstPost", Post, &mut l.first_post);
                self.one("lastPost", Post, &mut l.last_post);
                self.one("mostRelevantPost", Post, &mut l.most_relevant_post);
                self.many("tags", Tag, &mut l.tags);
            }
            PooledLinks::Post(l) => {
                self.one("discussion", Discussion, &mut l.discussion);
                self.one("user", User, &mut l.user);
                self.many("reactions", PostReaction, &mut l.reactions);
                self.many("likes", User, &mut l.likes);
                self.many("mentionedBy", Post, &mut l.mentioned_by);
            }
            PooledLinks::User(l) => {
                self.many("badges", UserBadge, &mut l.user_badges);
                self.many("masqueradeAnswers", ProfileAnswer, &mut l.profile_answers);
                self.many("ignoredUsers", User, &mut l.ignored_users);
            }
            PooledLinks::Tag(l) => self.one("parent", Tag, &mut l.parent),
            PooledLinks::Notification(l) => {
                self.one("fromUser", User, &mut l.from_user);
                if let Some(linkage) = self.record.relationship("subject") {
                    l.subject = linkage
                        .single()
                        .and_then(|subject| self.subject(subject.kind.as_deref(), &subject.id, diagnostics));
                }
            }
            PooledLinks::Badge(l) => self.one("category", BadgeCategory, &mut l.category),
            PooledLinks::BadgeCategory(l) => self.many("badges", Badge, &mut l.badges),
            PooledLinks::UserBadge(l) => self.one("badge", Badge, &mut l.badge),
            PooledLinks::None => {}
        }
    }

    /// To-one relationship. A declared but unresolvable target is absent.
    fn one(&self, name: &str, target: EntityKind, slot: &mut Option<NodeId>) {
        if let Some(linkage) = self.record.relationship(name) {
            *slot = linkage
                .single()
                .and_then(|identifier| self.pool.find(target, &identifier.id));
        }
    }

    /// To-many relationship, in wire order with repeated targets collapsed.
    fn many(&self, name: &str, target: EntityKind, slot: &mut Vec<NodeId>) {
        if let Some(linkage) = self.record.relationship(name) {
            let mut seen = HashSet::new();
            *slot = linkage
                .ids()
                .into_iter()
                .filter_map(|id| self.pool.find(target, id))
                .filter(|node| seen.insert(*node))
                .collect();
        }
    }

    /// Notification subjects are polymorphic; the reference's own type picks
    /// the target kind. A reference without a type is absent.
    fn subject(
        &self,
        kind: Option<&str>,
        id: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<PooledSubject> {
        let kind = kind?;
        match EntityKind::from_wire(kind) {
            Some(EntityKind::Post) => self.pool.find(EntityKind::Post, id).map(PooledSubject::Post),
            Some(EntityKind::Discussion) => self
                .pool
                .find(EntityKind::Discussion, id)
                .map(PooledSubject::Discussion),
            Some(EntityKind::UserBadge) => Some(PooledSubject::UserBadge(id.to_string())),
            _ => {
                report_schema_drift(self.config, diagnostics, "subject type", kind);
                None
            }
        }
    }
}
