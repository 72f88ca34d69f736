//! Snapshot projector: copies the resolved pool into an immutable [`Graph`].
//!
//! Phase one walks the pool breadth-first from the section roots and gives
//! every reachable identity a slot in its kind's store. The memo is keyed by
//! `(kind, id)`, so an identity met again (including through a cycle) reuses
//! its slot instead of being walked twice. Phase two copies each memoized
//! node in slot order and rewrites its pool links into snapshot links.

use std::collections::{HashMap, VecDeque};

use crate::pipeline::pool::{EntityPool, NodeId, PooledAttributes, PooledLinks, PooledSubject};
use crate::snapshot::{
    AnyLink, Badge, BadgeCategory, BadgeCategoryRelationships, BadgeRelationships, Discussion,
    DiscussionRelationships, Graph, Link, Notification, NotificationRelationships,
    NotificationSubject, Post, PostReaction, PostRelationships, ProfileAnswer, SectionContents,
    Tag, TagRelationships, User, UserBadge, UserBadgeRelationships, UserRelationships,
};
use crate::types::kind::{EntityKey, EntityKind};

/// The projected graph and both sections expressed as links into it.
#[derive(Debug)]
pub(crate) struct Projection {
    pub graph: Graph,
    pub data: SectionContents,
    pub included: SectionContents,
}

/// Project everything reachable from `data` and `included` (pool nodes in
/// wire order, each listed once).
pub(crate) fn project(pool: &EntityPool, data: &[NodeId], included: &[NodeId]) -> Projection {
    let mut projector = Projector::new(pool);
    for root in data.iter().chain(included) {
        projector.visit(*root);
    }
    projector.walk();

    let graph = projector.copy_nodes();
    let section = |roots: &[NodeId]| {
        let mut contents = SectionContents::default();
        for root in roots {
            contents.push(projector.any_link(*root));
        }
        contents
    };

    Projection {
        data: section(data),
        included: section(included),
        graph,
    }
}

struct Projector<'p> {
    pool: &'p EntityPool,
    /// `(kind, id)` to slot within the kind's store
    slots: HashMap<&'p EntityKey, usize>,
    next_slot: HashMap<EntityKind, usize>,
    /// Nodes in the order their slots were assigned
    order: Vec<NodeId>,
    queue: VecDeque<NodeId>,
}

impl<'p> Projector<'p> {
    fn new(pool: &'p EntityPool) -> Self {
        Self {
            pool,
            slots: HashMap::new(),
            next_slot: HashMap::new(),
            order: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    fn visit(&mut self, id: NodeId) {
        let pool = self.pool;
        let key = &pool.node(id).key;
        if self.slots.contains_key(key) {
            return;
        }
        let next = self.next_slot.entry(key.kind).or_default();
        self.slots.insert(key, *next);
        *next += 1;
        self.order.push(id);
        self.queue.push_back(id);
    }

    fn walk(&mut self) {
        while let Some(id) = self.queue.pop_front() {
            for target in self.pool.node(id).targets() {
                self.visit(target);
            }
        }
    }

    /// Slot of a visited node. Every target of a visited node was visited
    /// during the walk.
    fn slot(&self, id: NodeId) -> usize {
        self.slots[&self.pool.node(id).key]
    }

    fn link<T>(&self, id: NodeId) -> Link<T> {
        Link::new(self.slot(id))
    }

    fn links<T>(&self, ids: &[NodeId]) -> Vec<Link<T>> {
        ids.iter().map(|id| self.link(*id)).collect()
    }

    fn any_link(&self, id: NodeId) -> AnyLink {
        AnyLink::from_slot(self.pool.node(id).key.kind, self.slot(id))
    }

    /// Phase two. Slots were handed out per kind in `order`, so pushing in
    /// the same order lands every entity at its slot.
    fn copy_nodes(&self) -> Graph {
        let mut graph = Graph::default();
        for id in &self.order {
            let node = self.pool.node(*id);
            let entity_id = node.key.id.clone();
            match (&node.attributes, &node.links) {
                (PooledAttributes::Discussion(attributes), PooledLinks::Discussion(l)) => {
                    graph.discussions.push(Discussion {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: DiscussionRelationships {
                            user: l.user.map(|n| self.link(n)),
                            last_posted_user: l.last_posted_user.map(|n| self.link(n)),
                            first_post: l.first_post.map(|n| self.link(n)),
                            last_post: l.last_post.map(|n| self.link(n)),
                            most_relevant_post: l.most_relevant_post.map(|n| self.link(n)),
                            tags: self.links(&l.tags),
                        },
                    })
                }
                (PooledAttributes::Post(attributes), PooledLinks::Post(l)) => {
                    graph.posts.push(Post {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: PostRelationships {
                            discussion: l.discussion.map(|n| self.link(n)),
                            user: l.user.map(|n| self.link(n)),
                            reactions: self.links(&l.reactions),
                            likes: self.links(&l.likes),
                            mentioned_by: self.links(&l.mentioned_by),
                        },
                    })
                }
                (PooledAttributes::User(attributes), PooledLinks::User(l)) => {
                    graph.users.push(User {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: UserRelationships {
                            user_badges: self.links(&l.user_badges),
                            profile_answers: self.links(&l.profile_answers),
                            ignored_users: self.links(&l.ignored_users),
                        },
                    })
                }
                (PooledAttributes::Tag(attributes), PooledLinks::Tag(l)) => {
                    graph.tags.push(Tag {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: TagRelationships {
                            parent: l.parent.map(|n| self.link(n)),
                        },
                    })
                }
                (PooledAttributes::PostReaction(linked), _) => {
                    graph.post_reactions.push(PostReaction {
                        id: entity_id,
                        user: self.link(linked.user),
                        post: self.link(linked.post),
                        reaction: linked.reaction.clone(),
                    })
                }
                (PooledAttributes::Notification(attributes), PooledLinks::Notification(l)) => {
                    let subject = l.subject.as_ref().map(|subject| match subject {
                        PooledSubject::Post(n) => NotificationSubject::Post(self.link(*n)),
                        PooledSubject::Discussion(n) => {
                            NotificationSubject::Discussion(self.link(*n))
                        }
                        PooledSubject::UserBadge(id) => {
                            NotificationSubject::UserBadge { id: id.clone() }
                        }
                    });
                    graph.notifications.push(Notification {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: NotificationRelationships {
                            from_user: l.from_user.map(|n| self.link(n)),
                            subject,
                        },
                    })
                }
                (PooledAttributes::Badge(attributes), PooledLinks::Badge(l)) => {
                    graph.badges.push(Badge {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: BadgeRelationships {
                            category: l.category.map(|n| self.link(n)),
                        },
                    })
                }
                (PooledAttributes::BadgeCategory(attributes), PooledLinks::BadgeCategory(l)) => {
                    graph.badge_categories.push(BadgeCategory {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: BadgeCategoryRelationships {
                            badges: self.links(&l.badges),
                        },
                    })
                }
                (PooledAttributes::UserBadge(attributes), PooledLinks::UserBadge(l)) => {
                    graph.user_badges.push(UserBadge {
                        id: entity_id,
                        attributes: attributes.clone(),
                        relationships: UserBadgeRelationships {
                            badge: l.badge.map(|n| self.link(n)),
                        },
                    })
                }
                (PooledAttributes::ProfileAnswer(attributes), _) => {
                    graph.profile_answers.push(ProfileAnswer {
                        id: entity_id,
                        attributes: attributes.clone(),
                    })
                }
                (attributes, links) => unreachable!(
                    "pool node {} has mismatched links {links:?} for {attributes:?}",
                    node.key
                ),
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryReactionCatalog;
    use crate::config::ResolverConfig;
    use crate::diagnostics::{Diagnostics, Section};
    use crate::pipeline::pool::{PoolBuilder, PoolMode, SectionRecords};
    use crate::pipeline::resolve::resolve_section;
    use serde_json::{json, Value};

    fn project_included(included: &Value) -> Projection {
        let config = ResolverConfig::lenient();
        let catalog = InMemoryReactionCatalog::new();
        let mut diagnostics = Diagnostics::default();
        let values: Vec<&Value> = included.as_array().unwrap().iter().collect();
        let mut section = SectionRecords::from_values(Section::Included, values, &mut diagnostics);
        let mut pool = EntityPool::new();
        PoolBuilder {
            catalog: &catalog,
            config: &config,
        }
        .pool_section(&mut pool, &mut section, PoolMode::FirstWins, &mut diagnostics);
        resolve_section(&mut pool, &section, &config, &mut diagnostics);
        project(&pool, &[], &section.distinct_nodes())
    }

    #[test]
    fn test_cycle_projects_each_identity_once() {
        let included = json!([
            {"type": "discussions", "id": "1", "attributes": {"title": "Loop"},
             "relationships": {
                 "firstPost": {"data": {"type": "posts", "id": "2"}},
                 "lastPost": {"data": {"type": "posts", "id": "2"}}
             }},
            {"type": "posts", "id": "2",
             "attributes": {"number": 1, "createdAt": "2022-04-23T10:00:00+00:00"},
             "relationships": {"discussion": {"data": {"type": "discussions", "id": "1"}}}}
        ]);
        let projection = project_included(&included);
        let graph = &projection.graph;

        assert_eq!(graph.all::<Discussion>().len(), 1);
        assert_eq!(graph.all::<Post>().len(), 1);
        let discussion = &graph.all::<Discussion>()[0];
        let first_post = discussion.relationships.first_post.unwrap();
        assert_eq!(discussion.relationships.last_post, Some(first_post));
        let post = graph.get(first_post).unwrap();
        assert_eq!(post.relationships.discussion, Some(Link::new(0)));
    }

    #[test]
    fn test_slots_follow_walk_order() {
        let included = json!([
            {"type": "tags", "id": "b", "attributes": {"name": "B"},
             "relationships": {"parent": {"data": {"type": "tags", "id": "a"}}}},
            {"type": "tags", "id": "a", "attributes": {"name": "A"}}
        ]);
        let projection = project_included(&included);

        let tags = projection.graph.all::<Tag>();
        assert_eq!(tags[0].id, "b");
        assert_eq!(tags[1].id, "a");
        assert_eq!(tags[0].relationships.parent, Some(Link::new(1)));
        assert_eq!(
            projection.included.links(),
            &[AnyLink::Tag(Link::new(0)), AnyLink::Tag(Link::new(1))]
        );
    }

    #[test]
    fn test_user_badge_subject_stays_bare() {
        let included = json!([
            {"type": "notifications", "id": "1",
             "attributes": {"createdAt": "2022-04-23T10:00:00+00:00", "isRead": false},
             "relationships": {"subject": {"data": {"type": "userBadges", "id": "77"}}}}
        ]);
        let projection = project_included(&included);

        let notification = &projection.graph.all::<Notification>()[0];
        assert_eq!(
            notification.relationships.subject,
            Some(NotificationSubject::UserBadge { id: "77".into() })
        );
        assert!(projection.graph.all::<UserBadge>().is_empty());
    }
}
