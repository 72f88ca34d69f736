//! The immutable result of resolving one response.
//!
//! A [`ResponseSnapshot`] owns a [`Graph`] holding every entity reachable
//! from the response. Relationships are [`Link`]s into that graph, so the
//! snapshot can describe cycles (a discussion whose first post points back at
//! it) while staying a plain owned value. Navigate it through [`View`]s:
//!
//! ```ignore
//! for discussion in snapshot.data().discussions() {
//!     let author = discussion.user().map(|u| u.entity().attributes.display_name.as_str());
//!     let tags: Vec<_> = discussion.tags().map(|t| t.entity().attributes.name.as_str()).collect();
//! }
//! ```

mod graph;
mod view;

pub use graph::{
    AnyLink, Badge, BadgeCategory, BadgeCategoryRelationships, BadgeRelationships, Discussion,
    DiscussionRelationships, Entity, Graph, Link, Notification, NotificationRelationships,
    NotificationSubject, Post, PostReaction, PostRelationships, ProfileAnswer, Tag,
    TagRelationships, User, UserBadge, UserBadgeRelationships, UserRelationships,
};
pub use view::{EntityView, SubjectView, View};

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::types::kind::EntityKind;
use crate::types::wire::Links;

/// The entities of one response section, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionContents {
    /// Every entity of the section, tagged by kind
    pub(crate) all: Vec<AnyLink>,
    pub(crate) discussions: Vec<Link<Discussion>>,
    pub(crate) posts: Vec<Link<Post>>,
    pub(crate) users: Vec<Link<User>>,
    pub(crate) tags: Vec<Link<Tag>>,
    pub(crate) post_reactions: Vec<Link<PostReaction>>,
    pub(crate) notifications: Vec<Link<Notification>>,
    pub(crate) badges: Vec<Link<Badge>>,
    pub(crate) badge_categories: Vec<Link<BadgeCategory>>,
    pub(crate) user_badges: Vec<Link<UserBadge>>,
    pub(crate) profile_answers: Vec<Link<ProfileAnswer>>,
}

impl SectionContents {
    pub(crate) fn push(&mut self, link: AnyLink) {
        self.all.push(link);
        match link {
            AnyLink::Discussion(l) => self.discussions.push(l),
            AnyLink::Post(l) => self.posts.push(l),
            AnyLink::User(l) => self.users.push(l),
            AnyLink::Tag(l) => self.tags.push(l),
            AnyLink::PostReaction(l) => self.post_reactions.push(l),
            AnyLink::Notification(l) => self.notifications.push(l),
            AnyLink::Badge(l) => self.badges.push(l),
            AnyLink::BadgeCategory(l) => self.badge_categories.push(l),
            AnyLink::UserBadge(l) => self.user_badges.push(l),
            AnyLink::ProfileAnswer(l) => self.profile_answers.push(l),
        }
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Links of the section, tagged by kind, in wire order.
    pub fn links(&self) -> &[AnyLink] {
        &self.all
    }

    /// Number of section entries of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.all.iter().filter(|link| link.kind() == kind).count()
    }
}

/// Navigable view of one section.
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'g> {
    graph: &'g Graph,
    contents: &'g SectionContents,
}

impl<'g> SectionView<'g> {
    /// Every entity of the section in wire order.
    pub fn all(&self) -> impl Iterator<Item = EntityView<'g>> + 'g {
        let graph = self.graph;
        self.contents
            .all
            .iter()
            .filter_map(move |link| EntityView::new(graph, *link))
    }

    /// Section entities of kind `T` in wire order.
    pub fn of<T: Entity>(&self) -> impl Iterator<Item = View<'g, T>> + 'g {
        let graph = self.graph;
        T::section(self.contents)
            .iter()
            .filter_map(move |link| View::new(graph, *link))
    }

    pub fn discussions(&self) -> impl Iterator<Item = View<'g, Discussion>> + 'g {
        self.of()
    }

    pub fn posts(&self) -> impl Iterator<Item = View<'g, Post>> + 'g {
        self.of()
    }

    pub fn users(&self) -> impl Iterator<Item = View<'g, User>> + 'g {
        self.of()
    }

    pub fn tags(&self) -> impl Iterator<Item = View<'g, Tag>> + 'g {
        self.of()
    }

    pub fn post_reactions(&self) -> impl Iterator<Item = View<'g, PostReaction>> + 'g {
        self.of()
    }

    pub fn notifications(&self) -> impl Iterator<Item = View<'g, Notification>> + 'g {
        self.of()
    }

    pub fn badges(&self) -> impl Iterator<Item = View<'g, Badge>> + 'g {
        self.of()
    }

    pub fn badge_categories(&self) -> impl Iterator<Item = View<'g, BadgeCategory>> + 'g {
        self.of()
    }

    pub fn user_badges(&self) -> impl Iterator<Item = View<'g, UserBadge>> + 'g {
        self.of()
    }

    pub fn profile_answers(&self) -> impl Iterator<Item = View<'g, ProfileAnswer>> + 'g {
        self.of()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn contents(&self) -> &'g SectionContents {
        self.contents
    }
}

/// A fully resolved response.
///
/// Owns everything it references; cloning produces an independent copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    pub(crate) links: Option<Links>,
    pub(crate) graph: Graph,
    pub(crate) data: SectionContents,
    pub(crate) included: SectionContents,
    pub(crate) diagnostics: Diagnostics,
}

impl ResponseSnapshot {
    /// Pagination links, when the response carried well-formed ones.
    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    /// The primary entities of the response.
    pub fn data(&self) -> SectionView<'_> {
        SectionView {
            graph: &self.graph,
            contents: &self.data,
        }
    }

    /// The supplementary entities of the response.
    pub fn included(&self) -> SectionView<'_> {
        SectionView {
            graph: &self.graph,
            contents: &self.included,
        }
    }

    /// Every reachable entity, including those only reachable through
    /// relationships.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Look up an entity of kind `T` by id.
    pub fn find<T: Entity>(&self, id: &str) -> Option<View<'_, T>> {
        let index = T::store(&self.graph)
            .iter()
            .position(|entity| entity.id() == id)?;
        View::new(&self.graph, Link::new(index))
    }

    /// Follow a link produced by this snapshot.
    pub fn view<T: Entity>(&self, link: Link<T>) -> Option<View<'_, T>> {
        View::new(&self.graph, link)
    }
}
