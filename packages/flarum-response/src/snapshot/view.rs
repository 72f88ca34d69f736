//! Read-only navigation over a [`Graph`].

use std::fmt;
use std::ops::Deref;

use super::graph::{
    AnyLink, Badge, BadgeCategory, Discussion, Entity, Graph, Link, Notification,
    NotificationSubject, Post, PostReaction, ProfileAnswer, Tag, User, UserBadge,
};
use crate::types::kind::EntityKind;

/// An entity together with the graph it lives in, so its relationships can
/// be followed.
pub struct View<'g, T> {
    graph: &'g Graph,
    link: Link<T>,
    entity: &'g T,
}

impl<'g, T: Entity> View<'g, T> {
    pub(crate) fn new(graph: &'g Graph, link: Link<T>) -> Option<Self> {
        graph.get(link).map(|entity| Self {
            graph,
            link,
            entity,
        })
    }

    pub fn link(&self) -> Link<T> {
        self.link
    }

    /// The entity, borrowed for the graph's lifetime rather than the view's.
    pub fn entity(&self) -> &'g T {
        self.entity
    }

    pub fn id(&self) -> &'g str {
        self.entity.id()
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    fn one<U: Entity>(&self, link: Option<Link<U>>) -> Option<View<'g, U>> {
        link.and_then(|link| View::new(self.graph, link))
    }

    fn many<U: Entity>(&self, links: &'g [Link<U>]) -> impl Iterator<Item = View<'g, U>> + 'g {
        let graph = self.graph;
        links.iter().filter_map(move |link| View::new(graph, *link))
    }
}

impl<T> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<'_, T> {}

impl<T> Deref for View<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.entity
    }
}

impl<T: Entity + fmt::Debug> fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("link", &self.link)
            .field("entity", self.entity)
            .finish()
    }
}

impl<'g> View<'g, Discussion> {
    pub fn user(&self) -> Option<View<'g, User>> {
        self.one(self.entity.relationships.user)
    }

    pub fn last_posted_user(&self) -> Option<View<'g, User>> {
        self.one(self.entity.relationships.last_posted_user)
    }

    pub fn first_post(&self) -> Option<View<'g, Post>> {
        self.one(self.entity.relationships.first_post)
    }

    pub fn last_post(&self) -> Option<View<'g, Post>> {
        self.one(self.entity.relationships.last_post)
    }

    pub fn most_relevant_post(&self) -> Option<View<'g, Post>> {
        self.one(self.entity.relationships.most_relevant_post)
    }

    pub fn tags(&self) -> impl Iterator<Item = View<'g, Tag>> + 'g {
        self.many(&self.entity.relationships.tags)
    }
}

impl<'g> View<'g, Post> {
    pub fn discussion(&self) -> Option<View<'g, Discussion>> {
        self.one(self.entity.relationships.discussion)
    }

    pub fn user(&self) -> Option<View<'g, User>> {
        self.one(self.entity.relationships.user)
    }

    pub fn reactions(&self) -> impl Iterator<Item = View<'g, PostReaction>> + 'g {
        self.many(&self.entity.relationships.reactions)
    }

    pub fn likes(&self) -> impl Iterator<Item = View<'g, User>> + 'g {
        self.many(&self.entity.relationships.likes)
    }

    pub fn mentioned_by(&self) -> impl Iterator<Item = View<'g, Post>> + 'g {
        self.many(&self.entity.relationships.mentioned_by)
    }
}

impl<'g> View<'g, User> {
    pub fn user_badges(&self) -> impl Iterator<Item = View<'g, UserBadge>> + 'g {
        self.many(&self.entity.relationships.user_badges)
    }

    pub fn profile_answers(&self) -> impl Iterator<Item = View<'g, ProfileAnswer>> + 'g {
        self.many(&self.entity.relationships.profile_answers)
    }

    pub fn ignored_users(&self) -> impl Iterator<Item = View<'g, User>> + 'g {
        self.many(&self.entity.relationships.ignored_users)
    }
}

impl<'g> View<'g, Tag> {
    pub fn parent(&self) -> Option<View<'g, Tag>> {
        self.one(self.entity.relationships.parent)
    }

    /// This tag followed by its ancestors, nearest first.
    ///
    /// Stops at the first repeated tag, so a malformed parent cycle still
    /// terminates.
    pub fn ancestry(&self) -> Vec<View<'g, Tag>> {
        let mut chain = vec![*self];
        while let Some(parent) = chain.last().and_then(|tag| tag.parent()) {
            if chain.iter().any(|seen| seen.link == parent.link) {
                break;
            }
            chain.push(parent);
        }
        chain
    }
}

impl<'g> View<'g, PostReaction> {
    pub fn user(&self) -> Option<View<'g, User>> {
        self.one(Some(self.entity.user))
    }

    pub fn post(&self) -> Option<View<'g, Post>> {
        self.one(Some(self.entity.post))
    }
}

/// The resolved subject of a notification.
#[derive(Debug, Clone, Copy)]
pub enum SubjectView<'g> {
    Post(View<'g, Post>),
    Discussion(View<'g, Discussion>),
    UserBadge { id: &'g str },
}

impl<'g> View<'g, Notification> {
    pub fn from_user(&self) -> Option<View<'g, User>> {
        self.one(self.entity.relationships.from_user)
    }

    pub fn subject(&self) -> Option<SubjectView<'g>> {
        match self.entity.relationships.subject.as_ref()? {
            NotificationSubject::Post(link) => self.one(Some(*link)).map(SubjectView::Post),
            NotificationSubject::Discussion(link) => {
                self.one(Some(*link)).map(SubjectView::Discussion)
            }
            NotificationSubject::UserBadge { id } => Some(SubjectView::UserBadge { id }),
        }
    }
}

impl<'g> View<'g, Badge> {
    pub fn category(&self) -> Option<View<'g, BadgeCategory>> {
        self.one(self.entity.relationships.category)
    }
}

impl<'g> View<'g, BadgeCategory> {
    pub fn badges(&self) -> impl Iterator<Item = View<'g, Badge>> + 'g {
        self.many(&self.entity.relationships.badges)
    }
}

impl<'g> View<'g, UserBadge> {
    pub fn badge(&self) -> Option<View<'g, Badge>> {
        self.one(self.entity.relationships.badge)
    }
}

/// A view of any kind.
#[derive(Debug, Clone, Copy)]
pub enum EntityView<'g> {
    Discussion(View<'g, Discussion>),
    Post(View<'g, Post>),
    User(View<'g, User>),
    Tag(View<'g, Tag>),
    PostReaction(View<'g, PostReaction>),
    Notification(View<'g, Notification>),
    Badge(View<'g, Badge>),
    BadgeCategory(View<'g, BadgeCategory>),
    UserBadge(View<'g, UserBadge>),
    ProfileAnswer(View<'g, ProfileAnswer>),
}

impl<'g> EntityView<'g> {
    pub(crate) fn new(graph: &'g Graph, link: AnyLink) -> Option<Self> {
        Some(match link {
            AnyLink::Discussion(l) => EntityView::Discussion(View::new(graph, l)?),
            AnyLink::Post(l) => EntityView::Post(View::new(graph, l)?),
            AnyLink::User(l) => EntityView::User(View::new(graph, l)?),
            AnyLink::Tag(l) => EntityView::Tag(View::new(graph, l)?),
            AnyLink::PostReaction(l) => EntityView::PostReaction(View::new(graph, l)?),
            AnyLink::Notification(l) => EntityView::Notification(View::new(graph, l)?),
            AnyLink::Badge(l) => EntityView::Badge(View::new(graph, l)?),
            AnyLink::BadgeCategory(l) => EntityView::BadgeCategory(View::new(graph, l)?),
            AnyLink::UserBadge(l) => EntityView::UserBadge(View::new(graph, l)?),
            AnyLink::ProfileAnswer(l) => EntityView::ProfileAnswer(View::new(graph, l)?),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityView::Discussion(_) => EntityKind::Discussion,
            EntityView::Post(_) => EntityKind::Post,
            EntityView::User(_) => EntityKind::User,
            EntityView::Tag(_) => EntityKind::Tag,
            EntityView::PostReaction(_) => EntityKind::PostReaction,
            EntityView::Notification(_) => EntityKind::Notification,
            EntityView::Badge(_) => EntityKind::Badge,
            EntityView::BadgeCategory(_) => EntityKind::BadgeCategory,
            EntityView::UserBadge(_) => EntityKind::UserBadge,
            EntityView::ProfileAnswer(_) => EntityKind::ProfileAnswer,
        }
    }

    pub fn id(&self) -> &'g str {
        match self {
            EntityView::Discussion(v) => &v.entity().id,
            EntityView::Post(v) => &v.entity().id,
            EntityView::User(v) => &v.entity().id,
            EntityView::Tag(v) => &v.entity().id,
            EntityView::PostReaction(v) => &v.entity().id,
            EntityView::Notification(v) => &v.entity().id,
            EntityView::Badge(v) => &v.entity().id,
            EntityView::BadgeCategory(v) => &v.entity().id,
            EntityView::UserBadge(v) => &v.entity().id,
            EntityView::ProfileAnswer(v) => &v.entity().id,
        }
    }
}
