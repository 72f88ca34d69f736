//! Immutable entity store and the typed links between its entries.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::catalog::Reaction;
use crate::types::attributes::{
    BadgeAttributes, BadgeCategoryAttributes, DiscussionAttributes, NotificationAttributes,
    PostAttributes, ProfileAnswerAttributes, TagAttributes, UserAttributes, UserBadgeAttributes,
};
use crate::types::kind::EntityKind;

use super::SectionContents;

/// A typed slot index into a [`Graph`].
///
/// Links are only meaningful against the graph that produced them.
pub struct Link<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Link<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

// No bounds on `T`.
impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Link<T> {}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Link<T> {}

impl<T> PartialOrd for Link<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Link<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Link<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: Entity> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link<{}>({})", T::KIND, self.index)
    }
}

impl<T> Serialize for Link<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index as u64)
    }
}

/// An entity stored in a [`Graph`].
pub trait Entity: Sized + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// All entities of this kind in the graph, in slot order.
    fn store(graph: &Graph) -> &[Self];

    #[doc(hidden)]
    fn section(contents: &SectionContents) -> &[Link<Self>];
}

macro_rules! entity {
    ($ty:ident, $kind:ident, $store:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn store(graph: &Graph) -> &[Self] {
                &graph.$store
            }

            fn section(contents: &SectionContents) -> &[Link<Self>] {
                &contents.$store
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discussion {
    pub id: String,
    pub attributes: DiscussionAttributes,
    pub relationships: DiscussionRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionRelationships {
    pub user: Option<Link<User>>,
    pub last_posted_user: Option<Link<User>>,
    pub first_post: Option<Link<Post>>,
    pub last_post: Option<Link<Post>>,
    pub most_relevant_post: Option<Link<Post>>,
    pub tags: Vec<Link<Tag>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub attributes: PostAttributes,
    pub relationships: PostRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRelationships {
    pub discussion: Option<Link<Discussion>>,
    pub user: Option<Link<User>>,
    /// Only reactions that could be linked
    pub reactions: Vec<Link<PostReaction>>,
    pub likes: Vec<Link<User>>,
    pub mentioned_by: Vec<Link<Post>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub attributes: UserAttributes,
    pub relationships: UserRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRelationships {
    pub user_badges: Vec<Link<UserBadge>>,
    pub profile_answers: Vec<Link<ProfileAnswer>>,
    pub ignored_users: Vec<Link<User>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: String,
    pub attributes: TagAttributes,
    pub relationships: TagRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagRelationships {
    pub parent: Option<Link<Tag>>,
}

/// A reaction placed on a post, joined to its author, post, and definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostReaction {
    pub id: String,
    pub user: Link<User>,
    pub post: Link<Post>,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub attributes: NotificationAttributes,
    pub relationships: NotificationRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRelationships {
    pub from_user: Option<Link<User>>,
    pub subject: Option<NotificationSubject>,
}

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationSubject {
    Post(Link<Post>),
    Discussion(Link<Discussion>),
    /// User badges are never included for notifications; only the id is known
    UserBadge { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub id: String,
    pub attributes: BadgeAttributes,
    pub relationships: BadgeRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BadgeRelationships {
    pub category: Option<Link<BadgeCategory>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeCategory {
    pub id: String,
    pub attributes: BadgeCategoryAttributes,
    pub relationships: BadgeCategoryRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BadgeCategoryRelationships {
    pub badges: Vec<Link<Badge>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBadge {
    pub id: String,
    pub attributes: UserBadgeAttributes,
    pub relationships: UserBadgeRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserBadgeRelationships {
    pub badge: Option<Link<Badge>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAnswer {
    pub id: String,
    pub attributes: ProfileAnswerAttributes,
}

entity!(Discussion, Discussion, discussions);
entity!(Post, Post, posts);
entity!(User, User, users);
entity!(Tag, Tag, tags);
entity!(PostReaction, PostReaction, post_reactions);
entity!(Notification, Notification, notifications);
entity!(Badge, Badge, badges);
entity!(BadgeCategory, BadgeCategory, badge_categories);
entity!(UserBadge, UserBadge, user_badges);
entity!(ProfileAnswer, ProfileAnswer, profile_answers);

/// Owned store of every entity reachable from a response, one vector per
/// kind. Relationship fields are [`Link`]s into the same store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub(crate) discussions: Vec<Discussion>,
    pub(crate) posts: Vec<Post>,
    pub(crate) users: Vec<User>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) post_reactions: Vec<PostReaction>,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) badges: Vec<Badge>,
    pub(crate) badge_categories: Vec<BadgeCategory>,
    pub(crate) user_badges: Vec<UserBadge>,
    pub(crate) profile_answers: Vec<ProfileAnswer>,
}

impl Graph {
    pub fn get<T: Entity>(&self, link: Link<T>) -> Option<&T> {
        T::store(self).get(link.index)
    }

    /// All entities of kind `T`, in slot order.
    pub fn all<T: Entity>(&self) -> &[T] {
        T::store(self)
    }

    /// Number of entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Discussion => self.discussions.len(),
            EntityKind::Post => self.posts.len(),
            EntityKind::User => self.users.len(),
            EntityKind::Tag => self.tags.len(),
            EntityKind::PostReaction => self.post_reactions.len(),
            EntityKind::Notification => self.notifications.len(),
            EntityKind::Badge => self.badges.len(),
            EntityKind::BadgeCategory => self.badge_categories.len(),
            EntityKind::UserBadge => self.user_badges.len(),
            EntityKind::ProfileAnswer => self.profile_answers.len(),
        }
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A link of any kind, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnyLink {
    Discussion(Link<Discussion>),
    Post(Link<Post>),
    User(Link<User>),
    Tag(Link<Tag>),
    PostReaction(Link<PostReaction>),
    Notification(Link<Notification>),
    Badge(Link<Badge>),
    BadgeCategory(Link<BadgeCategory>),
    UserBadge(Link<UserBadge>),
    ProfileAnswer(Link<ProfileAnswer>),
}

impl AnyLink {
    pub(crate) fn from_slot(kind: EntityKind, index: usize) -> Self {
        match kind {
            EntityKind::Discussion => AnyLink::Discussion(Link::new(index)),
            EntityKind::Post => AnyLink::Post(Link::new(index)),
            EntityKind::User => AnyLink::User(Link::new(index)),
            EntityKind::Tag => AnyLink::Tag(Link::new(index)),
            EntityKind::PostReaction => AnyLink::PostReaction(Link::new(index)),
            EntityKind::Notification => AnyLink::Notification(Link::new(index)),
            EntityKind::Badge => AnyLink::Badge(Link::new(index)),
            EntityKind::BadgeCategory => AnyLink::BadgeCategory(Link::new(index)),
            EntityKind::UserBadge => AnyLink::UserBadge(Link::new(index)),
            EntityKind::ProfileAnswer => AnyLink::ProfileAnswer(Link::new(index)),
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            AnyLink::Discussion(_) => EntityKind::Discussion,
            AnyLink::Post(_) => EntityKind::Post,
            AnyLink::User(_) => EntityKind::User,
            AnyLink::Tag(_) => EntityKind::Tag,
            AnyLink::PostReaction(_) => EntityKind::PostReaction,
            AnyLink::Notification(_) => EntityKind::Notification,
            AnyLink::Badge(_) => EntityKind::Badge,
            AnyLink::BadgeCategory(_) => EntityKind::BadgeCategory,
            AnyLink::UserBadge(_) => EntityKind::UserBadge,
            AnyLink::ProfileAnswer(_) => EntityKind::ProfileAnswer,
        }
    }

    pub fn index(self) -> usize {
        match self {
            AnyLink::Discussion(l) => l.index(),
            AnyLink::Post(l) => l.index(),
            AnyLink::User(l) => l.index(),
            AnyLink::Tag(l) => l.index(),
            AnyLink::PostReaction(l) => l.index(),
            AnyLink::Notification(l) => l.index(),
            AnyLink::Badge(l) => l.index(),
            AnyLink::BadgeCategory(l) => l.index(),
            AnyLink::UserBadge(l) => l.index(),
            AnyLink::ProfileAnswer(l) => l.index(),
        }
    }
}
