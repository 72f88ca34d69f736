//! Flarum Response Resolver
//!
//! Turns Flarum JSON:API responses into a fully cross-referenced, strongly
//! typed graph of forum entities.
//!
//! The wire format is flat and partially redundant: the `data` section holds
//! the primary records, `included` holds everything they point at, and each
//! record only names its relationships by `(type, id)`. Resolving a response
//! deduplicates records by identity, links relationships at any depth,
//! decodes polymorphic post and notification content, joins reactions to an
//! external catalog, and hands back an immutable snapshot.
//!
//! # Design Philosophy
//!
//! - One malformed record never fails a response
//! - Every absorbed failure is logged and listed in [`Diagnostics`]
//! - Schema drift is loud in development and quiet in production
//! - The snapshot owns everything it references
//!
//! # Usage
//!
//! ```rust,ignore
//! use flarum_response::{InMemoryReactionCatalog, ResponseResolver};
//!
//! let catalog = InMemoryReactionCatalog::load_document(&reactions_bytes)?;
//! let resolver = ResponseResolver::new(&catalog);
//!
//! let snapshot = resolver.parse(&response_bytes)?;
//! for discussion in snapshot.data().discussions() {
//!     println!("{} ({} tags)", discussion.attributes.title, discussion.tags().count());
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`] - Wire shapes, entity kinds, attribute records, content variants
//! - [`catalog`] - Reaction catalog trait and in-memory implementation
//! - [`pipeline`] - Pooling, normalization, resolution, projection
//! - [`snapshot`] - The immutable result graph and its views
//! - [`testing`] - Fixture builders for tests

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod snapshot;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use catalog::{InMemoryReactionCatalog, Reaction, ReactionCatalog};
pub use config::{ResolverConfig, POST_KNOWN_EMPTY_CONTENT};
pub use diagnostics::{Diagnostics, DroppedRecord, Section};
pub use error::{RecordError, ResponseError, Result};
pub use resolver::{parse_response, ResponseResolver};
pub use snapshot::{
    AnyLink, Badge, BadgeCategory, Discussion, Entity, EntityView, Graph, Link, Notification,
    NotificationSubject, Post, PostReaction, ProfileAnswer, ResponseSnapshot, SectionContents,
    SectionView, SubjectView, Tag, User, UserBadge, View,
};
pub use types::{
    attributes::{
        BadgeAttributes, BadgeCategoryAttributes, DiscussionAttributes, NotificationAttributes,
        PostAttributes, PostReactionAttributes, ProfileAnswerAttributes, TagAttributes,
        UserAttributes, UserBadgeAttributes, DEFAULT_TAG_COLOR,
    },
    content::{NotificationContent, PostContent},
    kind::{EntityKey, EntityKind},
    wire::Links,
};
