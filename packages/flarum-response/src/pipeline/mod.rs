//! Resolution pipeline.
//!
//! A response flows through:
//! - Pooling (attributes only, one node per `(kind, id)`)
//! - Content normalization (inside pooling, for posts and notifications)
//! - Reaction linking (inside pooling, after a section's other records)
//! - Relationship resolution (included, then data)
//! - Projection into an immutable snapshot

pub mod normalize;
pub(crate) mod pool;
pub(crate) mod project;
pub(crate) mod reactions;
pub(crate) mod resolve;

pub use normalize::{
    normalize_notification_content, normalize_post_content, ContentOwner, NormalizedContent,
};
