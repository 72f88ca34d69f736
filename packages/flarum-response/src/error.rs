//! Typed errors for the response resolver.
//!
//! Only a response that is not a JSON object at all surfaces as an error.
//! Everything below the top-level container is absorbed per record and
//! described by [`RecordError`] in the snapshot's diagnostics.

use thiserror::Error;

/// Errors surfaced to the caller of [`crate::ResponseResolver::parse`].
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The bytes are not JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an object
    #[error("response document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Reasons a single wire record was dropped.
///
/// These never abort a parse. They are logged and collected into
/// [`crate::Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record is not a JSON object
    #[error("record is not an object")]
    NotAnObject,

    /// Record has no `type` member
    #[error("record has no type")]
    MissingType,

    /// Record `type` is not one of the known entity kinds
    #[error("unknown record type: {0}")]
    UnknownType(String),

    /// Record has no string `id`
    #[error("record has no id")]
    MissingId,

    /// Attributes did not decode into the kind's attribute record
    #[error("attributes failed to decode: {0}")]
    Attributes(String),

    /// A post reaction could not be joined to its user, post, or reaction
    #[error("post reaction has no matching {missing} ({id})")]
    ReactionJoin { missing: &'static str, id: String },
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResponseError>;
