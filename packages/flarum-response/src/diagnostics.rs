//! Per-parse record of absorbed failures.

use serde::Serialize;
use std::fmt;

use crate::error::RecordError;

/// Which part of the response document a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Data,
    Included,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Data => f.write_str("data"),
            Section::Included => f.write_str("included"),
        }
    }
}

/// A record that did not make it into the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    pub section: Section,
    /// Raw `type` member, when present
    pub kind: Option<String>,
    /// Raw `id` member, when present
    pub id: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    pub reason: RecordError,
}

/// Everything the resolver absorbed while producing a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub dropped: Vec<DroppedRecord>,
    /// Discriminators (content types, subject types) outside both the
    /// whitelist and the known-empty allowance, in encounter order
    pub unknown_discriminators: Vec<String>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.unknown_discriminators.is_empty()
    }

    pub(crate) fn drop_record(
        &mut self,
        section: Section,
        kind: Option<String>,
        id: Option<String>,
        reason: RecordError,
    ) {
        tracing::debug!(
            %section,
            kind = kind.as_deref().unwrap_or("?"),
            id = id.as_deref().unwrap_or("?"),
            %reason,
            "Dropping record"
        );
        self.dropped.push(DroppedRecord {
            section,
            kind,
            id,
            reason,
        });
    }

    /// Dropped records matching `predicate`.
    pub fn dropped_where(
        &self,
        predicate: impl Fn(&DroppedRecord) -> bool,
    ) -> impl Iterator<Item = &DroppedRecord> {
        self.dropped.iter().filter(move |d| predicate(*d))
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}
