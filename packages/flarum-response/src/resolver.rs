//! Entry point: turn a response document into a [`ResponseSnapshot`].

use serde_json::Value;

use crate::catalog::{json_type_name, ReactionCatalog};
use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostics, Section};
use crate::error::{ResponseError, Result};
use crate::pipeline::pool::{EntityPool, PoolBuilder, PoolMode, SectionRecords};
use crate::pipeline::project::project;
use crate::pipeline::resolve::resolve_section;
use crate::snapshot::ResponseSnapshot;
use crate::types::wire::{section_records, Links};

/// Resolves response documents against a reaction catalog.
///
/// Holds no per-parse state; one resolver can serve concurrent parses.
#[derive(Debug, Clone)]
pub struct ResponseResolver<C> {
    catalog: C,
    config: ResolverConfig,
}

impl<C: ReactionCatalog> ResponseResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Parse and resolve raw response bytes.
    ///
    /// Fails only when the bytes are not JSON or the top level is not an
    /// object.
    pub fn parse(&self, bytes: &[u8]) -> Result<ResponseSnapshot> {
        let document: Value = serde_json::from_slice(bytes)?;
        if !document.is_object() {
            return Err(ResponseError::NotAnObject {
                found: json_type_name(&document),
            });
        }
        Ok(self.resolve(&document))
    }

    /// Resolve an already parsed document.
    ///
    /// A non-object value resolves to an empty snapshot.
    pub fn resolve(&self, document: &Value) -> ResponseSnapshot {
        let Some(document) = document.as_object() else {
            return ResponseSnapshot::default();
        };
        let mut diagnostics = Diagnostics::default();
        let builder = PoolBuilder {
            catalog: &self.catalog,
            config: &self.config,
        };
        let mut pool = EntityPool::new();

        // Attributes of both sections land in the pool before any
        // relationship resolves, so references cross sections both ways.
        let mut included = SectionRecords::from_values(
            Section::Included,
            section_records(document, "included"),
            &mut diagnostics,
        );
        builder.pool_section(&mut pool, &mut included, PoolMode::FirstWins, &mut diagnostics);
        let mut data = SectionRecords::from_values(
            Section::Data,
            section_records(document, "data"),
            &mut diagnostics,
        );
        builder.pool_section(&mut pool, &mut data, PoolMode::Refresh, &mut diagnostics);

        // Included relationships form the base; data declarations overlay it.
        resolve_section(&mut pool, &included, &self.config, &mut diagnostics);
        resolve_section(&mut pool, &data, &self.config, &mut diagnostics);

        let projection = project(&pool, &data.distinct_nodes(), &included.distinct_nodes());

        tracing::debug!(
            pooled = pool.len(),
            projected = projection.graph.len(),
            data = projection.data.len(),
            included = projection.included.len(),
            dropped = diagnostics.dropped.len(),
            "Resolved response"
        );

        ResponseSnapshot {
            links: Links::from_document(document),
            graph: projection.graph,
            data: projection.data,
            included: projection.included,
            diagnostics,
        }
    }
}

/// Parse a response with the default configuration.
pub fn parse_response<C: ReactionCatalog>(bytes: &[u8], catalog: &C) -> Result<ResponseSnapshot> {
    ResponseResolver::new(catalog).parse(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryReactionCatalog;
    use crate::snapshot::{Discussion, Tag};
    use serde_json::json;

    fn resolver() -> ResponseResolver<InMemoryReactionCatalog> {
        ResponseResolver::new(InMemoryReactionCatalog::new()).with_config(ResolverConfig::lenient())
    }

    #[test]
    fn test_non_json_is_an_error() {
        let err = resolver().parse(b"<html>").unwrap_err();
        assert!(matches!(err, ResponseError::Json(_)));
    }

    #[test]
    fn test_top_level_array_is_an_error() {
        let err = resolver().parse(b"[1, 2]").unwrap_err();
        assert!(matches!(err, ResponseError::NotAnObject { found: "array" }));
    }

    #[test]
    fn test_empty_document_resolves_empty() {
        let snapshot = resolver().parse(b"{}").unwrap();
        assert!(snapshot.graph().is_empty());
        assert!(snapshot.data().is_empty());
        assert!(snapshot.links().is_none());
        assert!(snapshot.diagnostics().is_clean());
    }

    #[test]
    fn test_data_overlays_included_relationships() {
        let document = json!({
            "data": {
                "type": "discussions", "id": "1", "attributes": {"title": "Data title"},
                "relationships": {"tags": {"data": [{"type": "tags", "id": "2"}]}}
            },
            "included": [
                {"type": "tags", "id": "1", "attributes": {"name": "One"}},
                {"type": "tags", "id": "2", "attributes": {"name": "Two"}},
                {"type": "users", "id": "9", "attributes": {"username": "u", "displayName": "U"}},
                {"type": "discussions", "id": "1", "attributes": {"title": "Included title"},
                 "relationships": {
                     "tags": {"data": [{"type": "tags", "id": "1"}]},
                     "user": {"data": {"type": "users", "id": "9"}}
                 }}
            ]
        });
        let snapshot = resolver().resolve(&document);

        let discussion = snapshot.data().discussions().next().unwrap();
        assert_eq!(discussion.attributes.title, "Data title");
        // Declared at the data level: replaced.
        let tags: Vec<_> = discussion.tags().map(|t| t.id()).collect();
        assert_eq!(tags, vec!["2"]);
        // Not declared at the data level: kept.
        assert_eq!(discussion.user().unwrap().id, "9");
        // One identity across both sections.
        assert_eq!(snapshot.graph().all::<Discussion>().len(), 1);
        assert_eq!(snapshot.graph().all::<Tag>().len(), 2);
    }

    #[test]
    fn test_data_records_reference_each_other() {
        let document = json!({
            "data": [
                {"type": "tags", "id": "1", "attributes": {"name": "Parent"}},
                {"type": "tags", "id": "2", "attributes": {"name": "Child"},
                 "relationships": {"parent": {"data": {"type": "tags", "id": "1"}}}}
            ]
        });
        let snapshot = resolver().resolve(&document);

        let child = snapshot.find::<Tag>("2").unwrap();
        assert_eq!(child.parent().unwrap().attributes.name, "Parent");
    }

    #[test]
    fn test_links_are_decoded() {
        let document = json!({
            "links": {"first": "https://example.org/api/discussions", "next": "https://example.org/api/discussions?page[offset]=20"},
            "data": []
        });
        let snapshot = resolver().resolve(&document);
        let links = snapshot.links().unwrap();
        assert!(links.prev.is_none());
        assert!(links.next.as_deref().unwrap().ends_with("offset]=20"));
    }
}
