//! Property tests over generated response documents.

use std::collections::HashSet;

use flarum_response::testing::{
    discussion, fixture_catalog, post, post_reaction, tag, user, DocumentBuilder, RecordBuilder,
};
use flarum_response::{
    Discussion, Entity, EntityKind, Graph, InMemoryReactionCatalog, Post, PostReaction,
    ResolverConfig, ResponseResolver, Tag, User,
};
use proptest::prelude::*;
use serde_json::{json, Value};

/// One generated wire record, kept abstract so the expected bounds can be
/// computed from it.
#[derive(Debug, Clone)]
enum Generated {
    Discussion { id: u8, tags: Vec<u8>, first_post: Option<u8> },
    Post { id: u8, discussion: Option<u8>, user: Option<u8> },
    User { id: u8 },
    Tag { id: u8, parent: Option<u8> },
    Reaction { id: u8, user: u8, post: u8, reaction: u8 },
    /// A record that must be dropped before pooling
    Broken(u8),
}

impl Generated {
    fn kind(&self) -> Option<EntityKind> {
        match self {
            Generated::Discussion { .. } => Some(EntityKind::Discussion),
            Generated::Post { .. } => Some(EntityKind::Post),
            Generated::User { .. } => Some(EntityKind::User),
            Generated::Tag { .. } => Some(EntityKind::Tag),
            Generated::Reaction { .. } => Some(EntityKind::PostReaction),
            Generated::Broken(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        let id = |n: &u8| n.to_string();
        match self {
            Generated::Discussion { id: d, tags, first_post } => {
                let tag_ids: Vec<String> = tags.iter().map(id).collect();
                let tag_refs: Vec<&str> = tag_ids.iter().map(String::as_str).collect();
                let mut record =
                    discussion(&id(d), "Generated").to_many("tags", EntityKind::Tag, &tag_refs);
                if let Some(p) = first_post {
                    record = record.to_one("firstPost", EntityKind::Post, &id(p));
                }
                record.build()
            }
            Generated::Post { id: p, discussion, user } => {
                let mut record = post(&id(p), u32::from(*p) + 1, "generated");
                if let Some(d) = discussion {
                    record = record.to_one("discussion", EntityKind::Discussion, &id(d));
                }
                if let Some(u) = user {
                    record = record.to_one("user", EntityKind::User, &id(u));
                }
                record.build()
            }
            Generated::User { id: u } => user(&id(u), &format!("user{u}")).build(),
            Generated::Tag { id: t, parent } => {
                let mut record = tag(&id(t), &format!("Tag {t}"));
                if let Some(p) = parent {
                    record = record.to_one("parent", EntityKind::Tag, &id(p));
                }
                record.build()
            }
            Generated::Reaction {
                id: r,
                user,
                post,
                reaction,
            } => post_reaction(&id(r), &id(user), &id(post), &id(reaction)).build(),
            Generated::Broken(n) => match n % 3 {
                0 => json!({"type": "tags", "attributes": {"name": "no id"}}),
                1 => RecordBuilder::new(EntityKind::Tag, id(n)).build(),
                _ => json!("not a record"),
            },
        }
    }
}

fn small_id() -> impl Strategy<Value = u8> {
    0u8..5
}

fn generated() -> impl Strategy<Value = Generated> {
    prop_oneof![
        (small_id(), prop::collection::vec(small_id(), 0..4), prop::option::of(small_id()))
            .prop_map(|(id, tags, first_post)| Generated::Discussion { id, tags, first_post }),
        (small_id(), prop::option::of(small_id()), prop::option::of(small_id()))
            .prop_map(|(id, discussion, user)| Generated::Post { id, discussion, user }),
        small_id().prop_map(|id| Generated::User { id }),
        (small_id(), prop::option::of(small_id())).prop_map(|(id, parent)| Generated::Tag { id, parent }),
        (small_id(), small_id(), small_id(), 0u8..4).prop_map(|(id, user, post, reaction)| {
            Generated::Reaction {
                id,
                user,
                post,
                reaction,
            }
        }),
        any::<u8>().prop_map(Generated::Broken),
    ]
}

fn document() -> impl Strategy<Value = (Vec<Generated>, Vec<Generated>)> {
    (
        prop::collection::vec(generated(), 0..8),
        prop::collection::vec(generated(), 0..16),
    )
}

fn build(data: &[Generated], included: &[Generated]) -> Value {
    let mut builder = DocumentBuilder::new();
    for record in data {
        builder = builder.data(record.to_value());
    }
    for record in included {
        builder = builder.include(record.to_value());
    }
    builder.build()
}

fn resolver() -> ResponseResolver<InMemoryReactionCatalog> {
    ResponseResolver::new(fixture_catalog()).with_config(ResolverConfig::lenient())
}

fn ids<T: Entity>(graph: &Graph) -> Vec<&str> {
    graph.all::<T>().iter().map(Entity::id).collect()
}

fn assert_unique(ids: Vec<&str>) -> Result<(), TestCaseError> {
    let distinct: HashSet<_> = ids.iter().collect();
    prop_assert_eq!(distinct.len(), ids.len(), "duplicate ids: {:?}", ids);
    Ok(())
}

proptest! {
    #[test]
    fn prop_counts_never_exceed_well_shaped_input((data, included) in document()) {
        let snapshot = resolver().resolve(&build(&data, &included));

        for kind in EntityKind::ALL {
            let input = data
                .iter()
                .chain(&included)
                .filter(|record| record.kind() == Some(kind))
                .count();
            prop_assert!(
                snapshot.graph().count(kind) <= input,
                "{} produced {} from {} records",
                kind,
                snapshot.graph().count(kind),
                input
            );
        }
        prop_assert!(snapshot.data().len() <= data.len());
        prop_assert!(snapshot.included().len() <= included.len());
    }

    #[test]
    fn prop_ids_unique_per_kind((data, included) in document()) {
        let snapshot = resolver().resolve(&build(&data, &included));
        let graph = snapshot.graph();

        assert_unique(ids::<Discussion>(graph))?;
        assert_unique(ids::<Post>(graph))?;
        assert_unique(ids::<User>(graph))?;
        assert_unique(ids::<Tag>(graph))?;
        assert_unique(ids::<PostReaction>(graph))?;

        let section: Vec<_> = snapshot.data().all().map(|e| (e.kind(), e.id())).collect();
        let distinct: HashSet<_> = section.iter().collect();
        prop_assert_eq!(distinct.len(), section.len());
    }

    #[test]
    fn prop_resolution_is_idempotent((data, included) in document()) {
        let document = build(&data, &included);
        let bytes = document.to_string().into_bytes();
        let resolver = resolver();

        let first = resolver.parse(&bytes).unwrap();
        let second = resolver.parse(&bytes).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, resolver.resolve(&document));
    }

    #[test]
    fn prop_every_link_resolves((data, included) in document()) {
        let snapshot = resolver().resolve(&build(&data, &included));
        let graph = snapshot.graph();

        for discussion in graph.all::<Discussion>() {
            for tag in &discussion.relationships.tags {
                prop_assert!(graph.get(*tag).is_some());
            }
            if let Some(post) = discussion.relationships.first_post {
                prop_assert!(graph.get(post).is_some());
            }
        }
        for reaction in graph.all::<PostReaction>() {
            prop_assert!(graph.get(reaction.user).is_some());
            prop_assert!(graph.get(reaction.post).is_some());
        }
        for tag in graph.all::<Tag>() {
            if let Some(parent) = tag.relationships.parent {
                prop_assert!(graph.get(parent).is_some());
            }
        }
    }
}
