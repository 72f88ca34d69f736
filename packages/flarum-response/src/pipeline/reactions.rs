//! Reaction linker: joins a post reaction to its user, post, and catalog entry.

use crate::catalog::ReactionCatalog;
use crate::error::RecordError;
use crate::pipeline::pool::{EntityPool, LinkedReaction};
use crate::types::attributes::PostReactionAttributes;
use crate::types::kind::EntityKind;

/// Resolve all three join keys, or fail on the first one that is missing.
///
/// Reactions are annotations; the caller drops the record on failure.
pub(crate) fn link_reaction(
    pool: &EntityPool,
    raw: &PostReactionAttributes,
    catalog: &dyn ReactionCatalog,
) -> Result<LinkedReaction, RecordError> {
    let user = pool
        .find(EntityKind::User, &raw.user_id)
        .ok_or_else(|| RecordError::ReactionJoin {
            missing: "user",
            id: raw.user_id.clone(),
        })?;
    let post = pool
        .find(EntityKind::Post, &raw.post_id)
        .ok_or_else(|| RecordError::ReactionJoin {
            missing: "post",
            id: raw.post_id.clone(),
        })?;
    let reaction = catalog
        .reaction_by_id(&raw.reaction_id)
        .ok_or_else(|| RecordError::ReactionJoin {
            missing: "reaction",
            id: raw.reaction_id.clone(),
        })?;

    Ok(LinkedReaction {
        user,
        post,
        reaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryReactionCatalog, Reaction};
    use crate::config::ResolverConfig;
    use crate::diagnostics::{Diagnostics, Section};
    use crate::pipeline::pool::{PoolBuilder, PoolMode, SectionRecords};
    use serde_json::{json, Value};

    fn pool_with_user_and_post() -> EntityPool {
        let included = json!([
            {"type": "users", "id": "1", "attributes": {"username": "a", "displayName": "A"}},
            {"type": "posts", "id": "5", "attributes": {"number": 1, "createdAt": "2022-04-23T10:00:00+00:00"}}
        ]);
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
        pool
    }

    fn raw(user: &str, post: &str, reaction: &str) -> PostReactionAttributes {
        PostReactionAttributes {
            user_id: user.into(),
            post_id: post.into(),
            reaction_id: reaction.into(),
        }
    }

    #[test]
    fn test_all_three_resolve() {
        let pool = pool_with_user_and_post();
        let catalog = InMemoryReactionCatalog::with_reactions([Reaction::new("3", "thumbsup")]);

        let linked = link_reaction(&pool, &raw("1", "5", "3"), &catalog).unwrap();
        assert_eq!(linked.reaction.identifier, "thumbsup");
    }

    #[test]
    fn test_each_missing_join_fails() {
        let pool = pool_with_user_and_post();
        let catalog = InMemoryReactionCatalog::with_reactions([Reaction::new("3", "thumbsup")]);

        let missing = |r: PostReactionAttributes| match link_reaction(&pool, &r, &catalog) {
            Err(RecordError::ReactionJoin { missing, .. }) => missing,
            other => panic!("expected join failure, got {other:?}"),
        };
        assert_eq!(missing(raw("2", "5", "3")), "user");
        assert_eq!(missing(raw("1", "6", "3")), "post");
        assert_eq!(missing(raw("1", "5", "4")), "reaction");
    }

    #[test]
    fn test_empty_catalog_drops_everything() {
        let pool = pool_with_user_and_post();
        let catalog = InMemoryReactionCatalog::new();
        assert!(link_reaction(&pool, &raw("1", "5", "3"), &catalog).is_err());
    }
}
