//! Per-kind attribute records.
//!
//! Wire names are camelCase. A missing required field fails the decode and
//! the record is dropped; optional fields tolerate absence and `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::content::{NotificationContent, PostContent};
use crate::types::wire::{deserialize_id, deserialize_opt_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionAttributes {
    pub title: String,
    pub slug: Option<String>,
    pub comment_count: Option<u32>,
    pub participant_count: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_posted_at: Option<DateTime<Utc>>,
    pub last_post_number: Option<u32>,
    pub last_read_post_number: Option<u32>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub can_reply: Option<bool>,
    pub can_rename: Option<bool>,
    pub can_delete: Option<bool>,
    pub can_hide: Option<bool>,
    pub can_tag: Option<bool>,
    pub is_hidden: Option<bool>,
    pub is_locked: Option<bool>,
    pub is_sticky: Option<bool>,
    /// `"follow"`, `"ignore"`, or absent
    pub subscription: Option<String>,
}

impl DiscussionAttributes {
    /// Whether the viewer has unread posts in this discussion.
    pub fn has_unread(&self) -> bool {
        match (self.last_post_number, self.last_read_post_number) {
            (Some(last), Some(read)) => last > read,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAttributes {
    /// Position of the post within its discussion, starting at 1
    pub number: u32,
    pub created_at: DateTime<Utc>,
    pub content_type: Option<String>,
    pub content: Option<PostContent>,
    pub content_html: Option<String>,
    pub edited_at: Option<DateTime<Utc>>,
    pub hidden_at: Option<DateTime<Utc>>,
    pub is_hidden: Option<bool>,
    pub can_edit: Option<bool>,
    pub can_delete: Option<bool>,
    pub can_hide: Option<bool>,
    pub can_like: Option<bool>,
    pub can_react: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttributes {
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub slug: Option<String>,
    pub join_time: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub discussion_count: Option<u32>,
    pub comment_count: Option<u32>,
    pub is_email_confirmed: Option<bool>,
    pub can_edit: Option<bool>,
}

/// Default tag background when the server sends no color.
pub const DEFAULT_TAG_COLOR: &str = "#E4EBF6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAttributes {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Font Awesome class list, e.g. `"fas fa-water"`
    pub icon: Option<String>,
    pub is_hidden: Option<bool>,
    pub is_child: Option<bool>,
    pub position: Option<i32>,
    pub discussion_count: Option<u32>,
    pub last_posted_at: Option<DateTime<Utc>>,
}

impl TagAttributes {
    /// The tag color, falling back to [`DEFAULT_TAG_COLOR`] when unset or empty.
    pub fn color_or_default(&self) -> &str {
        match self.color.as_deref() {
            Some(color) if !color.is_empty() => color,
            _ => DEFAULT_TAG_COLOR,
        }
    }
}

/// Raw join keys of a post reaction, consumed by the reaction linker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReactionAttributes {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub post_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub reaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAttributes {
    pub content_type: Option<String>,
    pub content: Option<NotificationContent>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAttributes {
    pub name: String,
    pub icon: Option<String>,
    pub order: Option<i64>,
    pub description: Option<String>,
    pub background_color: Option<String>,
    pub icon_color: Option<String>,
    pub label_color: Option<String>,
    pub is_visible: Option<bool>,
    pub earned_amount: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCategoryAttributes {
    pub name: String,
    pub description: Option<String>,
    pub order: i64,
    pub is_enabled: bool,
    pub is_table: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadgeAttributes {
    /// Sent as an integer flag
    pub is_primary: i64,
    pub description: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

impl UserBadgeAttributes {
    pub fn is_primary(&self) -> bool {
        self.is_primary != 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnswerAttributes {
    pub content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub field_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discussion_requires_title() {
        let missing = serde_json::from_value::<DiscussionAttributes>(json!({"slug": "x"}));
        assert!(missing.is_err());

        let ok: DiscussionAttributes = serde_json::from_value(json!({
            "title": "Welcome",
            "commentCount": 3,
            "createdAt": "2022-03-23T13:37:49+00:00",
            "subscription": null
        }))
        .unwrap();
        assert_eq!(ok.comment_count, Some(3));
        assert!(ok.created_at.is_some());
        assert_eq!(ok.subscription, None);
    }

    #[test]
    fn test_has_unread() {
        let mut attributes: DiscussionAttributes =
            serde_json::from_value(json!({"title": "t", "lastPostNumber": 5})).unwrap();
        assert!(attributes.has_unread());

        attributes.last_read_post_number = Some(5);
        assert!(!attributes.has_unread());
    }

    #[test]
    fn test_post_reaction_ids_accept_integers() {
        let attributes: PostReactionAttributes = serde_json::from_value(json!({
            "userId": 4, "postId": "19", "reactionId": 3
        }))
        .unwrap();
        assert_eq!(attributes.user_id, "4");
        assert_eq!(attributes.post_id, "19");
        assert_eq!(attributes.reaction_id, "3");
    }

    #[test]
    fn test_tag_color_fallback() {
        let tag: TagAttributes = serde_json::from_value(json!({"name": "General", "color": ""})).unwrap();
        assert_eq!(tag.color_or_default(), DEFAULT_TAG_COLOR);

        let tag: TagAttributes =
            serde_json::from_value(json!({"name": "General", "color": "#ff0000"})).unwrap();
        assert_eq!(tag.color_or_default(), "#ff0000");
    }

    #[test]
    fn test_user_badge_primary_flag() {
        let badge: UserBadgeAttributes = serde_json::from_value(json!({
            "isPrimary": 1,
            "assignedAt": "2022-05-16T08:00:00+00:00"
        }))
        .unwrap();
        assert!(badge.is_primary());
    }

    #[test]
    fn test_profile_answer_field_id() {
        let answer: ProfileAnswerAttributes =
            serde_json::from_value(json!({"content": "Shanghai", "fieldId": 2})).unwrap();
        assert_eq!(answer.field_id.as_deref(), Some("2"));

        let answer: ProfileAnswerAttributes = serde_json::from_value(json!({})).unwrap();
        assert_eq!(answer.content, None);
        assert_eq!(answer.field_id, None);
    }
}
