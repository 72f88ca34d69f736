//! Polymorphic `content` payloads of posts and notifications.
//!
//! Both enums are externally tagged: the normalizer reshapes the wire
//! `content`/`contentType` pair into `{"<variant>": payload}` (or the bare
//! variant name for payload-less cases) before the attribute record is
//! decoded.

use serde::{Deserialize, Serialize};

use crate::catalog::Reaction;

/// Content of a post, selected by the post's `contentType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostContent {
    /// Source text of a comment
    Comment(String),

    /// Discussion title change
    DiscussionRenamed { old: String, new: String },

    /// Tag change, as tag ids before and after
    DiscussionTagged {
        #[serde(rename = "oldTagIds")]
        old_tag_ids: Vec<String>,
        #[serde(rename = "newTagIds")]
        new_tag_ids: Vec<String>,
    },

    /// Lock state after the event
    DiscussionLocked(bool),
}

impl PostContent {
    /// Comment text, if this is a comment.
    pub fn as_comment(&self) -> Option<&str> {
        match self {
            PostContent::Comment(text) => Some(text),
            _ => None,
        }
    }
}

/// Content of a notification, selected by the notification's `contentType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationContent {
    PostLiked,
    PostMentioned {
        #[serde(rename = "replyNumber", default)]
        reply_number: Option<u32>,
    },
    UserMentioned,
    PostReacted {
        reaction: Reaction,
    },
    BadgeReceived,
    NewPost {
        #[serde(rename = "postNumber", default)]
        post_number: Option<u32>,
    },
    PrivateDiscussionReplied {
        #[serde(rename = "postNumber", default)]
        post_number: Option<u32>,
    },
    PrivateDiscussionCreated,
    PrivateDiscussionAdded,
}
