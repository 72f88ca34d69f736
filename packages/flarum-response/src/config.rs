//! Resolver configuration.

use serde::{Deserialize, Serialize};

/// Post content types that legitimately carry no decodable payload.
pub const POST_KNOWN_EMPTY_CONTENT: [&str; 4] = [
    "discussionStickied",
    "discussionSuperStickied",
    "discussionMerged",
    "recipientsModified",
];

/// Configuration for [`crate::ResponseResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Panic when a `contentType` (or notification subject type) is neither
    /// decodable nor in the known-empty allowance.
    ///
    /// Surfaces server schema drift during development. When false the
    /// drift is only logged. Default: on in debug builds, off in release.
    pub panic_on_unknown_content: bool,

    /// Post content types that are dropped without complaint.
    #[serde(default)]
    pub post_known_empty: Vec<String>,

    /// Notification content types that are dropped without complaint.
    ///
    /// Default: empty.
    #[serde(default)]
    pub notification_known_empty: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            panic_on_unknown_content: cfg!(debug_assertions),
            post_known_empty: POST_KNOWN_EMPTY_CONTENT
                .iter()
                .map(|s| s.to_string())
                .collect(),
            notification_known_empty: vec![],
        }
    }
}

impl ResolverConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config that never panics on schema drift, regardless of build profile.
    pub fn lenient() -> Self {
        Self::default().with_panic_on_unknown_content(false)
    }

    /// Set whether unknown content types panic.
    pub fn with_panic_on_unknown_content(mut self, panic: bool) -> Self {
        self.panic_on_unknown_content = panic;
        self
    }

    /// Add post content types to the known-empty allowance.
    pub fn with_post_known_empty(
        mut self,
        content_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.post_known_empty
            .extend(content_types.into_iter().map(Into::into));
        self
    }

    /// Add notification content types to the known-empty allowance.
    pub fn with_notification_known_empty(
        mut self,
        content_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.notification_known_empty
            .extend(content_types.into_iter().map(Into::into));
        self
    }

    pub(crate) fn is_post_known_empty(&self, content_type: &str) -> bool {
        self.post_known_empty.iter().any(|c| c == content_type)
    }

    pub(crate) fn is_notification_known_empty(&self, content_type: &str) -> bool {
        self.notification_known_empty
            .iter()
            .any(|c| c == content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowance() {
        let config = ResolverConfig::default();
        assert!(config.is_post_known_empty("discussionStickied"));
        assert!(!config.is_post_known_empty("comment"));
        assert!(config.notification_known_empty.is_empty());
        assert_eq!(config.panic_on_unknown_content, cfg!(debug_assertions));
    }

    #[test]
    fn test_builders_extend_allowance() {
        let config = ResolverConfig::lenient()
            .with_post_known_empty(["discussionSplit"])
            .with_notification_known_empty(["discussionLocked"]);

        assert!(!config.panic_on_unknown_content);
        assert!(config.is_post_known_empty("discussionSplit"));
        assert!(config.is_post_known_empty("discussionMerged"));
        assert!(config.is_notification_known_empty("discussionLocked"));
    }

    #[test]
    fn test_deserialize_without_allowances() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"panic_on_unknown_content": false}"#).unwrap();
        assert!(config.post_known_empty.is_empty());
    }
}
