//! Posts and comments.

use super::identifiers::{CommentId, PostId, UserId};
use super::region::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as delivered by the feed endpoints.
///
/// For a repost, `repost_content` holds the reposted body and `content`
/// holds whatever the reposter added (possibly nothing). `summary` is the
/// shortened body used by grid cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: Vec<Region>,
    #[serde(default)]
    pub content: Vec<Region>,
    #[serde(default)]
    pub repost_content: Vec<Region>,
    /// Author of the reposted post, if this is a repost.
    #[serde(default)]
    pub repost_author_id: Option<UserId>,
    /// Content is folded behind a toggle (e.g. NSFW or long posts).
    #[serde(default)]
    pub collapsed: bool,
    /// Inline comment section is open under the footer.
    #[serde(default)]
    pub comments_open: bool,
    #[serde(default)]
    pub comments_count: usize,
}

impl Post {
    /// Minimal post with a single text region, used by builders and tests.
    pub fn new(id: PostId, author_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author_id,
            created_at,
            summary: Vec::new(),
            content: Vec::new(),
            repost_content: Vec::new(),
            repost_author_id: None,
            collapsed: false,
            comments_open: false,
            comments_count: 0,
        }
    }

    /// A repost carries the reposted post's content.
    pub fn is_repost(&self) -> bool {
        !self.repost_content.is_empty()
    }
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Vec<Region>,
}

impl Comment {
    /// Comment with no content.
    pub fn new(
        id: CommentId,
        post_id: PostId,
        author_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            author_id,
            created_at,
            content: Vec::new(),
        }
    }
}
