//! Users.

use super::identifiers::UserId;
use super::post::Post;
use serde::{Deserialize, Serialize};

/// A user, optionally carrying a page of their recent posts.
///
/// Discovery endpoints return users with `posts` populated; the item
/// generator maps such a user to their most recent post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl User {
    /// User with no display name and no posts.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name: None,
            posts: Vec::new(),
        }
    }

    /// Most recent post by `created_at`; the later entry wins ties.
    pub fn most_recent_post(&self) -> Option<&Post> {
        self.posts.iter().max_by_key(|post| post.created_at)
    }
}
