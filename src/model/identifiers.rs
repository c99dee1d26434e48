//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Deserialization goes through the same smart constructor, so an empty id
//! in a payload is a decode error rather than a silently-accepted value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when an identifier is constructed from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidId {
    /// The raw value was empty.
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Smart constructor: rejects empty ids.
            pub fn new(raw: impl Into<String>) -> Result<Self, InvalidId> {
                let raw = raw.into();
                if raw.is_empty() {
                    Err(InvalidId::Empty($label))
                } else {
                    Ok(Self(raw))
                }
            }

            /// Borrow the raw id.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Server id of a post.
    PostId,
    "Post ID"
);
string_id!(
    /// Server id of a comment.
    CommentId,
    "Comment ID"
);
string_id!(
    /// Server id of a user.
    UserId,
    "User ID"
);
string_id!(
    /// Server id of a notification activity.
    ActivityId,
    "Activity ID"
);
string_id!(
    /// Server id of an editorial.
    EditorialId,
    "Editorial ID"
);
string_id!(
    /// Server id of an artist invite.
    ArtistInviteId,
    "Artist invite ID"
);
string_id!(
    /// Server id of an announcement.
    AnnouncementId,
    "Announcement ID"
);
string_id!(
    /// Server id of a category.
    CategoryId,
    "Category ID"
);

// ===== Tests =====
