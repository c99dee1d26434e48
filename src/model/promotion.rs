//! Promotional and curated objects: editorials, artist invites, announcements, categories.

use super::identifiers::{AnnouncementId, ArtistInviteId, CategoryId, EditorialId};
use serde::{Deserialize, Serialize};

/// Layout variant of an editorial tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorialKind {
    Post,
    PostStream,
    External,
    Internal,
    Invite,
    Join,
    #[serde(other)]
    Unknown,
}

/// Curated tile in the editorials feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editorial {
    pub id: EditorialId,
    pub kind: EditorialKind,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// Open call for artist submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistInvite {
    pub id: ArtistInviteId,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
}

/// Full-width banner shown above a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub header: String,
    #[serde(default)]
    pub body: String,
}

/// Topic grouping posts; heads the category feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
