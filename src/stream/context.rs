//! Feed kinds and the immutable rendering context of a feed.

use crate::config::preferences::FeedPreferences;
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which feed a stream renders. Discriminates filtering and grouping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    /// Posts of followed users.
    Following,
    /// Recommended users, shown as their latest post.
    Discover,
    /// One user's profile and posts.
    Profile,
    /// One post with its comments and related content.
    PostDetail,
    /// Search results.
    Search,
    /// Activity about the viewer.
    Notifications,
    /// Posts of one category.
    Category,
    /// Editorial tiles.
    Editorials,
    /// Artist invites.
    ArtistInvites,
    /// Posts the viewer loved.
    Loves,
}

impl FeedKind {
    /// Every feed kind.
    pub const ALL: [FeedKind; 10] = [
        FeedKind::Following,
        FeedKind::Discover,
        FeedKind::Profile,
        FeedKind::PostDetail,
        FeedKind::Search,
        FeedKind::Notifications,
        FeedKind::Category,
        FeedKind::Editorials,
        FeedKind::ArtistInvites,
        FeedKind::Loves,
    ];

    /// Kebab-case name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Following => "following",
            FeedKind::Discover => "discover",
            FeedKind::Profile => "profile",
            FeedKind::PostDetail => "post-detail",
            FeedKind::Search => "search",
            FeedKind::Notifications => "notifications",
            FeedKind::Category => "category",
            FeedKind::Editorials => "editorials",
            FeedKind::ArtistInvites => "artist-invites",
            FeedKind::Loves => "loves",
        }
    }

    /// Whether the user may switch this feed to a grid.
    pub fn supports_grid(&self) -> bool {
        !matches!(
            self,
            FeedKind::PostDetail | FeedKind::Notifications | FeedKind::ArtistInvites
        )
    }

    /// Grid preference used before the user has chosen one.
    pub fn default_grid(&self) -> bool {
        matches!(
            self,
            FeedKind::Discover | FeedKind::Category | FeedKind::Editorials
        )
    }

    /// Key under which the grid/list preference of this feed is persisted.
    pub fn preference_key(&self) -> String {
        format!("{}-grid-view", self.as_str())
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown feed kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown feed kind: {0}")]
pub struct UnknownFeedKind(pub String);

impl FromStr for FeedKind {
    type Err = UnknownFeedKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownFeedKind(s.to_string()))
    }
}

/// Immutable rendering context of one feed screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedContext {
    kind: FeedKind,
    grid_view: bool,
    force_grid: bool,
    viewer: Option<UserId>,
    /// Authors the viewer has blocked.
    blocked: Vec<UserId>,
}

impl FeedContext {
    /// Context for a feed, taking the grid/list choice from stored preferences.
    pub fn new(kind: FeedKind, preferences: &FeedPreferences, viewer: Option<UserId>) -> Self {
        Self {
            kind,
            grid_view: kind.supports_grid() && preferences.is_grid(kind),
            force_grid: false,
            viewer,
            blocked: Vec::new(),
        }
    }

    /// List-mode context, ignoring preferences.
    pub fn list(kind: FeedKind, viewer: Option<UserId>) -> Self {
        Self {
            kind,
            grid_view: false,
            force_grid: false,
            viewer,
            blocked: Vec::new(),
        }
    }

    /// Grid-mode context, ignoring preferences.
    pub fn grid(kind: FeedKind, viewer: Option<UserId>) -> Self {
        Self {
            kind,
            grid_view: true,
            force_grid: false,
            viewer,
            blocked: Vec::new(),
        }
    }

    /// Override that renders as a grid regardless of the stored preference.
    pub fn with_force_grid(mut self, force_grid: bool) -> Self {
        self.force_grid = force_grid;
        self
    }

    /// Authors whose posts are hidden from a signed-in viewer.
    pub fn with_blocked(mut self, blocked: impl IntoIterator<Item = UserId>) -> Self {
        self.blocked = blocked.into_iter().collect();
        self
    }

    /// Whether posts by `author` are hidden. Only applies with a viewer.
    pub fn hides_author(&self, author: &UserId) -> bool {
        self.viewer.is_some() && self.blocked.contains(author)
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    /// Signed-in user, if any.
    pub fn viewer(&self) -> Option<&UserId> {
        self.viewer.as_ref()
    }

    /// Grid regardless of preferences (e.g. Discover).
    pub fn force_grid(&self) -> bool {
        self.force_grid
    }

    /// Whether items render as grid cards.
    pub fn is_grid(&self) -> bool {
        self.grid_view || self.force_grid
    }

    /// Columns used for this feed given the configured grid column count.
    pub fn column_count(&self, grid_columns: usize) -> usize {
        if self.is_grid() {
            grid_columns.max(1)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::preferences::{FeedPreferences, MemoryPreferenceStore};

    #[test]
    fn feed_kind_round_trips_through_str() {
        for kind in FeedKind::ALL {
            assert_eq!(kind.as_str().parse::<FeedKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_feed_kind_is_rejected() {
        let err = "timeline".parse::<FeedKind>().unwrap_err();
        assert_eq!(err, UnknownFeedKind("timeline".to_string()));
    }

    #[test]
    fn preference_key_is_stable() {
        assert_eq!(FeedKind::Following.preference_key(), "following-grid-view");
    }

    #[test]
    fn context_uses_grid_preference() {
        let mut prefs = FeedPreferences::load(&MemoryPreferenceStore::default());
        prefs.set_grid(FeedKind::Following, true);

        let context = FeedContext::new(FeedKind::Following, &prefs, None);
        assert!(context.is_grid());
        assert_eq!(context.column_count(2), 2);
    }

    #[test]
    fn grid_preference_ignored_for_list_only_feeds() {
        let mut prefs = FeedPreferences::load(&MemoryPreferenceStore::default());
        prefs.set_grid(FeedKind::PostDetail, true);

        let context = FeedContext::new(FeedKind::PostDetail, &prefs, None);
        assert!(!context.is_grid());
        assert_eq!(context.column_count(2), 1);
    }

    #[test]
    fn force_grid_overrides_list_mode() {
        let context = FeedContext::list(FeedKind::Search, None).with_force_grid(true);
        assert!(context.is_grid());
        assert!(context.force_grid());
        assert_eq!(context.column_count(3), 3);
    }

    #[test]
    fn blocked_authors_hidden_only_for_viewer() {
        let author = UserId::new("troll").expect("valid id");
        let anonymous = FeedContext::list(FeedKind::Following, None).with_blocked([author.clone()]);
        assert!(!anonymous.hides_author(&author));

        let viewer = UserId::new("me").expect("valid id");
        let signed_in =
            FeedContext::list(FeedKind::Following, Some(viewer)).with_blocked([author.clone()]);
        assert!(signed_in.hides_author(&author));
        assert!(!signed_in.hides_author(&UserId::new("friend").expect("valid id")));
    }

    #[test]
    fn column_count_never_zero() {
        let context = FeedContext::grid(FeedKind::Discover, None);
        assert_eq!(context.column_count(0), 1);
    }
}
