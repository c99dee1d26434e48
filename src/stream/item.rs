//! VisualItem - one renderable unit of a stream.
//!
//! A `VisualItem` pairs zero-or-one domain object with a visual type tag,
//! the sizes calculated for it, and its interaction state.
//!
//! # Identity
//!
//! Items are identified by an explicit [`ItemId`] token issued from a
//! process-wide counter, never by content. Two items built from the same
//! post are distinct items. Cloning an item produces a snapshot of the
//! *same* item (same id); snapshots are what the mutation queue hands to
//! the render surface.
//!
//! Placeholder items are the one exception: two placeholder items compare
//! equal iff they reserve the same [`PlaceholderType`].

use crate::layout::waterfall::LayoutSource;
use crate::model::{DomainObject, ObjectKey, Post, Region, RegionKind};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of a visual item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Issue a fresh, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value, for logs and serialized output.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The domain object an item renders, if any.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Shared domain object; every item derived from one object holds the same `Arc`.
    Object(Arc<DomainObject>),
    /// Placeholders, spacers and markers carry no domain object.
    Empty,
}

impl Payload {
    /// The domain object, unless this is an empty payload.
    pub fn object(&self) -> Option<&DomainObject> {
        match self {
            Payload::Object(object) => Some(object),
            Payload::Empty => None,
        }
    }

    /// Identity key of the object, used to find every item derived from it.
    pub fn key(&self) -> Option<ObjectKey> {
        self.object().map(DomainObject::key)
    }

    pub fn post(&self) -> Option<&Post> {
        self.object().and_then(DomainObject::as_post)
    }
}

/// A region of post or comment content, tagged with whether it belongs to
/// reposted content (which is laid out with an extra indent).
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRegion {
    /// The region itself.
    pub region: Region,
    /// Region belongs to the reposted post rather than the repost.
    pub reposted: bool,
}

/// Closed set of visual types.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualType {
    /// Author avatar, name and timestamp of a post or comment.
    Header,
    /// "Reposted by" line above reposted content.
    RepostHeader,
    /// Expand/collapse control of a post in a list.
    Toggle,
    /// Text region.
    Text(ContentRegion),
    /// Image region.
    Image(ContentRegion),
    /// Embedded media region.
    Embed(ContentRegion),
    /// Post actions (love, repost, comment count).
    Footer,
    /// Fixed-height gap.
    Spacer {
        /// Gap height in points.
        height: f64,
    },
    /// Comment composer below a post's comments.
    CreateComment,
    /// Link to further comments.
    SeeMoreComments,
    /// Header of one comment.
    CommentHeader,
    /// "Loading more" marker; bypasses filters.
    LoadingMarker,
    /// Marker for a stream with no content; bypasses filters.
    EmptyStream,
    /// Full-width profile header.
    ProfileHeader,
    /// Row of avatars (lovers, reposters).
    UserAvatars,
    /// One row in a user list.
    UserListItem,
    /// One notification.
    Notification,
    /// Full-width announcement banner.
    Announcement,
    /// Full-width category header.
    CategoryHeader,
    /// Editorial tile.
    Editorial,
    /// Artist invite tile.
    ArtistInvite,
    /// Reserved region not yet loaded.
    Placeholder,
}

impl VisualType {
    /// Visual type for a content region; unknown region kinds have none.
    pub fn for_region(region: &Region, reposted: bool) -> Option<Self> {
        let content = ContentRegion {
            region: region.clone(),
            reposted,
        };
        match region.kind {
            RegionKind::Text => Some(VisualType::Text(content)),
            RegionKind::Image => Some(VisualType::Image(content)),
            RegionKind::Embed => Some(VisualType::Embed(content)),
            RegionKind::Unknown => None,
        }
    }

    /// Items that span every column of a multi-column layout.
    pub fn is_full_width(&self) -> bool {
        matches!(
            self,
            VisualType::ProfileHeader
                | VisualType::CategoryHeader
                | VisualType::Announcement
                | VisualType::LoadingMarker
                | VisualType::EmptyStream
                | VisualType::Placeholder
        )
    }

    /// Items exempt from every filter.
    pub fn always_show(&self) -> bool {
        matches!(self, VisualType::LoadingMarker | VisualType::EmptyStream)
    }

    /// Whether this is a post footer.
    pub fn is_footer(&self) -> bool {
        matches!(self, VisualType::Footer)
    }

    /// Content region of text, image and embed items.
    pub fn region(&self) -> Option<&ContentRegion> {
        match self {
            VisualType::Text(c) | VisualType::Image(c) | VisualType::Embed(c) => Some(c),
            _ => None,
        }
    }

    /// Stable kebab-case name, as printed by the driver.
    pub fn name(&self) -> &'static str {
        match self {
            VisualType::Header => "header",
            VisualType::RepostHeader => "repost-header",
            VisualType::Toggle => "toggle",
            VisualType::Text(_) => "text",
            VisualType::Image(_) => "image",
            VisualType::Embed(_) => "embed",
            VisualType::Footer => "footer",
            VisualType::Spacer { .. } => "spacer",
            VisualType::CreateComment => "create-comment",
            VisualType::SeeMoreComments => "see-more-comments",
            VisualType::CommentHeader => "comment-header",
            VisualType::LoadingMarker => "loading-marker",
            VisualType::EmptyStream => "empty-stream",
            VisualType::ProfileHeader => "profile-header",
            VisualType::UserAvatars => "user-avatars",
            VisualType::UserListItem => "user-list-item",
            VisualType::Notification => "notification",
            VisualType::Announcement => "announcement",
            VisualType::CategoryHeader => "category-header",
            VisualType::Editorial => "editorial",
            VisualType::ArtistInvite => "artist-invite",
            VisualType::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for VisualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named span of a stream that is reserved up front and filled later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderType {
    /// The post itself on a post-detail screen.
    PostHeader,
    /// Comments below a post.
    PostComments,
    /// Related posts below a post.
    PostRelatedPosts,
    /// Users who loved a post.
    PostLovers,
    /// Users who reposted a post.
    PostReposters,
    /// Header of a profile screen.
    ProfileHeader,
    /// Posts of a profile screen.
    ProfilePosts,
    /// Header of a category screen.
    CategoryHeader,
    /// Announcements above a stream.
    Announcements,
    /// The paged stream body.
    StreamItems,
}

/// Per-item UI state that survives reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Nothing toggled yet.
    #[default]
    None,
    /// An action on the item is in flight (e.g. comments loading).
    Loading,
    /// Post expanded, or its comments open.
    Expanded,
    /// Post collapsed to its header and footer.
    Collapsed,
}

impl InteractionState {
    /// State after a collapse toggle: collapsed items expand, everything else collapses.
    pub fn toggled(self) -> Self {
        match self {
            InteractionState::Collapsed => InteractionState::Expanded,
            _ => InteractionState::Collapsed,
        }
    }
}

/// Which size cache slot applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutMode {
    /// One column spanning the content width.
    SingleColumn,
    /// One of several grid columns.
    MultiColumn,
}

/// Sub-measurements of a profile header, cached alongside its total height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileSectionSizes {
    pub avatar: f64,
    pub names: f64,
    pub bio: f64,
    pub links: f64,
}

impl ProfileSectionSizes {
    /// Height of the whole header.
    pub fn total(&self) -> f64 {
        self.avatar + self.names + self.bio + self.links
    }
}

/// Per-layout-mode size cache.
///
/// # Invariants
/// - A height is written once per layout mode for a given width.
/// - `measured_width` records the width the cached heights were computed
///   for; heights measured at another width are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalculatedSizes {
    /// Height in a single-column layout.
    pub single_column: Option<f64>,
    /// Height in one grid column.
    pub multi_column: Option<f64>,
    /// Height reported by rendered web content, when it differs from the estimate.
    pub web_content: Option<f64>,
    /// Profile header breakdown.
    pub profile_sections: Option<ProfileSectionSizes>,
    /// Content width the heights above were measured at.
    pub measured_width: Option<f64>,
}

impl CalculatedSizes {
    /// Cached height for a layout mode.
    pub fn get(&self, mode: LayoutMode) -> Option<f64> {
        match mode {
            LayoutMode::SingleColumn => self.single_column,
            LayoutMode::MultiColumn => self.multi_column,
        }
    }

    /// Store the height for a layout mode.
    pub fn set(&mut self, mode: LayoutMode, height: f64) {
        match mode {
            LayoutMode::SingleColumn => self.single_column = Some(height),
            LayoutMode::MultiColumn => self.multi_column = Some(height),
        }
    }

    /// Forget everything, including the measured width.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One renderable unit of a stream.
#[derive(Debug, Clone)]
pub struct VisualItem {
    id: ItemId,
    payload: Payload,
    visual_type: VisualType,
    placeholder: Option<PlaceholderType>,
    sizes: CalculatedSizes,
    state: InteractionState,
    force_grid: bool,
}

impl VisualItem {
    /// Create a new item with a fresh identity.
    pub fn new(payload: Payload, visual_type: VisualType) -> Self {
        Self {
            id: ItemId::next(),
            payload,
            visual_type,
            placeholder: None,
            sizes: CalculatedSizes::default(),
            state: InteractionState::None,
            force_grid: false,
        }
    }

    /// Item rendering the given domain object.
    pub fn for_object(object: &Arc<DomainObject>, visual_type: VisualType) -> Self {
        Self::new(Payload::Object(Arc::clone(object)), visual_type)
    }

    /// Placeholder reserving a region that has not loaded yet.
    pub fn placeholder(placeholder: PlaceholderType) -> Self {
        Self::new(Payload::Empty, VisualType::Placeholder).with_placeholder(placeholder)
    }

    /// "Loading more" marker shown below a stream while a page is fetched.
    pub fn loading_marker() -> Self {
        Self::new(Payload::Empty, VisualType::LoadingMarker)
    }

    /// Marker shown in place of a stream with no content.
    pub fn empty_stream() -> Self {
        Self::new(Payload::Empty, VisualType::EmptyStream)
    }

    /// Fixed gap between posts.
    pub fn spacer(height: f64) -> Self {
        Self::new(Payload::Empty, VisualType::Spacer { height })
    }

    pub fn with_state(mut self, state: InteractionState) -> Self {
        self.state = state;
        self
    }

    /// Tag the item as belonging to a placeholder region.
    pub fn with_placeholder(mut self, placeholder: PlaceholderType) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Lay the item out in grid mode whatever the feed's preference.
    pub fn with_force_grid(mut self, force_grid: bool) -> Self {
        self.force_grid = force_grid;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn visual_type(&self) -> &VisualType {
        &self.visual_type
    }

    /// Placeholder region this item belongs to, if any.
    pub fn placeholder_type(&self) -> Option<PlaceholderType> {
        self.placeholder
    }

    pub fn set_placeholder_type(&mut self, placeholder: Option<PlaceholderType>) {
        self.placeholder = placeholder;
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn set_state(&mut self, state: InteractionState) {
        self.state = state;
    }

    pub fn force_grid(&self) -> bool {
        self.force_grid
    }

    pub fn sizes(&self) -> &CalculatedSizes {
        &self.sizes
    }

    /// Size cache, written by the sizing coordinator.
    pub fn sizes_mut(&mut self) -> &mut CalculatedSizes {
        &mut self.sizes
    }

    /// Drop every cached size.
    pub fn invalidate_sizes(&mut self) {
        self.sizes.clear();
    }

    /// Swap in new content. Cached sizes describe the old content and are dropped.
    pub fn replace_content(&mut self, payload: Payload, visual_type: VisualType) {
        self.payload = payload;
        self.visual_type = visual_type;
        self.invalidate_sizes();
    }

    /// See [`VisualType::always_show`].
    pub fn always_show(&self) -> bool {
        self.visual_type.always_show()
    }

    /// See [`VisualType::is_full_width`].
    pub fn is_full_width(&self) -> bool {
        self.visual_type.is_full_width()
    }

    /// Size slot used for this item at the given column count.
    ///
    /// Full-width items are measured at the full content width even in
    /// a multi-column layout.
    pub fn layout_mode(&self, column_count: usize) -> LayoutMode {
        if column_count > 1 && !self.is_full_width() {
            LayoutMode::MultiColumn
        } else {
            LayoutMode::SingleColumn
        }
    }

    /// Cached height for the given column count.
    pub fn height_for_columns(&self, column_count: usize) -> Option<f64> {
        self.sizes.get(self.layout_mode(column_count))
    }

    /// Record a measured height for the given column count.
    pub fn store_height(&mut self, column_count: usize, height: f64) {
        let mode = self.layout_mode(column_count);
        self.sizes.set(mode, height);
    }

    /// Layout group: consecutive items derived from the same object share a column.
    pub fn group_key(&self) -> Option<String> {
        if self.is_full_width() {
            return None;
        }
        self.payload.key().map(|key| key.to_string())
    }

    /// Whether this item was derived from the object with the given key.
    pub fn belongs_to(&self, key: &ObjectKey) -> bool {
        self.payload.key().as_ref() == Some(key)
    }
}

impl PartialEq for VisualItem {
    fn eq(&self, other: &Self) -> bool {
        match (&self.visual_type, &other.visual_type) {
            (VisualType::Placeholder, VisualType::Placeholder) => {
                self.placeholder == other.placeholder
            }
            _ => self.id == other.id,
        }
    }
}

impl Eq for VisualItem {}

impl LayoutSource for [VisualItem] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn height(&self, index: usize, column_count: usize) -> f64 {
        self.get(index)
            .and_then(|item| item.height_for_columns(column_count))
            .unwrap_or(0.0)
    }

    fn group_key(&self, index: usize) -> Option<String> {
        self.get(index).and_then(VisualItem::group_key)
    }

    fn is_full_width(&self, index: usize) -> bool {
        self.get(index).is_some_and(VisualItem::is_full_width)
    }
}
