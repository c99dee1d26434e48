//! Size calculation - fan-out of items to per-group calculators, fan-in of heights.
//!
//! Items missing a height for the current layout mode are partitioned into
//! [`SizeGroup`]s. Each group is handed to its registered [`SizeCalculator`]
//! together with the width that group renders at; all groups run
//! concurrently and [`SizeCalculationCoordinator::calculate`] returns only
//! after every group has reported. Groups complete in any order.
//!
//! Heights are written back by the coordinator, keyed by item id, so a
//! calculator never needs mutable access to the items.

use super::item::{ItemId, VisualItem, VisualType};
use crate::layout::waterfall::column_width;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Horizontal margin on each side of text regions.
pub const TEXT_MARGIN: f64 = 15.0;
/// Extra indent of reposted content.
pub const REPOST_INDENT: f64 = 10.0;

/// Approximate advance of one character, used by the fixed text estimate.
const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 20.0;
const TEXT_VERTICAL_PADDING: f64 = 10.0;

/// Partition key for size calculation; each group has its own width rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeGroup {
    /// Text regions, inset by the text margins.
    Text,
    /// Reposted text, inset further by the repost indent.
    RepostText,
    /// Images and embeds, at column width.
    Image,
    /// Reposted images and embeds.
    RepostImage,
    /// Notifications, at column width.
    Notification,
    /// Announcements, at full width.
    Announcement,
    /// Profile headers, at full width.
    ProfileHeader,
    /// Category headers, at full width.
    CategoryHeader,
    /// Everything with a fixed or trivially derived height.
    Fixed,
}

impl SizeGroup {
    /// Every group, in dispatch order.
    pub const ALL: [SizeGroup; 9] = [
        SizeGroup::Text,
        SizeGroup::RepostText,
        SizeGroup::Image,
        SizeGroup::RepostImage,
        SizeGroup::Notification,
        SizeGroup::Announcement,
        SizeGroup::ProfileHeader,
        SizeGroup::CategoryHeader,
        SizeGroup::Fixed,
    ];

    /// Group an item of this type is measured in.
    pub fn of(visual_type: &VisualType) -> Self {
        match visual_type {
            VisualType::Text(content) if content.reposted => SizeGroup::RepostText,
            VisualType::Text(_) => SizeGroup::Text,
            VisualType::Image(content) | VisualType::Embed(content) if content.reposted => {
                SizeGroup::RepostImage
            }
            VisualType::Image(_) | VisualType::Embed(_) => SizeGroup::Image,
            VisualType::Notification => SizeGroup::Notification,
            VisualType::Announcement => SizeGroup::Announcement,
            VisualType::ProfileHeader => SizeGroup::ProfileHeader,
            VisualType::CategoryHeader => SizeGroup::CategoryHeader,
            _ => SizeGroup::Fixed,
        }
    }

    /// Width this group renders at.
    ///
    /// `column_width` is the width of one column (the full width in a
    /// single-column layout); `full_width` is the whole content width.
    pub fn effective_width(self, column_width: f64, full_width: f64) -> f64 {
        let width = match self {
            SizeGroup::Text => column_width - 2.0 * TEXT_MARGIN,
            SizeGroup::RepostText => column_width - 2.0 * TEXT_MARGIN - REPOST_INDENT,
            SizeGroup::RepostImage => column_width - REPOST_INDENT,
            SizeGroup::Image | SizeGroup::Notification | SizeGroup::Fixed => column_width,
            SizeGroup::Announcement | SizeGroup::ProfileHeader | SizeGroup::CategoryHeader => {
                full_width
            }
        };
        width.max(0.0)
    }
}

/// Measures a batch of items at a given width.
///
/// The coordinator only dispatches groups that have items to measure, so a
/// group with nothing pending counts as complete without a call. Direct
/// callers may still pass an empty batch; implementations must return for
/// it. Items absent from the result stay unmeasured.
#[async_trait]
pub trait SizeCalculator: Send + Sync {
    /// Heights for `items`, keyed by id, at the group's effective `width`.
    async fn calculate(
        &self,
        items: &[&VisualItem],
        width: f64,
        column_count: usize,
    ) -> Vec<(ItemId, f64)>;
}

/// Calculator using per-type default heights and simple width-based estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSizeCalculator;

impl FixedSizeCalculator {
    /// Height of one item at the given width.
    pub fn height_of(visual_type: &VisualType, width: f64) -> f64 {
        match visual_type {
            VisualType::Header => 60.0,
            VisualType::RepostHeader => 30.0,
            VisualType::Toggle => 40.0,
            VisualType::Footer => 44.0,
            VisualType::Spacer { height } => *height,
            VisualType::CreateComment => 75.0,
            VisualType::SeeMoreComments => 60.0,
            VisualType::CommentHeader => 50.0,
            VisualType::LoadingMarker => 40.0,
            VisualType::EmptyStream => 200.0,
            VisualType::ProfileHeader => 320.0,
            VisualType::UserAvatars => 50.0,
            VisualType::UserListItem => 85.0,
            VisualType::Notification => 117.0,
            VisualType::Announcement => 200.0,
            VisualType::CategoryHeader => 200.0,
            VisualType::ArtistInvite => 400.0,
            VisualType::Placeholder => 0.0,
            // Square tiles
            VisualType::Editorial => width,
            VisualType::Text(content) => {
                let per_line = (width / CHAR_WIDTH).floor().max(1.0);
                let lines = (content.region.text_len() as f64 / per_line).ceil().max(1.0);
                lines * LINE_HEIGHT + 2.0 * TEXT_VERTICAL_PADDING
            }
            VisualType::Image(content) => width * content.region.aspect_ratio().unwrap_or(1.0),
            VisualType::Embed(_) => width * 9.0 / 16.0,
        }
    }
}

#[async_trait]
impl SizeCalculator for FixedSizeCalculator {
    async fn calculate(
        &self,
        items: &[&VisualItem],
        width: f64,
        _column_count: usize,
    ) -> Vec<(ItemId, f64)> {
        items
            .iter()
            .map(|item| (item.id(), Self::height_of(item.visual_type(), width)))
            .collect()
    }
}

/// Outcome of one coordinator pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizingReport {
    /// Items that received a height in this pass.
    pub measured: usize,
    /// Items whose cached height was still valid.
    pub cached: usize,
    /// Items a calculator returned no height for.
    pub missing: usize,
    /// Non-empty groups dispatched.
    pub groups: usize,
}

/// Fans items out to calculators by group and applies the results.
#[derive(Clone)]
pub struct SizeCalculationCoordinator {
    calculators: HashMap<SizeGroup, Arc<dyn SizeCalculator>>,
    fallback: Arc<dyn SizeCalculator>,
    column_spacing: f64,
}

impl std::fmt::Debug for SizeCalculationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeCalculationCoordinator")
            .field("registered", &self.calculators.keys().collect::<Vec<_>>())
            .field("column_spacing", &self.column_spacing)
            .finish()
    }
}

impl Default for SizeCalculationCoordinator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SizeCalculationCoordinator {
    /// Coordinator with no registered calculators; every group uses
    /// [`FixedSizeCalculator`].
    pub fn new(column_spacing: f64) -> Self {
        Self {
            calculators: HashMap::new(),
            fallback: Arc::new(FixedSizeCalculator),
            column_spacing,
        }
    }

    /// Register the calculator for a group, replacing any previous one.
    pub fn with_calculator(mut self, group: SizeGroup, calculator: Arc<dyn SizeCalculator>) -> Self {
        self.calculators.insert(group, calculator);
        self
    }

    /// Use `calculator` for every item in `group`.
    pub fn register(&mut self, group: SizeGroup, calculator: Arc<dyn SizeCalculator>) {
        self.calculators.insert(group, calculator);
    }

    /// Width one item of `group` renders at.
    pub fn width_for(&self, group: SizeGroup, width: f64, column_count: usize) -> f64 {
        let column = if column_count > 1 {
            column_width(width, column_count, self.column_spacing)
        } else {
            width
        };
        group.effective_width(column, width)
    }

    /// Calculate every missing height for `items` at content width `width`.
    ///
    /// Items whose cached sizes were measured at a different width are
    /// invalidated first. Completes after every dispatched group completes;
    /// groups with no pending items are not dispatched.
    pub async fn calculate(
        &self,
        items: &mut [VisualItem],
        width: f64,
        column_count: usize,
    ) -> SizingReport {
        let mut report = SizingReport::default();

        let mut pending: HashMap<SizeGroup, Vec<usize>> = HashMap::new();
        for (index, item) in items.iter_mut().enumerate() {
            if item.sizes().measured_width != Some(width) {
                item.invalidate_sizes();
            }
            if item.height_for_columns(column_count).is_some() {
                report.cached += 1;
                continue;
            }
            pending
                .entry(SizeGroup::of(item.visual_type()))
                .or_default()
                .push(index);
        }

        let results = {
            let shared: &[VisualItem] = &*items;
            let jobs = SizeGroup::ALL.into_iter().filter_map(|group| {
                let indices = pending.get(&group).filter(|indices| !indices.is_empty())?;
                let batch: Vec<&VisualItem> = indices.iter().map(|&i| &shared[i]).collect();
                let calculator = Arc::clone(self.calculators.get(&group).unwrap_or(&self.fallback));
                let group_width = self.width_for(group, width, column_count);
                Some(async move {
                    debug!(?group, count = batch.len(), width = group_width, "Sizing group");
                    let heights = calculator.calculate(&batch, group_width, column_count).await;
                    (group, batch.len(), heights)
                })
            });
            join_all(jobs).await
        };

        let mut heights: HashMap<ItemId, f64> = HashMap::new();
        for (group, requested, group_heights) in results {
            report.groups += 1;
            if group_heights.len() < requested {
                warn!(
                    ?group,
                    requested,
                    returned = group_heights.len(),
                    "Calculator skipped items"
                );
            }
            heights.extend(group_heights);
        }

        for index in pending.into_values().flatten() {
            let item = &mut items[index];
            match heights.get(&item.id()) {
                Some(&height) => {
                    item.store_height(column_count, height);
                    item.sizes_mut().measured_width = Some(width);
                    report.measured += 1;
                }
                None => report.missing += 1,
            }
        }

        debug!(?report, "Sizing complete");
        report
    }
}
