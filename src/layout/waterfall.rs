//! Waterfall (masonry) layout of the visible projection.
//!
//! # Algorithm
//!
//! Columns are `floor((width - (n - 1) * spacing) / n)` wide and each keeps a
//! running height. Items are walked in order:
//!
//! - A full-width item spans the content width at `y = max(column heights)`;
//!   afterwards every column is advanced to its bottom edge.
//! - An item whose group key equals the previous item's key goes into the
//!   previous item's column.
//! - Any other item picks a column by the configured [`PlacementRule`] and
//!   advances only that column.
//!
//! There is no vertical spacing between items. `content_height` is the
//! tallest column after the walk.

use super::spatial::{SpatialIndex, DEFAULT_CHUNK_SIZE};
use super::types::{ColumnCount, Frame, PlacementRect, PlacementRule};
use tracing::debug;

/// Read access to the items being laid out.
pub trait LayoutSource {
    fn item_count(&self) -> usize;

    /// Height of the item at `index` when laid out in `column_count` columns.
    fn height(&self, index: usize, column_count: usize) -> f64;

    /// Consecutive items with the same key share a column.
    fn group_key(&self, index: usize) -> Option<String>;

    fn is_full_width(&self, index: usize) -> bool;
}

/// Width of one column.
///
/// Never negative; a zero column count is treated as one column.
pub fn column_width(width: f64, column_count: usize, spacing: f64) -> f64 {
    let n = column_count.max(1) as f64;
    ((width - (n - 1.0) * spacing) / n).floor().max(0.0)
}

/// Engine settings that do not change between layout passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterfallConfig {
    /// Horizontal gap between columns.
    pub column_spacing: f64,
    /// Column choice for items that are not full width.
    pub placement_rule: PlacementRule,
    /// Placements per spatial-index chunk.
    pub chunk_size: usize,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            column_spacing: 0.0,
            placement_rule: PlacementRule::ShortestFirst,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaterfallLayout {
    /// One placement per input item, in input order.
    pub placements: Vec<PlacementRect>,
    /// Height of the tallest column.
    pub content_height: f64,
    /// Width of one column.
    pub column_width: f64,
    /// Chunked index over `placements`.
    pub index: SpatialIndex,
}

impl WaterfallLayout {
    /// Placement of the item at `index`.
    pub fn placement(&self, index: usize) -> Option<&PlacementRect> {
        self.placements.get(index)
    }

    /// Indices of items intersecting the viewport rectangle, ascending.
    pub fn items_in(&self, viewport: &Frame) -> Vec<usize> {
        self.index.query(viewport)
    }

    /// Item at a point, for tap handling.
    pub fn item_at(&self, x: f64, y: f64) -> Option<usize> {
        self.index.hit_test(x, y)
    }
}

/// Stateless waterfall layout engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterfallLayoutEngine {
    config: WaterfallConfig,
}

impl WaterfallLayoutEngine {
    /// Engine with fixed settings.
    pub fn new(config: WaterfallConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }

    /// Lay out every item of `source` across `column_count` columns of a
    /// content area `width` points wide.
    pub fn layout<S: LayoutSource + ?Sized>(
        &self,
        source: &S,
        width: f64,
        column_count: ColumnCount,
    ) -> WaterfallLayout {
        let n = column_count.get();
        let spacing = self.config.column_spacing;
        let col_width = column_width(width, n, spacing);
        let mut heights = vec![0.0_f64; n];
        let mut placements = Vec::with_capacity(source.item_count());
        // Group key and column of the previous item.
        let mut previous: Option<(String, usize)> = None;

        for index in 0..source.item_count() {
            let height = source.height(index, n);

            if source.is_full_width(index) {
                let y = max_height(&heights);
                let bottom = y + height;
                heights.iter_mut().for_each(|h| *h = bottom);
                placements.push(PlacementRect {
                    index,
                    frame: Frame::new(0.0, y, width, height),
                    column: 0,
                    full_width: true,
                });
                previous = None;
                continue;
            }

            let key = source.group_key(index);
            let column = match (&key, &previous) {
                (Some(key), Some((previous_key, column))) if key == previous_key => *column,
                _ => self.select_column(index, &heights),
            };

            let y = heights[column];
            heights[column] = y + height;
            placements.push(PlacementRect {
                index,
                frame: Frame::new(column as f64 * (col_width + spacing), y, col_width, height),
                column,
                full_width: false,
            });
            previous = key.map(|key| (key, column));
        }

        let content_height = max_height(&heights);
        let index = SpatialIndex::build(&placements, self.config.chunk_size);
        debug!(
            items = placements.len(),
            columns = n,
            content_height,
            "Waterfall layout complete"
        );
        WaterfallLayout {
            placements,
            content_height,
            column_width: col_width,
            index,
        }
    }

    fn select_column(&self, index: usize, heights: &[f64]) -> usize {
        let n = heights.len();
        match self.config.placement_rule {
            PlacementRule::ShortestFirst => heights
                .iter()
                .enumerate()
                // Strict `<` keeps the lowest index on ties.
                .fold((0, f64::INFINITY), |(best, best_h), (i, &h)| {
                    if h < best_h {
                        (i, h)
                    } else {
                        (best, best_h)
                    }
                })
                .0,
            PlacementRule::LeftToRight => index % n,
            PlacementRule::RightToLeft => n - 1 - index % n,
        }
    }
}

fn max_height(heights: &[f64]) -> f64 {
    heights.iter().copied().fold(0.0, f64::max)
}

#[cfg(test)]
#[path = "waterfall_tests.rs"]
mod tests;
