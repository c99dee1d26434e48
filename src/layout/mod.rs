//! Multi-column waterfall layout and viewport queries.

pub mod spatial;
pub mod types;
pub mod waterfall;

pub use spatial::{SpatialIndex, DEFAULT_CHUNK_SIZE};
pub use types::{ColumnCount, Frame, InvalidColumnCount, PlacementRect, PlacementRule};
pub use waterfall::{column_width, LayoutSource, WaterfallConfig, WaterfallLayout, WaterfallLayoutEngine};
