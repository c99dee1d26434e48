//! Stream pipeline: domain objects to visual items, projections and surface updates.
//!
//! Data flows one way:
//!
//! ```text
//! objects ─► generator ─► sizing ─► store ─► diff ─► queue ─► render surface
//!                                     │
//!                                     └─► layout (waterfall)
//! ```

pub mod context;
pub mod diff;
pub mod generator;
pub mod item;
pub mod loader;
pub mod queue;
pub mod sizing;
pub mod store;

pub use context::{FeedContext, FeedKind, UnknownFeedKind};
pub use diff::{Diff, DiffOp};
pub use generator::{generate, generate_for_placeholder};
pub use item::{
    CalculatedSizes, InteractionState, ItemId, LayoutMode, Payload, PlaceholderType, VisualItem,
    VisualType,
};
pub use loader::{
    DomainFetcher, FeedLoader, FetchError, FetchOutcome, LoadGeneration, LoadResult, LoadTicket,
    PageCursor, PagingInfo,
};
pub use queue::{JobError, JobHandle, JobKind, MutationJob, MutationQueue, QueueSender, RenderSurface};
pub use sizing::{FixedSizeCalculator, SizeCalculationCoordinator, SizeCalculator, SizeGroup, SizingReport};
pub use store::{ItemFilter, ItemStore, MasterItemsMut};
