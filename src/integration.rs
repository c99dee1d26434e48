//! Feed pipeline wiring.
//!
//! [`FeedPipeline`] owns one feed's store, sizing coordinator, layout engine
//! and mutation queue, and runs the fixed control flow:
//!
//! ```text
//! objects ─► generate ─► size ─► store ─► diff ─► enqueue job
//! ```
//!
//! Layout passes read the store directly; they never go through the queue.
//! The last pass is cached until the store or width changes, so viewport
//! queries only touch the spatial index.

use crate::config::ResolvedConfig;
use crate::layout::{ColumnCount, Frame, WaterfallConfig, WaterfallLayout, WaterfallLayoutEngine};
use crate::model::{DomainObject, ObjectKey};
use crate::stream::{
    generate, generate_for_placeholder, Diff, FeedContext, InteractionState, ItemFilter, ItemId,
    ItemStore, JobError, JobHandle, LoadResult, MutationJob, MutationQueue, PlaceholderType,
    RenderSurface, SizeCalculationCoordinator, SizingReport, VisualItem,
};
use std::cell::OnceCell;
use tracing::{debug, info};

/// One feed screen: store, sizing and queued surface updates.
pub struct FeedPipeline<S: RenderSurface> {
    context: FeedContext,
    store: ItemStore,
    coordinator: SizeCalculationCoordinator,
    queue: MutationQueue<S>,
    engine: WaterfallLayoutEngine,
    width: f64,
    grid_columns: ColumnCount,
    /// Layout of the current projection. Cleared whenever a job is enqueued.
    layout: OnceCell<WaterfallLayout>,
}

impl<S: RenderSurface> FeedPipeline<S> {
    /// Build a pipeline and start its queue worker on the current runtime.
    pub fn new(context: FeedContext, surface: S, config: &ResolvedConfig, width: f64) -> Self {
        let engine = WaterfallLayoutEngine::new(WaterfallConfig {
            column_spacing: config.column_spacing,
            placement_rule: config.placement_rule,
            chunk_size: config.chunk_size,
        });
        info!(kind = %context.kind(), grid = context.is_grid(), width, "Feed pipeline created");
        Self {
            context,
            store: ItemStore::new(),
            coordinator: SizeCalculationCoordinator::new(config.column_spacing),
            queue: MutationQueue::spawn(surface),
            engine,
            width,
            grid_columns: config.column_count,
            layout: OnceCell::new(),
        }
    }

    /// Replace the sizing coordinator, e.g. to register platform calculators.
    pub fn with_coordinator(mut self, coordinator: SizeCalculationCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn context(&self) -> &FeedContext {
        &self.context
    }

    /// Items of this feed.
    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Content width the items are currently sized for.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Columns this feed lays out in.
    pub fn column_count(&self) -> ColumnCount {
        ColumnCount::new(self.context.column_count(self.grid_columns.get()))
            .unwrap_or(ColumnCount::ONE)
    }

    /// Reserve the stream region with a loading marker.
    pub fn show_loading(&mut self) -> JobHandle {
        let marker = VisualItem::loading_marker().with_placeholder(PlaceholderType::StreamItems);
        self.store
            .replace_placeholder(PlaceholderType::StreamItems, vec![marker]);
        self.enqueue_reload()
    }

    /// Fill a placeholder region with items generated from `objects`.
    ///
    /// An empty stream region shows the empty-stream marker instead.
    pub async fn fill_placeholder(
        &mut self,
        placeholder: PlaceholderType,
        objects: &[DomainObject],
    ) -> JobHandle {
        let mut items = generate_for_placeholder(objects, &self.context, placeholder);
        if items.is_empty() && placeholder == PlaceholderType::StreamItems {
            items.push(VisualItem::empty_stream().with_placeholder(placeholder));
        }
        self.size(&mut items).await;

        let old = self.visible_ids();
        self.store.replace_placeholder(placeholder, items);
        self.enqueue_diff(&old)
    }

    /// Append a further page below the stream region.
    pub async fn append_page(&mut self, objects: &[DomainObject]) -> JobHandle {
        let mut items = generate_for_placeholder(objects, &self.context, PlaceholderType::StreamItems);
        self.size(&mut items).await;

        let old = self.visible_ids();
        self.remove_loading_markers();
        self.store.append(items);
        self.enqueue_diff(&old)
    }

    /// Insert generated items at a visible index (e.g. a new post at the top).
    pub async fn insert(&mut self, objects: &[DomainObject], at_visible: usize) -> JobHandle {
        let mut items = generate(objects, &self.context);
        self.size(&mut items).await;

        let old = self.visible_ids();
        self.store.insert(items, at_visible);
        self.enqueue_diff(&old)
    }

    /// Apply a loader result. `first_page` selects fill versus append.
    ///
    /// Stale and exhausted results change nothing and return `None`.
    pub async fn apply_load(&mut self, result: LoadResult, first_page: bool) -> Option<JobHandle> {
        match result {
            LoadResult::Loaded { objects, has_more } => {
                let handle = if first_page {
                    self.fill_placeholder(PlaceholderType::StreamItems, &objects)
                        .await
                } else {
                    self.append_page(&objects).await
                };
                if !has_more {
                    debug!(kind = %self.context.kind(), "Stream exhausted");
                }
                Some(handle)
            }
            LoadResult::Empty if first_page => Some(
                self.fill_placeholder(PlaceholderType::StreamItems, &[])
                    .await,
            ),
            LoadResult::Empty => {
                let old = self.visible_ids();
                self.remove_loading_markers();
                Some(self.enqueue_diff(&old))
            }
            LoadResult::Stale | LoadResult::Exhausted => None,
        }
    }

    /// Remove every item derived from an object (post deleted, user blocked).
    pub fn remove_object(&mut self, key: &ObjectKey) -> JobHandle {
        let old = self.visible_ids();
        let removed = self.store.remove_items_for(key);
        debug!(%key, removed = removed.len(), "Removed object");
        self.enqueue_diff(&old)
    }

    /// Regenerate the items of an edited object in place.
    pub async fn update_object(&mut self, object: DomainObject) -> JobHandle {
        let key = object.key();
        let mut items = generate(std::slice::from_ref(&object), &self.context);
        self.size(&mut items).await;

        let old = self.visible_ids();
        self.store.update_payload(&key, items);
        self.enqueue_diff(&old)
    }

    /// Replace the primary filter.
    pub fn set_filter(&mut self, filter: Option<ItemFilter>) -> JobHandle {
        let old = self.visible_ids();
        self.store.set_filter(filter);
        self.enqueue_diff(&old)
    }

    /// Replace the secondary filter.
    pub fn set_secondary_filter(&mut self, filter: Option<ItemFilter>) -> JobHandle {
        let old = self.visible_ids();
        self.store.set_secondary_filter(filter);
        self.enqueue_diff(&old)
    }

    /// Toggle collapse on the post at a visible index.
    ///
    /// Returns the new state and the job redrawing the surface, or `None` if
    /// the item is not part of a post.
    pub fn toggle_collapsed(&mut self, at_visible: usize) -> Option<(InteractionState, JobHandle)> {
        let state = self.store.toggle_collapsed(at_visible)?;
        Some((state, self.enqueue_reload()))
    }

    /// Re-measure for a new content width and redraw.
    pub async fn resize(&mut self, width: f64) -> (SizingReport, JobHandle) {
        self.width = width;
        let columns = self.column_count().get();
        let report = self
            .coordinator
            .calculate(&mut self.store.master_items_mut(), width, columns)
            .await;
        info!(width, columns, measured = report.measured, "Resized feed");
        (report, self.enqueue_reload())
    }

    /// Layout of the visible projection, computed on first use after a change.
    pub fn layout(&self) -> &WaterfallLayout {
        self.layout.get_or_init(|| {
            let items = self.store.snapshot();
            let layout = self
                .engine
                .layout(items.as_slice(), self.width, self.column_count());
            debug!(
                items = layout.placements.len(),
                content_height = layout.content_height,
                "Layout pass"
            );
            layout
        })
    }

    /// Visible ids of the items intersecting a viewport.
    pub fn items_in(&self, viewport: &Frame) -> Vec<ItemId> {
        let ids = self.store.visible_ids();
        self.layout()
            .items_in(viewport)
            .into_iter()
            .filter_map(|index| ids.get(index).copied())
            .collect()
    }

    /// Drain the queue and hand back the surface.
    pub async fn shutdown(self) -> Result<S, JobError> {
        info!(kind = %self.context.kind(), "Feed pipeline shutting down");
        self.queue.shutdown().await
    }

    async fn size(&self, items: &mut [VisualItem]) -> SizingReport {
        let columns = self.column_count().get();
        self.coordinator.calculate(items, self.width, columns).await
    }

    fn visible_ids(&self) -> Vec<ItemId> {
        self.store.visible_ids().to_vec()
    }

    fn remove_loading_markers(&mut self) {
        let markers: Vec<usize> = self
            .store
            .visible_items()
            .enumerate()
            .filter(|(_, item)| item.always_show() && item.placeholder_type().is_some())
            .map(|(index, _)| index)
            .collect();
        if !markers.is_empty() {
            self.store.remove(&markers);
        }
    }

    // Every store mutation ends in one of the two enqueue helpers below.
    fn enqueue_diff(&mut self, old: &[ItemId]) -> JobHandle {
        self.layout.take();
        let diff = ItemStore::diff(old, self.store.visible_ids());
        debug!(
            removals = diff.removals().len(),
            insertions = diff.insertions().len(),
            moves = diff.moves().len(),
            "Enqueuing diff"
        );
        self.queue
            .enqueue(MutationJob::apply_diff(self.store.snapshot(), diff))
    }

    fn enqueue_reload(&mut self) -> JobHandle {
        self.layout.take();
        self.queue.enqueue(MutationJob::reload(self.store.snapshot()))
    }
}

/// Surface that records what it was asked to draw, for the driver binary
/// and tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    items: Vec<VisualItem>,
    reloads: usize,
    diffs: Vec<Diff>,
}

impl HeadlessSurface {
    /// Authoritative list from the last applied job.
    pub fn items(&self) -> &[VisualItem] {
        &self.items
    }

    /// Number of full redraws.
    pub fn reloads(&self) -> usize {
        self.reloads
    }

    /// Every animated change, in application order.
    pub fn diffs(&self) -> &[Diff] {
        &self.diffs
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_items(&mut self, items: Vec<VisualItem>) {
        self.items = items;
    }

    fn reload(&mut self) -> Result<(), JobError> {
        self.reloads += 1;
        Ok(())
    }

    fn apply_diff(&mut self, diff: &Diff) -> Result<(), JobError> {
        self.diffs.push(diff.clone());
        Ok(())
    }
}
