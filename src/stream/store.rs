//! ItemStore - master item list and its filtered visible projection.
//!
//! # Indices
//!
//! Every index accepted or returned by this type is a position in the
//! *visible projection*. With filters active the projection and the master
//! list disagree on positions, so anchored mutations translate a visible
//! index to a master index explicitly: take the id at the visible position,
//! then look that id up in the master list. No visible→master mapping is
//! cached across mutations: the id→master-position index is rebuilt with
//! the projection, and direct access to the master list goes through
//! [`MasterItemsMut`], which rebuilds both when released.
//!
//! # Projection
//!
//! After every mutating operation the projection is re-derived:
//!
//! ```text
//! visible = master.filter(|item| item.always_show() || (primary(item) && secondary(item)))
//! ```
//!
//! # Ownership
//!
//! The store has no internal locking. It is owned by one feed and mutated
//! from one logical task; concurrent work (sizing, fetching) hands its
//! results back to the owner.

use super::diff::Diff;
use super::item::{InteractionState, ItemId, Payload, PlaceholderType, VisualItem};
use crate::model::{ObjectKey, PostId};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut, Range};
use tracing::debug;

/// Predicate deciding whether an item is visible.
pub type ItemFilter = Box<dyn Fn(&VisualItem) -> bool + Send>;

/// Master list plus visible projection of one feed.
#[derive(Default)]
pub struct ItemStore {
    master: Vec<VisualItem>,
    /// Ids of visible items, in master order.
    visible: Vec<ItemId>,
    /// Master position of every item, rebuilt with the projection.
    positions: HashMap<ItemId, usize>,
    primary_filter: Option<ItemFilter>,
    secondary_filter: Option<ItemFilter>,
}

impl std::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStore")
            .field("master_len", &self.master.len())
            .field("visible_len", &self.visible.len())
            .field("primary_filter", &self.primary_filter.is_some())
            .field("secondary_filter", &self.secondary_filter.is_some())
            .finish()
    }
}

/// Mutable view of an [`ItemStore`]'s master list.
///
/// Dereferences to the master slice. Dropping it re-derives the visible
/// projection.
pub struct MasterItemsMut<'a> {
    store: &'a mut ItemStore,
}

impl Deref for MasterItemsMut<'_> {
    type Target = [VisualItem];

    fn deref(&self) -> &Self::Target {
        &self.store.master
    }
}

impl DerefMut for MasterItemsMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store.master
    }
}

impl Drop for MasterItemsMut<'_> {
    fn drop(&mut self) {
        self.store.recompute();
    }
}

impl ItemStore {
    /// Empty store with no filters.
    pub fn new() -> Self {
        Self::default()
    }

    // === Queries ===

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    /// No visible items (the master list may still hold filtered ones).
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Number of items including filtered-out ones.
    pub fn master_len(&self) -> usize {
        self.master.len()
    }

    /// Ids of the visible projection, in order.
    pub fn visible_ids(&self) -> &[ItemId] {
        &self.visible
    }

    /// Visible item at a visible index.
    pub fn visible_item(&self, index: usize) -> Option<&VisualItem> {
        let id = self.visible.get(index)?;
        self.item(*id)
    }

    /// Visible items, in order.
    pub fn visible_items(&self) -> impl Iterator<Item = &VisualItem> + '_ {
        self.visible.iter().filter_map(|id| self.item(*id))
    }

    /// Master list, including filtered-out items.
    pub fn master_items(&self) -> &[VisualItem] {
        &self.master
    }

    /// Mutable access to the master list, for in-place size updates.
    ///
    /// The projection and position index are rebuilt when the returned
    /// guard drops, so reordering through it cannot leave lookups stale.
    pub fn master_items_mut(&mut self) -> MasterItemsMut<'_> {
        MasterItemsMut { store: self }
    }

    /// Clones of the visible items, handed to the mutation queue.
    pub fn snapshot(&self) -> Vec<VisualItem> {
        self.visible_items().cloned().collect()
    }

    /// Item by identity, visible or not.
    pub fn item(&self, id: ItemId) -> Option<&VisualItem> {
        self.positions.get(&id).and_then(|&i| self.master.get(i))
    }

    /// Mutable item by identity. Filter-relevant changes need a re-filter.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut VisualItem> {
        let index = self.master_index_of(id)?;
        self.master.get_mut(index)
    }

    /// Visible index of an item, if it is visible.
    pub fn visible_index_of(&self, id: ItemId) -> Option<usize> {
        self.visible.iter().position(|visible| *visible == id)
    }

    /// Visible indices of every item derived from the given object.
    pub fn visible_indices_for(&self, key: &ObjectKey) -> Vec<usize> {
        self.visible_items()
            .enumerate()
            .filter(|(_, item)| item.belongs_to(key))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether any master item still belongs to the placeholder region.
    pub fn has_placeholder_items(&self, placeholder: PlaceholderType) -> bool {
        self.master
            .iter()
            .any(|item| item.placeholder_type() == Some(placeholder))
    }

    /// Visible index range spanned by a placeholder region.
    pub fn placeholder_range(&self, placeholder: PlaceholderType) -> Option<Range<usize>> {
        let mut indices = self
            .visible_items()
            .enumerate()
            .filter(|(_, item)| item.placeholder_type() == Some(placeholder))
            .map(|(i, _)| i);
        let start = indices.next()?;
        let end = indices.last().unwrap_or(start);
        Some(start..end + 1)
    }

    /// Visible index of the footer of the given post.
    pub fn footer_index_for_post(&self, post_id: &PostId) -> Option<usize> {
        let key = ObjectKey::Post(post_id.clone());
        self.visible_items()
            .position(|item| item.belongs_to(&key) && item.visual_type().is_footer())
    }

    // === Anchored mutations ===

    /// Append items to the end of the master list.
    pub fn append(&mut self, items: Vec<VisualItem>) {
        debug!(count = items.len(), "Appending items");
        self.master.extend(items);
        self.recompute();
    }

    /// Insert items before the item currently at a visible index.
    ///
    /// The anchor is the item at `at_visible`; its master position is found
    /// by identity. An anchor past the end of the projection appends.
    pub fn insert(&mut self, items: Vec<VisualItem>, at_visible: usize) {
        match self.anchor_master_index(at_visible) {
            Some(master_index) => {
                debug!(count = items.len(), at_visible, master_index, "Inserting items");
                self.master.splice(master_index..master_index, items);
                self.recompute();
            }
            None => self.append(items),
        }
    }

    /// Replace the items at the given visible indices with `items`.
    ///
    /// The new items go where the first replaced item was. Out-of-range
    /// indices are ignored; if none are in range the items are appended.
    pub fn replace(&mut self, at_visible: &[usize], items: Vec<VisualItem>) {
        let targets = self.resolve_visible(at_visible);
        let Some(first) = targets.first().copied() else {
            self.append(items);
            return;
        };
        // Lowest visible index is also the lowest master index, so the
        // anchor position is unaffected by removing the other targets.
        let Some(anchor) = self.master_index_of(first) else {
            self.append(items);
            return;
        };
        debug!(replaced = targets.len(), count = items.len(), "Replacing items");
        self.master.retain(|item| !targets.contains(&item.id()));
        self.master.splice(anchor..anchor, items);
        self.recompute();
    }

    /// Remove the items at the given visible indices, returning them in master order.
    pub fn remove(&mut self, at_visible: &[usize]) -> Vec<VisualItem> {
        let targets = self.resolve_visible(at_visible);
        self.remove_where(|item| targets.contains(&item.id()))
    }

    /// Remove every item derived from the given object.
    pub fn remove_items_for(&mut self, key: &ObjectKey) -> Vec<VisualItem> {
        self.remove_where(|item| item.belongs_to(key))
    }

    /// Replace every item derived from the given object with freshly generated items.
    ///
    /// The new items take the master position of the first old item, or are
    /// appended when the object had no items.
    pub fn update_payload(&mut self, key: &ObjectKey, items: Vec<VisualItem>) {
        let anchor = self.master.iter().position(|item| item.belongs_to(key));
        self.master.retain(|item| !item.belongs_to(key));
        match anchor {
            Some(index) => {
                self.master.splice(index..index, items);
            }
            None => self.master.extend(items),
        }
        debug!(%key, "Updated items for payload");
        self.recompute();
    }

    /// Swap the content of one item in place, keeping its identity.
    ///
    /// Cached sizes are invalidated. Returns `false` if the item is unknown.
    pub fn replace_content(
        &mut self,
        id: ItemId,
        payload: Payload,
        visual_type: super::item::VisualType,
    ) -> bool {
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        item.replace_content(payload, visual_type);
        self.recompute();
        true
    }

    /// Fill a placeholder region.
    ///
    /// Removes every master item tagged with `placeholder` and inserts
    /// `items` where the first of them was (appending if the region was
    /// absent). Tags on the new items are left as given: only items the
    /// caller tagged remain part of the region.
    pub fn replace_placeholder(&mut self, placeholder: PlaceholderType, items: Vec<VisualItem>) {
        let anchor = self
            .master
            .iter()
            .position(|item| item.placeholder_type() == Some(placeholder));
        self.master
            .retain(|item| item.placeholder_type() != Some(placeholder));
        debug!(?placeholder, count = items.len(), ?anchor, "Filling placeholder");
        match anchor {
            Some(index) => {
                self.master.splice(index..index, items);
            }
            None => self.master.extend(items),
        }
        self.recompute();
    }

    /// Toggle collapse on the post at a visible index.
    ///
    /// Every master item of that post, except its footers, takes the toggled
    /// state of the item at `at_visible`. Returns the new state, or `None` if
    /// the index is out of range or the item is not part of a post.
    pub fn toggle_collapsed(&mut self, at_visible: usize) -> Option<InteractionState> {
        let item = self.visible_item(at_visible)?;
        let post = item.payload().post()?;
        let key = ObjectKey::Post(post.id.clone());
        let new_state = item.state().toggled();

        for item in self
            .master
            .iter_mut()
            .filter(|item| item.belongs_to(&key) && !item.visual_type().is_footer())
        {
            item.set_state(new_state);
        }
        debug!(%key, ?new_state, "Toggled collapse");
        self.recompute();
        Some(new_state)
    }

    /// Mark a post's comment section open or closed on its footer.
    ///
    /// Returns `false` if the post has no footer in the master list.
    pub fn set_comments_open(&mut self, post_id: &PostId, open: bool) -> bool {
        let key = ObjectKey::Post(post_id.clone());
        let state = if open {
            InteractionState::Expanded
        } else {
            InteractionState::None
        };
        let Some(footer) = self
            .master
            .iter_mut()
            .find(|item| item.belongs_to(&key) && item.visual_type().is_footer())
        else {
            return false;
        };
        footer.set_state(state);
        self.recompute();
        true
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.master.clear();
        self.recompute();
    }

    // === Filters ===

    /// Replace the primary filter and recompute the projection.
    pub fn set_filter(&mut self, filter: Option<ItemFilter>) {
        self.primary_filter = filter;
        self.recompute();
    }

    /// Replace the secondary filter and recompute the projection.
    pub fn set_secondary_filter(&mut self, filter: Option<ItemFilter>) {
        self.secondary_filter = filter;
        self.recompute();
    }

    /// Whether either filter is set.
    pub fn has_filters(&self) -> bool {
        self.primary_filter.is_some() || self.secondary_filter.is_some()
    }

    /// Run `block` with both filters cleared, then restore them.
    ///
    /// Inside the block the projection equals the master list, so visible
    /// indices are master indices. Filters are restored and the projection
    /// recomputed on every exit path, including unwinding.
    pub fn temporarily_unfiltered<R>(&mut self, block: impl FnOnce(&mut ItemStore) -> R) -> R {
        let primary = self.primary_filter.take();
        let secondary = self.secondary_filter.take();
        self.recompute();

        let mut store = scopeguard::guard(self, move |store| {
            store.primary_filter = primary;
            store.secondary_filter = secondary;
            store.recompute();
        });
        block(&mut **store)
    }

    // === Diffing ===

    /// Diff two projections by identity.
    pub fn diff(old: &[ItemId], new: &[ItemId]) -> Diff {
        Diff::between(old, new)
    }

    // === Internals ===

    fn passes_filters(&self, item: &VisualItem) -> bool {
        if item.always_show() {
            return true;
        }
        let primary = self.primary_filter.as_ref().map_or(true, |f| f(item));
        let secondary = self.secondary_filter.as_ref().map_or(true, |f| f(item));
        primary && secondary
    }

    fn recompute(&mut self) {
        let visible: Vec<ItemId> = self
            .master
            .iter()
            .filter(|item| self.passes_filters(item))
            .map(VisualItem::id)
            .collect();
        self.positions = self
            .master
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id(), i))
            .collect();
        self.visible = visible;
    }

    /// Master index of an item, by identity.
    fn master_index_of(&self, id: ItemId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Master index of the item currently at a visible index.
    fn anchor_master_index(&self, at_visible: usize) -> Option<usize> {
        let id = self.visible.get(at_visible)?;
        self.master_index_of(*id)
    }

    /// Ids at the given visible indices, ordered by visible index, deduplicated.
    fn resolve_visible(&self, at_visible: &[usize]) -> Vec<ItemId> {
        let mut indices: Vec<usize> = at_visible
            .iter()
            .copied()
            .filter(|&i| i < self.visible.len())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| self.visible[i]).collect()
    }

    fn remove_where(&mut self, mut predicate: impl FnMut(&VisualItem) -> bool) -> Vec<VisualItem> {
        let (removed, kept): (Vec<VisualItem>, Vec<VisualItem>) =
            std::mem::take(&mut self.master)
                .into_iter()
                .partition(|item| predicate(item));
        self.master = kept;
        debug!(count = removed.len(), "Removed items");
        self.recompute();
        removed
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
