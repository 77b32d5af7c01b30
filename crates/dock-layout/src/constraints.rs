// ABOUTME: Minimum-length bookkeeping for anchors and items.
// ABOUTME: Cumulative minimum lengths, anchor position bounds and the push pass that restores minimums.

use std::collections::HashMap;

use dock_core::{Orientation, Side, Size};

use crate::anchor::AnchorId;
use crate::item::{Content, ItemId};
use crate::layout::Layout;

/// Memo of cumulative minimum lengths, `None` marks a computation in progress.
pub(crate) type Memo = HashMap<ItemId, Option<i32>>;

impl<C: Content> Layout<C> {
    /// Anchors whose follow chain ends at `root`, `root` first, then by creation.
    pub(crate) fn class_members(&self, root: AnchorId) -> Vec<AnchorId> {
        let mut members: Vec<AnchorId> = self
            .anchors
            .keys()
            .filter(|&id| id != root && self.root(id) == root)
            .collect();
        members.sort_by_key(|&id| self.anchors[id].serial());
        members.insert(0, root);
        members
    }

    /// Items on `side` of any anchor of the class rooted at `root`.
    pub(crate) fn class_items(&self, root: AnchorId, side: Side) -> Vec<ItemId> {
        let mut items = Vec::new();
        for member in self.class_members(root) {
            for &item in self.anchors[member].items(side) {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        items
    }

    pub(crate) fn class_visible_items(&self, root: AnchorId, side: Side) -> Vec<ItemId> {
        self.class_items(root, side)
            .into_iter()
            .filter(|&item| self.items.get(item).is_some_and(|i| i.is_visible()))
            .collect()
    }

    /// Shortest distance an item and everything stacked beyond it on `side`
    /// can be squeezed into, measured from the item's far edge to the static
    /// anchor on that side.
    ///
    /// On `Side1` the distance includes the item's low anchor. On `Side2` it
    /// includes the item's high anchor unless that anchor is static.
    pub fn cumulative_min_length(&self, item: ItemId, side: Side, orientation: Orientation) -> i32 {
        self.cumulative_min_length_memo(item, side, orientation, &mut Memo::new())
    }

    pub(crate) fn cumulative_min_length_memo(
        &self,
        item: ItemId,
        side: Side,
        orientation: Orientation,
        memo: &mut Memo,
    ) -> i32 {
        let min = self.item_min_length(item, orientation);
        match memo.get(&item) {
            Some(Some(value)) => return *value,
            Some(None) => return min,
            None => {}
        }
        memo.insert(item, None);

        let Some(group) = self.items.get(item).map(|i| *i.anchor_group()) else {
            return 0;
        };
        let (lo, hi) = group.pair(orientation);
        let value = match side {
            Side::Side1 => {
                let root = self.root(lo);
                let beyond = if self.anchors[root].is_static() {
                    0
                } else {
                    self.reach(root, Side::Side1, orientation, memo)
                        .unwrap_or(self.config.static_anchor_thickness)
                };
                min + self.thickness(lo) + beyond
            }
            Side::Side2 => {
                let root = self.root(hi);
                if self.anchors[root].is_static() {
                    min
                } else {
                    min + self.thickness(hi)
                        + self.reach(root, Side::Side2, orientation, memo).unwrap_or(0)
                }
            }
        };
        memo.insert(item, Some(value));
        value
    }

    /// Largest cumulative minimum length among the visible items on `side`
    /// of the class, or `None` when that side has no visible item.
    fn reach(&self, root: AnchorId, side: Side, orientation: Orientation, memo: &mut Memo) -> Option<i32> {
        self.class_visible_items(root, side)
            .into_iter()
            .map(|item| self.cumulative_min_length_memo(item, side, orientation, memo))
            .max()
    }

    /// Lowest position the anchor's class can take without squeezing any
    /// visible item below its minimum. Static anchors cannot move.
    pub fn min_position(&self, anchor: AnchorId) -> i32 {
        let root = self.root(anchor);
        let a = &self.anchors[root];
        if a.is_static() {
            return a.position();
        }
        let orientation = a.orientation();
        let (lo, _) = self.static_pair(orientation);
        let reach = self
            .reach(root, Side::Side1, orientation, &mut Memo::new())
            .unwrap_or(self.config.static_anchor_thickness);
        self.anchors[lo].position() + reach
    }

    /// Highest position the anchor's class can take. Static anchors cannot move.
    pub fn max_position(&self, anchor: AnchorId) -> i32 {
        let root = self.root(anchor);
        let a = &self.anchors[root];
        if a.is_static() {
            return a.position();
        }
        let orientation = a.orientation();
        let (_, hi) = self.static_pair(orientation);
        let reach = self
            .reach(root, Side::Side2, orientation, &mut Memo::new())
            .unwrap_or(0);
        self.anchors[hi].position() - self.thickness(root) - reach
    }

    /// Smallest canvas that fits every visible item at its minimum.
    pub fn minimum_size(&self) -> Size {
        let static_thickness = self.config.static_anchor_thickness;
        let mut size = Size::default();
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let (lo, _) = self.static_pair(orientation);
            let reach = self
                .reach(lo, Side::Side2, orientation, &mut Memo::new())
                .unwrap_or(0);
            size.set_length(orientation, 2 * static_thickness + reach);
        }
        size
    }

    /// Pushes dividers of `orientation` apart until every visible item is at
    /// least its minimum length, where the canvas allows it.
    ///
    /// An ascending pass raises anchors squeezing items on their low side, a
    /// descending pass lowers anchors squeezing items on their high side.
    /// Anchors can overtake each other while being pushed, so both passes
    /// repeat in fresh position order until nothing moves.
    pub(crate) fn enforce_min_lengths(&mut self, orientation: Orientation) {
        let mut roots: Vec<AnchorId> = self
            .anchors
            .iter()
            .filter(|(_, a)| a.orientation() == orientation && !a.is_static() && !a.is_following())
            .map(|(id, _)| id)
            .collect();

        for _ in 0..=2 * roots.len() + 1 {
            roots.sort_by_key(|&id| (self.anchors[id].position(), self.anchors[id].serial()));
            let raised = roots.iter().filter(|&&root| self.raise_to_floor(root, orientation)).count();
            let lowered = roots
                .iter()
                .rev()
                .filter(|&&root| self.lower_to_ceiling(root, orientation))
                .count();
            if raised + lowered == 0 {
                return;
            }
        }
        tracing::warn!("Minimum lengths across {:?} anchors did not settle", orientation);
    }

    fn raise_to_floor(&mut self, root: AnchorId, orientation: Orientation) -> bool {
        let floor = self
            .class_visible_items(root, Side::Side1)
            .into_iter()
            .map(|item| {
                let (lo, _) = self.items[item].anchor_group().pair(orientation);
                self.position(lo) + self.thickness(lo) + self.item_min_length(item, orientation)
            })
            .max();
        match floor {
            Some(floor) if self.anchors[root].position() < floor => {
                tracing::trace!("Pushing anchor #{} up to {}", self.anchors[root].serial(), floor);
                self.anchors[root].set_position(floor);
                true
            }
            _ => false,
        }
    }

    fn lower_to_ceiling(&mut self, root: AnchorId, orientation: Orientation) -> bool {
        let ceiling = self
            .class_visible_items(root, Side::Side2)
            .into_iter()
            .map(|item| {
                let (_, hi) = self.items[item].anchor_group().pair(orientation);
                self.position(hi) - self.item_min_length(item, orientation)
            })
            .min()
            .map(|ceiling| ceiling - self.thickness(root));
        match ceiling {
            Some(ceiling) if self.anchors[root].position() > ceiling => {
                tracing::trace!("Pushing anchor #{} down to {}", self.anchors[root].serial(), ceiling);
                self.anchors[root].set_position(ceiling);
                true
            }
            _ => false,
        }
    }
}
