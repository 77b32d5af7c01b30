// ABOUTME: Merging a whole layout into another one.
// ABOUTME: The source's anchors and items are re-parented into a slot opened like a regular drop.

use std::collections::HashMap;

use dock_core::{Location, Orientation, Side, Size};

use crate::anchor::AnchorId;
use crate::group::AnchorGroup;
use crate::item::{Content, ItemId};
use crate::layout::Layout;
use crate::LayoutError;

impl<C: Content> Layout<C> {
    /// Drops every item of `source` into this layout at `location`, keeping
    /// the source's arrangement scaled into the slot it gets.
    ///
    /// Returns the new id of every source item.
    pub fn merge_layout(
        &mut self,
        source: Layout<C>,
        location: Location,
        relative_to: Option<ItemId>,
    ) -> Result<HashMap<ItemId, ItemId>, LayoutError> {
        if source.is_empty() {
            return Err(LayoutError::EmptySource);
        }
        let frame = 2 * source.config.static_anchor_thickness;
        let inner = |size: Size| Size::new((size.width - frame).max(0), (size.height - frame).max(0));
        let min = inner(source.minimum_size());
        let preferred = inner(source.contents_size);

        let plan = self
            .plan_drop(min, preferred, location, relative_to)
            .inspect_err(|e| tracing::debug!("Rejected merge {}: {}", location.label(), e))?;
        let slot = self.open_slot(&plan);
        let mapping = self.splice_layout(slot, source);
        self.settle(&[]);

        tracing::debug!("Merged {} items {}", mapping.len(), location.label());
        self.after_mutation();
        Ok(mapping)
    }

    /// Moves the source's dividers and items into `slot`. The slot's anchors
    /// take over the items bordering the source's static anchors.
    fn splice_layout(&mut self, slot: AnchorGroup, source: Layout<C>) -> HashMap<ItemId, ItemId> {
        let Layout {
            anchors: source_anchors,
            items: source_items,
            static_group: source_statics,
            ..
        } = source;

        let mut anchor_map: HashMap<AnchorId, AnchorId> = HashMap::new();
        for location in Location::ALL {
            anchor_map.insert(source_statics.anchor(location), slot.anchor(location));
        }

        let extent = |orientation: Orientation| {
            let (lo, hi) = source_statics.pair(orientation);
            let (slot_lo, slot_hi) = slot.pair(orientation);
            (
                source_anchors[lo].position(),
                source_anchors[hi].position(),
                self.position(slot_lo),
                self.position(slot_hi),
            )
        };
        let vertical = extent(Orientation::Vertical);
        let horizontal = extent(Orientation::Horizontal);

        let mut dividers: Vec<AnchorId> = source_anchors
            .iter()
            .filter(|(_, a)| !a.is_static())
            .map(|(id, _)| id)
            .collect();
        dividers.sort_by_key(|&id| source_anchors[id].serial());

        for &id in &dividers {
            let anchor = &source_anchors[id];
            let (from_lo, from_hi, to_lo, to_hi) = match anchor.orientation() {
                Orientation::Vertical => vertical,
                Orientation::Horizontal => horizontal,
            };
            let span = from_hi - from_lo;
            let ratio = if span > 0 {
                f64::from(anchor.position() - from_lo) / f64::from(span)
            } else {
                0.0
            };
            let position = to_lo + (f64::from(to_hi - to_lo) * ratio) as i32;
            let new_id = self.insert_anchor(anchor.orientation(), position, false);
            anchor_map.insert(id, new_id);
        }

        for &id in &dividers {
            let anchor = &source_anchors[id];
            let new_id = anchor_map[&id];
            if let Some(&from) = anchor.from().and_then(|f| anchor_map.get(&f)) {
                self.anchors[new_id].set_from(from);
            }
            if let Some(&to) = anchor.to().and_then(|t| anchor_map.get(&t)) {
                self.anchors[new_id].set_to(to);
            }
            let followee = anchor.followee().and_then(|f| anchor_map.get(&f).copied());
            self.anchors[new_id].set_followee(followee);
        }

        let mut items: Vec<(ItemId, _)> = source_items.into_iter().collect();
        items.sort_by_key(|(_, item)| item.serial());
        let mut item_map = HashMap::new();
        for (old_id, mut item) in items {
            let group = *item.anchor_group();
            let remap = |anchor: AnchorId| anchor_map.get(&anchor).copied().unwrap_or(anchor);
            *item.anchor_group_mut() = AnchorGroup::new(
                remap(group.left),
                remap(group.top),
                remap(group.right),
                remap(group.bottom),
            );
            let serial = self.next_serial();
            item.set_serial(serial);
            item_map.insert(old_id, self.items.insert(item));
        }

        for (old_id, anchor) in &source_anchors {
            let new_id = anchor_map[&old_id];
            for side in [Side::Side1, Side::Side2] {
                let moved: Vec<ItemId> = anchor
                    .items(side)
                    .iter()
                    .filter_map(|i| item_map.get(i).copied())
                    .collect();
                self.anchors[new_id].add_items(&moved, side);
            }
        }

        item_map
    }
}
