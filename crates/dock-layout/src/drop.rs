// ABOUTME: Planning where dropped content lands.
// ABOUTME: Computes the space each side of a drop can give and opens the slot for the new item.

use std::collections::HashMap;

use dock_core::{Location, Orientation, Rect, Side, Size};

use crate::group::AnchorGroup;
use crate::item::{Content, ItemId};
use crate::layout::Layout;
use crate::LayoutError;

/// Space a drop can take from each side of the divider it creates.
///
/// `side1` comes from the items at lower coordinates, `side2` from those at
/// higher coordinates. The divider's own thickness is already deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvailableLength {
    pub side1: i32,
    pub side2: i32,
}

impl AvailableLength {
    pub fn new(side1: i32, side2: i32) -> Self {
        Self { side1, side2 }
    }

    pub fn total(&self) -> i32 {
        self.side1 + self.side2
    }

    /// Deducts a divider of `thickness`, from `side2` first.
    fn after_divider(side1: i32, side2: i32, thickness: i32) -> Self {
        let from2 = thickness.min(side2);
        let from1 = thickness - from2;
        Self::new((side1 - from1).max(0), side2 - from2)
    }
}

/// Resolved drop: the new item's length and how much each side gives up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DropPlan {
    pub location: Location,
    pub relative_to: Option<ItemId>,
    pub length: i32,
    pub take1: i32,
    pub take2: i32,
    pub rect: Rect,
}

impl<C: Content> Layout<C> {
    /// How much space a drop at `location` could take from each side, after
    /// reserving the new divider. `relative_to` nests the drop next to one
    /// visible item; `None` drops along the whole edge of the layout.
    pub fn available_length_for_drop(
        &self,
        location: Location,
        relative_to: Option<ItemId>,
    ) -> Result<AvailableLength, LayoutError> {
        let (side1, side2, _) = self.raw_drop_space(location, relative_to)?;
        Ok(AvailableLength::after_divider(side1, side2, self.divider_for_drop()))
    }

    /// Rectangle content of the given hints would occupy if dropped now.
    pub fn rect_for_drop(
        &self,
        min_size: Size,
        preferred_size: Size,
        location: Location,
        relative_to: Option<ItemId>,
    ) -> Result<Rect, LayoutError> {
        let min = self.config.item_floor.expanded_to(min_size);
        self.plan_drop(min, preferred_size, location, relative_to)
            .map(|plan| plan.rect)
    }

    fn divider_for_drop(&self) -> i32 {
        if self.visible_count() > 0 {
            self.config.anchor_thickness
        } else {
            0
        }
    }

    fn drop_target(&self, relative_to: Option<ItemId>) -> Result<AnchorGroup, LayoutError> {
        match relative_to {
            Some(item) => self.visible_item(item).map(|i| *i.anchor_group()),
            None => Ok(self.static_group),
        }
    }

    /// Space each side could give before any divider is reserved.
    fn raw_drop_space(
        &self,
        location: Location,
        relative_to: Option<ItemId>,
    ) -> Result<(i32, i32, AnchorGroup), LayoutError> {
        let target = self.drop_target(relative_to)?;
        let orientation = location.orientation();
        let other = target.anchor(location);
        let root = self.root(other);
        let is_static = self.anchors[root].is_static();
        let (lo_static, hi_static) = self.static_pair(orientation);

        let moving: Vec<ItemId> = match relative_to {
            Some(item) => vec![item],
            None => self.class_visible_items(root, location.item_side()),
        };

        let (side1, side2) = if location.is_low_edge() {
            let start = self.position(other) + self.thickness(other);
            let side1 = if is_static {
                0
            } else {
                self.position(other) - self.min_position(other)
            };
            let reach = self.reach_of(&moving, Side::Side2, orientation).unwrap_or(0);
            (side1, self.position(hi_static) - reach - start)
        } else {
            let end = self.position(other);
            let side2 = if is_static {
                0
            } else {
                self.max_position(other) - end
            };
            let reach = self
                .reach_of(&moving, Side::Side1, orientation)
                .unwrap_or(self.config.static_anchor_thickness);
            (end - self.position(lo_static) - reach, side2)
        };

        Ok((side1.max(0), side2.max(0), target))
    }

    fn reach_of(&self, items: &[ItemId], side: Side, orientation: Orientation) -> Option<i32> {
        let mut memo = HashMap::new();
        items
            .iter()
            .map(|&item| self.cumulative_min_length_memo(item, side, orientation, &mut memo))
            .max()
    }

    pub(crate) fn plan_drop(
        &self,
        min: Size,
        preferred: Size,
        location: Location,
        relative_to: Option<ItemId>,
    ) -> Result<DropPlan, LayoutError> {
        let (raw1, raw2, target) = self.raw_drop_space(location, relative_to)?;
        let divider = self.divider_for_drop();
        let available = AvailableLength::after_divider(raw1, raw2, divider);
        let orientation = location.orientation();

        let min_length = min.length(orientation);
        let total = available.total();
        if total < min_length {
            return Err(LayoutError::InsufficientSpace {
                needed: min_length,
                available: total,
            });
        }
        let preferred_length = preferred.length(orientation);
        let length = if preferred_length > 0 {
            preferred_length
        } else {
            (total as f32 * self.config.default_drop_fraction) as i32
        }
        .clamp(min_length, total);
        let (take1, take2) = self
            .config
            .insertion_split
            .split(length + divider, raw1, raw2);

        let other = target.anchor(location);
        let start = if location.is_low_edge() {
            self.position(other) - take1 + self.thickness(other)
        } else {
            self.position(other) + take2 - length
        };
        let (cross_lo, cross_hi) = target.pair(orientation.other());
        let cross_start = self.position(cross_lo) + self.thickness(cross_lo);
        let cross_length = self.position(cross_hi) - cross_start;
        let cross_min = min.length(orientation.other());
        if cross_length < cross_min {
            return Err(LayoutError::InsufficientSpace {
                needed: cross_min,
                available: cross_length,
            });
        }
        let rect = match orientation {
            Orientation::Vertical => Rect::new(start, cross_start, length, cross_length),
            Orientation::Horizontal => Rect::new(cross_start, start, cross_length, length),
        };

        Ok(DropPlan {
            location,
            relative_to,
            length,
            take1,
            take2,
            rect,
        })
    }

    /// Makes room for a planned drop and returns the group bounding it.
    ///
    /// An empty layout hands out the static group. Otherwise a divider is
    /// created parallel to the drop edge and the neighbours are moved by the
    /// amounts the plan takes from each side.
    pub(crate) fn open_slot(&mut self, plan: &DropPlan) -> AnchorGroup {
        if self.items.is_empty() {
            return self.static_group;
        }
        let target = match plan.relative_to {
            Some(item) => *self.items[item].anchor_group(),
            None => self.static_group,
        };
        let location = plan.location;
        let other = target.anchor(location);
        let divider = self.create_anchor_from(&target, location, plan.relative_to);
        let root = self.root(other);

        let position = if location.is_low_edge() {
            if plan.take1 > 0 {
                let moved = self.anchors[root].position() - plan.take1;
                self.anchors[root].set_position(moved);
            }
            self.position(other) + self.thickness(other) + plan.length
        } else {
            if plan.take2 > 0 {
                let moved = self.anchors[root].position() + plan.take2;
                self.anchors[root].set_position(moved);
            }
            self.position(other) - plan.length - self.thickness(divider)
        };
        self.anchors[divider].set_position(position);

        let mut slot = target;
        slot.set_anchor(divider, location.opposite());
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Panel;

    fn layout() -> Layout<Panel> {
        Layout::with_size(Size::new(500, 500))
    }

    fn panel(key: &str) -> Panel {
        Panel::new(key, Size::new(100, 100))
    }

    #[test]
    fn divider_thickness_comes_from_side2_first() {
        assert_eq!(AvailableLength::after_divider(10, 178, 5), AvailableLength::new(10, 173));
        assert_eq!(AvailableLength::after_divider(188, 0, 5), AvailableLength::new(183, 0));
        assert_eq!(AvailableLength::after_divider(10, 3, 5), AvailableLength::new(8, 0));
    }

    #[test]
    fn empty_layout_offers_the_whole_canvas() {
        let layout = layout();
        for location in Location::ALL {
            let available = layout.available_length_for_drop(location, None).unwrap();
            assert_eq!(available.total(), 498);
        }
        assert_eq!(
            layout.available_length_for_drop(Location::OnLeft, None),
            Ok(AvailableLength::new(0, 498))
        );
        assert_eq!(
            layout.available_length_for_drop(Location::OnRight, None),
            Ok(AvailableLength::new(498, 0))
        );
    }

    #[test]
    fn one_item_leaves_room_for_a_divider() {
        let mut layout = layout();
        layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
        for location in Location::ALL {
            let available = layout.available_length_for_drop(location, None).unwrap();
            assert_eq!(available.total(), 393);
        }
    }

    #[test]
    fn empty_layout_drop_rects_are_flush_with_the_edge() {
        let layout = layout();
        let min = Size::new(200, 200);
        let pref = Size::new(200, 200);
        assert_eq!(
            layout.rect_for_drop(min, pref, Location::OnLeft, None),
            Ok(Rect::new(1, 1, 200, 498))
        );
        assert_eq!(
            layout.rect_for_drop(min, pref, Location::OnRight, None),
            Ok(Rect::new(299, 1, 200, 498))
        );
        assert_eq!(
            layout.rect_for_drop(min, pref, Location::OnTop, None),
            Ok(Rect::new(1, 1, 498, 200))
        );
        assert_eq!(
            layout.rect_for_drop(min, pref, Location::OnBottom, None),
            Ok(Rect::new(1, 299, 498, 200))
        );
    }

    #[test]
    fn rect_matches_the_committed_geometry() {
        let mut layout = layout();
        let w1 = layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
        for location in Location::ALL {
            for relative_to in [None, Some(w1)] {
                let content = panel("x");
                let predicted = layout
                    .rect_for_drop(content.min_size, content.preferred_size, location, relative_to)
                    .unwrap();
                let mut probe = Layout::with_size(Size::new(500, 500));
                let p1 = probe.add_item(panel("w1"), Location::OnLeft, None).unwrap();
                let x = probe
                    .add_item(content, location, relative_to.map(|_| p1))
                    .unwrap();
                assert_eq!(probe.item_geometry(x), Some(predicted), "{location:?} {relative_to:?}");
            }
        }
    }

    #[test]
    fn placeholder_cannot_be_a_drop_target() {
        let mut layout = layout();
        layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
        let w2 = layout.add_item(panel("w2"), Location::OnRight, None).unwrap();
        layout.ref_item(w2).unwrap();
        layout.hide_item(w2).unwrap();
        assert_eq!(
            layout.available_length_for_drop(Location::OnTop, Some(w2)),
            Err(LayoutError::PlaceholderItem(w2))
        );
    }
}
