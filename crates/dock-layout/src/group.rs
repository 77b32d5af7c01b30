// ABOUTME: The four anchors bounding an item, and the graph edits that bind items to them.
// ABOUTME: Covers divider creation, item registration and anchor consumption on removal.

use dock_core::{Location, Orientation, Rect, Side};

use crate::anchor::{Anchor, AnchorId};
use crate::item::{Content, ItemId};
use crate::layout::Layout;

/// Left, top, right and bottom anchors of an item (or of the whole canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorGroup {
    pub left: AnchorId,
    pub top: AnchorId,
    pub right: AnchorId,
    pub bottom: AnchorId,
}

impl AnchorGroup {
    pub fn new(left: AnchorId, top: AnchorId, right: AnchorId, bottom: AnchorId) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn anchor(&self, location: Location) -> AnchorId {
        match location {
            Location::OnLeft => self.left,
            Location::OnTop => self.top,
            Location::OnRight => self.right,
            Location::OnBottom => self.bottom,
        }
    }

    pub fn set_anchor(&mut self, anchor: AnchorId, location: Location) {
        match location {
            Location::OnLeft => self.left = anchor,
            Location::OnTop => self.top = anchor,
            Location::OnRight => self.right = anchor,
            Location::OnBottom => self.bottom = anchor,
        }
    }

    /// The anchor of `orientation` that has the item on its `side`.
    pub fn anchor_for_side(&self, side: Side, orientation: Orientation) -> AnchorId {
        self.anchor(Location::for_side(orientation, side))
    }

    /// Low and high anchors along the axis anchors of `orientation` move on.
    pub fn pair(&self, orientation: Orientation) -> (AnchorId, AnchorId) {
        match orientation {
            Orientation::Vertical => (self.left, self.right),
            Orientation::Horizontal => (self.top, self.bottom),
        }
    }

    pub fn opposite_anchor(&self, anchor: AnchorId) -> Option<AnchorId> {
        self.location_of(anchor)
            .map(|location| self.anchor(location.opposite()))
    }

    pub fn location_of(&self, anchor: AnchorId) -> Option<Location> {
        Location::ALL
            .into_iter()
            .find(|&location| self.anchor(location) == anchor)
    }

    pub fn contains(&self, anchor: AnchorId) -> bool {
        self.location_of(anchor).is_some()
    }

    /// Left, top, right, bottom.
    pub fn anchors(&self) -> [AnchorId; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// Swaps every slot holding `old` for `new`. Returns whether anything changed.
    pub fn replace_anchor(&mut self, old: AnchorId, new: AnchorId) -> bool {
        let mut changed = false;
        for location in Location::ALL {
            if self.anchor(location) == old {
                self.set_anchor(new, location);
                changed = true;
            }
        }
        changed
    }
}

impl<C: Content> Layout<C> {
    /// Distance between the effective positions of the group's vertical anchors.
    pub fn group_width(&self, group: &AnchorGroup) -> i32 {
        self.position(group.right) - self.position(group.left)
    }

    pub fn group_height(&self, group: &AnchorGroup) -> i32 {
        self.position(group.bottom) - self.position(group.top)
    }

    /// All four anchors exist, have the right orientation and are ordered.
    pub fn is_group_valid(&self, group: &AnchorGroup) -> bool {
        let oriented = |id: AnchorId, orientation: Orientation| {
            self.anchors
                .get(id)
                .is_some_and(|a| a.orientation() == orientation)
        };
        oriented(group.left, Orientation::Vertical)
            && oriented(group.right, Orientation::Vertical)
            && oriented(group.top, Orientation::Horizontal)
            && oriented(group.bottom, Orientation::Horizontal)
            && self.group_width(group) >= 0
            && self.group_height(group) >= 0
    }

    /// Interior rectangle: from the far edge of the low anchors to the high anchors.
    pub fn group_geometry(&self, group: &AnchorGroup) -> Rect {
        let x = self.position(group.left) + self.thickness(group.left);
        let y = self.position(group.top) + self.thickness(group.top);
        Rect::new(
            x,
            y,
            self.position(group.right) - x,
            self.position(group.bottom) - y,
        )
    }

    /// Creates a divider parallel to the anchor at `from_location` of `group`,
    /// spanning the group's perpendicular anchors.
    ///
    /// With `relative_to`, only that item moves from the old anchor to the new
    /// one. Without it, every item of the old anchor moves, and anchors that
    /// were following the old one now follow the new one.
    pub(crate) fn create_anchor_from(
        &mut self,
        group: &AnchorGroup,
        from_location: Location,
        relative_to: Option<ItemId>,
    ) -> AnchorId {
        let other = group.anchor(from_location);
        let orientation = from_location.orientation();
        let (from, to) = group.pair(orientation.other());
        let position = self.position(other);
        let anchor = self.insert_anchor(orientation, position, false);
        self.anchors[anchor].set_from(from);
        self.anchors[anchor].set_to(to);

        match relative_to {
            Some(item) => match self.anchors[other].remove_item(item) {
                Some(side) => {
                    self.anchors[anchor].add_item(item, side);
                    self.items[item]
                        .anchor_group_mut()
                        .replace_anchor(other, anchor);
                }
                None => debug_assert!(false, "relative item is not bounded by its own anchor"),
            },
            None => {
                let (side1, side2) = self.anchors[other].remove_all_items();
                self.anchors[anchor].add_items(&side1, Side::Side1);
                self.anchors[anchor].add_items(&side2, Side::Side2);
                for item in side1.into_iter().chain(side2) {
                    self.items[item]
                        .anchor_group_mut()
                        .replace_anchor(other, anchor);
                }
                for a in self.anchors.values_mut() {
                    if a.followee() == Some(other) {
                        a.set_followee(Some(anchor));
                    }
                }
            }
        }

        anchor
    }

    /// Registers an item with the four anchors of its group.
    pub(crate) fn bind_item(&mut self, item: ItemId) {
        let group = *self.items[item].anchor_group();
        self.anchors[group.left].add_item(item, Side::Side2);
        self.anchors[group.top].add_item(item, Side::Side2);
        self.anchors[group.right].add_item(item, Side::Side1);
        self.anchors[group.bottom].add_item(item, Side::Side1);
    }

    /// Deregisters an item and consumes any anchor left separating nothing.
    ///
    /// When the low anchor goes away, the high anchor takes its items and
    /// moves halfway into the freed space so both neighbours grow.
    pub(crate) fn unbind_item(&mut self, item: ItemId) {
        let group = *self.items[item].anchor_group();
        for anchor in group.anchors() {
            if let Some(a) = self.anchors.get_mut(anchor) {
                a.remove_item(item);
            }
        }

        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let (lo, hi) = group.pair(orientation);
            if self.anchor_is_unneeded(lo) && self.anchors.contains_key(hi) {
                self.absorb_anchor(hi, lo, Side::Side1, true);
            }
            if self.anchor_is_unneeded(hi) && self.anchors.contains_key(lo) {
                self.absorb_anchor(lo, hi, Side::Side2, false);
            }
        }
    }

    fn anchor_is_unneeded(&self, anchor: AnchorId) -> bool {
        self.anchors.get(anchor).is_some_and(Anchor::is_unneeded)
    }

    /// Removes `gone` from the graph, handing its `side` items, its followers
    /// and its from/to references over to `keep`.
    fn absorb_anchor(&mut self, keep: AnchorId, gone: AnchorId, side: Side, fair: bool) {
        let gone_position = self.position(gone);
        let gone_serial = self.anchors[gone].serial();
        self.update_anchors_from_to(gone, keep);
        self.retarget_followers(gone, keep);

        let Some(removed) = self.anchors.remove(gone) else {
            return;
        };
        let side = (!removed.has_items(side.opposite())).then_some(side);
        let (gone_from, gone_to) = (removed.from(), removed.to());
        let moved = self.anchors[keep].consume(removed, side);
        for (item, _) in moved {
            self.items[item]
                .anchor_group_mut()
                .replace_anchor(gone, keep);
        }
        self.widen_extent(keep, gone_from, gone_to);

        tracing::debug!(
            "Anchor #{} consumed into #{}",
            gone_serial,
            self.anchors[keep].serial()
        );

        let root = self.root(keep);
        if fair && !self.anchors[root].is_static() && !self.anchors[keep].is_unneeded() {
            let position = self.position(root);
            let target = position - (position - gone_position) / 2;
            let min = self.min_position(root);
            let target = target.clamp(min, self.max_position(root).max(min));
            self.anchors[root].set_position(target);
        }
    }

    /// Rewrites every from/to reference to `old` into `new`.
    pub(crate) fn update_anchors_from_to(&mut self, old: AnchorId, new: AnchorId) {
        for anchor in self.anchors.values_mut() {
            if anchor.from() == Some(old) {
                anchor.set_from(new);
            }
            if anchor.to() == Some(old) {
                anchor.set_to(new);
            }
        }
        if let Some(a) = self.anchors.get(new) {
            if a.from() == Some(new) || a.to() == Some(new) {
                tracing::warn!("Anchor would bound itself after consuming a neighbour");
            }
        }
    }

    /// Anchors following `gone` follow `keep` instead. If `keep` itself
    /// reaches `gone` through its chain, the link pointing at `gone` inherits
    /// `gone`'s state so no cycle forms.
    fn retarget_followers(&mut self, gone: AnchorId, keep: AnchorId) {
        let (gone_state, gone_position) = {
            let g = &self.anchors[gone];
            (g.followee(), g.position())
        };

        let mut link = None;
        let mut cursor = keep;
        for _ in 0..self.anchors.len() {
            match self.anchors.get(cursor).and_then(Anchor::followee) {
                Some(next) if next == gone => {
                    link = Some(cursor);
                    break;
                }
                Some(next) => cursor = next,
                None => break,
            }
        }

        for (id, anchor) in self.anchors.iter_mut() {
            if id == gone || anchor.followee() != Some(gone) {
                continue;
            }
            if Some(id) == link {
                anchor.set_followee(gone_state);
                anchor.set_position(gone_position);
            } else {
                anchor.set_followee(Some(keep));
            }
        }
    }

    /// Widens `anchor`'s from/to to cover whichever bounds reach further.
    fn widen_extent(&mut self, anchor: AnchorId, from: Option<AnchorId>, to: Option<AnchorId>) {
        let current_from = self.anchors[anchor].from();
        let current_to = self.anchors[anchor].to();
        if let (Some(candidate), Some(current)) = (from, current_from) {
            if candidate != anchor
                && self.anchors.contains_key(candidate)
                && self.position(candidate) < self.position(current)
            {
                self.anchors[anchor].set_from(candidate);
            }
        }
        if let (Some(candidate), Some(current)) = (to, current_to) {
            if candidate != anchor
                && self.anchors.contains_key(candidate)
                && self.position(candidate) > self.position(current)
            {
                self.anchors[anchor].set_to(candidate);
            }
        }
    }
}
