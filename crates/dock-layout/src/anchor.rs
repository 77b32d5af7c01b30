// ABOUTME: Split lines separating items in a layout.
// ABOUTME: An anchor tracks its position, its bounding anchors and the items on each side.

use dock_core::{Orientation, Side};
use slotmap::new_key_type;

use crate::item::ItemId;

new_key_type! {
    /// Handle of an anchor inside its layout's arena.
    pub struct AnchorId;
}

/// Whether an anchor positions itself or has collapsed into another one.
///
/// A following anchor is inert: its effective position and thickness are
/// those of the end of its follow chain. It keeps its item lists so the
/// placeholder between it and its followee can be restored later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    Active,
    Following(AnchorId),
}

#[derive(Debug, Clone)]
pub struct Anchor {
    orientation: Orientation,
    position: i32,
    is_static: bool,
    from: Option<AnchorId>,
    to: Option<AnchorId>,
    side1_items: Vec<ItemId>,
    side2_items: Vec<ItemId>,
    state: AnchorState,
    serial: u64,
}

impl Anchor {
    pub(crate) fn new(orientation: Orientation, position: i32, is_static: bool, serial: u64) -> Self {
        Self {
            orientation,
            position,
            is_static,
            from: None,
            to: None,
            side1_items: Vec::new(),
            side2_items: Vec::new(),
            state: AnchorState::Active,
            serial,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Raw stored position. For a following anchor this is stale; ask the
    /// layout for the effective position instead.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Callers must have clamped `position` against the neighbouring
    /// minimum lengths already.
    pub(crate) fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Creation order within the owning layout.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn from(&self) -> Option<AnchorId> {
        self.from
    }

    pub fn to(&self) -> Option<AnchorId> {
        self.to
    }

    pub(crate) fn set_from(&mut self, from: AnchorId) {
        self.from = Some(from);
    }

    pub(crate) fn set_to(&mut self, to: AnchorId) {
        self.to = Some(to);
    }

    pub fn state(&self) -> AnchorState {
        self.state
    }

    pub fn followee(&self) -> Option<AnchorId> {
        match self.state {
            AnchorState::Active => None,
            AnchorState::Following(id) => Some(id),
        }
    }

    pub fn is_following(&self) -> bool {
        matches!(self.state, AnchorState::Following(_))
    }

    pub(crate) fn set_followee(&mut self, followee: Option<AnchorId>) {
        self.state = match followee {
            Some(id) => AnchorState::Following(id),
            None => AnchorState::Active,
        };
    }

    pub fn items(&self, side: Side) -> &[ItemId] {
        match side {
            Side::Side1 => &self.side1_items,
            Side::Side2 => &self.side2_items,
        }
    }

    fn items_mut(&mut self, side: Side) -> &mut Vec<ItemId> {
        match side {
            Side::Side1 => &mut self.side1_items,
            Side::Side2 => &mut self.side2_items,
        }
    }

    pub fn has_items(&self, side: Side) -> bool {
        !self.items(side).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.side1_items.is_empty() && self.side2_items.is_empty()
    }

    pub fn contains_item(&self, item: ItemId, side: Side) -> bool {
        self.items(side).contains(&item)
    }

    pub fn side_of(&self, item: ItemId) -> Option<Side> {
        if self.contains_item(item, Side::Side1) {
            Some(Side::Side1)
        } else if self.contains_item(item, Side::Side2) {
            Some(Side::Side2)
        } else {
            None
        }
    }

    pub(crate) fn add_item(&mut self, item: ItemId, side: Side) {
        let items = self.items_mut(side);
        if !items.contains(&item) {
            items.push(item);
        }
    }

    pub(crate) fn add_items(&mut self, items: &[ItemId], side: Side) {
        for &item in items {
            self.add_item(item, side);
        }
    }

    /// Returns the side the item was removed from.
    pub(crate) fn remove_item(&mut self, item: ItemId) -> Option<Side> {
        let side = self.side_of(item)?;
        self.items_mut(side).retain(|&i| i != item);
        Some(side)
    }

    pub(crate) fn remove_all_items(&mut self) -> (Vec<ItemId>, Vec<ItemId>) {
        (
            std::mem::take(&mut self.side1_items),
            std::mem::take(&mut self.side2_items),
        )
    }

    /// A dynamic anchor with nothing on one of its sides no longer separates
    /// anything and should be consumed into its opposite anchor.
    pub fn is_unneeded(&self) -> bool {
        !self.is_static && (self.side1_items.is_empty() || self.side2_items.is_empty())
    }

    /// Takes over `other`'s items, optionally only those on `side`.
    ///
    /// Returns every moved item with its side. The caller must rewrite those
    /// items' anchor groups to point at this anchor.
    pub(crate) fn consume(&mut self, other: Anchor, side: Option<Side>) -> Vec<(ItemId, Side)> {
        debug_assert_eq!(self.orientation, other.orientation);
        let mut moved = Vec::new();
        for s in [Side::Side1, Side::Side2] {
            if side.is_some_and(|only| only != s) {
                debug_assert!(
                    other.items(s).is_empty(),
                    "consuming one side would drop items on the other"
                );
                continue;
            }
            for &item in other.items(s) {
                self.add_item(item, s);
                moved.push((item, s));
            }
        }
        moved
    }
}
