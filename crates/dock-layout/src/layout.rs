// ABOUTME: The layout arena owning every anchor and item of one canvas.
// ABOUTME: Structural edits (insert, remove, resize, drag, canvas resize) and geometry queries.

use dock_core::{LayoutConfig, Location, Orientation, Rect, Size};
use slotmap::SlotMap;

use crate::anchor::{Anchor, AnchorId};
use crate::error::LayoutError;
use crate::group::AnchorGroup;
use crate::item::{Content, Item, ItemId};
use crate::sanity::SanityFlags;

/// Notifications queued by mutations, drained with [`Layout::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    MinimumSizeChanged(Size),
    ContentsSizeChanged(Size),
    VisibleCountChanged(usize),
}

/// A canvas tiled by items whose edges are shared anchors.
///
/// Four static anchors bound the canvas. Every other anchor is a divider
/// created by an insertion and destroyed once it separates nothing.
#[derive(Debug)]
pub struct Layout<C> {
    pub(crate) config: LayoutConfig,
    pub(crate) anchors: SlotMap<AnchorId, Anchor>,
    pub(crate) items: SlotMap<ItemId, Item<C>>,
    pub(crate) static_group: AnchorGroup,
    pub(crate) contents_size: Size,
    next_serial: u64,
    events: Vec<LayoutEvent>,
    reported_min_size: Size,
    reported_visible: usize,
}

impl<C: Content> Layout<C> {
    pub fn new(config: LayoutConfig) -> Self {
        let static_thickness = config.static_anchor_thickness;
        let size = config
            .contents_size
            .expanded_to(Size::new(2 * static_thickness, 2 * static_thickness));

        let mut anchors = SlotMap::with_key();
        let left = anchors.insert(Anchor::new(Orientation::Vertical, 0, true, 0));
        let top = anchors.insert(Anchor::new(Orientation::Horizontal, 0, true, 1));
        let right = anchors.insert(Anchor::new(
            Orientation::Vertical,
            size.width - static_thickness,
            true,
            2,
        ));
        let bottom = anchors.insert(Anchor::new(
            Orientation::Horizontal,
            size.height - static_thickness,
            true,
            3,
        ));
        for vertical in [left, right] {
            anchors[vertical].set_from(top);
            anchors[vertical].set_to(bottom);
        }
        for horizontal in [top, bottom] {
            anchors[horizontal].set_from(left);
            anchors[horizontal].set_to(right);
        }

        let static_group = AnchorGroup::new(left, top, right, bottom);
        let mut layout = Self {
            config,
            anchors,
            items: SlotMap::with_key(),
            static_group,
            contents_size: size,
            next_serial: 4,
            events: Vec::new(),
            reported_min_size: Size::default(),
            reported_visible: 0,
        };
        layout.reported_min_size = layout.minimum_size();
        layout
    }

    /// Default configuration with the given canvas size.
    pub fn with_size(size: Size) -> Self {
        Self::new(LayoutConfig {
            contents_size: size,
            ..LayoutConfig::default()
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn contents_size(&self) -> Size {
        self.contents_size
    }

    pub fn static_anchor_group(&self) -> AnchorGroup {
        self.static_group
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item<C>> {
        self.items.get(id)
    }

    /// Every anchor, statics first, in creation order.
    pub fn anchor_ids(&self) -> Vec<AnchorId> {
        let mut ids: Vec<AnchorId> = self.anchors.keys().collect();
        ids.sort_by_key(|&id| self.anchors[id].serial());
        ids
    }

    /// Dividers in creation order.
    pub fn non_static_anchors(&self) -> Vec<AnchorId> {
        self.anchor_ids()
            .into_iter()
            .filter(|&id| !self.anchors[id].is_static())
            .collect()
    }

    /// Items in insertion order, placeholders included.
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.items.keys().collect();
        ids.sort_by_key(|&id| self.items[id].serial());
        ids
    }

    pub fn visible_item_ids(&self) -> Vec<ItemId> {
        self.item_ids()
            .into_iter()
            .filter(|&id| self.items[id].is_visible())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn visible_count(&self) -> usize {
        self.items.values().filter(|i| i.is_visible()).count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.count() - self.visible_count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item hosting content with the given key.
    pub fn item_for_key(&self, key: &str) -> Option<ItemId> {
        self.item_ids()
            .into_iter()
            .find(|&id| self.items[id].contains_key(key))
    }

    pub(crate) fn next_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    pub(crate) fn insert_anchor(&mut self, orientation: Orientation, position: i32, is_static: bool) -> AnchorId {
        let serial = self.next_serial();
        self.anchors
            .insert(Anchor::new(orientation, position, is_static, serial))
    }

    /// Static anchors bounding the axis anchors of `orientation` move on.
    pub(crate) fn static_pair(&self, orientation: Orientation) -> (AnchorId, AnchorId) {
        self.static_group.pair(orientation)
    }

    /// End of the anchor's follow chain; the anchor itself when active.
    pub fn root(&self, anchor: AnchorId) -> AnchorId {
        let mut current = anchor;
        for _ in 0..=self.anchors.len() {
            match self.anchors.get(current).and_then(Anchor::followee) {
                Some(next) => current = next,
                None => return current,
            }
        }
        tracing::warn!("Follow cycle detected while resolving an anchor");
        current
    }

    /// Whether `target` appears on `anchor`'s follow chain.
    pub(crate) fn chain_contains(&self, anchor: AnchorId, target: AnchorId) -> bool {
        let mut current = anchor;
        for _ in 0..=self.anchors.len() {
            match self.anchors.get(current).and_then(Anchor::followee) {
                Some(next) if next == target => return true,
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    /// Effective position: that of the anchor's follow root.
    pub fn position(&self, anchor: AnchorId) -> i32 {
        self.anchors
            .get(self.root(anchor))
            .map_or(0, Anchor::position)
    }

    /// Effective thickness: that of the anchor's follow root.
    pub fn thickness(&self, anchor: AnchorId) -> i32 {
        let is_static = self
            .anchors
            .get(self.root(anchor))
            .is_some_and(Anchor::is_static);
        self.config.thickness(is_static)
    }

    pub fn item_min_size(&self, item: ItemId) -> Size {
        match self.items.get(item) {
            Some(i) if i.is_visible() => self.config.item_floor.expanded_to(i.content_min_size()),
            _ => Size::default(),
        }
    }

    /// Minimum length along the axis anchors of `orientation` move on.
    /// Placeholders have none.
    pub fn item_min_length(&self, item: ItemId, orientation: Orientation) -> i32 {
        self.item_min_size(item).length(orientation)
    }

    pub fn item_geometry(&self, item: ItemId) -> Option<Rect> {
        self.items
            .get(item)
            .map(|i| self.group_geometry(i.anchor_group()))
    }

    pub fn item_length(&self, item: ItemId, orientation: Orientation) -> Option<i32> {
        self.item_geometry(item).map(|r| r.length(orientation))
    }

    pub(crate) fn visible_item(&self, item: ItemId) -> Result<&Item<C>, LayoutError> {
        let i = self.items.get(item).ok_or(LayoutError::UnknownItem(item))?;
        if i.is_placeholder() {
            return Err(LayoutError::PlaceholderItem(item));
        }
        Ok(i)
    }

    /// Drops `content` into a new item at `location`, either across the whole
    /// layout or next to `relative_to`.
    ///
    /// The new item gets the content's preferred length, or a share of the
    /// available length when it has none, clamped to what fits. The content
    /// is dropped if the request is rejected; check
    /// [`Layout::available_length_for_drop`] first to keep it.
    pub fn add_item(
        &mut self,
        content: C,
        location: Location,
        relative_to: Option<ItemId>,
    ) -> Result<ItemId, LayoutError> {
        let min = self.config.item_floor.expanded_to(content.min_size());
        let plan = self
            .plan_drop(min, content.preferred_size(), location, relative_to)
            .inspect_err(|e| tracing::debug!("Rejected drop {}: {}", location.label(), e))?;
        let group = self.open_slot(&plan);
        let serial = self.next_serial();
        let key = content.key().to_string();
        let id = self.items.insert(Item::new(group, vec![content], serial));
        self.bind_item(id);
        self.settle(&[]);

        tracing::debug!(
            "Added item #{} ({}) {} {}",
            serial,
            key,
            location.label(),
            match relative_to.and_then(|r| self.items.get(r)) {
                Some(r) => format!("of item #{}", r.serial()),
                None => "of the layout".to_string(),
            }
        );
        self.after_mutation();
        Ok(id)
    }

    /// Adds a tab to a visible item, growing the item if the new content's
    /// minimum requires it. Returns the index the tab landed at.
    pub fn insert_tab(&mut self, item: ItemId, index: usize, content: C) -> Result<usize, LayoutError> {
        self.visible_item(item)?;
        let min = self.item_min_size(item).expanded_to(content.min_size());
        let mut rect = self.group_geometry(self.items[item].anchor_group());
        let mut grown = false;
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            if rect.length(orientation) < min.length(orientation) {
                rect = self.resized_rect(item, rect, min.length(orientation), orientation)?;
                grown = true;
            }
        }
        if grown {
            let moves = self.validate_geometry(item, rect, min)?;
            self.apply_moves(&moves);
        }

        let index = self.items[item].insert_content(index, content);
        self.after_mutation();
        Ok(index)
    }

    /// Removes an item for good, handing back its contents.
    pub fn remove_item(&mut self, item: ItemId) -> Result<Vec<C>, LayoutError> {
        if !self.items.contains_key(item) {
            return Err(LayoutError::UnknownItem(item));
        }
        self.unbind_item(item);
        let contents = match self.items.remove(item) {
            Some(mut removed) => {
                tracing::debug!("Removed item #{}", removed.serial());
                removed.take_contents()
            }
            None => Vec::new(),
        };
        self.settle(&[]);
        self.after_mutation();
        Ok(contents)
    }

    /// Sets a visible item's length along the axis anchors of `orientation`
    /// move on, moving its high anchor (or its low one when the high one is
    /// static).
    pub fn resize_item(&mut self, item: ItemId, length: i32, orientation: Orientation) -> Result<(), LayoutError> {
        self.visible_item(item)?;
        let rect = self.group_geometry(self.items[item].anchor_group());
        let target = self.resized_rect(item, rect, length, orientation)?;
        self.set_item_geometry(item, target)
    }

    /// Moves a visible item's anchors so its interior matches `rect`.
    pub fn set_item_geometry(&mut self, item: ItemId, rect: Rect) -> Result<(), LayoutError> {
        self.visible_item(item)?;
        let min = self.item_min_size(item);
        let moves = self.validate_geometry(item, rect, min)?;
        self.apply_moves(&moves);
        self.after_mutation();
        Ok(())
    }

    fn resized_rect(&self, item: ItemId, rect: Rect, length: i32, orientation: Orientation) -> Result<Rect, LayoutError> {
        let (lo, hi) = self.items[item].anchor_group().pair(orientation);
        let current = rect.length(orientation);
        if length == current {
            return Ok(rect);
        }
        let mut target = rect;
        let start = if !self.anchors[self.root(hi)].is_static() {
            rect.start(orientation)
        } else if !self.anchors[self.root(lo)].is_static() {
            rect.start(orientation) + current - length
        } else {
            return Err(LayoutError::AnchorNotMovable(hi));
        };
        match orientation {
            Orientation::Vertical => {
                target.x = start;
                target.width = length;
            }
            Orientation::Horizontal => {
                target.y = start;
                target.height = length;
            }
        }
        Ok(target)
    }

    /// Anchor roots to move, and where, for an item to take `rect`.
    fn validate_geometry(&self, item: ItemId, rect: Rect, min: Size) -> Result<Vec<(AnchorId, i32)>, LayoutError> {
        let group = *self.items[item].anchor_group();
        let mut moves = Vec::new();
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let length = rect.length(orientation);
            let minimum = min.length(orientation);
            if length < minimum {
                return Err(LayoutError::BelowMinimum { length, minimum });
            }
            let (lo, hi) = group.pair(orientation);
            let lo_target = rect.start(orientation) - self.thickness(lo);
            let hi_target = rect.start(orientation) + length;
            for (anchor, target) in [(lo, lo_target), (hi, hi_target)] {
                if self.position(anchor) == target {
                    continue;
                }
                let root = self.root(anchor);
                if self.anchors[root].is_static() {
                    return Err(LayoutError::AnchorNotMovable(anchor));
                }
                let (low, high) = (self.min_position(root), self.max_position(root));
                if target < low || target > high {
                    return Err(LayoutError::OutOfRange {
                        position: target,
                        min: low,
                        max: high,
                    });
                }
                moves.push((root, target));
            }
        }
        Ok(moves)
    }

    fn apply_moves(&mut self, moves: &[(AnchorId, i32)]) {
        for &(root, position) in moves {
            self.anchors[root].set_position(position);
        }
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            if moves.iter().any(|&(a, _)| self.anchors[a].orientation() == orientation) {
                self.enforce_min_lengths(orientation);
            }
        }
    }

    /// Drags a divider, clamped so no visible item drops below its minimum.
    /// Neighbours further away are pushed as needed. Returns the position
    /// the divider ended at.
    pub fn drag_anchor(&mut self, anchor: AnchorId, position: i32) -> Result<i32, LayoutError> {
        let a = self.anchors.get(anchor).ok_or(LayoutError::UnknownAnchor(anchor))?;
        if a.is_static() || a.is_following() {
            return Err(LayoutError::AnchorNotMovable(anchor));
        }
        let orientation = a.orientation();
        let min = self.min_position(anchor);
        let max = self.max_position(anchor).max(min);
        let applied = position.clamp(min, max);
        self.anchors[anchor].set_position(applied);
        self.enforce_min_lengths(orientation);
        self.after_mutation();
        Ok(applied)
    }

    /// Resizes the canvas, rescaling dividers proportionally. Sizes below
    /// [`Layout::minimum_size`] are raised to it. Returns the size applied.
    pub fn set_contents_size(&mut self, size: Size) -> Size {
        let min = self.minimum_size();
        let applied = size.expanded_to(min);
        if applied != size {
            tracing::warn!(
                "Contents size {}x{} is below the minimum {}x{}, using {}x{}",
                size.width,
                size.height,
                min.width,
                min.height,
                applied.width,
                applied.height
            );
        }
        if applied == self.contents_size {
            return applied;
        }

        let static_thickness = self.config.static_anchor_thickness;
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let (lo, hi) = self.static_pair(orientation);
            let old_lo = self.anchors[lo].position();
            let old_hi = self.anchors[hi].position();
            let new_hi = applied.length(orientation) - static_thickness;
            if new_hi == old_hi {
                continue;
            }
            let span = f64::from(old_hi - old_lo);
            let new_span = f64::from(new_hi - old_lo);
            for anchor in self.anchors.values_mut() {
                if anchor.orientation() != orientation || anchor.is_static() || anchor.is_following() {
                    continue;
                }
                if span > 0.0 {
                    let ratio = f64::from(anchor.position() - old_lo) / span;
                    anchor.set_position(old_lo + (ratio * new_span).round() as i32);
                }
            }
            self.anchors[hi].set_position(new_hi);
            self.enforce_min_lengths(orientation);
        }

        self.contents_size = applied;
        self.events.push(LayoutEvent::ContentsSizeChanged(applied));
        self.after_mutation();
        applied
    }

    /// Drains queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.events)
    }

    /// Restores minimums and collapses dividers left between visible items
    /// and placeholders.
    pub(crate) fn settle(&mut self, first: &[AnchorId]) {
        self.collapse_placeholders(first, &[]);
        self.enforce_min_lengths(Orientation::Vertical);
        self.enforce_min_lengths(Orientation::Horizontal);
    }

    pub(crate) fn after_mutation(&mut self) {
        let min = self.minimum_size();
        if min != self.reported_min_size {
            self.reported_min_size = min;
            self.events.push(LayoutEvent::MinimumSizeChanged(min));
        }
        let visible = self.visible_count();
        if visible != self.reported_visible {
            self.reported_visible = visible;
            self.events.push(LayoutEvent::VisibleCountChanged(visible));
        }
        if self.config.strict_sanity {
            let report = self.check_sanity(SanityFlags::all());
            if !report.is_sane() {
                panic!("layout failed its sanity check:\n{}", report);
            }
        }
    }
}
