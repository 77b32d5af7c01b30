// ABOUTME: Hiding items as placeholders and restoring them in place.
// ABOUTME: Collapses the space of hidden items into their neighbours through anchor following.

use dock_core::{Orientation, Side, Size};

use crate::anchor::{AnchorId, AnchorState};
use crate::group::AnchorGroup;
use crate::item::{Content, ItemId};
use crate::layout::Layout;
use crate::LayoutError;

/// Result of hiding an item.
#[derive(Debug)]
pub struct Hidden<C> {
    /// Content the item was hosting, front tab first
    pub contents: Vec<C>,
    /// The placeholder left behind, or `None` when nothing referenced the
    /// item and it was removed outright
    pub placeholder: Option<ItemId>,
}

impl<C: Content> Layout<C> {
    pub fn ref_item(&mut self, item: ItemId) -> Result<u32, LayoutError> {
        let i = self.items.get_mut(item).ok_or(LayoutError::UnknownItem(item))?;
        Ok(i.add_ref())
    }

    /// Drops one reference. A placeholder nobody references is removed.
    pub fn unref_item(&mut self, item: ItemId) -> Result<u32, LayoutError> {
        let i = self.items.get_mut(item).ok_or(LayoutError::UnknownItem(item))?;
        let count = i.release_ref();
        if count == 0 && i.is_placeholder() {
            tracing::debug!("Placeholder #{} lost its last reference", i.serial());
            self.remove_item(item)?;
        }
        Ok(count)
    }

    pub fn ref_count(&self, item: ItemId) -> Option<u32> {
        self.items.get(item).map(|i| i.ref_count())
    }

    /// Hides a visible item. A referenced item stays in the graph as a
    /// placeholder whose space collapses into its neighbours; an item nobody
    /// references is removed.
    pub fn hide_item(&mut self, item: ItemId) -> Result<Hidden<C>, LayoutError> {
        let i = self.visible_item(item)?;
        if i.ref_count() == 0 {
            let contents = self.remove_item(item)?;
            return Ok(Hidden {
                contents,
                placeholder: None,
            });
        }

        let group = *i.anchor_group();
        let size = self.group_geometry(&group).size();
        let contents = self.items[item].turn_into_placeholder(size);
        tracing::debug!("Item #{} is now a placeholder", self.items[item].serial());

        self.settle(&group.anchors());
        self.after_mutation();
        Ok(Hidden {
            contents,
            placeholder: Some(item),
        })
    }

    /// Turns a placeholder back into a visible item hosting `content` at
    /// `tab_index`, reopening the space its collapse gave away. Returns the
    /// tab index used.
    ///
    /// Nothing changes when the neighbours cannot make room for the item's
    /// minimum; the content is dropped in that case.
    pub fn restore_placeholder(&mut self, item: ItemId, content: C, tab_index: usize) -> Result<usize, LayoutError> {
        let i = self.items.get(item).ok_or(LayoutError::UnknownItem(item))?;
        if !i.is_placeholder() {
            return Err(LayoutError::NotPlaceholder(item));
        }
        let group = *i.anchor_group();
        let min = self
            .config
            .item_floor
            .expanded_to(content.min_size())
            .expanded_to(i.content_min_size());
        let preferred = i.last_size().expanded_to(content.preferred_size());

        let saved: Vec<(AnchorId, AnchorState, i32)> = self
            .anchors
            .iter()
            .map(|(id, a)| (id, a.state(), a.position()))
            .collect();
        self.items[item].set_placeholder(false);
        let index = self.items[item].insert_content(tab_index, content);

        let mut outcome = Ok(());
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            outcome = self.reopen_axis(&group, orientation, min, preferred);
            if outcome.is_err() {
                break;
            }
        }
        if outcome.is_ok() {
            self.settle(&[]);
            outcome = self.check_reopened(item, min);
        }
        if let Err(err) = outcome {
            tracing::debug!("Rejected restore of placeholder #{}: {}", self.items[item].serial(), err);
            for &(id, state, position) in &saved {
                let anchor = &mut self.anchors[id];
                anchor.set_followee(match state {
                    AnchorState::Active => None,
                    AnchorState::Following(target) => Some(target),
                });
                anchor.set_position(position);
            }
            let i = &mut self.items[item];
            i.remove_content(index);
            i.set_placeholder(true);
            return Err(err);
        }

        tracing::debug!("Placeholder #{} restored", self.items[item].serial());
        self.after_mutation();
        Ok(index)
    }

    fn check_reopened(&self, item: ItemId, min: Size) -> Result<(), LayoutError> {
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let length = self.item_length(item, orientation).unwrap_or(0);
            let needed = min.length(orientation);
            if length < needed {
                return Err(LayoutError::InsufficientSpace {
                    needed,
                    available: length.max(0),
                });
            }
        }
        Ok(())
    }

    /// Releases the follow links collapsing the group on this axis, if any,
    /// then pushes the neighbours apart until the item fits.
    ///
    /// Every anchor collapsed into the same root is released, then collapses
    /// again around the reopened item before it grows.
    fn reopen_axis(&mut self, group: &AnchorGroup, orientation: Orientation, min: Size, preferred: Size) -> Result<(), LayoutError> {
        let (lo, hi) = group.pair(orientation);
        let min = min.length(orientation);
        if self.root(lo) != self.root(hi) {
            return self.grow_between(group, orientation, min, min);
        }

        let root = self.root(lo);
        let low = self.position(root);
        let high = low + self.thickness(root) - self.config.anchor_thickness;
        for member in self.class_members(root).into_iter().skip(1) {
            let position = if member == hi {
                high
            } else if member == lo {
                low
            } else if self.visible_items(member, Side::Side2) > 0 {
                high
            } else {
                low
            };
            self.anchors[member].set_followee(None);
            self.anchors[member].set_position(position);
        }
        self.collapse_placeholders(&[], &group.anchors());
        self.grow_between(group, orientation, min, preferred.length(orientation))
    }

    fn visible_items(&self, anchor: AnchorId, side: Side) -> usize {
        self.anchors[anchor]
            .items(side)
            .iter()
            .filter(|&&i| self.items.get(i).is_some_and(|i| i.is_visible()))
            .count()
    }

    fn grow_between(&mut self, group: &AnchorGroup, orientation: Orientation, min: i32, preferred: i32) -> Result<(), LayoutError> {
        let (lo, hi) = group.pair(orientation);
        let lo_root = self.root(lo);
        let hi_root = self.root(hi);
        let length = self.position(hi) - self.position(lo) - self.thickness(lo);
        let room1 = if self.anchors[lo_root].is_static() {
            0
        } else {
            (self.position(lo_root) - self.min_position(lo_root)).max(0)
        };
        let room2 = if self.anchors[hi_root].is_static() {
            0
        } else {
            (self.max_position(hi_root) - self.position(hi_root)).max(0)
        };

        let total = length + room1 + room2;
        if total < min {
            return Err(LayoutError::InsufficientSpace {
                needed: min,
                available: total.max(0),
            });
        }
        let target = preferred.max(min).min(total);
        if target <= length {
            return Ok(());
        }
        let (take1, take2) = self.config.insertion_split.split(target - length, room1, room2);
        if take1 > 0 {
            let position = self.anchors[lo_root].position() - take1;
            self.anchors[lo_root].set_position(position);
        }
        if take2 > 0 {
            let position = self.anchors[hi_root].position() + take2;
            self.anchors[hi_root].set_position(position);
        }
        Ok(())
    }

    /// Makes every divider that has only placeholders on one side, and
    /// visible items on the other, follow the far edge of those placeholders.
    ///
    /// Anchors in `first` are considered before the rest, anchors in `last`
    /// only once no other anchor can collapse.
    pub(crate) fn collapse_placeholders(&mut self, first: &[AnchorId], last: &[AnchorId]) {
        for _ in 0..=self.anchors.len() {
            let mut order: Vec<AnchorId> = first
                .iter()
                .copied()
                .filter(|&a| self.anchors.contains_key(a))
                .collect();
            order.extend(self.anchor_ids().into_iter().filter(|a| !last.contains(a)));
            order.extend(last.iter().copied().filter(|&a| self.anchors.contains_key(a)));

            let next = order.into_iter().find_map(|anchor| {
                let root = self.root(anchor);
                self.follow_target(root).map(|target| (root, target))
            });
            let Some((root, target)) = next else {
                return;
            };
            self.follow(root, target);
        }
    }

    /// Side of the class holding only placeholders while the other side
    /// holds visible items.
    fn placeholder_side(&self, root: AnchorId) -> Option<Side> {
        let census = |side| {
            let items = self.class_items(root, side);
            let visible = items.iter().filter(|&&i| self.items[i].is_visible()).count();
            (visible, items.len() - visible)
        };
        let (visible1, hidden1) = census(Side::Side1);
        let (visible2, hidden2) = census(Side::Side2);
        if visible1 == 0 && hidden1 > 0 && visible2 > 0 {
            Some(Side::Side1)
        } else if visible2 == 0 && hidden2 > 0 && visible1 > 0 {
            Some(Side::Side2)
        } else {
            None
        }
    }

    /// Nearest far edge of the placeholders beside `root`, preferring those
    /// not already collapsed on the other axis.
    fn follow_target(&self, root: AnchorId) -> Option<AnchorId> {
        let anchor = self.anchors.get(root)?;
        if anchor.is_static() || anchor.is_following() {
            return None;
        }
        let orientation = anchor.orientation();
        let side = self.placeholder_side(root)?;

        let placeholders: Vec<ItemId> = self
            .class_items(root, side)
            .into_iter()
            .filter(|&i| self.items[i].is_placeholder())
            .collect();
        let open: Vec<ItemId> = placeholders
            .iter()
            .copied()
            .filter(|&i| !self.is_collapsed(i, orientation.other()))
            .collect();
        let pool = if open.is_empty() { placeholders } else { open };

        let position = self.position(root);
        pool.into_iter()
            .map(|item| {
                let (lo, hi) = self.items[item].anchor_group().pair(orientation);
                self.root(match side {
                    Side::Side1 => lo,
                    Side::Side2 => hi,
                })
            })
            .filter(|&target| target != root)
            .min_by_key(|&target| {
                (
                    (self.position(target) - position).abs(),
                    self.anchors[target].serial(),
                )
            })
    }

    /// Whether the item's anchors on this axis share a follow root.
    pub fn is_collapsed(&self, item: ItemId, orientation: Orientation) -> bool {
        self.items.get(item).is_some_and(|i| {
            let (lo, hi) = i.anchor_group().pair(orientation);
            self.root(lo) == self.root(hi)
        })
    }

    /// `root` starts following `target`, which first moves halfway towards
    /// it so the neighbours on both sides share the freed space.
    fn follow(&mut self, root: AnchorId, target: AnchorId) {
        if !self.anchors[target].is_static() {
            let from = self.position(target);
            let towards = self.position(root);
            let low = self.min_position(target);
            let high = self.max_position(target).max(low);
            let moved = (from - (from - towards) / 2).clamp(low, high);
            self.anchors[target].set_position(moved);
        }
        tracing::debug!(
            "Anchor #{} now follows #{}",
            self.anchors[root].serial(),
            self.anchors[target].serial()
        );
        let position = self.anchors[target].position();
        self.anchors[root].set_followee(Some(target));
        self.anchors[root].set_position(position);
    }
}
