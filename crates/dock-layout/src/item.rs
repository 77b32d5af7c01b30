// ABOUTME: Rectangles placed in a layout and the content they host.
// ABOUTME: Items carry a tab stack of content, a placeholder flag and a reference count.

use dock_core::Size;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::group::AnchorGroup;

new_key_type! {
    /// Handle of an item inside its layout's arena.
    pub struct ItemId;
}

/// Something that can be hosted inside an item.
///
/// The layout only needs a stable key (for snapshots and lookups) and the
/// size hints that bound the item's geometry.
pub trait Content {
    fn key(&self) -> &str;

    fn min_size(&self) -> Size;

    /// A zero length on an axis means "no preference" on that axis.
    fn preferred_size(&self) -> Size {
        Size::default()
    }
}

/// Plain named content with fixed size hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub key: String,
    pub min_size: Size,
    #[serde(default)]
    pub preferred_size: Size,
}

impl Panel {
    pub fn new(key: impl Into<String>, min_size: Size) -> Self {
        Self {
            key: key.into(),
            min_size,
            preferred_size: Size::default(),
        }
    }

    pub fn with_preferred(mut self, preferred_size: Size) -> Self {
        self.preferred_size = preferred_size;
        self
    }
}

impl Content for Panel {
    fn key(&self) -> &str {
        &self.key
    }

    fn min_size(&self) -> Size {
        self.min_size
    }

    fn preferred_size(&self) -> Size {
        self.preferred_size
    }
}

#[derive(Debug, Clone)]
pub struct Item<C> {
    group: AnchorGroup,
    contents: Vec<C>,
    placeholder: bool,
    ref_count: u32,
    /// Geometry recorded when the item was last hidden
    last_size: Size,
    serial: u64,
}

impl<C: Content> Item<C> {
    pub(crate) fn new(group: AnchorGroup, contents: Vec<C>, serial: u64) -> Self {
        Self {
            group,
            contents,
            placeholder: false,
            ref_count: 0,
            last_size: Size::default(),
            serial,
        }
    }

    pub fn anchor_group(&self) -> &AnchorGroup {
        &self.group
    }

    pub(crate) fn anchor_group_mut(&mut self) -> &mut AnchorGroup {
        &mut self.group
    }

    /// Tab stack, front first.
    pub fn contents(&self) -> &[C] {
        &self.contents
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn is_visible(&self) -> bool {
        !self.placeholder
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Size the item had when it was last hidden.
    pub fn last_size(&self) -> Size {
        self.last_size
    }

    /// Largest minimum among the hosted content.
    pub fn content_min_size(&self) -> Size {
        self.contents
            .iter()
            .fold(Size::default(), |acc, c| acc.expanded_to(c.min_size()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.contents.iter().any(|c| c.key() == key)
    }

    /// Inserts a tab, clamping the index to the stack. Returns the index used.
    pub(crate) fn insert_content(&mut self, index: usize, content: C) -> usize {
        let index = index.min(self.contents.len());
        self.contents.insert(index, content);
        index
    }

    pub(crate) fn remove_content(&mut self, index: usize) -> Option<C> {
        (index < self.contents.len()).then(|| self.contents.remove(index))
    }

    pub(crate) fn take_contents(&mut self) -> Vec<C> {
        std::mem::take(&mut self.contents)
    }

    pub(crate) fn turn_into_placeholder(&mut self, last_size: Size) -> Vec<C> {
        self.placeholder = true;
        self.last_size = last_size;
        self.take_contents()
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: bool) {
        self.placeholder = placeholder;
    }

    pub(crate) fn set_last_size(&mut self, last_size: Size) {
        self.last_size = last_size;
    }

    pub(crate) fn set_serial(&mut self, serial: u64) {
        self.serial = serial;
    }

    pub(crate) fn set_ref_count(&mut self, ref_count: u32) {
        self.ref_count = ref_count;
    }

    pub(crate) fn add_ref(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_add(1);
        self.ref_count
    }

    pub(crate) fn release_ref(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_sub(1);
        self.ref_count
    }
}
