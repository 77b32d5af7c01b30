// ABOUTME: Serializable description of a layout's full anchor/item graph.
// ABOUTME: Captures a layout into plain records and rebuilds one from them.

use std::collections::HashMap;

use dock_core::{LayoutConfig, Orientation, Size};
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorId;
use crate::group::AnchorGroup;
use crate::item::{Content, Item};
use crate::layout::Layout;
use crate::sanity::{SanityFlags, SanityViolation};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Anchors are listed statics first (left, top, right, bottom); every
/// reference between records is an index into `anchors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub version: u32,
    pub contents_size: Size,
    pub anchors: Vec<AnchorRecord>,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub orientation: Orientation,
    pub position: i32,
    #[serde(default)]
    pub is_static: bool,
    pub from: Option<usize>,
    pub to: Option<usize>,
    #[serde(default)]
    pub follows: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    /// Content keys, front tab first
    pub contents: Vec<String>,
    #[serde(default)]
    pub placeholder: bool,
    #[serde(default)]
    pub ref_count: u32,
    #[serde(default)]
    pub last_size: Size,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("Snapshot must start with the four static anchors (left, top, right, bottom)")]
    MissingStatics,

    #[error("Anchor record {0} is static but not one of the first four")]
    UnexpectedStatic(usize),

    #[error("Anchor index {0} is out of range")]
    AnchorIndex(usize),

    #[error("No content available for key {0:?}")]
    UnknownContent(String),

    #[error("Snapshot describes an inconsistent layout ({} violation(s))", .0.len())]
    Inconsistent(Vec<SanityViolation>),
}

impl<C: Content> Layout<C> {
    pub fn snapshot(&self) -> LayoutSnapshot {
        let anchor_ids = self.anchor_ids();
        let index: HashMap<AnchorId, usize> = anchor_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        let lookup = |id: Option<AnchorId>| id.and_then(|id| index.get(&id).copied());

        let anchors = anchor_ids
            .iter()
            .map(|&id| {
                let a = &self.anchors[id];
                AnchorRecord {
                    orientation: a.orientation(),
                    position: a.position(),
                    is_static: a.is_static(),
                    from: lookup(a.from()),
                    to: lookup(a.to()),
                    follows: lookup(a.followee()),
                }
            })
            .collect();

        let items = self
            .item_ids()
            .into_iter()
            .map(|id| {
                let item = &self.items[id];
                let group = item.anchor_group();
                let slot = |anchor: AnchorId| index.get(&anchor).copied().unwrap_or(usize::MAX);
                ItemRecord {
                    left: slot(group.left),
                    top: slot(group.top),
                    right: slot(group.right),
                    bottom: slot(group.bottom),
                    contents: item.contents().iter().map(|c| c.key().to_string()).collect(),
                    placeholder: item.is_placeholder(),
                    ref_count: item.ref_count(),
                    last_size: item.last_size(),
                }
            })
            .collect();

        LayoutSnapshot {
            version: SNAPSHOT_VERSION,
            contents_size: self.contents_size,
            anchors,
            items,
        }
    }

    /// Rebuilds a layout, asking `resolve` for the content behind each key.
    /// The result must pass the topology and geometry sanity checks.
    pub fn from_snapshot(
        snapshot: &LayoutSnapshot,
        config: LayoutConfig,
        mut resolve: impl FnMut(&str) -> Option<C>,
    ) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        let expected = [
            Orientation::Vertical,
            Orientation::Horizontal,
            Orientation::Vertical,
            Orientation::Horizontal,
        ];
        let statics_ok = snapshot.anchors.len() >= 4
            && snapshot
                .anchors
                .iter()
                .zip(expected)
                .all(|(record, orientation)| record.is_static && record.orientation == orientation);
        if !statics_ok {
            return Err(SnapshotError::MissingStatics);
        }

        let mut layout = Layout::new(LayoutConfig {
            contents_size: snapshot.contents_size,
            ..config
        });
        let mut ids: Vec<AnchorId> = layout.static_group.anchors().to_vec();
        for (index, record) in snapshot.anchors.iter().enumerate().skip(4) {
            if record.is_static {
                return Err(SnapshotError::UnexpectedStatic(index));
            }
            ids.push(layout.insert_anchor(record.orientation, record.position, false));
        }
        let lookup = |index: usize| ids.get(index).copied().ok_or(SnapshotError::AnchorIndex(index));

        for (index, record) in snapshot.anchors.iter().enumerate().skip(4) {
            let id = ids[index];
            if let Some(from) = record.from {
                layout.anchors[id].set_from(lookup(from)?);
            }
            if let Some(to) = record.to {
                layout.anchors[id].set_to(lookup(to)?);
            }
            if let Some(target) = record.follows {
                layout.anchors[id].set_followee(Some(lookup(target)?));
            }
        }

        for record in &snapshot.items {
            let group = AnchorGroup::new(
                lookup(record.left)?,
                lookup(record.top)?,
                lookup(record.right)?,
                lookup(record.bottom)?,
            );
            let contents = record
                .contents
                .iter()
                .map(|key| resolve(key).ok_or_else(|| SnapshotError::UnknownContent(key.clone())))
                .collect::<Result<Vec<C>, _>>()?;
            let serial = layout.next_serial();
            let mut item = Item::new(group, contents, serial);
            item.set_placeholder(record.placeholder);
            item.set_ref_count(record.ref_count);
            item.set_last_size(record.last_size);
            let id = layout.items.insert(item);
            layout.bind_item(id);
        }

        let report = layout.check_sanity(SanityFlags::TOPOLOGY | SanityFlags::GEOMETRY);
        if !report.is_sane() {
            return Err(SnapshotError::Inconsistent(report.violations));
        }
        layout.after_mutation();
        layout.take_events();
        tracing::debug!(
            "Restored layout with {} anchors and {} items",
            snapshot.anchors.len(),
            snapshot.items.len()
        );
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Panel;
    use dock_core::Location;
    use pretty_assertions::assert_eq;

    fn panel(key: &str) -> Panel {
        Panel::new(key, Size::new(100, 100))
    }

    fn resolver(key: &str) -> Option<Panel> {
        Some(panel(key))
    }

    fn sample() -> Layout<Panel> {
        let mut layout = Layout::with_size(Size::new(600, 400));
        let w1 = layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
        let w2 = layout.add_item(panel("w2"), Location::OnRight, None).unwrap();
        layout.add_item(panel("w3"), Location::OnBottom, Some(w2)).unwrap();
        layout.insert_tab(w1, 1, panel("w1b")).unwrap();
        layout.ref_item(w2).unwrap();
        layout.hide_item(w2).unwrap();
        layout
    }

    #[test]
    fn snapshot_rebuilds_an_identical_layout() {
        let layout = sample();
        let snapshot = layout.snapshot();
        let rebuilt = Layout::from_snapshot(&snapshot, LayoutConfig::default(), resolver).unwrap();
        assert_eq!(rebuilt.snapshot(), snapshot);
        assert_eq!(rebuilt.placeholder_count(), 1);
        let geometry = |l: &Layout<Panel>| {
            l.item_ids()
                .into_iter()
                .map(|id| l.item_geometry(id))
                .collect::<Vec<_>>()
        };
        assert_eq!(geometry(&rebuilt), geometry(&layout));
    }

    #[test]
    fn snapshot_survives_json() {
        let snapshot = sample().snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: LayoutSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn unknown_content_is_rejected() {
        let snapshot = sample().snapshot();
        let err = Layout::<Panel>::from_snapshot(&snapshot, LayoutConfig::default(), |key| {
            (key != "w3").then(|| panel(key))
        })
        .unwrap_err();
        assert!(matches!(err, SnapshotError::UnknownContent(key) if key == "w3"));
    }

    #[test]
    fn broken_references_are_rejected() {
        let mut snapshot = sample().snapshot();
        snapshot.items[0].right = 99;
        assert!(matches!(
            Layout::from_snapshot(&snapshot, LayoutConfig::default(), resolver),
            Err(SnapshotError::AnchorIndex(99))
        ));

        let mut snapshot = sample().snapshot();
        snapshot.anchors[4].position = 2;
        assert!(matches!(
            Layout::from_snapshot(&snapshot, LayoutConfig::default(), resolver),
            Err(SnapshotError::Inconsistent(_))
        ));

        let mut snapshot = sample().snapshot();
        snapshot.version = 7;
        assert!(matches!(
            Layout::from_snapshot(&snapshot, LayoutConfig::default(), resolver),
            Err(SnapshotError::UnsupportedVersion(7))
        ));
    }
}
