// ABOUTME: Anchor-based rectangular layout engine.
// ABOUTME: Items are framed by shared anchors that move, follow and collapse as items come and go.

mod anchor;
mod constraints;
mod drop;
mod error;
mod group;
mod item;
mod layout;
mod merge;
mod placeholder;
mod sanity;
mod snapshot;

pub use anchor::{Anchor, AnchorId, AnchorState};
pub use drop::AvailableLength;
pub use error::LayoutError;
pub use group::AnchorGroup;
pub use item::{Content, Item, ItemId, Panel};
pub use layout::{Layout, LayoutEvent};
pub use placeholder::Hidden;
pub use sanity::{SanityFlags, SanityReport, SanityViolation};
pub use snapshot::{AnchorRecord, ItemRecord, LayoutSnapshot, SnapshotError, SNAPSHOT_VERSION};

pub use dock_core::{LayoutConfig, Location, Orientation, Rect, Side, Size, SplitPolicy};
