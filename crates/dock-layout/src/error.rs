// ABOUTME: Errors returned by layout operations.
// ABOUTME: Every rejected request leaves the layout unchanged.

use crate::anchor::AnchorId;
use crate::item::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Unknown item {0:?}")]
    UnknownItem(ItemId),

    #[error("Unknown anchor {0:?}")]
    UnknownAnchor(AnchorId),

    #[error("Item {0:?} is a placeholder and cannot take part in this operation")]
    PlaceholderItem(ItemId),

    #[error("Item {0:?} is not a placeholder")]
    NotPlaceholder(ItemId),

    #[error("Not enough space: need {needed}, only {available} available")]
    InsufficientSpace { needed: i32, available: i32 },

    #[error("Length {length} is below the minimum {minimum}")]
    BelowMinimum { length: i32, minimum: i32 },

    #[error("Position {position} is outside the allowed range {min}..={max}")]
    OutOfRange { position: i32, min: i32, max: i32 },

    #[error("Anchor {0:?} cannot be moved")]
    AnchorNotMovable(AnchorId),

    #[error("Source layout has no items to merge")]
    EmptySource,
}
