// ABOUTME: Geometry vocabulary shared by the layout engine and its hosts.
// ABOUTME: Orientations, drop locations, anchor sides, sizes and integer rectangles.

use serde::{Deserialize, Serialize};

/// Orientation of a split line.
///
/// A `Vertical` anchor is a vertical line separating items left/right, so its
/// position varies along X. A `Horizontal` anchor varies along Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn other(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }
}

/// Which side of an anchor an item sits on.
///
/// `Side1` is the lower-coordinate side (left of a vertical anchor, above a
/// horizontal one), `Side2` the higher-coordinate side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Side1,
    Side2,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Side1 => Side::Side2,
            Side::Side2 => Side::Side1,
        }
    }
}

/// Edge of a rectangle, used both for anchor-group slots and drop targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    OnLeft,
    OnTop,
    OnRight,
    OnBottom,
}

impl Location {
    pub const ALL: [Location; 4] = [
        Location::OnLeft,
        Location::OnTop,
        Location::OnRight,
        Location::OnBottom,
    ];

    /// Orientation of the anchor bounding this edge.
    pub fn orientation(self) -> Orientation {
        match self {
            Location::OnLeft | Location::OnRight => Orientation::Vertical,
            Location::OnTop | Location::OnBottom => Orientation::Horizontal,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Location::OnLeft => Location::OnRight,
            Location::OnRight => Location::OnLeft,
            Location::OnTop => Location::OnBottom,
            Location::OnBottom => Location::OnTop,
        }
    }

    /// Left and top edges are the low-coordinate edges of a rectangle.
    pub fn is_low_edge(self) -> bool {
        matches!(self, Location::OnLeft | Location::OnTop)
    }

    /// Side of the bounding anchor on which the rectangle itself lies.
    pub fn item_side(self) -> Side {
        if self.is_low_edge() {
            Side::Side2
        } else {
            Side::Side1
        }
    }

    /// The edge an item occupies on the given side of an anchor.
    pub fn for_side(orientation: Orientation, item_side: Side) -> Self {
        match (orientation, item_side) {
            (Orientation::Vertical, Side::Side2) => Location::OnLeft,
            (Orientation::Vertical, Side::Side1) => Location::OnRight,
            (Orientation::Horizontal, Side::Side2) => Location::OnTop,
            (Orientation::Horizontal, Side::Side1) => Location::OnBottom,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Location::OnLeft => "left",
            Location::OnTop => "top",
            Location::OnRight => "right",
            Location::OnBottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Width for `Vertical`, height for `Horizontal`: the extent measured
    /// across anchors of that orientation.
    pub fn length(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Vertical => self.width,
            Orientation::Horizontal => self.height,
        }
    }

    pub fn set_length(&mut self, orientation: Orientation, length: i32) {
        match orientation {
            Orientation::Vertical => self.width = length,
            Orientation::Horizontal => self.height = length,
        }
    }

    pub fn expanded_to(&self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

/// Integer rectangle in canvas pixels. `right()`/`bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }


    /// Start coordinate along the axis anchors of `orientation` move on.
    pub fn start(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Vertical => self.x,
            Orientation::Horizontal => self.y,
        }
    }

    pub fn length(&self, orientation: Orientation) -> i32 {
        self.size().length(orientation)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_orientation_and_sides() {
        assert_eq!(Location::OnLeft.orientation(), Orientation::Vertical);
        assert_eq!(Location::OnBottom.orientation(), Orientation::Horizontal);
        assert_eq!(Location::OnLeft.item_side(), Side::Side2);
        assert_eq!(Location::OnRight.item_side(), Side::Side1);
        for loc in Location::ALL {
            assert_eq!(Location::for_side(loc.orientation(), loc.item_side()), loc);
            assert_eq!(loc.opposite().opposite(), loc);
        }
    }

    #[test]
    fn length_follows_anchor_orientation() {
        let size = Size::new(300, 200);
        assert_eq!(size.length(Orientation::Vertical), 300);
        assert_eq!(size.length(Orientation::Horizontal), 200);
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
        assert!(Rect::new(0, 0, 20, 20).contains_rect(&b));
    }
}
