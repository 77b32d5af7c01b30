// ABOUTME: Consistency checks over the anchor/item graph and the tiling it produces.
// ABOUTME: Reports every violation found, optionally with a textual dump of the layout.

use std::fmt::{self, Write};

use bitflags::bitflags;
use dock_core::{Location, Orientation, Rect, Side};

use crate::anchor::AnchorId;
use crate::item::{Content, ItemId};
use crate::layout::Layout;

bitflags! {
    /// Which checks [`Layout::check_sanity`] runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SanityFlags: u8 {
        /// Anchor and item references agree with each other
        const TOPOLOGY = 1;
        /// Visible items respect their minimums and tile the canvas
        const GEOMETRY = 1 << 1;
        /// Attach a dump of the layout to the report
        const DUMP = 1 << 2;
    }
}

/// One broken invariant. Anchors and items are named by creation serial.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanityViolation {
    #[error("static {location} anchor is missing")]
    MissingStatic { location: &'static str },

    #[error("static anchor #{anchor} is {problem}")]
    StaticAnchor { anchor: u64, problem: &'static str },

    #[error("anchor #{anchor} has a missing or parallel {bound} bound")]
    BadBound { anchor: u64, bound: &'static str },

    #[error("anchor #{anchor} follows a missing, perpendicular or cyclic chain")]
    BadFollow { anchor: u64 },

    #[error("anchor #{anchor} separates nothing on one of its sides")]
    UnneededAnchor { anchor: u64 },

    #[error("anchor #{anchor} lists an item that no longer exists")]
    MissingItem { anchor: u64 },

    #[error("anchor #{anchor} lists item #{item} which it does not bound")]
    StrayItem { anchor: u64, item: u64 },

    #[error("item #{item} has a missing or misoriented {location} anchor")]
    InvalidGroup { item: u64, location: &'static str },

    #[error("item #{item} is missing from its {location} anchor's list")]
    UnregisteredItem { item: u64, location: &'static str },

    #[error("item #{item} is {length} long across {orientation:?} anchors, below its minimum {minimum}")]
    BelowMinimum {
        item: u64,
        orientation: Orientation,
        length: i32,
        minimum: i32,
    },

    #[error("item #{item} lies outside the canvas")]
    OutsideCanvas { item: u64 },

    #[error("items #{first} and #{second} overlap")]
    Overlap { first: u64, second: u64 },

    #[error("canvas area at ({x}, {y}) is covered by neither an item nor an anchor")]
    Gap { x: i32, y: i32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanityReport {
    pub violations: Vec<SanityViolation>,
    pub dump: Option<String>,
}

impl SanityReport {
    pub fn is_sane(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for SanityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sane() {
            writeln!(f, "layout is sane")?;
        } else {
            writeln!(f, "{} violation(s):", self.violations.len())?;
            for violation in &self.violations {
                writeln!(f, "  - {}", violation)?;
            }
        }
        if let Some(dump) = &self.dump {
            write!(f, "{}", dump)?;
        }
        Ok(())
    }
}

impl<C: Content> Layout<C> {
    pub fn check_sanity(&self, flags: SanityFlags) -> SanityReport {
        let mut violations = Vec::new();
        if flags.contains(SanityFlags::TOPOLOGY) {
            self.check_statics(&mut violations);
            self.check_anchors(&mut violations);
            self.check_items(&mut violations);
        }
        if flags.contains(SanityFlags::GEOMETRY) {
            self.check_geometry(&mut violations);
        }
        if !violations.is_empty() {
            tracing::error!("Layout sanity check found {} violation(s)", violations.len());
        }
        SanityReport {
            violations,
            dump: flags.contains(SanityFlags::DUMP).then(|| self.dump()),
        }
    }

    fn serial_of(&self, anchor: AnchorId) -> u64 {
        self.anchors.get(anchor).map_or(u64::MAX, |a| a.serial())
    }

    fn item_serial(&self, item: ItemId) -> u64 {
        self.items.get(item).map_or(u64::MAX, |i| i.serial())
    }

    fn check_statics(&self, out: &mut Vec<SanityViolation>) {
        let static_thickness = self.config.static_anchor_thickness;
        for location in Location::ALL {
            let id = self.static_group.anchor(location);
            let Some(anchor) = self.anchors.get(id) else {
                out.push(SanityViolation::MissingStatic {
                    location: location.label(),
                });
                continue;
            };
            let orientation = location.orientation();
            let expected = if location.is_low_edge() {
                0
            } else {
                self.contents_size.length(orientation) - static_thickness
            };
            let problem = if !anchor.is_static() {
                Some("not marked static")
            } else if anchor.is_following() {
                Some("following another anchor")
            } else if anchor.orientation() != orientation {
                Some("misoriented")
            } else if anchor.position() != expected {
                Some("away from the canvas edge")
            } else {
                None
            };
            if let Some(problem) = problem {
                out.push(SanityViolation::StaticAnchor {
                    anchor: anchor.serial(),
                    problem,
                });
            }
        }
    }

    fn check_anchors(&self, out: &mut Vec<SanityViolation>) {
        for id in self.anchor_ids() {
            let anchor = &self.anchors[id];
            let serial = anchor.serial();

            for (bound, target) in [("from", anchor.from()), ("to", anchor.to())] {
                let ok = target
                    .and_then(|t| self.anchors.get(t))
                    .is_some_and(|t| t.orientation() != anchor.orientation());
                if !ok {
                    out.push(SanityViolation::BadBound {
                        anchor: serial,
                        bound,
                    });
                }
            }

            if let Some(target) = anchor.followee() {
                let oriented = self
                    .anchors
                    .get(target)
                    .is_some_and(|t| t.orientation() == anchor.orientation());
                let root = self.root(id);
                let terminates = self.anchors.get(root).is_some_and(|r| !r.is_following());
                if !oriented || !terminates {
                    out.push(SanityViolation::BadFollow { anchor: serial });
                }
            }

            if anchor.is_unneeded() {
                out.push(SanityViolation::UnneededAnchor { anchor: serial });
            }

            for side in [Side::Side1, Side::Side2] {
                let location = Location::for_side(anchor.orientation(), side);
                for &item in anchor.items(side) {
                    match self.items.get(item) {
                        None => out.push(SanityViolation::MissingItem { anchor: serial }),
                        Some(i) if i.anchor_group().anchor(location) != id => {
                            out.push(SanityViolation::StrayItem {
                                anchor: serial,
                                item: i.serial(),
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }

    fn check_items(&self, out: &mut Vec<SanityViolation>) {
        for id in self.item_ids() {
            let item = &self.items[id];
            let group = item.anchor_group();
            for location in Location::ALL {
                let anchor = group.anchor(location);
                match self.anchors.get(anchor) {
                    Some(a) if a.orientation() == location.orientation() => {
                        if !a.contains_item(id, location.item_side()) {
                            out.push(SanityViolation::UnregisteredItem {
                                item: item.serial(),
                                location: location.label(),
                            });
                        }
                    }
                    _ => out.push(SanityViolation::InvalidGroup {
                        item: item.serial(),
                        location: location.label(),
                    }),
                }
            }
        }
    }

    fn check_geometry(&self, out: &mut Vec<SanityViolation>) {
        let canvas = self.group_geometry(&self.static_group);
        let visible: Vec<(ItemId, Rect)> = self
            .visible_item_ids()
            .into_iter()
            .filter_map(|id| self.item_geometry(id).map(|r| (id, r)))
            .collect();

        for &(id, rect) in &visible {
            let min = self.item_min_size(id);
            for orientation in [Orientation::Vertical, Orientation::Horizontal] {
                let length = rect.length(orientation);
                let minimum = min.length(orientation);
                if length < minimum {
                    out.push(SanityViolation::BelowMinimum {
                        item: self.item_serial(id),
                        orientation,
                        length,
                        minimum,
                    });
                }
            }
            if !canvas.contains_rect(&rect) {
                out.push(SanityViolation::OutsideCanvas {
                    item: self.item_serial(id),
                });
            }
        }

        for (index, &(first, a)) in visible.iter().enumerate() {
            for &(second, b) in &visible[index + 1..] {
                if a.intersects(&b) {
                    out.push(SanityViolation::Overlap {
                        first: self.item_serial(first),
                        second: self.item_serial(second),
                    });
                }
            }
        }

        if visible.is_empty() {
            return;
        }
        let mut covers: Vec<Rect> = visible
            .iter()
            .map(|&(_, r)| r)
            .filter(|r| !r.is_empty())
            .collect();
        covers.extend(self.anchor_bands());
        if let Some((x, y)) = first_gap(canvas, &covers) {
            out.push(SanityViolation::Gap { x, y });
        }
    }

    /// Area each active divider occupies: its thickness across the hull of
    /// the visible items it touches.
    fn anchor_bands(&self) -> Vec<Rect> {
        let mut bands = Vec::new();
        for (id, anchor) in &self.anchors {
            if anchor.is_static() || anchor.is_following() {
                continue;
            }
            let cross = anchor.orientation().other();
            let mut hull: Option<(i32, i32)> = None;
            for side in [Side::Side1, Side::Side2] {
                for item in self.class_visible_items(id, side) {
                    let Some(rect) = self.item_geometry(item) else {
                        continue;
                    };
                    let start = rect.start(cross);
                    let end = start + rect.length(cross);
                    hull = Some(match hull {
                        Some((s, e)) => (s.min(start), e.max(end)),
                        None => (start, end),
                    });
                }
            }
            if let Some((start, end)) = hull {
                let position = anchor.position();
                let thickness = self.thickness(id);
                bands.push(match anchor.orientation() {
                    Orientation::Vertical => Rect::new(position, start, thickness, end - start),
                    Orientation::Horizontal => Rect::new(start, position, end - start, thickness),
                });
            }
        }
        bands
    }

    /// Human-readable description of every anchor and item.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let size = self.contents_size;
        let min = self.minimum_size();
        let _ = writeln!(
            out,
            "Layout {}x{} (min {}x{}): {} items, {} visible, {} dividers",
            size.width,
            size.height,
            min.width,
            min.height,
            self.count(),
            self.visible_count(),
            self.non_static_anchors().len()
        );

        let names = |ids: &[ItemId]| {
            ids.iter()
                .map(|&i| format!("#{}", self.item_serial(i)))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let bound = |anchor: Option<AnchorId>| match anchor {
            Some(a) => format!("#{}", self.serial_of(a)),
            None => "-".to_string(),
        };

        for id in self.anchor_ids() {
            let a = &self.anchors[id];
            let _ = write!(
                out,
                "  anchor #{} {:?}{} pos={} th={} from={} to={}",
                a.serial(),
                a.orientation(),
                if a.is_static() { " static" } else { "" },
                self.position(id),
                self.thickness(id),
                bound(a.from()),
                bound(a.to())
            );
            if let Some(target) = a.followee() {
                let _ = write!(out, " follows=#{}", self.serial_of(target));
            }
            let _ = writeln!(
                out,
                " side1=[{}] side2=[{}]",
                names(a.items(Side::Side1)),
                names(a.items(Side::Side2))
            );
        }

        for id in self.item_ids() {
            let item = &self.items[id];
            let rect = self.group_geometry(item.anchor_group());
            let group = item.anchor_group();
            let tabs: Vec<&str> = item.contents().iter().map(|c| c.key()).collect();
            let _ = writeln!(
                out,
                "  item #{}{} rect=({}, {}, {}x{}) min={}x{} refs={} tabs=[{}] bounds={}/{}/{}/{}",
                item.serial(),
                if item.is_placeholder() { " placeholder" } else { "" },
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                self.item_min_size(id).width,
                self.item_min_size(id).height,
                item.ref_count(),
                tabs.join(", "),
                bound(Some(group.left)),
                bound(Some(group.top)),
                bound(Some(group.right)),
                bound(Some(group.bottom))
            );
        }
        out
    }
}

/// Top-left corner of the first canvas cell no rectangle covers.
fn first_gap(canvas: Rect, covers: &[Rect]) -> Option<(i32, i32)> {
    let clamp_x = |x: i32| x.clamp(canvas.x, canvas.right());
    let clamp_y = |y: i32| y.clamp(canvas.y, canvas.bottom());
    let mut xs = vec![canvas.x, canvas.right()];
    let mut ys = vec![canvas.y, canvas.bottom()];
    for r in covers {
        xs.extend([clamp_x(r.x), clamp_x(r.right())]);
        ys.extend([clamp_y(r.y), clamp_y(r.bottom())]);
    }
    xs.sort_unstable();
    xs.dedup();
    ys.sort_unstable();
    ys.dedup();

    for row in ys.windows(2) {
        for column in xs.windows(2) {
            let cell = Rect::new(column[0], row[0], column[1] - column[0], row[1] - row[0]);
            if cell.is_empty() {
                continue;
            }
            if !covers.iter().any(|r| r.contains_rect(&cell)) {
                return Some((cell.x, cell.y));
            }
        }
    }
    None
}
