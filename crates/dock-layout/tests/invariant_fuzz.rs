// ABOUTME: Property tests driving layouts through random operation streams.
// ABOUTME: Checks tiling, minimum sizes and reject-without-mutation after every step.

use std::collections::HashMap;

use dock_layout::{Content, ItemId, Layout, Location, Orientation, Panel, SanityFlags, Size};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add {
        location: usize,
        relative: Option<usize>,
        min: (i32, i32),
        preferred: (i32, i32),
    },
    Remove(usize),
    Hide(usize),
    Restore(usize),
    Resize(usize, i32, bool),
    Drag(usize, i32),
    Canvas(i32, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4, proptest::option::of(0usize..16), (20i32..150, 20i32..150), (0i32..300, 0i32..300))
            .prop_map(|(location, relative, min, preferred)| Op::Add { location, relative, min, preferred }),
        1 => (0usize..16).prop_map(Op::Remove),
        2 => (0usize..16).prop_map(Op::Hide),
        2 => (0usize..16).prop_map(Op::Restore),
        2 => (0usize..16, 0i32..400, any::<bool>()).prop_map(|(i, len, vertical)| Op::Resize(i, len, vertical)),
        2 => (0usize..16, 0i32..1000).prop_map(|(i, pos)| Op::Drag(i, pos)),
        1 => (200i32..1000, 200i32..1000).prop_map(|(w, h)| Op::Canvas(w, h)),
    ]
}

struct Harness {
    layout: Layout<Panel>,
    items: Vec<ItemId>,
    hidden: HashMap<ItemId, Panel>,
    next_key: usize,
}

impl Harness {
    fn new() -> Self {
        Self {
            layout: Layout::with_size(Size::new(600, 500)),
            items: Vec::new(),
            hidden: HashMap::new(),
            next_key: 0,
        }
    }

    fn pick(&self, index: usize) -> Option<ItemId> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items[index % self.items.len()])
        }
    }

    /// Applies one operation. Returns false when the layout rejected it.
    fn apply(&mut self, op: &Op) -> bool {
        match *op {
            Op::Add {
                location,
                relative,
                min,
                preferred,
            } => {
                self.next_key += 1;
                let content = Panel::new(format!("p{}", self.next_key), Size::new(min.0, min.1))
                    .with_preferred(Size::new(preferred.0, preferred.1));
                let relative = relative.and_then(|i| self.pick(i));
                match self.layout.add_item(content, Location::ALL[location], relative) {
                    Ok(id) => {
                        self.items.push(id);
                        self.layout.ref_item(id).is_ok()
                    }
                    Err(_) => false,
                }
            }
            Op::Remove(i) => match self.pick(i) {
                Some(id) => {
                    self.items.retain(|&x| x != id);
                    self.hidden.remove(&id);
                    self.layout.remove_item(id).is_ok()
                }
                None => false,
            },
            Op::Hide(i) => match self.pick(i).map(|id| (id, self.layout.hide_item(id))) {
                Some((id, Ok(hidden))) => {
                    if let Some(content) = hidden.contents.into_iter().next() {
                        self.hidden.insert(id, content);
                    }
                    true
                }
                _ => false,
            },
            Op::Restore(i) => {
                let Some(id) = self.pick(i) else {
                    return false;
                };
                let Some(content) = self.hidden.get(&id).cloned() else {
                    return false;
                };
                let restored = self.layout.restore_placeholder(id, content, 0).is_ok();
                if restored {
                    self.hidden.remove(&id);
                }
                restored
            }
            Op::Resize(i, length, vertical) => {
                let orientation = if vertical {
                    Orientation::Vertical
                } else {
                    Orientation::Horizontal
                };
                self.pick(i)
                    .is_some_and(|id| self.layout.resize_item(id, length, orientation).is_ok())
            }
            Op::Drag(i, position) => {
                let anchors = self.layout.non_static_anchors();
                if anchors.is_empty() {
                    return false;
                }
                let anchor = anchors[i % anchors.len()];
                self.layout.drag_anchor(anchor, position).is_ok()
            }
            Op::Canvas(w, h) => {
                self.layout.set_contents_size(Size::new(w, h));
                true
            }
        }
    }

    fn check(&self) -> Result<(), TestCaseError> {
        let report = self
            .layout
            .check_sanity(SanityFlags::TOPOLOGY | SanityFlags::GEOMETRY | SanityFlags::DUMP);
        prop_assert!(report.is_sane(), "{}", report);

        for id in self.layout.visible_item_ids() {
            for orientation in [Orientation::Vertical, Orientation::Horizontal] {
                let length = self.layout.item_length(id, orientation).unwrap_or(0);
                let min = self.layout.item_min_length(id, orientation);
                prop_assert!(length >= min, "{:?} is {} long, needs {}", id, length, min);
            }
        }

        // An edge drop can take all the slack between the canvas and the
        // minimum size, less the divider it adds.
        let min = self.layout.minimum_size();
        let size = self.layout.contents_size();
        let divider = if self.layout.visible_count() > 0 { 5 } else { 0 };
        for location in Location::ALL {
            let available = self.layout.available_length_for_drop(location, None);
            prop_assert!(available.is_ok());
            let available = available.unwrap_or_default();
            prop_assert!(available.side1 >= 0 && available.side2 >= 0);
            let orientation = location.orientation();
            let slack = size.length(orientation) - min.length(orientation) - divider;
            prop_assert_eq!(available.total(), slack.max(0), "{:?}", location);
        }

        prop_assert!(size.width >= min.width && size.height >= min.height);
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_operations_keep_the_layout_sane(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut harness = Harness::new();
        for op in &ops {
            let before = harness.layout.snapshot();
            let applied = harness.apply(op);
            if !applied && !matches!(op, Op::Remove(_)) {
                prop_assert_eq!(&harness.layout.snapshot(), &before, "{:?} was rejected but changed the layout", op);
            }
            harness.check()?;
        }
    }

    #[test]
    fn hide_then_restore_keeps_the_item_between_the_same_anchors(
        ops in proptest::collection::vec(op_strategy(), 1..20),
        pick in 0usize..16,
    ) {
        let mut harness = Harness::new();
        for op in &ops {
            harness.apply(op);
        }
        let visible = harness.layout.visible_item_ids();
        prop_assume!(!visible.is_empty());
        let id = visible[pick % visible.len()];
        let group = *harness.layout.item(id).map(|i| i.anchor_group()).ok_or_else(|| TestCaseError::fail("missing item"))?;

        let hidden = harness.layout.hide_item(id);
        prop_assert!(hidden.is_ok());
        let content = hidden.map(|h| h.contents).unwrap_or_default().into_iter().next();
        prop_assume!(content.is_some());
        harness.check()?;

        if let Some(content) = content {
            let key = content.key().to_string();
            if harness.layout.restore_placeholder(id, content, 0).is_ok() {
                let item = harness.layout.item(id);
                prop_assert_eq!(item.map(|i| *i.anchor_group()), Some(group));
                prop_assert_eq!(harness.layout.item_for_key(&key), Some(id));
                harness.check()?;
            }
        }
    }
}
