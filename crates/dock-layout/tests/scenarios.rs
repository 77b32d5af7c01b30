// ABOUTME: End-to-end layout scenarios with exact expected geometry.
// ABOUTME: Covers drop planning, removal fairness, placeholders and canvas resizes.

use dock_layout::{
    AvailableLength, Content, ItemId, Layout, LayoutError, Location, Orientation, Panel, Rect, SanityFlags, Size,
};
use pretty_assertions::assert_eq;

fn panel(key: &str) -> Panel {
    Panel::new(key, Size::new(100, 100))
}

fn assert_sane(layout: &Layout<Panel>) {
    let report = layout.check_sanity(SanityFlags::TOPOLOGY | SanityFlags::GEOMETRY);
    assert!(report.is_sane(), "{report}");
}

fn width(layout: &Layout<Panel>, item: ItemId) -> i32 {
    layout.item_length(item, Orientation::Vertical).unwrap()
}

/// Three items stacked top to bottom, the upper two resized to 110 high.
fn stacked() -> (Layout<Panel>, [ItemId; 3]) {
    let mut layout = Layout::with_size(Size::new(500, 500));
    let w1 = layout.add_item(panel("w1"), Location::OnBottom, None).unwrap();
    let w2 = layout.add_item(panel("w2"), Location::OnBottom, None).unwrap();
    let w3 = layout.add_item(panel("w3"), Location::OnBottom, None).unwrap();
    layout.resize_item(w1, 110, Orientation::Horizontal).unwrap();
    layout.resize_item(w2, 110, Orientation::Horizontal).unwrap();
    assert_eq!(layout.item_length(w1, Orientation::Horizontal), Some(110));
    assert_eq!(layout.item_length(w2, Orientation::Horizontal), Some(110));
    (layout, [w1, w2, w3])
}

/// Three items side by side, each 110 wide.
fn row_of_three() -> (Layout<Panel>, [ItemId; 3]) {
    let mut layout = Layout::with_size(Size::new(342, 300));
    let w1 = layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
    let w2 = layout.add_item(panel("w2"), Location::OnRight, None).unwrap();
    let w3 = layout.add_item(panel("w3"), Location::OnRight, None).unwrap();
    for item in [w1, w2, w3] {
        layout.resize_item(item, 110, Orientation::Vertical).unwrap();
    }
    for item in [w1, w2, w3] {
        assert_eq!(width(&layout, item), 110);
    }
    (layout, [w1, w2, w3])
}

#[test]
fn empty_canvas_offers_everything_but_the_borders() {
    let layout: Layout<Panel> = Layout::with_size(Size::new(500, 500));
    let expected = [
        (Location::OnTop, AvailableLength::new(0, 498)),
        (Location::OnLeft, AvailableLength::new(0, 498)),
        (Location::OnRight, AvailableLength::new(498, 0)),
        (Location::OnBottom, AvailableLength::new(498, 0)),
    ];
    for (location, available) in expected {
        assert_eq!(layout.available_length_for_drop(location, None), Ok(available));
    }
}

#[test]
fn one_item_offers_the_same_space_inside_and_outside() {
    let mut layout = Layout::with_size(Size::new(500, 500));
    let w1 = layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
    let expected = [
        (Location::OnTop, AvailableLength::new(0, 393)),
        (Location::OnLeft, AvailableLength::new(0, 393)),
        (Location::OnRight, AvailableLength::new(393, 0)),
        (Location::OnBottom, AvailableLength::new(393, 0)),
    ];
    for relative_to in [None, Some(w1)] {
        for (location, available) in expected {
            assert_eq!(
                layout.available_length_for_drop(location, relative_to),
                Ok(available),
                "{location:?} {relative_to:?}"
            );
        }
    }
}

#[test]
fn stacked_items_offer_what_their_minimums_leave() {
    let (layout, [w1, _, w3]) = stacked();
    let total = 500 - 2 - 2 * 5 - 3 * 100 - 5;
    assert_eq!(
        layout.available_length_for_drop(Location::OnTop, None),
        Ok(AvailableLength::new(0, total))
    );
    assert_eq!(
        layout.available_length_for_drop(Location::OnBottom, Some(w3)),
        Ok(AvailableLength::new(total, 0))
    );
    assert_eq!(
        layout.available_length_for_drop(Location::OnBottom, Some(w1)),
        Ok(AvailableLength::new(10, total - 10))
    );
    assert_sane(&layout);
}

#[test]
fn drop_rects_on_an_empty_canvas() {
    let layout: Layout<Panel> = Layout::with_size(Size::new(500, 500));
    let content = Panel::new("w1", Size::new(100, 100)).with_preferred(Size::new(200, 200));
    let rect = |location| {
        layout
            .rect_for_drop(content.min_size(), content.preferred_size(), location, None)
            .unwrap()
    };
    assert_eq!(rect(Location::OnLeft), Rect::new(1, 1, 200, 498));
    assert_eq!(rect(Location::OnTop), Rect::new(1, 1, 498, 200));
    assert_eq!(rect(Location::OnRight), Rect::new(299, 1, 200, 498));
    assert_eq!(rect(Location::OnBottom), Rect::new(1, 299, 498, 200));
}

#[test]
fn first_item_fills_the_canvas() {
    let mut layout = Layout::with_size(Size::new(500, 500));
    let content = panel("w1").with_preferred(Size::new(200, 200));
    let w1 = layout.add_item(content, Location::OnRight, None).unwrap();
    assert_eq!(layout.item_geometry(w1), Some(Rect::new(1, 1, 498, 498)));
    assert_eq!(*layout.item(w1).unwrap().anchor_group(), layout.static_anchor_group());
}

#[test]
fn new_dividers_span_their_target() {
    let mut layout = Layout::with_size(Size::new(500, 500));
    let w1 = layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
    let w2 = layout.add_item(panel("w2"), Location::OnRight, None).unwrap();
    let w3 = layout.add_item(panel("w3"), Location::OnBottom, Some(w2)).unwrap();
    let statics = layout.static_anchor_group();

    let full = layout.item(w1).unwrap().anchor_group().right;
    let anchor = layout.anchor(full).unwrap();
    assert_eq!(anchor.from(), Some(statics.top));
    assert_eq!(anchor.to(), Some(statics.bottom));

    let nested = layout.item(w3).unwrap().anchor_group().top;
    let anchor = layout.anchor(nested).unwrap();
    assert_eq!(anchor.orientation(), Orientation::Horizontal);
    assert_eq!(anchor.from(), Some(full));
    assert_eq!(anchor.to(), Some(statics.right));
    assert_eq!(layout.item(w2).unwrap().anchor_group().bottom, nested);

    // w1 is untouched by the nested split
    assert_eq!(layout.item_length(w1, Orientation::Horizontal), Some(498));
    assert_sane(&layout);
}

#[test]
fn drops_that_do_not_fit_change_nothing() {
    let mut layout = Layout::with_size(Size::new(300, 300));
    layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
    let before = layout.snapshot();
    let err = layout
        .add_item(Panel::new("wide", Size::new(250, 100)), Location::OnLeft, None)
        .unwrap_err();
    assert_eq!(err, LayoutError::InsufficientSpace { needed: 250, available: 193 });
    assert_eq!(layout.snapshot(), before);
}

#[test]
fn removing_the_middle_item_is_fair() {
    let (mut layout, [w1, w2, w3]) = row_of_three();
    layout.remove_item(w2).unwrap();
    let grown1 = width(&layout, w1) - 110;
    let grown3 = width(&layout, w3) - 110;
    assert_eq!(grown1 + grown3, 110 + 5);
    assert!((grown1 - grown3).abs() <= 1, "{grown1} vs {grown3}");
    assert_eq!(layout.non_static_anchors().len(), 1);
    assert_sane(&layout);
}

#[test]
fn removing_an_edge_item_hands_its_space_to_the_neighbour() {
    let (mut layout, [w1, w2, w3]) = row_of_three();
    layout.remove_item(w3).unwrap();
    assert_eq!(width(&layout, w1) + width(&layout, w2), 340 - 5);
    assert_eq!(layout.item_geometry(w2).unwrap().right(), 341);
    assert_sane(&layout);
}

#[test]
fn hidden_item_comes_back_between_the_same_anchors() {
    let (mut layout, [w1, w2, w3]) = row_of_three();
    let group = *layout.item(w2).unwrap().anchor_group();
    layout.ref_item(w2).unwrap();

    let hidden = layout.hide_item(w2).unwrap();
    assert_eq!(hidden.placeholder, Some(w2));
    assert_eq!(width(&layout, w1) + width(&layout, w3), 340 - 5);
    assert_eq!(layout.visible_count(), 2);
    assert_sane(&layout);

    let content = hidden.contents.into_iter().next().unwrap();
    assert_eq!(layout.restore_placeholder(w2, content, 0), Ok(0));
    assert_eq!(*layout.item(w2).unwrap().anchor_group(), group);
    assert_eq!(width(&layout, w2), 110);
    assert_eq!(layout.visible_count(), 3);
    assert_sane(&layout);
}

#[test]
fn unreferenced_placeholder_disappears() {
    let (mut layout, [_, w2, _]) = row_of_three();
    layout.ref_item(w2).unwrap();
    layout.hide_item(w2).unwrap();
    assert_eq!(layout.placeholder_count(), 1);
    assert_eq!(layout.unref_item(w2), Ok(0));
    assert_eq!(layout.count(), 2);
    assert!(layout.item(w2).is_none());
    assert_sane(&layout);
}

#[test]
fn canvas_resize_keeps_proportions() {
    let mut layout = Layout::with_size(Size::new(501, 300));
    let w1 = layout.add_item(panel("w1"), Location::OnLeft, None).unwrap();
    let w2 = layout.add_item(panel("w2"), Location::OnRight, None).unwrap();
    let divider = layout.item(w1).unwrap().anchor_group().right;
    let before = layout.anchor(divider).unwrap().position();

    assert_eq!(layout.set_contents_size(Size::new(1001, 300)), Size::new(1001, 300));
    let after = layout.anchor(divider).unwrap().position();
    assert_eq!(after, before * 2);
    assert_eq!(layout.item_geometry(w2).unwrap().right(), 1000);
    assert_sane(&layout);

    assert_eq!(layout.set_contents_size(Size::new(10, 10)), layout.minimum_size());
    assert!(width(&layout, w1) >= 100 && width(&layout, w2) >= 100);
    assert_sane(&layout);
}

fn small(key: &str) -> Panel {
    Panel::new(key, Size::new(20, 20))
}

fn assert_at_least_minimum(layout: &Layout<Panel>) {
    for item in layout.visible_item_ids() {
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let length = layout.item_length(item, orientation).unwrap();
            assert!(length >= layout.item_min_length(item, orientation), "{}", layout.dump());
        }
    }
}

#[test]
fn nested_drop_pushes_dividers_it_overtakes() {
    let mut layout = Layout::with_size(Size::new(600, 500));
    layout.add_item(small("w1"), Location::OnLeft, None).unwrap();
    let w2 = layout.add_item(small("w2"), Location::OnBottom, None).unwrap();
    layout.add_item(small("w3"), Location::OnTop, None).unwrap();
    let divider = layout.non_static_anchors()[1];
    layout.drag_anchor(divider, 350).unwrap();

    let tall = Panel::new("w4", Size::new(20, 95));
    let w4 = layout.add_item(tall, Location::OnTop, Some(w2)).unwrap();
    assert!(layout.item_length(w4, Orientation::Horizontal).unwrap() >= 95);
    assert_at_least_minimum(&layout);
    assert_sane(&layout);
}

#[test]
fn wide_drop_after_a_drag_keeps_widths_positive() {
    let mut layout = Layout::with_size(Size::new(600, 500));
    layout.add_item(small("p1"), Location::OnLeft, None).unwrap();
    let p2 = small("p2").with_preferred(Size::new(103, 0));
    layout.add_item(p2, Location::OnLeft, None).unwrap();
    layout.add_item(small("p3"), Location::OnRight, None).unwrap();
    layout.add_item(small("p4"), Location::OnTop, None).unwrap();
    let divider = layout.non_static_anchors()[0];
    layout.drag_anchor(divider, 447).unwrap();
    layout.add_item(small("p5"), Location::OnLeft, None).unwrap();

    let before = layout.snapshot();
    let wide = Panel::new("p6", Size::new(123, 20));
    if layout.add_item(wide, Location::OnRight, None).is_err() {
        assert_eq!(layout.snapshot(), before);
    }
    for item in layout.visible_item_ids() {
        let rect = layout.item_geometry(item).unwrap();
        assert!(rect.width > 0 && rect.height > 0, "{}", layout.dump());
    }
    assert_at_least_minimum(&layout);
    assert_sane(&layout);
}

#[test]
fn restoring_next_to_a_collapsed_neighbour_keeps_its_height() {
    let mut layout = Layout::with_size(Size::new(600, 500));
    let w1 = layout.add_item(small("w1"), Location::OnLeft, None).unwrap();
    let w2 = layout.add_item(small("w2"), Location::OnTop, None).unwrap();
    let w3 = layout.add_item(small("w3"), Location::OnBottom, None).unwrap();
    for item in [w1, w2, w3] {
        layout.ref_item(item).unwrap();
    }
    layout.hide_item(w1).unwrap();
    let w4 = layout.add_item(small("w4"), Location::OnLeft, None).unwrap();
    layout.ref_item(w4).unwrap();
    let mut hidden = layout.hide_item(w2).unwrap();
    assert_sane(&layout);

    let content = hidden.contents.remove(0);
    assert_eq!(layout.restore_placeholder(w2, content, 0), Ok(0));
    let r2 = layout.item_geometry(w2).unwrap();
    let r3 = layout.item_geometry(w3).unwrap();
    assert_eq!(r2.y, 1);
    assert!(r2.height >= 20, "{}", layout.dump());
    assert!(r3.y >= r2.bottom() + 5);
    assert!(!layout.is_collapsed(w2, Orientation::Horizontal));
    assert!(layout.is_collapsed(w1, Orientation::Horizontal));
    assert_at_least_minimum(&layout);
    assert_sane(&layout);
}
