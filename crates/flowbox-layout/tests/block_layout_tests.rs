//! Integration tests for block flow: margin collapsing, floats, clearance
//! and relayout after mutations.

use flowbox_layout::box_model::LogicalRect;
use flowbox_layout::{LayoutDump, LayoutOptions, LayoutTree, Scene, layout_tree};

fn lay_out(json: &str) -> (LayoutTree, LayoutOptions) {
    let scene = Scene::from_json(json).unwrap();
    let mut tree = scene.build().unwrap();
    layout_tree(&mut tree, &scene.options);
    (tree, scene.options)
}

fn frame(tree: &LayoutTree, name: &str) -> LogicalRect {
    let id = tree.find_by_name(name).unwrap();
    tree[id].frame
}

#[test]
fn test_sibling_margins_collapse_to_the_larger() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "a", "style": { "height": 10, "margin": { "bottom": 20 } } },
            { "id": "b", "style": { "height": 10, "margin": { "top": 30 } } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "b").block_offset, 40.0);
    assert_eq!(tree[tree.root()].frame.block_size, 50.0);
}

#[test]
fn test_positive_and_negative_margins_combine_through_parents() {
    // +10, -5 and +3 all adjoin: the result is max(10, 3) - 5.
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "outer", "style": { "margin": { "top": 10 } }, "children": [
                { "id": "middle", "style": { "margin": { "top": -5 } }, "children": [
                    { "id": "inner", "style": { "height": 20, "margin": { "top": 3 } } }
                ] }
            ] }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "outer").block_offset, 5.0);
    assert_eq!(frame(&tree, "middle").block_offset, 0.0);
    assert_eq!(frame(&tree, "inner").block_offset, 0.0);
    assert_eq!(frame(&tree, "outer").block_size, 20.0);
    assert_eq!(tree[tree.root()].frame.block_size, 25.0);
}

#[test]
fn test_margins_collapse_through_empty_block() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "a", "style": { "height": 10, "margin": { "bottom": 5 } } },
            { "id": "empty", "style": { "margin": { "top": 10, "bottom": 20 } } },
            { "id": "c", "style": { "height": 10, "margin": { "top": 15 } } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "empty").block_size, 0.0);
    assert_eq!(frame(&tree, "c").block_offset, 30.0);
}

#[test]
fn test_border_keeps_child_margin_inside() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "outer", "style": { "border-width": { "top": 1 } }, "children": [
                { "id": "inner", "style": { "height": 10, "margin": { "top": 20 } } }
            ] }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "outer").block_offset, 0.0);
    assert_eq!(frame(&tree, "inner").block_offset, 21.0);
}

#[test]
fn test_quirky_body_margin_is_ignored_in_quirks_mode() {
    let scene = r#"{ "options": { "quirks-mode": QUIRKS }, "root": { "children": [
        { "id": "body", "body": true, "children": [
            { "id": "p", "style": { "margin": { "top": 20 }, "margin-before-quirk": true }, "lines": [20] }
        ] }
    ] } }"#;

    let (standard, _) = lay_out(&scene.replace("QUIRKS", "false"));
    assert_eq!(frame(&standard, "body").block_offset, 20.0);
    assert_eq!(frame(&standard, "p").block_offset, 0.0);

    let (quirks, _) = lay_out(&scene.replace("QUIRKS", "true"));
    assert_eq!(frame(&quirks, "body").block_offset, 0.0);
    assert_eq!(frame(&quirks, "p").block_offset, 0.0);
}

#[test]
fn test_second_float_drops_below_when_both_do_not_fit() {
    let (tree, _) = lay_out(
        r#"{ "options": { "viewport-width": 180 }, "root": { "children": [
            { "id": "left", "style": { "float": "left", "width": 100, "height": 50 } },
            { "id": "right", "style": { "float": "right", "width": 100, "height": 50 } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "left").offset().inline_offset, 0.0);
    assert_eq!(frame(&tree, "right").block_offset, 50.0);
    assert_eq!(frame(&tree, "right").inline_offset, 80.0);
    // The root establishes a formatting context and grows to hold its floats.
    assert_eq!(tree[tree.root()].frame.block_size, 100.0);
}

#[test]
fn test_float_margins_are_used_as_specified() {
    let (tree, _) = lay_out(
        r#"{ "options": { "viewport-width": 180 }, "root": { "children": [
            { "id": "left", "style": { "float": "left", "width": 60, "height": 50, "margin": { "right": "auto" } } },
            { "id": "right", "style": { "float": "right", "width": 100, "height": 50, "margin": { "left": 10 } } }
        ] } }"#,
    );
    let left = tree.find_by_name("left").unwrap();
    let right = tree.find_by_name("right").unwrap();
    assert_eq!(tree[left].margins.line_left, 0.0);
    assert_eq!(tree[left].margins.line_right, 0.0);
    assert_eq!(tree[right].margins.line_left, 10.0);
    assert_eq!(tree[right].margins.line_right, 0.0);
    // 60 + 10 + 100 fits in 180: both floats share the first row.
    assert_eq!(frame(&tree, "right").block_offset, 0.0);
    assert_eq!(frame(&tree, "right").inline_offset, 80.0);
}

#[test]
fn test_clearance_puts_box_below_float_regardless_of_margin() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "style": { "float": "left", "width": 100, "height": 50 } },
            { "id": "cleared", "style": { "clear": "left", "height": 10, "margin": { "top": 20 } } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "cleared").block_offset, 50.0);
}

#[test]
fn test_clear_right_ignores_left_float() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "style": { "float": "left", "width": 100, "height": 50 } },
            { "id": "cleared", "style": { "clear": "right", "height": 10 } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "cleared").block_offset, 0.0);
}

#[test]
fn test_float_intrudes_into_following_block() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "style": { "float": "left", "width": 100, "height": 50 } },
            { "id": "text", "lines": [{ "width": 300, "height": 20 }] }
        ] } }"#,
    );
    let text = tree.find_by_name("text").unwrap();
    assert_eq!(tree[text].frame.block_offset, 0.0);
    assert_eq!(tree[text].frame.inline_size, 800.0);
    assert_eq!(tree[text].lines[0].rect.inline_offset, 100.0);
    assert_eq!(tree[text].lines[0].rect.inline_size, 700.0);
}

#[test]
fn test_overhanging_float_affects_later_siblings() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "para", "lines": [20], "children": [
                { "id": "f", "style": { "float": "left", "width": 100, "height": 100 } }
            ] },
            { "id": "fc", "style": { "display": "flow-root", "height": 10 } },
            { "id": "cleared", "style": { "clear": "left", "height": 10 } }
        ] } }"#,
    );
    let para = tree.find_by_name("para").unwrap();
    assert_eq!(tree[para].frame.block_size, 20.0);
    assert_eq!(tree[para].lines[0].rect.inline_offset, 100.0);

    // The formatting context root sits beside the float, narrowed.
    let fc = frame(&tree, "fc");
    assert_eq!(fc.block_offset, 20.0);
    assert_eq!(fc.inline_offset, 100.0);
    assert_eq!(fc.inline_size, 700.0);

    assert_eq!(frame(&tree, "cleared").block_offset, 100.0);
}

#[test]
fn test_auto_margins_center_fixed_width_box() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "centered", "style": { "width": 200, "height": 10, "margin": { "left": "auto", "right": "auto" } } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "centered").inline_offset, 300.0);
}

#[test]
fn test_hidden_box_takes_no_space() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "style": { "display": "none", "height": 50 } },
            { "id": "b", "style": { "height": 10 } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "b").block_offset, 0.0);
}

#[test]
fn test_absolute_box_sits_at_static_position() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "style": { "height": 30 } },
            { "id": "abs", "style": { "position": "absolute", "width": 50, "height": 50 } },
            { "id": "after", "style": { "height": 10 } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "abs").block_offset, 30.0);
    assert_eq!(frame(&tree, "after").block_offset, 30.0);
}

#[test]
fn test_relayout_after_removal_moves_siblings_up() {
    let scene = Scene::from_json(
        r#"{ "root": { "children": [
            { "id": "a", "style": { "height": 40 } },
            { "id": "b", "style": { "height": 10 } }
        ] }, "mutations": [{ "op": "remove", "target": "a" }] }"#,
    )
    .unwrap();
    let mut tree = scene.build().unwrap();
    layout_tree(&mut tree, &scene.options);
    assert_eq!(frame(&tree, "b").block_offset, 40.0);

    scene.apply_mutations(&mut tree).unwrap();
    assert!(tree[tree.root()].needs_layout);
    layout_tree(&mut tree, &scene.options);
    assert_eq!(frame(&tree, "b").block_offset, 0.0);
    assert_eq!(tree[tree.root()].frame.block_size, 10.0);
}

#[test]
fn test_adjoining_margins_collapse_in_any_order() {
    let permutations = [
        [10, -5, 3],
        [10, 3, -5],
        [-5, 10, 3],
        [-5, 3, 10],
        [3, 10, -5],
        [3, -5, 10],
    ];
    for [outer, middle, inner] in permutations {
        let json = format!(
            r#"{{ "root": {{ "children": [
                {{ "id": "outer", "style": {{ "margin": {{ "top": {outer} }} }}, "children": [
                    {{ "style": {{ "margin": {{ "top": {middle} }} }}, "children": [
                        {{ "style": {{ "height": 20, "margin": {{ "top": {inner} }} }} }}
                    ] }}
                ] }}
            ] }} }}"#
        );
        let (tree, _) = lay_out(&json);
        assert_eq!(frame(&tree, "outer").block_offset, 5.0, "margins {outer}, {middle}, {inner}");
    }
}

#[test]
fn test_background_does_not_stop_margins_collapsing_through() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "id": "a", "style": { "height": 10, "margin": { "bottom": 5 } } },
            { "id": "empty", "style": { "background-color": "teal", "margin": { "top": 10, "bottom": 20 } } },
            { "id": "c", "style": { "height": 10, "margin": { "top": 15 } } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "c").block_offset, 30.0);
}

#[test]
fn test_clear_both_goes_below_lowest_float() {
    let (tree, _) = lay_out(
        r#"{ "root": { "children": [
            { "style": { "float": "left", "width": 100, "height": 50 } },
            { "style": { "float": "right", "width": 100, "height": 80 } },
            { "id": "cleared", "style": { "clear": "both", "height": 10 } }
        ] } }"#,
    );
    assert_eq!(frame(&tree, "cleared").block_offset, 80.0);
}

#[test]
fn test_float_placement_is_deterministic() {
    let json = r#"{ "options": { "viewport-width": 180 }, "root": { "children": [
        { "style": { "float": "left", "width": 100, "height": 50 } },
        { "style": { "float": "right", "width": 100, "height": 50 } },
        { "lines": [{ "width": 60, "height": 20 }, { "width": 150, "height": 20 }] }
    ] } }"#;
    let (first, options) = lay_out(json);
    let (second, _) = lay_out(json);
    assert_eq!(LayoutDump::new(&first, &options), LayoutDump::new(&second, &options));
}
