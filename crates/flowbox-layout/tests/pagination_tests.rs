//! Integration tests for paged layout: struts, forced breaks, orphans and
//! widows, and margins at page boundaries.

use flowbox_layout::{LayoutTree, Scene, layout_tree};

fn lay_out(json: &str) -> LayoutTree {
    let scene = Scene::from_json(json).unwrap();
    let mut tree = scene.build().unwrap();
    layout_tree(&mut tree, &scene.options);
    tree
}

fn top(tree: &LayoutTree, name: &str) -> f32 {
    tree[tree.find_by_name(name).unwrap()].frame.block_offset
}

fn strut(tree: &LayoutTree, name: &str) -> f32 {
    tree[tree.find_by_name(name).unwrap()].pagination_strut
}

#[test]
fn test_unsplittable_box_moves_to_next_page() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 500 }, "root": { "children": [
            { "style": { "height": 450 } },
            { "id": "img", "replaced": { "width": 100, "height": 100 } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "img"), 500.0);
    assert_eq!(strut(&tree, "img"), 50.0);
    assert_eq!(tree[tree.root()].frame.block_size, 600.0);
}

#[test]
fn test_splittable_box_stays_across_boundary() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 500 }, "root": { "children": [
            { "style": { "height": 450 } },
            { "id": "b", "style": { "height": 100 } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "b"), 450.0);
    assert_eq!(strut(&tree, "b"), 0.0);
}

#[test]
fn test_unsplittable_box_taller_than_page_stays_put() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 100 }, "root": { "children": [
            { "style": { "height": 50 } },
            { "id": "img", "replaced": { "width": 100, "height": 150 } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "img"), 50.0);
    assert_eq!(strut(&tree, "img"), 0.0);
}

#[test]
fn test_break_before_page_starts_new_page() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 500 }, "root": { "children": [
            { "style": { "height": 100 } },
            { "id": "b", "style": { "height": 10, "break-before": "page" } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "b"), 500.0);
    assert_eq!(strut(&tree, "b"), 400.0);
}

#[test]
fn test_break_after_on_previous_sibling_forces_break() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 500 }, "root": { "children": [
            { "style": { "height": 100, "break-after": "page" } },
            { "id": "b", "style": { "height": 10 } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "b"), 500.0);
}

#[test]
fn test_forced_break_ignored_without_fragmentation() {
    let tree = lay_out(
        r#"{ "root": { "children": [
            { "style": { "height": 100 } },
            { "id": "b", "style": { "height": 10, "break-before": "page" } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "b"), 100.0);
}

#[test]
fn test_own_margin_survives_forced_break() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 500 }, "root": { "children": [
            { "style": { "height": 100, "margin": { "bottom": 40 } } },
            { "id": "b", "style": { "height": 10, "break-before": "page", "margin": { "top": 30 } } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "b"), 530.0);
}

#[test]
fn test_margin_is_truncated_at_unforced_break() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 500 }, "root": { "children": [
            { "style": { "height": 480 } },
            { "id": "b", "style": { "height": 10, "margin": { "top": 50 } } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "b"), 500.0);
}

#[test]
fn test_first_line_at_boundary_pushes_its_container() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 100 }, "root": { "children": [
            { "style": { "height": 90 } },
            { "id": "p", "lines": [20, 20, 20] }
        ] } }"#,
    );
    let p = tree.find_by_name("p").unwrap();
    assert_eq!(tree[p].frame.block_offset, 100.0);
    assert_eq!(tree[p].pagination_strut, 10.0);
    assert_eq!(tree[p].lines[0].rect.block_offset, 0.0);
    assert_eq!(tree[p].lines[0].pagination_strut, 0.0);
}

#[test]
fn test_orphans_push_whole_paragraph() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 100 }, "root": { "children": [
            { "style": { "height": 70 } },
            { "id": "p", "style": { "orphans": 2 }, "lines": [20, 20, 20, 20] }
        ] } }"#,
    );
    assert_eq!(top(&tree, "p"), 100.0);
    assert_eq!(strut(&tree, "p"), 30.0);
}

#[test]
fn test_single_orphan_allowed_splits_paragraph() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 100 }, "root": { "children": [
            { "style": { "height": 70 } },
            { "id": "p", "style": { "orphans": 1 }, "lines": [20, 20, 20, 20] }
        ] } }"#,
    );
    let p = tree.find_by_name("p").unwrap();
    assert_eq!(tree[p].frame.block_offset, 70.0);
    assert_eq!(tree[p].lines[1].pagination_strut, 10.0);
    assert_eq!(tree[p].lines[1].rect.block_offset, 30.0);
}

#[test]
fn test_widows_move_break_earlier() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 100 }, "root": { "children": [
            { "id": "p", "style": { "orphans": 2, "widows": 2 }, "lines": [20, 20, 20, 20, 20, 20] }
        ] } }"#,
    );
    let p = tree.find_by_name("p").unwrap();
    let lines = &tree[p].lines;
    assert_eq!(lines[3].rect.block_offset, 60.0);
    assert_eq!(lines[4].rect.block_offset, 100.0);
    assert_eq!(lines[4].pagination_strut, 20.0);
    assert_eq!(lines[5].rect.block_offset, 120.0);
}

#[test]
fn test_float_moves_to_next_page() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 100 }, "root": { "children": [
            { "style": { "height": 90 } },
            { "id": "f", "style": { "float": "left" }, "replaced": { "width": 50, "height": 50 } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "f"), 100.0);
}

#[test]
fn test_invalid_page_size_lays_out_continuously() {
    let tree = lay_out(
        r#"{ "options": { "page-block-size": 0 }, "root": { "children": [
            { "style": { "height": 450 } },
            { "id": "img", "replaced": { "width": 100, "height": 100 } }
        ] } }"#,
    );
    assert_eq!(top(&tree, "img"), 450.0);
}
