//! Integration tests for multi-column containers: column sets and spanner
//! placeholders under tree mutations, and column geometry after layout.

use flowbox_layout::{BoxKind, LayoutOptions, LayoutTree, Scene, layout_tree};
use flowbox_style::{ColumnSpan, ComputedStyle, Display, Float, LengthOrAuto};
use flowbox_tree::NodeId;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

fn multicol_style() -> ComputedStyle {
    ComputedStyle {
        column_count: Some(2),
        ..ComputedStyle::default()
    }
}

fn spanner_style() -> ComputedStyle {
    ComputedStyle {
        column_span: ColumnSpan::All,
        ..ComputedStyle::default()
    }
}

/// A tree whose root holds one empty two-column container.
fn multicol_tree() -> (LayoutTree, NodeId) {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let container = tree.create_child_box(BoxKind::Block, multicol_style());
    tree.add_child(root, container, None);
    (tree, container)
}

fn append(tree: &mut LayoutTree, parent: NodeId, style: ComputedStyle) -> NodeId {
    let child = tree.create_child_box(BoxKind::Block, style);
    tree.add_child(parent, child, None);
    child
}

fn thread_of(tree: &LayoutTree, container: NodeId) -> NodeId {
    tree[container].flow_thread.unwrap()
}

#[test]
fn test_new_container_gets_flow_thread() {
    let (tree, container) = multicol_tree();
    assert!(tree.is_multicol_container(container));
    assert_eq!(tree.column_box_signature(container), "");
}

#[test]
fn test_content_creates_one_column_set() {
    let (mut tree, container) = multicol_tree();
    let a = append(&mut tree, container, ComputedStyle::default());
    let _ = append(&mut tree, container, ComputedStyle::default());
    assert_eq!(tree.parent(a), Some(thread_of(&tree, container)));
    assert_eq!(tree.column_box_signature(container), "c");
}

#[test]
fn test_spanners_split_column_sets() {
    let (mut tree, container) = multicol_tree();
    let _ = append(&mut tree, container, spanner_style());
    assert_eq!(tree.column_box_signature(container), "s");
    let content = append(&mut tree, container, ComputedStyle::default());
    assert_eq!(tree.column_box_signature(container), "sc");
    let _ = append(&mut tree, container, spanner_style());
    assert_eq!(tree.column_box_signature(container), "scs");

    tree.remove_child(content);
    assert_eq!(tree.column_box_signature(container), "ss");
}

#[test]
fn test_content_between_spanners_gets_its_own_set() {
    let (mut tree, container) = multicol_tree();
    let _ = append(&mut tree, container, spanner_style());
    let second = append(&mut tree, container, spanner_style());
    assert_eq!(tree.column_box_signature(container), "ss");

    let content = tree.create_child_box(BoxKind::Block, ComputedStyle::default());
    tree.add_child(container, content, Some(second));
    assert_eq!(tree.column_box_signature(container), "scs");
}

#[test]
fn test_spanner_inserted_into_content_splits_the_set() {
    let (mut tree, container) = multicol_tree();
    let first = append(&mut tree, container, ComputedStyle::default());
    let last = append(&mut tree, container, ComputedStyle::default());

    let spanner = tree.create_child_box(BoxKind::Block, spanner_style());
    tree.add_child(container, spanner, Some(last));
    assert_eq!(tree.column_box_signature(container), "csc");

    let thread = thread_of(&tree, container);
    let first_set = tree.map_descendant_to_column_set(thread, first).unwrap();
    let last_set = tree.map_descendant_to_column_set(thread, last).unwrap();
    assert_ne!(first_set, last_set);

    let placeholder = tree[spanner].spanner_placeholder.unwrap();
    assert!(matches!(tree[placeholder].kind, BoxKind::SpannerPlaceholder { spanner: s } if s == spanner));
}

#[test]
fn test_nested_spanner_is_not_valid() {
    let (mut tree, container) = multicol_tree();
    let outer = append(&mut tree, container, spanner_style());
    let inner = append(&mut tree, outer, spanner_style());
    let thread = thread_of(&tree, container);
    assert!(tree.descendant_is_valid_column_spanner(thread, outer));
    assert!(!tree.descendant_is_valid_column_spanner(thread, inner));
    assert!(tree[inner].spanner_placeholder.is_none());
}

#[test]
fn test_floating_spanner_is_not_valid() {
    let (mut tree, container) = multicol_tree();
    let float = append(
        &mut tree,
        container,
        ComputedStyle {
            float: Float::Left,
            ..spanner_style()
        },
    );
    assert!(tree[float].spanner_placeholder.is_none());
    assert_eq!(tree.column_box_signature(container), "c");
}

#[test]
fn test_toggling_column_span_swaps_set_and_placeholder() {
    let (mut tree, container) = multicol_tree();
    let child = append(&mut tree, container, ComputedStyle::default());
    assert_eq!(tree.column_box_signature(container), "c");

    tree.set_style(child, spanner_style());
    assert_eq!(tree.column_box_signature(container), "s");
    assert!(tree[child].spanner_placeholder.is_some());

    tree.set_style(child, ComputedStyle::default());
    assert_eq!(tree.column_box_signature(container), "c");
    assert!(tree[child].spanner_placeholder.is_none());
}

#[test]
fn test_dropping_columns_evacuates_content() {
    let (mut tree, container) = multicol_tree();
    let a = append(&mut tree, container, ComputedStyle::default());
    let spanner = append(&mut tree, container, spanner_style());
    let b = append(&mut tree, container, ComputedStyle::default());

    tree.set_style(container, ComputedStyle::default());
    assert!(!tree.is_multicol_container(container));
    assert_eq!(tree.children(container), &[a, spanner, b]);
    assert!(tree[spanner].spanner_placeholder.is_none());
}

#[test]
fn test_adding_columns_moves_content_into_thread() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let root = tree.root();
    let container = append(&mut tree, root, ComputedStyle::default());
    let a = append(&mut tree, container, ComputedStyle::default());
    let _ = append(&mut tree, container, spanner_style());

    tree.set_style(container, multicol_style());
    let thread = thread_of(&tree, container);
    assert_eq!(tree.parent(a), Some(thread));
    assert_eq!(tree.column_box_signature(container), "cs");
}

fn lay_out(json: &str) -> LayoutTree {
    let scene = Scene::from_json(json).unwrap();
    let mut tree = scene.build().unwrap();
    layout_tree(&mut tree, &scene.options);
    tree
}

fn named(tree: &LayoutTree, name: &str) -> NodeId {
    tree.find_by_name(name).unwrap()
}

#[test]
fn test_balanced_columns_share_content_evenly() {
    let tree = lay_out(
        r#"{ "root": { "children": [
            { "id": "mc", "style": { "column-count": 3, "column-gap": 0 }, "children": [
                { "style": { "height": 100 } },
                { "style": { "height": 100 } },
                { "style": { "height": 100 } }
            ] }
        ] } }"#,
    );
    assert_eq!(tree[named(&tree, "mc")].frame.block_size, 100.0);
}

#[test]
fn test_spanner_sits_between_balanced_segments() {
    let tree = lay_out(
        r#"{ "options": { "viewport-width": 400 }, "root": { "children": [
            { "id": "mc", "style": { "column-count": 2, "column-gap": 0 }, "children": [
                { "id": "a", "style": { "height": 100 } },
                { "id": "s", "style": { "height": 50, "column-span": "all" } },
                { "id": "b", "style": { "height": 100 } }
            ] }
        ] } }"#,
    );
    let mc = named(&tree, "mc");
    assert_eq!(tree.column_box_signature(mc), "csc");
    assert_eq!(tree[mc].frame.block_size, 150.0);

    let spanner = &tree[named(&tree, "s")];
    assert_eq!(spanner.frame.block_offset, 50.0);
    assert_eq!(spanner.frame.inline_size, 400.0);

    let thread = thread_of(&tree, mc);
    let b_set = tree.map_descendant_to_column_set(thread, named(&tree, "b")).unwrap();
    let BoxKind::ColumnSet(state) = &tree[b_set].kind else {
        panic!("not a column set");
    };
    assert_eq!(state.logical_top_in_flow_thread, 100.0);
    assert_eq!(state.column_block_size, Some(50.0));
    assert_eq!(tree[b_set].frame.block_offset, 100.0);
}

#[test]
fn test_column_width_decides_count() {
    let tree = lay_out(
        r#"{ "options": { "viewport-width": 500 }, "root": { "children": [
            { "id": "mc", "style": { "column-width": 150, "column-gap": 20 }, "children": [
                { "style": { "height": 30 } }
            ] }
        ] } }"#,
    );
    let thread = thread_of(&tree, named(&tree, "mc"));
    let BoxKind::FlowThread(state) = &tree[thread].kind else {
        panic!("not a flow thread");
    };
    assert_eq!(state.column_count, 3);
    assert!(state.all_columns_have_known_height);
}

#[test]
fn test_fixed_height_fills_columns_in_order() {
    let tree = lay_out(
        r#"{ "root": { "children": [
            { "id": "mc", "style": { "column-count": 2, "height": 100, "column-fill": "auto" }, "children": [
                { "id": "a", "style": { "height": 50 } }
            ] }
        ] } }"#,
    );
    let mc = named(&tree, "mc");
    assert_eq!(tree[mc].frame.block_size, 100.0);
    let thread = thread_of(&tree, mc);
    let set = tree.map_descendant_to_column_set(thread, named(&tree, "a")).unwrap();
    let BoxKind::ColumnSet(state) = &tree[set].kind else {
        panic!("not a column set");
    };
    assert_eq!(state.column_block_size, Some(100.0));
}

#[test]
fn test_spanners_balance_segments_despite_fill_auto() {
    let tree = lay_out(
        r#"{ "root": { "children": [
            { "id": "mc", "style": { "column-count": 2, "column-gap": 0, "height": 300, "column-fill": "auto" }, "children": [
                { "id": "a", "style": { "height": 100 } },
                { "id": "s", "style": { "height": 50, "column-span": "all" } },
                { "id": "b", "style": { "height": 100 } }
            ] }
        ] } }"#,
    );
    let mc = named(&tree, "mc");
    assert_eq!(tree[mc].frame.block_size, 300.0);
    let thread = thread_of(&tree, mc);
    for name in ["a", "b"] {
        let set = tree.map_descendant_to_column_set(thread, named(&tree, name)).unwrap();
        let BoxKind::ColumnSet(state) = &tree[set].kind else {
            panic!("not a column set");
        };
        assert_eq!(state.column_block_size, Some(50.0));
    }
}

#[test]
fn test_removing_spanner_after_layout_merges_sets() {
    let scene = Scene::from_json(
        r#"{ "root": { "children": [
            { "id": "mc", "style": { "column-count": 2 }, "children": [
                { "style": { "height": 40 } },
                { "id": "s", "style": { "height": 10, "column-span": "all" } },
                { "style": { "height": 40 } }
            ] }
        ] }, "mutations": [{ "op": "remove", "target": "s" }] }"#,
    )
    .unwrap();
    let mut tree = scene.build().unwrap();
    let options = LayoutOptions::default();
    layout_tree(&mut tree, &options);
    let mc = named(&tree, "mc");
    assert_eq!(tree.column_box_signature(mc), "csc");

    scene.apply_mutations(&mut tree).unwrap();
    assert_eq!(tree.column_box_signature(mc), "c");
    layout_tree(&mut tree, &options);
    assert_eq!(tree[mc].frame.block_size, 40.0);
}

// ----------------------------------------------------------------------
// Random mutation sequences
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum NewBox {
    Plain,
    Spanner,
    FlowRoot,
    Float,
    Hidden,
}

impl NewBox {
    fn style(self) -> ComputedStyle {
        let height = LengthOrAuto::px(10.0);
        match self {
            Self::Plain => ComputedStyle {
                height,
                ..ComputedStyle::default()
            },
            Self::Spanner => ComputedStyle {
                height,
                ..spanner_style()
            },
            Self::FlowRoot => ComputedStyle {
                display: Display::FlowRoot,
                ..ComputedStyle::default()
            },
            Self::Float => ComputedStyle {
                float: Float::Left,
                ..ComputedStyle::default()
            },
            Self::Hidden => ComputedStyle {
                display: Display::None,
                ..ComputedStyle::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize, before: Option<usize>, new_box: NewBox },
    Remove(usize),
    ToggleSpan(usize),
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let target = usize::arbitrary(g);
        match u8::arbitrary(g) % 6 {
            0..=2 => Self::Insert {
                parent: target,
                before: Option::<usize>::arbitrary(g),
                new_box: *g
                    .choose(&[
                        NewBox::Plain,
                        NewBox::Plain,
                        NewBox::Spanner,
                        NewBox::FlowRoot,
                        NewBox::Float,
                        NewBox::Hidden,
                    ])
                    .unwrap(),
            },
            3 => Self::Remove(target),
            _ => Self::ToggleSpan(target),
        }
    }
}

/// Content boxes in the container, in tree order. Column boxes and the
/// flow thread are skipped.
fn content_boxes(tree: &LayoutTree, container: NodeId) -> Vec<NodeId> {
    let thread = thread_of(tree, container);
    tree.boxes()
        .descendants(thread)
        .filter(|&id| id != thread && matches!(tree[id].kind, BoxKind::Block))
        .collect()
}

fn apply(tree: &mut LayoutTree, container: NodeId, op: &Op) {
    let boxes = content_boxes(tree, container);
    match *op {
        Op::Insert { parent, before, new_box } => {
            let parent = if boxes.is_empty() || parent % (boxes.len() + 1) == boxes.len() {
                container
            } else {
                boxes[parent % boxes.len()]
            };
            let resolved_parent = tree[parent].flow_thread.unwrap_or(parent);
            let siblings = tree.children(resolved_parent).to_vec();
            let before = before.filter(|_| !siblings.is_empty()).map(|index| siblings[index % siblings.len()]);
            let child = tree.create_child_box(BoxKind::Block, new_box.style());
            tree.add_child(parent, child, before);
        }
        Op::Remove(target) if !boxes.is_empty() => tree.remove_child(boxes[target % boxes.len()]),
        Op::ToggleSpan(target) if !boxes.is_empty() => {
            let target = boxes[target % boxes.len()];
            let mut style = tree[target].style.clone();
            style.column_span = match style.column_span {
                ColumnSpan::All => ColumnSpan::None,
                ColumnSpan::None => ColumnSpan::All,
            };
            tree.set_style(target, style);
        }
        Op::Remove(_) | Op::ToggleSpan(_) => {}
    }
}

fn column_boxes_are_consistent(tree: &LayoutTree, container: NodeId) -> bool {
    let thread = thread_of(tree, container);
    if tree.column_box_signature(container).contains("cc") {
        return false;
    }
    let placeholders_point_back = tree.children(container).iter().all(|&column_box| match tree[column_box].kind {
        BoxKind::SpannerPlaceholder { spanner } => tree[spanner].spanner_placeholder == Some(column_box),
        _ => true,
    });
    let spanners_have_placeholders = content_boxes(tree, container)
        .into_iter()
        .all(|id| tree[id].spanner_placeholder.is_some() == tree.descendant_is_valid_column_spanner(thread, id));
    // Every visible content box is shown by exactly one column box: the
    // placeholder of the spanner it is (or is inside), or else a set.
    let sets = tree.column_sets(thread);
    let content_is_mapped = content_boxes(tree, container)
        .into_iter()
        .filter(|&id| {
            !std::iter::once(id)
                .chain(tree.boxes().ancestors(id))
                .take_while(|&node| node != thread)
                .any(|node| tree[node].style.is_display_none())
        })
        .all(|id| match tree.containing_column_spanner_placeholder(thread, id) {
            Some(placeholder) => tree.children(container).contains(&placeholder),
            None => tree
                .map_descendant_to_column_set(thread, id)
                .is_some_and(|set| sets.contains(&set)),
        });
    placeholders_point_back && spanners_have_placeholders && content_is_mapped
}

#[quickcheck]
fn prop_column_boxes_follow_mutations(ops: Vec<Op>) -> bool {
    let (mut tree, container) = multicol_tree();
    ops.iter().all(|op| {
        apply(&mut tree, container, op);
        column_boxes_are_consistent(&tree, container)
    })
}

#[quickcheck]
fn prop_layout_after_mutations_keeps_sets_ordered(ops: Vec<Op>) -> bool {
    let (mut tree, container) = multicol_tree();
    for op in &ops {
        apply(&mut tree, container, op);
    }
    layout_tree(&mut tree, &LayoutOptions::default());

    // Each set shows the part of the thread after the one before it.
    let mut last_bottom = 0.0_f32;
    for &column_box in tree.children(container) {
        let BoxKind::ColumnSet(state) = &tree[column_box].kind else {
            continue;
        };
        if state.logical_top_in_flow_thread < last_bottom
            || state.logical_bottom_in_flow_thread < state.logical_top_in_flow_thread
        {
            return false;
        }
        last_bottom = state.logical_bottom_in_flow_thread;
    }
    true
}
