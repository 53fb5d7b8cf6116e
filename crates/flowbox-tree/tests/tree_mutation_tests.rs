//! Tests for arena tree mutation and tree-order traversal.

use flowbox_tree::{NodeId, Tree};

/// Helper: root with children `a`, `b`, `c` and grandchildren under `b`.
///
/// ```text
/// root
/// ├── a
/// ├── b
/// │   ├── b1
/// │   └── b2
/// └── c
/// ```
fn sample() -> (Tree<&'static str>, Vec<NodeId>) {
    let mut tree = Tree::new();
    let ids: Vec<NodeId> = ["root", "a", "b", "b1", "b2", "c"]
        .into_iter()
        .map(|name| tree.alloc(name))
        .collect();
    let (root, a, b, b1, b2, c) = (ids[0], ids[1], ids[2], ids[3], ids[4], ids[5]);
    tree.append_child(root, a);
    tree.append_child(root, b);
    tree.append_child(root, c);
    tree.append_child(b, b1);
    tree.append_child(b, b2);
    (tree, ids)
}

// ========== insert / detach ==========

#[test]
fn test_insert_before_links_siblings() {
    let (mut tree, ids) = sample();
    let (root, a, b) = (ids[0], ids[1], ids[2]);
    let x = tree.alloc("x");
    tree.insert_before(root, x, Some(b));

    assert_eq!(tree.children(root), &[a, x, b, ids[5]]);
    assert_eq!(tree.prev_sibling(x), Some(a));
    assert_eq!(tree.next_sibling(x), Some(b));
    assert_eq!(tree.next_sibling(a), Some(x));
    assert_eq!(tree.prev_sibling(b), Some(x));
}

#[test]
fn test_detach_middle_child_relinks_neighbours() {
    let (mut tree, ids) = sample();
    let (root, a, b, c) = (ids[0], ids[1], ids[2], ids[5]);
    tree.detach(b);

    assert_eq!(tree.children(root), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_eq!(tree.parent(b), None);
    // The detached subtree is intact.
    assert_eq!(tree.children(b), &[ids[3], ids[4]]);
}

#[test]
fn test_destroy_frees_subtree() {
    let (mut tree, ids) = sample();
    let before = tree.len();
    assert_eq!(tree.destroy(ids[2]), Some("b"));

    assert_eq!(tree.len(), before - 3);
    assert!(!tree.contains(ids[3]));
    assert!(tree.contains(ids[5]));
}

#[test]
fn test_move_children_preserves_order() {
    let (mut tree, ids) = sample();
    let target = tree.alloc("target");
    tree.move_children(ids[2], target);

    assert!(tree.children(ids[2]).is_empty());
    assert_eq!(tree.children(target), &[ids[3], ids[4]]);
    assert_eq!(tree.parent(ids[4]), Some(target));
}

// ========== tree order ==========

#[test]
fn test_descendants_are_pre_order() {
    let (tree, ids) = sample();
    let order: Vec<&str> = tree.descendants(ids[0]).map(|id| tree[id]).collect();
    assert_eq!(order, ["root", "a", "b", "b1", "b2", "c"]);
}

#[test]
fn test_next_in_pre_order_after_children_skips_subtree() {
    let (tree, ids) = sample();
    assert_eq!(tree.next_in_pre_order_after_children(ids[2], Some(ids[0])), Some(ids[5]));
    assert_eq!(tree.next_in_pre_order_after_children(ids[4], Some(ids[0])), Some(ids[5]));
    assert_eq!(tree.next_in_pre_order_after_children(ids[5], Some(ids[0])), None);
}

#[test]
fn test_previous_in_pre_order_descends_into_previous_sibling() {
    let (tree, ids) = sample();
    // Before `c` comes the last leaf of `b`.
    assert_eq!(tree.previous_in_pre_order(ids[5], Some(ids[0])), Some(ids[4]));
    assert_eq!(tree.previous_in_pre_order(ids[3], Some(ids[0])), Some(ids[2]));
    // Never returns the boundary itself.
    assert_eq!(tree.previous_in_pre_order(ids[1], Some(ids[0])), None);
}

#[test]
fn test_ancestors_and_descendant_check() {
    let (tree, ids) = sample();
    let chain: Vec<NodeId> = tree.ancestors(ids[3]).collect();
    assert_eq!(chain, [ids[2], ids[0]]);
    assert!(tree.is_descendant_of(ids[3], ids[0]));
    assert!(!tree.is_descendant_of(ids[0], ids[3]));
}
