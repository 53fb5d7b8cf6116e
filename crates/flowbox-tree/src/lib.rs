//! Arena tree for the flowbox box tree.
//!
//! The layout engine owns its boxes in a single arena and refers to them by
//! [`NodeId`]. Parent, child and sibling relationships are stored as indices,
//! giving O(1) access and traversal in every direction without fighting the
//! borrow checker. Destroyed nodes leave a tombstone so that stale ids never
//! alias a different box.
//!
//! Traversal follows the [DOM Living Standard § 4.2 tree
//! order](https://dom.spec.whatwg.org/#concept-tree-order): "preorder,
//! depth-first traversal of a tree".

use std::ops::{Index, IndexMut};

/// A type-safe index into a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A node in the arena: its payload plus its tree links.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The payload carried by the node.
    pub data: T,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    pub next_sibling: Option<NodeId>,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    pub prev_sibling: Option<NodeId>,
}

impl<T> Node<T> {
    const fn detached(data: T) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Arena-allocated tree.
///
/// Unlike a document tree there is no implicit root: callers allocate the
/// root like any other node and keep its id.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    /// All nodes ever allocated, indexed by `NodeId`. `None` marks a node
    /// that has been destroyed.
    nodes: Vec<Option<Node<T>>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::detached(data)));
        id
    }

    /// Get a node by its ID. Returns `None` for destroyed nodes.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Whether `id` refers to a live (not destroyed) node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the arena holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all live nodes in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|_| NodeId(i)))
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("{id:?} is not a live node"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("{id:?} is not a live node"),
        }
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// # Panics
    /// Panics if either id is not live or `child` is already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`, or as the
    /// last child when `reference` is `None`.
    ///
    /// # Panics
    /// Panics if `child` is already attached or `reference` is not a child of
    /// `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        assert!(
            self.node(child).parent.is_none(),
            "{child:?} is already attached"
        );

        let index = match reference {
            Some(reference) => self
                .index_in_parent(parent, reference)
                .unwrap_or_else(|| panic!("{reference:?} is not a child of {parent:?}")),
            None => self.node(parent).children.len(),
        };

        let prev = index
            .checked_sub(1)
            .map(|i| self.node(parent).children[i]);
        let next = self.node(parent).children.get(index).copied();

        self.node_mut(parent).children.insert(index, child);

        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;

        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = Some(child);
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = Some(child);
        }
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detaches `child` (and its subtree) from its parent. The subtree stays
    /// allocated and can be re-inserted elsewhere.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        let (prev, next) = {
            let node = self.node(child);
            (node.prev_sibling, node.next_sibling)
        };

        self.node_mut(parent).children.retain(|&id| id != child);
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        }

        let node = self.node_mut(child);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Detach `id` and free it together with its whole subtree. Returns the
    /// payload of `id` itself.
    pub fn destroy(&mut self, id: NodeId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        let descendants: Vec<NodeId> = self.descendants(id).skip(1).collect();
        for descendant in descendants {
            if let Some(slot) = self.nodes.get_mut(descendant.0) {
                *slot = None;
            }
        }
        self.nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .map(|node| node.data)
    }

    /// Move all children of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = self.children(from).to_vec();
        for child in children {
            self.detach(child);
            self.append_child(to, child);
        }
    }

    fn index_in_parent(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&id| id == child)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> FollowingSiblings<'_, T> {
        FollowingSiblings {
            tree: self,
            current: self.next_sibling(id),
        }
    }

    /// Iterate over `root` and its descendants in tree order.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Descendants<'_, T> {
        Descendants {
            tree: self,
            root,
            next: self.contains(root).then_some(root),
        }
    }

    /// The node following `id` in tree order, not leaving `stay_within`.
    #[must_use]
    pub fn next_in_pre_order(&self, id: NodeId, stay_within: Option<NodeId>) -> Option<NodeId> {
        self.first_child(id)
            .or_else(|| self.next_in_pre_order_after_children(id, stay_within))
    }

    /// The node following `id` in tree order once `id`'s subtree has been
    /// skipped, not leaving `stay_within`.
    #[must_use]
    pub fn next_in_pre_order_after_children(
        &self,
        id: NodeId,
        stay_within: Option<NodeId>,
    ) -> Option<NodeId> {
        let mut current = id;
        loop {
            if Some(current) == stay_within {
                return None;
            }
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    /// The node preceding `id` in tree order, not leaving `stay_within`.
    /// `stay_within` itself is never returned.
    #[must_use]
    pub fn previous_in_pre_order(&self, id: NodeId, stay_within: Option<NodeId>) -> Option<NodeId> {
        if Some(id) == stay_within {
            return None;
        }
        match self.prev_sibling(id) {
            Some(mut prev) => {
                while let Some(last) = self.last_child(prev) {
                    prev = last;
                }
                Some(prev)
            }
            None => self.parent(id).filter(|&parent| Some(parent) != stay_within),
        }
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        &self.node(id).data
    }
}

impl<T> IndexMut<NodeId> for Tree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).data
    }
}

/// Iterator over ancestors of a node.
pub struct Ancestors<'a, T> {
    tree: &'a Tree<T>,
    current: Option<NodeId>,
}

impl<T> Iterator for Ancestors<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over following siblings of a node.
pub struct FollowingSiblings<'a, T> {
    tree: &'a Tree<T>,
    current: Option<NodeId>,
}

impl<T> Iterator for FollowingSiblings<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree, root included.
pub struct Descendants<'a, T> {
    tree: &'a Tree<T>,
    root: NodeId,
    next: Option<NodeId>,
}

impl<T> Iterator for Descendants<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.next_in_pre_order(id, Some(self.root));
        Some(id)
    }
}
