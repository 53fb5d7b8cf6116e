//! The layout box tree.
//!
//! [CSS Display § 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#box-generation)
//!
//! Boxes live in a [`flowbox_tree::Tree`] arena. Besides boxes generated
//! from content, the tree holds anonymous boxes that layout synthesizes:
//!
//! - an *anonymous block* wrapping inline content that ended up next to a
//!   block-level sibling,
//! - the *flow thread* of a multi-column container, which holds all of the
//!   container's content as one continuous strip,
//! - *column sets* (one per run of columns) and *spanner placeholders*
//!   (standing in for a `column-span: all` box), which follow the flow
//!   thread as siblings inside the multicol container.
//!
//! Every structural change goes through [`LayoutTree`] so that the multicol
//! bookkeeping (see [`crate::multicol::flow_thread`]) stays in sync.

use flowbox_style::{ComputedStyle, Display, Position, WritingMode};
use flowbox_tree::{NodeId, Tree};

use crate::box_model::{BoxStrut, LogicalRect};
use crate::float::FloatRegistry;
use crate::lines::LineBox;
use crate::margin::MarginValues;
use crate::multicol::column_set::ColumnSetState;
use crate::multicol::flow_thread::FlowThreadState;

/// What kind of box a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// A block container generated by content.
    Block,
    /// A block container synthesized around inline content.
    AnonymousBlock,
    /// Replaced content (an image, a form control) with an intrinsic size in
    /// physical pixels. It has no children and never breaks.
    Replaced {
        /// Intrinsic width.
        intrinsic_width: f32,
        /// Intrinsic height.
        intrinsic_height: f32,
    },
    /// The flow thread of a multi-column container.
    FlowThread(FlowThreadState),
    /// A run of columns of a multi-column container.
    ColumnSet(ColumnSetState),
    /// Stand-in for a column spanner among the column boxes of its
    /// multi-column container.
    SpannerPlaceholder {
        /// The `column-span: all` box this placeholder represents.
        spanner: NodeId,
    },
}

impl BoxKind {
    /// Short name for dumps and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::AnonymousBlock => "anonymous-block",
            Self::Replaced { .. } => "replaced",
            Self::FlowThread(_) => "flow-thread",
            Self::ColumnSet(_) => "column-set",
            Self::SpannerPlaceholder { .. } => "spanner-placeholder",
        }
    }
}

/// One layout box: its style, inputs, and the results of the last layout.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// What kind of box this is.
    pub kind: BoxKind,
    /// Computed style.
    pub style: ComputedStyle,
    /// Optional name from the scene, used by dumps and tests.
    pub name: Option<String>,
    /// The root of the tree (the initial containing block's box).
    pub is_layout_root: bool,
    /// The `<body>` element, a quirk container.
    pub is_document_body: bool,
    /// Layout is stale for this box or something below it.
    pub needs_layout: bool,
    /// Border box in the containing box's logical coordinates (the parent's,
    /// or the multicol container's for a spanner).
    pub frame: LogicalRect,
    /// Used margins, in the containing box's writing mode.
    pub margins: BoxStrut,
    /// Border widths, in the box's own writing mode.
    pub border: BoxStrut,
    /// Resolved padding, in the box's own writing mode.
    pub padding: BoxStrut,
    /// Collapsing margin maxima, including those that collapsed through from
    /// children.
    pub max_margins: MarginValues,
    /// Block-start margin came from a quirk rule (after collapsing).
    pub has_margin_before_quirk: bool,
    /// Block-end margin came from a quirk rule (after collapsing).
    pub has_margin_after_quirk: bool,
    /// Space inserted before this box to move it to a later fragmentainer.
    pub pagination_strut: f32,
    /// Strut a first child asked this box to take instead, measured so that
    /// moving the box by it puts the child at a fragmentainer start.
    pub pagination_strut_from_child: f32,
    /// Line boxes, for a container with inline content.
    pub lines: Vec<LineBox>,
    /// Floats affecting this container.
    pub floats: FloatRegistry,
    /// Union of this box and everything it contains that overflows it, in
    /// its own coordinates.
    pub overflow: LogicalRect,
    /// For a multicol container: its flow thread.
    pub flow_thread: Option<NodeId>,
    /// For a column spanner: its placeholder.
    pub spanner_placeholder: Option<NodeId>,
}

impl LayoutBox {
    /// A box that has never been laid out.
    #[must_use]
    pub fn new(kind: BoxKind, style: ComputedStyle) -> Self {
        Self {
            kind,
            style,
            name: None,
            is_layout_root: false,
            is_document_body: false,
            needs_layout: true,
            frame: LogicalRect::default(),
            margins: BoxStrut::default(),
            border: BoxStrut::default(),
            padding: BoxStrut::default(),
            max_margins: MarginValues::default(),
            has_margin_before_quirk: false,
            has_margin_after_quirk: false,
            pagination_strut: 0.0,
            pagination_strut_from_child: 0.0,
            lines: Vec::new(),
            floats: FloatRegistry::default(),
            overflow: LogicalRect::default(),
            flow_thread: None,
            spanner_placeholder: None,
        }
    }

    /// Name for logs: the scene name, or the box kind.
    #[must_use]
    pub fn debug_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.label())
    }

    /// Whether this container's content is inline (line boxes).
    #[must_use]
    pub fn has_inline_content(&self) -> bool {
        !self.lines.is_empty()
    }

    /// The box's writing mode.
    #[must_use]
    pub const fn writing_mode(&self) -> WritingMode {
        self.style.writing_mode
    }

    /// Border plus padding.
    #[must_use]
    pub fn border_padding(&self) -> BoxStrut {
        self.border.plus(&self.padding)
    }
}

/// Style for an anonymous box inside `parent`: inherited properties only.
#[must_use]
pub fn anonymous_style(parent: &ComputedStyle) -> ComputedStyle {
    ComputedStyle {
        writing_mode: parent.writing_mode,
        direction: parent.direction,
        orphans: parent.orphans,
        widows: parent.widows,
        ..ComputedStyle::default()
    }
}

/// The box tree plus the operations that keep it consistent.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    boxes: Tree<LayoutBox>,
    root: NodeId,
}

impl std::ops::Index<NodeId> for LayoutTree {
    type Output = LayoutBox;

    fn index(&self, id: NodeId) -> &LayoutBox {
        &self.boxes[id]
    }
}

impl std::ops::IndexMut<NodeId> for LayoutTree {
    fn index_mut(&mut self, id: NodeId) -> &mut LayoutBox {
        &mut self.boxes[id]
    }
}

impl LayoutTree {
    /// A tree holding only the root box.
    #[must_use]
    pub fn new(root_style: ComputedStyle) -> Self {
        let mut boxes = Tree::new();
        let mut root_box = LayoutBox::new(BoxKind::Block, root_style);
        root_box.is_layout_root = true;
        let root = boxes.alloc(root_box);
        let mut tree = Self { boxes, root };
        tree.create_or_destroy_multicol_if_needed(root, None);
        tree
    }

    /// The root box.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The underlying arena.
    #[must_use]
    pub const fn boxes(&self) -> &Tree<LayoutBox> {
        &self.boxes
    }

    pub(crate) const fn boxes_mut(&mut self) -> &mut Tree<LayoutBox> {
        &mut self.boxes
    }

    /// Whether `id` refers to a live box.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.boxes.contains(id)
    }

    /// Parent box.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.boxes.parent(id)
    }

    /// Children in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.boxes.children(id)
    }

    /// Find a box by scene name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.boxes
            .descendants(self.root)
            .find(|&id| self[id].name.as_deref() == Some(name))
    }

    // ------------------------------------------------------------------
    // Box creation and mutation
    // ------------------------------------------------------------------

    /// Allocate a detached box. Used by tree builders, and for the anonymous
    /// boxes layout synthesizes (column sets, spanner placeholders, flow
    /// threads, anonymous blocks).
    pub fn create_child_box(&mut self, kind: BoxKind, style: ComputedStyle) -> NodeId {
        self.boxes.alloc(LayoutBox::new(kind, style))
    }

    /// Give a box a name for dumps and lookups.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self[id].name = Some(name.into());
    }

    /// Mark a box as `<body>`.
    pub fn set_document_body(&mut self, id: NodeId) {
        self[id].is_document_body = true;
        self.mark_needs_layout(id);
    }

    /// Replace the line boxes of a container.
    ///
    /// # Panics
    /// Panics if the container has block-level children: a block container
    /// holds either lines or blocks, never both.
    pub fn set_lines(&mut self, id: NodeId, lines: Vec<LineBox>) {
        let target = self[id].flow_thread.unwrap_or(id);
        if self.is_flow_thread(target) && !lines.is_empty() {
            // A flow thread only holds blocks.
            let wrapper = self.create_anonymous_block(target);
            self.boxes.append_child(target, wrapper);
            self[wrapper].lines = lines;
            self.descendant_inserted(wrapper);
            self.mark_needs_layout(wrapper);
            return;
        }
        assert!(
            lines.is_empty() || !self.has_block_children(target),
            "{} has block children and cannot take lines",
            self[target].debug_name()
        );
        self[target].lines = lines;
        self.mark_needs_layout(target);
    }

    /// Insert `child` into `parent` before `before` (at the
    /// end when `None`).
    ///
    /// Children of a multicol container go into its flow thread. Inserting a
    /// block-level child into a container with inline content first wraps
    /// that content in an anonymous block.
    ///
    /// # Panics
    /// Panics if `before` is not a child of the resolved parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let (parent, before) = match self[parent].flow_thread {
            Some(thread) => {
                let before = if before == Some(thread) {
                    self.boxes.first_child(thread)
                } else {
                    before
                };
                (thread, before)
            }
            None => (parent, before),
        };

        let child_is_block_level = !self[child].style.is_floating_or_out_of_flow_positioned();
        if child_is_block_level && self[parent].has_inline_content() {
            let wrapper = self.create_anonymous_block(parent);
            let lines = std::mem::take(&mut self[parent].lines);
            self[wrapper].lines = lines;
            self.boxes.insert_before(parent, wrapper, self.boxes.first_child(parent));
            self.descendant_inserted(wrapper);
        }

        self.boxes.insert_before(parent, child, before);
        if self[child].flow_thread.is_none() {
            self.create_or_destroy_multicol_if_needed(child, None);
        }
        self.mark_needs_layout(child);
        self.descendant_inserted(child);
    }

    /// Remove `child` and destroy its subtree.
    pub fn remove_child(&mut self, child: NodeId) {
        if !self.contains(child) || child == self.root {
            return;
        }
        self.descendant_will_be_removed(child);
        if let Some(parent) = self.parent(child) {
            self.mark_needs_layout(parent);
        }
        let _ = self.boxes.destroy(child);
    }

    /// Replace the style of a box, keeping multicol bookkeeping in sync.
    pub fn set_style(&mut self, id: NodeId, style: ComputedStyle) {
        let scope = self.descendant_style_will_change(id, &style);
        let old_style = std::mem::replace(&mut self[id].style, style);

        self.descendant_style_did_change(id, scope, &old_style);
        if self[id].spanner_placeholder.is_some() {
            self.spanner_style_did_change(id);
        }
        self.create_or_destroy_multicol_if_needed(id, Some(&old_style));
        self.propagate_inherited_to_anonymous(id);
        self.mark_needs_layout(id);
    }

    /// Anonymous children inherit writing mode and direction.
    fn propagate_inherited_to_anonymous(&mut self, id: NodeId) {
        let style = self[id].style.clone();
        let anonymous: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_anonymous(child))
            .collect();
        for child in anonymous {
            self[child].style = anonymous_style(&style);
            self.propagate_inherited_to_anonymous(child);
        }
    }

    fn create_anonymous_block(&mut self, parent: NodeId) -> NodeId {
        let style = anonymous_style(&self[parent].style);
        self.create_child_box(BoxKind::AnonymousBlock, style)
    }

    /// Mark `id` and every ancestor for layout.
    pub fn mark_needs_layout(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current {
            if !self.contains(node) {
                return;
            }
            self[node].needs_layout = true;
            current = self.parent(node);
        }
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Anonymous boxes synthesized by layout.
    #[must_use]
    pub fn is_anonymous(&self, id: NodeId) -> bool {
        matches!(
            self[id].kind,
            BoxKind::AnonymousBlock
                | BoxKind::FlowThread(_)
                | BoxKind::ColumnSet(_)
                | BoxKind::SpannerPlaceholder { .. }
        )
    }

    /// The box is the flow thread of a multicol container.
    #[must_use]
    pub fn is_flow_thread(&self, id: NodeId) -> bool {
        matches!(self[id].kind, BoxKind::FlowThread(_))
    }

    /// The box is a column set.
    #[must_use]
    pub fn is_column_set(&self, id: NodeId) -> bool {
        matches!(self[id].kind, BoxKind::ColumnSet(_))
    }

    /// The box is a spanner placeholder.
    #[must_use]
    pub fn is_spanner_placeholder(&self, id: NodeId) -> bool {
        matches!(self[id].kind, BoxKind::SpannerPlaceholder { .. })
    }

    /// A column set or spanner placeholder.
    #[must_use]
    pub fn is_column_box(&self, id: NodeId) -> bool {
        self.is_column_set(id) || self.is_spanner_placeholder(id)
    }

    /// The box is replaced content.
    #[must_use]
    pub fn is_replaced(&self, id: NodeId) -> bool {
        matches!(self[id].kind, BoxKind::Replaced { .. })
    }

    /// The box has a multicol flow thread.
    #[must_use]
    pub fn is_multicol_container(&self, id: NodeId) -> bool {
        self[id].flow_thread.is_some()
    }

    /// A block container (as opposed to replaced content or a column box).
    #[must_use]
    pub fn is_block_flow(&self, id: NodeId) -> bool {
        match self[id].kind {
            BoxKind::Block => self[id].style.is_block_container(),
            BoxKind::AnonymousBlock | BoxKind::FlowThread(_) => true,
            _ => false,
        }
    }

    /// Has block-level children (as opposed to lines).
    #[must_use]
    pub fn has_block_children(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&child| !self[child].style.is_floating_or_out_of_flow_positioned())
    }

    /// The box whose coordinate space `id` is positioned in: the
    /// containing block for a spanner, the parent otherwise.
    #[must_use]
    pub fn layout_parent(&self, id: NodeId) -> Option<NodeId> {
        if let Some(placeholder) = self[id].spanner_placeholder {
            return self.parent(placeholder);
        }
        self.parent(id)
    }

    /// The writing mode differs from the layout parent's.
    #[must_use]
    pub fn is_writing_mode_root(&self, id: NodeId) -> bool {
        self.layout_parent(id)
            .is_some_and(|parent| self[parent].writing_mode() != self[id].writing_mode())
    }

    /// Block axes of the box and its layout parent are perpendicular.
    #[must_use]
    pub fn is_orthogonal(&self, id: NodeId) -> bool {
        self.layout_parent(id).is_some_and(|parent| {
            self[parent].writing_mode().is_horizontal() != self[id].writing_mode().is_horizontal()
        })
    }

    /// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// The box establishes a new block formatting context: its own style
    /// says so, it is the root, a flow thread, replaced content, a
    /// multicol container, or a writing-mode root.
    #[must_use]
    pub fn creates_new_formatting_context(&self, id: NodeId) -> bool {
        let layout_box = &self[id];
        layout_box.is_layout_root
            || layout_box.style.establishes_formatting_context()
            || layout_box.flow_thread.is_some()
            || !matches!(layout_box.kind, BoxKind::Block | BoxKind::AnonymousBlock)
            || !layout_box.style.is_block_container()
            || self.is_writing_mode_root(id)
    }

    /// [§ 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats)
    ///
    /// "The border box of a table, a block-level replaced element, or an
    /// element in the normal flow that establishes a new block formatting
    /// context [...] must not overlap the margin box of any floats in the
    /// same block formatting context as the element itself." Floats and
    /// out-of-flow boxes are placed by their own rules.
    #[must_use]
    pub fn avoids_floats(&self, id: NodeId) -> bool {
        self.is_in_flow(id) && self.creates_new_formatting_context(id)
    }

    /// [CSS Fragmentation § 4.1](https://www.w3.org/TR/css-break-3/#possible-breaks)
    ///
    /// Monolithic content never breaks: replaced content, scroll containers,
    /// orthogonal flows, and (since nested fragmentation is not supported)
    /// multicol containers inside another fragmentation context.
    #[must_use]
    pub fn is_monolithic(&self, id: NodeId) -> bool {
        self.is_replaced(id)
            || self[id].style.is_scroll_container()
            || self.is_orthogonal(id)
            || self.is_multicol_container(id)
    }

    /// A box that takes part in normal flow.
    #[must_use]
    pub fn is_in_flow(&self, id: NodeId) -> bool {
        let style = &self[id].style;
        !style.is_floating_or_out_of_flow_positioned()
            && !style.is_display_none()
            && self[id].spanner_placeholder.is_none()
            && !self.is_flow_thread(id)
    }

    /// [CSS 2.1 § 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    #[must_use]
    pub fn containing_block(&self, id: NodeId) -> Option<NodeId> {
        let style = &self[id].style;
        match style.position {
            // "If the element has 'position: fixed', the containing block is
            // established by the viewport", unless an ancestor contains
            // fixed-position descendants.
            Position::Fixed => Some(
                self.boxes
                    .ancestors(id)
                    .find(|&a| self[a].style.can_contain_fixed_position_objects() || a == self.root)
                    .unwrap_or(self.root),
            ),
            // "the containing block is established by the nearest ancestor
            // with a 'position' of 'absolute', 'relative' or 'fixed'".
            Position::Absolute => Some(
                self.boxes
                    .ancestors(id)
                    .find(|&a| {
                        self[a].style.is_positioned()
                            || self[a].style.can_contain_fixed_position_objects()
                            || a == self.root
                    })
                    .unwrap_or(self.root),
            ),
            Position::Static | Position::Relative | Position::Sticky => {
                if let Some(placeholder) = self[id].spanner_placeholder {
                    return self.parent(placeholder);
                }
                self.parent(id)
            }
        }
    }

    /// The flow thread whose content `id` is: the nearest flow thread in
    /// the containing block chain. A box whose containing block chain
    /// leaves a flow thread it sits in (a spanner, or an out-of-flow box
    /// positioned against something outside) belongs to none.
    #[must_use]
    pub fn flow_thread_containing_block(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if self.is_flow_thread(current) {
                return Some(current);
            }
            let container = self.containing_block(current)?;
            let mut walker = self.parent(current)?;
            while walker != container {
                if self.is_flow_thread(walker) {
                    return None;
                }
                walker = self.parent(walker)?;
            }
            current = container;
        }
    }

    /// Whether the box is `display: inline-block` (an atomic inline).
    #[must_use]
    pub fn is_atomic_inline(&self, id: NodeId) -> bool {
        self[id].style.display == Display::InlineBlock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbox_style::Float;

    #[test]
    fn test_block_child_wraps_existing_lines() {
        let mut tree = LayoutTree::new(ComputedStyle::default());
        let root = tree.root();
        tree.set_lines(root, vec![LineBox::new(10.0, 10.0)]);
        let child = tree.create_child_box(BoxKind::Block, ComputedStyle::default());
        tree.add_child(root, child, None);

        let children = tree.children(root).to_vec();
        assert_eq!(children.len(), 2);
        assert!(matches!(tree[children[0]].kind, BoxKind::AnonymousBlock));
        assert_eq!(tree[children[0]].lines.len(), 1);
        assert!(tree[root].lines.is_empty());
    }

    #[test]
    fn test_float_child_keeps_lines() {
        let mut tree = LayoutTree::new(ComputedStyle::default());
        let root = tree.root();
        tree.set_lines(root, vec![LineBox::new(10.0, 10.0)]);
        let style = ComputedStyle {
            float: Float::Left,
            ..ComputedStyle::default()
        };
        let child = tree.create_child_box(BoxKind::Block, style);
        tree.add_child(root, child, None);
        assert_eq!(tree[root].lines.len(), 1);
    }

    #[test]
    fn test_mark_needs_layout_reaches_root() {
        let mut tree = LayoutTree::new(ComputedStyle::default());
        let root = tree.root();
        let child = tree.create_child_box(BoxKind::Block, ComputedStyle::default());
        tree.add_child(root, child, None);
        tree[root].needs_layout = false;
        tree[child].needs_layout = false;
        tree.mark_needs_layout(child);
        assert!(tree[root].needs_layout);
    }

    #[test]
    fn test_orthogonal_child_is_formatting_context_root() {
        let mut tree = LayoutTree::new(ComputedStyle::default());
        let root = tree.root();
        let style = ComputedStyle {
            writing_mode: WritingMode::VerticalRl,
            ..ComputedStyle::default()
        };
        let child = tree.create_child_box(BoxKind::Block, style);
        tree.add_child(root, child, None);
        assert!(tree.is_orthogonal(child));
        assert!(tree.creates_new_formatting_context(child));
        assert!(tree.is_monolithic(child));
    }
}
