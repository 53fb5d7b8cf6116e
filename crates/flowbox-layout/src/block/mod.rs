//! Block flow layout.
//!
//! [CSS 2.1 § 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a
//! block formatting context collapse."
//!
//! [`BlockLayout`] walks the children of a block container in document
//! order. For every in-flow child it guesses a position, lays the child out
//! there, and then settles the real position from margin collapsing,
//! clearance and fragmentation. When the real position differs from the
//! guess the child is laid out again, a bounded number of times.
//!
//! - [`sizing`]: inline sizes, margins and block sizes.
//! - [`margins`]: margin collapsing.
//! - [`floats`]: float placement, clearance and overhanging floats.
//! - [`pagination`]: forced breaks, struts and unsplittable content.

mod floats;
mod margins;
mod pagination;
mod sizing;

use flowbox_style::{BreakBetween, Display};
use flowbox_tree::NodeId;

use sizing::{FlowSides, solve_inline_constraint};

use crate::LayoutOptions;
use crate::box_model::{LogicalOffset, LogicalRect};
use crate::float::FloatSide;
use crate::fragmentation::FragmentationState;
use crate::lines::LineStacking;
use crate::margin::{MarginState, MarginStateInit, MarginValues};
use crate::tree::{BoxKind, LayoutTree};

/// How many times one child may be positioned before its position is
/// taken as final.
const MAX_CHILD_LAYOUT_ROUNDS: usize = 4;

/// Floats of a container that reach into a child, in the child's
/// coordinates.
pub(crate) type IntrudingFloats = Vec<(NodeId, FloatSide, LogicalRect)>;

/// One layout pass over a [`LayoutTree`].
pub(crate) struct BlockLayout<'a> {
    pub(crate) tree: &'a mut LayoutTree,
    pub(crate) options: &'a LayoutOptions,
    /// The fragmentation context content is currently laid out in. `None`
    /// for continuous media and inside monolithic content.
    pub(crate) fragmentation: Option<FragmentationState>,
}

/// Running state while one container lays out its block-level children.
#[derive(Debug, Clone)]
pub(crate) struct ChildrenState {
    pub container: NodeId,
    /// Offset of the container's border box in the fragmentation flow.
    pub flow_offset: f32,
    /// Block offset reached so far, from the container's border-box start.
    pub height: f32,
    pub margins: MarginState,
    /// `break-after` of the previous in-flow child.
    pub previous_break_after: BreakBetween,
    pub at_first_in_flow_child: bool,
    pub last_in_flow: Option<NodeId>,
}

/// What a round of child positioning starts from. Every round restores it
/// so that it sees the same inputs as the first.
#[derive(Debug, Clone, Copy)]
struct RoundStart {
    height: f32,
    margins: MarginState,
    max_margins: MarginValues,
    has_margin_before_quirk: bool,
    has_margin_after_quirk: bool,
    strut_from_child: f32,
}

impl<'a> BlockLayout<'a> {
    /// A pass over `tree` in the given fragmentation context.
    pub(crate) const fn new(
        tree: &'a mut LayoutTree,
        options: &'a LayoutOptions,
        fragmentation: Option<FragmentationState>,
    ) -> Self {
        Self {
            tree,
            options,
            fragmentation,
        }
    }
}

impl BlockLayout<'_> {
    // ------------------------------------------------------------------
    // Sizes in the box's own axes
    // ------------------------------------------------------------------

    /// Border-box size along the box's own inline axis.
    pub(crate) fn own_inline_size(&self, id: NodeId) -> f32 {
        let frame = self.tree[id].frame;
        if self.tree.is_orthogonal(id) {
            frame.block_size
        } else {
            frame.inline_size
        }
    }

    /// Border-box size along the box's own block axis.
    pub(crate) fn own_block_size(&self, id: NodeId) -> f32 {
        let frame = self.tree[id].frame;
        if self.tree.is_orthogonal(id) {
            frame.inline_size
        } else {
            frame.block_size
        }
    }

    pub(crate) fn set_own_inline_size(&mut self, id: NodeId, size: f32) {
        let orthogonal = self.tree.is_orthogonal(id);
        let frame = &mut self.tree[id].frame;
        if orthogonal {
            frame.block_size = size;
        } else {
            frame.inline_size = size;
        }
    }

    fn set_own_block_size(&mut self, id: NodeId, size: f32) {
        let orthogonal = self.tree.is_orthogonal(id);
        let frame = &mut self.tree[id].frame;
        if orthogonal {
            frame.inline_size = size;
        } else {
            frame.block_size = size;
        }
    }

    /// Content-box inline size of a box whose own inline size is set.
    pub(crate) fn content_inline_size(&self, id: NodeId) -> f32 {
        let border_padding = self.tree[id].border_padding().inline_sum();
        (self.own_inline_size(id) - border_padding).max(0.0)
    }

    /// The box a child stands for: the spanner of a spanner placeholder,
    /// the child itself otherwise.
    fn layout_subject(&self, child: NodeId) -> NodeId {
        match self.tree[child].kind {
            BoxKind::SpannerPlaceholder { spanner } => spanner,
            _ => child,
        }
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Lay out the whole tree. The root fills the viewport along its inline
    /// axis; pages start at the root's margin edge.
    pub(crate) fn layout_root(&mut self) {
        let root = self.tree.root();
        let style = &self.tree[root].style;
        let writing_mode = style.writing_mode;
        let direction = style.direction;
        let viewport_inline = if writing_mode.is_horizontal() {
            self.options.viewport_width
        } else {
            self.options.viewport_height
        };
        let margins = FlowSides::from_physical(style.margin, writing_mode);
        let margin_left = margins.line_left.resolve(viewport_inline);
        let margin_right = margins.line_right.resolve(viewport_inline);

        self.resolve_edges(root, writing_mode, viewport_inline);
        let border_padding = self.tree[root].border_padding().inline_sum();
        let specified = self
            .specified_inline_size(root, viewport_inline)
            .map(|size| size + border_padding);
        let (inline_size, left, right) = solve_inline_constraint(
            viewport_inline,
            specified,
            margin_left,
            margin_right,
            border_padding,
            direction,
        );

        let layout_box = &mut self.tree[root];
        layout_box.margins.line_left = left;
        layout_box.margins.line_right = right;
        layout_box.frame.inline_offset = left;
        let margin_before = layout_box.margins.block_start;
        layout_box.frame.block_offset = margin_before;
        self.layout_box(root, inline_size, margin_before, Vec::new());
    }

    /// Lay out `id` with border-box inline size `inline_size` (in its own
    /// writing mode). `flow_offset` is where its border box starts in the
    /// fragmentation flow; `intruding` are floats of its container that
    /// reach into it.
    pub(crate) fn layout_box(&mut self, id: NodeId, inline_size: f32, flow_offset: f32, intruding: IntrudingFloats) {
        // Monolithic content never breaks, so nothing inside it is
        // fragmented either.
        let monolithic = self.tree.is_monolithic(id);
        let outer = if monolithic { self.fragmentation.take() } else { None };

        let column_block_size = match &self.tree[id].kind {
            BoxKind::ColumnSet(state) => Some(state.column_block_size.unwrap_or(0.0)),
            _ => None,
        };
        if self.tree.is_replaced(id) {
            self.layout_replaced(id, inline_size);
        } else if let Some(block_size) = column_block_size {
            // Column sets are sized by multicol layout; they only take the
            // width here.
            self.set_own_inline_size(id, inline_size);
            self.set_own_block_size(id, block_size);
            self.tree[id].overflow = LogicalRect::new(0.0, 0.0, inline_size, block_size);
        } else if self.tree.is_multicol_container(id) {
            self.layout_multicol(id, inline_size, flow_offset);
        } else {
            self.layout_block_flow(id, inline_size, flow_offset, intruding);
        }

        if monolithic {
            self.fragmentation = outer;
        }
        self.tree[id].needs_layout = false;
    }

    /// [§ 10.3.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    fn layout_replaced(&mut self, id: NodeId, inline_size: f32) {
        let containing = self
            .tree
            .layout_parent(id)
            .map_or(self.options.viewport_width, |parent| self.content_inline_size(parent));
        let (_, content_block) = self.replaced_content_size(id, containing);
        let border_padding = self.tree[id].border_padding().block_sum();
        let block_size = (content_block + border_padding).max(self.min_block_size(id) + border_padding);
        self.set_own_inline_size(id, inline_size);
        self.set_own_block_size(id, block_size);
        self.tree[id].overflow = LogicalRect::new(0.0, 0.0, inline_size, block_size);
    }

    /// Lay out a block container: its lines or its block-level children,
    /// then its block size.
    pub(crate) fn layout_block_flow(
        &mut self,
        id: NodeId,
        inline_size: f32,
        flow_offset: f32,
        intruding: IntrudingFloats,
    ) {
        // STEP 1: Start from a clean slate.
        self.set_own_inline_size(id, inline_size);
        let border_padding = self.tree[id].border_padding();
        let has_auto_block_size = self.has_auto_block_size(id);
        let isolates_children = self.tree.creates_new_formatting_context(id);
        let layout_box = &mut self.tree[id];
        layout_box
            .floats
            .reset(border_padding.line_left, inline_size - border_padding.line_right);
        for (node, side, rect) in intruding {
            layout_box.floats.add_copy(node, side, rect);
        }
        layout_box.max_margins =
            MarginValues::from_margins(layout_box.margins.block_start, layout_box.margins.block_end);
        layout_box.has_margin_before_quirk = layout_box.style.margin_before_quirk;
        layout_box.has_margin_after_quirk = layout_box.style.margin_after_quirk;
        layout_box.pagination_strut_from_child = 0.0;
        let quirk_container = layout_box.is_document_body || layout_box.style.display == Display::TableCell;
        let own_margins = layout_box.max_margins;
        let has_lines = layout_box.has_inline_content();

        let mut state = ChildrenState {
            container: id,
            flow_offset,
            height: border_padding.block_start,
            margins: MarginState::new(MarginStateInit {
                isolates_children,
                before_border_padding: border_padding.block_start,
                after_border_padding: border_padding.block_end,
                has_auto_block_size,
                quirk_container,
                own_margins,
            }),
            previous_break_after: BreakBetween::Auto,
            at_first_in_flow_child: true,
            last_in_flow: None,
        };

        // STEP 2: Content.
        if has_lines {
            self.layout_inline_content(&mut state);
        } else {
            self.layout_block_children(&mut state);
        }

        // STEP 3: [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
        // The used block size.
        let mut block_size = match self.specified_block_size(id) {
            Some(content) => content + border_padding.block_sum(),
            None => state.height,
        };
        // [§ 10.6.7](https://www.w3.org/TR/CSS2/visudet.html#root-height)
        // "In addition, if the element has any floating descendants whose
        // bottom margin edge is below the element's bottom content edge,
        // then the height is increased to include those edges."
        let contained_floats_bottom = self.tree[id]
            .floats
            .lowest_bottom()
            .filter(|_| isolates_children && self.specified_block_size(id).is_none());
        if let Some(bottom) = contained_floats_bottom {
            block_size = block_size.max(bottom + border_padding.block_end);
        }
        block_size = block_size.max(self.min_block_size(id) + border_padding.block_sum());
        self.set_own_block_size(id, block_size);

        self.compute_overflow(id);
    }

    // ------------------------------------------------------------------
    // Inline content
    // ------------------------------------------------------------------

    /// Place the floats among the lines at the top of the content box, then
    /// stack the lines around them.
    fn layout_inline_content(&mut self, state: &mut ChildrenState) {
        let container = state.container;
        let border_padding = self.tree[container].border_padding();
        let content_top = border_padding.block_start;

        let mut out_of_flow = Vec::new();
        for child in self.tree.children(container).to_vec() {
            let style = &self.tree[child].style;
            if style.is_display_none() {
                continue;
            }
            if style.is_out_of_flow_positioned() {
                out_of_flow.push(child);
            } else if style.is_floating() {
                self.position_and_layout_float(container, child, content_top, state.flow_offset, None);
            }
        }

        let mut lines = std::mem::take(&mut self.tree[container].lines);
        let content_size = border_padding.block_sum() + lines.iter().map(|line| line.block_size).sum::<f32>();
        let container_fits_in_fragmentainer = self.fragmentation.as_ref().is_some_and(|fragmentation| {
            fragmentation
                .fragmentainer_size_at(state.flow_offset)
                .is_some_and(|size| content_size <= size)
        });
        let style = &self.tree[container].style;
        let result = LineStacking {
            content_block_start: content_top,
            floats: &self.tree[container].floats,
            fragmentation: self.fragmentation.as_ref().map(|fragmentation| (fragmentation, state.flow_offset)),
            orphans: style.orphans,
            widows: style.widows,
            allows_pagination_strut: self.allows_pagination_strut(container),
            container_fits_in_fragmentainer,
        }
        .run(&mut lines);

        let layout_box = &mut self.tree[container];
        layout_box.lines = lines;
        layout_box.pagination_strut_from_child = result.strut_from_child;
        state.height = result.content_block_end + border_padding.block_end;

        for child in out_of_flow {
            self.layout_out_of_flow(container, child, content_top);
        }
    }

    // ------------------------------------------------------------------
    // Block-level children
    // ------------------------------------------------------------------

    fn layout_block_children(&mut self, state: &mut ChildrenState) {
        let container = state.container;
        let mut out_of_flow = Vec::new();

        for child in self.tree.children(container).to_vec() {
            let style = &self.tree[child].style;
            let (display_none, out_of_flow_positioned, floating) = (
                style.is_display_none(),
                style.is_out_of_flow_positioned(),
                style.is_floating(),
            );
            if display_none || self.tree.is_flow_thread(child) {
                continue;
            }

            if self.tree[child].spanner_placeholder.is_some() {
                self.skip_column_spanner(state, child);
                continue;
            }

            if out_of_flow_positioned {
                out_of_flow.push((child, self.static_block_position(state)));
                continue;
            }

            if floating {
                // The float sits below the margin pending from the previous
                // sibling, which has not been added to the height yet.
                let mut candidate_top = state.height;
                if !state.margins.can_collapse_with_margin_before() {
                    candidate_top += state.margins.margin();
                }
                let previous_break_after = state.last_in_flow.map(|_| state.previous_break_after);
                self.position_and_layout_float(
                    container,
                    child,
                    candidate_top,
                    state.flow_offset,
                    previous_break_after,
                );
                continue;
            }

            self.layout_block_child(state, child);
            state.last_in_flow = Some(child);
        }

        self.handle_after_side_of_block(state);

        for (child, static_top) in out_of_flow {
            self.layout_out_of_flow(container, child, static_top);
        }
    }

    /// [Multicol § 6](https://www.w3.org/TR/css-multicol-1/#spanning-columns)
    ///
    /// A spanner is laid out by its multicol container, not here. The
    /// column flow ends at the spanner: the pending margin goes before it,
    /// and the content after it starts a new row of columns.
    fn skip_column_spanner(&mut self, state: &mut ChildrenState, spanner: NodeId) {
        state.height += state.margins.margin();
        state.margins.clear_margin();
        let offset = state.flow_offset + state.height;
        if let Some(fragmentation) = &mut self.fragmentation {
            fragmentation.skip_column_spanner(spanner, offset);
        }
        tracing::debug!(spanner = self.tree[spanner].debug_name(), offset, "skipping column spanner");
    }

    /// [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
    ///
    /// Static position of an out-of-flow child: where its block-start
    /// margin edge would be if it were in flow. Its margins never collapse,
    /// so only the margin pending from before is added.
    fn static_block_position(&self, state: &ChildrenState) -> f32 {
        let mut top = state.height;
        if let (Some(fragmentation), Some(_)) = (&self.fragmentation, state.last_in_flow) {
            top = fragmentation.apply_forced_break(state.flow_offset + top, state.previous_break_after)
                - state.flow_offset;
        }
        if !state.margins.can_collapse_with_margin_before() {
            top += state.margins.margin();
        }
        top
    }

    /// Lay out an out-of-flow child at its static position. It sizes to its
    /// content and is not fragmented.
    fn layout_out_of_flow(&mut self, container: NodeId, child: NodeId, static_top: f32) {
        self.resolve_child_edges(container, child);
        let geometry = self.compute_inline_geometry(container, child, static_top, 0.0, None);
        let own_inline = match geometry.inline_size {
            Some(size) if !self.tree.is_orthogonal(child) => size,
            _ => self.orthogonal_inline_size(child),
        };
        {
            let margins = &mut self.tree[child].margins;
            margins.line_left = geometry.margin_line_left;
            margins.line_right = geometry.margin_line_right;
        }

        let outer = self.fragmentation.take();
        self.layout_box(child, own_inline, 0.0, Vec::new());
        self.fragmentation = outer;

        let margin_before = self.tree[child].margins.block_start;
        let frame = &mut self.tree[child].frame;
        frame.inline_offset = geometry.inline_offset;
        frame.block_offset = static_top + margin_before;
    }

    /// Lay out one in-flow child and advance the container past it.
    fn layout_block_child(&mut self, state: &mut ChildrenState, child: NodeId) {
        let container = state.container;
        let subject = self.layout_subject(child);
        self.resolve_child_edges(container, child);
        self.tree[child].pagination_strut = 0.0;

        let start = RoundStart {
            height: state.height,
            margins: state.margins,
            max_margins: self.tree[container].max_margins,
            has_margin_before_quirk: self.tree[container].has_margin_before_quirk,
            has_margin_after_quirk: self.tree[container].has_margin_after_quirk,
            strut_from_child: self.tree[container].pagination_strut_from_child,
        };

        // STEP 1: Guess where the child goes. Only its own margins are known
        // before it is laid out.
        let child_box = &self.tree[child];
        let guessed_margins = if self.tree.is_block_flow(child) && !child_box.needs_layout {
            self.margin_values_for_child(child)
        } else {
            MarginValues::from_margins(child_box.margins.block_start, child_box.margins.block_end)
        };
        let mut top = self.estimate_logical_top_position(state, child, guessed_margins);
        let paginated = self.fragmentation.is_some();

        let mut round = 1;
        let (new_top, at_before_side_of_block, top_before_clear, self_collapsing) = loop {
            self.restore_round_start(state, child, &start);

            // STEP 2: Lay it out there.
            self.position_and_layout_once_if_needed(state, child, top, round == 1);

            let at_before_side_of_block = state.margins.at_before_side_of_block();
            let self_collapsing = self.is_self_collapsing_block(subject);

            // STEP 3: Forced breaks come before margins and clearance.
            if paginated {
                self.insert_forced_break_before_child_if_needed(state, child);
            }

            // STEP 4: Collapse margins, then apply clearance.
            let top_before_clear = self.collapse_margins(state, child, self_collapsing);
            let new_top = self.clear_floats_if_needed(
                state,
                child,
                start.max_margins,
                top_before_clear,
                self_collapsing,
            );

            if new_top == top {
                break (new_top, at_before_side_of_block, top_before_clear, self_collapsing);
            }
            if round == MAX_CHILD_LAYOUT_ROUNDS {
                tracing::error!(
                    child = self.tree[child].debug_name(),
                    laid_out_at = top,
                    settled_at = new_top,
                    "child position did not settle"
                );
                debug_assert!(false, "child position did not settle after {round} rounds");
                break (new_top, at_before_side_of_block, top_before_clear, self_collapsing);
            }
            tracing::trace!(
                child = self.tree[child].debug_name(),
                round,
                from = top,
                to = new_top,
                "child moved, laying out again"
            );
            top = new_top;
            round += 1;
        };

        // STEP 5: Fragmentation. Forced breaks were handled above; here the
        // child moves for unsplittable content or for a strut its content
        // asked for.
        let mut final_top = new_top;
        if paginated {
            let flush = at_before_side_of_block && top_before_clear == new_top;
            final_top = self.adjust_block_child_for_pagination(state, child, new_top, flush);
        }
        if final_top != top {
            self.position_and_layout_once_if_needed(state, child, final_top, false);
        }

        // STEP 6: Finish.
        self.finish_block_child(state, child, final_top, self_collapsing);
    }

    fn restore_round_start(&mut self, state: &mut ChildrenState, child: NodeId, start: &RoundStart) {
        state.height = start.height;
        state.margins = start.margins;
        let container = &mut self.tree[state.container];
        container.max_margins = start.max_margins;
        container.has_margin_before_quirk = start.has_margin_before_quirk;
        container.has_margin_after_quirk = start.has_margin_after_quirk;
        container.pagination_strut_from_child = start.strut_from_child;
        self.tree[child].pagination_strut = 0.0;
    }

    /// Put the child at `top`, laying it out unless its earlier layout is
    /// still good: the first attempt always lays out; later ones only when
    /// the move can change the layout (breaks, floats beside it, or a
    /// different width next to floats).
    fn position_and_layout_once_if_needed(
        &mut self,
        state: &ChildrenState,
        child: NodeId,
        top: f32,
        first_attempt: bool,
    ) {
        let subject = self.layout_subject(child);
        let moved = self.tree[subject].frame.block_offset != top;
        let container_has_floats = !self.tree[state.container].floats.is_empty();
        let needs_layout = first_attempt
            || self.tree[subject].needs_layout
            || (moved
                && (self.fragmentation.is_some()
                    || container_has_floats
                    || !self.tree[subject].floats.is_empty()))
            || (container_has_floats && self.inline_size_changed(state.container, subject, top));

        if needs_layout {
            self.layout_child_at(state, child, top);
        } else {
            self.tree[subject].frame.block_offset = top;
            self.tree[child].frame.block_offset = top;
        }
    }

    /// Whether a box beside floats would get a different width at `top`.
    fn inline_size_changed(&self, container: NodeId, subject: NodeId, top: f32) -> bool {
        if !self.tree.avoids_floats(subject) || self.tree.is_orthogonal(subject) {
            return false;
        }
        let frame = self.tree[subject].frame;
        self.compute_inline_geometry(container, subject, top, frame.block_size, None)
            .inline_size
            .is_some_and(|size| size != frame.inline_size)
    }

    /// Lay out `child` with its border box at block offset `top`.
    fn layout_child_at(&mut self, state: &ChildrenState, child: NodeId, top: f32) {
        let container = state.container;
        let subject = self.layout_subject(child);
        let previous_block_size = self.tree[subject].frame.block_size;
        let geometry = self.compute_inline_geometry(container, subject, top, previous_block_size, None);
        let own_inline = match geometry.inline_size {
            Some(size) if !self.tree.is_orthogonal(subject) => size,
            _ => self.orthogonal_inline_size(subject),
        };

        let intruding = if self.tree.is_block_flow(subject) && !self.tree.creates_new_formatting_context(subject) {
            self.tree[container]
                .floats
                .intruding_into(LogicalOffset::new(geometry.inline_offset, top))
        } else {
            Vec::new()
        };

        {
            let layout_box = &mut self.tree[subject];
            layout_box.margins.line_left = geometry.margin_line_left;
            layout_box.margins.line_right = geometry.margin_line_right;
            layout_box.frame.inline_offset = geometry.inline_offset;
            layout_box.frame.block_offset = top;
        }
        self.layout_box(subject, own_inline, state.flow_offset + top, intruding);
        if subject != child {
            self.tree[child].frame = self.tree[subject].frame;
            self.tree[child].needs_layout = false;
        }
    }

    /// Settle the inline position, advance the container and hand up
    /// overhanging floats.
    fn finish_block_child(&mut self, state: &mut ChildrenState, child: NodeId, top: f32, self_collapsing: bool) {
        let container = state.container;
        let subject = self.layout_subject(child);

        // A self-collapsing child after one with clearance keeps the latch;
        // anything else releases it.
        if !state.margins.can_collapse_margin_after_with_last_child() && !self_collapsing {
            state.margins.set_can_collapse_margin_after_with_last_child(true);
        }
        // No longer at the top once something with a size was placed. This
        // has to come after clearance.
        if state.margins.at_before_side_of_block() && !self_collapsing {
            state.margins.set_at_before_side_of_block(false);
        }

        // [§ 9.5] Where the box fits beside floats depends on its final block
        // range; a box that ends up narrower there is laid out again.
        let frame = self.tree[subject].frame;
        let orthogonal = self.tree.is_orthogonal(subject);
        let laid_out = orthogonal.then_some(frame.inline_size);
        let mut geometry = self.compute_inline_geometry(container, subject, top, frame.block_size, laid_out);
        if !orthogonal && geometry.inline_size.is_some_and(|size| size != frame.inline_size) {
            tracing::trace!(child = self.tree[child].debug_name(), "width changed beside floats");
            self.layout_child_at(state, child, top);
            let frame = self.tree[subject].frame;
            geometry = self.compute_inline_geometry(container, subject, top, frame.block_size, None);
        }
        {
            let layout_box = &mut self.tree[subject];
            layout_box.margins.line_left = geometry.margin_line_left;
            layout_box.margins.line_right = geometry.margin_line_right;
            layout_box.frame.inline_offset = geometry.inline_offset;
            layout_box.frame.block_offset = top;
        }
        if subject != child {
            let (frame, margins) = (self.tree[subject].frame, self.tree[subject].margins);
            self.tree[child].frame = frame;
            self.tree[child].margins = margins;
        }

        state.height += self.tree[child].frame.block_size;
        let limit = state.height;
        self.add_overhanging_floats(container, subject, limit);

        state.previous_break_after = self.effective_break_after(subject);
        state.at_first_in_flow_child = false;
    }

    /// [CSS Overflow § 2.2](https://www.w3.org/TR/css-overflow-3/#scrollable)
    ///
    /// The box plus everything inside it that sticks out, in its own
    /// coordinates. Spanners belong to their multicol container and flow
    /// thread content is shown through the column sets.
    fn compute_overflow(&mut self, id: NodeId) {
        let own = LogicalRect::new(0.0, 0.0, self.own_inline_size(id), self.own_block_size(id));
        let mut overflow = own;
        for &child in self.tree.children(id) {
            let child_box = &self.tree[child];
            if child_box.style.is_display_none()
                || self.tree.is_flow_thread(child)
                || child_box.spanner_placeholder.is_some()
            {
                continue;
            }
            let frame = child_box.frame;
            let child_overflow = if self.tree.is_writing_mode_root(child) {
                frame
            } else {
                child_box.overflow.translated(frame.offset())
            };
            overflow = overflow.unite(&child_overflow);
        }
        for line in &self.tree[id].lines {
            overflow = overflow.unite(&line.rect);
        }
        self.tree[id].overflow = overflow;
    }
}
