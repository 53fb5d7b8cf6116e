//! Margin collapsing between a container and its block-level children.
//!
//! [CSS 2.1 § 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "In CSS, the adjoining margins of two or more boxes (which might or might
//! not be siblings) can combine to form a single margin." The running state
//! lives in [`MarginState`]; the container keeps the maxima of whatever
//! collapsed through its own block-start and block-end margins in
//! [`crate::tree::LayoutBox::max_margins`], where its parent picks them up.

use flowbox_style::LengthOrAuto;
use flowbox_tree::NodeId;

use super::{BlockLayout, ChildrenState};
use crate::margin::MarginValues;

impl BlockLayout<'_> {
    /// The collapsing maxima `container` sees for `child`: those collected
    /// by the child's own layout for a block container, its plain margins
    /// for anything else.
    pub(crate) fn margin_values_for_child(&self, child: NodeId) -> MarginValues {
        let layout_box = &self.tree[child];
        if self.tree.is_block_flow(child) && !self.tree.is_writing_mode_root(child) {
            return layout_box.max_margins;
        }
        MarginValues::from_margins(layout_box.margins.block_start, layout_box.margins.block_end)
    }

    /// Whether the child's block-start margin (after collapsing) came from a
    /// quirk rule. A parallel writing-mode root is flipped relative to its
    /// container; a perpendicular one has no quirky margins.
    pub(crate) fn has_margin_before_quirk(&self, child: NodeId) -> bool {
        let layout_box = &self.tree[child];
        let block_flow = self.tree.is_block_flow(child);
        if !self.tree.is_writing_mode_root(child) {
            return if block_flow {
                layout_box.has_margin_before_quirk
            } else {
                layout_box.style.margin_before_quirk
            };
        }
        if self.tree.is_orthogonal(child) {
            return false;
        }
        if block_flow {
            layout_box.has_margin_after_quirk
        } else {
            layout_box.style.margin_after_quirk
        }
    }

    /// Block-end counterpart of [`Self::has_margin_before_quirk`].
    pub(crate) fn has_margin_after_quirk(&self, child: NodeId) -> bool {
        let layout_box = &self.tree[child];
        let block_flow = self.tree.is_block_flow(child);
        if !self.tree.is_writing_mode_root(child) {
            return if block_flow {
                layout_box.has_margin_after_quirk
            } else {
                layout_box.style.margin_after_quirk
            };
        }
        if self.tree.is_orthogonal(child) {
            return false;
        }
        if block_flow {
            layout_box.has_margin_before_quirk
        } else {
            layout_box.style.margin_before_quirk
        }
    }

    /// [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// "top and bottom margins of a box that does not establish a new block
    /// formatting context and that has zero computed 'min-height', zero or
    /// 'auto' computed 'height', and no in-flow children" are adjoining, and
    /// the box's margins collapse through it.
    pub(crate) fn is_self_collapsing_block(&self, id: NodeId) -> bool {
        if self.tree.creates_new_formatting_context(id) || !self.tree.is_block_flow(id) {
            return false;
        }
        let layout_box = &self.tree[id];
        let style = &layout_box.style;
        let min_block = if style.writing_mode.is_horizontal() {
            style.min_height
        } else {
            style.min_width
        };
        if self.own_block_size(id) > 0.0
            || layout_box.border_padding().block_sum() > 0.0
            || min_block.is_positive()
        {
            return false;
        }

        let block_length = if style.writing_mode.is_horizontal() {
            style.height
        } else {
            style.width
        };
        let zero_size = matches!(block_length, LengthOrAuto::Length(length) if length.is_zero());
        if !self.has_auto_block_size(id) && !zero_size {
            return false;
        }

        if layout_box.has_inline_content() {
            return false;
        }
        self.tree.children(id).iter().all(|&child| {
            let child_style = &self.tree[child].style;
            child_style.is_display_none()
                || child_style.is_floating_or_out_of_flow_positioned()
                || self.tree[child].spanner_placeholder.is_some()
                || self.is_self_collapsing_block(child)
        })
    }

    /// Collapse the child's block-start margin with the pending margin and
    /// return the child's logical top. Advances the container's height past
    /// the collapsed margin unless it still collapses through the container.
    pub(crate) fn collapse_margins(
        &mut self,
        state: &mut ChildrenState,
        child: NodeId,
        child_is_self_collapsing: bool,
    ) -> f32 {
        let container = state.container;
        let quirks = self.options.quirks_mode;
        let child_margins = self.margin_values_for_child(child);

        let mut positive_top = child_margins.positive_before;
        let mut negative_top = child_margins.negative_before;
        // The margins of a self-collapsing child collapse through it.
        if child_is_self_collapsing {
            positive_top = positive_top.max(child_margins.positive_after);
            negative_top = negative_top.max(child_margins.negative_after);
        }

        let top_quirk = self.has_margin_before_quirk(child);

        if state.margins.can_collapse_with_margin_before() {
            // The child collapses with the container's own block-start margin.
            if !quirks || !state.margins.quirk_container() || !top_quirk {
                let own = &mut self.tree[container].max_margins;
                own.positive_before = own.positive_before.max(positive_top);
                own.negative_before = own.negative_before.max(negative_top);
            }

            // Once any margin involved is not a quirk, it is kept.
            if !state.margins.determined_margin_before_quirk()
                && !top_quirk
                && positive_top - negative_top != 0.0
            {
                self.tree[container].has_margin_before_quirk = false;
                state.margins.set_determined_margin_before_quirk(true);
            }

            // A container without a margin of its own passes a quirky child
            // margin through.
            if !state.margins.determined_margin_before_quirk()
                && top_quirk
                && self.tree[container].margins.block_start == 0.0
            {
                self.tree[container].has_margin_before_quirk = true;
            }
        }

        if state.margins.quirk_container()
            && state.margins.at_before_side_of_block()
            && positive_top - negative_top != 0.0
        {
            state.margins.set_has_margin_before_quirk(top_quirk);
        }

        let before_collapse_top = state.height;
        let mut logical_top = before_collapse_top;

        let previous = self.previous_block_flow_sibling(child);
        // A previous self-collapsing sibling with clearance sits flush with
        // the float it cleared. Move back up to its margin top so that the
        // three margins collapse at the right place.
        let lifted = !state.margins.can_collapse_with_margin_before()
            && state.margins.last_child_is_self_collapsing_block_with_clearance();
        if let Some(previous) = previous.filter(|_| lifted) {
            state.height -= self.margin_values_for_child(previous).positive_before;
        }

        if child_is_self_collapsing {
            // The child adds no height: its position comes from the margins
            // collapsed so far, before its own block-end margin joins them.
            let collapsed_positive = state.margins.positive_margin().max(child_margins.positive_before);
            let collapsed_negative = state.margins.negative_margin().max(child_margins.negative_before);
            state.margins.set_margin(collapsed_positive, collapsed_negative);
            state.margins.set_positive_margin_if_larger(child_margins.positive_after);
            state.margins.set_negative_margin_if_larger(child_margins.negative_after);

            if !state.margins.can_collapse_with_margin_before() {
                logical_top = state.height + collapsed_positive - collapsed_negative;
            }
        } else {
            if !state.margins.at_before_side_of_block()
                || (!state.margins.can_collapse_margin_before_with_children()
                    && (!quirks
                        || !state.margins.quirk_container()
                        || !state.margins.has_margin_before_quirk()))
            {
                // Collapsing with the previous sibling, not the container.
                state.height += state.margins.positive_margin().max(positive_top)
                    - state.margins.negative_margin().max(negative_top);
                logical_top = state.height;
            }

            state.margins.set_positive_margin(child_margins.positive_after);
            state.margins.set_negative_margin(child_margins.negative_after);
            state.margins.set_has_margin_after_quirk(self.has_margin_after_quirk(child));
        }

        // [CSS Fragmentation § 5.2](https://www.w3.org/TR/css-break-3/#break-margins)
        // "When an unforced break occurs between block-level boxes, any
        // margins adjoining the break truncate to zero."
        let absolute = state.flow_offset + before_collapse_top;
        let next_page_top = self
            .fragmentation
            .as_ref()
            .filter(|fragmentation| {
                logical_top > before_collapse_top && fragmentation.fragmentainer_size_at(absolute).is_some()
            })
            .map(|fragmentation| fragmentation.next_page_logical_top(absolute) - state.flow_offset);
        if let Some(next_top) = next_page_top {
            let truncated = logical_top.min(next_top);
            state.height += truncated - logical_top;
            logical_top = truncated;
        }

        // Floats of the previous sibling may now overhang this child.
        if let Some(previous) = previous.filter(|&previous| !self.tree.avoids_floats(previous)) {
            let previous_top = self.tree[previous].frame.block_offset;
            let reaches_below = self.tree[previous]
                .floats
                .lowest_bottom()
                .is_some_and(|bottom| previous_top + bottom > logical_top);
            if reaches_below {
                self.add_overhanging_floats(container, previous, logical_top);
            }
        }

        logical_top
    }

    /// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// Apply clearance to a child whose margins collapsed to `logical_top`.
    /// Returns the child's new top.
    pub(crate) fn clear_floats_if_needed(
        &mut self,
        state: &mut ChildrenState,
        child: NodeId,
        old_max_margins: MarginValues,
        logical_top: f32,
        child_is_self_collapsing: bool,
    ) -> f32 {
        let height_increase = self.clear_delta(state.container, child, logical_top);
        state.margins.set_last_child_is_self_collapsing_block_with_clearance(false);
        if height_increase == 0.0 {
            return logical_top;
        }

        if child_is_self_collapsing {
            state.margins.set_last_child_is_self_collapsing_block_with_clearance(true);

            // "If the top and bottom margins of an element with clearance are
            // adjoining, its margins collapse with the adjoining margins of
            // following siblings but that resulting margin does not collapse
            // with the bottom margin of the parent block."
            let child_margins = self.margin_values_for_child(child);
            state.margins.set_margin(
                child_margins.positive_before.max(child_margins.positive_after),
                child_margins.negative_before.max(child_margins.negative_after),
            );
            state.margins.set_can_collapse_margin_after_with_last_child(false);

            // "the amount of clearance is set so that clearance + margin-top =
            // [height of float]"
            state.height = self.tree[child].frame.block_offset + child_margins.negative_before;
        } else {
            state.height += height_increase;
        }

        if state.margins.can_collapse_with_margin_before() {
            // Clearance separates the child from the container's top: what
            // collapsed into the container's margin so far stays, the child's
            // margin does not.
            let own = &mut self.tree[state.container].max_margins;
            own.positive_before = old_max_margins.positive_before;
            own.negative_before = old_max_margins.negative_before;
            state.margins.set_at_before_side_of_block(false);
        }

        logical_top + height_increase
    }

    /// After the last child: add the pending margin unless it collapses
    /// through the container's block-end margin, add block-end border and
    /// padding, and record what collapsed through.
    pub(crate) fn handle_after_side_of_block(&mut self, state: &mut ChildrenState) {
        let container = state.container;
        let quirks = self.options.quirks_mode;
        let bp = self.tree[container].border_padding();
        state.margins.set_at_after_side_of_block(true);

        // A last child that was self-collapsing with clearance left the
        // height flush with the float; collapse at its margin top instead.
        let lifted = state.margins.last_child_is_self_collapsing_block_with_clearance();
        if let Some(last) = state.last_in_flow.filter(|_| lifted) {
            state.height -= self.margin_values_for_child(last).positive_before;
        }

        if state.margins.can_collapse_margin_after_with_children()
            && !state.margins.can_collapse_margin_after_with_last_child()
        {
            state.margins.set_can_collapse_margin_after_with_children(false);
        }

        if !state.margins.can_collapse_with_margin_after()
            && !state.margins.can_collapse_with_margin_before()
            && (!quirks || !state.margins.quirk_container() || !state.margins.has_margin_after_quirk())
        {
            state.height += state.margins.margin();
        }

        state.height += bp.block_end;
        // Negative margins cannot pull the height below border and padding.
        state.height = state.height.max(bp.block_sum());

        self.set_collapsed_bottom_margin(state);
    }

    fn set_collapsed_bottom_margin(&mut self, state: &ChildrenState) {
        if !state.margins.can_collapse_with_margin_after()
            || state.margins.can_collapse_with_margin_before()
        {
            return;
        }
        let own_margin_after = self.tree[state.container].margins.block_end;
        let container = &mut self.tree[state.container];
        container.max_margins.positive_after =
            container.max_margins.positive_after.max(state.margins.positive_margin());
        container.max_margins.negative_after =
            container.max_margins.negative_after.max(state.margins.negative_margin());

        if !state.margins.has_margin_after_quirk() {
            container.has_margin_after_quirk = false;
        }
        if state.margins.has_margin_after_quirk() && own_margin_after == 0.0 {
            container.has_margin_after_quirk = true;
        }
    }

    /// The nearest earlier sibling that is an in-flow block container.
    fn previous_block_flow_sibling(&self, child: NodeId) -> Option<NodeId> {
        let mut sibling = self.tree.boxes().prev_sibling(child);
        while let Some(candidate) = sibling {
            if !self.tree[candidate].style.is_display_none() {
                let in_flow = !self.tree[candidate]
                    .style
                    .is_floating_or_out_of_flow_positioned();
                return (in_flow && self.tree.is_block_flow(candidate)).then_some(candidate);
            }
            sibling = self.tree.boxes().prev_sibling(candidate);
        }
        None
    }
}
