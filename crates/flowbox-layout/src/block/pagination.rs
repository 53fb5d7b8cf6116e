//! Breaking block-level content across fragmentainers.
//!
//! [CSS Fragmentation § 4 Rules for Breaking](https://www.w3.org/TR/css-break-3/#breaking-rules)
//!
//! Layout never splits a box in two. Content that has to start in a later
//! fragmentainer is pushed there by a *pagination strut*; struts wanted by a
//! first child may be handed up to its container so that the container
//! moves as a whole.

use flowbox_style::BreakBetween;
use flowbox_tree::NodeId;

use super::{BlockLayout, ChildrenState};
use crate::margin::MarginValues;

/// Whether a box may be split between fragmentainers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Breakability {
    /// Breaks inside are fine.
    Allow,
    /// `break-inside: avoid`: keep it in one piece if moving it helps.
    Avoid,
    /// Monolithic content.
    Forbid,
}

impl BlockLayout<'_> {
    /// [§ 4.1 Possible Break Points](https://www.w3.org/TR/css-break-3/#possible-breaks)
    pub(crate) fn breakability(&self, id: NodeId) -> Breakability {
        if self.tree.is_monolithic(id) {
            return Breakability::Forbid;
        }
        let avoids = self
            .fragmentation
            .as_ref()
            .is_some_and(|fragmentation| self.tree[id].style.break_inside.avoids(fragmentation.kind()));
        if avoids {
            Breakability::Avoid
        } else {
            Breakability::Allow
        }
    }

    /// [§ 3.1](https://www.w3.org/TR/css-break-3/#break-between)
    ///
    /// `break-before` of `id` joined with that of its first in-flow child:
    /// "the used value of the break-before property [...] is propagated to
    /// its parent if it is the first child". Multicol containers and
    /// monolithic boxes keep their children's values to themselves.
    pub(crate) fn effective_break_before(&self, id: NodeId) -> BreakBetween {
        let own = self.tree[id].style.break_before;
        if !self.propagates_breaks(id) {
            return own;
        }
        let first = self
            .tree
            .children(id)
            .iter()
            .copied()
            .find(|&child| self.tree.is_in_flow(child));
        first.map_or(own, |child| own.join(self.effective_break_before(child)))
    }

    /// `break-after` of `id` joined with that of its last in-flow child.
    pub(crate) fn effective_break_after(&self, id: NodeId) -> BreakBetween {
        let own = self.tree[id].style.break_after;
        if !self.propagates_breaks(id) {
            return own;
        }
        let last = self
            .tree
            .children(id)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.tree.is_in_flow(child));
        last.map_or(own, |child| own.join(self.effective_break_after(child)))
    }

    fn propagates_breaks(&self, id: NodeId) -> bool {
        self.tree.is_block_flow(id)
            && !self.tree.is_multicol_container(id)
            && !self.tree.is_monolithic(id)
            && !self.tree[id].has_inline_content()
    }

    /// Whether a strut wanted by `id`'s first piece of content may be
    /// taken by `id` itself, moving it as a whole. That needs a break point
    /// right before `id`: it must have an earlier in-flow sibling, sit among
    /// lines, or have a container that can move in its place.
    pub(crate) fn allows_pagination_strut(&self, id: NodeId) -> bool {
        let tree = &*self.tree;
        let layout_box = &tree[id];
        if layout_box.style.is_out_of_flow_positioned()
            || tree.is_flow_thread(id)
            || layout_box.is_layout_root
            || layout_box.style.is_non_flow_container()
        {
            return false;
        }
        let Some(container) = tree.containing_block(id) else {
            return false;
        };
        if !tree.is_block_flow(container) || tree[container].style.is_non_flow_container() {
            return false;
        }
        if tree[container].has_inline_content() {
            return true;
        }
        let mut sibling = tree.boxes().prev_sibling(id);
        while let Some(candidate) = sibling {
            if tree.is_in_flow(candidate) {
                return true;
            }
            sibling = tree.boxes().prev_sibling(candidate);
        }
        self.allows_pagination_strut(container)
    }

    /// Start of the next fragmentainer after `offset` (an offset in the
    /// current container). `None` when the fragmentainer size is unknown.
    fn next_page_top(&self, state: &ChildrenState, offset: f32) -> Option<f32> {
        let fragmentation = self.fragmentation.as_ref()?;
        let absolute = state.flow_offset + offset;
        fragmentation
            .fragmentainer_size_at(absolute)
            .map(|_| fragmentation.next_page_logical_top(absolute) - state.flow_offset)
    }

    /// Guess where `child` ends up before laying it out, so that its
    /// content is laid out close to its final position. `margins` are the
    /// child's collapsing margins as far as they are known.
    pub(crate) fn estimate_logical_top_position(
        &self,
        state: &ChildrenState,
        child: NodeId,
        margins: MarginValues,
    ) -> f32 {
        let mut estimate = state.height;
        let (mut positive_before, mut negative_before) = (0.0, 0.0);
        if !state.margins.can_collapse_with_margin_before() {
            positive_before = margins.positive_before;
            negative_before = margins.negative_before;
            estimate += state.margins.positive_margin().max(positive_before)
                - state.margins.negative_margin().max(negative_before);
        }

        // Margins that would carry the child past a fragmentainer boundary
        // are truncated there.
        let next_page = self
            .next_page_top(state, state.height)
            .filter(|_| estimate > state.height);
        if let Some(next) = next_page {
            estimate = estimate.min(next);
        }

        estimate += self.clear_delta(state.container, child, estimate);
        let without_pagination = estimate;

        let Some(fragmentation) = &self.fragmentation else {
            return estimate;
        };
        if state.at_first_in_flow_child {
            return estimate;
        }

        let value = state.previous_break_after.join(self.effective_break_before(child));
        if value.is_forced_for(fragmentation.kind()) {
            // Margins before a forced break collapse with the boundary; only
            // the child's own survive.
            let after_break = fragmentation.apply_forced_break(state.flow_offset + state.height, value)
                - state.flow_offset;
            return without_pagination.max(after_break + positive_before - negative_before);
        }
        self.adjust_for_unsplittable_child(child, estimate, state.flow_offset)
    }

    /// Where a child that should not break, placed at `top`, ends up.
    pub(crate) fn adjust_for_unsplittable_child(&self, child: NodeId, top: f32, flow_offset: f32) -> f32 {
        let Some(fragmentation) = &self.fragmentation else {
            return top;
        };
        if self.breakability(child) == Breakability::Allow {
            return top;
        }
        let layout_box = &self.tree[child];
        let mut block_size = layout_box.frame.block_size;
        if layout_box.style.is_floating() {
            block_size += layout_box.margins.block_sum();
        }
        fragmentation.adjust_for_unsplittable(flow_offset + top, block_size) - flow_offset
    }

    /// [§ 3.1 Forced breaks](https://www.w3.org/TR/css-break-3/#forced-breaks)
    ///
    /// Insert the forced break at the class A break point before `child`,
    /// if the joined break values ask for one.
    pub(crate) fn insert_forced_break_before_child_if_needed(&mut self, state: &mut ChildrenState, child: NodeId) {
        if state.at_first_in_flow_child {
            return;
        }
        let value = state.previous_break_after.join(self.effective_break_before(child));
        let Some(fragmentation) = &self.fragmentation else {
            return;
        };
        if !value.is_forced_for(fragmentation.kind()) {
            return;
        }
        // "When a forced break occurs, it is forced to the margin edge" of
        // the content after it: pending margins are dropped.
        state.margins.clear_margin();
        let old_height = state.height;
        let new_height = fragmentation.apply_forced_break(state.flow_offset + old_height, value)
            - state.flow_offset;
        state.height = new_height;
        let strut = new_height - old_height;
        if strut > 0.0 {
            tracing::debug!(
                child = self.tree[child].debug_name(),
                break_value = %value,
                strut,
                "forced break"
            );
            self.tree[child].pagination_strut = strut;
        }
    }

    /// [§ 4.4 Unforced Breaks](https://www.w3.org/TR/css-break-3/#unforced-breaks)
    ///
    /// Push `child`, laid out at `logical_top`, past a fragmentainer boundary
    /// when it must not break there or its content asked for it. Returns the
    /// new top. A first child flush with the container's content edge has
    /// no break point before it: its strut goes to the container instead.
    pub(crate) fn adjust_block_child_for_pagination(
        &mut self,
        state: &mut ChildrenState,
        child: NodeId,
        logical_top: f32,
        at_before_side_of_block: bool,
    ) -> f32 {
        let strut_from_content = if self.tree.is_block_flow(child) {
            self.tree[child].pagination_strut_from_child
        } else {
            0.0
        };
        let with_content_strut = logical_top + strut_from_content;
        let after_unsplittable = self.adjust_for_unsplittable_child(child, logical_top, state.flow_offset);
        let after_pagination = with_content_strut.max(after_unsplittable);

        let previous_strut = self.tree[child].pagination_strut;
        let strut = after_pagination - logical_top + previous_strut;
        let mut new_top = logical_top;
        if strut > 0.0 {
            let allows_strut = self.allows_pagination_strut(state.container);
            // A class A break point exists between siblings; a class C one
            // when the child is not flush with the container's edge.
            let mut can_break = !state.at_first_in_flow_child || !at_before_side_of_block;
            if !can_break && self.breakability(child) == Breakability::Forbid && !allows_strut {
                // Nobody above can move instead: break before the monolithic
                // child even at the container's start.
                can_break = true;
            }
            if can_break {
                self.tree[child].pagination_strut = strut;
                new_top += strut - previous_strut;
            } else if allows_strut {
                self.tree[state.container].pagination_strut_from_child = strut + logical_top;
                self.tree[child].pagination_strut = 0.0;
            }
        }
        state.height += new_top - logical_top;
        new_top
    }
}
