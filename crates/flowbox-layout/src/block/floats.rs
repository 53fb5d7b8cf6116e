//! Placing floats, and floats crossing container boundaries.
//!
//! [CSS 2.1 § 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)

use flowbox_style::BreakBetween;
use flowbox_tree::NodeId;

use super::BlockLayout;
use super::pagination::Breakability;
use crate::box_model::LogicalOffset;
use crate::float::FloatSide;

impl BlockLayout<'_> {
    /// Lay out the float `child` and place it in `container`'s registry, no
    /// higher than `candidate_top`.
    ///
    /// `previous_break_after` is the break-after value of the preceding
    /// in-flow sibling, if any: a forced break there moves the float too.
    pub(crate) fn position_and_layout_float(
        &mut self,
        container: NodeId,
        child: NodeId,
        candidate_top: f32,
        flow_offset: f32,
        previous_break_after: Option<BreakBetween>,
    ) {
        self.resolve_child_edges(container, child);
        let style = &self.tree[child].style;
        let side = FloatSide::from_style(style.float).unwrap_or(FloatSide::LineLeft);
        let clear = style.clear;

        // STEP 1: "The outer top of a floating box may not be higher than the
        // outer top of any block or floated box generated by an element
        // earlier in the source document." A float with 'clear' also starts
        // below the floats it clears.
        let floats = &self.tree[container].floats;
        let mut top = candidate_top;
        if let Some(last) = floats.last_placed_top() {
            top = top.max(last);
        }
        if let Some(bottom) = floats.lowest_float_bottom(clear) {
            top = top.max(bottom);
        }

        // STEP 2: Forced breaks happen at class A break points, between
        // in-flow siblings; a float after one moves along.
        if let (Some(fragmentation), Some(value)) = (&self.fragmentation, previous_break_after) {
            top = fragmentation.apply_forced_break(flow_offset + top, value) - flow_offset;
        }

        // STEP 3: Lay the float out where it would go if nothing was in the
        // way, so that its size is known.
        let geometry = self.compute_inline_geometry(container, child, top, 0.0, None);
        {
            let margins = &mut self.tree[child].margins;
            margins.line_left = geometry.margin_line_left;
            margins.line_right = geometry.margin_line_right;
        }
        self.layout_float_at(child, geometry.inline_size, flow_offset, top);
        if self.fragmentation.is_some() {
            top = self.adjust_float_top_for_pagination(child, top, flow_offset);
        }

        // STEP 4: Place it among the other floats.
        let margins = self.tree[child].margins;
        let (inline_size, block_size) = self.float_margin_box_size(child);
        let floats = &mut self.tree[container].floats;
        let id = floats.insert(child, side, inline_size, block_size);
        let mut rect = floats.compute_float_position(id, top);

        // STEP 5: Where it landed may cross a fragmentainer boundary it did
        // not cross before.
        if self.fragmentation.is_some() {
            if rect.block_offset != top {
                self.layout_float_at(child, geometry.inline_size, flow_offset, rect.block_offset);
            }
            let pushed = self.adjust_float_top_for_pagination(child, rect.block_offset, flow_offset);
            if pushed != rect.block_offset {
                tracing::debug!(
                    float = self.tree[child].debug_name(),
                    from = rect.block_offset,
                    to = pushed,
                    "float pushed to the next fragmentainer"
                );
                rect = self.tree[container].floats.compute_float_position(id, pushed);
                self.layout_float_at(child, geometry.inline_size, flow_offset, rect.block_offset);
            }
            rect.block_size = self.float_margin_box_size(child).1;
        }

        self.tree[container].floats.commit_placement(id, rect);
        let frame = &mut self.tree[child].frame;
        frame.inline_offset = rect.inline_offset + margins.line_left;
        frame.block_offset = rect.block_offset + margins.block_start;
    }

    fn layout_float_at(&mut self, child: NodeId, inline_size: Option<f32>, flow_offset: f32, top: f32) {
        let own_inline = match inline_size {
            Some(size) if !self.tree.is_orthogonal(child) => size,
            _ => self.orthogonal_inline_size(child),
        };
        let margin_before = self.tree[child].margins.block_start;
        self.tree[child].frame.block_offset = top + margin_before;
        self.layout_box(child, own_inline, flow_offset + top + margin_before, Vec::new());
    }

    /// Margin box of a laid-out float, in its container's axes.
    fn float_margin_box_size(&self, child: NodeId) -> (f32, f32) {
        let layout_box = &self.tree[child];
        (
            layout_box.frame.inline_size + layout_box.margins.inline_sum(),
            layout_box.frame.block_size + layout_box.margins.block_sum(),
        )
    }

    /// Where a float whose margin box starts at `top` has to go so that it
    /// does not break badly: below a strut its first line asked for, or at
    /// the next fragmentainer when it cannot break and does not fit.
    fn adjust_float_top_for_pagination(&mut self, child: NodeId, top: f32, flow_offset: f32) -> f32 {
        let Some(fragmentation) = &self.fragmentation else {
            return top;
        };
        let strut_from_content = if self.tree.is_block_flow(child) {
            self.tree[child].pagination_strut_from_child
        } else {
            0.0
        };
        let mut new_top = top + strut_from_content;
        if self.breakability(child) != Breakability::Allow {
            let (_, block_size) = self.float_margin_box_size(child);
            let moved = fragmentation.adjust_for_unsplittable(flow_offset + top, block_size) - flow_offset;
            new_top = new_top.max(moved);
        }
        self.tree[child].pagination_strut = new_top - top;
        new_top
    }

    /// [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// How far `child` at `logical_top` has to move down: clearance from
    /// its 'clear' value, or, for a box that avoids floats, the distance to
    /// the first offset where it fits beside them.
    pub(crate) fn clear_delta(&self, container: NodeId, child: NodeId, logical_top: f32) -> f32 {
        let floats = &self.tree[container].floats;
        if floats.is_empty() {
            return 0.0;
        }
        let delta = floats.clearance_delta(self.tree[child].style.clear, logical_top);
        if delta > 0.0 || !self.tree.avoids_floats(child) {
            return delta;
        }

        let frame = self.tree[child].frame;
        let full = floats.content_inline_size();
        let mut top = logical_top;
        loop {
            let available = floats.available_inline_size(top, frame.block_size);
            if available >= full {
                return top - logical_top;
            }
            let width = self
                .compute_inline_geometry(container, child, top, frame.block_size, Some(frame.inline_size))
                .inline_size
                .unwrap_or(frame.inline_size);
            if width <= available {
                return top - logical_top;
            }
            match floats.next_float_bottom_below(top) {
                Some(next) if next > top => top = next,
                _ => return top - logical_top,
            }
        }
    }

    /// Hand the floats of `child` that reach below `limit` (an offset in
    /// `container`) up to `container`, so that later content flows around
    /// them. A child that establishes a formatting context keeps its floats.
    pub(crate) fn add_overhanging_floats(&mut self, container: NodeId, child: NodeId, limit: f32) {
        if !self.tree.is_block_flow(child) || self.tree.creates_new_formatting_context(child) {
            return;
        }
        let frame = self.tree[child].frame;
        let offset = LogicalOffset::new(frame.inline_offset, frame.block_offset);
        let overhanging = self.tree[child]
            .floats
            .overhanging_below(limit - frame.block_offset, offset);
        let registry = &mut self.tree[container].floats;
        for (node, side, rect) in overhanging {
            registry.add_copy(node, side, rect);
        }
    }
}
