//! Inline sizes, margins and block sizes of block-level boxes.
//!
//! [CSS 2.1 § 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
//!
//! Everything here is flow-relative. "Width" is the inline size in whichever
//! writing mode matters: the container's for margins and placement, the
//! box's own for the size it lays out its content with.

use flowbox_style::{Direction, Display, Length, LengthOrAuto, Sides, WritingMode};
use flowbox_tree::NodeId;

use super::BlockLayout;
use crate::box_model::BoxStrut;
use crate::tree::BoxKind;

/// Physical edge values rearranged into flow-relative edges.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlowSides<T> {
    pub block_start: T,
    pub block_end: T,
    pub line_left: T,
    pub line_right: T,
}

impl<T: Copy> FlowSides<T> {
    /// Line-left is the inline-start side of `ltr` text.
    pub(crate) fn from_physical(sides: Sides<T>, writing_mode: WritingMode) -> Self {
        Self {
            block_start: sides.side(writing_mode.block_start_physical()),
            block_end: sides.side(writing_mode.block_end_physical()),
            line_left: sides.side(writing_mode.inline_start_physical(Direction::Ltr)),
            line_right: sides.side(writing_mode.inline_end_physical(Direction::Ltr)),
        }
    }
}

/// Where a child goes along its container's inline axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InlineGeometry {
    /// Border-box size along the container's inline axis. `None` for an
    /// orthogonal box that has not been laid out yet.
    pub inline_size: Option<f32>,
    pub margin_line_left: f32,
    pub margin_line_right: f32,
    /// Line-left edge of the border box in the container.
    pub inline_offset: f32,
}

/// How the inline size of a box is found before its content is laid out.
enum InlineSizing {
    /// `width: auto` in normal flow: fill the containing block.
    Fill,
    /// A definite border-box size.
    Definite(f32),
    /// A shrink-to-fit border-box size. Auto margins are zero.
    ShrinkToFit(f32),
    /// Orthogonal flow: the size along the container's inline axis is the
    /// box's block size, known only after layout.
    Orthogonal(Option<f32>),
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
///
/// `size` is the border-box size, `None` for 'auto'. Margins are `None` for
/// 'auto'. Returns the used `(size, margin_line_left, margin_line_right)`.
pub(crate) fn solve_inline_constraint(
    containing: f32,
    size: Option<f32>,
    margin_line_left: Option<f32>,
    margin_line_right: Option<f32>,
    border_padding: f32,
    direction: Direction,
) -> (f32, f32, f32) {
    // RULE A: "If 'width' is set to 'auto', any other 'auto' values become
    // '0' and 'width' follows from the resulting equality."
    let Some(size) = size else {
        let left = margin_line_left.unwrap_or(0.0);
        let right = margin_line_right.unwrap_or(0.0);
        let size = (containing - left - right).max(border_padding);
        return over_constrained(containing, size, left, right, direction);
    };

    // "If 'width' is not 'auto' and 'border-left-width' + 'padding-left' +
    // 'width' + 'padding-right' + 'border-right-width' (plus any of
    // 'margin-left' or 'margin-right' that are not 'auto') is larger than
    // the width of the containing block, then any 'auto' values for
    // 'margin-left' or 'margin-right' are, for the following rules, treated
    // as zero."
    let (mut left, mut right) = (margin_line_left, margin_line_right);
    if size + left.unwrap_or(0.0) + right.unwrap_or(0.0) > containing {
        left = Some(left.unwrap_or(0.0));
        right = Some(right.unwrap_or(0.0));
    }

    match (left, right) {
        // RULE B: "If both 'margin-left' and 'margin-right' are 'auto', their
        // used values are equal. This horizontally centers the element with
        // respect to the edges of the containing block."
        (None, None) => {
            let each = (containing - size) / 2.0;
            (size, each, each)
        }
        // RULE C: "If there is exactly one value specified as 'auto', its
        // used value follows from the equality."
        (None, Some(right)) => (size, containing - size - right, right),
        (Some(left), None) => (size, left, containing - size - left),
        // RULE D: over-constrained.
        (Some(left), Some(right)) => over_constrained(containing, size, left, right, direction),
    }
}

/// "If all of the above have a computed value other than 'auto', the values
/// are said to be "over-constrained" and one of the used values will have
/// to be different from its computed value. If the 'direction' property of
/// the containing block has the value 'ltr', the specified value of
/// 'margin-right' is ignored and the value is calculated so as to make the
/// equality true. If the value of 'direction' is 'rtl', this happens to
/// 'margin-left' instead."
fn over_constrained(
    containing: f32,
    size: f32,
    left: f32,
    right: f32,
    direction: Direction,
) -> (f32, f32, f32) {
    match direction {
        Direction::Ltr => (size, left, containing - size - left),
        Direction::Rtl => (size, containing - size - right, right),
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// "If the resulting width is smaller than 'min-width', the rules above are
/// applied again, but this time using the value of 'min-width' as the
/// computed value for 'width'."
fn solve_with_min(
    containing: f32,
    size: Option<f32>,
    margin_line_left: Option<f32>,
    margin_line_right: Option<f32>,
    border_padding: f32,
    min_size: f32,
    direction: Direction,
) -> (f32, f32, f32) {
    let solved = solve_inline_constraint(
        containing,
        size,
        margin_line_left,
        margin_line_right,
        border_padding,
        direction,
    );
    if solved.0 >= min_size {
        return solved;
    }
    solve_inline_constraint(
        containing,
        Some(min_size),
        margin_line_left,
        margin_line_right,
        border_padding,
        direction,
    )
}

/// How much wider than the free span a box gets on one side, given its
/// `margin` there and a float intruding `intrusion` into the content box.
/// A positive margin overlapping the float is absorbed by it; a negative
/// one never is.
fn margin_not_absorbed_by_float(margin: f32, intrusion: f32) -> f32 {
    if margin <= 0.0 {
        -margin
    } else if intrusion > margin {
        0.0
    } else {
        intrusion - margin
    }
}

impl BlockLayout<'_> {
    /// Resolve border, padding and margins of `id` for a containing block
    /// with `containing_writing_mode` and content inline size
    /// `containing_inline`. Auto margins resolve to zero here; inline auto
    /// margins are settled by [`Self::compute_inline_geometry`].
    pub(crate) fn resolve_edges(
        &mut self,
        id: NodeId,
        containing_writing_mode: WritingMode,
        containing_inline: f32,
    ) {
        let style = &self.tree[id].style;
        let own = style.writing_mode;
        let border = BoxStrut::from_physical(style.border_width, own);
        let padding = FlowSides::from_physical(style.padding, own);
        let margin = FlowSides::from_physical(style.margin, containing_writing_mode);

        // [§ 8.4] "Unlike margin properties, values for padding values cannot
        // be negative."
        let resolve_padding = |length: Length| length.resolve(containing_inline).max(0.0);
        let padding = BoxStrut {
            block_start: resolve_padding(padding.block_start),
            block_end: resolve_padding(padding.block_end),
            line_left: resolve_padding(padding.line_left),
            line_right: resolve_padding(padding.line_right),
        };
        let margins = BoxStrut {
            block_start: margin.block_start.resolve_or_zero(containing_inline),
            block_end: margin.block_end.resolve_or_zero(containing_inline),
            line_left: margin.line_left.resolve_or_zero(containing_inline),
            line_right: margin.line_right.resolve_or_zero(containing_inline),
        };

        let layout_box = &mut self.tree[id];
        layout_box.border = border;
        layout_box.padding = padding;
        layout_box.margins = margins;
    }

    /// Resolve the edges of `child` against `container`. A spanner
    /// placeholder resolves its spanner and takes the spanner's margins.
    pub(crate) fn resolve_child_edges(&mut self, container: NodeId, child: NodeId) {
        let writing_mode = self.tree[container].writing_mode();
        let containing = self.content_inline_size(container);
        if let BoxKind::SpannerPlaceholder { spanner } = self.tree[child].kind {
            self.resolve_edges(spanner, writing_mode, containing);
            self.tree[child].margins = self.tree[spanner].margins;
            return;
        }
        self.resolve_edges(child, writing_mode, containing);
    }

    /// Size and line-left position of `child` in `container`, for a child
    /// whose border box starts at block offset `top` and is `block_size`
    /// tall (both in the container). `laid_out_inline_size` is the size an
    /// orthogonal child ended up with.
    pub(crate) fn compute_inline_geometry(
        &self,
        container: NodeId,
        child: NodeId,
        top: f32,
        block_size: f32,
        laid_out_inline_size: Option<f32>,
    ) -> InlineGeometry {
        let parent = &self.tree[container];
        let parent_bp = parent.border_padding();
        let content_left = parent_bp.line_left;
        let content_right = (self.own_inline_size(container) - parent_bp.line_right).max(content_left);
        let containing = content_right - content_left;
        let direction = parent.style.direction;

        let margins = FlowSides::from_physical(self.tree[child].style.margin, parent.writing_mode());
        let mut margin_left = margins.line_left.resolve(containing);
        let mut margin_right = margins.line_right.resolve(containing);

        let sizing = self.inline_sizing(child, containing, margin_left, margin_right, laid_out_inline_size);
        let shrink_to_fit = matches!(sizing, InlineSizing::ShrinkToFit(_));
        let size = match sizing {
            InlineSizing::Orthogonal(None) => {
                let left = margin_left.unwrap_or(0.0);
                return InlineGeometry {
                    inline_size: None,
                    margin_line_left: left,
                    margin_line_right: margin_right.unwrap_or(0.0),
                    inline_offset: content_left + left,
                };
            }
            InlineSizing::ShrinkToFit(size) => {
                // [§ 10.3.5] "If 'margin-left', or 'margin-right' are computed
                // as 'auto', their used value is '0'."
                margin_left = Some(margin_left.unwrap_or(0.0));
                margin_right = Some(margin_right.unwrap_or(0.0));
                Some(size)
            }
            InlineSizing::Fill => None,
            InlineSizing::Definite(size) | InlineSizing::Orthogonal(Some(size)) => Some(size),
        };

        let child_box = &self.tree[child];
        let border_padding = if self.tree.is_orthogonal(child) {
            0.0
        } else {
            child_box.border_padding().inline_sum()
        };
        let min_size = if self.tree.is_orthogonal(child) {
            0.0
        } else {
            self.min_inline_size(child, containing) + border_padding
        };

        // [§ 9.5] A box that avoids floats is placed (and, when its width is
        // 'auto', narrowed) beside the floats of its container.
        let floats = &parent.floats;
        if self.tree.avoids_floats(child) && !floats.is_empty() {
            let span_left = floats.line_left_offset(top, block_size).max(content_left);
            let span_right = floats.line_right_offset(top, block_size).min(content_right);
            if span_left > content_left || span_right < content_right {
                return beside_floats(
                    (content_left, content_right),
                    (span_left, span_right),
                    size,
                    (margin_left, margin_right),
                    border_padding,
                    min_size,
                    direction,
                );
            }
        }

        // [§ 10.3.5] Floating and shrink-to-fit boxes keep their margins as
        // computed: the width equation is not over-constrained for them.
        if let Some(size) = size.filter(|_| shrink_to_fit) {
            let left = margin_left.unwrap_or(0.0);
            let right = margin_right.unwrap_or(0.0);
            let size = size.max(min_size);
            let inline_offset = match direction {
                Direction::Ltr => content_left + left,
                Direction::Rtl => content_right - right - size,
            };
            return InlineGeometry {
                inline_size: Some(size),
                margin_line_left: left,
                margin_line_right: right,
                inline_offset,
            };
        }

        let (size, left, right) = solve_with_min(
            containing,
            size,
            margin_left,
            margin_right,
            border_padding,
            min_size,
            direction,
        );
        InlineGeometry {
            inline_size: Some(size),
            margin_line_left: left,
            margin_line_right: right,
            inline_offset: content_left + left,
        }
    }

    fn inline_sizing(
        &self,
        child: NodeId,
        containing: f32,
        margin_left: Option<f32>,
        margin_right: Option<f32>,
        laid_out_inline_size: Option<f32>,
    ) -> InlineSizing {
        if self.tree.is_orthogonal(child) {
            return InlineSizing::Orthogonal(laid_out_inline_size);
        }
        let layout_box = &self.tree[child];
        let border_padding = layout_box.border_padding().inline_sum();
        match layout_box.kind {
            BoxKind::ColumnSet(_) | BoxKind::SpannerPlaceholder { .. } | BoxKind::FlowThread(_) => {
                InlineSizing::Fill
            }
            BoxKind::Replaced { .. } => {
                let (inline, _) = self.replaced_content_size(child, containing);
                let size = inline + border_padding;
                if self.is_shrink_to_fit(child) {
                    InlineSizing::ShrinkToFit(size)
                } else {
                    InlineSizing::Definite(size)
                }
            }
            BoxKind::Block | BoxKind::AnonymousBlock => {
                if let Some(specified) = self.specified_inline_size(child, containing) {
                    let size = specified + border_padding;
                    if self.is_shrink_to_fit(child) {
                        return InlineSizing::ShrinkToFit(size);
                    }
                    return InlineSizing::Definite(size);
                }
                if !self.is_shrink_to_fit(child) {
                    return InlineSizing::Fill;
                }
                // [§ 10.3.5] "the shrink-to-fit width is:
                // min(max(preferred minimum width, available width),
                // preferred width)". Without line breaking there is no
                // preferred minimum width below the border and padding.
                let available =
                    containing - margin_left.unwrap_or(0.0) - margin_right.unwrap_or(0.0);
                let preferred = self.max_content_inline_size(child);
                InlineSizing::ShrinkToFit(preferred.min(available.max(0.0)).max(border_padding))
            }
        }
    }

    /// Floats, out-of-flow boxes, inline-blocks and tables size to their
    /// content.
    fn is_shrink_to_fit(&self, id: NodeId) -> bool {
        let style = &self.tree[id].style;
        style.is_floating_or_out_of_flow_positioned()
            || matches!(style.display, Display::InlineBlock | Display::Table)
    }

    /// The logical inline size in the box's own writing mode, as a content
    /// size. `None` for 'auto'.
    pub(crate) fn specified_inline_size(&self, id: NodeId, containing: f32) -> Option<f32> {
        let style = &self.tree[id].style;
        let length = if style.writing_mode.is_horizontal() {
            style.width
        } else {
            style.height
        };
        length.resolve(containing).map(|size| size.max(0.0))
    }

    fn min_inline_size(&self, id: NodeId, containing: f32) -> f32 {
        let style = &self.tree[id].style;
        let length = if style.writing_mode.is_horizontal() {
            style.min_width
        } else {
            style.min_height
        };
        length.resolve(containing).max(0.0)
    }

    /// Max-content inline size of `id`'s border box, in its own writing mode.
    ///
    /// Lines contribute their measured size; block children contribute their
    /// own max-content size plus fixed margins, with runs of consecutive
    /// floats laid side by side.
    pub(crate) fn max_content_inline_size(&self, id: NodeId) -> f32 {
        let layout_box = &self.tree[id];
        let style = &layout_box.style;
        // Percentage padding has nothing to resolve against here.
        let padding = FlowSides::from_physical(style.padding, style.writing_mode);
        let border_padding = BoxStrut::from_physical(style.border_width, style.writing_mode).inline_sum()
            + padding.line_left.resolve(0.0).max(0.0)
            + padding.line_right.resolve(0.0).max(0.0);

        let specified = if style.writing_mode.is_horizontal() {
            style.width
        } else {
            style.height
        };
        if let LengthOrAuto::Length(Length::Px(size)) = specified {
            return size + border_padding;
        }
        if let BoxKind::Replaced { .. } = layout_box.kind {
            let (inline, _) = self.replaced_content_size(id, 0.0);
            return inline + border_padding;
        }

        let mut best = layout_box
            .lines
            .iter()
            .map(|line| line.inline_size)
            .fold(0.0_f32, f32::max);
        let mut float_run = 0.0_f32;
        for &child in self.tree.children(id) {
            let child_style = &self.tree[child].style;
            if child_style.is_display_none()
                || child_style.is_out_of_flow_positioned()
                || self.tree.is_column_box(child)
            {
                continue;
            }
            let margins = FlowSides::from_physical(child_style.margin, style.writing_mode);
            let fixed = |margin: LengthOrAuto| match margin {
                LengthOrAuto::Length(Length::Px(value)) => value,
                _ => 0.0,
            };
            let contribution = if self.tree.is_orthogonal(child) {
                let block = if child_style.writing_mode.is_horizontal() {
                    child_style.height
                } else {
                    child_style.width
                };
                block.resolve(0.0).unwrap_or(0.0)
            } else {
                self.max_content_inline_size(child)
            } + fixed(margins.line_left)
                + fixed(margins.line_right);

            if child_style.is_floating() {
                float_run += contribution;
                best = best.max(float_run);
            } else {
                float_run = 0.0;
                best = best.max(contribution);
            }
        }

        if style.specifies_columns() {
            let count = style.column_count.unwrap_or(1).max(1) as f32;
            let columns = style.column_width.map_or(best * count, |width| width.max(best) * count)
                + (count - 1.0) * style.used_column_gap();
            best = best.max(columns);
        }
        best.max(self.min_inline_size(id, 0.0)) + border_padding
    }

    /// Own inline size of an orthogonal box: its specified inline size, or
    /// the viewport's size along that axis.
    pub(crate) fn orthogonal_inline_size(&self, id: NodeId) -> f32 {
        let layout_box = &self.tree[id];
        let horizontal = layout_box.writing_mode().is_horizontal();
        let viewport = if horizontal {
            self.options.viewport_width
        } else {
            self.options.viewport_height
        };
        let border_padding = layout_box.border_padding().inline_sum();
        match self.specified_inline_size(id, viewport) {
            Some(size) => size + border_padding,
            None => viewport.max(border_padding),
        }
    }

    /// Content size of replaced content in its own `(inline, block)` axes.
    ///
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// "if 'height' and 'width' both have computed values of 'auto' and the
    /// element also has an intrinsic width, then that intrinsic width is the
    /// used value of 'width'." With one dimension given, the other scales to
    /// keep the intrinsic ratio.
    pub(crate) fn replaced_content_size(&self, id: NodeId, containing: f32) -> (f32, f32) {
        let layout_box = &self.tree[id];
        let BoxKind::Replaced {
            intrinsic_width,
            intrinsic_height,
        } = layout_box.kind
        else {
            return (0.0, 0.0);
        };
        let style = &layout_box.style;
        let width = self.resolve_physical(id, style.width, false, containing);
        let height = self.resolve_physical(id, style.height, true, containing);

        let (width, height) = match (width, height) {
            (Some(width), Some(height)) => (width, height),
            (Some(width), None) if intrinsic_width > 0.0 => (width, width * intrinsic_height / intrinsic_width),
            (Some(width), None) => (width, intrinsic_height),
            (None, Some(height)) if intrinsic_height > 0.0 => {
                (height * intrinsic_width / intrinsic_height, height)
            }
            (None, Some(height)) => (intrinsic_width, height),
            (None, None) => (intrinsic_width, intrinsic_height),
        };
        if style.writing_mode.is_horizontal() {
            (width, height)
        } else {
            (height, width)
        }
    }

    /// Resolve a physical length of `id`. A percentage resolves against
    /// `containing` when the dimension runs along the layout parent's inline
    /// axis, and against the containing block's definite size otherwise.
    fn resolve_physical(&self, id: NodeId, length: LengthOrAuto, vertical: bool, containing: f32) -> Option<f32> {
        match length {
            LengthOrAuto::Auto => None,
            LengthOrAuto::Length(Length::Px(value)) => Some(value.max(0.0)),
            LengthOrAuto::Length(Length::Percent(percent)) => {
                let parent_inline_is_vertical = self
                    .tree
                    .layout_parent(id)
                    .is_some_and(|parent| !self.tree[parent].writing_mode().is_horizontal());
                let base = if vertical == parent_inline_is_vertical {
                    Some(containing)
                } else {
                    self.percentage_base(id, vertical)
                };
                base.map(|base| (base * percent / 100.0).max(0.0))
            }
        }
    }

    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// The used block size of `id`'s content box from its style, `None` when
    /// it depends on content. "If the height of the containing block is not
    /// specified explicitly (i.e., it depends on content height), and this
    /// element is not absolutely positioned, the value computes to 'auto'."
    pub(crate) fn specified_block_size(&self, id: NodeId) -> Option<f32> {
        let style = &self.tree[id].style;
        let vertical = style.writing_mode.is_horizontal();
        let length = if vertical { style.height } else { style.width };
        match length {
            LengthOrAuto::Auto => None,
            LengthOrAuto::Length(Length::Px(value)) => Some(value.max(0.0)),
            LengthOrAuto::Length(Length::Percent(percent)) => self
                .percentage_base(id, vertical)
                .map(|base| (base * percent / 100.0).max(0.0)),
        }
    }

    /// `min-height` (or `min-width` in vertical modes) of `id`'s content box.
    pub(crate) fn min_block_size(&self, id: NodeId) -> f32 {
        let style = &self.tree[id].style;
        let vertical = style.writing_mode.is_horizontal();
        let length = if vertical { style.min_height } else { style.min_width };
        match length {
            Length::Px(value) => value.max(0.0),
            Length::Percent(percent) => self
                .percentage_base(id, vertical)
                .map_or(0.0, |base| (base * percent / 100.0).max(0.0)),
        }
    }

    /// The definite size of `id`'s containing block along the physical
    /// `vertical` (height) or horizontal (width) dimension.
    pub(crate) fn percentage_base(&self, id: NodeId, vertical: bool) -> Option<f32> {
        let containing_block = self.tree.containing_block(id)?;
        self.definite_physical_size(containing_block, vertical)
    }

    /// [§ 10.5](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// The content size of `id` along a physical dimension, if it does not
    /// depend on content. The inline size is always definite once the box is
    /// being laid out. Anonymous boxes are transparent. In quirks mode an
    /// 'auto' block size defers to the containing block.
    fn definite_physical_size(&self, id: NodeId, vertical: bool) -> Option<f32> {
        let layout_box = &self.tree[id];
        if layout_box.is_layout_root {
            return Some(if vertical {
                self.options.viewport_height
            } else {
                self.options.viewport_width
            });
        }
        if self.tree.is_anonymous(id) {
            return self.percentage_base(id, vertical);
        }
        let inline_is_vertical = !layout_box.writing_mode().is_horizontal();
        if vertical == inline_is_vertical {
            return Some(self.content_inline_size(id));
        }
        let style = &layout_box.style;
        let length = if vertical { style.height } else { style.width };
        match length {
            LengthOrAuto::Length(Length::Px(value)) => Some(value.max(0.0)),
            LengthOrAuto::Length(Length::Percent(percent)) => self
                .percentage_base(id, vertical)
                .map(|base| base * percent / 100.0),
            LengthOrAuto::Auto if self.options.quirks_mode => self.percentage_base(id, vertical),
            LengthOrAuto::Auto => None,
        }
    }

    /// Whether the box's block size counts as 'auto' for margin collapsing:
    /// 'auto', or a percentage that cannot be resolved.
    pub(crate) fn has_auto_block_size(&self, id: NodeId) -> bool {
        let style = &self.tree[id].style;
        let length = if style.writing_mode.is_horizontal() {
            style.height
        } else {
            style.width
        };
        match length {
            LengthOrAuto::Auto => true,
            LengthOrAuto::Length(Length::Percent(_)) => self.specified_block_size(id).is_none(),
            LengthOrAuto::Length(Length::Px(_)) => false,
        }
    }
}

/// Size and place a box that avoids floats inside the free span
/// `[span_left, span_right]` of a content box `[content_left,
/// content_right]`.
fn beside_floats(
    (content_left, content_right): (f32, f32),
    (span_left, span_right): (f32, f32),
    size: Option<f32>,
    (margin_left, margin_right): (Option<f32>, Option<f32>),
    border_padding: f32,
    min_size: f32,
    direction: Direction,
) -> InlineGeometry {
    let Some(size) = size else {
        // An 'auto' width shrinks to the span. A margin overlapping a float
        // is absorbed by it rather than taken from the span.
        let left = margin_left.unwrap_or(0.0);
        let right = margin_right.unwrap_or(0.0);
        let size = (span_right - span_left
            + margin_not_absorbed_by_float(left, span_left - content_left)
            + margin_not_absorbed_by_float(right, content_right - span_right))
        .max(border_padding)
        .max(min_size);
        let inline_offset = match direction {
            Direction::Ltr => (content_left + left).max(span_left),
            Direction::Rtl => (content_right - right).min(span_right) - size,
        };
        return InlineGeometry {
            inline_size: Some(size),
            margin_line_left: left,
            margin_line_right: right,
            inline_offset,
        };
    };

    let span = span_right - span_left;
    let has_auto_margin = margin_left.is_none() || margin_right.is_none();
    let (size, left, right) = solve_with_min(
        span,
        Some(size),
        margin_left,
        margin_right,
        border_padding,
        min_size,
        direction,
    );
    let inline_offset = if has_auto_margin {
        span_left + left
    } else {
        match direction {
            Direction::Ltr => (content_left + left).max(span_left),
            Direction::Rtl => (content_right - right).min(span_right) - size,
        }
    };
    InlineGeometry {
        inline_size: Some(size),
        margin_line_left: left,
        margin_line_right: right,
        inline_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_width_fills_containing_block() {
        let solved = solve_inline_constraint(400.0, None, Some(10.0), Some(20.0), 0.0, Direction::Ltr);
        assert_eq!(solved, (370.0, 10.0, 20.0));
    }

    #[test]
    fn test_both_auto_margins_center() {
        let solved = solve_inline_constraint(400.0, Some(200.0), None, None, 0.0, Direction::Ltr);
        assert_eq!(solved, (200.0, 100.0, 100.0));
    }

    #[test]
    fn test_over_constrained_rtl_adjusts_line_left_margin() {
        let solved = solve_inline_constraint(400.0, Some(200.0), Some(10.0), Some(10.0), 0.0, Direction::Rtl);
        assert_eq!(solved, (200.0, 190.0, 10.0));
    }

    #[test]
    fn test_too_wide_box_treats_auto_margins_as_zero() {
        let solved = solve_inline_constraint(100.0, Some(150.0), None, Some(10.0), 0.0, Direction::Ltr);
        assert_eq!(solved, (150.0, 0.0, -50.0));
    }

    #[test]
    fn test_min_width_reapplies_rules() {
        let solved = solve_with_min(400.0, Some(50.0), None, None, 0.0, 100.0, Direction::Ltr);
        assert_eq!(solved, (100.0, 150.0, 150.0));
    }

    #[test]
    fn test_auto_width_beside_float_absorbs_margin() {
        // A 100px float on the left; the box's 20px margin lies inside it.
        let geometry = beside_floats(
            (0.0, 400.0),
            (100.0, 400.0),
            None,
            (Some(20.0), Some(0.0)),
            0.0,
            0.0,
            Direction::Ltr,
        );
        assert_eq!(geometry.inline_size, Some(300.0));
        assert_eq!(geometry.inline_offset, 100.0);
    }
}
