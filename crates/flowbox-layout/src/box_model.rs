//! Logical and physical box geometry.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! [CSS Writing Modes § 6 Abstract Box Terminology](https://www.w3.org/TR/css-writing-modes-4/#abstract-box)
//!
//! Layout works entirely in flow-relative coordinates: a *block offset*
//! that grows in the block flow direction and an *inline offset* measured
//! from the line-left edge. Physical rectangles only appear when geometry
//! is handed to a painter (see [`crate::dump`]).

use flowbox_style::{Direction, Sides, WritingMode};
use serde::Serialize;

/// A rectangle in flow-relative coordinates.
///
/// `inline_offset` is measured from the line-left edge of the reference box,
/// `block_offset` from its block-start edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LogicalRect {
    /// Offset from the line-left edge.
    pub inline_offset: f32,
    /// Offset from the block-start edge.
    pub block_offset: f32,
    /// Extent along the inline axis.
    pub inline_size: f32,
    /// Extent along the block axis.
    pub block_size: f32,
}

impl LogicalRect {
    /// Build a rectangle from its offsets and sizes.
    #[must_use]
    pub const fn new(inline_offset: f32, block_offset: f32, inline_size: f32, block_size: f32) -> Self {
        Self {
            inline_offset,
            block_offset,
            inline_size,
            block_size,
        }
    }

    /// The block-end edge.
    #[must_use]
    pub fn block_end(&self) -> f32 {
        self.block_offset + self.block_size
    }

    /// The line-right edge.
    #[must_use]
    pub fn inline_end(&self) -> f32 {
        self.inline_offset + self.inline_size
    }

    /// The same rectangle moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: LogicalOffset) -> Self {
        Self {
            inline_offset: self.inline_offset + offset.inline_offset,
            block_offset: self.block_offset + offset.block_offset,
            ..*self
        }
    }

    /// Whether the rectangle covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inline_size <= 0.0 || self.block_size <= 0.0
    }

    /// Smallest rectangle containing both. An empty rectangle contributes
    /// nothing.
    #[must_use]
    pub fn unite(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let inline_offset = self.inline_offset.min(other.inline_offset);
        let block_offset = self.block_offset.min(other.block_offset);
        Self {
            inline_offset,
            block_offset,
            inline_size: self.inline_end().max(other.inline_end()) - inline_offset,
            block_size: self.block_end().max(other.block_end()) - block_offset,
        }
    }

    /// The offset of the top-left (line-left, block-start) corner.
    #[must_use]
    pub const fn offset(&self) -> LogicalOffset {
        LogicalOffset {
            inline_offset: self.inline_offset,
            block_offset: self.block_offset,
        }
    }
}

/// A flow-relative displacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LogicalOffset {
    /// Displacement along the inline axis (towards line-right).
    pub inline_offset: f32,
    /// Displacement along the block axis.
    pub block_offset: f32,
}

impl LogicalOffset {
    /// Build an offset.
    #[must_use]
    pub const fn new(inline_offset: f32, block_offset: f32) -> Self {
        Self {
            inline_offset,
            block_offset,
        }
    }
}

impl std::ops::Add for LogicalOffset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.inline_offset + rhs.inline_offset,
            self.block_offset + rhs.block_offset,
        )
    }
}

/// Flow-relative edge sizes for margin, border or padding.
///
/// [§ 6.4 Flow-relative Box Dimensions](https://www.w3.org/TR/css-writing-modes-4/#logical-box-dimensions)
///
/// Inline edges are kept line-relative (line-left / line-right) rather than
/// start/end, so that `direction` only matters where a box is aligned, not
/// where its edges are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxStrut {
    /// Block-start edge.
    pub block_start: f32,
    /// Block-end edge.
    pub block_end: f32,
    /// Line-left edge.
    pub line_left: f32,
    /// Line-right edge.
    pub line_right: f32,
}

impl BoxStrut {
    /// Map physical edge sizes into the flow-relative frame of `writing_mode`.
    ///
    /// | Writing Mode  | block-start | block-end | line-left | line-right |
    /// |---------------|-------------|-----------|-----------|------------|
    /// | horizontal-tb | top         | bottom    | left      | right      |
    /// | vertical-rl   | right       | left      | top       | bottom     |
    /// | vertical-lr   | left        | right     | top       | bottom     |
    #[must_use]
    pub const fn from_physical(sides: Sides<f32>, writing_mode: WritingMode) -> Self {
        Self {
            block_start: sides.side(writing_mode.block_start_physical()),
            block_end: sides.side(writing_mode.block_end_physical()),
            line_left: sides.side(writing_mode.inline_start_physical(Direction::Ltr)),
            line_right: sides.side(writing_mode.inline_end_physical(Direction::Ltr)),
        }
    }

    /// Sum of the block-axis edges.
    #[must_use]
    pub fn block_sum(&self) -> f32 {
        self.block_start + self.block_end
    }

    /// Sum of the inline-axis edges.
    #[must_use]
    pub fn inline_sum(&self) -> f32 {
        self.line_left + self.line_right
    }

    /// Edge-wise sum.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            block_start: self.block_start + other.block_start,
            block_end: self.block_end + other.block_end,
            line_left: self.line_left + other.line_left,
            line_right: self.line_right + other.line_right,
        }
    }
}

/// A rectangle in physical coordinates, handed to painting.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// The same rectangle moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// [§ 6.3 Flow-relative Directions](https://www.w3.org/TR/css-writing-modes-4/#logical-direction-layout)
///
/// Convert `rect`, expressed in the flow-relative frame of a container with
/// `writing_mode`, into physical coordinates relative to that container's
/// top-left corner. `container_width` is the container's physical border-box
/// width; only vertical-rl needs it, because its block axis runs right to
/// left.
#[must_use]
pub fn to_physical(rect: LogicalRect, writing_mode: WritingMode, container_width: f32) -> Rect {
    match writing_mode {
        WritingMode::HorizontalTb => Rect {
            x: rect.inline_offset,
            y: rect.block_offset,
            width: rect.inline_size,
            height: rect.block_size,
        },
        WritingMode::VerticalLr => Rect {
            x: rect.block_offset,
            y: rect.inline_offset,
            width: rect.block_size,
            height: rect.inline_size,
        },
        WritingMode::VerticalRl => Rect {
            x: container_width - rect.block_offset - rect.block_size,
            y: rect.inline_offset,
            width: rect.block_size,
            height: rect.inline_size,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strut_maps_vertical_rl_block_start_to_right() {
        let sides = Sides {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        let strut = BoxStrut::from_physical(sides, WritingMode::VerticalRl);
        assert_eq!(strut.block_start, 2.0);
        assert_eq!(strut.block_end, 4.0);
        assert_eq!(strut.line_left, 1.0);
        assert_eq!(strut.block_sum(), 6.0);
        assert_eq!(strut.inline_sum(), 4.0);
    }

    #[test]
    fn test_vertical_rl_mirrors_block_axis() {
        let rect = LogicalRect::new(5.0, 10.0, 20.0, 30.0);
        let physical = to_physical(rect, WritingMode::VerticalRl, 100.0);
        assert_eq!(physical, Rect { x: 60.0, y: 5.0, width: 30.0, height: 20.0 });
    }

    #[test]
    fn test_unite_ignores_empty() {
        let a = LogicalRect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.unite(&LogicalRect::default()), a);
        let b = LogicalRect::new(5.0, 20.0, 10.0, 5.0);
        assert_eq!(a.unite(&b), LogicalRect::new(0.0, 0.0, 15.0, 25.0));
    }
}
