//! CSS Writing Mode types
//!
//! [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)
//!
//! Layout works in logical coordinates (block offset, inline offset). The
//! writing mode of a container decides how those map to physical edges.

use serde::{Deserialize, Serialize};

/// [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)
///
/// "The writing-mode property specifies whether lines of text are laid out
/// horizontally or vertically and the direction in which blocks progress."
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WritingMode {
    /// [§ 2](https://www.w3.org/TR/css-writing-modes-4/#valdef-writing-mode-horizontal-tb)
    ///
    /// "Top-to-bottom block flow direction. Both the writing mode and the
    /// typographic mode are horizontal."
    #[default]
    HorizontalTb,

    /// [§ 2](https://www.w3.org/TR/css-writing-modes-4/#valdef-writing-mode-vertical-rl)
    ///
    /// "Right-to-left block flow direction. Both the writing mode and the
    /// typographic mode are vertical."
    VerticalRl,

    /// [§ 2](https://www.w3.org/TR/css-writing-modes-4/#valdef-writing-mode-vertical-lr)
    ///
    /// "Left-to-right block flow direction. Both the writing mode and the
    /// typographic mode are vertical."
    VerticalLr,
}

/// [§ 2.1 Specifying Directionality](https://www.w3.org/TR/css-writing-modes-4/#direction)
///
/// "This property specifies the inline base direction or directionality of
/// any bidi paragraph, embedding, isolate, or override established by the box."
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Direction {
    /// "Left-to-right directionality."
    #[default]
    Ltr,
    /// "Right-to-left directionality."
    Rtl,
}

/// Physical side of a box
///
/// Used to map logical directions (block-start, etc.) to physical sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalSide {
    /// Top edge of the box
    Top,
    /// Right edge of the box
    Right,
    /// Bottom edge of the box
    Bottom,
    /// Left edge of the box
    Left,
}

impl WritingMode {
    /// Whether lines run horizontally (block axis is vertical).
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::HorizontalTb)
    }

    /// [§ 6.2 Flow-relative Directions](https://www.w3.org/TR/css-writing-modes-4/#logical-directions)
    ///
    /// Map block-start to the corresponding physical side.
    ///
    /// | Writing Mode   | block-start |
    /// |----------------|-------------|
    /// | horizontal-tb  | top         |
    /// | vertical-rl    | right       |
    /// | vertical-lr    | left        |
    #[must_use]
    pub const fn block_start_physical(self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Top,
            Self::VerticalRl => PhysicalSide::Right,
            Self::VerticalLr => PhysicalSide::Left,
        }
    }

    /// Map block-end to the corresponding physical side.
    ///
    /// | Writing Mode   | block-end |
    /// |----------------|-----------|
    /// | horizontal-tb  | bottom    |
    /// | vertical-rl    | left      |
    /// | vertical-lr    | right     |
    #[must_use]
    pub const fn block_end_physical(self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Bottom,
            Self::VerticalRl => PhysicalSide::Left,
            Self::VerticalLr => PhysicalSide::Right,
        }
    }

    /// Map inline-start to the corresponding physical side, taking
    /// `direction` into account.
    #[must_use]
    pub const fn inline_start_physical(self, direction: Direction) -> PhysicalSide {
        match (self, direction) {
            (Self::HorizontalTb, Direction::Ltr) => PhysicalSide::Left,
            (Self::HorizontalTb, Direction::Rtl) => PhysicalSide::Right,
            (Self::VerticalRl | Self::VerticalLr, Direction::Ltr) => PhysicalSide::Top,
            (Self::VerticalRl | Self::VerticalLr, Direction::Rtl) => PhysicalSide::Bottom,
        }
    }

    /// Map inline-end to the corresponding physical side.
    #[must_use]
    pub const fn inline_end_physical(self, direction: Direction) -> PhysicalSide {
        match self.inline_start_physical(direction) {
            PhysicalSide::Left => PhysicalSide::Right,
            PhysicalSide::Right => PhysicalSide::Left,
            PhysicalSide::Top => PhysicalSide::Bottom,
            PhysicalSide::Bottom => PhysicalSide::Top,
        }
    }
}
