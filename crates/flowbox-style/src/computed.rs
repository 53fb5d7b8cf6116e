//! CSS Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."

use serde::{Deserialize, Serialize};

use crate::fragmentation::{BreakBetween, BreakInside};
use crate::values::{Length, LengthOrAuto, Sides};
use crate::writing_mode::{Direction, WritingMode};

/// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// "The display property defines an element's display type, which consists of
/// the two basic qualities of how an element generates boxes."
///
/// Only the values that matter to block layout are distinguished; anything
/// laid out by another formatting context (flex, grid, table) is a black box
/// that establishes an independent formatting context.
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
pub enum Display {
    /// `display: block` (flow)
    #[default]
    Block,
    /// `display: flow-root`
    FlowRoot,
    /// `display: list-item`
    ListItem,
    /// `display: inline-block`
    InlineBlock,
    /// `display: flex`
    Flex,
    /// `display: grid`
    Grid,
    /// `display: table`
    Table,
    /// `display: table-cell`
    TableCell,
    /// "The element and its descendants generate no boxes or text runs."
    None,
}

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
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
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow...
    /// Then the box is offset relative to its normal position."
    Relative,
    /// Sticky positioning stays in flow.
    Sticky,
    /// "The box's position (and possibly size) is specified with the 'top',
    /// 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but in addition, the box is fixed with respect to some reference."
    Fixed,
}

/// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
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
pub enum Float {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
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
pub enum Clear {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any left-floating boxes."
    Left,
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any right-floating boxes."
    Right,
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any right-floating and left-floating boxes."
    Both,
}

/// [§ 3 Scrolling and Clipping Overflow](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
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
pub enum Overflow {
    /// "There is no special handling of overflow."
    #[default]
    Visible,
    /// "Content is clipped to the box's overflow clip edge", without making
    /// the box a scroll container.
    Clip,
    /// Clipped, scroll container without scrolling UI.
    Hidden,
    /// Clipped, scroll container with scrolling UI.
    Scroll,
    /// Scroll container that shows UI only when needed.
    Auto,
}

/// [§ 6.1 'column-span'](https://www.w3.org/TR/css-multicol-1/#column-span)
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
pub enum ColumnSpan {
    /// "The box does not span multiple columns."
    #[default]
    None,
    /// "The box spans across all the columns of the nearest multicol ancestor
    /// in the same block formatting context."
    All,
}

/// [§ 7.1 'column-fill'](https://www.w3.org/TR/css-multicol-1/#cf)
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
pub enum ColumnFill {
    /// "Balance content equally between columns, as far as possible."
    #[default]
    Balance,
    /// "Fills columns sequentially."
    Auto,
}

/// Computed styles for one box.
///
/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Fields hold computed values with their CSS initial value as default, so a
/// scene only lists what differs. Margins, padding and border widths are
/// physical; layout maps them through the writing mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: Display,

    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Position,

    /// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    pub float: Float,

    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    pub clear: Clear,

    /// [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow: Overflow,

    /// [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)
    ///
    /// Initial: horizontal-tb. Inherited: yes.
    pub writing_mode: WritingMode,

    /// [§ 2.1 'direction'](https://www.w3.org/TR/css-writing-modes-4/#direction)
    pub direction: Direction,

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "Percentages: refer to width of containing block"
    pub margin: Sides<LengthOrAuto>,

    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: Sides<Length>,

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties),
    /// in pixels.
    pub border_width: Sides<f32>,

    /// [§ 10.2 Content width](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: LengthOrAuto,

    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: LengthOrAuto,

    /// [§ 10.4 'min-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub min_width: Length,

    /// [§ 10.7 'min-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: Length,

    /// Set when the block-start margin came from a quirky user-agent rule
    /// (the `<p>` and `<body>` margins of quirks mode).
    ///
    /// [Quirks Mode § 3.3](https://quirks.spec.whatwg.org/#the-body-element-fills-the-html-element-quirk)
    pub margin_before_quirk: bool,

    /// Same as [`Self::margin_before_quirk`] for the block-end margin.
    pub margin_after_quirk: bool,

    /// A transform (or anything else) that makes this box the containing
    /// block of fixed-position descendants.
    ///
    /// [CSS Transforms § 1](https://www.w3.org/TR/css-transforms-1/#transform-rendering)
    pub has_transform: bool,

    /// [§ 3.1 'column-count'](https://www.w3.org/TR/css-multicol-1/#cc)
    pub column_count: Option<u32>,

    /// [§ 3.2 'column-width'](https://www.w3.org/TR/css-multicol-1/#cw), in pixels.
    pub column_width: Option<f32>,

    /// [§ 4.1 'column-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap),
    /// in pixels. `None` is `normal`, which is 1em in multicol.
    pub column_gap: Option<f32>,

    /// [§ 6.1 'column-span'](https://www.w3.org/TR/css-multicol-1/#column-span)
    pub column_span: ColumnSpan,

    /// [§ 7.1 'column-fill'](https://www.w3.org/TR/css-multicol-1/#cf)
    pub column_fill: ColumnFill,

    /// [§ 3.1 'break-before'](https://www.w3.org/TR/css-break-3/#break-between)
    pub break_before: BreakBetween,

    /// [§ 3.1 'break-after'](https://www.w3.org/TR/css-break-3/#break-between)
    pub break_after: BreakBetween,

    /// [§ 3.2 'break-inside'](https://www.w3.org/TR/css-break-3/#break-within)
    pub break_inside: BreakInside,

    /// [§ 3.3 'orphans'](https://www.w3.org/TR/css-break-3/#widows-orphans)
    ///
    /// "The orphans property specifies the minimum number of line boxes in a
    /// block container that must be left in a fragment before a
    /// fragmentation break."
    pub orphans: u32,

    /// [§ 3.3 'widows'](https://www.w3.org/TR/css-break-3/#widows-orphans)
    ///
    /// "The widows property specifies the minimum number of line boxes of a
    /// block container that must be left in a fragment after a break."
    pub widows: u32,

    /// Paint-only. Layout never reads it; it exists so that scenes can
    /// carry it and tests can prove layout ignores it.
    pub background_color: Option<String>,
}

/// Default gap for `column-gap: normal` ("1em"), at the default font size.
pub const NORMAL_COLUMN_GAP: f32 = 16.0;

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            position: Position::Static,
            float: Float::None,
            clear: Clear::None,
            overflow: Overflow::Visible,
            writing_mode: WritingMode::HorizontalTb,
            direction: Direction::Ltr,
            margin: Sides::all(LengthOrAuto::px(0.0)),
            padding: Sides::default(),
            border_width: Sides::default(),
            width: LengthOrAuto::Auto,
            height: LengthOrAuto::Auto,
            min_width: Length::ZERO,
            min_height: Length::ZERO,
            margin_before_quirk: false,
            margin_after_quirk: false,
            has_transform: false,
            column_count: None,
            column_width: None,
            column_gap: None,
            column_span: ColumnSpan::None,
            column_fill: ColumnFill::Balance,
            break_before: BreakBetween::Auto,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            orphans: 2,
            widows: 2,
            background_color: None,
        }
    }
}

impl ComputedStyle {
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.float != Float::None
    }

    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    ///
    /// "In the absolute positioning model, a box is explicitly offset with
    /// respect to its containing block. It is removed from the normal flow
    /// entirely."
    #[must_use]
    pub const fn is_out_of_flow_positioned(&self) -> bool {
        matches!(self.position, Position::Absolute | Position::Fixed)
    }

    /// Floats and absolutely positioned boxes are both out of normal flow.
    #[must_use]
    pub fn is_floating_or_out_of_flow_positioned(&self) -> bool {
        self.is_floating() || self.is_out_of_flow_positioned()
    }

    /// Whether `position` is anything but `static`, which makes the box a
    /// containing block for absolutely positioned descendants.
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.position != Position::Static
    }

    /// [§ 2 'display: none'](https://www.w3.org/TR/css-display-3/#valdef-display-none)
    #[must_use]
    pub fn is_display_none(&self) -> bool {
        self.display == Display::None
    }

    /// Display types laid out by a block container (flow layout inside).
    #[must_use]
    pub const fn is_block_container(&self) -> bool {
        matches!(
            self.display,
            Display::Block
                | Display::FlowRoot
                | Display::ListItem
                | Display::InlineBlock
                | Display::TableCell
        )
    }

    /// [§ 3 Scroll containers](https://www.w3.org/TR/css-overflow-3/#scroll-container)
    ///
    /// `overflow: clip` clips without making a scroll container.
    #[must_use]
    pub const fn is_scroll_container(&self) -> bool {
        matches!(
            self.overflow,
            Overflow::Hidden | Overflow::Scroll | Overflow::Auto
        )
    }

    /// [§ 3 Multi-column model](https://www.w3.org/TR/css-multicol-1/#the-multi-column-model)
    ///
    /// "An element whose column-width or column-count property is not auto
    /// establishes a multi-column container."
    #[must_use]
    pub const fn specifies_columns(&self) -> bool {
        self.column_count.is_some() || self.column_width.is_some()
    }

    /// `column-span: all`
    #[must_use]
    pub fn is_column_span_all(&self) -> bool {
        self.column_span == ColumnSpan::All
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks, table-cells, and table-captions) that are not block
    /// boxes, and block boxes with 'overflow' other than 'visible' (except
    /// when that value has been propagated to the viewport) establish new
    /// block formatting contexts for their contents."
    ///
    /// Extended by [CSS Display § 2](https://www.w3.org/TR/css-display-3/#valdef-display-flow-root)
    /// (`flow-root`), [Multicol § 2](https://www.w3.org/TR/css-multicol-1/#the-multi-column-model)
    /// (multicol containers and spanners) and the independent formatting
    /// contexts of flex, grid and table boxes. A writing-mode change relative
    /// to the parent also establishes one; that needs the parent and is
    /// checked by layout.
    #[must_use]
    pub fn establishes_formatting_context(&self) -> bool {
        self.is_floating_or_out_of_flow_positioned()
            || self.is_scroll_container()
            || self.overflow == Overflow::Clip
            || self.specifies_columns()
            || self.is_column_span_all()
            || matches!(
                self.display,
                Display::FlowRoot
                    | Display::InlineBlock
                    | Display::Flex
                    | Display::Grid
                    | Display::Table
                    | Display::TableCell
            )
    }

    /// [CSS Position § 2.1](https://www.w3.org/TR/css-position-3/#fixed-cb)
    ///
    /// Whether this box is the containing block of fixed-position
    /// descendants (transforms and similar).
    #[must_use]
    pub const fn can_contain_fixed_position_objects(&self) -> bool {
        self.has_transform
    }

    /// Whether the box is a flex, grid or table container: its children are
    /// laid out by another formatting context that does not pick up
    /// pagination struts from them.
    #[must_use]
    pub const fn is_non_flow_container(&self) -> bool {
        matches!(
            self.display,
            Display::Flex | Display::Grid | Display::Table | Display::TableCell
        )
    }

    /// Used `column-gap` in pixels.
    #[must_use]
    pub fn used_column_gap(&self) -> f32 {
        self.column_gap.unwrap_or(NORMAL_COLUMN_GAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let style = ComputedStyle::default();
        assert_eq!(style.orphans, 2);
        assert_eq!(style.widows, 2);
        assert!(!style.establishes_formatting_context());
        assert_eq!(style.used_column_gap(), NORMAL_COLUMN_GAP);
    }

    #[test]
    fn test_formatting_context_triggers() {
        let cases = [
            r#"{"float": "left"}"#,
            r#"{"position": "absolute"}"#,
            r#"{"overflow": "hidden"}"#,
            r#"{"display": "flow-root"}"#,
            r#"{"column-count": 2}"#,
            r#"{"column-span": "all"}"#,
        ];
        for json in cases {
            let style: ComputedStyle = serde_json::from_str(json).unwrap();
            assert!(style.establishes_formatting_context(), "{json}");
        }
    }

    #[test]
    fn test_relative_position_stays_in_flow() {
        let style: ComputedStyle = serde_json::from_str(r#"{"position": "relative"}"#).unwrap();
        assert!(style.is_positioned());
        assert!(!style.is_out_of_flow_positioned());
    }

    #[test]
    fn test_scene_style_parses_kebab_case() {
        let style: ComputedStyle = serde_json::from_str(
            r#"{"margin": {"top": 10, "bottom": "auto"}, "break-before": "avoid-page", "writing-mode": "vertical-rl"}"#,
        )
        .unwrap();
        assert_eq!(style.margin.top, LengthOrAuto::px(10.0));
        assert!(style.margin.bottom.is_auto());
        assert_eq!(style.break_before, BreakBetween::AvoidPage);
        assert_eq!(style.writing_mode, WritingMode::VerticalRl);
    }
}
