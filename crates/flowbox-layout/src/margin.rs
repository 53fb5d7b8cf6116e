//! Margin collapsing state.
//!
//! [CSS 2.1 § 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "In CSS, the adjoining margins of two or more boxes (which might or might
//! not be siblings) can combine to form a single margin. Margins that
//! combine this way are said to collapse, and the resulting combined margin
//! is called a collapsed margin."
//!
//! "When two or more margins collapse, the resulting margin width is the
//! maximum of the collapsing margins' widths. In the case of negative
//! margins, the maximum of the absolute values of the negative adjoining
//! margins is deducted from the maximum of the positive adjoining margins."
//!
//! That is why every margin here is tracked as a *pair*: the largest
//! positive and the largest negative contribution seen so far.

/// The four collapsing margin maxima of a box.
///
/// For a box whose own margins collapse with its children these are not
/// simply its margins: they include whatever collapsed through from the
/// first and last in-flow child.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarginValues {
    /// Largest positive margin collapsing at the block-start edge.
    pub positive_before: f32,
    /// Magnitude of the most negative margin at the block-start edge.
    pub negative_before: f32,
    /// Largest positive margin collapsing at the block-end edge.
    pub positive_after: f32,
    /// Magnitude of the most negative margin at the block-end edge.
    pub negative_after: f32,
}

impl MarginValues {
    /// Split a box's own `before`/`after` margins into positive and
    /// negative parts.
    #[must_use]
    pub fn from_margins(before: f32, after: f32) -> Self {
        Self {
            positive_before: before.max(0.0),
            negative_before: (-before).max(0.0),
            positive_after: after.max(0.0),
            negative_after: (-after).max(0.0),
        }
    }

    /// The collapsed block-start margin.
    #[must_use]
    pub fn before(&self) -> f32 {
        self.positive_before - self.negative_before
    }

    /// The collapsed block-end margin.
    #[must_use]
    pub fn after(&self) -> f32 {
        self.positive_after - self.negative_after
    }
}

/// How a container starts out with respect to margin collapsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginStateInit {
    /// The container establishes a block formatting context, is a flow
    /// thread or is the layout root: nothing collapses through it.
    pub isolates_children: bool,
    /// Sum of block-start border and padding.
    pub before_border_padding: f32,
    /// Sum of block-end border and padding.
    pub after_border_padding: f32,
    /// Whether the container's block size is `auto`.
    pub has_auto_block_size: bool,
    /// Table cells and `<body>`: containers whose quirky child margins may
    /// be swallowed in quirks mode.
    pub quirk_container: bool,
    /// The container's own collapsing maxima at the start of its layout.
    pub own_margins: MarginValues,
}

/// Running state of margin collapsing while one container lays out its
/// children.
///
/// The state is plain data: the child layout driver snapshots it before
/// trying a child position and restores it when the position has to be
/// recomputed.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginState {
    can_collapse_with_children: bool,
    can_collapse_margin_before_with_children: bool,
    can_collapse_margin_after_with_children: bool,
    can_collapse_margin_after_with_last_child: bool,
    quirk_container: bool,
    at_before_side_of_block: bool,
    at_after_side_of_block: bool,
    has_margin_before_quirk: bool,
    has_margin_after_quirk: bool,
    determined_margin_before_quirk: bool,
    last_child_is_self_collapsing_block_with_clearance: bool,
    positive_margin: f32,
    negative_margin: f32,
}

impl MarginState {
    /// Fresh state at the block-start side of a container.
    ///
    /// The pending margin starts out as the container's own block-start
    /// maxima when the container's margin collapses with its first child;
    /// otherwise at zero.
    #[must_use]
    pub fn new(init: MarginStateInit) -> Self {
        let can_collapse_with_children = !init.isolates_children;
        let can_collapse_margin_before_with_children =
            can_collapse_with_children && init.before_border_padding == 0.0;
        // Adjoining: "bottom margin of a last in-flow child and bottom margin
        // of its parent if the parent has 'auto' computed height"
        let can_collapse_margin_after_with_children = can_collapse_with_children
            && init.after_border_padding == 0.0
            && init.has_auto_block_size;

        let (positive_margin, negative_margin) = if can_collapse_margin_before_with_children {
            (init.own_margins.positive_before, init.own_margins.negative_before)
        } else {
            (0.0, 0.0)
        };

        Self {
            can_collapse_with_children,
            can_collapse_margin_before_with_children,
            can_collapse_margin_after_with_children,
            can_collapse_margin_after_with_last_child: true,
            quirk_container: init.quirk_container,
            at_before_side_of_block: true,
            at_after_side_of_block: false,
            has_margin_before_quirk: false,
            has_margin_after_quirk: false,
            determined_margin_before_quirk: false,
            last_child_is_self_collapsing_block_with_clearance: false,
            positive_margin,
            negative_margin,
        }
    }

    /// Whether anything collapses through the container at all.
    #[must_use]
    pub const fn can_collapse_with_children(&self) -> bool {
        self.can_collapse_with_children
    }

    /// Whether the container's block-start margin collapses with its
    /// first in-flow child.
    #[must_use]
    pub const fn can_collapse_margin_before_with_children(&self) -> bool {
        self.can_collapse_margin_before_with_children
    }

    /// Whether the container's block-end margin collapses with its last
    /// in-flow child.
    #[must_use]
    pub const fn can_collapse_margin_after_with_children(&self) -> bool {
        self.can_collapse_margin_after_with_children
    }

    /// Stop the block-end margin collapsing with children.
    pub const fn set_can_collapse_margin_after_with_children(&mut self, value: bool) {
        self.can_collapse_margin_after_with_children = value;
    }

    /// Cleared after a self-collapsing child with clearance: "the resulting
    /// margin does not collapse with the bottom margin of the parent
    /// block". Set again by the next in-flow child that is not
    /// self-collapsing.
    #[must_use]
    pub const fn can_collapse_margin_after_with_last_child(&self) -> bool {
        self.can_collapse_margin_after_with_last_child
    }

    /// See [`Self::can_collapse_margin_after_with_last_child`].
    pub const fn set_can_collapse_margin_after_with_last_child(&mut self, value: bool) {
        self.can_collapse_margin_after_with_last_child = value;
    }

    /// Table cell or `<body>`.
    #[must_use]
    pub const fn quirk_container(&self) -> bool {
        self.quirk_container
    }

    /// No in-flow content has been placed yet.
    #[must_use]
    pub const fn at_before_side_of_block(&self) -> bool {
        self.at_before_side_of_block
    }

    /// Update [`Self::at_before_side_of_block`].
    pub const fn set_at_before_side_of_block(&mut self, value: bool) {
        self.at_before_side_of_block = value;
    }

    /// All children have been placed.
    #[must_use]
    pub const fn at_after_side_of_block(&self) -> bool {
        self.at_after_side_of_block
    }

    /// Update [`Self::at_after_side_of_block`].
    pub const fn set_at_after_side_of_block(&mut self, value: bool) {
        self.at_after_side_of_block = value;
    }

    /// The margin collapsed at the block-start side carried a quirk.
    #[must_use]
    pub const fn has_margin_before_quirk(&self) -> bool {
        self.has_margin_before_quirk
    }

    /// Update [`Self::has_margin_before_quirk`].
    pub const fn set_has_margin_before_quirk(&mut self, value: bool) {
        self.has_margin_before_quirk = value;
    }

    /// The pending margin came from a quirky block-end margin.
    #[must_use]
    pub const fn has_margin_after_quirk(&self) -> bool {
        self.has_margin_after_quirk
    }

    /// Update [`Self::has_margin_after_quirk`].
    pub const fn set_has_margin_after_quirk(&mut self, value: bool) {
        self.has_margin_after_quirk = value;
    }

    /// Whether the block-start quirk status is final.
    #[must_use]
    pub const fn determined_margin_before_quirk(&self) -> bool {
        self.determined_margin_before_quirk
    }

    /// Update [`Self::determined_margin_before_quirk`].
    pub const fn set_determined_margin_before_quirk(&mut self, value: bool) {
        self.determined_margin_before_quirk = value;
    }

    /// The previous in-flow child was self-collapsing and had clearance.
    #[must_use]
    pub const fn last_child_is_self_collapsing_block_with_clearance(&self) -> bool {
        self.last_child_is_self_collapsing_block_with_clearance
    }

    /// Update [`Self::last_child_is_self_collapsing_block_with_clearance`].
    pub const fn set_last_child_is_self_collapsing_block_with_clearance(&mut self, value: bool) {
        self.last_child_is_self_collapsing_block_with_clearance = value;
    }

    /// A child here would collapse its block-start margin with the
    /// container's.
    #[must_use]
    pub const fn can_collapse_with_margin_before(&self) -> bool {
        self.at_before_side_of_block && self.can_collapse_margin_before_with_children
    }

    /// The pending margin collapses with the container's block-end margin.
    #[must_use]
    pub const fn can_collapse_with_margin_after(&self) -> bool {
        self.at_after_side_of_block && self.can_collapse_margin_after_with_children
    }

    /// Largest positive pending margin.
    #[must_use]
    pub const fn positive_margin(&self) -> f32 {
        self.positive_margin
    }

    /// Magnitude of the most negative pending margin.
    #[must_use]
    pub const fn negative_margin(&self) -> f32 {
        self.negative_margin
    }

    /// The pending collapsed margin.
    #[must_use]
    pub fn margin(&self) -> f32 {
        self.positive_margin - self.negative_margin
    }

    /// Replace the positive pending margin.
    pub const fn set_positive_margin(&mut self, value: f32) {
        self.positive_margin = value;
    }

    /// Replace the negative pending margin.
    pub const fn set_negative_margin(&mut self, value: f32) {
        self.negative_margin = value;
    }

    /// Replace both halves of the pending margin.
    pub const fn set_margin(&mut self, positive: f32, negative: f32) {
        self.positive_margin = positive;
        self.negative_margin = negative;
    }

    /// Collapse another positive margin into the pending one.
    pub fn set_positive_margin_if_larger(&mut self, value: f32) {
        self.positive_margin = self.positive_margin.max(value);
    }

    /// Collapse another negative margin into the pending one.
    pub fn set_negative_margin_if_larger(&mut self, value: f32) {
        self.negative_margin = self.negative_margin.max(value);
    }

    /// Drop the pending margin (after a forced break, or when a spanner
    /// interrupts the flow).
    pub const fn clear_margin(&mut self) {
        self.positive_margin = 0.0;
        self.negative_margin = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() -> MarginStateInit {
        MarginStateInit {
            has_auto_block_size: true,
            own_margins: MarginValues::from_margins(12.0, 4.0),
            ..MarginStateInit::default()
        }
    }

    #[test]
    fn test_pending_margin_starts_from_own_margin_when_collapsing() {
        let state = MarginState::new(init());
        assert!(state.can_collapse_with_margin_before());
        assert_eq!(state.margin(), 12.0);
    }

    #[test]
    fn test_border_blocks_before_collapse() {
        let state = MarginState::new(MarginStateInit {
            before_border_padding: 1.0,
            ..init()
        });
        assert!(!state.can_collapse_margin_before_with_children());
        assert!(state.can_collapse_margin_after_with_children());
        assert_eq!(state.margin(), 0.0);
    }

    #[test]
    fn test_fixed_height_blocks_after_collapse() {
        let state = MarginState::new(MarginStateInit {
            has_auto_block_size: false,
            ..init()
        });
        assert!(state.can_collapse_margin_before_with_children());
        assert!(!state.can_collapse_margin_after_with_children());
    }

    #[test]
    fn test_formatting_context_root_isolates() {
        let state = MarginState::new(MarginStateInit {
            isolates_children: true,
            ..init()
        });
        assert!(!state.can_collapse_with_children());
        assert!(!state.can_collapse_with_margin_before());
    }

    #[test]
    fn test_margin_values_split_signs() {
        let values = MarginValues::from_margins(-5.0, 7.0);
        assert_eq!(values.negative_before, 5.0);
        assert_eq!(values.positive_before, 0.0);
        assert_eq!(values.after(), 7.0);
    }
}
