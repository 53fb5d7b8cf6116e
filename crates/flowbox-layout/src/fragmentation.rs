//! Fragmentation context geometry and the soft/forced break rules.
//!
//! [CSS Fragmentation Module Level 3](https://www.w3.org/TR/css-break-3/)
//!
//! "In paged media, and in multi-column layout, content is split across
//! fragmentainers." Layout stays a single continuous strip: content that
//! has to move to the next fragmentainer gets a *pagination strut*, extra
//! block-axis space that pushes it to the fragmentainer's start.
//!
//! A [`FragmentationState`] maps offsets in that strip to fragmentainers. It
//! is made of *rows*: runs of equally sized fragmentainers. A paged context
//! has a single row of pages; a multicol context has one row per column set,
//! separated by the offsets at which column spanners interrupt the flow.
//!
//! A fragmentainer size of zero or less is treated as unknown: no breaks
//! are inserted where the size is unknown.

use flowbox_style::{BreakBetween, FragmentationType};
use flowbox_tree::NodeId;

/// [§ 4.4 Unforced Breaks](https://www.w3.org/TR/css-break-3/#unforced-breaks)
///
/// Which fragmentainer an offset that lies exactly on a boundary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBoundaryRule {
    /// The offset ends the former fragmentainer (no space remains there).
    AssociateWithFormerPage,
    /// The offset starts the latter fragmentainer (a full fragmentainer of
    /// space remains).
    AssociateWithLatterPage,
}

/// A run of equally sized fragmentainers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentainerRow {
    /// Where the row starts in the flow. `None` until layout reaches it.
    pub logical_top: Option<f32>,
    /// Size of each fragmentainer in the row, `None` if unknown.
    pub block_size: Option<f32>,
}

/// Fragmentainer geometry of one fragmentation context.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentationState {
    kind: FragmentationType,
    rows: Vec<FragmentainerRow>,
    /// Spanner whose flow offset starts row `i + 1`.
    spanners: Vec<NodeId>,
}

impl FragmentationState {
    /// A paged context: pages of `page_block_size` starting at offset zero.
    #[must_use]
    pub fn paged(page_block_size: f32) -> Self {
        Self {
            kind: FragmentationType::Page,
            rows: vec![FragmentainerRow {
                logical_top: Some(0.0),
                block_size: known(page_block_size),
            }],
            spanners: Vec::new(),
        }
    }

    /// A multicol context with one row per segment of the flow thread.
    /// `row_block_sizes[i]` is the column height of segment `i` (from the
    /// previous balancing pass, `None` on the first one); `spanners[i]` is
    /// the spanner that ends segment `i`.
    #[must_use]
    pub fn columns(row_block_sizes: &[Option<f32>], spanners: Vec<NodeId>) -> Self {
        let row_count = (spanners.len() + 1).max(row_block_sizes.len());
        let rows = (0..row_count)
            .map(|index| FragmentainerRow {
                logical_top: (index == 0).then_some(0.0),
                block_size: row_block_sizes.get(index).copied().flatten().and_then(known),
            })
            .collect();
        Self {
            kind: FragmentationType::Column,
            rows,
            spanners,
        }
    }

    /// Pages or columns.
    #[must_use]
    pub const fn kind(&self) -> FragmentationType {
        self.kind
    }

    /// [Multicol § 6](https://www.w3.org/TR/css-multicol-1/#spanning-columns)
    ///
    /// The flow reached `spanner` at `offset`: the content after it goes to
    /// the next row of columns. Laying the same content out again updates
    /// the row start instead of adding a row.
    pub fn skip_column_spanner(&mut self, spanner: NodeId, offset: f32) {
        let Some(index) = self.spanners.iter().position(|&s| s == spanner) else {
            return;
        };
        if let Some(row) = self.rows.get_mut(index + 1) {
            row.logical_top = Some(offset);
        }
    }

    /// Flow offset at which each spanner was skipped, in spanner order.
    #[must_use]
    pub fn spanner_offsets(&self) -> Vec<Option<f32>> {
        (0..self.spanners.len())
            .map(|index| self.rows.get(index + 1).and_then(|row| row.logical_top))
            .collect()
    }

    fn row_at(&self, offset: f32) -> Option<&FragmentainerRow> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.logical_top.is_some_and(|top| top <= offset))
            .or_else(|| self.rows.first())
    }

    /// Size of the fragmentainer containing `offset`, `None` if unknown.
    #[must_use]
    pub fn fragmentainer_size_at(&self, offset: f32) -> Option<f32> {
        self.row_at(offset).and_then(|row| row.block_size)
    }

    /// Start of the fragmentainer containing `offset`.
    #[must_use]
    pub fn fragmentainer_top_at(&self, offset: f32) -> Option<f32> {
        let row = self.row_at(offset)?;
        let size = row.block_size?;
        let top = row.logical_top.unwrap_or(0.0);
        Some(top + ((offset - top) / size).floor() * size)
    }

    /// Space left in the fragmentainer at `offset`.
    ///
    /// On an exact boundary [`PageBoundaryRule::AssociateWithFormerPage`]
    /// answers zero and [`PageBoundaryRule::AssociateWithLatterPage`] a full
    /// fragmentainer. `None` when the size is unknown.
    #[must_use]
    pub fn remaining_at(&self, offset: f32, rule: PageBoundaryRule) -> Option<f32> {
        let size = self.fragmentainer_size_at(offset)?;
        let top = self.fragmentainer_top_at(offset)?;
        let remaining = top + size - offset;
        Some(match rule {
            PageBoundaryRule::AssociateWithFormerPage => remaining % size,
            PageBoundaryRule::AssociateWithLatterPage if remaining <= 0.0 => size,
            PageBoundaryRule::AssociateWithLatterPage => remaining,
        })
    }

    /// Whether `offset` is exactly at the start of a fragmentainer.
    #[must_use]
    pub fn is_at_fragmentainer_start(&self, offset: f32) -> bool {
        match (
            self.remaining_at(offset, PageBoundaryRule::AssociateWithLatterPage),
            self.fragmentainer_size_at(offset),
        ) {
            (Some(remaining), Some(size)) => remaining == size,
            _ => false,
        }
    }

    /// Start of the fragmentainer after the one containing `offset`; the
    /// offset itself when sizes are unknown.
    #[must_use]
    pub fn next_page_logical_top(&self, offset: f32) -> f32 {
        self.remaining_at(offset, PageBoundaryRule::AssociateWithLatterPage)
            .map_or(offset, |remaining| offset + remaining)
    }

    /// Strut that moves content at `offset` to the start of the next
    /// fragmentainer.
    #[must_use]
    pub fn strut_to_fit_content(&self, offset: f32) -> f32 {
        self.remaining_at(offset, PageBoundaryRule::AssociateWithLatterPage)
            .unwrap_or(0.0)
    }

    /// [§ 3.1 Forced breaks](https://www.w3.org/TR/css-break-3/#forced-breaks)
    ///
    /// Where content at `offset` starts after a class A break point whose
    /// joined value is `value`. Nothing moves unless the value forces a
    /// break in this kind of context, the fragmentainer size is known, and
    /// `offset` is not already at a fragmentainer start.
    #[must_use]
    pub fn apply_forced_break(&self, offset: f32, value: BreakBetween) -> f32 {
        if !value.is_forced_for(self.kind) {
            return offset;
        }
        let Some(size) = self.fragmentainer_size_at(offset) else {
            return offset;
        };
        let Some(remaining) = self.remaining_at(offset, PageBoundaryRule::AssociateWithLatterPage) else {
            return offset;
        };
        if remaining == size {
            return offset;
        }
        offset + remaining
    }

    /// [§ 4.4 Unforced Breaks](https://www.w3.org/TR/css-break-3/#unforced-breaks)
    ///
    /// Where unsplittable content of `block_size` starting at `offset` ends
    /// up. It stays put when it fits, when the size is unknown, when it is
    /// already at a fragmentainer start, or when it is taller than the
    /// fragmentainer it would move to (moving it would not help).
    #[must_use]
    pub fn adjust_for_unsplittable(&self, offset: f32, block_size: f32) -> f32 {
        let Some(size) = self.fragmentainer_size_at(offset) else {
            return offset;
        };
        let Some(remaining) = self.remaining_at(offset, PageBoundaryRule::AssociateWithLatterPage) else {
            return offset;
        };
        if remaining >= block_size || remaining == size {
            return offset;
        }
        let next = offset + self.strut_to_fit_content(offset);
        match self.fragmentainer_size_at(next) {
            Some(next_size) if block_size <= next_size => next,
            _ => offset,
        }
    }
}

fn known(size: f32) -> Option<f32> {
    (size > 0.0).then_some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_on_boundary_depends_on_rule() {
        let state = FragmentationState::paged(100.0);
        assert_eq!(state.remaining_at(100.0, PageBoundaryRule::AssociateWithFormerPage), Some(0.0));
        assert_eq!(state.remaining_at(100.0, PageBoundaryRule::AssociateWithLatterPage), Some(100.0));
        assert_eq!(state.remaining_at(130.0, PageBoundaryRule::AssociateWithLatterPage), Some(70.0));
    }

    #[test]
    fn test_unknown_size_inserts_no_breaks() {
        let state = FragmentationState::paged(0.0);
        assert_eq!(state.remaining_at(10.0, PageBoundaryRule::AssociateWithLatterPage), None);
        assert_eq!(state.apply_forced_break(10.0, BreakBetween::Page), 10.0);
        assert_eq!(state.next_page_logical_top(10.0), 10.0);
    }

    #[test]
    fn test_forced_break_at_start_is_noop() {
        let state = FragmentationState::paged(100.0);
        assert_eq!(state.apply_forced_break(200.0, BreakBetween::Page), 200.0);
        assert_eq!(state.apply_forced_break(150.0, BreakBetween::Page), 200.0);
        assert_eq!(state.apply_forced_break(150.0, BreakBetween::Column), 150.0);
    }

    #[test]
    fn test_strut_reaches_next_page_start() {
        let state = FragmentationState::paged(100.0);
        assert_eq!(state.strut_to_fit_content(90.0), 10.0);
        assert_eq!(state.strut_to_fit_content(100.0), 100.0);
        assert_eq!(FragmentationState::paged(0.0).strut_to_fit_content(90.0), 0.0);
    }

    #[test]
    fn test_unsplittable_moves_only_when_it_helps() {
        let state = FragmentationState::paged(100.0);
        assert_eq!(state.adjust_for_unsplittable(90.0, 20.0), 100.0);
        assert_eq!(state.adjust_for_unsplittable(50.0, 20.0), 50.0);
        assert_eq!(state.adjust_for_unsplittable(100.0, 150.0), 100.0);
        assert_eq!(state.adjust_for_unsplittable(90.0, 150.0), 90.0);
    }

    #[test]
    fn test_spanner_starts_new_row() {
        let spanner = NodeId(7);
        let mut state = FragmentationState::columns(&[Some(40.0), Some(25.0)], vec![spanner]);
        state.skip_column_spanner(spanner, 70.0);
        assert_eq!(state.fragmentainer_size_at(69.0), Some(40.0));
        assert_eq!(state.fragmentainer_size_at(70.0), Some(25.0));
        assert_eq!(state.fragmentainer_top_at(100.0), Some(95.0));
        assert_eq!(state.spanner_offsets(), vec![Some(70.0)]);
    }

    #[test]
    fn test_rows_not_reached_are_ignored() {
        let state = FragmentationState::columns(&[Some(40.0), Some(25.0)], vec![NodeId(1)]);
        assert_eq!(state.fragmentainer_size_at(500.0), Some(40.0));
    }
}
