//! Column sets and the flow-thread-to-column mapping.
//!
//! [Multicol § 3 The multi-column model](https://www.w3.org/TR/css-multicol-1/#the-multi-column-model)
//!
//! A column set owns the slice `[logical_top_in_flow_thread,
//! logical_bottom_in_flow_thread)` of its flow thread. Column `i` of the set
//! shows the thread slice starting at `logical_top_in_flow_thread + i *
//! column_block_size`.

use flowbox_style::Direction;
use flowbox_tree::NodeId;

use crate::box_model::LogicalOffset;
use crate::fragmentation::PageBoundaryRule;
use crate::tree::{BoxKind, LayoutTree};

/// Geometry of one run of columns, written by multicol layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSetState {
    /// Start of the set's slice of the flow thread.
    pub logical_top_in_flow_thread: f32,
    /// End of the set's slice of the flow thread.
    pub logical_bottom_in_flow_thread: f32,
    /// Height of each column; `None` before the first balancing pass.
    pub column_block_size: Option<f32>,
    /// Used column count.
    pub column_count: u32,
    /// Used column width.
    pub column_inline_size: f32,
    /// Used gap between columns.
    pub column_gap: f32,
}

impl ColumnSetState {
    /// Whether the column height is known (and non-zero).
    #[must_use]
    pub fn is_page_logical_height_known(&self) -> bool {
        self.column_block_size.is_some_and(|size| size > 0.0)
    }

    /// Number of columns the set's content actually occupies. This exceeds
    /// the used column count when content overflows a fixed-height set.
    #[must_use]
    pub fn actual_column_count(&self) -> u32 {
        let Some(size) = self.column_block_size.filter(|&size| size > 0.0) else {
            return 1;
        };
        let extent = self.logical_bottom_in_flow_thread - self.logical_top_in_flow_thread;
        ((extent / size).ceil() as u32).max(1)
    }

    /// Index of the column containing flow thread `offset`.
    #[must_use]
    pub fn column_index_at_offset(&self, offset: f32, rule: PageBoundaryRule) -> u32 {
        let Some(size) = self.column_block_size.filter(|&size| size > 0.0) else {
            return 0;
        };
        let relative = offset - self.logical_top_in_flow_thread;
        if relative <= 0.0 {
            return 0;
        }
        let mut index = (relative / size).floor() as u32;
        if rule == PageBoundaryRule::AssociateWithFormerPage
            && index > 0
            && relative == index as f32 * size
        {
            index -= 1;
        }
        index.min(self.actual_column_count() - 1)
    }
}

impl LayoutTree {
    fn column_set_state(&self, set: NodeId) -> Option<&ColumnSetState> {
        match &self[set].kind {
            BoxKind::ColumnSet(state) => Some(state),
            _ => None,
        }
    }

    /// The column sets following `thread`, in order.
    #[must_use]
    pub fn column_sets(&self, thread: NodeId) -> Vec<NodeId> {
        self.boxes()
            .following_siblings(thread)
            .filter(|&sibling| self.is_column_set(sibling))
            .collect()
    }

    /// The column set (or placeholder) right before `column_box`.
    #[must_use]
    pub fn previous_sibling_multi_column_box(&self, column_box: NodeId) -> Option<NodeId> {
        self.boxes()
            .prev_sibling(column_box)
            .filter(|&sibling| self.is_column_box(sibling))
    }

    /// The column set (or placeholder) right after `column_box`.
    #[must_use]
    pub fn next_sibling_multi_column_box(&self, column_box: NodeId) -> Option<NodeId> {
        self.boxes()
            .next_sibling(column_box)
            .filter(|&sibling| self.is_column_box(sibling))
    }

    fn previous_sibling_multi_column_set(&self, set: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling_multi_column_box(set);
        while let Some(column_box) = current {
            if self.is_column_set(column_box) {
                return Some(column_box);
            }
            current = self.previous_sibling_multi_column_box(column_box);
        }
        None
    }

    fn next_sibling_multi_column_set(&self, set: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling_multi_column_box(set);
        while let Some(column_box) = current {
            if self.is_column_set(column_box) {
                return Some(column_box);
            }
            current = self.next_sibling_multi_column_box(column_box);
        }
        None
    }

    /// The column set holding flow thread `offset`.
    ///
    /// Offsets before the thread map to the first set and offsets past the
    /// last set (thread overflow) to the last one. An offset exactly at the
    /// start of a set belongs to the previous set under
    /// [`PageBoundaryRule::AssociateWithFormerPage`]. Sets without a known
    /// column height are passed over in favor of a later set that actually
    /// contains the offset.
    #[must_use]
    pub fn column_set_at_block_offset(
        &self,
        thread: NodeId,
        offset: f32,
        rule: PageBoundaryRule,
    ) -> Option<NodeId> {
        let sets = self.column_sets(thread);
        let (&first, &last) = (sets.first()?, sets.last()?);

        let mut column_set = if offset < 0.0 {
            first
        } else {
            sets.iter()
                .copied()
                .find(|&set| {
                    self.column_set_state(set).is_some_and(|state| {
                        state.logical_top_in_flow_thread <= offset
                            && state.logical_bottom_in_flow_thread > offset
                    })
                })
                .unwrap_or(last)
        };

        let starts_at_offset = self
            .column_set_state(column_set)
            .is_some_and(|state| state.logical_top_in_flow_thread == offset);
        if rule == PageBoundaryRule::AssociateWithFormerPage && starts_at_offset {
            column_set = self
                .previous_sibling_multi_column_set(column_set)
                .unwrap_or(column_set);
        }

        // Prefer a set that has a height and contains the offset; zero-height
        // sets between adjacent spanners share their top with the next set.
        let mut walker = Some(column_set);
        while let Some(set) = walker {
            let sized = self
                .column_set_state(set)
                .filter(|state| state.is_page_logical_height_known());
            if let Some(state) = sized {
                let top = state.logical_top_in_flow_thread;
                let bottom = state.logical_bottom_in_flow_thread;
                let contains = match rule {
                    PageBoundaryRule::AssociateWithFormerPage => top < offset && bottom >= offset,
                    PageBoundaryRule::AssociateWithLatterPage => top <= offset && bottom > offset,
                };
                if contains {
                    return Some(set);
                }
            }
            walker = self.next_sibling_multi_column_set(set);
        }
        Some(column_set)
    }

    /// Where flow thread `offset` is shown: the offset to add to a point in
    /// the thread's coordinates to get the multicol container's logical
    /// coordinates.
    #[must_use]
    pub fn flow_thread_translation_at_offset(
        &self,
        thread: NodeId,
        offset: f32,
        rule: PageBoundaryRule,
    ) -> LogicalOffset {
        let thread_frame = self[thread].frame;
        let fallback = LogicalOffset::new(thread_frame.inline_offset, thread_frame.block_offset);
        let Some(set) = self.column_set_at_block_offset(thread, offset, rule) else {
            return fallback;
        };
        let Some(state) = self.column_set_state(set) else {
            return fallback;
        };
        let frame = self[set].frame;
        let index = state.column_index_at_offset(offset, rule);
        let column_block_size = state.column_block_size.unwrap_or(0.0);
        let advance = index as f32 * (state.column_inline_size + state.column_gap);

        let inline_offset = match self[thread].style.direction {
            Direction::Ltr => frame.inline_offset + advance,
            Direction::Rtl => frame.inline_end() - state.column_inline_size - advance,
        };
        let block_offset = frame.block_offset - state.logical_top_in_flow_thread
            - index as f32 * column_block_size;
        LogicalOffset::new(inline_offset, block_offset)
    }

    /// The first box of the thread's content that lives in `set`.
    #[must_use]
    pub fn first_layout_object_in_set(&self, set: NodeId) -> Option<NodeId> {
        let thread = self.flow_thread_of_column_box(set)?;
        let Some(sibling) = self.previous_sibling_multi_column_box(set) else {
            return self.boxes().first_child(thread);
        };
        let BoxKind::SpannerPlaceholder { spanner } = self[sibling].kind else {
            // Adjacent sets cannot tell their content apart.
            debug_assert!(false, "adjacent column sets");
            return None;
        };
        self.next_in_pre_order_after_children_skipping_out_of_flow(thread, spanner)
    }

    /// The last box of the thread's content that lives in `set`, or `None`
    /// when the set is the last one (its content runs to the thread's end).
    #[must_use]
    pub fn last_layout_object_in_set(&self, set: NodeId) -> Option<NodeId> {
        let thread = self.flow_thread_of_column_box(set)?;
        let sibling = self.next_sibling_multi_column_box(set)?;
        let BoxKind::SpannerPlaceholder { spanner } = self[sibling].kind else {
            debug_assert!(false, "adjacent column sets");
            return None;
        };
        self.previous_in_pre_order_skipping_out_of_flow(thread, spanner)
    }

    /// The column set that `descendant` (column content, not a spanner or
    /// inside one) belongs to.
    #[must_use]
    pub fn map_descendant_to_column_set(&self, thread: NodeId, descendant: NodeId) -> Option<NodeId> {
        debug_assert!(self.containing_column_spanner_placeholder(thread, descendant).is_none());
        debug_assert!(self.boxes().is_descendant_of(descendant, thread));

        let sets = self.column_sets(thread);
        let &first = sets.first()?;
        if sets.len() == 1 {
            return Some(first);
        }

        // Walks the content of each set; only needed once a spanner has been
        // inserted in the middle of existing content.
        for set in sets {
            let first_object = self.first_layout_object_in_set(set);
            let last_object = self.last_layout_object_in_set(set);
            let mut walker = first_object;
            while let Some(object) = walker {
                if object == descendant {
                    return Some(set);
                }
                if Some(object) == last_object {
                    break;
                }
                walker = self.boxes().next_in_pre_order(object, Some(thread));
            }
        }
        None
    }

    /// The flow thread whose column boxes include `column_box`.
    #[must_use]
    pub fn flow_thread_of_column_box(&self, column_box: NodeId) -> Option<NodeId> {
        let container = self.parent(column_box)?;
        self[container].flow_thread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(top: f32, bottom: f32, height: Option<f32>) -> ColumnSetState {
        ColumnSetState {
            logical_top_in_flow_thread: top,
            logical_bottom_in_flow_thread: bottom,
            column_block_size: height,
            column_count: 3,
            column_inline_size: 100.0,
            column_gap: 10.0,
        }
    }

    #[test]
    fn test_column_index_on_boundary() {
        let set = state(0.0, 300.0, Some(100.0));
        assert_eq!(set.column_index_at_offset(150.0, PageBoundaryRule::AssociateWithLatterPage), 1);
        assert_eq!(set.column_index_at_offset(100.0, PageBoundaryRule::AssociateWithLatterPage), 1);
        assert_eq!(set.column_index_at_offset(100.0, PageBoundaryRule::AssociateWithFormerPage), 0);
    }

    #[test]
    fn test_overflowing_content_gets_extra_columns() {
        let set = state(0.0, 450.0, Some(100.0));
        assert_eq!(set.actual_column_count(), 5);
        assert_eq!(set.column_index_at_offset(1000.0, PageBoundaryRule::AssociateWithLatterPage), 4);
    }

    #[test]
    fn test_unknown_height_maps_to_first_column() {
        let set = state(0.0, 450.0, None);
        assert!(!set.is_page_logical_height_known());
        assert_eq!(set.column_index_at_offset(200.0, PageBoundaryRule::AssociateWithLatterPage), 0);
    }
}
