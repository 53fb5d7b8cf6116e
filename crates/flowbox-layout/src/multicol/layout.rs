//! Sizing and balancing columns.
//!
//! [Multicol § 3.4 The multi-column model](https://www.w3.org/TR/css-multicol-1/#pseudo-algorithm)
//! and [§ 7 Filling columns](https://www.w3.org/TR/css-multicol-1/#filling-columns)
//!
//! The flow thread is laid out as one strip, fragmented into columns of a
//! given height. Spanners cut the strip into *segments*; each segment is
//! shown by one column set. A balanced segment starts with an unknown
//! column height (no breaks at all), guesses a height from the resulting
//! extent, and grows it until the segment fits in its columns.

use flowbox_common::warning::warn_once;
use flowbox_style::ColumnFill;
use flowbox_tree::NodeId;

use crate::block::BlockLayout;
use crate::fragmentation::FragmentationState;
use crate::tree::BoxKind;

/// Upper bound on layout passes spent balancing one multicol container.
const MAX_BALANCING_PASSES: usize = 16;

/// Slack when checking that content fits in its columns.
const COLUMN_FIT_EPSILON: f32 = 0.01;

/// [§ 3.4](https://www.w3.org/TR/css-multicol-1/#pseudo-algorithm)
///
/// Used column count and width for a content box `available` wide.
#[must_use]
pub fn used_column_metrics(available: f32, count: Option<u32>, width: Option<f32>, gap: f32) -> (u32, f32) {
    let fitting = |width: f32| {
        // "N := max(1, floor((available-width + column-gap) / (column-width + column-gap)))"
        let per_column = width + gap;
        if per_column > 0.0 {
            (((available + gap) / per_column).floor() as u32).max(1)
        } else {
            1
        }
    };
    let count = match (count, width) {
        (Some(count), None) => {
            // "W := max(0, (available-width - ((N - 1) * column-gap)) / N)"
            let count = count.max(1);
            let width = ((available - (count - 1) as f32 * gap) / count as f32).max(0.0);
            return (count, width);
        }
        (None, Some(width)) => fitting(width),
        (Some(count), Some(width)) => count.max(1).min(fitting(width)),
        (None, None) => 1,
    };
    // "W := ((available-width + column-gap) / N) - column-gap"
    let width = ((available + gap) / count as f32 - gap).max(0.0);
    (count, width)
}

/// Where each segment of the flow thread starts and ends.
fn segment_bounds(spanner_offsets: &[Option<f32>], thread_extent: f32) -> Vec<(f32, f32)> {
    let mut bounds = Vec::with_capacity(spanner_offsets.len() + 1);
    let mut start = 0.0_f32;
    for offset in spanner_offsets {
        let end = offset.unwrap_or(start).max(start);
        bounds.push((start, end));
        start = end;
    }
    bounds.push((start, thread_extent.max(start)));
    bounds
}

/// The next column height to try for a segment of `extent` laid out with
/// columns of `current` height (`None`: not fragmented yet). `cap` is the
/// height the container allows, if any.
fn next_column_height(current: Option<f32>, extent: f32, count: u32, cap: Option<f32>) -> Option<f32> {
    if extent <= 0.0 {
        return None;
    }
    let count = count.max(1) as f32;
    let next = match current {
        None => extent / count,
        Some(height) if extent <= height * count + COLUMN_FIT_EPSILON => height,
        // Content that did not fit pushes the height up by at least a pixel.
        Some(height) => height + ((extent - height * count) / count).max(1.0),
    };
    Some(cap.map_or(next, |cap| next.min(cap)))
}

impl BlockLayout<'_> {
    /// [Multicol § 2](https://www.w3.org/TR/css-multicol-1/#the-multi-column-model)
    ///
    /// Lay out the flow thread in columns, size the column sets, then lay
    /// out the container itself: its column sets and spanners.
    pub(crate) fn layout_multicol(&mut self, container: NodeId, inline_size: f32, flow_offset: f32) {
        let Some(thread) = self.tree[container].flow_thread else {
            self.layout_block_flow(container, inline_size, flow_offset, Vec::new());
            return;
        };
        let outer = self.fragmentation.take();

        // STEP 1: Used column metrics from the content box.
        self.set_own_inline_size(container, inline_size);
        let border_padding = self.tree[container].border_padding();
        let available = (inline_size - border_padding.inline_sum()).max(0.0);
        let style = &self.tree[container].style;
        let gap = style.used_column_gap();
        let (count, column_width) = used_column_metrics(available, style.column_count, style.column_width, gap);
        if column_width <= 0.0 {
            warn_once("multicol", "no room for columns; content is laid out in zero-width columns");
        }
        let column_fill = style.column_fill;
        let writing_mode = style.writing_mode;

        // STEP 2: Segments and their sets.
        let column_boxes: Vec<NodeId> = self.tree.boxes().following_siblings(thread).collect();
        let spanners: Vec<NodeId> = column_boxes
            .iter()
            .filter_map(|&column_box| match self.tree[column_box].kind {
                BoxKind::SpannerPlaceholder { spanner } => Some(spanner),
                _ => None,
            })
            .collect();
        let mut set_segments = Vec::new();
        let mut segment = 0;
        for &column_box in &column_boxes {
            if self.tree.is_column_set(column_box) {
                set_segments.push((column_box, segment));
            } else if self.tree.is_spanner_placeholder(column_box) {
                segment += 1;
            }
        }

        // [§ 7.1](https://www.w3.org/TR/css-multicol-1/#cf) "column-fill: auto"
        // fills columns sequentially, which only happens with a height to
        // fill; otherwise columns are balanced. A spanner splits the height
        // between segments in a way the container height does not say, so
        // with spanners every segment is balanced and the specified height
        // only caps the columns.
        let specified_height = self.specified_block_size(container);
        let fixed_height = specified_height.filter(|_| column_fill == ColumnFill::Auto && spanners.is_empty());

        self.resolve_edges(thread, writing_mode, available);
        let mut row_sizes: Vec<Option<f32>> = match fixed_height {
            Some(height) => vec![Some(height)],
            None => vec![None; spanners.len() + 1],
        };

        // STEP 3: Lay the thread out until every segment fits.
        let mut bounds;
        let mut pass = 1;
        loop {
            self.fragmentation = Some(FragmentationState::columns(&row_sizes, spanners.clone()));
            self.layout_block_flow(thread, column_width, 0.0, Vec::new());
            let spanner_offsets = self
                .fragmentation
                .take()
                .map(|state| state.spanner_offsets())
                .unwrap_or_default();
            bounds = segment_bounds(&spanner_offsets, self.own_block_size(thread));

            if fixed_height.is_some() {
                break;
            }
            let next: Vec<Option<f32>> = bounds
                .iter()
                .zip(&row_sizes)
                .map(|(&(start, end), &current)| next_column_height(current, end - start, count, specified_height))
                .collect();
            if next == row_sizes {
                break;
            }
            if pass == MAX_BALANCING_PASSES {
                warn_once("multicol", "column balancing did not converge");
                break;
            }
            tracing::debug!(
                container = self.tree[container].debug_name(),
                pass,
                heights = ?next,
                "rebalancing columns"
            );
            row_sizes = next;
            pass += 1;
        }
        self.fragmentation = outer;
        self.tree[thread].needs_layout = false;

        // STEP 4: Hand the result to the column sets.
        for (set, segment) in set_segments {
            let (start, end) = bounds.get(segment).copied().unwrap_or_default();
            let column_block_size = row_sizes.get(segment).copied().flatten().or(fixed_height);
            if let BoxKind::ColumnSet(state) = &mut self.tree[set].kind {
                state.logical_top_in_flow_thread = start;
                state.logical_bottom_in_flow_thread = end;
                state.column_block_size = column_block_size;
                state.column_count = count;
                state.column_inline_size = column_width;
                state.column_gap = gap;
            }
        }
        let all_known = row_sizes.iter().all(Option::is_some);
        if let BoxKind::FlowThread(state) = &mut self.tree[thread].kind {
            state.column_count = count;
            state.column_inline_size = column_width;
            state.column_gap = gap;
            state.all_columns_have_known_height = all_known;
        }
        let thread_frame = &mut self.tree[thread].frame;
        thread_frame.inline_offset = border_padding.line_left;
        thread_frame.block_offset = border_padding.block_start;

        // STEP 5: The container stacks its column sets and spanners.
        self.layout_block_flow(container, inline_size, flow_offset, Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_only_divides_available_width() {
        assert_eq!(used_column_metrics(620.0, Some(3), None, 10.0), (3, 200.0));
    }

    #[test]
    fn test_width_only_fits_as_many_as_possible() {
        // floor((500 + 20) / (150 + 20)) = 3 columns, stretched to fill.
        let (count, width) = used_column_metrics(500.0, None, Some(150.0), 20.0);
        assert_eq!(count, 3);
        assert!((width - 153.333_33).abs() < 0.001);
    }

    #[test]
    fn test_count_caps_width_derived_count() {
        assert_eq!(used_column_metrics(1000.0, Some(2), Some(100.0), 0.0), (2, 500.0));
    }

    #[test]
    fn test_narrow_container_still_gets_one_column() {
        assert_eq!(used_column_metrics(50.0, None, Some(200.0), 10.0).0, 1);
    }

    #[test]
    fn test_segments_follow_spanners() {
        let bounds = segment_bounds(&[Some(100.0), None], 250.0);
        assert_eq!(bounds, vec![(0.0, 100.0), (100.0, 100.0), (100.0, 250.0)]);
    }

    #[test]
    fn test_balancing_grows_until_content_fits() {
        assert_eq!(next_column_height(None, 300.0, 3, None), Some(100.0));
        assert_eq!(next_column_height(Some(100.0), 300.0, 3, None), Some(100.0));
        assert_eq!(next_column_height(Some(100.0), 330.0, 3, None), Some(110.0));
        assert_eq!(next_column_height(Some(100.0), 301.0, 3, None), Some(101.0));
        assert_eq!(next_column_height(Some(100.0), 330.0, 3, Some(105.0)), Some(105.0));
        assert_eq!(next_column_height(None, 0.0, 3, None), None);
    }
}
