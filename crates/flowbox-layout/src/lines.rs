//! Line boxes of block containers with inline content.
//!
//! [CSS 2.1 § 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! Inline layout itself (breaking text into lines) happens elsewhere: a
//! container with inline content arrives with its line boxes already
//! measured. Block layout only *stacks* them: it moves lines beside or below
//! floats, and inserts pagination struts between them, honoring `orphans`
//! and `widows`.
//!
//! "The line boxes of a block container are stacked with no vertical
//! separation [...] In general, the left edge of a line box touches the left
//! edge of its containing block and the right edge touches the right edge of
//! its containing block. However, floating boxes may come between the
//! containing block edge and the line box edge."

use serde::Serialize;

use crate::box_model::LogicalRect;
use crate::float::FloatRegistry;
use crate::fragmentation::{FragmentationState, PageBoundaryRule};

/// A pre-measured line box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineBox {
    /// Inline extent of the line's content.
    pub inline_size: f32,
    /// Block extent of the line (including leading).
    pub block_size: f32,
    /// Where the line ended up, in the container's border-box coordinates.
    /// `inline_size` is the space available to the line.
    pub rect: LogicalRect,
    /// Space inserted before the line to push it to the next fragmentainer.
    pub pagination_strut: f32,
    /// The line starts a fragmentainer (and is not the first line).
    pub is_first_after_break: bool,
}

impl LineBox {
    /// A line of the given measured size, not yet placed.
    #[must_use]
    pub fn new(inline_size: f32, block_size: f32) -> Self {
        Self {
            inline_size,
            block_size,
            rect: LogicalRect::default(),
            pagination_strut: 0.0,
            is_first_after_break: false,
        }
    }
}

/// Inputs to stacking the lines of one container.
pub(crate) struct LineStacking<'a> {
    /// Block offset of the content box start (border + padding before).
    pub content_block_start: f32,
    /// The container's floats (own and intruding).
    pub floats: &'a FloatRegistry,
    /// The fragmentation context and the container's offset within it.
    pub fragmentation: Option<(&'a FragmentationState, f32)>,
    /// `orphans` of the container.
    pub orphans: u32,
    /// `widows` of the container.
    pub widows: u32,
    /// Whether a strut may be propagated from the first line to the
    /// container (the container can be pushed as a whole).
    pub allows_pagination_strut: bool,
    /// The container's own block size if it were pushed whole, used to
    /// check that pushing helps.
    pub container_fits_in_fragmentainer: bool,
}

/// What stacking decided.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LineStackingResult {
    /// Block-end of the last line (start of the content box if no lines).
    pub content_block_end: f32,
    /// Strut to propagate to the container: how far the container must move
    /// so that its first line starts a fragmentainer. Zero when none.
    pub strut_from_child: f32,
}

impl LineStacking<'_> {
    /// Stack `lines`, rerunning once with an earlier break if the last
    /// fragment would have fewer than `widows` lines.
    pub(crate) fn run(&self, lines: &mut [LineBox]) -> LineStackingResult {
        let first = self.stack(lines, None);
        if first.strut_from_child > 0.0 || self.fragmentation.is_none() {
            return first;
        }

        let Some(last_break) = lines.iter().rposition(|line| line.is_first_after_break) else {
            return first;
        };
        let count = lines.len();
        let widows = self.widows.max(1) as usize;
        let orphans = self.orphans.max(1) as usize;
        let after_break = count - last_break;
        if after_break >= widows {
            return first;
        }

        // [§ 3.3](https://www.w3.org/TR/css-break-3/#widows-orphans)
        // Break earlier so that `widows` lines follow, as long as `orphans`
        // lines still precede the break.
        let earlier = count.saturating_sub(widows);
        let preceding_break = lines[..last_break]
            .iter()
            .rposition(|line| line.is_first_after_break)
            .unwrap_or(0);
        if earlier > preceding_break && earlier - preceding_break >= orphans {
            tracing::debug!(line = earlier, "breaking early to satisfy widows");
            return self.stack(lines, Some(earlier));
        }

        // Not enough lines to satisfy both: move the whole container.
        let may_push = preceding_break == 0 && self.allows_pagination_strut && self.container_fits_in_fragmentainer;
        if let Some(strut) = self.container_push_strut().filter(|_| may_push) {
            return LineStackingResult {
                strut_from_child: strut,
                ..first
            };
        }
        first
    }

    fn container_push_strut(&self) -> Option<f32> {
        let (state, container_offset) = self.fragmentation?;
        if state.is_at_fragmentainer_start(container_offset) {
            return None;
        }
        state
            .remaining_at(container_offset, PageBoundaryRule::AssociateWithLatterPage)
            .filter(|&strut| strut > 0.0)
    }

    fn stack(&self, lines: &mut [LineBox], forced_break_before: Option<usize>) -> LineStackingResult {
        let mut offset = self.content_block_start;
        let mut strut_from_child = 0.0;

        for (index, line) in lines.iter_mut().enumerate() {
            line.pagination_strut = 0.0;
            line.is_first_after_break = false;

            // STEP 1: Move down until the line fits beside the floats.
            let mut top = offset;
            loop {
                let available = self.floats.available_inline_size(top, line.block_size);
                if available >= line.inline_size {
                    break;
                }
                match self.floats.next_float_bottom_below(top) {
                    Some(next) => top = next,
                    None => break,
                }
            }

            // STEP 2: Paginate.
            if let Some((state, container_offset)) = self.fragmentation {
                let absolute = container_offset + top;
                let forced = forced_break_before == Some(index);
                if let (Some(size), Some(remaining)) = (
                    state.fragmentainer_size_at(absolute),
                    state.remaining_at(absolute, PageBoundaryRule::AssociateWithLatterPage),
                ) {
                    let at_start = remaining == size;
                    if !at_start && (remaining < line.block_size || forced) {
                        let strut = state.strut_to_fit_content(absolute);
                        let fits_anywhere = state
                            .fragmentainer_size_at(absolute + strut)
                            .is_none_or(|next| line.block_size <= next);
                        if fits_anywhere {
                            if self.should_push_container(index, top) {
                                // The container moves instead; the line stays
                                // where it is relative to it.
                                strut_from_child = strut + top;
                                line.rect = self.line_rect(top, line.block_size);
                                offset = top + line.block_size;
                                continue;
                            }
                            top += strut;
                            line.pagination_strut = strut;
                            line.is_first_after_break = index > 0;
                        }
                    } else if at_start && index > 0 {
                        line.is_first_after_break = true;
                    }
                }
            }

            line.rect = self.line_rect(top, line.block_size);
            offset = top + line.block_size;
        }

        LineStackingResult {
            content_block_end: offset,
            strut_from_child,
        }
    }

    /// A break before line `index` at `top` should move the whole container:
    /// either it is the first line and flush with the content edge, or the
    /// break would leave fewer than `orphans` lines behind.
    fn should_push_container(&self, index: usize, top: f32) -> bool {
        if !self.allows_pagination_strut {
            return false;
        }
        if index == 0 {
            return top == self.content_block_start;
        }
        index < self.orphans.max(1) as usize && self.container_fits_in_fragmentainer
    }

    fn line_rect(&self, top: f32, block_size: f32) -> LogicalRect {
        let left = self.floats.line_left_offset(top, block_size);
        let right = self.floats.line_right_offset(top, block_size);
        LogicalRect::new(left, top, (right - left).max(0.0), block_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::FloatSide;
    use flowbox_tree::NodeId;

    fn stacking<'a>(
        floats: &'a FloatRegistry,
        fragmentation: Option<(&'a FragmentationState, f32)>,
    ) -> LineStacking<'a> {
        LineStacking {
            content_block_start: 0.0,
            floats,
            fragmentation,
            orphans: 2,
            widows: 2,
            allows_pagination_strut: false,
            container_fits_in_fragmentainer: true,
        }
    }

    fn lines(count: usize) -> Vec<LineBox> {
        (0..count).map(|_| LineBox::new(50.0, 20.0)).collect()
    }

    #[test]
    fn test_lines_stack_without_gaps() {
        let floats = FloatRegistry::new(0.0, 100.0);
        let mut lines = lines(3);
        let result = stacking(&floats, None).run(&mut lines);
        assert_eq!(result.content_block_end, 60.0);
        assert_eq!(lines[2].rect.block_offset, 40.0);
    }

    #[test]
    fn test_line_too_wide_moves_below_float() {
        let mut floats = FloatRegistry::new(0.0, 100.0);
        let id = floats.insert(NodeId(1), FloatSide::LineLeft, 70.0, 30.0);
        let rect = floats.compute_float_position(id, 0.0);
        floats.commit_placement(id, rect);
        let mut lines = lines(1);
        let _ = stacking(&floats, None).run(&mut lines);
        assert_eq!(lines[0].rect.block_offset, 30.0);
        assert_eq!(lines[0].rect.inline_offset, 0.0);
    }

    #[test]
    fn test_line_crossing_boundary_gets_strut() {
        let floats = FloatRegistry::new(0.0, 100.0);
        let state = FragmentationState::paged(50.0);
        let mut lines = lines(5);
        let _ = stacking(&floats, Some((&state, 0.0))).run(&mut lines);
        assert_eq!(lines[2].pagination_strut, 10.0);
        assert_eq!(lines[2].rect.block_offset, 50.0);
        assert!(lines[2].is_first_after_break);
    }

    #[test]
    fn test_widows_pull_an_extra_line_forward() {
        let floats = FloatRegistry::new(0.0, 100.0);
        let state = FragmentationState::paged(70.0);
        // Three lines fit on the first page, one would be left alone.
        let mut lines = lines(4);
        let _ = stacking(&floats, Some((&state, 0.0))).run(&mut lines);
        assert!(lines[2].is_first_after_break);
        assert_eq!(lines[2].rect.block_offset, 70.0);
        assert_eq!(lines[3].rect.block_offset, 90.0);
    }
}
