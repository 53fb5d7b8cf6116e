//! Float registry: placement, clearance and band queries.
//!
//! [CSS 2.1 § 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current
//! line. The most interesting characteristic of a float (or 'floated' or
//! 'floating' box) is that content may flow along its side (or be prohibited
//! from doing so by the 'clear' property)."
//!
//! Every block container owns a [`FloatRegistry`]. It holds the container's
//! own floats plus copies of floats that reach it from elsewhere:
//!
//! - floats of the parent that *intrude* into the container, and
//! - floats of a child that *overhang* the child's bottom edge.
//!
//! Copies are marked `is_descendant = false` and `should_paint = false` so
//! that only the box that owns a float paints it.
//!
//! All rectangles are margin boxes in the container's border-box logical
//! coordinates. Inline offsets are line-left based; [`FloatSide::LineLeft`]
//! is `float: left` in horizontal writing modes.

use flowbox_style::{Clear, Float};
use flowbox_tree::NodeId;

use crate::box_model::{LogicalOffset, LogicalRect};

/// The line-relative side a float sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FloatSide {
    /// `float: left`
    LineLeft,
    /// `float: right`
    LineRight,
}

impl FloatSide {
    /// The side for a computed `float` value, `None` for `float: none`.
    #[must_use]
    pub const fn from_style(float: Float) -> Option<Self> {
        match float {
            Float::None => None,
            Float::Left => Some(Self::LineLeft),
            Float::Right => Some(Self::LineRight),
        }
    }

    const fn is_cleared_by(self, clear: Clear) -> bool {
        matches!(
            (self, clear),
            (_, Clear::Both) | (Self::LineLeft, Clear::Left) | (Self::LineRight, Clear::Right)
        )
    }
}

/// Generational handle to a record in a [`FloatRegistry`].
///
/// Clearing the registry bumps its generation, so handles taken before a
/// relayout stop resolving instead of pointing at unrelated floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatId {
    index: u32,
    generation: u32,
}

/// One float known to a container.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatRecord {
    /// The floating box.
    pub node: NodeId,
    /// Which side it floats to.
    pub side: FloatSide,
    /// Margin box in the owning container's coordinates. Only meaningful
    /// once `placed` is set.
    pub rect: LogicalRect,
    /// Whether the float has a committed position.
    pub placed: bool,
    /// `false` for intruding and overhanging copies.
    pub is_descendant: bool,
    /// Whether this container paints the float.
    pub should_paint: bool,
}

/// The floats affecting one block container.
#[derive(Debug, Clone, Default)]
pub struct FloatRegistry {
    records: Vec<FloatRecord>,
    generation: u32,
    /// Line-left content edge of the container.
    content_line_left: f32,
    /// Line-right content edge of the container.
    content_line_right: f32,
}

impl FloatRegistry {
    /// An empty registry for a container whose content box spans
    /// `[content_line_left, content_line_right)` on the inline axis.
    #[must_use]
    pub fn new(content_line_left: f32, content_line_right: f32) -> Self {
        Self {
            records: Vec::new(),
            generation: 0,
            content_line_left,
            content_line_right,
        }
    }

    /// Drop every record and invalidate outstanding [`FloatId`]s.
    pub fn reset(&mut self, content_line_left: f32, content_line_right: f32) {
        self.records.clear();
        self.generation = self.generation.wrapping_add(1);
        self.content_line_left = content_line_left;
        self.content_line_right = content_line_right;
    }

    /// Number of records, copies included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the container knows of no floats at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inline size of the container's content box.
    #[must_use]
    pub fn content_inline_size(&self) -> f32 {
        (self.content_line_right - self.content_line_left).max(0.0)
    }

    /// Line-left content edge.
    #[must_use]
    pub const fn content_line_left(&self) -> f32 {
        self.content_line_left
    }

    /// Line-right content edge.
    #[must_use]
    pub const fn content_line_right(&self) -> f32 {
        self.content_line_right
    }

    /// Look a record up by handle.
    #[must_use]
    pub fn get(&self, id: FloatId) -> Option<&FloatRecord> {
        if id.generation != self.generation {
            return None;
        }
        self.records.get(id.index as usize)
    }

    /// Placed records only.
    pub fn placed(&self) -> impl Iterator<Item = &FloatRecord> + '_ {
        self.records.iter().filter(|record| record.placed)
    }

    /// Whether a record for `node` exists (original or copy).
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.records.iter().any(|record| record.node == node)
    }

    /// Register a float owned by this container. It is not placed yet.
    pub fn insert(&mut self, node: NodeId, side: FloatSide, inline_size: f32, block_size: f32) -> FloatId {
        let id = FloatId {
            index: self.records.len() as u32,
            generation: self.generation,
        };
        self.records.push(FloatRecord {
            node,
            side,
            rect: LogicalRect::new(0.0, 0.0, inline_size, block_size),
            placed: false,
            is_descendant: true,
            should_paint: true,
        });
        id
    }

    /// Add a copy of a float that lives in another container. `rect` is
    /// already translated into this container's coordinates.
    ///
    /// Copies of a float already known here are ignored.
    pub fn add_copy(&mut self, node: NodeId, side: FloatSide, rect: LogicalRect) {
        if self.contains(node) {
            return;
        }
        self.records.push(FloatRecord {
            node,
            side,
            rect,
            placed: true,
            is_descendant: false,
            should_paint: false,
        });
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Compute where the unplaced float `id` goes when its margin box may
    /// not start above `candidate_top`. Pure: nothing is committed.
    ///
    /// "A floated box is shifted to the left or right until its outer edge
    /// touches the containing block edge or the outer edge of another float.
    /// [...] If there is not enough horizontal room for the float, it is
    /// shifted downward until either it fits or there are no more floats
    /// present."
    ///
    /// The width used to decide whether the float fits is clamped to the
    /// content box, so a float wider than its container stops moving down
    /// once no other float is beside it and overflows from there.
    ///
    /// # Panics
    /// Panics if `id` is stale.
    #[must_use]
    pub fn compute_float_position(&self, id: FloatId, candidate_top: f32) -> LogicalRect {
        let record = self
            .get(id)
            .unwrap_or_else(|| panic!("stale float handle {id:?}"));
        let size = record.rect;
        let fit_width = size.inline_size.min(self.content_inline_size());

        let mut top = candidate_top;
        loop {
            // The float's whole margin box has to fit, not just its top edge.
            let left = self.line_left_offset(top, size.block_size);
            let right = self.line_right_offset(top, size.block_size);
            if right - left >= fit_width {
                let inline_offset = match record.side {
                    FloatSide::LineLeft => left,
                    FloatSide::LineRight => right - fit_width,
                };
                return LogicalRect::new(inline_offset, top, size.inline_size, size.block_size);
            }
            // Not enough room beside the floats at this offset: move below
            // the next one that ends.
            match self.next_float_bottom_below(top) {
                Some(next) => top = next,
                None => {
                    let inline_offset = match record.side {
                        FloatSide::LineLeft => self.content_line_left,
                        FloatSide::LineRight => self.content_line_right - fit_width,
                    };
                    return LogicalRect::new(inline_offset, top, size.inline_size, size.block_size);
                }
            }
        }
    }

    /// Commit a position computed by [`Self::compute_float_position`].
    ///
    /// # Panics
    /// Panics if `id` is stale or the float was already placed. Placing a
    /// float twice would let it collide with itself.
    pub fn commit_placement(&mut self, id: FloatId, rect: LogicalRect) {
        assert_eq!(id.generation, self.generation, "stale float handle {id:?}");
        let Some(record) = self.records.get_mut(id.index as usize) else {
            panic!("stale float handle {id:?}");
        };
        assert!(!record.placed, "float {:?} placed twice", record.node);
        record.rect = rect;
        record.placed = true;
    }

    /// Block offset of the most recently placed float owned by this
    /// container. "The outer top of a floating box may not be higher than
    /// the outer top of any block or floated box generated by an element
    /// earlier in the source document."
    #[must_use]
    pub fn last_placed_top(&self) -> Option<f32> {
        self.records
            .iter()
            .rev()
            .find(|record| record.placed && record.is_descendant)
            .map(|record| record.rect.block_offset)
    }

    /// Lowest margin-box bottom over placed floats that `clear` applies to.
    /// `None` when no such float exists.
    #[must_use]
    pub fn lowest_float_bottom(&self, clear: Clear) -> Option<f32> {
        self.placed()
            .filter(|record| record.side.is_cleared_by(clear))
            .map(|record| record.rect.block_end())
            .reduce(f32::max)
    }

    /// Lowest bottom over all placed floats.
    #[must_use]
    pub fn lowest_bottom(&self) -> Option<f32> {
        self.lowest_float_bottom(Clear::Both)
    }

    /// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// How far a box with `clear` whose hypothetical top is `top` must move
    /// down to clear the relevant floats (zero if it is already below them).
    #[must_use]
    pub fn clearance_delta(&self, clear: Clear, top: f32) -> f32 {
        if clear == Clear::None {
            return 0.0;
        }
        self.lowest_float_bottom(clear)
            .map_or(0.0, |bottom| (bottom - top).max(0.0))
    }

    /// The smallest float bottom strictly below `offset`.
    #[must_use]
    pub fn next_float_bottom_below(&self, offset: f32) -> Option<f32> {
        self.placed()
            .map(|record| record.rect.block_end())
            .filter(|&bottom| bottom > offset)
            .reduce(f32::min)
    }

    /// Line-left edge of the available space at a single block offset.
    ///
    /// A float occupies `[top, bottom)`, so a zero-height float never
    /// narrows anything.
    #[must_use]
    pub fn line_left_offset_at(&self, offset: f32) -> f32 {
        self.placed()
            .filter(|record| record.side == FloatSide::LineLeft)
            .filter(|record| record.rect.block_offset <= offset && offset < record.rect.block_end())
            .map(|record| record.rect.inline_end())
            .fold(self.content_line_left, f32::max)
    }

    /// Line-right edge of the available space at a single block offset.
    #[must_use]
    pub fn line_right_offset_at(&self, offset: f32) -> f32 {
        self.placed()
            .filter(|record| record.side == FloatSide::LineRight)
            .filter(|record| record.rect.block_offset <= offset && offset < record.rect.block_end())
            .map(|record| record.rect.inline_offset)
            .fold(self.content_line_right, f32::min)
    }

    /// Line-left edge of the space left by floats over the band
    /// `[top, top + block_size)`. A zero-height band degenerates to
    /// [`Self::line_left_offset_at`].
    #[must_use]
    pub fn line_left_offset(&self, top: f32, block_size: f32) -> f32 {
        if block_size <= 0.0 {
            return self.line_left_offset_at(top);
        }
        let bottom = top + block_size;
        self.placed()
            .filter(|record| record.side == FloatSide::LineLeft)
            .filter(|record| record.rect.block_offset < bottom && record.rect.block_end() > top)
            .map(|record| record.rect.inline_end())
            .fold(self.content_line_left, f32::max)
    }

    /// Line-right edge of the space left by floats over a band.
    #[must_use]
    pub fn line_right_offset(&self, top: f32, block_size: f32) -> f32 {
        if block_size <= 0.0 {
            return self.line_right_offset_at(top);
        }
        let bottom = top + block_size;
        self.placed()
            .filter(|record| record.side == FloatSide::LineRight)
            .filter(|record| record.rect.block_offset < bottom && record.rect.block_end() > top)
            .map(|record| record.rect.inline_offset)
            .fold(self.content_line_right, f32::min)
    }

    /// Inline space left beside floats over a band, never negative.
    #[must_use]
    pub fn available_inline_size(&self, top: f32, block_size: f32) -> f32 {
        (self.line_right_offset(top, block_size) - self.line_left_offset(top, block_size)).max(0.0)
    }

    /// Copies of the placed floats that reach below `child_top`, translated
    /// into the coordinates of a child whose border box starts at
    /// `child_offset` in this container.
    #[must_use]
    pub fn intruding_into(&self, child_offset: LogicalOffset) -> Vec<(NodeId, FloatSide, LogicalRect)> {
        let back = LogicalOffset::new(-child_offset.inline_offset, -child_offset.block_offset);
        self.placed()
            .filter(|record| record.rect.block_end() > child_offset.block_offset)
            .map(|record| (record.node, record.side, record.rect.translated(back)))
            .collect()
    }

    /// Floats of this container whose bottom is below `limit`, translated by
    /// `offset` into the parent's coordinates. Used to hand overhanging
    /// floats up to the parent.
    #[must_use]
    pub fn overhanging_below(
        &self,
        limit: f32,
        offset: LogicalOffset,
    ) -> Vec<(NodeId, FloatSide, LogicalRect)> {
        self.placed()
            .filter(|record| record.rect.block_end() > limit)
            .map(|record| (record.node, record.side, record.rect.translated(offset)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(registry: &mut FloatRegistry, node: usize, side: FloatSide, w: f32, h: f32, top: f32) -> LogicalRect {
        let id = registry.insert(NodeId(node), side, w, h);
        let rect = registry.compute_float_position(id, top);
        registry.commit_placement(id, rect);
        rect
    }

    #[test]
    fn test_float_does_not_overlap_float_lower_in_its_band() {
        let mut registry = FloatRegistry::new(0.0, 180.0);
        let wide = placed(&mut registry, 1, FloatSide::LineRight, 150.0, 40.0, 20.0);
        assert_eq!(wide.block_offset, 20.0);
        // Room at offset 0, but the wide float starts before this one ends.
        let rect = placed(&mut registry, 2, FloatSide::LineLeft, 100.0, 30.0, 0.0);
        assert_eq!(rect.block_offset, 60.0);
        assert_eq!(rect.inline_offset, 0.0);
    }

    #[test]
    fn test_second_float_drops_below_when_no_room() {
        let mut registry = FloatRegistry::new(0.0, 180.0);
        let first = placed(&mut registry, 1, FloatSide::LineLeft, 100.0, 50.0, 0.0);
        let second = placed(&mut registry, 2, FloatSide::LineLeft, 100.0, 50.0, 0.0);
        assert_eq!(first.block_offset, 0.0);
        assert_eq!(second.block_offset, 50.0);
        assert_eq!(second.inline_offset, 0.0);
    }

    #[test]
    fn test_right_float_sits_at_line_right_edge() {
        let mut registry = FloatRegistry::new(10.0, 210.0);
        let rect = placed(&mut registry, 1, FloatSide::LineRight, 50.0, 20.0, 0.0);
        assert_eq!(rect.inline_offset, 160.0);
    }

    #[test]
    fn test_wide_float_overflows_instead_of_looping() {
        let mut registry = FloatRegistry::new(0.0, 100.0);
        let rect = placed(&mut registry, 1, FloatSide::LineLeft, 300.0, 20.0, 5.0);
        assert_eq!(rect.block_offset, 5.0);
        assert_eq!(rect.inline_size, 300.0);
    }

    #[test]
    fn test_zero_height_float_does_not_narrow() {
        let mut registry = FloatRegistry::new(0.0, 100.0);
        let _ = placed(&mut registry, 1, FloatSide::LineLeft, 40.0, 0.0, 0.0);
        assert_eq!(registry.line_left_offset_at(0.0), 0.0);
        assert_eq!(registry.available_inline_size(0.0, 10.0), 100.0);
    }

    #[test]
    fn test_clearance_only_for_matching_side() {
        let mut registry = FloatRegistry::new(0.0, 300.0);
        let _ = placed(&mut registry, 1, FloatSide::LineLeft, 40.0, 30.0, 0.0);
        let _ = placed(&mut registry, 2, FloatSide::LineRight, 40.0, 80.0, 0.0);
        assert_eq!(registry.clearance_delta(Clear::Left, 10.0), 20.0);
        assert_eq!(registry.clearance_delta(Clear::Right, 10.0), 70.0);
        assert_eq!(registry.clearance_delta(Clear::None, 10.0), 0.0);
        assert_eq!(registry.clearance_delta(Clear::Both, 100.0), 0.0);
    }

    #[test]
    #[should_panic(expected = "placed twice")]
    fn test_double_commit_panics() {
        let mut registry = FloatRegistry::new(0.0, 100.0);
        let id = registry.insert(NodeId(1), FloatSide::LineLeft, 10.0, 10.0);
        let rect = registry.compute_float_position(id, 0.0);
        registry.commit_placement(id, rect);
        registry.commit_placement(id, rect);
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut registry = FloatRegistry::new(0.0, 100.0);
        let id = registry.insert(NodeId(1), FloatSide::LineLeft, 10.0, 10.0);
        registry.reset(0.0, 100.0);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_copies_are_not_painted_and_deduplicated() {
        let mut registry = FloatRegistry::new(0.0, 100.0);
        let rect = LogicalRect::new(0.0, 0.0, 10.0, 10.0);
        registry.add_copy(NodeId(3), FloatSide::LineLeft, rect);
        registry.add_copy(NodeId(3), FloatSide::LineLeft, rect);
        assert_eq!(registry.len(), 1);
        let record = registry.placed().next().unwrap();
        assert!(!record.is_descendant);
        assert!(!record.should_paint);
    }
}
