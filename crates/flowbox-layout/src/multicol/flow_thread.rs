//! The flow thread and the bookkeeping of its column boxes.
//!
//! [Multicol § 6 Spanning columns](https://www.w3.org/TR/css-multicol-1/#spanning-columns)
//!
//! The column boxes (sets and spanner placeholders) following a flow thread
//! mirror its content: every run of ordinary content between spanners has
//! exactly one column set, and every spanner has exactly one placeholder.
//! Two column sets are never adjacent.
//!
//! The tree reports every mutation to the flow thread containing the
//! changed box:
//!
//! - [`LayoutTree::descendant_inserted`] after a subtree was inserted,
//! - [`LayoutTree::descendant_will_be_removed`] before a subtree is removed,
//! - [`LayoutTree::descendant_style_will_change`] and
//!   [`LayoutTree::descendant_style_did_change`] around a style change. The
//!   first returns a [`StyleChangeScope`] that the second consumes.
//!
//! A column box list only ever changes locally: inserting a spanner into the
//! middle of a run splits its set, and removing a spanner between two sets
//! merges them.

use flowbox_style::ComputedStyle;
use flowbox_tree::NodeId;

use crate::multicol::column_set::ColumnSetState;
use crate::tree::{BoxKind, LayoutTree, anonymous_style};

/// Used column metrics of a flow thread, written by multicol layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowThreadState {
    /// Used column count.
    pub column_count: u32,
    /// Used column width.
    pub column_inline_size: f32,
    /// Used column gap.
    pub column_gap: f32,
    /// Every column set got a known column height in the last layout.
    pub all_columns_have_known_height: bool,
    /// Set while the thread is being torn down: removal notifications are
    /// ignored.
    pub being_evacuated: bool,
}

/// What [`LayoutTree::descendant_style_will_change`] learned before the
/// style changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleChangeScope {
    toggle_spanners_if_needed: bool,
    could_contain_spanners: bool,
}

/// Position changes, and gaining or losing the ability to contain fixed
/// position descendants, can move out-of-flow descendants in or out of the
/// thread.
fn needs_to_reinsert_into_flow_thread(old_style: &ComputedStyle, new_style: &ComputedStyle) -> bool {
    old_style.can_contain_fixed_position_objects() != new_style.can_contain_fixed_position_objects()
        || old_style.position != new_style.position
}

fn needs_to_remove_from_flow_thread(old_style: &ComputedStyle, new_style: &ComputedStyle) -> bool {
    (new_style.is_out_of_flow_positioned() && !old_style.is_out_of_flow_positioned())
        || (new_style.is_display_none() && !old_style.is_display_none())
        || needs_to_reinsert_into_flow_thread(old_style, new_style)
}

impl LayoutTree {
    fn flow_thread_state_mut(&mut self, thread: NodeId) -> Option<&mut FlowThreadState> {
        match &mut self[thread].kind {
            BoxKind::FlowThread(state) => Some(state),
            _ => None,
        }
    }

    fn is_being_evacuated(&self, thread: NodeId) -> bool {
        matches!(&self[thread].kind, BoxKind::FlowThread(state) if state.being_evacuated)
    }

    /// The multicol container of a flow thread.
    #[must_use]
    pub fn multicol_container(&self, thread: NodeId) -> Option<NodeId> {
        self.parent(thread)
    }

    /// The first column box (set or placeholder) of `thread`.
    #[must_use]
    pub fn first_multi_column_box(&self, thread: NodeId) -> Option<NodeId> {
        self.boxes()
            .next_sibling(thread)
            .filter(|&sibling| self.is_column_box(sibling))
    }

    /// The last column box (set or placeholder) of `thread`.
    #[must_use]
    pub fn last_multi_column_box(&self, thread: NodeId) -> Option<NodeId> {
        let container = self.multicol_container(thread)?;
        self.boxes()
            .last_child(container)
            .filter(|&last| self.is_column_box(last))
    }

    /// The column boxes of a multicol container spelled out: `c` for a
    /// column set, `s` for a spanner placeholder.
    #[must_use]
    pub fn column_box_signature(&self, container: NodeId) -> String {
        let Some(thread) = self[container].flow_thread else {
            return String::new();
        };
        self.boxes()
            .following_siblings(thread)
            .filter_map(|sibling| match self[sibling].kind {
                BoxKind::ColumnSet(_) => Some('c'),
                BoxKind::SpannerPlaceholder { .. } => Some('s'),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Creation and destruction of the flow thread
    // ------------------------------------------------------------------

    /// Only plain block containers become multicol containers.
    fn allows_columns(&self, id: NodeId) -> bool {
        matches!(self[id].kind, BoxKind::Block) && self.is_block_flow(id)
    }

    /// [Multicol § 2](https://www.w3.org/TR/css-multicol-1/#the-multi-column-model)
    ///
    /// Give `id` a flow thread when it starts specifying columns, or take
    /// it away when it stops. `old_style` is `None` for a new box.
    pub fn create_or_destroy_multicol_if_needed(&mut self, id: NodeId, old_style: Option<&ComputedStyle>) {
        let specifies_columns = self[id].style.specifies_columns();
        if let Some(thread) = self[id].flow_thread {
            let toggled = old_style.is_some_and(|old| old.specifies_columns() != specifies_columns);
            if toggled || !self.allows_columns(id) {
                self.evacuate_and_destroy(thread);
            } else {
                let style = anonymous_style(&self[id].style);
                self[thread].style = style;
            }
        }
        if !specifies_columns || self[id].flow_thread.is_some() || !self.allows_columns(id) {
            return;
        }

        let style = anonymous_style(&self[id].style);
        let thread = self.create_child_box(BoxKind::FlowThread(FlowThreadState::default()), style);
        self.boxes_mut().append_child(id, thread);
        tracing::debug!(container = self[id].debug_name(), "creating flow thread");
        self.populate(thread);
        self[id].flow_thread = Some(thread);
        self.mark_needs_layout(thread);
    }

    /// Move the container's existing content into its new flow thread. Each
    /// child leaves the container (and whatever outer flow thread it was
    /// in) and enters the thread as if freshly inserted.
    fn populate(&mut self, thread: NodeId) {
        let Some(container) = self.multicol_container(thread) else {
            return;
        };
        debug_assert!(self.boxes().next_sibling(thread).is_none());

        if self[container].has_inline_content() {
            // Lines and the floats among them stay together in one block.
            let wrapper = self.create_child_box(BoxKind::AnonymousBlock, anonymous_style(&self[container].style));
            let lines = std::mem::take(&mut self[container].lines);
            self[wrapper].lines = lines;
            let children: Vec<NodeId> = self
                .children(container)
                .iter()
                .copied()
                .filter(|&child| child != thread)
                .collect();
            for child in children {
                self.descendant_will_be_removed(child);
                self.boxes_mut().detach(child);
                self.boxes_mut().append_child(wrapper, child);
            }
            self.boxes_mut().append_child(thread, wrapper);
            self.descendant_inserted(wrapper);
            return;
        }

        while let Some(child) = self.boxes().first_child(container).filter(|&child| child != thread) {
            self.descendant_will_be_removed(child);
            self.boxes_mut().detach(child);
            self.boxes_mut().append_child(thread, child);
            self.descendant_inserted(child);
        }
    }

    /// Tear down the flow thread: destroy the column boxes and give the
    /// content back to the container.
    fn evacuate_and_destroy(&mut self, thread: NodeId) {
        let Some(container) = self.multicol_container(thread) else {
            return;
        };
        tracing::debug!(container = self[container].debug_name(), "destroying flow thread");
        if let Some(state) = self.flow_thread_state_mut(thread) {
            state.being_evacuated = true;
        }

        while let Some(column_box) = self.first_multi_column_box(thread) {
            self.detach_spanner_of(column_box);
            let _ = self.boxes_mut().destroy(column_box);
        }

        self[container].flow_thread = None;
        let children = self.children(thread).to_vec();
        self.boxes_mut().move_children(thread, container);
        let _ = self.boxes_mut().destroy(thread);
        for child in children {
            // The content may now belong to an outer flow thread.
            self.descendant_inserted(child);
        }
        self.mark_needs_layout(container);
    }

    // ------------------------------------------------------------------
    // Tree walks that stay on this thread's content
    // ------------------------------------------------------------------

    /// `id` is hidden, or inside a hidden box, below `thread`.
    fn is_in_display_none_subtree(&self, id: NodeId, thread: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.boxes().ancestors(id))
            .take_while(|&node| node != thread)
            .any(|node| self[node].style.is_display_none())
    }

    /// Out-of-flow boxes whose containing block is outside `thread` are not
    /// part of it.
    fn is_out_of_flow_outside(&self, thread: NodeId, id: NodeId) -> bool {
        self[id].style.is_out_of_flow_positioned()
            && self
                .containing_block(id)
                .and_then(|block| self.flow_thread_containing_block(block))
                != Some(thread)
    }

    /// The next box after `descendant`'s subtree that is part of `thread`'s
    /// content.
    #[must_use]
    pub fn next_in_pre_order_after_children_skipping_out_of_flow(
        &self,
        thread: NodeId,
        descendant: NodeId,
    ) -> Option<NodeId> {
        debug_assert!(self.boxes().is_descendant_of(descendant, thread));
        let mut object = self
            .boxes()
            .next_in_pre_order_after_children(descendant, Some(thread));
        while let Some(candidate) = object {
            if !self.is_out_of_flow_outside(thread, candidate)
                && !self.is_in_display_none_subtree(candidate, thread)
            {
                break;
            }
            object = self
                .boxes()
                .next_in_pre_order_after_children(candidate, Some(thread));
        }
        object
    }

    /// The box before `descendant` in tree order that is part of `thread`'s
    /// content, stepping over the content of nested multicol containers.
    #[must_use]
    pub fn previous_in_pre_order_skipping_out_of_flow(
        &self,
        thread: NodeId,
        descendant: NodeId,
    ) -> Option<NodeId> {
        debug_assert!(self.boxes().is_descendant_of(descendant, thread));
        let mut object = self.boxes().previous_in_pre_order(descendant, Some(thread));
        'search: while let Some(candidate) = object {
            let spanner_placeholder = self[candidate]
                .spanner_placeholder
                .filter(|_| self[candidate].style.is_column_span_all());
            if let Some(placeholder) = spanner_placeholder {
                let placeholder_thread = self.flow_thread_of_column_box(placeholder)?;
                if placeholder_thread == thread {
                    return Some(candidate);
                }
                // A spanner of a nested multicol container: continue
                // from that container.
                object = self.multicol_container(placeholder_thread);
                continue;
            }
            if self.is_in_display_none_subtree(candidate, thread) {
                object = self.boxes().previous_in_pre_order(candidate, Some(thread));
                continue;
            }
            if self.flow_thread_containing_block(candidate) == Some(thread) {
                for ancestor in self.boxes().ancestors(candidate) {
                    if ancestor == thread {
                        return Some(candidate);
                    }
                    if self.is_multicol_container(ancestor) {
                        object = Some(ancestor);
                        continue 'search;
                    }
                }
                return None;
            }
            // Inside something out of flow.
            object = self.boxes().previous_in_pre_order(candidate, Some(thread));
        }
        None
    }

    // ------------------------------------------------------------------
    // Spanners
    // ------------------------------------------------------------------

    /// Nothing about `object` prevents it from sitting between a spanner
    /// and the multicol container: it is a block container in the
    /// container's formatting context that can break.
    #[must_use]
    pub fn can_contain_spanner_in_parent_fragmentation_context(&self, object: NodeId) -> bool {
        self.is_block_flow(object)
            && !self.creates_new_formatting_context(object)
            && !self[object].style.can_contain_fixed_position_objects()
            && !self.is_monolithic(object)
            && !self.is_multicol_container(object)
    }

    /// Whether the thread has a placeholder, or more than one column box.
    #[must_use]
    pub fn has_any_column_spanners(&self, thread: NodeId) -> bool {
        self.first_multi_column_box(thread).is_some_and(|first| {
            Some(first) != self.last_multi_column_box(thread) || self.is_spanner_placeholder(first)
        })
    }

    /// The placeholder of the spanner that `descendant` is or is inside.
    #[must_use]
    pub fn containing_column_spanner_placeholder(&self, thread: NodeId, descendant: NodeId) -> Option<NodeId> {
        if !self.has_any_column_spanners(thread) {
            return None;
        }
        std::iter::once(descendant)
            .chain(self.boxes().ancestors(descendant))
            .take_while(|&ancestor| ancestor != thread)
            .find_map(|ancestor| self[ancestor].spanner_placeholder)
    }

    /// [Multicol § 6.1](https://www.w3.org/TR/css-multicol-1/#column-span)
    ///
    /// `column-span: all`: "The element spans across all columns of the
    /// nearest multicol ancestor in the same block formatting context."
    /// Only in-flow block-level boxes qualify, and only when every box
    /// between them and the thread could contain a spanner.
    #[must_use]
    pub fn descendant_is_valid_column_spanner(&self, thread: NodeId, descendant: NodeId) -> bool {
        let style = &self[descendant].style;
        if !style.is_column_span_all()
            || !matches!(self[descendant].kind, BoxKind::Block | BoxKind::Replaced { .. })
            || self.is_atomic_inline(descendant)
            || style.is_floating_or_out_of_flow_positioned()
            || self.is_in_display_none_subtree(descendant, thread)
        {
            return false;
        }
        if !self
            .containing_block(descendant)
            .is_some_and(|block| self.is_block_flow(block))
        {
            return false;
        }

        let mut ancestor = self.parent(descendant);
        while let Some(current) = ancestor {
            if self.is_flow_thread(current) {
                debug_assert_eq!(current, thread);
                return current == thread;
            }
            if !self.can_contain_spanner_in_parent_fragmentation_context(current) {
                return false;
            }
            ancestor = self.containing_block(current);
        }
        false
    }

    /// Boxes that never create column boxes in `thread`.
    fn should_skip_inserted_or_removed_child(&self, thread: NodeId, child: NodeId) -> bool {
        self.is_flow_thread(child)
            || self.is_column_box(child)
            || self.is_out_of_flow_outside(thread, child)
            || self.is_in_display_none_subtree(child, thread)
    }

    fn create_and_insert_multi_column_set(&mut self, thread: NodeId, insert_before: Option<NodeId>) {
        let Some(container) = self.multicol_container(thread) else {
            return;
        };
        let style = anonymous_style(&self[container].style);
        let set = self.create_child_box(BoxKind::ColumnSet(ColumnSetState::default()), style);
        self.boxes_mut().insert_before(container, set, insert_before);
        tracing::debug!(container = self[container].debug_name(), "column set created");

        debug_assert!(
            !self
                .previous_sibling_multi_column_box(set)
                .is_some_and(|sibling| self.is_column_set(sibling)),
            "adjacent column sets"
        );
        debug_assert!(
            !self
                .next_sibling_multi_column_box(set)
                .is_some_and(|sibling| self.is_column_set(sibling)),
            "adjacent column sets"
        );
        self.mark_needs_layout(container);
    }

    /// Give `spanner` a placeholder among the column boxes, positioned for
    /// content that continues with `inserted_before` (the end of the thread
    /// when `None`). Landing in the middle of a run splits its set.
    fn create_and_insert_spanner_placeholder(
        &mut self,
        thread: NodeId,
        spanner: NodeId,
        inserted_before: Option<NodeId>,
    ) {
        let Some(container) = self.multicol_container(thread) else {
            return;
        };
        let mut insert_before_column_box = None;
        let mut split = false;

        if let Some(next) = inserted_before {
            insert_before_column_box = self[next].spanner_placeholder;
            if insert_before_column_box.is_none() {
                let previous = self.previous_in_pre_order_skipping_out_of_flow(thread, spanner);
                match previous {
                    None => insert_before_column_box = self.first_multi_column_box(thread),
                    Some(previous) => {
                        if let Some(previous_placeholder) =
                            self.containing_column_spanner_placeholder(thread, previous)
                        {
                            insert_before_column_box =
                                self.next_sibling_multi_column_box(previous_placeholder);
                        } else if let Some(set) = self.map_descendant_to_column_set(thread, previous) {
                            // In the middle of a run of content.
                            debug_assert_eq!(Some(set), self.map_descendant_to_column_set(thread, next));
                            insert_before_column_box = self.next_sibling_multi_column_box(set);
                            split = true;
                        } else {
                            tracing::warn!(
                                spanner = self[spanner].debug_name(),
                                "content before spanner has no column set"
                            );
                        }
                    }
                }
            }
        }

        let style = anonymous_style(&self[container].style);
        let placeholder = self.create_child_box(BoxKind::SpannerPlaceholder { spanner }, style);
        self.boxes_mut()
            .insert_before(container, placeholder, insert_before_column_box);
        self[spanner].spanner_placeholder = Some(placeholder);
        tracing::debug!(spanner = self[spanner].debug_name(), split, "spanner placeholder created");

        if split {
            self.create_and_insert_multi_column_set(thread, insert_before_column_box);
        }
        self.mark_needs_layout(container);
    }

    /// Destroy a placeholder, merging the sets on either side of it.
    fn destroy_spanner_placeholder(&mut self, placeholder: NodeId) {
        if let Some(next) = self.next_sibling_multi_column_box(placeholder) {
            let previous = self.previous_sibling_multi_column_box(placeholder);
            if self.is_column_set(next) && previous.is_some_and(|previous| self.is_column_set(previous)) {
                tracing::debug!("merging column sets");
                let _ = self.boxes_mut().destroy(next);
            }
        }
        self.detach_spanner_of(placeholder);
        if let Some(container) = self.parent(placeholder) {
            self.mark_needs_layout(container);
        }
        let _ = self.boxes_mut().destroy(placeholder);
    }

    /// Clear the back link from the spanner a placeholder stands in for.
    fn detach_spanner_of(&mut self, column_box: NodeId) {
        let BoxKind::SpannerPlaceholder { spanner } = self[column_box].kind else {
            return;
        };
        if self.contains(spanner) {
            self[spanner].spanner_placeholder = None;
        }
    }

    /// If `spanner` stopped being a valid spanner, turn it back into
    /// column content. Returns whether it did.
    fn remove_spanner_placeholder_if_no_longer_valid(&mut self, thread: NodeId, spanner: NodeId) -> bool {
        if self.descendant_is_valid_column_spanner(thread, spanner) {
            return false;
        }
        if let Some(placeholder) = self[spanner].spanner_placeholder {
            self.destroy_spanner_placeholder(placeholder);
        }
        if let Some(block) = self.containing_block(spanner) {
            self.mark_needs_layout(block);
        }
        self.flow_thread_descendant_was_inserted(thread, spanner);
        true
    }

    // ------------------------------------------------------------------
    // Mutation notifications
    // ------------------------------------------------------------------

    /// Keep column boxes in sync after a subtree was inserted below
    /// `thread`: spanners get placeholders, content gets a column set.
    fn flow_thread_descendant_was_inserted(&mut self, thread: NodeId, descendant: NodeId) {
        debug_assert!(!self.is_being_evacuated(thread));
        if self.should_skip_inserted_or_removed_child(thread, descendant) {
            return;
        }
        let object_after_subtree = self.next_in_pre_order_after_children_skipping_out_of_flow(thread, descendant);

        let mut next = Some(descendant);
        while let Some(object) = next {
            if object != descendant && self.should_skip_inserted_or_removed_child(thread, object) {
                next = self
                    .boxes()
                    .next_in_pre_order_after_children(object, Some(descendant));
                continue;
            }
            next = self.boxes().next_in_pre_order(object, Some(descendant));

            if self.containing_column_spanner_placeholder(thread, object).is_some() {
                continue;
            }
            if self.descendant_is_valid_column_spanner(thread, object) {
                self.create_and_insert_spanner_placeholder(thread, object, object_after_subtree);
                continue;
            }

            // Ordinary column content needs a set.
            match object_after_subtree {
                Some(after) => {
                    if let Some(placeholder) = self[after].spanner_placeholder {
                        let previous = self.previous_sibling_multi_column_box(placeholder);
                        if !previous.is_some_and(|previous| self.is_column_set(previous)) {
                            self.create_and_insert_multi_column_set(thread, Some(placeholder));
                        }
                    } else {
                        // The content after us already has a set; it is ours too.
                        debug_assert!(self.map_descendant_to_column_set(thread, after).is_some());
                    }
                }
                None => {
                    let last = self.last_multi_column_box(thread);
                    if !last.is_some_and(|last| self.is_column_set(last)) {
                        self.create_and_insert_multi_column_set(thread, None);
                    }
                }
            }
        }
    }

    /// Keep column boxes in sync before a subtree below `thread` is
    /// removed: placeholders inside it go away, and a set left without
    /// content is destroyed.
    fn flow_thread_descendant_will_be_removed(&mut self, thread: NodeId, descendant: NodeId) {
        if self.is_being_evacuated(thread) || self.should_skip_inserted_or_removed_child(thread, descendant) {
            return;
        }
        let had_containing_placeholder = self
            .containing_column_spanner_placeholder(thread, descendant)
            .is_some();
        let mut processed_something = false;

        let mut next = Some(descendant);
        while let Some(object) = next {
            if object != descendant && self.should_skip_inserted_or_removed_child(thread, object) {
                next = self
                    .boxes()
                    .next_in_pre_order_after_children(object, Some(descendant));
                continue;
            }
            processed_something = true;
            let Some(placeholder) = self[object].spanner_placeholder else {
                next = self.boxes().next_in_pre_order(object, Some(descendant));
                continue;
            };
            // A spanner: its content is of no interest.
            next = self
                .boxes()
                .next_in_pre_order_after_children(object, Some(descendant));
            self.destroy_spanner_placeholder(placeholder);
        }
        if had_containing_placeholder || !processed_something {
            return;
        }

        // STEP 1: Still preceded or followed by content in the same run?
        let mut adjacent_previous_placeholder = None;
        if let Some(previous) = self.previous_in_pre_order_skipping_out_of_flow(thread, descendant) {
            match self.containing_column_spanner_placeholder(thread, previous) {
                Some(placeholder) => adjacent_previous_placeholder = Some(placeholder),
                None => return,
            }
        }
        let mut adjacent_next_placeholder = None;
        if let Some(next) = self.next_in_pre_order_after_children_skipping_out_of_flow(thread, descendant) {
            match self.containing_column_spanner_placeholder(thread, next) {
                Some(placeholder) => adjacent_next_placeholder = Some(placeholder),
                None => return,
            }
        }

        // STEP 2: The run becomes empty. Find its set from the placeholders
        // around it.
        let column_set_to_remove = if let Some(placeholder) = adjacent_next_placeholder {
            let set = self.previous_sibling_multi_column_box(placeholder);
            debug_assert!(
                adjacent_previous_placeholder.is_none()
                    || set == adjacent_previous_placeholder
                        .and_then(|previous| self.next_sibling_multi_column_box(previous))
            );
            set
        } else if let Some(placeholder) = adjacent_previous_placeholder {
            self.next_sibling_multi_column_box(placeholder)
        } else {
            // Without spanners there is a single set.
            let first = self.first_multi_column_box(thread);
            debug_assert!(first.is_some_and(|first| self.next_sibling_multi_column_box(first).is_none()));
            first
        };

        let Some(set) = column_set_to_remove.filter(|&set| self.is_column_set(set)) else {
            debug_assert!(false, "emptied run has no column set");
            return;
        };
        tracing::debug!("column set destroyed");
        if let Some(container) = self.parent(set) {
            self.mark_needs_layout(container);
        }
        let _ = self.boxes_mut().destroy(set);
    }

    /// The flow thread that reports about `id`.
    fn flow_thread_for_mutation(&self, id: NodeId) -> Option<NodeId> {
        self.flow_thread_containing_block(id).filter(|&thread| thread != id)
    }

    /// Report a freshly inserted subtree to its flow thread.
    pub fn descendant_inserted(&mut self, descendant: NodeId) {
        if let Some(thread) = self.flow_thread_for_mutation(descendant) {
            self.flow_thread_descendant_was_inserted(thread, descendant);
        }
    }

    /// Report a subtree about to be removed to its flow thread.
    pub fn descendant_will_be_removed(&mut self, descendant: NodeId) {
        // A spanner is outside its thread's containing block chain; its
        // parent is not.
        let thread = if self[descendant].spanner_placeholder.is_some() {
            self.parent(descendant)
                .and_then(|parent| self.flow_thread_containing_block(parent))
        } else {
            self.flow_thread_for_mutation(descendant)
        };
        if let Some(thread) = thread.filter(|&thread| thread != descendant) {
            self.flow_thread_descendant_will_be_removed(thread, descendant);
        }
    }

    /// Called with the style `descendant` is about to get. Content going
    /// out of flow (or hidden) is removed from the thread now; otherwise
    /// whether it could contain spanners is remembered in the returned
    /// scope.
    pub fn descendant_style_will_change(&mut self, descendant: NodeId, new_style: &ComputedStyle) -> StyleChangeScope {
        let Some(thread) = self.flow_thread_for_mutation(descendant) else {
            return StyleChangeScope::default();
        };
        if needs_to_remove_from_flow_thread(&self[descendant].style, new_style) {
            self.flow_thread_descendant_will_be_removed(thread, descendant);
            return StyleChangeScope::default();
        }
        StyleChangeScope {
            toggle_spanners_if_needed: true,
            could_contain_spanners: self.can_contain_spanner_in_parent_fragmentation_context(descendant),
        }
    }

    /// Called once `descendant` has its new style.
    pub fn descendant_style_did_change(
        &mut self,
        descendant: NodeId,
        scope: StyleChangeScope,
        old_style: &ComputedStyle,
    ) {
        let Some(thread) = self.flow_thread_for_mutation(descendant) else {
            return;
        };
        if self.needs_to_insert_into_flow_thread(thread, descendant, old_style) {
            self.flow_thread_descendant_was_inserted(thread, descendant);
            return;
        }
        if self.descendant_is_valid_column_spanner(thread, descendant) {
            // Column content became a spanner. Nested spanners inside it
            // stop being spanners.
            debug_assert!(self[descendant].spanner_placeholder.is_none());
            self.flow_thread_descendant_will_be_removed(thread, descendant);
            let after = self.next_in_pre_order_after_children_skipping_out_of_flow(thread, descendant);
            self.create_and_insert_spanner_placeholder(thread, descendant, after);
            return;
        }
        if !scope.toggle_spanners_if_needed
            || scope.could_contain_spanners == self.can_contain_spanner_in_parent_fragmentation_context(descendant)
        {
            return;
        }
        self.toggle_spanners_in_subtree(thread, descendant, scope.could_contain_spanners);
    }

    fn needs_to_insert_into_flow_thread(&self, thread: NodeId, descendant: NodeId, old_style: &ComputedStyle) -> bool {
        let new_style = &self[descendant].style;
        if old_style.is_display_none() && !new_style.is_display_none() {
            return true;
        }
        if new_style.is_out_of_flow_positioned() != old_style.is_out_of_flow_positioned() {
            if !new_style.is_out_of_flow_positioned() {
                return true;
            }
            // Still contained by this thread: still column content.
            if self
                .containing_block(descendant)
                .and_then(|block| self.flow_thread_containing_block(block))
                == Some(thread)
            {
                return true;
            }
        }
        needs_to_reinsert_into_flow_thread(old_style, new_style)
    }

    /// Called after a spanner's style changed. A spanner is not in its
    /// thread's containing block chain, so this is its only notification.
    pub fn spanner_style_did_change(&mut self, spanner: NodeId) {
        let Some(thread) = self[spanner]
            .spanner_placeholder
            .and_then(|placeholder| self.flow_thread_of_column_box(placeholder))
        else {
            return;
        };
        if self.remove_spanner_placeholder_if_no_longer_valid(thread, spanner) {
            tracing::debug!(box_name = self[spanner].debug_name(), "no longer a spanner");
        }
    }

    /// `descendant` gained or lost the ability to contain spanners: turn
    /// candidates below it into spanners, or spanners back into content.
    fn toggle_spanners_in_subtree(&mut self, thread: NodeId, descendant: NodeId, could_contain_spanners: bool) {
        if could_contain_spanners && !self.has_any_column_spanners(thread) {
            return;
        }

        let mut object = self.boxes().next_in_pre_order(descendant, Some(descendant));
        while let Some(current) = object {
            let mut walk_children = false;
            if could_contain_spanners {
                if let Some(placeholder) = self[current].spanner_placeholder {
                    self.destroy_spanner_placeholder(placeholder);
                    object = self
                        .boxes()
                        .next_in_pre_order_after_children(current, Some(descendant));
                    continue;
                }
                walk_children = self.can_contain_spanner_in_parent_fragmentation_context(current);
            } else if !self.descendant_is_valid_column_spanner(thread, current) {
                walk_children = self.can_contain_spanner_in_parent_fragmentation_context(current);
            } else if self[current].spanner_placeholder.is_none() {
                let after = self.next_in_pre_order_after_children_skipping_out_of_flow(thread, current);
                self.create_and_insert_spanner_placeholder(thread, current, after);
            }
            object = if walk_children {
                self.boxes().next_in_pre_order(current, Some(descendant))
            } else {
                self.boxes()
                    .next_in_pre_order_after_children(current, Some(descendant))
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbox_style::ColumnSpan;

    fn multicol_tree() -> (LayoutTree, NodeId) {
        let mut tree = LayoutTree::new(ComputedStyle::default());
        let root = tree.root();
        let style = ComputedStyle {
            column_count: Some(2),
            ..ComputedStyle::default()
        };
        let container = tree.create_child_box(BoxKind::Block, style);
        tree.add_child(root, container, None);
        (tree, container)
    }

    fn add(tree: &mut LayoutTree, parent: NodeId, spanner: bool) -> NodeId {
        let style = ComputedStyle {
            column_span: if spanner { ColumnSpan::All } else { ColumnSpan::None },
            ..ComputedStyle::default()
        };
        let child = tree.create_child_box(BoxKind::Block, style);
        tree.add_child(parent, child, None);
        child
    }

    #[test]
    fn test_empty_container_has_no_column_boxes() {
        let (tree, container) = multicol_tree();
        assert!(tree.is_multicol_container(container));
        assert_eq!(tree.column_box_signature(container), "");
    }

    #[test]
    fn test_content_after_spanner_gets_new_set() {
        let (mut tree, container) = multicol_tree();
        let _ = add(&mut tree, container, false);
        let _ = add(&mut tree, container, true);
        let _ = add(&mut tree, container, false);
        assert_eq!(tree.column_box_signature(container), "csc");
    }

    #[test]
    fn test_removing_spanner_merges_sets() {
        let (mut tree, container) = multicol_tree();
        let _ = add(&mut tree, container, false);
        let spanner = add(&mut tree, container, true);
        let _ = add(&mut tree, container, false);
        tree.remove_child(spanner);
        assert_eq!(tree.column_box_signature(container), "c");
    }

    #[test]
    fn test_spanner_inside_formatting_context_is_content() {
        let (mut tree, container) = multicol_tree();
        let style = ComputedStyle {
            display: flowbox_style::Display::FlowRoot,
            ..ComputedStyle::default()
        };
        let wrapper = tree.create_child_box(BoxKind::Block, style);
        tree.add_child(container, wrapper, None);
        let spanner = add(&mut tree, wrapper, true);
        assert!(tree[spanner].spanner_placeholder.is_none());
        assert_eq!(tree.column_box_signature(container), "c");
    }
}
