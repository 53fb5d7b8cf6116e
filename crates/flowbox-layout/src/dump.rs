//! Placed geometry, in physical coordinates, for painting.
//!
//! [CSS Writing Modes § 6.3](https://www.w3.org/TR/css-writing-modes-4/#logical-direction-layout)
//!
//! Layout results live on the tree in flow-relative coordinates, each
//! relative to its layout parent. A [`LayoutDump`] resolves all of that to
//! absolute physical rectangles:
//!
//! - Content of a flow thread is shown in the column that holds its
//!   block-start edge (lines and floats are mapped one by one).
//! - Column spanners appear where their placeholder sits among the column
//!   sets, not inside the flow thread.
//! - The flow thread itself is not a painted box and is left out.

use flowbox_style::{Direction, WritingMode};
use flowbox_tree::NodeId;
use serde::Serialize;

use crate::LayoutOptions;
use crate::box_model::{LogicalOffset, LogicalRect, Rect, to_physical};
use crate::fragmentation::PageBoundaryRule;
use crate::tree::{BoxKind, LayoutTree};

/// The placed tree, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDump {
    /// The root box.
    pub root: BoxDump,
}

/// One placed box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxDump {
    /// Scene name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Box kind label.
    pub kind: &'static str,
    /// Border box.
    pub rect: Rect,
    /// Space inserted before the box to reach a later fragmentainer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_strut: Option<f32>,
    /// Line boxes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Rect>,
    /// Floats this box paints, in placement order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floats: Vec<FloatDump>,
    /// Columns of a column set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Rect>,
    /// Child boxes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BoxDump>,
}

/// A float as its container's registry placed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatDump {
    /// Name of the floating box.
    pub name: String,
    /// `line-left` or `line-right`.
    pub side: String,
    /// Margin box.
    pub rect: Rect,
}

impl LayoutDump {
    /// Collect the geometry of a laid-out tree. The root is placed against
    /// a canvas the size of the viewport.
    #[must_use]
    pub fn new(tree: &LayoutTree, options: &LayoutOptions) -> Self {
        let root = tree.root();
        let canvas = Space {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: options.viewport_width,
                height: options.viewport_height,
            },
            writing_mode: tree[root].writing_mode(),
        };
        let placement = Placement {
            space: canvas,
            thread: None,
        };
        Self {
            root: Dumper { tree }.dump_box(root, &placement),
        }
    }

    /// Find a box by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BoxDump> {
        self.root.find(name)
    }
}

impl BoxDump {
    /// Find a box by name in this subtree.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Self> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// A physical box whose flow-relative coordinates are known.
#[derive(Debug, Clone, Copy)]
struct Space {
    rect: Rect,
    writing_mode: WritingMode,
}

impl Space {
    fn place(&self, logical: LogicalRect) -> Rect {
        to_physical(logical, self.writing_mode, self.rect.width)
            .translated(self.rect.x, self.rect.y)
    }
}

/// Content of a flow thread, shown through its multicol container.
#[derive(Debug, Clone, Copy)]
struct ThreadSpace {
    thread: NodeId,
    /// The box's border-box origin in flow thread coordinates.
    origin: LogicalOffset,
    container: Space,
}

/// How to turn a box's own coordinates into physical ones.
#[derive(Debug, Clone, Copy)]
struct Placement {
    space: Space,
    thread: Option<ThreadSpace>,
}

impl Placement {
    fn map(&self, tree: &LayoutTree, logical: LogicalRect) -> Rect {
        let Some(thread) = self.thread else {
            return self.space.place(logical);
        };
        let in_thread = logical.translated(thread.origin);
        let translation = tree.flow_thread_translation_at_offset(
            thread.thread,
            in_thread.block_offset,
            PageBoundaryRule::AssociateWithLatterPage,
        );
        thread.container.place(in_thread.translated(translation))
    }
}

struct Dumper<'a> {
    tree: &'a LayoutTree,
}

impl Dumper<'_> {
    /// Dump `id`, whose frame is mapped by `parent`.
    fn dump_box(&self, id: NodeId, parent: &Placement) -> BoxDump {
        let layout_box = &self.tree[id];
        let rect = parent.map(self.tree, layout_box.frame);
        let own_space = Space {
            rect,
            writing_mode: layout_box.writing_mode(),
        };
        let thread = parent
            .thread
            .filter(|_| !self.tree.is_writing_mode_root(id))
            .map(|thread| ThreadSpace {
                origin: thread.origin + layout_box.frame.offset(),
                ..thread
            });
        let placement = Placement {
            space: own_space,
            thread,
        };

        let lines = layout_box
            .lines
            .iter()
            .map(|line| placement.map(self.tree, line.rect))
            .collect();
        let floats = layout_box
            .floats
            .placed()
            .filter(|record| record.should_paint)
            .map(|record| FloatDump {
                name: self.tree[record.node].debug_name().to_owned(),
                side: record.side.to_string(),
                rect: placement.map(self.tree, record.rect),
            })
            .collect();

        let mut children = Vec::new();
        for &child in self.tree.children(id) {
            let child_box = &self.tree[child];
            if child_box.style.is_display_none() || child_box.spanner_placeholder.is_some() {
                continue;
            }
            match child_box.kind {
                BoxKind::FlowThread(_) => {
                    let thread_placement = Placement {
                        space: own_space,
                        thread: Some(ThreadSpace {
                            thread: child,
                            origin: LogicalOffset::default(),
                            container: own_space,
                        }),
                    };
                    for &content in self.tree.children(child) {
                        let content_box = &self.tree[content];
                        if content_box.style.is_display_none() || content_box.spanner_placeholder.is_some() {
                            continue;
                        }
                        children.push(self.dump_box(content, &thread_placement));
                    }
                }
                BoxKind::SpannerPlaceholder { spanner } => {
                    children.push(self.dump_box(spanner, &placement));
                }
                _ => children.push(self.dump_box(child, &placement)),
            }
        }

        BoxDump {
            name: layout_box.name.clone(),
            kind: layout_box.kind.label(),
            rect,
            pagination_strut: Some(layout_box.pagination_strut).filter(|&strut| strut > 0.0),
            lines,
            floats,
            columns: self.columns(id, parent),
            children,
        }
    }

    /// Column rectangles of a column set.
    fn columns(&self, id: NodeId, parent: &Placement) -> Vec<Rect> {
        let layout_box = &self.tree[id];
        let BoxKind::ColumnSet(state) = &layout_box.kind else {
            return Vec::new();
        };
        let frame = layout_box.frame;
        let direction = self
            .tree
            .parent(id)
            .map_or(Direction::Ltr, |container| self.tree[container].style.direction);
        let block_size = state.column_block_size.unwrap_or(frame.block_size);
        (0..state.actual_column_count())
            .map(|index| {
                let advance = index as f32 * (state.column_inline_size + state.column_gap);
                let inline_offset = match direction {
                    Direction::Ltr => frame.inline_offset + advance,
                    Direction::Rtl => frame.inline_end() - state.column_inline_size - advance,
                };
                let column = LogicalRect::new(inline_offset, frame.block_offset, state.column_inline_size, block_size);
                parent.map(self.tree, column)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_tree;
    use crate::scene::Scene;

    fn dump(json: &str) -> LayoutDump {
        let scene = Scene::from_json(json).unwrap();
        let mut tree = scene.build().unwrap();
        layout_tree(&mut tree, &scene.options);
        LayoutDump::new(&tree, &scene.options)
    }

    #[test]
    fn test_nested_boxes_get_absolute_rects() {
        let dump = dump(
            r#"{ "root": { "style": { "padding": 10 }, "children": [
                { "id": "outer", "style": { "margin": 5, "padding": 3 }, "children": [
                    { "id": "inner", "style": { "height": 20 } }
                ] }
            ] } }"#,
        );
        let inner = dump.find("inner").unwrap();
        assert_eq!(inner.rect.x, 18.0);
        assert_eq!(inner.rect.y, 18.0);
        assert_eq!(inner.rect.height, 20.0);
    }

    #[test]
    fn test_vertical_rl_root_fills_from_the_right() {
        let dump = dump(
            r#"{ "options": { "viewport-width": 300, "viewport-height": 200 },
                 "root": { "style": { "writing-mode": "vertical-rl" }, "children": [
                    { "id": "a", "style": { "width": 40 } }
                 ] } }"#,
        );
        let a = dump.find("a").unwrap();
        assert_eq!(a.rect.x, 260.0);
        assert_eq!(a.rect.width, 40.0);
        assert_eq!(a.rect.height, 200.0);
    }

    #[test]
    fn test_flow_thread_content_lands_in_its_column() {
        let dump = dump(
            r#"{ "options": { "viewport-width": 420 },
                 "root": { "children": [
                    { "id": "mc", "style": { "column-count": 2, "column-gap": 20 }, "children": [
                        { "id": "a", "style": { "height": 100 } },
                        { "id": "b", "style": { "height": 100 } }
                    ] }
                 ] } }"#,
        );
        let a = dump.find("a").unwrap();
        let b = dump.find("b").unwrap();
        assert_eq!(a.rect, Rect { x: 0.0, y: 0.0, width: 200.0, height: 100.0 });
        assert_eq!(b.rect, Rect { x: 220.0, y: 0.0, width: 200.0, height: 100.0 });
        let set = dump.find("mc").unwrap().children.iter().find(|child| child.kind == "column-set").unwrap();
        assert_eq!(set.columns.len(), 2);
    }
}
