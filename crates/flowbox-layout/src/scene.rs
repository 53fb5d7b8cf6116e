//! Scene files: a box tree described in JSON.
//!
//! A scene stands in for the tree builder. It lists boxes with their
//! computed styles, pre-measured lines and replaced sizes, plus an optional
//! list of mutations to apply after the first layout. Every box goes into
//! the tree through [`LayoutTree::add_child`], [`LayoutTree::remove_child`]
//! and [`LayoutTree::set_style`], so multicol bookkeeping sees the same
//! notifications it would see from a document.
//!
//! ```json
//! {
//!   "options": { "viewport-width": 400, "page-block-size": 500 },
//!   "root": {
//!     "children": [
//!       { "id": "a", "style": { "margin": 10 }, "lines": [20, 20] },
//!       { "id": "b", "style": { "float": "left", "width": 100, "height": 50 } }
//!     ]
//!   },
//!   "mutations": [{ "op": "remove", "target": "a" }]
//! }
//! ```

use std::collections::HashSet;

use flowbox_style::{ComputedStyle, Direction, WritingMode};
use flowbox_tree::NodeId;
use serde::Deserialize;
use thiserror::Error;

use crate::LayoutOptions;
use crate::lines::LineBox;
use crate::tree::{BoxKind, LayoutTree};

/// Why a scene could not be turned into a tree.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The file is not valid scene JSON.
    #[error("invalid scene: {0}")]
    Json(#[from] serde_json::Error),
    /// Two boxes share an id.
    #[error("duplicate box id '{0}'")]
    DuplicateId(String),
    /// A mutation names a box that does not exist.
    #[error("unknown box id '{0}'")]
    UnknownId(String),
    /// The reference box of an insertion is not a child of the parent.
    #[error("'{before}' is not a child of '{parent}'")]
    NotAChild {
        /// The parent the insertion targets.
        parent: String,
        /// The reference box.
        before: String,
    },
    /// Replaced content cannot hold boxes or lines.
    #[error("replaced box '{0}' cannot have content")]
    ReplacedWithContent(String),
    /// The root box stays.
    #[error("the root box cannot be removed")]
    RemoveRoot,
}

/// A whole scene file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scene {
    /// Layout options; the defaults when absent.
    #[serde(default)]
    pub options: LayoutOptions,
    /// The root box.
    pub root: SceneNode,
    /// Changes applied, in order, after the first layout.
    #[serde(default)]
    pub mutations: Vec<Mutation>,
}

/// One box and its content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SceneNode {
    /// Name used by mutations, dumps and tests.
    pub id: Option<String>,
    /// Computed style.
    pub style: SceneStyle,
    /// The box is `<body>`.
    pub body: bool,
    /// Intrinsic size, for replaced content.
    pub replaced: Option<ReplacedSize>,
    /// Pre-measured line boxes, for a container with inline content.
    pub lines: Vec<SceneLine>,
    /// Child boxes.
    pub children: Vec<SceneNode>,
}

/// A style as written in a scene.
///
/// [CSS Cascade § 7.2 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inheriting)
///
/// "Some properties are inherited properties, as defined in their property
/// definition table. This means that, unless the cascade results in a value,
/// the value will be determined by inheritance." Properties the scene leaves
/// out take the initial value, except inherited ones, which come from the
/// parent box.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct SceneStyle {
    computed: ComputedStyle,
    inherited: InheritedProperties,
}

/// The inherited properties a scene style sets explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct InheritedProperties {
    writing_mode: Option<WritingMode>,
    direction: Option<Direction>,
    orphans: Option<u32>,
    widows: Option<u32>,
}

impl TryFrom<serde_json::Value> for SceneStyle {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(Self {
            inherited: InheritedProperties::deserialize(&value)?,
            computed: serde_json::from_value(value)?,
        })
    }
}

impl SceneStyle {
    /// The computed style of a box whose parent has `parent` as its style.
    #[must_use]
    pub fn cascade(&self, parent: &ComputedStyle) -> ComputedStyle {
        let inherited = self.inherited;
        ComputedStyle {
            writing_mode: inherited.writing_mode.unwrap_or(parent.writing_mode),
            direction: inherited.direction.unwrap_or(parent.direction),
            orphans: inherited.orphans.unwrap_or(parent.orphans),
            widows: inherited.widows.unwrap_or(parent.widows),
            ..self.computed.clone()
        }
    }

    /// The style of the root box, which has nothing to inherit from.
    #[must_use]
    pub fn root(&self) -> ComputedStyle {
        self.computed.clone()
    }
}

/// Intrinsic size of replaced content, in physical pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReplacedSize {
    /// Intrinsic width.
    pub width: f32,
    /// Intrinsic height.
    pub height: f32,
}

/// A line box: its block size alone, or both sizes.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum SceneLine {
    /// A line of this block size with no measured inline extent.
    Height(f32),
    /// A line with both extents.
    Sized {
        /// Inline extent of the line's content.
        width: f32,
        /// Block size of the line.
        height: f32,
    },
}

impl SceneLine {
    fn to_line_box(self) -> LineBox {
        match self {
            Self::Height(height) => LineBox::new(0.0, height),
            Self::Sized { width, height } => LineBox::new(width, height),
        }
    }
}

/// A tree mutation, reported the way a tree builder would report it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Mutation {
    /// Insert a new subtree.
    Insert {
        /// Id of the new parent.
        parent: String,
        /// Id of the sibling to insert before; appended when absent.
        #[serde(default)]
        before: Option<String>,
        /// The subtree.
        node: Box<SceneNode>,
    },
    /// Remove a box and its subtree.
    Remove {
        /// Id of the box.
        target: String,
    },
    /// Replace a box's style.
    SetStyle {
        /// Id of the box.
        target: String,
        /// The new style; inherited properties it leaves out come from
        /// the box's parent.
        style: Box<SceneStyle>,
    },
}

impl Scene {
    /// Parse a scene from JSON text.
    ///
    /// # Errors
    /// Returns [`SceneError::Json`] when the text is not a valid scene.
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the box tree described by [`Self::root`]. Mutations are not
    /// applied.
    ///
    /// # Errors
    /// Fails on duplicate ids and replaced boxes with content.
    pub fn build(&self) -> Result<LayoutTree, SceneError> {
        if self.root.replaced.is_some() {
            return Err(SceneError::ReplacedWithContent(display_id(&self.root)));
        }
        let mut tree = LayoutTree::new(self.root.style.root());
        let root = tree.root();
        let mut builder = Builder {
            tree: &mut tree,
            ids: HashSet::new(),
        };
        if let Some(name) = &self.root.id {
            builder.register(name)?;
            builder.tree.set_name(root, name.clone());
        }
        if self.root.body {
            builder.tree.set_document_body(root);
        }
        builder.build_content(root, &self.root)?;
        tracing::debug!(boxes = tree.boxes().len(), "scene built");
        Ok(tree)
    }

    /// Apply [`Self::mutations`] to a tree built from this scene.
    ///
    /// # Errors
    /// Fails on unknown ids, duplicate ids among inserted boxes, bad
    /// reference siblings, and removal of the root.
    pub fn apply_mutations(&self, tree: &mut LayoutTree) -> Result<(), SceneError> {
        let ids = tree
            .boxes()
            .descendants(tree.root())
            .filter_map(|id| tree[id].name.clone())
            .collect();
        let mut builder = Builder { tree, ids };
        self.mutations
            .iter()
            .try_for_each(|mutation| builder.apply(mutation))
    }
}

/// Name of a scene node for error messages.
fn display_id(node: &SceneNode) -> String {
    node.id.clone().unwrap_or_else(|| "<anonymous>".to_owned())
}

struct Builder<'a> {
    tree: &'a mut LayoutTree,
    ids: HashSet<String>,
}

impl Builder<'_> {
    fn register(&mut self, name: &str) -> Result<(), SceneError> {
        if self.ids.insert(name.to_owned()) {
            Ok(())
        } else {
            Err(SceneError::DuplicateId(name.to_owned()))
        }
    }

    fn lookup(&self, name: &str) -> Result<NodeId, SceneError> {
        self.tree
            .find_by_name(name)
            .ok_or_else(|| SceneError::UnknownId(name.to_owned()))
    }

    /// Lines first, then children: a block child arriving after lines
    /// wraps them in an anonymous block.
    fn build_content(&mut self, id: NodeId, node: &SceneNode) -> Result<(), SceneError> {
        if !node.lines.is_empty() {
            let lines = node.lines.iter().map(|line| line.to_line_box()).collect();
            self.tree.set_lines(id, lines);
        }
        for child in &node.children {
            let _ = self.insert(id, None, child)?;
        }
        Ok(())
    }

    fn insert(&mut self, parent: NodeId, before: Option<NodeId>, node: &SceneNode) -> Result<NodeId, SceneError> {
        let kind = match node.replaced {
            Some(size) if node.children.is_empty() && node.lines.is_empty() => BoxKind::Replaced {
                intrinsic_width: size.width,
                intrinsic_height: size.height,
            },
            Some(_) => return Err(SceneError::ReplacedWithContent(display_id(node))),
            None => BoxKind::Block,
        };
        if self.tree.is_replaced(parent) {
            let name = self.tree[parent].debug_name().to_owned();
            return Err(SceneError::ReplacedWithContent(name));
        }
        if let Some(name) = &node.id {
            self.register(name)?;
        }
        let style = node.style.cascade(&self.tree[parent].style);
        let id = self.tree.create_child_box(kind, style);
        if let Some(name) = &node.id {
            self.tree.set_name(id, name.clone());
        }
        self.tree.add_child(parent, id, before);
        if node.body {
            self.tree.set_document_body(id);
        }
        self.build_content(id, node)?;
        Ok(id)
    }

    fn apply(&mut self, mutation: &Mutation) -> Result<(), SceneError> {
        tracing::debug!(?mutation, "applying mutation");
        match mutation {
            Mutation::Insert { parent, before, node } => {
                let parent_id = self.lookup(parent)?;
                let before_id = before.as_deref().map(|name| self.lookup(name)).transpose()?;
                if let Some(before_id) = before_id {
                    // Content of a multicol container lives in its flow thread.
                    let actual_parent = self.tree[parent_id].flow_thread.unwrap_or(parent_id);
                    if self.tree.parent(before_id) != Some(actual_parent) {
                        return Err(SceneError::NotAChild {
                            parent: parent.clone(),
                            before: before.clone().unwrap_or_default(),
                        });
                    }
                }
                let _ = self.insert(parent_id, before_id, node)?;
            }
            Mutation::Remove { target } => {
                let id = self.lookup(target)?;
                if id == self.tree.root() {
                    return Err(SceneError::RemoveRoot);
                }
                let removed: Vec<String> = self
                    .tree
                    .boxes()
                    .descendants(id)
                    .filter_map(|node| self.tree[node].name.clone())
                    .collect();
                self.tree.remove_child(id);
                for name in removed {
                    let _ = self.ids.remove(&name);
                }
            }
            Mutation::SetStyle { target, style } => {
                let id = self.lookup(target)?;
                let style = match self.tree.parent(id) {
                    Some(parent) => style.cascade(&self.tree[parent].style),
                    None => style.root(),
                };
                self.tree.set_style(id, style);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_named_boxes_with_lines() {
        let scene = Scene::from_json(
            r#"{ "root": { "id": "root", "children": [
                { "id": "p", "lines": [20, { "width": 50, "height": 10 }] },
                { "id": "img", "replaced": { "width": 30, "height": 40 } }
            ] } }"#,
        )
        .unwrap();
        let tree = scene.build().unwrap();
        let p = tree.find_by_name("p").unwrap();
        assert_eq!(tree[p].lines.len(), 2);
        assert_eq!(tree[p].lines[1].inline_size, 50.0);
        let img = tree.find_by_name("img").unwrap();
        assert!(tree.is_replaced(img));
        assert_eq!(tree.find_by_name("root"), Some(tree.root()));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let scene = Scene::from_json(r#"{ "root": { "children": [{ "id": "a" }, { "id": "a" }] } }"#).unwrap();
        assert!(matches!(scene.build(), Err(SceneError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_unknown_mutation_target_is_rejected() {
        let scene = Scene::from_json(
            r#"{ "root": {}, "mutations": [{ "op": "remove", "target": "missing" }] }"#,
        )
        .unwrap();
        let mut tree = scene.build().unwrap();
        assert!(matches!(
            scene.apply_mutations(&mut tree),
            Err(SceneError::UnknownId(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_removed_ids_can_be_reused() {
        let scene = Scene::from_json(
            r#"{ "root": { "id": "r", "children": [{ "id": "a" }] }, "mutations": [
                { "op": "remove", "target": "a" },
                { "op": "insert", "parent": "r", "node": { "id": "a" } }
            ] }"#,
        )
        .unwrap();
        let mut tree = scene.build().unwrap();
        scene.apply_mutations(&mut tree).unwrap();
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_replaced_content_cannot_have_children() {
        let scene = Scene::from_json(
            r#"{ "root": { "children": [
                { "id": "img", "replaced": { "width": 1, "height": 1 }, "children": [{}] }
            ] } }"#,
        )
        .unwrap();
        assert!(matches!(scene.build(), Err(SceneError::ReplacedWithContent(_))));
    }

    #[test]
    fn test_children_inherit_writing_mode_and_direction() {
        let scene = Scene::from_json(
            r#"{ "root": { "style": { "writing-mode": "vertical-rl", "direction": "rtl" }, "children": [
                { "id": "a", "style": { "width": 40 }, "children": [
                    { "id": "b", "style": { "direction": "ltr", "orphans": 4 } }
                ] }
            ] }, "mutations": [{ "op": "set-style", "target": "b", "style": { "height": 10 } }] }"#,
        )
        .unwrap();
        let mut tree = scene.build().unwrap();
        let a = tree.find_by_name("a").unwrap();
        let b = tree.find_by_name("b").unwrap();
        assert_eq!(tree[a].style.writing_mode, WritingMode::VerticalRl);
        assert_eq!(tree[a].style.direction, Direction::Rtl);
        assert_eq!(tree[b].style.writing_mode, WritingMode::VerticalRl);
        assert_eq!(tree[b].style.direction, Direction::Ltr);
        assert_eq!(tree[b].style.orphans, 4);
        assert!(!tree.is_orthogonal(a));

        // A replacement style inherits from the box's parent again.
        scene.apply_mutations(&mut tree).unwrap();
        assert_eq!(tree[b].style.direction, Direction::Rtl);
        assert_eq!(tree[b].style.orphans, ComputedStyle::default().orphans);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(Scene::from_json("{"), Err(SceneError::Json(_))));
    }
}
