//! Block formatting context layout for flowbox.
//!
//! [CSS 2.1 § 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! This crate places block-level boxes: it stacks children in document
//! order, collapses their margins, flows content around floats, breaks
//! content across pages, and distributes the content of multi-column
//! containers into columns.
//!
//! # Scope
//!
//! - **Block flow** ([CSS 2.1 § 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//! - **Margin collapsing** ([CSS 2.1 § 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins))
//! - **Floats and clearance** ([CSS 2.1 § 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats))
//! - **Fragmentation** ([CSS Fragmentation Level 3](https://www.w3.org/TR/css-break-3/))
//! - **Multi-column** ([CSS Multi-column Layout Level 1](https://www.w3.org/TR/css-multicol-1/))
//!
//! Inline layout is out of scope: containers with inline content carry
//! pre-measured [`lines::LineBox`]es, which are only stacked.
//!
//! # Example
//!
//! ```
//! use flowbox_layout::{LayoutOptions, layout_tree};
//! use flowbox_layout::tree::{BoxKind, LayoutTree};
//! use flowbox_style::{ComputedStyle, LengthOrAuto};
//!
//! let mut tree = LayoutTree::new(ComputedStyle::default());
//! let root = tree.root();
//! let style = ComputedStyle {
//!     height: LengthOrAuto::px(40.0),
//!     ..ComputedStyle::default()
//! };
//! let child = tree.create_child_box(BoxKind::Block, style);
//! tree.add_child(root, child, None);
//!
//! layout_tree(&mut tree, &LayoutOptions::default());
//! assert_eq!(tree[child].frame.block_size, 40.0);
//! assert_eq!(tree[root].frame.block_size, 40.0);
//! ```

use flowbox_common::warning::warn_once;
use serde::Deserialize;

pub mod box_model;
pub mod dump;
pub mod float;
pub mod fragmentation;
pub mod lines;
pub mod margin;
pub mod multicol;
pub mod scene;
pub mod tree;

mod block;

pub use box_model::{BoxStrut, LogicalOffset, LogicalRect, Rect};
pub use dump::LayoutDump;
pub use fragmentation::{FragmentationState, PageBoundaryRule};
pub use lines::LineBox;
pub use scene::{Scene, SceneError};
pub use tree::{BoxKind, LayoutBox, LayoutTree};

use block::BlockLayout;

/// Everything a layout pass needs besides the tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutOptions {
    /// Width of the initial containing block.
    pub viewport_width: f32,
    /// Height of the initial containing block.
    pub viewport_height: f32,
    /// [Quirks Mode](https://quirks.spec.whatwg.org/)
    ///
    /// Enables the quirky margin and percentage-height rules.
    pub quirks_mode: bool,
    /// Lay the document out on pages of this block size.
    pub page_block_size: Option<f32>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            quirks_mode: false,
            page_block_size: None,
        }
    }
}

/// Lay out every box of `tree` that needs it.
///
/// Boxes keep their results in place: frames, margins, line positions,
/// float registries and column geometry are read straight off the tree (or
/// through [`dump::LayoutDump`]).
pub fn layout_tree(tree: &mut LayoutTree, options: &LayoutOptions) {
    let fragmentation = match options.page_block_size {
        Some(size) if size > 0.0 => Some(FragmentationState::paged(size)),
        Some(_) => {
            warn_once("fragmentation", "page block size must be positive; laying out continuously");
            None
        }
        None => None,
    };
    tracing::debug!(
        viewport_width = options.viewport_width,
        viewport_height = options.viewport_height,
        paged = fragmentation.is_some(),
        "layout"
    );
    BlockLayout::new(tree, options, fragmentation).layout_root();
}
