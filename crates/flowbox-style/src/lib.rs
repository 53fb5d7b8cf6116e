//! Computed style values consumed by the flowbox layout engine.
//!
//! Style resolution (the cascade, inheritance, shorthand expansion) happens
//! elsewhere. This crate only models the *computed* values block layout
//! reads, plus the derived predicates layout asks about a box ("does it
//! establish a formatting context?", "is it a column spanner?").
//!
//! # Scope
//!
//! - **Lengths and edges** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//! - **Box generation and positioning** ([CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html))
//! - **Writing modes** ([CSS Writing Modes Level 4](https://www.w3.org/TR/css-writing-modes-4/))
//! - **Fragmentation** ([CSS Fragmentation Level 3](https://www.w3.org/TR/css-break-3/))
//! - **Multi-column** ([CSS Multi-column Layout Level 1](https://www.w3.org/TR/css-multicol-1/))
//!
//! All keyword enums deserialize from their CSS spelling (`"vertical-rl"`,
//! `"avoid-page"`) and display the same way.

/// Computed style for one box.
pub mod computed;
/// Fragmentation break values and their precedence.
pub mod fragmentation;
/// Length values and per-side edge values.
pub mod values;
/// Writing modes and logical-to-physical mapping.
pub mod writing_mode;

pub use computed::{
    Clear, ColumnFill, ColumnSpan, ComputedStyle, Display, Float, Overflow, Position,
};
pub use fragmentation::{BreakBetween, BreakInside, FragmentationType};
pub use values::{Length, LengthOrAuto, Sides};
pub use writing_mode::{Direction, PhysicalSide, WritingMode};
