//! Multi-column layout.
//!
//! [CSS Multi-column Layout Module Level 1](https://www.w3.org/TR/css-multicol-1/)
//!
//! A multicol container gets an anonymous *flow thread* child that holds all
//! of its content. The thread is laid out as one tall strip with column
//! fragmentation; the strip is then cut into columns by the container's
//! *column sets*. A `column-span: all` descendant interrupts the columns: it
//! is represented among the column sets by a *spanner placeholder*, and the
//! content after it continues in a new column set.
//!
//! ```text
//! multicol container
//! ├── flow thread        (all content, one strip)
//! ├── column set         (content before the spanner)
//! ├── spanner placeholder
//! └── column set         (content after the spanner)
//! ```
//!
//! - [`flow_thread`] keeps the column sets and placeholders in sync with the
//!   content as the tree is mutated.
//! - [`column_set`] maps flow thread offsets to column sets and columns.
//! - [`layout`] sizes the columns and balances them.

pub mod column_set;
pub mod flow_thread;
pub mod layout;
