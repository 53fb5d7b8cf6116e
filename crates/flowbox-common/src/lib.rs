//! Common utilities for the flowbox layout engine.
//!
//! This crate provides shared infrastructure used by all layout components:
//! - **Warning System** - once-per-message diagnostics for degenerate input

pub mod warning;
