//! Layout warnings, deduplicated.
//!
//! Degenerate but valid input (a float wider than its container, a
//! fragmentainer of unknown size, a multicol container with no room for a
//! column) is not an error, but it is worth telling someone about once.
//! Repeating the same message for every box of a large scene is noise, so
//! each unique `(component, message)` pair is emitted a single time until
//! [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves the set in a usable state.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Emit a warning through `tracing` (once per unique message).
///
/// # Example
/// ```
/// use flowbox_common::warning::warn_once;
///
/// warn_once("float", "float wider than its container");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(component, message) {
        tracing::warn!(component, "{message}");
    }
}

/// Record a warning key, returning `true` the first time it is seen.
fn record(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    warned().get_or_insert_with(HashSet::new).insert(key)
}

/// Clear all recorded warnings (call before laying out a new scene).
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}
