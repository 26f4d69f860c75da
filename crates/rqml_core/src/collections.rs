//! Hash collections used across the workspace.
//!
//! Scope and type tables are keyed by small integer handles, where FxHash is
//! the right trade-off.

pub use rustc_hash::{FxHashMap, FxHashSet};
