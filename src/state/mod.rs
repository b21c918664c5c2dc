//! State management module
//!
//! This module holds client-side state shared between services

pub mod group_cache;
pub mod selection;

// Re-export commonly used state components
pub use group_cache::{GroupCache, GroupEntry, LoadState, PreloadSummary};
pub use selection::Selection;
