//! Utilities
//!
//! Formatting helpers and config-file access.

pub mod config_store;
pub mod format;

pub use format::*;
