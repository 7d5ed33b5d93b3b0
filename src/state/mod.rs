//! State - Observable Table State
//!
//! Snapshots published by the engine and the subscription registry that
//! delivers them.

mod cache_state;
mod subscription;

pub use cache_state::*;
pub use subscription::*;
