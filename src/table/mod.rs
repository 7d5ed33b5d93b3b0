//! Virtual table engine: record cache, search fallback, column layout and
//! row windowing.

mod cache_manager;
mod column;
mod row_window;
mod search;
#[cfg(test)]
pub(crate) mod testing;

pub use cache_manager::VirtualTable;
pub use column::{ColumnWidth, ColumnWidthCalculator, ColumnWidths};
pub use row_window::{ResolvedWindow, RowSlot, RowWindow, RowWindowResolver};
pub use search::{PendingSearch, SearchOutcome, SearchResolution};
