//! Domain - Pure Data Structures and Protocol Types
//!
//! These types don't depend on the runtime and describe records, pages,
//! columns, and configuration.

pub mod column;
pub mod config;
pub mod page;
pub mod record;

pub use column::{ColumnKind, ColumnSpec, WidthBoundOverride, WidthBoundTable, WidthBounds};
pub use config::{EngineConfig, ViewportConfig, VirtualTableConfig};
pub use page::{ContinuationToken, PaginatedResult, SearchQuery};
pub use record::{CellText, Record};
