//! DFC Virtual Table Engine
//!
//! Incremental record cache and pagination engine for large remote datasets:
//! background page loading up to a ceiling, cache-first search with a
//! server-side fallback, stable column widths and scroll-driven row windows.

pub mod constants;
pub mod domain;
pub mod error;
pub mod services;
pub mod state;
pub mod table;
pub mod utils;

pub use domain::{
    CellText, ColumnKind, ColumnSpec, ContinuationToken, EngineConfig, PaginatedResult, Record,
    SearchQuery, ViewportConfig, VirtualTableConfig,
};
pub use error::{Error, Result};
pub use services::{CancellationScope, DataProvider, Spawner};
pub use state::{CacheState, ChangeKind, ErrorKind, StateChange, Subscription};
pub use table::{
    ColumnWidths, RowSlot, RowWindowResolver, SearchOutcome, SearchResolution, VirtualTable,
};
