//! Engine Constants
//!
//! Centralized defaults for paging, viewport geometry, and column sizing.

/// Default number of records requested per provider call
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default ceiling for the background cache
pub const DEFAULT_MAX_CACHED_RECORDS: usize = 10_000;

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f32 = 28.0;

/// Extra rows resolved above/below the visible window
pub const DEFAULT_OVERSCAN: usize = 5;

/// Percentile of formatted value lengths used for column sizing
pub const WIDTH_PERCENTILE: f32 = 0.95;

/// Horizontal cell padding (left + right) in pixels
pub const CELL_PADDING: f32 = 16.0;

/// Generic text bound used for unknown column kinds
pub const TEXT_MIN_WIDTH: f32 = 80.0;
pub const TEXT_MAX_WIDTH: f32 = 320.0;
pub const TEXT_CHAR_WIDTH: f32 = 7.0;

/// Suffix used when a clipped cell value is shortened
pub const ELLIPSIS: char = '…';
