//! Config - Engine Configuration

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_CACHED_RECORDS, DEFAULT_OVERSCAN, DEFAULT_PAGE_SIZE, DEFAULT_ROW_HEIGHT,
};
use crate::domain::column::{ColumnSpec, WidthBoundOverride};
use crate::error::{Error, Result};

/// Main engine configuration, as read from a TOML/JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Paging and cache ceiling
    pub table: VirtualTableConfig,
    /// Row geometry
    pub viewport: ViewportConfig,
    /// Declared columns
    pub columns: Vec<ColumnSpec>,
    /// Per-kind width bound overrides
    pub width_bounds: Vec<WidthBoundOverride>,
}

impl EngineConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        self.viewport.validate()
    }
}

/// Paging configuration for one virtual table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualTableConfig {
    /// Records per provider call
    pub page_size: usize,
    /// Hard ceiling for the background cache
    pub max_cached_records: usize,
    /// Whether `start()` keeps loading until the ceiling
    pub auto_start_background_load: bool,
}

impl Default for VirtualTableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_cached_records: DEFAULT_MAX_CACHED_RECORDS,
            auto_start_background_load: true,
        }
    }
}

impl VirtualTableConfig {
    pub fn new(page_size: usize, max_cached_records: usize) -> Self {
        Self {
            page_size,
            max_cached_records,
            auto_start_background_load: true,
        }
    }

    /// Disable continuous background loading
    pub fn manual(mut self) -> Self {
        self.auto_start_background_load = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig {
                message: "page_size must be greater than 0".to_string(),
            });
        }
        if self.page_size > self.max_cached_records {
            return Err(Error::InvalidConfig {
                message: format!(
                    "page_size ({}) must not exceed max_cached_records ({})",
                    self.page_size, self.max_cached_records
                ),
            });
        }
        Ok(())
    }
}

/// Row geometry for window resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Fixed row height in pixels
    pub row_height: f32,
    /// Rows resolved beyond the visible area
    pub overscan: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!("row_height must be positive, got {}", self.row_height),
            });
        }
        Ok(())
    }
}
