//! Column - Declared Column Semantics

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::constants::{TEXT_CHAR_WIDTH, TEXT_MAX_WIDTH, TEXT_MIN_WIDTH};

/// Semantic type of a column, used to pick its width bounds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Short identifiers, codes, keys
    ShortId,
    /// Display names, titles
    LongName,
    /// true / false flags
    Boolean,
    /// Timestamps and dates
    DateTime,
    /// Numbers
    Numeric,
    /// Arbitrary text
    FreeText,
    /// Application-defined kind
    #[serde(untagged)]
    Custom(String),
}

/// Pixel bounds for one column kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthBounds {
    pub min_width: f32,
    pub max_width: f32,
    /// Average rendered width of one character
    pub average_char_width: f32,
}

impl WidthBounds {
    pub const fn new(min_width: f32, max_width: f32, average_char_width: f32) -> Self {
        Self {
            min_width,
            max_width,
            average_char_width,
        }
    }

    /// Generic text bound used for unknown kinds
    pub const fn text() -> Self {
        Self::new(TEXT_MIN_WIDTH, TEXT_MAX_WIDTH, TEXT_CHAR_WIDTH)
    }

    /// Clamp a width into `[min_width, max_width]`
    pub fn clamp(&self, width: f32) -> f32 {
        width.max(self.min_width).min(self.max_width.max(self.min_width))
    }
}

/// Lookup table from column kind to width bounds
#[derive(Debug, Clone)]
pub struct WidthBoundTable {
    bounds: AHashMap<ColumnKind, WidthBounds>,
    fallback: WidthBounds,
}

impl WidthBoundTable {
    /// Empty table; every lookup uses the generic text bound
    pub fn empty() -> Self {
        Self {
            bounds: AHashMap::new(),
            fallback: WidthBounds::text(),
        }
    }

    /// Set the bounds for a kind
    pub fn insert(&mut self, kind: ColumnKind, bounds: WidthBounds) {
        self.bounds.insert(kind, bounds);
    }

    /// Bounds for `kind`, falling back to generic text
    pub fn get(&self, kind: &ColumnKind) -> WidthBounds {
        self.bounds.get(kind).copied().unwrap_or(self.fallback)
    }

    /// Apply config overrides on top of this table
    pub fn with_overrides(mut self, overrides: &[WidthBoundOverride]) -> Self {
        for o in overrides {
            self.insert(o.kind.clone(), o.bounds);
        }
        self
    }
}

impl Default for WidthBoundTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(ColumnKind::ShortId, WidthBounds::new(60.0, 160.0, 7.5));
        table.insert(ColumnKind::LongName, WidthBounds::new(120.0, 360.0, 7.0));
        table.insert(ColumnKind::Boolean, WidthBounds::new(56.0, 80.0, 7.0));
        table.insert(ColumnKind::DateTime, WidthBounds::new(140.0, 180.0, 7.5));
        table.insert(ColumnKind::Numeric, WidthBounds::new(60.0, 140.0, 7.5));
        table.insert(ColumnKind::FreeText, WidthBounds::new(120.0, 480.0, 7.0));
        table
    }
}

/// Column declaration: key plus semantic kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column identifier, passed to `CellText::cell_text`
    pub key: String,
    /// Header label; counts towards the content width
    #[serde(default)]
    pub label: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            kind,
        }
    }

    /// Set the header label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Per-kind bounds override from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidthBoundOverride {
    pub kind: ColumnKind,
    #[serde(flatten)]
    pub bounds: WidthBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_uses_text_bound() {
        let table = WidthBoundTable::default();
        let bounds = table.get(&ColumnKind::Custom("geo".into()));
        assert_eq!(bounds, WidthBounds::text());
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let table = WidthBoundTable::default().with_overrides(&[WidthBoundOverride {
            kind: ColumnKind::Boolean,
            bounds: WidthBounds::new(40.0, 40.0, 6.0),
        }]);
        assert_eq!(table.get(&ColumnKind::Boolean).max_width, 40.0);
    }

    #[test]
    fn test_clamp() {
        let bounds = WidthBounds::new(60.0, 100.0, 7.0);
        assert_eq!(bounds.clamp(10.0), 60.0);
        assert_eq!(bounds.clamp(80.0), 80.0);
        assert_eq!(bounds.clamp(500.0), 100.0);
    }
}
