//! Column Width Calculator
//!
//! Derives one fixed pixel width per column from every loaded record, so the
//! layout never reflows while rows scroll in and out of view. Widths only
//! change when the cache contents or the column declarations change.

use std::sync::Arc;

use crate::constants::{CELL_PADDING, WIDTH_PERCENTILE};
use crate::domain::{CellText, ColumnSpec, WidthBoundTable};
use crate::utils::{ClippedCell, clip_to_width};

/// Computed width of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidth {
    pub key: String,
    /// Fixed width in pixels
    pub width: f32,
    /// Character width used for clipping overflow
    pub char_width: f32,
}

/// Widths for all declared columns, in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnWidths {
    columns: Vec<ColumnWidth>,
}

impl ColumnWidths {
    /// Width for `key`
    pub fn get(&self, key: &str) -> Option<f32> {
        self.column(key).map(|c| c.width)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnWidth> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnWidth> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sum of all column widths
    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Fit a cell value into its column; overflow is clipped, with the full
    /// value kept for hover text
    pub fn clip(&self, key: &str, text: &str) -> ClippedCell {
        match self.column(key) {
            Some(col) => clip_to_width(text, col.width, col.char_width, CELL_PADDING),
            None => ClippedCell {
                display: text.to_string(),
                full: None,
            },
        }
    }
}

/// Width estimator
#[derive(Debug, Clone)]
pub struct ColumnWidthCalculator {
    bounds: WidthBoundTable,
    percentile: f32,
    padding: f32,
}

impl Default for ColumnWidthCalculator {
    fn default() -> Self {
        Self::new(WidthBoundTable::default())
    }
}

impl ColumnWidthCalculator {
    pub fn new(bounds: WidthBoundTable) -> Self {
        Self {
            bounds,
            percentile: WIDTH_PERCENTILE,
            padding: CELL_PADDING,
        }
    }

    /// Use a different length percentile (0.0 - 1.0)
    pub fn with_percentile(mut self, percentile: f32) -> Self {
        self.percentile = percentile.clamp(0.0, 1.0);
        self
    }

    pub fn bounds(&self) -> &WidthBoundTable {
        &self.bounds
    }

    /// Compute widths for `columns` over `records`
    pub fn compute<R: CellText>(&self, columns: &[ColumnSpec], records: &[R]) -> ColumnWidths {
        ColumnWidths {
            columns: columns
                .iter()
                .map(|spec| self.column_width(spec, records))
                .collect(),
        }
    }

    fn column_width<R: CellText>(&self, spec: &ColumnSpec, records: &[R]) -> ColumnWidth {
        let bounds = self.bounds.get(&spec.kind);
        let width = if records.is_empty() {
            bounds.min_width
        } else {
            let mut lengths: Vec<usize> = records
                .iter()
                .map(|r| r.cell_text(&spec.key).map_or(0, |t| t.chars().count()))
                .collect();
            let typical = percentile(&mut lengths, self.percentile);
            let chars = typical.max(spec.label.chars().count());
            bounds.clamp(chars as f32 * bounds.average_char_width + self.padding)
        };

        ColumnWidth {
            key: spec.key.clone(),
            width,
            char_width: bounds.average_char_width,
        }
    }
}

/// Nearest-rank percentile; reorders `values`
fn percentile(values: &mut [usize], p: f32) -> usize {
    if values.is_empty() {
        return 0;
    }
    let rank = ((p * values.len() as f32).ceil() as usize).clamp(1, values.len());
    let (_, nth, _) = values.select_nth_unstable(rank - 1);
    *nth
}

/// Memoized widths, keyed by cache content version
#[derive(Debug, Default)]
pub(crate) struct ColumnLayout {
    pub columns: Vec<ColumnSpec>,
    pub calculator: ColumnWidthCalculator,
    pub cached: Option<(u64, Arc<ColumnWidths>)>,
}

impl ColumnLayout {
    pub fn cached_for(&self, version: u64) -> Option<Arc<ColumnWidths>> {
        match &self.cached {
            Some((v, widths)) if *v == version => Some(widths.clone()),
            _ => None,
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
