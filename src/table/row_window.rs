//! Row Window Resolver
//!
//! Translates a scroll position into a contiguous row index range and fetches
//! those rows from the table. It knows nothing about pages, only indices.
//! Rapid scroll events are coalesced: only the latest request is resolved per
//! frame.

use crate::domain::ViewportConfig;
use crate::services::DataProvider;
use crate::table::VirtualTable;

/// One addressable row
#[derive(Debug, Clone, PartialEq)]
pub enum RowSlot<T> {
    Loaded(T),
    /// Not cached yet; render a loading placeholder
    Pending,
}

impl<T> RowSlot<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RowSlot::Pending)
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            RowSlot::Loaded(row) => Some(row),
            RowSlot::Pending => None,
        }
    }
}

/// Index range for one frame
///
/// `[start, end)` are cached rows; `[end, placeholder_end)` are rows still
/// being loaded in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
    pub placeholder_end: usize,
}

impl RowWindow {
    pub fn len(&self) -> usize {
        self.placeholder_end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending(&self) -> usize {
        self.placeholder_end - self.end
    }
}

/// Rows fetched for a window
#[derive(Debug, Clone)]
pub struct ResolvedWindow<T> {
    pub window: RowWindow,
    pub rows: Vec<RowSlot<T>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollRequest {
    offset: f32,
    viewport_height: f32,
}

/// Scroll → row range resolver
#[derive(Debug, Clone)]
pub struct RowWindowResolver {
    viewport: ViewportConfig,
    pending: Option<ScrollRequest>,
    last: Option<RowWindow>,
}

impl RowWindowResolver {
    pub fn new(viewport: ViewportConfig) -> Self {
        Self {
            viewport,
            pending: None,
            last: None,
        }
    }

    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    /// Last window resolved by `on_frame`
    pub fn last_window(&self) -> Option<RowWindow> {
        self.last
    }

    /// Compute the window for a scroll position
    ///
    /// `addressable` is the number of rows in the current view;
    /// `placeholder_ceiling` is how far pending placeholders may extend
    /// (equal to `addressable` when nothing is loading).
    pub fn compute(
        &self,
        scroll_offset: f32,
        viewport_height: f32,
        addressable: usize,
        placeholder_ceiling: usize,
    ) -> RowWindow {
        let row_height = self.viewport.row_height;
        let first = (scroll_offset.max(0.0) / row_height).floor() as usize;
        let visible = (viewport_height.max(0.0) / row_height).ceil() as usize;
        let wanted = first
            .saturating_add(visible)
            .saturating_add(self.viewport.overscan);

        let limit = placeholder_ceiling.max(addressable);
        let start = first.min(limit);
        let end = wanted.min(addressable).max(start);
        let placeholder_end = wanted.min(limit).max(end);

        RowWindow {
            start,
            end,
            placeholder_end,
        }
    }

    /// Resolve immediately against `table`
    pub fn resolve<P: DataProvider>(
        &self,
        table: &VirtualTable<P>,
        scroll_offset: f32,
        viewport_height: f32,
    ) -> ResolvedWindow<P::Row> {
        let state = table.get_state();
        let window = self.compute(
            scroll_offset,
            viewport_height,
            state.visible_count(),
            table.placeholder_ceiling(),
        );
        let rows = table.get_rows(window.start, window.placeholder_end);
        // Rows may have landed between the two reads; recount.
        let end = window.start + rows.iter().take_while(|r| !r.is_pending()).count();
        ResolvedWindow {
            window: RowWindow {
                end,
                placeholder_end: window.start + rows.len(),
                ..window
            },
            rows,
        }
    }

    /// Record a scroll event; only the latest one per frame is resolved
    pub fn request(&mut self, scroll_offset: f32, viewport_height: f32) {
        self.pending = Some(ScrollRequest {
            offset: scroll_offset,
            viewport_height,
        });
    }

    /// Resolve the latest request, if any arrived since the last frame
    pub fn on_frame<P: DataProvider>(
        &mut self,
        table: &VirtualTable<P>,
    ) -> Option<ResolvedWindow<P::Row>> {
        let request = self.pending.take()?;
        let resolved = self.resolve(table, request.offset, request.viewport_height);
        self.last = Some(resolved.window);
        Some(resolved)
    }
}

impl Default for RowWindowResolver {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}
