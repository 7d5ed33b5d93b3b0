//! Cache State
//!
//! Immutable snapshot of a virtual table's status, published to subscribers
//! after every mutation.

use std::sync::Arc;

use crate::utils::format_progress;

/// User-facing error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network/auth failure reported by the provider (timeouts included)
    ProviderUnavailable,
    /// The provider cannot express the search server-side
    SearchTranslationUnsupported,
    /// Anything else (configuration, runtime)
    Internal,
}

/// Non-fatal notice about the current search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAdvisory {
    /// The local negative is inconclusive and the server cannot be asked
    ServerSearchUnsupported,
}

/// Which record set the row index space currently addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    /// The background cache, in load order
    #[default]
    All,
    /// Local matches of the last search
    LocalFilter { matches: usize },
    /// Results of a server-side search fallback
    ServerResults { matches: usize },
}

/// What caused a state notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A load run began
    LoadStarted,
    /// A page was appended to the cache
    PageAppended { added: usize },
    /// The provider reported a total count
    CountKnown,
    /// A load run stopped (exhausted, ceiling, or page budget)
    LoadFinished,
    /// A load run failed; cached rows are kept
    LoadFailed,
    /// A server-side search was issued
    SearchStarted,
    /// Server results replaced the visible set
    SearchResolved,
    /// A server-side search failed or was unsupported
    SearchFailed,
    /// The visible set changed synchronously (local search, clear)
    ViewChanged,
    /// The cache was discarded
    Reset,
}

/// Snapshot of engine status
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheState {
    /// Strictly increasing per mutation
    pub sequence: u64,
    /// Records in the background cache
    pub loaded_count: usize,
    /// Remote dataset size, when known
    pub total_count: Option<usize>,
    pub is_background_loading: bool,
    pub is_server_searching: bool,
    pub last_error: Option<ErrorKind>,
    /// Detail text for `last_error`
    pub last_error_message: Option<Arc<str>>,
    /// Provider signaled `has_more = false` or the ceiling was reached
    pub is_cache_complete: bool,
    /// Provider signaled `has_more = false`
    pub is_provider_exhausted: bool,
    pub search_advisory: Option<SearchAdvisory>,
    pub view: ViewKind,
}

impl CacheState {
    /// Number of addressable rows in the current view
    pub fn visible_count(&self) -> usize {
        match self.view {
            ViewKind::All => self.loaded_count,
            ViewKind::LocalFilter { matches } | ViewKind::ServerResults { matches } => matches,
        }
    }

    /// Whether any async work is pending
    pub fn is_busy(&self) -> bool {
        self.is_background_loading || self.is_server_searching
    }

    /// Progress line, e.g. "1,200 of 5,000 loaded"
    pub fn progress_text(&self) -> String {
        format_progress(self.loaded_count, self.total_count)
    }
}

/// A notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub kind: ChangeKind,
    pub state: CacheState,
}
