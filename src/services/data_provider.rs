//! DataProvider Trait
//!
//! Abstraction over a remote, paginated, possibly rate-limited record source.
//! Implemented by the embedding application; the table only consumes it.

use std::future::Future;

use crate::domain::{ContinuationToken, PaginatedResult, Record, SearchQuery};
use crate::error::Result;
use crate::services::CancellationScope;

/// Trait for providing pages of records to a `VirtualTable`
///
/// Every call receives the governing cancellation scope and should abort
/// promptly with `Error::Cancelled` once it fires. Timeouts, if any, are the
/// provider's business and are reported as errors.
pub trait DataProvider: Send + Sync + 'static {
    type Row: Record;

    /// Fetch the page after `continuation` (`None` means the first page)
    ///
    /// Must not return more than `page_size` items.
    fn fetch_page(
        &self,
        continuation: Option<ContinuationToken>,
        page_size: usize,
        scope: &CancellationScope,
    ) -> impl Future<Output = Result<PaginatedResult<Self::Row>>> + Send;

    /// Best-effort total count; `None` when the source cannot report it cheaply
    fn fetch_count(
        &self,
        scope: &CancellationScope,
    ) -> impl Future<Output = Result<Option<usize>>> + Send {
        let _ = scope;
        async { Ok(None) }
    }

    /// Server-side search
    ///
    /// Translating `query` into the source's native filter is the provider's
    /// responsibility; return `Error::SearchTranslationUnsupported` when that is
    /// not possible.
    fn fetch_filtered(
        &self,
        query: &SearchQuery,
        scope: &CancellationScope,
    ) -> impl Future<Output = Result<Vec<Self::Row>>> + Send;
}
