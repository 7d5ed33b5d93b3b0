//! VecProvider
//!
//! In-memory paginated provider. Serves a shared vector page-by-page using the
//! row offset as continuation token; useful for demos, tests, and datasets
//! that are already local but should still be browsed incrementally.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ContinuationToken, PaginatedResult, Record, SearchQuery};
use crate::error::{Error, Result};
use crate::services::{CancellationScope, DataProvider};

type Filter<R> = Arc<dyn Fn(&SearchQuery, &R) -> bool + Send + Sync>;

/// Simple in-memory data provider
pub struct VecProvider<R> {
    rows: Arc<Vec<R>>,
    latency: Option<Duration>,
    report_total: bool,
    filter: Option<Filter<R>>,
}

impl<R: Record> VecProvider<R> {
    /// Create a new VecProvider
    pub fn new(rows: Vec<R>) -> Self {
        Self::from_arc(Arc::new(rows))
    }

    /// Create from a shared reference
    pub fn from_arc(rows: Arc<Vec<R>>) -> Self {
        Self {
            rows,
            latency: None,
            report_total: true,
            filter: None,
        }
    }

    /// Simulate network latency per call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Do not report a total count (neither per page nor via `fetch_count`)
    pub fn without_total(mut self) -> Self {
        self.report_total = false;
        self
    }

    /// Enable server-side search with the given predicate
    pub fn with_filter(
        mut self,
        filter: impl Fn(&SearchQuery, &R) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Get all rows
    pub fn all(&self) -> &[R] {
        &self.rows
    }

    async fn simulate_latency(&self, scope: &CancellationScope) -> Result<()> {
        match self.latency {
            Some(latency) => {
                scope
                    .run(async {
                        tokio::time::sleep(latency).await;
                        Ok(())
                    })
                    .await
            }
            None => scope.check(),
        }
    }
}

fn parse_offset(token: Option<&ContinuationToken>) -> Result<usize> {
    match token {
        None => Ok(0),
        Some(token) => token
            .as_str()
            .parse()
            .map_err(|_| Error::unavailable(format!("invalid continuation token: {token}"))),
    }
}

impl<R: Record> DataProvider for VecProvider<R> {
    type Row = R;

    async fn fetch_page(
        &self,
        continuation: Option<ContinuationToken>,
        page_size: usize,
        scope: &CancellationScope,
    ) -> Result<PaginatedResult<R>> {
        self.simulate_latency(scope).await?;

        let offset = parse_offset(continuation.as_ref())?.min(self.rows.len());
        let end = offset.saturating_add(page_size).min(self.rows.len());
        let items = self.rows[offset..end].to_vec();

        let mut page = if end < self.rows.len() {
            PaginatedResult::page(items, end.to_string())
        } else {
            PaginatedResult::last(items)
        };
        if self.report_total {
            page = page.with_total(self.rows.len());
        }
        Ok(page)
    }

    async fn fetch_count(&self, scope: &CancellationScope) -> Result<Option<usize>> {
        self.simulate_latency(scope).await?;
        Ok(self.report_total.then_some(self.rows.len()))
    }

    async fn fetch_filtered(
        &self,
        query: &SearchQuery,
        scope: &CancellationScope,
    ) -> Result<Vec<R>> {
        let Some(filter) = self.filter.as_ref() else {
            return Err(Error::unsupported("in-memory provider has no filter"));
        };
        self.simulate_latency(scope).await?;
        Ok(self
            .rows
            .iter()
            .filter(|row| filter(query, row))
            .cloned()
            .collect())
    }
}
