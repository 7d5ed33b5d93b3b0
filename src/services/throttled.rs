//! Throttled Provider
//!
//! Wraps any `DataProvider` with client-side rate limiting (a minimum interval
//! between consecutive calls) and an optional per-call timeout. The pacing
//! wait is itself cancellable, so a torn-down table never sits in a backoff.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::{ContinuationToken, PaginatedResult, SearchQuery};
use crate::error::{Error, Result};
use crate::services::{CancellationScope, DataProvider};

/// Rate-limit settings
#[derive(Clone, Debug, Default)]
pub struct ThrottleConfig {
    /// Minimum spacing between the starts of two provider calls
    pub min_interval: Duration,
    /// Per-call deadline (None = unlimited)
    pub timeout: Option<Duration>,
}

/// Rate-limited provider adapter
pub struct ThrottledProvider<P> {
    inner: P,
    config: ThrottleConfig,
    last_call: Mutex<Option<Instant>>,
}

impl<P: DataProvider> ThrottledProvider<P> {
    pub fn new(inner: P, config: ThrottleConfig) -> Self {
        Self {
            inner,
            config,
            last_call: Mutex::new(None),
        }
    }

    /// Get the wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Wait until the next call slot
    async fn pace(&self, scope: &CancellationScope) -> Result<()> {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.config.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    "Throttling provider call for {:?}",
                    ready_at - Instant::now()
                );
                scope
                    .run(async {
                        tokio::time::sleep_until(ready_at).await;
                        Ok(())
                    })
                    .await?;
            }
        }
        *last = Some(Instant::now());
        Ok(())
    }

    async fn call<F, T>(&self, what: &str, scope: &CancellationScope, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.pace(scope).await?;
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| Error::Timeout {
                    message: format!("{what} exceeded {}ms", limit.as_millis()),
                })?,
            None => future.await,
        }
    }
}

impl<P: DataProvider> DataProvider for ThrottledProvider<P> {
    type Row = P::Row;

    async fn fetch_page(
        &self,
        continuation: Option<ContinuationToken>,
        page_size: usize,
        scope: &CancellationScope,
    ) -> Result<PaginatedResult<P::Row>> {
        self.call(
            "fetch_page",
            scope,
            self.inner.fetch_page(continuation, page_size, scope),
        )
        .await
    }

    async fn fetch_count(&self, scope: &CancellationScope) -> Result<Option<usize>> {
        self.call("fetch_count", scope, self.inner.fetch_count(scope))
            .await
    }

    async fn fetch_filtered(
        &self,
        query: &SearchQuery,
        scope: &CancellationScope,
    ) -> Result<Vec<P::Row>> {
        self.call(
            "fetch_filtered",
            scope,
            self.inner.fetch_filtered(query, scope),
        )
        .await
    }
}
