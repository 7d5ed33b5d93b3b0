//! Virtual Table Cache Manager
//!
//! Owns the incrementally grown record cache for one dataset and is its only
//! writer. Background load runs and server searches are tokio tasks, each
//! under its own operation scope; every mutation goes through one lock that is
//! never held across a provider call, so each load step or search scan is
//! atomic with respect to the others.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──► start() ──► [page]* ──► complete │ failed │ cancelled
//!   │          ▲                                  │
//!   │          └──────────── reset() ◄────────────┘
//!   ▼
//! shutdown() / drop  (session scope fires, all operations stop)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::domain::{
    CellText, ColumnSpec, ContinuationToken, PaginatedResult, SearchQuery, VirtualTableConfig,
    WidthBoundTable,
};
use crate::error::{Error, Result};
use crate::services::{CancellationScope, DataProvider, Spawner};
use crate::state::{
    CacheState, ChangeKind, ErrorKind, Notifier, SearchAdvisory, StateChange, Subscription,
    ViewKind,
};
use crate::table::column::{ColumnLayout, ColumnWidthCalculator, ColumnWidths};
use crate::table::row_window::RowSlot;
use crate::table::search::{
    PendingSearch, SearchOutcome, SearchResolution, View, dedupe_by_id,
};

/// A running load run or server search
#[derive(Debug)]
struct Operation {
    id: u64,
    scope: CancellationScope,
}

/// Everything guarded by the table lock
struct Inner<P: DataProvider> {
    provider: Arc<P>,
    records: Vec<P::Row>,
    continuation: Option<ContinuationToken>,
    state: CacheState,
    view: View<P::Row>,
    load: Option<Operation>,
    search: Option<Operation>,
    next_op: u64,
    /// Bumped whenever `records` changes
    content_version: u64,
    /// The provider already answered a count request for this dataset
    count_probed: bool,
}

impl<P: DataProvider> Inner<P> {
    fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            records: Vec::new(),
            continuation: None,
            state: CacheState::default(),
            view: View::All,
            load: None,
            search: None,
            next_op: 0,
            content_version: 0,
            count_probed: false,
        }
    }

    fn next_op_id(&mut self) -> u64 {
        self.next_op += 1;
        self.next_op
    }

    fn is_current_load(&self, op: u64) -> bool {
        self.load.as_ref().is_some_and(|l| l.id == op)
    }

    fn is_current_search(&self, op: u64) -> bool {
        self.search.as_ref().is_some_and(|s| s.id == op)
    }

    fn set_view(&mut self, view: View<P::Row>) {
        self.state.view = match &view {
            View::All => ViewKind::All,
            View::Filtered(hits) => ViewKind::LocalFilter {
                matches: hits.len(),
            },
            View::Server(items) => ViewKind::ServerResults {
                matches: items.len(),
            },
        };
        self.view = view;
    }

    fn cancel_search(&mut self) {
        if let Some(search) = self.search.take() {
            search.scope.cancel();
        }
        self.state.is_server_searching = false;
    }

    fn cancel_all(&mut self) {
        if let Some(load) = self.load.take() {
            load.scope.cancel();
        }
        self.cancel_search();
        self.state.is_background_loading = false;
    }

    /// After a failed server search: keep the last search view, or show an
    /// empty result when no search was showing
    fn keep_search_view(&mut self) {
        if matches!(self.view, View::All) {
            self.set_view(View::Filtered(Vec::new()));
        }
    }

    fn finish_load(&mut self) {
        self.load = None;
        self.state.is_background_loading = false;
    }

    fn row(&self, index: usize) -> Option<&P::Row> {
        match &self.view {
            View::All => self.records.get(index),
            View::Filtered(hits) => hits.get(index).and_then(|&i| self.records.get(i)),
            View::Server(items) => items.get(index),
        }
    }
}

/// State shared between the table handle and its tasks
struct Shared<P: DataProvider> {
    session_id: Uuid,
    config: VirtualTableConfig,
    session: CancellationScope,
    spawner: Spawner,
    notifier: Arc<Notifier>,
    inner: Mutex<Inner<P>>,
    columns: Mutex<ColumnLayout>,
}

impl<P: DataProvider> Shared<P> {
    /// Stamp and queue a notification; caller holds the lock
    fn publish(&self, inner: &mut Inner<P>, kind: ChangeKind) {
        inner.state.sequence += 1;
        self.notifier.enqueue(StateChange {
            kind,
            state: inner.state.clone(),
        });
    }

    fn begin_load(self: &Arc<Self>, page_budget: Option<usize>) -> bool {
        let started = {
            let mut inner = self.inner.lock();
            if self.session.is_cancelled()
                || inner.state.is_background_loading
                || inner.state.is_cache_complete
            {
                false
            } else {
                let id = inner.next_op_id();
                let scope = self.session.child();
                inner.load = Some(Operation {
                    id,
                    scope: scope.clone(),
                });
                inner.state.is_background_loading = true;
                inner.state.last_error = None;
                inner.state.last_error_message = None;
                self.publish(&mut inner, ChangeKind::LoadStarted);

                let provider = inner.provider.clone();
                let shared = self.clone();
                self.spawner.spawn_named("vtable-page-loader", async move {
                    shared.run_load(id, scope, provider, page_budget).await;
                });
                true
            }
        };
        self.notifier.dispatch();
        started
    }

    async fn run_load(
        self: Arc<Self>,
        op: u64,
        scope: CancellationScope,
        provider: Arc<P>,
        page_budget: Option<usize>,
    ) {
        tracing::info!("[{}] Background load started", self.session_id);

        let needs_count = {
            let inner = self.inner.lock();
            inner.state.total_count.is_none() && !inner.count_probed
        };
        if needs_count {
            let result = scope.run(provider.fetch_count(&scope)).await;
            if matches!(result, Err(Error::Cancelled)) {
                self.abandon_load(op);
                return;
            }
            {
                let mut inner = self.inner.lock();
                if !inner.is_current_load(op) {
                    return;
                }
                inner.count_probed = true;
                match result {
                    Ok(Some(total)) => {
                        inner.state.total_count = Some(total);
                        self.publish(&mut inner, ChangeKind::CountKnown);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("[{}] Count unavailable: {}", self.session_id, e);
                    }
                }
            }
            self.notifier.dispatch();
        }

        let mut pages = 0usize;
        loop {
            let (cursor, request_size) = {
                let inner = self.inner.lock();
                if !inner.is_current_load(op) {
                    return;
                }
                let remaining = self
                    .config
                    .max_cached_records
                    .saturating_sub(inner.records.len());
                (inner.continuation.clone(), remaining.min(self.config.page_size))
            };
            if scope.is_cancelled() {
                self.abandon_load(op);
                return;
            }

            let requested = cursor.clone();
            let result = scope
                .run(provider.fetch_page(cursor, request_size, &scope))
                .await;
            pages += 1;

            let keep_going = match result {
                Ok(page) => {
                    self.apply_page(op, page, requested, request_size, pages, page_budget)
                }
                Err(Error::Cancelled) => {
                    self.abandon_load(op);
                    false
                }
                Err(e) => {
                    self.fail_load(op, e);
                    false
                }
            };
            self.notifier.dispatch();
            if !keep_going {
                return;
            }
        }
    }

    /// Append one page; returns whether the run should continue
    fn apply_page(
        &self,
        op: u64,
        page: PaginatedResult<P::Row>,
        requested: Option<ContinuationToken>,
        request_size: usize,
        pages: usize,
        page_budget: Option<usize>,
    ) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_current_load(op) {
            return false;
        }

        let PaginatedResult {
            mut items,
            has_more,
            total_count,
            continuation,
        } = page;

        if items.len() > request_size {
            tracing::warn!(
                "[{}] Provider returned {} items for a page of {}, truncating",
                self.session_id,
                items.len(),
                request_size
            );
            items.truncate(request_size);
        }
        let added = items.len();

        inner.records.extend(items);
        inner.content_version += 1;
        inner.state.loaded_count = inner.records.len();
        if let Some(total) = total_count {
            inner.state.total_count = Some(total);
        }
        inner.continuation = continuation;

        if !has_more {
            inner.state.is_provider_exhausted = true;
        }
        if !has_more || inner.records.len() >= self.config.max_cached_records {
            inner.state.is_cache_complete = true;
        }
        tracing::debug!(
            "[{}] Page {} appended {} records ({})",
            self.session_id,
            pages,
            added,
            inner.state.progress_text()
        );

        if inner.state.is_cache_complete {
            inner.finish_load();
            self.publish(&mut inner, ChangeKind::PageAppended { added });
            self.publish(&mut inner, ChangeKind::LoadFinished);
            tracing::info!(
                "[{}] Background load complete: {}",
                self.session_id,
                inner.state.progress_text()
            );
            return false;
        }

        // Empty pages are fine as long as the cursor moves.
        let stalled = match &inner.continuation {
            None => Some("reported more pages without a continuation"),
            Some(next) if added == 0 && requested.as_ref() == Some(next) => {
                Some("returned an empty page without advancing its continuation")
            }
            Some(_) => None,
        };
        if let Some(reason) = stalled {
            tracing::warn!("[{}] Provider {}, stopping load", self.session_id, reason);
            inner.finish_load();
            inner.state.last_error = Some(ErrorKind::Internal);
            inner.state.last_error_message = Some(format!("provider {reason}").into());
            self.publish(&mut inner, ChangeKind::PageAppended { added });
            self.publish(&mut inner, ChangeKind::LoadFailed);
            return false;
        }

        if page_budget.is_some_and(|budget| pages >= budget) {
            inner.finish_load();
            self.publish(&mut inner, ChangeKind::PageAppended { added });
            self.publish(&mut inner, ChangeKind::LoadFinished);
            return false;
        }

        self.publish(&mut inner, ChangeKind::PageAppended { added });
        true
    }

    fn fail_load(&self, op: u64, error: Error) {
        let mut inner = self.inner.lock();
        if !inner.is_current_load(op) {
            return;
        }
        tracing::warn!(
            "[{}] Background load failed after {} records: {}",
            self.session_id,
            inner.records.len(),
            error
        );
        inner.finish_load();
        inner.state.last_error = error.kind();
        inner.state.last_error_message = Some(error.to_string().into());
        self.publish(&mut inner, ChangeKind::LoadFailed);
    }

    /// Cancelled runs stop without a notification
    fn abandon_load(&self, op: u64) {
        let mut inner = self.inner.lock();
        if inner.is_current_load(op) {
            tracing::debug!("[{}] Background load cancelled", self.session_id);
            inner.finish_load();
        }
    }

    async fn run_search(
        self: Arc<Self>,
        op: u64,
        scope: CancellationScope,
        provider: Arc<P>,
        query: SearchQuery,
        tx: oneshot::Sender<SearchResolution<P::Row>>,
    ) {
        let result = scope.run(provider.fetch_filtered(&query, &scope)).await;

        let resolution = {
            let mut inner = self.inner.lock();
            if !inner.is_current_search(op) || scope.is_cancelled() {
                SearchResolution::Cancelled
            } else {
                inner.search = None;
                inner.state.is_server_searching = false;
                match result {
                    Ok(items) => {
                        let items = dedupe_by_id(items);
                        tracing::debug!(
                            "[{}] Server search '{}' returned {} records",
                            self.session_id,
                            query.term,
                            items.len()
                        );
                        inner.set_view(View::Server(items.clone()));
                        self.publish(&mut inner, ChangeKind::SearchResolved);
                        SearchResolution::Found(items)
                    }
                    Err(Error::Cancelled) => SearchResolution::Cancelled,
                    Err(Error::SearchTranslationUnsupported { message }) => {
                        tracing::info!(
                            "[{}] Server search unsupported: {}",
                            self.session_id,
                            message
                        );
                        inner.state.search_advisory =
                            Some(SearchAdvisory::ServerSearchUnsupported);
                        inner.keep_search_view();
                        self.publish(&mut inner, ChangeKind::SearchFailed);
                        SearchResolution::Unsupported
                    }
                    Err(e) => {
                        tracing::warn!("[{}] Server search failed: {}", self.session_id, e);
                        let kind = e.kind().unwrap_or(ErrorKind::Internal);
                        inner.state.last_error = Some(kind);
                        inner.state.last_error_message = Some(e.to_string().into());
                        inner.keep_search_view();
                        self.publish(&mut inner, ChangeKind::SearchFailed);
                        SearchResolution::Failed(kind)
                    }
                }
            }
        };
        self.notifier.dispatch();
        let _ = tx.send(resolution);
    }
}

/// Virtual table engine for one dataset
///
/// Created per dataset identity and torn down with its owning view: dropping
/// the table (or calling `shutdown`) fires the session scope, which stops the
/// background load and any server search within one provider call.
pub struct VirtualTable<P: DataProvider> {
    shared: Arc<Shared<P>>,
}

impl<P: DataProvider> VirtualTable<P> {
    /// Create a table on the current tokio runtime
    pub fn new(provider: P, config: VirtualTableConfig) -> Result<Self> {
        Self::with_spawner(provider, config, Spawner::current()?)
    }

    /// Create a table that spawns its tasks through `spawner`
    pub fn with_spawner(provider: P, config: VirtualTableConfig, spawner: Spawner) -> Result<Self> {
        config.validate()?;
        let session_id = Uuid::new_v4();
        tracing::debug!(
            "[{}] Virtual table created (page_size={}, max_cached_records={})",
            session_id,
            config.page_size,
            config.max_cached_records
        );

        Ok(Self {
            shared: Arc::new(Shared {
                session_id,
                config,
                session: CancellationScope::session(),
                spawner,
                notifier: Notifier::new(),
                inner: Mutex::new(Inner::new(Arc::new(provider))),
                columns: Mutex::new(ColumnLayout::default()),
            }),
        })
    }

    /// Identifier used in log lines
    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    pub fn config(&self) -> &VirtualTableConfig {
        &self.shared.config
    }

    // ==================== Loading ====================

    /// Begin loading; idempotent
    ///
    /// With `auto_start_background_load` the run continues until the provider
    /// is exhausted or the ceiling is reached. Otherwise only the first page is
    /// loaded and further pages come from `load_more`. No-op while loading,
    /// once complete, or after shutdown.
    pub fn start(&self) {
        if self.shared.config.auto_start_background_load {
            self.shared.begin_load(None);
        } else if self.shared.inner.lock().records.is_empty() {
            self.shared.begin_load(Some(1));
        }
    }

    /// Load a single further page; returns false if nothing was started
    pub fn load_more(&self) -> bool {
        self.shared.begin_load(Some(1))
    }

    /// Discard the cache and cancel all in-flight work
    pub fn reset(&self) {
        self.reset_inner(None);
    }

    /// Reset and switch to a new provider (new dataset identity)
    pub fn reset_with_provider(&self, provider: P) {
        self.reset_inner(Some(provider));
    }

    /// Reset, then start again
    pub fn restart(&self) {
        self.reset();
        self.start();
    }

    fn reset_inner(&self, provider: Option<P>) {
        {
            let mut inner = self.shared.inner.lock();
            inner.cancel_all();
            if let Some(provider) = provider {
                inner.provider = Arc::new(provider);
            }
            inner.records = Vec::new();
            inner.continuation = None;
            inner.count_probed = false;
            inner.content_version += 1;
            inner.set_view(View::All);
            inner.state = CacheState {
                sequence: inner.state.sequence,
                ..CacheState::default()
            };
            self.shared.publish(&mut inner, ChangeKind::Reset);
        }
        tracing::info!("[{}] Cache reset", self.shared.session_id);
        self.shared.notifier.dispatch();
    }

    /// Tear down: cancel the session scope and every operation under it
    pub fn shutdown(&self) {
        if self.shared.session.is_cancelled() {
            return;
        }
        self.shared.session.cancel();
        self.shared.inner.lock().cancel_all();
        tracing::info!("[{}] Session closed", self.shared.session_id);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.session.is_cancelled()
    }

    // ==================== Search ====================

    /// Filter the cache with `matcher`, falling back to a server search when
    /// the cache cannot answer authoritatively
    ///
    /// `matcher` runs synchronously over the cache as of this call and must
    /// not call back into the table. An empty term clears the search.
    pub fn search<M>(&self, term: &str, matcher: M) -> SearchOutcome<P::Row>
    where
        M: Fn(&P::Row) -> bool,
    {
        let term = term.trim();
        if term.is_empty() {
            self.clear_search();
            return SearchOutcome::Cleared;
        }

        let outcome = {
            let mut inner = self.shared.inner.lock();
            inner.cancel_search();
            inner.state.search_advisory = None;

            let hits: Vec<usize> = inner
                .records
                .iter()
                .enumerate()
                .filter(|(_, record)| matcher(*record))
                .map(|(i, _)| i)
                .collect();

            if !hits.is_empty() {
                let items: Vec<P::Row> = hits.iter().map(|&i| inner.records[i].clone()).collect();
                inner.set_view(View::Filtered(hits));
                self.shared.publish(&mut inner, ChangeKind::ViewChanged);
                SearchOutcome::Local(items)
            } else if inner.state.is_cache_complete || self.shared.session.is_cancelled() {
                inner.set_view(View::Filtered(Vec::new()));
                self.shared.publish(&mut inner, ChangeKind::ViewChanged);
                SearchOutcome::Empty
            } else {
                let id = inner.next_op_id();
                let scope = self.shared.session.child();
                inner.search = Some(Operation {
                    id,
                    scope: scope.clone(),
                });
                inner.state.is_server_searching = true;
                self.shared.publish(&mut inner, ChangeKind::SearchStarted);

                tracing::debug!(
                    "[{}] No local match for '{}' in {} records, searching server",
                    self.shared.session_id,
                    term,
                    inner.records.len()
                );

                let term: Arc<str> = term.into();
                let (tx, rx) = oneshot::channel();
                let provider = inner.provider.clone();
                let shared = self.shared.clone();
                let query = SearchQuery::new(term.clone());
                self.shared
                    .spawner
                    .spawn_named("vtable-server-search", async move {
                        shared.run_search(id, scope, provider, query, tx).await;
                    });
                SearchOutcome::Pending(PendingSearch::new(term, rx))
            }
        };
        self.shared.notifier.dispatch();
        outcome
    }

    /// Drop the current search and show the full cache again
    pub fn clear_search(&self) {
        {
            let mut inner = self.shared.inner.lock();
            inner.cancel_search();
            inner.state.search_advisory = None;
            inner.set_view(View::All);
            self.shared.publish(&mut inner, ChangeKind::ViewChanged);
        }
        self.shared.notifier.dispatch();
    }

    // ==================== Reads ====================

    /// Rows `[start, end)` of the current view
    ///
    /// Indices past the cached rows yield `RowSlot::Pending` while the
    /// background load is still running (up to `placeholder_ceiling`), and are
    /// omitted otherwise. Never fails.
    pub fn get_rows(&self, start: usize, end: usize) -> Vec<RowSlot<P::Row>> {
        let ceiling = self.placeholder_ceiling();
        let inner = self.shared.inner.lock();
        let placeholders = matches!(inner.view, View::All) && inner.state.is_background_loading;
        let end = if placeholders {
            end.min(ceiling.max(inner.records.len()))
        } else {
            end.min(inner.state.visible_count())
        };

        (start..end)
            .map(|i| match inner.row(i) {
                Some(row) => RowSlot::Loaded(row.clone()),
                None => RowSlot::Pending,
            })
            .collect()
    }

    /// Single row of the current view
    pub fn get_row(&self, index: usize) -> Option<P::Row> {
        self.shared.inner.lock().row(index).cloned()
    }

    /// How far the row space may extend once loading finishes
    pub fn placeholder_ceiling(&self) -> usize {
        let inner = self.shared.inner.lock();
        if !(matches!(inner.view, View::All) && inner.state.is_background_loading) {
            return inner.state.visible_count();
        }
        let max = self.shared.config.max_cached_records;
        inner.state.total_count.map_or(max, |total| total.min(max))
    }

    /// Current state snapshot
    pub fn get_state(&self) -> CacheState {
        self.shared.inner.lock().state.clone()
    }

    // ==================== Subscriptions ====================

    /// Register a listener for state changes
    pub fn subscribe(
        &self,
        listener: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.shared.notifier.subscribe(listener)
    }

    /// Receive state changes over a channel
    pub fn subscribe_channel(&self) -> (Subscription, crossbeam_channel::Receiver<StateChange>) {
        self.shared.notifier.subscribe_channel()
    }

    // ==================== Columns ====================

    /// Declare the table's columns; invalidates computed widths
    pub fn set_columns(&self, columns: Vec<ColumnSpec>) {
        let mut layout = self.shared.columns.lock();
        layout.columns = columns;
        layout.invalidate();
    }

    /// Replace the per-kind width bounds; invalidates computed widths
    pub fn set_width_bounds(&self, bounds: WidthBoundTable) {
        let mut layout = self.shared.columns.lock();
        layout.calculator = ColumnWidthCalculator::new(bounds);
        layout.invalidate();
    }

    pub fn columns(&self) -> Vec<ColumnSpec> {
        self.shared.columns.lock().columns.clone()
    }
}

impl<P> VirtualTable<P>
where
    P: DataProvider,
    P::Row: CellText,
{
    /// Column widths over every loaded record
    ///
    /// Recomputed only after the cache gained pages, was reset, or the column
    /// configuration changed; scrolling never affects the result. The scan
    /// runs over a snapshot, so pages keep landing while it is in progress.
    pub fn column_widths(&self) -> Arc<ColumnWidths> {
        let mut layout = self.shared.columns.lock();
        let (version, records) = {
            let inner = self.shared.inner.lock();
            if let Some(widths) = layout.cached_for(inner.content_version) {
                return widths;
            }
            (inner.content_version, inner.records.clone())
        };

        let widths = Arc::new(layout.calculator.compute(&layout.columns, &records));
        tracing::debug!(
            "[{}] Column widths recomputed over {} records",
            self.shared.session_id,
            records.len()
        );
        layout.cached = Some((version, widths.clone()));
        widths
    }
}

impl<P: DataProvider> Drop for VirtualTable<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<P: DataProvider> std::fmt::Debug for VirtualTable<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualTable")
            .field("session_id", &self.shared.session_id)
            .field("config", &self.shared.config)
            .field("state", &self.get_state())
            .finish()
    }
}
