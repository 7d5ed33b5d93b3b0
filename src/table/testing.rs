//! Scriptable provider for engine tests

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::domain::{CellText, ContinuationToken, PaginatedResult, Record, SearchQuery};
use crate::error::{Error, Result};
use crate::services::{CancellationScope, DataProvider};
use crate::state::CacheState;
use crate::table::VirtualTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

impl Item {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("item-{id}"),
        }
    }
}

impl Record for Item {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

impl CellText for Item {
    fn cell_text(&self, column: &str) -> Option<Cow<'_, str>> {
        match column {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "name" => Some(Cow::Borrowed(&self.name)),
            "flag" => Some(Cow::Borrowed(if self.id % 2 == 0 { "true" } else { "false" })),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Page { size: usize, cursor: Option<String> },
    Count,
    Filtered { term: String },
}

/// Shared record of provider calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn page_sizes(&self) -> Vec<usize> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Page { size, .. } => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub fn count_calls(&self) -> usize {
        self.0.lock().iter().filter(|c| **c == Call::Count).count()
    }

    pub fn filtered_terms(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Filtered { term } => Some(term.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SearchMode {
    Matches,
    Unsupported,
    Failing,
}

/// Provider over a synthetic dataset of `Item::new(0..total)`
///
/// `total = None` is an endless dataset that never reports its size.
pub struct SpyProvider {
    total: Option<usize>,
    server_matches: AHashMap<String, usize>,
    search_mode: SearchMode,
    page_gate: Option<Arc<Semaphore>>,
    search_gate: Option<Arc<Semaphore>>,
    fail_page_at: Option<usize>,
    empty_page_at: Option<usize>,
    stuck_page_at: Option<usize>,
    short_pages: Option<usize>,
    over_deliver: bool,
    log: CallLog,
}

impl SpyProvider {
    pub fn new(total: Option<usize>) -> Self {
        Self {
            total,
            server_matches: AHashMap::new(),
            search_mode: SearchMode::Matches,
            page_gate: None,
            search_gate: None,
            fail_page_at: None,
            empty_page_at: None,
            stuck_page_at: None,
            short_pages: None,
            over_deliver: false,
            log: CallLog::default(),
        }
    }

    /// Every page call waits for a permit on `page_gate()`
    pub fn gated(mut self) -> Self {
        self.page_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Every filtered call waits for a permit on `search_gate()`
    pub fn gated_search(mut self) -> Self {
        self.search_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// The `index`-th page call (0-based) fails
    pub fn failing_page(mut self, index: usize) -> Self {
        self.fail_page_at = Some(index);
        self
    }

    /// The `index`-th page call is empty but moves the cursor on
    pub fn empty_page_at(mut self, index: usize) -> Self {
        self.empty_page_at = Some(index);
        self
    }

    /// The `index`-th page call is empty and hands back the same cursor
    pub fn stuck_page_at(mut self, index: usize) -> Self {
        self.stuck_page_at = Some(index);
        self
    }

    /// Pages carry at most `n` items while more remain
    pub fn short_pages(mut self, n: usize) -> Self {
        self.short_pages = Some(n);
        self
    }

    /// Pages carry more items than requested
    pub fn over_delivering(mut self) -> Self {
        self.over_deliver = true;
        self
    }

    /// Server search for `term` yields `count` items outside the dataset
    pub fn with_server_matches(mut self, term: &str, count: usize) -> Self {
        self.server_matches.insert(term.to_string(), count);
        self
    }

    pub fn unsupported_search(mut self) -> Self {
        self.search_mode = SearchMode::Unsupported;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_mode = SearchMode::Failing;
        self
    }

    pub fn page_gate(&self) -> Option<Arc<Semaphore>> {
        self.page_gate.clone()
    }

    pub fn search_gate(&self) -> Option<Arc<Semaphore>> {
        self.search_gate.clone()
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    async fn pass(gate: Option<&Arc<Semaphore>>, scope: &CancellationScope) -> Result<()> {
        if let Some(gate) = gate {
            scope
                .run(async {
                    gate.acquire()
                        .await
                        .map(|permit| permit.forget())
                        .map_err(|e| Error::unavailable(e.to_string()))
                })
                .await?;
        }
        scope.check()
    }
}

impl DataProvider for SpyProvider {
    type Row = Item;

    async fn fetch_page(
        &self,
        continuation: Option<ContinuationToken>,
        page_size: usize,
        scope: &CancellationScope,
    ) -> Result<PaginatedResult<Item>> {
        let call_index = self.log.page_sizes().len();
        self.log.push(Call::Page {
            size: page_size,
            cursor: continuation.as_ref().map(|c| c.as_str().to_string()),
        });
        Self::pass(self.page_gate.as_ref(), scope).await?;

        if self.fail_page_at == Some(call_index) {
            return Err(Error::unavailable("connection reset"));
        }

        if self.stuck_page_at == Some(call_index) {
            let cursor = continuation.unwrap_or_else(|| ContinuationToken::new("0/0"));
            return Ok(PaginatedResult::page(Vec::new(), cursor));
        }

        // cursors are "<offset>/<call index>", unique per call
        let offset: usize = match continuation.as_ref() {
            None => 0,
            Some(c) => c
                .as_str()
                .split('/')
                .next()
                .unwrap_or_default()
                .parse()
                .map_err(|_| Error::unavailable("bad cursor"))?,
        };
        let delivered = if self.empty_page_at == Some(call_index) {
            0
        } else if self.over_deliver {
            page_size + 10
        } else {
            self.short_pages.map_or(page_size, |n| n.min(page_size))
        };
        let end = match self.total {
            Some(total) => offset.saturating_add(delivered).min(total),
            None => offset + delivered,
        };
        let items = (offset..end).map(|id| Item::new(id as u64)).collect();
        let cursor = format!("{end}/{call_index}");

        Ok(match self.total {
            Some(total) if end >= total => PaginatedResult::last(items).with_total(total),
            Some(total) => PaginatedResult::page(items, cursor).with_total(total),
            None => PaginatedResult::page(items, cursor),
        })
    }

    async fn fetch_count(&self, scope: &CancellationScope) -> Result<Option<usize>> {
        self.log.push(Call::Count);
        scope.check()?;
        Ok(self.total)
    }

    async fn fetch_filtered(
        &self,
        query: &SearchQuery,
        scope: &CancellationScope,
    ) -> Result<Vec<Item>> {
        self.log.push(Call::Filtered {
            term: query.term.to_string(),
        });
        Self::pass(self.search_gate.as_ref(), scope).await?;

        match self.search_mode {
            SearchMode::Unsupported => Err(Error::unsupported("no query translation")),
            SearchMode::Failing => Err(Error::unavailable("search backend down")),
            SearchMode::Matches => {
                let count = self.server_matches.get(&*query.term).copied().unwrap_or(0);
                let mut items: Vec<Item> = (0..count as u64)
                    .map(|i| Item {
                        id: 1_000_000 + i,
                        name: format!("{}-{i}", query.term),
                    })
                    .collect();
                // servers may repeat a row across result pages
                if let Some(first) = items.first().cloned() {
                    items.push(first);
                }
                Ok(items)
            }
        }
    }
}

/// Wait until `done` holds for the table state (or the predicate's own
/// captured state), failing the test after five seconds
pub async fn settle<P: DataProvider>(
    table: &VirtualTable<P>,
    done: impl Fn(&CacheState) -> bool,
) -> CacheState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = table.get_state();
            if done(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("table did not settle in time")
}
