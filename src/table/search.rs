//! Search Outcomes
//!
//! Result types for `VirtualTable::search`. A search is answered from the
//! cache whenever the cache can answer authoritatively; otherwise a single
//! server-side search is issued and its result arrives through a
//! `PendingSearch`.

use std::sync::Arc;

use ahash::AHashSet;
use tokio::sync::oneshot;

use crate::domain::Record;
use crate::state::ErrorKind;

/// Immediate answer of a `search` call
#[derive(Debug)]
pub enum SearchOutcome<T> {
    /// Matches found in the cache; always true positives
    Local(Vec<T>),
    /// No match, and the cache holds the full dataset
    Empty,
    /// No local match in an incomplete cache; a server search is in flight
    Pending(PendingSearch<T>),
    /// Empty term: the view is back to the full cache
    Cleared,
}

impl<T> SearchOutcome<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, SearchOutcome::Pending(_))
    }

    /// Items known right now (empty while pending)
    pub fn items(&self) -> &[T] {
        match self {
            SearchOutcome::Local(items) => items,
            _ => &[],
        }
    }

    /// Wait for the final item set
    ///
    /// Local and empty outcomes resolve immediately; a pending search yields
    /// the server results, or nothing if it failed or was superseded.
    pub async fn into_items(self) -> Vec<T> {
        match self {
            SearchOutcome::Local(items) => items,
            SearchOutcome::Empty | SearchOutcome::Cleared => Vec::new(),
            SearchOutcome::Pending(pending) => match pending.resolve().await {
                SearchResolution::Found(items) => items,
                _ => Vec::new(),
            },
        }
    }
}

/// Final state of a server-side search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResolution<T> {
    /// Server results; they now back the visible row set
    Found(Vec<T>),
    /// Provider error; the visible set stays empty
    Failed(ErrorKind),
    /// The provider cannot express this search; the negative stays inconclusive
    Unsupported,
    /// Superseded by a newer search or torn down; discarded silently
    Cancelled,
}

/// Handle to an in-flight server search
#[derive(Debug)]
pub struct PendingSearch<T> {
    term: Arc<str>,
    rx: oneshot::Receiver<SearchResolution<T>>,
}

impl<T> PendingSearch<T> {
    pub(crate) fn new(term: Arc<str>, rx: oneshot::Receiver<SearchResolution<T>>) -> Self {
        Self { term, rx }
    }

    /// The term this search was issued for
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Wait for the server search to settle
    pub async fn resolve(self) -> SearchResolution<T> {
        // A dropped sender means the task never finished (runtime shut down).
        self.rx.await.unwrap_or(SearchResolution::Cancelled)
    }

    /// Poll without waiting; `None` while still in flight
    pub fn try_resolve(&mut self) -> Option<SearchResolution<T>> {
        match self.rx.try_recv() {
            Ok(resolution) => Some(resolution),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(SearchResolution::Cancelled),
        }
    }
}

/// Record set currently addressed by row indices
#[derive(Debug, Clone)]
pub(crate) enum View<T> {
    /// The background cache
    All,
    /// Indices into the background cache
    Filtered(Vec<usize>),
    /// Server results, held apart from the cache
    Server(Vec<T>),
}

impl<T> Default for View<T> {
    fn default() -> Self {
        View::All
    }
}

/// Drop repeated identities, keeping the first occurrence
pub(crate) fn dedupe_by_id<T: Record>(items: Vec<T>) -> Vec<T> {
    let mut seen = AHashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row(u32, &'static str);

    impl Record for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let rows = vec![Row(1, "a"), Row(2, "b"), Row(1, "c")];
        assert_eq!(dedupe_by_id(rows), vec![Row(1, "a"), Row(2, "b")]);
    }

    #[tokio::test]
    async fn test_dropped_sender_resolves_cancelled() {
        let (tx, rx) = oneshot::channel::<SearchResolution<Row>>();
        drop(tx);
        let pending = PendingSearch::new("x".into(), rx);
        assert_eq!(pending.resolve().await, SearchResolution::Cancelled);
    }

    #[tokio::test]
    async fn test_try_resolve() {
        let (tx, rx) = oneshot::channel();
        let mut pending = PendingSearch::new("x".into(), rx);
        assert!(pending.try_resolve().is_none());

        tx.send(SearchResolution::Found(vec![Row(7, "x")]))
            .expect("receiver alive");
        assert_eq!(
            pending.try_resolve(),
            Some(SearchResolution::Found(vec![Row(7, "x")]))
        );
    }
}
