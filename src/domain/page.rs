//! Page - Provider Response Types

use std::sync::Arc;

/// Opaque continuation marker returned by a provider
///
/// The engine never interprets it; it is handed back verbatim to fetch the
/// following page.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ContinuationToken(pub Arc<str>);

impl ContinuationToken {
    /// Create a new token from a string
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    /// Get the underlying string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContinuationToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContinuationToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page response from a provider
#[derive(Clone, Debug)]
pub struct PaginatedResult<T> {
    /// Records in provider order
    pub items: Vec<T>,
    /// `false` is terminal: no further page may be requested
    pub has_more: bool,
    /// Total size of the remote dataset, when the source reports it
    pub total_count: Option<usize>,
    /// Marker for the next page
    pub continuation: Option<ContinuationToken>,
}

impl<T> PaginatedResult<T> {
    /// A page followed by more pages
    pub fn page(items: Vec<T>, continuation: impl Into<ContinuationToken>) -> Self {
        Self {
            items,
            has_more: true,
            total_count: None,
            continuation: Some(continuation.into()),
        }
    }

    /// The final page of the dataset
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_more: false,
            total_count: None,
            continuation: None,
        }
    }

    /// Attach a total count
    pub fn with_total(mut self, total: usize) -> Self {
        self.total_count = Some(total);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Server-side search request
///
/// Carries the user's search term; the provider adapter translates it into its
/// native query form (or reports it as unsupported).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    /// Raw term as typed by the user
    pub term: Arc<str>,
}

impl SearchQuery {
    pub fn new(term: impl Into<Arc<str>>) -> Self {
        Self { term: term.into() }
    }

    /// Lowercased term for case-insensitive substring matching
    pub fn normalized(&self) -> String {
        self.term.trim().to_lowercase()
    }
}
