//! Record - Cached Item Contracts

use std::borrow::Cow;
use std::hash::Hash;

/// An item the table can cache
///
/// The engine is otherwise opaque to record contents; it only needs a stable
/// identity to de-duplicate server search results.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + 'static;

    /// Stable identity of this record
    fn id(&self) -> Self::Id;
}

/// Formatted cell values, used for column sizing
pub trait CellText {
    /// Display text for `column`, or `None` when the record has no value
    fn cell_text(&self, column: &str) -> Option<Cow<'_, str>>;
}
