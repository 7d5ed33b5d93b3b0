//! Cancellation Scopes
//!
//! Two-level cancellation built on `tokio_util`'s `CancellationToken`: one
//! session scope per table, and an operation scope per load run or search.
//! Cancelling a scope cancels every scope derived from it.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Level of a scope in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLevel {
    /// Lives as long as the owning table
    Session,
    /// One logical request
    Operation,
}

/// Composable cancellation signal
#[derive(Debug, Clone)]
pub struct CancellationScope {
    token: CancellationToken,
    level: ScopeLevel,
}

impl CancellationScope {
    /// Create a new root scope
    pub fn session() -> Self {
        Self {
            token: CancellationToken::new(),
            level: ScopeLevel::Session,
        }
    }

    /// Create an operation scope, cancelled together with `self`
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            level: ScopeLevel::Operation,
        }
    }

    pub fn level(&self) -> ScopeLevel {
        self.level
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True if this scope or any ancestor was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail fast with `Error::Cancelled` when already cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the scope is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Run `future` until it completes or the scope is cancelled
    ///
    /// Cancellation wins ties, so a cancelled scope never yields a result.
    pub async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            result = future => result,
        }
    }

    /// The underlying token, for providers that integrate with tokio-util
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
