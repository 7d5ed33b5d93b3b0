//! Tokio Runtime Bridge
//!
//! Background page loading and server searches run as tokio tasks. A table
//! captures a `Spawner` at construction so it can be driven from code that is
//! not itself inside the runtime (e.g. a UI thread).
//!
//! ## Pattern
//!
//! ```text
//! UI thread
//!       │  table.start() / table.search(..)
//!       ▼
//! Spawner::spawn_named("page-loader", async { ... })
//!       │
//!       ▼
//! tokio::runtime::Handle::spawn()
//!       │
//!       ▼
//! StateChange notifications → subscribers
//! ```

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Handle used to spawn background work
#[derive(Clone, Debug)]
pub struct Spawner {
    handle: Handle,
}

impl Spawner {
    /// Capture the runtime of the current context
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| Error::Runtime {
                message: format!("no tokio runtime available: {e}"),
            })
    }

    /// Use an explicit runtime handle
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawn a detached task with a name (for debugging)
    pub fn spawn_named<F>(&self, name: &'static str, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!("Spawning tokio task: {}", name);
        self.handle.spawn(async move {
            future.await;
            tracing::debug!("Tokio task completed: {}", name);
        })
    }

    /// Get a handle to the tokio runtime for advanced use cases
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_named() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        let spawner = Spawner::current().expect("inside runtime");
        spawner
            .spawn_named("test", async move {
                flag_clone.store(true, Ordering::SeqCst);
            })
            .await
            .expect("task completes");

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_current_outside_runtime_fails() {
        assert!(matches!(Spawner::current(), Err(Error::Runtime { .. })));
    }
}
