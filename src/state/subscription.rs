//! Subscriptions
//!
//! Observer registry for `StateChange` notifications. Changes are queued in
//! mutation order and delivered by whichever caller wins the dispatch lock;
//! listeners may call back into the engine without deadlocking.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::state::StateChange;

type Listener = Arc<dyn Fn(&StateChange) + Send + Sync>;

/// Ordered fan-out of state changes
#[derive(Default)]
pub struct Notifier {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
    queue: Mutex<VecDeque<StateChange>>,
    dispatching: Mutex<()>,
}

impl Notifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            id,
            notifier: Arc::downgrade(self),
        }
    }

    /// Register a channel-backed listener
    pub fn subscribe_channel(self: &Arc<Self>) -> (Subscription, Receiver<StateChange>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let subscription = self.subscribe(move |change| {
            let _ = tx.send(change.clone());
        });
        (subscription, rx)
    }

    /// Queue a change; call while the mutation's lock is still held so queue
    /// order equals mutation order.
    pub fn enqueue(&self, change: StateChange) {
        self.queue.lock().push_back(change);
    }

    /// Deliver all queued changes
    pub fn dispatch(&self) {
        loop {
            let Some(guard) = self.dispatching.try_lock() else {
                // Another caller (or an outer frame on this thread) is draining.
                return;
            };
            loop {
                let next = self.queue.lock().pop_front();
                let Some(change) = next else {
                    break;
                };
                let listeners: Vec<Listener> = self
                    .listeners
                    .lock()
                    .iter()
                    .map(|(_, l)| l.clone())
                    .collect();
                for listener in listeners {
                    listener(&change);
                }
            }
            drop(guard);
            if self.queue.lock().is_empty() {
                return;
            }
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .field("queued", &self.queue.lock().len())
            .finish()
    }
}

/// Handle returned by `subscribe`; dropping it unsubscribes
#[derive(Debug)]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    notifier: Weak<Notifier>,
}

impl Subscription {
    /// Stop receiving notifications
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.remove(self.id);
        }
    }
}
