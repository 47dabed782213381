//! Progress event broadcast.
//!
//! Fire-and-forget: events are delivered to the handlers subscribed at
//! publish time and then dropped. A late subscriber reads the loading state
//! directly to catch up.

use super::SampleProgress;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked with every progress event
pub type ProgressHandler = Arc<dyn Fn(SampleProgress) + Send + Sync>;

/// Handle returned by [`ProgressChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer list for progress events
#[derive(Default)]
pub struct ProgressChannel {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, ProgressHandler)>>,
}

impl ProgressChannel {
    /// Create a channel with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for future events
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(SampleProgress) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Deliver an event to every current subscriber, in subscription order
    pub fn publish(&self, progress: SampleProgress) {
        // Handlers run unlocked so they may subscribe or unsubscribe
        let handlers: Vec<ProgressHandler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(progress);
        }
    }

    /// Number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl std::fmt::Debug for ProgressChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
