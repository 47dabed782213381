//! Sample Fetcher & Bulk Loader
//!
//! Both loaders share one [`SampleStore`]: the wave table, the loading state,
//! the progress channel and the alert surface. Store methods never hold a
//! lock across an `.await`, so counter updates are atomic with respect to
//! other loader tasks.

pub mod builtin;
pub mod bundle;
pub mod sample;

pub use builtin::{builtin_batch, BuiltInSample, BulkLoader, SampleBatch, BUILTIN_BATCHES};
pub use bundle::{BundleLoader, JsonBundleLoader, SampleBindings};
pub use sample::{LoopMode, LoopOptions, LoopSettings, PresetSettings, SampleFetcher};

use crate::loading::{
    LoadingState, ProgressChannel, SampleLoadingStatus, SampleProgress, SlotStatusRow,
    SubscriptionId,
};
use crate::table::WaveTable;
use crate::Result;
use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::Arc;

/// User-visible failure surface
pub trait Alert: Send + Sync {
    /// Show a failure message to the user
    fn alert(&self, message: &str);
}

/// Alert surface that writes to the error log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&self, message: &str) {
        log::error!("{}", message);
    }
}

/// Shared state handed to every loader
#[derive(Clone)]
pub struct SampleStore {
    table: Arc<WaveTable>,
    state: Arc<Mutex<LoadingState>>,
    events: Arc<ProgressChannel>,
    alert: Arc<dyn Alert>,
}

impl SampleStore {
    /// Create a store around a wave table, alerting through the log
    pub fn new(table: Arc<WaveTable>) -> Self {
        Self::with_alert(table, Arc::new(LogAlert))
    }

    /// Create a store with a custom alert surface
    pub fn with_alert(table: Arc<WaveTable>, alert: Arc<dyn Alert>) -> Self {
        SampleStore {
            table,
            state: Arc::new(Mutex::new(LoadingState::new())),
            events: Arc::new(ProgressChannel::new()),
            alert,
        }
    }

    /// The shared wave table
    pub fn table(&self) -> &Arc<WaveTable> {
        &self.table
    }

    /// Status of a slot, `None` while unregistered
    pub fn status(&self, slot: usize) -> Option<SampleLoadingStatus> {
        self.state.lock().status(slot)
    }

    /// Source URL or bundle tag of a slot
    pub fn url(&self, slot: usize) -> Option<String> {
        self.state.lock().url(slot).map(str::to_string)
    }

    /// Slots registered so far
    pub fn total_samples(&self) -> usize {
        self.state.lock().total_samples()
    }

    /// Slots loaded successfully so far
    pub fn samples_loaded(&self) -> usize {
        self.state.lock().samples_loaded()
    }

    /// Snapshot of every registered slot for the status display
    pub fn rows(&self) -> Vec<SlotStatusRow> {
        self.state.lock().rows()
    }

    /// Copy of the full loading state
    pub fn snapshot(&self) -> LoadingState {
        self.state.lock().clone()
    }

    /// Receive a [`SampleProgress`] for every slot that finishes loading
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(SampleProgress) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Stop receiving progress events
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn register(&self, slot: usize, url: &str) -> Result<()> {
        self.state.lock().register_slot(slot, url)
    }

    /// Mark a slot loaded, then publish the new counters
    pub(crate) fn complete(&self, slot: usize) {
        let progress = self.state.lock().mark_loaded(slot);
        match progress {
            Ok(progress) => {
                log::debug!(
                    "slot {} loaded ({}/{})",
                    slot,
                    progress.samples_loaded,
                    progress.total_samples
                );
                self.events.publish(progress);
            }
            Err(e) => log::warn!("ignoring completion of slot {}: {}", slot, e),
        }
    }

    /// Mark a slot failed without alerting
    pub(crate) fn fail_quietly(&self, slot: usize, reason: &dyn Display) {
        let url = self.url(slot).unwrap_or_default();
        log::error!("slot {} ({}) failed: {}", slot, url, reason);
        if let Err(e) = self.state.lock().mark_error(slot) {
            log::warn!("ignoring failure of slot {}: {}", slot, e);
        }
    }

    /// Mark a slot failed and alert the user
    pub(crate) fn fail(&self, slot: usize, url: &str, reason: &dyn Display) {
        self.fail_quietly(slot, reason);
        self.alert(&format!("Failed to load {}:\n{}", url, reason));
    }

    pub(crate) fn alert(&self, message: &str) {
        self.alert.alert(message);
    }
}

impl std::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStore")
            .field("slots", &self.table.len())
            .field("state", &*self.state.lock())
            .field("events", &self.events)
            .finish()
    }
}
