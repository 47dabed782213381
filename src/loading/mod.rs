//! Loading State & Progress Events
//!
//! Tracks per-slot loading status and aggregate progress counters, and
//! broadcasts a progress event each time a slot finishes loading.
//!
//! A slot moves `unregistered -> loading -> {loaded | error}` and never back.

pub mod events;
pub mod state;

pub use events::{ProgressChannel, ProgressHandler, SubscriptionId};
pub use state::{LoadingState, SlotStatusRow};

use serde::Serialize;
use std::fmt;

/// Loading status of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleLoadingStatus {
    /// Fetch or bundle load in flight
    Loading,
    /// Buffers installed
    Loaded,
    /// Fetch, decode or bundle failure; terminal for the session
    Error,
}

impl SampleLoadingStatus {
    /// Check whether the status can no longer change
    pub fn is_terminal(self) -> bool {
        !matches!(self, SampleLoadingStatus::Loading)
    }
}

impl fmt::Display for SampleLoadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SampleLoadingStatus::Loading => "loading",
            SampleLoadingStatus::Loaded => "loaded",
            SampleLoadingStatus::Error => "error",
        };
        f.pad(label)
    }
}

/// Progress event published after a slot finishes loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleProgress {
    /// Slot that just finished
    pub slot: usize,
    /// Slots registered so far
    pub total_samples: usize,
    /// Slots loaded successfully so far
    pub samples_loaded: usize,
}

impl SampleProgress {
    /// Check whether every registered slot has loaded.
    ///
    /// Never true while any slot has failed; failures don't count as loaded.
    pub fn is_complete(&self) -> bool {
        self.samples_loaded == self.total_samples
    }
}
