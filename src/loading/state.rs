//! Per-slot loading status, URL table and progress counters.

use super::{SampleLoadingStatus, SampleProgress};
use crate::{ChipwaveError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the status display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatusRow {
    /// Slot index
    pub slot: usize,
    /// Source URL or bundle tag
    pub url: String,
    /// Current status
    pub status: SampleLoadingStatus,
}

/// Loading status of every registered slot
///
/// Transitions are guarded: a slot registers once, then leaves `loading`
/// exactly once. Invariant: `samples_loaded <= total_samples`.
#[derive(Debug, Default, Clone)]
pub struct LoadingState {
    statuses: BTreeMap<usize, SampleLoadingStatus>,
    urls: BTreeMap<usize, String>,
    total_samples: usize,
    samples_loaded: usize,
}

impl LoadingState {
    /// Create an empty loading state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a slot `loading`, record its URL and count it
    pub fn register_slot(&mut self, slot: usize, url: impl Into<String>) -> Result<()> {
        if self.statuses.contains_key(&slot) {
            return Err(ChipwaveError::AlreadyRegistered(slot));
        }
        self.statuses.insert(slot, SampleLoadingStatus::Loading);
        self.urls.insert(slot, url.into());
        self.total_samples += 1;
        Ok(())
    }

    /// Move a `loading` slot to `loaded` and count it
    pub fn mark_loaded(&mut self, slot: usize) -> Result<SampleProgress> {
        self.transition(slot, SampleLoadingStatus::Loaded)?;
        self.samples_loaded += 1;
        Ok(self.progress(slot))
    }

    /// Move a `loading` slot to `error`.
    ///
    /// Failed slots are not counted in `samples_loaded`.
    pub fn mark_error(&mut self, slot: usize) -> Result<()> {
        self.transition(slot, SampleLoadingStatus::Error)
    }

    fn transition(&mut self, slot: usize, to: SampleLoadingStatus) -> Result<()> {
        let status = self
            .statuses
            .get_mut(&slot)
            .ok_or(ChipwaveError::NotRegistered(slot))?;
        if status.is_terminal() {
            return Err(ChipwaveError::InvalidTransition {
                slot,
                from: *status,
                to,
            });
        }
        *status = to;
        Ok(())
    }

    /// Status of a slot, `None` while unregistered
    pub fn status(&self, slot: usize) -> Option<SampleLoadingStatus> {
        self.statuses.get(&slot).copied()
    }

    /// Source URL or bundle tag of a slot
    pub fn url(&self, slot: usize) -> Option<&str> {
        self.urls.get(&slot).map(String::as_str)
    }

    /// Slots registered so far
    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    /// Slots loaded successfully so far
    pub fn samples_loaded(&self) -> usize {
        self.samples_loaded
    }

    /// Slots still loading
    pub fn pending(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == SampleLoadingStatus::Loading)
            .count()
    }

    /// Snapshot of every registered slot, ordered by slot index
    pub fn rows(&self) -> Vec<SlotStatusRow> {
        self.statuses
            .iter()
            .map(|(&slot, &status)| SlotStatusRow {
                slot,
                url: self.urls.get(&slot).cloned().unwrap_or_default(),
                status,
            })
            .collect()
    }

    fn progress(&self, slot: usize) -> SampleProgress {
        SampleProgress {
            slot,
            total_samples: self.total_samples,
            samples_loaded: self.samples_loaded,
        }
    }
}
