//! Chiptune Sample Loading Pipeline
//!
//! Loads sampled waveforms into a tracker's shared wave table and prepares
//! them for band-limited playback. Samples arrive either one at a time from a
//! URL (custom samples) or as named batches delivered by sample bundles
//! (built-in samples). Every loaded buffer is stored in three parallel
//! representations: raw (DC-free), raw-raw (kept identical to raw for editing)
//! and integrated (running sum, differentiated again by the playback engine).
//!
//! # Features
//! - DC-offset removal, normalization and integration of sample buffers
//! - Per-slot loading status with progress counters and progress events
//! - Fire-and-forget sample fetching with scoped decoder contexts
//! - Sequential bundle loading for built-in sample batches
//! - WAV decoding via `hound` with `rubato` resampling, local file fetching via `tokio::fs`
//!
//! # Crate feature flags
//! - `http` (opt-in): Fetch samples over HTTP(S) (enables optional `reqwest` dep)
//!
//! # Quick start
//! ```no_run
//! use chipwave::decode::WavDecoder;
//! use chipwave::fetch::FileFetcher;
//! use chipwave::loader::{LoopOptions, PresetSettings, SampleFetcher, SampleStore};
//! use chipwave::table::WaveTable;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let store = SampleStore::new(Arc::new(WaveTable::with_builtin_chip_waves()));
//! let fetcher = SampleFetcher::new(store.clone(), FileFetcher::new(), WavDecoder::new());
//! let slot = fetcher.register_custom_sample("kick.wav", 44_100, None, true);
//! let preset = Arc::new(parking_lot::Mutex::new(PresetSettings::default()));
//! fetcher
//!     .start_loading_sample("kick.wav", slot, preset, LoopOptions::default(), 44_100)
//!     .await
//!     .ok();
//! println!("{:?}", store.status(slot));
//! # }
//! ```

#![warn(missing_docs)]

pub mod config; // Loader Configuration
pub mod decode; // Binary-to-PCM Decoding
pub mod fetch; // Asset Fetching
pub mod loader; // Sample Fetcher & Bulk Loader
pub mod loading; // Loading State & Progress Events
pub mod table; // Shared Wave Table
pub mod wave; // Waveform Transforms

use loading::SampleLoadingStatus;

/// Error types for sample loading operations
#[derive(thiserror::Error, Debug)]
pub enum ChipwaveError {
    /// Transport failure or non-success response while fetching an asset
    #[error("Network error: {0}")]
    Network(String),

    /// Payload could not be decoded into PCM
    #[error("Decode error: {0}")]
    Decode(String),

    /// Sample bundle could not be loaded or parsed
    #[error("Bundle error: {0}")]
    Bundle(String),

    /// Slot index does not exist in the wave table
    #[error("Unknown slot: {0}")]
    UnknownSlot(usize),

    /// Slot already has a loading status
    #[error("Slot {0} is already registered")]
    AlreadyRegistered(usize),

    /// Slot has no loading status yet
    #[error("Slot {0} is not registered")]
    NotRegistered(usize),

    /// Status change that would leave a terminal state
    #[error("Slot {slot} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Slot index
        slot: usize,
        /// Current status
        from: SampleLoadingStatus,
        /// Requested status
        to: SampleLoadingStatus,
    },

    /// Background load requested outside a Tokio runtime
    #[error("No Tokio runtime is running")]
    NoRuntime,

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ChipwaveError {
    /// Converts a String into `ChipwaveError::Other`.
    ///
    /// Prefer the specific variants (`Network`, `Decode`, `Bundle`) where the
    /// failure class is known; callers match on them.
    fn from(msg: String) -> Self {
        ChipwaveError::Other(msg)
    }
}

impl From<&str> for ChipwaveError {
    /// Converts a string slice into `ChipwaveError::Other`.
    fn from(msg: &str) -> Self {
        ChipwaveError::Other(msg.to_string())
    }
}

impl From<hound::Error> for ChipwaveError {
    fn from(err: hound::Error) -> Self {
        ChipwaveError::Decode(err.to_string())
    }
}

/// Result type for sample loading operations
pub type Result<T> = std::result::Result<T, ChipwaveError>;

// Public API exports
pub use config::{CustomSampleConfig, LoaderConfig};
pub use decode::{AudioDecoder, DecodeContext, DecodedAudio, ScopedContext, WavDecoder};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetch, FileFetcher};
pub use loader::{
    builtin_batch, Alert, BuiltInSample, BulkLoader, BundleLoader, JsonBundleLoader, LogAlert,
    LoopMode, LoopOptions, LoopSettings, PresetSettings, SampleBatch, SampleBindings,
    SampleFetcher, SampleStore,
};
pub use loading::{LoadingState, ProgressChannel, SampleProgress, SlotStatusRow, SubscriptionId};
pub use table::{ChipWave, WaveTable};
pub use wave::{center_and_normalize_wave, center_wave, perform_integral, remove_dc_offset};
