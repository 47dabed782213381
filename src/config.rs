//! Loader Configuration
//!
//! JSON configuration for the command-line driver: which built-in batches to
//! load, where their bundles live, and which custom samples to fetch.

use crate::loader::LoopOptions;
use crate::{ChipwaveError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default decode sample rate (44.1 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default status display polling interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// One custom sample to fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSampleConfig {
    /// Path or URL of the audio file
    pub url: String,
    /// Decode sample rate (defaults to the loader's rate)
    #[serde(default)]
    pub sample_rate: Option<u32>,
    /// Key at which the sample plays unpitched
    #[serde(default)]
    pub root_key: Option<u8>,
    /// Percussive sample
    #[serde(default)]
    pub percussion: bool,
    /// Loop options backfilled into the preset
    #[serde(default)]
    pub loop_options: LoopOptions,
}

impl CustomSampleConfig {
    /// Custom sample with default settings
    pub fn new(url: impl Into<String>) -> Self {
        CustomSampleConfig {
            url: url.into(),
            sample_rate: None,
            root_key: None,
            percussion: false,
            loop_options: LoopOptions::default(),
        }
    }
}

/// Sample loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Decode sample rate for custom samples
    pub sample_rate: u32,
    /// Directory holding `<bundle>.json` sample bundles
    pub bundle_dir: PathBuf,
    /// Built-in batch selectors to load
    pub builtin_sets: Vec<u32>,
    /// Custom samples to load
    pub samples: Vec<CustomSampleConfig>,
    /// Status display polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl LoaderConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoaderConfig = serde_json::from_str(json)
            .map_err(|e| ChipwaveError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ChipwaveError::ConfigError(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Check rates and intervals
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ChipwaveError::ConfigError(
                "sample_rate must be non-zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ChipwaveError::ConfigError(
                "poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if let Some(sample) = self.samples.iter().find(|s| s.sample_rate == Some(0)) {
            return Err(ChipwaveError::ConfigError(format!(
                "sample '{}' has a zero sample_rate",
                sample.url
            )));
        }
        Ok(())
    }

    /// Decode rate for one custom sample
    pub fn sample_rate_for(&self, sample: &CustomSampleConfig) -> u32 {
        sample.sample_rate.unwrap_or(self.sample_rate)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            bundle_dir: PathBuf::from("samples"),
            builtin_sets: Vec::new(),
            samples: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
