//! Sample Fetcher
//!
//! Loads one sample from a URL into an existing wave table slot:
//! fetch -> decode (channel 0 only) -> center -> integrate -> install.
//!
//! Multi-channel sources are not down-mixed; only the first channel is used.
//! Failures are terminal for the slot: it is marked `error`, the user is
//! alerted with the URL, and no retry is attempted.

use super::SampleStore;
use crate::decode::{AudioDecoder, DecodeContext, ScopedContext};
use crate::fetch::Fetch;
use crate::table::ChipWave;
use crate::wave::{perform_integral, remove_dc_offset};
use crate::{ChipwaveError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Playback loop behaviour of a sampled instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopMode {
    /// Loop between start and end forever
    #[default]
    Loop,
    /// Alternate direction at each loop boundary
    PingPong,
    /// Play through once without looping
    PlayOnce,
    /// Play the loop region once, then stop
    PlayLoopOnce,
}

/// Loop options requested alongside a custom sample; unset fields use defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopOptions {
    /// Backfill loop settings into the preset
    pub advanced: bool,
    /// Loop start in samples (default 0)
    pub loop_start: Option<usize>,
    /// Loop end in samples (default: last sample)
    pub loop_end: Option<usize>,
    /// Loop mode (default [`LoopMode::Loop`])
    pub loop_mode: Option<LoopMode>,
    /// Play backwards (default false)
    pub backwards: Option<bool>,
    /// Start offset in samples (default 0)
    pub start_offset: Option<usize>,
}

impl LoopOptions {
    /// Fill unset fields for a buffer of `sample_count` samples
    pub fn resolve(&self, sample_count: usize) -> LoopSettings {
        LoopSettings {
            loop_start: self.loop_start.unwrap_or(0),
            loop_end: self.loop_end.unwrap_or(sample_count.saturating_sub(1)),
            loop_mode: self.loop_mode.unwrap_or_default(),
            backwards: self.backwards.unwrap_or(false),
            start_offset: self.start_offset.unwrap_or(0),
        }
    }
}

/// Fully resolved loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Loop start in samples
    pub loop_start: usize,
    /// Loop end in samples
    pub loop_end: usize,
    /// Loop mode
    pub loop_mode: LoopMode,
    /// Play backwards
    pub backwards: bool,
    /// Start offset in samples
    pub start_offset: usize,
}

/// Instrument preset settings backfilled by the fetcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetSettings {
    /// Advanced loop controls, set when requested by [`LoopOptions::advanced`]
    pub loop_controls: Option<LoopSettings>,
}

/// Loads custom samples into wave table slots
pub struct SampleFetcher<F, D> {
    store: SampleStore,
    fetch: Arc<F>,
    decoder: Arc<D>,
}

impl<F, D> Clone for SampleFetcher<F, D> {
    fn clone(&self) -> Self {
        SampleFetcher {
            store: self.store.clone(),
            fetch: Arc::clone(&self.fetch),
            decoder: Arc::clone(&self.decoder),
        }
    }
}

impl<F, D> SampleFetcher<F, D>
where
    F: Fetch + 'static,
    D: AudioDecoder + 'static,
{
    /// Create a fetcher over a shared store
    pub fn new(store: SampleStore, fetch: F, decoder: D) -> Self {
        SampleFetcher {
            store,
            fetch: Arc::new(fetch),
            decoder: Arc::new(decoder),
        }
    }

    /// The shared store
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Append a custom-sampled slot named after its URL and mark it `loading`
    pub fn register_custom_sample(
        &self,
        url: &str,
        sample_rate: u32,
        root_key: Option<u8>,
        is_percussion: bool,
    ) -> usize {
        let table = self.store.table();
        let slot = table.push_slot(ChipWave::custom(
            url,
            sample_rate,
            root_key,
            is_percussion,
            table.placeholder(),
        ));
        // A freshly appended slot can't have a status yet
        if let Err(e) = self.store.register(slot, url) {
            log::warn!("custom sample slot {}: {}", slot, e);
        }
        slot
    }

    /// Spawn [`SampleFetcher::load_sample`] on the current runtime.
    ///
    /// Fire-and-forget: the handle only reports task completion. Outcome is
    /// visible through the store's loading state and progress events.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. A slot registered with
    /// [`SampleFetcher::register_custom_sample`] then stays `loading`; register
    /// and start loads from async context.
    pub fn start_loading_sample(
        &self,
        url: impl Into<String>,
        slot: usize,
        preset: Arc<Mutex<PresetSettings>>,
        loop_options: LoopOptions,
        sample_rate: u32,
    ) -> JoinHandle<()> {
        let this = self.clone();
        let url = url.into();
        tokio::spawn(async move {
            this.load_sample(&url, slot, &preset, &loop_options, sample_rate)
                .await;
        })
    }

    /// Fetch, decode and install one sample into `slot`.
    ///
    /// The slot must exist in the wave table; it is registered with `url` if
    /// it has no status yet. A slot that is already loaded or failed is left
    /// alone.
    pub async fn load_sample(
        &self,
        url: &str,
        slot: usize,
        preset: &Mutex<PresetSettings>,
        loop_options: &LoopOptions,
        sample_rate: u32,
    ) {
        if !self.store.table().contains(slot) {
            log::error!("cannot load {} into missing slot {}", url, slot);
            return;
        }
        match self.store.status(slot) {
            None => {
                if let Err(e) = self.store.register(slot, url) {
                    log::warn!("slot {}: {}", slot, e);
                }
            }
            Some(status) if status.is_terminal() => {
                log::warn!("slot {} is already {}; not reloading {}", slot, status, url);
                return;
            }
            Some(_) => {}
        }

        match self.fetch_samples(url, sample_rate).await {
            Ok(samples) => {
                if let Err(e) = self.install(slot, &samples, preset, loop_options) {
                    self.store.fail(slot, url, &e);
                }
            }
            Err(e) => self.store.fail(slot, url, &e),
        }
    }

    /// Fetch and decode, returning channel 0
    async fn fetch_samples(&self, url: &str, sample_rate: u32) -> Result<Vec<f32>> {
        // Released on every exit path when the guard drops
        let mut context = ScopedContext::new(self.decoder.open_context(sample_rate)?);

        let bytes = self.fetch.fetch(url).await?;
        let mut audio = context.decode(&bytes)?;
        if audio.channels.is_empty() {
            return Err(ChipwaveError::Decode(format!("{} has no audio channels", url)));
        }
        Ok(audio.channels.swap_remove(0))
    }

    fn install(
        &self,
        slot: usize,
        samples: &[f32],
        preset: &Mutex<PresetSettings>,
        loop_options: &LoopOptions,
    ) -> Result<()> {
        let raw = remove_dc_offset(samples);
        let integrated = perform_integral(&raw);

        if loop_options.advanced {
            preset.lock().loop_controls = Some(loop_options.resolve(raw.len()));
        }

        self.store.table().install(slot, raw, integrated)?;
        self.store.complete(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_options_defaults() {
        let settings = LoopOptions {
            advanced: true,
            ..Default::default()
        }
        .resolve(9);
        assert_eq!(
            settings,
            LoopSettings {
                loop_start: 0,
                loop_end: 8,
                loop_mode: LoopMode::Loop,
                backwards: false,
                start_offset: 0,
            }
        );
    }

    #[test]
    fn test_loop_options_explicit_values_win() {
        let options = LoopOptions {
            advanced: true,
            loop_start: Some(2),
            loop_end: Some(5),
            loop_mode: Some(LoopMode::PingPong),
            backwards: Some(true),
            start_offset: Some(1),
        };
        let settings = options.resolve(100);
        assert_eq!(settings.loop_start, 2);
        assert_eq!(settings.loop_end, 5);
        assert_eq!(settings.loop_mode, LoopMode::PingPong);
        assert!(settings.backwards);
        assert_eq!(settings.start_offset, 1);
    }

    #[test]
    fn test_loop_options_deserialize_with_gaps() {
        let options: LoopOptions =
            serde_json::from_str(r#"{"advanced": true, "loop_mode": "play-once"}"#).unwrap();
        assert!(options.advanced);
        assert_eq!(options.loop_mode, Some(LoopMode::PlayOnce));
        assert_eq!(options.loop_end, None);
    }
}
