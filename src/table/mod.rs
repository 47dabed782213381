//! Shared Wave Table
//!
//! Ordered table of waveform slots read by the playback engine. Each slot
//! exists in three parallel representations:
//! - raw: DC-free authored/decoded samples
//! - raw-raw: kept identical to raw, reserved for editing views
//! - integrated: running sum of raw, consumed by the playback engine
//!
//! Slots are appended, never removed. Until a slot finishes loading all three
//! representations point at one shared silent placeholder, so playback of a
//! pending slot is silent rather than undefined.

use crate::wave::{center_and_normalize_wave, perform_integral};
use crate::{ChipwaveError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Length of the silent placeholder buffer
pub const PLACEHOLDER_LENGTH: usize = 2;

/// Root key assumed for custom samples that don't specify one (middle C)
pub const DEFAULT_ROOT_KEY: u8 = 60;

/// One waveform slot definition
#[derive(Debug, Clone)]
pub struct ChipWave {
    /// Display name
    pub name: String,
    /// Expression (gain) scalar
    pub expression: f32,
    /// Sample buffer, shared between representations where possible
    pub samples: Arc<[f32]>,
    /// Slot holds a sampled instrument rather than a single-cycle wave
    pub is_sampled: bool,
    /// Percussive sample (no pitch tracking)
    pub is_percussion: bool,
    /// Sample supplied by the user at runtime
    pub is_custom_sampled: bool,
    /// Pitch offset in semitones applied during playback
    pub extra_sample_detune: f32,
    /// Key at which the sample plays back unpitched
    pub root_key: Option<u8>,
    /// Sample rate of the source material
    pub sample_rate: Option<u32>,
}

impl ChipWave {
    /// Single-cycle chip waveform
    pub fn chip(name: impl Into<String>, expression: f32, samples: Arc<[f32]>) -> Self {
        ChipWave {
            name: name.into(),
            expression,
            samples,
            is_sampled: false,
            is_percussion: false,
            is_custom_sampled: false,
            extra_sample_detune: 0.0,
            root_key: None,
            sample_rate: None,
        }
    }

    /// Built-in sampled instrument
    pub fn sampled(
        name: impl Into<String>,
        expression: f32,
        is_percussion: bool,
        extra_sample_detune: f32,
        samples: Arc<[f32]>,
    ) -> Self {
        ChipWave {
            is_sampled: true,
            is_percussion,
            extra_sample_detune,
            ..ChipWave::chip(name, expression, samples)
        }
    }

    /// User-supplied sample, named after its URL
    pub fn custom(
        url: impl Into<String>,
        sample_rate: u32,
        root_key: Option<u8>,
        is_percussion: bool,
        samples: Arc<[f32]>,
    ) -> Self {
        ChipWave {
            is_sampled: true,
            is_percussion,
            is_custom_sampled: true,
            root_key: Some(root_key.unwrap_or(DEFAULT_ROOT_KEY)),
            sample_rate: Some(sample_rate),
            ..ChipWave::chip(url, 1.0, samples)
        }
    }

    fn with_samples(&self, samples: Arc<[f32]>) -> Self {
        ChipWave {
            samples,
            ..self.clone()
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    raw: Vec<ChipWave>,
    raw_raw: Vec<ChipWave>,
    integrated: Vec<ChipWave>,
}

/// Process-wide table of waveform slots
#[derive(Debug)]
pub struct WaveTable {
    slots: Mutex<Slots>,
    placeholder: Arc<[f32]>,
}

impl WaveTable {
    /// Create an empty wave table
    pub fn new() -> Self {
        WaveTable {
            slots: Mutex::new(Slots::default()),
            placeholder: Arc::from(vec![0.0f32; PLACEHOLDER_LENGTH]),
        }
    }

    /// Create a table seeded with the authored chip waveforms
    pub fn with_builtin_chip_waves() -> Self {
        let table = WaveTable::new();
        for (name, expression, authored) in builtin_chip_waves() {
            let raw: Arc<[f32]> = Arc::from(center_and_normalize_wave(&authored));
            let integrated: Arc<[f32]> = Arc::from(perform_integral(&raw));
            let def = ChipWave::chip(name, expression, raw.clone());

            let mut slots = table.slots.lock();
            slots.raw.push(def.clone());
            slots.raw_raw.push(def.clone());
            slots.integrated.push(def.with_samples(integrated));
        }
        table
    }

    /// The shared silent buffer pending slots point at
    pub fn placeholder(&self) -> Arc<[f32]> {
        Arc::clone(&self.placeholder)
    }

    /// Append a slot to all three representations and return its index.
    ///
    /// The definition's samples are replaced by the shared placeholder.
    pub fn push_slot(&self, def: ChipWave) -> usize {
        let def = def.with_samples(self.placeholder());
        let mut slots = self.slots.lock();
        let index = slots.raw.len();
        slots.raw.push(def.clone());
        slots.raw_raw.push(def.clone());
        slots.integrated.push(def);
        index
    }

    /// Replace a slot's buffers in place.
    ///
    /// `raw` is shared by the raw and raw-raw representations.
    pub fn install(&self, index: usize, raw: Vec<f32>, integrated: Vec<f32>) -> Result<()> {
        let raw: Arc<[f32]> = Arc::from(raw);
        let integrated: Arc<[f32]> = Arc::from(integrated);

        let mut slots = self.slots.lock();
        if index >= slots.raw.len() {
            return Err(ChipwaveError::UnknownSlot(index));
        }
        slots.raw[index].samples = Arc::clone(&raw);
        slots.raw_raw[index].samples = raw;
        slots.integrated[index].samples = integrated;
        Ok(())
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.lock().raw.len()
    }

    /// Check whether the table has no slots
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether a slot index exists
    pub fn contains(&self, index: usize) -> bool {
        index < self.len()
    }

    /// Raw (DC-free) representation of a slot
    pub fn raw(&self, index: usize) -> Option<ChipWave> {
        self.slots.lock().raw.get(index).cloned()
    }

    /// Raw-raw (editing) representation of a slot
    pub fn raw_raw(&self, index: usize) -> Option<ChipWave> {
        self.slots.lock().raw_raw.get(index).cloned()
    }

    /// Integrated (playback) representation of a slot
    pub fn integrated(&self, index: usize) -> Option<ChipWave> {
        self.slots.lock().integrated.get(index).cloned()
    }

    /// Look up a slot index by display name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots.lock().raw.iter().position(|w| w.name == name)
    }
}

impl Default for WaveTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Authored single-cycle waves: (name, expression, samples)
fn builtin_chip_waves() -> Vec<(&'static str, f32, Vec<f32>)> {
    // Odd steps give symmetric ramps once centered
    let triangle: Vec<f32> = (0..16)
        .map(|i| {
            let step = if i < 8 { 2 * i + 1 } else { 31 - 2 * i };
            step as f32 / 15.0
        })
        .collect();
    let sawtooth: Vec<f32> = (0..32).map(|i| (2 * i + 1) as f32 / 31.0).collect();
    let rounded: Vec<f32> = (0..32)
        .map(|i| (std::f32::consts::TAU * i as f32 / 32.0).sin().clamp(-0.85, 0.85))
        .collect();

    vec![
        ("rounded", 0.94, rounded),
        ("triangle", 1.0, triangle),
        ("square", 0.5, vec![1.0, -1.0]),
        ("1/4 pulse", 0.5, vec![1.0, -1.0, -1.0, -1.0]),
        (
            "1/8 pulse",
            0.5,
            vec![1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0],
        ),
        ("sawtooth", 0.65, sawtooth),
        (
            "double saw",
            0.5,
            vec![
                0.0, -0.2, -0.4, -0.6, -0.8, -1.0, 1.0, -0.8, -0.6, -0.4, -0.2, 1.0, 0.8, 0.6, 0.4,
                0.2,
            ],
        ),
        (
            "double pulse",
            0.4,
            vec![
                1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0,
                -1.0,
            ],
        ),
        ("spiky", 0.4, vec![1.0, -1.0, 1.0, -1.0, 1.0, 0.0]),
    ]
}
