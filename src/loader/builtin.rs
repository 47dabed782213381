//! Built-in sample batches and the bulk loader.
//!
//! A batch registers all of its slots up front (pointing at the silent
//! placeholder), loads its bundles strictly one after another, then backfills
//! every slot in registration order.

use super::bundle::{BundleLoader, SampleBindings};
use super::SampleStore;
use crate::table::ChipWave;
use crate::wave::{perform_integral, remove_dc_offset};
use crate::{ChipwaveError, Result};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// One built-in sample definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltInSample {
    /// Display name, also the binding name inside the bundles
    pub name: &'static str,
    /// Expression (gain) scalar
    pub expression: f32,
    /// Percussive sample
    pub is_percussion: bool,
    /// Pitch offset in semitones
    pub extra_sample_detune: f32,
}

/// Named group of built-in samples loaded together
#[derive(Debug, Clone, Copy)]
pub struct SampleBatch {
    /// Selector passed to [`BulkLoader::load_builtin_samples`]
    pub set: u32,
    /// URL tag recorded for every slot of the batch
    pub tag: &'static str,
    /// Bundles to load, in order
    pub bundles: &'static [&'static str],
    /// Sample definitions, in slot order
    pub samples: &'static [BuiltInSample],
}

const fn sample(
    name: &'static str,
    expression: f32,
    is_percussion: bool,
    extra_sample_detune: f32,
) -> BuiltInSample {
    BuiltInSample {
        name,
        expression,
        is_percussion,
        extra_sample_detune,
    }
}

const LEGACY_SAMPLES: &[BuiltInSample] = &[
    sample("paandorasbox kick", 4.0, true, 0.0),
    sample("paandorasbox snare", 3.0, true, 0.0),
    sample("paandorasbox piano1", 3.0, false, 2.0),
    sample("paandorasbox WIDE", 3.0, false, 0.0),
    sample("paandorasbox overdrive", 1.0, false, -2.0),
    sample("paandorasbox trumpet", 3.0, false, 1.2),
    sample("paandorasbox saxophone", 2.0, false, -5.0),
    sample("paandorasbox orchestrahit", 2.0, false, 4.2),
    sample("paandorasbox choir", 2.0, false, -3.0),
    sample("paandorasbox flute", 2.0, false, -6.0),
    sample("paandorasbox standardkick", 2.0, true, -7.0),
    sample("paandorasbox closedhihat", 2.0, true, 5.0),
    sample("wario land 4 brass", 1.0, false, 0.0),
    sample("kirby pluck", 1.0, false, 0.0),
];

const NINTARIBOX_SAMPLES: &[BuiltInSample] = &[
    sample("chronoperc1final", 4.0, true, 0.0),
    sample("synthkickfm", 4.0, true, -4.89),
    sample("mcwoodclick1", 4.0, true, 0.0),
    sample("acoustic snare", 1.0, true, -7.0),
];

const MARIO_PAINTBOX_SAMPLES: &[BuiltInSample] = &[
    sample("cat", 1.0, false, -3.0),
    sample("gameboy", 1.0, false, 7.0),
    sample("mario", 1.0, false, 0.0),
    sample("drum", 1.0, true, 4.0),
    sample("yoshi", 1.0, false, -16.0),
    sample("star", 1.0, false, -16.0),
    sample("fire flower", 1.0, false, -1.0),
    sample("dog", 1.0, false, -1.0),
    sample("oink", 1.0, false, 3.2),
    sample("swan", 1.0, false, 1.0),
    sample("face", 1.0, false, -12.5),
];

/// Every built-in batch, indexed by selector
pub const BUILTIN_BATCHES: &[SampleBatch] = &[
    SampleBatch {
        set: 0,
        tag: "legacySamples",
        bundles: &[
            "samples",
            "samples2",
            "samples3",
            "drumsamples",
            "wario_samples",
            "kirby_samples",
        ],
        samples: LEGACY_SAMPLES,
    },
    SampleBatch {
        set: 1,
        tag: "nintariboxSamples",
        bundles: &["nintaribox_samples"],
        samples: NINTARIBOX_SAMPLES,
    },
    SampleBatch {
        set: 2,
        tag: "marioPaintboxSamples",
        bundles: &["mario_paintbox_samples"],
        samples: MARIO_PAINTBOX_SAMPLES,
    },
];

/// Look up a built-in batch by selector
pub fn builtin_batch(set: u32) -> Option<&'static SampleBatch> {
    BUILTIN_BATCHES.iter().find(|batch| batch.set == set)
}

/// Loads built-in sample batches from bundles
pub struct BulkLoader<B> {
    store: SampleStore,
    bundles: Arc<B>,
}

impl<B> Clone for BulkLoader<B> {
    fn clone(&self) -> Self {
        BulkLoader {
            store: self.store.clone(),
            bundles: Arc::clone(&self.bundles),
        }
    }
}

impl<B> BulkLoader<B>
where
    B: BundleLoader + 'static,
{
    /// Create a bulk loader over a shared store
    pub fn new(store: SampleStore, bundles: B) -> Self {
        BulkLoader {
            store,
            bundles: Arc::new(bundles),
        }
    }

    /// The shared store
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Register and start loading a built-in batch.
    ///
    /// An unknown selector is logged and does nothing, as is a call made
    /// outside a Tokio runtime. Calling this twice for the same selector
    /// registers a second set of slots.
    pub fn load_builtin_samples(&self, set: u32) -> Option<JoinHandle<()>> {
        let Some(batch) = builtin_batch(set) else {
            log::warn!("unknown built-in sample set {}", set);
            return None;
        };
        match self.load_batch(batch) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("cannot load {}: {}", batch.tag, e);
                None
            }
        }
    }

    /// Register every slot of `batch` now, then load and backfill in the background.
    ///
    /// Fails with [`ChipwaveError::NoRuntime`] before touching the table when
    /// called outside a Tokio runtime.
    pub fn load_batch(&self, batch: &'static SampleBatch) -> Result<JoinHandle<()>> {
        let runtime = Handle::try_current().map_err(|_| ChipwaveError::NoRuntime)?;
        let slots = self.register_batch(batch);
        let this = self.clone();
        Ok(runtime.spawn(async move {
            this.backfill(batch, &slots).await;
        }))
    }

    /// Append placeholder slots for `batch` and mark them `loading`
    pub fn register_batch(&self, batch: &SampleBatch) -> Vec<usize> {
        let table = self.store.table();
        let slots: Vec<usize> = batch
            .samples
            .iter()
            .map(|def| {
                let slot = table.push_slot(ChipWave::sampled(
                    def.name,
                    def.expression,
                    def.is_percussion,
                    def.extra_sample_detune,
                    table.placeholder(),
                ));
                if let Err(e) = self.store.register(slot, batch.tag) {
                    log::warn!("built-in slot {}: {}", slot, e);
                }
                slot
            })
            .collect();
        log::info!(
            "registered {} {} slot(s), {} bundle(s) to load",
            slots.len(),
            batch.tag,
            batch.bundles.len()
        );
        slots
    }

    /// Load bundles in order, merging their bindings
    async fn load_bundles(
        &self,
        batch: &SampleBatch,
    ) -> std::result::Result<SampleBindings, (&'static str, ChipwaveError)> {
        let mut bindings = SampleBindings::new();
        for &name in batch.bundles {
            let loaded = self
                .bundles
                .load_bundle(name)
                .await
                .map_err(|e| (name, e))?;
            log::info!("loaded bundle {} ({} binding(s))", name, loaded.len());
            bindings.extend(loaded);
        }
        Ok(bindings)
    }

    async fn backfill(&self, batch: &SampleBatch, slots: &[usize]) {
        let bindings = match self.load_bundles(batch).await {
            Ok(bindings) => bindings,
            Err((bundle, e)) => {
                for &slot in slots {
                    self.store.fail_quietly(slot, &e);
                }
                self.store.alert(&format!(
                    "Failed to load {} bundle {}:\n{}",
                    batch.tag, bundle, e
                ));
                return;
            }
        };

        for (def, &slot) in batch.samples.iter().zip(slots) {
            let Some(authored) = bindings.get(def.name) else {
                let reason = ChipwaveError::Bundle(format!("no binding named {:?}", def.name));
                self.store.fail(slot, batch.tag, &reason);
                continue;
            };

            let raw = remove_dc_offset(authored);
            let integrated = perform_integral(&raw);
            match self.store.table().install(slot, raw, integrated) {
                Ok(()) => self.store.complete(slot),
                Err(e) => self.store.fail(slot, batch.tag, &e),
            }
        }
    }
}
