//! Fake fetch, decode, bundle and alert capabilities for integration tests.

#![allow(dead_code)]

use chipwave::{
    Alert, AudioDecoder, BundleLoader, ChipwaveError, DecodeContext, DecodedAudio, Fetch,
    SampleBindings, SampleProgress, SampleStore, WaveTable,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const PCM: [f32; 8] = [0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0];

/// 16-bit mono WAV whose header claims `sample_rate` and `byte_rate`
pub fn wav_with_rates(sample_rate: u32, byte_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in [0i16, 16384, 0, -16384] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    let mut bytes = cursor.into_inner();
    bytes[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    bytes[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    bytes
}

#[derive(Default)]
pub struct RecordingAlert {
    pub messages: Mutex<Vec<String>>,
}

impl Alert for RecordingAlert {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub fn store() -> (SampleStore, Arc<RecordingAlert>) {
    let alerts = Arc::new(RecordingAlert::default());
    let store = SampleStore::with_alert(Arc::new(WaveTable::new()), alerts.clone());
    (store, alerts)
}

pub fn record_events(store: &SampleStore) -> Arc<Mutex<Vec<SampleProgress>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(move |p| sink.lock().push(p));
    events
}

pub struct FakeFetch {
    response: Result<Vec<u8>, String>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeFetch {
    pub fn ok() -> Self {
        FakeFetch {
            response: Ok(b"RIFF-ish".to_vec()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn not_ok(status: &str) -> Self {
        FakeFetch {
            response: Err(status.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Fetch for FakeFetch {
    async fn fetch(&self, _url: &str) -> chipwave::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.response.clone().map_err(ChipwaveError::Network)
    }
}

#[derive(Clone, Default)]
pub struct ContextCounters {
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl ContextCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct FakeDecoder {
    output: Result<Vec<Vec<f32>>, String>,
    pub counters: ContextCounters,
}

impl FakeDecoder {
    pub fn channels(channels: Vec<Vec<f32>>) -> Self {
        FakeDecoder {
            output: Ok(channels),
            counters: ContextCounters::default(),
        }
    }

    pub fn pcm(samples: &[f32]) -> Self {
        Self::channels(vec![samples.to_vec()])
    }

    pub fn failing(reason: &str) -> Self {
        FakeDecoder {
            output: Err(reason.to_string()),
            counters: ContextCounters::default(),
        }
    }
}

pub struct FakeContext {
    sample_rate: u32,
    output: Result<Vec<Vec<f32>>, String>,
    closed: Arc<AtomicUsize>,
}

impl DecodeContext for FakeContext {
    fn decode(&mut self, _bytes: &[u8]) -> chipwave::Result<DecodedAudio> {
        let channels = self.output.clone().map_err(ChipwaveError::Decode)?;
        Ok(DecodedAudio {
            sample_rate: self.sample_rate,
            channels,
        })
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl AudioDecoder for FakeDecoder {
    type Context = FakeContext;

    fn open_context(&self, sample_rate: u32) -> chipwave::Result<FakeContext> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeContext {
            sample_rate,
            output: self.output.clone(),
            closed: Arc::clone(&self.counters.closed),
        })
    }
}

/// In-memory bundles that record load order and concurrency
#[derive(Default)]
pub struct FakeBundles {
    bundles: HashMap<String, SampleBindings>,
    pub calls: Arc<Mutex<Vec<String>>>,
    in_flight: AtomicUsize,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl FakeBundles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, name: &str, bindings: &[(&str, Vec<f32>)]) -> Self {
        let map = bindings
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.bundles.insert(name.to_string(), map);
        self
    }
}

impl BundleLoader for FakeBundles {
    async fn load_bundle(&self, name: &str) -> chipwave::Result<SampleBindings> {
        self.calls.lock().push(name.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.bundles
            .get(name)
            .cloned()
            .ok_or_else(|| ChipwaveError::Bundle(format!("{} not found", name)))
    }
}
