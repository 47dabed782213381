use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chipwave::loading::SampleLoadingStatus;
use chipwave::{
    BulkLoader, CustomSampleConfig, Fetch, FileFetcher, JsonBundleLoader,
    LoaderConfig, PresetSettings, SampleFetcher, SampleStore, SlotStatusRow, WavDecoder,
    WaveTable,
};
use parking_lot::Mutex;

const USAGE: &str = "Usage:
  chipwave [--config <file.json>] [--set <n>]... [--bundles <dir>] [--rate <hz>] [sample]...

Flags:
  --config <file>    Read loader configuration from a JSON file
  --set <n>          Load a built-in sample batch (0 legacy, 1 nintaribox, 2 mario paintbox)
  --bundles <dir>    Directory holding <bundle>.json sample bundles
  --rate <hz>        Decode sample rate for custom samples
  -h, --help         Show this help

Examples:
  chipwave --set 1 --bundles assets/bundles
  chipwave kick.wav file:///tmp/pad.wav
";

/// Routes `http(s)://` URLs to the HTTP fetcher and everything else to disk
#[derive(Debug, Clone, Default)]
struct SchemeFetcher {
    file: FileFetcher,
    #[cfg(feature = "http")]
    http: chipwave::HttpFetcher,
}

impl Fetch for SchemeFetcher {
    async fn fetch(&self, url: &str) -> chipwave::Result<Vec<u8>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            #[cfg(feature = "http")]
            return self.http.fetch(url).await;
            #[cfg(not(feature = "http"))]
            return Err(chipwave::ChipwaveError::Network(format!(
                "{}: rebuild with `--features http` to fetch over HTTP",
                url
            )));
        }
        self.file.fetch(url).await
    }
}

fn parse_args() -> anyhow::Result<Option<LoaderConfig>> {
    let mut config_path: Option<String> = None;
    let mut sets: Vec<u32> = Vec::new();
    let mut bundle_dir: Option<String> = None;
    let mut rate: Option<u32> = None;
    let mut samples: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--config" => config_path = Some(args.next().context("--config requires a path")?),
            "--set" => {
                let value = args.next().context("--set requires a batch number")?;
                sets.push(
                    value
                        .parse()
                        .with_context(|| format!("invalid batch number: {}", value))?,
                );
            }
            "--bundles" => {
                bundle_dir = Some(args.next().context("--bundles requires a directory")?)
            }
            "--rate" => {
                let value = args.next().context("--rate requires a sample rate")?;
                rate = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid sample rate: {}", value))?,
                );
            }
            _ if arg.starts_with('-') => anyhow::bail!("unknown flag: {}", arg),
            _ => samples.push(arg),
        }
    }

    let mut config = match config_path {
        Some(path) => LoaderConfig::load(&path)?,
        None => LoaderConfig::default(),
    };
    config.builtin_sets.extend(sets);
    config
        .samples
        .extend(samples.into_iter().map(CustomSampleConfig::new));
    if let Some(dir) = bundle_dir {
        config.bundle_dir = dir.into();
    }
    if let Some(rate) = rate {
        config.sample_rate = rate;
    }
    config.validate()?;

    if config.builtin_sets.is_empty() && config.samples.is_empty() {
        return Ok(None);
    }
    Ok(Some(config))
}

fn print_row(row: &SlotStatusRow) {
    println!("  [{:>3}] {:<8} {}", row.slot, row.status, row.url);
}

/// Poll the store until no slot is loading and nothing changed since the last poll
async fn watch_status(store: &SampleStore, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    let mut last: HashMap<usize, SampleLoadingStatus> = HashMap::new();
    loop {
        ticker.tick().await;
        let rows = store.rows();
        let mut changed = false;
        for row in &rows {
            if last.insert(row.slot, row.status) != Some(row.status) {
                print_row(row);
                changed = true;
            }
        }
        let pending = rows
            .iter()
            .any(|r| r.status == SampleLoadingStatus::Loading);
        if !changed && !pending {
            break;
        }
    }
}

async fn run(config: LoaderConfig) -> anyhow::Result<()> {
    println!("Chipwave - Sample Loader");
    println!("========================\n");

    let table = Arc::new(WaveTable::with_builtin_chip_waves());
    let store = SampleStore::new(Arc::clone(&table));
    let chip_waves = table.len();

    store.subscribe(|progress| {
        log::info!(
            "progress: {}/{} samples loaded",
            progress.samples_loaded,
            progress.total_samples
        );
    });

    let bulk = BulkLoader::new(store.clone(), JsonBundleLoader::new(&config.bundle_dir));
    let fetcher = SampleFetcher::new(store.clone(), SchemeFetcher::default(), WavDecoder::new());

    let mut handles = Vec::new();
    for &set in &config.builtin_sets {
        handles.extend(bulk.load_builtin_samples(set));
    }

    let mut presets = Vec::new();
    for sample in &config.samples {
        let rate = config.sample_rate_for(sample);
        let slot = fetcher.register_custom_sample(&sample.url, rate, sample.root_key, sample.percussion);
        let preset = Arc::new(Mutex::new(PresetSettings::default()));
        handles.push(fetcher.start_loading_sample(
            sample.url.clone(),
            slot,
            Arc::clone(&preset),
            sample.loop_options.clone(),
            rate,
        ));
        presets.push((slot, preset));
    }

    println!("Loading {} sample(s)...", store.total_samples());
    watch_status(&store, Duration::from_millis(config.poll_interval_ms)).await;

    for handle in handles {
        handle.await.context("loader task panicked")?;
    }

    let failed = store
        .rows()
        .iter()
        .filter(|r| r.status == SampleLoadingStatus::Error)
        .count();

    println!("\n=== Loading Summary ===");
    println!("Chip waves:        {}", chip_waves);
    println!("Samples loaded:    {}/{}", store.samples_loaded(), store.total_samples());
    println!("Failed:            {}", failed);
    for (slot, preset) in presets {
        if let Some(loop_controls) = preset.lock().loop_controls {
            println!(
                "Slot {:>3} loop:     {}..{} ({:?}{})",
                slot,
                loop_controls.loop_start,
                loop_controls.loop_end,
                loop_controls.loop_mode,
                if loop_controls.backwards { ", backwards" } else { "" }
            );
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match parse_args()? {
        Some(config) => run(config).await,
        None => {
            eprint!("{}", USAGE);
            Ok(())
        }
    }
}
