//! WAV decoding via `hound`, resampling via `rubato`.

use super::{AudioDecoder, DecodeContext, DecodedAudio};
use crate::{ChipwaveError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::io::Cursor;

/// Longest decoded buffer accepted, in frames at the context rate
pub const MAX_DECODED_FRAMES: usize = 1 << 25;

/// Largest up- or down-sampling factor between file rate and context rate
pub const MAX_RESAMPLE_RATIO: f64 = 32.0;

const SINC_LEN: usize = 256;

/// Decodes PCM and IEEE-float WAV files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    /// Create a WAV decoder
    pub fn new() -> Self {
        WavDecoder
    }
}

impl AudioDecoder for WavDecoder {
    type Context = WavContext;

    fn open_context(&self, sample_rate: u32) -> Result<WavContext> {
        if sample_rate == 0 {
            return Err(ChipwaveError::Decode(
                "decode context needs a non-zero sample rate".to_string(),
            ));
        }
        log::trace!("opened WAV decode context at {} Hz", sample_rate);
        Ok(WavContext {
            sample_rate,
            decoded: 0,
        })
    }
}

/// Decode context resampling every channel to a fixed rate
#[derive(Debug)]
pub struct WavContext {
    sample_rate: u32,
    decoded: usize,
}

impl WavContext {
    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl DecodeContext for WavContext {
    fn decode(&mut self, bytes: &[u8]) -> Result<DecodedAudio> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        // hound accepts a 0 Hz header when the byte rate is 0 as well
        if spec.sample_rate == 0 {
            return Err(ChipwaveError::Decode(
                "WAV header declares a 0 Hz sample rate".to_string(),
            ));
        }
        let channel_count = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        let mut channels = vec![Vec::with_capacity(interleaved.len() / channel_count); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        if spec.sample_rate != self.sample_rate {
            channels = resample(channels, spec.sample_rate, self.sample_rate)?;
        }

        self.decoded += 1;
        Ok(DecodedAudio {
            sample_rate: self.sample_rate,
            channels,
        })
    }

    fn close(&mut self) {
        log::trace!(
            "closed WAV decode context ({} file(s) decoded)",
            self.decoded
        );
    }
}

/// Band-limited resampling of equal-length channels
fn resample(channels: Vec<Vec<f32>>, source_rate: u32, target_rate: u32) -> Result<Vec<Vec<f32>>> {
    let frames = channels.first().map_or(0, Vec::len);
    if source_rate == target_rate || frames == 0 {
        return Ok(channels);
    }

    let ratio = target_rate as f64 / source_rate as f64;
    if !(1.0 / MAX_RESAMPLE_RATIO..=MAX_RESAMPLE_RATIO).contains(&ratio) {
        return Err(ChipwaveError::Decode(format!(
            "cannot resample {} Hz to {} Hz",
            source_rate, target_rate
        )));
    }
    let out_frames = (frames as f64 * ratio).ceil() as usize;
    if out_frames > MAX_DECODED_FRAMES {
        return Err(ChipwaveError::Decode(format!(
            "{} frames after resampling exceeds the {} frame limit",
            out_frames, MAX_DECODED_FRAMES
        )));
    }

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    // One chunk holding the whole file plus a zero tail that flushes the filter delay
    let chunk = frames + SINC_LEN;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk, channels.len())
        .map_err(|e| ChipwaveError::Decode(format!("resampler setup failed: {}", e)))?;
    let delay = resampler.output_delay();

    let padded: Vec<Vec<f32>> = channels
        .into_iter()
        .map(|mut channel| {
            channel.resize(chunk, 0.0);
            channel
        })
        .collect();
    let resampled = resampler
        .process(&padded, None)
        .map_err(|e| ChipwaveError::Decode(format!("resampling failed: {}", e)))?;

    Ok(resampled
        .into_iter()
        .map(|channel| channel.into_iter().skip(delay).take(out_frames).collect())
        .collect())
}
