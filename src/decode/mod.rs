//! Binary-to-PCM Decoding
//!
//! Decoding is a capability: the sample fetcher opens one [`DecodeContext`]
//! per fetch, wraps it in a [`ScopedContext`], and the context is released
//! when the guard drops, on success and failure alike.

pub mod wav;

pub use wav::{WavContext, WavDecoder};

use crate::Result;
use std::ops::{Deref, DerefMut};

/// Decoded PCM audio, one buffer per channel
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Sample rate of the decoded buffers
    pub sample_rate: u32,
    /// De-interleaved channel buffers
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Single-channel audio
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        DecodedAudio {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Frames per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Decoder state bound to one output sample rate
pub trait DecodeContext: Send {
    /// Decode a complete audio file
    fn decode(&mut self, bytes: &[u8]) -> Result<DecodedAudio>;

    /// Release resources held by the context
    fn close(&mut self);
}

/// Factory for decode contexts
pub trait AudioDecoder: Send + Sync {
    /// Context type produced by this decoder
    type Context: DecodeContext;

    /// Open a context that decodes to `sample_rate`
    fn open_context(&self, sample_rate: u32) -> Result<Self::Context>;
}

/// Owns a decode context and closes it exactly once on drop
pub struct ScopedContext<C: DecodeContext> {
    inner: C,
}

impl<C: DecodeContext> ScopedContext<C> {
    /// Take ownership of an open context
    pub fn new(inner: C) -> Self {
        ScopedContext { inner }
    }
}

impl<C: DecodeContext> Deref for ScopedContext<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: DecodeContext> DerefMut for ScopedContext<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: DecodeContext> Drop for ScopedContext<C> {
    fn drop(&mut self) {
        self.inner.close();
    }
}
