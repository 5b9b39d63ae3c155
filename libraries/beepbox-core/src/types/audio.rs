/// Audio-related types
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Get the sample rate as Hz
    pub const fn as_hz(&self) -> u32 {
        self.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::CD_QUALITY
    }
}

/// Planar audio buffer owned by the caller
///
/// Samples are stored per channel as f32, nominally in [-1.0, 1.0].
/// Every channel holds exactly `num_samples()` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl ChannelBuffer {
    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// Returns `CoreError::InvalidBuffer` if there are no channels, the channels
    /// differ in length, or the sample rate is zero.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(CoreError::invalid_buffer("buffer has no channels"));
        }
        if sample_rate == 0 {
            return Err(CoreError::invalid_buffer("sample rate must be non-zero"));
        }

        let expected = channels[0].len();
        if let Some((index, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != expected)
        {
            return Err(CoreError::InvalidBuffer(format!(
                "channel {} has {} samples, expected {}",
                index,
                ch.len(),
                expected
            )));
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a mono buffer
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a zero-filled buffer
    ///
    /// A zero channel count or sample rate is bumped to one so the result is
    /// always a valid buffer.
    pub fn silent(num_channels: usize, num_samples: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; num_samples]; num_channels.max(1)],
            sample_rate: sample_rate.max(1),
        }
    }

    /// Split interleaved samples (L, R, L, R, ...) into channels
    pub fn from_interleaved(samples: &[f32], num_channels: usize, sample_rate: u32) -> Result<Self> {
        if num_channels == 0 {
            return Err(CoreError::invalid_buffer("buffer has no channels"));
        }
        if samples.len() % num_channels != 0 {
            return Err(CoreError::InvalidBuffer(format!(
                "sample count {} is not divisible by channel count {}",
                samples.len(),
                num_channels
            )));
        }

        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &sample) in channels.iter_mut().zip(frame) {
                ch.push(sample);
            }
        }

        Self::new(channels, sample_rate)
    }

    /// Interleave the channels into a single vector
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.num_samples() * self.num_channels());
        for i in 0..self.num_samples() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples of one channel, if it exists
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Take ownership of the channel vectors
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.num_samples() as f64 / f64::from(self.sample_rate)
    }

    /// Maximum absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Check if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }
}
