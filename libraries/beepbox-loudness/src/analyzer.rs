//! EBU R128 loudness statistics
//!
//! Wraps the ebur128 crate to report, for one finished buffer:
//! - Integrated loudness (LUFS) - the overall perceived loudness
//! - True peak (dBTP) - the maximum inter-sample peak level
//! - Sample peak (dBFS) - the maximum sample value

use crate::error::{LoudnessError, Result};
use crate::{MAX_CHANNELS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use beepbox_core::ChannelBuffer;
use ebur128::{EbuR128, Mode};
use std::fmt;
use tracing::debug;

/// Loudness summary of a mixed buffer
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessStats {
    /// Gated integrated loudness in LUFS
    pub integrated_lufs: f64,

    /// True peak in dBTP, maximum across channels
    pub true_peak_dbtp: f64,

    /// Sample peak in dBFS, maximum across channels
    pub sample_peak_dbfs: f64,

    /// Duration of the measured audio in seconds
    pub duration_secs: f64,

    /// Sample rate of the measured audio
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u32,
}

impl LoudnessStats {
    /// Headroom left before the true peak reaches 0 dBTP
    pub fn headroom_db(&self) -> f64 {
        -self.true_peak_dbtp
    }
}

impl fmt::Display for LoudnessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.1} LUFS, True Peak: {:.1} dBTP, Sample Peak: {:.1} dBFS",
            self.integrated_lufs, self.true_peak_dbtp, self.sample_peak_dbfs
        )
    }
}

fn linear_to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        -f64::INFINITY
    }
}

/// EBU R128 loudness meter
///
/// # Example
///
/// ```rust
/// use beepbox_loudness::LoudnessAnalyzer;
///
/// let mut analyzer = LoudnessAnalyzer::new(44_100, 2)?;
/// let frames: Vec<f32> = (0..88_200)
///     .map(|i| 0.25 * ((i / 2) as f32 * 0.06).sin())
///     .collect();
/// analyzer.add_frames(&frames)?;
///
/// let stats = analyzer.finalize()?;
/// assert!(stats.integrated_lufs < 0.0);
/// # Ok::<(), beepbox_loudness::LoudnessError>(())
/// ```
pub struct LoudnessAnalyzer {
    ebur128: EbuR128,
    sample_rate: u32,
    channels: u32,
    /// Total interleaved samples processed
    samples_processed: usize,
}

impl LoudnessAnalyzer {
    /// Create a new loudness meter
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz (8000-384000)
    /// * `channels` - Number of channels (1-8)
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(LoudnessError::InvalidSampleRate(sample_rate));
        }
        if !(1..=MAX_CHANNELS).contains(&channels) {
            return Err(LoudnessError::InvalidChannelCount(channels));
        }

        // Mode::I = gated integrated loudness
        // Mode::SAMPLE_PEAK = maximum sample value
        // Mode::TRUE_PEAK = inter-sample peak (4x oversampling)
        let mode = Mode::I | Mode::SAMPLE_PEAK | Mode::TRUE_PEAK;
        let ebur128 = EbuR128::new(channels, sample_rate, mode)?;

        Ok(Self {
            ebur128,
            sample_rate,
            channels,
            samples_processed: 0,
        })
    }

    /// Measure a whole buffer in one go
    pub fn measure(buffer: &ChannelBuffer) -> Result<LoudnessStats> {
        let channels = u32::try_from(buffer.num_channels()).unwrap_or(u32::MAX);
        let mut analyzer = Self::new(buffer.sample_rate(), channels)?;
        analyzer.add_buffer(buffer)?;
        analyzer.finalize()
    }

    /// Add interleaved frames (L R L R... for stereo)
    ///
    /// The sample count must be divisible by the channel count.
    pub fn add_frames(&mut self, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        if samples.len() % self.channels as usize != 0 {
            return Err(LoudnessError::AnalysisError(format!(
                "Sample count {} is not divisible by channel count {}",
                samples.len(),
                self.channels
            )));
        }

        self.ebur128.add_frames_f32(samples)?;
        self.samples_processed += samples.len();

        Ok(())
    }

    /// Add a planar buffer with the same layout as the meter
    pub fn add_buffer(&mut self, buffer: &ChannelBuffer) -> Result<()> {
        if buffer.num_channels() != self.channels as usize {
            return Err(LoudnessError::AnalysisError(format!(
                "Buffer has {} channels, meter expects {}",
                buffer.num_channels(),
                self.channels
            )));
        }
        if buffer.sample_rate() != self.sample_rate {
            return Err(LoudnessError::AnalysisError(format!(
                "Buffer is {} Hz, meter expects {} Hz",
                buffer.sample_rate(),
                self.sample_rate
            )));
        }

        self.add_frames(&buffer.to_interleaved())
    }

    /// Number of interleaved samples processed so far
    pub fn samples_processed(&self) -> usize {
        self.samples_processed
    }

    /// Finish the measurement
    ///
    /// # Errors
    /// `NoSamples` if nothing was added, `SilentAudio` if every gating block
    /// was below the absolute gate.
    pub fn finalize(self) -> Result<LoudnessStats> {
        if self.samples_processed == 0 {
            return Err(LoudnessError::NoSamples);
        }

        let frames = self.samples_processed / self.channels as usize;
        let duration_secs = frames as f64 / f64::from(self.sample_rate);

        let integrated_lufs = self.ebur128.loudness_global()?;
        if integrated_lufs.is_infinite() || integrated_lufs.is_nan() {
            return Err(LoudnessError::SilentAudio);
        }

        let mut true_peak = 0.0_f64;
        let mut sample_peak = 0.0_f64;
        for ch in 0..self.channels {
            true_peak = true_peak.max(self.ebur128.true_peak(ch).unwrap_or(0.0));
            sample_peak = sample_peak.max(self.ebur128.sample_peak(ch).unwrap_or(0.0));
        }

        let stats = LoudnessStats {
            integrated_lufs,
            true_peak_dbtp: linear_to_db(true_peak),
            sample_peak_dbfs: linear_to_db(sample_peak),
            duration_secs,
            sample_rate: self.sample_rate,
            channels: self.channels,
        };
        debug!(%stats, frames, "Loudness measured");

        Ok(stats)
    }
}
