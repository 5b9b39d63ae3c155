//! Placing encoded marker messages along the output timeline

use crate::error::{AppError, Result};
use crate::payload::marker_payload;
use crate::progress::StageProgress;
use crate::wav::read_wav;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Slack required between the start of the output and the end of the first message
pub const START_MARGIN_SECS: f64 = 0.1;

/// Slack required between consecutive messages
pub const INTERVAL_MARGIN_SECS: f64 = 0.2;

/// Turns a payload string into a marker waveform
pub trait MarkerEncoder {
    /// Render one message for `payload` at the output sample rate
    fn encode(&self, payload: &str) -> Vec<f32>;
}

/// Encoder backed by a pre-rendered mono clip
///
/// The payload is opaque to this encoder; every mark gets the same clip.
#[derive(Debug, Clone)]
pub struct ClipEncoder {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl ClipEncoder {
    /// Wrap an already rendered message at `sample_rate`
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Load the clip from a WAV file; only the first channel is used
    pub fn from_wav(path: &Path) -> Result<Self> {
        let buffer = read_wav(path)?;
        if buffer.num_channels() > 1 {
            warn!(
                path = %path.display(),
                channels = buffer.num_channels(),
                "Marker clip is not mono; using the first channel"
            );
        }
        let sample_rate = buffer.sample_rate();
        let samples = buffer.into_channels().into_iter().next().unwrap_or_default();
        Ok(Self::new(samples, sample_rate))
    }

    /// Rate the clip was rendered at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of one message in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate.max(1))
    }
}

impl MarkerEncoder for ClipEncoder {
    fn encode(&self, payload: &str) -> Vec<f32> {
        debug!(payload, samples = self.samples.len(), "Encoding marker message");
        self.samples.clone()
    }
}

/// When marks happen: the first at `start_secs`, then every `interval_secs`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkerSchedule {
    /// Time of the first mark (default: 5 s)
    pub start_secs: f64,
    /// Distance between marks (default: 10 s)
    pub interval_secs: f64,
}

impl Default for MarkerSchedule {
    fn default() -> Self {
        Self {
            start_secs: 5.0,
            interval_secs: 10.0,
        }
    }
}

impl MarkerSchedule {
    /// Create a schedule; `validate` checks it against the clip length
    pub fn new(start_secs: f64, interval_secs: f64) -> Self {
        Self {
            start_secs,
            interval_secs,
        }
    }

    /// Check that a message of `clip_secs` fits before the first mark and
    /// between consecutive marks
    pub fn validate(&self, clip_secs: f64) -> Result<()> {
        if !self.start_secs.is_finite() || !self.interval_secs.is_finite() {
            return Err(AppError::InvalidSchedule(
                "start and interval must be finite".to_string(),
            ));
        }

        let min_start = clip_secs + START_MARGIN_SECS;
        if self.start_secs < min_start {
            return Err(AppError::InvalidSchedule(format!(
                "start time {} s is too early, it should be >= {} s",
                self.start_secs, min_start
            )));
        }

        let min_interval = clip_secs + INTERVAL_MARGIN_SECS;
        if self.interval_secs < min_interval {
            return Err(AppError::InvalidSchedule(format!(
                "interval {} s is too short, the minimum allowed interval is {} s",
                self.interval_secs, min_interval
            )));
        }

        Ok(())
    }

    /// Time of mark `index` in seconds
    pub fn mark_time(&self, index: usize) -> f64 {
        self.start_secs + index as f64 * self.interval_secs
    }

    /// Render a mono marker track of `num_samples` samples
    ///
    /// Each message ends at its mark time. Marks are placed while their
    /// message starts inside the track; the last one may be cut off.
    pub fn render(
        &self,
        encoder: &dyn MarkerEncoder,
        key: &str,
        num_samples: usize,
        sample_rate: u32,
    ) -> Result<Vec<f32>> {
        if !(self.interval_secs.is_finite() && self.interval_secs > 0.0) {
            return Err(AppError::InvalidSchedule(format!(
                "interval must be positive, got {}",
                self.interval_secs
            )));
        }

        let rate = f64::from(sample_rate);
        let mut track = vec![0.0_f32; num_samples];
        let mut marks = 0;
        let mut progress = StageProgress::start("BEEPS");

        loop {
            let mark = self.mark_time(marks);
            let message = encoder.encode(&marker_payload(key, mark)?);
            let end = (mark * rate).round().max(0.0) as usize;
            let begin = end.saturating_sub(message.len());
            if begin >= num_samples {
                break;
            }

            let stop = (begin + message.len()).min(num_samples);
            track[begin..stop].copy_from_slice(&message[..stop - begin]);
            marks += 1;
            progress.advance(stop, num_samples);
        }
        progress.finish();

        debug!(marks, num_samples, sample_rate, "Rendered marker track");
        Ok(track)
    }
}
