//! Level mixer: analysis, gain strategy selection and blending
//!
//! The mixer holds only its configuration. Every call derives the energy
//! envelope, dynamics curves and level curve from the host buffer and drops
//! them afterwards, so one `LevelMixer` can be shared across threads.

use crate::config::{MixConfig, MixMode};
use crate::dynamics::{estimate_dynamics, DynamicsCurves};
use crate::energy::{analyze_energy_with, EnergyEnvelope};
use crate::error::{MixError, Result};
use crate::progress::ProgressReporter;
use crate::{ANALYSIS_HOP_SAMPLES, GLOBAL_LEVEL_CEILING};
use beepbox_core::ChannelBuffer;
use tracing::{debug, info, warn};

/// Everything derived from the host reference channel for one mix
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelAnalysis {
    /// Short-term energy per analysis frame
    pub envelope: EnergyEnvelope,
    /// Energy (dB), stability and loudness percentile
    pub dynamics: DynamicsCurves,
    /// Linear marker gain per analysis frame
    pub levels: Vec<f32>,
}

/// Convert a level in dB to a linear gain
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Analysis frame time for a sample rate: 512 samples, in seconds
pub fn analysis_frame_time(sample_rate: u32) -> f64 {
    ANALYSIS_HOP_SAMPLES / f64::from(sample_rate)
}

/// `floor.max(value.min(ceiling))`: an inverted range collapses onto `floor`
fn clamp_to_range(value: f32, floor: f32, ceiling: f32) -> f32 {
    floor.max(value.min(ceiling))
}

/// Linear marker gain per frame: `energy_db + beep_level_db`, clamped to
/// `[min_beep_level_db, beep_level_db]` and converted from dB.
pub fn level_curve(energy_db: &[f32], beep_level_db: f32, min_beep_level_db: f32) -> Vec<f32> {
    energy_db
        .iter()
        .map(|&e| db_to_linear(clamp_to_range(e + beep_level_db, min_beep_level_db, beep_level_db)))
        .collect()
}

/// Walks the level curve in sample order
struct LevelCursor<'a> {
    timestamps: &'a [f64],
    levels: &'a [f32],
    sample_rate: f64,
    frame: usize,
}

impl<'a> LevelCursor<'a> {
    fn new(timestamps: &'a [f64], levels: &'a [f32], sample_rate: u32) -> Self {
        Self {
            timestamps,
            levels,
            sample_rate: f64::from(sample_rate),
            frame: 0,
        }
    }

    /// Level at `sample`, linearly interpolated between the surrounding frames.
    ///
    /// Samples must be visited in increasing order; the frame index only moves
    /// forward and stops at the second-to-last frame. Past the last frame the
    /// last level is held.
    fn level_at(&mut self, sample: usize) -> f32 {
        let t = sample as f64 / self.sample_rate;
        let last = self.levels.len() - 2;
        while self.frame < last && t >= self.timestamps[self.frame + 1] {
            self.frame += 1;
        }

        let e = self.frame;
        let span = self.timestamps[e + 1] - self.timestamps[e];
        let frac = if span > 0.0 {
            ((t - self.timestamps[e]) / span).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        (1.0 - frac) * self.levels[e] + frac * self.levels[e + 1]
    }
}

/// Marker gain strategy, chosen once per mix
enum MarkerGain<'a> {
    Constant(f32),
    Curve(LevelCursor<'a>),
}

impl MarkerGain<'_> {
    fn at(&mut self, sample: usize) -> f32 {
        match self {
            Self::Constant(gain) => *gain,
            Self::Curve(cursor) => cursor.level_at(sample),
        }
    }
}

/// One output sample: weighted sum of marker and host, clamped to [-1, 1]
fn blend(host: f32, marker: f32, marker_gain: f32, host_gain: f32) -> f32 {
    (marker_gain * marker + host_gain * host).clamp(-1.0, 1.0)
}

/// Loudness-adaptive marker mixer
///
/// # Example
///
/// ```rust
/// use beepbox_core::ChannelBuffer;
/// use beepbox_mixer::{LevelMixer, MixConfig, MixMode};
///
/// let host = ChannelBuffer::silent(1, 4_096, 44_100);
/// let marker = vec![0.5_f32; 4_096];
/// let mixer = LevelMixer::new(MixConfig::default().with_mode(MixMode::GlobalLevel));
///
/// let mut milestones = Vec::new();
/// let mixed = mixer.mix_with_progress(&host, &marker, &mut |p| milestones.push(p))?;
/// assert_eq!(milestones.last(), Some(&100));
/// assert_eq!(mixed.num_samples(), 4_096);
/// # Ok::<(), beepbox_mixer::MixError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevelMixer {
    config: MixConfig,
}

impl LevelMixer {
    /// Create a mixer with the given configuration
    pub fn new(config: MixConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    /// Run the energy and dynamics analysis on the host's first channel
    pub fn analyze(&self, host: &ChannelBuffer) -> LevelAnalysis {
        self.analyze_with(host, &mut ProgressReporter::silent())
    }

    fn analyze_with(&self, host: &ChannelBuffer, progress: &mut ProgressReporter<'_>) -> LevelAnalysis {
        let reference = host.channel(0).unwrap_or(&[]);
        let frame_time = analysis_frame_time(host.sample_rate());

        let envelope = analyze_energy_with(reference, host.sample_rate(), frame_time, |i, total| {
            progress.report_coarse((i * 75 / total) as u8, 5);
        });
        progress.report(75);

        let dynamics = estimate_dynamics(&envelope.energy, frame_time, self.config.smooth_time_secs);
        progress.report(90);

        let levels = level_curve(
            &dynamics.energy_db,
            self.config.default_beep_level_db,
            self.config.min_beep_level_db,
        );

        LevelAnalysis {
            envelope,
            dynamics,
            levels,
        }
    }

    /// Mix `marker` into every channel of `host`
    ///
    /// Marker samples beyond the host length are ignored; a shorter marker
    /// is padded with silence.
    ///
    /// # Errors
    /// Returns `MixError::InvalidConfig` if the configuration fails validation.
    pub fn mix(&self, host: &ChannelBuffer, marker: &[f32]) -> Result<ChannelBuffer> {
        self.mix_inner(host, marker, ProgressReporter::silent())
    }

    /// Same as [`LevelMixer::mix`], reporting coarse percentages (0 to 100,
    /// strictly increasing) to `progress`
    pub fn mix_with_progress(
        &self,
        host: &ChannelBuffer,
        marker: &[f32],
        progress: &mut dyn FnMut(u8),
    ) -> Result<ChannelBuffer> {
        self.mix_inner(host, marker, ProgressReporter::new(progress))
    }

    fn mix_inner(
        &self,
        host: &ChannelBuffer,
        marker: &[f32],
        mut progress: ProgressReporter<'_>,
    ) -> Result<ChannelBuffer> {
        self.config.validate()?;
        if self.config.has_inverted_range() {
            warn!(
                min_beep_level_db = self.config.min_beep_level_db,
                default_beep_level_db = self.config.default_beep_level_db,
                "Marker level floor is above the target level; levels collapse onto the floor"
            );
        }

        let num_samples = host.num_samples();
        if marker.len() < num_samples {
            warn!(
                marker_samples = marker.len(),
                host_samples = num_samples,
                "Marker is shorter than the host; padding with silence"
            );
        }

        progress.report(0);
        let analysis = self.analyze_with(host, &mut progress);

        let host_gain = db_to_linear(self.config.default_program_level_db);
        let mut marker_gain = self.select_gain(&analysis, host.sample_rate());
        progress.report(95);

        let mut mixed = vec![vec![0.0_f32; num_samples]; host.num_channels()];
        let mut peak = 0.0_f32;
        for i in 0..num_samples {
            let gain = marker_gain.at(i);
            let m = marker.get(i).copied().unwrap_or(0.0);
            for (out, input) in mixed.iter_mut().zip(host.channels()) {
                let sample = blend(input[i], m, gain, host_gain);
                out[i] = sample;
                peak = peak.max(sample.abs());
            }
        }

        if self.config.normalize && peak > 0.0 {
            for sample in mixed.iter_mut().flatten() {
                *sample /= peak;
            }
        }
        progress.report(100);

        info!(
            mode = %self.config.mode,
            frames = analysis.levels.len(),
            samples = num_samples,
            channels = host.num_channels(),
            peak,
            normalized = self.config.normalize && peak > 0.0,
            "Mixed marker into host"
        );

        ChannelBuffer::new(mixed, host.sample_rate()).map_err(MixError::from)
    }

    fn select_gain<'a>(&self, analysis: &'a LevelAnalysis, sample_rate: u32) -> MarkerGain<'a> {
        let default_gain = db_to_linear(self.config.default_beep_level_db);
        let levels = &analysis.levels;

        if levels.is_empty() {
            debug!("Host shorter than one analysis frame; using default marker gain");
            return MarkerGain::Constant(default_gain);
        }

        match self.config.mode {
            MixMode::DefaultLevel => MarkerGain::Constant(default_gain),
            MixMode::GlobalLevel => {
                let gain = clamp_to_range(
                    db_to_linear(analysis.dynamics.percentile + self.config.default_beep_level_db),
                    db_to_linear(self.config.min_beep_level_db),
                    GLOBAL_LEVEL_CEILING,
                );
                debug!(percentile = analysis.dynamics.percentile, gain, "Global marker gain");
                MarkerGain::Constant(gain)
            }
            MixMode::DynamicLevel if levels.len() == 1 => MarkerGain::Constant(levels[0]),
            MixMode::DynamicLevel => MarkerGain::Curve(LevelCursor::new(
                &analysis.envelope.timestamps,
                levels,
                sample_rate,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    #[test]
    fn db_conversion() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_linear(-3.0) - 0.707_945_8).abs() < 1e-6);
    }

    #[test]
    fn level_curve_clamps_to_range() {
        let levels = level_curve(&[10.0, 0.0, -8.0, -40.0], -3.0, -20.0);
        // 10 + -3 = 7 dB -> clamped to -3 dB
        assert!((levels[0] - db_to_linear(-3.0)).abs() < 1e-6);
        assert!((levels[1] - db_to_linear(-3.0)).abs() < 1e-6);
        assert!((levels[2] - db_to_linear(-11.0)).abs() < 1e-6);
        assert!((levels[3] - db_to_linear(-20.0)).abs() < 1e-6);
    }

    #[test]
    fn inverted_range_collapses_to_floor() {
        let levels = level_curve(&[10.0, -50.0], -30.0, -10.0);
        for level in levels {
            assert!((level - db_to_linear(-10.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn cursor_interpolates_between_frames() {
        let timestamps = [0.0, 1.0, 2.0];
        let levels = [0.0, 1.0, 0.5];
        let mut cursor = LevelCursor::new(&timestamps, &levels, 4);

        assert_eq!(cursor.level_at(0), 0.0);
        assert!((cursor.level_at(2) - 0.5).abs() < 1e-6);
        assert!((cursor.level_at(4) - 1.0).abs() < 1e-6);
        assert!((cursor.level_at(6) - 0.75).abs() < 1e-6);
        assert!((cursor.level_at(8) - 0.5).abs() < 1e-6);
        // Past the last frame the last level is held
        assert!((cursor.level_at(40) - 0.5).abs() < 1e-6);
        assert_eq!(cursor.frame, 1);
    }

    #[test]
    fn blend_clamps() {
        assert_eq!(blend(0.9, 0.9, 1.0, 1.0), 1.0);
        assert_eq!(blend(-0.9, -0.9, 1.0, 1.0), -1.0);
        assert!((blend(0.25, 0.5, 0.5, 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn analysis_uses_first_channel() {
        let loud = vec![0.8_f32; RATE as usize];
        let quiet = vec![0.0_f32; RATE as usize];
        let host = ChannelBuffer::new(vec![loud, quiet], RATE).unwrap();

        let analysis = LevelMixer::default().analyze(&host);
        assert!(!analysis.levels.is_empty());
        assert_eq!(analysis.levels.len(), analysis.envelope.len());
        assert!(analysis.dynamics.percentile > -5.0);
    }

    #[test]
    fn rejects_invalid_config_without_output() {
        let mixer = LevelMixer::new(MixConfig::default().with_smooth_time_secs(f32::NAN));
        let host = ChannelBuffer::silent(1, 1_000, RATE);
        assert!(matches!(
            mixer.mix(&host, &[0.0; 1_000]),
            Err(MixError::InvalidConfig(_))
        ));
    }

    #[test]
    fn progress_is_monotonic_and_complete() {
        let host = ChannelBuffer::new(vec![vec![0.3_f32; RATE as usize * 2]], RATE).unwrap();
        let marker = vec![0.1_f32; RATE as usize * 2];
        let mut seen = Vec::new();
        LevelMixer::default()
            .mix_with_progress(&host, &marker, &mut |p| seen.push(p))
            .unwrap();

        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{:?}", seen);
        assert!(seen.contains(&75));
        assert!(seen.contains(&90));
        assert!(seen.contains(&95));
    }

    #[test]
    fn short_marker_is_padded_with_silence() {
        let host = ChannelBuffer::silent(1, 2_000, RATE);
        let mixer = LevelMixer::new(
            MixConfig::default()
                .with_mode(MixMode::DefaultLevel)
                .with_normalize(false)
                .with_beep_level_db(0.0),
        );
        let mixed = mixer.mix(&host, &[0.5; 1_000]).unwrap();
        let out = mixed.channel(0).unwrap();
        assert!((out[999] - 0.5).abs() < 1e-6);
        assert_eq!(out[1_000], 0.0);
        assert_eq!(out[1_999], 0.0);
    }
}
