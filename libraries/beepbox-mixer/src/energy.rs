//! Short-term energy envelope of the host reference channel
//!
//! Frames are spaced one hop apart and weighted by a Hanning window four hops
//! wide. Frames whose window hangs over the start of the buffer are still
//! divided by the full window area, which biases the first few values low.
//! Existing outputs depend on that bias, so it is kept.

use crate::window::hanning;
use tracing::debug;

/// Energy estimates with one timestamp per analysis frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnergyEnvelope {
    /// Frame times in seconds, `i * frame_time`
    pub timestamps: Vec<f64>,
    /// Linear short-term power per frame (non-negative)
    pub energy: Vec<f32>,
    /// Seconds between frames
    pub frame_time: f64,
    /// Samples between frames
    pub hop_size: usize,
}

impl EnergyEnvelope {
    /// Number of analysis frames
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    /// True when the buffer was too short for a single frame
    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// Hop size in samples for a frame time: `round(frame_time * sample_rate)`, at least 1
pub fn hop_size(frame_time: f64, sample_rate: u32) -> usize {
    ((frame_time * f64::from(sample_rate)).round() as usize).max(1)
}

/// Number of analysis frames: `floor(num_samples / hop) - 2`, or zero if negative
pub fn frame_count(num_samples: usize, hop: usize) -> usize {
    (num_samples / hop.max(1)).saturating_sub(2)
}

/// Compute the energy envelope of `reference`
pub fn analyze_energy(reference: &[f32], sample_rate: u32, frame_time: f64) -> EnergyEnvelope {
    analyze_energy_with(reference, sample_rate, frame_time, |_, _| {})
}

/// Same as [`analyze_energy`], calling `on_frame(index, total)` before each frame
pub(crate) fn analyze_energy_with(
    reference: &[f32],
    sample_rate: u32,
    frame_time: f64,
    mut on_frame: impl FnMut(usize, usize),
) -> EnergyEnvelope {
    let hop = hop_size(frame_time, sample_rate);
    let mut window_size = 4 * hop;
    window_size -= window_size % 2;
    let half = window_size / 2;

    let window = hanning(window_size + 1);
    let weights = window.weights();
    let area = window.area();

    let num_samples = reference.len();
    let frames = frame_count(num_samples, hop);
    debug!(
        hop,
        window_size,
        frames,
        num_samples,
        "Computing energy envelope"
    );

    let mut timestamps = Vec::with_capacity(frames);
    let mut energy = Vec::with_capacity(frames);

    for i in 0..frames {
        on_frame(i, frames);

        let center = i * hop;
        // Window index 0 sits at `center - half`, possibly before the buffer
        let offset = half.saturating_sub(center);
        let begin = center.saturating_sub(half);
        let end = (center + half).min(num_samples - 1);

        let sum: f32 = reference[begin..=end]
            .iter()
            .zip(&weights[offset..])
            .map(|(&s, &w)| s * s * w)
            .sum();

        timestamps.push(i as f64 * frame_time);
        energy.push(sum / area);
    }

    EnergyEnvelope {
        timestamps,
        energy,
        frame_time,
        hop_size: hop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;
    const FRAME_TIME: f64 = 512.0 / 44_100.0;

    #[test]
    fn hop_from_frame_time() {
        assert_eq!(hop_size(FRAME_TIME, RATE), 512);
        assert_eq!(hop_size(512.0 / 48_000.0, 48_000), 512);
        assert_eq!(hop_size(0.01, 44_100), 441);
        assert_eq!(hop_size(0.0, 44_100), 1);
    }

    #[test]
    fn frame_count_formula() {
        assert_eq!(frame_count(44_100, 512), 44_100 / 512 - 2);
        assert_eq!(frame_count(512 * 3, 512), 1);
        assert_eq!(frame_count(1023, 512), 0);
        assert_eq!(frame_count(100, 512), 0);
    }

    #[test]
    fn timestamps_are_evenly_spaced() {
        let samples = vec![0.25_f32; RATE as usize];
        let envelope = analyze_energy(&samples, RATE, FRAME_TIME);

        assert_eq!(envelope.len(), frame_count(samples.len(), 512));
        assert_eq!(envelope.hop_size, 512);
        for (i, pair) in envelope.timestamps.windows(2).enumerate() {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - FRAME_TIME).abs() < 1e-12, "gap at {}", i);
        }
        assert_eq!(envelope.timestamps[0], 0.0);
    }

    #[test]
    fn constant_signal_energy_is_power() {
        let amplitude = 0.5_f32;
        let samples = vec![amplitude; RATE as usize];
        let envelope = analyze_energy(&samples, RATE, FRAME_TIME);

        // Interior frames see the full window: energy == amplitude^2
        let expected = amplitude * amplitude;
        for &e in &envelope.energy[4..envelope.len() - 1] {
            assert!((e - expected).abs() < 1e-3, "energy {}", e);
        }
    }

    #[test]
    fn first_frame_keeps_full_area_bias() {
        let samples = vec![0.5_f32; RATE as usize];
        let envelope = analyze_energy(&samples, RATE, FRAME_TIME);

        // Frame 0 only sees the right half of the window, but is divided by
        // the full area, so it reads roughly half the true power.
        let interior = envelope.energy[10];
        let first = envelope.energy[0];
        assert!((first / interior - 0.5).abs() < 0.01, "ratio {}", first / interior);
        assert!(envelope.energy[1] > first);
    }

    #[test]
    fn silence_is_zero_energy() {
        let samples = vec![0.0_f32; 10_000];
        let envelope = analyze_energy(&samples, RATE, FRAME_TIME);
        assert!(!envelope.is_empty());
        assert!(envelope.energy.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn short_buffer_has_no_frames() {
        let samples = vec![0.3_f32; 800];
        let envelope = analyze_energy(&samples, RATE, FRAME_TIME);
        assert!(envelope.is_empty());
        assert!(envelope.timestamps.is_empty());

        let envelope = analyze_energy(&[], RATE, FRAME_TIME);
        assert!(envelope.is_empty());
    }

    #[test]
    fn progress_callback_sees_every_frame() {
        let samples = vec![0.1_f32; 20_000];
        let mut seen = Vec::new();
        let envelope = analyze_energy_with(&samples, RATE, FRAME_TIME, |i, total| {
            seen.push((i, total));
        });
        assert_eq!(seen.len(), envelope.len());
        assert_eq!(seen.last().map(|&(i, _)| i + 1), Some(envelope.len()));
    }
}
