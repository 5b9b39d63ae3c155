//! Integration tests for beepbox-loudness
//!
//! Tests include:
//! - Property-based tests with proptest
//! - Measuring planar buffers as produced by the mixer

use beepbox_core::ChannelBuffer;
use beepbox_loudness::{LoudnessAnalyzer, LoudnessError};
use proptest::prelude::*;

// ========== Helper Functions ==========

/// Generate a planar sine buffer at specified amplitude and frequency
fn generate_sine(
    sample_rate: u32,
    channels: usize,
    frequency: f32,
    amplitude: f32,
    duration_secs: f32,
) -> ChannelBuffer {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    let channel: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect();
    ChannelBuffer::new(vec![channel; channels], sample_rate).unwrap()
}

// ========== Property-Based Tests ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Halving the amplitude lowers integrated loudness by ~6 LU
    #[test]
    fn loudness_tracks_gain(amplitude in 0.1_f32..0.9) {
        let loud = LoudnessAnalyzer::measure(&generate_sine(48000, 2, 997.0, amplitude, 2.0)).unwrap();
        let quiet = LoudnessAnalyzer::measure(&generate_sine(48000, 2, 997.0, amplitude / 2.0, 2.0)).unwrap();

        let delta = loud.integrated_lufs - quiet.integrated_lufs;
        prop_assert!((delta - 6.02).abs() < 0.2, "delta {}", delta);
    }

    /// True peak is never below sample peak
    #[test]
    fn true_peak_at_least_sample_peak(
        amplitude in 0.05_f32..1.0,
        frequency in 100.0_f32..8000.0,
    ) {
        let stats = LoudnessAnalyzer::measure(&generate_sine(44100, 1, frequency, amplitude, 1.0)).unwrap();
        prop_assert!(stats.true_peak_dbtp >= stats.sample_peak_dbfs - 0.01);
        prop_assert!(stats.sample_peak_dbfs <= 20.0 * f64::from(amplitude).log10() + 0.01);
    }
}

// ========== Edge Cases ==========

#[test]
fn stereo_reads_three_lu_above_mono() {
    let mono = LoudnessAnalyzer::measure(&generate_sine(48000, 1, 1000.0, 0.3, 2.0)).unwrap();
    let stereo = LoudnessAnalyzer::measure(&generate_sine(48000, 2, 1000.0, 0.3, 2.0)).unwrap();
    assert!((stereo.integrated_lufs - mono.integrated_lufs - 3.01).abs() < 0.1);
}

#[test]
fn incremental_and_whole_buffer_agree() {
    let buffer = generate_sine(44100, 2, 440.0, 0.4, 2.0);
    let whole = LoudnessAnalyzer::measure(&buffer).unwrap();

    let interleaved = buffer.to_interleaved();
    let mut analyzer = LoudnessAnalyzer::new(44100, 2).unwrap();
    for chunk in interleaved.chunks(4410 * 2) {
        analyzer.add_frames(chunk).unwrap();
    }
    let chunked = analyzer.finalize().unwrap();

    assert!((whole.integrated_lufs - chunked.integrated_lufs).abs() < 1e-6);
    assert!((whole.true_peak_dbtp - chunked.true_peak_dbtp).abs() < 1e-6);
    assert_eq!(whole.duration_secs, chunked.duration_secs);
}

#[test]
fn silent_mix_is_an_error() {
    let silent = ChannelBuffer::silent(2, 48000, 48000);
    assert!(matches!(
        LoudnessAnalyzer::measure(&silent),
        Err(LoudnessError::SilentAudio)
    ));

    let empty = ChannelBuffer::silent(2, 0, 48000);
    assert!(matches!(
        LoudnessAnalyzer::measure(&empty),
        Err(LoudnessError::NoSamples)
    ));
}

#[test]
fn display_is_human_readable() {
    let stats = LoudnessAnalyzer::measure(&generate_sine(44100, 1, 1000.0, 0.5, 1.0)).unwrap();
    let text = stats.to_string();
    assert!(text.contains("LUFS"));
    assert!(text.contains("dBTP"));
}
