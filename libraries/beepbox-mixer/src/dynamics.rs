//! Loudness and stability curves derived from the energy envelope
//!
//! - `energy_db`: `10 * log10(energy + 1e-200)` per frame, smoothed
//! - `stability`: how non-bursty the host is around each frame, in [0, 1]
//! - `percentile`: one high-loudness statistic for the whole buffer

use crate::smoothing::smooth;
use tracing::debug;

/// Added to the linear energy so silence maps to a finite dB value
const ENERGY_FLOOR: f64 = 1e-200;

/// Fraction of frames counted back from the loudest end of the sorted curve
const PERCENTILE_FRACTION: f64 = 0.1;

/// Frame-to-frame change (dB) where the logistic stability crosses 0.5
const STABILITY_THRESHOLD_DB: f32 = 3.25;

/// Steepness of the logistic stability transform
const STABILITY_SLOPE: f32 = 1.75;

/// Width of the energy weighting ramp in dB
const ENERGY_RANGE_DB: f32 = 18.0;

/// Energy and stability curves plus the loudness percentile
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicsCurves {
    /// Smoothed energy in dB per frame
    pub energy_db: Vec<f32>,
    /// Smoothed, squared stability per frame, in [0, 1]
    pub stability: Vec<f32>,
    /// High-loudness percentile of the unsmoothed energy in dB
    pub percentile: f32,
}

/// Convert linear energy to dB with a floor for silence
pub fn energy_to_db(energy: &[f32]) -> Vec<f32> {
    energy
        .iter()
        .map(|&e| (10.0 * (f64::from(e) + ENERGY_FLOOR).log10()) as f32)
        .collect()
}

/// Loudness statistic over the dB curve
///
/// Sorts ascending and takes index `n - floor(0.1 * n)`. Despite the usual
/// "percentile 10" naming this lands near the 90th percentile. Existing
/// level settings are tuned against this value, so the indexing stays. For
/// fewer than ten frames the index would run past the end and is clamped to
/// the loudest frame. An empty curve yields the silence floor.
pub fn loudness_percentile(energy_db: &[f32]) -> f32 {
    let n = energy_db.len();
    if n == 0 {
        return (10.0 * ENERGY_FLOOR.log10()) as f32;
    }

    let mut sorted = energy_db.to_vec();
    sorted.sort_by(f32::total_cmp);

    let k = (n as f64 * PERCENTILE_FRACTION).floor() as usize;
    sorted[(n - k).min(n - 1)]
}

/// Raw stability per frame, before squaring and smoothing
///
/// For interior frames the centered difference
/// `0.5 * (e[i+2] + e[i+1] - e[i] - e[i-1])` goes through a falling logistic
/// (small change -> near 1, jump -> near 0), then gets weighted by where the
/// frame sits between `percentile - 36 dB` and `percentile - 18 dB`, which
/// silences the noise floor. Frames `0`, `n-2` and `n-1` are zero.
pub fn stability_curve(energy_db: &[f32], percentile: f32) -> Vec<f32> {
    let n = energy_db.len();
    let mut stability = vec![0.0_f32; n];
    let floor_db = percentile - 2.0 * ENERGY_RANGE_DB;

    for i in 1..n.saturating_sub(2) {
        let e = energy_db;
        let delta = (0.5 * (e[i + 2] + e[i + 1] - e[i] - e[i - 1])).abs();
        let logistic =
            1.0 - 1.0 / (1.0 + (-STABILITY_SLOPE * (delta - STABILITY_THRESHOLD_DB)).exp());
        let weight = ((e[i] - floor_db) / ENERGY_RANGE_DB).clamp(0.0, 1.0);
        stability[i] = logistic * weight;
    }

    stability
}

/// Derive energy and stability curves from a linear energy envelope
///
/// Both curves are smoothed over `round(smooth_time_secs / frame_time)` frames.
pub fn estimate_dynamics(energy: &[f32], frame_time: f64, smooth_time_secs: f32) -> DynamicsCurves {
    let energy_db = energy_to_db(energy);
    let percentile = loudness_percentile(&energy_db);

    let stability: Vec<f32> = stability_curve(&energy_db, percentile)
        .into_iter()
        .map(|s| s * s)
        .collect();

    let window = if frame_time > 0.0 {
        (f64::from(smooth_time_secs) / frame_time).round() as usize
    } else {
        0
    };
    debug!(frames = energy.len(), percentile, window, "Estimated dynamics");

    DynamicsCurves {
        energy_db: smooth(&energy_db, window, false),
        stability: smooth(&stability, window, false),
        percentile,
    }
}
