//! Raised-cosine analysis window

use std::f64::consts::PI;

/// Window weights together with their sum
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    weights: Vec<f32>,
    area: f32,
}

impl Window {
    /// Individual weights
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Sum of all weights
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Number of weights
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True for a zero-length window
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Hanning window of `length` points: `0.5 * (1 - cos(2πi / (length - 1)))`
///
/// Both end points are zero. A single-point window is `[1.0]`.
pub fn hanning(length: usize) -> Window {
    if length == 1 {
        return Window {
            weights: vec![1.0],
            area: 1.0,
        };
    }

    let denom = length.saturating_sub(1) as f64;
    let weights: Vec<f32> = (0..length)
        .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos())) as f32)
        .collect();
    let area = weights.iter().sum();

    Window { weights, area }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_points_are_zero_and_center_is_one() {
        let window = hanning(9);
        assert_eq!(window.len(), 9);
        assert!(window.weights()[0].abs() < 1e-7);
        assert!(window.weights()[8].abs() < 1e-7);
        assert!((window.weights()[4] - 1.0).abs() < 1e-7);
    }

    #[test]
    fn symmetric() {
        let window = hanning(2049);
        let w = window.weights();
        for i in 0..w.len() / 2 {
            assert!((w[i] - w[w.len() - 1 - i]).abs() < 1e-6, "asymmetry at {}", i);
        }
    }

    #[test]
    fn area_is_sum_of_weights() {
        // For an odd-length Hanning window the sum is (length - 1) / 2
        let window = hanning(2049);
        assert!((window.area() - 1024.0).abs() < 0.01, "area {}", window.area());

        let manual: f32 = window.weights().iter().sum();
        assert_eq!(manual, window.area());
    }

    #[test]
    fn degenerate_lengths() {
        assert!(hanning(0).is_empty());
        assert_eq!(hanning(0).area(), 0.0);
        assert_eq!(hanning(1).weights(), &[1.0]);
    }
}
