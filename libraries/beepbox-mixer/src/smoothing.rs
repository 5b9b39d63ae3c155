//! Centered moving average with edge-aware denominator

/// Smooth `values` with a centered moving average of half-width `window / 2`.
///
/// Near the edges the average only covers the samples that exist, so the
/// denominator shrinks instead of padding. The first and last samples are
/// passed through unchanged.
///
/// With `ignore_zero`, only strictly positive samples enter the sum and the
/// count, and outputs whose input was not positive are forced to zero.
pub fn smooth(values: &[f32], window: usize, ignore_zero: bool) -> Vec<f32> {
    let mut out = values.to_vec();
    let len = values.len();
    if len < 3 {
        return out;
    }

    let half = window / 2;
    for i in 1..len - 1 {
        let begin = i.saturating_sub(half);
        let end = (i + half).min(len - 1);
        let span = &values[begin..=end];

        out[i] = if ignore_zero {
            if values[i] > 0.0 {
                let (sum, count) = span
                    .iter()
                    .filter(|&&v| v > 0.0)
                    .fold((0.0_f32, 0_usize), |(s, c), &v| (s + v, c + 1));
                sum / count as f32
            } else {
                0.0
            }
        } else {
            span.iter().sum::<f32>() / span.len() as f32
        };
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_sequence_is_unchanged() {
        let values = vec![0.4_f32; 32];
        let smoothed = smooth(&values, 6, false);
        for v in smoothed {
            assert!((v - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn edge_denominator_shrinks() {
        // Index 1 with half-width 2 covers indices 0..=3
        let values = [0.0, 4.0, 8.0, 12.0, 16.0, 20.0];
        let smoothed = smooth(&values, 4, false);
        assert!((smoothed[1] - 6.0).abs() < 1e-6);
        // Interior sample covers five neighbours
        assert!((smoothed[2] - 8.0).abs() < 1e-6);
        // Index 4 covers indices 2..=5
        assert!((smoothed[4] - 14.0).abs() < 1e-6);
    }

    #[test]
    fn end_points_pass_through() {
        let values = [5.0, 0.0, 0.0, 0.0, 9.0];
        let smoothed = smooth(&values, 4, false);
        assert_eq!(smoothed[0], 5.0);
        assert_eq!(smoothed[4], 9.0);
    }

    #[test]
    fn zero_window_is_identity() {
        let values = [1.0, 3.0, 2.0, 7.0];
        assert_eq!(smooth(&values, 0, false), values.to_vec());
        assert_eq!(smooth(&values, 1, false), values.to_vec());
    }

    #[test]
    fn ignore_zero_skips_empty_samples() {
        let values = [1.0, 2.0, 0.0, 4.0, 6.0, 1.0];
        let smoothed = smooth(&values, 2, true);

        // Zero input stays zero
        assert_eq!(smoothed[2], 0.0);
        // Index 1 averages 1.0 and 2.0, the zero neighbour is ignored
        assert!((smoothed[1] - 1.5).abs() < 1e-6);
        // Index 3 averages 4.0 and 6.0
        assert!((smoothed[3] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn short_sequences() {
        assert!(smooth(&[], 10, false).is_empty());
        assert_eq!(smooth(&[3.0, 4.0], 10, false), vec![3.0, 4.0]);
    }
}
