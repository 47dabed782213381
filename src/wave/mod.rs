//! Waveform Transforms
//!
//! Pure numeric helpers applied whenever raw sample data becomes available.
//! The playback engine reads *integrated* buffers and takes their discrete
//! derivative while interpolating, which band-limits the reconstructed wave.
//!
//! All functions are deterministic and allocate a fresh buffer; inputs are
//! never modified. Sums are accumulated in `f64` and stored as `f32`.

/// Running-sum (exclusive prefix sum) transform.
///
/// `out[i]` is the sum of `samples[0..i]`, so `out[0]` is always zero and the
/// output has the same length as the input.
pub fn perform_integral(samples: &[f32]) -> Vec<f32> {
    let mut cumulative = 0.0f64;
    samples
        .iter()
        .map(|&sample| {
            let value = cumulative as f32;
            cumulative += sample as f64;
            value
        })
        .collect()
}

/// Subtract the arithmetic mean from every sample and append one trailing zero.
///
/// This is the DC-free "authored" form stored in the raw tables. An empty
/// input yields the lone trailing zero.
pub fn remove_dc_offset(samples: &[f32]) -> Vec<f32> {
    let mut centered = subtract_mean(samples);
    centered.push(0.0);
    centered
}

/// Remove DC bias, integrate, and append one trailing zero.
///
/// The trailing zero gives the interpolator a sample at the wraparound point.
/// Output length is `samples.len() + 1` and `out[0] == 0`. Differentiating the
/// output (including the trailing zero) recovers the centered input.
pub fn center_wave(samples: &[f32]) -> Vec<f32> {
    let mut integrated = perform_integral(&subtract_mean(samples));
    integrated.push(0.0);
    integrated
}

/// Remove DC bias and scale so the mean absolute sample value is 1.
///
/// Used for hand-authored waveforms so they play back at comparable loudness.
/// The trailing zero appended by centering is excluded from the magnitude and
/// left untouched. A wave that centers to all zeros is returned unscaled.
pub fn center_and_normalize_wave(samples: &[f32]) -> Vec<f32> {
    let mut wave = remove_dc_offset(samples);
    let body = wave.len() - 1;
    if body == 0 {
        return wave;
    }

    let magnitude: f64 = wave[..body].iter().map(|&s| (s as f64).abs()).sum();
    let average = magnitude / body as f64;
    if average > 0.0 && average.is_finite() {
        for sample in &mut wave[..body] {
            *sample = (*sample as f64 / average) as f32;
        }
    }
    wave
}

fn subtract_mean(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let sum: f64 = samples.iter().map(|&s| s as f64).sum();
    let average = sum / samples.len() as f64;
    samples
        .iter()
        .map(|&s| (s as f64 - average) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn derivative(wave: &[f32]) -> Vec<f32> {
        wave.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn test_integral_is_exclusive_prefix_sum() {
        let input = [0.5, -1.0, 2.0, 0.25, 3.0];
        let out = perform_integral(&input);

        assert_eq!(out.len(), input.len());
        assert_eq!(out[0], 0.0);
        for i in 0..input.len() {
            let expected: f32 = input[..i].iter().sum();
            assert_abs_diff_eq!(out[i], expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_integral_of_empty_is_empty() {
        assert!(perform_integral(&[]).is_empty());
    }

    #[test]
    fn test_remove_dc_offset_appends_zero() {
        let out = remove_dc_offset(&[1.0, 2.0, 3.0]);
        assert_eq!(out.len(), 4);
        assert_abs_diff_eq!(out[0], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 1.0, epsilon = 1e-6);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn test_center_wave_shape() {
        let input = [0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0];
        let out = center_wave(&input);

        assert_eq!(out.len(), input.len() + 1);
        assert_eq!(out[0], 0.0);
        assert_eq!(*out.last().unwrap(), 0.0);
    }

    #[test]
    fn test_center_wave_derivative_has_zero_mean() {
        let input = [3.0, 4.5, 2.0, 7.0, 5.5, 1.0, 6.0];
        let out = center_wave(&input);

        let centered = derivative(&out);
        assert_eq!(centered.len(), input.len());
        let mean: f32 = centered.iter().sum::<f32>() / centered.len() as f32;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-5);

        // The derivative is the input minus its mean
        let input_mean = input.iter().sum::<f32>() / input.len() as f32;
        for (c, s) in centered.iter().zip(input.iter()) {
            assert_abs_diff_eq!(*c, s - input_mean, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_normalize_mean_magnitude_is_one() {
        let input = [0.1, 0.4, -0.3, 0.9, -0.7, 0.2];
        let out = center_and_normalize_wave(&input);

        let body = &out[..out.len() - 1];
        let mean_abs: f32 = body.iter().map(|s| s.abs()).sum::<f32>() / body.len() as f32;
        assert_abs_diff_eq!(mean_abs, 1.0, epsilon = 1e-5);
        assert_eq!(*out.last().unwrap(), 0.0);
    }

    #[test]
    fn test_normalize_flat_wave_is_left_alone() {
        let out = center_and_normalize_wave(&[0.5, 0.5, 0.5]);
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(center_wave(&[]), vec![0.0]);
        assert_eq!(center_and_normalize_wave(&[]), vec![0.0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Mixed-sign, all-negative and single-sample buffers of varied magnitude
        fn sample_buffer() -> impl Strategy<Value = Vec<f32>> {
            prop_oneof![
                prop::collection::vec(-1.0f32..1.0, 1..64),
                prop::collection::vec(-1.0e4f32..-1.0e-3, 1..2048),
                prop::collection::vec(-1.0e4f32..1.0e4, 1..2048),
                prop::collection::vec(-1.0e4f32..1.0e4, 1..=1),
            ]
        }

        fn max_abs(values: &[f32]) -> f64 {
            values.iter().map(|&v| (v as f64).abs()).fold(0.0, f64::max)
        }

        proptest! {
            #[test]
            fn integral_matches_exclusive_prefix_sum(input in sample_buffer()) {
                let out = perform_integral(&input);
                prop_assert_eq!(out.len(), input.len());
                prop_assert_eq!(out[0], 0.0);

                let mut prefix = 0.0f64;
                for (i, &x) in input.iter().enumerate() {
                    let tolerance = prefix.abs() * 1e-6 + 1e-6;
                    prop_assert!(
                        (out[i] as f64 - prefix).abs() <= tolerance,
                        "out[{}] = {}, prefix = {}", i, out[i], prefix
                    );
                    prefix += x as f64;
                }
            }

            #[test]
            fn center_wave_derivative_is_centered_input(input in sample_buffer()) {
                let out = center_wave(&input);
                prop_assert_eq!(out.len(), input.len() + 1);
                prop_assert_eq!(out[0], 0.0);
                prop_assert_eq!(out[input.len()], 0.0);

                // Differences of f32 values are exact in f64, so the sum telescopes to zero
                let diffs: Vec<f64> = out.windows(2).map(|w| w[1] as f64 - w[0] as f64).collect();
                let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
                prop_assert!(mean.abs() <= 1e-9, "derivative mean {}", mean);

                let input_mean = input.iter().map(|&x| x as f64).sum::<f64>() / input.len() as f64;
                // Rounding the centered samples to f32 drifts the final wrap-around step
                let drift = input.len() as f64 * max_abs(&input) * 1.2e-7;
                let tolerance = (max_abs(&out) + max_abs(&input)) * 1e-6 + drift + 1e-6;
                for (d, &x) in diffs.iter().zip(&input) {
                    let expected = x as f64 - input_mean;
                    prop_assert!((d - expected).abs() <= tolerance, "{} vs {}", d, expected);
                }
            }

            #[test]
            fn normalized_wave_has_unit_mean_magnitude(input in sample_buffer()) {
                let out = center_and_normalize_wave(&input);
                prop_assert_eq!(out.len(), input.len() + 1);
                prop_assert_eq!(out[input.len()], 0.0);

                let body = &out[..input.len()];
                if body.iter().all(|&s| s == 0.0) {
                    // Flat input centers to silence and is left unscaled
                    let first = input[0];
                    prop_assert!(input.iter().all(|&x| x == first));
                } else {
                    let mean_abs =
                        body.iter().map(|&s| (s as f64).abs()).sum::<f64>() / body.len() as f64;
                    prop_assert!((mean_abs - 1.0).abs() <= 1e-4, "mean |x| = {}", mean_abs);
                }
            }
        }
    }
}
