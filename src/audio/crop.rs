//! Sample-array cropping by time bounds.

/// Crop a sample array to the `[t_start, t_end)` window, in seconds.
///
/// Bounds are resolved by nearest-sample lookup on the synthesized time axis
/// `i / sample_rate` and clamped to the array, so slightly out-of-range
/// times yield an empty or boundary-clipped crop rather than a panic.
#[must_use]
pub fn crop_samples(samples: &[f32], sample_rate: u32, t_start: f64, t_end: f64) -> &[f32] {
    let start = nearest_index(samples.len(), sample_rate, t_start);
    let end = nearest_index(samples.len(), sample_rate, t_end);
    &samples[start..end.max(start)]
}

/// Index of the sample nearest to time `t`, clamped to `[0, len]`.
fn nearest_index(len: usize, sample_rate: u32, t: f64) -> usize {
    let exact = t * f64::from(sample_rate);
    if exact <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = exact.round() as usize;
    idx.min(len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_exact_bounds() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        // 10 Hz: one sample every 0.1 s
        let cropped = crop_samples(&samples, 10, 2.0, 5.0);
        assert_eq!(cropped.len(), 30);
        assert_eq!(cropped[0], 20.0);
    }

    #[test]
    fn test_crop_clamps_to_array() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let cropped = crop_samples(&samples, 10, -1.0, 100.0);
        assert_eq!(cropped.len(), 100);
    }

    #[test]
    fn test_crop_inverted_window_is_empty() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let cropped = crop_samples(&samples, 10, 5.0, 2.0);
        assert!(cropped.is_empty());
    }

    #[test]
    fn test_crop_rounds_to_nearest_sample() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        // 0.26 s at 10 Hz is nearer sample 3 than sample 2
        let cropped = crop_samples(&samples, 10, 0.26, 0.5);
        assert_eq!(cropped[0], 3.0);
    }
}
