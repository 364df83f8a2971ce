//! Non-silence detection over mono sample buffers.
//!
//! A millisecond-resolution sliding window of `min_silence_len` ms is
//! evaluated at every position; a position is silent when the window's RMS
//! level falls below the threshold. Non-silent intervals are the complement
//! of the merged silent windows, so two vocalizations separated by less than
//! `min_silence_len` ms of quiet are reported as one interval.

/// Disjoint (start, end) millisecond intervals where audio exceeds the
/// silence threshold.
///
/// `silence_thresh_db` is a dBFS level relative to full scale (sample value
/// 1.0). Audio shorter than `min_silence_len_ms` can contain no qualifying
/// silence and is returned as a single interval.
#[must_use]
pub fn detect_nonsilent(
    samples: &[f32],
    sample_rate: u32,
    min_silence_len_ms: u64,
    silence_thresh_db: f64,
) -> Vec<(u64, u64)> {
    let length_ms = duration_ms(samples.len(), sample_rate);
    if length_ms == 0 || min_silence_len_ms == 0 {
        return if length_ms == 0 {
            Vec::new()
        } else {
            vec![(0, length_ms)]
        };
    }

    if length_ms < min_silence_len_ms {
        return vec![(0, length_ms)];
    }

    let silent_ranges = silent_ranges(
        samples,
        sample_rate,
        length_ms,
        min_silence_len_ms,
        silence_thresh_db,
    );

    // Non-silent intervals are the gaps between merged silent ranges.
    let mut nonsilent = Vec::new();
    let mut cursor = 0u64;
    for &(start, end) in &silent_ranges {
        if start > cursor {
            nonsilent.push((cursor, start));
        }
        cursor = cursor.max(end);
    }
    if cursor < length_ms {
        nonsilent.push((cursor, length_ms));
    }
    nonsilent
}

/// Merged (start, end) ms ranges where every covering window is silent.
fn silent_ranges(
    samples: &[f32],
    sample_rate: u32,
    length_ms: u64,
    window_ms: u64,
    thresh_db: f64,
) -> Vec<(u64, u64)> {
    // Prefix sums of squared samples at millisecond granularity let each
    // window RMS be computed in constant time.
    let ms_count = usize::try_from(length_ms).unwrap_or(usize::MAX);
    let mut prefix_sq = vec![0.0f64; ms_count + 1];
    let mut prefix_n = vec![0usize; ms_count + 1];
    for ms in 0..ms_count {
        let lo = sample_index(ms as u64, sample_rate).min(samples.len());
        let hi = sample_index(ms as u64 + 1, sample_rate).min(samples.len());
        let sum_sq: f64 = samples[lo..hi].iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        prefix_sq[ms + 1] = prefix_sq[ms] + sum_sq;
        prefix_n[ms + 1] = prefix_n[ms] + (hi - lo);
    }

    let window = usize::try_from(window_ms).unwrap_or(usize::MAX);
    let last_start = ms_count - window;

    let mut ranges: Vec<(u64, u64)> = Vec::new();
    let mut run_start: Option<usize> = None;
    for pos in 0..=last_start {
        let n = prefix_n[pos + window] - prefix_n[pos];
        let sum_sq = prefix_sq[pos + window] - prefix_sq[pos];
        #[allow(clippy::cast_precision_loss)]
        let rms = if n == 0 { 0.0 } else { (sum_sq / n as f64).sqrt() };
        let silent = rms <= 0.0 || 20.0 * rms.log10() < thresh_db;

        match (silent, run_start) {
            (true, None) => run_start = Some(pos),
            (false, Some(start)) => {
                push_merged(&mut ranges, start as u64, (pos - 1 + window) as u64);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push_merged(&mut ranges, start as u64, (last_start + window) as u64);
    }
    ranges
}

/// Append a silent range, merging it with the previous one if they touch.
fn push_merged(ranges: &mut Vec<(u64, u64)>, start: u64, end: u64) {
    if let Some(last) = ranges.last_mut() {
        if start <= last.1 {
            last.1 = last.1.max(end);
            return;
        }
    }
    ranges.push((start, end));
}

/// Whole milliseconds covered by a sample buffer.
fn duration_ms(sample_count: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    (sample_count as u64) * 1000 / u64::from(sample_rate)
}

/// First sample index belonging to millisecond `ms`.
fn sample_index(ms: u64, sample_rate: u32) -> usize {
    usize::try_from(ms * u64::from(sample_rate) / 1000).unwrap_or(usize::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RATE: u32 = 8000;

    /// Build a signal from (duration_ms, amplitude) sections.
    fn signal(sections: &[(u64, f32)]) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(ms, amplitude) in sections {
            let count = (u64::from(RATE) * ms / 1000) as usize;
            // Square wave so RMS equals the amplitude
            for i in 0..count {
                samples.push(if i % 2 == 0 { amplitude } else { -amplitude });
            }
        }
        samples
    }

    #[test]
    fn test_all_silence_yields_nothing() {
        let samples = signal(&[(2000, 0.0)]);
        assert!(detect_nonsilent(&samples, RATE, 300, -24.0).is_empty());
    }

    #[test]
    fn test_all_loud_yields_single_interval() {
        let samples = signal(&[(2000, 0.5)]);
        let intervals = detect_nonsilent(&samples, RATE, 300, -24.0);
        assert_eq!(intervals, vec![(0, 2000)]);
    }

    #[test]
    fn test_burst_between_silence_is_detected() {
        let samples = signal(&[(1000, 0.0), (500, 0.5), (1000, 0.0)]);
        let intervals = detect_nonsilent(&samples, RATE, 300, -24.0);
        assert_eq!(intervals.len(), 1);
        let (start, end) = intervals[0];
        // Window smearing shifts both edges slightly into the burst
        assert!(start >= 1000 && start <= 1050, "start was {start}");
        assert!(end >= 1450 && end <= 1500, "end was {end}");
    }

    #[test]
    fn test_short_gap_does_not_split() {
        // 100 ms of quiet between bursts, below the 300 ms minimum
        let samples = signal(&[(500, 0.5), (100, 0.0), (500, 0.5)]);
        let intervals = detect_nonsilent(&samples, RATE, 300, -24.0);
        assert_eq!(intervals.len(), 1);
    }

    #[test]
    fn test_long_gap_splits_intervals() {
        let samples = signal(&[(500, 0.5), (800, 0.0), (500, 0.5)]);
        let intervals = detect_nonsilent(&samples, RATE, 300, -24.0);
        assert_eq!(intervals.len(), 2);
    }

    #[test]
    fn test_quiet_audio_below_threshold_is_silent() {
        // -40 dBFS tone against a -24 dBFS threshold
        let samples = signal(&[(1000, 0.01)]);
        assert!(detect_nonsilent(&samples, RATE, 300, -24.0).is_empty());
    }

    #[test]
    fn test_file_shorter_than_window_is_one_interval() {
        let samples = signal(&[(100, 0.5)]);
        let intervals = detect_nonsilent(&samples, RATE, 300, -24.0);
        assert_eq!(intervals, vec![(0, 100)]);
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        assert!(detect_nonsilent(&[], RATE, 300, -24.0).is_empty());
    }
}
