//! Small numeric helpers shared by the analyses.

/// Nearest-rank quantile of an ascending slice: `sorted[floor((n - 1) * q)]`.
///
/// Returns `None` for an empty slice. `q` is clamped to `[0, 1]`.
///
/// # Examples
///
/// ```
/// use hourglass_engine::stats::nearest_rank;
///
/// let minutes = [480, 540, 550, 600, 610];
/// assert_eq!(nearest_rank(&minutes, 0.1), Some(480));
/// assert_eq!(nearest_rank(&minutes, 0.5), Some(550));
/// ```
pub fn nearest_rank<T: Copy>(sorted: &[T], q: f64) -> Option<T> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((sorted.len() - 1) as f64 * q.clamp(0.0, 1.0)).floor() as usize;
    sorted.get(idx.min(sorted.len() - 1)).copied()
}

/// Percentile with linear interpolation between ranks.
///
/// `rank = p / 100 * (n - 1)`; the result blends the values at
/// `floor(rank)` and `ceil(rank)`. Input need not be sorted. Returns
/// `0.0` for an empty slice.
///
/// # Examples
///
/// ```
/// use hourglass_engine::stats::percentile;
///
/// assert_eq!(percentile(&[3.0, 1.0, 2.0], 50.0), 2.0);
/// assert_eq!(percentile(&[10.0, 20.0], 25.0), 12.5);
/// ```
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; `0.0` for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean of `counts[from..=to]` as `f64`.
pub(crate) fn window_mean(counts: &[f64; 24], from: usize, to: usize) -> f64 {
    let slice = &counts[from..=to];
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// `part / whole * 100`, or `None` when `whole` is zero.
pub(crate) fn rate(part: u32, whole: u32) -> Option<f64> {
    (whole > 0).then(|| f64::from(part) / f64::from(whole) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearest_rank_of_empty_is_none() {
        assert_eq!(nearest_rank::<u16>(&[], 0.2), None);
    }

    #[test]
    fn percentile_endpoints_are_min_and_max() {
        let values = [5.0, 1.0, 9.0, 3.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 9.0);
    }

    #[test]
    fn percentile_interpolates_even_length_median() {
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), 2.5);
    }

    #[test]
    fn std_dev_is_population() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&values) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&values), 5.0);
    }

    #[test]
    fn rate_is_undefined_for_zero_denominator() {
        assert_eq!(rate(3, 0), None);
        assert_eq!(rate(1, 4), Some(25.0));
    }

    proptest! {
        #[test]
        fn percentile_is_monotonic_in_p(
            values in proptest::collection::vec(-1000.0f64..1000.0, 1..50),
            a in 0.0f64..=100.0,
            b in 0.0f64..=100.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(percentile(&values, lo) <= percentile(&values, hi) + 1e-9);
        }

        #[test]
        fn p50_is_the_median_for_odd_lengths(
            values in proptest::collection::vec(-1000.0f64..1000.0, 0..25)
                .prop_map(|mut v| { if v.len() % 2 == 0 { v.push(0.0); } v })
        ) {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            prop_assert_eq!(percentile(&values, 50.0), sorted[sorted.len() / 2]);
        }
    }
}
