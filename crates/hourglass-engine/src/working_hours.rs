//! Working-hour window inference.
//!
//! The window is built by a fixed pipeline of small total functions:
//! filter weekday morning first-commits, take the 10th/20th percentile
//! start minutes, snap them to half-hour boundaries, scan the hourly
//! histogram backward for the last busy hour, then clamp the end hour
//! between the standard 9-hour day and that busy hour.

use hourglass_core::{DailyFirstCommit, HourHistogram, HourglassError};
use serde::{Deserialize, Serialize};

/// Normal hours never exceed this span, whatever the detected end hour.
pub const MAX_NORMAL_HOURS: f64 = 9.0;

/// Start minute assumed when no weekday morning samples exist (09:00).
pub const DEFAULT_START_MINUTE: u16 = 540;

const DEFAULT_START_UPPER_MINUTE: u16 = 570;
const EARLIEST_START_MINUTE: u16 = 300;
const LATEST_START_MINUTE: u16 = 720;
const START_SNAP_MINUTES: u16 = 30;
const MAX_START_WINDOW_MINUTES: u16 = 60;
const ACTIVITY_THRESHOLD_RATIO: f64 = 0.3;
const END_PERCENTILE: f64 = 0.85;
const RELIABLE_CONFIDENCE: u8 = 60;

/// A span of fractional hours, e.g. `9.0..9.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourRange {
    /// Lower bound in hours.
    pub start_hour: f64,
    /// Upper bound in hours.
    pub end_hour: f64,
}

/// How a [`WorkTimeWindow`] end hour was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    /// A busy hour was found scanning backward from 23:00.
    BackwardThreshold,
    /// No busy hour; fell back to percentile or standard end.
    Default,
    /// Supplied by the user as `start-end`.
    Manual,
}

/// The inferred (or declared) normal working-hour window.
///
/// # Examples
///
/// ```
/// use hourglass_engine::working_hours::WorkTimeWindow;
///
/// let window = WorkTimeWindow::manual(9, 21);
/// assert!(window.is_working_hour(17.0));
/// // normal hours are capped at 9: 18:00 onward is overtime
/// assert!(!window.is_working_hour(18.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTimeWindow {
    /// Start of normal hours.
    pub start_hour: f64,
    /// Detected end of the working day.
    pub end_hour: f64,
    /// Half-hour-snapped start estimate.
    pub start_range: HourRange,
    /// One-hour band around the end estimate.
    pub end_range: HourRange,
    /// 0–100; detection never reaches 90, manual windows report 100.
    pub confidence: u8,
    /// Number of weekday morning samples used.
    pub sample_count: usize,
    /// How the end hour was obtained.
    pub detection_method: DetectionMethod,
    /// `confidence >= 60`.
    pub is_reliable: bool,
}

impl WorkTimeWindow {
    /// A user-declared window covering `[start, end)`.
    pub fn manual(start: u8, end: u8) -> Self {
        let start_hour = f64::from(start);
        let end_hour = f64::from(end);
        Self {
            start_hour,
            end_hour,
            start_range: HourRange {
                start_hour,
                end_hour: start_hour,
            },
            end_range: HourRange {
                start_hour: end_hour,
                end_hour,
            },
            confidence: 100,
            sample_count: 0,
            detection_method: DetectionMethod::Manual,
            is_reliable: true,
        }
    }

    /// End of normal hours: `min(end_hour, start_hour + 9)`.
    pub fn normal_end_hour(&self) -> f64 {
        self.end_hour.min(self.start_hour + MAX_NORMAL_HOURS)
    }

    /// Whether `hour` falls inside `[start_hour, normal_end_hour)`.
    pub fn is_working_hour(&self, hour: f64) -> bool {
        hour >= self.start_hour && hour < self.normal_end_hour()
    }

    /// Whole hour from which weekday commits count as overtime.
    pub fn overtime_end_hour(&self) -> u8 {
        self.end_hour.ceil().clamp(0.0, 24.0) as u8
    }
}

/// Free-function form of [`WorkTimeWindow::is_working_hour`].
pub fn is_working_hour(hour: f64, window: &WorkTimeWindow) -> bool {
    window.is_working_hour(hour)
}

/// Parse a manual `start-end` override such as `"9-18"`.
///
/// # Errors
///
/// Returns [`HourglassError::InvalidWorkingHours`] unless the input is
/// exactly two integer hours in `0..=23` with `start < end`.
///
/// # Examples
///
/// ```
/// use hourglass_engine::working_hours::parse_working_hours;
///
/// let window = parse_working_hours("10-19").unwrap();
/// assert_eq!(window.start_hour, 10.0);
/// assert!(parse_working_hours("19-10").is_err());
/// assert!(parse_working_hours("9-18-20").is_err());
/// ```
pub fn parse_working_hours(input: &str) -> Result<WorkTimeWindow, HourglassError> {
    let invalid = || HourglassError::InvalidWorkingHours(input.to_string());

    let parts: Vec<&str> = input.split('-').collect();
    let [start, end] = parts.as_slice() else {
        return Err(invalid());
    };
    let start: u8 = start.trim().parse().map_err(|_| invalid())?;
    let end: u8 = end.trim().parse().map_err(|_| invalid())?;
    if start > 23 || end > 23 || start >= end {
        return Err(invalid());
    }
    Ok(WorkTimeWindow::manual(start, end))
}

/// Infer the working-hour window.
///
/// `first_commits` may contain every day; only weekday first commits in
/// `[05:00, 12:00)` are used. `hours` may be hourly or half-hourly.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::{DailyFirstCommit, HourHistogram};
/// use hourglass_engine::working_hours::{detect_working_hours, DetectionMethod};
///
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let firsts = vec![DailyFirstCommit { date: monday, minute_of_day: 9 * 60 + 10 }];
/// let mut counts = [0u32; 24];
/// for hour in 9..18 {
///     counts[hour] = 10;
/// }
/// let window = detect_working_hours(&firsts, &HourHistogram::hourly(counts));
/// assert_eq!(window.start_hour, 9.0);
/// assert_eq!(window.end_hour, 17.0);
/// assert_eq!(window.detection_method, DetectionMethod::BackwardThreshold);
/// ```
pub fn detect_working_hours(
    first_commits: &[DailyFirstCommit],
    hours: &HourHistogram,
) -> WorkTimeWindow {
    let starts = weekday_start_minutes(first_commits);
    let (p10, p20) = start_quantiles(&starts);
    let (range_start, range_end) = snap_start_range(p10, p20);
    let start_hour = f64::from(range_start) / 60.0;
    let standard_end = (start_hour + MAX_NORMAL_HOURS).min(24.0);

    let hourly = hours.to_hourly();
    let last_active = last_active_hour(&hourly);
    let p85 = percentile_hour(&hourly, END_PERCENTILE);
    let end_hour = resolve_end_hour(start_hour, standard_end, last_active, p85);

    let confidence = detection_confidence(starts.len());
    let detection_method = if last_active.is_some() {
        DetectionMethod::BackwardThreshold
    } else {
        DetectionMethod::Default
    };

    tracing::debug!(
        start_hour,
        end_hour,
        samples = starts.len(),
        confidence,
        method = ?detection_method,
        "detected working hours"
    );

    WorkTimeWindow {
        start_hour,
        end_hour,
        start_range: HourRange {
            start_hour,
            end_hour: f64::from(range_end) / 60.0,
        },
        end_range: HourRange {
            start_hour: (end_hour - 0.5).max(0.0),
            end_hour: (end_hour + 0.5).min(24.0),
        },
        confidence,
        sample_count: starts.len(),
        detection_method,
        is_reliable: confidence >= RELIABLE_CONFIDENCE,
    }
}

/// Weekday first-commit minutes inside `[05:00, 12:00)`, ascending.
pub fn weekday_start_minutes(first_commits: &[DailyFirstCommit]) -> Vec<u16> {
    let mut minutes: Vec<u16> = first_commits
        .iter()
        .filter(|f| f.weekday() <= 5)
        .map(|f| f.minute_of_day)
        .filter(|m| (EARLIEST_START_MINUTE..LATEST_START_MINUTE).contains(m))
        .collect();
    minutes.sort_unstable();
    minutes
}

/// 10th and 20th nearest-rank percentiles, or `(540, 570)` without samples.
pub fn start_quantiles(sorted_minutes: &[u16]) -> (u16, u16) {
    match (
        crate::stats::nearest_rank(sorted_minutes, 0.1),
        crate::stats::nearest_rank(sorted_minutes, 0.2),
    ) {
        (Some(p10), Some(p20)) => (p10, p20),
        _ => (DEFAULT_START_MINUTE, DEFAULT_START_UPPER_MINUTE),
    }
}

/// Snap to half hours and bound the window to 30–60 minutes inside
/// `[05:00, 12:00]`.
///
/// # Examples
///
/// ```
/// use hourglass_engine::working_hours::snap_start_range;
///
/// assert_eq!(snap_start_range(545, 550), (540, 570));
/// assert_eq!(snap_start_range(500, 700), (480, 540));
/// ```
pub fn snap_start_range(lower_minute: u16, upper_minute: u16) -> (u16, u16) {
    let lower = (lower_minute / START_SNAP_MINUTES * START_SNAP_MINUTES)
        .clamp(EARLIEST_START_MINUTE, LATEST_START_MINUTE - START_SNAP_MINUTES);
    let upper = (upper_minute / START_SNAP_MINUTES * START_SNAP_MINUTES)
        .max(lower + START_SNAP_MINUTES)
        .min(lower + MAX_START_WINDOW_MINUTES)
        .min(LATEST_START_MINUTE);
    (lower, upper)
}

/// Latest hour whose count reaches 30% of the peak (at least 1),
/// scanning down from 23.
pub fn last_active_hour(hourly: &[u32; 24]) -> Option<u8> {
    let peak = hourly.iter().copied().max().unwrap_or(0);
    let threshold = ((f64::from(peak) * ACTIVITY_THRESHOLD_RATIO).floor() as u32).max(1);
    (0..24u8)
        .rev()
        .find(|&hour| hourly[usize::from(hour)] >= threshold)
}

/// Hour at which cumulative commit mass reaches `q`, interpolated
/// linearly inside the crossing hour. `None` for an empty histogram.
///
/// # Examples
///
/// ```
/// use hourglass_engine::working_hours::percentile_hour;
///
/// let mut counts = [0u32; 24];
/// counts[10] = 10;
/// assert_eq!(percentile_hour(&counts, 0.5), Some(10.5));
/// ```
pub fn percentile_hour(hourly: &[u32; 24], q: f64) -> Option<f64> {
    let total: u32 = hourly.iter().sum();
    if total == 0 {
        return None;
    }
    let target = f64::from(total) * q;
    let mut cumulative = 0.0;
    for (hour, &count) in hourly.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let count = f64::from(count);
        if cumulative + count >= target {
            return Some(hour as f64 + (target - cumulative) / count);
        }
        cumulative += count;
    }
    Some(24.0)
}

/// Pick the end hour: last active hour, else the 85th-percentile hour,
/// else the standard end, clamped between the start hour and the busy
/// tail of the day.
pub fn resolve_end_hour(
    start_hour: f64,
    standard_end: f64,
    last_active: Option<u8>,
    p85: Option<f64>,
) -> f64 {
    let last_active = last_active.map(f64::from);
    let standard_floor = standard_end.floor();

    let candidate = last_active.or(p85).unwrap_or(standard_end);
    let lower = start_hour
        .floor()
        .max((standard_floor - 1.0).min(last_active.unwrap_or(standard_floor - 1.0)));
    let upper = last_active
        .unwrap_or_else(|| standard_floor.max(lower))
        .max(lower);

    let end = candidate.max(lower).min(upper);
    if end <= start_hour {
        standard_end
    } else {
        end
    }
}

/// `round(90 * days / (days + 50))`, kept strictly below 90.
///
/// # Examples
///
/// ```
/// use hourglass_engine::working_hours::detection_confidence;
///
/// assert_eq!(detection_confidence(0), 0);
/// assert_eq!(detection_confidence(50), 45);
/// assert_eq!(detection_confidence(100), 60);
/// assert!(detection_confidence(1_000_000) < 90);
/// ```
pub fn detection_confidence(sample_days: usize) -> u8 {
    let days = sample_days as f64;
    let raw = (90.0 * days / (days + 50.0)).round();
    raw.min(89.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn first(day: u32, minute: u16) -> DailyFirstCommit {
        DailyFirstCommit {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            minute_of_day: minute,
        }
    }

    fn office_hours(from: usize, to: usize, per_hour: u32) -> [u32; 24] {
        let mut counts = [0u32; 24];
        for hour in from..to {
            counts[hour] = per_hour;
        }
        counts
    }

    #[test]
    fn weekend_and_out_of_window_starts_are_dropped() {
        // 2024-01-06 Saturday, 2024-01-08 Monday
        let firsts = vec![
            first(6, 600),
            first(8, 290),
            first(9, 720),
            first(10, 545),
        ];
        assert_eq!(weekday_start_minutes(&firsts), vec![545]);
    }

    #[test]
    fn no_samples_default_to_nine() {
        assert_eq!(start_quantiles(&[]), (540, 570));
        let window = detect_working_hours(&[], &HourHistogram::hourly([0; 24]));
        assert_eq!(window.start_hour, 9.0);
        assert_eq!(window.start_range.end_hour, 9.5);
        assert_eq!(window.end_hour, 18.0);
        assert_eq!(window.detection_method, DetectionMethod::Default);
        assert_eq!(window.confidence, 0);
        assert!(!window.is_reliable);
    }

    #[test]
    fn quantiles_use_floor_index() {
        // n = 10: p10 -> idx 0, p20 -> idx 1
        let minutes: Vec<u16> = (0..10).map(|i| 540 + i * 10).collect();
        assert_eq!(start_quantiles(&minutes), (540, 550));
    }

    #[test]
    fn snapping_enforces_minimum_width_and_bounds() {
        assert_eq!(snap_start_range(600, 600), (600, 630));
        assert_eq!(snap_start_range(200, 250), (300, 330));
        assert_eq!(snap_start_range(719, 719), (690, 720));
    }

    #[test]
    fn threshold_ignores_sparse_late_commits() {
        let mut counts = office_hours(9, 19, 20);
        counts[22] = 3; // below floor(20 * 0.3) = 6
        assert_eq!(last_active_hour(&counts), Some(18));
        counts[22] = 6;
        assert_eq!(last_active_hour(&counts), Some(22));
    }

    #[test]
    fn empty_histogram_has_no_active_hour() {
        assert_eq!(last_active_hour(&[0; 24]), None);
        assert_eq!(percentile_hour(&[0; 24], 0.85), None);
    }

    #[test]
    fn late_busy_hour_extends_end_beyond_standard_day() {
        let firsts: Vec<DailyFirstCommit> = (8..13).map(|d| first(d, 540)).collect();
        let counts = office_hours(9, 22, 10);
        let window = detect_working_hours(&firsts, &HourHistogram::hourly(counts));
        assert_eq!(window.start_hour, 9.0);
        assert_eq!(window.end_hour, 21.0);
        assert_eq!(window.end_range.start_hour, 20.5);
        assert_eq!(window.end_range.end_hour, 21.5);
        // 9h cap: 18:00 is already overtime
        assert!(window.is_working_hour(17.5));
        assert!(!window.is_working_hour(18.0));
    }

    #[test]
    fn end_before_start_falls_back_to_standard_day() {
        // busiest hour is before the inferred start
        let end = resolve_end_hour(9.5, 18.5, Some(7), None);
        assert_eq!(end, 18.5);
    }

    #[test]
    fn early_last_active_hour_lowers_the_floor() {
        // between floor(start) and floor(standard end) - 1: the floor drops to it
        assert_eq!(resolve_end_hour(9.0, 18.0, Some(15), Some(16.2)), 15.0);
        assert_eq!(resolve_end_hour(9.0, 18.0, Some(10), Some(16.2)), 10.0);
    }

    #[test]
    fn last_active_one_before_standard_end() {
        assert_eq!(resolve_end_hour(9.0, 18.0, Some(17), Some(16.2)), 17.0);
        assert_eq!(resolve_end_hour(9.0, 18.0, Some(17), None), 17.0);
    }

    #[test]
    fn percentile_used_when_no_active_hour() {
        assert_eq!(resolve_end_hour(9.0, 18.0, None, Some(17.4)), 17.4);
        assert_eq!(resolve_end_hour(9.0, 18.0, None, None), 18.0);
    }

    #[test]
    fn manual_override_validation() {
        assert!(parse_working_hours("9-18").is_ok());
        assert!(parse_working_hours(" 9 - 18 ").is_ok());
        for bad in ["", "9", "9-", "a-18", "9-24", "18-18", "20-9", "-1-5", "9-18-1"] {
            let err = parse_working_hours(bad).unwrap_err();
            assert!(
                matches!(err, HourglassError::InvalidWorkingHours(_)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn manual_window_is_fully_confident() {
        let window = parse_working_hours("10-19").unwrap();
        assert_eq!(window.confidence, 100);
        assert_eq!(window.detection_method, DetectionMethod::Manual);
        assert!(window.is_reliable);
        assert_eq!(window.overtime_end_hour(), 19);
    }

    #[test]
    fn confidence_becomes_reliable_around_one_hundred_days() {
        assert_eq!(detection_confidence(97), 59);
        assert_eq!(detection_confidence(98), 60);
    }

    proptest! {
        #[test]
        fn confidence_is_monotonic_and_below_ninety(a in 0usize..100_000, b in 0usize..100_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(detection_confidence(lo) <= detection_confidence(hi));
            prop_assert!(detection_confidence(hi) < 90);
        }

        #[test]
        fn snapped_range_is_well_formed(lo in 0u16..1440, hi in 0u16..1440) {
            let (start, end) = snap_start_range(lo, hi);
            prop_assert!(start % 30 == 0 && end % 30 == 0);
            prop_assert!(end >= start + 30 && end <= start + 60);
            prop_assert!(start >= 300 && end <= 720);
        }

        #[test]
        fn detected_window_is_ordered(
            counts in proptest::array::uniform24(0u32..50),
            minutes in proptest::collection::vec(300u16..720, 0..40),
        ) {
            let firsts: Vec<DailyFirstCommit> = minutes
                .iter()
                .enumerate()
                .map(|(i, &m)| first(8 + (i % 5) as u32, m))
                .collect();
            let window = detect_working_hours(&firsts, &HourHistogram::hourly(counts));
            prop_assert!(window.start_hour < window.end_hour);
        }
    }
}
