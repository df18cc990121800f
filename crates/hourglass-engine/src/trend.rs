//! Month-by-month re-analysis and the direction of travel across months.

use std::collections::BTreeSet;

use hourglass_core::{
    format_minutes, CommitDataset, CommitTimeSample, DailyExtremes, DateRange, YearMonth,
    DEFAULT_ROLLOVER_HOUR,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{resolve_window, score};
use crate::index::Result996;
use crate::stats::{mean, std_dev};
use crate::working_hours::WorkTimeWindow;

const SUFFICIENT_WORK_DAYS: u32 = 10;
const LIMITED_WORK_DAYS: u32 = 5;
const HIGH_CONFIDENCE_COMMITS: u32 = 100;
const MEDIUM_CONFIDENCE_COMMITS: u32 = 50;
const TREND_THRESHOLD: f64 = 10.0;
const MIN_TYPICAL_SPAN_HOURS: f64 = 4.0;
const MIN_TYPICAL_END_MINUTE: u32 = 15 * 60;

/// How much data backs a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    /// At least 10 work days.
    Sufficient,
    /// 5 to 9 work days.
    Limited,
    /// Fewer than 5 work days.
    Insufficient,
}

impl DataQuality {
    fn from_work_days(work_days: u32) -> Self {
        if work_days >= SUFFICIENT_WORK_DAYS {
            DataQuality::Sufficient
        } else if work_days >= LIMITED_WORK_DAYS {
            DataQuality::Limited
        } else {
            DataQuality::Insufficient
        }
    }
}

/// How far a month's numbers can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendConfidence {
    /// 100+ commits over 10+ work days.
    High,
    /// 50+ commits or 5+ work days.
    Medium,
    /// Anything less.
    Low,
}

impl TrendConfidence {
    fn from_volume(commits: u32, work_days: u32) -> Self {
        if commits >= HIGH_CONFIDENCE_COMMITS && work_days >= SUFFICIENT_WORK_DAYS {
            TrendConfidence::High
        } else if commits >= MEDIUM_CONFIDENCE_COMMITS || work_days >= LIMITED_WORK_DAYS {
            TrendConfidence::Medium
        } else {
            TrendConfidence::Low
        }
    }
}

/// Direction of the index across the analyzed months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Second-half mean at least 10 above the first half.
    Increasing,
    /// Second-half mean at least 10 below the first half.
    Decreasing,
    /// Anything closer, or too few months to tell.
    Stable,
}

/// One calendar month of analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendData {
    /// `YYYY-MM`.
    pub month: String,
    /// Commits in the month.
    pub total_commits: u32,
    /// Distinct weekdays with a commit.
    pub work_days: u32,
    /// Index for the month.
    pub index_996: i32,
    /// Band text of `index_996`.
    pub index_996_str: String,
    /// Weekend-amended overtime percentage.
    pub over_time_radio: i32,
    /// Mean first-to-last span in hours.
    pub avg_work_span: f64,
    /// Population standard deviation of the spans.
    pub work_span_std_dev: f64,
    /// Mean first commit, `HH:MM`.
    pub avg_start_time: Option<String>,
    /// Mean last commit, `HH:MM`.
    pub avg_end_time: Option<String>,
    /// Latest last commit, `HH:MM` or `HH:MM+1`.
    pub latest_end_time: Option<String>,
    /// Volume tag driving the summary filter.
    pub data_quality: DataQuality,
    /// Reader-facing trust tag.
    pub confidence: TrendConfidence,
}

impl MonthlyTrendData {
    /// Zeroed record for a month without commits.
    pub fn placeholder(month: YearMonth) -> Self {
        let empty = Result996::empty();
        Self {
            month: month.to_string(),
            total_commits: 0,
            work_days: 0,
            index_996: empty.index_996,
            index_996_str: empty.index_996_str,
            over_time_radio: empty.over_time_radio,
            avg_work_span: 0.0,
            work_span_std_dev: 0.0,
            avg_start_time: None,
            avg_end_time: None,
            latest_end_time: None,
            data_quality: DataQuality::Insufficient,
            confidence: TrendConfidence::Low,
        }
    }
}

/// Aggregate over the sufficient months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    /// Months tagged [`DataQuality::Sufficient`].
    pub valid_months: usize,
    /// Mean index over the valid months.
    pub avg_index_996: f64,
    /// Mean of the valid months' average spans.
    pub avg_work_span: f64,
    /// Direction of the index over the valid months.
    pub trend: TrendDirection,
}

/// Every month in the period plus the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    /// One record per calendar month, oldest first.
    pub months: Vec<MonthlyTrendData>,
    /// Summary over sufficient months.
    pub summary: TrendSummary,
}

/// Knobs for [`analyze_trend`].
#[derive(Debug, Clone)]
pub struct TrendOptions {
    /// Months to enumerate; the observed span when `None`.
    pub range: Option<DateRange>,
    /// Window reused for every month; detected per month when `None`.
    pub working_hours: Option<WorkTimeWindow>,
    /// See [`CommitDataset::from_samples`].
    pub rollover_hour: u8,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            range: None,
            working_hours: None,
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
        }
    }
}

/// Analyze every calendar month overlapping the period.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::{CommitTimeSample, DateRange};
/// use hourglass_engine::trend::{analyze_trend, TrendDirection, TrendOptions};
///
/// let at = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
/// ).unwrap();
/// let options = TrendOptions { range: Some(range), ..TrendOptions::default() };
/// let trend = analyze_trend(&[CommitTimeSample::from_datetime(at)], &options);
/// assert_eq!(trend.months.len(), 3);
/// assert_eq!(trend.months[0].total_commits, 0);
/// assert_eq!(trend.months[1].total_commits, 1);
/// assert_eq!(trend.summary.trend, TrendDirection::Stable);
/// ```
pub fn analyze_trend(samples: &[CommitTimeSample], options: &TrendOptions) -> TrendAnalysis {
    let range = options
        .range
        .or_else(|| DateRange::covering(samples.iter().map(|s| s.date)));
    let months = range.map(|r| r.months()).unwrap_or_default();

    // Folding crosses month boundaries, so extremes are built once.
    let all_daily = CommitDataset::from_samples(samples, options.rollover_hour).daily;

    let months: Vec<MonthlyTrendData> = months
        .into_iter()
        .map(|month| {
            let month_samples: Vec<CommitTimeSample> = samples
                .iter()
                .filter(|s| month.contains(s.date))
                .copied()
                .collect();
            let month_daily: Vec<DailyExtremes> = all_daily
                .iter()
                .filter(|d| month.contains(d.date))
                .cloned()
                .collect();
            analyze_month(
                month,
                &month_samples,
                &month_daily,
                options.working_hours.as_ref(),
                options.rollover_hour,
            )
        })
        .collect();

    tracing::debug!(months = months.len(), "analyzed monthly trend");

    let summary = summarize(&months);
    TrendAnalysis { months, summary }
}

/// Analyze one month given its samples and its folded daily extremes.
pub fn analyze_month(
    month: YearMonth,
    samples: &[CommitTimeSample],
    daily: &[DailyExtremes],
    working_hours: Option<&WorkTimeWindow>,
    rollover_hour: u8,
) -> MonthlyTrendData {
    if samples.is_empty() {
        return MonthlyTrendData::placeholder(month);
    }

    let dataset = CommitDataset::from_samples(samples, rollover_hour);
    let window = resolve_window(&dataset, working_hours);
    let (_, result) = score(&dataset, &window);

    let work_days = samples
        .iter()
        .filter(|s| !s.is_weekend())
        .map(|s| s.date)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let spans = work_spans(daily);
    let (avg_start_time, avg_end_time) = typical_day(daily);
    let latest_end_time = daily
        .iter()
        .filter_map(|d| d.last_minute)
        .max()
        .map(format_minutes);

    MonthlyTrendData {
        month: month.to_string(),
        total_commits: dataset.total_commits,
        work_days,
        index_996: result.index_996,
        index_996_str: result.index_996_str,
        over_time_radio: result.over_time_radio,
        avg_work_span: mean(&spans),
        work_span_std_dev: std_dev(&spans),
        avg_start_time,
        avg_end_time,
        latest_end_time,
        data_quality: DataQuality::from_work_days(work_days),
        confidence: TrendConfidence::from_volume(dataset.total_commits, work_days),
    }
}

/// First-to-last spans in hours, dropping values outside `[0, 24]`.
pub fn work_spans(daily: &[DailyExtremes]) -> Vec<f64> {
    daily
        .iter()
        .filter_map(DailyExtremes::span_hours)
        .filter(|span| (0.0..=24.0).contains(span))
        .collect()
}

/// Mean start and end over typical weekdays (span of 4h or more, last
/// commit at 15:00 or later), or over every day when none qualify.
fn typical_day(daily: &[DailyExtremes]) -> (Option<String>, Option<String>) {
    let complete: Vec<(&DailyExtremes, u32, u32)> = daily
        .iter()
        .filter_map(|d| match (d.first_minute, d.last_minute, d.span_hours()) {
            (Some(first), Some(last), Some(span)) if (0.0..=24.0).contains(&span) => {
                Some((d, first, last))
            }
            _ => None,
        })
        .collect();
    let typical: Vec<(&DailyExtremes, u32, u32)> = complete
        .iter()
        .copied()
        .filter(|&(d, _, last)| {
            !d.is_weekend()
                && d.span_hours().is_some_and(|span| span >= MIN_TYPICAL_SPAN_HOURS)
                && last >= MIN_TYPICAL_END_MINUTE
        })
        .collect();

    let chosen = if typical.is_empty() { &complete } else { &typical };
    if chosen.is_empty() {
        return (None, None);
    }
    let starts: Vec<f64> = chosen.iter().map(|&(_, first, _)| f64::from(first)).collect();
    let ends: Vec<f64> = chosen.iter().map(|&(_, _, last)| f64::from(last)).collect();
    (
        Some(format_minutes(mean(&starts).round() as u32)),
        Some(format_minutes(mean(&ends).round() as u32)),
    )
}

fn summarize(months: &[MonthlyTrendData]) -> TrendSummary {
    let valid: Vec<&MonthlyTrendData> = months
        .iter()
        .filter(|m| m.data_quality == DataQuality::Sufficient)
        .collect();
    let indices: Vec<f64> = valid.iter().map(|m| f64::from(m.index_996)).collect();
    let spans: Vec<f64> = valid.iter().map(|m| m.avg_work_span).collect();

    TrendSummary {
        valid_months: valid.len(),
        avg_index_996: mean(&indices),
        avg_work_span: mean(&spans),
        trend: determine_trend(&indices),
    }
}

/// Compare the mean of the first half of `values` with the second half.
///
/// # Examples
///
/// ```
/// use hourglass_engine::trend::{determine_trend, TrendDirection};
///
/// assert_eq!(determine_trend(&[40.0]), TrendDirection::Stable);
/// assert_eq!(determine_trend(&[40.0, 45.0, 48.0]), TrendDirection::Stable);
/// assert_eq!(determine_trend(&[40.0, 60.0, 70.0, 80.0]), TrendDirection::Increasing);
/// ```
pub fn determine_trend(values: &[f64]) -> TrendDirection {
    if values.len() < 2 {
        return TrendDirection::Stable;
    }
    let mid = values.len() / 2;
    let diff = mean(&values[mid..]) - mean(&values[..mid]);
    if diff.abs() < TREND_THRESHOLD {
        TrendDirection::Stable
    } else if diff > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(month: u32, day: u32, hour: u32, minute: u32) -> CommitTimeSample {
        let dt = NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        CommitTimeSample::from_datetime(dt)
    }

    /// Every weekday of a month, committing at each listed hour.
    fn busy_month(month: u32, hours: &[u32]) -> Vec<CommitTimeSample> {
        let mut samples = Vec::new();
        for day in 1..=28 {
            let date = NaiveDate::from_ymd_opt(2024, month, day).unwrap();
            if hourglass_core::is_weekend(date) {
                continue;
            }
            for &hour in hours {
                samples.push(at(month, day, hour, 0));
            }
        }
        samples
    }

    #[test]
    fn empty_months_get_placeholders() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        )
        .unwrap();
        let options = TrendOptions {
            range: Some(range),
            ..TrendOptions::default()
        };
        let trend = analyze_trend(&[], &options);
        assert_eq!(trend.months.len(), 2);
        let jan = &trend.months[0];
        assert_eq!(jan.month, "2024-01");
        assert_eq!(jan.data_quality, DataQuality::Insufficient);
        assert_eq!(jan.confidence, TrendConfidence::Low);
        assert_eq!(jan.avg_start_time, None);
        assert_eq!(trend.summary.valid_months, 0);
        assert_eq!(trend.summary.trend, TrendDirection::Stable);
    }

    #[test]
    fn no_range_and_no_samples_is_empty() {
        let trend = analyze_trend(&[], &TrendOptions::default());
        assert!(trend.months.is_empty());
        assert_eq!(trend.summary.avg_index_996, 0.0);
    }

    #[test]
    fn quality_and_confidence_tags() {
        assert_eq!(DataQuality::from_work_days(10), DataQuality::Sufficient);
        assert_eq!(DataQuality::from_work_days(5), DataQuality::Limited);
        assert_eq!(DataQuality::from_work_days(4), DataQuality::Insufficient);
        assert_eq!(TrendConfidence::from_volume(100, 10), TrendConfidence::High);
        assert_eq!(TrendConfidence::from_volume(100, 9), TrendConfidence::Medium);
        assert_eq!(TrendConfidence::from_volume(10, 5), TrendConfidence::Medium);
        assert_eq!(TrendConfidence::from_volume(49, 4), TrendConfidence::Low);
    }

    #[test]
    fn month_statistics_from_regular_days() {
        let samples = busy_month(1, &[9, 12, 18]);
        let options = TrendOptions {
            working_hours: Some(WorkTimeWindow::manual(9, 18)),
            ..TrendOptions::default()
        };
        let trend = analyze_trend(&samples, &options);
        assert_eq!(trend.months.len(), 1);
        let jan = &trend.months[0];
        // 2024-01-01..28 holds 20 weekdays
        assert_eq!(jan.work_days, 20);
        assert_eq!(jan.total_commits, 60);
        assert_eq!(jan.avg_work_span, 9.0);
        assert_eq!(jan.work_span_std_dev, 0.0);
        assert_eq!(jan.avg_start_time.as_deref(), Some("09:00"));
        assert_eq!(jan.avg_end_time.as_deref(), Some("18:00"));
        assert_eq!(jan.latest_end_time.as_deref(), Some("18:00"));
        assert_eq!(jan.data_quality, DataQuality::Sufficient);
        assert_eq!(jan.confidence, TrendConfidence::Medium);
        // one third of commits after 18:00
        assert_eq!(jan.over_time_radio, 34);
    }

    #[test]
    fn short_days_fall_back_to_unfiltered_average() {
        let samples = vec![at(1, 8, 10, 0), at(1, 8, 11, 0), at(1, 9, 10, 30), at(1, 9, 12, 0)];
        let trend = analyze_trend(&samples, &TrendOptions::default());
        let jan = &trend.months[0];
        assert_eq!(jan.avg_start_time.as_deref(), Some("10:15"));
        assert_eq!(jan.avg_end_time.as_deref(), Some("11:30"));
    }

    #[test]
    fn rolled_over_commit_shows_plus_one() {
        let samples = vec![at(1, 8, 10, 0), at(1, 9, 1, 15)];
        let trend = analyze_trend(&samples, &TrendOptions::default());
        assert_eq!(trend.months[0].latest_end_time.as_deref(), Some("01:15+1"));
    }

    #[test]
    fn rising_overtime_is_increasing() {
        let mut samples = busy_month(1, &[10, 11, 14, 15]);
        samples.extend(busy_month(2, &[10, 11, 14, 15]));
        samples.extend(busy_month(3, &[10, 20, 21, 22]));
        samples.extend(busy_month(4, &[10, 20, 21, 22]));
        let options = TrendOptions {
            working_hours: Some(WorkTimeWindow::manual(9, 18)),
            ..TrendOptions::default()
        };
        let trend = analyze_trend(&samples, &options);
        assert_eq!(trend.summary.valid_months, 4);
        assert_eq!(trend.summary.trend, TrendDirection::Increasing);
    }

    #[test]
    fn trend_threshold_and_sign() {
        assert_eq!(determine_trend(&[]), TrendDirection::Stable);
        assert_eq!(determine_trend(&[50.0, 59.9]), TrendDirection::Stable);
        assert_eq!(determine_trend(&[50.0, 60.0]), TrendDirection::Increasing);
        assert_eq!(determine_trend(&[90.0, 70.0, 60.0]), TrendDirection::Decreasing);
    }

    proptest! {
        #[test]
        fn close_halves_are_stable(base in -300.0f64..300.0, deltas in proptest::collection::vec(-4.9f64..4.9, 2..12)) {
            let values: Vec<f64> = deltas.iter().map(|d| base + d).collect();
            prop_assert_eq!(determine_trend(&values), TrendDirection::Stable);
        }
    }
}
