//! Weekend overtime: sustained weekend work versus quick fixes.

use chrono::{Datelike, Weekday};
use hourglass_core::{DailyExtremes, DateRange, WeekendConfig};
use serde::{Deserialize, Serialize};

use crate::stats::rate;

/// Both thresholds must be met for a weekend day to count as real overtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekendThresholds {
    /// Minimum first-to-last span in hours.
    pub span_hours: f64,
    /// Minimum commits that day.
    pub min_commits: u32,
}

impl Default for WeekendThresholds {
    fn default() -> Self {
        Self {
            span_hours: 3.0,
            min_commits: 3,
        }
    }
}

impl From<&WeekendConfig> for WeekendThresholds {
    fn from(config: &WeekendConfig) -> Self {
        Self {
            span_hours: config.span_threshold,
            min_commits: config.commit_threshold,
        }
    }
}

/// Classification of a single weekend day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekendDayKind {
    /// Long enough and busy enough to be a working day.
    RealOvertime,
    /// Anything shorter or sparser.
    CasualFix,
}

/// Weekend activity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekendOvertimeDistribution {
    /// Saturdays with commits.
    pub saturday_days: u32,
    /// Sundays with commits.
    pub sunday_days: u32,
    /// Active weekend days meeting both thresholds.
    pub real_overtime_days: u32,
    /// Active weekend days that did not.
    pub casual_fix_days: u32,
    /// Saturdays and Sundays in the analyzed period.
    pub total_weekend_days: Option<u32>,
    /// `active weekend days / total_weekend_days * 100`.
    pub weekend_activity_rate: Option<f64>,
    /// `real_overtime_days / total_weekend_days * 100`.
    pub real_overtime_rate: Option<f64>,
}

/// Span used for the threshold test: exact minutes when known,
/// otherwise the number of distinct touched hours.
pub fn weekend_span_hours(day: &DailyExtremes) -> f64 {
    day.span_hours().unwrap_or(day.hours.len() as f64)
}

/// Commit count used for the threshold test: exact when known,
/// otherwise the number of distinct touched hours.
pub fn weekend_commit_count(day: &DailyExtremes) -> u32 {
    day.commit_count.unwrap_or(day.hours.len() as u32)
}

/// Classify one weekend day.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use chrono::NaiveDate;
/// use hourglass_core::DailyExtremes;
/// use hourglass_engine::weekend::{classify_weekend_day, WeekendDayKind, WeekendThresholds};
///
/// let saturday = DailyExtremes {
///     date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
///     first_minute: Some(10 * 60),
///     last_minute: Some(16 * 60),
///     hours: BTreeSet::from([10, 13, 16]),
///     commit_count: Some(7),
/// };
/// let kind = classify_weekend_day(&saturday, &WeekendThresholds::default());
/// assert_eq!(kind, WeekendDayKind::RealOvertime);
/// ```
pub fn classify_weekend_day(day: &DailyExtremes, thresholds: &WeekendThresholds) -> WeekendDayKind {
    if weekend_span_hours(day) >= thresholds.span_hours
        && weekend_commit_count(day) >= thresholds.min_commits
    {
        WeekendDayKind::RealOvertime
    } else {
        WeekendDayKind::CasualFix
    }
}

/// Summarize weekend days in `daily`.
///
/// Rates are relative to the Saturdays and Sundays in `range`, or in the
/// span of observed dates when no range is given; they are `None` when
/// that count is zero or unknown.
pub fn classify_weekend_overtime(
    daily: &[DailyExtremes],
    range: Option<DateRange>,
    thresholds: &WeekendThresholds,
) -> WeekendOvertimeDistribution {
    let mut saturday_days = 0;
    let mut sunday_days = 0;
    let mut real_overtime_days = 0;
    let mut casual_fix_days = 0;

    for day in daily {
        match day.date.weekday() {
            Weekday::Sat => saturday_days += 1,
            Weekday::Sun => sunday_days += 1,
            _ => continue,
        }
        match classify_weekend_day(day, thresholds) {
            WeekendDayKind::RealOvertime => real_overtime_days += 1,
            WeekendDayKind::CasualFix => casual_fix_days += 1,
        }
    }

    let total_weekend_days = range
        .or_else(|| DateRange::covering(daily.iter().map(|d| d.date)))
        .map(|r| r.weekend_days());
    let (weekend_activity_rate, real_overtime_rate) = match total_weekend_days {
        Some(total) => (
            rate(saturday_days + sunday_days, total),
            rate(real_overtime_days, total),
        ),
        None => (None, None),
    };

    WeekendOvertimeDistribution {
        saturday_days,
        sunday_days,
        real_overtime_days,
        casual_fix_days,
        total_weekend_days,
        weekend_activity_rate,
        real_overtime_rate,
    }
}
