//! Weekday overtime: which weekdays carry after-hours commits and how
//! far past the end of the day they run.

use chrono::Weekday;
use hourglass_core::{DailyExtremes, WeekdayHourMatrix};
use serde::{Deserialize, Serialize};

use crate::stats::rate;
use crate::working_hours::WorkTimeWindow;

const WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// How far past the custom end hour an overtime day ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OvertimeSeverity {
    /// Up to 2 hours.
    Light,
    /// Up to 4 hours.
    Moderate,
    /// Up to 6 hours.
    Severe,
    /// More than 6 hours.
    Extreme,
}

impl OvertimeSeverity {
    /// Bucket an overrun expressed in hours.
    ///
    /// # Examples
    ///
    /// ```
    /// use hourglass_engine::overtime::OvertimeSeverity;
    ///
    /// assert_eq!(OvertimeSeverity::from_overrun(2.0), OvertimeSeverity::Light);
    /// assert_eq!(OvertimeSeverity::from_overrun(6.5), OvertimeSeverity::Extreme);
    /// ```
    pub fn from_overrun(hours: f64) -> Self {
        if hours <= 2.0 {
            OvertimeSeverity::Light
        } else if hours <= 4.0 {
            OvertimeSeverity::Moderate
        } else if hours <= 6.0 {
            OvertimeSeverity::Severe
        } else {
            OvertimeSeverity::Extreme
        }
    }
}

/// Day counts per [`OvertimeSeverity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    /// Days ending at most 2h late.
    pub light: u32,
    /// Days ending 2–4h late.
    pub moderate: u32,
    /// Days ending 4–6h late.
    pub severe: u32,
    /// Days ending more than 6h late.
    pub extreme: u32,
}

impl SeverityBreakdown {
    fn record(&mut self, severity: OvertimeSeverity) {
        match severity {
            OvertimeSeverity::Light => self.light += 1,
            OvertimeSeverity::Moderate => self.moderate += 1,
            OvertimeSeverity::Severe => self.severe += 1,
            OvertimeSeverity::Extreme => self.extreme += 1,
        }
    }

    /// Sum of all buckets.
    pub fn total(&self) -> u32 {
        self.light + self.moderate + self.severe + self.extreme
    }
}

/// After-hours commits per weekday and the overtime days behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayOvertimeDistribution {
    /// Monday commits at or after the end hour.
    pub monday: u32,
    /// Tuesday commits at or after the end hour.
    pub tuesday: u32,
    /// Wednesday commits at or after the end hour.
    pub wednesday: u32,
    /// Thursday commits at or after the end hour.
    pub thursday: u32,
    /// Friday commits at or after the end hour.
    pub friday: u32,
    /// Weekday with the most after-hours commits; `None` if there are none.
    pub peak_day: Option<Weekday>,
    /// Commit count of `peak_day`.
    pub peak_count: u32,
    /// Hour the comparison was made against.
    pub end_hour: u8,
    /// Weekdays whose last commit landed at or after `end_hour`.
    pub overtime_days: u32,
    /// Weekdays with any commit.
    pub weekday_days: u32,
    /// `overtime_days / weekday_days * 100`.
    pub overtime_day_rate: Option<f64>,
    /// Overrun buckets, only when a custom end hour was supplied.
    pub severity: Option<SeverityBreakdown>,
}

impl WeekdayOvertimeDistribution {
    /// Per-day commit counts, Monday first.
    pub fn by_day(&self) -> [(Weekday, u32); 5] {
        [
            (Weekday::Mon, self.monday),
            (Weekday::Tue, self.tuesday),
            (Weekday::Wed, self.wednesday),
            (Weekday::Thu, self.thursday),
            (Weekday::Fri, self.friday),
        ]
    }
}

/// Classify weekday overtime against `custom_end_hour`, or the window's
/// rounded-up end hour when none is given.
///
/// # Examples
///
/// ```
/// use hourglass_core::WeekdayHourMatrix;
/// use hourglass_engine::overtime::classify_weekday_overtime;
/// use hourglass_engine::working_hours::WorkTimeWindow;
///
/// let mut counts = [[0u32; 24]; 7];
/// counts[2][20] = 4; // Wednesday 20:00
/// counts[0][19] = 1; // Monday 19:00
/// let dist = classify_weekday_overtime(
///     &WeekdayHourMatrix::new(counts),
///     &[],
///     &WorkTimeWindow::manual(9, 18),
///     None,
/// );
/// assert_eq!(dist.wednesday, 4);
/// assert_eq!(dist.peak_day, Some(chrono::Weekday::Wed));
/// ```
pub fn classify_weekday_overtime(
    matrix: &WeekdayHourMatrix,
    daily: &[DailyExtremes],
    window: &WorkTimeWindow,
    custom_end_hour: Option<u8>,
) -> WeekdayOvertimeDistribution {
    let end_hour = custom_end_hour.unwrap_or_else(|| window.overtime_end_hour());

    let mut totals = [0u32; 5];
    for (idx, total) in totals.iter_mut().enumerate() {
        let day = matrix.day(idx as u8 + 1);
        *total = day[usize::from(end_hour.min(24))..].iter().sum();
    }

    let mut peak: Option<(Weekday, u32)> = None;
    for (day, &count) in WORKDAYS.iter().zip(totals.iter()) {
        if count > peak.map_or(0, |(_, c)| c) {
            peak = Some((*day, count));
        }
    }

    let weekdays: Vec<&DailyExtremes> = daily.iter().filter(|d| !d.is_weekend()).collect();
    let overtime: Vec<&DailyExtremes> = weekdays
        .iter()
        .copied()
        .filter(|d| is_overtime_day(d, end_hour))
        .collect();

    let severity = custom_end_hour.map(|custom| {
        let mut breakdown = SeverityBreakdown::default();
        for day in &overtime {
            breakdown.record(OvertimeSeverity::from_overrun(overrun_hours(day, custom)));
        }
        breakdown
    });

    let overtime_days = overtime.len() as u32;
    let weekday_days = weekdays.len() as u32;

    WeekdayOvertimeDistribution {
        monday: totals[0],
        tuesday: totals[1],
        wednesday: totals[2],
        thursday: totals[3],
        friday: totals[4],
        peak_day: peak.map(|(day, _)| day),
        peak_count: peak.map_or(0, |(_, count)| count),
        end_hour,
        overtime_days,
        weekday_days,
        overtime_day_rate: rate(overtime_days, weekday_days),
        severity,
    }
}

/// A day is overtime when its last commit is at or after `end_hour`:
/// by exact minute when known, otherwise by any touched hour.
pub fn is_overtime_day(day: &DailyExtremes, end_hour: u8) -> bool {
    match day.last_minute {
        Some(last) => last >= u32::from(end_hour) * 60,
        None => day.hours.iter().any(|&h| h >= end_hour),
    }
}

fn overrun_hours(day: &DailyExtremes, end_hour: u8) -> f64 {
    let last = day
        .last_minute
        .or_else(|| day.hours.iter().next_back().map(|&h| u32::from(h) * 60))
        .unwrap_or(0);
    (f64::from(last) - f64::from(end_hour) * 60.0) / 60.0
}
