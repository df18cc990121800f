//! Late-night analysis: how often the working day ends deep in the evening.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use hourglass_core::{DailyExtremes, DailyFirstCommit, DateRange};
use serde::{Deserialize, Serialize};

const LATE_NIGHT_HOUR: u32 = 21;
const MIDNIGHT_HOUR: u32 = 23;
const DAWN_END_HOUR: u32 = 6;

/// Band of a day's latest commit hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LateNightBand {
    /// `[end_hour, 21)`.
    Evening,
    /// `[21, 23)`.
    LateNight,
    /// 23:00 or later, including hours rolled over from the next day.
    Midnight,
    /// Before 06:00.
    Dawn,
}

/// Band for `latest_hour`, or `None` for a day that ended during normal hours.
///
/// # Examples
///
/// ```
/// use hourglass_engine::late_night::{late_night_band, LateNightBand};
///
/// assert_eq!(late_night_band(19, 18), Some(LateNightBand::Evening));
/// assert_eq!(late_night_band(25, 18), Some(LateNightBand::Midnight));
/// assert_eq!(late_night_band(3, 18), Some(LateNightBand::Dawn));
/// assert_eq!(late_night_band(16, 18), None);
/// ```
pub fn late_night_band(latest_hour: u32, end_hour: u8) -> Option<LateNightBand> {
    if latest_hour >= MIDNIGHT_HOUR {
        Some(LateNightBand::Midnight)
    } else if latest_hour >= LATE_NIGHT_HOUR {
        Some(LateNightBand::LateNight)
    } else if latest_hour >= u32::from(end_hour) {
        Some(LateNightBand::Evening)
    } else if latest_hour < DAWN_END_HOUR {
        Some(LateNightBand::Dawn)
    } else {
        None
    }
}

/// Day counts per late-night band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateNightAnalysis {
    /// Days ending between the end hour and 21:00.
    pub evening: u32,
    /// Days ending between 21:00 and 23:00.
    pub late_night: u32,
    /// Days ending at 23:00 or later.
    pub midnight: u32,
    /// Days ending before 06:00.
    pub dawn: u32,
    /// Distinct dates in the midnight or dawn bands.
    pub midnight_days: u32,
    /// Distinct weekday dates with a first commit (at least 1).
    pub total_work_days: u32,
    /// `midnight_days / total_work_days * 100`. Weekend nights count in
    /// the numerator only, so the rate can exceed 100.
    pub midnight_rate: f64,
    /// Weeks in the analyzed period (at least 1).
    pub total_weeks: u32,
    /// Months in the analyzed period (at least 1).
    pub total_months: u32,
}

/// Band every day's latest commit against `end_hour`.
///
/// Weekend days are banded too; only the work-day denominator is
/// restricted to weekdays.
///
/// `range` sets the week/month denominators; without it they are
/// derived from the work-day count (5 per week, 22 per month).
pub fn analyze_late_night(
    daily: &[DailyExtremes],
    first_commits: &[DailyFirstCommit],
    end_hour: u8,
    range: Option<DateRange>,
) -> LateNightAnalysis {
    let mut evening = 0;
    let mut late_night = 0;
    let mut midnight = 0;
    let mut dawn = 0;
    let mut midnight_dates: BTreeSet<NaiveDate> = BTreeSet::new();

    for day in daily {
        let Some(latest) = day.latest_hour() else {
            continue;
        };
        match late_night_band(latest, end_hour) {
            Some(LateNightBand::Evening) => evening += 1,
            Some(LateNightBand::LateNight) => late_night += 1,
            Some(LateNightBand::Midnight) => {
                midnight += 1;
                midnight_dates.insert(day.date);
            }
            Some(LateNightBand::Dawn) => {
                dawn += 1;
                midnight_dates.insert(day.date);
            }
            None => {}
        }
    }

    let work_dates: BTreeSet<NaiveDate> = first_commits
        .iter()
        .filter(|f| f.weekday() <= 5)
        .map(|f| f.date)
        .collect();
    let total_work_days = (work_dates.len() as u32).max(1);
    let midnight_days = midnight_dates.len() as u32;

    let (total_weeks, total_months) = match range {
        Some(range) => {
            let days = range.span_days().max(0) as u32;
            ((days / 7).max(1), (days / 30).max(1))
        }
        None => ((total_work_days / 5).max(1), (total_work_days / 22).max(1)),
    };

    LateNightAnalysis {
        evening,
        late_night,
        midnight,
        dawn,
        midnight_days,
        total_work_days,
        midnight_rate: f64::from(midnight_days) / f64::from(total_work_days) * 100.0,
        total_weeks,
        total_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn ending_at(d: u32, last_minute: u32) -> DailyExtremes {
        DailyExtremes {
            date: date(d),
            first_minute: Some(540),
            last_minute: Some(last_minute),
            hours: BTreeSet::from([9, (last_minute / 60) as u8]),
            commit_count: Some(2),
        }
    }

    fn firsts(days: &[u32]) -> Vec<DailyFirstCommit> {
        days.iter()
            .map(|&d| DailyFirstCommit {
                date: date(d),
                minute_of_day: 540,
            })
            .collect()
    }

    #[test]
    fn bands_each_day_once() {
        let daily = vec![
            ending_at(8, 17 * 60),       // normal
            ending_at(9, 19 * 60),       // evening
            ending_at(10, 21 * 60 + 5),  // late night
            ending_at(11, 23 * 60 + 30), // midnight
            ending_at(12, 24 * 60 + 40), // rolled over: midnight
        ];
        let analysis = analyze_late_night(&daily, &firsts(&[8, 9, 10, 11, 12]), 18, None);
        assert_eq!(analysis.evening, 1);
        assert_eq!(analysis.late_night, 1);
        assert_eq!(analysis.midnight, 2);
        assert_eq!(analysis.dawn, 0);
        assert_eq!(analysis.midnight_days, 2);
        assert_eq!(analysis.total_work_days, 5);
        assert_eq!(analysis.midnight_rate, 40.0);
    }

    #[test]
    fn unfolded_early_commit_is_dawn() {
        let daily = vec![ending_at(9, 4 * 60)];
        let analysis = analyze_late_night(&daily, &firsts(&[9]), 18, None);
        assert_eq!(analysis.dawn, 1);
        assert_eq!(analysis.midnight_days, 1);
    }

    #[test]
    fn late_end_hour_leaves_evening_empty() {
        let daily = vec![ending_at(9, 21 * 60 + 30)];
        let analysis = analyze_late_night(&daily, &firsts(&[9]), 22, None);
        assert_eq!(analysis.evening, 0);
        assert_eq!(analysis.late_night, 1);
    }

    #[test]
    fn work_days_never_zero() {
        let analysis = analyze_late_night(&[], &[], 18, None);
        assert_eq!(analysis.total_work_days, 1);
        assert_eq!(analysis.midnight_rate, 0.0);
        assert_eq!(analysis.total_weeks, 1);
        assert_eq!(analysis.total_months, 1);
    }

    #[test]
    fn weekend_first_commits_are_not_work_days() {
        // 6 and 7 are a weekend
        let analysis = analyze_late_night(&[], &firsts(&[6, 7, 8]), 18, None);
        assert_eq!(analysis.total_work_days, 1);
    }

    #[test]
    fn weekend_nights_count_against_weekday_denominator() {
        // 6, 7 and 13 are weekend days, 8 the only weekday
        let daily = vec![
            ending_at(6, 23 * 60 + 30),
            ending_at(7, 1440 + 60),
            ending_at(13, 23 * 60),
            ending_at(8, 17 * 60),
        ];
        let analysis = analyze_late_night(&daily, &firsts(&[6, 7, 8, 13]), 18, None);
        assert_eq!(analysis.midnight_days, 3);
        assert_eq!(analysis.total_work_days, 1);
        assert_eq!(analysis.midnight_rate, 300.0);
    }

    #[test]
    fn range_drives_week_and_month_counts() {
        let until = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::new(date(1), until).unwrap();
        let analysis = analyze_late_night(&[], &[], 18, Some(range));
        // 90 days
        assert_eq!(analysis.total_weeks, 12);
        assert_eq!(analysis.total_months, 3);
    }

    #[test]
    fn work_day_count_drives_denominators_without_range() {
        let days: Vec<u32> = (1..=31)
            .filter(|d| !matches!(d, 6 | 7 | 13 | 14 | 20 | 21 | 27 | 28))
            .collect();
        let analysis = analyze_late_night(&[], &firsts(&days), 18, None);
        assert_eq!(analysis.total_work_days, 23);
        assert_eq!(analysis.total_weeks, 4);
        assert_eq!(analysis.total_months, 1);
    }
}
