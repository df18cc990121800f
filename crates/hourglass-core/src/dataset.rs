//! Per-day aggregates and the bundled inputs of one analysis call.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::histogram::{HourHistogram, Resolution, WeekdayHistogram, WeekdayHourMatrix};
use crate::types::{is_weekend, CommitTimeSample, DateRange, MINUTES_PER_DAY};

/// Commits before this hour count toward the previous day's extremes.
pub const DEFAULT_ROLLOVER_HOUR: u8 = 4;

/// The first commit of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFirstCommit {
    /// Calendar date.
    pub date: NaiveDate,
    /// Minutes since midnight of the earliest commit that day.
    pub minute_of_day: u16,
}

impl DailyFirstCommit {
    /// ISO weekday of `date`, Monday = 1.
    pub fn weekday(&self) -> u8 {
        self.date.weekday().number_from_monday() as u8
    }
}

/// First/last commit time and touched hours of one working day.
///
/// `last_minute` and the entries of `hours` may exceed one day
/// (`>= 1440` minutes, `>= 24` hours) when late commits were folded in
/// from the following calendar day.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use chrono::NaiveDate;
/// use hourglass_core::DailyExtremes;
///
/// let day = DailyExtremes {
///     date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
///     first_minute: Some(9 * 60),
///     last_minute: Some(24 * 60 + 30),
///     hours: BTreeSet::from([9, 14, 24]),
///     commit_count: Some(5),
/// };
/// assert_eq!(day.latest_hour(), Some(24));
/// assert_eq!(day.span_hours(), Some(15.5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExtremes {
    /// Working day the commits are attributed to.
    pub date: NaiveDate,
    /// Earliest commit, minutes since midnight.
    pub first_minute: Option<u32>,
    /// Latest commit, minutes since midnight of `date`.
    pub last_minute: Option<u32>,
    /// Distinct hours touched.
    pub hours: BTreeSet<u8>,
    /// Exact number of commits, when known.
    pub commit_count: Option<u32>,
}

impl DailyExtremes {
    /// ISO weekday of `date`, Monday = 1.
    pub fn weekday(&self) -> u8 {
        self.date.weekday().number_from_monday() as u8
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        is_weekend(self.date)
    }

    /// Hour of the latest commit: from `last_minute` when present,
    /// otherwise the highest touched hour.
    pub fn latest_hour(&self) -> Option<u32> {
        self.last_minute
            .map(|m| m / 60)
            .or_else(|| self.hours.iter().next_back().map(|&h| u32::from(h)))
    }

    /// `(last - first) / 60` when both minutes are known.
    pub fn span_hours(&self) -> Option<f64> {
        match (self.first_minute, self.last_minute) {
            (Some(first), Some(last)) => Some((f64::from(last) - f64::from(first)) / 60.0),
            _ => None,
        }
    }
}

/// Everything the engine needs for one repository, contributor, or month.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::{CommitDataset, CommitTimeSample, DEFAULT_ROLLOVER_HOUR};
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let samples = vec![
///     CommitTimeSample::from_datetime(day.and_hms_opt(9, 0, 0).unwrap()),
///     CommitTimeSample::from_datetime(day.and_hms_opt(19, 30, 0).unwrap()),
/// ];
/// let data = CommitDataset::from_samples(&samples, DEFAULT_ROLLOVER_HOUR);
/// assert_eq!(data.total_commits, 2);
/// assert_eq!(data.daily[0].last_minute, Some(19 * 60 + 30));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDataset {
    /// Number of samples aggregated.
    pub total_commits: u32,
    /// Commits by half hour of day.
    pub hours: HourHistogram,
    /// Commits by day of week.
    pub weekdays: WeekdayHistogram,
    /// Commits by weekday and hour.
    pub weekday_hours: WeekdayHourMatrix,
    /// First commit per calendar date, date order.
    pub first_commits: Vec<DailyFirstCommit>,
    /// Extremes per working day, date order.
    pub daily: Vec<DailyExtremes>,
}

impl CommitDataset {
    /// Aggregate samples with a half-hour histogram, matching the
    /// 30-minute grid detected windows are snapped to.
    pub fn from_samples(samples: &[CommitTimeSample], rollover_hour: u8) -> Self {
        Self::from_samples_with_resolution(samples, rollover_hour, Resolution::HalfHour)
    }

    /// Aggregate samples, choosing the hour-histogram resolution.
    pub fn from_samples_with_resolution(
        samples: &[CommitTimeSample],
        rollover_hour: u8,
        resolution: Resolution,
    ) -> Self {
        Self {
            total_commits: samples.len() as u32,
            hours: HourHistogram::from_samples(samples, resolution),
            weekdays: WeekdayHistogram::from_samples(samples),
            weekday_hours: WeekdayHourMatrix::from_samples(samples),
            first_commits: first_commits(samples),
            daily: daily_extremes(samples, rollover_hour),
        }
    }

    /// No commits at all.
    pub fn is_empty(&self) -> bool {
        self.total_commits == 0
    }

    /// Smallest range covering every observed working day.
    pub fn observed_range(&self) -> Option<DateRange> {
        DateRange::covering(
            self.daily
                .iter()
                .map(|d| d.date)
                .chain(self.first_commits.iter().map(|f| f.date)),
        )
    }
}

/// Every sample attributed to one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorSamples {
    /// Display name of the most recent commit.
    pub name: String,
    /// Identity key.
    pub email: String,
    /// The author's commit times.
    pub samples: Vec<CommitTimeSample>,
}

impl ContributorSamples {
    /// Number of commits by this author.
    pub fn commit_count(&self) -> u32 {
        self.samples.len() as u32
    }
}

fn first_commits(samples: &[CommitTimeSample]) -> Vec<DailyFirstCommit> {
    let mut earliest: BTreeMap<NaiveDate, u16> = BTreeMap::new();
    for sample in samples {
        let entry = earliest.entry(sample.date).or_insert(sample.minute_of_day);
        *entry = (*entry).min(sample.minute_of_day);
    }
    earliest
        .into_iter()
        .map(|(date, minute_of_day)| DailyFirstCommit {
            date,
            minute_of_day,
        })
        .collect()
}

fn daily_extremes(samples: &[CommitTimeSample], rollover_hour: u8) -> Vec<DailyExtremes> {
    let mut days: BTreeMap<NaiveDate, DailyExtremes> = BTreeMap::new();

    for sample in samples {
        let mut date = sample.date;
        let mut minute = u32::from(sample.minute_of_day);
        let mut hour = sample.hour;

        if sample.hour < rollover_hour {
            if let Some(previous) = sample.date.pred_opt() {
                date = previous;
                minute += MINUTES_PER_DAY;
                hour += 24;
            }
        }

        let day = days.entry(date).or_insert_with(|| DailyExtremes {
            date,
            first_minute: None,
            last_minute: None,
            hours: BTreeSet::new(),
            commit_count: Some(0),
        });
        day.first_minute = Some(day.first_minute.map_or(minute, |m| m.min(minute)));
        day.last_minute = Some(day.last_minute.map_or(minute, |m| m.max(minute)));
        day.hours.insert(hour);
        day.commit_count = day.commit_count.map(|c| c + 1);
    }

    days.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> CommitTimeSample {
        let dt = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        CommitTimeSample::from_datetime(dt)
    }

    #[test]
    fn early_morning_commit_rolls_into_previous_day() {
        let samples = vec![at(8, 10, 0), at(9, 1, 30)];
        let data = CommitDataset::from_samples(&samples, 4);

        assert_eq!(data.daily.len(), 1);
        let day = &data.daily[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(day.first_minute, Some(600));
        assert_eq!(day.last_minute, Some(1440 + 90));
        assert!(day.hours.contains(&25));
        assert_eq!(day.commit_count, Some(2));
    }

    #[test]
    fn first_commits_use_raw_calendar_date() {
        let samples = vec![at(8, 10, 0), at(9, 1, 30), at(9, 9, 15)];
        let data = CommitDataset::from_samples(&samples, 4);
        let firsts: Vec<u16> = data.first_commits.iter().map(|f| f.minute_of_day).collect();
        assert_eq!(firsts, vec![600, 90]);
    }

    #[test]
    fn hour_histogram_splits_half_hours() {
        let samples = vec![at(8, 9, 10), at(8, 9, 40), at(8, 9, 45)];
        let data = CommitDataset::from_samples(&samples, 4);
        assert_eq!(data.hours.resolution(), Resolution::HalfHour);
        assert_eq!(data.hours.counts()[18], 1);
        assert_eq!(data.hours.counts()[19], 2);
        assert_eq!(data.hours.to_hourly()[9], 3);
    }

    #[test]
    fn rollover_zero_keeps_every_commit_on_its_date() {
        let samples = vec![at(9, 1, 30)];
        let data = CommitDataset::from_samples(&samples, 0);
        assert_eq!(data.daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(data.daily[0].last_minute, Some(90));
    }

    #[test]
    fn latest_hour_falls_back_to_hour_set() {
        let day = DailyExtremes {
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            first_minute: None,
            last_minute: None,
            hours: BTreeSet::from([9, 21]),
            commit_count: None,
        };
        assert_eq!(day.latest_hour(), Some(21));
        assert_eq!(day.span_hours(), None);
    }

    #[test]
    fn empty_samples_give_empty_dataset() {
        let data = CommitDataset::from_samples(&[], DEFAULT_ROLLOVER_HOUR);
        assert!(data.is_empty());
        assert!(data.daily.is_empty());
        assert!(data.observed_range().is_none());
    }
}
