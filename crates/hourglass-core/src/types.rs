use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::HourglassError;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// The local time of a single commit.
///
/// Produced by the collection layer and consumed read-only by every
/// analysis. `weekday` is ISO numbered: Monday = 1 … Sunday = 7.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::CommitTimeSample;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap().and_hms_opt(21, 15, 0).unwrap();
/// let sample = CommitTimeSample::from_datetime(at);
/// assert_eq!(sample.weekday, 6);
/// assert_eq!(sample.hour, 21);
/// assert_eq!(sample.minute_of_day, 21 * 60 + 15);
/// assert!(sample.is_weekend());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTimeSample {
    /// Local calendar date of the commit.
    pub date: NaiveDate,
    /// ISO weekday, 1 (Monday) to 7 (Sunday).
    pub weekday: u8,
    /// Hour of day, 0–23.
    pub hour: u8,
    /// Minutes since local midnight, 0–1439.
    pub minute_of_day: u16,
}

impl CommitTimeSample {
    /// Build a sample from a local wall-clock timestamp.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        let date = at.date();
        let hour = at.hour();
        Self {
            date,
            weekday: date.weekday().number_from_monday() as u8,
            hour: hour as u8,
            minute_of_day: (hour * 60 + at.minute()) as u16,
        }
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        self.weekday >= 6
    }
}

/// Returns `true` for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Render minutes since midnight as `HH:MM`, with a `+1` suffix once the
/// value rolls into the next calendar day.
///
/// # Examples
///
/// ```
/// use hourglass_core::format_minutes;
///
/// assert_eq!(format_minutes(9 * 60 + 5), "09:05");
/// assert_eq!(format_minutes(1440 + 90), "01:30+1");
/// ```
pub fn format_minutes(minutes: u32) -> String {
    if minutes >= MINUTES_PER_DAY {
        let rest = minutes - MINUTES_PER_DAY;
        format!("{:02}:{:02}+1", rest / 60, rest % 60)
    } else {
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

/// An inclusive calendar date range.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::DateRange;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
/// ).unwrap();
/// assert_eq!(range.weekend_days(), 4);
/// assert_eq!(range.span_days(), 13);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day (inclusive).
    pub since: NaiveDate,
    /// Last day (inclusive).
    pub until: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `since > until`.
    ///
    /// # Errors
    ///
    /// Returns [`HourglassError::Config`] if the bounds are reversed.
    pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self, HourglassError> {
        if since > until {
            return Err(HourglassError::Config(format!(
                "range start {since} is after range end {until}"
            )));
        }
        Ok(Self { since, until })
    }

    /// Smallest range covering every date yielded, if any.
    pub fn covering(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for date in dates {
            bounds = Some(match bounds {
                None => (date, date),
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
            });
        }
        bounds.map(|(since, until)| Self { since, until })
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.since && date <= self.until
    }

    /// `until - since` in whole days.
    pub fn span_days(&self) -> i64 {
        (self.until - self.since).num_days()
    }

    /// Number of Saturdays and Sundays in the range.
    pub fn weekend_days(&self) -> u32 {
        let mut count = 0;
        let mut day = self.since;
        loop {
            if is_weekend(day) {
                count += 1;
            }
            match day.succ_opt() {
                Some(next) if next <= self.until => day = next,
                _ => break,
            }
        }
        count
    }

    /// Every calendar month overlapping the range, in order.
    pub fn months(&self) -> Vec<YearMonth> {
        let last = YearMonth::of(self.until);
        let mut current = YearMonth::of(self.since);
        let mut months = vec![current];
        while current < last {
            current = current.next();
            months.push(current);
        }
        months
    }
}

/// A calendar month, ordered chronologically.
///
/// # Examples
///
/// ```
/// use hourglass_core::YearMonth;
///
/// let dec = YearMonth { year: 2023, month: 12 };
/// assert_eq!(dec.next(), YearMonth { year: 2024, month: 1 });
/// assert_eq!(dec.to_string(), "2023-12");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month, 1–12.
    pub month: u32,
}

impl YearMonth {
    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether `date` lies in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Output format for CLI subcommands.
///
/// # Examples
///
/// ```
/// use hourglass_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary lines.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
