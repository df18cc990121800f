//! Commit-count histograms over hour of day and day of week.

use serde::{Deserialize, Serialize};

use crate::types::CommitTimeSample;

/// Bucket width of an [`HourHistogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// 24 one-hour buckets.
    Hour,
    /// 48 half-hour buckets.
    HalfHour,
}

impl Resolution {
    /// Number of buckets covering one day.
    pub fn bucket_count(self) -> usize {
        match self {
            Resolution::Hour => 24,
            Resolution::HalfHour => 48,
        }
    }

    fn minutes_per_bucket(self) -> u16 {
        match self {
            Resolution::Hour => 60,
            Resolution::HalfHour => 30,
        }
    }
}

/// Commits per time-of-day bucket.
///
/// # Examples
///
/// ```
/// use hourglass_core::HourHistogram;
///
/// let mut counts = [0u32; 24];
/// counts[10] = 4;
/// counts[20] = 1;
/// let hist = HourHistogram::hourly(counts);
/// assert_eq!(hist.total(), 5);
/// assert_eq!(hist.nonzero_buckets(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourHistogram {
    resolution: Resolution,
    counts: Vec<u32>,
}

impl HourHistogram {
    /// An all-zero histogram at `resolution`.
    pub fn empty(resolution: Resolution) -> Self {
        Self {
            resolution,
            counts: vec![0; resolution.bucket_count()],
        }
    }

    /// A 24-bucket histogram from raw counts.
    pub fn hourly(counts: [u32; 24]) -> Self {
        Self {
            resolution: Resolution::Hour,
            counts: counts.to_vec(),
        }
    }

    /// A 48-bucket histogram from raw counts, bucket `i` covering
    /// `i * 30 .. i * 30 + 30` minutes.
    pub fn half_hourly(counts: [u32; 48]) -> Self {
        Self {
            resolution: Resolution::HalfHour,
            counts: counts.to_vec(),
        }
    }

    /// Count every sample into its bucket.
    pub fn from_samples(samples: &[CommitTimeSample], resolution: Resolution) -> Self {
        let mut hist = Self::empty(resolution);
        let width = resolution.minutes_per_bucket();
        for sample in samples {
            let slot = (sample.minute_of_day / width) as usize;
            if let Some(count) = hist.counts.get_mut(slot) {
                *count += 1;
            }
        }
        hist
    }

    /// Bucket width.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Raw bucket counts in time order.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Iterate `(bucket start in fractional hours, count)`.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, u32)> + '_ {
        let width = f64::from(self.resolution.minutes_per_bucket()) / 60.0;
        self.counts
            .iter()
            .enumerate()
            .map(move |(slot, &count)| (slot as f64 * width, count))
    }

    /// Sum of all buckets.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Number of buckets holding at least one commit.
    pub fn nonzero_buckets(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Fold into 24 hourly buckets; an hourly histogram is returned as-is.
    pub fn to_hourly(&self) -> [u32; 24] {
        let mut hours = [0u32; 24];
        match self.resolution {
            Resolution::Hour => {
                for (hour, &count) in self.counts.iter().enumerate().take(24) {
                    hours[hour] = count;
                }
            }
            Resolution::HalfHour => {
                for (slot, &count) in self.counts.iter().enumerate().take(48) {
                    hours[slot / 2] += count;
                }
            }
        }
        hours
    }
}

/// Commits per day of week, Monday first.
///
/// # Examples
///
/// ```
/// use hourglass_core::WeekdayHistogram;
///
/// let hist = WeekdayHistogram::new([10, 10, 10, 10, 10, 3, 1]);
/// assert_eq!(hist.weekday_total(), 50);
/// assert_eq!(hist.weekend_total(), 4);
/// assert_eq!(hist.count(6), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayHistogram {
    counts: [u32; 7],
}

impl WeekdayHistogram {
    /// Build from counts indexed Monday (0) to Sunday (6).
    pub fn new(counts: [u32; 7]) -> Self {
        Self { counts }
    }

    /// Count samples by their ISO weekday.
    pub fn from_samples(samples: &[CommitTimeSample]) -> Self {
        let mut counts = [0u32; 7];
        for sample in samples {
            if (1..=7).contains(&sample.weekday) {
                counts[usize::from(sample.weekday - 1)] += 1;
            }
        }
        Self { counts }
    }

    /// Count for ISO weekday `weekday` (1–7); out-of-range yields 0.
    pub fn count(&self, weekday: u8) -> u32 {
        match weekday {
            1..=7 => self.counts[usize::from(weekday - 1)],
            _ => 0,
        }
    }

    /// Raw counts, Monday first.
    pub fn counts(&self) -> [u32; 7] {
        self.counts
    }

    /// Monday through Friday.
    pub fn weekday_total(&self) -> u32 {
        self.counts[..5].iter().sum()
    }

    /// Saturday and Sunday.
    pub fn weekend_total(&self) -> u32 {
        self.counts[5..].iter().sum()
    }

    /// All seven days.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Commits per (weekday, hour) cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayHourMatrix {
    counts: [[u32; 24]; 7],
}

impl WeekdayHourMatrix {
    /// Build from a Monday-first matrix of hourly counts.
    pub fn new(counts: [[u32; 24]; 7]) -> Self {
        Self { counts }
    }

    /// Count samples by weekday and hour.
    pub fn from_samples(samples: &[CommitTimeSample]) -> Self {
        let mut counts = [[0u32; 24]; 7];
        for sample in samples {
            if (1..=7).contains(&sample.weekday) && sample.hour < 24 {
                counts[usize::from(sample.weekday - 1)][usize::from(sample.hour)] += 1;
            }
        }
        Self { counts }
    }

    /// Hourly counts for ISO weekday `weekday` (1–7).
    pub fn day(&self, weekday: u8) -> [u32; 24] {
        match weekday {
            1..=7 => self.counts[usize::from(weekday - 1)],
            _ => [0; 24],
        }
    }

    /// Hourly counts summed over Monday–Friday.
    pub fn weekday_only_hours(&self) -> [u32; 24] {
        let mut hours = [0u32; 24];
        for day in &self.counts[..5] {
            for (hour, &count) in day.iter().enumerate() {
                hours[hour] += count;
            }
        }
        hours
    }

    /// Fold away the weekday dimension.
    pub fn to_hourly(&self) -> [u32; 24] {
        let mut hours = [0u32; 24];
        for day in &self.counts {
            for (hour, &count) in day.iter().enumerate() {
                hours[hour] += count;
            }
        }
        hours
    }

    /// Fold away the hour dimension.
    pub fn to_weekdays(&self) -> WeekdayHistogram {
        let mut days = [0u32; 7];
        for (idx, day) in self.counts.iter().enumerate() {
            days[idx] = day.iter().sum();
        }
        WeekdayHistogram::new(days)
    }

    /// Sum of all cells.
    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }
}
