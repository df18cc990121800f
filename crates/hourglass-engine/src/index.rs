//! The 996 index: a weekend-amended overtime ratio scaled so that a
//! 9am–9pm, six-day schedule lands near 100.

use std::fmt;

use hourglass_core::{HourHistogram, WeekdayHistogram};
use serde::{Deserialize, Serialize};

use crate::working_hours::WorkTimeWindow;

/// Buckets in a standard 9-hour day; sparser histograms trigger the
/// saturation correction.
const STANDARD_DAY_BUCKETS: usize = 9;
const INDEX_SCALE: i32 = 3;

/// Commit tallies feeding [`calculate_996_index`].
///
/// # Examples
///
/// ```
/// use hourglass_engine::index::{calculate_996_index, IndexInput};
///
/// let input = IndexInput {
///     work_hour_count: 30,
///     overtime_count: 10,
///     weekday_count: 35,
///     weekend_count: 5,
///     bucket_count: 12,
/// };
/// let result = calculate_996_index(&input);
/// assert_eq!(result.over_time_radio, 35);
/// assert_eq!(result.index_996, 105);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInput {
    /// `y`: commits inside normal hours.
    pub work_hour_count: u32,
    /// `x`: commits outside normal hours.
    pub overtime_count: u32,
    /// `m`: Monday–Friday commits.
    pub weekday_count: u32,
    /// `n`: Saturday and Sunday commits.
    pub weekend_count: u32,
    /// Non-empty buckets of the histogram `x` and `y` came from.
    pub bucket_count: usize,
}

impl IndexInput {
    /// Tally commits of `hours` against `window`, with weekday/weekend
    /// totals from `weekdays`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hourglass_core::{HourHistogram, WeekdayHistogram};
    /// use hourglass_engine::index::IndexInput;
    /// use hourglass_engine::working_hours::WorkTimeWindow;
    ///
    /// let mut counts = [0u32; 24];
    /// counts[10] = 8;
    /// counts[20] = 2;
    /// let input = IndexInput::from_histograms(
    ///     &HourHistogram::hourly(counts),
    ///     &WeekdayHistogram::new([2, 2, 2, 2, 1, 1, 0]),
    ///     &WorkTimeWindow::manual(9, 18),
    /// );
    /// assert_eq!(input.work_hour_count, 8);
    /// assert_eq!(input.overtime_count, 2);
    /// assert_eq!(input.bucket_count, 2);
    /// ```
    pub fn from_histograms(
        hours: &HourHistogram,
        weekdays: &WeekdayHistogram,
        window: &WorkTimeWindow,
    ) -> Self {
        let mut work_hour_count = 0;
        let mut overtime_count = 0;
        for (start, count) in hours.buckets() {
            if window.is_working_hour(start) {
                work_hour_count += count;
            } else {
                overtime_count += count;
            }
        }
        Self {
            work_hour_count,
            overtime_count,
            weekday_count: weekdays.weekday_total(),
            weekend_count: weekdays.weekend_total(),
            bucket_count: hours.nonzero_buckets(),
        }
    }

    /// `x + y`.
    pub fn total(&self) -> u32 {
        self.work_hour_count + self.overtime_count
    }

    /// Whether the preconditions of [`calculate_996_index`] hold.
    pub fn is_computable(&self) -> bool {
        self.total() > 0 && self.weekday_count + self.weekend_count > 0
    }
}

/// Text band for an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntensityBand {
    /// `index <= 0`.
    BelowStandard,
    /// `index <= 21`.
    Relaxed,
    /// `index <= 48`.
    Occasional,
    /// `index <= 63`.
    Regular,
    /// `index <= 100`.
    Heavy,
    /// `index <= 130`.
    Severe,
    /// `index > 130`.
    Extreme,
}

impl IntensityBand {
    /// Map an index value to its band.
    ///
    /// # Examples
    ///
    /// ```
    /// use hourglass_engine::index::IntensityBand;
    ///
    /// assert_eq!(IntensityBand::from_index(0), IntensityBand::BelowStandard);
    /// assert_eq!(IntensityBand::from_index(100), IntensityBand::Heavy);
    /// assert_eq!(IntensityBand::from_index(131), IntensityBand::Extreme);
    /// ```
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => IntensityBand::BelowStandard,
            1..=21 => IntensityBand::Relaxed,
            22..=48 => IntensityBand::Occasional,
            49..=63 => IntensityBand::Regular,
            64..=100 => IntensityBand::Heavy,
            101..=130 => IntensityBand::Severe,
            _ => IntensityBand::Extreme,
        }
    }
}

impl fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IntensityBand::BelowStandard => "very healthy, below a standard workload",
            IntensityBand::Relaxed => "healthy, little overtime",
            IntensityBand::Occasional => "occasional overtime",
            IntensityBand::Regular => "regular overtime",
            IntensityBand::Heavy => "heavy overtime, approaching 996",
            IntensityBand::Severe => "severe overtime, 996 or beyond",
            IntensityBand::Extreme => "extreme overtime, far beyond 996",
        };
        f.write_str(text)
    }
}

/// The headline index and its derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Result996 {
    /// `over_time_radio * 3`.
    pub index_996: i32,
    /// Human-readable band of `index_996`.
    pub index_996_str: String,
    /// Weekend-amended overtime percentage; negative below a 9-hour day.
    pub over_time_radio: i32,
    /// Band of `index_996`.
    pub band: IntensityBand,
}

impl Result996 {
    fn from_ratio(over_time_radio: i32) -> Self {
        let index_996 = over_time_radio * INDEX_SCALE;
        let band = IntensityBand::from_index(index_996);
        Self {
            index_996,
            index_996_str: band.to_string(),
            over_time_radio,
            band,
        }
    }

    /// The neutral placeholder used when there are no commits.
    pub fn empty() -> Self {
        Self::from_ratio(0)
    }
}

/// Compute the 996 index.
///
/// 1. `amend = round(x + y * n / (m + n))` folds weekend work in.
/// 2. `ratio = ceil(amend * 100 / (x + y))`.
/// 3. A zero ratio over fewer than 9 active buckets is re-expressed as
///    throughput against a 9-bucket day: `ceil(total / (total / buckets * 9) * 100) - 100`.
/// 4. `index = ratio * 3`.
///
/// Callers must ensure `x + y > 0` and `m + n > 0`
/// (see [`IndexInput::is_computable`]); the ratio is not clamped.
///
/// # Examples
///
/// ```
/// use hourglass_engine::index::{calculate_996_index, IndexInput};
///
/// let sparse = IndexInput {
///     work_hour_count: 1,
///     overtime_count: 0,
///     weekday_count: 1,
///     weekend_count: 0,
///     bucket_count: 1,
/// };
/// let result = calculate_996_index(&sparse);
/// assert_eq!(result.over_time_radio, -88);
/// assert_eq!(result.index_996, -264);
/// ```
pub fn calculate_996_index(input: &IndexInput) -> Result996 {
    let y = f64::from(input.work_hour_count);
    let x = f64::from(input.overtime_count);
    let m = f64::from(input.weekday_count);
    let n = f64::from(input.weekend_count);

    let amend_count = (x + y * n / (m + n)).round();
    let total = x + y;
    let mut over_time_radio = (amend_count * 100.0 / total).ceil() as i32;

    if over_time_radio == 0 && input.bucket_count < STANDARD_DAY_BUCKETS {
        let average_commit = total / input.bucket_count as f64;
        let mock_total = average_commit * STANDARD_DAY_BUCKETS as f64;
        over_time_radio = (total / mock_total * 100.0).ceil() as i32 - 100;
    }

    Result996::from_ratio(over_time_radio)
}
