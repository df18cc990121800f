//! One-call overtime analysis of a [`CommitDataset`].

use hourglass_core::{CommitDataset, DateRange, HourglassConfig, HourglassError};
use serde::Serialize;

use crate::index::{calculate_996_index, IndexInput, Result996};
use crate::late_night::{analyze_late_night, LateNightAnalysis};
use crate::overtime::{classify_weekday_overtime, WeekdayOvertimeDistribution};
use crate::weekend::{classify_weekend_overtime, WeekendOvertimeDistribution, WeekendThresholds};
use crate::working_hours::{detect_working_hours, parse_working_hours, WorkTimeWindow};

/// Knobs for [`analyze`].
///
/// # Examples
///
/// ```
/// use hourglass_engine::analysis::AnalysisOptions;
///
/// let options = AnalysisOptions::default();
/// assert!(options.working_hours.is_none());
/// assert_eq!(options.weekend.min_commits, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Analyzed period, for weekend and week/month denominators.
    pub range: Option<DateRange>,
    /// Declared window; detected from the data when `None`.
    pub working_hours: Option<WorkTimeWindow>,
    /// Custom weekday end hour enabling overtime severity buckets.
    pub custom_end_hour: Option<u8>,
    /// Weekend overtime thresholds.
    pub weekend: WeekendThresholds,
}

impl AnalysisOptions {
    /// Build options from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HourglassError::InvalidWorkingHours`] for a malformed
    /// `working_hours` override, or [`HourglassError::Config`] for a
    /// reversed range.
    pub fn from_config(config: &HourglassConfig) -> Result<Self, HourglassError> {
        let working_hours = config
            .analysis
            .working_hours
            .as_deref()
            .map(parse_working_hours)
            .transpose()?;
        Ok(Self {
            range: config.range()?,
            working_hours,
            custom_end_hour: config.analysis.overtime_end_hour,
            weekend: WeekendThresholds::from(&config.weekend),
        })
    }
}

/// Everything [`analyze`] derives for one dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeReport {
    /// Commits analyzed.
    pub total_commits: u32,
    /// Working-hour window used.
    pub window: WorkTimeWindow,
    /// Tallies fed to the index.
    pub tallies: IndexInput,
    /// The 996 index.
    pub result: Result996,
    /// Weekday after-hours breakdown.
    pub weekday: WeekdayOvertimeDistribution,
    /// Weekend breakdown.
    pub weekend: WeekendOvertimeDistribution,
    /// Late-night breakdown.
    pub late_night: LateNightAnalysis,
}

/// The declared window, or one detected from `dataset`.
pub fn resolve_window(dataset: &CommitDataset, declared: Option<&WorkTimeWindow>) -> WorkTimeWindow {
    match declared {
        Some(window) => window.clone(),
        None => detect_working_hours(&dataset.first_commits, &dataset.hours),
    }
}

/// Tally `dataset` against `window` and compute the index, returning the
/// neutral placeholder when the index preconditions do not hold.
pub fn score(dataset: &CommitDataset, window: &WorkTimeWindow) -> (IndexInput, Result996) {
    let tallies = IndexInput::from_histograms(&dataset.hours, &dataset.weekdays, window);
    let result = if tallies.is_computable() {
        calculate_996_index(&tallies)
    } else {
        Result996::empty()
    };
    (tallies, result)
}

/// Run detection, scoring and the three overtime breakdowns.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::{CommitDataset, CommitTimeSample};
/// use hourglass_engine::analysis::{analyze, AnalysisOptions};
///
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let samples: Vec<CommitTimeSample> = (9..17)
///     .map(|h| CommitTimeSample::from_datetime(monday.and_hms_opt(h, 0, 0).unwrap()))
///     .collect();
/// let report = analyze(&CommitDataset::from_samples(&samples, 4), &AnalysisOptions::default());
/// assert_eq!(report.total_commits, 8);
/// assert!(report.result.index_996 <= 0);
/// ```
pub fn analyze(dataset: &CommitDataset, options: &AnalysisOptions) -> OvertimeReport {
    let window = resolve_window(dataset, options.working_hours.as_ref());
    let (tallies, result) = score(dataset, &window);

    let weekday = classify_weekday_overtime(
        &dataset.weekday_hours,
        &dataset.daily,
        &window,
        options.custom_end_hour,
    );
    let weekend = classify_weekend_overtime(&dataset.daily, options.range, &options.weekend);
    let late_night = analyze_late_night(
        &dataset.daily,
        &dataset.first_commits,
        weekday.end_hour,
        options.range,
    );

    OvertimeReport {
        total_commits: dataset.total_commits,
        window,
        tallies,
        result,
        weekday,
        weekend,
        late_night,
    }
}
