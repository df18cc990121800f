//! Per-contributor analysis and team-level statistics.
//!
//! Contributors are profiled independently, then a single baseline end
//! hour is taken over all profiles and every profile is classified
//! against it.

use hourglass_core::{CommitDataset, ContributorSamples, DEFAULT_ROLLOVER_HOUR};
use serde::{Deserialize, Serialize};

use crate::analysis::{resolve_window, score};
use crate::index::Result996;
use crate::stats::{mean, percentile};
use crate::working_hours::WorkTimeWindow;

/// Baseline end hour when no contributor could be profiled.
pub const DEFAULT_BASELINE_END_HOUR: f64 = 18.0;

const MIN_DAYS_FOR_TIME_STATS: usize = 10;
const MIN_COMMITS_FOR_TIME_STATS: u32 = 20;
const MODERATE_MARGIN_HOURS: f64 = 2.0;
const OUTLIER_SHARE: f64 = 0.3;
const OUTLIER_GAP: f64 = 20.0;

/// A contributor's end hour relative to the team baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    /// Ends before the baseline.
    Normal,
    /// Ends within two hours after the baseline.
    Moderate,
    /// Ends two or more hours after the baseline.
    Heavy,
}

/// Mean and median of a time of day, in fractional hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Interpolated median.
    pub median: f64,
}

impl TimeStats {
    fn of(hours: &[f64]) -> Option<Self> {
        (!hours.is_empty()).then(|| Self {
            mean: mean(hours),
            median: percentile(hours, 50.0),
        })
    }
}

/// Everything known about one contributor before the baseline exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorProfile {
    /// Display name.
    pub name: String,
    /// Identity key.
    pub email: String,
    /// Commits analyzed.
    pub total_commits: u32,
    /// Personal working-hour window.
    pub window: WorkTimeWindow,
    /// Personal index.
    pub result: Result996,
    /// First commit of the day, when enough history exists.
    pub avg_start_time: Option<TimeStats>,
    /// Last commit of the day, when enough history exists.
    pub avg_end_time: Option<TimeStats>,
}

impl ContributorProfile {
    /// Detected end hour used for baseline comparison.
    pub fn end_hour(&self) -> f64 {
        self.window.end_hour
    }
}

/// A profile classified against the team baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorPattern {
    /// The underlying profile.
    #[serde(flatten)]
    pub profile: ContributorProfile,
    /// Intensity relative to the baseline.
    pub intensity: IntensityLevel,
}

/// Contributors per [`IntensityLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntensityDistribution {
    /// Normal contributors.
    pub normal: u32,
    /// Moderate contributors.
    pub moderate: u32,
    /// Heavy contributors.
    pub heavy: u32,
}

/// Distribution of personal index values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamStatistics {
    /// 25th percentile.
    pub p25: f64,
    /// 50th percentile.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// Mean.
    pub mean: f64,
    /// Same as `p50`.
    pub median: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// `max - min`.
    pub range: f64,
}

/// Band of the team's median index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    /// Median below 40.
    Healthy,
    /// Median below 60.
    Moderate,
    /// Median below 80.
    Concerning,
    /// Median 80 or above.
    Severe,
}

/// Team health verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAssessment {
    /// Band of the median index.
    pub level: HealthLevel,
    /// One-line verdict.
    pub conclusion: String,
    /// Caveats about how representative the numbers are.
    pub warnings: Vec<String>,
}

/// Knobs for [`analyze_team`].
#[derive(Debug, Clone)]
pub struct TeamOptions {
    /// Contributors with fewer commits are not analyzed.
    pub min_commits: u32,
    /// At most this many contributors, most active first.
    pub max_contributors: usize,
    /// Repository-wide index, for the outlier warning.
    pub overall_index_996: Option<i32>,
    /// See [`CommitDataset::from_samples`].
    pub rollover_hour: u8,
}

impl Default for TeamOptions {
    fn default() -> Self {
        Self {
            min_commits: 10,
            max_contributors: 50,
            overall_index_996: None,
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
        }
    }
}

/// Team analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAnalysis {
    /// Classified contributors, most active first.
    pub contributors: Vec<ContributorPattern>,
    /// Contributors received.
    pub total_contributors: usize,
    /// Contributors profiled.
    pub analyzed_contributors: usize,
    /// Contributors below `min_commits`.
    pub excluded_contributors: usize,
    /// Eligible contributors dropped by `max_contributors`.
    pub truncated_contributors: usize,
    /// Median of the personal end hours.
    pub baseline_end_hour: f64,
    /// Contributors per intensity level.
    pub distribution: IntensityDistribution,
    /// Distribution of personal indices.
    pub statistics: TeamStatistics,
    /// Verdict on the median.
    pub health: HealthAssessment,
}

/// Profile one contributor from their own samples.
pub fn build_profile(contributor: &ContributorSamples, rollover_hour: u8) -> ContributorProfile {
    let dataset = CommitDataset::from_samples(&contributor.samples, rollover_hour);
    let window = resolve_window(&dataset, None);
    let (_, result) = score(&dataset, &window);

    let enough_history = dataset.first_commits.len() >= MIN_DAYS_FOR_TIME_STATS
        || dataset.total_commits >= MIN_COMMITS_FOR_TIME_STATS;
    let (avg_start_time, avg_end_time) = if enough_history {
        let starts: Vec<f64> = dataset
            .first_commits
            .iter()
            .map(|f| f64::from(f.minute_of_day) / 60.0)
            .collect();
        let ends: Vec<f64> = dataset
            .daily
            .iter()
            .filter_map(|d| d.last_minute)
            .map(|m| f64::from(m) / 60.0)
            .collect();
        (TimeStats::of(&starts), TimeStats::of(&ends))
    } else {
        (None, None)
    };

    ContributorProfile {
        name: contributor.name.clone(),
        email: contributor.email.clone(),
        total_commits: dataset.total_commits,
        window,
        result,
        avg_start_time,
        avg_end_time,
    }
}

/// Median of the profiles' end hours, or 18 without profiles.
///
/// # Examples
///
/// ```
/// use hourglass_engine::team::team_baseline;
///
/// assert_eq!(team_baseline(&[]), 18.0);
/// ```
pub fn team_baseline(profiles: &[ContributorProfile]) -> f64 {
    if profiles.is_empty() {
        return DEFAULT_BASELINE_END_HOUR;
    }
    let ends: Vec<f64> = profiles.iter().map(ContributorProfile::end_hour).collect();
    percentile(&ends, 50.0)
}

/// Classify a personal end hour against `baseline`.
///
/// # Examples
///
/// ```
/// use hourglass_engine::team::{classify_intensity, IntensityLevel};
///
/// assert_eq!(classify_intensity(17.5, 18.0), IntensityLevel::Normal);
/// assert_eq!(classify_intensity(19.0, 18.0), IntensityLevel::Moderate);
/// assert_eq!(classify_intensity(20.0, 18.0), IntensityLevel::Heavy);
/// ```
pub fn classify_intensity(end_hour: f64, baseline: f64) -> IntensityLevel {
    if end_hour < baseline {
        IntensityLevel::Normal
    } else if end_hour < baseline + MODERATE_MARGIN_HOURS {
        IntensityLevel::Moderate
    } else {
        IntensityLevel::Heavy
    }
}

/// Percentiles, mean and spread of `values`; all zero when empty.
///
/// # Examples
///
/// ```
/// use hourglass_engine::team::team_statistics;
///
/// let stats = team_statistics(&[10.0, 20.0, 30.0, 40.0, 50.0]);
/// assert_eq!(stats.p25, 20.0);
/// assert_eq!(stats.median, 30.0);
/// assert_eq!(stats.range, 40.0);
/// ```
pub fn team_statistics(values: &[f64]) -> TeamStatistics {
    if values.is_empty() {
        return TeamStatistics::default();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let median = percentile(values, 50.0);
    TeamStatistics {
        p25: percentile(values, 25.0),
        p50: median,
        p75: percentile(values, 75.0),
        p90: percentile(values, 90.0),
        mean: mean(values),
        median,
        min,
        max,
        range: max - min,
    }
}

/// Band the median index and attach outlier warnings.
pub fn assess_health(
    median_index: f64,
    heavy: u32,
    analyzed: usize,
    overall_index: Option<i32>,
) -> HealthAssessment {
    let (level, conclusion) = if median_index < 40.0 {
        (HealthLevel::Healthy, "most of the team works regular hours")
    } else if median_index < 60.0 {
        (HealthLevel::Moderate, "the team works some overtime")
    } else if median_index < 80.0 {
        (HealthLevel::Concerning, "overtime is common across the team")
    } else {
        (HealthLevel::Severe, "overtime is the norm for most of the team")
    };

    let mut warnings = Vec::new();
    if heavy > 0 && analyzed > 0 && (f64::from(heavy) / analyzed as f64) < OUTLIER_SHARE {
        warnings.push(format!(
            "{heavy} of {analyzed} contributors work much later than the rest and may skew the average"
        ));
    }
    if let Some(overall) = overall_index {
        let gap = f64::from(overall) - median_index;
        if gap > OUTLIER_GAP {
            warnings.push(format!(
                "the repository index ({overall}) exceeds the team median ({median_index:.0}) by {gap:.0}; a few high-volume contributors drive the overall number"
            ));
        }
    }

    HealthAssessment {
        level,
        conclusion: conclusion.to_string(),
        warnings,
    }
}

/// Profile, baseline, classify and summarize a team.
pub fn analyze_team(contributors: &[ContributorSamples], options: &TeamOptions) -> TeamAnalysis {
    let mut ordered: Vec<&ContributorSamples> = contributors.iter().collect();
    ordered.sort_by(|a, b| {
        b.commit_count()
            .cmp(&a.commit_count())
            .then_with(|| a.name.cmp(&b.name))
    });

    let (eligible, excluded): (Vec<&ContributorSamples>, Vec<&ContributorSamples>) = ordered
        .into_iter()
        .partition(|c| c.commit_count() >= options.min_commits);
    let truncated_contributors = eligible.len().saturating_sub(options.max_contributors);

    let profiles: Vec<ContributorProfile> = eligible
        .into_iter()
        .take(options.max_contributors)
        .map(|c| build_profile(c, options.rollover_hour))
        .collect();

    let baseline_end_hour = team_baseline(&profiles);
    tracing::debug!(
        baseline_end_hour,
        analyzed = profiles.len(),
        excluded = excluded.len(),
        "computed team baseline"
    );

    let indices: Vec<f64> = profiles
        .iter()
        .map(|p| f64::from(p.result.index_996))
        .collect();
    let contributors: Vec<ContributorPattern> = profiles
        .into_iter()
        .map(|profile| {
            let intensity = classify_intensity(profile.end_hour(), baseline_end_hour);
            ContributorPattern { profile, intensity }
        })
        .collect();

    let mut distribution = IntensityDistribution::default();
    for pattern in &contributors {
        match pattern.intensity {
            IntensityLevel::Normal => distribution.normal += 1,
            IntensityLevel::Moderate => distribution.moderate += 1,
            IntensityLevel::Heavy => distribution.heavy += 1,
        }
    }

    let statistics = team_statistics(&indices);
    let health = assess_health(
        statistics.median,
        distribution.heavy,
        contributors.len(),
        options.overall_index_996,
    );

    TeamAnalysis {
        total_contributors: contributors.len() + excluded.len() + truncated_contributors,
        analyzed_contributors: contributors.len(),
        excluded_contributors: excluded.len(),
        truncated_contributors,
        baseline_end_hour,
        distribution,
        statistics,
        health,
        contributors,
    }
}
