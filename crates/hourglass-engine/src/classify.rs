//! Corporate versus open-source project classification.
//!
//! Four signals are scored independently: how office-shaped the weekday
//! commit curve is, how much work lands on weekends, how much weekday
//! work lands in the evening, and how many people contribute. Two strong
//! signals decide outright; otherwise a weighted score is banded.

use std::fmt;

use hourglass_core::{CommitDataset, WeekdayHistogram, WeekdayHourMatrix};
use serde::{Deserialize, Serialize};

use crate::stats::window_mean;

const CHECK_POINTS: u32 = 25;
const MORNING_RISE_FACTOR: f64 = 1.2;
const EVENING_FALL_FACTOR: f64 = 1.5;
const NIGHT_SHARE_LIMIT: f64 = 0.15;
const MOONLIGHTING_RATIO: f64 = 0.25;
const LARGE_COMMUNITY: u32 = 50;

/// Inputs of [`classify_project`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSignals {
    /// Commits per hour over all days.
    pub hours: [u32; 24],
    /// Commits per day of week.
    pub weekdays: WeekdayHistogram,
    /// Exact per-weekday hours, when available.
    pub weekday_hours: Option<WeekdayHourMatrix>,
    /// Distinct contributors.
    pub contributors: u32,
}

impl ProjectSignals {
    /// Signals of a dataset, with exact weekday hours.
    pub fn from_dataset(dataset: &CommitDataset, contributors: u32) -> Self {
        Self {
            hours: dataset.hours.to_hourly(),
            weekdays: dataset.weekdays,
            weekday_hours: Some(dataset.weekday_hours.clone()),
            contributors,
        }
    }

    /// Monday–Friday commits per hour: exact from the matrix, otherwise
    /// the global curve scaled by the weekday share of commits.
    ///
    /// # Examples
    ///
    /// ```
    /// use hourglass_core::WeekdayHistogram;
    /// use hourglass_engine::classify::ProjectSignals;
    ///
    /// let mut hours = [0u32; 24];
    /// hours[10] = 8;
    /// let signals = ProjectSignals {
    ///     hours,
    ///     weekdays: WeekdayHistogram::new([1, 1, 1, 1, 2, 1, 1]),
    ///     weekday_hours: None,
    ///     contributors: 1,
    /// };
    /// assert_eq!(signals.weekday_only_hours()[10], 6.0);
    /// ```
    pub fn weekday_only_hours(&self) -> [f64; 24] {
        let mut out = [0.0; 24];
        if let Some(matrix) = &self.weekday_hours {
            for (slot, count) in out.iter_mut().zip(matrix.weekday_only_hours()) {
                *slot = f64::from(count);
            }
            return out;
        }
        let total = self.weekdays.total();
        let share = if total > 0 {
            f64::from(self.weekdays.weekday_total()) / f64::from(total)
        } else {
            1.0
        };
        for (slot, &count) in out.iter_mut().zip(self.hours.iter()) {
            *slot = f64::from(count) * share;
        }
        out
    }
}

/// The four shape checks of a weekday commit curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularityChecks {
    /// 09–11 busier than 06–08 by more than 20%.
    pub morning_uptrend: bool,
    /// 14–17 busier than both 09–11 and 19–21.
    pub afternoon_peak: bool,
    /// 18–20 at most 1.5x 21–22, or no evening activity.
    pub evening_downtrend: bool,
    /// 22–05 under 15% of commits.
    pub night_low_activity: bool,
    /// 25 points per passing check.
    pub score: u32,
}

/// Score how office-shaped a weekday hourly curve is.
pub fn regularity(hours: &[f64; 24]) -> RegularityChecks {
    let early = window_mean(hours, 6, 8);
    let morning = window_mean(hours, 9, 11);
    let afternoon = window_mean(hours, 14, 17);
    let evening = window_mean(hours, 19, 21);
    let after_work = window_mean(hours, 18, 20);
    let late = window_mean(hours, 21, 22);

    let total: f64 = hours.iter().sum();
    let night: f64 = hours[22..].iter().chain(hours[..6].iter()).sum();
    let night_share = if total > 0.0 { night / total } else { 0.0 };
    let evening_activity: f64 = hours[18..=22].iter().sum();

    let morning_uptrend = morning > early * MORNING_RISE_FACTOR;
    let afternoon_peak = afternoon > morning && afternoon > evening;
    let evening_downtrend = evening_activity == 0.0 || after_work <= late * EVENING_FALL_FACTOR;
    let night_low_activity = night_share < NIGHT_SHARE_LIMIT;

    let score = [
        morning_uptrend,
        afternoon_peak,
        evening_downtrend,
        night_low_activity,
    ]
    .iter()
    .filter(|&&passed| passed)
    .count() as u32
        * CHECK_POINTS;

    RegularityChecks {
        morning_uptrend,
        afternoon_peak,
        evening_downtrend,
        night_low_activity,
        score,
    }
}

/// Evening share of weekday work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moonlighting {
    /// Commits 09:00–17:59.
    pub day_commits: f64,
    /// Commits 19:00–23:59.
    pub night_commits: f64,
    /// `night / (day + night)`.
    pub night_ratio: f64,
    /// `night_ratio >= 0.25`.
    pub is_active: bool,
}

/// Measure evening work on a weekday hourly curve.
pub fn moonlighting(hours: &[f64; 24]) -> Moonlighting {
    let day_commits: f64 = hours[9..=17].iter().sum();
    let night_commits: f64 = hours[19..].iter().sum();
    let denominator = day_commits + night_commits;
    let night_ratio = if denominator > 0.0 {
        night_commits / denominator
    } else {
        0.0
    };
    Moonlighting {
        day_commits,
        night_commits,
        night_ratio,
        is_active: night_ratio >= MOONLIGHTING_RATIO,
    }
}

/// Verdict of [`classify_project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectType {
    /// Community-driven development.
    OpenSource,
    /// Not enough evidence either way.
    Uncertain,
    /// Office-hours development.
    Corporate,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProjectType::OpenSource => "open source",
            ProjectType::Uncertain => "uncertain",
            ProjectType::Corporate => "corporate",
        };
        f.write_str(text)
    }
}

/// Classification with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectClassificationResult {
    /// The verdict.
    pub project_type: ProjectType,
    /// 0–100.
    pub confidence: u8,
    /// Accumulated open-source score; 0 when a strong rule decided.
    pub open_source_score: u32,
    /// Weekday curve shape.
    pub regularity: RegularityChecks,
    /// `weekend / (weekday + weekend)`.
    pub weekend_ratio: f64,
    /// Evening share of weekday work.
    pub moonlighting: Moonlighting,
    /// Distinct contributors.
    pub contributors: u32,
    /// One line per rule that fired.
    pub reasons: Vec<String>,
}

/// Weighted open-source score and the reasons behind it.
///
/// # Examples
///
/// ```
/// use hourglass_engine::classify::open_source_score;
///
/// let (score, reasons) = open_source_score(25, 30, 0.35, true);
/// assert_eq!(score, 60 + 20 + 30 + 20);
/// assert_eq!(reasons.len(), 4);
/// ```
pub fn open_source_score(
    regularity_score: u32,
    contributors: u32,
    weekend_ratio: f64,
    moonlighting_active: bool,
) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    let regularity_points = match regularity_score {
        0..=29 => 60,
        30..=49 => 40,
        50..=74 => 20,
        _ => 0,
    };
    if regularity_points > 0 {
        score += regularity_points;
        reasons.push(format!(
            "irregular weekday rhythm (regularity {regularity_score}/100): +{regularity_points}"
        ));
    }

    let contributor_points = match contributors {
        20..=49 => 20,
        10..=19 => 10,
        _ => 0,
    };
    if contributor_points > 0 {
        score += contributor_points;
        reasons.push(format!(
            "{contributors} contributors: +{contributor_points}"
        ));
    }

    let weekend_points = if weekend_ratio >= 0.30 {
        30
    } else if weekend_ratio >= 0.20 {
        20
    } else if weekend_ratio >= 0.15 {
        10
    } else {
        0
    };
    if weekend_points > 0 {
        score += weekend_points;
        reasons.push(format!(
            "{:.0}% of commits on weekends: +{weekend_points}",
            weekend_ratio * 100.0
        ));
    }

    if moonlighting_active {
        score += 20;
        reasons.push("substantial weekday evening work: +20".to_string());
    }

    (score, reasons)
}

/// Classify a repository as corporate or open source.
///
/// # Examples
///
/// ```
/// use hourglass_core::WeekdayHistogram;
/// use hourglass_engine::classify::{classify_project, ProjectSignals, ProjectType};
///
/// let signals = ProjectSignals {
///     hours: [0; 24],
///     weekdays: WeekdayHistogram::default(),
///     weekday_hours: None,
///     contributors: 120,
/// };
/// let result = classify_project(&signals);
/// assert_eq!(result.project_type, ProjectType::OpenSource);
/// assert_eq!(result.confidence, 82);
/// ```
pub fn classify_project(signals: &ProjectSignals) -> ProjectClassificationResult {
    let weekday_hours = signals.weekday_only_hours();
    let regularity = regularity(&weekday_hours);
    let moonlighting = moonlighting(&weekday_hours);
    let total = signals.weekdays.total();
    let weekend_ratio = if total > 0 {
        f64::from(signals.weekdays.weekend_total()) / f64::from(total)
    } else {
        0.0
    };
    let contributors = signals.contributors;

    let decided = |project_type, confidence: u32, reason: String| ProjectClassificationResult {
        project_type,
        confidence: confidence.min(100) as u8,
        open_source_score: 0,
        regularity,
        weekend_ratio,
        moonlighting,
        contributors,
        reasons: vec![reason],
    };

    if contributors >= LARGE_COMMUNITY {
        return decided(
            ProjectType::OpenSource,
            (70 + contributors / 10).min(95),
            format!("{contributors} contributors indicate a community project"),
        );
    }
    if regularity.score <= CHECK_POINTS {
        return decided(
            ProjectType::OpenSource,
            90,
            format!(
                "weekday commits follow no office rhythm (regularity {}/100)",
                regularity.score
            ),
        );
    }

    let (score, reasons) = open_source_score(
        regularity.score,
        contributors,
        weekend_ratio,
        moonlighting.is_active,
    );
    let (project_type, confidence) = if score >= 60 {
        (ProjectType::OpenSource, score.clamp(60, 95))
    } else if score >= 40 {
        (ProjectType::Uncertain, 50)
    } else {
        (ProjectType::Corporate, 100u32.saturating_sub(score).clamp(60, 95))
    };

    tracing::debug!(%project_type, score, confidence, "classified project");

    ProjectClassificationResult {
        project_type,
        confidence: confidence as u8,
        open_source_score: score,
        regularity,
        weekend_ratio,
        moonlighting,
        contributors,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A weekday curve peaking in the afternoon and tailing off by 22:00.
    fn office_curve() -> [u32; 24] {
        let mut hours = [0u32; 24];
        for (hour, count) in [
            (6, 1),
            (7, 1),
            (8, 1),
            (9, 10),
            (10, 10),
            (11, 10),
            (12, 8),
            (13, 8),
            (14, 12),
            (15, 12),
            (16, 12),
            (17, 12),
            (18, 2),
            (19, 2),
            (20, 2),
            (21, 2),
            (22, 2),
        ] {
            hours[hour] = count;
        }
        hours
    }

    fn weekday_matrix(curve: [u32; 24]) -> WeekdayHourMatrix {
        let mut counts = [[0u32; 24]; 7];
        counts[0] = curve;
        WeekdayHourMatrix::new(counts)
    }

    #[test]
    fn office_curve_is_corporate() {
        let curve = office_curve();
        let total: u32 = curve.iter().sum();
        let signals = ProjectSignals {
            hours: curve,
            weekdays: WeekdayHistogram::new([total, 0, 0, 0, 0, 0, 0]),
            weekday_hours: Some(weekday_matrix(curve)),
            contributors: 5,
        };
        let result = classify_project(&signals);
        assert_eq!(result.regularity.score, 100);
        assert!(!result.moonlighting.is_active);
        assert_eq!(result.open_source_score, 0);
        assert_eq!(result.project_type, ProjectType::Corporate);
        assert_eq!(result.confidence, 95);
    }

    #[test]
    fn flat_curve_short_circuits_to_open_source() {
        let curve = [10u32; 24];
        let checks = regularity(&curve.map(f64::from));
        assert!(!checks.morning_uptrend);
        assert!(!checks.afternoon_peak);
        assert!(checks.evening_downtrend);
        assert!(!checks.night_low_activity);

        let signals = ProjectSignals {
            hours: curve,
            weekdays: WeekdayHistogram::new([240, 0, 0, 0, 0, 0, 0]),
            weekday_hours: None,
            contributors: 3,
        };
        let result = classify_project(&signals);
        assert_eq!(result.project_type, ProjectType::OpenSource);
        assert_eq!(result.confidence, 90);
    }

    #[test]
    fn empty_curve_keeps_only_evening_and_night_checks() {
        let checks = regularity(&[0.0; 24]);
        assert_eq!(checks.score, 50);
        assert!(checks.evening_downtrend && checks.night_low_activity);
    }

    #[test]
    fn large_community_confidence_is_capped() {
        let signals = |contributors| ProjectSignals {
            hours: office_curve(),
            weekdays: WeekdayHistogram::new([100, 0, 0, 0, 0, 0, 0]),
            weekday_hours: None,
            contributors,
        };
        assert_eq!(classify_project(&signals(50)).confidence, 75);
        assert_eq!(classify_project(&signals(5000)).confidence, 95);
    }

    #[test]
    fn score_bands() {
        assert_eq!(open_source_score(50, 20, 0.0, false).0, 40);
        assert_eq!(open_source_score(75, 10, 0.15, false).0, 20);
        assert_eq!(open_source_score(100, 5, 0.0, true).0, 20);
        assert_eq!(open_source_score(29, 0, 0.2, false).0, 80);
    }

    #[test]
    fn middle_score_is_uncertain() {
        // regularity 50 adds 20, 25 contributors add 20
        let mut curve = office_curve();
        curve[0] = 40; // heavy night work fails the night check
        curve[6] = 30; // early start fails the morning check
        let signals = ProjectSignals {
            hours: curve,
            weekdays: WeekdayHistogram::new([300, 0, 0, 0, 0, 0, 0]),
            weekday_hours: Some(weekday_matrix(curve)),
            contributors: 25,
        };
        let result = classify_project(&signals);
        assert_eq!(result.regularity.score, 50);
        assert_eq!(result.open_source_score, 40);
        assert_eq!(result.project_type, ProjectType::Uncertain);
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn evening_work_counts_as_moonlighting() {
        let mut hours = [0.0; 24];
        hours[10] = 6.0;
        hours[20] = 2.0;
        let m = moonlighting(&hours);
        assert_eq!(m.night_ratio, 0.25);
        assert!(m.is_active);
    }

    #[test]
    fn project_type_serializes_screaming() {
        let json = serde_json::to_string(&ProjectType::OpenSource).unwrap();
        assert_eq!(json, "\"OPEN_SOURCE\"");
    }

    proptest! {
        #[test]
        fn large_communities_are_always_open_source(
            curve in proptest::array::uniform24(0u32..200),
            weekend in 0u32..500,
            contributors in 50u32..100_000,
        ) {
            let weekday_total: u32 = curve.iter().sum();
            let signals = ProjectSignals {
                hours: curve,
                weekdays: WeekdayHistogram::new([weekday_total, 0, 0, 0, 0, weekend, 0]),
                weekday_hours: None,
                contributors,
            };
            let result = classify_project(&signals);
            prop_assert_eq!(result.project_type, ProjectType::OpenSource);
            prop_assert!(result.confidence >= 70);
        }
    }
}
