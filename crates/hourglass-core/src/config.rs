use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::DEFAULT_ROLLOVER_HOUR;
use crate::error::HourglassError;
use crate::types::DateRange;

/// Top-level configuration loaded from `.hourglass.toml`.
///
/// Resolution order: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use hourglass_core::HourglassConfig;
///
/// let config = HourglassConfig::default();
/// assert_eq!(config.weekend.commit_threshold, 3);
/// assert_eq!(config.team.min_commits, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourglassConfig {
    /// Working-hour and range settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Weekend overtime thresholds.
    #[serde(default)]
    pub weekend: WeekendConfig,
    /// Team analysis settings.
    #[serde(default)]
    pub team: TeamConfig,
    /// History collection settings.
    #[serde(default)]
    pub collect: CollectConfig,
}

impl HourglassConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HourglassError::Io`] if the file cannot be read, or
    /// [`HourglassError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, HourglassError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`HourglassError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use hourglass_core::HourglassConfig;
    ///
    /// let config = HourglassConfig::from_toml("[analysis]\nworking_hours = \"10-19\"\n").unwrap();
    /// assert_eq!(config.analysis.working_hours.as_deref(), Some("10-19"));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, HourglassError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// The configured `[since, until]` range, if both ends are set.
    ///
    /// # Errors
    ///
    /// Returns [`HourglassError::Config`] if `since` is after `until`.
    pub fn range(&self) -> Result<Option<DateRange>, HourglassError> {
        match (self.analysis.since, self.analysis.until) {
            (Some(since), Some(until)) => DateRange::new(since, until).map(Some),
            _ => Ok(None),
        }
    }
}

/// Working-hour and range settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Manual `start-end` working hours, e.g. `"9-18"`. Detected when unset.
    pub working_hours: Option<String>,
    /// Custom weekday end hour for overtime severity buckets.
    pub overtime_end_hour: Option<u8>,
    /// Analyze commits from this date on.
    pub since: Option<NaiveDate>,
    /// Analyze commits up to and including this date.
    pub until: Option<NaiveDate>,
}

/// Thresholds separating real weekend overtime from casual fixes.
///
/// # Examples
///
/// ```
/// use hourglass_core::WeekendConfig;
///
/// let config = WeekendConfig::default();
/// assert_eq!(config.span_threshold, 3.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendConfig {
    /// Minimum first-to-last commit span in hours (default: 3).
    #[serde(default = "default_span_threshold")]
    pub span_threshold: f64,
    /// Minimum commits that day (default: 3).
    #[serde(default = "default_commit_threshold")]
    pub commit_threshold: u32,
}

fn default_span_threshold() -> f64 {
    3.0
}

fn default_commit_threshold() -> u32 {
    3
}

impl Default for WeekendConfig {
    fn default() -> Self {
        Self {
            span_threshold: default_span_threshold(),
            commit_threshold: default_commit_threshold(),
        }
    }
}

/// Team analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Contributors with fewer commits are not analyzed (default: 10).
    #[serde(default = "default_min_commits")]
    pub min_commits: u32,
    /// Analyze at most this many contributors, most active first (default: 50).
    #[serde(default = "default_max_contributors")]
    pub max_contributors: usize,
}

fn default_min_commits() -> u32 {
    10
}

fn default_max_contributors() -> usize {
    50
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            min_commits: default_min_commits(),
            max_contributors: default_max_contributors(),
        }
    }
}

/// History collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
    /// Count merge commits (default: false).
    #[serde(default)]
    pub include_merges: bool,
    /// Commits before this hour belong to the previous working day (default: 4).
    #[serde(default = "default_rollover_hour")]
    pub rollover_hour: u8,
}

fn default_rollover_hour() -> u8 {
    DEFAULT_ROLLOVER_HOUR
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            branch: None,
            include_merges: false,
            rollover_hour: default_rollover_hour(),
        }
    }
}
