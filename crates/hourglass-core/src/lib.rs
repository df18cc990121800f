//! Sample model, configuration, and error handling for hourglass.
//!
//! This crate provides the shared foundation used by the other hourglass crates:
//! - [`HourglassError`]: unified error type using `thiserror`
//! - [`HourglassConfig`]: configuration loaded from `.hourglass.toml`
//! - the sample model: [`CommitTimeSample`], [`HourHistogram`],
//!   [`WeekdayHistogram`], [`WeekdayHourMatrix`], [`DailyExtremes`] and the
//!   bundled [`CommitDataset`]

mod config;
mod dataset;
mod error;
mod histogram;
mod types;

pub use config::{AnalysisConfig, CollectConfig, HourglassConfig, TeamConfig, WeekendConfig};
pub use dataset::{
    CommitDataset, ContributorSamples, DailyExtremes, DailyFirstCommit, DEFAULT_ROLLOVER_HOUR,
};
pub use error::HourglassError;
pub use histogram::{HourHistogram, Resolution, WeekdayHistogram, WeekdayHourMatrix};
pub use types::{
    format_minutes, is_weekend, CommitTimeSample, DateRange, OutputFormat, YearMonth,
    MINUTES_PER_DAY,
};

/// A convenience `Result` type for hourglass operations.
pub type Result<T> = std::result::Result<T, HourglassError>;
