//! Overtime analytics over commit timestamps.
//!
//! Infers a working-hour window from when commits happen, measures how much
//! work falls outside it, and condenses that into the 996 index. The same
//! machinery is re-run per calendar month ([`trend`]) and per contributor
//! ([`team`]); [`classify`] scores the raw histograms independently to tell
//! corporate repositories from community ones.
//!
//! Every function here is pure: inputs in, fresh records out. Only
//! [`working_hours::parse_working_hours`] can fail.

pub mod analysis;
pub mod classify;
pub mod index;
pub mod late_night;
pub mod overtime;
pub mod stats;
pub mod team;
pub mod trend;
pub mod weekend;
pub mod working_hours;

pub use analysis::{analyze, AnalysisOptions, OvertimeReport};
pub use classify::{classify_project, ProjectClassificationResult, ProjectSignals, ProjectType};
pub use index::{calculate_996_index, IndexInput, IntensityBand, Result996};
pub use team::{analyze_team, TeamAnalysis, TeamOptions};
pub use trend::{analyze_trend, TrendAnalysis, TrendOptions};
pub use working_hours::{detect_working_hours, parse_working_hours, WorkTimeWindow};
