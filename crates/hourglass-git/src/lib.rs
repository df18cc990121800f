//! Commit collection: reads author timestamps out of a git repository.
//!
//! Uses git2 to walk history and produce [`mining::CommitRecord`]s, then
//! groups them per author for the team analysis.

pub mod authors;
pub mod mining;

pub use authors::{distinct_contributors, group_by_author, samples};
pub use mining::{collect_commits, CollectOptions, CommitRecord};
