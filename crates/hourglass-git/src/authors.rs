//! Grouping collected commits by author.

use std::collections::{BTreeMap, BTreeSet};

use hourglass_core::{CommitTimeSample, ContributorSamples};

use crate::mining::CommitRecord;

/// Bare samples of every record, in record order.
pub fn samples(records: &[CommitRecord]) -> Vec<CommitTimeSample> {
    records.iter().map(|r| r.sample).collect()
}

/// Group records by email, most active author first (ties by name).
///
/// The display name is taken from the author's first record, which for
/// collector output is their most recent commit.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::CommitTimeSample;
/// use hourglass_git::authors::group_by_author;
/// use hourglass_git::mining::CommitRecord;
///
/// let at = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let record = |author: &str| CommitRecord {
///     author: author.into(),
///     email: format!("{author}@example.com"),
///     sample: CommitTimeSample::from_datetime(at),
/// };
/// let grouped = group_by_author(&[record("bob"), record("alice"), record("bob")]);
/// assert_eq!(grouped[0].name, "bob");
/// assert_eq!(grouped[0].samples.len(), 2);
/// ```
pub fn group_by_author(records: &[CommitRecord]) -> Vec<ContributorSamples> {
    let mut by_email: BTreeMap<&str, ContributorSamples> = BTreeMap::new();
    for record in records {
        by_email
            .entry(record.email.as_str())
            .or_insert_with(|| ContributorSamples {
                name: record.author.clone(),
                email: record.email.clone(),
                samples: Vec::new(),
            })
            .samples
            .push(record.sample);
    }

    let mut grouped: Vec<ContributorSamples> = by_email.into_values().collect();
    grouped.sort_by(|a, b| {
        b.commit_count()
            .cmp(&a.commit_count())
            .then_with(|| a.name.cmp(&b.name))
    });
    grouped
}

/// Number of distinct author emails.
pub fn distinct_contributors(records: &[CommitRecord]) -> u32 {
    records
        .iter()
        .map(|r| r.email.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u32
}
