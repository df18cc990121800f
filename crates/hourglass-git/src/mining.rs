//! Commit timestamp extraction via git2.
//!
//! Walks a branch and turns every commit's author time, shifted by the
//! author's own UTC offset, into a local [`CommitTimeSample`].

use std::path::Path;

use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use git2::{Repository, Sort};
use hourglass_core::{CollectConfig, CommitTimeSample, DateRange, HourglassError};

/// One commit's author and local timestamp.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hourglass_core::CommitTimeSample;
/// use hourglass_git::mining::CommitRecord;
///
/// let at = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(21, 30, 0).unwrap();
/// let record = CommitRecord {
///     author: "alice".into(),
///     email: "alice@example.com".into(),
///     sample: CommitTimeSample::from_datetime(at),
/// };
/// assert_eq!(record.sample.hour, 21);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Local commit time.
    pub sample: CommitTimeSample,
}

/// Options for commit collection.
///
/// # Examples
///
/// ```
/// use hourglass_git::mining::CollectOptions;
///
/// let opts = CollectOptions::default();
/// assert!(opts.branch.is_none());
/// assert!(!opts.include_merges);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
    /// Keep commits with more than one parent.
    pub include_merges: bool,
    /// Keep only commits whose local date falls inside this range.
    pub range: Option<DateRange>,
}

impl CollectOptions {
    /// Options from the `[collect]` config section plus a date range.
    pub fn from_config(config: &CollectConfig, range: Option<DateRange>) -> Self {
        Self {
            branch: config.branch.clone(),
            include_merges: config.include_merges,
            range,
        }
    }
}

/// Collect commit timestamps from a git repository.
///
/// Returns commits newest first. Merge commits are skipped unless
/// `include_merges` is set; commits whose time cannot be represented
/// are logged and skipped.
///
/// # Errors
///
/// Returns [`HourglassError::Git`] if the repository cannot be opened or walked.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use hourglass_git::mining::{collect_commits, CollectOptions};
///
/// let commits = collect_commits(Path::new("."), &CollectOptions::default()).unwrap();
/// for c in &commits {
///     println!("{} {} ({})", c.sample.date, c.sample.minute_of_day, c.author);
/// }
/// ```
pub fn collect_commits(
    repo_path: &Path,
    options: &CollectOptions,
) -> Result<Vec<CommitRecord>, HourglassError> {
    let repo = Repository::open(repo_path)
        .map_err(|e| HourglassError::Git(format!("failed to open repository: {e}")))?;

    let mut revwalk = repo
        .revwalk()
        .map_err(|e| HourglassError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk
        .set_sorting(Sort::TIME)
        .map_err(|e| HourglassError::Git(format!("failed to sort revwalk: {e}")))?;

    if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| HourglassError::Git(format!("failed to resolve branch '{branch}': {e}")))?;
        let oid = reference
            .target()
            .ok_or_else(|| HourglassError::Git(format!("branch '{branch}' has no target")))?;
        revwalk
            .push(oid)
            .map_err(|e| HourglassError::Git(format!("failed to push oid: {e}")))?;
    } else {
        revwalk
            .push_head()
            .map_err(|e| HourglassError::Git(format!("failed to push HEAD: {e}")))?;
    }

    let mut commits = Vec::new();
    let mut skipped_merges = 0usize;

    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| HourglassError::Git(format!("revwalk error: {e}")))?;

        let commit = repo
            .find_commit(oid)
            .map_err(|e| HourglassError::Git(format!("failed to find commit: {e}")))?;

        if commit.parent_count() > 1 && !options.include_merges {
            skipped_merges += 1;
            continue;
        }

        let author = commit.author();
        let when = author.when();
        let Some(local) = local_time(when.seconds(), when.offset_minutes()) else {
            tracing::warn!(commit = %oid, "skipping commit with unrepresentable author time");
            continue;
        };

        if let Some(range) = options.range {
            if !range.contains(local.date()) {
                continue;
            }
        }

        commits.push(CommitRecord {
            author: author.name().unwrap_or("unknown").to_string(),
            email: author.email().unwrap_or("unknown").to_string(),
            sample: CommitTimeSample::from_datetime(local),
        });
    }

    tracing::debug!(
        commits = commits.len(),
        skipped_merges,
        path = %repo_path.display(),
        "collected commits"
    );

    Ok(commits)
}

/// Wall-clock time at the author's location.
///
/// # Examples
///
/// ```
/// use hourglass_git::mining::local_time;
///
/// // 2024-01-08 10:00 UTC seen from UTC+8
/// let local = local_time(1_704_708_000, 480).unwrap();
/// assert_eq!(local.to_string(), "2024-01-08 18:00:00");
/// ```
pub fn local_time(seconds: i64, offset_minutes: i32) -> Option<NaiveDateTime> {
    let offset = FixedOffset::east_opt(offset_minutes.checked_mul(60)?)?;
    offset
        .timestamp_opt(seconds, 0)
        .single()
        .map(|at| at.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use git2::{Oid, Signature, Time};
    use tempfile::TempDir;

    /// 2024-01-08 00:00:00 UTC, a Monday.
    const MONDAY: i64 = 1_704_672_000;

    fn commit(
        repo: &Repository,
        update_ref: Option<&str>,
        author: &str,
        seconds: i64,
        offset: i32,
        parents: &[Oid],
    ) -> Oid {
        let email = format!("{author}@example.com");
        let sig = Signature::new(author, &email, &Time::new(seconds, offset)).unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|p| repo.find_commit(*p).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(update_ref, &sig, &sig, "change", &tree, &parent_refs)
            .unwrap()
    }

    fn empty_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn samples_use_author_local_time() {
        let (dir, repo) = empty_repo();
        let first = commit(&repo, Some("HEAD"), "alice", MONDAY + 10 * 3600, 480, &[]);
        // 20:00 UTC is 04:00 the next day at UTC+8
        commit(&repo, Some("HEAD"), "bob", MONDAY + 20 * 3600, 480, &[first]);

        let commits = collect_commits(dir.path(), &CollectOptions::default()).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].author, "bob");
        assert_eq!(commits[0].sample.date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(commits[0].sample.hour, 4);
        assert_eq!(commits[1].email, "alice@example.com");
        assert_eq!(commits[1].sample.minute_of_day, 18 * 60);
    }

    #[test]
    fn merges_are_skipped_unless_requested() {
        let (dir, repo) = empty_repo();
        let base = commit(&repo, Some("HEAD"), "alice", MONDAY + 9 * 3600, 0, &[]);
        let side = commit(&repo, None, "bob", MONDAY + 11 * 3600, 0, &[base]);
        commit(&repo, Some("HEAD"), "alice", MONDAY + 12 * 3600, 0, &[base, side]);

        let without = collect_commits(dir.path(), &CollectOptions::default()).unwrap();
        assert_eq!(without.len(), 2);

        let opts = CollectOptions {
            include_merges: true,
            ..CollectOptions::default()
        };
        let with = collect_commits(dir.path(), &opts).unwrap();
        assert_eq!(with.len(), 3);
    }

    #[test]
    fn range_filters_by_local_date() {
        let (dir, repo) = empty_repo();
        let first = commit(&repo, Some("HEAD"), "alice", MONDAY + 10 * 3600, 0, &[]);
        commit(&repo, Some("HEAD"), "alice", MONDAY + 86_400 + 10 * 3600, 0, &[first]);

        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let opts = CollectOptions {
            range: Some(DateRange::new(monday, monday).unwrap()),
            ..CollectOptions::default()
        };
        let commits = collect_commits(dir.path(), &opts).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sample.date, monday);
    }

    #[test]
    fn missing_repository_is_a_git_error() {
        let dir = TempDir::new().unwrap();
        let err = collect_commits(dir.path(), &CollectOptions::default()).unwrap_err();
        assert!(matches!(err, HourglassError::Git(_)));
    }

    #[test]
    fn unknown_branch_is_a_git_error() {
        let (dir, repo) = empty_repo();
        commit(&repo, Some("HEAD"), "alice", MONDAY, 0, &[]);
        let opts = CollectOptions {
            branch: Some("does-not-exist".into()),
            ..CollectOptions::default()
        };
        let err = collect_commits(dir.path(), &opts).unwrap_err();
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[test]
    fn negative_offsets_shift_backwards() {
        let local = local_time(MONDAY + 3 * 3600, -300).unwrap();
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert_eq!(local.format("%H:%M").to_string(), "22:00");
    }
}
