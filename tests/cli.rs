use std::path::Path;
use std::process::{Command, Output};

use git2::{Oid, Repository, Signature, Time};

/// 2024-01-08 00:00:00 UTC, a Monday.
const MONDAY: i64 = 1_704_672_000;
const DAY: i64 = 86_400;
const HOUR: i64 = 3_600;

fn hourglass(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hourglass"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "hourglass failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Two weeks of office-hours commits by two authors, plus a few late evenings.
fn office_repo() -> (tempfile::TempDir, usize) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let mut times = Vec::new();
    for week in 0..2 {
        for weekday in 0..5 {
            let day = MONDAY + (week * 7 + weekday) * DAY;
            for hour in [9, 11, 14, 16] {
                times.push(("alice", day + hour * HOUR));
            }
            times.push(("bob", day + 15 * HOUR));
            if weekday == 2 {
                times.push(("bob", day + 21 * HOUR));
            }
        }
    }

    let mut parent: Option<Oid> = None;
    for (author, seconds) in &times {
        let email = format!("{author}@example.com");
        let sig = Signature::new(author, &email, &Time::new(*seconds, 0)).unwrap();
        let parents: Vec<git2::Commit> = parent
            .iter()
            .map(|oid| repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "change", &tree, &parent_refs)
            .unwrap();
        parent = Some(oid);
    }

    (dir, times.len())
}

#[test]
fn analyze_reports_json() {
    let (dir, commits) = office_repo();
    let report = json(&hourglass(dir.path(), &["analyze", "--format", "json"]));

    assert_eq!(report["totalCommits"], commits as u64);
    assert!(report["window"]["startHour"].is_number());
    assert!(report["result"]["index996"].is_i64());
    assert_eq!(report["weekend"]["saturdayDays"], 0);
}

#[test]
fn analyze_uses_declared_hours() {
    let (dir, _) = office_repo();
    let report = json(&hourglass(
        dir.path(),
        &["analyze", "--hours", "9-18", "--format", "json"],
    ));

    assert_eq!(report["window"]["detectionMethod"], "manual");
    assert_eq!(report["window"]["startHour"], 9.0);
    // only the two 21:00 commits fall outside 09:00-18:00
    assert_eq!(report["tallies"]["overtimeCount"], 2);
}

#[test]
fn analyze_text_output_mentions_index() {
    let (dir, _) = office_repo();
    let output = hourglass(dir.path(), &["analyze"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("996 index:"));
    assert!(stdout.contains("Working hours:"));
}

#[test]
fn invalid_hours_are_rejected() {
    let (dir, _) = office_repo();
    let output = hourglass(dir.path(), &["analyze", "--hours", "18-9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid working hours"));
}

#[test]
fn outside_a_repository_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let output = hourglass(dir.path(), &["analyze"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not a git repository"));
}

#[test]
fn trend_lists_every_month_of_the_period() {
    let (dir, commits) = office_repo();
    let trend = json(&hourglass(
        dir.path(),
        &[
            "trend",
            "--since",
            "2024-01-01",
            "--until",
            "2024-02-29",
            "--format",
            "json",
        ],
    ));

    let months = trend["months"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["month"], "2024-01");
    assert_eq!(months[0]["totalCommits"], commits as u64);
    assert_eq!(months[1]["totalCommits"], 0);
    assert_eq!(months[1]["dataQuality"], "insufficient");
}

#[test]
fn team_respects_min_commits() {
    let (dir, _) = office_repo();
    let team = json(&hourglass(
        dir.path(),
        &["team", "--min-commits", "11", "--format", "json"],
    ));

    // alice has 40 commits, bob 12
    assert_eq!(team["totalContributors"], 2);
    assert_eq!(team["analyzedContributors"], 2);

    let strict = json(&hourglass(
        dir.path(),
        &["team", "--min-commits", "20", "--format", "json"],
    ));
    assert_eq!(strict["analyzedContributors"], 1);
    assert_eq!(strict["excludedContributors"], 1);
    assert_eq!(strict["contributors"][0]["name"], "alice");
}

#[test]
fn classify_office_hours_repo_as_corporate() {
    let (dir, _) = office_repo();
    let result = json(&hourglass(dir.path(), &["classify", "--format", "json"]));

    assert_eq!(result["contributors"], 2);
    // morning rise, afternoon peak, quiet evenings and nights
    assert_eq!(result["regularity"]["score"], 100);
    assert_eq!(result["moonlighting"]["isActive"], false);
    assert_eq!(result["openSourceScore"], 0);
    assert_eq!(result["projectType"], "CORPORATE");
    assert_eq!(result["confidence"], 95);
}

#[test]
fn config_file_sets_declared_hours() {
    let (dir, _) = office_repo();
    std::fs::write(
        dir.path().join(".hourglass.toml"),
        "[analysis]\nworking_hours = \"10-19\"\n",
    )
    .unwrap();

    let report = json(&hourglass(dir.path(), &["analyze", "--format", "json"]));
    assert_eq!(report["window"]["detectionMethod"], "manual");
    assert_eq!(report["window"]["startHour"], 10.0);
}
