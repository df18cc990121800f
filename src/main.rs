use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing_subscriber::EnvFilter;

use hourglass_core::{format_minutes, CommitDataset, DateRange, HourglassConfig, OutputFormat};
use hourglass_engine::working_hours::WorkTimeWindow;
use hourglass_engine::{
    analyze, analyze_team, analyze_trend, classify_project, parse_working_hours, AnalysisOptions,
    OvertimeReport, ProjectClassificationResult, ProjectSignals, TeamAnalysis, TeamOptions,
    TrendAnalysis, TrendOptions,
};
use hourglass_git::authors::{distinct_contributors, group_by_author, samples};
use hourglass_git::mining::{collect_commits, CollectOptions, CommitRecord};

const CONFIG_FILE: &str = ".hourglass.toml";

#[derive(Parser)]
#[command(
    name = "hourglass",
    version,
    about = "Work-intensity analytics for git history",
    long_about = "Hourglass reads when commits happen and tells you how long the working day really is.\n\n\
                   It infers a working-hour window from commit timestamps, measures work outside it,\n\
                   and condenses that into the 996 index. Monthly trends, per-contributor patterns and\n\
                   a corporate/open-source classification are built on the same numbers.\n\n\
                   Examples:\n  \
                     hourglass analyze --path .              Index and overtime breakdown\n  \
                     hourglass analyze --hours 10-19         Use a declared working window\n  \
                     hourglass trend --since 2024-01-01      Month-by-month index\n  \
                     hourglass team --min-commits 20         Per-contributor intensity\n  \
                     hourglass classify                      Corporate or open source?"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .hourglass.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text  Human-readable summary lines (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Repository and period shared by every analysis.
#[derive(Args)]
struct RepoArgs {
    /// Repository path (default: current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    until: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the 996 index and overtime breakdowns
    #[command(long_about = "Compute the 996 index and overtime breakdowns.\n\n\
        Detects the working-hour window from weekday morning commits (or uses --hours),\n\
        tallies commits inside and outside it, and reports weekday after-hours,\n\
        weekend and late-night activity.\n\n\
        Examples:\n  hourglass analyze --path .\n  hourglass analyze --hours 9-18 --end-hour 19\n  hourglass analyze --since 2024-01-01 --until 2024-06-30 --format json")]
    Analyze {
        #[command(flatten)]
        repo: RepoArgs,

        /// Declared working hours, e.g. "9-18"
        #[arg(long, value_parser = parse_hours_arg)]
        hours: Option<WorkTimeWindow>,

        /// Custom weekday end hour for overtime severity buckets
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
        end_hour: Option<u8>,
    },
    /// Show the 996 index month by month
    #[command(long_about = "Show the 996 index month by month.\n\n\
        Every calendar month in the period gets its own index, work span and\n\
        data-quality tag; months with enough data feed the overall trend.\n\n\
        Examples:\n  hourglass trend\n  hourglass trend --since 2023-01-01 --hours 10-19")]
    Trend {
        #[command(flatten)]
        repo: RepoArgs,

        /// Declared working hours reused for every month, e.g. "9-18"
        #[arg(long, value_parser = parse_hours_arg)]
        hours: Option<WorkTimeWindow>,
    },
    /// Compare contributors against the team baseline
    #[command(long_about = "Compare contributors against the team baseline.\n\n\
        Profiles every contributor with enough commits, classifies their end of day\n\
        against the team median, and summarizes the spread of personal indices.\n\n\
        Examples:\n  hourglass team\n  hourglass team --min-commits 20 --max-contributors 10")]
    Team {
        #[command(flatten)]
        repo: RepoArgs,

        /// Minimum commits for a contributor to be analyzed
        #[arg(long)]
        min_commits: Option<u32>,

        /// Maximum contributors to analyze, most active first
        #[arg(long)]
        max_contributors: Option<usize>,
    },
    /// Classify the repository as corporate or open source
    #[command(long_about = "Classify the repository as corporate or open source.\n\n\
        Scores the shape of the weekday commit curve, weekend share, evening work and\n\
        contributor count, and reports the rules that decided.\n\n\
        Examples:\n  hourglass classify\n  hourglass classify --path ../other --format json")]
    Classify {
        #[command(flatten)]
        repo: RepoArgs,
    },
    /// Create a default .hourglass.toml config file
    #[command(long_about = "Create a default .hourglass.toml config file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .hourglass.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_hours_arg(value: &str) -> std::result::Result<WorkTimeWindow, String> {
    parse_working_hours(value).map_err(|e| e.to_string())
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("hourglass v{version}: how long is the working day, really?\n");

    println!("Quick start:");
    println!("  hourglass init                Create a .hourglass.toml config file");
    println!("  hourglass analyze --path .    Compute the 996 index for a repository\n");

    println!("All commands:");
    println!("  analyze   Working hours, 996 index, weekday/weekend/late-night overtime");
    println!("  trend     Month-by-month index and direction");
    println!("  team      Per-contributor intensity against the team baseline");
    println!("  classify  Corporate or open-source commit pattern");
    println!("\nRun 'hourglass <command> --help' for details.");
}

const DEFAULT_CONFIG: &str = r#"# Hourglass Configuration

[analysis]
# Declared working hours; detected from commits when unset
# working_hours = "9-18"
# Custom weekday end hour enabling overtime severity buckets
# overtime_end_hour = 19
# since = "2024-01-01"
# until = "2024-12-31"

[weekend]
# A weekend day counts as real overtime when both thresholds are met
# span_threshold = 3.0
# commit_threshold = 3

[team]
# min_commits = 10
# max_contributors = 50

[collect]
# branch = "main"
# include_merges = false
# Commits before this hour count towards the previous day's end
# rollover_hour = 4
"#;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<HourglassConfig> {
    match path {
        Some(path) => HourglassConfig::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to load {}", path.display())),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                HourglassConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("failed to load .hourglass.toml")
            } else {
                Ok(HourglassConfig::default())
            }
        }
    }
}

/// Commits of the requested period and the period itself.
struct Collected {
    records: Vec<CommitRecord>,
    range: Option<DateRange>,
}

fn collect(repo: &RepoArgs, config: &HourglassConfig) -> Result<Collected> {
    let path = &repo.path;
    if !path.join(".git").exists() && git2::Repository::discover(path).is_err() {
        miette::bail!(miette::miette!(
            help = "Run hourglass from inside a git repository, or specify --path to one",
            "Not a git repository: {}",
            path.display()
        ));
    }

    let since = repo.since.or(config.analysis.since);
    let until = repo.until.or(config.analysis.until);
    let bounded = match (since, until) {
        (Some(since), Some(until)) => Some(DateRange::new(since, until).into_diagnostic()?),
        _ => None,
    };

    let options = CollectOptions::from_config(&config.collect, bounded);
    let mut records = collect_commits(path, &options)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read history of {}", path.display()))?;

    if bounded.is_some() {
        return Ok(Collected {
            records,
            range: bounded,
        });
    }

    // One open bound: filter here and close the range on the observed history.
    records.retain(|r| {
        since.map_or(true, |s| r.sample.date >= s) && until.map_or(true, |u| r.sample.date <= u)
    });
    let observed = DateRange::covering(records.iter().map(|r| r.sample.date));
    let range = match (since, until, observed) {
        (Some(since), None, Some(o)) => Some(DateRange::new(since, o.until).into_diagnostic()?),
        (None, Some(until), Some(o)) => Some(DateRange::new(o.since, until).into_diagnostic()?),
        _ => None,
    };

    tracing::debug!(commits = records.len(), ?range, "selected commits");
    Ok(Collected { records, range })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn clock(hour: f64) -> String {
    format_minutes((hour * 60.0).round().max(0.0) as u32)
}

fn percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{r:.1}%"))
}

/// Serialized name of a unit enum variant.
fn label<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

fn print_report(report: &OvertimeReport) {
    let w = &report.window;
    println!("Commits analyzed: {}", report.total_commits);
    println!(
        "Working hours: {}-{} ({}, confidence {}%, {} sample days)",
        clock(w.start_hour),
        clock(w.end_hour),
        label(&w.detection_method),
        w.confidence,
        w.sample_count
    );
    if !w.is_reliable {
        println!("  warning: too few weekday mornings for a reliable window");
    }

    println!(
        "\n996 index: {} ({})",
        report.result.index_996, report.result.index_996_str
    );
    println!("Overtime ratio: {}%", report.result.over_time_radio);
    let t = &report.tallies;
    println!(
        "  in hours {}, after hours {}, weekday {}, weekend {}",
        t.work_hour_count, t.overtime_count, t.weekday_count, t.weekend_count
    );

    let wd = &report.weekday;
    println!("\nWeekday after-hours commits (from {:02}:00):", wd.end_hour);
    for (day, count) in wd.by_day() {
        println!("  {day}  {count}");
    }
    if let Some(peak) = wd.peak_day {
        println!("  peak: {peak} ({} commits)", wd.peak_count);
    }
    println!(
        "  overtime days: {} of {} ({})",
        wd.overtime_days,
        wd.weekday_days,
        percent(wd.overtime_day_rate)
    );
    if let Some(s) = &wd.severity {
        println!(
            "  severity: light {}, moderate {}, severe {}, extreme {}",
            s.light, s.moderate, s.severe, s.extreme
        );
    }

    let we = &report.weekend;
    println!(
        "\nWeekend: {} Saturdays, {} Sundays active",
        we.saturday_days, we.sunday_days
    );
    println!(
        "  real overtime {} days, casual fixes {} days",
        we.real_overtime_days, we.casual_fix_days
    );
    println!(
        "  activity rate {}, real overtime rate {}",
        percent(we.weekend_activity_rate),
        percent(we.real_overtime_rate)
    );

    let ln = &report.late_night;
    println!(
        "\nLate nights: evening {}, late {}, midnight {}, dawn {}",
        ln.evening, ln.late_night, ln.midnight, ln.dawn
    );
    println!(
        "  midnight days: {} of {} work days ({:.1}%)",
        ln.midnight_days, ln.total_work_days, ln.midnight_rate
    );
}

fn print_trend(trend: &TrendAnalysis) {
    println!(
        "{:<8} {:>7} {:>5} {:>6} {:>6} {:>6} {:>7}  {}",
        "month", "commits", "days", "index", "span", "start", "end", "quality"
    );
    for m in &trend.months {
        println!(
            "{:<8} {:>7} {:>5} {:>6} {:>6.1} {:>6} {:>7}  {}",
            m.month,
            m.total_commits,
            m.work_days,
            m.index_996,
            m.avg_work_span,
            m.avg_start_time.as_deref().unwrap_or("-"),
            m.avg_end_time.as_deref().unwrap_or("-"),
            label(&m.data_quality)
        );
    }
    let s = &trend.summary;
    println!(
        "\n{} valid months, average index {:.1}, average span {:.1}h, trend {}",
        s.valid_months,
        s.avg_index_996,
        s.avg_work_span,
        label(&s.trend)
    );
}

fn print_team(team: &TeamAnalysis) {
    println!(
        "Contributors: {} total, {} analyzed, {} below the commit minimum, {} over the limit",
        team.total_contributors,
        team.analyzed_contributors,
        team.excluded_contributors,
        team.truncated_contributors
    );
    println!("Team baseline end of day: {}", clock(team.baseline_end_hour));
    println!();
    for c in &team.contributors {
        let p = &c.profile;
        println!(
            "  {:<24} {:>6} commits  index {:>5}  ends {}  {}",
            p.name,
            p.total_commits,
            p.result.index_996,
            clock(p.end_hour()),
            label(&c.intensity)
        );
    }

    let d = &team.distribution;
    println!(
        "\nIntensity: normal {}, moderate {}, heavy {}",
        d.normal, d.moderate, d.heavy
    );
    let s = &team.statistics;
    println!(
        "Index p25 {:.0}, median {:.0}, p75 {:.0}, p90 {:.0} (min {:.0}, max {:.0})",
        s.p25, s.median, s.p75, s.p90, s.min, s.max
    );
    println!(
        "Health: {}. {}",
        label(&team.health.level),
        team.health.conclusion
    );
    for warning in &team.health.warnings {
        println!("  warning: {warning}");
    }
}

fn print_classification(result: &ProjectClassificationResult) {
    println!(
        "Project type: {} (confidence {}%)",
        result.project_type, result.confidence
    );
    println!(
        "Regularity score {}, weekend ratio {:.1}%, evening ratio {:.1}%, {} contributors",
        result.regularity.score,
        result.weekend_ratio * 100.0,
        result.moonlighting.night_ratio * 100.0,
        result.contributors
    );
    for reason in &result.reasons {
        println!("  - {reason}");
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, "configuration loaded");

    match cli.command {
        None => {
            print_welcome();
            return Ok(());
        }
        Some(Command::Analyze {
            ref repo,
            ref hours,
            end_hour,
        }) => {
            let collected = collect(repo, &config)?;
            let dataset =
                CommitDataset::from_samples(&samples(&collected.records), config.collect.rollover_hour);

            let mut options = AnalysisOptions::from_config(&config).into_diagnostic()?;
            options.range = collected.range;
            if hours.is_some() {
                options.working_hours = hours.clone();
            }
            if end_hour.is_some() {
                options.custom_end_hour = end_hour;
            }

            let report = analyze(&dataset, &options);
            match cli.format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Text => print_report(&report),
            }
        }
        Some(Command::Trend {
            ref repo,
            ref hours,
        }) => {
            let collected = collect(repo, &config)?;
            let working_hours = match hours {
                Some(window) => Some(window.clone()),
                None => config
                    .analysis
                    .working_hours
                    .as_deref()
                    .map(parse_working_hours)
                    .transpose()
                    .into_diagnostic()?,
            };

            let options = TrendOptions {
                range: collected.range,
                working_hours,
                rollover_hour: config.collect.rollover_hour,
            };
            let trend = analyze_trend(&samples(&collected.records), &options);
            match cli.format {
                OutputFormat::Json => print_json(&trend)?,
                OutputFormat::Text => print_trend(&trend),
            }
        }
        Some(Command::Team {
            ref repo,
            min_commits,
            max_contributors,
        }) => {
            let collected = collect(repo, &config)?;
            let dataset =
                CommitDataset::from_samples(&samples(&collected.records), config.collect.rollover_hour);

            let mut overall_options = AnalysisOptions::from_config(&config).into_diagnostic()?;
            overall_options.range = collected.range;
            let overall = analyze(&dataset, &overall_options);

            let options = TeamOptions {
                min_commits: min_commits.unwrap_or(config.team.min_commits),
                max_contributors: max_contributors.unwrap_or(config.team.max_contributors),
                overall_index_996: (overall.total_commits > 0).then_some(overall.result.index_996),
                rollover_hour: config.collect.rollover_hour,
            };
            let team = analyze_team(&group_by_author(&collected.records), &options);
            match cli.format {
                OutputFormat::Json => print_json(&team)?,
                OutputFormat::Text => print_team(&team),
            }
        }
        Some(Command::Classify { ref repo }) => {
            let collected = collect(repo, &config)?;
            let dataset =
                CommitDataset::from_samples(&samples(&collected.records), config.collect.rollover_hour);

            let signals =
                ProjectSignals::from_dataset(&dataset, distinct_contributors(&collected.records));
            let result = classify_project(&signals);
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => print_classification(&result),
            }
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(miette::miette!(
                    help = "Edit the existing file or remove it first",
                    "{CONFIG_FILE} already exists"
                ));
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "hourglass", &mut std::io::stdout());
        }
    }

    Ok(())
}
