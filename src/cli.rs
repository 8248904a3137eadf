//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Settings resolution (file settings overridden by flags)
//! - Running the sort or dry run and reporting the result

use crate::backup::{BackupGuard, ZipSnapshot, default_backup_dir};
use crate::config::{MovePolicy, Settings, SortConfig};
use crate::detect::ContentDetector;
use crate::error::{SortError, SortResult};
use crate::file_organizer::SortReport;
use crate::output::OutputFormatter;
use crate::sorter::{PlannedMove, Sorter};
use clap::Parser;
use log::LevelFilter;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Back up a directory, then sort its files into category folders.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "dirsort", version, about)]
pub struct Cli {
    /// Directory to sort (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Show where files would go without backing up or moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Directory to write the backup archive to (defaults to the home directory)
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Stop at the first file that cannot be moved
    #[arg(long)]
    pub fail_fast: bool,

    /// Settings file to use instead of the default lookup
    ///
    /// Without this flag `.dirsortrc.toml` is read from the working directory.
    /// When that directory is also the one being sorted, the settings file is
    /// applied first and then sorted into Applications like any other file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// The default log filter implied by `-v` flags.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn command(&self) -> SortCommand {
        if self.dry_run {
            SortCommand::DryRun
        } else {
            SortCommand::Sort
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCommand {
    /// Back up, sort and clean up.
    Sort,
    /// Only report where files would go.
    DryRun,
}

/// What a run produced.
#[derive(Debug)]
pub enum RunOutcome {
    Sorted(SortReport),
    Planned(Vec<PlannedMove>),
}

/// Runs the CLI application for the parsed arguments.
///
/// # Errors
///
/// Returns pre-mutation errors: invalid root, unreadable settings, failed
/// backup or failed enumeration. Per-file errors are in the returned report.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{Cli, run_cli};
/// use std::path::PathBuf;
///
/// let cli = Cli {
///     root: Some(PathBuf::from("/path/to/directory")),
///     dry_run: true,
///     ..Default::default()
/// };
/// match run_cli(&cli) {
///     Ok(_) => println!("Done"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> SortResult<RunOutcome> {
    let settings = Settings::load(cli.config.as_deref())?;
    let config = SortConfig::new(cli.root.as_deref())?;
    let detector = ContentDetector::default();

    let backup_dir = cli
        .backup_dir
        .clone()
        .or_else(|| settings.backup.directory.clone())
        .or_else(default_backup_dir)
        .ok_or_else(|| SortError::BackupFailed {
            destination: PathBuf::from(BackupGuard::archive_file_name(&config)),
            reason: "no home directory; pass --backup-dir".to_string(),
        })?;

    let policy = if cli.fail_fast {
        MovePolicy::Abort
    } else {
        settings.sort.on_move_error
    };

    let mut snapshot = ZipSnapshot::new(settings.backup.compression_level);
    if !cli.quiet && cli.command() == SortCommand::Sort {
        snapshot = snapshot.with_progress(OutputFormatter::create_spinner("Backing up"));
    }

    let mut sorter = Sorter::new(&config, &detector, &snapshot, backup_dir)
        .overwrite_backup(settings.backup.overwrite)
        .policy(policy);

    match cli.command() {
        SortCommand::DryRun => {
            OutputFormatter::dry_run_notice(&format!(
                "Analyzing contents of: {}",
                config.root().display()
            ));
            let plan = sorter.plan()?;
            print_plan(&plan, &config);
            Ok(RunOutcome::Planned(plan))
        }
        SortCommand::Sort => {
            OutputFormatter::info(&format!("Sorting contents of: {}", config.root().display()));
            if !cli.quiet {
                sorter = sorter.progress(OutputFormatter::create_progress_bar(0));
            }
            let report = sorter.run()?;
            print_report(&report);
            Ok(RunOutcome::Sorted(report))
        }
    }
}

fn print_plan(plan: &[PlannedMove], config: &SortConfig) {
    if plan.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return;
    }

    OutputFormatter::header("Files would be sorted as follows:");
    let mut counts = BTreeMap::new();
    for planned in plan {
        let from = planned
            .source
            .strip_prefix(config.root())
            .unwrap_or(planned.source.as_path());
        OutputFormatter::plain(&format!(
            " - {} → {}/",
            from.display(),
            planned.category.dir_name()
        ));
        *counts.entry(planned.category).or_insert(0) += 1;
    }

    OutputFormatter::summary_table(&counts, plan.len());
    OutputFormatter::success("Dry run complete. No files were modified.");
}

fn print_report(report: &SortReport) {
    if let Some(backup) = &report.backup {
        OutputFormatter::success(&format!("Backup written to {}", backup.display()));
    }

    OutputFormatter::summary_table(&report.category_counts(), report.operations.len());

    if !report.removed.is_empty() {
        OutputFormatter::plain(&format!(
            "\nRemoved {} leftover top-level entr{}.",
            report.removed.len(),
            if report.removed.len() == 1 { "y" } else { "ies" }
        ));
    }

    if !report.failures.is_empty() {
        OutputFormatter::header("Files that could not be sorted:");
        for failure in &report.failures {
            OutputFormatter::error(&failure.to_string());
        }
    }
    if report.aborted {
        OutputFormatter::warning("Stopped at the first file that could not be moved.");
    }
    if report.cleanup_skipped {
        OutputFormatter::warning("Cleanup skipped so unsorted files are not deleted.");
    }
    for failure in &report.cleanup_failures {
        OutputFormatter::error(&failure.to_string());
    }

    if report.is_success() {
        OutputFormatter::success("Sorting complete!");
    } else {
        OutputFormatter::warning("Sorting finished with errors. Please review the messages above.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["dirsort"]);
        assert!(cli.root.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.fail_fast);
        assert_eq!(cli.log_level(), LevelFilter::Warn);
        assert_eq!(cli.command(), SortCommand::Sort);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::parse_from([
            "dirsort",
            "/data",
            "--dry-run",
            "--backup-dir",
            "/backups",
            "--fail-fast",
            "--config",
            "sort.toml",
            "-vv",
            "--quiet",
        ]);
        assert_eq!(cli.root, Some(PathBuf::from("/data")));
        assert_eq!(cli.backup_dir, Some(PathBuf::from("/backups")));
        assert_eq!(cli.config, Some(PathBuf::from("sort.toml")));
        assert!(cli.fail_fast);
        assert!(cli.quiet);
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        assert_eq!(cli.command(), SortCommand::DryRun);
    }

    #[test]
    fn test_invalid_root_is_reported() {
        let cli = Cli {
            root: Some(PathBuf::from("/non/existent/path")),
            config: None,
            quiet: true,
            ..Default::default()
        };
        assert!(matches!(run_cli(&cli), Err(SortError::InvalidRoot { .. })));
    }
}
