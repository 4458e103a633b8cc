//! Command-line interface module for dlsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and merging with the configuration file
//! - Taking the directory snapshot
//! - Classification and move orchestration
//! - Reporting

use crate::classifier::{Classifier, FileEntry, Unclassified};
use crate::config::{self, Config, ConfigError, OrganizeMode};
use crate::file_category::FileMapper;
use crate::file_organizer::{MoveAction, Mover};
use crate::output::OutputFormatter;
use crate::report::{FileOutcome, Outcome, RunReport};
use crate::rules::NameRules;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sort a downloads folder into category subfolders.
///
/// Files are matched against resume, tax document and screenshot name
/// rules first, then by extension. With `--mode by-date` they are filed
/// into year/month folders instead. Nothing is moved unless `--apply` is
/// given.
#[derive(Parser, Debug)]
#[command(name = "dlsort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to organize (defaults to your downloads folder)
    pub directory: Option<PathBuf>,

    /// Organize by file type or by creation date
    #[arg(short, long, value_enum)]
    pub mode: Option<OrganizeMode>,

    /// Move files instead of only reporting the plan
    #[arg(long, conflicts_with = "dry_run")]
    pub apply: bool,

    /// Only report planned moves (the default)
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Regex matching your name; when given, a resume must also match one
    #[arg(long = "name", value_name = "PATTERN")]
    pub names: Vec<String>,

    /// Path to configuration file (TOML format)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// How the run report is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: PathBuf,
    pub mode: OrganizeMode,
    pub dry_run: bool,
    /// Owner name patterns from the command line, added to the configured ones.
    pub name_patterns: Vec<String>,
    pub format: OutputFormat,
}

impl RunOptions {
    /// Dry-run, by-type options for `target`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            mode: OrganizeMode::ByType,
            dry_run: true,
            name_patterns: Vec::new(),
            format: OutputFormat::Text,
        }
    }
}

/// Errors that end a run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to write JSON report: {0}")]
    Report(#[from] serde_json::Error),
}

impl Cli {
    /// Merge CLI arguments with the configuration file.
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_config(&self, config: &Config) -> Result<RunOptions, ConfigError> {
        let target = config::resolve_target(
            self.directory.as_deref(),
            config.organize.target.as_deref(),
        )?;
        let dry_run = if self.apply {
            false
        } else {
            self.dry_run || config.organize.dry_run
        };

        Ok(RunOptions {
            target,
            mode: self.mode.unwrap_or(config.organize.mode),
            dry_run,
            name_patterns: self.names.clone(),
            format: self.format,
        })
    }
}

/// Loads configuration, merges the command line, and runs.
pub fn run_cli(cli: &Cli) -> Result<RunReport, RunError> {
    let config = Config::load(cli.config.as_deref())?;
    let options = cli.merge_with_config(&config)?;
    run_cli_with_config(&options, &config)
}

/// Organizes `options.target` and prints the report.
///
/// Every file is classified and given a destination before the first move
/// happens. Per-file failures are reported and do not stop the run; only
/// configuration problems and an unusable target directory return `Err`.
pub fn run_cli_with_config(options: &RunOptions, config: &Config) -> Result<RunReport, RunError> {
    let filters = config.compile_filters()?;
    let classifier = build_classifier(options, config)?;

    config::validate_target(&options.target)?;
    let entries = snapshot(&options.target)?;
    tracing::info!(
        target_dir = %options.target.display(),
        files = entries.len(),
        mode = ?options.mode,
        dry_run = options.dry_run,
        "Directory scanned"
    );

    let text = options.format == OutputFormat::Text;
    if text {
        let prefix = if options.dry_run { "DRY RUN - " } else { "" };
        let by = match options.mode {
            OrganizeMode::ByType => "",
            OrganizeMode::ByDate => " by date",
        };
        OutputFormatter::info(&format!(
            "{}Organizing files{} in: {}",
            prefix,
            by,
            options.target.display()
        ));
    }

    let mut report = RunReport::new(options.target.clone(), options.mode, options.dry_run);
    let mut mover = Mover::new(&options.target, options.dry_run);
    let mut planned: Vec<MoveAction> = Vec::new();

    for entry in &entries {
        if !filters.should_include(&entry.name) {
            report.push(FileOutcome::skipped(entry.path.clone(), "excluded by filter"));
            continue;
        }

        let category = match classifier.classify(entry) {
            Ok(category) => category,
            Err(Unclassified::Hidden) => continue,
            Err(Unclassified::MissingTimestamp) => {
                tracing::warn!(file = %entry.path.display(), "No readable timestamp, skipping");
                report.push(FileOutcome::skipped(entry.path.clone(), "no readable timestamp"));
                continue;
            }
        };

        match mover.plan(&entry.path, category) {
            Ok(action) => planned.push(action),
            Err(e) => report.push(FileOutcome {
                source: entry.path.clone(),
                destination: None,
                category: Some(category.to_string()),
                status: Outcome::Failed {
                    reason: e.to_string(),
                },
            }),
        }
    }

    let progress = (text && !options.dry_run && !planned.is_empty())
        .then(|| OutputFormatter::create_progress_bar(planned.len() as u64));

    for action in planned {
        let outcome = match mover.execute(action.clone()) {
            Ok(done) if mover.is_dry_run() => FileOutcome::from_action(&done, Outcome::Planned),
            Ok(done) => FileOutcome::from_action(&done, Outcome::Moved),
            Err(e) => {
                tracing::warn!(file = %action.source.display(), error = %e, "Move failed");
                FileOutcome::from_action(
                    &action,
                    Outcome::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        };
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        report.push(outcome);
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if text {
        print_text_report(&report);
    } else {
        OutputFormatter::json(&report)?;
    }

    Ok(report)
}

fn build_classifier(options: &RunOptions, config: &Config) -> Result<Classifier, ConfigError> {
    let mut patterns = config.resume.name_patterns.clone();
    patterns.extend(options.name_patterns.iter().cloned());

    let mut mapper = FileMapper::default();
    for (ext, category) in &config.extensions {
        mapper.add_extension_mapping(ext, *category);
    }

    Ok(Classifier::new(
        options.mode,
        NameRules::new(&patterns)?,
        mapper,
    ))
}

/// Lists the regular, non-hidden files directly inside `dir`, sorted by
/// name. Directories, symlinks and anything added later are ignored.
fn snapshot(dir: &Path) -> Result<Vec<FileEntry>, ConfigError> {
    let read = fs::read_dir(dir).map_err(|e| ConfigError::TargetUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut entries: Vec<FileEntry> = read
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| FileEntry::from_dir_entry(&entry))
        .filter(|entry| !entry.is_hidden)
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn print_text_report(report: &RunReport) {
    if report.files.is_empty() {
        OutputFormatter::info("No files found to organize.");
        return;
    }

    for file in &report.files {
        println!("{}", OutputFormatter::format_outcome(file));
    }

    OutputFormatter::summary_table(&report.category_counts(), report.organized_count());

    let skipped = report.skipped_count();
    if skipped > 0 {
        println!("Skipped: {}", skipped);
    }

    let failed = report.failed().count();
    if failed > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. See errors above.",
            failed
        ));
    }

    if report.dry_run {
        OutputFormatter::dry_run_notice("No files were moved. Run with --apply to move them.");
    } else if failed == 0 {
        OutputFormatter::success("Organization complete!");
    }
}
