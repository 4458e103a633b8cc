//! dlsort - sort a downloads folder into category subdirectories
//!
//! This library classifies the files of a single flat directory by filename
//! rules (resumes, tax documents, screenshots), by extension, or by creation
//! date, and moves them into category folders without ever overwriting an
//! existing file. Dry run is the default.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;
pub mod report;
pub mod rules;

pub use classifier::{Classifier, FileEntry};
pub use config::{CompiledFilters, Config, ConfigError, OrganizeMode};
pub use file_category::{Category, FileMapper};
pub use file_organizer::{MoveAction, Mover, OrganizeError};
pub use report::RunReport;

pub use cli::{Cli, RunOptions, run_cli, run_cli_with_config};
