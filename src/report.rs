//! Per-run record of what happened to each file.

use crate::config::OrganizeMode;
use crate::file_organizer::MoveAction;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Dry run: the move was computed but not performed.
    Planned,
    Moved,
    Failed { reason: String },
    /// Left in place (excluded by a filter, or no timestamp in date mode).
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub status: Outcome,
}

impl FileOutcome {
    pub fn from_action(action: &MoveAction, status: Outcome) -> Self {
        Self {
            source: action.source.clone(),
            destination: Some(action.destination.clone()),
            category: Some(action.category.to_string()),
            status,
        }
    }

    pub fn skipped(source: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            source,
            destination: None,
            category: None,
            status: Outcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// True for files that were, or in a dry run would be, moved.
    pub fn is_organized(&self) -> bool {
        matches!(self.status, Outcome::Planned | Outcome::Moved)
    }
}

/// Everything a run did, in listing order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: PathBuf,
    pub mode: OrganizeMode,
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
}

impl RunReport {
    pub fn new(target: PathBuf, mode: OrganizeMode, dry_run: bool) -> Self {
        Self {
            target,
            mode,
            dry_run,
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.files.push(outcome);
    }

    /// Number of organized files per category label.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for file in self.files.iter().filter(|f| f.is_organized()) {
            if let Some(category) = &file.category {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn organized_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_organized()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, Outcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, Outcome::Skipped { .. }))
            .count()
    }
}
