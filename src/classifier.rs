//! Assigns a [`Category`] to each scanned file.

use crate::config::OrganizeMode;
use crate::file_category::{Category, FileMapper};
use crate::rules::NameRules;
use chrono::{DateTime, Datelike, Local};
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

/// A file in the target directory, as seen when the listing was taken.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// Lowercase extension without the dot.
    pub extension: Option<String>,
    /// Creation time, or modification time where the platform does not
    /// record creation.
    pub creation_time: Option<DateTime<Local>>,
    pub is_hidden: bool,
}

impl FileEntry {
    /// Builds an entry from a name and path, with no timestamp.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = Path::new(&name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        let is_hidden = name.starts_with('.');
        Self {
            name,
            path,
            extension,
            creation_time: None,
            is_hidden,
        }
    }

    pub fn with_creation_time(mut self, time: DateTime<Local>) -> Self {
        self.creation_time = Some(time);
        self
    }

    /// Snapshots a directory entry, reading its timestamp.
    pub fn from_dir_entry(entry: &DirEntry) -> Self {
        let path = entry.path();
        let creation_time = fs::metadata(&path)
            .and_then(|m| m.created().or_else(|_| m.modified()))
            .map(DateTime::<Local>::from)
            .ok();
        Self {
            creation_time,
            ..Self::new(path)
        }
    }
}

/// Why a file could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unclassified {
    /// Hidden files are never organized.
    Hidden,
    /// Date mode needs a timestamp and none could be read.
    MissingTimestamp,
}

/// Decides which category folder a file belongs in.
#[derive(Debug, Clone)]
pub struct Classifier {
    mode: OrganizeMode,
    rules: NameRules,
    mapper: FileMapper,
}

impl Classifier {
    pub fn new(mode: OrganizeMode, rules: NameRules, mapper: FileMapper) -> Self {
        Self {
            mode,
            rules,
            mapper,
        }
    }

    /// Returns the category for `entry`.
    ///
    /// By type: resume, tax and screenshot rules in that order, then the
    /// extension table, then [`Category::Other`]. By date: the creation
    /// year and month only.
    pub fn classify(&self, entry: &FileEntry) -> Result<Category, Unclassified> {
        if entry.is_hidden {
            return Err(Unclassified::Hidden);
        }

        match self.mode {
            OrganizeMode::ByDate => entry
                .creation_time
                .map(|t| Category::Dated {
                    year: t.year(),
                    month: t.month(),
                })
                .ok_or(Unclassified::MissingTimestamp),
            OrganizeMode::ByType => {
                if let Some(rule) = self.rules.first_match(&entry.name) {
                    tracing::debug!(file = %entry.name, ?rule, "Filename rule matched");
                    return Ok(rule.category());
                }
                Ok(self.mapper.categorize(entry.extension.as_deref()))
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            OrganizeMode::ByType,
            NameRules::default(),
            FileMapper::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn classify(name: &str) -> Category {
        Classifier::default()
            .classify(&FileEntry::new(format!("/downloads/{}", name)))
            .unwrap()
    }

    #[test]
    fn test_file_entry_derived_fields() {
        let entry = FileEntry::new("/downloads/Photo.JPG");
        assert_eq!(entry.name, "Photo.JPG");
        assert_eq!(entry.extension.as_deref(), Some("jpg"));
        assert!(!entry.is_hidden);

        let hidden = FileEntry::new("/downloads/.DS_Store");
        assert!(hidden.is_hidden);
        assert_eq!(hidden.extension, None);

        let bare = FileEntry::new("/downloads/README");
        assert_eq!(bare.extension, None);
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(classify("resume_john_2024.pdf"), Category::Resumes);
        assert_eq!(classify("ca_tax_2023.pdf"), Category::TaxDocuments);
        assert_eq!(
            classify("Screenshot 2023-01-05 at 10.30.15.png"),
            Category::Screenshots
        );
        assert_eq!(classify("report.xlsx"), Category::Spreadsheets);
        assert_eq!(classify("mystery.xyz"), Category::Other);
    }

    #[test]
    fn test_tax_year_in_compact_date() {
        assert_eq!(classify("1099-INT_20240131.pdf"), Category::TaxDocuments);
        assert_eq!(classify("tax_statement_20230415.pdf"), Category::TaxDocuments);
    }

    #[test]
    fn test_resume_beats_tax() {
        assert_eq!(classify("resume_w2_2023.pdf"), Category::Resumes);
    }

    #[test]
    fn test_no_extension_falls_back_to_other() {
        assert_eq!(classify("Makefile"), Category::Other);
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(classify("IMG_0001.HEIC"), Category::Images);
    }

    #[test]
    fn test_hidden_file_is_not_classified() {
        let result = Classifier::default().classify(&FileEntry::new("/downloads/.DS_Store"));
        assert_eq!(result, Err(Unclassified::Hidden));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::default();
        let entry = FileEntry::new("/downloads/ca_tax_2023.pdf");
        let first = classifier.classify(&entry);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&entry), first);
        }
    }

    #[test]
    fn test_by_date_ignores_name_rules() {
        let classifier = Classifier::new(
            OrganizeMode::ByDate,
            NameRules::default(),
            FileMapper::default(),
        );
        let time = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let entry = FileEntry::new("/downloads/resume_john_2024.pdf").with_creation_time(time);

        let category = classifier.classify(&entry).unwrap();
        assert_eq!(category, Category::Dated { year: 2024, month: 3 });
        assert_eq!(category.to_string(), "2024/03");
    }

    #[test]
    fn test_by_date_without_timestamp() {
        let classifier = Classifier::new(
            OrganizeMode::ByDate,
            NameRules::default(),
            FileMapper::default(),
        );
        let entry = FileEntry::new("/downloads/photo.jpg");
        assert_eq!(
            classifier.classify(&entry),
            Err(Unclassified::MissingTimestamp)
        );
    }

    #[test]
    fn test_name_patterns_gate_resume_rule() {
        let classifier = Classifier::new(
            OrganizeMode::ByType,
            NameRules::new(&["samia".to_string()]).unwrap(),
            FileMapper::default(),
        );
        let other = FileEntry::new("/downloads/resume_john.pdf");
        let own = FileEntry::new("/downloads/Samia Resume.pdf");

        assert_eq!(classifier.classify(&other), Ok(Category::Documents));
        assert_eq!(classifier.classify(&own), Ok(Category::Resumes));
    }
}
