//! File categorization by extension.
//!
//! This module defines the destination categories and the fixed
//! extension table used as the last classification step before falling
//! back to [`Category::Other`].
//!
//! # Examples
//!
//! ```
//! use dlsort::file_category::{Category, FileMapper};
//!
//! let mapper = FileMapper::default();
//! assert_eq!(mapper.extension_to_category("heic"), Some(Category::Images));
//! assert_eq!(mapper.extension_to_category("XLSX"), Some(Category::Spreadsheets));
//! assert_eq!(mapper.extension_to_category("xyz"), None);
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A destination subfolder for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Resumes and CVs, matched by filename.
    Resumes,
    /// Tax forms and returns, matched by filename.
    #[serde(rename = "Tax Documents")]
    TaxDocuments,
    /// Screen captures, matched by filename.
    Screenshots,
    Images,
    Documents,
    Spreadsheets,
    Presentations,
    Videos,
    Audio,
    Archives,
    Code,
    Executables,
    Fonts,
    /// Nothing else matched.
    Other,
    /// Creation year and month, used when organizing by date.
    #[serde(skip)]
    Dated { year: i32, month: u32 },
}

impl Category {
    /// Returns the label of this category, which is also its directory
    /// name relative to the organized root.
    ///
    /// # Examples
    ///
    /// ```
    /// use dlsort::file_category::Category;
    ///
    /// assert_eq!(Category::TaxDocuments.dir_name(), "Tax Documents");
    /// assert_eq!(Category::Dated { year: 2024, month: 3 }.dir_name(), "2024/03");
    /// ```
    pub fn dir_name(&self) -> Cow<'static, str> {
        match self {
            Category::Resumes => Cow::Borrowed("Resumes"),
            Category::TaxDocuments => Cow::Borrowed("Tax Documents"),
            Category::Screenshots => Cow::Borrowed("Screenshots"),
            Category::Images => Cow::Borrowed("Images"),
            Category::Documents => Cow::Borrowed("Documents"),
            Category::Spreadsheets => Cow::Borrowed("Spreadsheets"),
            Category::Presentations => Cow::Borrowed("Presentations"),
            Category::Videos => Cow::Borrowed("Videos"),
            Category::Audio => Cow::Borrowed("Audio"),
            Category::Archives => Cow::Borrowed("Archives"),
            Category::Code => Cow::Borrowed("Code"),
            Category::Executables => Cow::Borrowed("Executables"),
            Category::Fonts => Cow::Borrowed("Fonts"),
            Category::Other => Cow::Borrowed("Other"),
            Category::Dated { year, month } => Cow::Owned(format!("{:04}/{:02}", year, month)),
        }
    }

    /// Returns the category directory as a relative path.
    ///
    /// Dated categories produce two components so the separator is the
    /// platform's own.
    pub fn relative_dir(&self) -> PathBuf {
        match self {
            Category::Dated { year, month } => {
                PathBuf::from(format!("{:04}", year)).join(format!("{:02}", month))
            }
            other => PathBuf::from(other.dir_name().into_owned()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

/// Extension table, in priority order. An extension listed under two
/// categories belongs to the first one.
const EXTENSION_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &[
            "jpg", "jpeg", "png", "gif", "bmp", "svg", "heic", "webp", "tiff", "ico",
        ],
    ),
    (
        Category::Documents,
        &[
            "pdf", "doc", "docx", "txt", "rtf", "odt", "pages", "tex", "md",
        ],
    ),
    (
        Category::Spreadsheets,
        &["xls", "xlsx", "csv", "numbers", "ods"],
    ),
    (Category::Presentations, &["ppt", "pptx", "key", "odp"]),
    (
        Category::Videos,
        &["mp4", "avi", "mov", "mkv", "flv", "wmv", "webm", "m4v"],
    ),
    (
        Category::Audio,
        &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma", "aiff"],
    ),
    (
        Category::Archives,
        &["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "dmg", "iso"],
    ),
    (
        Category::Code,
        &[
            "py", "js", "html", "css", "java", "cpp", "c", "h", "php", "rb", "go", "rs", "swift",
            "sh", "json", "xml", "yml", "yaml",
        ],
    ),
    (Category::Executables, &["app", "exe", "dmg", "pkg"]),
    (Category::Fonts, &["ttf", "otf", "woff", "woff2"]),
];

/// Maps file extensions to categories.
///
/// Lookups are case-insensitive. The standard table can be extended or
/// overridden with [`FileMapper::add_extension_mapping`].
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a new `FileMapper` with the standard table.
    pub fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        mapper.populate_standard_mappings();
        mapper
    }

    fn populate_standard_mappings(&mut self) {
        for (category, extensions) in EXTENSION_TABLE {
            for ext in *extensions {
                self.extension_map
                    .entry(ext.to_string())
                    .or_insert(*category);
            }
        }
    }

    /// Adds or replaces a file extension to category mapping.
    ///
    /// A leading dot is accepted and ignored.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.extension_map.insert(ext, category);
    }

    /// Maps a file extension to a category.
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Returns the category for an optional extension, defaulting to
    /// [`Category::Other`].
    ///
    /// ```
    /// use dlsort::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.categorize(Some("pdf")), Category::Documents);
    /// assert_eq!(mapper.categorize(None), Category::Other);
    /// ```
    pub fn categorize(&self, ext: Option<&str>) -> Category {
        ext.and_then(|e| self.extension_to_category(e))
            .unwrap_or(Category::Other)
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}
