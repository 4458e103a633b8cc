//! Moving files into their category directories.
//!
//! Planning and executing are separate steps so a whole run can be
//! planned before anything is touched. Destinations never overwrite an
//! existing file: a taken name gets a numeric suffix, `photo.jpg` becoming
//! `photo_1.jpg`, then `photo_2.jpg`, and so on.

use crate::file_category::Category;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A planned or performed move of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {error}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    /// Failed to move a file to its category directory.
    #[error("Failed to move {} to {}: {error}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },
    /// The source path has no final component to reuse as a filename.
    #[error("Path has no file name: {}", .0.display())]
    MissingFileName(PathBuf),
    /// Something other than a directory sits where a category directory
    /// has to go.
    #[error("Cannot use {} as a directory: a file is in the way", .0.display())]
    CategoryPathBlocked(PathBuf),
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Returns `path` with `_n` inserted before the extension.
///
/// ```
/// use dlsort::file_organizer::disambiguate;
/// use std::path::Path;
///
/// assert_eq!(disambiguate(Path::new("Images/photo.jpg"), 2), Path::new("Images/photo_2.jpg"));
/// assert_eq!(disambiguate(Path::new("Other/README"), 1), Path::new("Other/README_1"));
/// ```
pub fn disambiguate(path: &Path, n: u64) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let mut name = OsString::from(stem);
    name.push(format!("_{}", n));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Finds the first of `candidate`, `candidate_1`, `candidate_2`, … for
/// which `is_taken` is false.
///
/// The search has no upper bound; it stops at the first free name.
pub fn resolve_collision(candidate: &Path, is_taken: impl Fn(&Path) -> bool) -> PathBuf {
    if !is_taken(candidate) {
        return candidate.to_path_buf();
    }
    let mut n = 1;
    loop {
        let path = disambiguate(candidate, n);
        if !is_taken(&path) {
            return path;
        }
        n += 1;
    }
}

/// Whether anything, including a dangling symlink, is at `path`.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Plans and performs moves under one root directory.
///
/// Destinations handed out by [`Mover::plan`] are remembered, so two plans
/// in the same run never share a path even before either file is moved.
#[derive(Debug)]
pub struct Mover {
    root: PathBuf,
    dry_run: bool,
    reserved: HashSet<PathBuf>,
}

impl Mover {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
            reserved: HashSet::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.reserved.contains(path) || occupied(path)
    }

    /// Finds the first path between the root and `dir` that exists but is
    /// not a directory.
    fn blocked_component(&self, dir: &Path) -> Option<PathBuf> {
        let relative = dir.strip_prefix(&self.root).ok()?;
        let mut current = self.root.clone();
        for component in relative.components() {
            current.push(component);
            if occupied(&current) && !current.is_dir() {
                return Some(current);
            }
        }
        None
    }

    /// Computes a collision-free destination for `source` under
    /// `<root>/<category>` and reserves it.
    ///
    /// Touches nothing on disk; a missing category directory is assumed to
    /// be created later.
    pub fn plan(&mut self, source: &Path, category: Category) -> OrganizeResult<MoveAction> {
        let file_name = source
            .file_name()
            .ok_or_else(|| OrganizeError::MissingFileName(source.to_path_buf()))?;
        let dir = self.root.join(category.relative_dir());
        if let Some(blocked) = self.blocked_component(&dir) {
            return Err(OrganizeError::CategoryPathBlocked(blocked));
        }
        let candidate = dir.join(file_name);
        let destination = resolve_collision(&candidate, |p| self.is_taken(p));

        if destination != candidate {
            tracing::debug!(
                from = %candidate.display(),
                to = %destination.display(),
                "Destination taken, renamed"
            );
        }

        self.reserved.insert(destination.clone());
        Ok(MoveAction {
            source: source.to_path_buf(),
            destination,
            category,
        })
    }

    /// Carries out a planned move. In dry-run mode this returns the action
    /// untouched.
    ///
    /// Creates the category directory with any missing parents. If the
    /// planned destination has appeared since planning, a fresh suffix is
    /// chosen instead of overwriting it; the returned action carries the
    /// path actually used.
    pub fn execute(&self, action: MoveAction) -> OrganizeResult<MoveAction> {
        if self.dry_run {
            return Ok(action);
        }

        let dir = action
            .destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: dir.clone(),
            error: e,
        })?;

        let destination = if occupied(&action.destination) {
            let candidate = match action.source.file_name() {
                Some(name) => dir.join(name),
                None => return Err(OrganizeError::MissingFileName(action.source.clone())),
            };
            resolve_collision(&candidate, |p| self.is_taken(p))
        } else {
            action.destination
        };

        fs::rename(&action.source, &destination).map_err(|e| OrganizeError::FileMoveFailure {
            from: action.source.clone(),
            to: destination.clone(),
            error: e,
        })?;

        Ok(MoveAction {
            destination,
            ..action
        })
    }

    /// Plans a single file and carries the move out immediately.
    pub fn plan_and_execute(
        &mut self,
        source: &Path,
        category: Category,
    ) -> OrganizeResult<MoveAction> {
        let action = self.plan(source, category)?;
        self.execute(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disambiguate_multi_dot_name() {
        assert_eq!(
            disambiguate(Path::new("/r/Archives/backup.tar.gz"), 3),
            PathBuf::from("/r/Archives/backup.tar_3.gz")
        );
    }

    #[test]
    fn test_resolve_collision_skips_taken_names() {
        let taken: HashSet<PathBuf> = ["a/photo.jpg", "a/photo_1.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let resolved = resolve_collision(Path::new("a/photo.jpg"), |p| taken.contains(p));
        assert_eq!(resolved, PathBuf::from("a/photo_2.jpg"));
    }

    #[test]
    fn test_plan_does_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source = root.join("photo.jpg");
        fs::write(&source, "x").unwrap();

        let mut mover = Mover::new(root, true);
        let action = mover.plan_and_execute(&source, Category::Images).unwrap();

        assert_eq!(action.destination, root.join("Images").join("photo.jpg"));
        assert!(source.exists());
        assert!(!root.join("Images").exists());
    }

    #[test]
    fn test_plan_avoids_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("Images")).unwrap();
        fs::write(root.join("Images").join("photo.jpg"), "old").unwrap();
        let source = root.join("photo.jpg");
        fs::write(&source, "new").unwrap();

        let mut mover = Mover::new(root, true);
        let action = mover.plan(&source, Category::Images).unwrap();

        assert_eq!(action.destination, root.join("Images").join("photo_1.jpg"));
    }

    #[test]
    fn test_plan_reserves_destinations_within_run() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let mut mover = Mover::new(root, true);

        let first = mover
            .plan(&root.join("in").join("photo.jpg"), Category::Images)
            .unwrap();
        let second = mover
            .plan(&root.join("other").join("photo.jpg"), Category::Images)
            .unwrap();

        assert_eq!(first.destination, root.join("Images").join("photo.jpg"));
        assert_eq!(second.destination, root.join("Images").join("photo_1.jpg"));
    }

    #[test]
    fn test_execute_moves_and_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source = root.join("notes.txt");
        fs::write(&source, "content").unwrap();

        let mut mover = Mover::new(root, false);
        let action = mover
            .plan_and_execute(
                &source,
                Category::Dated {
                    year: 2024,
                    month: 3,
                },
            )
            .unwrap();

        let expected = root.join("2024").join("03").join("notes.txt");
        assert_eq!(action.destination, expected);
        assert!(expected.exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_execute_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source = root.join("photo.jpg");
        fs::write(&source, "new").unwrap();

        let mut mover = Mover::new(root, false);
        let action = mover.plan(&source, Category::Images).unwrap();

        // Something else claims the planned name before the move.
        fs::create_dir(root.join("Images")).unwrap();
        fs::write(root.join("Images").join("photo.jpg"), "old").unwrap();

        let done = mover.execute(action).unwrap();
        assert_eq!(done.destination, root.join("Images").join("photo_1.jpg"));
        assert_eq!(
            fs::read_to_string(root.join("Images").join("photo.jpg")).unwrap(),
            "old"
        );
        assert_eq!(fs::read_to_string(&done.destination).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("Images")).unwrap();
        let link = root.join("Images").join("photo.jpg");
        std::os::unix::fs::symlink(root.join("nowhere"), &link).unwrap();
        let source = root.join("photo.jpg");
        fs::write(&source, "new").unwrap();

        let mut mover = Mover::new(root, false);
        let done = mover.plan_and_execute(&source, Category::Images).unwrap();

        assert_eq!(done.destination, root.join("Images").join("photo_1.jpg"));
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_rechecks_for_dangling_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source = root.join("photo.jpg");
        fs::write(&source, "new").unwrap();

        let mut mover = Mover::new(root, false);
        let action = mover.plan(&source, Category::Images).unwrap();

        fs::create_dir(root.join("Images")).unwrap();
        let link = root.join("Images").join("photo.jpg");
        std::os::unix::fs::symlink(root.join("nowhere"), &link).unwrap();

        let done = mover.execute(action).unwrap();
        assert_eq!(done.destination, root.join("Images").join("photo_1.jpg"));
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_plan_reports_file_in_place_of_category_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Other"), "not a directory").unwrap();

        let mut mover = Mover::new(root, true);
        let result = mover.plan(&root.join("mystery.xyz"), Category::Other);

        match result {
            Err(OrganizeError::CategoryPathBlocked(path)) => assert_eq!(path, root.join("Other")),
            other => panic!("expected a blocked category path, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_reports_file_in_place_of_year_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("2024"), "").unwrap();

        let mut mover = Mover::new(root, true);
        let result = mover.plan(
            &root.join("notes.txt"),
            Category::Dated {
                year: 2024,
                month: 3,
            },
        );

        assert!(matches!(result, Err(OrganizeError::CategoryPathBlocked(_))));
    }

    #[test]
    fn test_execute_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let mut mover = Mover::new(root, false);

        let result = mover.plan_and_execute(&root.join("gone.pdf"), Category::Documents);
        assert!(matches!(result, Err(OrganizeError::FileMoveFailure { .. })));
    }
}
