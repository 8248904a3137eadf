//! Moving files into their category folders.
//!
//! The executor consumes a file list that was fully enumerated beforehand,
//! classifies each entry, resolves its folder and renames it there. Only the
//! base file name is kept; an existing file of the same name at the
//! destination is replaced.

use crate::config::{MovePolicy, SortConfig};
use crate::detect::TypeDetector;
use crate::error::{SortError, SortResult};
use crate::file_category::{Category, TypeClassifier};
use crate::router::CategoryRouter;
use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Represents a single file move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The path of the file before sorting.
    pub original_path: PathBuf,
    /// The path of the file after sorting.
    pub new_path: PathBuf,
    /// The category the file was sorted into.
    pub category: Category,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            self.original_path.display(),
            self.new_path.display()
        )
    }
}

/// Everything that happened during one run.
#[derive(Debug)]
pub struct SortReport {
    /// When the run started.
    pub started_at: DateTime<Local>,
    /// Where the backup archive was written, if one was made.
    pub backup: Option<PathBuf>,
    /// Successful moves, in enumeration order.
    pub operations: Vec<Operation>,
    /// Per-file move failures.
    pub failures: Vec<SortError>,
    /// True if the executor stopped early under `MovePolicy::Abort`.
    pub aborted: bool,
    /// Top-level entries removed by the cleanup pass.
    pub removed: Vec<PathBuf>,
    /// Entries the cleanup pass could not remove.
    pub cleanup_failures: Vec<SortError>,
    /// True if cleanup was skipped because some files were not sorted.
    pub cleanup_skipped: bool,
}

impl SortReport {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            backup: None,
            operations: Vec::new(),
            failures: Vec::new(),
            aborted: false,
            removed: Vec::new(),
            cleanup_failures: Vec::new(),
            cleanup_skipped: false,
        }
    }

    /// True when every file was sorted and every stray entry removed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.cleanup_failures.is_empty()
    }

    /// Number of files moved into each category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.operations {
            *counts.entry(op.category).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for SortReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorts an enumerated file list into category folders.
pub struct SortExecutor<'a> {
    classifier: TypeClassifier<'a>,
    router: CategoryRouter<'a>,
    policy: MovePolicy,
    progress: ProgressBar,
}

impl<'a> SortExecutor<'a> {
    pub fn new(config: &'a SortConfig, detector: &'a dyn TypeDetector, policy: MovePolicy) -> Self {
        Self {
            classifier: TypeClassifier::new(detector),
            router: CategoryRouter::new(config),
            policy,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports one tick per processed file on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Sorts `files` in order, recording results into `report`.
    ///
    /// Each move is printed above the progress bar; a hidden bar prints
    /// nothing.
    ///
    /// Under `MovePolicy::Continue` every file is attempted. Under
    /// `MovePolicy::Abort` the first failure stops the run and sets
    /// `report.aborted`.
    pub fn run(&mut self, files: Vec<PathBuf>, report: &mut SortReport) {
        for file in files {
            self.progress.set_message(display_name(&file));
            match self.sort_file(&file) {
                Ok(operation) => {
                    self.progress.println(operation.to_string());
                    report.operations.push(operation);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    report.failures.push(e);
                    if self.policy == MovePolicy::Abort {
                        report.aborted = true;
                        break;
                    }
                }
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();
    }

    /// Classifies one file and moves it into its category folder.
    pub fn sort_file(&mut self, file: &Path) -> SortResult<Operation> {
        let category = self.classifier.classify(file);
        let folder = self.router.route(category, file)?;
        let new_path = move_into(file, folder)?;

        Ok(Operation {
            original_path: file.to_path_buf(),
            new_path,
            category,
        })
    }
}

/// Moves `file` into `folder`, keeping only its base name.
///
/// Renames when possible and falls back to copy-and-delete across
/// filesystems. Returns the new path.
///
/// # Examples
///
/// ```no_run
/// use dirsort::file_organizer::move_into;
/// use std::path::Path;
///
/// let moved = move_into(Path::new("/data/raw/a.pdf"), Path::new("/data/Documents"));
/// match moved {
///     Ok(path) => println!("Moved to {}", path.display()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn move_into(file: &Path, folder: &Path) -> SortResult<PathBuf> {
    let file_name = file.file_name().ok_or_else(|| SortError::MoveFailed {
        from: file.to_path_buf(),
        to: folder.to_path_buf(),
        error: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
    })?;
    let destination = folder.join(file_name);

    if destination == file {
        return Ok(destination);
    }

    log::info!("Moving {} to {}", file.display(), destination.display());
    let result = match fs::rename(file, &destination) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(file, &destination).and_then(|_| fs::remove_file(file))
        }
        other => other,
    };

    result.map_err(|e| SortError::MoveFailed {
        from: file.to_path_buf(),
        to: destination.clone(),
        error: e,
    })?;

    Ok(destination)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct ExtensionDetector;

    impl TypeDetector for ExtensionDetector {
        fn detect(&self, path: &Path) -> Option<String> {
            match path.extension()?.to_str()? {
                "txt" => Some("text/plain".to_string()),
                "png" => Some("image/png".to_string()),
                "exe" => Some("application/x-msdownload".to_string()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_move_into_keeps_base_name_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("deep/nested")).unwrap();
        fs::create_dir(base.join("Documents")).unwrap();
        let file = base.join("deep/nested/report.txt");
        fs::write(&file, "report").unwrap();

        let moved = move_into(&file, &base.join("Documents")).expect("move should succeed");

        assert_eq!(moved, base.join("Documents/report.txt"));
        assert!(!file.exists());
        assert_eq!(fs::read_to_string(moved).unwrap(), "report");
    }

    #[test]
    fn test_move_into_overwrites_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir_all(base.join("a")).unwrap();
        fs::create_dir(base.join("Documents")).unwrap();
        fs::write(base.join("Documents/same.txt"), "old").unwrap();
        fs::write(base.join("a/same.txt"), "new").unwrap();

        move_into(&base.join("a/same.txt"), &base.join("Documents")).unwrap();

        assert_eq!(
            fs::read_to_string(base.join("Documents/same.txt")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_move_into_already_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let folder = temp_dir.path().join("Pictures");
        fs::create_dir(&folder).unwrap();
        let file = folder.join("a.png");
        fs::write(&file, "png").unwrap();

        assert_eq!(move_into(&file, &folder).unwrap(), file);
        assert!(file.exists());
    }

    #[test]
    fn test_move_into_missing_source_reports_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let folder = temp_dir.path().join("Documents");
        fs::create_dir(&folder).unwrap();

        let result = move_into(&temp_dir.path().join("ghost.txt"), &folder);
        match result {
            Err(SortError::MoveFailed { from, to, .. }) => {
                assert_eq!(from, temp_dir.path().join("ghost.txt"));
                assert_eq!(to, folder.join("ghost.txt"));
            }
            other => panic!("expected MoveFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_operation_display_names_both_paths() {
        let operation = Operation {
            original_path: PathBuf::from("/data/raw/a.pdf"),
            new_path: PathBuf::from("/data/Documents/a.pdf"),
            category: Category::Document,
        };
        assert_eq!(
            operation.to_string(),
            "/data/raw/a.pdf → /data/Documents/a.pdf"
        );
    }

    #[test]
    fn test_executor_sorts_and_counts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let root = config.root().to_path_buf();
        fs::create_dir(root.join("sub")).unwrap();
        for name in ["a.txt", "sub/b.txt", "c.png", "d.exe", "e.bin"] {
            fs::write(root.join(name), name).unwrap();
        }
        let files = crate::walker::collect_files(&root).unwrap();

        let detector = ExtensionDetector;
        let mut executor = SortExecutor::new(&config, &detector, MovePolicy::Continue);
        let mut report = SortReport::new();
        executor.run(files, &mut report);

        assert!(report.is_success());
        assert_eq!(report.operations.len(), 5);
        assert!(root.join("Documents/a.txt").is_file());
        assert!(root.join("Documents/b.txt").is_file());
        assert!(root.join("Pictures/c.png").is_file());
        assert!(root.join("Applications/d.exe").is_file());
        assert!(root.join("Miscellaneous/e.bin").is_file());
        assert!(!root.join("Videos").exists());
        assert!(!root.join("Audio").exists());

        let counts = report.category_counts();
        assert_eq!(counts[&Category::Document], 2);
        assert_eq!(counts[&Category::Picture], 1);
        assert!(!counts.contains_key(&Category::Video));
    }

    #[test]
    fn test_executor_continue_policy_records_failures() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let root = config.root().to_path_buf();
        fs::write(root.join("real.txt"), "x").unwrap();

        let files = vec![root.join("ghost.txt"), root.join("real.txt")];
        let detector = ExtensionDetector;
        let mut executor = SortExecutor::new(&config, &detector, MovePolicy::Continue);
        let mut report = SortReport::new();
        executor.run(files, &mut report);

        assert!(!report.is_success());
        assert!(!report.aborted);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.operations.len(), 1);
        assert!(root.join("Documents/real.txt").is_file());
    }

    #[test]
    fn test_executor_abort_policy_stops_at_first_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let root = config.root().to_path_buf();
        fs::write(root.join("real.txt"), "x").unwrap();

        let files = vec![root.join("ghost.txt"), root.join("real.txt")];
        let detector = ExtensionDetector;
        let mut executor = SortExecutor::new(&config, &detector, MovePolicy::Abort);
        let mut report = SortReport::new();
        executor.run(files, &mut report);

        assert!(report.aborted);
        assert_eq!(report.failures.len(), 1);
        assert!(report.operations.is_empty());
        assert!(root.join("real.txt").is_file());
    }

    #[test]
    fn test_executor_directory_create_failure_is_per_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let root = config.root().to_path_buf();
        fs::write(root.join("Pictures"), "a file where a folder should be").unwrap();
        fs::write(root.join("photo.png"), "png").unwrap();
        fs::write(root.join("note.txt"), "txt").unwrap();

        let files = vec![root.join("photo.png"), root.join("note.txt")];
        let detector = ExtensionDetector;
        let mut executor = SortExecutor::new(&config, &detector, MovePolicy::Continue);
        let mut report = SortReport::new();
        executor.run(files, &mut report);

        match &report.failures[0] {
            SortError::DirectoryCreateFailed { file, path, .. } => {
                assert_eq!(file, &root.join("photo.png"));
                assert_eq!(path, &root.join("Pictures"));
            }
            other => panic!("expected DirectoryCreateFailed, got {:?}", other),
        }
        assert!(report.failures[0].to_string().contains("photo.png"));
        assert!(root.join("photo.png").is_file());
        assert!(root.join("Documents/note.txt").is_file());
    }
}
