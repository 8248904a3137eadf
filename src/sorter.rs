//! The sorting pipeline: backup, enumerate, sort, clean up.
//!
//! Steps run strictly in sequence. The backup must succeed before anything
//! else happens, and the full file list is captured before the first move.

use crate::backup::{BackupGuard, SnapshotService};
use crate::cleanup::remove_stray_entries;
use crate::config::{MovePolicy, SortConfig};
use crate::detect::TypeDetector;
use crate::error::SortResult;
use crate::file_category::{Category, TypeClassifier};
use crate::file_organizer::{SortExecutor, SortReport};
use crate::walker::collect_files;
use indicatif::ProgressBar;
use std::path::PathBuf;

/// Where a file would go, as computed by a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

/// Drives one sorting run over a root directory.
pub struct Sorter<'a> {
    config: &'a SortConfig,
    detector: &'a dyn TypeDetector,
    snapshot: &'a dyn SnapshotService,
    backup_dir: PathBuf,
    overwrite_backup: bool,
    policy: MovePolicy,
    progress: Option<ProgressBar>,
}

impl<'a> Sorter<'a> {
    pub fn new(
        config: &'a SortConfig,
        detector: &'a dyn TypeDetector,
        snapshot: &'a dyn SnapshotService,
        backup_dir: PathBuf,
    ) -> Self {
        Self {
            config,
            detector,
            snapshot,
            backup_dir,
            overwrite_backup: true,
            policy: MovePolicy::default(),
            progress: None,
        }
    }

    pub fn overwrite_backup(mut self, overwrite: bool) -> Self {
        self.overwrite_backup = overwrite;
        self
    }

    pub fn policy(mut self, policy: MovePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Progress bar for the sort phase; its length is set once files are known.
    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// Fails before touching the root if the backup cannot be made or the
    /// tree cannot be enumerated. Per-file and cleanup errors are returned
    /// inside the report instead.
    pub fn run(&self) -> SortResult<SortReport> {
        let mut report = SortReport::new();
        let root = self.config.root();

        let guard = BackupGuard::new(self.snapshot, self.backup_dir.clone(), self.overwrite_backup);
        report.backup = Some(guard.secure(self.config)?);

        let files = collect_files(root)?;
        log::info!("Files found: {}", files.len());
        for file in &files {
            log::debug!("{}", file.display());
        }

        let mut executor = SortExecutor::new(self.config, self.detector, self.policy);
        if let Some(progress) = &self.progress {
            progress.set_length(files.len() as u64);
            executor = executor.with_progress(progress.clone());
        }
        executor.run(files, &mut report);

        if report.failures.is_empty() {
            remove_stray_entries(root, &mut report);
        } else {
            log::warn!(
                "Skipping cleanup: {} file(s) could not be sorted and would be deleted",
                report.failures.len()
            );
            report.cleanup_skipped = true;
        }

        Ok(report)
    }

    /// Computes where every file would go without changing anything.
    pub fn plan(&self) -> SortResult<Vec<PlannedMove>> {
        let classifier = TypeClassifier::new(self.detector);
        let files = collect_files(self.config.root())?;

        Ok(files
            .into_iter()
            .filter_map(|source| {
                let category = classifier.classify(&source);
                let destination = self.config.destination(category).join(source.file_name()?);
                Some(PlannedMove {
                    source,
                    destination,
                    category,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    struct TextDetector;

    impl TypeDetector for TextDetector {
        fn detect(&self, _path: &Path) -> Option<String> {
            Some("text/plain".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingSnapshot {
        calls: RefCell<Vec<PathBuf>>,
    }

    impl SnapshotService for RecordingSnapshot {
        fn create_archive(&self, source: &Path, destination: &Path, _overwrite: bool) -> io::Result<()> {
            self.calls.borrow_mut().push(source.to_path_buf());
            fs::write(destination, "archive")
        }
    }

    #[test]
    fn test_run_backs_up_then_sorts_then_cleans() {
        let root = TempDir::new().expect("Failed to create temp directory");
        let out = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(root.path().join("a/b")).unwrap();
        fs::write(root.path().join("a/b/note.txt"), "x").unwrap();

        let config = SortConfig::new(Some(root.path())).unwrap();
        let snapshot = RecordingSnapshot::default();
        let report = Sorter::new(&config, &TextDetector, &snapshot, out.path().to_path_buf())
            .run()
            .expect("run should succeed");

        assert_eq!(snapshot.calls.borrow().as_slice(), [config.root().to_path_buf()]);
        assert!(report.backup.as_ref().unwrap().is_file());
        assert!(report.is_success());
        assert!(config.root().join("Documents/note.txt").is_file());
        assert!(!config.root().join("a").exists());
    }

    #[test]
    fn test_cleanup_skipped_after_failures() {
        let root = TempDir::new().expect("Failed to create temp directory");
        let out = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(root.path().join("keep")).unwrap();
        fs::write(root.path().join("keep/note.txt"), "x").unwrap();
        // A file named like the category folder blocks its creation.
        fs::write(root.path().join("Documents"), "blocker").unwrap();

        let config = SortConfig::new(Some(root.path())).unwrap();
        let snapshot = RecordingSnapshot::default();
        let report = Sorter::new(&config, &TextDetector, &snapshot, out.path().to_path_buf())
            .run()
            .expect("run should complete");

        assert!(!report.is_success());
        assert!(report.cleanup_skipped);
        assert!(config.root().join("keep/note.txt").is_file());
    }

    #[test]
    fn test_plan_changes_nothing() {
        let root = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/readme.md"), "x").unwrap();

        let config = SortConfig::new(Some(root.path())).unwrap();
        let snapshot = RecordingSnapshot::default();
        let plan = Sorter::new(&config, &TextDetector, &snapshot, PathBuf::from("/unused"))
            .plan()
            .expect("plan should succeed");

        assert_eq!(
            plan,
            vec![PlannedMove {
                source: config.root().join("sub/readme.md"),
                destination: config.root().join("Documents/readme.md"),
                category: Category::Document,
            }]
        );
        assert!(snapshot.calls.borrow().is_empty());
        assert!(!config.root().join("Documents").exists());
        assert!(config.root().join("sub/readme.md").is_file());
    }
}
