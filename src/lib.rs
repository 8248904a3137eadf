//! dirsort - back up a directory, then sort its files by content type
//!
//! This library provides the pieces of a sorting run: media type detection and
//! classification into six fixed categories, lazy creation of category folders,
//! a ZIP backup taken before anything is touched, the executor that moves every
//! file exactly once, and the cleanup of leftover top-level entries.

pub mod backup;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod router;
pub mod sorter;
pub mod walker;

pub use backup::{BackupGuard, SnapshotService, ZipSnapshot};
pub use config::{MovePolicy, Settings, SortConfig};
pub use detect::{ContentDetector, TypeDetector};
pub use error::{ConfigError, SortError, SortResult};
pub use file_category::{Category, TypeClassifier};
pub use file_organizer::{Operation, SortExecutor, SortReport};
pub use router::CategoryRouter;
pub use sorter::{PlannedMove, Sorter};

pub use cli::{Cli, RunOutcome, run_cli};
