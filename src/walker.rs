//! Tree walking.
//!
//! The whole tree is enumerated before anything is moved, so folders created
//! during the sort are never fed back into the walk.

use crate::error::SortResult;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily yields every regular file under `root`, depth-first.
///
/// Directories are descended into but never yielded. Symlinks are yielded as
/// entries and not followed. FIFOs, sockets and device nodes are skipped with
/// a warning, since reading them can block. Entries within a directory are
/// visited in file name order.
pub fn walk_files(root: &Path) -> impl Iterator<Item = SortResult<PathBuf>> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) if entry.file_type().is_file() || entry.path_is_symlink() => {
                Some(Ok(entry.into_path()))
            }
            Ok(entry) => {
                log::warn!("Skipping {}: not a regular file", entry.path().display());
                None
            }
            Err(e) => Some(Err(e.into())),
        })
}

/// Enumerates every file under `root` into a fixed list.
///
/// # Errors
///
/// Returns `SortError::Walk` on the first entry that cannot be read.
pub fn collect_files(root: &Path) -> SortResult<Vec<PathBuf>> {
    walk_files(root).collect()
}
