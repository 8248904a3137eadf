//! Removal of leftover top-level entries after sorting.

use crate::error::SortError;
use crate::file_category::Category;
use crate::file_organizer::SortReport;
use std::fs;
use std::path::Path;

/// Removes every immediate child of `root` that is not a category folder.
///
/// Only depth 1 is inspected: category folders are kept as they are, anything
/// else is removed recursively. Failures are recorded in `report` and never
/// undo completed sorting.
pub fn remove_stray_entries(root: &Path, report: &mut SortReport) {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Could not list {} for cleanup: {}", root.display(), e);
            report.cleanup_failures.push(SortError::CleanupFailed {
                path: root.to_path_buf(),
                source: e,
            });
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.cleanup_failures.push(SortError::CleanupFailed {
                    path: root.to_path_buf(),
                    source: e,
                });
                continue;
            }
        };

        let name = entry.file_name();
        if name.to_str().and_then(Category::from_dir_name).is_some() {
            continue;
        }

        let path = entry.path();
        // file_type() does not follow symlinks, so a link to a directory is unlinked, not emptied.
        let result = match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => fs::remove_dir_all(&path),
            Ok(_) => fs::remove_file(&path),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::info!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(e) => {
                let error = SortError::CleanupFailed { path, source: e };
                log::warn!("{}", error);
                report.cleanup_failures.push(error);
            }
        }
    }
}
