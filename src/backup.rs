//! Backup archive creation.
//!
//! Before anything under the root is touched, the whole directory is
//! snapshotted into a single ZIP archive outside of it. A failed snapshot
//! aborts the run.

use crate::config::SortConfig;
use crate::error::{SortError, SortResult};
use indicatif::ProgressBar;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::result::ZipResult;
use zip::write::FileOptions;

/// Creates a restorable snapshot of a directory.
pub trait SnapshotService {
    /// Archives `source` into a single file at `destination`.
    ///
    /// With `overwrite` false an existing file at `destination` is an error.
    fn create_archive(&self, source: &Path, destination: &Path, overwrite: bool) -> io::Result<()>;
}

/// Writes Deflate-compressed ZIP snapshots.
///
/// Entries are stored under a top-level folder named after the source
/// directory. The archive is written next to its destination with a
/// `.partial` suffix and only renamed into place once complete.
#[derive(Clone)]
pub struct ZipSnapshot {
    compression_level: i32,
    progress: ProgressBar,
}

impl ZipSnapshot {
    pub fn new(compression_level: i32) -> Self {
        Self {
            compression_level,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports one tick per archived file on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    fn write_archive(&self, source: &Path, partial: &Path) -> ZipResult<()> {
        let prefix = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());

        let file = File::create(partial)?;
        let file = BufWriter::with_capacity(256 * 1024, file);
        let mut zip = ZipWriter::new(file);

        let options = FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level));

        zip.add_directory(format!("{prefix}/"), options)?;

        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let name = archive_name(&prefix, relative);

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
            } else if entry.path().is_file() {
                let len = fs::metadata(entry.path())?.len();
                zip.start_file(name, options.large_file(len >= u64::from(u32::MAX)))?;

                let f = File::open(entry.path())?;
                let mut f = BufReader::with_capacity(128 * 1024, f);
                io::copy(&mut f, &mut zip)?;

                self.progress.inc(1);
            } else {
                log::warn!("Skipping {} in backup: not a regular file", entry.path().display());
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl SnapshotService for ZipSnapshot {
    fn create_archive(&self, source: &Path, destination: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && destination.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "backup archive already exists and overwrite is disabled",
            ));
        }

        let partial = partial_path(destination);
        let result = self
            .write_archive(source, &partial)
            .map_err(io::Error::other)
            .and_then(|()| fs::rename(&partial, destination));
        self.progress.finish_and_clear();

        if result.is_err() {
            let _ = fs::remove_file(&partial);
        }
        result
    }
}

/// Joins `relative` onto `prefix` with forward slashes, as ZIP expects.
fn archive_name(prefix: &str, relative: &Path) -> String {
    let mut name = prefix.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}

/// The directory archives go to when none is configured.
pub fn default_backup_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Takes the snapshot that must exist before any file is moved.
pub struct BackupGuard<'a> {
    service: &'a dyn SnapshotService,
    directory: PathBuf,
    overwrite: bool,
}

impl<'a> BackupGuard<'a> {
    pub fn new(service: &'a dyn SnapshotService, directory: PathBuf, overwrite: bool) -> Self {
        Self {
            service,
            directory,
            overwrite,
        }
    }

    /// The archive file name for `config`'s root: `<base name>.bak.zip`.
    pub fn archive_file_name(config: &SortConfig) -> String {
        format!("{}.bak.zip", config.root_name())
    }

    /// Snapshots the root and returns the archive path.
    ///
    /// # Errors
    ///
    /// Returns `SortError::BackupFailed` if the backup directory is missing,
    /// lies inside the root, or the snapshot service fails.
    pub fn secure(&self, config: &SortConfig) -> SortResult<PathBuf> {
        let file_name = Self::archive_file_name(config);
        let failed = |destination: PathBuf, reason: String| SortError::BackupFailed {
            destination,
            reason,
        };

        let directory = fs::canonicalize(&self.directory)
            .map_err(|e| failed(self.directory.join(&file_name), e.to_string()))?;
        if !directory.is_dir() {
            return Err(failed(
                directory.join(&file_name),
                "backup location is not a directory".to_string(),
            ));
        }

        let destination = directory.join(&file_name);
        if destination.starts_with(config.root()) {
            return Err(failed(
                destination,
                "backup would be written inside the directory being sorted".to_string(),
            ));
        }

        log::info!(
            "Making a backup of {} at {}",
            config.root().display(),
            destination.display()
        );
        self.service
            .create_archive(config.root(), &destination, self.overwrite)
            .map_err(|e| failed(destination.clone(), e.to_string()))?;

        Ok(destination)
    }
}
