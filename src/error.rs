//! Error types for the sorting pipeline.
//!
//! Errors split into two groups. Pre-mutation errors (`InvalidRoot`,
//! `BackupFailed`, `Walk`, `Config`) abort the whole run before any file is
//! touched. Post-mutation errors (`MoveFailed`, `DirectoryCreateFailed`,
//! `CleanupFailed`) are reported per occurrence through the `SortReport`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while sorting a directory.
#[derive(Error, Debug)]
pub enum SortError {
    /// The root path does not exist or is not a directory.
    #[error("{} is not a valid directory: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// The backup archive could not be written.
    #[error("Failed to make a backup at {}: {reason}", .destination.display())]
    BackupFailed {
        destination: PathBuf,
        reason: String,
    },

    /// A category folder could not be created, leaving `file` unsorted.
    #[error(
        "Failed to create directory {} for {}: {source}",
        .path.display(),
        .file.display()
    )]
    DirectoryCreateFailed {
        file: PathBuf,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be moved into its category folder.
    #[error("Failed to move {} to {}: {error}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// A stray top-level entry could not be removed.
    #[error("Failed to remove {}: {source}", .path.display())]
    CleanupFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The directory tree could not be enumerated.
    #[error("Directory walker error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SortError {
    /// Returns true for errors raised before the root was modified.
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoot { .. } | Self::BackupFailed { .. } | Self::Walk(_) | Self::Config(_)
        )
    }
}

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A value parsed but is out of range.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("IO error reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sorting operations.
pub type SortResult<T> = Result<T, SortError>;
