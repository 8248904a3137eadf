//! Run configuration.
//!
//! Two pieces of configuration flow through a run:
//! - [`SortConfig`]: the resolved root and its six destination folders,
//!   computed once at startup and handed to every component.
//! - [`Settings`]: optional user preferences loaded from a TOML file.
//!
//! # Settings File Format
//!
//! ```toml
//! [backup]
//! directory = "/mnt/backups"
//! overwrite = true
//! compression_level = 6
//!
//! [sort]
//! on_move_error = "continue"   # or "abort"
//! ```

use crate::error::{ConfigError, SortError, SortResult};
use crate::file_category::Category;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved root path and the destination folder for every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    root: PathBuf,
    destinations: [PathBuf; 6],
}

impl SortConfig {
    /// Resolves `root` (or the current directory) to an absolute directory.
    ///
    /// # Errors
    ///
    /// Returns `SortError::InvalidRoot` if the path does not exist or is not
    /// a directory.
    pub fn new(root: Option<&Path>) -> SortResult<Self> {
        let requested = match root {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().map_err(|e| SortError::InvalidRoot {
                path: PathBuf::from("."),
                reason: e.to_string(),
            })?,
        };

        let metadata = fs::metadata(&requested).map_err(|e| SortError::InvalidRoot {
            path: requested.clone(),
            reason: e.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(SortError::InvalidRoot {
                path: requested,
                reason: "not a directory".to_string(),
            });
        }

        let root = fs::canonicalize(&requested).map_err(|e| SortError::InvalidRoot {
            path: requested.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self::from_resolved(root))
    }

    fn from_resolved(root: PathBuf) -> Self {
        let destinations = Category::ALL.map(|category| root.join(category.dir_name()));
        Self { root, destinations }
    }

    /// The absolute root directory being sorted.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The destination folder for `category`.
    pub fn destination(&self, category: Category) -> &Path {
        &self.destinations[category.index()]
    }

    /// The root's base name, or `"root"` for a filesystem root.
    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string())
    }
}

/// What the sort executor does when a single file cannot be moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePolicy {
    /// Record the failure and keep sorting the remaining files.
    #[default]
    Continue,
    /// Stop at the first failure.
    Abort,
}

/// User preferences loaded from a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub backup: BackupSettings,

    #[serde(default)]
    pub sort: SortSettings,
}

/// Settings for the backup archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupSettings {
    /// Directory receiving the archive. Defaults to the home directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Whether an existing archive of the same name may be replaced.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// Deflate level, 0 through 9.
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

fn default_overwrite() -> bool {
    true
}

fn default_compression_level() -> i32 {
    6
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            directory: None,
            overwrite: default_overwrite(),
            compression_level: default_compression_level(),
        }
    }
}

/// Settings for the sort phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SortSettings {
    #[serde(default)]
    pub on_move_error: MovePolicy,
}

impl Settings {
    /// Load settings from a file, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `dirsort/config.toml` in the user's config directory
    /// 4. Fall back to default settings
    ///
    /// The file is read once, before the tree is walked. A `.dirsortrc.toml`
    /// inside the directory being sorted is treated as an ordinary file
    /// afterwards and ends up in `Applications`.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file is found but cannot be read or
    /// parsed, or if an explicitly provided file does not exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".dirsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dirsort").join("config.toml");
            if user_config.exists() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parses and validates settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=9).contains(&self.backup.compression_level) {
            return Err(ConfigError::InvalidValue {
                key: "backup.compression_level",
                reason: format!("{} is not in 0..=9", self.backup.compression_level),
            });
        }
        Ok(())
    }
}
