//! Category folder routing.

use crate::config::SortConfig;
use crate::error::{SortError, SortResult};
use crate::file_category::Category;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Resolves categories to destination folders, creating each on first use.
///
/// Folders for categories no file needs are never created. A folder that
/// already exists is left untouched.
pub struct CategoryRouter<'a> {
    config: &'a SortConfig,
    created: HashSet<Category>,
}

impl<'a> CategoryRouter<'a> {
    pub fn new(config: &'a SortConfig) -> Self {
        Self {
            config,
            created: HashSet::new(),
        }
    }

    /// Returns the destination folder for `file` of `category`, creating it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns `SortError::DirectoryCreateFailed` naming `file` if the folder
    /// cannot be created or its path is occupied by something other than a
    /// directory.
    pub fn route(&mut self, category: Category, file: &Path) -> SortResult<&'a Path> {
        let config: &'a SortConfig = self.config;
        let folder = config.destination(category);
        if self.created.contains(&category) {
            return Ok(folder);
        }

        match fs::create_dir(folder) {
            Ok(()) => log::debug!("Created {}", folder.display()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && folder.is_dir() => {}
            Err(e) => {
                return Err(SortError::DirectoryCreateFailed {
                    file: file.to_path_buf(),
                    path: folder.to_path_buf(),
                    source: e,
                });
            }
        }

        self.created.insert(category);
        Ok(folder)
    }

    /// Categories whose folder has been resolved so far.
    pub fn used_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.created.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_route_creates_folder_lazily() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let mut router = CategoryRouter::new(&config);

        assert!(!config.destination(Category::Picture).exists());
        let folder = router
            .route(Category::Picture, Path::new("incoming.bin"))
            .expect("route should succeed");

        assert!(folder.is_dir());
        assert!(!config.destination(Category::Video).exists());
    }

    #[test]
    fn test_route_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let mut router = CategoryRouter::new(&config);

        let file = Path::new("incoming.bin");
        let first = router.route(Category::Audio, file).unwrap().to_path_buf();
        let second = router.route(Category::Audio, file).unwrap().to_path_buf();
        assert_eq!(first, second);

        // A fresh router over an existing folder also succeeds.
        let mut other = CategoryRouter::new(&config);
        assert_eq!(other.route(Category::Audio, file).unwrap(), first);
    }

    #[test]
    fn test_route_leaves_existing_folder_contents() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let existing = config.destination(Category::Document).join("keep.txt");
        fs::create_dir(config.destination(Category::Document)).unwrap();
        fs::write(&existing, "keep").unwrap();

        let mut router = CategoryRouter::new(&config);
        router.route(Category::Document, Path::new("incoming.bin")).unwrap();

        assert_eq!(fs::read_to_string(existing).unwrap(), "keep");
    }

    #[test]
    fn test_route_fails_when_file_occupies_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        fs::write(config.destination(Category::Video), "not a folder").unwrap();

        let mut router = CategoryRouter::new(&config);
        let clip = config.root().join("clip.mp4");
        match router.route(Category::Video, &clip) {
            Err(SortError::DirectoryCreateFailed { file, path, .. }) => {
                assert_eq!(file, clip);
                assert_eq!(path, config.destination(Category::Video));
            }
            other => panic!("expected DirectoryCreateFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_used_categories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SortConfig::new(Some(temp_dir.path())).unwrap();
        let mut router = CategoryRouter::new(&config);
        router.route(Category::Audio, Path::new("incoming.bin")).unwrap();
        router.route(Category::Document, Path::new("incoming.bin")).unwrap();

        let mut used: Vec<_> = router.used_categories().collect();
        used.sort();
        assert_eq!(used, vec![Category::Document, Category::Audio]);
    }
}
