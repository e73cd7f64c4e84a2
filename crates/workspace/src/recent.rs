//! Recent-files list.
//!
//! Owned by whoever constructs the [`crate::TabManager`] and injected into
//! it; there is no process-wide singleton. The list is most-recent-first,
//! deduplicated, and capped.

use paperdeck_storage::{Storage, StorageError};
use std::path::{Path, PathBuf};

const MAX_RECENT_FILES: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct RecentFiles {
    files: Vec<PathBuf>,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted list, or start empty when none exists.
    pub fn load(storage: &Storage) -> Result<Self, StorageError> {
        Ok(Self { files: storage.load_recent_files()? })
    }

    pub fn save(&self, storage: &Storage) -> Result<(), StorageError> {
        storage.save_recent_files(&self.files)
    }

    /// Record a file, moving it to the front if already present.
    pub fn add(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.files.retain(|p| p != &path);
        self.files.insert(0, path);
        self.files.truncate(MAX_RECENT_FILES);
    }

    /// Most recent first.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_puts_newest_first() {
        let mut recent = RecentFiles::new();
        recent.add("/docs/a.pdf");
        recent.add("/docs/b.pdf");

        assert_eq!(recent.files()[0], PathBuf::from("/docs/b.pdf"));
        assert_eq!(recent.files()[1], PathBuf::from("/docs/a.pdf"));
    }

    #[test]
    fn re_adding_moves_to_front() {
        let mut recent = RecentFiles::new();
        recent.add("/docs/a.pdf");
        recent.add("/docs/b.pdf");
        recent.add("/docs/a.pdf");

        assert_eq!(recent.files().len(), 2);
        assert_eq!(recent.files()[0], PathBuf::from("/docs/a.pdf"));
    }

    #[test]
    fn list_is_capped() {
        let mut recent = RecentFiles::new();
        for i in 0..15 {
            recent.add(format!("/docs/{i}.pdf"));
        }

        assert_eq!(recent.files().len(), MAX_RECENT_FILES);
        assert_eq!(recent.files()[0], PathBuf::from("/docs/14.pdf"));
    }

    #[test]
    fn round_trips_through_storage() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let storage = Storage::with_root(temp.path());

        let mut recent = RecentFiles::new();
        recent.add("/docs/a.pdf");
        recent.add("/docs/b.pdf");
        recent.save(&storage).expect("save should succeed");

        let loaded = RecentFiles::load(&storage).expect("load should succeed");
        assert_eq!(loaded.files(), recent.files());
    }
}
