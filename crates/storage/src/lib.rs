//! On-disk persistence for the tab session and the recent-files list.
//!
//! Everything lives as pretty-printed JSON under the platform data
//! directory. Tests point [`Storage::with_root`] at a temp dir.

use directories::ProjectDirs;
use paperdeck_doc_model::SavedSession;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PaperDeck", "PaperDeck")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the persisted tab session. Absent file means no prior session.
    pub fn load_session(&self) -> Result<Option<SavedSession>, StorageError> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn save_session(&self, session: &SavedSession) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let bytes = serde_json::to_vec_pretty(session)?;
        fs::write(self.session_path(), bytes)?;
        Ok(())
    }

    /// Load the recent-files list. Absent file means an empty list.
    pub fn load_recent_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        let path = self.recent_files_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save_recent_files(&self, files: &[PathBuf]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let bytes = serde_json::to_vec_pretty(files)?;
        fs::write(self.recent_files_path(), bytes)?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.root.join("session.json")
    }

    fn recent_files_path(&self) -> PathBuf {
        self.root.join("recent_files.json")
    }
}
