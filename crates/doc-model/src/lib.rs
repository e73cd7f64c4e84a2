//! Shared data model for tabs and their persisted projections.
//!
//! A [`TabRecord`] is the manager-side metadata for one tab; a [`SavedTab`]
//! is the subset of that record that survives an application restart.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a tab. Assigned at creation, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locator for the file backing a tab.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub path: PathBuf,
    /// Whether the path requires a paired begin/end access grant
    /// (sandboxed file access).
    pub security_scoped: bool,
}

impl DocumentSource {
    pub fn new(path: impl Into<PathBuf>, security_scoped: bool) -> Self {
        Self { path: path.into(), security_scoped }
    }
}

/// Per-tab view snapshot, captured when a tab is deactivated and restored
/// when it becomes active again.
///
/// The scroll offset is runtime-only; it is not part of [`SavedTab`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub page_index: usize,
    pub scale: f32,
    pub scroll_offset: Option<(f32, f32)>,
    pub search_query: String,
    pub search_result_index: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page_index: 0,
            scale: 1.0,
            scroll_offset: None,
            search_query: String::new(),
            search_result_index: 0,
        }
    }
}

/// Metadata for one tab in a window.
///
/// A record with no [`DocumentSource`] is an empty/new tab; empty tabs are
/// never persisted across sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct TabRecord {
    pub id: TabId,
    pub source: Option<DocumentSource>,
    pub title: String,
    pub view: ViewState,
}

impl TabRecord {
    /// Create a fresh empty tab.
    pub fn empty() -> Self {
        Self {
            id: TabId::new(),
            source: None,
            title: "New Tab".to_string(),
            view: ViewState::default(),
        }
    }

    /// True when no document backs this tab.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    /// Point this record at a document and derive its display title from
    /// the file name.
    pub fn set_source(&mut self, source: DocumentSource) {
        self.title = title_for_path(&source.path);
        self.source = Some(source);
    }

    /// Reset to the empty/new-tab state.
    pub fn clear_source(&mut self) {
        self.source = None;
        self.title = "New Tab".to_string();
        self.view = ViewState::default();
    }
}

/// Display title derived from a file path.
pub fn title_for_path(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Persisted projection of a [`TabRecord`].
///
/// Every field defaults on read so records written by older builds (or
/// builds that add fields later) stay decodable. There is no schema
/// version field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedTab {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub security_scoped: bool,
    #[serde(default)]
    pub page_index: usize,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub search_result_index: usize,
}

fn default_scale() -> f32 {
    1.0
}

impl SavedTab {
    /// Project a record into its persisted form. Empty tabs have no
    /// persisted form.
    pub fn from_record(record: &TabRecord) -> Option<Self> {
        let source = record.source.as_ref()?;
        Some(Self {
            path: source.path.clone(),
            title: record.title.clone(),
            security_scoped: source.security_scoped,
            page_index: record.view.page_index,
            scale: record.view.scale,
            search_query: record.view.search_query.clone(),
            search_result_index: record.view.search_result_index,
        })
    }

    /// The view snapshot carried by this saved tab.
    pub fn view(&self) -> ViewState {
        ViewState {
            page_index: self.page_index,
            scale: self.scale,
            scroll_offset: None,
            search_query: self.search_query.clone(),
            search_result_index: self.search_result_index,
        }
    }
}

/// Persisted tab list plus the active-tab index, as written to disk.
///
/// The active index refers to the tab ordering as it was in the window
/// (before empty tabs were filtered out); readers clamp it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    #[serde(default)]
    pub tabs: Vec<SavedTab>,
    #[serde(default)]
    pub active_tab_index: usize,
}
