//! Runtime state for one open document.
//!
//! A [`DocumentSession`] owns the loaded document handle, the navigation
//! cursor, the zoom factor, the dirty flag, and the security-scoped access
//! grant for the backing file. The tab manager creates one session per tab
//! and destroys it when the tab closes.

mod scope;

pub use scope::{AccessScopeProvider, UnscopedAccess};

use paperdeck_doc_model::ViewState;
use paperdeck_pdf_engine::{PdfDocument, PdfEngine, PdfEngineError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 5.0;
pub const DEFAULT_SCALE: f32 = 1.0;
pub const ZOOM_STEP: f32 = 1.25;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no document is open")]
    NoDocument,
    #[error("document has no save location")]
    NoSavePath,
    #[error("access to {0} was denied")]
    AccessDenied(PathBuf),
    #[error("load failed: {0}")]
    Load(#[source] PdfEngineError),
    #[error("write failed: {0}")]
    Write(#[source] PdfEngineError),
}

/// One open document's live state.
pub struct DocumentSession {
    document: Option<Box<dyn PdfDocument>>,
    path: Option<PathBuf>,
    held_scope: Option<PathBuf>,
    scopes: Arc<dyn AccessScopeProvider>,
    page_index: usize,
    scale: f32,
    is_auto_scaling: bool,
    scroll_offset: Option<(f32, f32)>,
    search_query: String,
    search_result_index: usize,
    dirty: bool,
}

impl DocumentSession {
    pub fn new(scopes: Arc<dyn AccessScopeProvider>) -> Self {
        Self {
            document: None,
            path: None,
            held_scope: None,
            scopes,
            page_index: 0,
            scale: DEFAULT_SCALE,
            is_auto_scaling: true,
            scroll_offset: None,
            search_query: String::new(),
            search_result_index: 0,
            dirty: false,
        }
    }

    /// Open the document at `path`, replacing whatever was open before.
    ///
    /// Any previously held access grant is released first. If
    /// `security_scoped`, a grant for `path` is acquired and the open fails
    /// without one; a parse failure releases the just-acquired grant. On any
    /// failure the session is left empty.
    pub fn open(
        &mut self,
        engine: &dyn PdfEngine,
        path: &Path,
        security_scoped: bool,
    ) -> Result<(), SessionError> {
        self.close();

        if security_scoped {
            if !self.scopes.begin_access(path) {
                return Err(SessionError::AccessDenied(path.to_path_buf()));
            }
            self.held_scope = Some(path.to_path_buf());
        }

        match engine.open(path) {
            Ok(document) => {
                debug!(path = %path.display(), pages = document.page_count(), "opened document");
                self.document = Some(document);
                self.path = Some(path.to_path_buf());
                Ok(())
            }
            Err(err) => {
                self.release_scope();
                Err(SessionError::Load(err))
            }
        }
    }

    /// Release the held access grant and reset to the empty state.
    pub fn close(&mut self) {
        self.release_scope();
        self.document = None;
        self.path = None;
        self.page_index = 0;
        self.scale = DEFAULT_SCALE;
        self.is_auto_scaling = true;
        self.scroll_offset = None;
        self.search_query.clear();
        self.search_result_index = 0;
        self.dirty = false;
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.document.as_ref().map(|d| d.page_count()).unwrap_or(0)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Move the cursor. Out-of-range indices are ignored.
    pub fn go_to_page(&mut self, index: usize) {
        if index < self.page_count() {
            self.page_index = index;
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_auto_scaling(&self) -> bool {
        self.is_auto_scaling
    }

    /// Any manual zoom call leaves fit mode.
    pub fn set_zoom(&mut self, scale: f32) {
        self.is_auto_scaling = false;
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.scale / ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(DEFAULT_SCALE);
    }

    pub fn scroll_offset(&self) -> Option<(f32, f32)> {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: Option<(f32, f32)>) {
        self.scroll_offset = offset;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_result_index(&self) -> usize {
        self.search_result_index
    }

    /// Record the find-in-document position so a tab switch can restore it.
    pub fn set_search(&mut self, query: impl Into<String>, result_index: usize) {
        self.search_query = query.into();
        self.search_result_index = result_index;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by mutating collaborators (annotation edits, page rotation).
    /// Ignored while no document is open.
    pub fn mark_dirty(&mut self) {
        if self.document.is_some() {
            self.dirty = true;
        }
    }

    /// Cleared by the manager after a confirmed save success; `save` and
    /// `save_as` never clear it themselves.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Write the document back to its current location.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.path.clone().ok_or(SessionError::NoSavePath)?;
        let document = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        document.write_to(&path).map_err(SessionError::Write)
    }

    /// Write the document to `new_path`; subsequent saves target it.
    pub fn save_as(&mut self, new_path: &Path) -> Result<(), SessionError> {
        let document = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        document.write_to(new_path).map_err(SessionError::Write)?;
        self.path = Some(new_path.to_path_buf());
        Ok(())
    }

    /// Capture the view state for the tab record.
    pub fn snapshot_view(&self) -> ViewState {
        ViewState {
            page_index: self.page_index,
            scale: self.scale,
            scroll_offset: self.scroll_offset,
            search_query: self.search_query.clone(),
            search_result_index: self.search_result_index,
        }
    }

    /// Restore a previously captured view state. The page index is clamped
    /// to the open document's page count.
    pub fn apply_view(&mut self, view: &ViewState) {
        let last_page = self.page_count().saturating_sub(1);
        self.page_index = view.page_index.min(last_page);
        self.scale = view.scale.clamp(MIN_SCALE, MAX_SCALE);
        self.scroll_offset = view.scroll_offset;
        self.search_query = view.search_query.clone();
        self.search_result_index = view.search_result_index;
    }

    fn release_scope(&mut self) {
        if let Some(path) = self.held_scope.take() {
            self.scopes.end_access(&path);
        }
    }
}

impl Drop for DocumentSession {
    fn drop(&mut self) {
        self.release_scope();
    }
}
