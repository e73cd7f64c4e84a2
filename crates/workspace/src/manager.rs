//! The tab/session manager.

use crate::confirm::{CloseConfirmation, CloseDecision};
use crate::recent::RecentFiles;
use paperdeck_doc_model::{DocumentSource, TabId, TabRecord, ViewState};
use paperdeck_pdf_engine::PdfEngine;
use paperdeck_session::{AccessScopeProvider, DocumentSession, SessionError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("unknown tab {0}")]
    UnknownTab(TabId),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result of a [`TabManager::close_tab`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The tab was closed; at least one tab remains.
    Closed,
    /// The user cancelled; nothing changed.
    Cancelled,
    /// The last tab was closed; the host window should close too.
    WindowShouldClose,
}

/// Typed payload for the transient "document saved" notification. Returned
/// directly to the caller; failures come back as errors and carry no
/// receipt.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveReceipt {
    pub title: String,
    pub path: PathBuf,
}

/// Owns the ordered tab list, one session per tab, and the active-tab
/// cursor for a single window.
///
/// Invariants: `tabs` is never empty while the window exists (closing the
/// last tab returns [`CloseOutcome::WindowShouldClose`] instead), and
/// every tab record has exactly one session.
pub struct TabManager {
    tabs: Vec<TabRecord>,
    sessions: HashMap<TabId, DocumentSession>,
    active_tab_id: TabId,
    engine: Arc<dyn PdfEngine>,
    scopes: Arc<dyn AccessScopeProvider>,
    recent: RecentFiles,
}

impl TabManager {
    /// A new manager starts with a single empty tab.
    pub fn new(
        engine: Arc<dyn PdfEngine>,
        scopes: Arc<dyn AccessScopeProvider>,
        recent: RecentFiles,
    ) -> Self {
        let record = TabRecord::empty();
        let id = record.id;
        let mut sessions = HashMap::new();
        sessions.insert(id, DocumentSession::new(Arc::clone(&scopes)));

        Self { tabs: vec![record], sessions, active_tab_id: id, engine, scopes, recent }
    }

    pub fn tabs(&self) -> &[TabRecord] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> TabId {
        self.active_tab_id
    }

    pub fn active_record(&self) -> Option<&TabRecord> {
        self.index_of(self.active_tab_id).map(|index| &self.tabs[index])
    }

    pub fn session(&self, id: TabId) -> Option<&DocumentSession> {
        self.sessions.get(&id)
    }

    pub fn session_mut(&mut self, id: TabId) -> Option<&mut DocumentSession> {
        self.sessions.get_mut(&id)
    }

    pub fn active_session(&self) -> Option<&DocumentSession> {
        self.sessions.get(&self.active_tab_id)
    }

    /// Mutable access for collaborators that navigate, zoom, or mark the
    /// presented document dirty.
    pub fn active_session_mut(&mut self) -> Option<&mut DocumentSession> {
        self.sessions.get_mut(&self.active_tab_id)
    }

    pub fn recent_files(&self) -> &RecentFiles {
        &self.recent
    }

    /// Append a new tab and make it active. With a path, the document is
    /// opened into the new tab; if that load fails the tab stays as an
    /// empty placeholder and the error is surfaced to the caller.
    pub fn create_tab(
        &mut self,
        path: Option<PathBuf>,
        security_scoped: bool,
    ) -> Result<TabId, WorkspaceError> {
        self.snapshot_active();

        let record = TabRecord::empty();
        let id = record.id;
        self.tabs.push(record);
        self.sessions.insert(id, DocumentSession::new(Arc::clone(&self.scopes)));
        self.active_tab_id = id;
        debug!(%id, "created tab");

        if let Some(path) = path {
            self.load_into_active(path, security_scoped, false)?;
        }

        Ok(id)
    }

    /// Open a document, reusing the active tab when it is empty or when
    /// replacement is requested, and creating a new tab otherwise.
    pub fn open_document(
        &mut self,
        path: PathBuf,
        security_scoped: bool,
        replace_current: bool,
    ) -> Result<TabId, WorkspaceError> {
        let reuse_active =
            replace_current || self.active_record().map(|r| r.is_empty()).unwrap_or(false);

        if reuse_active {
            self.load_into_active(path, security_scoped, true)?;
            Ok(self.active_tab_id)
        } else {
            self.create_tab(Some(path), security_scoped)
        }
    }

    /// Close a tab. A dirty tab asks `confirm` first: cancel aborts with no
    /// state change, save-then-close only proceeds once the save succeeds.
    pub fn close_tab(
        &mut self,
        id: TabId,
        confirm: &mut dyn CloseConfirmation,
    ) -> Result<CloseOutcome, WorkspaceError> {
        let index = self.index_of(id).ok_or(WorkspaceError::UnknownTab(id))?;
        let is_dirty = self.sessions.get(&id).map(|s| s.is_dirty()).unwrap_or(false);

        if is_dirty {
            let title = self.tabs[index].title.clone();
            match confirm.confirm_close(&title) {
                CloseDecision::Cancel => return Ok(CloseOutcome::Cancelled),
                CloseDecision::Save => {
                    let session =
                        self.sessions.get_mut(&id).ok_or(WorkspaceError::UnknownTab(id))?;
                    session.save()?;
                    session.clear_dirty();
                }
                CloseDecision::Discard => {}
            }
        }

        if let Some(mut session) = self.sessions.remove(&id) {
            session.close();
        }
        self.tabs.remove(index);
        debug!(%id, "closed tab");

        if self.tabs.is_empty() {
            return Ok(CloseOutcome::WindowShouldClose);
        }

        if id == self.active_tab_id {
            let new_index = index.min(self.tabs.len() - 1);
            self.activate_index(new_index);
        }

        Ok(CloseOutcome::Closed)
    }

    /// Switch the active tab, snapshotting the outgoing tab's view state
    /// and restoring the incoming tab's. Unknown or already-active ids are
    /// ignored.
    pub fn select_tab(&mut self, id: TabId) {
        if id == self.active_tab_id {
            return;
        }
        let Some(index) = self.index_of(id) else { return };

        self.snapshot_active();
        self.activate_index(index);
    }

    pub fn select_next_tab(&mut self) {
        let Some(index) = self.index_of(self.active_tab_id) else { return };
        let next = (index + 1) % self.tabs.len();
        self.select_tab(self.tabs[next].id);
    }

    pub fn select_previous_tab(&mut self) {
        let Some(index) = self.index_of(self.active_tab_id) else { return };
        let previous = if index == 0 { self.tabs.len() - 1 } else { index - 1 };
        self.select_tab(self.tabs[previous].id);
    }

    /// Reorder the tab list. The active tab stays active by id regardless
    /// of its new position.
    pub fn move_tab(&mut self, from: usize, to: usize) {
        if from == to || from >= self.tabs.len() || to >= self.tabs.len() {
            return;
        }
        let record = self.tabs.remove(from);
        self.tabs.insert(to, record);
    }

    /// Save the active document to its current location. Success clears
    /// the dirty flag and returns the notification payload; failure leaves
    /// the dirty flag set.
    pub fn save_active(&mut self) -> Result<SaveReceipt, WorkspaceError> {
        let id = self.active_tab_id;
        let index = self.index_of(id).ok_or(WorkspaceError::UnknownTab(id))?;
        let session = self.sessions.get_mut(&id).ok_or(WorkspaceError::UnknownTab(id))?;

        session.save()?;
        session.clear_dirty();

        let path = session.path().map(Path::to_path_buf).unwrap_or_default();
        let title = self.tabs[index].title.clone();
        info!(%title, path = %path.display(), "saved document");
        Ok(SaveReceipt { title, path })
    }

    /// Save the active document to a new location; subsequent saves and the
    /// tab's record target the new path.
    pub fn save_active_as(&mut self, new_path: PathBuf) -> Result<SaveReceipt, WorkspaceError> {
        let id = self.active_tab_id;
        let index = self.index_of(id).ok_or(WorkspaceError::UnknownTab(id))?;
        let session = self.sessions.get_mut(&id).ok_or(WorkspaceError::UnknownTab(id))?;

        session.save_as(&new_path)?;
        session.clear_dirty();

        // The save panel granted access to the new location; no scope
        // lifecycle applies to it.
        self.tabs[index].set_source(DocumentSource::new(new_path.clone(), false));
        self.recent.add(&new_path);

        let title = self.tabs[index].title.clone();
        info!(%title, path = %new_path.display(), "saved document");
        Ok(SaveReceipt { title, path: new_path })
    }

    /// Tabs with unsaved changes, in tab order. Used by window-close and
    /// app-quit logic to confirm once for the whole batch.
    pub fn dirty_sessions(&self) -> Vec<(TabId, &DocumentSession)> {
        self.tabs
            .iter()
            .filter_map(|record| {
                let session = self.sessions.get(&record.id)?;
                session.is_dirty().then_some((record.id, session))
            })
            .collect()
    }

    pub(crate) fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|record| record.id == id)
    }

    /// Copy the active session's live view state into its tab record.
    pub(crate) fn snapshot_active(&mut self) {
        let Some(index) = self.index_of(self.active_tab_id) else { return };
        if let Some(session) = self.sessions.get(&self.active_tab_id) {
            self.tabs[index].view = session.snapshot_view();
        }
    }

    pub(crate) fn engine(&self) -> &dyn PdfEngine {
        self.engine.as_ref()
    }

    pub(crate) fn scopes(&self) -> &Arc<dyn AccessScopeProvider> {
        &self.scopes
    }

    pub(crate) fn replace_tabs(
        &mut self,
        tabs: Vec<TabRecord>,
        sessions: HashMap<TabId, DocumentSession>,
        active_tab_id: TabId,
    ) {
        self.tabs = tabs;
        self.sessions = sessions;
        self.active_tab_id = active_tab_id;
    }

    fn activate_index(&mut self, index: usize) {
        let id = self.tabs[index].id;
        self.active_tab_id = id;
        let view = self.tabs[index].view.clone();
        if let Some(session) = self.sessions.get_mut(&id) {
            session.apply_view(&view);
        }
    }

    /// Open `path` into the active tab's session, updating its record on
    /// success. On failure the record becomes (or stays) an empty
    /// placeholder; `reset_on_failure` distinguishes the in-place open
    /// path, which clears a previously set source.
    fn load_into_active(
        &mut self,
        path: PathBuf,
        security_scoped: bool,
        reset_on_failure: bool,
    ) -> Result<(), WorkspaceError> {
        let id = self.active_tab_id;
        let index = self.index_of(id).ok_or(WorkspaceError::UnknownTab(id))?;
        let session = self.sessions.get_mut(&id).ok_or(WorkspaceError::UnknownTab(id))?;

        match session.open(self.engine.as_ref(), &path, security_scoped) {
            Ok(()) => {
                let record = &mut self.tabs[index];
                record.set_source(DocumentSource::new(path.clone(), security_scoped));
                record.view = ViewState::default();
                self.recent.add(&path);
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open document");
                if reset_on_failure {
                    self.tabs[index].clear_source();
                }
                Err(err.into())
            }
        }
    }
}
