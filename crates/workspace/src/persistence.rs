//! Tab-session persistence across application launches.

use crate::manager::TabManager;
use paperdeck_doc_model::{DocumentSource, SavedSession, SavedTab, TabRecord};
use paperdeck_session::DocumentSession;
use paperdeck_storage::{Storage, StorageError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

impl TabManager {
    /// Persist the tab list. The active tab's live view state is
    /// snapshotted into its record first, empty tabs are filtered out, and
    /// the active index is recorded against the unfiltered ordering.
    pub fn save_session(&mut self, storage: &Storage) -> Result<(), StorageError> {
        self.snapshot_active();

        let session = SavedSession {
            tabs: self.tabs().iter().filter_map(SavedTab::from_record).collect(),
            active_tab_index: self.index_of(self.active_tab_id()).unwrap_or(0),
        };
        storage.save_session(&session)
    }

    /// Replace this manager's tabs with the persisted session.
    ///
    /// Each stored path is opened without a security scope (persisted
    /// locators are app-owned). A record whose document no longer loads is
    /// dropped entirely rather than kept as a broken tab; if nothing
    /// survives, one empty tab is synthesized. Returns the number of tabs
    /// restored from disk.
    pub fn restore_session(&mut self, storage: &Storage) -> Result<usize, StorageError> {
        let Some(saved) = storage.load_session()? else {
            return Ok(0);
        };

        let mut tabs: Vec<TabRecord> = Vec::with_capacity(saved.tabs.len());
        let mut sessions: HashMap<_, DocumentSession> = HashMap::with_capacity(saved.tabs.len());

        for saved_tab in &saved.tabs {
            let mut session = DocumentSession::new(Arc::clone(self.scopes()));
            if let Err(err) = session.open(self.engine(), &saved_tab.path, false) {
                warn!(path = %saved_tab.path.display(), error = %err, "dropping unrestorable tab");
                continue;
            }
            session.apply_view(&saved_tab.view());

            let mut record = TabRecord::empty();
            record.set_source(DocumentSource::new(
                saved_tab.path.clone(),
                saved_tab.security_scoped,
            ));
            record.view = session.snapshot_view();

            sessions.insert(record.id, session);
            tabs.push(record);
        }

        let restored = tabs.len();
        if tabs.is_empty() {
            let record = TabRecord::empty();
            sessions.insert(record.id, DocumentSession::new(Arc::clone(self.scopes())));
            tabs.push(record);
        }

        let active_index = saved.active_tab_index.min(tabs.len() - 1);
        let active_tab_id = tabs[active_index].id;
        self.replace_tabs(tabs, sessions, active_tab_id);

        info!(restored, dropped = saved.tabs.len() - restored, "restored tab session");
        Ok(restored)
    }
}
