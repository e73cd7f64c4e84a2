//! Shared fakes for manager tests: an in-memory engine, a counting scope
//! provider, and a scripted confirmation dialog.

use crate::confirm::{CloseConfirmation, CloseDecision};
use paperdeck_pdf_engine::{PageSize, PdfDocument, PdfEngine, PdfEngineError};
use paperdeck_session::AccessScopeProvider;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct FakeDocument {
    pages: usize,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl PdfDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn page_size(&self, page_index: usize) -> Option<PageSize> {
        (page_index < self.pages).then_some(PageSize { width_pt: 612.0, height_pt: 792.0 })
    }

    fn write_to(&mut self, _path: &Path) -> Result<(), PdfEngineError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PdfEngineError::Backend("injected write failure".to_owned()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEngine {
    pages_by_path: HashMap<PathBuf, usize>,
    pub fail_writes: Arc<AtomicBool>,
    pub writes: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn add_doc(&mut self, path: impl Into<PathBuf>, pages: usize) {
        self.pages_by_path.insert(path.into(), pages);
    }
}

impl PdfEngine for FakeEngine {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfEngineError> {
        match self.pages_by_path.get(path) {
            Some(&pages) => Ok(Box::new(FakeDocument {
                pages,
                fail_writes: Arc::clone(&self.fail_writes),
                writes: Arc::clone(&self.writes),
            })),
            None => Err(PdfEngineError::Backend(format!("unknown path {}", path.display()))),
        }
    }
}

#[derive(Default)]
pub struct CountingScope {
    pub begins: AtomicUsize,
    pub ends: AtomicUsize,
}

impl AccessScopeProvider for CountingScope {
    fn begin_access(&self, _path: &Path) -> bool {
        self.begins.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn end_access(&self, _path: &Path) {
        self.ends.fetch_add(1, Ordering::SeqCst);
    }
}

/// Confirmation dialog that always answers with one decision and counts
/// how often it was shown.
pub struct ScriptedConfirm {
    pub decision: CloseDecision,
    pub calls: usize,
}

impl ScriptedConfirm {
    pub fn answering(decision: CloseDecision) -> Self {
        Self { decision, calls: 0 }
    }
}

impl CloseConfirmation for ScriptedConfirm {
    fn confirm_close(&mut self, _document_title: &str) -> CloseDecision {
        self.calls += 1;
        self.decision
    }
}
