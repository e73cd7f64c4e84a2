//! Unsaved-changes confirmation seam.

/// The user's answer to "close a tab with unsaved changes?".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseDecision {
    /// Save, then close if the save succeeds.
    Save,
    /// Close without saving.
    Discard,
    /// Abort the close; nothing changes.
    Cancel,
}

/// Presented by the host window as a modal dialog. The call blocks until
/// the user decides; the manager never proceeds with a pending answer.
pub trait CloseConfirmation {
    fn confirm_close(&mut self, document_title: &str) -> CloseDecision;
}
