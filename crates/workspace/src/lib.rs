//! Per-window multi-document tab management.
//!
//! The [`TabManager`] owns the ordered tab list and one
//! [`paperdeck_session::DocumentSession`] per tab, mediates every
//! cross-tab transition (create, select, close, reorder, open, save), and
//! persists the tab session across launches. The host window renders from
//! its read accessors and forwards user commands into it; all calls happen
//! on one logical UI thread.

mod confirm;
mod manager;
mod persistence;
mod recent;

#[cfg(test)]
pub(crate) mod testutil;

pub use confirm::{CloseConfirmation, CloseDecision};
pub use manager::{CloseOutcome, SaveReceipt, TabManager, WorkspaceError};
pub use recent::RecentFiles;
