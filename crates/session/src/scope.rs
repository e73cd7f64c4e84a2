//! Security-scoped file access seam.

use std::path::Path;

/// Paired access grants for sandboxed file locations.
///
/// `begin_access` and `end_access` calls are always paired by the session:
/// opening a new resource releases the previous grant first, and closing
/// releases the held grant.
pub trait AccessScopeProvider {
    /// Acquire access to `path`. Returns false when the grant is refused.
    fn begin_access(&self, path: &Path) -> bool;

    /// Release a previously acquired grant.
    fn end_access(&self, path: &Path);
}

/// Provider for platforms without sandboxed file access: every grant
/// succeeds and release is a no-op.
#[derive(Debug, Default)]
pub struct UnscopedAccess;

impl AccessScopeProvider for UnscopedAccess {
    fn begin_access(&self, _path: &Path) -> bool {
        true
    }

    fn end_access(&self, _path: &Path) {}
}
