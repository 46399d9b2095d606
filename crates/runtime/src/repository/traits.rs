//! Repository contract for saving and loading the vault state.

use vault_core::VaultState;

use super::error::Result;

/// Snapshots of [`VaultState`] indexed by revision.
///
/// The contest worker bumps the revision after every committed command and
/// saves the new state under it.
pub trait StateRepository: Send + Sync {
    fn save(&self, revision: u64, state: &VaultState) -> Result<()>;

    fn load(&self, revision: u64) -> Result<Option<VaultState>>;

    fn exists(&self, revision: u64) -> bool;

    fn delete(&self, revision: u64) -> Result<()>;

    /// All stored revisions, ascending.
    fn list_revisions(&self) -> Result<Vec<u64>>;

    /// Newest snapshot, if any.
    fn load_latest(&self) -> Result<Option<(u64, VaultState)>> {
        for revision in self.list_revisions()?.into_iter().rev() {
            if let Some(state) = self.load(revision)? {
                return Ok(Some((revision, state)));
            }
        }
        Ok(None)
    }

    /// Delete every revision strictly below `keep_from`.
    fn prune_below(&self, keep_from: u64) -> Result<usize> {
        let mut deleted = 0;
        for revision in self.list_revisions()? {
            if revision >= keep_from {
                break;
            }
            self.delete(revision)?;
            deleted += 1;
        }
        Ok(deleted)
    }
}
