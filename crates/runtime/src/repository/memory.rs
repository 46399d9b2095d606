//! In-memory StateRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use vault_core::VaultState;

use super::{RepositoryError, Result, StateRepository};

/// In-memory implementation of StateRepository.
#[derive(Debug, Default)]
pub struct InMemoryStateRepo {
    states: RwLock<BTreeMap<u64, VaultState>>,
}

impl InMemoryStateRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an initial state at revision 0.
    pub fn with_initial_state(initial_state: VaultState) -> Self {
        Self {
            states: RwLock::new(BTreeMap::from([(0, initial_state)])),
        }
    }
}

impl StateRepository for InMemoryStateRepo {
    fn save(&self, revision: u64, state: &VaultState) -> Result<()> {
        let mut states = self
            .states
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        states.insert(revision, state.clone());
        Ok(())
    }

    fn load(&self, revision: u64) -> Result<Option<VaultState>> {
        let states = self
            .states
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(states.get(&revision).cloned())
    }

    fn exists(&self, revision: u64) -> bool {
        self.states
            .read()
            .map(|states| states.contains_key(&revision))
            .unwrap_or(false)
    }

    fn delete(&self, revision: u64) -> Result<()> {
        let mut states = self
            .states
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        states.remove(&revision);
        Ok(())
    }

    fn list_revisions(&self) -> Result<Vec<u64>> {
        let states = self
            .states
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(states.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::ClanId;

    #[test]
    fn latest_and_pruning() {
        let repo = InMemoryStateRepo::with_initial_state(VaultState::new());
        let mut state = VaultState::new();
        state.fee.record_sample(100);
        repo.save(3, &state).unwrap();
        repo.save(5, &state).unwrap();

        let (revision, latest) = repo.load_latest().unwrap().unwrap();
        assert_eq!(revision, 5);
        assert_eq!(latest, state);
        assert!(latest.clan(ClanId(1)).is_none());

        assert_eq!(repo.prune_below(5).unwrap(), 2);
        assert_eq!(repo.list_revisions().unwrap(), vec![5]);
        assert!(!repo.exists(0));
    }
}
