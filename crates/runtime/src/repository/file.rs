//! File-based StateRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use vault_core::VaultState;

use super::{RepositoryError, Result, StateRepository};

const DIGEST_LEN: usize = 32;

/// File-based implementation of StateRepository.
///
/// # File Format
///
/// Each revision is stored as `state_{revision}.bin`:
///
/// ```text
/// [32-byte SHA-256 of payload][bincode serialized VaultState]
/// ```
///
/// Writes go to a temp file first and are renamed into place.
pub struct FileStateRepository {
    base_dir: PathBuf,
}

impl FileStateRepository {
    /// Create a new file-based state repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn state_path(&self, revision: u64) -> PathBuf {
        self.base_dir.join(format!("state_{revision}.bin"))
    }
}

impl StateRepository for FileStateRepository {
    fn save(&self, revision: u64, state: &VaultState) -> Result<()> {
        let path = self.state_path(revision);
        let temp_path = path.with_extension("bin.tmp");

        let payload =
            bincode::serialize(state).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let mut bytes = Vec::with_capacity(DIGEST_LEN + payload.len());
        bytes.extend_from_slice(&Sha256::digest(&payload));
        bytes.extend_from_slice(&payload);

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved state[{}] to {}", revision, path.display());

        Ok(())
    }

    fn load(&self, revision: u64) -> Result<Option<VaultState>> {
        let path = self.state_path(revision);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        if bytes.len() < DIGEST_LEN {
            return Err(RepositoryError::CorruptedData(format!(
                "{} is truncated",
                path.display()
            )));
        }
        let (digest, payload) = bytes.split_at(DIGEST_LEN);
        if Sha256::digest(payload).as_slice() != digest {
            return Err(RepositoryError::CorruptedData(format!(
                "{} failed its checksum",
                path.display()
            )));
        }
        let state: VaultState = bincode::deserialize(payload)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tracing::debug!("Loaded state[{}] from {}", revision, path.display());

        Ok(Some(state))
    }

    fn exists(&self, revision: u64) -> bool {
        self.state_path(revision).exists()
    }

    fn delete(&self, revision: u64) -> Result<()> {
        let path = self.state_path(revision);

        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted state[{}]", revision);
        }

        Ok(())
    }

    fn list_revisions(&self) -> Result<Vec<u64>> {
        let mut revisions = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(revision) = filename
                    .strip_prefix("state_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(revision) = revision.parse::<u64>()
            {
                revisions.push(revision);
            }
        }

        revisions.sort_unstable();
        Ok(revisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStateRepository::new(dir.path()).unwrap();

        let mut state = VaultState::new();
        state.fee.record_sample(1_000);
        repo.save(7, &state).unwrap();

        assert_eq!(repo.list_revisions().unwrap(), vec![7]);
        assert_eq!(repo.load(7).unwrap(), Some(state));
        assert_eq!(repo.load(8).unwrap(), None);

        let path = dir.path().join("state_7.bin");
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            repo.load(7),
            Err(RepositoryError::CorruptedData(_))
        ));
    }

    #[test]
    fn temp_files_are_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStateRepository::new(dir.path()).unwrap();
        fs::write(dir.path().join("state_3.bin.tmp"), b"partial").unwrap();
        repo.save(1, &VaultState::new()).unwrap();
        assert_eq!(repo.list_revisions().unwrap(), vec![1]);
    }
}
