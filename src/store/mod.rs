//! JSON state file standing in for the host runtime's storage.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::contracts::BallotContract;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state file {path} is not valid contract state: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode contract state: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<BallotContract, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| self.io(source))?;
        let contract = serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "state loaded");
        Ok(contract)
    }

    /// Writes through a sibling temp file and renames it into place.
    pub fn save(&self, contract: &BallotContract) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(contract)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io(source))?;
            }
        }
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        let mut f = fs::File::create(&tmp).map_err(|source| self.io(source))?;
        f.write_all(&bytes).map_err(|source| self.io(source))?;
        f.sync_all().map_err(|source| self.io(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io(source))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "state saved");
        Ok(())
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenesisConfig;
    use crate::types::Address;

    #[test]
    fn save_then_load_restores_contract() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("state.json"));
        let mut contract = BallotContract::from_genesis(&GenesisConfig::default());
        let owner = contract.owner();
        contract
            .transfer(owner, Address::repeat_byte(0x42), 10u128.pow(24))
            .unwrap();
        contract.approve(owner, Address::repeat_byte(0x43), 5).unwrap();
        contract.cast_presidential_vote(owner, 0).unwrap();

        file.save(&contract).unwrap();
        assert!(file.exists());
        let loaded = file.load().unwrap();
        assert_eq!(loaded, contract);
        assert_eq!(loaded.state_root(), contract.state_root());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("absent.json"));
        assert!(matches!(file.load(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"[]").unwrap();
        assert!(matches!(
            StateFile::new(path).load(),
            Err(StoreError::Decode { .. })
        ));
    }
}
