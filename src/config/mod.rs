//! Genesis configuration: token metadata, supply allocation, owner and the
//! seeded candidate list. Loaded from JSON; every field has a default.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::math;
use crate::types::{Address, Amount, CandidateCode};

pub const DEFAULT_DECIMALS: u8 = 18;
pub const DEFAULT_SUPPLY_TOKENS: Amount = 100_000_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read genesis file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse genesis file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid genesis: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateSeed {
    pub code: CandidateCode,
    pub address: Address,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenesisConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Raw units, already scaled by `decimals`.
    pub total_supply: Amount,
    /// Deploying identity; becomes the owner.
    pub owner: Address,
    /// Receives the whole supply.
    pub holder: Address,
    pub candidates: Vec<CandidateSeed>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        let owner = Address::repeat_byte(0x01);
        Self {
            name: "Ballot Credit".to_string(),
            symbol: "VOTE".to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: DEFAULT_SUPPLY_TOKENS * 10u128.pow(DEFAULT_DECIMALS as u32),
            owner,
            holder: owner,
            candidates: vec![
                CandidateSeed {
                    code: 1010,
                    address: Address::repeat_byte(0x10),
                },
                CandidateSeed {
                    code: 2020,
                    address: Address::repeat_byte(0x20),
                },
                CandidateSeed {
                    code: 3030,
                    address: Address::repeat_byte(0x30),
                },
            ],
        }
    }
}

impl GenesisConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GenesisConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::Invalid("owner is the zero address".into()));
        }
        if self.holder.is_zero() {
            return Err(ConfigError::Invalid("holder is the zero address".into()));
        }
        if self.total_supply == 0 {
            return Err(ConfigError::Invalid("total supply is zero".into()));
        }
        math::pow10(self.decimals).map_err(|_| {
            ConfigError::Invalid(format!("decimals {} overflow the amount width", self.decimals))
        })?;
        let mut seen = BTreeSet::new();
        for seed in &self.candidates {
            if seed.code == 0 {
                return Err(ConfigError::Invalid(
                    "candidate code 0 is reserved for null votes".into(),
                ));
            }
            if seed.address.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "candidate {} has the zero address",
                    seed.code
                )));
            }
            if !seen.insert(seed.code) {
                return Err(ConfigError::Invalid(format!(
                    "candidate {} listed twice",
                    seed.code
                )));
            }
        }
        Ok(())
    }
}
