use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::types::{Address, CandidateCode};

/// Candidate code -> payout address.
///
/// Registration is open to any caller and silently overwrites.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateRegistry {
    entries: BTreeMap<CandidateCode, Address>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_candidate(&mut self, code: CandidateCode, address: Address) -> bool {
        if let Some(previous) = self.entries.insert(code, address) {
            debug!(code, %previous, new = %address, "candidate overwritten");
        } else {
            debug!(code, %address, "candidate registered");
        }
        true
    }

    /// `Address::ZERO` when `code` was never registered.
    pub fn resolve(&self, code: CandidateCode) -> Address {
        self.entries.get(&code).copied().unwrap_or(Address::ZERO)
    }

    pub fn candidates(&self) -> impl Iterator<Item = (CandidateCode, Address)> + '_ {
        self.entries.iter().map(|(code, address)| (*code, *address))
    }

    pub(crate) fn leaves(&self) -> Vec<[u8; 32]> {
        self.entries
            .iter()
            .map(|(code, address)| {
                let mut hasher = Sha256::new();
                hasher.update(b"candidate");
                hasher.update(code.to_le_bytes());
                hasher.update(address.as_bytes());
                hasher.finalize().into()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_resolves_to_zero() {
        let registry = CandidateRegistry::new();
        assert_eq!(registry.resolve(1010), Address::ZERO);
    }

    #[test]
    fn registration_overwrites() {
        let mut registry = CandidateRegistry::new();
        assert!(registry.register_candidate(1010, Address::repeat_byte(1)));
        assert!(registry.register_candidate(1010, Address::repeat_byte(2)));
        assert_eq!(registry.resolve(1010), Address::repeat_byte(2));
        assert_eq!(registry.candidates().count(), 1);
    }

    #[test]
    fn candidates_are_listed_in_code_order() {
        let mut registry = CandidateRegistry::new();
        registry.register_candidate(3030, Address::repeat_byte(3));
        registry.register_candidate(1010, Address::repeat_byte(1));
        let codes: Vec<_> = registry.candidates().map(|(code, _)| code).collect();
        assert_eq!(codes, vec![1010, 3030]);
    }
}
