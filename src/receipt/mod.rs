use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contracts::{BallotContract, CallOutput, ContractCall};
use crate::events::Event;
use crate::types::Address;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReceiptOutcome {
    Accepted {
        output: CallOutput,
        events: Vec<Event>,
    },
    Rejected {
        reason: String,
    },
}

impl ReceiptOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ReceiptOutcome::Accepted { .. })
    }
}

/// Record of one executed call and the state it left behind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub sequence: u64,
    pub caller: Address,
    pub call: ContractCall,
    pub outcome: ReceiptOutcome,
    #[serde(with = "crate::contracts::hex_root")]
    pub state_root: [u8; 32],
}

impl Receipt {
    /// Executes `call` and records the result. A rejected call still yields
    /// a receipt; its state root equals the one before the call.
    pub fn execute(
        contract: &mut BallotContract,
        sequence: u64,
        caller: Address,
        call: ContractCall,
    ) -> Self {
        let seen = contract.events().len();
        let outcome = match contract.execute(caller, call.clone()) {
            Ok(output) => ReceiptOutcome::Accepted {
                output,
                events: contract.events()[seen..].to_vec(),
            },
            Err(err) => ReceiptOutcome::Rejected {
                reason: err.to_string(),
            },
        };
        Self {
            sequence,
            caller,
            call,
            outcome,
            state_root: contract.state_root(),
        }
    }

    pub fn digest(&self) -> Result<[u8; 32], serde_json::Error> {
        let mut hasher = Sha256::new();
        hasher.update(b"receipt");
        hasher.update(self.sequence.to_le_bytes());
        hasher.update(self.caller.as_bytes());
        hasher.update(serde_json::to_vec(&self.call)?);
        hasher.update(serde_json::to_vec(&self.outcome)?);
        hasher.update(self.state_root);
        Ok(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenesisConfig;

    fn contract() -> BallotContract {
        BallotContract::from_genesis(&GenesisConfig {
            decimals: 0,
            total_supply: 100,
            ..GenesisConfig::default()
        })
    }

    #[test]
    fn accepted_receipt_carries_new_events() {
        let mut contract = contract();
        let owner = contract.owner();
        let to = Address::repeat_byte(0x42);
        let call = ContractCall::Transfer { to, value: 7 };
        let receipt = Receipt::execute(&mut contract, 1, owner, call);
        assert!(receipt.outcome.is_accepted());
        match &receipt.outcome {
            ReceiptOutcome::Accepted { output, events } => {
                assert_eq!(*output, CallOutput::Success(true));
                assert_eq!(
                    events,
                    &vec![Event::Transfer {
                        from: owner,
                        to,
                        value: 7
                    }]
                );
            }
            _ => panic!("expected accepted receipt"),
        }
        assert_eq!(receipt.state_root, contract.state_root());
    }

    #[test]
    fn rejected_receipt_keeps_root() {
        let mut contract = contract();
        let root = contract.state_root();
        let intruder = Address::repeat_byte(0x99);
        let receipt = Receipt::execute(&mut contract, 2, intruder, ContractCall::Pause);
        match &receipt.outcome {
            ReceiptOutcome::Rejected { reason } => assert!(reason.contains("not the owner")),
            _ => panic!("expected rejection"),
        }
        assert_eq!(receipt.state_root, root);
    }

    #[test]
    fn digest_binds_sequence() {
        let mut contract = contract();
        let owner = contract.owner();
        let a = Receipt::execute(&mut contract, 1, owner, ContractCall::Pause);
        let mut b = a.clone();
        b.sequence = 2;
        assert_eq!(a.digest().unwrap(), a.digest().unwrap());
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn receipt_round_trips_as_json() {
        let mut contract = contract();
        let owner = contract.owner();
        let call = ContractCall::CastPresidentialVote { code: 0 };
        let receipt = Receipt::execute(&mut contract, 1, owner, call);
        let line = serde_json::to_string(&receipt).unwrap();
        let back: Receipt = serde_json::from_str(&line).unwrap();
        assert_eq!(back, receipt);
    }
}
