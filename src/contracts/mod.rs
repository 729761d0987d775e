//! The deployed contract: one owned store holding access control, ledger,
//! candidate registry, vote records and the event log.
//!
//! Mutating calls run against staged copies of the stores that replace the
//! live ones only when the call succeeds, so a rejected call leaves no trace.
//! The event log is never copied; a call's events are appended on commit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::access::AccessControl;
use crate::config::GenesisConfig;
use crate::error::ContractResult;
use crate::events::{Event, EventLog};
use crate::ledger::{build_merkle, Ledger, TokenMetadata};
use crate::registry::CandidateRegistry;
use crate::types::{Address, Amount, CandidateCode};
use crate::voting::{VoteRecord, VoteRecorder};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractState {
    access: AccessControl,
    ledger: Ledger,
    registry: CandidateRegistry,
    votes: VoteRecorder,
    events: EventLog,
}

/// A mutating call, as a host would submit it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ContractCall {
    Transfer {
        to: Address,
        #[serde(with = "crate::types::amount_str")]
        value: Amount,
    },
    Approve {
        spender: Address,
        #[serde(with = "crate::types::amount_str")]
        value: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "crate::types::amount_str")]
        value: Amount,
    },
    IncreaseApproval {
        spender: Address,
        #[serde(with = "crate::types::amount_str")]
        added_value: Amount,
    },
    DecreaseApproval {
        spender: Address,
        #[serde(with = "crate::types::amount_str")]
        subtracted_value: Amount,
    },
    TransferOwnership {
        new_owner: Address,
    },
    Pause,
    Unpause,
    RegisterCandidate {
        code: CandidateCode,
        address: Address,
    },
    CastPresidentialVote {
        code: CandidateCode,
    },
    CastGuardedPresidentialVote {
        code: CandidateCode,
    },
    CastCouncillorVote {
        code: CandidateCode,
    },
    CastRepresentativeVote {
        code: CandidateCode,
    },
}

impl ContractCall {
    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::Transfer { .. } => "transfer",
            ContractCall::Approve { .. } => "approve",
            ContractCall::TransferFrom { .. } => "transfer_from",
            ContractCall::IncreaseApproval { .. } => "increase_approval",
            ContractCall::DecreaseApproval { .. } => "decrease_approval",
            ContractCall::TransferOwnership { .. } => "transfer_ownership",
            ContractCall::Pause => "pause",
            ContractCall::Unpause => "unpause",
            ContractCall::RegisterCandidate { .. } => "register_candidate",
            ContractCall::CastPresidentialVote { .. } => "cast_presidential_vote",
            ContractCall::CastGuardedPresidentialVote { .. } => "cast_guarded_presidential_vote",
            ContractCall::CastCouncillorVote { .. } => "cast_councillor_vote",
            ContractCall::CastRepresentativeVote { .. } => "cast_representative_vote",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallOutput {
    Success(bool),
    Amount(#[serde(with = "crate::types::amount_str")] Amount),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractSnapshot {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub owner: Address,
    pub paused: bool,
    pub balances: BTreeMap<Address, Amount>,
    pub candidates: BTreeMap<CandidateCode, Address>,
    pub null_votes: u64,
    pub events: usize,
    #[serde(with = "hex_root")]
    pub state_root: [u8; 32],
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BallotContract {
    state: ContractState,
}

impl BallotContract {
    /// Deploys with the genesis allocation and seeded candidates. The config
    /// owner is the deploying identity.
    pub fn from_genesis(config: &GenesisConfig) -> Self {
        let meta = TokenMetadata {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
        };
        let mut registry = CandidateRegistry::new();
        for seed in &config.candidates {
            registry.register_candidate(seed.code, seed.address);
        }
        info!(
            owner = %config.owner,
            holder = %config.holder,
            supply = config.total_supply,
            candidates = config.candidates.len(),
            "contract deployed"
        );
        Self {
            state: ContractState {
                access: AccessControl::new(config.owner),
                ledger: Ledger::genesis(meta, config.total_supply, config.holder),
                registry,
                votes: VoteRecorder::new(),
                events: Vec::new(),
            },
        }
    }

    // ---- queries ----

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.state.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> ContractResult<Amount> {
        self.state
            .ledger
            .allowance(&self.state.access, owner, spender)
    }

    pub fn total_supply(&self) -> Amount {
        self.state.ledger.total_supply()
    }

    pub fn owner(&self) -> Address {
        self.state.access.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.state.access.is_paused()
    }

    pub fn resolve(&self, code: CandidateCode) -> Address {
        self.state.registry.resolve(code)
    }

    pub fn candidates(&self) -> impl Iterator<Item = (CandidateCode, Address)> + '_ {
        self.state.registry.candidates()
    }

    pub fn null_vote_count(&self) -> u64 {
        self.state.votes.null_vote_count()
    }

    pub fn vote_record(&self, voter: &Address) -> VoteRecord {
        self.state.votes.record(voter)
    }

    pub fn events(&self) -> &[Event] {
        &self.state.events
    }

    pub fn state_root(&self) -> [u8; 32] {
        let state = &self.state;
        let mut hasher = Sha256::new();
        hasher.update(b"access");
        hasher.update(state.access.owner().as_bytes());
        hasher.update([state.access.is_paused() as u8]);
        let mut leaves: Vec<[u8; 32]> = vec![hasher.finalize().into()];
        leaves.extend(state.ledger.leaves());
        leaves.extend(state.registry.leaves());
        leaves.extend(state.votes.leaves());
        build_merkle(leaves)
    }

    pub fn snapshot(&self) -> ContractSnapshot {
        let ledger = &self.state.ledger;
        ContractSnapshot {
            name: ledger.name().to_string(),
            symbol: ledger.symbol().to_string(),
            decimals: ledger.decimals(),
            total_supply: ledger.total_supply(),
            owner: self.owner(),
            paused: self.is_paused(),
            balances: ledger.balances().clone(),
            candidates: self.candidates().collect(),
            null_votes: self.null_vote_count(),
            events: self.state.events.len(),
            state_root: self.state_root(),
        }
    }

    // ---- mutating calls ----

    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        value: Amount,
    ) -> ContractResult<bool> {
        self.stage(caller, "transfer", |s| {
            s.ledger.transfer(caller, to, value, &mut s.events)
        })
    }

    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        value: Amount,
    ) -> ContractResult<bool> {
        self.stage(caller, "approve", |s| {
            s.ledger.approve(&s.access, caller, spender, value, &mut s.events)
        })
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        value: Amount,
    ) -> ContractResult<bool> {
        self.stage(caller, "transfer_from", |s| {
            s.ledger.transfer_from(&s.access, caller, from, to, value, &mut s.events)
        })
    }

    pub fn increase_approval(
        &mut self,
        caller: Address,
        spender: Address,
        added_value: Amount,
    ) -> ContractResult<bool> {
        self.stage(caller, "increase_approval", |s| {
            s.ledger.increase_approval(&s.access, caller, spender, added_value, &mut s.events)
        })
    }

    pub fn decrease_approval(
        &mut self,
        caller: Address,
        spender: Address,
        subtracted_value: Amount,
    ) -> ContractResult<bool> {
        self.stage(caller, "decrease_approval", |s| {
            s.ledger.decrease_approval(
                &s.access,
                caller,
                spender,
                subtracted_value,
                &mut s.events,
            )
        })
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> ContractResult<()> {
        self.stage(caller, "transfer_ownership", |s| {
            s.access.transfer_ownership(caller, new_owner, &mut s.events)
        })
    }

    pub fn pause(&mut self, caller: Address) -> ContractResult<()> {
        self.stage(caller, "pause", |s| s.access.pause(caller, &mut s.events))
    }

    pub fn unpause(&mut self, caller: Address) -> ContractResult<()> {
        self.stage(caller, "unpause", |s| s.access.unpause(caller, &mut s.events))
    }

    pub fn register_candidate(
        &mut self,
        caller: Address,
        code: CandidateCode,
        address: Address,
    ) -> ContractResult<bool> {
        self.stage(caller, "register_candidate", |s| {
            Ok(s.registry.register_candidate(code, address))
        })
    }

    /// Returns the candidate's balance after the credit, `0` for a null vote.
    pub fn cast_presidential_vote(
        &mut self,
        caller: Address,
        code: CandidateCode,
    ) -> ContractResult<Amount> {
        self.stage(caller, "cast_presidential_vote", |s| {
            s.votes.cast_presidential_vote(&s.access, &mut s.ledger, &s.registry, caller, code)
        })
    }

    pub fn cast_guarded_presidential_vote(
        &mut self,
        caller: Address,
        code: CandidateCode,
    ) -> ContractResult<bool> {
        self.stage(caller, "cast_guarded_presidential_vote", |s| {
            s.votes.cast_guarded_presidential_vote(
                &s.access,
                &mut s.ledger,
                &s.registry,
                caller,
                code,
                &mut s.events,
            )
        })
    }

    pub fn cast_councillor_vote(
        &mut self,
        caller: Address,
        code: CandidateCode,
    ) -> ContractResult<bool> {
        self.stage(caller, "cast_councillor_vote", |s| {
            s.votes.cast_councillor_vote(
                &s.access,
                &mut s.ledger,
                &s.registry,
                caller,
                code,
                &mut s.events,
            )
        })
    }

    pub fn cast_representative_vote(
        &mut self,
        caller: Address,
        code: CandidateCode,
    ) -> ContractResult<bool> {
        self.stage(caller, "cast_representative_vote", |s| {
            s.votes.cast_representative_vote(
                &s.access,
                &mut s.ledger,
                &s.registry,
                caller,
                code,
                &mut s.events,
            )
        })
    }

    /// Runs one call atomically on behalf of `caller`.
    pub fn execute(&mut self, caller: Address, call: ContractCall) -> ContractResult<CallOutput> {
        match call {
            ContractCall::Transfer { to, value } => {
                self.transfer(caller, to, value).map(CallOutput::Success)
            }
            ContractCall::Approve { spender, value } => {
                self.approve(caller, spender, value).map(CallOutput::Success)
            }
            ContractCall::TransferFrom { from, to, value } => self
                .transfer_from(caller, from, to, value)
                .map(CallOutput::Success),
            ContractCall::IncreaseApproval {
                spender,
                added_value,
            } => self
                .increase_approval(caller, spender, added_value)
                .map(CallOutput::Success),
            ContractCall::DecreaseApproval {
                spender,
                subtracted_value,
            } => self
                .decrease_approval(caller, spender, subtracted_value)
                .map(CallOutput::Success),
            ContractCall::TransferOwnership { new_owner } => self
                .transfer_ownership(caller, new_owner)
                .map(|()| CallOutput::Success(true)),
            ContractCall::Pause => self.pause(caller).map(|()| CallOutput::Success(true)),
            ContractCall::Unpause => self.unpause(caller).map(|()| CallOutput::Success(true)),
            ContractCall::RegisterCandidate { code, address } => self
                .register_candidate(caller, code, address)
                .map(CallOutput::Success),
            ContractCall::CastPresidentialVote { code } => self
                .cast_presidential_vote(caller, code)
                .map(CallOutput::Amount),
            ContractCall::CastGuardedPresidentialVote { code } => self
                .cast_guarded_presidential_vote(caller, code)
                .map(CallOutput::Success),
            ContractCall::CastCouncillorVote { code } => self
                .cast_councillor_vote(caller, code)
                .map(CallOutput::Success),
            ContractCall::CastRepresentativeVote { code } => self
                .cast_representative_vote(caller, code)
                .map(CallOutput::Success),
        }
    }

    /// Applies `apply` to copies of the mutable stores with an empty event
    /// log. On success the copies replace the live stores and the new events
    /// are appended; on failure nothing is touched.
    fn stage<T>(
        &mut self,
        caller: Address,
        op: &'static str,
        apply: impl FnOnce(&mut ContractState) -> ContractResult<T>,
    ) -> ContractResult<T> {
        let mut staged = ContractState {
            access: self.state.access.clone(),
            ledger: self.state.ledger.clone(),
            registry: self.state.registry.clone(),
            votes: self.state.votes.clone(),
            events: Vec::new(),
        };
        match apply(&mut staged) {
            Ok(output) => {
                let ContractState {
                    access,
                    ledger,
                    registry,
                    votes,
                    mut events,
                } = staged;
                self.state.access = access;
                self.state.ledger = ledger;
                self.state.registry = registry;
                self.state.votes = votes;
                self.state.events.append(&mut events);
                Ok(output)
            }
            Err(err) => {
                warn!(op, %caller, error = %err, "call rejected");
                Err(err)
            }
        }
    }
}

pub(crate) mod hex_root {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(&encoded).map_err(D::Error::custom)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| D::Error::custom("state root must be 32 bytes"))
    }
}
