//! Balance-backed voting.
//!
//! A voter holding between [`MIN_ELIGIBLE_BALANCE`] and
//! [`MAX_ELIGIBLE_BALANCE`] units may vote; each guarded vote moves units from
//! the voter to the candidate's payout address. Office flags are never reset.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::access::AccessControl;
use crate::error::{ContractError, ContractResult};
use crate::events::{Event, EventLog};
use crate::ledger::Ledger;
use crate::registry::CandidateRegistry;
use crate::types::{Address, Amount, CandidateCode};

/// Candidate code recorded only in the null-vote counter.
pub const NULL_VOTE: CandidateCode = 0;
pub const MIN_ELIGIBLE_BALANCE: Amount = 1;
pub const MAX_ELIGIBLE_BALANCE: Amount = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Office {
    President,
    Councillor,
    Representative,
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Office::President => "president",
            Office::Councillor => "councillor",
            Office::Representative => "representative",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfficeVote {
    pub voted: bool,
    pub code: CandidateCode,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRecord {
    pub president: OfficeVote,
    pub councillor: OfficeVote,
    pub representative: OfficeVote,
}

impl VoteRecord {
    pub fn office(&self, office: Office) -> &OfficeVote {
        match office {
            Office::President => &self.president,
            Office::Councillor => &self.councillor,
            Office::Representative => &self.representative,
        }
    }

    fn mark(&mut self, office: Office, code: CandidateCode) {
        let slot = match office {
            Office::President => &mut self.president,
            Office::Councillor => &mut self.councillor,
            Office::Representative => &mut self.representative,
        };
        slot.voted = true;
        slot.code = code;
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRecorder {
    records: BTreeMap<Address, VoteRecord>,
    null_votes: u64,
}

impl VoteRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null_vote_count(&self) -> u64 {
        self.null_votes
    }

    pub fn record(&self, voter: &Address) -> VoteRecord {
        self.records.get(voter).copied().unwrap_or_default()
    }

    /// Open presidential vote: no eligibility or repeat check, and the
    /// candidate is credited one unit without debiting the voter. Code `0`
    /// only bumps the null-vote counter and is accepted while paused; any
    /// other code fails with `ContractPaused` while paused. Returns the
    /// candidate's new balance (`0` for a null vote).
    pub fn cast_presidential_vote(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        registry: &CandidateRegistry,
        caller: Address,
        code: CandidateCode,
    ) -> ContractResult<Amount> {
        if code == NULL_VOTE {
            self.null_votes = self
                .null_votes
                .checked_add(1)
                .ok_or(ContractError::ArithmeticOverflow)?;
            debug!(voter = %caller, total = self.null_votes, "null vote");
            return Ok(0);
        }
        access.require_not_paused()?;
        let candidate = resolve_candidate(registry, code)?;
        let balance = ledger.credit(candidate, 1)?;
        self.records
            .entry(caller)
            .or_default()
            .mark(Office::President, code);
        debug!(voter = %caller, code, %candidate, balance, "open presidential vote");
        Ok(balance)
    }

    /// Moves one bare unit from the voter to the candidate.
    pub fn cast_guarded_presidential_vote(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        registry: &CandidateRegistry,
        caller: Address,
        code: CandidateCode,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        self.cast_guarded(access, ledger, registry, caller, code, Office::President, events)
    }

    /// Gated on the presidential flag, not the councillor one; moves one
    /// decimal-scaled unit.
    pub fn cast_councillor_vote(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        registry: &CandidateRegistry,
        caller: Address,
        code: CandidateCode,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        self.cast_guarded(access, ledger, registry, caller, code, Office::Councillor, events)
    }

    /// Same gating and scale as [`Self::cast_councillor_vote`].
    pub fn cast_representative_vote(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        registry: &CandidateRegistry,
        caller: Address,
        code: CandidateCode,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        self.cast_guarded(
            access,
            ledger,
            registry,
            caller,
            code,
            Office::Representative,
            events,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn cast_guarded(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        registry: &CandidateRegistry,
        caller: Address,
        code: CandidateCode,
        office: Office,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        access.require_not_paused()?;
        let balance = ledger.balance_of(&caller);
        if !(MIN_ELIGIBLE_BALANCE..=MAX_ELIGIBLE_BALANCE).contains(&balance) {
            return Err(ContractError::NotEligible {
                voter: caller,
                balance,
            });
        }
        // every office checks the presidential flag
        if self.record(&caller).president.voted {
            return Err(ContractError::AlreadyVoted {
                voter: caller,
                office: Office::President,
            });
        }
        let candidate = resolve_candidate(registry, code)?;
        let cost = match office {
            Office::President => 1,
            Office::Councillor | Office::Representative => ledger.unit()?,
        };
        ledger.move_units(caller, candidate, cost)?;
        self.records.entry(caller).or_default().mark(office, code);
        events.push(Event::Transfer {
            from: caller,
            to: candidate,
            value: cost,
        });
        debug!(voter = %caller, %office, code, %candidate, cost, "vote recorded");
        Ok(true)
    }

    pub(crate) fn leaves(&self) -> Vec<[u8; 32]> {
        let mut leaves: Vec<[u8; 32]> = Vec::with_capacity(self.records.len() + 1);
        let mut hasher = Sha256::new();
        hasher.update(b"null-votes");
        hasher.update(self.null_votes.to_le_bytes());
        leaves.push(hasher.finalize().into());
        for (voter, record) in &self.records {
            let mut hasher = Sha256::new();
            hasher.update(b"vote");
            hasher.update(voter.as_bytes());
            for slot in [record.president, record.councillor, record.representative] {
                hasher.update([slot.voted as u8]);
                hasher.update(slot.code.to_le_bytes());
            }
            leaves.push(hasher.finalize().into());
        }
        leaves
    }
}

fn resolve_candidate(registry: &CandidateRegistry, code: CandidateCode) -> ContractResult<Address> {
    let candidate = registry.resolve(code);
    if candidate.is_zero() {
        return Err(ContractError::InvalidAddress("candidate code is not registered"));
    }
    Ok(candidate)
}
