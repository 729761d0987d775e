use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::access::AccessControl;
use crate::error::{ContractError, ContractResult};
use crate::events::{Event, EventLog};
use crate::math;
use crate::types::{Address, Amount};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Balances and allowances. Unknown accounts read as zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    meta: TokenMetadata,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    /// owner -> spender -> remaining allowance
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
}

impl Ledger {
    /// Allocates the whole supply to `holder`.
    pub fn genesis(meta: TokenMetadata, total_supply: Amount, holder: Address) -> Self {
        let mut ledger = Self {
            meta,
            total_supply,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        };
        ledger.set_balance(holder, total_supply);
        ledger
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn symbol(&self) -> &str {
        &self.meta.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.meta.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// One decimal-scaled unit, `10^decimals`.
    pub fn unit(&self) -> ContractResult<Amount> {
        Ok(math::pow10(self.meta.decimals)?)
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<Address, Amount> {
        &self.balances
    }

    pub fn circulating(&self) -> ContractResult<Amount> {
        Ok(math::sum(self.balances.values().copied())?)
    }

    pub fn conservation_holds(&self) -> bool {
        self.circulating()
            .map(|sum| sum == self.total_supply)
            .unwrap_or(false)
    }

    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        value: Amount,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        if to.is_zero() {
            return Err(ContractError::InvalidAddress("transfer to the zero address"));
        }
        self.move_units(caller, to, value)?;
        events.push(Event::Transfer {
            from: caller,
            to,
            value,
        });
        debug!(from = %caller, to = %to, value, "transfer");
        Ok(true)
    }

    pub fn approve(
        &mut self,
        access: &AccessControl,
        caller: Address,
        spender: Address,
        value: Amount,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        access.require_not_paused()?;
        self.set_allowance(caller, spender, value);
        events.push(Event::Approval {
            owner: caller,
            spender,
            value,
        });
        debug!(owner = %caller, spender = %spender, value, "approve");
        Ok(true)
    }

    pub fn allowance(
        &self,
        access: &AccessControl,
        owner: &Address,
        spender: &Address,
    ) -> ContractResult<Amount> {
        access.require_not_paused()?;
        Ok(self.allowance_of(owner, spender))
    }

    pub fn transfer_from(
        &mut self,
        access: &AccessControl,
        caller: Address,
        from: Address,
        to: Address,
        value: Amount,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        access.require_not_paused()?;
        if to.is_zero() {
            return Err(ContractError::InvalidAddress("transfer to the zero address"));
        }
        let allowed = self.allowance_of(&from, &caller);
        let have = self.balance_of(&from);
        math::sub(have, value).map_err(|_| ContractError::InsufficientBalance {
            account: from,
            have,
            need: value,
        })?;
        let remaining =
            math::sub(allowed, value).map_err(|_| ContractError::InsufficientAllowance {
                owner: from,
                spender: caller,
                have: allowed,
                need: value,
            })?;
        self.move_units(from, to, value)?;
        self.set_allowance(from, caller, remaining);
        events.push(Event::Transfer { from, to, value });
        debug!(spender = %caller, from = %from, to = %to, value, "transfer_from");
        Ok(true)
    }

    pub fn increase_approval(
        &mut self,
        access: &AccessControl,
        caller: Address,
        spender: Address,
        added: Amount,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        access.require_not_paused()?;
        let value = math::add(self.allowance_of(&caller, &spender), added)?;
        self.set_allowance(caller, spender, value);
        events.push(Event::Approval {
            owner: caller,
            spender,
            value,
        });
        debug!(owner = %caller, spender = %spender, added, value, "increase_approval");
        Ok(true)
    }

    /// Lowers the allowance, flooring at zero instead of failing.
    pub fn decrease_approval(
        &mut self,
        access: &AccessControl,
        caller: Address,
        spender: Address,
        subtracted: Amount,
        events: &mut EventLog,
    ) -> ContractResult<bool> {
        access.require_not_paused()?;
        let current = self.allowance_of(&caller, &spender);
        let value = math::sub(current, subtracted).unwrap_or(0);
        self.set_allowance(caller, spender, value);
        events.push(Event::Approval {
            owner: caller,
            spender,
            value,
        });
        debug!(owner = %caller, spender = %spender, subtracted, value, "decrease_approval");
        Ok(true)
    }

    /// Credits `to` without a matching debit. Returns the new balance.
    pub fn credit(&mut self, to: Address, value: Amount) -> ContractResult<Amount> {
        let balance = math::add(self.balance_of(&to), value)?;
        self.set_balance(to, balance);
        Ok(balance)
    }

    /// Debits `from` and credits `to`, writing nothing unless both succeed.
    pub(crate) fn move_units(
        &mut self,
        from: Address,
        to: Address,
        value: Amount,
    ) -> ContractResult<()> {
        let have = self.balance_of(&from);
        let new_from = math::sub(have, value).map_err(|_| ContractError::InsufficientBalance {
            account: from,
            have,
            need: value,
        })?;
        let to_balance = if from == to {
            new_from
        } else {
            self.balance_of(&to)
        };
        let new_to = math::add(to_balance, value)?;
        self.set_balance(from, new_from);
        self.set_balance(to, new_to);
        Ok(())
    }

    fn allowance_of(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|by_spender| by_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn set_balance(&mut self, account: Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            if let Some(by_spender) = self.allowances.get_mut(&owner) {
                by_spender.remove(&spender);
                if by_spender.is_empty() {
                    self.allowances.remove(&owner);
                }
            }
        } else {
            self.allowances
                .entry(owner)
                .or_default()
                .insert(spender, amount);
        }
    }

    pub(crate) fn leaves(&self) -> Vec<[u8; 32]> {
        let mut leaves: Vec<[u8; 32]> = Vec::with_capacity(self.balances.len() + 1);
        let mut hasher = Sha256::new();
        hasher.update(b"supply");
        hasher.update(self.total_supply.to_le_bytes());
        leaves.push(hasher.finalize().into());
        for (account, balance) in &self.balances {
            let mut hasher = Sha256::new();
            hasher.update(b"acct");
            hasher.update(account.as_bytes());
            hasher.update(balance.to_le_bytes());
            leaves.push(hasher.finalize().into());
        }
        for (owner, by_spender) in &self.allowances {
            for (spender, amount) in by_spender {
                let mut hasher = Sha256::new();
                hasher.update(b"allowance");
                hasher.update(owner.as_bytes());
                hasher.update(spender.as_bytes());
                hasher.update(amount.to_le_bytes());
                leaves.push(hasher.finalize().into());
            }
        }
        leaves
    }
}

pub(crate) fn build_merkle(mut leaves: Vec<[u8; 32]>) -> [u8; 32] {
    if leaves.is_empty() {
        return Sha256::digest(b"ballot-ledger-empty").into();
    }
    while leaves.len() > 1 {
        let mut next = Vec::with_capacity((leaves.len() + 1) / 2);
        for chunk in leaves.chunks(2) {
            let mut hasher = Sha256::new();
            hasher.update(b"node");
            hasher.update(chunk[0]);
            if chunk.len() == 2 {
                hasher.update(chunk[1]);
            } else {
                hasher.update(chunk[0]);
            }
            next.push(hasher.finalize().into());
        }
        leaves = next;
    }
    leaves[0]
}
