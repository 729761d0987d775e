//! Owner identity and the pause switch.
//!
//! [`AccessControl::require_not_paused`] is the single gate every pausable
//! operation calls before touching state.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ContractError, ContractResult};
use crate::events::{Event, EventLog};
use crate::types::Address;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessControl {
    owner: Address,
    paused: bool,
}

impl AccessControl {
    /// The deploying identity becomes the owner; the contract starts unpaused.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            paused: false,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn require_owner(&self, caller: Address) -> ContractResult<()> {
        if caller != self.owner {
            return Err(ContractError::Unauthorized { caller });
        }
        Ok(())
    }

    pub fn require_not_paused(&self) -> ContractResult<()> {
        if self.paused {
            return Err(ContractError::ContractPaused);
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
        events: &mut EventLog,
    ) -> ContractResult<()> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ContractError::InvalidAddress("new owner is the zero address"));
        }
        events.push(Event::OwnershipTransferred {
            previous: self.owner,
            new: new_owner,
        });
        info!(previous = %self.owner, new = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    pub fn pause(&mut self, caller: Address, events: &mut EventLog) -> ContractResult<()> {
        self.require_owner(caller)?;
        if self.paused {
            return Err(ContractError::InvalidState("already paused"));
        }
        self.paused = true;
        events.push(Event::Pause);
        info!(by = %caller, "contract paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address, events: &mut EventLog) -> ContractResult<()> {
        self.require_owner(caller)?;
        if !self.paused {
            return Err(ContractError::InvalidState("not paused"));
        }
        self.paused = false;
        events.push(Event::Unpause);
        info!(by = %caller, "contract unpaused");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::repeat_byte(1)
    }

    #[test]
    fn non_owner_cannot_transfer_ownership() {
        let mut access = AccessControl::new(owner());
        let mut events = Vec::new();
        let intruder = Address::repeat_byte(9);
        let err = access
            .transfer_ownership(intruder, intruder, &mut events)
            .unwrap_err();
        assert_eq!(err, ContractError::Unauthorized { caller: intruder });
        assert_eq!(access.owner(), owner());
        assert!(events.is_empty());
    }

    #[test]
    fn ownership_cannot_go_to_zero() {
        let mut access = AccessControl::new(owner());
        let mut events = Vec::new();
        let err = access
            .transfer_ownership(owner(), Address::ZERO, &mut events)
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidAddress(_)));
        assert_eq!(access.owner(), owner());
    }

    #[test]
    fn ownership_transfer_emits_event() {
        let mut access = AccessControl::new(owner());
        let mut events = Vec::new();
        let next = Address::repeat_byte(2);
        access.transfer_ownership(owner(), next, &mut events).unwrap();
        assert_eq!(access.owner(), next);
        assert_eq!(
            events,
            vec![Event::OwnershipTransferred {
                previous: owner(),
                new: next
            }]
        );
        // the old owner lost its rights
        assert!(access.pause(owner(), &mut events).is_err());
    }

    #[test]
    fn pause_state_machine() {
        let mut access = AccessControl::new(owner());
        let mut events = Vec::new();
        assert!(access.require_not_paused().is_ok());
        assert_eq!(
            access.unpause(owner(), &mut events),
            Err(ContractError::InvalidState("not paused"))
        );

        access.pause(owner(), &mut events).unwrap();
        assert!(access.is_paused());
        assert_eq!(access.require_not_paused(), Err(ContractError::ContractPaused));
        assert_eq!(
            access.pause(owner(), &mut events),
            Err(ContractError::InvalidState("already paused"))
        );

        access.unpause(owner(), &mut events).unwrap();
        assert!(!access.is_paused());
        assert_eq!(events, vec![Event::Pause, Event::Unpause]);
    }

    #[test]
    fn only_owner_pauses() {
        let mut access = AccessControl::new(owner());
        let mut events = Vec::new();
        let other = Address::repeat_byte(3);
        assert_eq!(
            access.pause(other, &mut events),
            Err(ContractError::Unauthorized { caller: other })
        );
        assert!(!access.is_paused());
    }
}
