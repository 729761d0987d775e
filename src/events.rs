use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount};

/// Append-only log entries for external observers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    Pause,
    Unpause,
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "crate::types::amount_str")]
        value: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "crate::types::amount_str")]
        value: Amount,
    },
}

pub type EventLog = Vec<Event>;
