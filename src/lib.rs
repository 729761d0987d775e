//! Balance ledger with owner-controlled pause, delegated allowances and a
//! voting layer that spends balances as voting credits.
//!
//! [`BallotContract`] is the entry point: every mutating call takes the
//! caller's [`Address`] explicitly and either commits fully or changes
//! nothing.

pub mod access;
pub mod config;
pub mod contracts;
pub mod error;
pub mod events;
pub mod ledger;
pub mod math;
pub mod receipt;
pub mod registry;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod voting;

pub use config::{CandidateSeed, GenesisConfig};
pub use contracts::{BallotContract, CallOutput, ContractCall, ContractSnapshot};
pub use error::{ContractError, ContractResult};
pub use events::Event;
pub use receipt::{Receipt, ReceiptOutcome};
pub use store::StateFile;
pub use types::{Address, Amount, CandidateCode};
pub use voting::{Office, VoteRecord};
