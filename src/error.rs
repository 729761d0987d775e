use crate::math::ArithmeticError;
use crate::types::{Address, Amount};
use crate::voting::Office;

/// Outcome of a rejected contract call. A call that returns one of these
/// changed no state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("caller {caller} is not the owner")]
    Unauthorized { caller: Address },
    #[error("contract is paused")]
    ContractPaused,
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("invalid address: {0}")]
    InvalidAddress(&'static str),
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("arithmetic underflow")]
    ArithmeticUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("insufficient balance in account {account}: have {have}, need {need}")]
    InsufficientBalance {
        account: Address,
        have: Amount,
        need: Amount,
    },
    #[error("insufficient allowance from {owner} to {spender}: have {have}, need {need}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        have: Amount,
        need: Amount,
    },
    #[error("voter {voter} is not eligible with balance {balance}")]
    NotEligible { voter: Address, balance: Amount },
    #[error("voter {voter} already voted ({office} flag set)")]
    AlreadyVoted { voter: Address, office: Office },
}

impl From<ArithmeticError> for ContractError {
    fn from(err: ArithmeticError) -> Self {
        match err {
            ArithmeticError::Overflow => ContractError::ArithmeticOverflow,
            ArithmeticError::Underflow => ContractError::ArithmeticUnderflow,
            ArithmeticError::DivisionByZero => ContractError::DivisionByZero,
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;
