//! Error types for the pool

use pool_model::{MathError, WithdrawError};
use thiserror::Error;

/// Failure reported by an external collaborator (token, first-loss escrow)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransferError(pub String);

impl TransferError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("operation is invalid in the current lifecycle state")]
    InvalidLifecycleState,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("unauthorized")]
    Unauthorized,
    #[error("pool is insolvent: shares outstanding with zero assets")]
    Insolvent,
    #[error("cancellation exceeds pending request")]
    InvalidCancellation,
    #[error("loan is not in a valid state for this operation")]
    InvalidLoanState,
    #[error("invalid settings")]
    InvalidSettings,
    #[error("fee not due")]
    FeeNotDue,
    #[error("clock reads before activation or earlier than the last admission run")]
    ClockAnomaly,
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl From<MathError> for PoolError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::Insolvent => PoolError::Insolvent,
        }
    }
}

impl From<WithdrawError> for PoolError {
    fn from(e: WithdrawError) -> Self {
        match e {
            WithdrawError::InvalidCancellation => PoolError::InvalidCancellation,
        }
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
