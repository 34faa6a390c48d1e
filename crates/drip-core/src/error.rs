//! Error types for the Drip ledger.
use thiserror::Error;

use crate::types::{ActorId, Amount, PoolId, Timestamp};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("arithmetic overflow")] Overflow,
    #[error("arithmetic underflow")] Underflow,
    #[error("division by zero")] DivisionByZero,
}

/// Errors surfaced by ledger operations. Every variant aborts the call with
/// no state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Math(#[from] MathError),

    /// The authorization gate rejected the caller.
    #[error("unauthorized actor: {actor}")]
    Unauthorized { actor: ActorId },

    #[error("unknown pool: {0}")]
    UnknownPool(PoolId),

    #[error("pool already registered: {0}")]
    PoolAlreadyRegistered(PoolId),

    /// The clock reported a time earlier than the pool's cursor.
    #[error("clock went backwards: last update {last}, now {now}")]
    ClockWentBackwards { last: Timestamp, now: Timestamp },

    #[error("insufficient supply in {pool}: requested {requested}, available {available}")]
    InsufficientSupply {
        pool: PoolId,
        requested: Amount,
        available: Amount,
    },

    #[error("source and destination pool are the same: {0}")]
    SamePool(PoolId),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("snapshot: {0}")]
    Snapshot(String),
}
