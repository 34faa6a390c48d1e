//! Serializable export of a ledger's pool records.
//!
//! The ledger owns no storage. A host persists [`LedgerSnapshot::to_bytes`]
//! wherever it likes and hands the decoded snapshot back to
//! [`IssuanceLedger::restore`](crate::IssuanceLedger::restore) on restart.

use serde::{Deserialize, Serialize};

use drip_core::error::LedgerError;
use drip_core::types::{PoolId, Timestamp};

use crate::pool::PoolRecord;

/// One pool in a snapshot.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct PoolEntry {
    pub pool: PoolId,
    pub record: PoolRecord,
}

/// All pool records of a ledger at a point in time, sorted by pool id.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct LedgerSnapshot {
    /// Clock reading when the snapshot was taken.
    pub taken_at: Timestamp,
    pub pools: Vec<PoolEntry>,
}

impl LedgerSnapshot {
    /// Encode with bincode's standard configuration.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Decode bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// Trailing bytes after a complete snapshot are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let (snapshot, read): (Self, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if read != bytes.len() {
            return Err(LedgerError::Snapshot(format!(
                "{} trailing bytes",
                bytes.len() - read
            )));
        }
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
