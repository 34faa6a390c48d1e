//! Core ledger types: addresses, amounts, timestamps.
//!
//! Amounts are `u128` base units, timestamps are `u64` Unix seconds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token amount in base units.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 20-byte account address.
///
/// Identifies both reward pools ([`PoolId`]) and the actors that administer
/// them ([`ActorId`]).
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Address(pub [u8; 20]);

/// Identifier of a reward pool.
pub type PoolId = Address;

/// Identifier of a caller presented to the authorization gate.
pub type ActorId = Address;

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Derive a stable address from a human-readable label.
    ///
    /// Takes the first 20 bytes of the BLAKE3 hash of the label, so the same
    /// label always maps to the same pool across runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use drip_core::Address;
    /// assert_eq!(Address::from_label("eth"), Address::from_label("eth"));
    /// assert_ne!(Address::from_label("eth"), Address::from_label("erc20"));
    /// ```
    pub fn from_label(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Error parsing an [`Address`] from its hex form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: expected 20 bytes, got {0}")] InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Parse a 40-digit hex string, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 20] = raw
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(raw.len()))?;
        Ok(Self(bytes))
    }
}
