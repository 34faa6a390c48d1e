//! Trait interfaces for the collaborators the ledger depends on.
//!
//! - [`Clock`]: trusted, monotonically non-decreasing time source
//! - [`Authorizer`]: capability check for administrative operations

use std::collections::HashSet;

use crate::types::{ActorId, Timestamp};

/// Source of the current time.
///
/// The ledger never reads wall-clock time itself; it asks the clock it was
/// constructed with. Implementations must never return a value smaller than
/// one they returned before.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Authorization gate for rate changes and supply management.
pub trait Authorizer: Send + Sync {
    /// Whether `actor` may perform administrative operations.
    fn is_authorized(&self, actor: &ActorId) -> bool;
}

/// Authorizer that admits every actor. Intended for simulations and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized(&self, _actor: &ActorId) -> bool {
        true
    }
}

/// Authorizer backed by a fixed set of admitted actors.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    admitted: HashSet<ActorId>,
}

impl AllowList {
    pub fn new(admitted: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admitted: admitted.into_iter().collect(),
        }
    }

    /// Allow list containing a single owner.
    pub fn owner(owner: ActorId) -> Self {
        Self::new([owner])
    }

    pub fn len(&self) -> usize {
        self.admitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }
}

impl Authorizer for AllowList {
    fn is_authorized(&self, actor: &ActorId) -> bool {
        self.admitted.contains(actor)
    }
}
