//! The issuance ledger: registry of pools and the operations on them.
//!
//! [`IssuanceLedger`] owns every [`PoolRecord`]. Each record lives behind its
//! own `parking_lot::Mutex`, held in a `DashMap` keyed by pool id. The map
//! guard is always dropped before a pool lock is taken, so calls on different
//! pools proceed in parallel.
//!
//! Lock order: pool locks first (ascending [`PoolId`] when two are needed),
//! then the global supply lock if a global cap is configured. The global lock
//! is only held to check and commit the shared counter; accrual is computed
//! against a copy taken beforehand and recomputed if the room moved.
//!
//! Every mutating operation computes the complete next state before writing
//! anything back. A failure at any point leaves the ledger untouched.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use drip_core::error::{LedgerError, MathError};
use drip_core::math::{checked_add, checked_sub};
use drip_core::traits::{Authorizer, Clock};
use drip_core::types::{ActorId, Amount, PoolId, Timestamp};

use crate::config::LedgerConfig;
use crate::pool::{PoolParams, PoolRecord};
use crate::schedule::Schedule;
use crate::snapshot::{LedgerSnapshot, PoolEntry};

/// Issuance shared by all pools under a global cap.
///
/// `reserved` mirrors the pools' carried amounts, so the room left is
/// `cap - issued - reserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GlobalSupply {
    cap: Amount,
    issued: Amount,
    reserved: Amount,
}

impl GlobalSupply {
    fn remaining(&self) -> Result<Amount, MathError> {
        checked_sub(self.cap, checked_add(self.issued, self.reserved)?)
    }

    fn with_reserved(self, fresh: Amount) -> Result<Self, MathError> {
        Ok(Self {
            reserved: checked_add(self.reserved, fresh)?,
            ..self
        })
    }

    /// A pool paid out its `carried` amount plus `fresh` accrual.
    fn with_paid(self, carried: Amount, fresh: Amount) -> Result<Self, MathError> {
        Ok(Self {
            issued: checked_add(self.issued, checked_add(carried, fresh)?)?,
            reserved: checked_sub(self.reserved, carried)?,
            ..self
        })
    }
}

/// A pool record after reconciliation, not yet written back.
struct Reconciled {
    record: PoolRecord,
    global: Option<GlobalSupply>,
    fresh: Amount,
}

/// Per-pool time-based issuance ledger.
pub struct IssuanceLedger {
    config: LedgerConfig,
    schedule: Schedule,
    clock: Arc<dyn Clock>,
    authorizer: Arc<dyn Authorizer>,
    pools: DashMap<PoolId, Arc<Mutex<PoolRecord>>>,
    global: Option<Mutex<GlobalSupply>>,
}

impl std::fmt::Debug for IssuanceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuanceLedger")
            .field("config", &self.config)
            .field("pools", &self.pools.len())
            .finish()
    }
}

impl IssuanceLedger {
    /// Create an empty ledger.
    pub fn new(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let schedule = Schedule::new(config.accrual_interval_secs)?;
        let global = config.global_supply_cap.map(|cap| {
            Mutex::new(GlobalSupply {
                cap,
                issued: 0,
                reserved: 0,
            })
        });
        Ok(Self {
            config,
            schedule,
            clock,
            authorizer,
            pools: DashMap::new(),
            global,
        })
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Every record is checked, and the global issued counter is recomputed
    /// from the pools rather than trusted.
    pub fn restore(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        authorizer: Arc<dyn Authorizer>,
        snapshot: LedgerSnapshot,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(config, clock, authorizer)?;
        let now = ledger.clock.now();
        let mut issued: Amount = 0;
        let mut reserved: Amount = 0;

        for PoolEntry { pool, record } in snapshot.pools {
            record
                .check()
                .map_err(|e| LedgerError::Snapshot(format!("pool {pool}: {e}")))?;
            if record.last_update_time > now {
                return Err(LedgerError::Snapshot(format!(
                    "pool {pool}: last update {} is ahead of clock {now}",
                    record.last_update_time
                )));
            }
            issued = checked_add(issued, record.total_issued)?;
            reserved = checked_add(reserved, record.carried)?;
            match ledger.pools.entry(pool) {
                Entry::Occupied(_) => {
                    return Err(LedgerError::Snapshot(format!("duplicate pool {pool}")));
                }
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(Mutex::new(record)));
                }
            }
        }

        if let Some(global) = ledger.global.as_mut() {
            let global = global.get_mut();
            let committed = checked_add(issued, reserved)?;
            if committed > global.cap {
                return Err(LedgerError::Snapshot(format!(
                    "pools issued {issued} and carry {reserved}, above global cap {}",
                    global.cap
                )));
            }
            global.issued = issued;
            global.reserved = reserved;
        }

        info!(pools = ledger.pools.len(), taken_at = snapshot.taken_at, "ledger: restored");
        Ok(ledger)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Current time as reported by the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // -------------------------------------------------------------------------
    // Registration and rate setting
    // -------------------------------------------------------------------------

    /// Register a new pool, starting accrual at the current time.
    pub fn register_pool(
        &self,
        actor: &ActorId,
        pool: PoolId,
        params: PoolParams,
    ) -> Result<(), LedgerError> {
        self.authorize(actor)?;
        let now = self.clock.now();
        let cap = params.supply_cap.unwrap_or(self.config.default_pool_cap);
        let record = PoolRecord::new(now, cap, params.weekly_distribution);

        match self.pools.entry(pool) {
            Entry::Occupied(_) => Err(LedgerError::PoolAlreadyRegistered(pool)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(record)));
                info!(%pool, cap, weekly = params.weekly_distribution, now, "ledger: pool registered");
                Ok(())
            }
        }
    }

    /// Change a pool's weekly distribution rate.
    ///
    /// Accrual up to now is reconciled at the old rate first and carried
    /// until the next [`issue`](Self::issue). `total_issued` is unchanged.
    /// Returns the reconciled amount.
    pub fn set_weekly_distribution(
        &self,
        actor: &ActorId,
        pool: &PoolId,
        weekly_distribution: Amount,
    ) -> Result<Amount, LedgerError> {
        self.authorize(actor)?;
        let cell = self.cell(pool)?;
        let mut record = cell.lock();
        let mut global = self.lock_global();
        let now = self.clock.now();

        let mut pending = self.reconcile(&record, global.as_deref(), now)?;
        let previous = pending.record.weekly_distribution;
        pending.record.weekly_distribution = weekly_distribution;
        let fresh = pending.fresh;
        Self::commit(&mut record, global.as_deref_mut(), pending);

        info!(%pool, previous, weekly = weekly_distribution, reconciled = fresh, now, "ledger: weekly distribution set");
        Ok(fresh)
    }

    // -------------------------------------------------------------------------
    // Issuance
    // -------------------------------------------------------------------------

    /// Amount [`issue`](Self::issue) would return if called now. Read-only.
    pub fn get_last_update_token_distribution(&self, pool: &PoolId) -> Result<Amount, LedgerError> {
        let cell = self.cell(pool)?;
        let record = cell.lock();
        let now = self.clock.now();

        let room = Self::global_room(self.global_view().as_ref())?;
        let step = record.step(&self.schedule, now, room)?;
        Ok(checked_add(record.carried, step.fresh)?)
    }

    /// Accrue a pool up to now and return the newly issuable amount.
    ///
    /// The amount includes anything carried from earlier reconciliations,
    /// which moves into `total_issued` here. This is the only call that
    /// changes `total_issued`. A pool at its cap pays out only what it
    /// carries, and its cursor stays put.
    pub fn issue(&self, pool: &PoolId) -> Result<Amount, LedgerError> {
        let cell = self.cell(pool)?;
        let mut record = cell.lock();
        let now = self.clock.now();

        let seen = Self::global_room(self.global_view().as_ref())?;
        let mut step = record.step(&self.schedule, now, seen)?;

        let mut global = self.lock_global();
        let room = Self::global_room(global.as_deref())?;
        if room != seen {
            step = record.step(&self.schedule, now, room)?;
        }

        let (next, payout) = record.paid_out(&step)?;
        let next_global = global
            .as_deref()
            .map(|g| g.with_paid(record.carried, step.fresh))
            .transpose()?;

        *record = next;
        if let (Some(g), Some(next)) = (global.as_deref_mut(), next_global) {
            *g = next;
        }

        if step.exhausted {
            debug!(%pool, payout, total = record.total_issued, "ledger: pool at cap");
        } else {
            debug!(%pool, fresh = step.fresh, payout, total = record.total_issued, now, "ledger: issued");
        }
        Ok(payout)
    }

    // -------------------------------------------------------------------------
    // Supply management
    // -------------------------------------------------------------------------

    /// Raise a pool's supply cap by `amount`. Returns the new cap.
    pub fn add_supply(
        &self,
        actor: &ActorId,
        pool: &PoolId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.authorize(actor)?;
        let cell = self.cell(pool)?;
        let mut record = cell.lock();
        let mut global = self.lock_global();
        let now = self.clock.now();

        let mut pending = self.reconcile(&record, global.as_deref(), now)?;
        pending.record.supply_cap = checked_add(pending.record.supply_cap, amount)?;
        let cap = pending.record.supply_cap;
        Self::commit(&mut record, global.as_deref_mut(), pending);

        info!(%pool, amount, cap, "ledger: supply added");
        Ok(cap)
    }

    /// Lower a pool's supply cap by `amount`. Returns the new cap.
    ///
    /// Fails with [`LedgerError::InsufficientSupply`] if the cap would drop
    /// below what the pool has already issued.
    pub fn remove_supply(
        &self,
        actor: &ActorId,
        pool: &PoolId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.authorize(actor)?;
        let cell = self.cell(pool)?;
        let mut record = cell.lock();
        let mut global = self.lock_global();
        let now = self.clock.now();

        let mut pending = self.reconcile(&record, global.as_deref(), now)?;
        pending.record.supply_cap = Self::shrunk_cap(pool, &pending.record, amount)?;
        let cap = pending.record.supply_cap;
        Self::commit(&mut record, global.as_deref_mut(), pending);

        info!(%pool, amount, cap, "ledger: supply removed");
        Ok(cap)
    }

    /// Move `amount` of unissued cap from one pool to another.
    pub fn transfer_supply(
        &self,
        actor: &ActorId,
        from: &PoolId,
        to: &PoolId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.authorize(actor)?;
        if from == to {
            return Err(LedgerError::SamePool(*from));
        }
        let from_cell = self.cell(from)?;
        let to_cell = self.cell(to)?;

        let (mut src, mut dst);
        if from < to {
            src = from_cell.lock();
            dst = to_cell.lock();
        } else {
            dst = to_cell.lock();
            src = from_cell.lock();
        }
        let mut global = self.lock_global();
        let now = self.clock.now();

        let mut out = self.reconcile(&src, global.as_deref(), now)?;
        let mut into = self.reconcile(&dst, out.global.as_ref(), now)?;
        out.record.supply_cap = Self::shrunk_cap(from, &out.record, amount)?;
        into.record.supply_cap = checked_add(into.record.supply_cap, amount)?;

        // `into.global` already includes the source pool's reconciliation.
        out.global = None;
        Self::commit(&mut src, None, out);
        Self::commit(&mut dst, global.as_deref_mut(), into);

        info!(%from, %to, amount, "ledger: supply transferred");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------------

    pub fn total_issued(&self, pool: &PoolId) -> Result<Amount, LedgerError> {
        self.read(pool, |r| r.total_issued)
    }

    pub fn last_update_time(&self, pool: &PoolId) -> Result<Timestamp, LedgerError> {
        self.read(pool, |r| r.last_update_time)
    }

    pub fn weekly_distribution(&self, pool: &PoolId) -> Result<Amount, LedgerError> {
        self.read(pool, |r| r.weekly_distribution)
    }

    pub fn supply_cap(&self, pool: &PoolId) -> Result<Amount, LedgerError> {
        self.read(pool, |r| r.supply_cap)
    }

    /// Copy of a pool's full record.
    pub fn pool(&self, pool: &PoolId) -> Result<PoolRecord, LedgerError> {
        self.read(pool, PoolRecord::clone)
    }

    pub fn contains_pool(&self, pool: &PoolId) -> bool {
        self.pools.contains_key(pool)
    }

    /// All registered pool ids, sorted.
    pub fn pool_ids(&self) -> Vec<PoolId> {
        let mut ids: Vec<PoolId> = self.pools.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Issued total across pools under the global cap, if one is configured.
    /// Carried amounts are not included until they are issued.
    pub fn global_issued(&self) -> Option<Amount> {
        self.global_view().map(|g| g.issued)
    }

    /// Export every pool record, sorted by pool id.
    ///
    /// Pools are locked one at a time, so a snapshot taken while other
    /// threads issue is consistent per pool but not across pools.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let pools = self
            .pool_ids()
            .into_iter()
            .filter_map(|pool| {
                self.pool(&pool)
                    .ok()
                    .map(|record| PoolEntry { pool, record })
            })
            .collect();
        LedgerSnapshot {
            taken_at: self.clock.now(),
            pools,
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn authorize(&self, actor: &ActorId) -> Result<(), LedgerError> {
        if self.authorizer.is_authorized(actor) {
            Ok(())
        } else {
            warn!(%actor, "ledger: unauthorized actor rejected");
            Err(LedgerError::Unauthorized { actor: *actor })
        }
    }

    /// Clone the pool's cell out of the map so the shard guard is released
    /// before the pool lock is taken.
    fn cell(&self, pool: &PoolId) -> Result<Arc<Mutex<PoolRecord>>, LedgerError> {
        self.pools
            .get(pool)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::UnknownPool(*pool))
    }

    fn read<T>(&self, pool: &PoolId, f: impl FnOnce(&PoolRecord) -> T) -> Result<T, LedgerError> {
        let cell = self.cell(pool)?;
        let record = cell.lock();
        Ok(f(&record))
    }

    fn lock_global(&self) -> Option<MutexGuard<'_, GlobalSupply>> {
        self.global.as_ref().map(|g| g.lock())
    }

    /// Copy of the global counter. The lock is released on return.
    fn global_view(&self) -> Option<GlobalSupply> {
        self.global.as_ref().map(|g| *g.lock())
    }

    fn global_room(global: Option<&GlobalSupply>) -> Result<Amount, MathError> {
        global.map_or(Ok(Amount::MAX), GlobalSupply::remaining)
    }

    /// Fold accrual up to `now` into a copy of `record` as a carried amount,
    /// reserving it against the global cap.
    fn reconcile(
        &self,
        record: &PoolRecord,
        global: Option<&GlobalSupply>,
        now: Timestamp,
    ) -> Result<Reconciled, LedgerError> {
        let step = record.step(&self.schedule, now, Self::global_room(global)?)?;
        let next = record.reconciled(&step)?;
        let global = global.map(|g| g.with_reserved(step.fresh)).transpose()?;
        Ok(Reconciled {
            record: next,
            global,
            fresh: step.fresh,
        })
    }

    fn commit(record: &mut PoolRecord, global: Option<&mut GlobalSupply>, pending: Reconciled) {
        *record = pending.record;
        if let (Some(g), Some(next)) = (global, pending.global) {
            *g = next;
        }
    }

    fn shrunk_cap(pool: &PoolId, record: &PoolRecord, amount: Amount) -> Result<Amount, LedgerError> {
        let available = record.remaining()?;
        if amount > available {
            return Err(LedgerError::InsufficientSupply {
                pool: *pool,
                requested: amount,
                available,
            });
        }
        Ok(checked_sub(record.supply_cap, amount)?)
    }
}
