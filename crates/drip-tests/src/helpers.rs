//! Shared fixtures for integration tests.

use std::sync::Arc;

use drip_core::clock::ManualClock;
use drip_core::constants::UNIT;
use drip_core::traits::AllowList;
use drip_core::types::{Address, Amount, PoolId, Timestamp};
use drip_issuance::{IssuanceLedger, LedgerConfig, PoolParams};

pub use drip_core::traits::Clock;

/// Deployment time used by every fixture.
pub const GENESIS: Timestamp = 1_700_000_000;

/// The only actor admitted by fixture ledgers.
pub const OWNER: Address = Address([0xA0; 20]);

/// Pool standing in for the native-asset stability pool.
pub const ETH_POOL: PoolId = Address([0x01; 20]);

/// Pool standing in for an ERC-20 collateral pool.
pub const ERC20_POOL: PoolId = Address([0x02; 20]);

/// Per-pool cap used by the deployment fixture: 32M tokens.
pub const POOL_CAP: Amount = 32_000_000 * UNIT;

pub const ETH_WEEKLY: Amount = 1_000 * UNIT;
pub const ERC20_WEEKLY: Amount = 500 * UNIT;

/// A ledger together with the clock driving it.
pub struct Fixture {
    pub ledger: IssuanceLedger,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    /// Empty ledger owned by [`OWNER`].
    pub fn empty(config: LedgerConfig) -> Self {
        let clock = Arc::new(ManualClock::new(GENESIS));
        let ledger = IssuanceLedger::new(config, clock.clone(), Arc::new(AllowList::owner(OWNER)))
            .expect("fixture config is valid");
        Self { ledger, clock }
    }

    /// Two pools with [`POOL_CAP`] each, at [`ETH_WEEKLY`] and
    /// [`ERC20_WEEKLY`].
    pub fn deployed() -> Self {
        let fixture = Self::empty(LedgerConfig::default());
        fixture.register(ETH_POOL, POOL_CAP, ETH_WEEKLY);
        fixture.register(ERC20_POOL, POOL_CAP, ERC20_WEEKLY);
        fixture
    }

    pub fn register(&self, pool: PoolId, cap: Amount, weekly: Amount) {
        self.ledger
            .register_pool(
                &OWNER,
                pool,
                PoolParams {
                    supply_cap: Some(cap),
                    weekly_distribution: weekly,
                },
            )
            .expect("fixture pool registers");
    }

    pub fn set_weekly(&self, pool: &PoolId, weekly: Amount) -> Amount {
        self.ledger
            .set_weekly_distribution(&OWNER, pool, weekly)
            .expect("owner may set rates")
    }

    pub fn advance(&self, secs: u64) -> Timestamp {
        self.clock.advance(secs)
    }

    /// Issue from `pool` every `step` seconds until `duration` has passed.
    /// Returns the sum of all issued deltas.
    pub fn issue_repeatedly(&self, pool: &PoolId, step: u64, duration: u64) -> Amount {
        let start = self.clock.now();
        let mut total: Amount = 0;
        while self.clock.now() - start < duration {
            self.clock.advance(step);
            total += self.ledger.issue(pool).expect("issue succeeds");
        }
        total
    }
}

/// Absolute difference of two amounts.
pub fn diff(a: Amount, b: Amount) -> Amount {
    a.abs_diff(b)
}
