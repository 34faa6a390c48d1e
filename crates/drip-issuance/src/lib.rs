//! # drip-issuance
//! Time-based reward issuance ledger.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Linear accrual**: each pool accrues `weekly_distribution` per
//!   [`SECONDS_PER_WEEK`](drip_core::constants::SECONDS_PER_WEEK), floored
//!   at every computation so the ledger never over-issues.
//! - **Hard caps**: cumulative issuance per pool never exceeds its supply
//!   cap; an optional global cap bounds the sum across pools.
//! - **Rate changes**: a new weekly rate only applies to time after the
//!   change; accrual up to that instant is reconciled at the old rate.
//! - **Per-pool locking**: each pool record has its own lock, so pools never
//!   wait on each other.

pub mod config;
pub mod ledger;
pub mod pool;
pub mod schedule;
pub mod snapshot;

pub use config::LedgerConfig;
pub use ledger::IssuanceLedger;
pub use pool::{PoolParams, PoolRecord};
pub use schedule::Schedule;
pub use snapshot::LedgerSnapshot;
