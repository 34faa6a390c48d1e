//! Integration test suite for the Drip issuance ledger.
//!
//! The tests under `tests/` drive a ledger through a
//! [`ManualClock`](drip_core::ManualClock) so that weeks of accrual run
//! instantly and deterministically.

pub mod helpers;
