//! # drip-core
//! Foundation types, checked arithmetic and trait seams for the Drip
//! issuance ledger.

pub mod clock;
pub mod constants;
pub mod error;
pub mod math;
pub mod traits;
pub mod types;

pub use clock::{ManualClock, SystemClock};
pub use traits::{AllowAll, AllowList, Authorizer, Clock};
pub use types::{ActorId, Address, Amount, PoolId, Timestamp};
