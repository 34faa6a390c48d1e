//! Criterion benchmarks for drip-issuance hot paths.
//!
//! Covers: the accrual formula, a single `issue` call, and pending reads.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drip_core::clock::ManualClock;
use drip_core::constants::{SECONDS_PER_WEEK, UNIT};
use drip_core::traits::AllowAll;
use drip_core::types::Address;
use drip_issuance::{IssuanceLedger, LedgerConfig, PoolParams, Schedule};

fn bench_accrual(c: &mut Criterion) {
    let schedule = Schedule::new(1).unwrap();
    let weekly = 8_000_000 * UNIT;

    c.bench_function("accrual_formula", |b| {
        b.iter(|| schedule.accrued(black_box(weekly), black_box(3 * SECONDS_PER_WEEK / 2)))
    });
}

fn bench_issue(c: &mut Criterion) {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let ledger = IssuanceLedger::new(LedgerConfig::default(), clock.clone(), Arc::new(AllowAll))
        .unwrap();
    let pool = Address::from_label("bench");
    ledger
        .register_pool(
            &Address::ZERO,
            pool,
            PoolParams {
                supply_cap: Some(u128::MAX),
                weekly_distribution: UNIT,
            },
        )
        .unwrap();

    c.bench_function("issue_one_minute", |b| {
        b.iter(|| {
            clock.advance(60);
            ledger.issue(black_box(&pool))
        })
    });

    c.bench_function("pending_distribution", |b| {
        b.iter(|| ledger.get_last_update_token_distribution(black_box(&pool)))
    });
}

criterion_group!(benches, bench_accrual, bench_issue);
criterion_main!(benches);
