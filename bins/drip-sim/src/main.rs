//! Issuance ledger simulator.
//!
//! Replays a JSON scenario against an in-memory ledger on a manual clock,
//! issuing every pool at a fixed step, and prints what each pool paid out.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use drip_core::constants::{SECONDS_PER_DAY, SECONDS_PER_WEEK};

mod scenario;
mod sim;

use scenario::Scenario;
use sim::{format_tokens, Report};

#[derive(Parser, Debug)]
#[command(
    name = "drip-sim",
    version,
    about = "Simulate time-decayed token issuance across pools"
)]
struct Args {
    /// Scenario file (JSON). Runs the built-in two-pool scenario if omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Simulated time span in seconds
    #[arg(long, default_value_t = 4 * SECONDS_PER_WEEK)]
    duration_secs: u64,

    /// Seconds between issue calls
    #[arg(long, default_value_t = SECONDS_PER_DAY)]
    step_secs: u64,

    /// Write the final ledger snapshot (bincode) to this path
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    if let Err(e) = run(args) {
        error!("drip-sim failed: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    info!(
        pools = scenario.pools.len(),
        duration = args.duration_secs,
        step = args.step_secs,
        "sim: starting"
    );

    let report = sim::run(&scenario, args.duration_secs, args.step_secs)?;

    if let Some(path) = &args.snapshot_out {
        write_snapshot(&report, path)?;
        info!(path = %path.display(), "sim: snapshot written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(())
}

fn write_snapshot(report: &Report, path: &Path) -> Result<()> {
    let bytes = report.snapshot.to_bytes()?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write snapshot {}", path.display()))
}

fn print_table(report: &Report) {
    println!(
        "simulated {}s from t={} to t={}",
        report.end_time - report.start_time,
        report.start_time,
        report.end_time
    );
    println!(
        "{:<12} {:>24} {:>24} {:>24} {:>24}",
        "pool", "weekly", "cap", "issued", "paid out"
    );
    for pool in &report.pools {
        println!(
            "{:<12} {:>24} {:>24} {:>24} {:>24}",
            pool.label,
            format_tokens(pool.weekly_distribution),
            format_tokens(pool.supply_cap),
            format_tokens(pool.total_issued),
            format_tokens(pool.paid_out),
        );
    }
    if let Some(global) = report.global_issued {
        println!("global issued: {}", format_tokens(global));
    }
}

/// Initialize tracing with the given level and format.
///
/// `RUST_LOG` takes precedence over `level_str` when set.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_issuance::LedgerSnapshot;

    #[test]
    fn args_defaults() {
        let args = Args::parse_from(["drip-sim"]);
        assert!(args.scenario.is_none());
        assert_eq!(args.duration_secs, 4 * SECONDS_PER_WEEK);
        assert_eq!(args.step_secs, SECONDS_PER_DAY);
        assert_eq!(args.log_level, "warn");
        assert!(!args.json);
    }

    #[test]
    fn args_override() {
        let args = Args::parse_from([
            "drip-sim",
            "--scenario",
            "s.json",
            "--duration-secs",
            "60",
            "--step-secs",
            "10",
            "--snapshot-out",
            "snap.bin",
            "--json",
        ]);
        assert_eq!(args.scenario, Some(PathBuf::from("s.json")));
        assert_eq!(args.duration_secs, 60);
        assert_eq!(args.step_secs, 10);
        assert_eq!(args.snapshot_out, Some(PathBuf::from("snap.bin")));
        assert!(args.json);
    }

    #[test]
    fn snapshot_written_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.snap");
        let report = sim::run(&Scenario::default(), SECONDS_PER_WEEK, SECONDS_PER_DAY).unwrap();

        write_snapshot(&report, &path).unwrap();

        let restored = LedgerSnapshot::from_bytes(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(restored, report.snapshot);
    }

    #[test]
    fn report_serializes_without_snapshot() {
        let report = sim::run(&Scenario::default(), SECONDS_PER_DAY, SECONDS_PER_DAY).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("snapshot"));
        assert!(json.contains(r#""label":"eth""#));
        assert!(json.contains(r#""label":"erc20""#));
    }
}
