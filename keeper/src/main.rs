//! Tranche Pool Keeper
//!
//! Drives a pool through a configured scenario: runs the permissionless
//! crank every period and replays snapshot history for the participants
//! furthest behind, then closes the pool and drains it.

mod config;
mod priority_queue;
mod report;
mod scenario;

use anyhow::Result;
use config::Config;
use scenario::Scenario;
use std::time::Duration;
use tokio::time;

/// Simulated clock origin
const SCENARIO_START: u64 = 1_700_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Tranche Pool Keeper");

    if std::env::args().any(|a| a == "--init") {
        return Config::write_default("keeper-config.toml");
    }

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default scenario", e);
        Config::default_scenario()
    });

    let mut scenario = Scenario::new(&config, SCENARIO_START)?;
    log::info!(
        "Pool {} active with {} lenders, simulating {} periods",
        scenario.pool().address(),
        scenario.lenders().len(),
        config.periods
    );

    let mut interval = time::interval(Duration::from_millis(config.tick_interval_ms.max(1)));
    let mut drain_ticks = 0u64;

    loop {
        interval.tick().await;

        match scenario.tick() {
            Ok(summary) => log::debug!("Tick {}: {:?}", scenario.ticks(), summary),
            Err(e) => log::error!("Error running tick {}: {:#}", scenario.ticks(), e),
        }

        if !scenario.is_closed() {
            if scenario.ticks() >= config.periods {
                if let Err(e) = scenario.close() {
                    log::error!("Error closing pool: {:#}", e);
                    break;
                }
            }
            continue;
        }

        drain_ticks += 1;
        if scenario.drained() {
            log::info!("Pool drained {} ticks after close", drain_ticks);
            break;
        }
        if drain_ticks >= config.drain_ticks {
            log::warn!("Pool not drained after {} ticks, stopping", drain_ticks);
            break;
        }
    }

    if !scenario.pool().invariants_hold() {
        log::error!("Withdrawal accounting drifted from the vault");
    }

    let report = scenario.report();
    for lender in &report.lenders {
        log::info!(
            "{}: deposited {}, redeemed {}, {} shares left",
            lender.name,
            lender.deposited,
            lender.redeemed,
            lender.shares_left
        );
    }
    report.write(&config.report_path)?;

    log::info!("Keeper finished at t={}", scenario.now());
    Ok(())
}
