//! Keeper configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tranche_common::PoolSettings;

/// Pool terms as written in the config file
///
/// TOML integers are 64-bit, so amounts are read as `u64` and widened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_capacity: u64,
    pub end_date: u64,
    #[serde(default)]
    pub request_fee_bps: u64,
    #[serde(default)]
    pub request_cancellation_fee_bps: u64,
    pub withdraw_gate_bps: u64,
    pub withdraw_request_period_duration: u64,
    pub first_loss_initial_minimum: u64,
    #[serde(default)]
    pub service_fee_bps: u64,
}

impl PoolConfig {
    pub fn settings(&self) -> PoolSettings {
        PoolSettings {
            max_capacity: self.max_capacity as u128,
            end_date: self.end_date,
            request_fee_bps: self.request_fee_bps as u128,
            request_cancellation_fee_bps: self.request_cancellation_fee_bps as u128,
            withdraw_gate_bps: self.withdraw_gate_bps as u128,
            withdraw_request_period_duration: self.withdraw_request_period_duration,
            first_loss_initial_minimum: self.first_loss_initial_minimum as u128,
            service_fee_bps: self.service_fee_bps as u128,
            ..PoolSettings::default()
        }
    }
}

/// A lender in the simulated scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderConfig {
    pub name: String,
    /// Assets deposited right after activation
    pub deposit: u64,
    /// Shares requested for withdrawal (0 = never)
    #[serde(default)]
    pub request: u64,
    /// Period in which the request is made
    #[serde(default)]
    pub request_period: u64,
}

/// A loan funded at activation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanConfig {
    pub name: String,
    pub principal: u64,
    /// Interest paid every payment period
    pub payment: u64,
    pub payments: u64,
    /// Seconds between payments
    pub payment_period: u64,
    /// Period in which the borrower stops paying and the loan is defaulted
    #[serde(default)]
    pub default_period: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wall-clock delay between ticks in milliseconds
    pub tick_interval_ms: u64,

    /// Withdraw periods to simulate before closing the pool
    pub periods: u64,

    /// Extra ticks allowed after close for the pool to drain
    pub drain_ticks: u64,

    /// Snapshots replayed per claim
    pub claim_batch: u64,

    /// Maximum participants claimed for per tick
    pub claims_per_tick: usize,

    /// Where the JSON report is written (`~` is expanded)
    pub report_path: String,

    /// First-loss capital deposited by the admin
    pub first_loss: u64,

    pub pool: PoolConfig,

    #[serde(default)]
    pub lenders: Vec<LenderConfig>,

    #[serde(default)]
    pub loans: Vec<LoanConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        config.pool.settings().validate()
            .context("Invalid pool settings")?;

        Ok(config)
    }

    /// Two lenders and one loan against a 50% gate, 30-day periods
    pub fn default_scenario() -> Self {
        const DAY: u64 = 86_400;
        Self {
            tick_interval_ms: 100,
            periods: 6,
            drain_ticks: 32,
            claim_batch: 2,
            claims_per_tick: 1,
            report_path: "~/.tranche/keeper-report.json".to_string(),
            first_loss: 100_000,
            pool: PoolConfig {
                max_capacity: 10_000_000,
                end_date: 4_102_444_800,
                request_fee_bps: 0,
                request_cancellation_fee_bps: 0,
                withdraw_gate_bps: 5_000,
                withdraw_request_period_duration: 30 * DAY,
                first_loss_initial_minimum: 100_000,
                service_fee_bps: 500,
            },
            lenders: vec![
                LenderConfig {
                    name: "lender-a".to_string(),
                    deposit: 1_000_000,
                    request: 1_000_000,
                    request_period: 0,
                },
                LenderConfig {
                    name: "lender-b".to_string(),
                    deposit: 1_000_000,
                    request: 500_000,
                    request_period: 2,
                },
            ],
            loans: vec![LoanConfig {
                name: "loan-1".to_string(),
                principal: 500_000,
                payment: 4_166,
                payments: 6,
                payment_period: 30 * DAY,
                default_period: None,
            }],
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_scenario();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
