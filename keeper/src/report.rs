//! JSON run report

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderReport {
    pub name: String,
    /// Base58 address
    pub address: String,
    pub deposited: u128,
    pub redeemed: u128,
    pub shares_left: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub ticks: u64,
    pub closed_at: Option<u64>,
    pub snapshots: usize,
    pub total_assets: u128,
    pub service_fees: u128,
    pub first_loss_balance: u128,
    pub pool_token_balance: u128,
    pub lenders: Vec<LenderReport>,
}

impl Report {
    /// Write the report as pretty JSON, creating parent directories
    pub fn write(&self, path: &str) -> Result<()> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .context(format!("Failed to create {}", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize report")?;
        std::fs::write(path, json)
            .context(format!("Failed to write report to {}", path.display()))?;

        log::info!("Report written to {}", path.display());
        Ok(())
    }
}
