//! Transfer report generation
//!
//! Writes a machine-readable JSON summary of a completed run next to the
//! human-readable log output.

use anyhow::Context;
use chrono::Utc;
use core_transfer::{TransferRun, TransferStats};
use serde::Serialize;
use std::path::Path;

/// JSON report describing one completed transfer run
#[derive(Debug, Serialize)]
pub struct TransferReport {
    timestamp: String,
    stats: TransferStats,
    summary: String,
}

impl TransferReport {
    pub fn from_run(run: &TransferRun) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            stats: run.stats.clone(),
            summary: summary_line(&run.stats),
        }
    }

    /// Write the report as pretty-printed JSON
    pub async fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }
}

fn summary_line(stats: &TransferStats) -> String {
    format!(
        "Successfully transferred {} photos, {} failed, {} albums transferred successfully",
        stats.success, stats.failed, stats.albums_success
    )
}
