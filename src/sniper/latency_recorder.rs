//! CSV sink for per-event timing and transaction-link data.
//!
//! The backing file is created with a header row on first write and appended
//! to thereafter. Appends are line-atomic behind an async mutex; ordering
//! across concurrent events is not guaranteed and not required.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::signature::Signature;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::info;

const HEADER: &str = "Mint Address,Buy Transaction Link,Sell Transaction Link,\
Mint to Detection Latency (ms),Detection to Retrieval Latency (ms),\
Retrieval to Send (Buy) Latency (ms),Total Buy Latency (ms),\
Latency Buy to Sell (ms),Total Latency (ms)\n";

/// One fixed-column log row: addresses, explorer links and the six latency
/// measurements in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyEntry {
    pub mint_address: String,
    pub buy_links: Vec<String>,
    pub sell_links: Vec<String>,
    pub mint_to_detection_ms: u64,
    pub detection_to_retrieval_ms: u64,
    pub retrieval_to_send_ms: u64,
    pub total_buy_ms: u64,
    pub buy_to_sell_ms: u64,
    pub total_ms: u64,
}

/// Explorer link for a submitted transaction.
pub fn transaction_link(signature: &Signature) -> String {
    format!("https://solscan.io/tx/{signature}")
}

/// Appends [`LatencyEntry`] rows to a per-run CSV file.
pub struct LatencyRecorder {
    path: PathBuf,
    guard: Mutex<()>,
}

impl LatencyRecorder {
    /// The file name carries the run's start time so consecutive runs never
    /// interleave rows.
    pub fn new(directory: &str) -> Self {
        let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S");
        Self::with_path(PathBuf::from(directory).join(format!("transaction_logs_{stamp}.csv")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Append one row, writing the header first if the file does not exist
    /// yet.
    pub async fn record(&self, entry: &LatencyEntry) -> Result<()> {
        let _guard = self.guard.lock().await;

        let fresh = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open log file {}", self.path.display()))?;

        if fresh {
            file.write_all(HEADER.as_bytes()).await?;
        }
        file.write_all(render_row(entry).as_bytes()).await?;
        file.flush().await?;

        info!(mint = %entry.mint_address, total_ms = entry.total_ms, "latency entry recorded");
        Ok(())
    }
}

fn render_row(entry: &LatencyEntry) -> String {
    let fields = [
        escape_field(&entry.mint_address),
        escape_field(&entry.buy_links.join(" ")),
        escape_field(&entry.sell_links.join(" ")),
        entry.mint_to_detection_ms.to_string(),
        entry.detection_to_retrieval_ms.to_string(),
        entry.retrieval_to_send_ms.to_string(),
        entry.total_buy_ms.to_string(),
        entry.buy_to_sell_ms.to_string(),
        entry.total_ms.to_string(),
    ];
    let mut row = fields.join(",");
    row.push('\n');
    row
}

/// Fields containing the delimiter, a quote or a line break are wrapped in
/// quotes, with embedded quotes doubled.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
