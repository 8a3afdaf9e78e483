//! Configuration and shared policy types for the sniper pipeline.
//!
//! Every policy constant (latency threshold, ladder shape, spend caps, exit
//! parameters) lives here as a named field so components can be constructed
//! with injected values in tests instead of reading process-wide globals.

use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroUsize};

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Base-unit scale of a pump.fun token (six decimals).
pub const TOKEN_BASE_UNITS: u64 = 1_000_000;

/// Which side of the curve a spam batch trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// What the pipeline does with a position once the buy batch has been sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExitStrategy {
    /// Wait a fixed quiescence interval, then race a sell ladder.
    QuickFlip {
        /// Delay between buy-batch completion and the sell batch, in ms
        quiescence_ms: u64,
    },
    /// Hold the position in the watch list and exit on a P&L threshold.
    Monitored {
        /// Unrealized gain that triggers a sell, in percent
        take_profit_pct: f64,
        /// Unrealized loss that triggers a sell, in percent
        stop_loss_pct: f64,
    },
}

/// Full configuration for the sniper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniperConfig {
    /// HTTP RPC endpoint
    pub rpc_endpoint: String,
    /// Websocket endpoint for the log subscription
    pub ws_endpoint: String,
    /// Log line that marks a token-creation transaction
    pub creation_marker: String,
    /// Retrieval attempt budget per detected signature
    pub max_retrieval_attempts: usize,
    /// Maximum accepted mint-to-retrieval latency, in ms
    pub latency_threshold_ms: u64,
    /// Rungs per spam batch
    pub ladder_rungs: NonZeroUsize,
    /// Priority fee of the lowest rung, in micro-lamports per compute unit
    pub ladder_base_micro_lamports: u64,
    /// Per-rung fee increment, in micro-lamports per compute unit
    pub ladder_step_micro_lamports: u64,
    /// Maximum spend per buy, in lamports
    pub max_spend_lamports: u64,
    /// Maximum acceptable price, in lamports per whole token
    pub max_price_per_token_lamports: f64,
    /// Client-side submission retries per transaction
    pub send_retries: usize,
    /// How a completed buy is unwound
    pub exit_strategy: ExitStrategy,
    /// Price-check ceiling for the position monitor, requests per second
    pub price_checks_per_second: NonZeroU32,
    /// Position-monitor idle poll interval when the watch list is empty, in ms
    pub monitor_idle_ms: u64,
    /// Seen-signature suppression window, in seconds
    pub dedup_ttl_seconds: u64,
    /// Directory the latency log file is created in
    pub log_directory: String,
}

impl Default for SniperConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            ws_endpoint: "wss://api.mainnet-beta.solana.com".to_string(),
            creation_marker: "Program log: Instruction: InitializeMint2".to_string(),
            max_retrieval_attempts: 1000,
            latency_threshold_ms: 1500,
            ladder_rungs: NonZeroUsize::new(5).unwrap(),
            ladder_base_micro_lamports: 100_000,
            ladder_step_micro_lamports: 50_000,
            // 0.0001 SOL spend cap at a ceiling of 3e-8 SOL per token
            max_spend_lamports: LAMPORTS_PER_SOL / 10_000,
            max_price_per_token_lamports: 30.0,
            send_retries: 6,
            exit_strategy: ExitStrategy::QuickFlip { quiescence_ms: 2000 },
            price_checks_per_second: NonZeroU32::new(8).unwrap(),
            monitor_idle_ms: 500,
            dedup_ttl_seconds: 30,
            log_directory: ".".to_string(),
        }
    }
}

impl SniperConfig {
    /// Token quantity a buy asks for, in base units: the spend budget divided
    /// by the price ceiling, floored to whole tokens.
    pub fn tokens_to_buy(&self) -> u64 {
        let whole_tokens = (self.max_spend_lamports as f64 / self.max_price_per_token_lamports)
            .floor() as u64;
        whole_tokens * TOKEN_BASE_UNITS
    }
}
