//! Sniper module - the detect → retrieve → gate → spam-submit pipeline
//! and its collaborators.

pub mod types;
pub mod fee_ladder;
pub mod instruction_coder;
pub mod tx_builder;
pub mod latency_gate;
pub mod ledger_client;
pub mod retriever;
pub mod spammer;
pub mod latency_recorder;
pub mod position_book;
pub mod position_monitor;
pub mod pipeline;
pub mod event_listener;

// Re-export main types
pub use types::{ExitStrategy, SniperConfig, TradeSide, LAMPORTS_PER_SOL, TOKEN_BASE_UNITS};
pub use fee_ladder::{FeeRung, PriorityFeeLadder};
pub use instruction_coder::{
    BuyArgs, EncodeError, InstructionCoder, SellArgs, TradeArgs, PUMP_PROGRAM,
};
pub use tx_builder::{derive_curve_accounts, TradeInstructionBuilder};
pub use latency_gate::{GateDecision, LatencyGate, RejectReason};
pub use ledger_client::{LedgerClient, SolanaLedgerClient};
pub use retriever::TransactionRetriever;
pub use spammer::{successful_signatures, RungOutcome, TransactionSpammer};
pub use latency_recorder::{transaction_link, LatencyEntry, LatencyRecorder};
pub use position_book::PositionBook;
pub use position_monitor::{CurvePriceSource, PositionMonitor, PriceSource};
pub use pipeline::SniperPipeline;
pub use event_listener::EventListener;
