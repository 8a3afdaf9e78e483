//! Per-event pipeline: retrieve → gate → buy ladder → exit → record.
//!
//! One instance handles every event, but each invocation runs on its own
//! task; a slow retrieval for one signature never delays another. Nothing in
//! here may take the process down: failures are logged and the event is
//! abandoned.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::sniper::fee_ladder::PriorityFeeLadder;
use crate::sniper::latency_gate::{GateDecision, LatencyGate};
use crate::sniper::latency_recorder::{transaction_link, LatencyEntry, LatencyRecorder};
use crate::sniper::ledger_client::LedgerClient;
use crate::sniper::position_book::PositionBook;
use crate::sniper::retriever::TransactionRetriever;
use crate::sniper::spammer::{successful_signatures, TransactionSpammer};
use crate::sniper::tx_builder::TradeInstructionBuilder;
use crate::sniper::types::{ExitStrategy, SniperConfig, TradeSide, TOKEN_BASE_UNITS};
use crate::types::{CurveAccounts, MintEvent, TradedToken};

pub struct SniperPipeline<C: LedgerClient> {
    config: SniperConfig,
    retriever: TransactionRetriever<C>,
    gate: LatencyGate,
    ladder: PriorityFeeLadder,
    spammer: TransactionSpammer<C>,
    recorder: Arc<LatencyRecorder>,
    book: Arc<PositionBook>,
}

impl<C: LedgerClient> SniperPipeline<C> {
    pub fn new(
        client: Arc<C>,
        signer: Arc<Keypair>,
        recorder: Arc<LatencyRecorder>,
        book: Arc<PositionBook>,
        config: SniperConfig,
    ) -> Self {
        let builder = TradeInstructionBuilder::new(
            signer.pubkey(),
            config.tokens_to_buy(),
            config.max_spend_lamports,
        );
        Self {
            retriever: TransactionRetriever::new(client.clone(), config.max_retrieval_attempts),
            gate: LatencyGate::new(config.latency_threshold_ms),
            ladder: PriorityFeeLadder::new(
                config.ladder_base_micro_lamports,
                config.ladder_step_micro_lamports,
            ),
            spammer: TransactionSpammer::new(client, builder, signer),
            recorder,
            book,
            config,
        }
    }

    /// Top of the per-event task: any error is logged and swallowed so the
    /// listener keeps running whatever happens to a single event.
    pub async fn handle_event(&self, signature: Signature, detected_at_ms: u64) {
        if let Err(err) = self.process(signature, detected_at_ms).await {
            error!(%signature, %err, "event handler failed");
        }
    }

    async fn process(&self, signature: Signature, detected_at_ms: u64) -> Result<()> {
        let Some(tx) = self.retriever.retrieve(&signature).await else {
            warn!(%signature, "transaction never became available, abandoning event");
            return Ok(());
        };
        let retrieved_at_ms = chrono::Utc::now().timestamp_millis() as u64;
        let event = MintEvent::from_transaction(signature, detected_at_ms, &tx);

        let (latency_ms, accounts) = match self.gate.evaluate(&event, retrieved_at_ms) {
            GateDecision::Accept {
                latency_ms,
                accounts,
            } => (latency_ms, accounts),
            GateDecision::Reject(reason) => {
                info!(%signature, %reason, "opportunity skipped");
                return Ok(());
            }
        };
        // Gate acceptance fixes the mint time relative to retrieval.
        let mint_timestamp_ms = retrieved_at_ms - latency_ms;
        info!(mint = %accounts.mint, latency_ms, "opportunity accepted, buying");

        let rungs = self.ladder.generate(self.config.ladder_rungs);
        let buy_sent_at_ms = chrono::Utc::now().timestamp_millis() as u64;
        let buy_outcomes = self.spammer.spam(&accounts, TradeSide::Buy, &rungs).await;
        let buy_signatures = successful_signatures(&buy_outcomes);
        if buy_signatures.is_empty() {
            warn!(mint = %accounts.mint, "every buy rung failed, abandoning event");
            return Ok(());
        }

        let mut entry = LatencyEntry {
            mint_address: accounts.mint.to_string(),
            buy_links: buy_signatures.iter().map(transaction_link).collect(),
            sell_links: Vec::new(),
            mint_to_detection_ms: detected_at_ms.saturating_sub(mint_timestamp_ms),
            detection_to_retrieval_ms: retrieved_at_ms.saturating_sub(detected_at_ms),
            retrieval_to_send_ms: buy_sent_at_ms.saturating_sub(retrieved_at_ms),
            total_buy_ms: buy_sent_at_ms.saturating_sub(mint_timestamp_ms),
            buy_to_sell_ms: 0,
            total_ms: buy_sent_at_ms.saturating_sub(mint_timestamp_ms),
        };

        match self.config.exit_strategy {
            ExitStrategy::QuickFlip { quiescence_ms } => {
                // Let the mint and liquidity state settle before unwinding.
                sleep(Duration::from_millis(quiescence_ms)).await;

                let sell_rungs = self.ladder.generate(self.config.ladder_rungs);
                let sell_sent_at_ms = chrono::Utc::now().timestamp_millis() as u64;
                let sell_outcomes = self.spammer.spam(&accounts, TradeSide::Sell, &sell_rungs).await;

                entry.sell_links = successful_signatures(&sell_outcomes)
                    .iter()
                    .map(transaction_link)
                    .collect();
                entry.buy_to_sell_ms = sell_sent_at_ms.saturating_sub(buy_sent_at_ms);
                entry.total_ms = sell_sent_at_ms.saturating_sub(mint_timestamp_ms);
            }
            ExitStrategy::Monitored { .. } => {
                self.book.add_position(self.open_position(&accounts)).await;
                info!(mint = %accounts.mint, "position handed to the monitor");
            }
        }

        self.recorder.record(&entry).await
    }

    fn open_position(&self, accounts: &CurveAccounts) -> TradedToken {
        let amount_bought = self.spammer.builder().buy_amount();
        let whole_tokens = (amount_bought / TOKEN_BASE_UNITS).max(1);
        TradedToken {
            mint: accounts.mint,
            buy_price_lamports_per_token: self.config.max_spend_lamports as f64
                / whole_tokens as f64,
            amount_bought,
        }
    }
}
