//! Race-style transaction submission across a fee ladder.
//!
//! One transaction per rung, submitted sequentially with preflight disabled.
//! The ladder itself is the redundancy strategy: a rung's failure (encoding
//! or send) is recorded as that rung's outcome and never aborts the rest of
//! the batch, and batches are never retried as a whole.

use std::sync::Arc;

use nonempty::NonEmpty;
use solana_sdk::signature::{Keypair, Signature};
use tracing::{info, warn};

use crate::sniper::fee_ladder::FeeRung;
use crate::sniper::ledger_client::LedgerClient;
use crate::sniper::tx_builder::TradeInstructionBuilder;
use crate::sniper::types::TradeSide;
use crate::types::CurveAccounts;

/// Per-rung submission outcome; rung order is preserved in the batch result.
#[derive(Debug, Clone)]
pub struct RungOutcome {
    pub rung: FeeRung,
    pub result: Result<Signature, String>,
}

/// Submits one transaction per fee rung against a bonding curve.
pub struct TransactionSpammer<C: LedgerClient> {
    client: Arc<C>,
    builder: TradeInstructionBuilder,
    signer: Arc<Keypair>,
}

impl<C: LedgerClient> TransactionSpammer<C> {
    pub fn new(client: Arc<C>, builder: TradeInstructionBuilder, signer: Arc<Keypair>) -> Self {
        Self {
            client,
            builder,
            signer,
        }
    }

    pub fn builder(&self) -> &TradeInstructionBuilder {
        &self.builder
    }

    /// Build, sign and submit one transaction per rung. Sells unwind the
    /// full configured buy quantity.
    pub async fn spam(
        &self,
        accounts: &CurveAccounts,
        side: TradeSide,
        rungs: &NonEmpty<FeeRung>,
    ) -> Vec<RungOutcome> {
        let mut outcomes = Vec::with_capacity(rungs.len());

        for rung in rungs {
            let built = match side {
                TradeSide::Buy => self.builder.build_buy(accounts, rung),
                TradeSide::Sell => {
                    self.builder
                        .build_sell(accounts, self.builder.buy_amount(), rung)
                }
            };

            let instructions = match built {
                Ok(instructions) => instructions,
                Err(err) => {
                    warn!(
                        mint = %accounts.mint,
                        rung = rung.index,
                        %err,
                        "instruction build failed, skipping rung"
                    );
                    outcomes.push(RungOutcome {
                        rung: *rung,
                        result: Err(err.to_string()),
                    });
                    continue;
                }
            };

            match self.client.send_trade(&instructions, &self.signer).await {
                Ok(signature) => {
                    info!(
                        mint = %accounts.mint,
                        rung = rung.index,
                        fee = rung.micro_lamports_per_cu,
                        %signature,
                        "transaction sent"
                    );
                    outcomes.push(RungOutcome {
                        rung: *rung,
                        result: Ok(signature),
                    });
                }
                Err(err) => {
                    warn!(
                        mint = %accounts.mint,
                        rung = rung.index,
                        %err,
                        "send failed, continuing with remaining rungs"
                    );
                    outcomes.push(RungOutcome {
                        rung: *rung,
                        result: Err(err.to_string()),
                    });
                }
            }
        }

        outcomes
    }
}

/// Signatures of the successful sends, in rung order.
pub fn successful_signatures(outcomes: &[RungOutcome]) -> Vec<Signature> {
    outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().copied())
        .collect()
}
