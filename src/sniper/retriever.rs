//! Aggressive transaction retrieval after a log match.
//!
//! Propagation after submission is typically sub-second, so the retriever
//! spins as fast as the client round-trip allows instead of sleeping between
//! attempts; every millisecond of added polling latency erodes the
//! opportunity. The budget is attempt-bounded, not wall-clock-bounded.

use std::sync::Arc;

use solana_sdk::signature::Signature;
use solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta;
use tracing::{debug, info, warn};

use crate::sniper::ledger_client::LedgerClient;

/// Polls the ledger until the parsed transaction is available or the
/// attempt budget is exhausted.
pub struct TransactionRetriever<C: LedgerClient> {
    client: Arc<C>,
    max_attempts: usize,
}

impl<C: LedgerClient> TransactionRetriever<C> {
    pub fn new(client: Arc<C>, max_attempts: usize) -> Self {
        Self {
            client,
            max_attempts,
        }
    }

    /// Returns the record as soon as one attempt yields it, `None` after
    /// `max_attempts` misses. Per-attempt errors are swallowed and counted
    /// as misses; only exhaustion is terminal.
    pub async fn retrieve(
        &self,
        signature: &Signature,
    ) -> Option<EncodedConfirmedTransactionWithStatusMeta> {
        for attempt in 1..=self.max_attempts {
            match self.client.get_parsed_transaction(signature).await {
                Ok(Some(tx)) => {
                    info!(%signature, attempt, "transaction found");
                    return Some(tx);
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(%signature, attempt, %err, "fetch attempt failed");
                }
            }
            if attempt % 100 == 0 {
                info!(%signature, attempt, "transaction not available yet, continuing");
            }
        }
        warn!(
            %signature,
            attempts = self.max_attempts,
            "giving up on transaction retrieval"
        );
        None
    }
}
