//! Seam between the pipeline and the Solana RPC surface.
//!
//! Components poll and submit through [`LedgerClient`] so tests can swap in
//! deterministic fakes; production wires the nonblocking RPC client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig},
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};

/// Ledger operations the pipeline needs: parsed-transaction polling, trade
/// submission and raw account reads.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch the parsed transaction at `confirmed` commitment. `Ok(None)`
    /// means not available yet; `Err` is a transport-level failure. The
    /// caller treats both as a missed attempt.
    async fn get_parsed_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EncodedConfirmedTransactionWithStatusMeta>>;

    /// Sign `instructions` against a fresh blockhash and submit, with
    /// preflight simulation disabled.
    async fn send_trade(
        &self,
        instructions: &[Instruction],
        signer: &Keypair,
    ) -> Result<Signature>;

    /// Raw account data at default commitment.
    async fn get_account_data(&self, account: &Pubkey) -> Result<Vec<u8>>;
}

/// Production implementation over the nonblocking [`RpcClient`].
pub struct SolanaLedgerClient {
    rpc: Arc<RpcClient>,
    send_retries: usize,
}

impl SolanaLedgerClient {
    pub fn new(endpoint: String, timeout: Duration, send_retries: usize) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_timeout(endpoint, timeout)),
            send_retries,
        }
    }
}

#[async_trait]
impl LedgerClient for SolanaLedgerClient {
    async fn get_parsed_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EncodedConfirmedTransactionWithStatusMeta>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };
        self.rpc
            .get_transaction_with_config(signature, config)
            .await
            .map(Some)
            .context("transaction fetch failed")
    }

    async fn send_trade(
        &self,
        instructions: &[Instruction],
        signer: &Keypair,
    ) -> Result<Signature> {
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .context("failed to fetch a recent blockhash")?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&signer.pubkey()),
            &[signer],
            blockhash,
        );
        // Preflight simulation is skipped on purpose: invalid transactions
        // are discovered on-chain instead of costing local latency.
        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            max_retries: Some(self.send_retries),
            ..Default::default()
        };
        self.rpc
            .send_transaction_with_config(&transaction, config)
            .await
            .context("transaction submission failed")
    }

    async fn get_account_data(&self, account: &Pubkey) -> Result<Vec<u8>> {
        self.rpc
            .get_account_data(account)
            .await
            .context("account fetch failed")
    }
}
