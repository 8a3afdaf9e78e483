//! Program log subscription and creation-instruction filtering.
//!
//! Subscribes at `processed` commitment (the least-confirmed, fastest tier)
//! and fires one independent pipeline task per matching signature, so a slow
//! retrieval never delays filtering of the next batch. Redelivered
//! signatures within the suppression window are dropped.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use solana_client::{
    nonblocking::pubsub_client::PubsubClient,
    rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter},
    rpc_response::RpcLogsResponse,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::sniper::ledger_client::LedgerClient;
use crate::sniper::pipeline::SniperPipeline;
use crate::sniper::types::SniperConfig;

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

pub struct EventListener<C: LedgerClient + 'static> {
    ws_endpoint: String,
    program: Pubkey,
    creation_marker: String,
    pipeline: Arc<SniperPipeline<C>>,
    seen: Cache<String, ()>,
}

impl<C: LedgerClient + 'static> EventListener<C> {
    pub fn new(
        program: Pubkey,
        pipeline: Arc<SniperPipeline<C>>,
        config: &SniperConfig,
    ) -> Self {
        Self {
            ws_endpoint: config.ws_endpoint.clone(),
            program,
            creation_marker: config.creation_marker.clone(),
            pipeline,
            seen: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(config.dedup_ttl_seconds))
                .build(),
        }
    }

    /// Runs forever; a lost websocket is re-established after a short delay.
    pub async fn run(&self) {
        loop {
            if let Err(err) = self.subscribe_once().await {
                error!(%err, "log subscription lost, reconnecting");
            }
            sleep(RESUBSCRIBE_DELAY).await;
        }
    }

    async fn subscribe_once(&self) -> Result<()> {
        let client = PubsubClient::new(&self.ws_endpoint).await?;
        let filter = RpcTransactionLogsFilter::Mentions(vec![self.program.to_string()]);
        let config = RpcTransactionLogsConfig {
            commitment: Some(CommitmentConfig::processed()),
        };
        let (mut stream, _unsubscribe) = client.logs_subscribe(filter, config).await?;
        info!(program = %self.program, "monitoring program logs for new mints");

        while let Some(update) = stream.next().await {
            self.on_logs(update.value).await;
        }
        Ok(())
    }

    async fn on_logs(&self, logs: RpcLogsResponse) {
        if !logs
            .logs
            .iter()
            .any(|line| line.contains(&self.creation_marker))
        {
            return;
        }
        let detected_at_ms = chrono::Utc::now().timestamp_millis() as u64;

        if self.seen.contains_key(&logs.signature) {
            debug!(signature = %logs.signature, "duplicate delivery suppressed");
            return;
        }
        self.seen.insert(logs.signature.clone(), ()).await;

        let signature: Signature = match logs.signature.parse() {
            Ok(signature) => signature,
            Err(err) => {
                warn!(signature = %logs.signature, %err, "unparseable signature in log batch");
                return;
            }
        };

        info!(%signature, "creation instruction detected");
        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            pipeline.handle_event(signature, detected_at_ms).await;
        });
    }
}
