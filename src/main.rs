//! Main entry point for the pump-sniper pipeline.
//!
//! Wires the ledger client, latency recorder and position book into the
//! per-event pipeline, then hands control to the log listener.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use pump_sniper::sniper::{
    CurvePriceSource, EventListener, ExitStrategy, LatencyRecorder, PositionBook,
    PositionMonitor, SniperConfig, SniperPipeline, SolanaLedgerClient, TradeInstructionBuilder,
    TransactionSpammer, PUMP_PROGRAM,
};
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::{info, Level};

const RPC_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let mut config = SniperConfig::default();
    if let Ok(endpoint) = std::env::var("RPC_ENDPOINT") {
        config.rpc_endpoint = endpoint;
    }
    if let Ok(endpoint) = std::env::var("WS_ENDPOINT") {
        config.ws_endpoint = endpoint;
    }
    if let Ok(directory) = std::env::var("LOG_DIRECTORY") {
        config.log_directory = directory;
    }

    info!("Starting pump-sniper");
    info!(config = %serde_json::to_string(&config)?, "effective configuration");

    let secret = std::env::var("WALLET_PRIVATE_KEY")
        .context("WALLET_PRIVATE_KEY must hold the base58-encoded secret key")?;
    let signer = Arc::new(Keypair::from_base58_string(&secret));
    info!(wallet = %signer.pubkey(), "signer loaded");

    let client = Arc::new(SolanaLedgerClient::new(
        config.rpc_endpoint.clone(),
        RPC_TIMEOUT,
        config.send_retries,
    ));
    let recorder = Arc::new(LatencyRecorder::new(&config.log_directory));
    info!(log_file = %recorder.path().display(), "latency log ready");
    let book = Arc::new(PositionBook::new());

    let pipeline = Arc::new(SniperPipeline::new(
        client.clone(),
        signer.clone(),
        recorder,
        book.clone(),
        config.clone(),
    ));

    // The monitored exit strategy runs its own watch loop beside the listener.
    if let ExitStrategy::Monitored {
        take_profit_pct,
        stop_loss_pct,
    } = config.exit_strategy
    {
        let builder = TradeInstructionBuilder::new(
            signer.pubkey(),
            config.tokens_to_buy(),
            config.max_spend_lamports,
        );
        let spammer = Arc::new(TransactionSpammer::new(
            client.clone(),
            builder,
            signer.clone(),
        ));
        let price_source = Arc::new(CurvePriceSource::new(client.clone()));
        let monitor = PositionMonitor::new(
            book.clone(),
            price_source,
            spammer,
            &config,
            take_profit_pct,
            stop_loss_pct,
        );
        tokio::spawn(async move {
            monitor.run().await;
        });
    }

    let listener = EventListener::new(PUMP_PROGRAM, pipeline, &config);
    listener.run().await;

    Ok(())
}
