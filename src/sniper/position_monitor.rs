//! Take-profit / stop-loss loop over the open-position watch list.
//!
//! Runs continuously: snapshot the book, pace per-token price checks under a
//! fixed requests-per-second ceiling, and unwind any position whose
//! unrealized P&L crosses an exit threshold. Exit parameters are policy
//! constants from the config, never derived.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use solana_sdk::pubkey::Pubkey;
use tokio::time::sleep;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, info, warn};

use crate::sniper::fee_ladder::PriorityFeeLadder;
use crate::sniper::instruction_coder::PUMP_PROGRAM;
use crate::sniper::ledger_client::LedgerClient;
use crate::sniper::spammer::TransactionSpammer;
use crate::sniper::tx_builder::derive_curve_accounts;
use crate::sniper::types::{SniperConfig, TradeSide, TOKEN_BASE_UNITS};
use crate::sniper::position_book::PositionBook;
use crate::types::TradedToken;

/// Spot-price lookups for the monitor; mockable in tests.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price in lamports per whole token.
    async fn spot_price_lamports(&self, mint: &Pubkey) -> Result<f64>;
}

/// Anchor account discriminator of the bonding-curve state.
const BONDING_CURVE_DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

/// On-chain pricing-curve state, as laid out by the program.
#[derive(Debug, Clone, Copy, BorshSerialize, BorshDeserialize)]
pub struct BondingCurveState {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
}

impl BondingCurveState {
    pub fn from_account_data(data: &[u8]) -> Result<Self> {
        let Some(payload) = data.strip_prefix(&BONDING_CURVE_DISCRIMINATOR[..]) else {
            bail!("account is not a bonding-curve state account");
        };
        let mut payload = payload;
        Ok(Self::deserialize(&mut payload)?)
    }

    /// Virtual-reserve ratio, in lamports per whole token.
    pub fn spot_price_lamports(&self) -> Result<f64> {
        if self.virtual_token_reserves == 0 {
            bail!("curve has no virtual token reserves");
        }
        Ok(self.virtual_sol_reserves as f64 / self.virtual_token_reserves as f64
            * TOKEN_BASE_UNITS as f64)
    }
}

/// Derives the spot price from the bonding-curve account's virtual reserves.
pub struct CurvePriceSource<C: LedgerClient> {
    client: Arc<C>,
}

impl<C: LedgerClient> CurvePriceSource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: LedgerClient> PriceSource for CurvePriceSource<C> {
    async fn spot_price_lamports(&self, mint: &Pubkey) -> Result<f64> {
        let curve = Pubkey::find_program_address(&[b"bonding-curve", mint.as_ref()], &PUMP_PROGRAM).0;
        let data = self.client.get_account_data(&curve).await?;
        BondingCurveState::from_account_data(&data)?.spot_price_lamports()
    }
}

/// Unrealized profit or loss, in percent of the entry price.
pub fn unrealized_pnl_pct(buy_price: f64, current_price: f64) -> f64 {
    (current_price - buy_price) / buy_price * 100.0
}

/// Watches open positions and sells on P&L thresholds.
pub struct PositionMonitor<C: LedgerClient, P: PriceSource> {
    book: Arc<PositionBook>,
    price_source: Arc<P>,
    spammer: Arc<TransactionSpammer<C>>,
    ladder: PriorityFeeLadder,
    ladder_rungs: std::num::NonZeroUsize,
    limiter: DefaultDirectRateLimiter,
    take_profit_pct: f64,
    stop_loss_pct: f64,
    idle_interval: Duration,
}

impl<C: LedgerClient, P: PriceSource> PositionMonitor<C, P> {
    pub fn new(
        book: Arc<PositionBook>,
        price_source: Arc<P>,
        spammer: Arc<TransactionSpammer<C>>,
        config: &SniperConfig,
        take_profit_pct: f64,
        stop_loss_pct: f64,
    ) -> Self {
        let quota = Quota::per_second(config.price_checks_per_second);
        Self {
            book,
            price_source,
            spammer,
            ladder: PriorityFeeLadder::new(
                config.ladder_base_micro_lamports,
                config.ladder_step_micro_lamports,
            ),
            ladder_rungs: config.ladder_rungs,
            limiter: RateLimiter::direct(quota),
            take_profit_pct,
            stop_loss_pct,
            idle_interval: Duration::from_millis(config.monitor_idle_ms),
        }
    }

    pub async fn run(&self) {
        info!(
            take_profit_pct = self.take_profit_pct,
            stop_loss_pct = self.stop_loss_pct,
            "position monitor running"
        );
        loop {
            let positions = self.book.snapshot().await;
            if positions.is_empty() {
                sleep(self.idle_interval).await;
                continue;
            }
            for position in positions {
                self.limiter.until_ready().await;
                self.check_position(&position).await;
            }
        }
    }

    async fn check_position(&self, position: &TradedToken) {
        let price = match self.fetch_price(&position.mint).await {
            Ok(price) => price,
            Err(err) => {
                warn!(mint = %position.mint, %err, "price check failed");
                return;
            }
        };

        let pnl_pct = unrealized_pnl_pct(position.buy_price_lamports_per_token, price);
        debug!(mint = %position.mint, price, pnl_pct, "position checked");

        if pnl_pct >= self.take_profit_pct || pnl_pct <= -self.stop_loss_pct {
            info!(mint = %position.mint, pnl_pct, "exit threshold crossed, selling");
            let accounts = derive_curve_accounts(&position.mint);
            let rungs = self.ladder.generate(self.ladder_rungs);
            let outcomes = self.spammer.spam(&accounts, TradeSide::Sell, &rungs).await;

            if outcomes.iter().any(|o| o.result.is_ok()) {
                self.book.remove_position(&position.mint).await;
            } else {
                warn!(mint = %position.mint, "all sell rungs failed, keeping position");
            }
        }
    }

    async fn fetch_price(&self, mint: &Pubkey) -> Result<f64> {
        let retry_strategy = ExponentialBackoff::from_millis(50)
            .max_delay(Duration::from_millis(500))
            .take(3);
        Retry::spawn(retry_strategy, || self.price_source.spot_price_lamports(mint)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnl_is_signed_percentage_of_entry() {
        assert_eq!(unrealized_pnl_pct(30.0, 45.0), 50.0);
        assert_eq!(unrealized_pnl_pct(30.0, 15.0), -50.0);
        assert_eq!(unrealized_pnl_pct(30.0, 30.0), 0.0);
    }

    #[test]
    fn curve_state_round_trips_with_discriminator() {
        let state = BondingCurveState {
            virtual_token_reserves: 1_073_000_000_000_000,
            virtual_sol_reserves: 30_000_000_000,
            real_token_reserves: 793_100_000_000_000,
            real_sol_reserves: 0,
            token_total_supply: 1_000_000_000_000_000,
            complete: false,
        };
        let mut data = BONDING_CURVE_DISCRIMINATOR.to_vec();
        data.extend(borsh::to_vec(&state).unwrap());

        let decoded = BondingCurveState::from_account_data(&data).unwrap();
        assert_eq!(decoded.virtual_sol_reserves, state.virtual_sol_reserves);
        assert!(!decoded.complete);
    }

    #[test]
    fn foreign_account_data_is_rejected() {
        let data = vec![0u8; 49];
        assert!(BondingCurveState::from_account_data(&data).is_err());
    }

    #[test]
    fn spot_price_is_reserve_ratio_per_whole_token() {
        let state = BondingCurveState {
            virtual_token_reserves: 1_000_000_000_000,
            virtual_sol_reserves: 30_000_000_000,
            real_token_reserves: 0,
            real_sol_reserves: 0,
            token_total_supply: 0,
            complete: false,
        };
        // 30e9 lamports over 1e6 whole tokens = 30_000 lamports per token
        let price = state.spot_price_lamports().unwrap();
        assert!((price - 30_000.0).abs() < f64::EPSILON);

        let empty = BondingCurveState {
            virtual_token_reserves: 0,
            ..state
        };
        assert!(empty.spot_price_lamports().is_err());
    }
}
