//! In-memory watch list of open positions.
//!
//! The list is the only shared mutable state in the system. All access goes
//! through the three operations below; iteration always works on a
//! [`snapshot`](PositionBook::snapshot) so a concurrent removal can never
//! invalidate a loop in progress. Nothing is persisted: a restart forgets
//! every open position.

use solana_sdk::pubkey::Pubkey;
use tokio::sync::Mutex;

use crate::types::TradedToken;

#[derive(Debug, Default)]
pub struct PositionBook {
    positions: Mutex<Vec<TradedToken>>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_position(&self, position: TradedToken) {
        self.positions.lock().await.push(position);
    }

    /// Remove and return the first position for `mint`, if any.
    pub async fn remove_position(&self, mint: &Pubkey) -> Option<TradedToken> {
        let mut positions = self.positions.lock().await;
        let index = positions.iter().position(|p| p.mint == *mint)?;
        Some(positions.remove(index))
    }

    /// An owned copy of the current position set.
    pub async fn snapshot(&self) -> Vec<TradedToken> {
        self.positions.lock().await.clone()
    }
}
