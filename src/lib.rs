//! pump-sniper - low-latency pump.fun mint sniping pipeline
//!
//! This crate watches the pump.fun program's log stream for new-token
//! creations and races priority-fee ladders of buy and sell transactions
//! against the freshly created bonding curve.

pub mod types;
pub mod sniper;

// Re-export main types for convenience
pub use types::{CurveAccounts, MintEvent, TradedToken};
