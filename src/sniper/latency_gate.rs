//! Freshness gate between retrieval and trade submission.
//!
//! Opportunities older than the configured threshold are assumed to be
//! unfavorably priced already; rejecting them is a policy decision, not an
//! error, and stops the pipeline for that event with nothing submitted.

use std::fmt;

use crate::types::{CurveAccounts, MintEvent};

/// Why an event was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingMintTimestamp,
    MissingMint,
    MissingBondingCurve,
    MissingAssociatedBondingCurve,
    Stale { latency_ms: u64, threshold_ms: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingMintTimestamp => write!(f, "transaction carried no block time"),
            RejectReason::MissingMint => write!(f, "mint address missing"),
            RejectReason::MissingBondingCurve => write!(f, "bonding-curve address missing"),
            RejectReason::MissingAssociatedBondingCurve => {
                write!(f, "associated bonding-curve address missing")
            }
            RejectReason::Stale {
                latency_ms,
                threshold_ms,
            } => write!(f, "latency {latency_ms}ms exceeds {threshold_ms}ms"),
        }
    }
}

/// Outcome of gating one event.
#[derive(Debug, Clone, Copy)]
pub enum GateDecision {
    /// Fresh enough to trade; carries the resolved account set.
    Accept {
        latency_ms: u64,
        accounts: CurveAccounts,
    },
    Reject(RejectReason),
}

/// Accepts an event only when every required field resolved and the
/// mint-to-now latency is under the threshold.
#[derive(Debug, Clone, Copy)]
pub struct LatencyGate {
    threshold_ms: u64,
}

impl LatencyGate {
    pub fn new(threshold_ms: u64) -> Self {
        Self { threshold_ms }
    }

    pub fn evaluate(&self, event: &MintEvent, now_ms: u64) -> GateDecision {
        let Some(mint_timestamp_ms) = event.mint_timestamp_ms else {
            return GateDecision::Reject(RejectReason::MissingMintTimestamp);
        };
        if event.mint.is_none() {
            return GateDecision::Reject(RejectReason::MissingMint);
        }
        if event.bonding_curve.is_none() {
            return GateDecision::Reject(RejectReason::MissingBondingCurve);
        }
        let Some(accounts) = event.curve_accounts() else {
            return GateDecision::Reject(RejectReason::MissingAssociatedBondingCurve);
        };

        let latency_ms = now_ms.saturating_sub(mint_timestamp_ms);
        if latency_ms >= self.threshold_ms {
            return GateDecision::Reject(RejectReason::Stale {
                latency_ms,
                threshold_ms: self.threshold_ms,
            });
        }

        GateDecision::Accept {
            latency_ms,
            accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{pubkey::Pubkey, signature::Signature};

    fn complete_event(mint_timestamp_ms: u64) -> MintEvent {
        MintEvent {
            signature: Signature::default(),
            detected_at_ms: mint_timestamp_ms + 100,
            mint_timestamp_ms: Some(mint_timestamp_ms),
            mint: Some(Pubkey::new_unique()),
            bonding_curve: Some(Pubkey::new_unique()),
            associated_bonding_curve: Some(Pubkey::new_unique()),
        }
    }

    #[test]
    fn fresh_complete_event_is_accepted() {
        let gate = LatencyGate::new(1500);
        let event = complete_event(10_000);

        match gate.evaluate(&event, 10_500) {
            GateDecision::Accept { latency_ms, .. } => assert_eq!(latency_ms, 500),
            GateDecision::Reject(reason) => panic!("unexpected reject: {reason}"),
        }
    }

    #[test]
    fn each_missing_field_rejects() {
        let gate = LatencyGate::new(1500);

        let mut event = complete_event(10_000);
        event.mint_timestamp_ms = None;
        assert!(matches!(
            gate.evaluate(&event, 10_100),
            GateDecision::Reject(RejectReason::MissingMintTimestamp)
        ));

        let mut event = complete_event(10_000);
        event.mint = None;
        assert!(matches!(
            gate.evaluate(&event, 10_100),
            GateDecision::Reject(RejectReason::MissingMint)
        ));

        let mut event = complete_event(10_000);
        event.bonding_curve = None;
        assert!(matches!(
            gate.evaluate(&event, 10_100),
            GateDecision::Reject(RejectReason::MissingBondingCurve)
        ));

        let mut event = complete_event(10_000);
        event.associated_bonding_curve = None;
        assert!(matches!(
            gate.evaluate(&event, 10_100),
            GateDecision::Reject(RejectReason::MissingAssociatedBondingCurve)
        ));
    }

    #[test]
    fn latency_at_threshold_rejects() {
        let gate = LatencyGate::new(1500);
        let event = complete_event(10_000);
        assert!(matches!(
            gate.evaluate(&event, 11_500),
            GateDecision::Reject(RejectReason::Stale { latency_ms: 1500, .. })
        ));
    }

    #[test]
    fn latency_over_threshold_rejects_despite_complete_fields() {
        let gate = LatencyGate::new(1500);
        let event = complete_event(10_000);
        assert!(matches!(
            gate.evaluate(&event, 11_600),
            GateDecision::Reject(RejectReason::Stale { latency_ms: 1600, .. })
        ));
    }

    #[test]
    fn clock_skew_saturates_to_zero_latency() {
        let gate = LatencyGate::new(1500);
        let event = complete_event(10_000);
        match gate.evaluate(&event, 9_900) {
            GateDecision::Accept { latency_ms, .. } => assert_eq!(latency_ms, 0),
            GateDecision::Reject(reason) => panic!("unexpected reject: {reason}"),
        }
    }
}
