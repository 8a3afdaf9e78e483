//! Core types and data structures for the pump-sniper trading system.

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiMessage,
};
use std::str::FromStr;

/// Account-key index of the new mint in a creation transaction.
pub const MINT_KEY_INDEX: usize = 1;
/// Account-key index of the bonding-curve account.
pub const BONDING_CURVE_KEY_INDEX: usize = 3;
/// Account-key index of the bonding curve's associated token account.
pub const ASSOCIATED_BONDING_CURVE_KEY_INDEX: usize = 4;

/// A token-creation event detected on the program's log stream.
///
/// Created when the log filter matches; the address and timestamp fields are
/// populated from the retrieved transaction and stay `None` when the parsed
/// record does not carry them. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintEvent {
    /// Signature of the creation transaction
    pub signature: Signature,
    /// Local wall-clock time when the log line was seen, in ms
    pub detected_at_ms: u64,
    /// On-chain block time of the creation transaction, in ms
    pub mint_timestamp_ms: Option<u64>,
    /// The newly created mint
    pub mint: Option<Pubkey>,
    /// The pricing-curve account for the mint
    pub bonding_curve: Option<Pubkey>,
    /// The curve's associated token account
    pub associated_bonding_curve: Option<Pubkey>,
}

/// The complete account set a trade needs; only available once every
/// field of the [`MintEvent`] resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurveAccounts {
    pub mint: Pubkey,
    pub bonding_curve: Pubkey,
    pub associated_bonding_curve: Pubkey,
}

impl MintEvent {
    /// Populate an event from the retrieved creation transaction.
    ///
    /// The mint, curve and associated-curve addresses sit at fixed
    /// account-key positions in the creation instruction's transaction.
    pub fn from_transaction(
        signature: Signature,
        detected_at_ms: u64,
        tx: &EncodedConfirmedTransactionWithStatusMeta,
    ) -> Self {
        let keys = account_keys(tx);
        Self {
            signature,
            detected_at_ms,
            mint_timestamp_ms: tx.block_time.map(|t| t as u64 * 1000),
            mint: parse_key(&keys, MINT_KEY_INDEX),
            bonding_curve: parse_key(&keys, BONDING_CURVE_KEY_INDEX),
            associated_bonding_curve: parse_key(&keys, ASSOCIATED_BONDING_CURVE_KEY_INDEX),
        }
    }

    /// All trade-relevant accounts, if every one of them resolved.
    pub fn curve_accounts(&self) -> Option<CurveAccounts> {
        Some(CurveAccounts {
            mint: self.mint?,
            bonding_curve: self.bonding_curve?,
            associated_bonding_curve: self.associated_bonding_curve?,
        })
    }
}

fn account_keys(tx: &EncodedConfirmedTransactionWithStatusMeta) -> Vec<String> {
    match &tx.transaction.transaction {
        EncodedTransaction::Json(ui_tx) => match &ui_tx.message {
            UiMessage::Parsed(message) => {
                message.account_keys.iter().map(|a| a.pubkey.clone()).collect()
            }
            UiMessage::Raw(message) => message.account_keys.clone(),
        },
        _ => Vec::new(),
    }
}

fn parse_key(keys: &[String], index: usize) -> Option<Pubkey> {
    keys.get(index).and_then(|k| Pubkey::from_str(k).ok())
}

/// An open position held by the in-memory watch list.
///
/// No external persistence: a process restart loses all open positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradedToken {
    /// The mint that was bought
    pub mint: Pubkey,
    /// Effective purchase price in lamports per base token unit
    pub buy_price_lamports_per_token: f64,
    /// Amount bought, in base token units
    pub amount_bought: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_transaction_status::parse_accounts::ParsedAccount;
    use solana_transaction_status::{
        EncodedTransactionWithStatusMeta, UiParsedMessage, UiTransaction,
    };

    fn parsed_tx(
        keys: &[Pubkey],
        block_time: Option<i64>,
    ) -> EncodedConfirmedTransactionWithStatusMeta {
        EncodedConfirmedTransactionWithStatusMeta {
            slot: 1,
            transaction: EncodedTransactionWithStatusMeta {
                transaction: EncodedTransaction::Json(UiTransaction {
                    signatures: vec![Signature::default().to_string()],
                    message: UiMessage::Parsed(UiParsedMessage {
                        account_keys: keys
                            .iter()
                            .map(|k| ParsedAccount {
                                pubkey: k.to_string(),
                                writable: false,
                                signer: false,
                                source: None,
                            })
                            .collect(),
                        recent_blockhash: Hash::default().to_string(),
                        instructions: vec![],
                        address_table_lookups: None,
                    }),
                }),
                meta: None,
                version: None,
            },
            block_time,
        }
    }

    #[test]
    fn event_extracts_addresses_and_block_time() {
        let keys: Vec<Pubkey> = (0..6).map(|_| Pubkey::new_unique()).collect();
        let tx = parsed_tx(&keys, Some(1_700_000_000));

        let event = MintEvent::from_transaction(Signature::default(), 42, &tx);

        assert_eq!(event.detected_at_ms, 42);
        assert_eq!(event.mint_timestamp_ms, Some(1_700_000_000_000));
        assert_eq!(event.mint, Some(keys[MINT_KEY_INDEX]));
        assert_eq!(event.bonding_curve, Some(keys[BONDING_CURVE_KEY_INDEX]));
        assert_eq!(
            event.associated_bonding_curve,
            Some(keys[ASSOCIATED_BONDING_CURVE_KEY_INDEX])
        );
        assert!(event.curve_accounts().is_some());
    }

    #[test]
    fn event_with_too_few_keys_has_no_curve_accounts() {
        let keys: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let tx = parsed_tx(&keys, None);

        let event = MintEvent::from_transaction(Signature::default(), 0, &tx);

        assert!(event.mint_timestamp_ms.is_none());
        assert!(event.bonding_curve.is_none());
        assert!(event.curve_accounts().is_none());
    }
}
