//! Typed instruction encoding against the pump.fun program interface.
//!
//! The interface description (instruction names, their 8-byte discriminators
//! and Borsh argument layouts) is compiled in and loaded once; the coder is a
//! pure function over it. An encoding failure is fatal for the trade attempt
//! that requested it, never retryable.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{pubkey, pubkey::Pubkey};
use thiserror::Error;

/// The pump.fun bonding-curve program.
pub const PUMP_PROGRAM: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");
/// Program-wide global state account.
pub const PUMP_GLOBAL: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");
/// Event authority PDA.
pub const PUMP_EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");
/// Protocol fee recipient.
pub const PUMP_FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");

/// Arguments of the `buy` instruction. `max_sol_cost` is the slippage bound:
/// the program rejects the trade when the realized cost exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BuyArgs {
    pub amount: u64,
    pub max_sol_cost: u64,
}

/// Arguments of the `sell` instruction. `min_sol_output` of zero accepts
/// any price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SellArgs {
    pub amount: u64,
    pub min_sol_output: u64,
}

/// A typed instruction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeArgs {
    Buy(BuyArgs),
    Sell(SellArgs),
}

impl TradeArgs {
    fn instruction_name(&self) -> &'static str {
        match self {
            TradeArgs::Buy(_) => "buy",
            TradeArgs::Sell(_) => "sell",
        }
    }
}

struct InstructionDef {
    name: &'static str,
    discriminator: [u8; 8],
}

/// The program's published instruction set.
const INTERFACE: &[InstructionDef] = &[
    InstructionDef {
        name: "buy",
        discriminator: [102, 6, 61, 18, 1, 218, 235, 234],
    },
    InstructionDef {
        name: "sell",
        discriminator: [51, 230, 133, 164, 1, 127, 131, 173],
    },
];

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unknown instruction `{0}` in program interface")]
    UnknownInstruction(String),
    #[error("instruction `{instruction}` called with `{provided}` arguments")]
    ArgumentMismatch {
        instruction: &'static str,
        provided: &'static str,
    },
    #[error("instruction data does not carry the `{0}` discriminator")]
    DiscriminatorMismatch(&'static str),
    #[error(transparent)]
    Serialization(#[from] std::io::Error),
}

/// Encoder/decoder over the compiled-in interface description.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionCoder;

impl InstructionCoder {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `args` for the named instruction: discriminator first, then
    /// the Borsh-encoded argument struct.
    pub fn encode(&self, name: &str, args: &TradeArgs) -> Result<Vec<u8>, EncodeError> {
        let def = lookup(name).ok_or_else(|| EncodeError::UnknownInstruction(name.to_string()))?;
        if args.instruction_name() != def.name {
            return Err(EncodeError::ArgumentMismatch {
                instruction: def.name,
                provided: args.instruction_name(),
            });
        }

        let mut data = Vec::with_capacity(8 + 16);
        data.extend_from_slice(&def.discriminator);
        match args {
            TradeArgs::Buy(buy) => data.extend(borsh::to_vec(buy)?),
            TradeArgs::Sell(sell) => data.extend(borsh::to_vec(sell)?),
        }
        Ok(data)
    }

    /// Inverse of [`encode`](Self::encode); checks the discriminator prefix
    /// before deserializing.
    pub fn decode(&self, name: &str, data: &[u8]) -> Result<TradeArgs, EncodeError> {
        let def = lookup(name).ok_or_else(|| EncodeError::UnknownInstruction(name.to_string()))?;
        let payload = data
            .strip_prefix(&def.discriminator[..])
            .ok_or(EncodeError::DiscriminatorMismatch(def.name))?;

        let args = match def.name {
            "buy" => TradeArgs::Buy(BuyArgs::try_from_slice(payload)?),
            _ => TradeArgs::Sell(SellArgs::try_from_slice(payload)?),
        };
        Ok(args)
    }
}

fn lookup(name: &str) -> Option<&'static InstructionDef> {
    INTERFACE.iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_encoding_has_discriminator_then_le_args() {
        let coder = InstructionCoder::new();
        let data = coder
            .encode(
                "buy",
                &TradeArgs::Buy(BuyArgs {
                    amount: 3_333_000_000,
                    max_sol_cost: 100_000,
                }),
            )
            .unwrap();

        assert_eq!(&data[..8], &[102, 6, 61, 18, 1, 218, 235, 234]);
        assert_eq!(&data[8..16], &3_333_000_000u64.to_le_bytes());
        assert_eq!(&data[16..24], &100_000u64.to_le_bytes());
    }

    #[test]
    fn sell_round_trips_through_decode() {
        let coder = InstructionCoder::new();
        let args = TradeArgs::Sell(SellArgs {
            amount: 42,
            min_sol_output: 0,
        });
        let data = coder.encode("sell", &args).unwrap();
        assert_eq!(coder.decode("sell", &data).unwrap(), args);
    }

    #[test]
    fn unknown_instruction_is_rejected() {
        let coder = InstructionCoder::new();
        let result = coder.encode(
            "withdraw",
            &TradeArgs::Sell(SellArgs {
                amount: 1,
                min_sol_output: 0,
            }),
        );
        assert!(matches!(result, Err(EncodeError::UnknownInstruction(_))));
    }

    #[test]
    fn mismatched_argument_variant_is_rejected() {
        let coder = InstructionCoder::new();
        let result = coder.encode(
            "buy",
            &TradeArgs::Sell(SellArgs {
                amount: 1,
                min_sol_output: 0,
            }),
        );
        assert!(matches!(result, Err(EncodeError::ArgumentMismatch { .. })));
    }

    #[test]
    fn decode_rejects_foreign_discriminator() {
        let coder = InstructionCoder::new();
        let data = coder
            .encode(
                "buy",
                &TradeArgs::Buy(BuyArgs {
                    amount: 1,
                    max_sol_cost: 1,
                }),
            )
            .unwrap();
        assert!(matches!(
            coder.decode("sell", &data),
            Err(EncodeError::DiscriminatorMismatch(_))
        ));
    }
}
