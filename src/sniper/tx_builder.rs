//! Assembles the ordered instruction list for one trade transaction.
//!
//! Per rung: the rung's compute-unit price first, then (buys only) an
//! idempotent associated-token-account creation, then the encoded trade
//! instruction. The create-ATA instruction is safe to include when the
//! account already exists.

use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};

use crate::sniper::fee_ladder::FeeRung;
use crate::sniper::instruction_coder::{
    BuyArgs, EncodeError, InstructionCoder, SellArgs, TradeArgs, PUMP_EVENT_AUTHORITY,
    PUMP_FEE_RECIPIENT, PUMP_GLOBAL, PUMP_PROGRAM,
};
use crate::types::CurveAccounts;

/// Builds buy and sell instruction sets for a wallet against a bonding curve.
#[derive(Debug, Clone)]
pub struct TradeInstructionBuilder {
    coder: InstructionCoder,
    wallet: Pubkey,
    tokens_to_buy: u64,
    max_spend_lamports: u64,
}

impl TradeInstructionBuilder {
    pub fn new(wallet: Pubkey, tokens_to_buy: u64, max_spend_lamports: u64) -> Self {
        Self {
            coder: InstructionCoder::new(),
            wallet,
            tokens_to_buy,
            max_spend_lamports,
        }
    }

    /// The wallet's associated token account for `mint`, derived with the
    /// token program's own algorithm. A mismatch here surfaces as an
    /// on-chain rejection, not a local error.
    pub fn associated_token_account(&self, mint: &Pubkey) -> Pubkey {
        get_associated_token_address(&self.wallet, mint)
    }

    /// The token quantity every buy in a batch asks for, in base units.
    pub fn buy_amount(&self) -> u64 {
        self.tokens_to_buy
    }

    /// Fee-priority instruction, idempotent ATA creation, then the buy.
    pub fn build_buy(
        &self,
        accounts: &CurveAccounts,
        rung: &FeeRung,
    ) -> Result<Vec<Instruction>, EncodeError> {
        let user_ata = self.associated_token_account(&accounts.mint);
        let data = self.coder.encode(
            "buy",
            &TradeArgs::Buy(BuyArgs {
                amount: self.tokens_to_buy,
                max_sol_cost: self.max_spend_lamports,
            }),
        )?;

        let buy_ix = Instruction {
            program_id: PUMP_PROGRAM,
            accounts: vec![
                AccountMeta::new_readonly(PUMP_GLOBAL, false),
                AccountMeta::new(PUMP_FEE_RECIPIENT, false),
                AccountMeta::new_readonly(accounts.mint, false),
                AccountMeta::new(accounts.bonding_curve, false),
                AccountMeta::new(accounts.associated_bonding_curve, false),
                AccountMeta::new(user_ata, false),
                AccountMeta::new(self.wallet, true),
                AccountMeta::new_readonly(system_program::id(), false),
                AccountMeta::new_readonly(spl_token::id(), false),
                AccountMeta::new_readonly(sysvar::rent::id(), false),
                AccountMeta::new_readonly(PUMP_EVENT_AUTHORITY, false),
                AccountMeta::new_readonly(PUMP_PROGRAM, false),
            ],
            data,
        };

        Ok(vec![
            ComputeBudgetInstruction::set_compute_unit_price(rung.micro_lamports_per_cu),
            create_associated_token_account_idempotent(
                &self.wallet,
                &self.wallet,
                &accounts.mint,
                &spl_token::id(),
            ),
            buy_ix,
        ])
    }

    /// Fee-priority instruction, then a sell of `amount` base units with a
    /// zero minimum output (guaranteed exit, no price protection).
    pub fn build_sell(
        &self,
        accounts: &CurveAccounts,
        amount: u64,
        rung: &FeeRung,
    ) -> Result<Vec<Instruction>, EncodeError> {
        let user_ata = self.associated_token_account(&accounts.mint);
        let data = self.coder.encode(
            "sell",
            &TradeArgs::Sell(SellArgs {
                amount,
                min_sol_output: 0,
            }),
        )?;

        let sell_ix = Instruction {
            program_id: PUMP_PROGRAM,
            accounts: vec![
                AccountMeta::new_readonly(PUMP_GLOBAL, false),
                AccountMeta::new(PUMP_FEE_RECIPIENT, false),
                AccountMeta::new_readonly(accounts.mint, false),
                AccountMeta::new(accounts.bonding_curve, false),
                AccountMeta::new(accounts.associated_bonding_curve, false),
                AccountMeta::new(user_ata, false),
                AccountMeta::new(self.wallet, true),
                AccountMeta::new_readonly(system_program::id(), false),
                AccountMeta::new_readonly(spl_associated_token_account::id(), false),
                AccountMeta::new_readonly(spl_token::id(), false),
                AccountMeta::new_readonly(PUMP_EVENT_AUTHORITY, false),
                AccountMeta::new_readonly(PUMP_PROGRAM, false),
            ],
            data,
        };

        Ok(vec![
            ComputeBudgetInstruction::set_compute_unit_price(rung.micro_lamports_per_cu),
            sell_ix,
        ])
    }
}

/// Bonding-curve PDA for a mint, per the program's own derivation.
pub fn derive_bonding_curve(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[b"bonding-curve", mint.as_ref()], &PUMP_PROGRAM).0
}

/// The full trade account set for a mint, re-derived deterministically.
/// Used when only the mint survived (e.g. an entry in the position book).
pub fn derive_curve_accounts(mint: &Pubkey) -> CurveAccounts {
    let bonding_curve = derive_bonding_curve(mint);
    CurveAccounts {
        mint: *mint,
        bonding_curve,
        associated_bonding_curve: get_associated_token_address(&bonding_curve, mint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::compute_budget;

    fn sample_accounts() -> CurveAccounts {
        CurveAccounts {
            mint: Pubkey::new_unique(),
            bonding_curve: Pubkey::new_unique(),
            associated_bonding_curve: Pubkey::new_unique(),
        }
    }

    fn rung(fee: u64) -> FeeRung {
        FeeRung {
            index: 0,
            micro_lamports_per_cu: fee,
        }
    }

    #[test]
    fn buy_set_is_fee_then_ata_then_swap() {
        let wallet = Pubkey::new_unique();
        let builder = TradeInstructionBuilder::new(wallet, 3_333_000_000, 100_000);
        let accounts = sample_accounts();

        let instructions = builder.build_buy(&accounts, &rung(1_000)).unwrap();

        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].program_id, compute_budget::id());
        assert_eq!(instructions[1].program_id, spl_associated_token_account::id());
        assert_eq!(instructions[2].program_id, PUMP_PROGRAM);

        let buy_ix = &instructions[2];
        assert_eq!(buy_ix.accounts.len(), 12);
        assert_eq!(buy_ix.accounts[2].pubkey, accounts.mint);
        assert_eq!(buy_ix.accounts[3].pubkey, accounts.bonding_curve);
        assert_eq!(buy_ix.accounts[4].pubkey, accounts.associated_bonding_curve);
        assert_eq!(
            buy_ix.accounts[5].pubkey,
            get_associated_token_address(&wallet, &accounts.mint)
        );
        assert!(buy_ix.accounts[6].is_signer);

        let decoded = InstructionCoder::new().decode("buy", &buy_ix.data).unwrap();
        assert_eq!(
            decoded,
            TradeArgs::Buy(BuyArgs {
                amount: 3_333_000_000,
                max_sol_cost: 100_000,
            })
        );
    }

    #[test]
    fn sell_set_omits_ata_creation_and_accepts_any_price() {
        let wallet = Pubkey::new_unique();
        let builder = TradeInstructionBuilder::new(wallet, 3_333_000_000, 100_000);
        let accounts = sample_accounts();

        let instructions = builder
            .build_sell(&accounts, 3_333_000_000, &rung(2_000))
            .unwrap();

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].program_id, compute_budget::id());
        assert_eq!(instructions[1].program_id, PUMP_PROGRAM);

        let sell_ix = &instructions[1];
        assert_eq!(sell_ix.accounts.len(), 12);
        assert_eq!(
            sell_ix.accounts[8].pubkey,
            spl_associated_token_account::id()
        );

        let decoded = InstructionCoder::new()
            .decode("sell", &sell_ix.data)
            .unwrap();
        assert_eq!(
            decoded,
            TradeArgs::Sell(SellArgs {
                amount: 3_333_000_000,
                min_sol_output: 0,
            })
        );
    }

    #[test]
    fn derived_accounts_are_deterministic_and_off_curve() {
        let mint = Pubkey::new_unique();
        let first = derive_curve_accounts(&mint);
        let second = derive_curve_accounts(&mint);

        assert_eq!(first.bonding_curve, second.bonding_curve);
        assert_eq!(
            first.associated_bonding_curve,
            get_associated_token_address(&first.bonding_curve, &mint)
        );
        assert!(!first.bonding_curve.is_on_curve());
    }

    #[test]
    fn rungs_differ_only_in_the_fee_instruction() {
        let wallet = Pubkey::new_unique();
        let builder = TradeInstructionBuilder::new(wallet, 1_000_000, 100_000);
        let accounts = sample_accounts();

        let low = builder.build_buy(&accounts, &rung(1_000)).unwrap();
        let high = builder.build_buy(&accounts, &rung(9_000)).unwrap();

        assert_ne!(low[0].data, high[0].data);
        assert_eq!(low[1], high[1]);
        assert_eq!(low[2], high[2]);
    }
}
