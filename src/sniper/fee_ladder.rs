//! Priority-fee ladder generation.
//!
//! A spam batch submits otherwise-identical transactions at ascending
//! priority fees; the ladder is the arithmetic sequence of those fees.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// One rung of the ladder: submission index and its priority fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRung {
    /// Position within the batch; index order is submission order
    pub index: usize,
    /// Priority fee in micro-lamports per compute unit
    pub micro_lamports_per_cu: u64,
}

/// Generates ascending fee ladders from a base price and step.
#[derive(Debug, Clone, Copy)]
pub struct PriorityFeeLadder {
    base_micro_lamports: u64,
    step_micro_lamports: u64,
}

impl PriorityFeeLadder {
    pub fn new(base_micro_lamports: u64, step_micro_lamports: u64) -> Self {
        Self {
            base_micro_lamports,
            step_micro_lamports,
        }
    }

    /// Rung `i` gets fee `base + i * step`. Strictly increasing whenever
    /// `step > 0`; the non-zero count makes an empty ladder unrepresentable.
    pub fn generate(&self, count: NonZeroUsize) -> NonEmpty<FeeRung> {
        let mut rungs = NonEmpty::new(FeeRung {
            index: 0,
            micro_lamports_per_cu: self.base_micro_lamports,
        });
        for index in 1..count.get() {
            rungs.push(FeeRung {
                index,
                micro_lamports_per_cu: self.base_micro_lamports
                    + index as u64 * self.step_micro_lamports,
            });
        }
        rungs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn generates_exact_arithmetic_sequence() {
        let ladder = PriorityFeeLadder::new(1000, 250);
        let rungs = ladder.generate(count(4));

        let fees: Vec<u64> = rungs.iter().map(|r| r.micro_lamports_per_cu).collect();
        assert_eq!(fees, vec![1000, 1250, 1500, 1750]);

        let indices: Vec<usize> = rungs.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_rung_ladder_is_just_the_base() {
        let ladder = PriorityFeeLadder::new(5000, 9999);
        let rungs = ladder.generate(count(1));
        assert_eq!(rungs.len(), 1);
        assert_eq!(rungs.head.micro_lamports_per_cu, 5000);
    }

    #[test]
    fn zero_step_yields_flat_ladder() {
        let ladder = PriorityFeeLadder::new(777, 0);
        let rungs = ladder.generate(count(3));
        assert!(rungs.iter().all(|r| r.micro_lamports_per_cu == 777));
    }

    #[test]
    fn fees_are_strictly_increasing_with_positive_step() {
        let ladder = PriorityFeeLadder::new(0, 1);
        let rungs = ladder.generate(count(10));
        for pair in rungs.iter().collect::<Vec<_>>().windows(2) {
            assert!(pair[0].micro_lamports_per_cu < pair[1].micro_lamports_per_cu);
        }
    }
}
