//! Exitable timestamps and exit priority.

use serde::{Deserialize, Serialize};

use crate::types::{ExitId, UtxoPos};

/// Computes when an exit becomes final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitableTimestamp {
    /// Minimum exit period in seconds.
    pub min_exit_period: u64,
}

impl ExitableTimestamp {
    pub fn new(min_exit_period: u64) -> Self {
        Self { min_exit_period }
    }

    /// Earliest finalization time of an exit filed at `now` against an output
    /// created in a block with timestamp `block_timestamp`.
    ///
    /// Deposits wait one period from filing. Chain outputs wait until both one
    /// period after filing and two periods after their block have passed, so an
    /// exit from an old block still gets a full challenge window.
    pub fn calculate(&self, now: u64, block_timestamp: u64, is_deposit: bool) -> u64 {
        let from_filing = now.saturating_add(self.min_exit_period);
        if is_deposit {
            return from_filing;
        }
        let from_block = block_timestamp.saturating_add(self.min_exit_period.saturating_mul(2));
        from_filing.max(from_block)
    }
}

/// Position of an exit in the priority queue.
///
/// Ordered by exitable time, then by transaction age, then by exit id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ExitPriority {
    pub exitable_at: u64,
    pub tx_pos: u128,
    pub exit_id: ExitId,
}

impl ExitPriority {
    pub fn new(exitable_at: u64, utxo_pos: UtxoPos, exit_id: ExitId) -> Self {
        Self {
            exitable_at,
            tx_pos: utxo_pos.tx_pos(),
            exit_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use proptest::prelude::*;

    const WEEK: u64 = 604_800;

    #[test]
    fn test_deposit_waits_one_period() {
        let policy = ExitableTimestamp::new(WEEK);
        assert_eq!(policy.calculate(1_000, 0, true), 1_000 + WEEK);
    }

    #[test]
    fn test_old_chain_block_waits_one_period_from_filing() {
        let policy = ExitableTimestamp::new(WEEK);
        let now = 10 * WEEK;
        assert_eq!(policy.calculate(now, WEEK, false), now + WEEK);
    }

    #[test]
    fn test_fresh_chain_block_waits_two_periods_from_block() {
        let policy = ExitableTimestamp::new(WEEK);
        let block = 5 * WEEK;
        assert_eq!(policy.calculate(block + 10, block, false), block + 2 * WEEK);
    }

    #[test]
    fn test_saturates() {
        let policy = ExitableTimestamp::new(u64::MAX);
        assert_eq!(policy.calculate(5, 5, false), u64::MAX);
    }

    #[test]
    fn test_priority_order() {
        let id = |v: u8| ExitId::from_u256(U256::from(v)).unwrap();
        let early = ExitPriority::new(10, UtxoPos::new(2000, 0, 0).unwrap(), id(9));
        let older_tx = ExitPriority::new(20, UtxoPos::new(1000, 0, 0).unwrap(), id(9));
        let newer_tx = ExitPriority::new(20, UtxoPos::new(1000, 1, 0).unwrap(), id(1));
        assert!(early < older_tx);
        assert!(older_tx < newer_tx);

        // Outputs of one transaction share a tx position; the id breaks ties.
        let a = ExitPriority::new(20, UtxoPos::new(1000, 1, 0).unwrap(), id(1));
        let b = ExitPriority::new(20, UtxoPos::new(1000, 1, 3).unwrap(), id(2));
        assert!(a < b);
    }

    proptest! {
        #[test]
        fn test_never_before_filing(now in 0u64..u64::MAX / 4, block in 0u64..u64::MAX / 4, deposit in any::<bool>()) {
            let policy = ExitableTimestamp::new(WEEK);
            prop_assert!(policy.calculate(now, block, deposit) >= now + WEEK);
        }

        #[test]
        fn test_chain_at_least_period_after_later_of_now_and_block(now in 0u64..u64::MAX / 4, block in 0u64..u64::MAX / 4) {
            let policy = ExitableTimestamp::new(WEEK);
            prop_assert!(policy.calculate(now, block, false) >= now.max(block) + WEEK);
        }

        #[test]
        fn test_monotonic_in_block_timestamp(now in 0u64..u64::MAX / 4, a in 0u64..u64::MAX / 4, b in 0u64..u64::MAX / 4, deposit in any::<bool>()) {
            let policy = ExitableTimestamp::new(WEEK);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(policy.calculate(now, lo, deposit) <= policy.calculate(now, hi, deposit));
        }
    }
}
