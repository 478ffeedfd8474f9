//! Block reward model
//!
//! Subsidy follows the halving schedule; the fee component is either the
//! network's observed average or a user override.

use crate::NetworkSnapshot;
use serde::{Deserialize, Serialize};

/// Blocks between subsidy halvings
pub const HALVING_INTERVAL: u64 = 210_000;

/// Subsidy of the first epoch in BTC
pub const INITIAL_SUBSIDY_BTC: f64 = 50.0;

/// Block subsidy in BTC at `height`
pub fn subsidy_at_height(height: u64) -> f64 {
    let halvings = height / HALVING_INTERVAL;
    INITIAL_SUBSIDY_BTC / 2f64.powf(halvings as f64)
}

/// Per-block tx fees to use; the override always wins once set
pub fn effective_tx_fees(observed: f64, tx_fee_override: Option<f64>) -> f64 {
    tx_fee_override.unwrap_or(observed)
}

/// Subsidy plus fees
pub fn total_reward(subsidy: f64, tx_fees: f64) -> f64 {
    subsidy + tx_fees
}

/// Reward breakdown for one block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockReward {
    pub subsidy: f64,
    pub tx_fees: f64,
    pub total: f64,
}

impl BlockReward {
    pub fn new(subsidy: f64, tx_fees: f64) -> Self {
        Self {
            subsidy,
            tx_fees,
            total: total_reward(subsidy, tx_fees),
        }
    }

    /// Reward for the snapshot's tip, honouring a fee override
    pub fn from_snapshot(snapshot: &NetworkSnapshot, tx_fee_override: Option<f64>) -> Self {
        Self::new(
            snapshot.block_subsidy,
            effective_tx_fees(snapshot.avg_block_fees, tx_fee_override),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(height: u64, fees: f64) -> NetworkSnapshot {
        NetworkSnapshot {
            network_hashrate: 5e20,
            difficulty: 7e13,
            block_height: height,
            block_subsidy: subsidy_at_height(height),
            avg_block_fees: fees,
            btc_price_usd: 60_000.0,
            observed_at: Utc::now(),
            difficulty_adjustment: None,
        }
    }

    #[test]
    fn test_subsidy_schedule() {
        assert_eq!(subsidy_at_height(0), 50.0);
        assert_eq!(subsidy_at_height(209_999), 50.0);
        assert_eq!(subsidy_at_height(210_000), 25.0);
        assert_eq!(subsidy_at_height(630_000), 6.25);
        assert_eq!(subsidy_at_height(840_000), 3.125);
        assert_eq!(subsidy_at_height(1_049_999), 3.125);
    }

    #[test]
    fn test_subsidy_far_future_is_zero() {
        assert_eq!(subsidy_at_height(u64::MAX), 0.0);
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(effective_tx_fees(0.2, None), 0.2);
        assert_eq!(effective_tx_fees(0.2, Some(0.5)), 0.5);
        assert_eq!(effective_tx_fees(0.2, Some(0.0)), 0.0);
    }

    #[test]
    fn test_reward_from_snapshot() {
        let reward = BlockReward::from_snapshot(&snapshot(850_000, 0.125), None);
        assert_eq!(reward.subsidy, 3.125);
        assert_eq!(reward.tx_fees, 0.125);
        assert_eq!(reward.total, 3.25);

        let reward = BlockReward::from_snapshot(&snapshot(850_000, 0.125), Some(0.375));
        assert_eq!(reward.total, 3.5);
    }
}
