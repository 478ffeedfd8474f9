//! Expected daily BTC for a given hashrate
//!
//! Two derivations of the same quantity: one from difficulty (hashes needed
//! per block), one from the pool's share of network hashrate. For consistent
//! inputs they agree to floating-point tolerance.
//!
//! A zero or NaN denominator yields 0 rather than an error. NaN in any other
//! input propagates.

use crate::FormulaType;

/// Seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Blocks per day at the 10-minute target spacing
pub const BLOCKS_PER_DAY: f64 = 144.0;

/// Expected hashes per unit of difficulty
pub const TWO_POW_32: f64 = 4_294_967_296.0;

/// True when a denominator cannot produce a meaningful quotient
fn is_unusable_denominator(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

/// Inputs for a current-period daily-BTC estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaInputs {
    /// Pool hashrate in H/s
    pub hashrate: f64,
    pub difficulty: f64,
    /// Network hashrate in H/s
    pub network_hashrate: f64,
    /// Block reward in BTC
    pub block_reward: f64,
}

/// `(hashrate × reward × 86400) ÷ (difficulty × 2^32)`
pub fn daily_btc_by_difficulty(hashrate: f64, difficulty: f64, block_reward: f64) -> f64 {
    if is_unusable_denominator(difficulty) {
        return 0.0;
    }

    (hashrate * block_reward * SECONDS_PER_DAY) / (difficulty * TWO_POW_32)
}

/// `(hashrate ÷ network) × 144 × reward`
pub fn daily_btc_by_hashrate_ratio(hashrate: f64, network_hashrate: f64, block_reward: f64) -> f64 {
    if is_unusable_denominator(network_hashrate) {
        return 0.0;
    }

    let share_of_network = hashrate / network_hashrate;
    share_of_network * BLOCKS_PER_DAY * block_reward
}

/// Daily BTC using the selected derivation
pub fn daily_btc(formula: FormulaType, inputs: &FormulaInputs) -> f64 {
    match formula {
        FormulaType::Difficulty => {
            daily_btc_by_difficulty(inputs.hashrate, inputs.difficulty, inputs.block_reward)
        }
        FormulaType::HashrateRatio => daily_btc_by_hashrate_ratio(
            inputs.hashrate,
            inputs.network_hashrate,
            inputs.block_reward,
        ),
    }
}

/// Pool share of the network in percent
pub fn network_share_percent(hashrate: f64, network_hashrate: f64) -> f64 {
    if is_unusable_denominator(network_hashrate) {
        return 0.0;
    }
    (hashrate / network_hashrate) * 100.0
}

/// Blocks the pool is expected to find per day
pub fn expected_blocks_per_day(hashrate: f64, network_hashrate: f64) -> f64 {
    if is_unusable_denominator(network_hashrate) {
        return 0.0;
    }
    (hashrate / network_hashrate) * BLOCKS_PER_DAY
}

/// Network hashrate implied by a difficulty at the target block spacing
pub fn implied_network_hashrate(difficulty: f64) -> f64 {
    difficulty * TWO_POW_32 / (SECONDS_PER_DAY / BLOCKS_PER_DAY)
}
