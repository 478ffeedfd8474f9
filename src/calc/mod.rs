//! Revenue calculation engine
//!
//! Pure functions only: no I/O, no clocks, no shared state. The network
//! snapshot and user inputs come in as values, numbers come out.

pub mod formula;
pub mod payout;
pub mod projection;
pub mod quarterly;
pub mod reward;
pub mod units;

pub use formula::{daily_btc, FormulaInputs};
pub use payout::{all_payout_models, PayoutOptions, PayoutRevenues};
pub use projection::{project, ProjectionParams, ProjectionPoint};
pub use quarterly::{summarize, QuarterSummary};
pub use reward::{subsidy_at_height, BlockReward};

use crate::{NetworkSnapshot, PayoutModel, PoolInputs};
use serde::{Deserialize, Serialize};

/// Satoshis per bitcoin
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Convert BTC to whole satoshis, rounding half up
pub fn btc_to_sats(btc: f64) -> f64 {
    (btc * SATS_PER_BTC + 0.5).floor()
}

/// Convert BTC to USD at `btc_price`
pub fn btc_to_usd(btc: f64, btc_price: f64) -> f64 {
    btc * btc_price
}

/// A daily amount scaled to common horizons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsHorizons {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

impl EarningsHorizons {
    /// Weekly ×7, monthly ×30, yearly ×365
    pub fn from_daily(daily: f64) -> Self {
        Self {
            daily,
            weekly: daily * 7.0,
            monthly: daily * 30.0,
            yearly: daily * 365.0,
        }
    }

    /// (label, amount) pairs in display order
    pub fn rows(&self) -> [(&'static str, f64); 4] {
        [
            ("Daily", self.daily),
            ("Weekly", self.weekly),
            ("Monthly", self.monthly),
            ("Yearly", self.yearly),
        ]
    }
}

/// Everything shown for the current period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentEstimate {
    pub pool_hashrate_hps: f64,
    pub reward: BlockReward,
    /// BTC the whole pool mines per day
    pub daily_btc: f64,
    pub share_percent: f64,
    pub expected_blocks_per_day: f64,
    /// Operator revenue per day at the flat pool fee
    pub pool_revenue_daily: f64,
    /// Operator revenue per day under the selected payout model
    pub selected_payout_revenue: f64,
    pub payouts: PayoutRevenues,
    pub horizons: EarningsHorizons,
}

/// Compute the current-period numbers for a pool against a snapshot
pub fn estimate_current(
    snapshot: &NetworkSnapshot,
    inputs: &PoolInputs,
    payout_model: PayoutModel,
    payout_options: &PayoutOptions,
) -> CurrentEstimate {
    let pool_hashrate_hps = inputs.hashrate_hps();
    let reward = BlockReward::from_snapshot(snapshot, inputs.tx_fee_override);

    let daily_btc = formula::daily_btc(
        inputs.formula,
        &FormulaInputs {
            hashrate: pool_hashrate_hps,
            difficulty: snapshot.difficulty,
            network_hashrate: snapshot.network_hashrate,
            block_reward: reward.total,
        },
    );

    let share_percent = formula::network_share_percent(pool_hashrate_hps, snapshot.network_hashrate);
    let expected_blocks_per_day =
        formula::expected_blocks_per_day(pool_hashrate_hps, snapshot.network_hashrate);

    let pool_revenue_daily = daily_btc * (inputs.pool_fee_percent / 100.0);

    CurrentEstimate {
        pool_hashrate_hps,
        reward,
        daily_btc,
        share_percent,
        expected_blocks_per_day,
        pool_revenue_daily,
        selected_payout_revenue: payout_model.revenue(
            daily_btc,
            inputs.pool_fee_percent,
            payout_options,
        ),
        payouts: all_payout_models(daily_btc, inputs.pool_fee_percent, payout_options.tx_fee_ratio),
        horizons: EarningsHorizons::from_daily(pool_revenue_daily),
    }
}
