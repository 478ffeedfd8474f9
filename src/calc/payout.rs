//! Operator fee revenue under each payout model
//!
//! All functions take the pool's daily BTC and return the slice the operator
//! keeps. Under the default luck factor PPLNS and Proportional collapse onto
//! FPPS; the luck multiplier is an extension point, not a variance model.

use crate::PayoutModel;
use serde::{Deserialize, Serialize};

/// Share of block rewards assumed to come from tx fees under PPS+
pub const DEFAULT_TX_FEE_RATIO: f64 = 0.03;

/// Neutral pool luck
pub const DEFAULT_LUCK_FACTOR: f64 = 1.0;

/// Tunables shared by the payout models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutOptions {
    pub tx_fee_ratio: f64,
    pub luck_factor: f64,
}

impl Default for PayoutOptions {
    fn default() -> Self {
        Self {
            tx_fee_ratio: DEFAULT_TX_FEE_RATIO,
            luck_factor: DEFAULT_LUCK_FACTOR,
        }
    }
}

/// PPS+: fee on the subsidy portion only, tx fees pass through to miners
pub fn pps_plus_revenue(daily_btc: f64, fee_percent: f64, tx_fee_ratio: f64) -> f64 {
    let subsidy_portion = daily_btc * (1.0 - tx_fee_ratio);
    subsidy_portion * (fee_percent / 100.0)
}

/// FPPS: fee on everything
pub fn fpps_revenue(daily_btc: f64, fee_percent: f64) -> f64 {
    daily_btc * (fee_percent / 100.0)
}

/// PPLNS: fee on luck-adjusted proceeds
pub fn pplns_revenue(daily_btc: f64, fee_percent: f64, luck_factor: f64) -> f64 {
    let actual_btc = daily_btc * luck_factor;
    actual_btc * (fee_percent / 100.0)
}

/// Proportional: flat fee on everything
pub fn proportional_revenue(daily_btc: f64, fee_percent: f64) -> f64 {
    daily_btc * (fee_percent / 100.0)
}

impl PayoutModel {
    /// Operator revenue for this model
    pub fn revenue(&self, daily_btc: f64, fee_percent: f64, options: &PayoutOptions) -> f64 {
        match self {
            PayoutModel::PpsPlus => pps_plus_revenue(daily_btc, fee_percent, options.tx_fee_ratio),
            PayoutModel::Fpps => fpps_revenue(daily_btc, fee_percent),
            PayoutModel::Pplns => pplns_revenue(daily_btc, fee_percent, options.luck_factor),
            PayoutModel::Proportional => proportional_revenue(daily_btc, fee_percent),
        }
    }
}

/// Operator revenue side by side for every payout model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutRevenues {
    pub pps_plus: f64,
    pub fpps: f64,
    pub pplns: f64,
    pub proportional: f64,
}

impl PayoutRevenues {
    /// Revenue for a single model
    pub fn get(&self, model: PayoutModel) -> f64 {
        match model {
            PayoutModel::PpsPlus => self.pps_plus,
            PayoutModel::Fpps => self.fpps,
            PayoutModel::Pplns => self.pplns,
            PayoutModel::Proportional => self.proportional,
        }
    }

    /// (model, revenue) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (PayoutModel, f64)> + '_ {
        [
            PayoutModel::PpsPlus,
            PayoutModel::Fpps,
            PayoutModel::Pplns,
            PayoutModel::Proportional,
        ]
        .into_iter()
        .map(move |model| (model, self.get(model)))
    }
}

/// Compute all four models; PPLNS is evaluated at neutral luck
pub fn all_payout_models(daily_btc: f64, fee_percent: f64, tx_fee_ratio: f64) -> PayoutRevenues {
    PayoutRevenues {
        pps_plus: pps_plus_revenue(daily_btc, fee_percent, tx_fee_ratio),
        fpps: fpps_revenue(daily_btc, fee_percent),
        pplns: pplns_revenue(daily_btc, fee_percent, DEFAULT_LUCK_FACTOR),
        proportional: proportional_revenue(daily_btc, fee_percent),
    }
}
