//! Core types for pool revenue estimation
//!
//! Value records shared between the calculation engine, the network data
//! source and the rendering layer. None of them has identity beyond a single
//! computation.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hashrate magnitude units, each a power of 1000 above the previous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashrateUnit {
    H,
    KH,
    MH,
    GH,
    TH,
    PH,
    EH,
}

impl HashrateUnit {
    /// All units in ascending order
    pub const ALL: [HashrateUnit; 7] = [
        HashrateUnit::H,
        HashrateUnit::KH,
        HashrateUnit::MH,
        HashrateUnit::GH,
        HashrateUnit::TH,
        HashrateUnit::PH,
        HashrateUnit::EH,
    ];

    /// Multiplier converting a value in this unit to H/s
    pub fn factor(&self) -> f64 {
        match self {
            HashrateUnit::H => 1.0,
            HashrateUnit::KH => 1e3,
            HashrateUnit::MH => 1e6,
            HashrateUnit::GH => 1e9,
            HashrateUnit::TH => 1e12,
            HashrateUnit::PH => 1e15,
            HashrateUnit::EH => 1e18,
        }
    }

    /// Short label without the "/s" suffix
    pub fn label(&self) -> &'static str {
        match self {
            HashrateUnit::H => "H",
            HashrateUnit::KH => "KH",
            HashrateUnit::MH => "MH",
            HashrateUnit::GH => "GH",
            HashrateUnit::TH => "TH",
            HashrateUnit::PH => "PH",
            HashrateUnit::EH => "EH",
        }
    }

    /// Parse a unit label, falling back to H/s for anything unrecognised
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(HashrateUnit::H)
    }
}

impl FromStr for HashrateUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        let normalized = normalized.strip_suffix("/S").unwrap_or(&normalized);
        HashrateUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.label() == normalized)
            .ok_or_else(|| Error::invalid_input("hashrate_unit", format!("unknown unit '{}'", s)))
    }
}

impl fmt::Display for HashrateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Hash rate in hashes per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct HashRate(pub f64);

impl HashRate {
    /// Create new hash rate from H/s
    pub fn new(rate: f64) -> Self {
        Self(rate)
    }

    /// Create from a magnitude expressed in `unit`
    pub fn from_unit(value: f64, unit: HashrateUnit) -> Self {
        Self(crate::calc::units::to_hash_per_second(value, unit))
    }

    /// Get the rate value in H/s
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Parse "<number>[unit]" such as "100", "100PH" or "1.5 EH/s".
    ///
    /// A bare number is scaled by `default_unit`.
    pub fn from_str_with_units(s: &str, default_unit: HashrateUnit) -> Result<Self> {
        let s = s.trim();
        if let Ok(magnitude) = s.parse::<f64>() {
            return Ok(Self::from_unit(magnitude, default_unit));
        }

        // The unit starts after the last digit, so exponents stay with the number
        let split = s
            .rfind(|c: char| c.is_ascii_digit() || c == '.')
            .map_or(0, |index| index + 1);
        let (number, suffix) = s.split_at(split);

        let magnitude: f64 = number
            .trim()
            .parse()
            .map_err(|e| Error::invalid_input("hashrate", format!("'{}': {}", s, e)))?;

        let unit = if suffix.trim().is_empty() {
            default_unit
        } else {
            suffix.parse()?
        };

        Ok(Self::from_unit(magnitude, unit))
    }
}

impl fmt::Display for HashRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::calc::units::format_compact(self.0, 2))
    }
}

/// Daily-BTC derivation used for the current period
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormulaType {
    /// (hashrate × reward × 86400) ÷ (difficulty × 2^32)
    Difficulty,
    /// (hashrate ÷ network) × 144 × reward
    #[value(alias = "hashrate")]
    #[serde(alias = "hashrate")]
    HashrateRatio,
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaType::Difficulty => write!(f, "difficulty"),
            FormulaType::HashrateRatio => write!(f, "hashrate-ratio"),
        }
    }
}

/// Bucket size of a forward projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Length of one period in days
    pub fn period_days(&self) -> u32 {
        match self {
            Granularity::Daily => 1,
            Granularity::Weekly => 7,
            Granularity::Monthly => 30,
        }
    }

    /// Fraction of a (fixed 30-day) month covered by one period
    pub fn month_fraction(&self) -> f64 {
        f64::from(self.period_days()) / 30.0
    }

    /// Upper bound on emitted periods regardless of the requested range
    pub fn max_periods(&self) -> u32 {
        match self {
            Granularity::Daily => 365,
            Granularity::Weekly => 104,
            Granularity::Monthly => 36,
        }
    }

    /// Row label prefix ("Day 3", "Week 3", ...)
    pub fn period_label(&self) -> &'static str {
        match self {
            Granularity::Daily => "Day",
            Granularity::Weekly => "Week",
            Granularity::Monthly => "Month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Weekly => write!(f, "weekly"),
            Granularity::Monthly => write!(f, "monthly"),
        }
    }
}

/// How a pool turns mining proceeds into miner payouts and operator fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayoutModel {
    /// Pay per share plus; fee charged on the subsidy portion only
    #[value(name = "pps-plus", alias = "pps")]
    #[serde(alias = "pps")]
    PpsPlus,
    /// Full pay per share; fee charged on subsidy and tx fees
    Fpps,
    /// Pay per last N shares; luck passes through to miners
    Pplns,
    /// Flat share of everything the pool finds
    Proportional,
}

impl fmt::Display for PayoutModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutModel::PpsPlus => write!(f, "PPS+"),
            PayoutModel::Fpps => write!(f, "FPPS"),
            PayoutModel::Pplns => write!(f, "PPLNS"),
            PayoutModel::Proportional => write!(f, "Proportional"),
        }
    }
}

/// Denomination used when rendering BTC amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Btc,
    Sats,
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayUnit::Btc => write!(f, "BTC"),
            DisplayUnit::Sats => write!(f, "Sats"),
        }
    }
}

/// Progress towards the next difficulty retarget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    pub progress_percent: f64,
    /// Expected change at the next retarget, in percent
    pub difficulty_change: f64,
    pub remaining_blocks: u64,
    /// Milliseconds until the retarget
    pub remaining_time_ms: u64,
    pub next_retarget_height: u64,
    pub estimated_retarget_date: Option<DateTime<Utc>>,
}

/// Observed state of the Bitcoin network at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Network hashrate in H/s
    pub network_hashrate: f64,
    pub difficulty: f64,
    pub block_height: u64,
    /// Subsidy in BTC, derived from `block_height`
    pub block_subsidy: f64,
    /// Average transaction fees per block in BTC
    pub avg_block_fees: f64,
    pub btc_price_usd: f64,
    pub observed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_adjustment: Option<DifficultyAdjustment>,
}

/// User-supplied pool parameters for the current-period estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolInputs {
    pub hashrate: f64,
    pub hashrate_unit: HashrateUnit,
    pub pool_fee_percent: f64,
    pub formula: FormulaType,
    /// Average tx fees per block in BTC; replaces the observed value when set
    pub tx_fee_override: Option<f64>,
}

impl PoolInputs {
    /// Pool hashrate in H/s
    pub fn hashrate_hps(&self) -> f64 {
        crate::calc::units::to_hash_per_second(self.hashrate, self.hashrate_unit)
    }
}
