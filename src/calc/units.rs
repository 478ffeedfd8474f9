//! Hashrate unit conversion
//!
//! Every hashrate crossing into the engine is normalised to H/s here.

use crate::format::to_fixed;
use crate::HashrateUnit;

/// Display tiers for compact hashrate strings, H/s through ZH/s
pub const COMPACT_UNITS: [&str; 8] = ["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s", "EH/s", "ZH/s"];

/// Convert a magnitude in `unit` to hashes per second
pub fn to_hash_per_second(value: f64, unit: HashrateUnit) -> f64 {
    value * unit.factor()
}

/// Convert using a raw unit label; unknown labels are treated as H/s
pub fn label_to_hash_per_second(value: f64, unit_label: &str) -> f64 {
    to_hash_per_second(value, HashrateUnit::parse_lenient(unit_label))
}

/// Render H/s as "<value> <Unit>/s", scaling by 1000 up to ZH/s
pub fn format_compact(hashes_per_sec: f64, decimals: usize) -> String {
    let mut rate = hashes_per_sec;
    let mut unit_index = 0;

    while rate >= 1000.0 && unit_index < COMPACT_UNITS.len() - 1 {
        rate /= 1000.0;
        unit_index += 1;
    }

    format!("{} {}", to_fixed(rate, decimals), COMPACT_UNITS[unit_index])
}
