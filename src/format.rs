//! Display formatting for calculated quantities
//!
//! Every formatter is total: NaN input yields [`PLACEHOLDER`] instead of a
//! garbled number. Exponential output uses a signed exponent (`1.00e-8`,
//! `6.50e+20`) so it reads the same as the web calculator it replaces.

use crate::calc::{btc_to_sats, units};
use crate::DisplayUnit;

/// Shown in place of a value that cannot be rendered
pub const PLACEHOLDER: &str = "--";

/// Digits printed past the requested precision to detect an exact tie
const TIE_WIDTH: usize = 30;

/// Add one unit in the last place of a decimal string, carrying through nines
fn increment_last_digit(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for index in (0..bytes.len()).rev() {
        match bytes[index] {
            b'9' => bytes[index] = b'0',
            b'0'..=b'8' => {
                bytes[index] += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
            _ => {}
        }
    }
    let first_digit = usize::from(bytes.first() == Some(&b'-'));
    bytes.insert(first_digit, b'1');
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Round `wide` (printed `TIE_WIDTH` digits past the target) half away from
/// zero. Returns `None` unless the dropped digits are exactly `5000...`.
fn round_exact_tie(wide: &str) -> Option<String> {
    let (head, tail) = wide.split_at(wide.len().checked_sub(TIE_WIDTH)?);
    let (first, rest) = tail.split_at(1);
    if first != "5" || rest.bytes().any(|b| b != b'0') {
        return None;
    }
    Some(increment_last_digit(head.trim_end_matches('.')))
}

/// Fixed-point with `fraction_digits` after the point. Exact binary ties
/// round away from zero, matching `Number.prototype.toFixed`.
pub fn to_fixed(value: f64, fraction_digits: usize) -> String {
    if value.is_finite() {
        let wide = format!("{:.*}", fraction_digits + TIE_WIDTH, value);
        if let Some(rounded) = round_exact_tie(&wide) {
            return rounded;
        }
    }
    format!("{:.*}", fraction_digits, value)
}

/// Exponential notation with `fraction_digits` after the point and a signed exponent
pub fn to_exponential(value: f64, fraction_digits: usize) -> String {
    let raw = format!("{:.*e}", fraction_digits, value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let mut mantissa = mantissa.to_string();
    let mut exponent = exponent.parse::<i32>().unwrap_or(0);

    if value.is_finite() {
        let wide = format!("{:.*e}", fraction_digits + TIE_WIDTH, value);
        if let Some((wide_mantissa, wide_exponent)) = wide.split_once('e') {
            if let Some(rounded) = round_exact_tie(wide_mantissa) {
                exponent = wide_exponent.parse().unwrap_or(exponent);
                mantissa = rounded;
                // 9.99 rounded up to 10.00
                let unsigned = mantissa.trim_start_matches('-');
                if unsigned.split('.').next().map_or(0, str::len) > 1 {
                    let sign = if value < 0.0 { "-" } else { "" };
                    let fraction = "0".repeat(fraction_digits);
                    mantissa = if fraction_digits == 0 {
                        format!("{}1", sign)
                    } else {
                        format!("{}1.{}", sign, fraction)
                    };
                    exponent += 1;
                }
            }
        }
    }

    if exponent < 0 {
        format!("{}e{}", mantissa, exponent)
    } else {
        format!("{}e+{}", mantissa, exponent)
    }
}

/// Insert `,` thousands separators into the integer part of a decimal string
fn group_digits(digits: &str) -> String {
    let (sign, unsigned) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// en-US style number: grouped integer part, at most 3 fraction digits
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return PLACEHOLDER.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let fixed = to_fixed(value, 3);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        return "0".to_string();
    }
    group_digits(trimmed)
}

/// BTC amount with precision that grows as the magnitude shrinks
pub fn format_btc(btc: f64) -> String {
    if btc.is_nan() {
        return PLACEHOLDER.to_string();
    }

    if btc < 0.00001 {
        to_exponential(btc, 2)
    } else if btc < 0.001 {
        to_fixed(btc, 8)
    } else if btc < 1.0 {
        to_fixed(btc, 6)
    } else {
        to_fixed(btc, 4)
    }
}

/// Satoshi count with thousands separators
pub fn format_sats(sats: f64) -> String {
    format_number(sats)
}

/// USD with K/M suffixes above a thousand
pub fn format_usd(usd: f64) -> String {
    if usd.is_nan() {
        return PLACEHOLDER.to_string();
    }

    if usd >= 1_000_000.0 {
        format!("${}M", to_fixed(usd / 1_000_000.0, 2))
    } else if usd >= 1_000.0 {
        format!("${}K", to_fixed(usd / 1_000.0, 2))
    } else if usd >= 1.0 {
        format!("${}", to_fixed(usd, 2))
    } else {
        format!("${}", to_fixed(usd, 4))
    }
}

/// Percentage with precision that grows as the magnitude shrinks
pub fn format_percent(percent: f64) -> String {
    if percent.is_nan() {
        return PLACEHOLDER.to_string();
    }

    if percent < 0.0001 {
        format!("{}%", to_exponential(percent, 2))
    } else if percent < 0.01 {
        format!("{}%", to_fixed(percent, 6))
    } else if percent < 1.0 {
        format!("{}%", to_fixed(percent, 4))
    } else {
        format!("{}%", to_fixed(percent, 2))
    }
}

/// Hashrate across eight tiers, H/s through ZH/s
pub fn format_hashrate(hashes_per_sec: f64) -> String {
    if hashes_per_sec.is_nan() {
        return PLACEHOLDER.to_string();
    }
    units::format_compact(hashes_per_sec, 2)
}

/// Difficulty with T/B/M suffixes
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty.is_nan() || difficulty == 0.0 {
        return PLACEHOLDER.to_string();
    }

    if difficulty >= 1e12 {
        format!("{}T", to_fixed(difficulty / 1e12, 2))
    } else if difficulty >= 1e9 {
        format!("{}B", to_fixed(difficulty / 1e9, 2))
    } else if difficulty >= 1e6 {
        format!("{}M", to_fixed(difficulty / 1e6, 2))
    } else {
        format_number(difficulty)
    }
}

/// BTC amount in the user's chosen denomination
pub fn format_value(btc: f64, unit: DisplayUnit) -> String {
    match unit {
        DisplayUnit::Btc => format_btc(btc),
        DisplayUnit::Sats => format_sats(btc_to_sats(btc)),
    }
}

/// Format an optional value, using the placeholder for `None`
pub fn format_optional(value: Option<f64>, formatter: fn(f64) -> String) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), formatter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_exponential() {
        assert_eq!(to_exponential(0.00000001, 2), "1.00e-8");
        assert_eq!(to_exponential(1e17, 3), "1.000e+17");
        assert_eq!(to_exponential(5.15e20, 3), "5.150e+20");
        assert_eq!(to_exponential(0.0, 2), "0.00e+0");
        assert_eq!(to_exponential(-5.0, 2), "-5.00e+0");
    }

    #[test]
    fn test_exact_ties_round_away_from_zero() {
        assert_eq!(to_fixed(1.125, 2), "1.13");
        assert_eq!(to_fixed(-1.125, 2), "-1.13");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(9.995, 2), "9.99");
        assert_eq!(to_fixed(9.875, 2), "9.88");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(f64::NAN, 2), "NaN");
        assert_eq!(to_exponential(1.125, 2), "1.13e+0");
        assert_eq!(to_exponential(2.5, 0), "3e+0");
        assert_eq!(to_exponential(9.5, 0), "1e+1");
        assert_eq!(format_usd(1.125), "$1.13");
        assert_eq!(format_usd(2_625.0), "$2.63K");
        assert_eq!(format_percent(0.03125), "0.0313%");
        assert_eq!(format_number(0.0625), "0.063");
    }

    #[test]
    fn test_format_btc_tiers() {
        assert_eq!(format_btc(0.00000001), "1.00e-8");
        assert_eq!(format_btc(0.0000456), "0.00004560");
        assert_eq!(format_btc(0.0018), "0.001800");
        assert_eq!(format_btc(0.09), "0.090000");
        assert_eq!(format_btc(12.5), "12.5000");
        assert_eq!(format_btc(0.0), "0.00e+0");
        assert_eq!(format_btc(f64::NAN), PLACEHOLDER);
    }

    #[test]
    fn test_format_sats() {
        assert_eq!(format_sats(0.0), "0");
        assert_eq!(format_sats(180_000.0), "180,000");
        assert_eq!(format_sats(1_234_567_890.0), "1,234,567,890");
        assert_eq!(format_sats(f64::NAN), PLACEHOLDER);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(870_123.0), "870,123");
        assert_eq!(format_number(1234.5678), "1,234.568");
        assert_eq!(format_number(-1234.5), "-1,234.5");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(2_500_000.0), "$2.50M");
        assert_eq!(format_usd(97_123.0), "$97.12K");
        assert_eq!(format_usd(42.0), "$42.00");
        assert_eq!(format_usd(0.5), "$0.5000");
        assert_eq!(format_usd(f64::NAN), PLACEHOLDER);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.00005), "5.00e-5%");
        assert_eq!(format_percent(0.005), "0.005000%");
        assert_eq!(format_percent(0.02), "0.0200%");
        assert_eq!(format_percent(12.3456), "12.35%");
        assert_eq!(format_percent(f64::NAN), PLACEHOLDER);
    }

    #[test]
    fn test_format_hashrate() {
        assert_eq!(format_hashrate(1e17), "100.00 PH/s");
        assert_eq!(format_hashrate(6.5e20), "650.00 EH/s");
        assert_eq!(format_hashrate(1.2e21), "1.20 ZH/s");
        assert_eq!(format_hashrate(f64::NAN), PLACEHOLDER);
    }

    #[test]
    fn test_format_difficulty() {
        assert_eq!(format_difficulty(1.1e14), "110.00T");
        assert_eq!(format_difficulty(2.5e9), "2.50B");
        assert_eq!(format_difficulty(3e6), "3.00M");
        assert_eq!(format_difficulty(12_345.0), "12,345");
        assert_eq!(format_difficulty(0.0), PLACEHOLDER);
    }

    #[test]
    fn test_format_value_units() {
        assert_eq!(format_value(0.0018, DisplayUnit::Btc), "0.001800");
        assert_eq!(format_value(0.0018, DisplayUnit::Sats), "180,000");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(None, format_btc), PLACEHOLDER);
        assert_eq!(format_optional(Some(2.0), format_btc), "2.0000");
    }
}
