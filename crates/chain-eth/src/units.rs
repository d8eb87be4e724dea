//! Conversions between human-readable amounts and integer base units.

use crypto_utils::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::EthError;

pub const ETHER_DECIMALS: u32 = 18;
pub const GWEI_DECIMALS: u32 = 9;

/// `10^exp`.
pub fn pow10(exp: u32) -> BigInt {
    let ten = BigInt::from(10u32);
    (0..exp).fold(BigInt::one(), |acc, _| &acc * &ten)
}

/// Parses a decimal string such as `"1.5"` into base units with `decimals`
/// fractional digits. More fractional digits than `decimals` is an error
/// rather than a silent truncation.
pub fn parse_units(amount: &str, decimals: u32) -> Result<BigInt, EthError> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(EthError::InvalidAmount(format!("no digits in {amount:?}")));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(EthError::InvalidAmount(format!(
            "{amount:?} is not an unsigned decimal number"
        )));
    }
    if fraction.len() > decimals as usize {
        return Err(EthError::InvalidAmount(format!(
            "{amount:?} has more than {decimals} fractional digits"
        )));
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat_n('0', decimals as usize - fraction.len()));
    BigInt::from_str_radix(&digits, 10).map_err(|e| EthError::InvalidAmount(e.to_string()))
}

/// Formats base units as a decimal string. Trailing fractional zeros are
/// dropped, keeping at least one digit after the point.
pub fn format_units(value: &BigInt, decimals: u32) -> String {
    let digits = value.abs().to_string();
    let sign = if value.is_negative() { "-" } else { "" };
    if decimals == 0 {
        return format!("{sign}{digits}");
    }
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    format!("{sign}{whole}.{fraction}")
}

pub fn parse_ether(amount: &str) -> Result<BigInt, EthError> {
    parse_units(amount, ETHER_DECIMALS)
}

pub fn format_ether(wei: &BigInt) -> String {
    format_units(wei, ETHER_DECIMALS)
}

pub fn parse_gwei(amount: &str) -> Result<BigInt, EthError> {
    parse_units(amount, GWEI_DECIMALS)
}

/// Denominations of the Amber (AMB) token, each expressed in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmberUnit {
    /// One millionth of an Amber: 10^12 wei.
    Micro,
    /// 10^15 wei.
    Milli,
    /// 10^16 wei.
    Cent,
    /// 10^18 wei.
    One,
    /// 10^19 wei.
    Ten,
}

impl AmberUnit {
    pub fn wei(self) -> BigInt {
        pow10(match self {
            AmberUnit::Micro => 12,
            AmberUnit::Milli => 15,
            AmberUnit::Cent => 16,
            AmberUnit::One => 18,
            AmberUnit::Ten => 19,
        })
    }

    /// `count` of this denomination in wei.
    pub fn amount(self, count: u64) -> BigInt {
        &self.wei() * &BigInt::from(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(parse_ether("1").unwrap().to_string(), "1000000000000000000");
        assert_eq!(parse_ether("1.5").unwrap().to_string(), "1500000000000000000");
        assert_eq!(parse_ether(".25").unwrap().to_string(), "250000000000000000");
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), BigInt::one());
        assert_eq!(parse_gwei("20").unwrap().to_string(), "20000000000");
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", ".", "1.2.3", "-1", "1e18", "abc", "0.0000000000000000001"] {
            assert!(
                matches!(parse_ether(bad), Err(EthError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn format_drops_trailing_zeros() {
        assert_eq!(format_ether(&parse_ether("1").unwrap()), "1.0");
        assert_eq!(format_ether(&parse_ether("1.50").unwrap()), "1.5");
        assert_eq!(format_ether(&BigInt::one()), "0.000000000000000001");
        assert_eq!(format_ether(&BigInt::zero()), "0.0");
        assert_eq!(format_units(&BigInt::from(-1500i32), 3), "-1.5");
        assert_eq!(format_units(&BigInt::from(42u32), 0), "42");
    }

    #[test]
    fn amber_denominations() {
        assert_eq!(AmberUnit::Micro.wei().to_string(), "1000000000000");
        assert_eq!(AmberUnit::Milli.wei().to_string(), "1000000000000000");
        assert_eq!(AmberUnit::Cent.wei().to_string(), "10000000000000000");
        assert_eq!(AmberUnit::One.wei().to_string(), "1000000000000000000");
        assert_eq!(AmberUnit::Ten.wei().to_string(), "10000000000000000000");
        assert_eq!(AmberUnit::Cent.amount(3), parse_ether("0.03").unwrap());
    }

    #[test]
    fn amber_unit_serde_names() {
        assert_eq!(serde_json::to_string(&AmberUnit::Milli).unwrap(), "\"milli\"");
        let unit: AmberUnit = serde_json::from_str("\"ten\"").unwrap();
        assert_eq!(unit, AmberUnit::Ten);
    }
}
