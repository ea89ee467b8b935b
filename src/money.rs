//! Money parsing and formatting
//!
//! All client-supplied amounts go through [`parse_amount`]. Amounts are
//! `rust_decimal::Decimal` with at most [`MONEY_SCALE`] fractional digits,
//! matching the `NUMERIC(12,2)` columns.
//!
//! ## Rules
//! 1. No silent truncation: `1.005` is rejected, not rounded
//! 2. Strict format: `.5`, `5.`, `+5`, `1e3` are rejected
//! 3. Zero and negative values are separate errors so callers can word them

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fractional digits stored for every monetary column
pub const MONEY_SCALE: u32 = 2;

/// Largest value that fits `NUMERIC(12,2)`
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999_99, MONEY_SCALE)
}

/// Money conversion errors
#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("Amount cannot be empty")]
    Empty,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be greater than 0")]
    NotPositive,

    #[error("Amount cannot be negative")]
    Negative,

    #[error("Amount too large")]
    Overflow,
}

/// Parse a client amount string into a `Decimal` (zero allowed).
///
/// ```
/// use unipay::money::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("12.50").unwrap(), Decimal::new(1250, 2));
/// assert!(parse_amount(".5").is_err());
/// ```
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let s = amount_str.trim();
    if s.is_empty() {
        return Err(MoneyError::Empty);
    }
    if s.starts_with('+') {
        return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
    }
    if s.starts_with('-') {
        // Still reject garbage like "-abc" as a format error
        return match Decimal::from_str(s) {
            Ok(_) => Err(MoneyError::Negative),
            Err(_) => Err(MoneyError::InvalidFormat(s.to_string())),
        };
    }
    if s.contains(['e', 'E']) {
        return Err(MoneyError::InvalidFormat(
            "scientific notation not allowed".into(),
        ));
    }
    if s.starts_with('.') {
        return Err(MoneyError::InvalidFormat("use 0.5 not .5".into()));
    }
    if s.ends_with('.') {
        return Err(MoneyError::InvalidFormat("use 5.0 not 5.".into()));
    }
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(MoneyError::InvalidFormat(s.to_string()));
    }

    let frac_len = s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
    if frac_len > MONEY_SCALE as usize {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac_len as u32,
            max: MONEY_SCALE,
        });
    }

    let value = Decimal::from_str(s).map_err(|e| {
        if e.to_string().contains("overflow") || e.to_string().contains("large") {
            MoneyError::Overflow
        } else {
            MoneyError::InvalidFormat(s.to_string())
        }
    })?;

    if value > max_amount() {
        return Err(MoneyError::Overflow);
    }

    Ok(value)
}

/// Parse an amount that must be strictly positive.
pub fn parse_positive_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let value = parse_amount(amount_str)?;
    if value.is_zero() {
        return Err(MoneyError::NotPositive);
    }
    Ok(value)
}

/// Round to the stored money scale (half away from zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Render with exactly two fractional digits
pub fn format_money(value: Decimal) -> String {
    format!("{:.prec$}", round_money(value), prec = MONEY_SCALE as usize)
}

/// Amount field accepted from clients as a JSON string or number.
///
/// Numbers are converted through their textual form so the same strict
/// rules apply as for strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountInput(pub String);

impl AmountInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for AmountInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => AmountInput(s),
            Raw::Number(n) => AmountInput(n.to_string()),
        })
    }
}

impl Serialize for AmountInput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::from(100));
        assert_eq!(parse_amount("0.5").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_amount(" 12.34 ").unwrap(), Decimal::new(1234, 2));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        for bad in [".5", "5.", "+5", "1e3", "1E3", "abc", "1.2.3", "1,000"] {
            assert!(
                matches!(parse_amount(bad), Err(MoneyError::InvalidFormat(_))),
                "expected format error for {bad:?}"
            );
        }
        assert_eq!(parse_amount(""), Err(MoneyError::Empty));
        assert_eq!(parse_amount("   "), Err(MoneyError::Empty));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert_eq!(
            parse_amount("1.005"),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
    }

    #[test]
    fn test_negative_and_zero() {
        assert_eq!(parse_amount("-5"), Err(MoneyError::Negative));
        assert!(matches!(
            parse_amount("-x"),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert_eq!(parse_positive_amount("0"), Err(MoneyError::NotPositive));
        assert_eq!(parse_positive_amount("0.00"), Err(MoneyError::NotPositive));
        assert!(parse_positive_amount("0.01").is_ok());
    }

    #[test]
    fn test_overflow() {
        assert_eq!(parse_amount("10000000000.00"), Err(MoneyError::Overflow));
        assert!(parse_amount("9999999999.99").is_ok());
    }

    #[test]
    fn test_round_and_format() {
        assert_eq!(round_money(Decimal::new(2105, 3)), Decimal::new(211, 2));
        assert_eq!(round_money(Decimal::new(2115, 3)), Decimal::new(212, 2));
        assert_eq!(format_money(Decimal::from(2)), "2.00");
        assert_eq!(format_money(Decimal::new(211, 3)), "0.21");
    }

    #[test]
    fn test_amount_input_accepts_string_and_number() {
        let a: AmountInput = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(a.as_str(), "12.50");
        let b: AmountInput = serde_json::from_str("25").unwrap();
        assert_eq!(b.as_str(), "25");
        let c: AmountInput = serde_json::from_str("0.5").unwrap();
        assert_eq!(c.as_str(), "0.5");
    }
}
