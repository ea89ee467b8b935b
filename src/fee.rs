//! Transfer fee calculation
//!
//! The service fee is a flat 2% of the transferred amount, rounded to cents.
//! The sender is debited `amount + fee`; the recipient is credited `amount`.

use rust_decimal::Decimal;

use crate::money::round_money;

/// Service fee rate: 2 / 100
pub fn service_fee_rate() -> Decimal {
    Decimal::new(2, 2)
}

/// Fee breakdown for a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub amount: Decimal,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
}

/// Calculate the service fee for `amount`.
///
/// # Example
/// ```
/// use unipay::fee::calculate_fee;
/// use rust_decimal::Decimal;
///
/// let quote = calculate_fee(Decimal::from(100));
/// assert_eq!(quote.service_fee, Decimal::from(2));
/// assert_eq!(quote.total_amount, Decimal::from(102));
/// ```
pub fn calculate_fee(amount: Decimal) -> FeeQuote {
    let service_fee = round_money(amount * service_fee_rate());
    FeeQuote {
        amount,
        service_fee,
        total_amount: amount + service_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_basic() {
        let q = calculate_fee(Decimal::from(250));
        assert_eq!(q.service_fee, Decimal::from(5));
        assert_eq!(q.total_amount, Decimal::from(255));
    }

    #[test]
    fn test_fee_rounds_to_cents() {
        // 10.55 * 0.02 = 0.211 -> 0.21
        let q = calculate_fee(Decimal::new(1055, 2));
        assert_eq!(q.service_fee, Decimal::new(21, 2));
        assert_eq!(q.total_amount, Decimal::new(1076, 2));

        // 0.25 * 0.02 = 0.005 -> 0.01 (midpoint away from zero)
        let q = calculate_fee(Decimal::new(25, 2));
        assert_eq!(q.service_fee, Decimal::new(1, 2));
    }

    #[test]
    fn test_tiny_amount_fee_can_be_zero() {
        // 0.01 * 0.02 = 0.0002 -> 0.00
        let q = calculate_fee(Decimal::new(1, 2));
        assert_eq!(q.service_fee, Decimal::ZERO);
        assert_eq!(q.total_amount, q.amount);
    }

    #[test]
    fn test_total_is_amount_plus_fee() {
        for cents in [1_i64, 99, 100, 1234, 50_000, 9_999_999] {
            let amount = Decimal::new(cents, 2);
            let q = calculate_fee(amount);
            assert_eq!(q.total_amount, q.amount + q.service_fee);
            assert_eq!(q.service_fee, round_money(amount * service_fee_rate()));
            assert!(q.service_fee.scale() <= 2);
        }
    }
}
