//! Transfer input rules, checked through the public API only.
//!
//! Run with: cargo test --test qa_transfer_rules

use rust_decimal::Decimal;
use std::str::FromStr;

use unipay::budget::{month_or_current, parse_month};
use unipay::calculate_fee;
use unipay::chatbot;
use unipay::donation::goal_percent;
use unipay::money::AmountInput;
use unipay::transfer::{TransferError, TransferRequest, TransferStatus, validate_transfer};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn request(amount: &str) -> TransferRequest {
    TransferRequest {
        recipient_phone: Some(" +254712345678 ".to_string()),
        amount: Some(AmountInput(amount.to_string())),
        ..Default::default()
    }
}

// ============================================================================
// Fee
// ============================================================================

#[test]
fn test_fee_is_two_percent_of_amount() {
    for (amount, fee) in [("100", "2.00"), ("49.99", "1.00"), ("1234.56", "24.69"), ("0.10", "0.00")] {
        let quote = calculate_fee(dec(amount));
        assert_eq!(quote.service_fee, dec(fee), "fee for {}", amount);
        assert_eq!(quote.total_amount, dec(amount) + dec(fee), "total for {}", amount);
    }
}

#[test]
fn test_fee_never_exceeds_amount() {
    for cents in [1i64, 7, 25, 99, 100, 12_345, 999_999] {
        let amount = Decimal::new(cents, 2);
        let quote = calculate_fee(amount);
        assert!(quote.service_fee >= Decimal::ZERO);
        assert!(quote.service_fee <= amount);
    }
}

// ============================================================================
// validate_transfer
// ============================================================================

#[test]
fn test_valid_transfer_defaults_currency_and_trims() {
    let v = validate_transfer(&request("250")).unwrap();
    assert_eq!(v.recipient_phone, "+254712345678");
    assert_eq!(v.currency, "USD");
    assert_eq!(v.amount, dec("250"));
    assert_eq!(v.service_fee, dec("5"));
    assert_eq!(v.total_amount, dec("255"));
    assert_eq!(v.description, "");
    assert!(v.idempotency_key.is_none());
}

#[test]
fn test_currency_is_uppercased() {
    let mut req = request("10");
    req.currency = Some("kes".to_string());
    assert_eq!(validate_transfer(&req).unwrap().currency, "KES");
}

#[test]
fn test_amount_errors() {
    let mut missing = request("1");
    missing.amount = None;
    assert!(matches!(validate_transfer(&missing), Err(TransferError::MissingAmount)));
    assert!(matches!(validate_transfer(&request("  ")), Err(TransferError::MissingAmount)));

    assert!(matches!(validate_transfer(&request("0")), Err(TransferError::NonPositiveAmount)));
    assert!(matches!(validate_transfer(&request("-5")), Err(TransferError::NonPositiveAmount)));

    for bad in ["abc", "1e3", "10.001", ".5"] {
        assert!(
            matches!(validate_transfer(&request(bad)), Err(TransferError::InvalidAmount)),
            "{} should be invalid",
            bad
        );
    }
}

#[test]
fn test_amount_error_codes() {
    assert_eq!(TransferError::MissingAmount.code(), "MISSING_AMOUNT");
    assert_eq!(TransferError::NonPositiveAmount.http_status(), 400);
    assert_eq!(TransferError::RecipientNotFound.http_status(), 404);
    assert_eq!(TransferError::Forbidden.http_status(), 403);
}

#[test]
fn test_blank_idempotency_key_rejected() {
    let mut req = request("10");
    req.idempotency_key = Some("   ".to_string());
    assert!(matches!(validate_transfer(&req), Err(TransferError::InvalidIdempotencyKey)));
}

#[test]
fn test_amount_accepts_json_number() {
    let req: TransferRequest =
        serde_json::from_str(r#"{"recipient_phone":"+254700000001","amount":12.5}"#).unwrap();
    let v = validate_transfer(&req).unwrap();
    assert_eq!(v.amount, dec("12.5"));
    assert_eq!(v.service_fee, dec("0.25"));
}

#[test]
fn test_status_parse() {
    assert_eq!(TransferStatus::parse("completed"), Some(TransferStatus::Completed));
    assert_eq!(TransferStatus::parse("bogus"), None);
    assert!(!TransferStatus::Pending.is_terminal());
}

// ============================================================================
// Budget months, donation goal, assistant
// ============================================================================

#[test]
fn test_budget_month_parsing() {
    let march = chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert_eq!(parse_month("2025-03").unwrap(), march);
    assert_eq!(parse_month("2025-03-17").unwrap(), march);
    assert!(parse_month("2025-13").is_err());

    let today = chrono::NaiveDate::from_ymd_opt(2025, 7, 19).unwrap();
    let july = chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    assert_eq!(month_or_current(Some("garbage"), today), july);
    assert_eq!(month_or_current(None, today), july);
}

#[test]
fn test_donation_goal_percent_caps_at_100() {
    assert_eq!(goal_percent(0), 0);
    assert_eq!(goal_percent(800), 50);
    assert_eq!(goal_percent(1599), 99);
    assert_eq!(goal_percent(5000), 100);
}

#[test]
fn test_chatbot_is_deterministic() {
    for input in ["hello", "how do I send money?", "savings goal", "qwerty"] {
        assert_eq!(chatbot::reply(input), chatbot::reply(input));
    }
    assert_eq!(chatbot::reply("qwerty"), chatbot::FALLBACK_REPLY);
    assert!(chatbot::reply("bye").starts_with("Goodbye!"));
}
