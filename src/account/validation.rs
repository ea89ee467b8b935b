//! Input validation for phone numbers, currency codes and dates
//!
//! Validated types keep their field private so the only way to build one is
//! through `new()`.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

// ============================================================================
// Validation Errors
// ============================================================================

/// Validation errors for profile and money-movement inputs
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid choice for {field}: '{value}'")]
    InvalidChoice { field: &'static str, value: String },
}

// ============================================================================
// CurrencyCode
// ============================================================================

/// Currency code: 3-6 ASCII letters, stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Normalise and validate a currency code.
    ///
    /// # Examples
    /// ```
    /// use unipay::account::validation::CurrencyCode;
    ///
    /// assert_eq!(CurrencyCode::new(" kes ").unwrap().as_str(), "KES");
    /// assert!(CurrencyCode::new("US1").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim().to_ascii_uppercase();

        if code.len() < 3 || code.len() > 6 {
            return Err(ValidationError::InvalidLength {
                field: "currency",
                min: 3,
                max: 6,
                actual: code.len(),
            });
        }

        if !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency",
                value: code,
                expected: "letters only",
            });
        }

        Ok(Self(code))
    }

    /// `USD` when the input is missing or blank
    pub fn or_default(code: Option<&str>) -> Result<Self, ValidationError> {
        match code.map(str::trim) {
            Some(c) if !c.is_empty() => Self::new(c),
            _ => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self("USD".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// PhoneNumber
// ============================================================================

/// Phone number used to address transfer recipients
///
/// Allowed characters: digits, spaces, `-`, `(`, `)`, and a single leading
/// `+`. Must contain 6-15 digits and be at most 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(phone: &str) -> Result<Self, ValidationError> {
        let phone = phone.trim();

        if phone.is_empty() {
            return Err(ValidationError::Required {
                field: "phone_number",
            });
        }

        if phone.len() > 20 {
            return Err(ValidationError::InvalidLength {
                field: "phone_number",
                min: 6,
                max: 20,
                actual: phone.len(),
            });
        }

        let body = phone.strip_prefix('+').unwrap_or(phone);
        if !body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
        {
            return Err(ValidationError::InvalidFormat {
                field: "phone_number",
                value: phone.to_string(),
                expected: "digits, spaces, dashes, parentheses, optional leading +",
            });
        }

        let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
        if !(6..=15).contains(&digits) {
            return Err(ValidationError::InvalidFormat {
                field: "phone_number",
                value: phone.to_string(),
                expected: "6-15 digits",
            });
        }

        Ok(Self(phone.to_string()))
    }

    /// Blank input means "no phone number"
    pub fn optional(phone: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match phone.map(str::trim) {
            Some(p) if !p.is_empty() => Self::new(p).map(Some),
            _ => Ok(None),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Parse an optional `YYYY-MM-DD` date; blank means none.
pub fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidFormat {
                field,
                value: v.to_string(),
                expected: "YYYY-MM-DD",
            }),
        _ => Ok(None),
    }
}

/// Parse a timestamp given as RFC 3339 or as an HTML `datetime-local`
/// value (`YYYY-MM-DDTHH:MM[:SS]`, taken as UTC).
pub fn parse_timestamp(
    field: &'static str,
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>, ValidationError> {
    let v = value.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(v) {
        return Ok(ts.with_timezone(&chrono::Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(v, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(ValidationError::InvalidFormat {
        field,
        value: v.to_string(),
        expected: "RFC 3339 or YYYY-MM-DDTHH:MM",
    })
}

/// Trimmed value, or `None` when missing or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_currency_normalised() {
        assert_eq!(CurrencyCode::new("usd").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::new("  GHS ").unwrap().as_str(), "GHS");
        assert_eq!(CurrencyCode::new("USDT").unwrap().as_str(), "USDT");
    }

    #[test]
    fn test_currency_rejected() {
        assert!(matches!(
            CurrencyCode::new("US"),
            Err(ValidationError::InvalidLength { .. })
        ));
        assert!(matches!(
            CurrencyCode::new("DOLLARS"),
            Err(ValidationError::InvalidLength { .. })
        ));
        assert!(matches!(
            CurrencyCode::new("U$D"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_currency_default() {
        assert_eq!(CurrencyCode::or_default(None).unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::or_default(Some("  ")).unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::or_default(Some("eur")).unwrap().as_str(), "EUR");
    }

    #[test]
    fn test_phone_valid() {
        assert_eq!(
            PhoneNumber::new(" +254 712 345678 ").unwrap().as_str(),
            "+254 712 345678"
        );
        assert!(PhoneNumber::new("(020) 555-0100").is_ok());
        assert!(PhoneNumber::new("0712345678").is_ok());
    }

    #[test]
    fn test_phone_invalid() {
        assert!(matches!(
            PhoneNumber::new(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            PhoneNumber::new("12345"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            PhoneNumber::new("07x2345678"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            PhoneNumber::new("++254712345678"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            PhoneNumber::new("+254 712 345 678 999 0"),
            Err(ValidationError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_phone_optional() {
        assert_eq!(PhoneNumber::optional(None).unwrap(), None);
        assert_eq!(PhoneNumber::optional(Some(" ")).unwrap(), None);
        assert!(PhoneNumber::optional(Some("0712345678")).unwrap().is_some());
    }

    #[test]
    fn test_dates() {
        let d = parse_optional_date("due_date", Some("2025-03-31"))
            .unwrap()
            .unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2025, 3, 31));
        assert_eq!(parse_optional_date("due_date", Some("")).unwrap(), None);
        assert!(parse_optional_date("due_date", Some("31/03/2025")).is_err());
    }

    #[test]
    fn test_timestamps() {
        let ts = parse_timestamp("occurred_at", "2025-05-01T10:30").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (10, 30));
        let ts = parse_timestamp("occurred_at", "2025-05-01T10:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);
        assert!(parse_timestamp("occurred_at", "yesterday").is_err());
    }
}
