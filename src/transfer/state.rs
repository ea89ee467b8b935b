//! Transfer status values
//!
//! Stored as lowercase text in `transfers_tb.status`.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Transfer status
///
/// New transfers are written as `Completed`; admins may move a transfer to
/// any other status afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransferStatus {
    pub const ALL: [TransferStatus; 4] = [
        TransferStatus::Pending,
        TransferStatus::Completed,
        TransferStatus::Failed,
        TransferStatus::Cancelled,
    ];

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
            TransferStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TransferStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TransferStatus::parse(value).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in TransferStatus::ALL {
            assert_eq!(TransferStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_parse_is_lenient_on_case_and_space() {
        assert_eq!(
            TransferStatus::parse(" Completed "),
            Some(TransferStatus::Completed)
        );
        assert_eq!(TransferStatus::try_from("CANCELLED"), Ok(TransferStatus::Cancelled));
    }

    #[test]
    fn test_invalid_status() {
        assert!(TransferStatus::parse("refunded").is_none());
        assert!(TransferStatus::try_from("").is_err());
    }

    #[test]
    fn test_terminal() {
        assert!(!TransferStatus::Pending.is_terminal());
        assert!(TransferStatus::Completed.is_terminal());
        assert!(TransferStatus::Failed.is_terminal());
        assert!(TransferStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferStatus::Completed.to_string(), "completed");
    }
}
