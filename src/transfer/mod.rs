//! Peer-to-peer transfers
//!
//! A user sends money to another user identified by phone number. The sender
//! pays a 2% service fee on top of the amount. Each transfer writes one
//! `transfers_tb` row and two ledger rows (sender debit, recipient credit)
//! in a single database transaction.
//!
//! # Safety Invariants
//!
//! 1. **All-or-nothing**: the transfer row and both ledger rows commit together
//! 2. **Serialised per sender**: the sender's user row is locked for the duration
//! 3. **Idempotency**: a repeated `idempotency_key` returns the first transfer
//! 4. **Unique reference**: collisions on `reference_number` retry with a new code

pub mod db;
pub mod error;
pub mod service;
pub mod state;
pub mod types;

#[cfg(test)]
mod integration_tests;

pub use db::TransferDb;
pub use error::TransferError;
pub use service::{TransferService, new_reference, validate_transfer};
pub use state::TransferStatus;
pub use types::{TransferReceipt, TransferRecord, TransferRequest, TransferView, ValidatedTransfer};
