//! Transaction ledger
//!
//! One signed row per money movement per user. Transfers write their two
//! rows through [`LedgerRepository::insert`] inside the transfer's database
//! transaction.

pub mod models;
pub mod repository;
pub mod service;

pub use models::{
    CreateTransactionRequest, LedgerEntry, LedgerTotals, NewLedgerEntry, TransactionKind,
    TransactionView,
};
pub use repository::LedgerRepository;
pub use service::{LedgerError, record_transaction};
