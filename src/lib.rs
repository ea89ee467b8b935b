//! UniPay - remittance and personal-finance API service
//!
//! # Modules
//!
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool and migrations
//! - [`money`] - amount parsing and formatting
//! - [`fee`] - transfer service fee
//! - [`account`] - users and profiles
//! - [`user_auth`] - registration, login, JWT, password reset
//! - [`ledger`] - per-user transactions
//! - [`transfer`] - peer-to-peer transfers
//! - [`goals`] / [`budget`] - saving goals and monthly budgets
//! - [`donation`], [`promotion`], [`learning`], [`chatbot`] - community features
//! - [`notification`], [`admin`] - admin console
//! - [`dashboard`] - per-user and users overviews
//! - [`gateway`] - axum router, handlers, OpenAPI

pub mod config;
pub mod db;
pub mod logging;

pub mod fee;
pub mod money;

pub mod account;
pub mod ledger;
pub mod transfer;
pub mod user_auth;

pub mod admin;
pub mod budget;
pub mod chatbot;
pub mod dashboard;
pub mod donation;
pub mod goals;
pub mod learning;
pub mod notification;
pub mod promotion;

pub mod gateway;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use fee::{FeeQuote, calculate_fee};
pub use money::{format_money, parse_amount};
