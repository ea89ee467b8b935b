//! HTTP handlers, grouped by area
//!
//! Auth endpoints live in [`crate::user_auth::handlers`].

pub mod admin;
pub mod community;
pub mod dashboard;
pub mod finance;
pub mod health;
pub mod helpers;
pub mod profile;
pub mod transfer;

pub use health::{HealthResponse, health_check};
pub use helpers::LimitQuery;
