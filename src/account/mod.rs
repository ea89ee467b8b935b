//! Users and profiles
//!
//! PostgreSQL-backed storage for credentials (`users_tb`) and per-user
//! profiles (`profiles_tb`), plus validated value types shared by the
//! registration, profile and transfer flows.

pub mod models;
pub mod profile;
pub mod repository;
pub mod validation;

// Re-export commonly used types
pub use models::{Profile, ProfileView, Role, User};
pub use profile::{AccountError, ProfileUpdateRequest};
pub use repository::{ProfileRepository, RecipientOption, UserRepository};
pub use validation::{CurrencyCode, PhoneNumber, ValidationError};
