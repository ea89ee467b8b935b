//! Profile read/update operations

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use super::models::{ProfileView, User};
use super::repository::{ProfileChanges, ProfileRepository, UserRepository};
use super::validation::{CurrencyCode, PhoneNumber, ValidationError};
use crate::db::is_unique_violation;

/// Profile errors
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("User not found")]
    UserNotFound,

    #[error("Phone number already registered.")]
    PhoneTaken,

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::UserNotFound => "USER_NOT_FOUND",
            AccountError::PhoneTaken => "PHONE_TAKEN",
            AccountError::Invalid(_) => "INVALID_PARAMETER",
            AccountError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::UserNotFound => 404,
            AccountError::PhoneTaken => 409,
            AccountError::Invalid(_) => 400,
            AccountError::Database(_) => 500,
        }
    }
}

/// Profile update request. Omitted fields keep their current value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 120))]
    pub display_name: Option<String>,
    #[validate(length(max = 32))]
    #[schema(example = "Gold")]
    pub membership_level: Option<String>,
    #[schema(example = "KES")]
    pub preferred_currency: Option<String>,
    #[validate(length(max = 64))]
    pub country: Option<String>,
    #[validate(length(max = 64))]
    pub city: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 12))]
    pub postal_code: Option<String>,
    /// Blank clears the phone number
    #[schema(example = "+254712345678")]
    pub phone_number: Option<String>,
    #[validate(length(max = 32))]
    pub language: Option<String>,
}

/// Load the profile view, creating the profile on first access.
pub async fn get_profile(pool: &PgPool, user_id: i64) -> Result<ProfileView, AccountError> {
    let user = load_user(pool, user_id).await?;
    let profile = ProfileRepository::ensure_profile(pool, &user).await?;
    Ok(ProfileView::new(&user, &profile))
}

/// Apply a profile update. The phone number must stay unique.
pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    req: ProfileUpdateRequest,
) -> Result<ProfileView, AccountError> {
    let user = load_user(pool, user_id).await?;
    let current = ProfileRepository::ensure_profile(pool, &user).await?;

    let phone_number = match req.phone_number.as_deref() {
        Some(raw) => PhoneNumber::optional(Some(raw))?.map(PhoneNumber::into_string),
        None => current.phone_number.clone(),
    };
    if let Some(ref phone) = phone_number {
        if ProfileRepository::phone_in_use(pool, phone, Some(user_id)).await? {
            return Err(AccountError::PhoneTaken);
        }
    }

    let preferred_currency = match req.preferred_currency.as_deref() {
        Some(raw) => CurrencyCode::new(raw)?.into_string(),
        None => current.preferred_currency.clone(),
    };

    let keep = |new: Option<String>, old: &str| {
        new.map(|v| v.trim().to_string())
            .unwrap_or_else(|| old.to_string())
    };

    let changes = ProfileChanges {
        display_name: keep(req.display_name, &current.display_name),
        membership_level: keep(req.membership_level, &current.membership_level),
        preferred_currency,
        country: keep(req.country, &current.country),
        city: keep(req.city, &current.city),
        address: keep(req.address, &current.address),
        postal_code: keep(req.postal_code, &current.postal_code),
        phone_number,
        language: keep(req.language, &current.language),
    };

    let updated = ProfileRepository::update(pool, user_id, &changes)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("profiles_tb_phone_number_key")) {
                AccountError::PhoneTaken
            } else {
                AccountError::Database(e)
            }
        })?;

    tracing::info!(user_id, "profile updated");
    Ok(ProfileView::new(&user, &updated))
}

async fn load_user(pool: &PgPool, user_id: i64) -> Result<User, AccountError> {
    UserRepository::get_by_id(pool, user_id)
        .await?
        .ok_or(AccountError::UserNotFound)
}
