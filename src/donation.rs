//! Sanitary-pad donation pledges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail};

use crate::account::User;
use crate::account::validation::{ValidationError, non_blank};

pub const DONATION_THANKS_MSG: &str = "Thank you for your donation!";

/// Campaign target, in packs
pub const DONATION_GOAL_PACKS: i64 = 1600;

/// Whole percent of the campaign goal reached, capped at 100
pub fn goal_percent(total_packs: i64) -> i64 {
    if total_packs <= 0 {
        return 0;
    }
    (total_packs * 100 / DONATION_GOAL_PACKS).min(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DonationFrequency {
    #[default]
    OneTime,
    Monthly,
    Quarterly,
}

impl DonationFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationFrequency::OneTime => "one_time",
            DonationFrequency::Monthly => "monthly",
            DonationFrequency::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for DonationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "one_time" => Ok(DonationFrequency::OneTime),
            "monthly" => Ok(DonationFrequency::Monthly),
            "quarterly" => Ok(DonationFrequency::Quarterly),
            other => Err(ValidationError::InvalidChoice {
                field: "frequency",
                value: other.to_string(),
            }),
        }
    }
}

/// `donations_tb` row
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Donation {
    pub donation_id: i64,
    #[serde(skip)]
    pub donor_id: Option<i64>,
    pub name: String,
    #[serde(skip)]
    pub email: String,
    pub country: String,
    pub quantity: i32,
    pub frequency: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateDonationRequest {
    /// Defaults to the signed-in user's name
    #[validate(length(max = 120))]
    pub name: Option<String>,
    /// Defaults to the signed-in user's e-mail
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 60))]
    #[schema(example = "Kenya")]
    pub country: Option<String>,
    #[schema(example = 10)]
    pub quantity: Option<i32>,
    /// one_time | monthly | quarterly (default one_time)
    pub frequency: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "With love")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonationStats {
    pub total_packs: i64,
    pub donor_count: i64,
    pub goal_target: i64,
    pub goal_percent: i64,
    pub recent: Vec<Donation>,
}

#[derive(Error, Debug)]
pub enum DonationError {
    #[error("Ensure this value is greater than or equal to 1.")]
    InvalidQuantity,

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DonationError {
    pub fn code(&self) -> &'static str {
        match self {
            DonationError::InvalidQuantity => "INVALID_QUANTITY",
            DonationError::Invalid(_) => "INVALID_PARAMETER",
            DonationError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            DonationError::InvalidQuantity | DonationError::Invalid(_) => 400,
            DonationError::Database(_) => 500,
        }
    }
}

/// Pledge values after defaults and checks
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub country: String,
    pub quantity: i32,
    pub frequency: DonationFrequency,
    pub message: String,
}

/// Apply signed-in defaults for name and e-mail, then check the pledge.
pub fn prepare_donation(
    donor: Option<&User>,
    req: &CreateDonationRequest,
) -> Result<NewDonation, DonationError> {
    let name = match (non_blank(req.name.as_deref()), donor) {
        (Some(n), _) => n.to_string(),
        (None, Some(user)) => user.display_name(),
        (None, None) => return Err(ValidationError::Required { field: "name" }.into()),
    };
    let email = match (non_blank(req.email.as_deref()), donor) {
        (Some(e), _) => e.to_string(),
        (None, Some(user)) if !user.email.is_empty() => user.email.clone(),
        _ => return Err(ValidationError::Required { field: "email" }.into()),
    };
    if !email.validate_email() {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            value: email,
            expected: "name@example.com",
        }
        .into());
    }
    let country = non_blank(req.country.as_deref())
        .ok_or(ValidationError::Required { field: "country" })?
        .to_string();

    let quantity = req.quantity.ok_or(ValidationError::Required { field: "quantity" })?;
    if quantity < 1 {
        return Err(DonationError::InvalidQuantity);
    }

    let frequency = match non_blank(req.frequency.as_deref()) {
        Some(f) => f.parse()?,
        None => DonationFrequency::default(),
    };

    Ok(NewDonation {
        donor_id: donor.map(|u| u.user_id),
        name,
        email,
        country,
        quantity,
        frequency,
        message: req.message.as_deref().unwrap_or_default().trim().to_string(),
    })
}

pub struct DonationRepository;

impl DonationRepository {
    pub async fn insert(pool: &PgPool, d: &NewDonation) -> Result<Donation, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            r#"INSERT INTO donations_tb (donor_id, name, email, country, quantity, frequency, message)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING donation_id, donor_id, name, email, country, quantity,
                         frequency, message, created_at"#,
        )
        .bind(d.donor_id)
        .bind(&d.name)
        .bind(&d.email)
        .bind(&d.country)
        .bind(d.quantity)
        .bind(d.frequency.as_str())
        .bind(&d.message)
        .fetch_one(pool)
        .await
    }

    /// `(total packs, distinct donor e-mails)`
    pub async fn totals(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT COALESCE(SUM(quantity), 0)::BIGINT, COUNT(DISTINCT email)
               FROM donations_tb"#,
        )
        .fetch_one(pool)
        .await
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Donation>, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            r#"SELECT donation_id, donor_id, name, email, country, quantity,
                      frequency, message, created_at
               FROM donations_tb
               ORDER BY created_at DESC, donation_id DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Packs pledged by the user, matched by account or by e-mail
    pub async fn packs_for_user(pool: &PgPool, user: &User) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COALESCE(SUM(quantity), 0)::BIGINT
               FROM donations_tb
               WHERE donor_id = $1 OR email = $2"#,
        )
        .bind(user.user_id)
        .bind(&user.email)
        .fetch_one(pool)
        .await
    }
}

pub async fn create_donation(
    pool: &PgPool,
    donor: Option<&User>,
    req: &CreateDonationRequest,
) -> Result<Donation, DonationError> {
    let pledge = prepare_donation(donor, req)?;
    let row = DonationRepository::insert(pool, &pledge).await?;
    tracing::info!(
        donation_id = row.donation_id,
        donor_id = ?row.donor_id,
        quantity = row.quantity,
        "donation pledged"
    );
    Ok(row)
}

pub async fn stats(pool: &PgPool) -> Result<DonationStats, DonationError> {
    let (total_packs, donor_count) = DonationRepository::totals(pool).await?;
    let recent = DonationRepository::recent(pool, 5).await?;
    Ok(DonationStats {
        total_packs,
        donor_count,
        goal_target: DONATION_GOAL_PACKS,
        goal_percent: goal_percent(total_packs),
        recent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: 5,
            username: "amina".to_string(),
            email: "amina@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Amina".to_string(),
            last_name: "Otieno".to_string(),
            created_at: Utc::now(),
        }
    }

    fn request() -> CreateDonationRequest {
        CreateDonationRequest {
            country: Some("Kenya".to_string()),
            quantity: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_goal_percent() {
        assert_eq!(goal_percent(0), 0);
        assert_eq!(goal_percent(400), 25);
        assert_eq!(goal_percent(1599), 99);
        assert_eq!(goal_percent(5000), 100);
    }

    #[test]
    fn test_signed_in_defaults() {
        let u = user();
        let d = prepare_donation(Some(&u), &request()).unwrap();
        assert_eq!(d.name, "Amina Otieno");
        assert_eq!(d.email, "amina@example.com");
        assert_eq!(d.donor_id, Some(5));
        assert_eq!(d.frequency, DonationFrequency::OneTime);
    }

    #[test]
    fn test_anonymous_needs_name_and_email() {
        assert!(matches!(
            prepare_donation(None, &request()),
            Err(DonationError::Invalid(ValidationError::Required { field: "name" }))
        ));

        let req = CreateDonationRequest {
            name: Some("Guest".to_string()),
            email: Some("guest@example.com".to_string()),
            ..request()
        };
        let d = prepare_donation(None, &req).unwrap();
        assert_eq!(d.donor_id, None);
        assert_eq!(d.name, "Guest");
    }

    #[test]
    fn test_quantity_and_frequency_checks() {
        let u = user();
        let req = CreateDonationRequest {
            quantity: Some(0),
            ..request()
        };
        assert!(matches!(
            prepare_donation(Some(&u), &req),
            Err(DonationError::InvalidQuantity)
        ));

        let req = CreateDonationRequest {
            frequency: Some("yearly".to_string()),
            ..request()
        };
        assert!(prepare_donation(Some(&u), &req).is_err());

        let req = CreateDonationRequest {
            email: Some("not-an-email".to_string()),
            ..request()
        };
        assert!(prepare_donation(Some(&u), &req).is_err());
    }
}
