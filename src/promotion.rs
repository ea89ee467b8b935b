//! Promotions shown to users
//!
//! A promotion is live when it is active and today falls inside its
//! validity window. Missing bounds are open.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::validation::{ValidationError, non_blank, parse_optional_date};

/// `promotions_tb` row
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Promotion {
    pub promotion_id: i64,
    pub title: String,
    pub description: String,
    pub badge_text: String,
    pub reward: String,
    pub cta_label: String,
    pub cta_link: String,
    pub is_active: bool,
    pub priority: i16,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    pub fn is_live(&self, today: NaiveDate) -> bool {
        self.is_active
            && self.valid_from.is_none_or(|from| from <= today)
            && self.valid_until.is_none_or(|until| until >= today)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PromotionList {
    /// Highest-priority live promotion
    pub featured: Option<Promotion>,
    pub promotions: Vec<Promotion>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreatePromotionRequest {
    #[validate(length(min = 1, max = 150))]
    #[schema(example = "Zero-fee weekend")]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(max = 20))]
    pub badge_text: Option<String>,
    #[validate(length(max = 120))]
    pub reward: Option<String>,
    /// Default "View details"
    #[validate(length(max = 40))]
    pub cta_label: Option<String>,
    #[validate(length(max = 200))]
    pub cta_link: Option<String>,
    /// Default true
    pub is_active: Option<bool>,
    #[validate(range(min = 0))]
    pub priority: Option<i16>,
    /// `YYYY-MM-DD`
    pub valid_from: Option<String>,
    /// `YYYY-MM-DD`
    pub valid_until: Option<String>,
}

#[derive(Error, Debug)]
pub enum PromotionError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("valid_until must not be earlier than valid_from")]
    InvalidWindow,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PromotionError {
    pub fn code(&self) -> &'static str {
        match self {
            PromotionError::Invalid(_) | PromotionError::InvalidWindow => "INVALID_PARAMETER",
            PromotionError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            PromotionError::Invalid(_) | PromotionError::InvalidWindow => 400,
            PromotionError::Database(_) => 500,
        }
    }
}

pub struct PromotionRepository;

impl PromotionRepository {
    /// Live on `today`, highest priority first
    pub async fn live(pool: &PgPool, today: NaiveDate) -> Result<Vec<Promotion>, sqlx::Error> {
        sqlx::query_as::<_, Promotion>(
            r#"SELECT promotion_id, title, description, badge_text, reward, cta_label, cta_link,
                      is_active, priority, valid_from, valid_until, created_at
               FROM promotions_tb
               WHERE is_active
                 AND (valid_from IS NULL OR valid_from <= $1)
                 AND (valid_until IS NULL OR valid_until >= $1)
               ORDER BY priority DESC, title ASC"#,
        )
        .bind(today)
        .fetch_all(pool)
        .await
    }
}

pub async fn list_live(pool: &PgPool) -> Result<PromotionList, PromotionError> {
    let promotions = PromotionRepository::live(pool, Utc::now().date_naive()).await?;
    Ok(PromotionList {
        featured: promotions.first().cloned(),
        promotions,
    })
}

pub async fn create_promotion(
    pool: &PgPool,
    req: &CreatePromotionRequest,
) -> Result<Promotion, PromotionError> {
    let valid_from = parse_optional_date("valid_from", req.valid_from.as_deref())?;
    let valid_until = parse_optional_date("valid_until", req.valid_until.as_deref())?;
    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        if until < from {
            return Err(PromotionError::InvalidWindow);
        }
    }

    let row = sqlx::query_as::<_, Promotion>(
        r#"INSERT INTO promotions_tb
               (title, description, badge_text, reward, cta_label, cta_link,
                is_active, priority, valid_from, valid_until)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
           RETURNING promotion_id, title, description, badge_text, reward, cta_label, cta_link,
                     is_active, priority, valid_from, valid_until, created_at"#,
    )
    .bind(req.title.trim())
    .bind(req.description.trim())
    .bind(req.badge_text.as_deref().unwrap_or_default().trim())
    .bind(req.reward.as_deref().unwrap_or_default().trim())
    .bind(non_blank(req.cta_label.as_deref()).unwrap_or("View details"))
    .bind(req.cta_link.as_deref().unwrap_or_default().trim())
    .bind(req.is_active.unwrap_or(true))
    .bind(req.priority.unwrap_or(0))
    .bind(valid_from)
    .bind(valid_until)
    .fetch_one(pool)
    .await?;

    tracing::info!(promotion_id = row.promotion_id, "promotion created");
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn promo(from: Option<NaiveDate>, until: Option<NaiveDate>, active: bool) -> Promotion {
        Promotion {
            promotion_id: 1,
            title: "Zero-fee weekend".to_string(),
            description: String::new(),
            badge_text: String::new(),
            reward: String::new(),
            cta_label: "View details".to_string(),
            cta_link: String::new(),
            is_active: active,
            priority: 0,
            valid_from: from,
            valid_until: until,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_window_is_live() {
        assert!(promo(None, None, true).is_live(date(2025, 1, 1)));
        assert!(!promo(None, None, false).is_live(date(2025, 1, 1)));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let p = promo(Some(date(2025, 3, 1)), Some(date(2025, 3, 31)), true);
        assert!(p.is_live(date(2025, 3, 1)));
        assert!(p.is_live(date(2025, 3, 31)));
        assert!(!p.is_live(date(2025, 2, 28)));
        assert!(!p.is_live(date(2025, 4, 1)));
    }

    #[test]
    fn test_request_validation() {
        let req = CreatePromotionRequest {
            title: "T".to_string(),
            description: "D".to_string(),
            badge_text: Some("x".repeat(21)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
