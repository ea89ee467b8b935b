//! Financial-literacy learning resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::account::validation::{ValidationError, non_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LearningCategory {
    Budget,
    Remittance,
    Business,
    Safety,
}

impl LearningCategory {
    pub const ALL: [LearningCategory; 4] = [
        LearningCategory::Budget,
        LearningCategory::Remittance,
        LearningCategory::Business,
        LearningCategory::Safety,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningCategory::Budget => "budget",
            LearningCategory::Remittance => "remittance",
            LearningCategory::Business => "business",
            LearningCategory::Safety => "safety",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LearningCategory::Budget => "Budgeting",
            LearningCategory::Remittance => "Smart Remittances",
            LearningCategory::Business => "Small Business",
            LearningCategory::Safety => "Safety & Fraud",
        }
    }
}

impl FromStr for LearningCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LearningLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl LearningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningLevel::Beginner => "beginner",
            LearningLevel::Intermediate => "intermediate",
            LearningLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for LearningLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "beginner" => Ok(LearningLevel::Beginner),
            "intermediate" => Ok(LearningLevel::Intermediate),
            "advanced" => Ok(LearningLevel::Advanced),
            other => Err(ValidationError::InvalidChoice {
                field: "level",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    #[default]
    Article,
    Toolkit,
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Article => "article",
            ResourceType::Toolkit => "toolkit",
            ResourceType::Video => "video",
        }
    }
}

impl FromStr for ResourceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "article" => Ok(ResourceType::Article),
            "toolkit" => Ok(ResourceType::Toolkit),
            "video" => Ok(ResourceType::Video),
            other => Err(ValidationError::InvalidChoice {
                field: "resource_type",
                value: other.to_string(),
            }),
        }
    }
}

/// `learning_resources_tb` row
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct LearningResource {
    pub resource_id: i64,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub level: String,
    pub duration_minutes: i32,
    pub resource_type: String,
    pub call_to_action: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryCount {
    #[schema(example = "budget")]
    pub category: &'static str,
    #[schema(example = "Budgeting")]
    pub label: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LearningCatalog {
    /// Applied filter, `all` when none
    pub selected_category: String,
    pub categories: Vec<CategoryCount>,
    pub resources: Vec<LearningResource>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LearningQuery {
    /// budget | remittance | business | safety | all
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateLearningResourceRequest {
    #[validate(length(min = 1, max = 150))]
    #[schema(example = "Build a monthly budget")]
    pub title: String,
    #[validate(length(min = 1))]
    pub summary: String,
    #[schema(example = "budget")]
    pub category: String,
    /// Default beginner
    pub level: Option<String>,
    /// Default 5
    #[validate(range(min = 0))]
    pub duration_minutes: Option<i32>,
    /// Default article
    pub resource_type: Option<String>,
    /// Default "Read Lesson"
    #[validate(length(max = 40))]
    pub call_to_action: Option<String>,
    #[validate(length(max = 200))]
    pub link: Option<String>,
}

#[derive(Error, Debug)]
pub enum LearningError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LearningError {
    pub fn code(&self) -> &'static str {
        match self {
            LearningError::Invalid(_) => "INVALID_PARAMETER",
            LearningError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            LearningError::Invalid(_) => 400,
            LearningError::Database(_) => 500,
        }
    }
}

/// `None` for a blank filter or `all`
pub fn parse_category_filter(raw: Option<&str>) -> Result<Option<LearningCategory>, ValidationError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.to_ascii_lowercase().parse().map(Some),
    }
}

/// One entry per category in display order, zero-filled
pub fn fill_counts(rows: &[(String, i64)]) -> Vec<CategoryCount> {
    LearningCategory::ALL
        .iter()
        .map(|c| CategoryCount {
            category: c.as_str(),
            label: c.label(),
            count: rows
                .iter()
                .find(|(name, _)| name == c.as_str())
                .map(|(_, n)| *n)
                .unwrap_or(0),
        })
        .collect()
}

pub struct LearningRepository;

impl LearningRepository {
    pub async fn list(
        pool: &PgPool,
        category: Option<LearningCategory>,
    ) -> Result<Vec<LearningResource>, sqlx::Error> {
        sqlx::query_as::<_, LearningResource>(
            r#"SELECT resource_id, title, summary, category, level, duration_minutes,
                      resource_type, call_to_action, link, created_at
               FROM learning_resources_tb
               WHERE $1::VARCHAR IS NULL OR category = $1
               ORDER BY category ASC, title ASC"#,
        )
        .bind(category.map(|c| c.as_str()))
        .fetch_all(pool)
        .await
    }

    pub async fn category_counts(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            r#"SELECT category, COUNT(*) FROM learning_resources_tb GROUP BY category"#,
        )
        .fetch_all(pool)
        .await
    }
}

pub async fn catalog(pool: &PgPool, category: Option<&str>) -> Result<LearningCatalog, LearningError> {
    let filter = parse_category_filter(category)?;
    let resources = LearningRepository::list(pool, filter).await?;
    let counts = LearningRepository::category_counts(pool).await?;
    Ok(LearningCatalog {
        selected_category: filter.map_or("all", |c| c.as_str()).to_string(),
        categories: fill_counts(&counts),
        resources,
    })
}

pub async fn create_resource(
    pool: &PgPool,
    req: &CreateLearningResourceRequest,
) -> Result<LearningResource, LearningError> {
    let category: LearningCategory = req.category.parse()?;
    let level = match non_blank(req.level.as_deref()) {
        Some(l) => l.parse()?,
        None => LearningLevel::default(),
    };
    let resource_type = match non_blank(req.resource_type.as_deref()) {
        Some(t) => t.parse()?,
        None => ResourceType::default(),
    };

    let row = sqlx::query_as::<_, LearningResource>(
        r#"INSERT INTO learning_resources_tb
               (title, summary, category, level, duration_minutes, resource_type, call_to_action, link)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
           RETURNING resource_id, title, summary, category, level, duration_minutes,
                     resource_type, call_to_action, link, created_at"#,
    )
    .bind(req.title.trim())
    .bind(req.summary.trim())
    .bind(category.as_str())
    .bind(level.as_str())
    .bind(req.duration_minutes.unwrap_or(5))
    .bind(resource_type.as_str())
    .bind(non_blank(req.call_to_action.as_deref()).unwrap_or("Read Lesson"))
    .bind(req.link.as_deref().unwrap_or_default().trim())
    .fetch_one(pool)
    .await?;

    tracing::info!(resource_id = row.resource_id, category = category.as_str(), "learning resource created");
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_filter() {
        assert_eq!(parse_category_filter(None).unwrap(), None);
        assert_eq!(parse_category_filter(Some("  ")).unwrap(), None);
        assert_eq!(parse_category_filter(Some("All")).unwrap(), None);
        assert_eq!(
            parse_category_filter(Some("Safety")).unwrap(),
            Some(LearningCategory::Safety)
        );
        assert!(parse_category_filter(Some("crypto")).is_err());
    }

    #[test]
    fn test_counts_cover_every_category() {
        let counts = fill_counts(&[("safety".to_string(), 3), ("budget".to_string(), 1)]);
        let pairs: Vec<_> = counts.iter().map(|c| (c.category, c.count)).collect();
        assert_eq!(
            pairs,
            vec![("budget", 1), ("remittance", 0), ("business", 0), ("safety", 3)]
        );
        assert_eq!(counts[3].label, "Safety & Fraud");
    }

    #[test]
    fn test_level_and_type_parsing() {
        assert_eq!("advanced".parse::<LearningLevel>().unwrap(), LearningLevel::Advanced);
        assert_eq!("video".parse::<ResourceType>().unwrap(), ResourceType::Video);
        assert!("podcast".parse::<ResourceType>().is_err());
    }
}
