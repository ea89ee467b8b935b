//! Admin notifications
//!
//! A global notification is addressed to every active profile at send time;
//! otherwise only to the listed user ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::validation::{ValidationError, non_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[default]
    General,
    Security,
    Maintenance,
    Promotion,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::General => "general",
            NotificationType::Security => "security",
            NotificationType::Maintenance => "maintenance",
            NotificationType::Promotion => "promotion",
        }
    }
}

impl FromStr for NotificationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "general" => Ok(NotificationType::General),
            "security" => Ok(NotificationType::Security),
            "maintenance" => Ok(NotificationType::Maintenance),
            "promotion" => Ok(NotificationType::Promotion),
            other => Err(ValidationError::InvalidChoice {
                field: "notification_type",
                value: other.to_string(),
            }),
        }
    }
}

/// `notifications_tb` row
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Notification {
    pub notification_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub sent_by: i64,
    pub is_global: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct SendNotificationRequest {
    #[validate(length(min = 1, max = 150))]
    #[schema(example = "Scheduled maintenance")]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    /// general | security | maintenance | promotion (default general)
    pub notification_type: Option<String>,
    pub is_global: bool,
    /// Ignored for global notifications
    pub recipients: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SentNotification {
    pub notification: Notification,
    pub recipient_count: u64,
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Select at least one recipient or send the notification globally.")]
    NoRecipients,

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl NotificationError {
    pub fn code(&self) -> &'static str {
        match self {
            NotificationError::NoRecipients => "NO_RECIPIENTS",
            NotificationError::Invalid(_) => "INVALID_PARAMETER",
            NotificationError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            NotificationError::NoRecipients | NotificationError::Invalid(_) => 400,
            NotificationError::Database(_) => 500,
        }
    }
}

pub fn sent_message(title: &str) -> String {
    format!("Notification '{}' sent successfully.", title)
}

/// Deduplicated explicit recipients, in first-seen order
fn unique_recipients(ids: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

pub async fn send(
    pool: &PgPool,
    sent_by: i64,
    req: &SendNotificationRequest,
) -> Result<SentNotification, NotificationError> {
    let kind = match non_blank(req.notification_type.as_deref()) {
        Some(t) => t.parse()?,
        None => NotificationType::default(),
    };
    let title = non_blank(Some(req.title.as_str())).ok_or(ValidationError::Required { field: "title" })?;
    let message =
        non_blank(Some(req.message.as_str())).ok_or(ValidationError::Required { field: "message" })?;
    let recipients = unique_recipients(&req.recipients);
    if !req.is_global && recipients.is_empty() {
        return Err(NotificationError::NoRecipients);
    }

    let mut tx = pool.begin().await?;

    let notification = sqlx::query_as::<_, Notification>(
        r#"INSERT INTO notifications_tb (title, message, notification_type, sent_by, is_global)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING notification_id, title, message, notification_type, sent_by,
                     is_global, is_active, created_at"#,
    )
    .bind(title)
    .bind(message)
    .bind(kind.as_str())
    .bind(sent_by)
    .bind(req.is_global)
    .fetch_one(&mut *tx)
    .await?;

    let inserted = if req.is_global {
        sqlx::query(
            r#"INSERT INTO notification_recipients_tb (notification_id, user_id)
               SELECT $1, user_id FROM profiles_tb WHERE is_active"#,
        )
        .bind(notification.notification_id)
        .execute(&mut *tx)
        .await?
    } else {
        sqlx::query(
            r#"INSERT INTO notification_recipients_tb (notification_id, user_id)
               SELECT $1, u.user_id FROM users_tb u WHERE u.user_id = ANY($2)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(notification.notification_id)
        .bind(&recipients)
        .execute(&mut *tx)
        .await?
    };

    // None of the listed ids exist; dropping `tx` discards the notification
    if !req.is_global && inserted.rows_affected() == 0 {
        return Err(NotificationError::NoRecipients);
    }

    tx.commit().await?;

    tracing::info!(
        notification_id = notification.notification_id,
        sent_by,
        is_global = req.is_global,
        recipients = inserted.rows_affected(),
        "notification sent"
    );

    Ok(SentNotification {
        notification,
        recipient_count: inserted.rows_affected(),
    })
}

/// Active notifications addressed to the user, newest first
pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Notification>, NotificationError> {
    let rows = sqlx::query_as::<_, Notification>(
        r#"SELECT n.notification_id, n.title, n.message, n.notification_type, n.sent_by,
                  n.is_global, n.is_active, n.created_at
           FROM notifications_tb n
           WHERE n.is_active
             AND (n.is_global OR EXISTS (
                   SELECT 1 FROM notification_recipients_tb r
                   WHERE r.notification_id = n.notification_id AND r.user_id = $1))
           ORDER BY n.created_at DESC, n.notification_id DESC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
