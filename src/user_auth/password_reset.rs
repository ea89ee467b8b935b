//! Password reset by e-mailed link
//!
//! Request: a known e-mail gets a fresh single-use token (older ones are
//! deleted). The response never says whether the address is registered.
//! Confirm: the token must exist, be unused and unexpired.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::service::{AuthError, check_new_password, hash_password};
use crate::account::UserRepository;
use crate::account::validation::non_blank;

pub const RESET_CONFIRMED_MSG: &str =
    "Your password has been reset successfully. You can now login.";

/// Delivers reset links to users
#[async_trait]
pub trait ResetLinkSender: Send + Sync {
    async fn send(&self, email: &str, link: &str) -> anyhow::Result<()>;
}

/// Writes the link to the log; used until a mail transport is configured
pub struct LogResetLinkSender;

#[async_trait]
impl ResetLinkSender for LogResetLinkSender {
    async fn send(&self, email: &str, link: &str) -> anyhow::Result<()> {
        tracing::info!(email, link, "password reset link issued");
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct PasswordResetRequest {
    #[schema(example = "amina@example.com")]
    #[validate(length(max = 254))]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct PasswordResetConfirm {
    pub password1: Option<String>,
    pub password2: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordResetIssued {
    pub message: String,
    /// Only present when links are exposed in responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_link: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResetTokenStatus {
    pub token: String,
    pub valid: bool,
    pub expires_at: DateTime<Utc>,
}

pub struct PasswordResetService {
    db: PgPool,
    ttl: Duration,
    base_url: String,
    expose_links: bool,
    sender: Arc<dyn ResetLinkSender>,
}

impl PasswordResetService {
    pub fn new(
        db: PgPool,
        ttl_hours: i64,
        base_url: String,
        expose_links: bool,
        sender: Arc<dyn ResetLinkSender>,
    ) -> Self {
        Self {
            db,
            ttl: Duration::hours(ttl_hours),
            base_url,
            expose_links,
            sender,
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/api/v1/auth/password-reset/{}",
            self.base_url.trim_end_matches('/'),
            token
        )
    }

    /// Issue a reset token for `email` if it belongs to a user.
    pub async fn request(&self, email: Option<&str>) -> Result<PasswordResetIssued, AuthError> {
        let email = non_blank(email).ok_or(AuthError::EmailRequired)?;
        let message = format!(
            "If {} is registered, you will receive a password reset link.",
            email
        );

        let Some(user) = UserRepository::find_by_email(&self.db, email)
            .await
            .context("DB query failed")?
        else {
            tracing::info!("password reset requested for unknown address");
            return Ok(PasswordResetIssued {
                message,
                reset_link: None,
            });
        };

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.ttl;

        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        sqlx::query(r#"DELETE FROM password_reset_tokens_tb WHERE user_id = $1"#)
            .bind(user.user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete old reset tokens")?;
        sqlx::query(
            r#"INSERT INTO password_reset_tokens_tb (user_id, token, expires_at)
               VALUES ($1, $2, $3)"#,
        )
        .bind(user.user_id)
        .bind(&token)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert reset token")?;
        tx.commit().await.context("Failed to commit reset token")?;

        let link = self.reset_link(&token);
        if let Err(e) = self.sender.send(&user.email, &link).await {
            tracing::warn!(user_id = user.user_id, "failed to deliver reset link: {:#}", e);
        }

        Ok(PasswordResetIssued {
            message,
            reset_link: self.expose_links.then_some(link),
        })
    }

    /// Check that a token can still be used
    pub async fn check(&self, token: &str) -> Result<ResetTokenStatus, AuthError> {
        let expires_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"SELECT expires_at FROM password_reset_tokens_tb
               WHERE token = $1 AND used = FALSE AND expires_at > NOW()"#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AuthError::ResetTokenInvalid)?;

        Ok(ResetTokenStatus {
            token: token.to_string(),
            valid: true,
            expires_at,
        })
    }

    /// Set a new password and consume the token
    pub async fn confirm(&self, token: &str, req: &PasswordResetConfirm) -> Result<(), AuthError> {
        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"SELECT user_id FROM password_reset_tokens_tb
               WHERE token = $1 AND used = FALSE AND expires_at > NOW()
               FOR UPDATE"#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::ResetTokenInvalid)?;

        let password = check_new_password(
            req.password1.as_deref(),
            req.password2.as_deref(),
            AuthError::ResetFieldsMissing,
        )?;
        let password_hash = hash_password(&password)?;

        UserRepository::update_password(&mut tx, user_id, &password_hash).await?;
        sqlx::query(r#"UPDATE password_reset_tokens_tb SET used = TRUE WHERE token = $1"#)
            .bind(token)
            .execute(&mut *tx)
            .await?;
        tx.commit().await.context("Failed to commit password reset")?;

        tracing::info!(user_id, "password reset completed");
        Ok(())
    }
}
