//! Repository layer for users and profiles

use serde::Serialize;
use sqlx::{PgConnection, PgPool, Row};
use utoipa::ToSchema;

use super::models::{Profile, User};

/// Fields for a new user row
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Fields for a new profile row
pub struct NewProfile<'a> {
    pub user_id: i64,
    pub display_name: &'a str,
    pub phone_number: Option<&'a str>,
    pub country: &'a str,
    pub city: &'a str,
    pub preferred_currency: &'a str,
}

/// Editable profile fields, already validated
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub display_name: String,
    pub membership_level: String,
    pub preferred_currency: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub phone_number: Option<String>,
    pub language: String,
}

/// Recipient choice offered on the dashboard
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct RecipientOption {
    pub username: String,
    pub display_name: String,
    pub phone_number: String,
}

/// Profile line in the admin console
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct ProfileSummary {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub membership_level: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// User repository
pub struct UserRepository;

impl UserRepository {
    /// Get user by ID
    pub async fn get_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM users_tb WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Look up by username or e-mail (case-insensitive e-mail match).
    /// An exact username match wins over an e-mail match.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT * FROM users_tb
               WHERE username = $1 OR LOWER(email) = LOWER($1)
               ORDER BY (username = $1) DESC
               LIMIT 1"#,
        )
        .bind(login)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT * FROM users_tb WHERE LOWER(email) = LOWER($1) LIMIT 1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users_tb WHERE username = $1)"#,
        )
        .bind(username)
        .fetch_one(pool)
        .await
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users_tb WHERE LOWER(email) = LOWER($1))"#,
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Insert a user inside an open transaction
    pub async fn create(conn: &mut PgConnection, user: &NewUser<'_>) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"INSERT INTO users_tb (username, email, password_hash, first_name, last_name)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING user_id"#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .fetch_one(conn)
        .await?;

        Ok(row.get("user_id"))
    }

    pub async fn update_password(
        conn: &mut PgConnection,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE users_tb SET password_hash = $2, updated_at = NOW() WHERE user_id = $1"#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users_tb"#)
            .fetch_one(pool)
            .await
    }
}

/// Profile repository
pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn get_by_user(pool: &PgPool, user_id: i64) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(r#"SELECT * FROM profiles_tb WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a profile inside an open transaction
    pub async fn create(
        conn: &mut PgConnection,
        profile: &NewProfile<'_>,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"INSERT INTO profiles_tb
                   (user_id, display_name, phone_number, country, city, preferred_currency)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(profile.user_id)
        .bind(profile.display_name)
        .bind(profile.phone_number)
        .bind(profile.country)
        .bind(profile.city)
        .bind(profile.preferred_currency)
        .fetch_one(conn)
        .await
    }

    /// Get the user's profile, creating a default one if missing.
    pub async fn ensure_profile(pool: &PgPool, user: &User) -> Result<Profile, sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO profiles_tb (user_id, display_name)
               VALUES ($1, $2)
               ON CONFLICT (user_id) DO NOTHING"#,
        )
        .bind(user.user_id)
        .bind(user.display_name())
        .execute(pool)
        .await?;

        sqlx::query_as::<_, Profile>(r#"SELECT * FROM profiles_tb WHERE user_id = $1"#)
            .bind(user.user_id)
            .fetch_one(pool)
            .await
    }

    /// Profile holding this exact phone number, with its owner
    pub async fn find_by_phone(
        pool: &PgPool,
        phone: &str,
    ) -> Result<Option<(Profile, User)>, sqlx::Error> {
        let Some(profile) = sqlx::query_as::<_, Profile>(
            r#"SELECT * FROM profiles_tb WHERE phone_number = $1"#,
        )
        .bind(phone)
        .fetch_optional(pool)
        .await?
        else {
            return Ok(None);
        };

        let user = UserRepository::get_by_id(pool, profile.user_id).await?;
        Ok(user.map(|u| (profile, u)))
    }

    /// True when another user's profile already uses `phone`
    pub async fn phone_in_use(
        pool: &PgPool,
        phone: &str,
        exclude_user: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM profiles_tb
                   WHERE phone_number = $1 AND ($2::BIGINT IS NULL OR user_id <> $2)
               )"#,
        )
        .bind(phone)
        .bind(exclude_user)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        user_id: i64,
        changes: &ProfileChanges,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"UPDATE profiles_tb SET
                   display_name = $2,
                   membership_level = $3,
                   preferred_currency = $4,
                   country = $5,
                   city = $6,
                   address = $7,
                   postal_code = $8,
                   phone_number = $9,
                   language = $10,
                   updated_at = NOW()
               WHERE user_id = $1
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(&changes.display_name)
        .bind(&changes.membership_level)
        .bind(&changes.preferred_currency)
        .bind(&changes.country)
        .bind(&changes.city)
        .bind(&changes.address)
        .bind(&changes.postal_code)
        .bind(&changes.phone_number)
        .bind(&changes.language)
        .fetch_one(pool)
        .await
    }

    pub async fn set_active(
        pool: &PgPool,
        user_id: i64,
        is_active: bool,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"UPDATE profiles_tb SET is_active = $2, updated_at = NOW()
               WHERE user_id = $1
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_one(pool)
        .await
    }

    /// Active profiles with a phone number, excluding `user_id`
    pub async fn available_recipients(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<RecipientOption>, sqlx::Error> {
        sqlx::query_as::<_, RecipientOption>(
            r#"SELECT u.username, p.display_name, p.phone_number
               FROM profiles_tb p
               JOIN users_tb u ON u.user_id = p.user_id
               WHERE p.is_active
                 AND p.phone_number IS NOT NULL
                 AND p.phone_number <> ''
                 AND p.user_id <> $1
               ORDER BY u.username"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Newest profiles first
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<ProfileSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProfileSummary>(
            r#"SELECT p.user_id, u.username, u.email, p.display_name, p.membership_level,
                      p.role, p.is_active, p.created_at
               FROM profiles_tb p
               JOIN users_tb u ON u.user_id = p.user_id
               ORDER BY p.created_at DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// `(membership_level, count)` pairs, ordered by level
    pub async fn membership_breakdown(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            r#"SELECT membership_level, COUNT(*)
               FROM profiles_tb
               GROUP BY membership_level
               ORDER BY membership_level"#,
        )
        .fetch_all(pool)
        .await
    }
}
