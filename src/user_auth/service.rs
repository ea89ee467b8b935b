use anyhow::{Context, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::account::repository::{NewProfile, NewUser};
use crate::account::validation::non_blank;
use crate::account::{CurrencyCode, PhoneNumber, ProfileRepository, UserRepository, ValidationError};
use crate::db::is_unique_violation;

pub const MIN_PASSWORD_LEN: usize = 8;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
    pub jti: String, // Token id, used for logout
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Authentication errors. Display strings are shown to the user.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please fill in all required fields.")]
    MissingFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least 8 characters long.")]
    WeakPassword,

    #[error("Username already exists.")]
    UsernameTaken,

    #[error("Email already registered.")]
    EmailTaken,

    #[error("Phone number already registered.")]
    PhoneTaken,

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Please enter a correct username and password.")]
    InvalidCredentials,

    #[error("Your account has been suspended. Please contact support.")]
    AccountSuspended,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Please enter your email address.")]
    EmailRequired,

    #[error("Invalid or expired reset link.")]
    ResetTokenInvalid,

    #[error("Please fill in both password fields.")]
    ResetFieldsMissing,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingFields | AuthError::EmailRequired | AuthError::ResetFieldsMissing => {
                "MISSING_FIELDS"
            }
            AuthError::PasswordMismatch => "PASSWORD_MISMATCH",
            AuthError::WeakPassword => "WEAK_PASSWORD",
            AuthError::UsernameTaken => "USERNAME_TAKEN",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::PhoneTaken => "PHONE_TAKEN",
            AuthError::Invalid(_) => "INVALID_PARAMETER",
            AuthError::InvalidCredentials | AuthError::InvalidToken => "AUTH_FAILED",
            AuthError::AccountSuspended => "ACCOUNT_SUSPENDED",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::ResetTokenInvalid => "RESET_TOKEN_INVALID",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::MissingFields
            | AuthError::PasswordMismatch
            | AuthError::WeakPassword
            | AuthError::Invalid(_)
            | AuthError::EmailRequired
            | AuthError::ResetFieldsMissing
            | AuthError::ResetTokenInvalid => 400,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenRevoked => 401,
            AuthError::AccountSuspended => 403,
            AuthError::UsernameTaken | AuthError::EmailTaken | AuthError::PhoneTaken => 409,
            AuthError::Internal(_) => 500,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Internal(err.into())
    }
}

/// Check a new password pair: both present, equal, long enough.
pub fn check_new_password(
    password1: Option<&str>,
    password2: Option<&str>,
    missing: AuthError,
) -> Result<String, AuthError> {
    let (Some(p1), Some(p2)) = (
        password1.filter(|p| !p.is_empty()),
        password2.filter(|p| !p.is_empty()),
    ) else {
        return Err(missing);
    };
    if p1 != p2 {
        return Err(AuthError::PasswordMismatch);
    }
    if p1.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(p1.to_string())
}

/// Argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow!("Hashing failed: {}", e))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// User Registration Request
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[schema(example = "amina")]
    #[validate(length(max = 150))]
    pub username: Option<String>,
    #[schema(example = "amina@example.com")]
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[schema(example = "password123")]
    pub password1: Option<String>,
    #[schema(example = "password123")]
    pub password2: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[schema(example = "+254712345678")]
    pub phone_number: Option<String>,
    #[schema(example = "Kenya")]
    #[validate(length(max = 64))]
    pub country: Option<String>,
    #[validate(length(max = 64))]
    pub city: Option<String>,
    #[schema(example = "KES")]
    pub preferred_currency: Option<String>,
}

/// User Login Request
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct LoginRequest {
    /// Username or e-mail address
    #[serde(alias = "username", alias = "email")]
    #[schema(example = "amina")]
    pub login: Option<String>,
    #[schema(example = "password123")]
    pub password: Option<String>,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: &'static str,
    pub expires_at: i64,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrencyOption {
    pub code: &'static str,
    pub label: &'static str,
}

/// Choices offered on the registration form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterOptions {
    pub countries: Vec<&'static str>,
    pub currencies: Vec<CurrencyOption>,
}

const COUNTRIES: [&str; 19] = [
    "United States",
    "Canada",
    "United Kingdom",
    "Germany",
    "France",
    "Kenya",
    "Ghana",
    "Nigeria",
    "South Africa",
    "Uganda",
    "Tanzania",
    "Rwanda",
    "Ethiopia",
    "Senegal",
    "Morocco",
    "Australia",
    "India",
    "Philippines",
    "Other",
];

const CURRENCIES: [(&str, &str); 9] = [
    ("USD", "US Dollar ($)"),
    ("EUR", "Euro (€)"),
    ("GBP", "British Pound (£)"),
    ("KES", "Kenyan Shilling (KSh)"),
    ("GHS", "Ghanaian Cedi (₵)"),
    ("NGN", "Nigerian Naira (₦)"),
    ("ZAR", "South African Rand (R)"),
    ("UGX", "Ugandan Shilling"),
    ("TZS", "Tanzanian Shilling"),
];

pub fn register_options() -> RegisterOptions {
    RegisterOptions {
        countries: COUNTRIES.to_vec(),
        currencies: CURRENCIES
            .iter()
            .map(|&(code, label)| CurrencyOption { code, label })
            .collect(),
    }
}

/// Logged-out token ids, kept until the token would have expired anyway
#[derive(Debug, Default)]
pub struct RevokedTokens {
    entries: DashMap<String, usize>,
}

impl RevokedTokens {
    pub fn revoke(&self, jti: &str, exp: usize) {
        let now = Utc::now().timestamp() as usize;
        self.entries.retain(|_, e| *e > now);
        self.entries.insert(jti.to_string(), exp);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries.contains_key(jti)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct UserAuthService {
    db: PgPool,
    jwt_secret: String,
    token_ttl: Duration,
    revoked: RevokedTokens,
}

impl UserAuthService {
    pub fn new(db: PgPool, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            db,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
            revoked: RevokedTokens::default(),
        }
    }

    /// Register a new user and profile, then log them in.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let (Some(username), Some(email)) = (
            non_blank(req.username.as_deref()),
            non_blank(req.email.as_deref()),
        ) else {
            return Err(AuthError::MissingFields);
        };
        let password = check_new_password(
            req.password1.as_deref(),
            req.password2.as_deref(),
            AuthError::MissingFields,
        )?;

        let phone = PhoneNumber::optional(non_blank(req.phone_number.as_deref()))?;
        let currency = CurrencyCode::or_default(req.preferred_currency.as_deref())?;

        if UserRepository::username_exists(&self.db, username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if UserRepository::email_exists(&self.db, email).await? {
            return Err(AuthError::EmailTaken);
        }
        if let Some(phone) = &phone {
            if ProfileRepository::phone_in_use(&self.db, phone.as_str(), None).await? {
                return Err(AuthError::PhoneTaken);
            }
        }

        let password_hash = hash_password(&password)?;
        let first_name = req.first_name.as_deref().unwrap_or_default().trim();
        let last_name = req.last_name.as_deref().unwrap_or_default().trim();
        let display_name = {
            let full = format!("{} {}", first_name, last_name).trim().to_string();
            if full.is_empty() { username.to_string() } else { full }
        };

        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        let user_id = UserRepository::create(
            &mut tx,
            &NewUser {
                username,
                email,
                password_hash: &password_hash,
                first_name,
                last_name,
            },
        )
        .await
        .map_err(map_register_conflict)?;

        let profile = ProfileRepository::create(
            &mut tx,
            &NewProfile {
                user_id,
                display_name: &display_name,
                phone_number: phone.as_ref().map(|p| p.as_str()),
                country: req.country.as_deref().unwrap_or_default().trim(),
                city: req.city.as_deref().unwrap_or_default().trim(),
                preferred_currency: currency.as_str(),
            },
        )
        .await
        .map_err(map_register_conflict)?;
        tx.commit().await.context("Failed to commit registration")?;

        tracing::info!(user_id, username, "user registered");

        let (token, claims) = self.issue_token(user_id)?;
        Ok(AuthResponse {
            token,
            token_type: "Bearer",
            expires_at: claims.exp as i64,
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            display_name: profile.display_name,
            is_admin: false,
        })
    }

    /// Login by username or e-mail and issue a JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let (Some(login), Some(password)) = (
            non_blank(req.login.as_deref()),
            req.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::MissingFields);
        };

        let user = UserRepository::find_by_login(&self.db, login)
            .await
            .context("DB query failed")?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = user.user_id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let profile = ProfileRepository::ensure_profile(&self.db, &user).await?;
        if !profile.is_active {
            tracing::warn!(user_id = user.user_id, "login refused: account suspended");
            return Err(AuthError::AccountSuspended);
        }

        let (token, claims) = self.issue_token(user.user_id)?;
        tracing::info!(user_id = user.user_id, "user logged in");

        Ok(AuthResponse {
            token,
            token_type: "Bearer",
            expires_at: claims.exp as i64,
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            display_name: profile.display_name.clone(),
            is_admin: profile.is_admin(),
        })
    }

    /// Sign a fresh token for `user_id`
    pub fn issue_token(&self, user_id: i64) -> anyhow::Result<(String, Claims)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.token_ttl)
            .context("token expiry out of range")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to generate token")?;

        Ok((token, claims))
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| AuthError::InvalidToken)?;
        if self.revoked.is_revoked(&token_data.claims.jti) {
            return Err(AuthError::TokenRevoked);
        }
        Ok(token_data.claims)
    }

    pub fn logout(&self, claims: &Claims) {
        self.revoked.revoke(&claims.jti, claims.exp);
        tracing::info!(user_id = %claims.sub, "user logged out");
    }

    pub fn revoked(&self) -> &RevokedTokens {
        &self.revoked
    }
}

/// Unique violations that slip past the pre-checks under concurrency
fn map_register_conflict(err: sqlx::Error) -> AuthError {
    if is_unique_violation(&err, Some("users_tb_username_key")) {
        AuthError::UsernameTaken
    } else if is_unique_violation(&err, Some("users_tb_email_key")) {
        AuthError::EmailTaken
    } else if is_unique_violation(&err, Some("profiles_tb_phone_number_key")) {
        AuthError::PhoneTaken
    } else {
        AuthError::Internal(anyhow::Error::new(err).context("Failed to insert user"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UserAuthService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://unused@localhost/unused")
            .unwrap();
        UserAuthService::new(pool, "test-secret".to_string(), 24)
    }

    #[test]
    fn test_password_checks_in_order() {
        assert!(matches!(
            check_new_password(None, Some("x"), AuthError::MissingFields),
            Err(AuthError::MissingFields)
        ));
        assert!(matches!(
            check_new_password(Some("password1"), Some("password2"), AuthError::MissingFields),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            check_new_password(Some("short"), Some("short"), AuthError::MissingFields),
            Err(AuthError::WeakPassword)
        ));
        assert_eq!(
            check_new_password(Some("longenough"), Some("longenough"), AuthError::MissingFields)
                .unwrap(),
            "longenough"
        );
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let svc = service();
        let (token, issued) = svc.issue_token(42).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.jti, issued.jti);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let svc = service();
        let (token, claims) = svc.issue_token(7).unwrap();
        svc.logout(&claims);
        assert!(matches!(svc.verify_token(&token), Err(AuthError::TokenRevoked)));

        let (other, _) = svc.issue_token(7).unwrap();
        assert!(svc.verify_token(&other).is_ok());
    }

    #[tokio::test]
    async fn test_rejects_foreign_signature() {
        let svc = service();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://unused@localhost/unused")
            .unwrap();
        let other = UserAuthService::new(pool, "another-secret".to_string(), 24);
        let (token, _) = other.issue_token(1).unwrap();
        assert!(matches!(svc.verify_token(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(svc.verify_token("garbage"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_revoked_tokens_purge_expired() {
        let revoked = RevokedTokens::default();
        revoked.revoke("old", 1);
        assert!(revoked.is_revoked("old"));
        let future = (Utc::now().timestamp() + 3600) as usize;
        revoked.revoke("new", future);
        assert!(!revoked.is_revoked("old"));
        assert!(revoked.is_revoked("new"));
        assert_eq!(revoked.len(), 1);
    }

    #[test]
    fn test_register_options() {
        let options = register_options();
        assert_eq!(options.countries.len(), 19);
        assert_eq!(options.countries.last(), Some(&"Other"));
        assert_eq!(options.currencies[0].code, "USD");
        assert_eq!(options.currencies[3].label, "Kenyan Shilling (KSh)");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(AuthError::UsernameTaken.http_status(), 409);
        assert_eq!(AuthError::InvalidCredentials.http_status(), 401);
        assert_eq!(AuthError::AccountSuspended.http_status(), 403);
        assert_eq!(AuthError::ResetTokenInvalid.to_string(), "Invalid or expired reset link.");
    }

    #[test]
    fn test_login_request_aliases() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"x"}"#).unwrap();
        assert_eq!(req.login.as_deref(), Some("a@b.co"));
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"amina","password":"x"}"#).unwrap();
        assert_eq!(req.login.as_deref(), Some("amina"));
    }
}
