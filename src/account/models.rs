//! Data models for users and profiles

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Profile role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Standard,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Role::Standard),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User credentials row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "first last", trimmed; empty when neither is set
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Full name, falling back to the username
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Per-user profile row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub profile_id: i64,
    pub user_id: i64,
    pub display_name: String,
    pub membership_level: String,
    pub preferred_currency: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub phone_number: Option<String>,
    pub language: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Unknown stored values degrade to `Standard`
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }
}

/// Profile as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileView {
    pub user_id: i64,
    #[schema(example = "amina")]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    #[schema(example = "Standard")]
    pub membership_level: String,
    #[schema(example = "USD")]
    pub preferred_currency: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub phone_number: Option<String>,
    pub language: String,
    #[schema(example = "standard")]
    pub role: String,
    pub is_active: bool,
}

impl ProfileView {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            display_name: profile.display_name.clone(),
            membership_level: profile.membership_level.clone(),
            preferred_currency: profile.preferred_currency.clone(),
            country: profile.country.clone(),
            city: profile.city.clone(),
            address: profile.address.clone(),
            postal_code: profile.postal_code.clone(),
            phone_number: profile.phone_number.clone(),
            language: profile.language.clone(),
            role: profile.role().to_string(),
            is_active: profile.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            user_id: 1,
            username: "amina".to_string(),
            email: "amina@example.com".to_string(),
            password_hash: String::new(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trip_and_admin() {
        for role in [Role::Standard, Role::Admin, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(!Role::Standard.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(user("Amina", "Okafor").display_name(), "Amina Okafor");
        assert_eq!(user("Amina", "").display_name(), "Amina");
        assert_eq!(user("", "").display_name(), "amina");
    }
}
