use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Apply embedded migrations at startup
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    20
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_reset_token_ttl_hours")]
    pub reset_token_ttl_hours: i64,
    /// Return password-reset links in API responses (no mail transport in dev)
    #[serde(default)]
    pub expose_reset_links: bool,
    /// Base URL used to build password-reset links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_reset_token_ttl_hours() -> i64 {
    2
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            reset_token_ttl_hours: default_reset_token_ttl_hours(),
            expose_reset_links: false,
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    /// Refuse transfers whose total exceeds the sender's ledger balance
    pub require_sufficient_balance: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            require_sufficient_balance: true,
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply `DATABASE_URL` / `JWT_SECRET` overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("auth.jwt_secret is empty (set it in config or via JWT_SECRET)");
        }
        if self.auth.token_ttl_hours <= 0 || self.auth.reset_token_ttl_hours <= 0 {
            anyhow::bail!("auth token lifetimes must be positive");
        }
        Ok(())
    }
}
