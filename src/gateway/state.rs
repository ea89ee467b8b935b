use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::transfer::TransferService;
use crate::user_auth::{LogResetLinkSender, PasswordResetService, UserAuthService};

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool
    pub db: Database,
    /// Registration, login and token checks
    pub user_auth: Arc<UserAuthService>,
    pub password_reset: Arc<PasswordResetService>,
    /// Transfer submission and lookup
    pub transfers: TransferService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        let pool = db.pool().clone();
        let auth = &config.auth;

        let user_auth = Arc::new(UserAuthService::new(
            pool.clone(),
            auth.jwt_secret.clone(),
            auth.token_ttl_hours,
        ));
        let password_reset = Arc::new(PasswordResetService::new(
            pool.clone(),
            auth.reset_token_ttl_hours,
            auth.public_base_url.clone(),
            auth.expose_reset_links,
            Arc::new(LogResetLinkSender),
        ));
        let transfers = TransferService::new(pool, config.transfer.require_sufficient_balance);

        Self {
            db,
            user_auth,
            password_reset,
            transfers,
            config: Arc::new(config),
        }
    }
}
