//! HTTP gateway
//!
//! Route groups:
//! - public: health, auth, donation stats, promotions, learning, chatbot
//! - optional auth: donation pledges
//! - JWT: everything owned by a user
//! - admin: JWT plus an admin-role check

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db::Database;
use crate::user_auth::{self, jwt_auth_middleware, optional_auth_middleware, require_admin};
use state::AppState;

/// Build the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(user_auth::handlers::register))
        .route("/register/options", get(user_auth::handlers::get_register_options))
        .route("/login", post(user_auth::handlers::login))
        .route("/password-reset", post(user_auth::handlers::request_password_reset))
        .route(
            "/password-reset/{token}",
            get(user_auth::handlers::check_password_reset)
                .post(user_auth::handlers::confirm_password_reset),
        )
        .merge(
            Router::new()
                .route("/logout", post(user_auth::handlers::logout))
                .layer(from_fn_with_state(state.clone(), jwt_auth_middleware)),
        );

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/donations/stats", get(handlers::community::donation_stats))
        .route("/promotions", get(handlers::community::list_promotions))
        .route("/learning", get(handlers::community::list_learning))
        .route("/chatbot", post(handlers::community::chatbot));

    let optional_auth_routes = Router::new()
        .route("/donations", post(handlers::community::create_donation))
        .layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    let user_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/users", get(handlers::dashboard::get_users_overview))
        .route("/notifications", get(handlers::dashboard::list_notifications))
        .route(
            "/transactions",
            get(handlers::finance::list_transactions).post(handlers::finance::create_transaction),
        )
        .route(
            "/goals",
            get(handlers::finance::list_goals).post(handlers::finance::create_goal),
        )
        .route(
            "/budget",
            get(handlers::finance::get_budget).post(handlers::finance::upsert_budget),
        )
        .route("/budget/{entry_id}", delete(handlers::finance::delete_budget_entry))
        .route(
            "/transfers",
            get(handlers::transfer::list_transfers).post(handlers::transfer::create_transfer),
        )
        .route("/transfers/{reference}", get(handlers::transfer::get_transfer))
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    // Layers run outermost-last: JWT first, then the role check
    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::admin::admin_dashboard))
        .route(
            "/transfers/{transfer_id}/status",
            post(handlers::admin::update_transfer_status),
        )
        .route("/users/{user_id}/toggle", post(handlers::admin::toggle_user))
        .route("/notifications", post(handlers::admin::send_notification))
        .route("/promotions", post(handlers::admin::create_promotion))
        .route("/learning", post(handlers::admin::create_learning_resource))
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .merge(public_routes)
        .merge(optional_auth_routes)
        .merge(user_routes);

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP server and serve until the process is stopped
pub async fn run_server(config: AppConfig, db: Database) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(AppState::new(config, db));
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {} (is the port already in use?)", addr, e))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
