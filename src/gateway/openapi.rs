//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::MessageData;

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    Http::builder()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from /api/v1/auth/login or /api/v1/auth/register: \
                             Authorization: Bearer {token}",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "UniPay API",
        version = "1.0.0",
        description = "Remittances, personal ledger, saving goals, budgets and donations.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        // Auth
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::get_register_options,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::logout,
        crate::user_auth::handlers::request_password_reset,
        crate::user_auth::handlers::check_password_reset,
        crate::user_auth::handlers::confirm_password_reset,
        // User
        crate::gateway::handlers::dashboard::get_dashboard,
        crate::gateway::handlers::dashboard::get_users_overview,
        crate::gateway::handlers::dashboard::list_notifications,
        crate::gateway::handlers::profile::get_profile,
        crate::gateway::handlers::profile::update_profile,
        crate::gateway::handlers::finance::list_transactions,
        crate::gateway::handlers::finance::create_transaction,
        crate::gateway::handlers::finance::list_goals,
        crate::gateway::handlers::finance::create_goal,
        crate::gateway::handlers::finance::get_budget,
        crate::gateway::handlers::finance::upsert_budget,
        crate::gateway::handlers::finance::delete_budget_entry,
        crate::gateway::handlers::transfer::create_transfer,
        crate::gateway::handlers::transfer::list_transfers,
        crate::gateway::handlers::transfer::get_transfer,
        // Community
        crate::gateway::handlers::community::create_donation,
        crate::gateway::handlers::community::donation_stats,
        crate::gateway::handlers::community::list_promotions,
        crate::gateway::handlers::community::list_learning,
        crate::gateway::handlers::community::chatbot,
        // Admin
        crate::gateway::handlers::admin::admin_dashboard,
        crate::gateway::handlers::admin::update_transfer_status,
        crate::gateway::handlers::admin::toggle_user,
        crate::gateway::handlers::admin::send_notification,
        crate::gateway::handlers::admin::create_promotion,
        crate::gateway::handlers::admin::create_learning_resource,
    ),
    components(
        schemas(
            HealthResponse,
            MessageData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health checks and system info"),
        (name = "Auth", description = "Registration, login and password reset"),
        (name = "Dashboard", description = "Per-user overview and notifications (auth required)"),
        (name = "Profile", description = "Profile details (auth required)"),
        (name = "Ledger", description = "Personal transactions (auth required)"),
        (name = "Goals", description = "Saving goals (auth required)"),
        (name = "Budget", description = "Monthly budget (auth required)"),
        (name = "Transfers", description = "Peer-to-peer transfers (auth required)"),
        (name = "Community", description = "Donations, promotions, learning and the assistant"),
        (name = "Admin", description = "Administration (admin role required)")
    )
)]
pub struct ApiDoc;
