//! UniPay API server
//!
//! ```text
//! unipay [--env|-e <env>] [--port <port>]
//! ```
//!
//! Loads `config/{env}.yaml` (default `dev`), connects to PostgreSQL,
//! optionally applies migrations, then serves the HTTP API.

use anyhow::Context;

use unipay::config::AppConfig;
use unipay::db::Database;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = unipay::logging::init_logging(&config);

    tracing::info!(env = %env, version = env!("GIT_HASH"), "starting UniPay");

    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to apply migrations")?;
    }

    unipay::gateway::run_server(config, db).await
}
