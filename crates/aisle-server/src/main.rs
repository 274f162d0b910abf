//! Aisle Server — application entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use aisle_db::repository::{SurrealGuestRepository, SurrealTenantRepository};
use aisle_db::{DbConfig, DbManager, run_migrations};
use aisle_secure::{FixedWindowLimiter, SecureConfig, SecureGuestRepository, SecureTenantRepository};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("aisle=info".parse().expect("static directive")),
        )
        .json()
        .init();

    tracing::info!("Starting Aisle server...");

    let config = DbConfig::from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "database connection failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        tracing::error!(error = %e, "migrations failed");
        return ExitCode::FAILURE;
    }

    let secure = SecureConfig::default();
    let limiter = Arc::new(FixedWindowLimiter::new(
        secure.rate_limit_max,
        Duration::from_secs(secure.rate_limit_window_secs),
    ));
    let _tenants = SecureTenantRepository::new(
        SurrealTenantRepository::new(manager.client().clone()),
        limiter.clone(),
    );
    let _guests = SecureGuestRepository::new(
        SurrealGuestRepository::new(manager.client().clone()),
        limiter,
        secure,
    );

    tracing::info!("Repositories ready.");

    // TODO: mount the HTTP routing layer once it lands
    // TODO: wire the auth session provider

    tracing::info!("Aisle server stopped.");
    ExitCode::SUCCESS
}
