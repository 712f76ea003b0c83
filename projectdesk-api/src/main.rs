//! # ProjectDesk API Server
//!
//! Multi-tenant project and task tracking backend. Users register, create
//! projects, invite others by nickname, and manage the project's tasks.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/projectdesk \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p projectdesk-api
//! ```

use anyhow::Context;
use projectdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use projectdesk_shared::db::{
    migrations::{get_migration_status, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "projectdesk_api=debug,projectdesk_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "ProjectDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let db_config = DatabaseConfig {
        max_connections: config.database.max_connections,
        ..DatabaseConfig::from_url(config.database.url.clone())
    };
    let pool = create_pool(db_config)
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    } else {
        let status = get_migration_status(&pool)
            .await
            .context("Failed to read migration status")?;

        if !status.is_up_to_date {
            tracing::warn!(
                applied = status.applied_migrations,
                latest_version = ?status.latest_version,
                "Database schema is behind; set RUN_MIGRATIONS=true or apply migrations manually"
            );
        }
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
