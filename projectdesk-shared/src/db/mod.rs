/// Storage layer for ProjectDesk
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded sqlx migrations
///
/// The pool is the only storage handle in the system. It is created once at
/// startup and passed explicitly to every operation; each request acquires a
/// connection (or a transaction) from it and releases it when done.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::from_url(std::env::var("DATABASE_URL")?)).await?;
///     projectdesk_shared::db::migrations::run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
