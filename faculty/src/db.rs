mod handle;
mod repository;

pub use handle::*;
pub use repository::*;

use crate::config::DatabaseConfig;

// Application default db driver
pub type AppDbDriver = sqlx::Sqlite;
pub type AppDbHandle<'c> = Handle<'c, AppDbDriver>;
pub type AppDbPool = sqlx::Pool<AppDbDriver>;

pub fn map_err(e: sqlx::Error) -> crate::Error {
    crate::Error::Database(anyhow::Error::new(e))
}

/// Opens the application pool.
///
/// An in-memory database only exists for the lifetime of its connection,
/// so those URLs get a single connection that is never reaped.
pub async fn connect(config: &DatabaseConfig) -> crate::Result<AppDbPool> {
    let mut options = sqlx::pool::PoolOptions::<AppDbDriver>::new()
        .max_connections(config.max_connections.max(1));
    if config.is_in_memory() {
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options.connect(&config.url).await.map_err(map_err)?;
    tracing::info!(
        url = %config.url,
        max_connections = config.max_connections,
        "database pool ready"
    );
    Ok(pool)
}
