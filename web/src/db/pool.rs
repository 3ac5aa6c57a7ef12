use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::OnceLock;

use crate::config::AppConfig;

static DB_POOL: OnceLock<PgPool> = OnceLock::new();

/// Connect once per process; a second call is a configuration error.
pub async fn init_pool(config: &AppConfig) -> Result<&'static PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    DB_POOL.set(pool).map_err(|_| {
        sqlx::Error::Configuration("Database pool already initialized".to_string().into())
    })?;

    DB_POOL.get().ok_or_else(|| {
        sqlx::Error::Configuration("Database pool not initialized".to_string().into())
    })
}
