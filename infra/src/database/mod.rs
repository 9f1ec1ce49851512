//! Database connection management and MySQL repository implementations.

pub mod mysql;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

use kg_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Create a MySQL connection pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<MySqlPool, InfrastructureError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .connect(&config.url)
        .await
        .map_err(|e| InfrastructureError::Database(format!("Failed to connect: {}", e)))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool established"
    );

    Ok(pool)
}
