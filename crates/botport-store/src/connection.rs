//! Database connection management

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use botport_migrations::Migrator;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

pub type DbConnection = DatabaseConnection;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("could not connect to the database: {0}")]
    Connect(#[source] DbErr),

    #[error("could not apply migrations: {0}")]
    Migrate(#[source] DbErr),
}

/// Open a pool for `config` and bring the schema up to date
pub async fn establish_connection(
    config: &DatabaseConfig,
) -> Result<Arc<DbConnection>, ConnectionError> {
    let mut opt = ConnectOptions::new(config.url.as_str());
    if config.is_memory() {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections);
    }
    opt.connect_timeout(config.connect_timeout)
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .map_err(ConnectionError::Connect)?;
    debug!("Connected to {:?} database", db.get_database_backend());

    // Run migrations
    Migrator::up(&db, None)
        .await
        .map_err(ConnectionError::Migrate)?;
    info!("Database schema is up to date");

    Ok(Arc::new(db))
}
