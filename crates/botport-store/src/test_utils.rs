//! Test utilities for database integration tests
//!
//! Every `TestDatabase` is a private in-memory SQLite database with the
//! full schema applied, so tests can run in parallel without sharing state.

use std::sync::Arc;

use botport_import_types::ImportPorts;

use crate::config::DatabaseConfig;
use crate::connection::{establish_connection, ConnectionError, DbConnection};

pub struct TestDatabase {
    pub db: Arc<DbConnection>,
}

impl TestDatabase {
    /// Fresh in-memory database with migrations applied
    pub async fn new() -> Result<Self, ConnectionError> {
        let db = establish_connection(&DatabaseConfig::new("sqlite::memory:")).await?;
        Ok(Self { db })
    }

    /// Import ports backed by this database
    pub fn ports(&self) -> ImportPorts {
        crate::sea_orm_ports(self.db.clone())
    }
}
