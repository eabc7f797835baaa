//! Database connection and sea-orm implementations of the import ports

pub use sea_orm;

mod batch;
mod config;
mod connection;
mod error;
mod project_config;
mod records;
mod responses;
mod settings;
mod slots;

pub use config::DatabaseConfig;
pub use connection::{establish_connection, ConnectionError, DbConnection};
pub use project_config::SeaOrmProjectConfigStore;
pub use records::{SeaOrmActivityStore, SeaOrmConversationStore};
pub use responses::SeaOrmResponseStore;
pub use settings::SeaOrmSettingsStore;
pub use slots::SeaOrmSlotStore;

// Export test utilities for use by other crates in their tests
pub mod test_utils;

use std::sync::Arc;

use botport_import_types::ImportPorts;

/// Every import port backed by the same connection
pub fn sea_orm_ports(db: Arc<DbConnection>) -> ImportPorts {
    let settings = Arc::new(SeaOrmSettingsStore::new(db.clone()));
    let project_config = Arc::new(SeaOrmProjectConfigStore::new(db.clone()));

    ImportPorts {
        responses: Arc::new(SeaOrmResponseStore::new(db.clone())),
        slots: Arc::new(SeaOrmSlotStore::new(db.clone())),
        conversations: Arc::new(SeaOrmConversationStore::new(db.clone())),
        activity: Arc::new(SeaOrmActivityStore::new(db)),
        endpoints: settings.clone(),
        credentials: settings.clone(),
        policies: settings.clone(),
        pipelines: settings,
        instances: project_config.clone(),
        projects: project_config,
    }
}
