//! Project and instance documents
//!
//! Updates merge the given fields into the stored document, creating it
//! when the project has none yet.

use std::sync::Arc;

use async_trait::async_trait;
use botport_entities::{instances, projects};
use botport_import_types::{InstanceStore, ProjectStore, StoreResult};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, IntoActiveModel};
use serde_json::{Map, Value};
use tracing::debug;

use crate::connection::DbConnection;
use crate::error::store_failure;

/// Fields of `update` replace the same fields of `stored`
fn merge(stored: Value, update: Map<String, Value>) -> Value {
    let mut document = match stored {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    document.extend(update);
    Value::Object(document)
}

pub struct SeaOrmProjectConfigStore {
    db: Arc<DbConnection>,
}

impl SeaOrmProjectConfigStore {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InstanceStore for SeaOrmProjectConfigStore {
    async fn update(&self, project_id: &str, instance: Map<String, Value>) -> StoreResult<()> {
        let stored = instances::Entity::find_by_id(project_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(store_failure)?;

        match stored {
            Some(model) => {
                let body = merge(model.body.clone(), instance);
                let mut active = model.into_active_model();
                active.body = Set(body);
                active.update(self.db.as_ref()).await.map_err(store_failure)?;
            }
            None => {
                instances::ActiveModel {
                    project_id: Set(project_id.to_string()),
                    body: Set(Value::Object(instance)),
                    ..Default::default()
                }
                .insert(self.db.as_ref())
                .await
                .map_err(store_failure)?;
            }
        }

        debug!("Updated instance of project {}", project_id);
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for SeaOrmProjectConfigStore {
    async fn update(&self, project_id: &str, project: Map<String, Value>) -> StoreResult<()> {
        let stored = projects::Entity::find_by_id(project_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(store_failure)?;

        match stored {
            Some(model) => {
                let body = merge(model.body.clone(), project);
                let mut active = model.into_active_model();
                active.body = Set(body);
                active.update(self.db.as_ref()).await.map_err(store_failure)?;
            }
            None => {
                projects::ActiveModel {
                    id: Set(project_id.to_string()),
                    body: Set(Value::Object(project)),
                    ..Default::default()
                }
                .insert(self.db.as_ref())
                .await
                .map_err(store_failure)?;
            }
        }

        debug!("Updated project {}", project_id);
        Ok(())
    }
}
