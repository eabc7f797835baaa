//! Conversation and incoming activity tables
//!
//! Both collections key their records by a globally unique id, so a
//! conflict names the ids that already exist regardless of project.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use botport_entities::{activity, conversations};
use botport_import_types::{ConversationRecord, RecordStore, StoreError, StoreResult, Utterance};
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use serde_json::Value;
use tracing::{debug, warn};

use crate::batch::{insert_in_batches, BATCH_SIZE};
use crate::connection::DbConnection;
use crate::error::{is_unique_violation, require_project, store_failure};

/// Keep the ids of `batch` that `stored` returned, in batch order
fn conflicting_ids(batch: &[String], stored: Vec<String>) -> Vec<String> {
    let stored: HashSet<String> = stored.into_iter().collect();
    batch
        .iter()
        .filter(|id| stored.contains(*id))
        .cloned()
        .collect()
}

fn conflict(collection: &str, existing: Vec<String>) -> StoreError {
    warn!(
        "{} already exist in {}: {}",
        existing.len(),
        collection,
        existing.join(", ")
    );
    StoreError::Conflict { keys: existing }
}

pub struct SeaOrmConversationStore {
    db: Arc<DbConnection>,
}

impl SeaOrmConversationStore {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    fn to_active_model(record: ConversationRecord) -> StoreResult<conversations::ActiveModel> {
        let project_id = require_project(&record.project_id, &record.id)?.to_string();
        Ok(conversations::ActiveModel {
            id: Set(record.id),
            project_id: Set(project_id),
            body: Set(Value::Object(record.body)),
            created_at: Set(chrono::Utc::now()),
        })
    }

    async fn existing_ids(&self, ids: &[String]) -> StoreResult<Vec<String>> {
        let mut stored = Vec::new();
        for chunk in ids.chunks(BATCH_SIZE) {
            let found: Vec<String> = conversations::Entity::find()
                .select_only()
                .column(conversations::Column::Id)
                .filter(conversations::Column::Id.is_in(chunk.iter().map(String::as_str)))
                .into_tuple()
                .all(self.db.as_ref())
                .await
                .map_err(store_failure)?;
            stored.extend(found);
        }
        Ok(conflicting_ids(ids, stored))
    }
}

#[async_trait]
impl RecordStore<ConversationRecord> for SeaOrmConversationStore {
    async fn insert_many(&self, records: Vec<ConversationRecord>) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let models = records
            .into_iter()
            .map(Self::to_active_model)
            .collect::<StoreResult<Vec<_>>>()?;

        match insert_in_batches(self.db.as_ref(), models).await {
            Ok(inserted) => {
                debug!("Inserted {} conversations", inserted);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                Err(conflict("conversations", self.existing_ids(&ids).await?))
            }
            Err(e) => Err(store_failure(e)),
        }
    }

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64> {
        let result = conversations::Entity::delete_many()
            .filter(conversations::Column::ProjectId.eq(project_id))
            .exec(self.db.as_ref())
            .await
            .map_err(store_failure)?;
        Ok(result.rows_affected)
    }
}

pub struct SeaOrmActivityStore {
    db: Arc<DbConnection>,
}

impl SeaOrmActivityStore {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    fn to_active_model(utterance: Utterance) -> StoreResult<activity::ActiveModel> {
        let project_id = require_project(&utterance.project_id, &utterance.id)?.to_string();
        Ok(activity::ActiveModel {
            id: Set(utterance.id),
            project_id: Set(project_id),
            text: Set(utterance.text),
            language: Set(utterance.language),
            body: Set(Value::Object(utterance.body)),
            created_at: Set(chrono::Utc::now()),
        })
    }

    async fn existing_ids(&self, ids: &[String]) -> StoreResult<Vec<String>> {
        let mut stored = Vec::new();
        for chunk in ids.chunks(BATCH_SIZE) {
            let found: Vec<String> = activity::Entity::find()
                .select_only()
                .column(activity::Column::Id)
                .filter(activity::Column::Id.is_in(chunk.iter().map(String::as_str)))
                .into_tuple()
                .all(self.db.as_ref())
                .await
                .map_err(store_failure)?;
            stored.extend(found);
        }
        Ok(conflicting_ids(ids, stored))
    }
}

#[async_trait]
impl RecordStore<Utterance> for SeaOrmActivityStore {
    async fn insert_many(&self, records: Vec<Utterance>) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let models = records
            .into_iter()
            .map(Self::to_active_model)
            .collect::<StoreResult<Vec<_>>>()?;

        match insert_in_batches(self.db.as_ref(), models).await {
            Ok(inserted) => {
                debug!("Inserted {} utterances", inserted);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                Err(conflict("activity", self.existing_ids(&ids).await?))
            }
            Err(e) => Err(store_failure(e)),
        }
    }

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64> {
        let result = activity::Entity::delete_many()
            .filter(activity::Column::ProjectId.eq(project_id))
            .exec(self.db.as_ref())
            .await
            .map_err(store_failure)?;
        Ok(result.rows_affected)
    }
}
