//! Bot responses table

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use botport_entities::bot_responses;
use botport_import_types::{ResponseStore, ResponseTemplate, StoreError, StoreResult};
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::{debug, warn};

use crate::batch::{insert_in_batches, BATCH_SIZE};
use crate::connection::DbConnection;
use crate::error::{encode_failure, is_unique_violation, require_project, store_failure};

pub struct SeaOrmResponseStore {
    db: Arc<DbConnection>,
}

impl SeaOrmResponseStore {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    fn to_active_model(response: ResponseTemplate) -> StoreResult<bot_responses::ActiveModel> {
        let project_id = require_project(&response.project_id, &response.key)?.to_string();
        let values = serde_json::to_value(&response.values).map_err(encode_failure)?;
        let now = chrono::Utc::now();

        Ok(bot_responses::ActiveModel {
            project_id: Set(project_id),
            text_index: Set(response.text_index.unwrap_or_else(|| response.key.clone())),
            key: Set(response.key),
            values: Set(values),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    /// Keys of `batch` already stored for their project, in batch order
    async fn existing_keys(&self, batch: &[(String, String)]) -> StoreResult<Vec<String>> {
        let mut by_project: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (project_id, key) in batch {
            by_project
                .entry(project_id.as_str())
                .or_default()
                .push(key.as_str());
        }

        let mut found = HashSet::new();
        for (project_id, keys) in by_project {
            for chunk in keys.chunks(BATCH_SIZE) {
                let stored: Vec<String> = bot_responses::Entity::find()
                    .select_only()
                    .column(bot_responses::Column::Key)
                    .filter(bot_responses::Column::ProjectId.eq(project_id))
                    .filter(bot_responses::Column::Key.is_in(chunk.iter().copied()))
                    .into_tuple()
                    .all(self.db.as_ref())
                    .await
                    .map_err(store_failure)?;
                found.extend(stored.into_iter().map(|key| (project_id.to_string(), key)));
            }
        }

        Ok(batch
            .iter()
            .filter(|entry| found.remove(*entry))
            .map(|(_, key)| key.clone())
            .collect())
    }
}

#[async_trait]
impl ResponseStore for SeaOrmResponseStore {
    async fn insert_many(&self, responses: Vec<ResponseTemplate>) -> StoreResult<()> {
        if responses.is_empty() {
            return Ok(());
        }

        let batch: Vec<(String, String)> = responses
            .iter()
            .map(|r| (r.project_id.clone().unwrap_or_default(), r.key.clone()))
            .collect();
        let models = responses
            .into_iter()
            .map(Self::to_active_model)
            .collect::<StoreResult<Vec<_>>>()?;

        match insert_in_batches(self.db.as_ref(), models).await {
            Ok(inserted) => {
                debug!("Inserted {} responses", inserted);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                let keys = self.existing_keys(&batch).await?;
                warn!("Responses already exist: {}", keys.join(", "));
                Err(StoreError::Conflict { keys })
            }
            Err(e) => Err(store_failure(e)),
        }
    }

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64> {
        let result = bot_responses::Entity::delete_many()
            .filter(bot_responses::Column::ProjectId.eq(project_id))
            .exec(self.db.as_ref())
            .await
            .map_err(store_failure)?;
        debug!(
            "Deleted {} responses from project {}",
            result.rows_affected, project_id
        );
        Ok(result.rows_affected)
    }
}
