//! Slots table

use std::sync::Arc;

use async_trait::async_trait;
use botport_entities::slots;
use botport_import_types::{SlotDefinition, SlotStore, StoreResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde_json::Value;
use tracing::debug;

use crate::batch::BATCH_SIZE;
use crate::connection::DbConnection;
use crate::error::store_failure;

pub struct SeaOrmSlotStore {
    db: Arc<DbConnection>,
}

impl SeaOrmSlotStore {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    fn to_active_model(slot: SlotDefinition, project_id: &str) -> slots::ActiveModel {
        let now = chrono::Utc::now();
        slots::ActiveModel {
            project_id: Set(project_id.to_string()),
            name: Set(slot.name),
            slot_type: Set(slot.slot_type),
            settings: Set(Value::Object(slot.settings)),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[async_trait]
impl SlotStore for SeaOrmSlotStore {
    async fn upsert(&self, slots: Vec<SlotDefinition>, project_id: &str) -> StoreResult<()> {
        if slots.is_empty() {
            return Ok(());
        }

        let models: Vec<_> = slots
            .into_iter()
            .map(|slot| Self::to_active_model(slot, project_id))
            .collect();
        let count = models.len();

        let txn = self.db.begin().await.map_err(store_failure)?;
        for chunk in models.chunks(BATCH_SIZE) {
            slots::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::columns([slots::Column::ProjectId, slots::Column::Name])
                        .update_columns([
                            slots::Column::SlotType,
                            slots::Column::Settings,
                            slots::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(store_failure)?;
        }
        txn.commit().await.map_err(store_failure)?;

        debug!("Upserted {} slots into project {}", count, project_id);
        Ok(())
    }

    async fn delete(&self, slot: &SlotDefinition, project_id: &str) -> StoreResult<()> {
        slots::Entity::delete_many()
            .filter(slots::Column::ProjectId.eq(project_id))
            .filter(slots::Column::Name.eq(slot.name.as_str()))
            .exec(self.db.as_ref())
            .await
            .map_err(store_failure)?;
        Ok(())
    }
}
