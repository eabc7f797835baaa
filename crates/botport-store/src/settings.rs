//! Raw configuration documents: endpoints, credentials, policies, pipelines
//!
//! One row per `(project, kind, language)`; saving replaces the previous
//! document.

use std::sync::Arc;

use async_trait::async_trait;
use botport_entities::{project_settings, SettingKind};
use botport_import_types::{
    CredentialStore, EndpointStore, PipelineStore, PolicyStore, StoreResult,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::connection::DbConnection;
use crate::error::store_failure;

pub struct SeaOrmSettingsStore {
    db: Arc<DbConnection>,
}

impl SeaOrmSettingsStore {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    async fn save_setting(
        &self,
        project_id: &str,
        kind: SettingKind,
        language: &str,
        content: &str,
    ) -> StoreResult<()> {
        let model = project_settings::ActiveModel {
            project_id: Set(project_id.to_string()),
            kind: Set(kind),
            language: Set(language.to_string()),
            content: Set(content.to_string()),
            updated_at: Set(chrono::Utc::now()),
        };

        project_settings::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    project_settings::Column::ProjectId,
                    project_settings::Column::Kind,
                    project_settings::Column::Language,
                ])
                .update_columns([
                    project_settings::Column::Content,
                    project_settings::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(store_failure)?;

        debug!("Saved {} for project {}", kind, project_id);
        Ok(())
    }

    /// Stored document of `kind`, if any
    pub async fn load(
        &self,
        project_id: &str,
        kind: SettingKind,
        language: &str,
    ) -> StoreResult<Option<String>> {
        let setting = project_settings::Entity::find()
            .filter(project_settings::Column::ProjectId.eq(project_id))
            .filter(project_settings::Column::Kind.eq(kind))
            .filter(project_settings::Column::Language.eq(language))
            .one(self.db.as_ref())
            .await
            .map_err(store_failure)?;
        Ok(setting.map(|s| s.content))
    }
}

#[async_trait]
impl EndpointStore for SeaOrmSettingsStore {
    async fn save(&self, project_id: &str, endpoints: &str) -> StoreResult<()> {
        self.save_setting(project_id, SettingKind::Endpoints, "", endpoints).await
    }
}

#[async_trait]
impl CredentialStore for SeaOrmSettingsStore {
    async fn save(&self, project_id: &str, credentials: &str) -> StoreResult<()> {
        self.save_setting(project_id, SettingKind::Credentials, "", credentials)
            .await
    }
}

#[async_trait]
impl PolicyStore for SeaOrmSettingsStore {
    async fn save(&self, project_id: &str, policies: &str) -> StoreResult<()> {
        self.save_setting(project_id, SettingKind::Policies, "", policies).await
    }
}

#[async_trait]
impl PipelineStore for SeaOrmSettingsStore {
    async fn save(&self, project_id: &str, language: &str, pipeline: &str) -> StoreResult<()> {
        self.save_setting(project_id, SettingKind::Pipeline, language, pipeline)
            .await
    }
}
