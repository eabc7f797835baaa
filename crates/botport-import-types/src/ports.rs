//! Collaborator ports
//!
//! Every store the importers write to is reached through one of these
//! traits. Implementations are injected as `Arc<dyn ...>` bundled in
//! [`ImportPorts`], so the import logic never depends on a concrete backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::records::{ConversationRecord, ResponseTemplate, SlotDefinition, Utterance};

#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Insert every response in one batch
    ///
    /// A uniqueness violation on `(project, key)` must be reported as
    /// `StoreError::Conflict` naming the offending keys.
    async fn insert_many(&self, responses: Vec<ResponseTemplate>) -> StoreResult<()>;

    /// Delete every response of the project, returning how many were removed
    async fn delete_many(&self, project_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Insert or replace every slot by name, in a single call
    async fn upsert(&self, slots: Vec<SlotDefinition>, project_id: &str) -> StoreResult<()>;

    async fn delete(&self, slot: &SlotDefinition, project_id: &str) -> StoreResult<()>;
}

/// Project-scoped collection with bulk insert and wipe
#[async_trait]
pub trait RecordStore<R>: Send + Sync
where
    R: Send + 'static,
{
    async fn insert_many(&self, records: Vec<R>) -> StoreResult<()>;

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait EndpointStore: Send + Sync {
    async fn save(&self, project_id: &str, endpoints: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save(&self, project_id: &str, credentials: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn save(&self, project_id: &str, policies: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait PipelineStore: Send + Sync {
    async fn save(&self, project_id: &str, language: &str, pipeline: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn update(&self, project_id: &str, instance: Map<String, Value>) -> StoreResult<()>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn update(&self, project_id: &str, project: Map<String, Value>) -> StoreResult<()>;
}

/// Every collaborator the category importers need
#[derive(Clone)]
pub struct ImportPorts {
    pub responses: Arc<dyn ResponseStore>,
    pub slots: Arc<dyn SlotStore>,
    pub conversations: Arc<dyn RecordStore<ConversationRecord>>,
    pub activity: Arc<dyn RecordStore<Utterance>>,
    pub endpoints: Arc<dyn EndpointStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub policies: Arc<dyn PolicyStore>,
    pub pipelines: Arc<dyn PipelineStore>,
    pub instances: Arc<dyn InstanceStore>,
    pub projects: Arc<dyn ProjectStore>,
}
