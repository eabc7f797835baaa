//! In-memory ports for tests
//!
//! `MemoryStores` implements every port over plain vectors guarded by
//! mutexes. Uniqueness is enforced like the real stores do (whole batch
//! rejected, offending keys named) and any call can be made to fail or to
//! panic, so importer and dispatcher tests can exercise every failure path.
//! Calls can also be held at a barrier until a set number of them are in
//! flight at once.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use botport_import_types::{
    ConversationRecord, CredentialStore, EndpointStore, ImportPorts, InstanceStore,
    PipelineStore, PolicyStore, ProjectScoped, ProjectStore, RecordStore, ResponseStore,
    ResponseTemplate, SlotDefinition, SlotStore, StoreError, StoreResult, Utterance,
};
use serde_json::{Map, Value};
use tokio::sync::Barrier;

/// Port call that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ResponsesInsert,
    ResponsesDelete,
    SlotsUpsert,
    ConversationsInsert,
    ConversationsDelete,
    ActivityInsert,
    ActivityDelete,
    Endpoints,
    Credentials,
    Policies,
    Pipelines,
    Instances,
    Projects,
}

/// A configuration document saved through one of the settings ports
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSetting {
    pub kind: &'static str,
    pub project_id: String,
    pub language: Option<String>,
    pub content: String,
}

#[derive(Default)]
pub struct MemoryStores {
    pub responses: Mutex<Vec<ResponseTemplate>>,
    pub slots: Mutex<Vec<SlotDefinition>>,
    pub conversations: Mutex<Vec<ConversationRecord>>,
    pub activity: Mutex<Vec<Utterance>>,
    pub settings: Mutex<Vec<SavedSetting>>,
    pub instances: Mutex<HashMap<String, Map<String, Value>>>,
    pub projects: Mutex<HashMap<String, Map<String, Value>>>,
    /// Every port call, in the order it was made
    pub calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashSet<FailPoint>>,
    panics: Mutex<HashSet<FailPoint>>,
    barriers: Mutex<HashMap<FailPoint, Arc<Barrier>>>,
}

impl MemoryStores {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call to `point` fail with `StoreError::Failure`
    pub fn fail(&self, point: FailPoint) {
        self.failures.lock().unwrap().insert(point);
    }

    /// Make every call to `point` panic
    pub fn panic_on(&self, point: FailPoint) {
        self.panics.lock().unwrap().insert(point);
    }

    /// Hold every call to any of `points` until `parties` such calls are
    /// waiting together
    pub fn hold_until_concurrent(&self, points: &[FailPoint], parties: usize) {
        let barrier = Arc::new(Barrier::new(parties));
        let mut barriers = self.barriers.lock().unwrap();
        for point in points {
            barriers.insert(*point, barrier.clone());
        }
    }

    /// Bundle this store behind every port
    pub fn ports(self: &Arc<Self>) -> ImportPorts {
        ImportPorts {
            responses: self.clone(),
            slots: self.clone(),
            conversations: self.clone(),
            activity: self.clone(),
            endpoints: self.clone(),
            credentials: self.clone(),
            policies: self.clone(),
            pipelines: self.clone(),
            instances: self.clone(),
            projects: self.clone(),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn response_keys(&self) -> Vec<String> {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.key.clone())
            .collect()
    }

    pub fn saved(&self, kind: &str) -> Vec<SavedSetting> {
        self.settings
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.kind == kind)
            .cloned()
            .collect()
    }

    async fn enter(&self, call: &'static str, point: FailPoint) -> StoreResult<()> {
        self.calls.lock().unwrap().push(call);
        let barrier = self.barriers.lock().unwrap().get(&point).cloned();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
        if self.panics.lock().unwrap().contains(&point) {
            panic!("injected panic in {}", call);
        }
        if self.failures.lock().unwrap().contains(&point) {
            return Err(StoreError::failure(format!("{} unavailable", call)));
        }
        Ok(())
    }

    fn save_setting(
        &self,
        kind: &'static str,
        project_id: &str,
        language: Option<&str>,
        content: &str,
    ) {
        self.settings.lock().unwrap().push(SavedSetting {
            kind,
            project_id: project_id.to_string(),
            language: language.map(str::to_string),
            content: content.to_string(),
        });
    }
}

/// Insert all records or none, naming the keys already present in the project
fn insert_unique<R>(existing: &mut Vec<R>, records: Vec<R>, project_of: fn(&R) -> Option<&str>) -> StoreResult<()>
where
    R: ProjectScoped,
{
    let taken: HashSet<(Option<String>, String)> = existing
        .iter()
        .map(|r| (project_of(r).map(str::to_string), r.dedup_key().to_string()))
        .collect();
    let mut batch = HashSet::new();
    let conflicts: Vec<String> = records
        .iter()
        .filter(|r| {
            let id = (project_of(r).map(str::to_string), r.dedup_key().to_string());
            taken.contains(&id) || !batch.insert(id)
        })
        .map(|r| r.dedup_key().to_string())
        .collect();
    if !conflicts.is_empty() {
        return Err(StoreError::Conflict { keys: conflicts });
    }
    existing.extend(records);
    Ok(())
}

fn delete_project<R>(existing: &mut Vec<R>, project_id: &str, project_of: fn(&R) -> Option<&str>) -> u64 {
    let before = existing.len();
    existing.retain(|r| project_of(r) != Some(project_id));
    (before - existing.len()) as u64
}

#[async_trait]
impl ResponseStore for MemoryStores {
    async fn insert_many(&self, responses: Vec<ResponseTemplate>) -> StoreResult<()> {
        self.enter("responses.insert_many", FailPoint::ResponsesInsert).await?;
        insert_unique(&mut self.responses.lock().unwrap(), responses, |r| {
            r.project_id.as_deref()
        })
    }

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64> {
        self.enter("responses.delete_many", FailPoint::ResponsesDelete).await?;
        Ok(delete_project(&mut self.responses.lock().unwrap(), project_id, |r| {
            r.project_id.as_deref()
        }))
    }
}

#[async_trait]
impl SlotStore for MemoryStores {
    async fn upsert(&self, slots: Vec<SlotDefinition>, project_id: &str) -> StoreResult<()> {
        self.enter("slots.upsert", FailPoint::SlotsUpsert).await?;
        let mut existing = self.slots.lock().unwrap();
        for slot in slots {
            let slot = slot.with_project(project_id);
            match existing
                .iter_mut()
                .find(|s| s.name == slot.name && s.project_id == slot.project_id)
            {
                Some(current) => *current = slot,
                None => existing.push(slot),
            }
        }
        Ok(())
    }

    async fn delete(&self, slot: &SlotDefinition, project_id: &str) -> StoreResult<()> {
        self.enter("slots.delete", FailPoint::SlotsUpsert).await?;
        self.slots
            .lock()
            .unwrap()
            .retain(|s| !(s.name == slot.name && s.project_id.as_deref() == Some(project_id)));
        Ok(())
    }
}

#[async_trait]
impl RecordStore<ConversationRecord> for MemoryStores {
    async fn insert_many(&self, records: Vec<ConversationRecord>) -> StoreResult<()> {
        self.enter("conversations.insert_many", FailPoint::ConversationsInsert).await?;
        insert_unique(&mut self.conversations.lock().unwrap(), records, |r| {
            r.project_id.as_deref()
        })
    }

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64> {
        self.enter("conversations.delete_many", FailPoint::ConversationsDelete).await?;
        Ok(delete_project(
            &mut self.conversations.lock().unwrap(),
            project_id,
            |r| r.project_id.as_deref(),
        ))
    }
}

#[async_trait]
impl RecordStore<Utterance> for MemoryStores {
    async fn insert_many(&self, records: Vec<Utterance>) -> StoreResult<()> {
        self.enter("activity.insert_many", FailPoint::ActivityInsert).await?;
        insert_unique(&mut self.activity.lock().unwrap(), records, |r| {
            r.project_id.as_deref()
        })
    }

    async fn delete_many(&self, project_id: &str) -> StoreResult<u64> {
        self.enter("activity.delete_many", FailPoint::ActivityDelete).await?;
        Ok(delete_project(
            &mut self.activity.lock().unwrap(),
            project_id,
            |r| r.project_id.as_deref(),
        ))
    }
}

#[async_trait]
impl EndpointStore for MemoryStores {
    async fn save(&self, project_id: &str, endpoints: &str) -> StoreResult<()> {
        self.enter("endpoints.save", FailPoint::Endpoints).await?;
        self.save_setting("endpoints", project_id, None, endpoints);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStores {
    async fn save(&self, project_id: &str, credentials: &str) -> StoreResult<()> {
        self.enter("credentials.save", FailPoint::Credentials).await?;
        self.save_setting("credentials", project_id, None, credentials);
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for MemoryStores {
    async fn save(&self, project_id: &str, policies: &str) -> StoreResult<()> {
        self.enter("policies.save", FailPoint::Policies).await?;
        self.save_setting("policies", project_id, None, policies);
        Ok(())
    }
}

#[async_trait]
impl PipelineStore for MemoryStores {
    async fn save(&self, project_id: &str, language: &str, pipeline: &str) -> StoreResult<()> {
        self.enter("pipelines.save", FailPoint::Pipelines).await?;
        self.save_setting("pipeline", project_id, Some(language), pipeline);
        Ok(())
    }
}

#[async_trait]
impl InstanceStore for MemoryStores {
    async fn update(&self, project_id: &str, instance: Map<String, Value>) -> StoreResult<()> {
        self.enter("instances.update", FailPoint::Instances).await?;
        self.instances
            .lock()
            .unwrap()
            .insert(project_id.to_string(), instance);
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStores {
    async fn update(&self, project_id: &str, project: Map<String, Value>) -> StoreResult<()> {
        self.enter("projects.update", FailPoint::Projects).await?;
        self.projects
            .lock()
            .unwrap()
            .insert(project_id.to_string(), project);
        Ok(())
    }
}
