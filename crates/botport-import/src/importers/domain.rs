//! Domain importer: responses and slots merged across every domain file

use std::sync::Arc;

use async_trait::async_trait;
use botport_import_types::{
    CategoryImporter, DataType, ImportError, ImportFile, ImportParams, ImportPayload, ImportStep,
    ProjectScoped, ResponseStore, ResponseTemplate, SlotDefinition, SlotStore,
};
use tracing::{debug, info, warn};

use super::deduplicate;
use crate::text_index::index_bot_response;

pub struct DomainImporter {
    responses: Arc<dyn ResponseStore>,
    slots: Arc<dyn SlotStore>,
}

/// Candidate sets merged from every file of the partition
#[derive(Debug, Default)]
struct MergedDomain {
    responses: Vec<ResponseTemplate>,
    slots: Vec<SlotDefinition>,
    rejected: Vec<ImportError>,
}

impl DomainImporter {
    pub fn new(responses: Arc<dyn ResponseStore>, slots: Arc<dyn SlotStore>) -> Self {
        Self { responses, slots }
    }

    fn merge(files: &[ImportFile]) -> MergedDomain {
        let mut merged = MergedDomain::default();
        for file in files {
            match &file.payload {
                ImportPayload::Domain(domain) => {
                    merged.responses.extend(domain.responses.iter().cloned());
                    merged.slots.extend(domain.slots.iter().cloned());
                }
                other => merged.rejected.push(ImportError::Unsupported {
                    category: DataType::Domain,
                    file: file.filename.clone(),
                    reason: format!(
                        "payload is {}",
                        other.data_type().map_or("unrecognized", |d| d.as_str())
                    ),
                }),
            }
        }
        merged.responses = deduplicate(merged.responses);
        merged.slots = deduplicate(merged.slots);
        merged
    }

    async fn wipe(&self, params: &ImportParams) -> Result<(), ImportError> {
        let deleted = self
            .responses
            .delete_many(&params.project_id)
            .await
            .map_err(|e| {
                warn!(
                    "Could not wipe responses of project {}: {}",
                    params.project_id, e
                );
                ImportError::from_store(DataType::Domain, ImportStep::Wipe, None, e)
            })?;
        debug!(
            "Wiped {} responses of project {} ({} existing slots left to the slot store)",
            deleted,
            params.project_id,
            params.existing_slots.len()
        );
        Ok(())
    }

    async fn insert_responses(
        &self,
        responses: Vec<ResponseTemplate>,
        project_id: &str,
    ) -> Option<ImportError> {
        if responses.is_empty() {
            debug!("No responses to import for project {}", project_id);
            return None;
        }

        let prepared: Vec<ResponseTemplate> = responses
            .into_iter()
            .map(|response| {
                let index = index_bot_response(&response);
                let mut response = response.with_project(project_id);
                response.text_index = Some(index);
                response
            })
            .collect();
        let count = prepared.len();

        match self.responses.insert_many(prepared).await {
            Ok(()) => {
                debug!("Inserted {} responses in project {}", count, project_id);
                None
            }
            Err(e) => {
                warn!("Failed to import responses in project {}: {}", project_id, e);
                Some(ImportError::from_store(
                    DataType::Domain,
                    ImportStep::Responses,
                    None,
                    e,
                ))
            }
        }
    }

    async fn upsert_slots(
        &self,
        slots: Vec<SlotDefinition>,
        project_id: &str,
    ) -> Option<ImportError> {
        if slots.is_empty() {
            debug!("No slots to import for project {}", project_id);
            return None;
        }

        let count = slots.len();
        match self.slots.upsert(slots, project_id).await {
            Ok(()) => {
                debug!("Upserted {} slots in project {}", count, project_id);
                None
            }
            Err(e) => {
                warn!("Failed to import slots in project {}: {}", project_id, e);
                Some(ImportError::failure(
                    DataType::Domain,
                    ImportStep::Slots,
                    None,
                    e.to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl CategoryImporter for DomainImporter {
    fn data_type(&self) -> DataType {
        DataType::Domain
    }

    async fn import(&self, files: &[ImportFile], params: &ImportParams) -> Vec<ImportError> {
        if files.is_empty() {
            return Vec::new();
        }

        let MergedDomain {
            responses,
            slots,
            mut rejected,
        } = Self::merge(files);
        info!(
            "Importing domain from {} files: {} responses, {} slots (wipe: {})",
            files.len(),
            responses.len(),
            slots.len(),
            params.wipe_current
        );

        // A failed wipe aborts the whole category
        if params.wipe_current {
            if let Err(e) = self.wipe(params).await {
                rejected.push(e);
                return rejected;
            }
        }

        let (responses_error, slots_error) = tokio::join!(
            self.insert_responses(responses, &params.project_id),
            self.upsert_slots(slots, &params.project_id),
        );

        rejected.extend(responses_error);
        rejected.extend(slots_error);
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailPoint, MemoryStores};
    use botport_import_types::DomainPayload;
    use std::time::Duration;

    fn domain_file(name: &str, responses: &[&str], slots: &[(&str, &str)]) -> ImportFile {
        ImportFile::new(
            name,
            ImportPayload::Domain(DomainPayload {
                responses: responses
                    .iter()
                    .map(|key| ResponseTemplate::new(*key).with_message("en", "text: hi"))
                    .collect(),
                slots: slots
                    .iter()
                    .map(|(name, slot_type)| SlotDefinition::new(*name, *slot_type))
                    .collect(),
            }),
        )
    }

    fn importer(stores: &Arc<MemoryStores>) -> DomainImporter {
        DomainImporter::new(stores.clone(), stores.clone())
    }

    #[tokio::test]
    async fn test_empty_partition_is_noop() {
        let stores = MemoryStores::new();

        let errors = importer(&stores).import(&[], &ImportParams::new("p1")).await;

        assert!(errors.is_empty());
        assert!(stores.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_response_in_one_file_is_collapsed() {
        let stores = MemoryStores::new();
        let files = vec![domain_file("domain.yml", &["greet", "greet"], &[])];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert!(errors.is_empty());
        assert_eq!(stores.response_keys(), vec!["greet"]);
        let stored = stores.responses.lock().unwrap();
        assert_eq!(stored[0].project_id.as_deref(), Some("p1"));
        assert_eq!(stored[0].text_index.as_deref(), Some("greet\nhi"));
    }

    #[tokio::test]
    async fn test_merges_files_first_occurrence_wins() {
        let stores = MemoryStores::new();
        let files = vec![
            domain_file("a.yml", &["greet", "bye"], &[("cuisine", "text")]),
            domain_file("b.yml", &["bye", "thanks"], &[("cuisine", "categorical"), ("area", "text")]),
        ];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert!(errors.is_empty());
        assert_eq!(stores.response_keys(), vec!["greet", "bye", "thanks"]);
        let slots = stores.slots.lock().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].slot_type, "text");
        assert_eq!(slots[1].name, "area");
    }

    #[tokio::test]
    async fn test_wipe_precedes_insert() {
        let stores = MemoryStores::new();
        let params = ImportParams::new("p1").wipe(true);

        importer(&stores)
            .import(&[domain_file("a.yml", &["greet"], &[])], &params)
            .await;
        let errors = importer(&stores)
            .import(&[domain_file("b.yml", &["bye"], &[])], &params)
            .await;

        assert!(errors.is_empty());
        assert_eq!(stores.response_keys(), vec!["bye"]);
        assert_eq!(
            &stores.calls()[..2],
            &["responses.delete_many", "responses.insert_many"]
        );
    }

    #[tokio::test]
    async fn test_failed_wipe_aborts_category() {
        let stores = MemoryStores::new();
        stores.fail(FailPoint::ResponsesDelete);
        let files = vec![domain_file("a.yml", &["greet"], &[("cuisine", "text")])];

        let errors = importer(&stores)
            .import(&files, &ImportParams::new("p1").wipe(true))
            .await;

        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages, vec!["could not wipe the old responses"]);
        assert_eq!(stores.calls(), vec!["responses.delete_many"]);
    }

    #[tokio::test]
    async fn test_reimport_without_wipe_names_existing_keys() {
        let stores = MemoryStores::new();
        let files = vec![domain_file("a.yml", &["greet", "bye"], &[])];
        let params = ImportParams::new("p1");

        assert!(importer(&stores).import(&files, &params).await.is_empty());
        let errors = importer(&stores).import(&files, &params).await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["error when importing responses: greet already exist, bye already exist"]
        );
        assert_eq!(stores.response_keys(), vec!["greet", "bye"]);
    }

    #[tokio::test]
    async fn test_response_and_slot_failures_are_independent() {
        let stores = MemoryStores::new();
        stores.fail(FailPoint::ResponsesInsert);
        let files = vec![domain_file("a.yml", &["greet"], &[("cuisine", "text")])];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["error while importing responses"]
        );
        assert_eq!(stores.slots.lock().unwrap().len(), 1);

        stores.fail(FailPoint::SlotsUpsert);
        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[1].to_string(),
            "error when importing slots slots.upsert unavailable"
        );
    }

    #[tokio::test]
    async fn test_responses_and_slots_are_written_together() {
        let stores = MemoryStores::new();
        stores.hold_until_concurrent(&[FailPoint::ResponsesInsert, FailPoint::SlotsUpsert], 2);
        let files = vec![domain_file("a.yml", &["greet"], &[("cuisine", "text")])];
        let params = ImportParams::new("p1");

        let errors = tokio::time::timeout(
            Duration::from_secs(5),
            importer(&stores).import(&files, &params),
        )
        .await
        .expect("response insert and slot upsert should be in flight together");

        assert!(errors.is_empty());
        assert_eq!(stores.response_keys(), vec!["greet"]);
        assert_eq!(stores.slots.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_domain_payload_is_unsupported() {
        let stores = MemoryStores::new();
        let files = vec![
            ImportFile::new("endpoints.yml", ImportPayload::Endpoints(Default::default())),
            domain_file("a.yml", &["greet"], &[]),
        ];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ImportError::Unsupported { .. }));
        assert_eq!(stores.response_keys(), vec!["greet"]);
    }
}
