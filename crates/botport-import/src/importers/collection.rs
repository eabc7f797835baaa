//! Importer for collections merged file by file (conversations, incoming)

use std::sync::Arc;

use async_trait::async_trait;
use botport_import_types::{
    CategoryImporter, ConversationRecord, DataType, ImportError, ImportFile, ImportParams,
    ImportPayload, ImportStep, ProjectScoped, RecordStore, Utterance,
};
use futures::future::join_all;
use tracing::{debug, info, warn};

/// Picks the records of the importer's collection out of a payload
type Extract<R> = fn(&ImportPayload) -> Option<&[R]>;

pub struct CollectionImporter<R>
where
    R: Send + 'static,
{
    data_type: DataType,
    store: Arc<dyn RecordStore<R>>,
    extract: Extract<R>,
}

impl CollectionImporter<ConversationRecord> {
    pub fn conversations(store: Arc<dyn RecordStore<ConversationRecord>>) -> Self {
        Self {
            data_type: DataType::Conversations,
            store,
            extract: |payload| match payload {
                ImportPayload::Conversations(c) => Some(c.conversations.as_slice()),
                _ => None,
            },
        }
    }
}

impl CollectionImporter<Utterance> {
    pub fn incoming(store: Arc<dyn RecordStore<Utterance>>) -> Self {
        Self {
            data_type: DataType::Incoming,
            store,
            extract: |payload| match payload {
                ImportPayload::Incoming(i) => Some(i.incoming.as_slice()),
                _ => None,
            },
        }
    }
}

impl<R> CollectionImporter<R>
where
    R: ProjectScoped + Clone + Send + Sync + 'static,
{
    async fn import_file(&self, file: &ImportFile, project_id: &str) -> Option<ImportError> {
        let Some(records) = (self.extract)(&file.payload) else {
            return Some(ImportError::Unsupported {
                category: self.data_type,
                file: file.filename.clone(),
                reason: "payload does not match the data type".to_string(),
            });
        };
        if records.is_empty() {
            debug!("{} holds no {}", file.filename, self.data_type);
            return None;
        }

        let prepared: Vec<R> = records
            .iter()
            .cloned()
            .map(|record| record.with_project(project_id))
            .collect();
        let count = prepared.len();

        match self.store.insert_many(prepared).await {
            Ok(()) => {
                debug!(
                    "Inserted {} {} from {}",
                    count, self.data_type, file.filename
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to import {} from {}: {}",
                    self.data_type, file.filename, e
                );
                Some(ImportError::from_store(
                    self.data_type,
                    ImportStep::Insert,
                    Some(&file.filename),
                    e,
                ))
            }
        }
    }
}

#[async_trait]
impl<R> CategoryImporter for CollectionImporter<R>
where
    R: ProjectScoped + Clone + Send + Sync + 'static,
{
    fn data_type(&self) -> DataType {
        self.data_type
    }

    async fn import(&self, files: &[ImportFile], params: &ImportParams) -> Vec<ImportError> {
        if files.is_empty() {
            return Vec::new();
        }
        info!(
            "Importing {} from {} files (wipe: {})",
            self.data_type,
            files.len(),
            params.wipe_current
        );

        if params.wipe_current {
            match self.store.delete_many(&params.project_id).await {
                Ok(deleted) => debug!(
                    "Wiped {} {} of project {}",
                    deleted, self.data_type, params.project_id
                ),
                Err(e) => {
                    warn!(
                        "Could not wipe {} of project {}: {}",
                        self.data_type, params.project_id, e
                    );
                    return vec![ImportError::from_store(
                        self.data_type,
                        ImportStep::Wipe,
                        None,
                        e,
                    )];
                }
            }
        }

        // Every insert is issued before any is awaited; results keep file order
        join_all(
            files
                .iter()
                .map(|file| self.import_file(file, &params.project_id)),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailPoint, MemoryStores};
    use botport_import_types::{ConversationsPayload, IncomingPayload};
    use std::time::Duration;

    fn conversations_file(name: &str, ids: &[&str]) -> ImportFile {
        ImportFile::new(
            name,
            ImportPayload::Conversations(ConversationsPayload {
                conversations: ids.iter().map(|id| ConversationRecord::new(*id)).collect(),
            }),
        )
    }

    fn incoming_file(name: &str, ids: &[&str]) -> ImportFile {
        ImportFile::new(
            name,
            ImportPayload::Incoming(IncomingPayload {
                incoming: ids.iter().map(|id| Utterance::new(*id, "hello")).collect(),
            }),
        )
    }

    #[tokio::test]
    async fn test_records_are_tagged_with_project() {
        let stores = MemoryStores::new();
        let importer = CollectionImporter::conversations(stores.clone());

        let errors = importer
            .import(
                &[conversations_file("c.json", &["c1", "c2"])],
                &ImportParams::new("p1"),
            )
            .await;

        assert!(errors.is_empty());
        let stored = stores.conversations.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|c| c.project_id.as_deref() == Some("p1")));
    }

    #[tokio::test]
    async fn test_conflicting_file_does_not_block_others() {
        let stores = MemoryStores::new();
        let importer = CollectionImporter::incoming(stores.clone());
        let params = ImportParams::new("p1");
        importer
            .import(&[incoming_file("first.json", &["u1"])], &params)
            .await;

        let errors = importer
            .import(
                &[
                    incoming_file("dup.json", &["u1", "u2"]),
                    incoming_file("new.json", &["u3"]),
                ],
                &params,
            )
            .await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["error when importing incoming from dup.json, it seems that some of the data you are trying to import already exists"]
        );
        let ids: Vec<String> = stores
            .activity
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.id.clone())
            .collect();
        assert_eq!(ids, vec!["u1", "u3"]);
    }

    #[tokio::test]
    async fn test_errors_follow_file_order() {
        let stores = MemoryStores::new();
        stores.fail(FailPoint::ConversationsInsert);
        let importer = CollectionImporter::conversations(stores.clone());

        let errors = importer
            .import(
                &[
                    conversations_file("a.json", &["c1"]),
                    conversations_file("b.json", &["c2"]),
                ],
                &ImportParams::new("p1"),
            )
            .await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![
                "error when importing conversations from a.json",
                "error when importing conversations from b.json"
            ]
        );
    }

    #[tokio::test]
    async fn test_file_inserts_are_in_flight_together() {
        let stores = MemoryStores::new();
        stores.hold_until_concurrent(&[FailPoint::ConversationsInsert], 2);
        let importer = CollectionImporter::conversations(stores.clone());
        let files = [
            conversations_file("a.json", &["c1"]),
            conversations_file("b.json", &["c2"]),
        ];
        let params = ImportParams::new("p1");

        let errors = tokio::time::timeout(Duration::from_secs(5), importer.import(&files, &params))
            .await
            .expect("both file inserts should be issued before either is awaited");

        assert!(errors.is_empty());
        assert_eq!(stores.conversations.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wipe_replaces_existing_records() {
        let stores = MemoryStores::new();
        let importer = CollectionImporter::conversations(stores.clone());
        let params = ImportParams::new("p1").wipe(true);

        importer
            .import(&[conversations_file("a.json", &["c1", "c2"])], &params)
            .await;
        let errors = importer
            .import(&[conversations_file("a.json", &["c1"])], &params)
            .await;

        assert!(errors.is_empty());
        assert_eq!(stores.conversations.lock().unwrap().len(), 1);
        assert_eq!(
            stores.calls(),
            vec![
                "conversations.delete_many",
                "conversations.insert_many",
                "conversations.delete_many",
                "conversations.insert_many"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_wipe_skips_inserts() {
        let stores = MemoryStores::new();
        stores.fail(FailPoint::ActivityDelete);
        let importer = CollectionImporter::incoming(stores.clone());

        let errors = importer
            .import(
                &[incoming_file("a.json", &["u1"])],
                &ImportParams::new("p1").wipe(true),
            )
            .await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["error when importing incoming: could not wipe the existing data"]
        );
        assert_eq!(stores.calls(), vec!["activity.delete_many"]);
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_unsupported() {
        let stores = MemoryStores::new();
        let importer = CollectionImporter::incoming(stores.clone());

        let errors = importer
            .import(
                &[conversations_file("c.json", &["c1"])],
                &ImportParams::new("p1"),
            )
            .await;

        assert_eq!(
            errors[0].to_string(),
            "c.json cannot be imported as incoming: payload does not match the data type"
        );
        assert!(stores.calls().is_empty());
    }
}
