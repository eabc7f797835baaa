//! Import dispatcher
//!
//! Partitions a batch by data type and runs every category importer
//! concurrently. Categories never see each other's failures: each one
//! reports its own errors, which are gathered in dispatch order.

use std::collections::HashMap;
use std::sync::Arc;

use botport_import_types::{
    CategoryImporter, DataType, ImportError, ImportFile, ImportParams, ImportPorts, ImportStep,
    ValidationLevel,
};
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::importers::default_importers;
use crate::preflight::preflight;

/// Runs one importer per data type present in a batch
pub struct ImportDispatcher {
    importers: HashMap<DataType, Arc<dyn CategoryImporter>>,
}

impl ImportDispatcher {
    /// Dispatcher with the default importer for every data type
    pub fn new(ports: &ImportPorts) -> Self {
        Self::with_importers(default_importers(ports))
    }

    pub fn with_importers(importers: impl IntoIterator<Item = Arc<dyn CategoryImporter>>) -> Self {
        let mut dispatcher = Self {
            importers: HashMap::new(),
        };
        for importer in importers {
            dispatcher.register_importer(importer);
        }
        dispatcher
    }

    /// Register an importer, replacing any previous one for its data type
    pub fn register_importer(&mut self, importer: Arc<dyn CategoryImporter>) {
        let data_type = importer.data_type();
        debug!("Registering importer for {}", data_type);
        self.importers.insert(data_type, importer);
    }

    /// Split a batch by data type, keeping the batch order inside each group.
    /// Files with an unrecognized data type are dropped.
    pub fn partition(batch: Vec<ImportFile>) -> HashMap<DataType, Vec<ImportFile>> {
        let mut groups: HashMap<DataType, Vec<ImportFile>> = HashMap::new();
        for file in batch {
            match file.data_type() {
                Some(data_type) => groups.entry(data_type).or_default().push(file),
                None => debug!("Skipping {}: unrecognized data type", file.filename),
            }
        }
        groups
    }

    /// Import `batch` and return the structured failures, in dispatch order
    pub async fn dispatch_errors(
        &self,
        batch: Vec<ImportFile>,
        params: ImportParams,
    ) -> Vec<ImportError> {
        if batch.is_empty() {
            return Vec::new();
        }

        let report = preflight(&batch);
        for message in report.messages(ValidationLevel::Warning) {
            warn!("{}", message);
        }

        info!(
            "Importing {} files into project {}",
            batch.len(),
            params.project_id
        );

        let mut groups = Self::partition(batch);
        let params = Arc::new(params);
        let mut tasks = Vec::new();

        for data_type in DataType::ALL {
            let Some(files) = groups.remove(&data_type) else {
                continue;
            };
            let Some(importer) = self.importers.get(&data_type).cloned() else {
                warn!(
                    "No importer registered for {}, skipping {} files",
                    data_type,
                    files.len()
                );
                continue;
            };

            let params = params.clone();
            debug!("Starting {} import with {} files", data_type, files.len());
            let task = tokio::spawn(async move { importer.import(&files, &params).await });
            tasks.push((data_type, task));
        }

        let (data_types, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
        let results = join_all(handles).await;

        let mut errors = Vec::new();
        for (data_type, result) in data_types.into_iter().zip(results) {
            match result {
                Ok(category_errors) => {
                    if category_errors.is_empty() {
                        debug!("{} import completed", data_type);
                    }
                    errors.extend(category_errors);
                }
                Err(e) => {
                    error!("{} import task failed: {}", data_type, e);
                    errors.push(ImportError::failure(
                        data_type,
                        ImportStep::Task,
                        None,
                        e.to_string(),
                    ));
                }
            }
        }

        if errors.is_empty() {
            info!("Import into project {} completed", params.project_id);
        } else {
            warn!(
                "Import into project {} completed with {} errors",
                params.project_id,
                errors.len()
            );
        }
        errors
    }

    /// Import `batch` and return one message per failure; empty on success
    pub async fn dispatch(&self, batch: Vec<ImportFile>, params: ImportParams) -> Vec<String> {
        self.dispatch_errors(batch, params)
            .await
            .into_iter()
            .map(|error| error.to_string())
            .filter(|message| !message.is_empty())
            .collect()
    }
}
