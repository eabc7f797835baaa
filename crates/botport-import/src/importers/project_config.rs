//! Project configuration importer: instance then project, from the first file

use std::sync::Arc;

use async_trait::async_trait;
use botport_import_types::{
    CategoryImporter, DataType, ImportError, ImportFile, ImportParams, ImportPayload, ImportStep,
    InstanceStore, ProjectConfigPayload, ProjectStore, StoreResult,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub struct ProjectConfigImporter {
    instances: Arc<dyn InstanceStore>,
    projects: Arc<dyn ProjectStore>,
}

impl ProjectConfigImporter {
    pub fn new(instances: Arc<dyn InstanceStore>, projects: Arc<dyn ProjectStore>) -> Self {
        Self {
            instances,
            projects,
        }
    }

    /// Both updates share one failure boundary
    async fn save(&self, config: &ProjectConfigPayload, project_id: &str) -> StoreResult<()> {
        let mut instance = config.instance.clone();
        instance.insert("projectId".to_string(), Value::from(project_id));
        self.instances.update(project_id, instance).await?;

        // The imported project keeps the target id and starts untrained
        let mut project = config.project.clone();
        project.insert("_id".to_string(), Value::from(project_id));
        project.insert("training".to_string(), Value::Object(Map::new()));
        self.projects.update(project_id, project).await
    }
}

#[async_trait]
impl CategoryImporter for ProjectConfigImporter {
    fn data_type(&self) -> DataType {
        DataType::BfConfig
    }

    async fn import(&self, files: &[ImportFile], params: &ImportParams) -> Vec<ImportError> {
        let Some(file) = files.first() else {
            return Vec::new();
        };
        if files.len() > 1 {
            debug!(
                "Only {} is imported as project configuration, {} other files ignored",
                file.filename,
                files.len() - 1
            );
        }
        let ImportPayload::BfConfig(config) = &file.payload else {
            return vec![ImportError::Unsupported {
                category: DataType::BfConfig,
                file: file.filename.clone(),
                reason: "payload does not match the data type".to_string(),
            }];
        };

        info!(
            "Importing project configuration from {} into project {}",
            file.filename, params.project_id
        );
        match self.save(config, &params.project_id).await {
            Ok(()) => Vec::new(),
            Err(e) => {
                warn!(
                    "Failed to import project configuration from {}: {}",
                    file.filename, e
                );
                vec![ImportError::failure(
                    DataType::BfConfig,
                    ImportStep::ProjectConfig,
                    Some(&file.filename),
                    e.to_string(),
                )]
            }
        }
    }
}
