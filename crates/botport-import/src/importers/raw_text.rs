//! Endpoints and credentials: the first file's raw text saved as is

use std::sync::Arc;

use async_trait::async_trait;
use botport_import_types::{
    CategoryImporter, CredentialStore, DataType, EndpointStore, ImportError, ImportFile,
    ImportParams, ImportPayload, ImportStep, StoreResult,
};
use tracing::{debug, info, warn};

enum Target {
    Endpoints(Arc<dyn EndpointStore>),
    Credentials(Arc<dyn CredentialStore>),
}

pub struct RawTextImporter {
    target: Target,
}

impl RawTextImporter {
    pub fn endpoints(store: Arc<dyn EndpointStore>) -> Self {
        Self {
            target: Target::Endpoints(store),
        }
    }

    pub fn credentials(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            target: Target::Credentials(store),
        }
    }

    fn raw_text<'a>(&self, file: &'a ImportFile) -> Option<&'a str> {
        match (&self.target, &file.payload) {
            (Target::Endpoints(_), ImportPayload::Endpoints(payload))
            | (Target::Credentials(_), ImportPayload::Credentials(payload)) => {
                Some(payload.raw_text.as_str())
            }
            _ => None,
        }
    }

    async fn save(&self, project_id: &str, raw_text: &str) -> StoreResult<()> {
        match &self.target {
            Target::Endpoints(store) => store.save(project_id, raw_text).await,
            Target::Credentials(store) => store.save(project_id, raw_text).await,
        }
    }
}

#[async_trait]
impl CategoryImporter for RawTextImporter {
    fn data_type(&self) -> DataType {
        match self.target {
            Target::Endpoints(_) => DataType::Endpoints,
            Target::Credentials(_) => DataType::Credentials,
        }
    }

    async fn import(&self, files: &[ImportFile], params: &ImportParams) -> Vec<ImportError> {
        let Some(file) = files.first() else {
            return Vec::new();
        };
        let data_type = self.data_type();
        if files.len() > 1 {
            debug!(
                "Only {} is imported as {}, {} other files ignored",
                file.filename,
                data_type,
                files.len() - 1
            );
        }

        let Some(raw_text) = self.raw_text(file) else {
            return vec![ImportError::Unsupported {
                category: data_type,
                file: file.filename.clone(),
                reason: "payload does not match the data type".to_string(),
            }];
        };

        info!(
            "Importing {} from {} into project {}",
            data_type, file.filename, params.project_id
        );
        match self.save(&params.project_id, raw_text).await {
            Ok(()) => Vec::new(),
            Err(e) => {
                warn!("Failed to import {} from {}: {}", data_type, file.filename, e);
                vec![ImportError::from_store(
                    data_type,
                    ImportStep::Save,
                    Some(&file.filename),
                    e,
                )]
            }
        }
    }
}
