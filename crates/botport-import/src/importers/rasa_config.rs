//! Rasa config importer: policies from the first file, one pipeline per file

use std::sync::Arc;

use async_trait::async_trait;
use botport_import_types::{
    CategoryImporter, DataType, ImportError, ImportFile, ImportParams, ImportPayload, ImportStep,
    PipelineStore, PolicyStore, RasaConfigPayload,
};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::codec::encode_yaml;

pub struct RasaConfigImporter {
    policies: Arc<dyn PolicyStore>,
    pipelines: Arc<dyn PipelineStore>,
}

impl RasaConfigImporter {
    pub fn new(policies: Arc<dyn PolicyStore>, pipelines: Arc<dyn PipelineStore>) -> Self {
        Self {
            policies,
            pipelines,
        }
    }

    async fn save_policies(
        &self,
        file: &ImportFile,
        config: &RasaConfigPayload,
        project_id: &str,
    ) -> Result<(), ImportError> {
        if !config.has_policies() {
            debug!("{} carries no policies", file.filename);
            return Ok(());
        }
        let policies_error = |detail: String| {
            warn!(
                "Failed to import policies from {}: {}",
                file.filename, detail
            );
            ImportError::failure(
                DataType::RasaConfig,
                ImportStep::Policies,
                Some(&file.filename),
                detail,
            )
        };

        let policies = encode_yaml(&config.policies).map_err(|e| policies_error(e.to_string()))?;
        self.policies
            .save(project_id, &policies)
            .await
            .map_err(|e| policies_error(e.to_string()))
    }

    async fn save_pipeline(
        &self,
        file: &ImportFile,
        config: &RasaConfigPayload,
        project_id: &str,
    ) -> Result<(), ImportError> {
        let pipeline_error = |detail: String| {
            warn!(
                "Failed to import {} pipeline from {}: {}",
                config.language, file.filename, detail
            );
            ImportError::failure(
                DataType::RasaConfig,
                ImportStep::Pipeline,
                Some(&file.filename),
                detail,
            )
        };

        let pipeline = encode_yaml(&config.pipeline).map_err(|e| pipeline_error(e.to_string()))?;
        self.pipelines
            .save(project_id, &config.language, &pipeline)
            .await
            .map_err(|e| pipeline_error(e.to_string()))
    }

    /// Policies are only taken from the first file of the batch
    async fn import_file(
        &self,
        index: usize,
        file: &ImportFile,
        project_id: &str,
    ) -> Result<(), ImportError> {
        let ImportPayload::RasaConfig(config) = &file.payload else {
            return Err(ImportError::Unsupported {
                category: DataType::RasaConfig,
                file: file.filename.clone(),
                reason: "payload does not match the data type".to_string(),
            });
        };

        if index == 0 {
            self.save_policies(file, config, project_id).await?;
        }
        self.save_pipeline(file, config, project_id).await
    }
}

#[async_trait]
impl CategoryImporter for RasaConfigImporter {
    fn data_type(&self) -> DataType {
        DataType::RasaConfig
    }

    async fn import(&self, files: &[ImportFile], params: &ImportParams) -> Vec<ImportError> {
        if files.is_empty() {
            return Vec::new();
        }
        info!(
            "Importing rasa config from {} files into project {}",
            files.len(),
            params.project_id
        );

        join_all(
            files
                .iter()
                .enumerate()
                .map(|(index, file)| self.import_file(index, file, &params.project_id)),
        )
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailPoint, MemoryStores};

    fn config_file(name: &str, language: &str, policy: &str, component: &str) -> ImportFile {
        ImportFile::new(
            name,
            ImportPayload::RasaConfig(RasaConfigPayload {
                language: language.to_string(),
                pipeline: serde_yaml::from_str(&format!("- name: {}", component)).unwrap(),
                policies: serde_yaml::from_str(&format!("- name: {}", policy)).unwrap(),
            }),
        )
    }

    fn importer(stores: &Arc<MemoryStores>) -> RasaConfigImporter {
        RasaConfigImporter::new(stores.clone(), stores.clone())
    }

    #[tokio::test]
    async fn test_policies_from_first_file_pipeline_per_language() {
        let stores = MemoryStores::new();
        let files = vec![
            config_file("config-en.yml", "en", "MemoizationPolicy", "WhitespaceTokenizer"),
            config_file("config-fr.yml", "fr", "TEDPolicy", "SpacyTokenizer"),
        ];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert!(errors.is_empty());
        let policies = stores.saved("policies");
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].content, "- name: MemoizationPolicy\n");

        let mut pipelines = stores.saved("pipeline");
        pipelines.sort_by(|a, b| a.language.cmp(&b.language));
        assert_eq!(pipelines.len(), 2);
        assert_eq!(pipelines[0].language.as_deref(), Some("en"));
        assert_eq!(pipelines[0].content, "- name: WhitespaceTokenizer\n");
        assert_eq!(pipelines[1].language.as_deref(), Some("fr"));
        assert_eq!(pipelines[1].content, "- name: SpacyTokenizer\n");
    }

    #[tokio::test]
    async fn test_failed_policies_skip_first_pipeline() {
        let stores = MemoryStores::new();
        stores.fail(FailPoint::Policies);
        let files = vec![
            config_file("config-en.yml", "en", "MemoizationPolicy", "WhitespaceTokenizer"),
            config_file("config-fr.yml", "fr", "TEDPolicy", "SpacyTokenizer"),
        ];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["error when importing policies from config-en.yml"]
        );
        let pipelines = stores.saved("pipeline");
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].language.as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn test_failed_pipelines_reported_per_file() {
        let stores = MemoryStores::new();
        stores.fail(FailPoint::Pipelines);
        let files = vec![
            config_file("config-en.yml", "en", "MemoizationPolicy", "WhitespaceTokenizer"),
            config_file("config-fr.yml", "fr", "TEDPolicy", "SpacyTokenizer"),
        ];

        let errors = importer(&stores).import(&files, &ImportParams::new("p1")).await;

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![
                "error when importing pipeline from config-en.yml",
                "error when importing pipeline from config-fr.yml"
            ]
        );
        assert_eq!(stores.saved("policies").len(), 1);
    }

    #[tokio::test]
    async fn test_first_file_without_policies_saves_pipeline_only() {
        let stores = MemoryStores::new();
        let mut file = config_file("config-en.yml", "en", "MemoizationPolicy", "WhitespaceTokenizer");
        if let ImportPayload::RasaConfig(config) = &mut file.payload {
            config.policies = serde_yaml::Value::Null;
        }

        let errors = importer(&stores).import(&[file], &ImportParams::new("p1")).await;

        assert!(errors.is_empty());
        assert!(stores.saved("policies").is_empty());
        assert_eq!(stores.saved("pipeline").len(), 1);
    }
}
