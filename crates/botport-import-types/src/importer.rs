//! Category importer trait
//!
//! Defines the interface every per-data-type importer provides, and the
//! parameters shared by all of them during one dispatch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::ImportError, file::DataType, file::ImportFile, records::SlotDefinition};

/// Reference to a story group that existed before the import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryGroupRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Context shared by every category of one import call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportParams {
    /// Target project of every write
    pub project_id: String,
    /// Delete existing data of a category before inserting
    #[serde(default)]
    pub wipe_current: bool,
    /// Slots present before the import
    ///
    /// Deleting them belongs to the slot collaborator, not to the importers.
    #[serde(default)]
    pub existing_slots: Vec<SlotDefinition>,
    #[serde(default)]
    pub existing_story_groups: Vec<StoryGroupRef>,
}

impl ImportParams {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn wipe(mut self, wipe_current: bool) -> Self {
        self.wipe_current = wipe_current;
        self
    }
}

/// Import logic for one data type
///
/// Implementations own their failure domain: every failure is converted to
/// an [`ImportError`] and returned, never propagated. An empty `files`
/// slice is a no-op returning no errors.
#[async_trait]
pub trait CategoryImporter: Send + Sync {
    /// Data type handled by this importer
    fn data_type(&self) -> DataType;

    /// Import every file of the partition
    async fn import(&self, files: &[ImportFile], params: &ImportParams) -> Vec<ImportError>;
}
