//! Category importers, one per data type

mod collection;
mod domain;
mod project_config;
mod rasa_config;
mod raw_text;

use std::collections::HashSet;
use std::sync::Arc;

use botport_import_types::{CategoryImporter, ImportPorts, ProjectScoped};

pub use collection::CollectionImporter;
pub use domain::DomainImporter;
pub use project_config::ProjectConfigImporter;
pub use rasa_config::RasaConfigImporter;
pub use raw_text::RawTextImporter;

/// Keep the first record of every dedup key, preserving order
pub fn deduplicate<T, I>(records: I) -> Vec<T>
where
    T: ProjectScoped,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key().to_string()))
        .collect()
}

/// One importer per recognized data type, wired to `ports`
pub fn default_importers(ports: &ImportPorts) -> Vec<Arc<dyn CategoryImporter>> {
    vec![
        Arc::new(DomainImporter::new(
            ports.responses.clone(),
            ports.slots.clone(),
        )),
        Arc::new(RawTextImporter::endpoints(ports.endpoints.clone())),
        Arc::new(RawTextImporter::credentials(ports.credentials.clone())),
        Arc::new(RasaConfigImporter::new(
            ports.policies.clone(),
            ports.pipelines.clone(),
        )),
        Arc::new(ProjectConfigImporter::new(
            ports.instances.clone(),
            ports.projects.clone(),
        )),
        Arc::new(CollectionImporter::conversations(
            ports.conversations.clone(),
        )),
        Arc::new(CollectionImporter::incoming(ports.activity.clone())),
    ]
}
