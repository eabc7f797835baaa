//! Reading a batch from disk
//!
//! A manifest is a JSON file holding one import file object or an array of
//! them. Rasa config files can also be passed as plain YAML; their file
//! name becomes the import file name.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use botport_import::codec::parse_rasa_config;
use botport_import_types::{ImportFile, ImportPayload};
use clap::Args;
use serde_json::Value;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// JSON manifests, each holding one import file or an array of them
    pub manifests: Vec<PathBuf>,

    /// Rasa config YAML files (pipeline, policies and language keys)
    #[arg(long = "rasa-config", value_name = "PATH")]
    pub rasa_configs: Vec<PathBuf>,
}

impl BatchArgs {
    /// Every file of every manifest, then the rasa configs, in argument order
    pub fn load(&self) -> anyhow::Result<Vec<ImportFile>> {
        let mut batch = Vec::new();
        for path in &self.manifests {
            batch.extend(load_manifest(path)?);
        }
        for path in &self.rasa_configs {
            batch.push(load_rasa_config(path)?);
        }
        if batch.is_empty() {
            anyhow::bail!("nothing to import: pass at least one manifest or --rasa-config");
        }
        Ok(batch)
    }
}

pub fn load_manifest(path: &Path) -> anyhow::Result<Vec<ImportFile>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let files = match manifest {
        Value::Array(entries) => entries
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ImportFile>, _>>(),
        entry => serde_json::from_value(entry).map(|file| vec![file]),
    }
    .with_context(|| format!("{} is not an import manifest", path.display()))?;

    debug!("Loaded {} files from {}", files.len(), path.display());
    Ok(files)
}

pub fn load_rasa_config(path: &Path) -> anyhow::Result<ImportFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rasa config {}", path.display()))?;
    let config = parse_rasa_config(&raw)
        .with_context(|| format!("{} is not a rasa config", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImportFile::new(filename, ImportPayload::RasaConfig(config)))
}
