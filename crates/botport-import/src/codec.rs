//! YAML encoding of configuration payloads

use botport_import_types::RasaConfigPayload;
use serde::Serialize;
use thiserror::Error;

/// Top-level keys accepted in a rasa config file
pub const RASA_CONFIG_KEYS: [&str; 3] = ["pipeline", "policies", "language"];

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("YAML encoding failed: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("YAML decoding failed: {0}")]
    Decode(#[source] serde_yaml::Error),

    #[error("rasa config must be a mapping")]
    NotAMapping,

    #[error("{}", invalid_keys_message(.keys))]
    InvalidKeys { keys: Vec<String> },
}

fn invalid_keys_message(keys: &[String]) -> String {
    keys.iter()
        .map(|key| format!("{} is not a valid rasa config data", key))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Encode a configuration value to its YAML text
pub fn encode_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_yaml::to_string(value).map_err(CodecError::Encode)
}

/// Decode a raw rasa config file
///
/// Every top-level key outside of `pipeline`, `policies` and `language` is
/// reported at once.
pub fn parse_rasa_config(raw_text: &str) -> Result<RasaConfigPayload, CodecError> {
    let document: serde_yaml::Value = serde_yaml::from_str(raw_text).map_err(CodecError::Decode)?;
    let mapping = document.as_mapping().ok_or(CodecError::NotAMapping)?;

    let invalid: Vec<String> = mapping
        .keys()
        .map(|key| match key.as_str() {
            Some(name) => name.to_string(),
            None => format!("{:?}", key),
        })
        .filter(|name| !RASA_CONFIG_KEYS.contains(&name.as_str()))
        .collect();
    if !invalid.is_empty() {
        return Err(CodecError::InvalidKeys { keys: invalid });
    }

    serde_yaml::from_value(document).map_err(CodecError::Decode)
}
