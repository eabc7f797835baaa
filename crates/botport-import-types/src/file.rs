//! Validated upload files and their typed payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::records::{ConversationRecord, ResponseTemplate, SlotDefinition, Utterance};

/// Category tag attached to every validated upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Responses and slots
    Domain,
    /// Endpoints configuration (raw YAML)
    Endpoints,
    /// Channel credentials (raw YAML)
    Credentials,
    /// NLU pipeline and core policies
    RasaConfig,
    /// Project and instance configuration
    BfConfig,
    /// Conversation transcripts
    Conversations,
    /// Incoming utterances (activity)
    Incoming,
}

impl DataType {
    /// Every recognized category, in dispatch order
    pub const ALL: [DataType; 7] = [
        DataType::Domain,
        DataType::Endpoints,
        DataType::Credentials,
        DataType::RasaConfig,
        DataType::BfConfig,
        DataType::Conversations,
        DataType::Incoming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Domain => "domain",
            DataType::Endpoints => "endpoints",
            DataType::Credentials => "credentials",
            DataType::RasaConfig => "rasaconfig",
            DataType::BfConfig => "bfconfig",
            DataType::Conversations => "conversations",
            DataType::Incoming => "incoming",
        }
    }

    /// Categories where only the first uploaded file is imported
    pub fn is_single_document(&self) -> bool {
        matches!(
            self,
            DataType::Endpoints | DataType::Credentials | DataType::BfConfig
        )
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.to_lowercase();
        DataType::ALL
            .into_iter()
            .find(|data_type| data_type.as_str() == tag)
            .ok_or_else(|| format!("Unknown data type: {}", s))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainPayload {
    #[serde(default)]
    pub responses: Vec<ResponseTemplate>,
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
}

/// Configuration forwarded verbatim to its store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextPayload {
    pub raw_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RasaConfigPayload {
    pub language: String,
    #[serde(default)]
    pub pipeline: serde_yaml::Value,
    #[serde(default)]
    pub policies: serde_yaml::Value,
}

impl RasaConfigPayload {
    pub fn has_policies(&self) -> bool {
        match &self.policies {
            serde_yaml::Value::Null => false,
            serde_yaml::Value::Sequence(policies) => !policies.is_empty(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfigPayload {
    #[serde(default)]
    pub project: Map<String, Value>,
    #[serde(default)]
    pub instance: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationsPayload {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingPayload {
    #[serde(default)]
    pub incoming: Vec<Utterance>,
}

/// Typed payload, one variant per data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "lowercase")]
pub enum ImportPayload {
    Domain(DomainPayload),
    Endpoints(RawTextPayload),
    Credentials(RawTextPayload),
    RasaConfig(RasaConfigPayload),
    BfConfig(ProjectConfigPayload),
    Conversations(ConversationsPayload),
    Incoming(IncomingPayload),
    /// Any tag this version does not know; ignored by the dispatcher
    #[serde(other)]
    Unrecognized,
}

impl ImportPayload {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ImportPayload::Domain(_) => Some(DataType::Domain),
            ImportPayload::Endpoints(_) => Some(DataType::Endpoints),
            ImportPayload::Credentials(_) => Some(DataType::Credentials),
            ImportPayload::RasaConfig(_) => Some(DataType::RasaConfig),
            ImportPayload::BfConfig(_) => Some(DataType::BfConfig),
            ImportPayload::Conversations(_) => Some(DataType::Conversations),
            ImportPayload::Incoming(_) => Some(DataType::Incoming),
            ImportPayload::Unrecognized => None,
        }
    }
}

/// One upload that already went through validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFile {
    pub filename: String,
    /// Client-side modification time, only used for UI bookkeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    #[serde(flatten)]
    pub payload: ImportPayload,
}

impl ImportFile {
    pub fn new(filename: impl Into<String>, payload: ImportPayload) -> Self {
        Self {
            filename: filename.into(),
            last_modified: None,
            payload,
        }
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.payload.data_type()
    }
}
