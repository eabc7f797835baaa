//! Entities carried by import payloads
//!
//! Every record that ends up in a project-scoped store implements
//! [`ProjectScoped`] so importers can tag it with the target project before
//! handing it to a port.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Records that belong to exactly one project once persisted
pub trait ProjectScoped {
    /// Field used to collapse duplicates inside one merged candidate set
    fn dedup_key(&self) -> &str;

    /// Tag the record with the target project
    fn set_project_id(&mut self, project_id: &str);

    /// Consume the record and return it tagged with the target project
    fn with_project(mut self, project_id: &str) -> Self
    where
        Self: Sized,
    {
        self.set_project_id(project_id);
        self
    }
}

/// One entry of a localized response sequence
///
/// `content` is the YAML source of the message (`text:`, `buttons:`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseContent {
    pub content: String,
}

/// All messages of a response for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseValue {
    pub lang: String,
    #[serde(default)]
    pub sequence: Vec<ResponseContent>,
}

/// Bot response keyed by `key`, unique within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTemplate {
    pub key: String,
    #[serde(default)]
    pub values: Vec<ResponseValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Search index computed at import time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_index: Option<String>,
}

impl ResponseTemplate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
            project_id: None,
            text_index: None,
        }
    }

    /// Append a single-message sequence for `lang`
    pub fn with_message(mut self, lang: &str, content: &str) -> Self {
        let entry = ResponseContent {
            content: content.to_string(),
        };
        match self.values.iter_mut().find(|v| v.lang == lang) {
            Some(value) => value.sequence.push(entry),
            None => self.values.push(ResponseValue {
                lang: lang.to_string(),
                sequence: vec![entry],
            }),
        }
        self
    }
}

impl ProjectScoped for ResponseTemplate {
    fn dedup_key(&self) -> &str {
        &self.key
    }

    fn set_project_id(&mut self, project_id: &str) {
        self.project_id = Some(project_id.to_string());
    }
}

/// Slot definition keyed by `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub slot_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Type specific settings (`initialValue`, `categories`, ...)
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl SlotDefinition {
    pub fn new(name: impl Into<String>, slot_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot_type: slot_type.into(),
            project_id: None,
            settings: Map::new(),
        }
    }
}

impl ProjectScoped for SlotDefinition {
    fn dedup_key(&self) -> &str {
        &self.name
    }

    fn set_project_id(&mut self, project_id: &str) {
        self.project_id = Some(project_id.to_string());
    }
}

/// A recorded conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Tracker, status, env and any other transcript data
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ConversationRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_id: None,
            body: Map::new(),
        }
    }
}

impl ProjectScoped for ConversationRecord {
    fn dedup_key(&self) -> &str {
        &self.id
    }

    fn set_project_id(&mut self, project_id: &str) {
        self.project_id = Some(project_id.to_string());
    }
}

/// An observed incoming utterance (activity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Intent, entities, confidence and other parse data
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Utterance {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            language: None,
            project_id: None,
            body: Map::new(),
        }
    }
}

impl ProjectScoped for Utterance {
    fn dedup_key(&self) -> &str {
        &self.id
    }

    fn set_project_id(&mut self, project_id: &str) {
        self.project_id = Some(project_id.to_string());
    }
}
