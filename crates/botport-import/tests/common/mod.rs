//! Batch fixtures shared by the dispatcher tests

#![allow(dead_code)]

use botport_import_types::{
    ConversationRecord, ConversationsPayload, DomainPayload, ImportFile, ImportPayload,
    IncomingPayload, ProjectConfigPayload, RasaConfigPayload, RawTextPayload, ResponseTemplate,
    SlotDefinition, Utterance,
};
use serde_json::json;

pub fn domain(name: &str, responses: &[&str], slots: &[&str]) -> ImportFile {
    ImportFile::new(
        name,
        ImportPayload::Domain(DomainPayload {
            responses: responses
                .iter()
                .map(|key| ResponseTemplate::new(*key).with_message("en", "text: hello"))
                .collect(),
            slots: slots
                .iter()
                .map(|name| SlotDefinition::new(*name, "text"))
                .collect(),
        }),
    )
}

pub fn endpoints(name: &str, raw_text: &str) -> ImportFile {
    ImportFile::new(
        name,
        ImportPayload::Endpoints(RawTextPayload {
            raw_text: raw_text.to_string(),
        }),
    )
}

pub fn credentials(name: &str, raw_text: &str) -> ImportFile {
    ImportFile::new(
        name,
        ImportPayload::Credentials(RawTextPayload {
            raw_text: raw_text.to_string(),
        }),
    )
}

pub fn rasa_config(name: &str, language: &str, policy: &str, component: &str) -> ImportFile {
    ImportFile::new(
        name,
        ImportPayload::RasaConfig(RasaConfigPayload {
            language: language.to_string(),
            pipeline: serde_yaml::from_str(&format!("- name: {}", component)).unwrap(),
            policies: serde_yaml::from_str(&format!("- name: {}", policy)).unwrap(),
        }),
    )
}

pub fn bf_config(name: &str) -> ImportFile {
    let payload: ProjectConfigPayload = serde_json::from_value(json!({
        "project": { "name": "Restaurant bot", "defaultLanguage": "en" },
        "instance": { "host": "http://rasa:5005" }
    }))
    .unwrap();
    ImportFile::new(name, ImportPayload::BfConfig(payload))
}

pub fn conversations(name: &str, ids: &[&str]) -> ImportFile {
    ImportFile::new(
        name,
        ImportPayload::Conversations(ConversationsPayload {
            conversations: ids.iter().map(|id| ConversationRecord::new(*id)).collect(),
        }),
    )
}

pub fn incoming(name: &str, ids: &[&str]) -> ImportFile {
    ImportFile::new(
        name,
        ImportPayload::Incoming(IncomingPayload {
            incoming: ids.iter().map(|id| Utterance::new(*id, "hi")).collect(),
        }),
    )
}

pub fn unrecognized(name: &str) -> ImportFile {
    ImportFile::new(name, ImportPayload::Unrecognized)
}
