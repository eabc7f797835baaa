//! Search index of bot responses

use botport_import_types::ResponseTemplate;
use serde_yaml::Value;
use tracing::debug;

/// Build the text index stored with a response
///
/// The index is the response key followed by every text and button title
/// found in its sequences, one per line. Entries that are not valid YAML
/// are indexed verbatim.
pub fn index_bot_response(response: &ResponseTemplate) -> String {
    let mut parts = vec![response.key.clone()];

    for value in &response.values {
        for entry in &value.sequence {
            match serde_yaml::from_str::<Value>(&entry.content) {
                Ok(message) => collect_texts(&message, &mut parts),
                Err(e) => {
                    debug!(
                        "Indexing raw content of response {} ({}): {}",
                        response.key, value.lang, e
                    );
                    parts.push(entry.content.trim().to_string());
                }
            }
        }
    }

    parts.retain(|part| !part.is_empty());
    parts.join("\n")
}

fn collect_texts(message: &Value, parts: &mut Vec<String>) {
    if let Some(text) = message.get("text").and_then(Value::as_str) {
        parts.push(text.to_string());
    }

    for list in ["buttons", "quick_replies"] {
        if let Some(buttons) = message.get(list).and_then(Value::as_sequence) {
            parts.extend(
                buttons
                    .iter()
                    .filter_map(|button| button.get("title").and_then(Value::as_str))
                    .map(str::to_string),
            );
        }
    }
}
