//! Pre-flight checks on a batch
//!
//! None of these stop an import: they describe data the importers will
//! skip so callers can warn the user before or after dispatching.

use std::collections::BTreeMap;

use botport_import_types::{
    DataType, ImportFile, ImportPayload, ImportValidationRule, ValidationLevel, ValidationReport,
    ValidationResult,
};

/// Single-document categories only import their first file
pub struct SingleDocumentRule;

impl ImportValidationRule for SingleDocumentRule {
    fn rule_id(&self) -> &str {
        "batch.single_document"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Warning
    }

    fn validate(&self, files: &[ImportFile]) -> Vec<ValidationResult> {
        let mut by_type: BTreeMap<DataType, Vec<&str>> = BTreeMap::new();
        for file in files {
            if let Some(data_type) = file.data_type().filter(DataType::is_single_document) {
                by_type.entry(data_type).or_default().push(&file.filename);
            }
        }

        by_type
            .into_iter()
            .map(|(data_type, names)| match names.as_slice() {
                [first, ignored @ ..] if !ignored.is_empty() => ValidationResult::fail(
                    self.rule_id(),
                    self.level(),
                    format!(
                        "only {} will be imported as {}, {} ignored",
                        first,
                        data_type,
                        ignored.join(", ")
                    ),
                    ignored.iter().map(|name| name.to_string()).collect(),
                ),
                _ => ValidationResult::pass(self.rule_id(), self.level()),
            })
            .collect()
    }
}

/// Policies are only read from the first rasa config file
pub struct IgnoredPoliciesRule;

impl ImportValidationRule for IgnoredPoliciesRule {
    fn rule_id(&self) -> &str {
        "rasaconfig.ignored_policies"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Warning
    }

    fn validate(&self, files: &[ImportFile]) -> Vec<ValidationResult> {
        let configs: Vec<(&ImportFile, bool)> = files
            .iter()
            .filter_map(|file| match &file.payload {
                ImportPayload::RasaConfig(config) => Some((file, config.has_policies())),
                _ => None,
            })
            .collect();
        let Some((first, _)) = configs.first() else {
            return Vec::new();
        };

        configs
            .iter()
            .skip(1)
            .filter(|(_, has_policies)| *has_policies)
            .map(|(file, _)| {
                ValidationResult::fail(
                    self.rule_id(),
                    self.level(),
                    format!(
                        "policies from {} will be ignored, only the policies from {} are imported",
                        file.filename, first.filename
                    ),
                    vec![file.filename.clone()],
                )
            })
            .collect()
    }
}

/// Two rasa config files for the same language race on the same pipeline
pub struct DuplicateLanguageRule;

impl ImportValidationRule for DuplicateLanguageRule {
    fn rule_id(&self) -> &str {
        "rasaconfig.duplicate_language"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Warning
    }

    fn validate(&self, files: &[ImportFile]) -> Vec<ValidationResult> {
        let mut by_language: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for file in files {
            if let ImportPayload::RasaConfig(config) = &file.payload {
                by_language
                    .entry(config.language.as_str())
                    .or_default()
                    .push(file.filename.clone());
            }
        }

        by_language
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(language, names)| {
                ValidationResult::fail(
                    self.rule_id(),
                    self.level(),
                    format!(
                        "several files provide the {} pipeline: {}",
                        language,
                        names.join(", ")
                    ),
                    names,
                )
            })
            .collect()
    }
}

/// Files with a data type this version does not import
pub struct UnrecognizedTypeRule;

impl ImportValidationRule for UnrecognizedTypeRule {
    fn rule_id(&self) -> &str {
        "batch.unrecognized_type"
    }

    fn level(&self) -> ValidationLevel {
        ValidationLevel::Info
    }

    fn validate(&self, files: &[ImportFile]) -> Vec<ValidationResult> {
        files
            .iter()
            .filter(|file| file.data_type().is_none())
            .map(|file| {
                ValidationResult::fail(
                    self.rule_id(),
                    self.level(),
                    format!("{} has an unrecognized data type and will be skipped", file.filename),
                    vec![file.filename.clone()],
                )
            })
            .collect()
    }
}

pub fn default_rules() -> Vec<Box<dyn ImportValidationRule>> {
    vec![
        Box::new(SingleDocumentRule),
        Box::new(IgnoredPoliciesRule),
        Box::new(DuplicateLanguageRule),
        Box::new(UnrecognizedTypeRule),
    ]
}

/// Run every default rule against the batch
pub fn preflight(files: &[ImportFile]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for rule in default_rules() {
        for result in rule.validate(files) {
            report.add_result(result);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use botport_import_types::{RasaConfigPayload, RawTextPayload, ValidationStatus};

    fn endpoints(name: &str) -> ImportFile {
        ImportFile::new(name, ImportPayload::Endpoints(RawTextPayload::default()))
    }

    fn rasa_config(name: &str, language: &str, policies: bool) -> ImportFile {
        let mut config = RasaConfigPayload {
            language: language.to_string(),
            ..Default::default()
        };
        if policies {
            config.policies = serde_yaml::from_str("- name: TEDPolicy").unwrap();
        }
        ImportFile::new(name, ImportPayload::RasaConfig(config))
    }

    #[test]
    fn test_clean_batch_passes() {
        let report = preflight(&[endpoints("endpoints.yml"), rasa_config("en.yml", "en", true)]);

        assert_eq!(report.overall_status, ValidationStatus::Passed);
        assert!(report.messages(ValidationLevel::Warning).is_empty());
    }

    #[test]
    fn test_extra_single_document_files_are_flagged() {
        let report = preflight(&[
            endpoints("endpoints.yml"),
            endpoints("endpoints.dev.yml"),
            endpoints("endpoints.prod.yml"),
        ]);

        assert_eq!(
            report.messages(ValidationLevel::Warning),
            vec!["only endpoints.yml will be imported as endpoints, endpoints.dev.yml, endpoints.prod.yml ignored"]
        );
        assert!(report.can_proceed());
    }

    #[test]
    fn test_later_policies_and_duplicate_languages_are_flagged() {
        let report = preflight(&[
            rasa_config("en.yml", "en", true),
            rasa_config("fr.yml", "fr", true),
            rasa_config("en-2.yml", "en", false),
        ]);

        assert_eq!(
            report.messages(ValidationLevel::Warning),
            vec![
                "policies from fr.yml will be ignored, only the policies from en.yml are imported",
                "several files provide the en pipeline: en.yml, en-2.yml"
            ]
        );
    }

    #[test]
    fn test_unrecognized_type_is_info() {
        let report = preflight(&[ImportFile::new("stories.md", ImportPayload::Unrecognized)]);

        assert_eq!(
            report.messages(ValidationLevel::Info),
            vec!["stories.md has an unrecognized data type and will be skipped"]
        );
        assert_eq!(report.overall_status, ValidationStatus::Passed);
    }
}
