//! Validation types for pre-flight checks on a batch

use serde::{Deserialize, Serialize};

use crate::file::ImportFile;

/// Result of a validation check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Rule that was checked
    pub rule_id: String,
    /// Validation level
    pub level: ValidationLevel,
    /// Whether the validation passed
    pub passed: bool,
    /// Message describing the result
    pub message: String,
    /// Files the message is about
    pub affected_files: Vec<String>,
}

impl ValidationResult {
    pub fn pass(rule_id: &str, level: ValidationLevel) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            level,
            passed: true,
            message: String::new(),
            affected_files: Vec::new(),
        }
    }

    pub fn fail(
        rule_id: &str,
        level: ValidationLevel,
        message: impl Into<String>,
        affected_files: Vec<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            level,
            passed: false,
            message: message.into(),
            affected_files,
        }
    }
}

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Informational only
    Info,
    /// Warning - data will be imported, but not all of it
    Warning,
    /// Error - the batch should not be imported as is
    Error,
}

/// Complete validation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All validation results
    pub results: Vec<ValidationResult>,
    /// Overall status
    pub overall_status: ValidationStatus,
    /// Summary statistics
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            overall_status: ValidationStatus::Passed,
            summary: ValidationSummary::default(),
        }
    }

    /// Add a validation result
    pub fn add_result(&mut self, result: ValidationResult) {
        self.summary.total_count += 1;
        match result.level {
            ValidationLevel::Info => self.summary.info_count += 1,
            ValidationLevel::Warning => self.summary.warning_count += 1,
            ValidationLevel::Error => self.summary.error_count += 1,
        }

        if !result.passed {
            self.summary.failed_count += 1;
        } else {
            self.summary.passed_count += 1;
        }

        if !result.passed && result.level >= ValidationLevel::Error {
            self.overall_status = ValidationStatus::Failed;
        } else if !result.passed
            && result.level >= ValidationLevel::Warning
            && self.overall_status == ValidationStatus::Passed
        {
            self.overall_status = ValidationStatus::PassedWithWarnings;
        }

        self.results.push(result);
    }

    /// Check if validation passed (no error level failures)
    pub fn can_proceed(&self) -> bool {
        matches!(
            self.overall_status,
            ValidationStatus::Passed | ValidationStatus::PassedWithWarnings
        )
    }

    /// Messages of failed checks at exactly `level`
    pub fn messages(&self, level: ValidationLevel) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed && r.level == level)
            .map(|r| r.message.as_str())
            .collect()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Overall validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    /// All validations passed
    Passed,
    /// Passed with warnings
    PassedWithWarnings,
    /// Failed with errors
    Failed,
}

/// Validation summary statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_count: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

/// Trait for batch validation rules
pub trait ImportValidationRule: Send + Sync {
    /// Unique identifier for this rule
    fn rule_id(&self) -> &str;

    /// Validation level
    fn level(&self) -> ValidationLevel;

    /// Run the check against the whole batch
    fn validate(&self, files: &[ImportFile]) -> Vec<ValidationResult>;
}
