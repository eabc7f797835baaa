//! Error types for the import system
//!
//! Ports fail with [`StoreError`]. Category importers wrap those failures in
//! [`ImportError`], which keeps the structured context (category, file,
//! offending keys) until the report is rendered with `Display`.

use std::fmt;

use thiserror::Error;

use crate::file::DataType;

/// Result type for port operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by an external store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write violated a uniqueness constraint
    #[error("Duplicate key: {}", .keys.join(", "))]
    Conflict { keys: Vec<String> },

    /// Any other failure of the collaborator
    #[error("{0}")]
    Failure(String),
}

impl StoreError {
    pub fn failure(detail: impl Into<String>) -> Self {
        StoreError::Failure(detail.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Sub-step of a category import that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    /// Deleting the existing data of the category
    Wipe,
    /// Bulk insert of the domain responses
    Responses,
    /// Slot upsert
    Slots,
    /// Bulk insert of one collection file
    Insert,
    /// Saving a single configuration document
    Save,
    Policies,
    Pipeline,
    /// Instance then project update
    ProjectConfig,
    /// The category task itself died
    Task,
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStep::Wipe => "wipe",
            ImportStep::Responses => "responses",
            ImportStep::Slots => "slots",
            ImportStep::Insert => "insert",
            ImportStep::Save => "save",
            ImportStep::Policies => "policies",
            ImportStep::Pipeline => "pipeline",
            ImportStep::ProjectConfig => "project configuration",
            ImportStep::Task => "task",
        };
        write!(f, "{}", name)
    }
}

/// Failure of one category, scoped to a step and, when known, a file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// A write hit a uniqueness constraint
    Conflict {
        category: DataType,
        step: ImportStep,
        file: Option<String>,
        keys: Vec<String>,
    },

    /// A collaborator failed for any other reason
    ExternalFailure {
        category: DataType,
        step: ImportStep,
        file: Option<String>,
        detail: String,
    },

    /// The file payload cannot be handled by the category it was routed to
    Unsupported {
        category: DataType,
        file: String,
        reason: String,
    },
}

impl ImportError {
    /// Wrap a port failure, keeping conflicts distinguishable
    pub fn from_store(
        category: DataType,
        step: ImportStep,
        file: Option<&str>,
        error: StoreError,
    ) -> Self {
        let file = file.map(str::to_string);
        match error {
            StoreError::Conflict { keys } => ImportError::Conflict {
                category,
                step,
                file,
                keys,
            },
            StoreError::Failure(detail) => ImportError::ExternalFailure {
                category,
                step,
                file,
                detail,
            },
        }
    }

    pub fn failure(
        category: DataType,
        step: ImportStep,
        file: Option<&str>,
        detail: impl Into<String>,
    ) -> Self {
        ImportError::ExternalFailure {
            category,
            step,
            file: file.map(str::to_string),
            detail: detail.into(),
        }
    }

    pub fn category(&self) -> DataType {
        match self {
            ImportError::Conflict { category, .. }
            | ImportError::ExternalFailure { category, .. }
            | ImportError::Unsupported { category, .. } => *category,
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            ImportError::Conflict { file, .. } | ImportError::ExternalFailure { file, .. } => {
                file.as_deref()
            }
            ImportError::Unsupported { file, .. } => Some(file),
        }
    }
}

fn render_failure(
    f: &mut fmt::Formatter<'_>,
    category: DataType,
    step: ImportStep,
    file: &str,
    detail: &str,
) -> fmt::Result {
    match step {
        ImportStep::Wipe if category == DataType::Domain => {
            write!(f, "could not wipe the old responses")
        }
        ImportStep::Wipe => write!(
            f,
            "error when importing {}: could not wipe the existing data",
            category
        ),
        ImportStep::Responses => write!(f, "error while importing responses"),
        ImportStep::Slots => write!(f, "error when importing slots {}", detail),
        ImportStep::Insert => write!(f, "error when importing {} from {}", category, file),
        ImportStep::Save => write!(f, "error when importing {}", file),
        ImportStep::Policies => write!(f, "error when importing policies from {}", file),
        ImportStep::Pipeline => write!(f, "error when importing pipeline from {}", file),
        ImportStep::ProjectConfig => write!(
            f,
            "error when importing project configuration from {}",
            file
        ),
        ImportStep::Task => write!(f, "unexpected error when importing {}", category),
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Conflict {
                step: ImportStep::Responses,
                keys,
                ..
            } if !keys.is_empty() => {
                let existing: Vec<String> = keys
                    .iter()
                    .map(|key| format!("{} already exist", key))
                    .collect();
                write!(f, "error when importing responses: {}", existing.join(", "))
            }
            ImportError::Conflict {
                category,
                step: ImportStep::Insert,
                file,
                ..
            } => write!(
                f,
                "error when importing {} from {}, it seems that some of the data you are trying to import already exists",
                category,
                file.as_deref().unwrap_or("upload")
            ),
            ImportError::Conflict {
                category,
                step,
                file,
                keys,
            } => render_failure(
                f,
                *category,
                *step,
                file.as_deref().unwrap_or("upload"),
                &format!("duplicate key: {}", keys.join(", ")),
            ),
            ImportError::ExternalFailure {
                category,
                step,
                file,
                detail,
            } => render_failure(
                f,
                *category,
                *step,
                file.as_deref().unwrap_or("upload"),
                detail,
            ),
            ImportError::Unsupported {
                category,
                file,
                reason,
            } => write!(f, "{} cannot be imported as {}: {}", file, category, reason),
        }
    }
}
