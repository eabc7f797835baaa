//! Core types and traits for the project import system
//!
//! This crate provides the foundational abstractions for importing a batch of
//! validated project files (domain, configuration, conversations, activity)
//! into the stores of one project.
//!
//! # Architecture
//!
//! - **Files**: `ImportFile` and the closed `ImportPayload` variant per data type
//! - **Records**: responses, slots, conversations and utterances
//! - **Ports**: collaborator traits the importers write through
//! - **Traits**: `CategoryImporter` is implemented once per data type
//! - **Errors**: `StoreError` from ports, `ImportError` rendered into the report
//!
//! # Usage
//!
//! `botport-import` implements the importers and the dispatcher on top of
//! these types; `botport-store` implements the ports.

pub mod error;
pub mod file;
pub mod importer;
pub mod ports;
pub mod records;
pub mod validation;

pub use error::{ImportError, ImportStep, StoreError, StoreResult};
pub use file::{
    ConversationsPayload, DataType, DomainPayload, ImportFile, ImportPayload, IncomingPayload,
    ProjectConfigPayload, RasaConfigPayload, RawTextPayload,
};
pub use importer::{CategoryImporter, ImportParams, StoryGroupRef};
pub use ports::{
    CredentialStore, EndpointStore, ImportPorts, InstanceStore, PipelineStore, PolicyStore,
    ProjectStore, RecordStore, ResponseStore, SlotStore,
};
pub use records::{
    ConversationRecord, ProjectScoped, ResponseContent, ResponseTemplate, ResponseValue,
    SlotDefinition, Utterance,
};
pub use validation::{
    ImportValidationRule, ValidationLevel, ValidationReport, ValidationResult, ValidationStatus,
    ValidationSummary,
};
