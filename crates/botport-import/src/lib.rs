//! Project import dispatcher
//!
//! This crate writes a batch of validated project files into the stores of
//! one project: domain (responses and slots), endpoints, credentials, rasa
//! config, project config, conversations and incoming activity.
//!
//! # Architecture
//!
//! - **Services**: `ImportDispatcher` partitions the batch by data type and
//!   runs one category importer per partition concurrently
//! - **Importers**: one `CategoryImporter` per data type, each owning its
//!   failure domain
//! - **Codec**: YAML encoding of configuration payloads
//! - **Preflight**: warnings about data that will be skipped
//!
//! # Usage
//!
//! Build an `ImportPorts` bundle (see `botport-store`), create an
//! `ImportDispatcher` from it and call `dispatch`; the returned list holds
//! one human-readable message per failure and is empty on full success.

pub mod codec;
pub mod importers;
pub mod preflight;
pub mod services;
pub mod test_utils;
pub mod text_index;

pub use services::ImportDispatcher;
