//! Mapping of database errors onto the port error taxonomy

use botport_import_types::StoreError;
use sea_orm::{DbErr, SqlErr};

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn store_failure(err: DbErr) -> StoreError {
    StoreError::failure(err.to_string())
}

pub(crate) fn encode_failure(err: serde_json::Error) -> StoreError {
    StoreError::failure(format!("could not encode record: {}", err))
}

/// Records must be tagged with their project before reaching a store
pub(crate) fn require_project<'a>(project_id: &'a Option<String>, key: &str) -> Result<&'a str, StoreError> {
    project_id
        .as_deref()
        .ok_or_else(|| StoreError::failure(format!("{} is not attached to a project", key)))
}
