//! Database migrations for imported project data

pub use sea_orm_migration::prelude::*;

mod migration;

pub use migration::Migrator;
