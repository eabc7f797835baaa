//! Database entities for imported project data

pub mod types;

pub mod bot_responses;
pub mod slots;

// Collections
pub mod activity;
pub mod conversations;

// Project configuration
pub mod instances;
pub mod project_settings;
pub mod projects;

pub use types::{DBDateTime, SettingKind};
