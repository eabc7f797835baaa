use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type DBDateTime = chrono::DateTime<chrono::Utc>;

/// Kind of configuration document stored in `project_settings`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    #[sea_orm(string_value = "endpoints")]
    Endpoints,
    #[sea_orm(string_value = "credentials")]
    Credentials,
    #[sea_orm(string_value = "policies")]
    Policies,
    #[sea_orm(string_value = "pipeline")]
    Pipeline,
}

impl SettingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKind::Endpoints => "endpoints",
            SettingKind::Credentials => "credentials",
            SettingKind::Policies => "policies",
            SettingKind::Pipeline => "pipeline",
        }
    }
}

impl Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
