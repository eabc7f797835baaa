use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::DBDateTime;

/// Incoming user utterances
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub project_id: String,
    pub text: String,
    pub language: Option<String>,
    /// Remaining fields (intent, entities, confidence)
    pub body: Json,
    pub created_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
