use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuiviLine {
    pub commande: String,
    #[serde(default)]
    pub quantity_livree: i32,
    #[serde(default)]
    pub quantity_reparee: i32,
}

/// Manually maintained delivery/repair progress for one model of one client
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suivi_productions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client: String,
    pub model: String,
    /// `Vec<SuiviLine>` encoded as JSON
    #[sea_orm(column_type = "Json")]
    pub lines: Json,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn parsed_lines(&self) -> Result<Vec<SuiviLine>, serde_json::Error> {
        if self.lines.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.lines.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
