use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quantity cut on one day for one category (fabric, lining...)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoupeCell {
    pub day: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fiche_coupes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client: String,
    pub model: String,
    pub commande: String,
    pub client_model_id: Option<i32>,
    /// `Vec<CoupeCell>` encoded as JSON
    #[sea_orm(column_type = "Json")]
    pub grid: Json,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn cells(&self) -> Result<Vec<CoupeCell>, serde_json::Error> {
        if self.grid.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.grid.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
