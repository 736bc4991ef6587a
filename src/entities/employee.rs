use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Workstation or trade, e.g. "coupe", "piquage"
    pub position: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::production_time::Entity")]
    ProductionTimes,
}

impl Related<super::production_time::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionTimes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
