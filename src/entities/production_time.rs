use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Time an employee spent on production on a given day
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_times")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub employee_id: i32,
    pub fiche_production_id: Option<i32>,
    pub date: Date,
    pub minutes: i32,
    pub pieces: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::fiche_production::Entity",
        from = "Column::FicheProductionId",
        to = "super::fiche_production::Column::Id",
        on_delete = "SetNull"
    )]
    FicheProduction,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::fiche_production::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FicheProduction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
