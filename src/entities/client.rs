use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    /// First day the client accepts submissions
    pub submission_start: Option<Date>,
    /// Last day of the submission window, drives expiry notices
    pub submission_end: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_model::Entity")]
    ClientModels,
}

impl Related<super::client_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientModels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
