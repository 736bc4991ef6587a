use super::DocumentStatus;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub number: String,
    pub issuer_name: String,
    pub client_id: Option<i32>,
    pub client_name: String,
    pub client_address: Option<String>,
    pub invoice_date: Date,
    pub due_date: Option<Date>,
    pub vat_active: bool,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub vat_rate: Decimal,
    pub payment_mode: Option<String>,
    pub status: DocumentStatus,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_line::Entity")]
    Lines,
}

impl Related<super::invoice_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
