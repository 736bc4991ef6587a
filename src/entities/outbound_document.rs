use super::DocumentStatus;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outbound documents share one table: customs export declarations and delivery notes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    #[sea_orm(string_value = "declaration_export")]
    DeclarationExport,
    #[sea_orm(string_value = "livraison")]
    Livraison,
}

impl OutboundKind {
    pub fn label(self) -> &'static str {
        match self {
            OutboundKind::DeclarationExport => "Export declaration",
            OutboundKind::Livraison => "Delivery note",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outbound_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: OutboundKind,
    pub client_id: Option<i32>,
    pub client: String,
    pub reference: String,
    pub date: Date,
    pub status: DocumentStatus,
    pub due_date: Option<Date>,
    pub vat_active: bool,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub vat_rate: Decimal,
    pub payment_mode: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::outbound_line::Entity")]
    Lines,
}

impl Related<super::outbound_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
