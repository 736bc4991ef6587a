use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inbound documents share one table: customs import declarations and incoming delivery notes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    #[sea_orm(string_value = "declaration_import")]
    DeclarationImport,
    #[sea_orm(string_value = "livraison_entree")]
    LivraisonEntree,
}

impl InboundKind {
    pub fn label(self) -> &'static str {
        match self {
            InboundKind::DeclarationImport => "Import declaration",
            InboundKind::LivraisonEntree => "Incoming delivery",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inbound_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: InboundKind,
    pub client_id: Option<i32>,
    pub client: String,
    pub reference: String,
    pub date: Date,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inbound_line::Entity")]
    Lines,
    #[sea_orm(has_many = "super::accessory::Entity")]
    Accessories,
}

impl Related<super::inbound_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::accessory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accessories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
