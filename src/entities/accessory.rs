use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ancillary parts (buttons, zippers...) received with a model on an import declaration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accessories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub document_id: i32,
    pub model: String,
    pub name: String,
    pub quantity_recu: i32,
    pub quantity_trouve: i32,
    /// Quantity already taken out of stock
    pub quantity_sortie: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inbound_document::Entity",
        from = "Column::DocumentId",
        to = "super::inbound_document::Column::Id",
        on_delete = "Cascade"
    )]
    Document,
}

impl Related<super::inbound_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
