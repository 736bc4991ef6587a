use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inbound_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub document_id: i32,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    /// Quantity declared on the document
    pub quantity_recu: i32,
    /// Quantity actually counted on arrival
    pub quantity_trouve: i32,
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
