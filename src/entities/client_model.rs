use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named sub-quantity of an order, typically a size
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Variante {
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
}

/// One order code of a model with its variants
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommandeVariantes {
    pub commande: String,
    #[serde(default)]
    pub variantes: Vec<Variante>,
}

impl CommandeVariantes {
    /// Ordered quantity of this order: the sum of its variants
    pub fn total(&self) -> i64 {
        self.variantes.iter().map(|v| i64::from(v.quantity)).sum()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Free-text, comma separated order codes
    pub commandes: Option<String>,
    /// `Vec<CommandeVariantes>` encoded as JSON
    #[sea_orm(column_type = "Json")]
    pub variants: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Decodes the order/variant structure; a null column is an empty list.
    pub fn orders(&self) -> Result<Vec<CommandeVariantes>, serde_json::Error> {
        if self.variants.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.variants.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_total_is_sum_of_variants() {
        let order = CommandeVariantes {
            commande: "CMD1".into(),
            variantes: vec![
                Variante { name: "S".into(), quantity: 10 },
                Variante { name: "M".into(), quantity: 20 },
            ],
        };
        assert_eq!(order.total(), 30);
    }

    #[test]
    fn null_variants_decode_to_empty_list() {
        let model = Model {
            id: 1,
            client_id: 1,
            name: "X".into(),
            description: None,
            commandes: None,
            variants: Json::Null,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(model.orders().unwrap().is_empty());

        let model = Model {
            variants: json!([{ "commande": "A1", "variantes": [{ "name": "L", "quantity": 4 }] }]),
            ..model
        };
        let orders = model.orders().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total(), 4);
    }
}
