use crate::{
    db::DbPool,
    entities::{
        client,
        client_model::{
            self, ActiveModel as ClientModelActiveModel, CommandeVariantes, Entity as ClientModelEntity,
            Model as ClientModelModel, Variante,
        },
    },
    errors::ServiceError,
    events::{Event, EventSender},
    reconciliation::{self, normalize, OrderReconciliation},
    services::reports,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ClientModelInput {
    pub client_id: i32,
    #[validate(length(min = 1, max = 255, message = "Model name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Free-text, comma separated order codes
    pub commandes: Option<String>,
    #[serde(default)]
    pub variants: Vec<CommandeVariantes>,
}

impl ClientModelInput {
    fn normalized(self) -> Self {
        let variants: Vec<CommandeVariantes> = self
            .variants
            .into_iter()
            .map(|order| CommandeVariantes {
                commande: order.commande.trim().to_string(),
                variantes: order
                    .variantes
                    .into_iter()
                    .map(|v| Variante {
                        name: v.name.trim().to_string(),
                        quantity: v.quantity,
                    })
                    .collect(),
            })
            .collect();
        let codes = reconciliation::order_codes(self.commandes.as_deref(), &variants);
        Self {
            client_id: self.client_id,
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            commandes: (!codes.is_empty()).then(|| codes.join(", ")),
            variants,
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        let mut seen = HashSet::new();
        for order in &self.variants {
            if order.commande.is_empty() {
                return Err(ServiceError::ValidationError(
                    "every order needs a commande code".into(),
                ));
            }
            if !seen.insert(normalize(&order.commande)) {
                return Err(ServiceError::ValidationError(format!(
                    "order {} is listed twice",
                    order.commande
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub commande: String,
    pub variantes: Vec<Variante>,
    /// Sum of variant quantities
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientModelResponse {
    pub id: i32,
    pub client_id: i32,
    pub client_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Normalised order list, including codes only present in `orders`
    pub commandes: Vec<String>,
    pub orders: Vec<OrderSummary>,
    pub total_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientModelResponse {
    pub fn build(
        model: ClientModelModel,
        client: Option<client::Model>,
    ) -> Result<Self, ServiceError> {
        let orders = model.orders()?;
        let commandes = reconciliation::order_codes(model.commandes.as_deref(), &orders);
        let orders: Vec<OrderSummary> = orders
            .into_iter()
            .map(|order| OrderSummary {
                total: order.total(),
                commande: order.commande,
                variantes: order.variantes,
            })
            .collect();
        Ok(Self {
            id: model.id,
            client_id: model.client_id,
            client_name: client.map(|c| c.name),
            name: model.name,
            description: model.description,
            commandes,
            total_quantity: orders.iter().map(|o| o.total).sum(),
            orders,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelReconciliation {
    pub client_model_id: i32,
    pub client: String,
    pub model: String,
    pub orders: Vec<OrderReconciliation>,
}

#[derive(Clone)]
pub struct ClientModelService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ClientModelService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn require_client(&self, client_id: i32) -> Result<client::Model, ServiceError> {
        client::Entity::find_by_id(client_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::InvalidInput(format!("client {client_id} does not exist")))
    }

    #[instrument(skip(self, input), fields(client_id = input.client_id, name = %input.name))]
    pub async fn create(&self, input: ClientModelInput) -> Result<ClientModelResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let owner = self.require_client(input.client_id).await?;

        let now = Utc::now();
        let model = ClientModelActiveModel {
            client_id: Set(input.client_id),
            name: Set(input.name),
            description: Set(input.description),
            commandes: Set(input.commandes),
            variants: Set(serde_json::to_value(&input.variants)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create client model");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_model_id = model.id, "Client model created");
        self.event_sender
            .send_or_log(Event::ClientModelSaved(model.id))
            .await;
        ClientModelResponse::build(model, Some(owner))
    }

    async fn find_with_client(
        &self,
        id: i32,
    ) -> Result<(ClientModelModel, Option<client::Model>), ServiceError> {
        ClientModelEntity::find_by_id(id)
            .find_also_related(client::Entity)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client model", id))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<ClientModelResponse, ServiceError> {
        let (model, owner) = self.find_with_client(id).await?;
        ClientModelResponse::build(model, owner)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        client_id: Option<i32>,
        search: Option<&str>,
    ) -> Result<(Vec<ClientModelResponse>, u64), ServiceError> {
        let mut query = ClientModelEntity::find().order_by_asc(client_model::Column::Name);
        if let Some(client_id) = client_id {
            query = query.filter(client_model::Column::ClientId.eq(client_id));
        }
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(client_model::Column::Name.contains(term));
        }

        let paginator = query
            .find_also_related(client::Entity)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let items = rows
            .into_iter()
            .map(|(model, owner)| ClientModelResponse::build(model, owner))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i32,
        input: ClientModelInput,
    ) -> Result<ClientModelResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let owner = self.require_client(input.client_id).await?;

        let (existing, _) = self.find_with_client(id).await?;
        let mut active: ClientModelActiveModel = existing.into();
        active.client_id = Set(input.client_id);
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.commandes = Set(input.commandes);
        active.variants = Set(serde_json::to_value(&input.variants)?);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, client_model_id = id, "Failed to update client model");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send_or_log(Event::ClientModelSaved(id))
            .await;
        ClientModelResponse::build(updated, Some(owner))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = ClientModelEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Client model", id));
        }
        self.event_sender
            .send_or_log(Event::ClientModelDeleted(id))
            .await;
        Ok(())
    }

    /// Ordered, received and delivered quantities for every order of the model.
    #[instrument(skip(self))]
    pub async fn reconciliation(&self, id: i32) -> Result<ModelReconciliation, ServiceError> {
        let (model, owner) = self.find_with_client(id).await?;
        let client_name = owner.map(|c| c.name).unwrap_or_default();
        let sources = reports::load_sources(&self.db_pool).await?;

        let model_orders = reconciliation::ModelOrders {
            client_model_id: Some(model.id),
            client: client_name.clone(),
            model: model.name.clone(),
            commandes: model.commandes.clone(),
            orders: model.orders()?,
        };

        Ok(ModelReconciliation {
            client_model_id: model.id,
            client: client_name,
            model: model.name,
            orders: reconciliation::reconcile(&sources, &model_orders),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(commandes: Option<&str>, variants: Vec<(&str, Vec<(&str, i32)>)>) -> ClientModelInput {
        ClientModelInput {
            client_id: 1,
            name: " ModelX ".into(),
            description: Some("  ".into()),
            commandes: commandes.map(str::to_string),
            variants: variants
                .into_iter()
                .map(|(c, vs)| CommandeVariantes {
                    commande: c.into(),
                    variantes: vs
                        .into_iter()
                        .map(|(n, q)| Variante {
                            name: n.into(),
                            quantity: q,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn normalisation_merges_order_codes_from_variants() {
        let normalized = input(Some("A1, a1 , B2,"), vec![(" C3 ", vec![(" S ", 4)])]).normalized();
        assert_eq!(normalized.name, "ModelX");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.commandes.as_deref(), Some("A1, B2, C3"));
        assert_eq!(normalized.variants[0].commande, "C3");
        assert_eq!(normalized.variants[0].variantes[0].name, "S");
    }

    #[test]
    fn duplicate_order_codes_are_rejected() {
        let dup = input(None, vec![("CMD1", vec![]), ("cmd1 ", vec![])]).normalized();
        assert!(matches!(dup.check(), Err(ServiceError::ValidationError(_))));
    }

    #[test]
    fn response_totals_follow_variants() {
        let model = ClientModelModel {
            id: 1,
            client_id: 1,
            name: "ModelX".into(),
            description: None,
            commandes: None,
            variants: serde_json::json!([
                { "commande": "CMD1", "variantes": [{ "name": "S", "quantity": 10 }, { "name": "M", "quantity": 20 }] },
                { "commande": "CMD2", "variantes": [{ "name": "L", "quantity": 5 }] }
            ]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = ClientModelResponse::build(model, None).unwrap();
        assert_eq!(response.orders[0].total, 30);
        assert_eq!(response.total_quantity, 35);
        assert_eq!(response.commandes, vec!["CMD1", "CMD2"]);
    }
}
