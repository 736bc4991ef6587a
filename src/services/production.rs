//! Cutting sheets (fiche coupe), sewing sheets (fiche production) and production follow-up.

use crate::{
    db::DbPool,
    entities::{
        fiche_coupe::{self, CoupeCell},
        fiche_production::{self, ProductionCell},
        production_time,
        suivi_production::{self, SuiviLine},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    reconciliation::{self, same_key, ModelOrders},
    services::reports,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Ordered quantity for a sheet's order, 0 when no model matches.
///
/// A client-model id wins over the model name; client and order always match by normalised name.
pub fn order_total(
    models: &[ModelOrders],
    client: &str,
    client_model_id: Option<i32>,
    model: &str,
    commande: &str,
) -> i64 {
    models
        .iter()
        .find(|m| {
            let model_matches = match (client_model_id, m.client_model_id) {
                (Some(a), Some(b)) => a == b,
                _ => same_key(&m.model, model),
            };
            model_matches && same_key(&m.client, client)
        })
        .map(|m| reconciliation::ordered_quantity(&m.orders, commande))
        .unwrap_or(0)
}

/// Caps one sheet's grid total at the ordered quantity. A sheet covers a whole order, so the cap
/// is per sheet: other sheets for the same order are not summed in.
fn check_cap(kind: &str, produced: i64, order_total: i64) -> Result<(), ServiceError> {
    if order_total > 0 && produced > order_total {
        warn!(kind, produced, order_total, "Sheet exceeds ordered quantity");
        return Err(ServiceError::ValidationError(format!(
            "{kind} total {produced} exceeds the ordered quantity {order_total}"
        )));
    }
    Ok(())
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FicheCoupeInput {
    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "commande is required"))]
    pub commande: String,
    pub client_model_id: Option<i32>,
    #[serde(default)]
    pub grid: Vec<CoupeCell>,
    pub notes: Option<String>,
}

impl FicheCoupeInput {
    fn normalized(self) -> Self {
        Self {
            client: trimmed(&self.client),
            model: trimmed(&self.model),
            commande: trimmed(&self.commande),
            grid: self
                .grid
                .into_iter()
                .map(|cell| CoupeCell {
                    category: trimmed(&cell.category),
                    ..cell
                })
                .collect(),
            ..self
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        Ok(())
    }

    fn produced(&self) -> i64 {
        self.grid.iter().map(|c| i64::from(c.quantity)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FicheCoupeResponse {
    pub id: i32,
    pub client: String,
    pub model: String,
    pub commande: String,
    pub client_model_id: Option<i32>,
    pub grid: Vec<CoupeCell>,
    pub notes: Option<String>,
    pub produced: i64,
    /// Cut quantity per category
    pub per_category: BTreeMap<String, i64>,
    /// Ordered quantity of the matching order, 0 when unknown
    pub order_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FicheCoupeResponse {
    fn build(sheet: fiche_coupe::Model, models: &[ModelOrders]) -> Result<Self, ServiceError> {
        let grid = sheet.cells()?;
        let mut per_category = BTreeMap::new();
        for cell in &grid {
            *per_category.entry(cell.category.clone()).or_insert(0) += i64::from(cell.quantity);
        }
        Ok(Self {
            order_total: order_total(
                models,
                &sheet.client,
                sheet.client_model_id,
                &sheet.model,
                &sheet.commande,
            ),
            produced: per_category.values().sum(),
            per_category,
            grid,
            id: sheet.id,
            client: sheet.client,
            model: sheet.model,
            commande: sheet.commande,
            client_model_id: sheet.client_model_id,
            notes: sheet.notes,
            created_at: sheet.created_at,
            updated_at: sheet.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FicheProductionInput {
    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "commande is required"))]
    pub commande: String,
    pub client_model_id: Option<i32>,
    #[serde(default)]
    pub grid: Vec<ProductionCell>,
    pub notes: Option<String>,
}

impl FicheProductionInput {
    fn normalized(self) -> Self {
        Self {
            client: trimmed(&self.client),
            model: trimmed(&self.model),
            commande: trimmed(&self.commande),
            grid: self
                .grid
                .into_iter()
                .map(|cell| ProductionCell {
                    hour_slot: trimmed(&cell.hour_slot),
                    ..cell
                })
                .collect(),
            ..self
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        Ok(())
    }

    fn produced(&self) -> i64 {
        self.grid.iter().map(|c| i64::from(c.quantity)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FicheProductionResponse {
    pub id: i32,
    pub client: String,
    pub model: String,
    pub commande: String,
    pub client_model_id: Option<i32>,
    pub grid: Vec<ProductionCell>,
    pub notes: Option<String>,
    pub produced: i64,
    /// Sewn quantity per day
    #[schema(value_type = Object)]
    pub per_day: BTreeMap<NaiveDate, i64>,
    pub order_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FicheProductionResponse {
    fn build(sheet: fiche_production::Model, models: &[ModelOrders]) -> Result<Self, ServiceError> {
        let grid = sheet.cells()?;
        let mut per_day = BTreeMap::new();
        for cell in &grid {
            *per_day.entry(cell.day).or_insert(0) += i64::from(cell.quantity);
        }
        Ok(Self {
            order_total: order_total(
                models,
                &sheet.client,
                sheet.client_model_id,
                &sheet.model,
                &sheet.commande,
            ),
            produced: per_day.values().sum(),
            per_day,
            grid,
            id: sheet.id,
            client: sheet.client,
            model: sheet.model,
            commande: sheet.commande,
            client_model_id: sheet.client_model_id,
            notes: sheet.notes,
            created_at: sheet.created_at,
            updated_at: sheet.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SuiviProductionInput {
    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[serde(default)]
    pub lines: Vec<SuiviLine>,
    pub notes: Option<String>,
}

impl SuiviProductionInput {
    fn normalized(self) -> Self {
        Self {
            client: trimmed(&self.client),
            model: trimmed(&self.model),
            lines: self
                .lines
                .into_iter()
                .map(|line| SuiviLine {
                    commande: trimmed(&line.commande),
                    ..line
                })
                .collect(),
            notes: self.notes,
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        for line in &self.lines {
            if line.commande.is_empty() {
                return Err(ServiceError::ValidationError(
                    "every follow-up line needs a commande".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuiviProductionResponse {
    pub id: i32,
    pub client: String,
    pub model: String,
    pub lines: Vec<SuiviLine>,
    pub notes: Option<String>,
    pub total_livree: i64,
    pub total_reparee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<suivi_production::Model> for SuiviProductionResponse {
    type Error = ServiceError;

    fn try_from(suivi: suivi_production::Model) -> Result<Self, Self::Error> {
        let lines = suivi.parsed_lines()?;
        Ok(Self {
            total_livree: lines.iter().map(|l| i64::from(l.quantity_livree)).sum(),
            total_reparee: lines.iter().map(|l| i64::from(l.quantity_reparee)).sum(),
            lines,
            id: suivi.id,
            client: suivi.client,
            model: suivi.model,
            notes: suivi.notes,
            created_at: suivi.created_at,
            updated_at: suivi.updated_at,
        })
    }
}

/// Filter shared by the sheet listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetFilter {
    pub client: Option<String>,
    pub model: Option<String>,
    pub commande: Option<String>,
}

#[derive(Clone)]
pub struct ProductionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn published(&self, kind: &str, id: i32, produced: i64) {
        self.event_sender
            .send_or_log(Event::ProductionSheetSaved {
                kind: kind.to_string(),
                id,
                produced,
            })
            .await;
    }

    // ---- cutting sheets ----

    #[instrument(skip(self, input), fields(model = %input.model, commande = %input.commande))]
    pub async fn create_coupe(&self, input: FicheCoupeInput) -> Result<FicheCoupeResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let models = reports::load_models(&self.db_pool).await?;
        let total = order_total(&models, &input.client, input.client_model_id, &input.model, &input.commande);
        check_cap("cutting sheet", input.produced(), total)?;

        let now = Utc::now();
        let sheet = fiche_coupe::ActiveModel {
            client: Set(input.client),
            model: Set(input.model),
            commande: Set(input.commande),
            client_model_id: Set(input.client_model_id),
            grid: Set(serde_json::to_value(&input.grid)?),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create cutting sheet");
            ServiceError::DatabaseError(e)
        })?;

        let response = FicheCoupeResponse::build(sheet, &models)?;
        info!(sheet_id = response.id, produced = response.produced, "Cutting sheet created");
        self.published("fiche_coupe", response.id, response.produced).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get_coupe(&self, id: i32) -> Result<FicheCoupeResponse, ServiceError> {
        let sheet = fiche_coupe::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cutting sheet", id))?;
        let models = reports::load_models(&self.db_pool).await?;
        FicheCoupeResponse::build(sheet, &models)
    }

    #[instrument(skip(self))]
    pub async fn list_coupes(
        &self,
        page: u64,
        limit: u64,
        filter: &SheetFilter,
    ) -> Result<(Vec<FicheCoupeResponse>, u64), ServiceError> {
        let mut query = fiche_coupe::Entity::find().order_by_desc(fiche_coupe::Column::CreatedAt);
        if let Some(client) = filter.client.as_deref() {
            query = query.filter(fiche_coupe::Column::Client.contains(client.trim()));
        }
        if let Some(model) = filter.model.as_deref() {
            query = query.filter(fiche_coupe::Column::Model.contains(model.trim()));
        }
        if let Some(commande) = filter.commande.as_deref() {
            query = query.filter(fiche_coupe::Column::Commande.contains(commande.trim()));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let sheets = paginator.fetch_page(page.saturating_sub(1)).await?;
        let models = reports::load_models(&self.db_pool).await?;
        let items = sheets
            .into_iter()
            .map(|sheet| FicheCoupeResponse::build(sheet, &models))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_coupe(
        &self,
        id: i32,
        input: FicheCoupeInput,
    ) -> Result<FicheCoupeResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let existing = fiche_coupe::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cutting sheet", id))?;
        let models = reports::load_models(&self.db_pool).await?;
        let total = order_total(&models, &input.client, input.client_model_id, &input.model, &input.commande);
        check_cap("cutting sheet", input.produced(), total)?;

        let mut active: fiche_coupe::ActiveModel = existing.into();
        active.client = Set(input.client);
        active.model = Set(input.model);
        active.commande = Set(input.commande);
        active.client_model_id = Set(input.client_model_id);
        active.grid = Set(serde_json::to_value(&input.grid)?);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        let response = FicheCoupeResponse::build(updated, &models)?;
        self.published("fiche_coupe", id, response.produced).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn delete_coupe(&self, id: i32) -> Result<(), ServiceError> {
        if !self.delete_coupe_if_exists(id).await? {
            return Err(ServiceError::not_found("Cutting sheet", id));
        }
        Ok(())
    }

    pub(crate) async fn delete_coupe_if_exists(&self, id: i32) -> Result<bool, ServiceError> {
        let result = fiche_coupe::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub(crate) async fn upsert_coupe(
        &self,
        id: Option<i32>,
        input: FicheCoupeInput,
    ) -> Result<FicheCoupeResponse, ServiceError> {
        if let Some(id) = id {
            if fiche_coupe::Entity::find_by_id(id).one(&*self.db_pool).await?.is_some() {
                return self.update_coupe(id, input).await;
            }
        }
        self.create_coupe(input).await
    }

    // ---- sewing sheets ----

    #[instrument(skip(self, input), fields(model = %input.model, commande = %input.commande))]
    pub async fn create_production(
        &self,
        input: FicheProductionInput,
    ) -> Result<FicheProductionResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let models = reports::load_models(&self.db_pool).await?;
        let total = order_total(&models, &input.client, input.client_model_id, &input.model, &input.commande);
        check_cap("sewing sheet", input.produced(), total)?;

        let now = Utc::now();
        let sheet = fiche_production::ActiveModel {
            client: Set(input.client),
            model: Set(input.model),
            commande: Set(input.commande),
            client_model_id: Set(input.client_model_id),
            grid: Set(serde_json::to_value(&input.grid)?),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create sewing sheet");
            ServiceError::DatabaseError(e)
        })?;

        let response = FicheProductionResponse::build(sheet, &models)?;
        info!(sheet_id = response.id, produced = response.produced, "Sewing sheet created");
        self.published("fiche_production", response.id, response.produced).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get_production(&self, id: i32) -> Result<FicheProductionResponse, ServiceError> {
        let sheet = fiche_production::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Sewing sheet", id))?;
        let models = reports::load_models(&self.db_pool).await?;
        FicheProductionResponse::build(sheet, &models)
    }

    #[instrument(skip(self))]
    pub async fn list_productions(
        &self,
        page: u64,
        limit: u64,
        filter: &SheetFilter,
    ) -> Result<(Vec<FicheProductionResponse>, u64), ServiceError> {
        let mut query =
            fiche_production::Entity::find().order_by_desc(fiche_production::Column::CreatedAt);
        if let Some(client) = filter.client.as_deref() {
            query = query.filter(fiche_production::Column::Client.contains(client.trim()));
        }
        if let Some(model) = filter.model.as_deref() {
            query = query.filter(fiche_production::Column::Model.contains(model.trim()));
        }
        if let Some(commande) = filter.commande.as_deref() {
            query = query.filter(fiche_production::Column::Commande.contains(commande.trim()));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let sheets = paginator.fetch_page(page.saturating_sub(1)).await?;
        let models = reports::load_models(&self.db_pool).await?;
        let items = sheets
            .into_iter()
            .map(|sheet| FicheProductionResponse::build(sheet, &models))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_production(
        &self,
        id: i32,
        input: FicheProductionInput,
    ) -> Result<FicheProductionResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let existing = fiche_production::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Sewing sheet", id))?;
        let models = reports::load_models(&self.db_pool).await?;
        let total = order_total(&models, &input.client, input.client_model_id, &input.model, &input.commande);
        check_cap("sewing sheet", input.produced(), total)?;

        let mut active: fiche_production::ActiveModel = existing.into();
        active.client = Set(input.client);
        active.model = Set(input.model);
        active.commande = Set(input.commande);
        active.client_model_id = Set(input.client_model_id);
        active.grid = Set(serde_json::to_value(&input.grid)?);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        let response = FicheProductionResponse::build(updated, &models)?;
        self.published("fiche_production", id, response.produced).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn delete_production(&self, id: i32) -> Result<(), ServiceError> {
        if !self.delete_production_if_exists(id).await? {
            return Err(ServiceError::not_found("Sewing sheet", id));
        }
        Ok(())
    }

    /// Production-time entries pointing at the sheet are detached, not deleted.
    pub(crate) async fn delete_production_if_exists(&self, id: i32) -> Result<bool, ServiceError> {
        let txn = self.db_pool.begin().await?;
        production_time::Entity::update_many()
            .col_expr(
                production_time::Column::FicheProductionId,
                Expr::value(Option::<i32>::None),
            )
            .filter(production_time::Column::FicheProductionId.eq(id))
            .exec(&txn)
            .await?;
        let result = fiche_production::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    pub(crate) async fn upsert_production(
        &self,
        id: Option<i32>,
        input: FicheProductionInput,
    ) -> Result<FicheProductionResponse, ServiceError> {
        if let Some(id) = id {
            if fiche_production::Entity::find_by_id(id)
                .one(&*self.db_pool)
                .await?
                .is_some()
            {
                return self.update_production(id, input).await;
            }
        }
        self.create_production(input).await
    }

    // ---- follow-up ----

    #[instrument(skip(self, input), fields(model = %input.model))]
    pub async fn create_suivi(
        &self,
        input: SuiviProductionInput,
    ) -> Result<SuiviProductionResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let now = Utc::now();
        let suivi = suivi_production::ActiveModel {
            client: Set(input.client),
            model: Set(input.model),
            lines: Set(serde_json::to_value(&input.lines)?),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(suivi_id = suivi.id, "Production follow-up created");
        suivi.try_into()
    }

    #[instrument(skip(self))]
    pub async fn get_suivi(&self, id: i32) -> Result<SuiviProductionResponse, ServiceError> {
        suivi_production::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Production follow-up", id))?
            .try_into()
    }

    #[instrument(skip(self))]
    pub async fn list_suivis(
        &self,
        page: u64,
        limit: u64,
        filter: &SheetFilter,
    ) -> Result<(Vec<SuiviProductionResponse>, u64), ServiceError> {
        let mut query =
            suivi_production::Entity::find().order_by_desc(suivi_production::Column::UpdatedAt);
        if let Some(client) = filter.client.as_deref() {
            query = query.filter(suivi_production::Column::Client.contains(client.trim()));
        }
        if let Some(model) = filter.model.as_deref() {
            query = query.filter(suivi_production::Column::Model.contains(model.trim()));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await?
            .into_iter()
            .map(SuiviProductionResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_suivi(
        &self,
        id: i32,
        input: SuiviProductionInput,
    ) -> Result<SuiviProductionResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;
        let existing = suivi_production::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Production follow-up", id))?;

        let mut active: suivi_production::ActiveModel = existing.into();
        active.client = Set(input.client);
        active.model = Set(input.model);
        active.lines = Set(serde_json::to_value(&input.lines)?);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?.try_into()
    }

    #[instrument(skip(self))]
    pub async fn delete_suivi(&self, id: i32) -> Result<(), ServiceError> {
        let result = suivi_production::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Production follow-up", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::client_model::{CommandeVariantes, Variante};

    fn models() -> Vec<ModelOrders> {
        vec![ModelOrders {
            client_model_id: Some(7),
            client: "ClientA".into(),
            model: "ModelX".into(),
            commandes: Some("CMD1".into()),
            orders: vec![CommandeVariantes {
                commande: "CMD1".into(),
                variantes: vec![
                    Variante {
                        name: "S".into(),
                        quantity: 10,
                    },
                    Variante {
                        name: "M".into(),
                        quantity: 20,
                    },
                ],
            }],
        }]
    }

    #[test]
    fn order_total_matches_by_name_or_id() {
        let models = models();
        assert_eq!(order_total(&models, " clienta", None, "MODELX ", "cmd1"), 30);
        assert_eq!(order_total(&models, "ClientA", Some(7), "renamed", "CMD1"), 30);
        assert_eq!(order_total(&models, "ClientA", Some(8), "ModelX", "CMD1"), 0);
        assert_eq!(order_total(&models, "ClientA", None, "ModelX", "CMD9"), 0);
    }

    #[test]
    fn cap_only_applies_to_positive_order_totals() {
        assert!(check_cap("cutting sheet", 31, 30).is_err());
        assert!(check_cap("cutting sheet", 30, 30).is_ok());
        assert!(check_cap("cutting sheet", 500, 0).is_ok());
    }

    #[test]
    fn coupe_response_groups_by_category() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let sheet = fiche_coupe::Model {
            id: 1,
            client: "ClientA".into(),
            model: "ModelX".into(),
            commande: "CMD1".into(),
            client_model_id: None,
            grid: serde_json::json!([
                { "day": day, "category": "Tissu", "quantity": 12 },
                { "day": day, "category": "Doublure", "quantity": 4 },
                { "day": day.succ_opt().unwrap(), "category": "Tissu", "quantity": 3 }
            ]),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = FicheCoupeResponse::build(sheet, &models()).unwrap();
        assert_eq!(response.produced, 19);
        assert_eq!(response.per_category["Tissu"], 15);
        assert_eq!(response.order_total, 30);
    }

    #[test]
    fn negative_grid_cells_are_corrections_not_errors() {
        let input = FicheProductionInput {
            client: "ClientA".into(),
            model: "ModelX".into(),
            commande: "CMD1".into(),
            client_model_id: None,
            grid: vec![ProductionCell {
                day: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                hour_slot: "08-09".into(),
                quantity: -1,
            }],
            notes: None,
        };
        assert!(input.check().is_ok());
        assert_eq!(input.produced(), -1);
        assert!(check_cap("sewing sheet", input.produced(), 30).is_ok());
    }
}
