use crate::{
    billing::{self, BillableLine, Totals},
    db::DbPool,
    entities::{
        outbound_document::{
            self, ActiveModel as DocumentActiveModel, Entity as DocumentEntity, OutboundKind,
        },
        outbound_line, DocumentStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    line_diff::{diff_lines, IncomingLine, LineId, PersistedLine},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OutboundLineInput {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub id: Option<LineId>,
    pub client_model_id: Option<i32>,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "commande is required"))]
    pub commande: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity_livree: i32,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub is_excluded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OutboundDocumentInput {
    pub client_id: Option<i32>,
    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "reference is required"))]
    pub reference: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: DocumentStatus,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub vat_active: bool,
    /// Percent; falls back to the configured default rate
    pub vat_rate: Option<Decimal>,
    pub payment_mode: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<OutboundLineInput>,
}

impl OutboundDocumentInput {
    fn normalized(mut self) -> Self {
        self.client = self.client.trim().to_string();
        self.reference = self.reference.trim().to_string();
        for line in &mut self.lines {
            line.model = line.model.trim().to_string();
            line.commande = line.commande.trim().to_string();
        }
        self
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if let Some(rate) = self.vat_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(ServiceError::ValidationError(format!(
                    "vat_rate {rate} must be between 0 and 100"
                )));
            }
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}

impl PersistedLine for outbound_line::Model {
    fn line_id(&self) -> i32 {
        self.id
    }
}

impl IncomingLine<outbound_line::Model> for OutboundLineInput {
    fn line_id(&self) -> Option<i32> {
        self.id.as_ref().and_then(LineId::persisted)
    }

    fn differs_from(&self, p: &outbound_line::Model) -> bool {
        self.client_model_id != p.client_model_id
            || self.model != p.model
            || self.commande != p.commande
            || self.description != p.description
            || self.quantity_livree != p.quantity_livree
            || self.unit_price != p.unit_price
            || self.is_excluded != p.is_excluded
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutboundLineResponse {
    pub id: i32,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    pub description: Option<String>,
    pub quantity_livree: i32,
    pub unit_price: Decimal,
    pub is_excluded: bool,
    pub amount: Decimal,
}

impl From<outbound_line::Model> for OutboundLineResponse {
    fn from(line: outbound_line::Model) -> Self {
        Self {
            amount: line.amount(),
            id: line.id,
            client_model_id: line.client_model_id,
            model: line.model,
            commande: line.commande,
            description: line.description,
            quantity_livree: line.quantity_livree,
            unit_price: line.unit_price,
            is_excluded: line.is_excluded,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutboundDocumentResponse {
    pub id: i32,
    pub kind: OutboundKind,
    pub client_id: Option<i32>,
    pub client: String,
    pub reference: String,
    pub date: NaiveDate,
    pub status: DocumentStatus,
    pub due_date: Option<NaiveDate>,
    pub vat_active: bool,
    pub vat_rate: Decimal,
    pub payment_mode: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<OutboundLineResponse>,
    /// Delivered quantity over lines that are not excluded
    pub quantity_livree: i64,
    #[serde(flatten)]
    pub totals: Totals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboundDocumentResponse {
    fn build(doc: outbound_document::Model, lines: Vec<outbound_line::Model>) -> Self {
        let totals = billing::compute_totals(&lines, doc.vat_active, doc.vat_rate);
        let quantity_livree = lines
            .iter()
            .filter(|l| !l.is_excluded)
            .map(|l| i64::from(l.quantity_livree))
            .sum();
        Self {
            id: doc.id,
            kind: doc.kind,
            client_id: doc.client_id,
            client: doc.client,
            reference: doc.reference,
            date: doc.date,
            status: doc.status,
            due_date: doc.due_date,
            vat_active: doc.vat_active,
            vat_rate: doc.vat_rate,
            payment_mode: doc.payment_mode,
            notes: doc.notes,
            lines: lines.into_iter().map(Into::into).collect(),
            quantity_livree,
            totals,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Export declarations and outgoing delivery notes.
#[derive(Clone)]
pub struct OutboundService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    default_vat_rate: Decimal,
}

impl OutboundService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, default_vat_rate: Decimal) -> Self {
        Self {
            db_pool,
            event_sender,
            default_vat_rate,
        }
    }

    /// Persists Pending → Unpaid for documents of `kind` whose due date is before `today`.
    #[instrument(skip(self))]
    pub async fn mark_overdue(&self, kind: OutboundKind, today: NaiveDate) -> Result<usize, ServiceError> {
        let db = &*self.db_pool;
        let overdue: Vec<i32> = DocumentEntity::find()
            .select_only()
            .column(outbound_document::Column::Id)
            .filter(outbound_document::Column::Kind.eq(kind))
            .filter(outbound_document::Column::Status.eq(DocumentStatus::Pending))
            .filter(outbound_document::Column::DueDate.lt(today))
            .into_tuple()
            .all(db)
            .await?;
        if overdue.is_empty() {
            return Ok(0);
        }

        DocumentEntity::update_many()
            .col_expr(
                outbound_document::Column::Status,
                Expr::value(DocumentStatus::Unpaid.code()),
            )
            .filter(outbound_document::Column::Id.is_in(overdue.clone()))
            .exec(db)
            .await?;

        for id in &overdue {
            self.event_sender
                .send_or_log(Event::BecameUnpaid {
                    kind: kind.label().to_string(),
                    id: *id,
                })
                .await;
        }
        info!(count = overdue.len(), "Overdue outbound documents marked unpaid");
        Ok(overdue.len())
    }

    async fn load<C: ConnectionTrait>(
        conn: &C,
        kind: OutboundKind,
        id: i32,
    ) -> Result<OutboundDocumentResponse, ServiceError> {
        let doc = DocumentEntity::find_by_id(id)
            .filter(outbound_document::Column::Kind.eq(kind))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;
        let lines = outbound_line::Entity::find()
            .filter(outbound_line::Column::DocumentId.eq(id))
            .order_by_asc(outbound_line::Column::Id)
            .all(conn)
            .await?;
        Ok(OutboundDocumentResponse::build(doc, lines))
    }

    async fn save_lines<C: ConnectionTrait>(
        conn: &C,
        document_id: i32,
        lines: &[OutboundLineInput],
    ) -> Result<(), ServiceError> {
        let persisted = outbound_line::Entity::find()
            .filter(outbound_line::Column::DocumentId.eq(document_id))
            .all(conn)
            .await?;
        let diff = diff_lines(&persisted, lines);

        if !diff.deletes.is_empty() {
            outbound_line::Entity::delete_many()
                .filter(outbound_line::Column::Id.is_in(diff.deletes.clone()))
                .exec(conn)
                .await?;
        }
        for (id, line) in diff.updates {
            outbound_line::ActiveModel {
                id: Unchanged(id),
                document_id: Unchanged(document_id),
                client_model_id: Set(line.client_model_id),
                model: Set(line.model.clone()),
                commande: Set(line.commande.clone()),
                description: Set(line.description.clone()),
                quantity_livree: Set(line.quantity_livree),
                unit_price: Set(line.unit_price),
                is_excluded: Set(line.is_excluded),
            }
            .update(conn)
            .await?;
        }
        for line in diff.inserts {
            outbound_line::ActiveModel {
                document_id: Set(document_id),
                client_model_id: Set(line.client_model_id),
                model: Set(line.model.clone()),
                commande: Set(line.commande.clone()),
                description: Set(line.description.clone()),
                quantity_livree: Set(line.quantity_livree),
                unit_price: Set(line.unit_price),
                is_excluded: Set(line.is_excluded),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(kind = ?kind, reference = %input.reference))]
    pub async fn create(
        &self,
        kind: OutboundKind,
        input: OutboundDocumentInput,
    ) -> Result<OutboundDocumentResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let txn = self.db_pool.begin().await?;
        let now = Utc::now();
        let doc = DocumentActiveModel {
            kind: Set(kind),
            client_id: Set(input.client_id),
            client: Set(input.client.clone()),
            reference: Set(input.reference.clone()),
            date: Set(input.date),
            status: Set(input.status),
            due_date: Set(input.due_date),
            vat_active: Set(input.vat_active),
            vat_rate: Set(input.vat_rate.unwrap_or(self.default_vat_rate)),
            payment_mode: Set(input.payment_mode.clone()),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create outbound document");
            ServiceError::DatabaseError(e)
        })?;

        Self::save_lines(&txn, doc.id, &input.lines).await?;
        let response = Self::load(&txn, kind, doc.id).await?;
        txn.commit().await?;

        info!(document_id = doc.id, total_ttc = %response.totals.total_ttc, "Outbound document created");
        self.event_sender
            .send_or_log(Event::OutboundDocumentSaved {
                document_id: doc.id,
                kind: kind.label().to_string(),
            })
            .await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        kind: OutboundKind,
        id: i32,
        today: NaiveDate,
    ) -> Result<OutboundDocumentResponse, ServiceError> {
        self.mark_overdue(kind, today).await?;
        Self::load(&*self.db_pool, kind, id).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        kind: OutboundKind,
        page: u64,
        limit: u64,
        search: Option<&str>,
        today: NaiveDate,
    ) -> Result<(Vec<OutboundDocumentResponse>, u64), ServiceError> {
        self.mark_overdue(kind, today).await?;

        let db = &*self.db_pool;
        let mut query = DocumentEntity::find()
            .filter(outbound_document::Column::Kind.eq(kind))
            .order_by_desc(outbound_document::Column::Date)
            .order_by_desc(outbound_document::Column::Id);
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                outbound_document::Column::Client
                    .contains(term)
                    .or(outbound_document::Column::Reference.contains(term)),
            );
        }

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await?;
        let docs = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            let lines = outbound_line::Entity::find()
                .filter(outbound_line::Column::DocumentId.eq(doc.id))
                .order_by_asc(outbound_line::Column::Id)
                .all(db)
                .await?;
            items.push(OutboundDocumentResponse::build(doc, lines));
        }
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        kind: OutboundKind,
        id: i32,
        input: OutboundDocumentInput,
    ) -> Result<OutboundDocumentResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let txn = self.db_pool.begin().await?;
        let existing = DocumentEntity::find_by_id(id)
            .filter(outbound_document::Column::Kind.eq(kind))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;

        let vat_rate = input.vat_rate.unwrap_or(existing.vat_rate);
        let mut active: DocumentActiveModel = existing.into();
        active.client_id = Set(input.client_id);
        active.client = Set(input.client.clone());
        active.reference = Set(input.reference.clone());
        active.date = Set(input.date);
        active.status = Set(input.status);
        active.due_date = Set(input.due_date);
        active.vat_active = Set(input.vat_active);
        active.vat_rate = Set(vat_rate);
        active.payment_mode = Set(input.payment_mode.clone());
        active.notes = Set(input.notes.clone());
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        Self::save_lines(&txn, id, &input.lines).await?;
        let response = Self::load(&txn, kind, id).await?;
        txn.commit().await.map_err(|e| {
            error!(error = %e, document_id = id, "Failed to commit outbound document update");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send_or_log(Event::OutboundDocumentSaved {
                document_id: id,
                kind: kind.label().to_string(),
            })
            .await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, kind: OutboundKind, id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let found = DocumentEntity::find_by_id(id)
            .filter(outbound_document::Column::Kind.eq(kind))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;
        outbound_line::Entity::delete_many()
            .filter(outbound_line::Column::DocumentId.eq(found.id))
            .exec(&txn)
            .await?;
        DocumentEntity::delete_by_id(found.id).exec(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::DocumentDeleted {
                document_id: id,
                kind: kind.label().to_string(),
            })
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(id: i32, qty: i32, price: Decimal, excluded: bool) -> outbound_line::Model {
        outbound_line::Model {
            id,
            document_id: 1,
            client_model_id: None,
            model: "ModelX".into(),
            commande: "CMD1".into(),
            description: None,
            quantity_livree: qty,
            unit_price: price,
            is_excluded: excluded,
        }
    }

    fn doc(vat_active: bool) -> outbound_document::Model {
        outbound_document::Model {
            id: 1,
            kind: OutboundKind::Livraison,
            client_id: None,
            client: "ClientA".into(),
            reference: "BL-7".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: DocumentStatus::Pending,
            due_date: None,
            vat_active,
            vat_rate: dec!(19),
            payment_mode: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn excluded_lines_count_neither_quantity_nor_money() {
        let response = OutboundDocumentResponse::build(
            doc(true),
            vec![
                line(1, 10, dec!(5), false),
                line(2, 3, dec!(5), true),
            ],
        );
        assert_eq!(response.quantity_livree, 10);
        assert_eq!(response.totals.total_ht, dec!(50));
        assert_eq!(response.totals.total_tva, dec!(9.5));
        assert_eq!(response.totals.total_ttc, dec!(59.5));
        assert_eq!(response.lines[1].amount, dec!(15));
    }

    #[test]
    fn negative_unit_price_is_a_discount_line() {
        let input = OutboundDocumentInput {
            client_id: None,
            client: "ClientA".into(),
            reference: "EX-2".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: DocumentStatus::Draft,
            due_date: None,
            vat_active: false,
            vat_rate: None,
            payment_mode: None,
            notes: None,
            lines: vec![OutboundLineInput {
                id: None,
                client_model_id: None,
                model: "ModelX".into(),
                commande: "CMD1".into(),
                description: Some("Remise".into()),
                quantity_livree: 1,
                unit_price: dec!(-5),
                is_excluded: false,
            }],
        };
        assert!(input.check().is_ok());
    }

    #[test]
    fn out_of_range_vat_rate_is_rejected() {
        let input = OutboundDocumentInput {
            client_id: None,
            client: "ClientA".into(),
            reference: "EX-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: DocumentStatus::Draft,
            due_date: None,
            vat_active: true,
            vat_rate: Some(dec!(120)),
            payment_mode: None,
            notes: None,
            lines: vec![],
        };
        assert!(matches!(input.check(), Err(ServiceError::ValidationError(_))));
    }
}
