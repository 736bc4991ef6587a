use crate::{
    billing::{self, BillableLine, Totals},
    db::DbPool,
    entities::{
        invoice::{self, ActiveModel as InvoiceActiveModel, Entity as InvoiceEntity},
        invoice_line, DocumentStatus,
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
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvoiceLineInput {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub id: Option<LineId>,
    #[serde(default)]
    pub commande: String,
    #[serde(default)]
    pub model: String,
    pub description: Option<String>,
    /// Negative quantities are credit lines
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvoiceInput {
    #[validate(length(min = 1, max = 64, message = "Invoice number is required"))]
    pub number: String,
    #[validate(length(min = 1, message = "Issuer name is required"))]
    pub issuer_name: String,
    pub client_id: Option<i32>,
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,
    pub client_address: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub vat_active: bool,
    pub vat_rate: Option<Decimal>,
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<InvoiceLineInput>,
}

impl InvoiceInput {
    fn normalized(mut self) -> Self {
        self.number = self.number.trim().to_string();
        self.issuer_name = self.issuer_name.trim().to_string();
        self.client_name = self.client_name.trim().to_string();
        for line in &mut self.lines {
            line.commande = line.commande.trim().to_string();
            line.model = line.model.trim().to_string();
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
        if let Some(due) = self.due_date {
            if due < self.invoice_date {
                return Err(ServiceError::ValidationError(
                    "due_date cannot precede invoice_date".into(),
                ));
            }
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}

impl PersistedLine for invoice_line::Model {
    fn line_id(&self) -> i32 {
        self.id
    }
}

impl IncomingLine<invoice_line::Model> for InvoiceLineInput {
    fn line_id(&self) -> Option<i32> {
        self.id.as_ref().and_then(LineId::persisted)
    }

    fn differs_from(&self, p: &invoice_line::Model) -> bool {
        self.commande != p.commande
            || self.model != p.model
            || self.description != p.description
            || self.quantity != p.quantity
            || self.unit_price != p.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceLineResponse {
    pub id: i32,
    pub commande: String,
    pub model: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl From<invoice_line::Model> for InvoiceLineResponse {
    fn from(line: invoice_line::Model) -> Self {
        Self {
            amount: line.amount(),
            id: line.id,
            commande: line.commande,
            model: line.model,
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: i32,
    pub number: String,
    pub issuer_name: String,
    pub client_id: Option<i32>,
    pub client_name: String,
    pub client_address: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub vat_active: bool,
    pub vat_rate: Decimal,
    pub payment_mode: Option<String>,
    pub status: DocumentStatus,
    pub notes: Option<String>,
    pub lines: Vec<InvoiceLineResponse>,
    #[serde(flatten)]
    pub totals: Totals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    fn build(inv: invoice::Model, lines: Vec<invoice_line::Model>) -> Self {
        let totals = billing::compute_totals(&lines, inv.vat_active, inv.vat_rate);
        Self {
            id: inv.id,
            number: inv.number,
            issuer_name: inv.issuer_name,
            client_id: inv.client_id,
            client_name: inv.client_name,
            client_address: inv.client_address,
            invoice_date: inv.invoice_date,
            due_date: inv.due_date,
            vat_active: inv.vat_active,
            vat_rate: inv.vat_rate,
            payment_mode: inv.payment_mode,
            status: inv.status,
            notes: inv.notes,
            lines: lines.into_iter().map(Into::into).collect(),
            totals,
            created_at: inv.created_at,
            updated_at: inv.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: DocumentStatus,
}

#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    default_vat_rate: Decimal,
}

impl InvoiceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, default_vat_rate: Decimal) -> Self {
        Self {
            db_pool,
            event_sender,
            default_vat_rate,
        }
    }

    /// Persists Pending → Unpaid for invoices due before `today`.
    #[instrument(skip(self))]
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<usize, ServiceError> {
        let db = &*self.db_pool;
        let overdue: Vec<i32> = InvoiceEntity::find()
            .select_only()
            .column(invoice::Column::Id)
            .filter(invoice::Column::Status.eq(DocumentStatus::Pending))
            .filter(invoice::Column::DueDate.lt(today))
            .into_tuple()
            .all(db)
            .await?;
        if overdue.is_empty() {
            return Ok(0);
        }

        InvoiceEntity::update_many()
            .col_expr(invoice::Column::Status, Expr::value(DocumentStatus::Unpaid.code()))
            .filter(invoice::Column::Id.is_in(overdue.clone()))
            .exec(db)
            .await?;

        for id in &overdue {
            self.event_sender
                .send_or_log(Event::BecameUnpaid {
                    kind: "Invoice".to_string(),
                    id: *id,
                })
                .await;
        }
        info!(count = overdue.len(), "Overdue invoices marked unpaid");
        Ok(overdue.len())
    }

    async fn ensure_number_free<C: ConnectionTrait>(
        conn: &C,
        number: &str,
        except: Option<i32>,
    ) -> Result<(), ServiceError> {
        let mut query = InvoiceEntity::find().filter(invoice::Column::Number.eq(number));
        if let Some(id) = except {
            query = query.filter(invoice::Column::Id.ne(id));
        }
        if query.one(conn).await?.is_some() {
            warn!(number, "Duplicate invoice number");
            return Err(ServiceError::Conflict(format!(
                "invoice number {number} is already used"
            )));
        }
        Ok(())
    }

    async fn load<C: ConnectionTrait>(conn: &C, id: i32) -> Result<InvoiceResponse, ServiceError> {
        let inv = InvoiceEntity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;
        let lines = invoice_line::Entity::find()
            .filter(invoice_line::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_line::Column::Id)
            .all(conn)
            .await?;
        Ok(InvoiceResponse::build(inv, lines))
    }

    async fn save_lines<C: ConnectionTrait>(
        conn: &C,
        invoice_id: i32,
        lines: &[InvoiceLineInput],
    ) -> Result<(), ServiceError> {
        let persisted = invoice_line::Entity::find()
            .filter(invoice_line::Column::InvoiceId.eq(invoice_id))
            .all(conn)
            .await?;
        let diff = diff_lines(&persisted, lines);
        if diff.is_noop() {
            return Ok(());
        }

        if !diff.deletes.is_empty() {
            invoice_line::Entity::delete_many()
                .filter(invoice_line::Column::Id.is_in(diff.deletes.clone()))
                .exec(conn)
                .await?;
        }
        for (id, line) in diff.updates {
            invoice_line::ActiveModel {
                id: Unchanged(id),
                invoice_id: Unchanged(invoice_id),
                commande: Set(line.commande.clone()),
                model: Set(line.model.clone()),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
            }
            .update(conn)
            .await?;
        }
        for line in diff.inserts {
            invoice_line::ActiveModel {
                invoice_id: Set(invoice_id),
                commande: Set(line.commande.clone()),
                model: Set(line.model.clone()),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(number = %input.number))]
    pub async fn create(&self, input: InvoiceInput) -> Result<InvoiceResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let txn = self.db_pool.begin().await?;
        Self::ensure_number_free(&txn, &input.number, None).await?;

        let now = Utc::now();
        let inv = InvoiceActiveModel {
            number: Set(input.number.clone()),
            issuer_name: Set(input.issuer_name.clone()),
            client_id: Set(input.client_id),
            client_name: Set(input.client_name.clone()),
            client_address: Set(input.client_address.clone()),
            invoice_date: Set(input.invoice_date),
            due_date: Set(input.due_date),
            vat_active: Set(input.vat_active),
            vat_rate: Set(input.vat_rate.unwrap_or(self.default_vat_rate)),
            payment_mode: Set(input.payment_mode.clone()),
            status: Set(input.status),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create invoice");
            ServiceError::DatabaseError(e)
        })?;

        Self::save_lines(&txn, inv.id, &input.lines).await?;
        let response = Self::load(&txn, inv.id).await?;
        txn.commit().await?;

        info!(invoice_id = inv.id, total_ttc = %response.totals.total_ttc, "Invoice created");
        self.event_sender.send_or_log(Event::InvoiceSaved(inv.id)).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32, today: NaiveDate) -> Result<InvoiceResponse, ServiceError> {
        self.mark_overdue(today).await?;
        Self::load(&*self.db_pool, id).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        status: Option<DocumentStatus>,
        search: Option<&str>,
        today: NaiveDate,
    ) -> Result<(Vec<InvoiceResponse>, u64), ServiceError> {
        self.mark_overdue(today).await?;

        let db = &*self.db_pool;
        let mut query = InvoiceEntity::find()
            .order_by_desc(invoice::Column::InvoiceDate)
            .order_by_desc(invoice::Column::Id);
        if let Some(status) = status {
            query = query.filter(invoice::Column::Status.eq(status));
        }
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                invoice::Column::Number
                    .contains(term)
                    .or(invoice::Column::ClientName.contains(term)),
            );
        }

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await?;
        let invoices = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut items = Vec::with_capacity(invoices.len());
        for inv in invoices {
            let lines = invoice_line::Entity::find()
                .filter(invoice_line::Column::InvoiceId.eq(inv.id))
                .order_by_asc(invoice_line::Column::Id)
                .all(db)
                .await?;
            items.push(InvoiceResponse::build(inv, lines));
        }
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i32, input: InvoiceInput) -> Result<InvoiceResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let txn = self.db_pool.begin().await?;
        let existing = InvoiceEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;
        Self::ensure_number_free(&txn, &input.number, Some(id)).await?;

        let vat_rate = input.vat_rate.unwrap_or(existing.vat_rate);
        let mut active: InvoiceActiveModel = existing.into();
        active.number = Set(input.number.clone());
        active.issuer_name = Set(input.issuer_name.clone());
        active.client_id = Set(input.client_id);
        active.client_name = Set(input.client_name.clone());
        active.client_address = Set(input.client_address.clone());
        active.invoice_date = Set(input.invoice_date);
        active.due_date = Set(input.due_date);
        active.vat_active = Set(input.vat_active);
        active.vat_rate = Set(vat_rate);
        active.payment_mode = Set(input.payment_mode.clone());
        active.status = Set(input.status);
        active.notes = Set(input.notes.clone());
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        Self::save_lines(&txn, id, &input.lines).await?;
        let response = Self::load(&txn, id).await?;
        txn.commit().await.map_err(|e| {
            error!(error = %e, invoice_id = id, "Failed to commit invoice update");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender.send_or_log(Event::InvoiceSaved(id)).await;
        Ok(response)
    }

    /// Manual status change; every status may move to every other one.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: i32,
        status: DocumentStatus,
    ) -> Result<InvoiceResponse, ServiceError> {
        let existing = InvoiceEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;
        let from = existing.status;

        let mut active: InvoiceActiveModel = existing.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db_pool).await?;

        info!(invoice_id = id, %from, to = %status, "Invoice status changed");
        self.event_sender
            .send_or_log(Event::InvoiceStatusChanged {
                invoice_id: id,
                from,
                to: status,
            })
            .await;
        Self::load(&*self.db_pool, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        invoice_line::Entity::delete_many()
            .filter(invoice_line::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        let result = InvoiceEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Invoice", id));
        }
        txn.commit().await?;

        self.event_sender.send_or_log(Event::InvoiceDeleted(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> InvoiceInput {
        InvoiceInput {
            number: " F-2024-001 ".into(),
            issuer_name: "Atelier".into(),
            client_id: None,
            client_name: "ClientA".into(),
            client_address: None,
            invoice_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            due_date: None,
            vat_active: true,
            vat_rate: None,
            payment_mode: None,
            status: DocumentStatus::Draft,
            notes: None,
            lines: vec![],
        }
    }

    #[test]
    fn number_is_trimmed() {
        assert_eq!(input().normalized().number, "F-2024-001");
    }

    #[test]
    fn credit_lines_with_negative_quantity_are_accepted() {
        let mut credit = input();
        credit.lines = vec![InvoiceLineInput {
            id: None,
            commande: "CMD1".into(),
            model: "ModelX".into(),
            description: Some("Retour".into()),
            quantity: -2,
            unit_price: dec!(4),
        }];
        assert!(credit.check().is_ok());
    }

    #[test]
    fn due_date_before_invoice_date_is_rejected() {
        let mut bad = input();
        bad.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(matches!(bad.check(), Err(ServiceError::ValidationError(_))));
    }

    #[test]
    fn line_change_detection_covers_price() {
        let stored = invoice_line::Model {
            id: 4,
            invoice_id: 1,
            commande: "CMD1".into(),
            model: "ModelX".into(),
            description: None,
            quantity: 2,
            unit_price: dec!(10),
        };
        let mut edit = InvoiceLineInput {
            id: Some(LineId::Persisted(4)),
            commande: "CMD1".into(),
            model: "ModelX".into(),
            description: None,
            quantity: 2,
            unit_price: dec!(10),
        };
        assert!(!edit.differs_from(&stored));
        edit.unit_price = dec!(12.5);
        assert!(edit.differs_from(&stored));
    }

    #[test]
    fn response_totals_include_vat() {
        let inv = invoice::Model {
            id: 1,
            number: "F-1".into(),
            issuer_name: "Atelier".into(),
            client_id: None,
            client_name: "ClientA".into(),
            client_address: None,
            invoice_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            due_date: None,
            vat_active: true,
            vat_rate: dec!(19),
            payment_mode: None,
            status: DocumentStatus::Pending,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let line = invoice_line::Model {
            id: 1,
            invoice_id: 1,
            commande: "CMD1".into(),
            model: "ModelX".into(),
            description: None,
            quantity: 4,
            unit_price: dec!(25),
        };
        let response = InvoiceResponse::build(inv, vec![line]);
        assert_eq!(response.totals.total_ht, dec!(100));
        assert_eq!(response.totals.total_ttc, dec!(119));
    }
}
