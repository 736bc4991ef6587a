use crate::{
    db::DbPool,
    entities::{
        accessory,
        inbound_document::{self, ActiveModel as DocumentActiveModel, Entity as DocumentEntity, InboundKind},
        inbound_line,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    line_diff::{diff_lines, IncomingLine, LineId, PersistedLine},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InboundLineInput {
    /// Persisted line id, or any temporary id for a new line
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub id: Option<LineId>,
    pub client_model_id: Option<i32>,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "commande is required"))]
    pub commande: String,
    #[serde(default)]
    pub quantity_recu: i32,
    #[serde(default)]
    pub quantity_trouve: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AccessoryInput {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub id: Option<LineId>,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "accessory name is required"))]
    pub name: String,
    #[serde(default)]
    pub quantity_recu: i32,
    #[serde(default)]
    pub quantity_trouve: i32,
    #[serde(default)]
    pub quantity_sortie: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InboundDocumentInput {
    pub client_id: Option<i32>,
    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "reference is required"))]
    pub reference: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<InboundLineInput>,
    /// Import declarations only
    #[serde(default)]
    pub accessories: Vec<AccessoryInput>,
}

impl InboundDocumentInput {
    fn normalized(mut self) -> Self {
        self.client = self.client.trim().to_string();
        self.reference = self.reference.trim().to_string();
        for line in &mut self.lines {
            line.model = line.model.trim().to_string();
            line.commande = line.commande.trim().to_string();
        }
        for acc in &mut self.accessories {
            acc.model = acc.model.trim().to_string();
            acc.name = acc.name.trim().to_string();
        }
        self
    }

    fn check(&self, kind: InboundKind) -> Result<(), ServiceError> {
        self.validate()?;
        for line in &self.lines {
            line.validate()?;
        }
        for acc in &self.accessories {
            acc.validate()?;
        }
        if kind == InboundKind::LivraisonEntree && !self.accessories.is_empty() {
            return Err(ServiceError::ValidationError(
                "accessories can only be declared on import declarations".into(),
            ));
        }
        Ok(())
    }
}

impl PersistedLine for inbound_line::Model {
    fn line_id(&self) -> i32 {
        self.id
    }
}

impl IncomingLine<inbound_line::Model> for InboundLineInput {
    fn line_id(&self) -> Option<i32> {
        self.id.as_ref().and_then(LineId::persisted)
    }

    fn differs_from(&self, p: &inbound_line::Model) -> bool {
        self.client_model_id != p.client_model_id
            || self.model != p.model
            || self.commande != p.commande
            || self.quantity_recu != p.quantity_recu
            || self.quantity_trouve != p.quantity_trouve
    }
}

impl PersistedLine for accessory::Model {
    fn line_id(&self) -> i32 {
        self.id
    }
}

impl IncomingLine<accessory::Model> for AccessoryInput {
    fn line_id(&self) -> Option<i32> {
        self.id.as_ref().and_then(LineId::persisted)
    }

    fn differs_from(&self, p: &accessory::Model) -> bool {
        self.model != p.model
            || self.name != p.name
            || self.quantity_recu != p.quantity_recu
            || self.quantity_trouve != p.quantity_trouve
            || self.quantity_sortie != p.quantity_sortie
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InboundLineResponse {
    pub id: i32,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    pub quantity_recu: i32,
    pub quantity_trouve: i32,
    /// Received minus found
    pub missing: i64,
    /// More found than received
    pub flagged: bool,
}

impl From<inbound_line::Model> for InboundLineResponse {
    fn from(line: inbound_line::Model) -> Self {
        let missing = i64::from(line.quantity_recu) - i64::from(line.quantity_trouve);
        Self {
            id: line.id,
            client_model_id: line.client_model_id,
            model: line.model,
            commande: line.commande,
            quantity_recu: line.quantity_recu,
            quantity_trouve: line.quantity_trouve,
            missing,
            flagged: missing < 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessoryResponse {
    pub id: i32,
    pub model: String,
    pub name: String,
    pub quantity_recu: i32,
    pub quantity_trouve: i32,
    pub quantity_sortie: i32,
    pub missing: i64,
    /// Found minus already taken out
    pub remaining: i64,
}

impl From<accessory::Model> for AccessoryResponse {
    fn from(acc: accessory::Model) -> Self {
        Self {
            id: acc.id,
            missing: i64::from(acc.quantity_recu) - i64::from(acc.quantity_trouve),
            remaining: i64::from(acc.quantity_trouve) - i64::from(acc.quantity_sortie),
            model: acc.model,
            name: acc.name,
            quantity_recu: acc.quantity_recu,
            quantity_trouve: acc.quantity_trouve,
            quantity_sortie: acc.quantity_sortie,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InboundDocumentResponse {
    pub id: i32,
    pub kind: InboundKind,
    pub client_id: Option<i32>,
    pub client: String,
    pub reference: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<InboundLineResponse>,
    pub accessories: Vec<AccessoryResponse>,
    pub total_recu: i64,
    pub total_trouve: i64,
    pub total_missing: i64,
    pub flagged_lines: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InboundDocumentResponse {
    fn build(
        doc: inbound_document::Model,
        lines: Vec<inbound_line::Model>,
        accessories: Vec<accessory::Model>,
    ) -> Self {
        let lines: Vec<InboundLineResponse> = lines.into_iter().map(Into::into).collect();
        let total_recu = lines.iter().map(|l| i64::from(l.quantity_recu)).sum();
        let total_trouve = lines.iter().map(|l| i64::from(l.quantity_trouve)).sum();
        Self {
            id: doc.id,
            kind: doc.kind,
            client_id: doc.client_id,
            client: doc.client,
            reference: doc.reference,
            date: doc.date,
            notes: doc.notes,
            total_recu,
            total_trouve,
            total_missing: total_recu - total_trouve,
            flagged_lines: lines.iter().filter(|l| l.flagged).count(),
            lines,
            accessories: accessories.into_iter().map(Into::into).collect(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Import declarations and incoming deliveries.
#[derive(Clone)]
pub struct InboundService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InboundService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn load<C: ConnectionTrait>(
        conn: &C,
        kind: InboundKind,
        id: i32,
    ) -> Result<InboundDocumentResponse, ServiceError> {
        let doc = DocumentEntity::find_by_id(id)
            .filter(inbound_document::Column::Kind.eq(kind))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;
        let lines = inbound_line::Entity::find()
            .filter(inbound_line::Column::DocumentId.eq(id))
            .order_by_asc(inbound_line::Column::Id)
            .all(conn)
            .await?;
        let accessories = accessory::Entity::find()
            .filter(accessory::Column::DocumentId.eq(id))
            .order_by_asc(accessory::Column::Id)
            .all(conn)
            .await?;
        Ok(InboundDocumentResponse::build(doc, lines, accessories))
    }

    async fn save_lines<C: ConnectionTrait>(
        conn: &C,
        document_id: i32,
        input: &InboundDocumentInput,
    ) -> Result<(), ServiceError> {
        let persisted = inbound_line::Entity::find()
            .filter(inbound_line::Column::DocumentId.eq(document_id))
            .all(conn)
            .await?;
        let diff = diff_lines(&persisted, &input.lines);

        if !diff.deletes.is_empty() {
            inbound_line::Entity::delete_many()
                .filter(inbound_line::Column::Id.is_in(diff.deletes.clone()))
                .exec(conn)
                .await?;
        }
        for (id, line) in diff.updates {
            inbound_line::ActiveModel {
                id: Unchanged(id),
                document_id: Unchanged(document_id),
                client_model_id: Set(line.client_model_id),
                model: Set(line.model.clone()),
                commande: Set(line.commande.clone()),
                quantity_recu: Set(line.quantity_recu),
                quantity_trouve: Set(line.quantity_trouve),
            }
            .update(conn)
            .await?;
        }
        for line in diff.inserts {
            inbound_line::ActiveModel {
                document_id: Set(document_id),
                client_model_id: Set(line.client_model_id),
                model: Set(line.model.clone()),
                commande: Set(line.commande.clone()),
                quantity_recu: Set(line.quantity_recu),
                quantity_trouve: Set(line.quantity_trouve),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }

        let persisted = accessory::Entity::find()
            .filter(accessory::Column::DocumentId.eq(document_id))
            .all(conn)
            .await?;
        let diff = diff_lines(&persisted, &input.accessories);

        if !diff.deletes.is_empty() {
            accessory::Entity::delete_many()
                .filter(accessory::Column::Id.is_in(diff.deletes.clone()))
                .exec(conn)
                .await?;
        }
        for (id, acc) in diff.updates {
            accessory::ActiveModel {
                id: Unchanged(id),
                document_id: Unchanged(document_id),
                model: Set(acc.model.clone()),
                name: Set(acc.name.clone()),
                quantity_recu: Set(acc.quantity_recu),
                quantity_trouve: Set(acc.quantity_trouve),
                quantity_sortie: Set(acc.quantity_sortie),
            }
            .update(conn)
            .await?;
        }
        for acc in diff.inserts {
            accessory::ActiveModel {
                document_id: Set(document_id),
                model: Set(acc.model.clone()),
                name: Set(acc.name.clone()),
                quantity_recu: Set(acc.quantity_recu),
                quantity_trouve: Set(acc.quantity_trouve),
                quantity_sortie: Set(acc.quantity_sortie),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }

    async fn publish_saved(&self, doc: &InboundDocumentResponse) {
        self.event_sender
            .send_or_log(Event::InboundDocumentSaved {
                document_id: doc.id,
                kind: doc.kind.label().to_string(),
                flagged_lines: doc.flagged_lines,
            })
            .await;
    }

    #[instrument(skip(self, input), fields(kind = ?kind, reference = %input.reference))]
    pub async fn create(
        &self,
        kind: InboundKind,
        input: InboundDocumentInput,
    ) -> Result<InboundDocumentResponse, ServiceError> {
        let input = input.normalized();
        input.check(kind)?;

        let txn = self.db_pool.begin().await?;
        let now = Utc::now();
        let doc = DocumentActiveModel {
            kind: Set(kind),
            client_id: Set(input.client_id),
            client: Set(input.client.clone()),
            reference: Set(input.reference.clone()),
            date: Set(input.date),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create inbound document");
            ServiceError::DatabaseError(e)
        })?;

        Self::save_lines(&txn, doc.id, &input).await?;
        let response = Self::load(&txn, kind, doc.id).await?;
        txn.commit().await?;

        info!(document_id = doc.id, lines = response.lines.len(), "Inbound document created");
        self.publish_saved(&response).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, kind: InboundKind, id: i32) -> Result<InboundDocumentResponse, ServiceError> {
        Self::load(&*self.db_pool, kind, id).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        kind: InboundKind,
        page: u64,
        limit: u64,
        search: Option<&str>,
    ) -> Result<(Vec<InboundDocumentResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = DocumentEntity::find()
            .filter(inbound_document::Column::Kind.eq(kind))
            .order_by_desc(inbound_document::Column::Date)
            .order_by_desc(inbound_document::Column::Id);
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                inbound_document::Column::Client
                    .contains(term)
                    .or(inbound_document::Column::Reference.contains(term)),
            );
        }

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await?;
        let docs = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            let lines = inbound_line::Entity::find()
                .filter(inbound_line::Column::DocumentId.eq(doc.id))
                .order_by_asc(inbound_line::Column::Id)
                .all(db)
                .await?;
            let accessories = accessory::Entity::find()
                .filter(accessory::Column::DocumentId.eq(doc.id))
                .order_by_asc(accessory::Column::Id)
                .all(db)
                .await?;
            items.push(InboundDocumentResponse::build(doc, lines, accessories));
        }
        Ok((items, total))
    }

    /// Replaces the header and diffs lines and accessories against the stored ones.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        kind: InboundKind,
        id: i32,
        input: InboundDocumentInput,
    ) -> Result<InboundDocumentResponse, ServiceError> {
        let input = input.normalized();
        input.check(kind)?;

        let txn = self.db_pool.begin().await?;
        let existing = DocumentEntity::find_by_id(id)
            .filter(inbound_document::Column::Kind.eq(kind))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;

        let mut active: DocumentActiveModel = existing.into();
        active.client_id = Set(input.client_id);
        active.client = Set(input.client.clone());
        active.reference = Set(input.reference.clone());
        active.date = Set(input.date);
        active.notes = Set(input.notes.clone());
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        Self::save_lines(&txn, id, &input).await?;
        let response = Self::load(&txn, kind, id).await?;
        txn.commit().await.map_err(|e| {
            error!(error = %e, document_id = id, "Failed to commit inbound document update");
            ServiceError::DatabaseError(e)
        })?;

        self.publish_saved(&response).await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, kind: InboundKind, id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let found = DocumentEntity::find_by_id(id)
            .filter(inbound_document::Column::Kind.eq(kind))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;
        inbound_line::Entity::delete_many()
            .filter(inbound_line::Column::DocumentId.eq(found.id))
            .exec(&txn)
            .await?;
        accessory::Entity::delete_many()
            .filter(accessory::Column::DocumentId.eq(found.id))
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

    fn line(recu: i32, trouve: i32) -> inbound_line::Model {
        inbound_line::Model {
            id: 1,
            document_id: 1,
            client_model_id: None,
            model: "ModelX".into(),
            commande: "CMD1".into(),
            quantity_recu: recu,
            quantity_trouve: trouve,
        }
    }

    #[test]
    fn surplus_line_is_flagged() {
        let response = InboundLineResponse::from(line(10, 12));
        assert_eq!(response.missing, -2);
        assert!(response.flagged);
        assert!(!InboundLineResponse::from(line(10, 9)).flagged);
    }

    #[test]
    fn accessory_remaining_is_found_minus_sortie() {
        let acc = AccessoryResponse::from(accessory::Model {
            id: 1,
            document_id: 1,
            model: "ModelX".into(),
            name: "Zip 20cm".into(),
            quantity_recu: 100,
            quantity_trouve: 95,
            quantity_sortie: 40,
        });
        assert_eq!(acc.missing, 5);
        assert_eq!(acc.remaining, 55);
    }

    #[test]
    fn incoming_deliveries_reject_accessories() {
        let input = InboundDocumentInput {
            client_id: None,
            client: "ClientA".into(),
            reference: "LE-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            notes: None,
            lines: vec![],
            accessories: vec![AccessoryInput {
                id: None,
                model: "ModelX".into(),
                name: "Button".into(),
                quantity_recu: 1,
                quantity_trouve: 1,
                quantity_sortie: 0,
            }],
        };
        assert!(input.check(InboundKind::DeclarationImport).is_ok());
        assert!(input.check(InboundKind::LivraisonEntree).is_err());
    }
}
